use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use tracing::error;
use url::Url;

use crate::error::{ApiError, Result};
use crate::types::Version;

const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire shape of one element of the versions array.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionRecord {
    #[serde(rename = "self")]
    self_url: Url,
    #[serde(deserialize_with = "id_from_text")]
    id: i64,
    name: String,
    #[serde(default)]
    description: Option<String>,
    archived: bool,
    released: bool,
    #[serde(default, deserialize_with = "release_date")]
    release_date: Option<NaiveDate>,
}

impl From<VersionRecord> for Version {
    fn from(record: VersionRecord) -> Self {
        Version {
            self_url: record.self_url,
            id: record.id,
            name: record.name,
            description: record.description,
            archived: record.archived,
            released: record.released,
            release_date: record.release_date,
        }
    }
}

// JIRA sends numeric ids as strings.
fn id_from_text<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    text.parse()
        .map_err(|e| de::Error::custom(format!("invalid version id {text:?}: {e}")))
}

fn release_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(text) => NaiveDate::parse_from_str(&text, RELEASE_DATE_FORMAT)
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid releaseDate {text:?}: {e}"))),
        None => Ok(None),
    }
}

/// Decode a versions response body. Any malformed element fails the whole list.
pub fn decode_versions(body: &str) -> Result<Vec<Version>> {
    let records: Vec<VersionRecord> = serde_json::from_str(body).map_err(|e| {
        error!("Failed to decode versions response: {}", e);
        ApiError::JsonError(e)
    })?;

    Ok(records.into_iter().map(Version::from).collect())
}
