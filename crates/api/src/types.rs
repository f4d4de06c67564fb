//! Records exchanged with the JIRA REST API (v2).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

/// Who may see a comment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Everyone with access to the issue.
    #[default]
    All,
    Group(String),
    Role(String),
}

impl Visibility {
    /// Pick a restriction from loosely supplied group and role names.
    ///
    /// A non-blank group wins over a role; blank (empty or whitespace-only)
    /// values count as absent.
    pub fn from_restrictions(group: Option<&str>, role: Option<&str>) -> Self {
        if let Some(group) = non_blank(group) {
            Visibility::Group(group.to_string())
        } else if let Some(role) = non_blank(role) {
            Visibility::Role(role.to_string())
        } else {
            Visibility::All
        }
    }
}

/// Blank means empty or made only of Unicode `White_Space` characters, so a
/// non-breaking space counts as blank too.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub body: String,
    pub visibility: Visibility,
}

impl Comment {
    pub fn new(body: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            body: body.into(),
            visibility,
        }
    }

    pub fn unrestricted(body: impl Into<String>) -> Self {
        Self::new(body, Visibility::All)
    }
}

/// A project version (release) as returned by
/// `GET /rest/api/2/project/{key}/versions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    #[serde(rename = "self")]
    pub self_url: Url,
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub archived: bool,
    pub released: bool,
    pub release_date: Option<NaiveDate>,
}

/// A JIRA issue.
///
/// Returned by `GET /rest/api/2/issue/{issueIdOrKey}` or as part of search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub key: String,
    #[serde(rename = "self")]
    pub self_url: Url,
    #[serde(default)]
    pub fields: IssueFields,
}

impl Issue {
    pub fn summary(&self) -> Option<&str> {
        self.fields.summary.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.fields.status.as_ref().map(|s| s.name.as_str())
    }
}

/// Commonly used issue fields; everything else the server sends is kept in `other`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub issuetype: Option<IssueType>,
    #[serde(default)]
    pub project: Option<BasicProject>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueType {
    #[serde(rename = "self", default)]
    pub self_url: Option<Url>,
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subtask: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicProject {
    #[serde(rename = "self", default)]
    pub self_url: Option<Url>,
    #[serde(default)]
    pub id: Option<String>,
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// One page of a JQL search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default)]
    pub start_at: u32,
    #[serde(default)]
    pub max_results: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub issues: Vec<Issue>,
}
