pub mod blocking;
pub mod error;
pub mod sdk;
pub mod service;
pub mod types;
pub mod versions;

pub use error::{ApiError, ErrorKind, Result};
pub use sdk::{IssueTrackerSdk, RestSdk};
pub use service::{ClientConfig, IssueTrackerClient, DEFAULT_TIMEOUT, SEARCH_PAGE_SIZE};
pub use types::{
    BasicProject, Comment, Issue, IssueFields, IssueType, SearchResult, Status, Version,
    Visibility,
};

use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

/// Authenticated HTTP access to one JIRA server.
///
/// Every request carries the precomputed `Authorization` header and is bounded
/// by the configured timeout. Failures are returned as-is; nothing is retried.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    auth_header: Option<HeaderValue>,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let base_url = parse_base_url(base_url.as_ref())?;

        let client = Client::builder()
            .user_agent(format!("jira-rest/{}", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::configuration(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            auth_header: None,
            timeout,
        })
    }

    pub fn with_basic_auth(mut self, username: &str, password: &str) -> Result<Self> {
        let header = jira_rest_auth::basic_auth_header(username, password);
        let mut value = HeaderValue::from_str(&header).map_err(|_| {
            ApiError::configuration("failed to encode username:password using Base64")
        })?;
        value.set_sensitive(true);
        self.auth_header = Some(value);
        Ok(self)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The `Authorization` header value sent with every request.
    pub fn authorization_header(&self) -> Option<&str> {
        self.auth_header.as_ref().and_then(|v| v.to_str().ok())
    }

    /// Resolve an API path against the base URL, keeping any context path.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        join_endpoint(&self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        let response = self.send(Method::GET, url, Option::<&()>::None).await?;
        decode_json(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        let response = self.send(Method::POST, url, Some(body)).await?;
        decode_json(response).await
    }

    /// GET a fully built URL and return the raw body text.
    pub async fn get_text(&self, url: Url) -> Result<String> {
        let operation = format!("GET {}", url.path());
        let response = self.send(Method::GET, url, Option::<&()>::None).await?;
        response
            .text()
            .await
            .map_err(|e| ApiError::from_transport(e, &operation, self.timeout))
    }

    /// Send a request and map any non-2xx status to an error.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Response> {
        debug!(method = %method, url = %url, "Sending request");
        let operation = format!("{} {}", method, url.path());

        let mut req = self
            .client
            .request(method, url.clone())
            .header(CONTENT_TYPE, "application/json");
        if let Some(auth) = &self.auth_header {
            req = req.header(AUTHORIZATION, auth.clone());
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req
            .send()
            .await
            .map_err(|e| ApiError::from_transport(e, &operation, self.timeout))?;

        let status = response.status();
        debug!(status = status.as_u16(), url = %url, "Received response");

        match status {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => Err(ApiError::AuthenticationFailed {
                message: "Invalid or expired credentials".to_string(),
            }),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound {
                resource: url.path().to_string(),
            }),
            StatusCode::BAD_REQUEST => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Bad request".to_string());
                Err(ApiError::BadRequest { message })
            }
            status => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Unexpected status: {status}"));
                Err(ApiError::ServerError {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    response.json::<T>().await.map_err(|e| {
        error!("Failed to parse JSON response: {}", e);
        ApiError::InvalidResponse(e.to_string())
    })
}

/// Parse a server base URL so that relative API paths append to it.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)
        .map_err(|e| ApiError::configuration(format!("invalid base URL {raw:?}: {e}")))?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::configuration(format!(
            "base URL {raw:?} must be an absolute http(s) URL"
        )));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Append `path` to `base`. The path is inserted verbatim; callers supply
/// valid identifiers.
pub fn join_endpoint(base: &Url, path: &str) -> Result<Url> {
    base.join(path.trim_start_matches('/'))
        .map_err(ApiError::InvalidUrl)
}
