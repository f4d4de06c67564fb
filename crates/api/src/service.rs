use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use jira_rest_auth::CredentialStore;
use jira_rest_config::Site;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiError, ErrorKind, Result};
use crate::sdk::{IssueTrackerSdk, RestSdk};
use crate::types::{Comment, Issue, IssueType, Version, Visibility};
use crate::versions::decode_versions;
use crate::ApiClient;

/// Bound applied to every remote call unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Searches return only the first page of this many issues.
pub const SEARCH_PAGE_SIZE: u32 = 50;

/// Connection settings for an [`IssueTrackerClient`].
#[derive(Clone)]
pub struct ClientConfig {
    base_url: String,
    username: String,
    password: String,
    timeout: Duration,
}

impl ClientConfig {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from a configured site. A password missing from the site is
    /// looked up in `store` under the site name.
    pub fn from_site(name: &str, site: &Site, store: &CredentialStore) -> Result<Self> {
        let base_url = site
            .base_url
            .clone()
            .ok_or_else(|| ApiError::configuration(format!("site {name} has no base_url")))?;
        let username = site
            .username
            .clone()
            .ok_or_else(|| ApiError::configuration(format!("site {name} has no username")))?;

        let password = match &site.password {
            Some(password) => password.clone(),
            None => store
                .get_secret(name)
                .map_err(|e| ApiError::configuration(format!("{e:#}")))?
                .ok_or_else(|| {
                    ApiError::configuration(format!("no password stored for site {name}"))
                })?,
        };

        let config = Self::new(base_url, username, password);
        Ok(match site.timeout() {
            Some(timeout) => config.with_timeout(timeout),
            None => config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Client for one JIRA server.
///
/// Most operations go through an [`IssueTrackerSdk`]; project versions are
/// fetched directly over HTTP. Each call finishes its network exchange or
/// fails within the configured timeout.
#[derive(Clone)]
pub struct IssueTrackerClient {
    api: ApiClient,
    sdk: Arc<dyn IssueTrackerSdk>,
    timeout: Duration,
}

impl IssueTrackerClient {
    /// Connect using the built-in REST SDK.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let api = Self::api_client(&config)?;
        let sdk = Arc::new(RestSdk::new(api.clone()));
        Ok(Self {
            api,
            sdk,
            timeout: config.timeout,
        })
    }

    /// Connect with a caller-supplied SDK.
    pub fn with_sdk(config: ClientConfig, sdk: Arc<dyn IssueTrackerSdk>) -> Result<Self> {
        let api = Self::api_client(&config)?;
        Ok(Self {
            api,
            sdk,
            timeout: config.timeout,
        })
    }

    fn api_client(config: &ClientConfig) -> Result<ApiClient> {
        ApiClient::new(&config.base_url, config.timeout)?
            .with_basic_auth(&config.username, &config.password)
    }

    pub fn base_url(&self) -> &Url {
        self.api.base_url()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn authorization_header(&self) -> &str {
        self.api.authorization_header().unwrap_or_default()
    }

    /// Add a comment to an issue. A non-blank group restriction takes
    /// precedence over a role restriction.
    pub async fn add_comment(
        &self,
        issue_id: &str,
        body: &str,
        group_visibility: Option<&str>,
        role_visibility: Option<&str>,
    ) -> Result<()> {
        let uri = self
            .api
            .endpoint(&format!("rest/api/2/issue/{issue_id}/comment"))?;
        let comment = Comment::new(
            body,
            Visibility::from_restrictions(group_visibility, role_visibility),
        );

        let sdk = Arc::clone(&self.sdk);
        self.bounded("add_comment", async move { sdk.add_comment(uri, comment).await })
            .await
    }

    pub async fn get_issue(&self, id: &str) -> Result<Issue> {
        let sdk = Arc::clone(&self.sdk);
        let id = id.to_string();
        self.bounded("get_issue", async move { sdk.get_issue(&id).await })
            .await
    }

    pub async fn get_issue_types(&self) -> Result<Vec<IssueType>> {
        let sdk = Arc::clone(&self.sdk);
        self.bounded("get_issue_types", async move { sdk.get_issue_types().await })
            .await
    }

    /// Keys of all visible projects, in the order the server lists them.
    pub async fn get_project_keys(&self) -> Result<Vec<String>> {
        let sdk = Arc::clone(&self.sdk);
        let projects = self
            .bounded("get_project_keys", async move { sdk.get_all_projects().await })
            .await?;
        Ok(projects.into_iter().map(|p| p.key).collect())
    }

    /// Issues matching `jql`. Only the first page of [`SEARCH_PAGE_SIZE`]
    /// issues is returned.
    pub async fn search_by_query(&self, jql: &str) -> Result<Vec<Issue>> {
        let sdk = Arc::clone(&self.sdk);
        let jql = jql.to_string();
        let result = self
            .bounded("search_by_query", async move {
                sdk.search_jql(&jql, SEARCH_PAGE_SIZE, 0, None).await
            })
            .await?;
        Ok(result.issues)
    }

    /// Versions of a project, fetched directly since the SDK has no call for them.
    pub async fn get_versions(&self, project_key: &str) -> Result<Vec<Version>> {
        let url = self
            .api
            .endpoint(&format!("rest/api/2/project/{project_key}/versions"))?;
        let body = self.api.get_text(url).await?;
        let versions = decode_versions(&body)?;
        debug!(project_key, count = versions.len(), "Fetched versions");
        Ok(versions)
    }

    /// Run an SDK call on its own task and wait at most `self.timeout` for it.
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        debug!(operation, timeout_ms = self.timeout.as_millis() as u64, "Calling SDK");
        let mut task = tokio::spawn(call);

        match tokio::time::timeout(self.timeout, &mut task).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(err))) if err.kind() == ErrorKind::Timeout => Err(err),
            Ok(Ok(Err(err))) => {
                debug!(operation, error = %err, "SDK call failed");
                Err(ApiError::Execution {
                    operation,
                    source: Box::new(err),
                })
            }
            Ok(Err(join_err)) => Err(ApiError::Interrupted {
                operation,
                message: join_err.to_string(),
            }),
            Err(_) => {
                task.abort();
                warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "SDK call timed out"
                );
                Err(ApiError::Timeout {
                    operation: operation.to_string(),
                    after: self.timeout,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults_to_ten_seconds() {
        let config = ClientConfig::new("https://jira.example.com", "u", "p");
        assert_eq!(config.timeout(), Duration::from_secs(10));

        let config = config.with_timeout(Duration::from_millis(250));
        assert_eq!(config.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_config_debug_hides_password() {
        let config = ClientConfig::new("https://jira.example.com", "builder", "hunter2");
        let rendered = format!("{config:?}");
        assert!(rendered.contains("builder"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_same_credentials_same_header() {
        let client = |base: &str, password: &str| {
            IssueTrackerClient::new(ClientConfig::new(base, "u", password)).unwrap()
        };
        let a = client("https://a.example.com", "p");
        let b = client("https://b.example.com", "p");
        let c = client("https://a.example.com", "q");

        assert_eq!(a.authorization_header(), b.authorization_header());
        assert_ne!(a.authorization_header(), c.authorization_header());
        assert!(a.authorization_header().starts_with("Basic "));
    }

    #[test]
    fn test_invalid_base_url_fails_construction() {
        let err = IssueTrackerClient::new(ClientConfig::new("jira.example.com", "u", "p"))
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_from_site_with_inline_password() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials"));
        let site = Site {
            base_url: Some("https://jira.example.com".to_string()),
            username: Some("builder".to_string()),
            password: Some("inline".to_string()),
            timeout_secs: Some(3),
        };

        let config = ClientConfig::from_site("ci", &site, &store).unwrap();
        assert_eq!(config.username(), "builder");
        assert_eq!(config.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_from_site_reads_credential_store() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials"));
        store.set_secret("ci", "stored").unwrap();
        let site = Site {
            base_url: Some("https://jira.example.com".to_string()),
            username: Some("builder".to_string()),
            ..Default::default()
        };

        let config = ClientConfig::from_site("ci", &site, &store).unwrap();
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);

        let client = IssueTrackerClient::new(config).unwrap();
        assert_eq!(
            client.authorization_header(),
            jira_rest_auth::basic_auth_header("builder", "stored")
        );
    }

    #[test]
    fn test_from_site_missing_password() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials"));
        let site = Site {
            base_url: Some("https://jira.example.com".to_string()),
            username: Some("builder".to_string()),
            ..Default::default()
        };

        let err = ClientConfig::from_site("ci", &site, &store).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("no password stored"));
    }

    #[test]
    fn test_from_site_missing_base_url() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials"));
        let site = Site {
            username: Some("builder".to_string()),
            password: Some("p".to_string()),
            ..Default::default()
        };

        let err = ClientConfig::from_site("ci", &site, &store).unwrap_err();
        assert!(err.to_string().contains("no base_url"));
    }
}
