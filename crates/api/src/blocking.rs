//! A blocking wrapper around [`crate::IssueTrackerClient`] for hosts that do
//! not run an async runtime.
//!
//! Each call blocks the current thread until the remote exchange completes or
//! the client's timeout elapses. Do not call these methods from inside an
//! async context.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;

use crate::error::{ApiError, Result};
use crate::sdk::IssueTrackerSdk;
use crate::service::ClientConfig;
use crate::types::{Issue, IssueType, Version};

pub struct IssueTrackerClient {
    inner: crate::IssueTrackerClient,
    runtime: Runtime,
}

impl IssueTrackerClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let runtime = new_runtime()?;
        let inner = {
            let _guard = runtime.enter();
            crate::IssueTrackerClient::new(config)?
        };
        Ok(Self { inner, runtime })
    }

    pub fn with_sdk(config: ClientConfig, sdk: Arc<dyn IssueTrackerSdk>) -> Result<Self> {
        let runtime = new_runtime()?;
        let inner = {
            let _guard = runtime.enter();
            crate::IssueTrackerClient::with_sdk(config, sdk)?
        };
        Ok(Self { inner, runtime })
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout()
    }

    pub fn authorization_header(&self) -> &str {
        self.inner.authorization_header()
    }

    pub fn add_comment(
        &self,
        issue_id: &str,
        body: &str,
        group_visibility: Option<&str>,
        role_visibility: Option<&str>,
    ) -> Result<()> {
        self.runtime.block_on(self.inner.add_comment(
            issue_id,
            body,
            group_visibility,
            role_visibility,
        ))
    }

    pub fn get_issue(&self, id: &str) -> Result<Issue> {
        self.runtime.block_on(self.inner.get_issue(id))
    }

    pub fn get_issue_types(&self) -> Result<Vec<IssueType>> {
        self.runtime.block_on(self.inner.get_issue_types())
    }

    pub fn get_project_keys(&self) -> Result<Vec<String>> {
        self.runtime.block_on(self.inner.get_project_keys())
    }

    pub fn search_by_query(&self, jql: &str) -> Result<Vec<Issue>> {
        self.runtime.block_on(self.inner.search_by_query(jql))
    }

    pub fn get_versions(&self, project_key: &str) -> Result<Vec<Version>> {
        self.runtime.block_on(self.inner.get_versions(project_key))
    }
}

fn new_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .map_err(|e| ApiError::configuration(format!("cannot start runtime: {e}")))
}
