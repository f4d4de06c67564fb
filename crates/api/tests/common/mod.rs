#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use jira_rest_api::{
    ApiError, BasicProject, Comment, Issue, IssueTrackerSdk, IssueType, Result, SearchResult,
};
use tracing_subscriber::EnvFilter;
use url::Url;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Default, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    #[default]
    Respond,
    Hang,
    Panic,
    NotFound,
}

/// In-memory SDK that records what it was asked to do.
#[derive(Default)]
pub struct FakeSdk {
    pub behavior: Behavior,
    pub projects: Vec<BasicProject>,
    pub issue_types: Vec<IssueType>,
    pub issues: Vec<Issue>,
    pub comments: Mutex<Vec<(Url, Comment)>>,
    pub searches: Mutex<Vec<(String, u32, u32, Option<Vec<String>>)>>,
}

impl FakeSdk {
    pub fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            ..Default::default()
        }
    }

    async fn behave(&self) -> Result<()> {
        match self.behavior {
            Behavior::Respond => Ok(()),
            Behavior::Hang => std::future::pending().await,
            Behavior::Panic => panic!("sdk crashed"),
            Behavior::NotFound => Err(ApiError::NotFound {
                resource: "/rest/api/2/issue/NOPE-1".to_string(),
            }),
        }
    }
}

#[async_trait]
impl IssueTrackerSdk for FakeSdk {
    async fn add_comment(&self, uri: Url, comment: Comment) -> Result<()> {
        self.behave().await?;
        self.comments.lock().unwrap().push((uri, comment));
        Ok(())
    }

    async fn get_issue(&self, id: &str) -> Result<Issue> {
        self.behave().await?;
        self.issues
            .iter()
            .find(|issue| issue.key == id || issue.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound {
                resource: id.to_string(),
            })
    }

    async fn get_issue_types(&self) -> Result<Vec<IssueType>> {
        self.behave().await?;
        Ok(self.issue_types.clone())
    }

    async fn get_all_projects(&self) -> Result<Vec<BasicProject>> {
        self.behave().await?;
        Ok(self.projects.clone())
    }

    async fn search_jql(
        &self,
        jql: &str,
        max_results: u32,
        start_at: u32,
        fields: Option<Vec<String>>,
    ) -> Result<SearchResult> {
        self.behave().await?;
        self.searches
            .lock()
            .unwrap()
            .push((jql.to_string(), max_results, start_at, fields));
        Ok(SearchResult {
            start_at,
            max_results,
            total: self.issues.len() as u32,
            issues: self.issues.clone(),
        })
    }
}

pub fn project(key: &str) -> BasicProject {
    BasicProject {
        self_url: None,
        id: None,
        key: key.to_string(),
        name: Some(format!("{key} project")),
    }
}

pub fn issue(key: &str) -> Issue {
    serde_json::from_value(serde_json::json!({
        "id": "10001",
        "key": key,
        "self": "https://jira.example.com/rest/api/2/issue/10001",
        "fields": {"summary": format!("Summary of {key}")}
    }))
    .unwrap()
}
