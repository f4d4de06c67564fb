//! The issue-tracker SDK boundary and its default REST implementation.

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use url::Url;

use crate::error::Result;
use crate::types::{BasicProject, Comment, Issue, IssueType, SearchResult, Visibility};
use crate::ApiClient;

/// Operations the client delegates to an issue-tracker SDK.
///
/// Implementations must be safe to share between concurrent callers.
#[async_trait]
pub trait IssueTrackerSdk: Send + Sync {
    /// Post `comment` to the comment collection at `uri`.
    async fn add_comment(&self, uri: Url, comment: Comment) -> Result<()>;

    async fn get_issue(&self, id: &str) -> Result<Issue>;

    async fn get_issue_types(&self) -> Result<Vec<IssueType>>;

    async fn get_all_projects(&self) -> Result<Vec<BasicProject>>;

    async fn search_jql(
        &self,
        jql: &str,
        max_results: u32,
        start_at: u32,
        fields: Option<Vec<String>>,
    ) -> Result<SearchResult>;
}

/// [`IssueTrackerSdk`] backed by the JIRA REST API v2.
#[derive(Clone)]
pub struct RestSdk {
    api: ApiClient,
}

impl RestSdk {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[derive(Serialize)]
struct CommentPayload<'a> {
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    visibility: Option<VisibilityPayload<'a>>,
}

#[derive(Serialize)]
struct VisibilityPayload<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

impl<'a> From<&'a Comment> for CommentPayload<'a> {
    fn from(comment: &'a Comment) -> Self {
        let visibility = match &comment.visibility {
            Visibility::All => None,
            Visibility::Group(name) => Some(VisibilityPayload {
                kind: "group",
                value: name,
            }),
            Visibility::Role(name) => Some(VisibilityPayload {
                kind: "role",
                value: name,
            }),
        };
        CommentPayload {
            body: &comment.body,
            visibility,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    jql: &'a str,
    max_results: u32,
    start_at: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<String>>,
}

#[async_trait]
impl IssueTrackerSdk for RestSdk {
    async fn add_comment(&self, uri: Url, comment: Comment) -> Result<()> {
        let payload = CommentPayload::from(&comment);
        self.api.send(Method::POST, uri, Some(&payload)).await?;
        Ok(())
    }

    async fn get_issue(&self, id: &str) -> Result<Issue> {
        self.api.get(&format!("rest/api/2/issue/{id}")).await
    }

    async fn get_issue_types(&self) -> Result<Vec<IssueType>> {
        self.api.get("rest/api/2/issuetype").await
    }

    async fn get_all_projects(&self) -> Result<Vec<BasicProject>> {
        self.api.get("rest/api/2/project").await
    }

    async fn search_jql(
        &self,
        jql: &str,
        max_results: u32,
        start_at: u32,
        fields: Option<Vec<String>>,
    ) -> Result<SearchResult> {
        let request = SearchRequest {
            jql,
            max_results,
            start_at,
            fields,
        };
        self.api.post("rest/api/2/search", &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unrestricted_comment_payload() {
        let comment = Comment::unrestricted("Build #12 passed");
        let value = serde_json::to_value(CommentPayload::from(&comment)).unwrap();
        assert_eq!(value, json!({"body": "Build #12 passed"}));
    }

    #[test]
    fn test_group_comment_payload() {
        let comment = Comment::new("secret", Visibility::Group("jira-developers".into()));
        let value = serde_json::to_value(CommentPayload::from(&comment)).unwrap();
        assert_eq!(
            value,
            json!({
                "body": "secret",
                "visibility": {"type": "group", "value": "jira-developers"}
            })
        );
    }

    #[test]
    fn test_role_comment_payload() {
        let comment = Comment::new("admins only", Visibility::Role("Administrators".into()));
        let value = serde_json::to_value(CommentPayload::from(&comment)).unwrap();
        assert_eq!(value["visibility"], json!({"type": "role", "value": "Administrators"}));
    }

    #[test]
    fn test_search_request_without_fields() {
        let request = SearchRequest {
            jql: "project = TEST",
            max_results: 50,
            start_at: 0,
            fields: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"jql": "project = TEST", "maxResults": 50, "startAt": 0})
        );
    }
}
