use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use ghpc_comments::comment_types::PullRequestComment;
use ghpc_comments::github_transport_helpers::{
    graphql_url_for_api_base, parse_retry_after, truncate_for_error,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::pull_request_api::{CommitStatusPayload, CreatedComment, PullRequestApi};
use crate::remote_error::RemoteCallError;
use crate::repo_ref::RepoRef;

const MINIMIZE_COMMENT_MUTATION: &str = r#"
mutation($id: ID!) {
  minimizeComment(input: {subjectId: $id, classifier: OUTDATED}) {
    minimizedComment {
      isMinimized
      minimizedReason
    }
  }
}
"#;

const UPDATE_COMMENT_MUTATION: &str = r#"
mutation($id: ID!, $body: String!) {
  updateIssueComment(input: {id: $id, body: $body}) {
    issueComment {
      id
    }
  }
}
"#;

#[derive(Debug, Clone)]
/// Connection settings for [`GithubApiClient`].
pub struct GithubApiConfig {
    pub api_base: String,
    /// Defaults to the GraphQL endpoint paired with `api_base`.
    pub graphql_url: Option<String>,
    pub token: String,
    pub request_timeout_ms: u64,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MinimizeCommentData {
    minimize_comment: Option<MinimizeCommentPayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MinimizeCommentPayload {
    minimized_comment: Option<MinimizedComment>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MinimizedComment {
    is_minimized: bool,
    #[serde(default)]
    minimized_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCommentData {
    update_issue_comment: Option<UpdateCommentPayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCommentPayload {
    issue_comment: Option<Value>,
}

#[derive(Deserialize)]
struct CreatedStatus {
    #[serde(default)]
    id: Option<u64>,
}

#[derive(Clone)]
/// reqwest implementation of [`PullRequestApi`] over GitHub REST and GraphQL.
pub struct GithubApiClient {
    http: reqwest::Client,
    api_base: String,
    graphql_url: String,
}

impl GithubApiClient {
    pub fn new(config: GithubApiConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("ghpc-pr-commenter"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let auth_header = format!("Bearer {}", config.token.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth_header)
                .context("invalid github authorization header")?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .context("failed to create github api client")?;
        let api_base = config.api_base.trim().trim_end_matches('/').to_string();
        let graphql_url = config
            .graphql_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| graphql_url_for_api_base(&api_base));
        Ok(Self {
            http: client,
            api_base,
            graphql_url,
        })
    }

    pub fn graphql_url(&self) -> &str {
        &self.graphql_url
    }

    async fn send_json<T>(&self, request: reqwest::RequestBuilder) -> Result<T, RemoteCallError>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteCallError::HttpStatus {
                status: status.as_u16(),
                body: truncate_for_error(&body, 800),
                retry_after,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|error| RemoteCallError::InvalidResponse(error.to_string()))
    }

    async fn send_graphql<T>(&self, query: &str, variables: Value) -> Result<T, RemoteCallError>
    where
        T: DeserializeOwned,
    {
        let payload = json!({ "query": query, "variables": variables });
        let response: GraphQlResponse<T> = self
            .send_json(self.http.post(&self.graphql_url).json(&payload))
            .await?;
        if !response.errors.is_empty() {
            let messages = response
                .errors
                .iter()
                .map(|error| error.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(RemoteCallError::GraphQl(truncate_for_error(&messages, 800)));
        }
        response
            .data
            .ok_or_else(|| RemoteCallError::InvalidResponse("graphql response missing data".into()))
    }
}

#[async_trait]
impl PullRequestApi for GithubApiClient {
    async fn list_comments_page(
        &self,
        repo: &RepoRef,
        pr_number: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullRequestComment>, RemoteCallError> {
        let page_value = page.to_string();
        let per_page_value = per_page.to_string();
        self.send_json(
            self.http
                .get(format!(
                    "{}/repos/{}/{}/issues/{}/comments",
                    self.api_base, repo.owner, repo.name, pr_number
                ))
                .query(&[
                    ("per_page", per_page_value.as_str()),
                    ("page", page_value.as_str()),
                ]),
        )
        .await
    }

    async fn create_comment(
        &self,
        repo: &RepoRef,
        pr_number: u64,
        body: &str,
    ) -> Result<CreatedComment, RemoteCallError> {
        let payload = json!({ "body": body });
        self.send_json(
            self.http
                .post(format!(
                    "{}/repos/{}/{}/issues/{}/comments",
                    self.api_base, repo.owner, repo.name, pr_number
                ))
                .json(&payload),
        )
        .await
    }

    async fn minimize_comment(&self, node_id: &str) -> Result<(), RemoteCallError> {
        let data: MinimizeCommentData = self
            .send_graphql(MINIMIZE_COMMENT_MUTATION, json!({ "id": node_id }))
            .await?;
        let minimized = data
            .minimize_comment
            .and_then(|payload| payload.minimized_comment)
            .ok_or_else(|| {
                RemoteCallError::InvalidResponse(format!(
                    "minimizeComment returned no comment for {node_id}"
                ))
            })?;
        if !minimized.is_minimized {
            return Err(RemoteCallError::InvalidResponse(format!(
                "comment {node_id} was not minimized (reason: {})",
                minimized.minimized_reason.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(())
    }

    async fn update_comment_body(&self, node_id: &str, body: &str) -> Result<(), RemoteCallError> {
        let data: UpdateCommentData = self
            .send_graphql(
                UPDATE_COMMENT_MUTATION,
                json!({ "id": node_id, "body": body }),
            )
            .await?;
        match data.update_issue_comment.and_then(|payload| payload.issue_comment) {
            Some(_) => Ok(()),
            None => Err(RemoteCallError::InvalidResponse(format!(
                "updateIssueComment returned no comment for {node_id}"
            ))),
        }
    }

    async fn create_commit_status(
        &self,
        repo: &RepoRef,
        sha: &str,
        status: &CommitStatusPayload,
    ) -> Result<(), RemoteCallError> {
        let created: CreatedStatus = self
            .send_json(
                self.http
                    .post(format!(
                        "{}/repos/{}/{}/statuses/{}",
                        self.api_base,
                        repo.owner,
                        repo.name,
                        sha.trim()
                    ))
                    .json(status),
            )
            .await?;
        tracing::debug!(status_id = ?created.id, context = %status.context, "commit status created");
        Ok(())
    }
}
