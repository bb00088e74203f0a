use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Author of a pull-request comment as reported by the REST API.
pub struct GithubUser {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Issue comment attached to a pull request.
///
/// `node_id` is the opaque GraphQL identifier used by the minimize and
/// body-update mutations; `id` is the numeric REST identifier.
pub struct PullRequestComment {
    pub id: u64,
    pub node_id: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<GithubUser>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl PullRequestComment {
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    pub fn author_login(&self) -> &str {
        self.user
            .as_ref()
            .map(|user| user.login.as_str())
            .unwrap_or("unknown")
    }
}
