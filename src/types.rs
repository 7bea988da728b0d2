use serde::{Deserialize, Serialize};

// GitHub API response structures

/// Profile returned by `GET /users/{login}`
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUserProfile {
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: String,
}

/// Entry of `GET /users/{login}/starred`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarredRepo {
    pub id: u64,
    pub name: String,
    pub owner: RepoOwner,
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
    pub avatar_url: String,
}
