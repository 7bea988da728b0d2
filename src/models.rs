use crate::error::FavoritesError;
use crate::types::GitHubUserProfile;
use serde::{Deserialize, Serialize};
use std::fmt;

const NO_NAME: &str = "No name";
const NO_BIO: &str = "No bio";

/// One tracked GitHub user as saved in the favorites slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    // Older slots were written with `avatar`
    #[serde(rename = "avatarUrl", alias = "avatar")]
    pub avatar_url: String,
}

impl UserRecord {
    /// Display name, or a fallback label when the profile has none
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => NO_NAME,
        }
    }

    pub fn display_bio(&self) -> &str {
        match self.bio.as_deref() {
            Some(bio) if !bio.is_empty() => bio,
            _ => NO_BIO,
        }
    }

    /// Whether this record's display name equals `name`. A missing name
    /// matches the empty string.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.as_deref().unwrap_or("") == name
    }
}

impl From<GitHubUserProfile> for UserRecord {
    fn from(profile: GitHubUserProfile) -> Self {
        Self {
            login: profile.login,
            name: profile.name,
            bio: profile.bio,
            avatar_url: profile.avatar_url,
        }
    }
}

/// Ordered favorites, insertion order is display order
pub type FavoritesList = Vec<UserRecord>;

/// Result of `FavoritesStore::add`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(UserRecord),
    AlreadyExists,
    LookupFailed(LookupFailure),
}

impl AddOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added(_))
    }
}

/// Why a profile lookup did not produce a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    InvalidLogin,
    NotFound,
    Timeout,
    RateLimited,
    Network(String),
    Api(String),
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupFailure::InvalidLogin => write!(f, "login must not be empty"),
            LookupFailure::NotFound => write!(f, "user not found"),
            LookupFailure::Timeout => write!(f, "lookup timed out"),
            LookupFailure::RateLimited => write!(f, "GitHub rate limit exceeded"),
            LookupFailure::Network(msg) => write!(f, "network error: {}", msg),
            LookupFailure::Api(msg) => write!(f, "GitHub API error: {}", msg),
        }
    }
}

impl From<FavoritesError> for LookupFailure {
    fn from(err: FavoritesError) -> Self {
        match err {
            FavoritesError::NotFound(_) => LookupFailure::NotFound,
            FavoritesError::RateLimitExceeded(_) => LookupFailure::RateLimited,
            FavoritesError::InvalidLogin(_) => LookupFailure::InvalidLogin,
            FavoritesError::NetworkError(e) if e.is_timeout() => LookupFailure::Timeout,
            FavoritesError::NetworkError(e) => LookupFailure::Network(e.to_string()),
            other => LookupFailure::Api(other.to_string()),
        }
    }
}

/// Observable state of a favorites store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreState {
    Ready,
    /// Profile lookups in flight
    Busy { pending: Vec<String> },
}

/// Rate limit state from the last GitHub response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitState {
    pub remaining: u32,
    pub limit: u32,
    pub reset_time: chrono::DateTime<chrono::Utc>,
    pub is_limited: bool,
}

impl Default for RateLimitState {
    fn default() -> Self {
        Self {
            remaining: 60,
            limit: 60,
            reset_time: chrono::Utc::now() + chrono::Duration::hours(1),
            is_limited: false,
        }
    }
}
