#![allow(dead_code)]

use async_trait::async_trait;
use github_favorites::error::{FavoritesError, Result};
use github_favorites::github::ProfileLookup;
use github_favorites::types::GitHubUserProfile;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory stand-in for `GET /users/{login}`
#[derive(Default)]
pub struct FakeLookup {
    profiles: HashMap<String, GitHubUserProfile>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(
        mut self,
        login: &str,
        name: Option<&str>,
        bio: Option<&str>,
        avatar_url: &str,
    ) -> Self {
        self.profiles.insert(
            login.to_string(),
            GitHubUserProfile {
                login: login.to_string(),
                name: name.map(String::from),
                bio: bio.map(String::from),
                avatar_url: avatar_url.to_string(),
            },
        );
        self
    }

    /// Answer for `requested` with a profile whose canonical login differs
    pub fn with_alias(mut self, requested: &str, canonical: &str) -> Self {
        self.profiles.insert(
            requested.to_string(),
            GitHubUserProfile {
                login: canonical.to_string(),
                name: None,
                bio: None,
                avatar_url: format!("https://x/{}.png", canonical),
            },
        );
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileLookup for FakeLookup {
    async fn lookup_user(&self, login: &str) -> Result<GitHubUserProfile> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.profiles
            .get(login)
            .cloned()
            .ok_or_else(|| FavoritesError::NotFound(format!("/users/{}", login)))
    }
}

pub fn octocat_lookup() -> FakeLookup {
    FakeLookup::new().with_profile("octocat", Some("The Octocat"), None, "https://x/a.png")
}
