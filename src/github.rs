use crate::error::{FavoritesError, Result};
use crate::models::RateLimitState;
use crate::types::{GitHubUserProfile, StarredRepo};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use std::time::{Duration, SystemTime};
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

pub const API_BASE_URL: &str = "https://api.github.com";
const MAX_RETRIES: u32 = 3;
const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);

/// Remote profile lookup used by the favorites store
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn lookup_user(&self, login: &str) -> Result<GitHubUserProfile>;
}

/// Remote starred-repositories lookup, one page at a time
#[async_trait]
pub trait StarredLookup: Send + Sync {
    async fn starred_page(&self, login: &str, page: u32) -> Result<Vec<StarredRepo>>;
}

#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
    retry_delay: Duration,
}

impl GitHubClient {
    pub fn new(base_url: Url, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("github-favorites/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(GitHubClient {
            client,
            base_url,
            token,
            retry_delay: Duration::from_secs(2),
        })
    }

    /// Client for the public GitHub API without a token
    pub fn public() -> Result<Self> {
        Self::new(Url::parse(API_BASE_URL)?, None, Duration::from_secs(30))
    }

    /// Override the pause between retries of server errors
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                FavoritesError::ApiError(format!("Base URL cannot hold a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn validate_login(login: &str) -> Result<&str> {
        let login = login.trim();
        if login.is_empty() {
            return Err(FavoritesError::InvalidLogin("login must not be empty".to_string()));
        }
        Ok(login)
    }

    /// GET `url`. With `wait_for_reset`, an exhausted rate limit that resets
    /// within a minute is waited out; otherwise it fails immediately.
    async fn make_request(&self, url: &Url, wait_for_reset: bool) -> Result<Response> {
        let mut retries = 0;

        loop {
            let mut request = self
                .client
                .get(url.clone())
                .header("Accept", "application/vnd.github.v3+json");
            if let Some(token) = &self.token {
                request = request.header("Authorization", format!("token {}", token));
            }

            let response = request.send().await?;

            let rate_limit_remaining = response
                .headers()
                .get("X-RateLimit-Remaining")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u32>().ok());

            let rate_limit_reset = response
                .headers()
                .get("X-RateLimit-Reset")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(0);

            debug!(%url, status = %response.status(), ?rate_limit_remaining, "GitHub response");

            match response.status() {
                StatusCode::OK => {
                    if matches!(rate_limit_remaining, Some(remaining) if remaining < 10) {
                        warn!("Rate limit low ({:?} remaining)", rate_limit_remaining);
                    }
                    return Ok(response);
                }
                StatusCode::NOT_FOUND => {
                    return Err(FavoritesError::NotFound(url.path().to_string()));
                }
                StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
                    if rate_limit_remaining == Some(0) =>
                {
                    let reset_time = SystemTime::UNIX_EPOCH + Duration::from_secs(rate_limit_reset);
                    let wait_time = reset_time
                        .duration_since(SystemTime::now())
                        .unwrap_or(Duration::from_secs(0));

                    if !wait_for_reset
                        || wait_time > MAX_RATE_LIMIT_WAIT
                        || retries >= MAX_RETRIES
                    {
                        return Err(FavoritesError::RateLimitExceeded(format!(
                            "API rate limit exceeded. Reset at: {}",
                            reset_datetime(rate_limit_reset as i64)
                        )));
                    }

                    warn!("Rate limit reached. Waiting {} seconds...", wait_time.as_secs() + 1);
                    sleep(wait_time + Duration::from_secs(1)).await;
                    retries += 1;
                }
                StatusCode::FORBIDDEN => {
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(FavoritesError::ApiError(format!("Forbidden: {}", error_text)));
                }
                status if status.is_server_error() && retries < MAX_RETRIES => {
                    warn!("Server error ({}). Retrying in {:?}...", status, self.retry_delay);
                    sleep(self.retry_delay).await;
                    retries += 1;
                }
                status => {
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(FavoritesError::ApiError(format!(
                        "API request failed with status {}: {}",
                        status, error_text
                    )));
                }
            }
        }
    }

    /// Fetch the public profile of `login`. Rate limiting is reported as
    /// `RateLimitExceeded` right away so an interactive add never stalls.
    pub async fn get_user(&self, login: &str) -> Result<GitHubUserProfile> {
        let login = Self::validate_login(login)?;
        let url = self.endpoint(&["users", login])?;
        let response = self.make_request(&url, false).await?;
        let profile: GitHubUserProfile = response.json().await?;
        Ok(profile)
    }

    /// Get current rate limit state from a response
    pub fn get_rate_limit_state(&self, response: &Response) -> RateLimitState {
        let headers = response.headers();

        let limit = headers
            .get("X-RateLimit-Limit")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(60);

        // Missing header means the server did not report a limit
        let remaining = headers
            .get("X-RateLimit-Remaining")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(limit);

        let reset = headers
            .get("X-RateLimit-Reset")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<i64>().ok())
            .map(reset_datetime)
            .unwrap_or_else(|| Utc::now() + chrono::Duration::hours(1));

        RateLimitState {
            remaining,
            limit,
            reset_time: reset,
            is_limited: remaining == 0,
        }
    }

    /// Fetch one page of repositories starred by `login`. An empty page
    /// means there is nothing further.
    pub async fn fetch_starred_page(
        &self,
        login: &str,
        page: u32,
    ) -> Result<(Vec<StarredRepo>, RateLimitState)> {
        let login = Self::validate_login(login)?;
        let mut url = self.endpoint(&["users", login, "starred"])?;
        url.query_pairs_mut().append_pair("page", &page.to_string());

        let response = self.make_request(&url, true).await?;
        let rate_limit = self.get_rate_limit_state(&response);

        let repos: Vec<StarredRepo> = response.json().await?;

        Ok((repos, rate_limit))
    }
}

fn reset_datetime(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp, 0).unwrap_or_else(Utc::now)
}

#[async_trait]
impl ProfileLookup for GitHubClient {
    async fn lookup_user(&self, login: &str) -> Result<GitHubUserProfile> {
        self.get_user(login).await
    }
}

#[async_trait]
impl StarredLookup for GitHubClient {
    async fn starred_page(&self, login: &str, page: u32) -> Result<Vec<StarredRepo>> {
        let (repos, rate_limit) = self.fetch_starred_page(login, page).await?;
        debug!(login, page, remaining = rate_limit.remaining, "Fetched starred page");
        Ok(repos)
    }
}
