use crate::error::Result;
use crate::github::StarredLookup;
use crate::types::StarredRepo;
use tracing::{debug, info};

/// Paged view over the repositories a user has starred.
///
/// `page` is the last page loaded (0 before the first load). An empty page
/// marks the feed exhausted.
pub struct StarredFeed<L> {
    lookup: L,
    login: String,
    items: Vec<StarredRepo>,
    page: u32,
    exhausted: bool,
}

impl<L: StarredLookup> StarredFeed<L> {
    pub fn new(lookup: L, login: impl Into<String>) -> Self {
        Self {
            lookup,
            login: login.into(),
            items: Vec::new(),
            page: 0,
            exhausted: false,
        }
    }

    /// Load page 1, replacing whatever was loaded before
    pub async fn load_first(&mut self) -> Result<usize> {
        let repos = self.lookup.starred_page(&self.login, 1).await?;
        let count = repos.len();

        self.items = repos;
        self.page = 1;
        self.exhausted = count == 0;

        info!(login = %self.login, count, "Loaded starred repositories");
        Ok(count)
    }

    /// Pull-to-refresh: start over from page 1
    pub async fn refresh(&mut self) -> Result<usize> {
        self.load_first().await
    }

    /// Append the next page. Returns the number of new items; 0 once the
    /// feed is exhausted.
    pub async fn load_more(&mut self) -> Result<usize> {
        if self.exhausted {
            return Ok(0);
        }

        let next = self.page + 1;
        let repos = self.lookup.starred_page(&self.login, next).await?;
        let count = repos.len();

        self.page = next;
        if count == 0 {
            self.exhausted = true;
            debug!(login = %self.login, page = next, "Starred feed exhausted");
        } else {
            self.items.extend(repos);
        }

        Ok(count)
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn items(&self) -> &[StarredRepo] {
        &self.items
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FavoritesError;
    use crate::types::RepoOwner;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves `pages[n - 1]` for page `n`, empty past the end
    struct PagedLookup {
        pages: Vec<Vec<u64>>,
        requested: Mutex<Vec<u32>>,
        fail: bool,
    }

    impl PagedLookup {
        fn new(pages: Vec<Vec<u64>>) -> Self {
            Self {
                pages,
                requested: Mutex::new(Vec::new()),
                fail: false,
            }
        }
    }

    fn repo(id: u64) -> StarredRepo {
        StarredRepo {
            id,
            name: format!("repo-{}", id),
            owner: RepoOwner {
                login: "owner".to_string(),
                avatar_url: "https://x/o.png".to_string(),
            },
            html_url: format!("https://github.com/owner/repo-{}", id),
        }
    }

    #[async_trait]
    impl StarredLookup for PagedLookup {
        async fn starred_page(&self, _login: &str, page: u32) -> Result<Vec<StarredRepo>> {
            self.requested.lock().unwrap().push(page);
            if self.fail {
                return Err(FavoritesError::ApiError("boom".to_string()));
            }
            Ok(self
                .pages
                .get(page as usize - 1)
                .map(|ids| ids.iter().copied().map(repo).collect())
                .unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn test_pages_accumulate_until_empty() {
        let mut feed = StarredFeed::new(PagedLookup::new(vec![vec![1, 2], vec![3]]), "octocat");

        assert_eq!(feed.load_first().await.unwrap(), 2);
        assert_eq!(feed.load_more().await.unwrap(), 1);
        assert_eq!(feed.load_more().await.unwrap(), 0);
        assert!(feed.is_exhausted());

        // No further requests once exhausted
        assert_eq!(feed.load_more().await.unwrap(), 0);
        assert_eq!(*feed.lookup.requested.lock().unwrap(), vec![1, 2, 3]);

        let ids: Vec<u64> = feed.items().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(feed.page(), 3);
    }

    #[tokio::test]
    async fn test_refresh_resets_to_first_page() {
        let mut feed = StarredFeed::new(PagedLookup::new(vec![vec![1], vec![2]]), "octocat");
        feed.load_first().await.unwrap();
        feed.load_more().await.unwrap();
        assert_eq!(feed.items().len(), 2);

        feed.refresh().await.unwrap();
        assert_eq!(feed.items().len(), 1);
        assert_eq!(feed.page(), 1);
        assert!(!feed.is_exhausted());
    }

    #[tokio::test]
    async fn test_failed_page_leaves_items() {
        let mut feed = StarredFeed::new(PagedLookup::new(vec![vec![1]]), "octocat");
        feed.load_first().await.unwrap();

        feed.lookup.fail = true;
        assert!(feed.load_more().await.is_err());
        assert_eq!(feed.items().len(), 1);
        assert_eq!(feed.page(), 1);
    }
}
