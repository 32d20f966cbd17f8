pub mod github;

use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::error::FetchError;

/// Unique login names, kept sorted so snapshots and reports are stable.
pub type FollowerSet = BTreeSet<String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowerPage {
    pub logins: Vec<String>,
    /// Cursor for the following page, `None` once the listing is exhausted.
    pub next_page: Option<u32>,
}

#[async_trait]
pub trait FollowerSource: Send + Sync {
    async fn fetch_page(
        &self,
        user: &str,
        page: u32,
        per_page: u32,
    ) -> Result<FollowerPage, FetchError>;
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub page_size: u32,
    /// Fixed wait before re-requesting a page after a rate limit or transport failure.
    pub retry_delay: Duration,
    /// Consecutive transport failures tolerated on one page before giving up.
    pub network_retries: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: 10,
            retry_delay: Duration::from_secs(1),
            network_retries: 2,
        }
    }
}

/// Walks every page of a user's followers, one request in flight at a time.
pub struct Fetcher<S> {
    source: S,
    options: FetchOptions,
}

impl<S: FollowerSource> Fetcher<S> {
    pub fn new(source: S, options: FetchOptions) -> Self {
        Self { source, options }
    }

    /// Fetch the complete follower set of `user`.
    ///
    /// Rate-limited pages are retried after `retry_delay` without limit.
    /// Transport failures are retried up to `network_retries` times per page.
    /// If `cancel` resolves first, the fetch stops with [`FetchError::Cancelled`]
    /// and the partial result is dropped.
    pub async fn fetch_followers<C>(&self, user: &str, cancel: C) -> Result<FollowerSet, FetchError>
    where
        C: Future<Output = ()>,
    {
        tokio::pin!(cancel);

        let mut followers = FollowerSet::new();
        let mut page = 1;
        let mut network_failures = 0;

        loop {
            let result = tokio::select! {
                biased;
                _ = &mut cancel => return Err(FetchError::Cancelled),
                result = self.source.fetch_page(user, page, self.options.page_size) => result,
            };

            match result {
                Ok(fetched) => {
                    network_failures = 0;
                    debug!(
                        "page {page} of {user}'s followers: {} logins",
                        fetched.logins.len()
                    );
                    followers.extend(fetched.logins);
                    match fetched.next_page {
                        Some(next) if next > page => {
                            page = next;
                            continue;
                        }
                        Some(next) => {
                            warn!("next page cursor {next} does not advance past {page}, stopping");
                            break;
                        }
                        None => break,
                    }
                }
                Err(FetchError::RateLimited) => {
                    warn!(
                        "hit rate limit on page {page}, waiting {:?}",
                        self.options.retry_delay
                    );
                }
                Err(FetchError::Network(e)) if network_failures < self.options.network_retries => {
                    network_failures += 1;
                    warn!(
                        "network error on page {page} (attempt {network_failures}/{}): {e}",
                        self.options.network_retries
                    );
                }
                Err(e) => return Err(e),
            }

            tokio::select! {
                biased;
                _ = &mut cancel => return Err(FetchError::Cancelled),
                _ = tokio::time::sleep(self.options.retry_delay) => {}
            }
        }

        info!("{user} has {} followers across {page} pages", followers.len());
        Ok(followers)
    }
}
