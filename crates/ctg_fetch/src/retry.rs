use async_trait::async_trait;
use ctg_core::{DetailDocument, RecordFetcher, Result, SearchBackend, SearchPage, SearchQuery};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// Repeats transient failures of the wrapped search backend or fetcher.
/// Anything that is not [`ctg_core::Error::is_transient`] is returned as is.
pub struct Retrying<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> Retrying<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    async fn run<R, F, Fut>(&self, operation: &str, mut call: F) -> Result<R>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Err(e) if e.is_transient() && attempt < self.policy.max_attempts => {
                    warn!(
                        operation,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        error = %e,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(self.policy.delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

#[async_trait]
impl<T: SearchBackend> SearchBackend for Retrying<T> {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        self.run("search", || self.inner.search(query)).await
    }
}

#[async_trait]
impl<T: RecordFetcher> RecordFetcher for Retrying<T> {
    async fn fetch_detail(&self, id: &str) -> Result<DetailDocument> {
        self.run("fetch_detail", || self.inner.fetch_detail(id)).await
    }
}
