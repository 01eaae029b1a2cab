use std::sync::Arc;

use ctg_core::{
    extract, ApiConfig, DetailDocument, Error, RawMatch, RecordFetcher, Result, SearchBackend,
    SearchFilter, Summary,
};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;

use crate::client::ClinicalTrialsClient;
use crate::cursor::PageCursor;
use crate::logging::Logger;
use crate::retry::{RetryPolicy, Retrying};

/// Drives the cursor, the record fetcher and the extractor to build one
/// ordered, limit-bounded list of summaries.
pub struct Aggregator {
    search: Arc<dyn SearchBackend>,
    fetcher: Arc<dyn RecordFetcher>,
    page_size: usize,
    detail_concurrency: usize,
    logger: Logger,
}

impl Aggregator {
    pub fn new(
        search: Arc<dyn SearchBackend>,
        fetcher: Arc<dyn RecordFetcher>,
        config: &ApiConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            search,
            fetcher,
            page_size: config.page_size,
            detail_concurrency: config.detail_concurrency,
            logger: Logger::new().with_new_prefixes("ctg".to_string()),
        })
    }

    /// Aggregator over the live HTTP API.
    pub fn from_config(config: ApiConfig) -> Result<Self> {
        let client = Arc::new(ClinicalTrialsClient::new(config.clone())?);
        Self::new(client.clone(), client, &config)
    }

    /// Like [`Aggregator::from_config`], with transient failures of both
    /// endpoints repeated according to `policy`.
    pub fn from_config_with_retry(config: ApiConfig, policy: RetryPolicy) -> Result<Self> {
        let client = ClinicalTrialsClient::new(config.clone())?;
        let search = Arc::new(Retrying::new(client.clone(), policy));
        let fetcher = Arc::new(Retrying::new(client, policy));
        Self::new(search, fetcher, &config)
    }

    pub async fn collect(&self, filter: &SearchFilter, limit: usize) -> Result<Vec<Summary>> {
        self.collect_with_cancel(filter, limit, &CancellationToken::new())
            .await
    }

    /// Collects at most `limit` summaries, most recently updated first.
    ///
    /// Fails before any request when `limit` is zero or the date range is
    /// inverted. Only as many matches of the last page are resolved as are
    /// needed to reach `limit`. The first error from either endpoint aborts
    /// the whole call; partial results are dropped.
    pub async fn collect_with_cancel(
        &self,
        filter: &SearchFilter,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<Summary>> {
        if limit == 0 {
            return Err(Error::InvalidArgument(
                "limit must be greater than zero".to_string(),
            ));
        }
        filter.validate()?;

        let logger = self.logger.with_prefix("collect".to_string());
        let floor = filter.date_floor();
        let mut cursor = PageCursor::new(self.search.as_ref(), filter.query_term(), self.page_size);
        let mut results: Vec<Summary> = Vec::new();

        while results.len() < limit {
            ensure_not_cancelled(cancel)?;
            let page = cursor.next_page().await?;
            let page_logger = logger.with_prefix(format!("page {}", cursor.pages_fetched()));
            page_logger.debug(&format!(
                "{} matches, more pages: {}",
                page.matches.len(),
                page.has_more
            ));

            if let Some(floor) = floor {
                let all_older = !page.matches.is_empty()
                    && page
                        .matches
                        .iter()
                        .all(|m| m.last_update.map_or(false, |d| d < floor));
                if all_older {
                    page_logger.info(&format!("every match predates {}, stopping", floor));
                    break;
                }
            }

            let wanted = limit - results.len();
            let batch: Vec<RawMatch> = page.matches.into_iter().take(wanted).collect();
            results.extend(self.resolve(batch, cancel).await?);

            if !page.has_more {
                break;
            }
        }

        logger.info(&format!(
            "collected {} of {} requested summaries over {} pages",
            results.len(),
            limit,
            cursor.pages_fetched()
        ));
        Ok(results)
    }

    /// Full document of the most recently updated study.
    pub async fn latest(&self) -> Result<DetailDocument> {
        let logger = self.logger.with_prefix("latest".to_string());
        let mut cursor = PageCursor::new(self.search.as_ref(), None, 1);
        let page = cursor.next_page().await?;
        let newest = page
            .matches
            .into_iter()
            .next()
            .ok_or_else(|| Error::NoMatches("the most recently updated study".to_string()))?;

        logger.info(&format!("most recently updated study: {}", newest.id));
        self.fetcher.fetch_detail(&newest.id).await
    }

    /// Summary of a single study by id.
    pub async fn summary(&self, id: &str) -> Result<Summary> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::InvalidArgument("study id must not be empty".to_string()));
        }
        self.resolve_one(
            RawMatch {
                id: id.to_string(),
                last_update: None,
            },
            &CancellationToken::new(),
        )
        .await
    }

    /// Resolves the matches of one page, keeping page order. At most
    /// `detail_concurrency` fetches are in flight.
    async fn resolve(
        &self,
        matches: Vec<RawMatch>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Summary>> {
        stream::iter(matches)
            .map(|raw| self.resolve_one(raw, cancel))
            .buffered(self.detail_concurrency)
            .try_collect()
            .await
    }

    async fn resolve_one(&self, raw: RawMatch, cancel: &CancellationToken) -> Result<Summary> {
        ensure_not_cancelled(cancel)?;
        let document = self.fetcher.fetch_detail(&raw.id).await?;
        let mut summary = extract(&document);
        if summary.id.is_empty() {
            summary.id = raw.id;
        }
        Ok(summary)
    }
}

fn ensure_not_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}
