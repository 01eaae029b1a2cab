use async_trait::async_trait;

use crate::document::DetailDocument;
use crate::types::RawMatch;
use crate::Result;

pub const SORT_MOST_RECENT: &str = "LastUpdatePostDate:desc";

/// Parameters of one search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub term: Option<String>,
    pub sort: &'static str,
    pub page_size: usize,
    pub page_token: Option<String>,
}

impl SearchQuery {
    pub fn new(term: Option<String>, page_size: usize) -> Self {
        Self {
            term,
            sort: SORT_MOST_RECENT,
            page_size,
            page_token: None,
        }
    }

    /// Query-string pairs in the order the remote API documents them.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);
        if let Some(term) = &self.term {
            params.push(("query.term", term.clone()));
        }
        params.push(("sort", self.sort.to_string()));
        params.push(("pageSize", self.page_size.to_string()));
        if let Some(token) = &self.page_token {
            params.push(("pageToken", token.clone()));
        }
        params
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub matches: Vec<RawMatch>,
    pub next_page_token: Option<String>,
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Issues exactly one search request.
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage>;
}

#[async_trait]
pub trait RecordFetcher: Send + Sync {
    /// Retrieves the full document of one study. No retries, no caching.
    async fn fetch_detail(&self, id: &str) -> Result<DetailDocument>;
}
