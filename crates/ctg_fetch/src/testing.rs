//! Test doubles for the search and detail seams.

use async_trait::async_trait;
use ctg_core::{
    DetailDocument, Error, RawMatch, RecordFetcher, Result, SearchBackend, SearchPage, SearchQuery,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Serves canned pages in order and records every query it receives.
pub struct ScriptedSearch {
    pages: Mutex<Vec<Result<SearchPage>>>,
    queries: Mutex<Vec<SearchQuery>>,
}

impl ScriptedSearch {
    pub fn new(pages: Vec<Result<SearchPage>>) -> Self {
        Self {
            pages: Mutex::new(pages.into_iter().rev().collect()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchBackend for ScriptedSearch {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        self.queries.lock().unwrap().push(query.clone());
        self.pages
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Ok(SearchPage::default()))
    }
}

pub fn page(ids: &[&str], token: Option<&str>) -> Result<SearchPage> {
    Ok(SearchPage {
        matches: ids.iter().map(|id| raw(id, None)).collect(),
        next_page_token: token.map(str::to_string),
    })
}

pub fn raw(id: &str, last_update: Option<&str>) -> RawMatch {
    RawMatch {
        id: id.to_string(),
        last_update: last_update.and_then(|d| ctg_core::types::parse_date(d).ok()),
    }
}

/// Detail fetcher backed by generated documents. Records the ids it was
/// asked for; ids listed in `failures` answer with that status.
#[derive(Default)]
pub struct StubFetcher {
    failures: HashMap<String, u16>,
    delays: HashMap<String, Duration>,
    cancels: HashMap<String, CancellationToken>,
    calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, id: &str, status: u16) -> Self {
        self.failures.insert(id.to_string(), status);
        self
    }

    pub fn delayed(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_string(), delay);
        self
    }

    /// Cancels `token` while the fetch for `id` is in flight.
    pub fn cancelling(mut self, id: &str, token: CancellationToken) -> Self {
        self.cancels.insert(id.to_string(), token);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordFetcher for StubFetcher {
    async fn fetch_detail(&self, id: &str) -> Result<DetailDocument> {
        self.calls.lock().unwrap().push(id.to_string());
        if let Some(token) = self.cancels.get(id) {
            token.cancel();
        }
        if let Some(delay) = self.delays.get(id) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(status) = self.failures.get(id) {
            return Err(Error::RemoteStatus {
                endpoint: format!("stub/{}", id),
                status: *status,
            });
        }
        DetailDocument::from_value(study_document(id))
    }
}

/// A study with one geo-located site.
pub fn study_document(id: &str) -> Value {
    json!({
        "protocolSection": {
            "identificationModule": {
                "nctId": id,
                "briefTitle": format!("Study {}", id),
                "organization": { "fullName": format!("Org {}", id) }
            },
            "statusModule": { "lastUpdatePostDateStruct": { "date": "2024-06-01" } },
            "contactsLocationsModule": {
                "locations": [
                    { "state": "Minnesota", "country": "United States",
                      "geoPoint": { "lat": 44.97, "lon": -93.26 } }
                ]
            }
        },
        "hasResults": false
    })
}
