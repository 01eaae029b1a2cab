use async_trait::async_trait;
use ctg_core::{
    extract_match, ApiConfig, DetailDocument, Error, RecordFetcher, Result, SearchBackend,
    SearchPage, SearchQuery,
};
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    studies: Vec<Value>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// HTTP client for the clinical-trials v2 API. Implements both the search
/// backend and the record fetcher; every call is exactly one request.
#[derive(Debug, Clone)]
pub struct ClinicalTrialsClient {
    client: reqwest::Client,
    config: ApiConfig,
}

impl ClinicalTrialsClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        config.validate()?;
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    async fn get_json(&self, request: RequestBuilder, endpoint: &str) -> Result<Value> {
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e, endpoint))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::RemoteStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e, endpoint))?;
        serde_json::from_slice(&body).map_err(|e| Error::malformed(endpoint, e.to_string()))
    }

    fn transport_error(&self, err: reqwest::Error, endpoint: &str) -> Error {
        match self.config.request_timeout {
            Some(timeout) if err.is_timeout() => Error::Timeout {
                endpoint: endpoint.to_string(),
                timeout,
            },
            _ => Error::Http(err),
        }
    }
}

#[async_trait]
impl SearchBackend for ClinicalTrialsClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        let endpoint = self.config.search_endpoint.as_str();
        debug!(endpoint, page_token = ?query.page_token, "Requesting search page");

        let request = self
            .client
            .get(self.config.search_endpoint.clone())
            .query(&query.params());
        let body = self.get_json(request, endpoint).await?;

        let response: SearchResponse = serde_json::from_value(body)
            .map_err(|e| Error::malformed(endpoint, e.to_string()))?;

        let matches = response
            .studies
            .iter()
            .enumerate()
            .map(|(i, study)| {
                extract_match(study).ok_or_else(|| {
                    Error::malformed(endpoint, format!("study at index {} has no nctId", i))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SearchPage {
            matches,
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        })
    }
}

#[async_trait]
impl RecordFetcher for ClinicalTrialsClient {
    async fn fetch_detail(&self, id: &str) -> Result<DetailDocument> {
        let url = self.config.detail_url(id)?;
        let endpoint = url.to_string();
        debug!(endpoint = %endpoint, id, "Fetching study detail");

        let body = self.get_json(self.client.get(url), &endpoint).await?;
        DetailDocument::from_value(body).map_err(|e| Error::malformed(&endpoint, e.to_string()))
    }
}
