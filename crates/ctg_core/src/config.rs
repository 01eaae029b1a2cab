use std::time::Duration;
use url::Url;

use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://clinicaltrials.gov/api/v2/studies";
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 1000;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Request defaults shared by the search client, the cursor and the
/// aggregator. Built once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub search_endpoint: Url,
    pub detail_endpoint: Url,
    pub page_size: usize,
    pub request_timeout: Option<Duration>,
    /// Upper bound on detail fetches in flight within one page. `1` keeps
    /// the pipeline strictly sequential.
    pub detail_concurrency: usize,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let base = Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid");
        Self {
            search_endpoint: base.clone(),
            detail_endpoint: base,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: Some(DEFAULT_TIMEOUT),
            detail_concurrency: 1,
            user_agent: concat!("ctg/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiConfig {
    /// Points both endpoints at one base URL, the layout of the public API.
    pub fn with_base_url(mut self, base: &str) -> Result<Self> {
        let url = parse_endpoint(base)?;
        self.search_endpoint = url.clone();
        self.detail_endpoint = url;
        Ok(self)
    }

    pub fn with_detail_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.detail_endpoint = parse_endpoint(endpoint)?;
        Ok(self)
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_detail_concurrency(mut self, concurrency: usize) -> Self {
        self.detail_concurrency = concurrency;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::Config(format!(
                "page size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.page_size
            )));
        }
        if self.detail_concurrency == 0 {
            return Err(Error::Config(
                "detail concurrency must be at least 1".to_string(),
            ));
        }
        if self.request_timeout == Some(Duration::ZERO) {
            return Err(Error::Config("request timeout must be non-zero".to_string()));
        }
        for endpoint in [&self.search_endpoint, &self.detail_endpoint] {
            check_scheme(endpoint)?;
        }
        Ok(())
    }

    /// `{detail_endpoint}/{id}` with the id encoded as a single path segment.
    pub fn detail_url(&self, id: &str) -> Result<Url> {
        let mut url = self.detail_endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("cannot append a path to {}", self.detail_endpoint)))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }
}

fn parse_endpoint(value: &str) -> Result<Url> {
    let url = Url::parse(value).map_err(|e| Error::Config(format!("invalid URL {:?}: {}", value, e)))?;
    check_scheme(&url)?;
    Ok(url)
}

fn check_scheme(url: &Url) -> Result<()> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::Config(format!(
            "unsupported scheme {:?} in {}",
            other, url
        ))),
    }
}
