pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod points;
pub mod source;
pub mod types;

pub use config::ApiConfig;
pub use document::{DetailDocument, Nav};
pub use error::{Error, Result};
pub use extract::{extract, extract_match};
pub use points::points;
pub use source::{RecordFetcher, SearchBackend, SearchPage, SearchQuery};
pub use types::{DateRange, Location, Point, RawMatch, SearchFilter, Summary};
