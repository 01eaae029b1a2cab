use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Remote error: {endpoint} returned status {status}")]
    RemoteStatus { endpoint: String, status: u16 },

    #[error("Remote error: malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error("Request to {endpoint} timed out after {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    #[error("No studies returned for {0}")]
    NoMatches(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// True for every failure that originates at one of the remote endpoints:
    /// non-success status, unparseable body or a transport error.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::RemoteStatus { .. } | Error::MalformedResponse { .. } | Error::Http(_)
        )
    }

    /// Failures worth repeating: timeouts, transport errors, 5xx and 429.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Timeout { .. } | Error::Http(_) => true,
            Error::RemoteStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    pub fn malformed(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedResponse {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_classification() {
        let status = Error::RemoteStatus {
            endpoint: "https://example.test/studies/NCT1".to_string(),
            status: 500,
        };
        assert!(status.is_remote());
        assert!(status.is_transient());

        let not_found = Error::RemoteStatus {
            endpoint: "https://example.test/studies/NCT1".to_string(),
            status: 404,
        };
        assert!(not_found.is_remote());
        assert!(!not_found.is_transient());

        let malformed = Error::malformed("https://example.test/studies", "missing studies");
        assert!(malformed.is_remote());
        assert!(!malformed.is_transient());

        let invalid = Error::InvalidArgument("limit must be positive".to_string());
        assert!(!invalid.is_remote());
        assert!(!invalid.is_transient());
    }

    #[test]
    fn test_display_carries_endpoint_and_status() {
        let err = Error::RemoteStatus {
            endpoint: "https://example.test/studies".to_string(),
            status: 503,
        };
        let message = err.to_string();
        assert!(message.contains("https://example.test/studies"));
        assert!(message.contains("503"));
    }
}
