use thiserror::Error;

/// Errors surfaced by the poller and the serializer.
#[derive(Debug, Error)]
pub enum Error {
    /// The split fetch failed; the snapshot was left untouched.
    #[error("failed to fetch splits: {0}")]
    FetchSplits(#[source] FetchError),
    /// The segment fetch failed; splits fetched in the same cycle were discarded.
    #[error("failed to fetch segments: {0}")]
    FetchSegments(#[source] FetchError),
    /// A definition could not be encoded as JSON.
    #[error("failed to serialize split data: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    /// The underlying fetch failure, if this error came from a polling cycle.
    pub fn fetch_error(&self) -> Option<&FetchError> {
        match self {
            Error::FetchSplits(e) | Error::FetchSegments(e) => Some(e),
            Error::Serialize(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by a [crate::SplitFetcher] when the remote service could not be queried.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct FetchError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        FetchError {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        FetchError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectral::prelude::*;
    use std::error::Error as _;

    #[test]
    fn fetch_error_displays_its_message() {
        let err = FetchError::new("Error from splitio API when getting splits");
        assert_eq!(err.to_string(), "Error from splitio API when getting splits");
        assert_that!(err.source()).is_none();
    }

    #[test]
    fn fetch_error_keeps_its_source() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let err = FetchError::with_source("segment request failed", io);
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("timed out".to_string())
        );
    }

    #[test]
    fn fetch_errors_are_wrapped_with_context() {
        let err = Error::FetchSegments(FetchError::new("boom"));
        assert_eq!(err.to_string(), "failed to fetch segments: boom");
        assert_that!(err.fetch_error().map(FetchError::message)).contains_value("boom");
        assert_that!(err.source().map(|s| s.to_string())).contains_value("boom".to_string());
    }
}
