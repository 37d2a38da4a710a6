//! Error types for the siyam-times crate.
//!
//! These errors describe why a single lookup failed. The public `fetch_*`
//! functions on [`crate::TimeServiceClient`] never return them; they collapse
//! every failure into `None` after logging. The `try_*` variants expose them
//! for callers that want the failure class.

/// Errors that can occur while talking to the time-calculation service.
#[derive(Debug, thiserror::Error)]
pub enum TimesError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection or transport failure before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success HTTP status.
    #[error("HTTP status {status}")]
    Http {
        /// Numeric status code returned by the service.
        status: u16,
    },

    /// The payload was missing fields or could not be parsed.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Latitude/longitude were not finite or out of range.
    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),

    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl TimesError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Timeouts, transport failures, rate limiting and server errors are
    /// retryable. Malformed payloads and client errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Network(_) => true,
            Self::Http { status } => *status == 429 || *status >= 500,
            Self::MalformedResponse(_) | Self::InvalidCoordinates(_) | Self::Config(_) => false,
        }
    }
}

impl From<reqwest::Error> for TimesError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Convenience type alias for siyam-times results.
pub type Result<T> = std::result::Result<T, TimesError>;
