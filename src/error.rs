use thiserror::Error;

/// Classified outcome of a failed geocoding call.
///
/// Every variant renders as the short, user-facing message the view layer
/// shows next to the input. None of these are fatal: a failed request leaves
/// the widget fully usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// HTTP 429 from the backend.
    #[error("There were too many requests. Try again in a second.")]
    RateLimited,
    /// HTTP 403 from the backend.
    #[error("A valid API key is needed for this search feature.")]
    Unauthorized,
    /// HTTP 500 or a response body that failed to parse.
    #[error("The search service is not working right now. Please try again later.")]
    ServiceUnavailable,
    /// Any other transport-level failure, including status 0 (a browser-style
    /// transport reporting a response without CORS headers).
    #[error("The search service is having problems.")]
    TransportFailure,
    /// Rejected before dispatch; no network call was made.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// No geocoder backend has been configured.
    #[error("No geocoder is configured.")]
    NotConfigured,
}

/// Raw failure reported by a [`Transport`](crate::transport::Transport)
/// before classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("unexpected status {code}: {message}")]
    Status { code: u16, message: String },
    #[error("network failure: {0}")]
    Network(String),
    #[error("response body is not valid JSON: {0}")]
    Parse(String),
}

impl SearchError {
    /// Map a transport failure onto the user-facing taxonomy.
    pub fn classify(error: &TransportError) -> Self {
        match error {
            TransportError::Status { code, .. } => Self::classify_status(*code),
            TransportError::Network(_) => Self::TransportFailure,
            TransportError::Parse(_) => Self::ServiceUnavailable,
        }
    }

    /// Classify a bare HTTP status code.
    pub fn classify_status(code: u16) -> Self {
        match code {
            429 => Self::RateLimited,
            403 => Self::Unauthorized,
            500 => Self::ServiceUnavailable,
            _ => Self::TransportFailure,
        }
    }
}
