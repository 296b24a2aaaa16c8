use thiserror::Error;

/// Failures reported by a [`RouteProvider`](super::RouteProvider) or a
/// [`PoiProvider`](super::PoiProvider).
///
/// "No route" and "no candidates" are not errors: they are returned as
/// `Ok(None)` and `Ok(vec![])` respectively.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The request could not reach the service.
    #[error("network error calling {url}: {message}")]
    NetworkError {
        /// Request URL.
        url: String,
        /// Underlying client message.
        message: String,
    },
    /// The service did not answer within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Timeout that elapsed.
        timeout_secs: u64,
    },
    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    HttpError {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Underlying client message.
        message: String,
    },
    /// The service answered but reported a failure of its own.
    #[error("service error {code}: {message}")]
    ServiceError {
        /// Service-specific status code.
        code: String,
        /// Service-provided description.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse provider response: {message}")]
    ParseError {
        /// Decoder message.
        message: String,
    },
}
