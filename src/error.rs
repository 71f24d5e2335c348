use thiserror::Error;

/// Errors surfaced by the recipe gateways.
///
/// These cover transport failures, malformed payloads, and structured error
/// bodies returned by the recipes API. A stale (superseded) response is not
/// an error — it never leaves the feed controller.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body exceeded the size limit
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// Response body could not be decoded as the expected payload
    #[error("Malformed response: {0}")]
    Parse(String),
    /// The API answered with a structured error message
    #[error("{0}")]
    Server(String),
    /// Non-HTTPS base URL outside localhost
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
    /// The configured base URL could not be parsed at all
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl GatewayError {
    /// Returns true if this error is transient and an idempotent request
    /// may be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::Timeout | GatewayError::Network(_) => true,
            GatewayError::HttpStatus(status) => *status >= 500,
            GatewayError::ResponseTooLarge(_)
            | GatewayError::Parse(_)
            | GatewayError::Server(_)
            | GatewayError::InsecureBaseUrl
            | GatewayError::InvalidBaseUrl(_) => false,
        }
    }
}
