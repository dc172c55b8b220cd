//! Error types for the storefront API client.
//!
//! Every remote operation surfaces failures to the caller as an [`ApiError`];
//! nothing in this crate retries or treats a backend failure as fatal.

use thiserror::Error;

/// Errors that can occur when talking to the storefront backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed before a response was produced.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request lacked a valid credential.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The backend rejected the request as invalid (e.g., quantity exceeding
    /// stock, bad coupon code).
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Failed to decode the response body.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors from the local guest-cart persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem read/write failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the snapshot failed.
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors from cart operations, local or remote.
#[derive(Debug, Error)]
pub enum CartError {
    /// The remote call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Persisting the guest snapshot failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("product linen-shirt".to_string());
        assert_eq!(err.to_string(), "Not found: product linen-shirt");

        let err = ApiError::Api {
            status: 502,
            message: "upstream unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 502 - upstream unavailable");
    }

    #[test]
    fn test_cart_error_is_transparent() {
        let err = CartError::from(ApiError::Unauthorized("no session".to_string()));
        assert_eq!(err.to_string(), "Unauthorized: no session");
    }
}
