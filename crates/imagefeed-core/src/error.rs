//! Error types for imagefeed-core

use thiserror::Error;

/// Result type alias using imagefeed-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in imagefeed-core operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An authenticated call was attempted without a stored bearer token
    #[error("No access token is stored; sign in first")]
    MissingToken,

    /// The same authorization code was submitted while its exchange was still running
    #[error("Authorization code was already submitted")]
    DuplicateCode,

    /// Transport failure or non-success status
    #[error("Network request failed: {0}")]
    Network(#[from] NetworkFailure),

    /// Response body did not match the expected schema
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// URL or request could not be constructed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Platform secret store failure
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

/// Underlying cause of a [`Error::Network`] failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkFailure {
    /// The request never produced an HTTP response
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The request was superseded before it completed
    #[error("request was cancelled")]
    Cancelled,
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(error: url::ParseError) -> Self {
        Self::InvalidRequest(error.to_string())
    }
}
