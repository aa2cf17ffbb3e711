//! Error types for the master-data API boundary

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Local input problem caught before any request is sent.
    #[error("{0}")]
    Validation(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the backend. The message is whatever the
    /// server put in its response body, or a canned fallback.
    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("Unexpected response format")]
    UnexpectedFormat(#[source] serde_json::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    /// True when the error never left the client, so the caller knows no
    /// request was issued.
    pub fn is_local(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }
}
