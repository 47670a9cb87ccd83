//! Error types for the messaging extension.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BotError>;

/// Errors that abort an invoke turn.
///
/// "Not signed in" is never one of these; it is answered with an auth prompt.
#[derive(Debug, Error)]
pub enum BotError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Remote service answered with a non-success status
    #[error("{service} returned error status {status}: {body}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    /// Credential acquisition failed
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Inbound activity is missing something the handler needs
    #[error("Invalid activity: {0}")]
    InvalidActivity(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl BotError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    pub fn invalid_activity(message: impl Into<String>) -> Self {
        Self::InvalidActivity(message.into())
    }
}

/// Fail with [`BotError::Status`] unless the response is a success.
pub(crate) async fn ensure_success(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BotError::Status {
        service,
        status,
        body,
    })
}
