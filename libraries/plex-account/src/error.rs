//! Error types for the Plex.tv account client.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when talking to the Plex.tv API.
#[derive(Error, Debug)]
pub enum AccountError {
    /// The API answered with a non-2xx status.
    ///
    /// `response` holds the decoded error body: JSON when the body is JSON,
    /// the XML tree in JSON form when it is XML, otherwise the raw text.
    #[error("Plex.tv returned HTTP {status}: {response}")]
    Http { status: u16, response: Value },

    /// A successful response carried a body that is not valid JSON
    #[error("Failed to decode JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// A successful response carried a body that is not valid XML
    #[error("Failed to decode XML response: {0}")]
    Xml(String),

    /// Sign-in succeeded but the user record had no token
    #[error("Sign-in response did not contain an auth token")]
    MissingToken,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    Unreachable(String),

    /// Invalid base URL
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AccountError {
    /// HTTP status of a rejected request, if this is an HTTP failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Decoded error body of a rejected request, if this is an HTTP failure.
    pub fn response(&self) -> Option<&Value> {
        match self {
            Self::Http { response, .. } => Some(response),
            _ => None,
        }
    }
}

/// Result type for account operations.
pub type Result<T> = std::result::Result<T, AccountError>;
