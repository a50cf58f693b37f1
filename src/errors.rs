/*!
 * Error types for the stackling service.
 *
 * This module contains custom error types for different parts of the
 * pipeline, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to the translation provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// The inbound webhook payload was malformed or unsupported; maps to
    /// HTTP 400 and stops processing immediately.
    #[error("Invalid webhook payload: {0}")]
    Validation(String),

    /// A draft/published fetch (or any other CMS call) failed. Carries the
    /// upstream status so the webhook response can propagate it, plus the
    /// URL and a truncated response body for diagnosis.
    #[error("Upstream request failed: {message}")]
    Upstream {
        /// Upstream HTTP status, or 502 when the failure happened below HTTP
        status: u16,
        /// The URL that was being requested
        url: String,
        /// Truncated upstream response body, when one was received
        body: Option<String>,
        /// Human-readable summary
        message: String,
    },

    /// Error from the translation provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// HTTP status code to surface for this error on the webhook response.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Upstream { status, .. } => *status,
            Self::Provider(_) | Self::Config(_) | Self::Unknown(_) => 500,
        }
    }
}

// Utility conversions for error propagation at the boundaries
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}
