//! Remote API interface for the Tbooke platform.
//!
//! The [`TbookeApi`] trait is the seam between the client state machines
//! (session, catalog) and the network; [`HttpApi`] is the reqwest-backed
//! implementation.

pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::ContentItem;
use crate::session::Profile;

// Re-export the HTTP implementation
pub use http::HttpApi;

/// Errors surfaced by API calls
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// No response reached the server
    #[error("Network error: could not reach the server")]
    Network,

    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// HTTP 401 - invalid or expired credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// HTTP 400 - server rejected the request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP 5xx - server-side failure
    #[error("Server error (HTTP {0})")]
    Server(u16),

    /// Client-side input validation, never reaches the network
    #[error("{0}")]
    Validation(String),

    /// Response body did not match the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Map an HTTP status (plus optional server-provided message) to an error
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            400 => ApiError::BadRequest(message.unwrap_or_else(|| "Invalid request".to_string())),
            s => ApiError::Server(s),
        }
    }

    /// True for errors worth retrying by user action (connectivity, server load)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Network | ApiError::Timeout | ApiError::Server(_)
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network
        }
    }
}

/// Remote API operations used by the client
#[async_trait]
pub trait TbookeApi: Send + Sync {
    /// Exchange credentials for a bearer token
    async fn login(&self, email: &str, password: &str) -> Result<String, ApiError>;

    /// Fetch the authenticated user's profile
    async fn fetch_profile(&self, token: &str) -> Result<Profile, ApiError>;

    /// Fetch the full learning-content feed
    async fn fetch_contents(&self, token: &str) -> Result<Vec<ContentItem>, ApiError>;
}
