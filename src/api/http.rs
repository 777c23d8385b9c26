//! reqwest-backed implementation of the Tbooke API.
//!
//! Endpoint layout follows the live service: the token exchange lives at
//! `/login/token` on the site root, everything else under `/api`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::catalog::ContentItem;
use crate::config;
use crate::session::Profile;

use super::{ApiError, TbookeApi};

/// HTTP client for the Tbooke platform
pub struct HttpApi {
    /// Base URL without trailing slash (e.g. https://tbooke.net)
    base_url: String,
    /// HTTP client
    client: reqwest::Client,
}

/// Response from the token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Envelope around the learning-content feed
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    #[serde(default)]
    contents: Vec<ContentItem>,
}

/// Error body some endpoints return alongside 4xx statuses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl HttpApi {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create from the resolved configuration
    pub fn from_config() -> Result<Self> {
        let config = config::config()?;
        Self::new(config.api_base.clone(), config.request_timeout())
    }

    /// Build a URL on the site root
    fn root_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Build a URL under the /api prefix
    fn api_url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// Convert a non-success response into an ApiError, reading the
    /// server message when one is present
    async fn error_from_response(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message);
        ApiError::from_status(status, message)
    }
}

#[async_trait]
impl TbookeApi for HttpApi {
    async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let url = self.root_url("login/token");

        let response = self
            .client
            .get(&url)
            .query(&[("email", email), ("password", password)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let body: TokenResponse = response.json().await?;
        Ok(body.access_token)
    }

    async fn fetch_profile(&self, token: &str) -> Result<Profile, ApiError> {
        let url = self.api_url("profile");

        let response = self.client.get(&url).bearer_auth(token).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let profile: Profile = response.json().await?;
        Ok(profile)
    }

    async fn fetch_contents(&self, token: &str) -> Result<Vec<ContentItem>, ApiError> {
        let url = self.api_url("tbooke-learning");

        let response = self.client.get(&url).bearer_auth(token).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let body: ContentsResponse = response.json().await?;
        Ok(body.contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_layout() {
        let api = HttpApi::new("https://tbooke.net/", Duration::from_secs(10)).unwrap();

        assert_eq!(
            api.root_url("login/token"),
            "https://tbooke.net/login/token"
        );
        assert_eq!(api.api_url("profile"), "https://tbooke.net/api/profile");
        assert_eq!(
            api.api_url("tbooke-learning"),
            "https://tbooke.net/api/tbooke-learning"
        );
    }

    #[test]
    fn test_contents_envelope_tolerates_missing_field() {
        let body: ContentsResponse = serde_json::from_str("{}").unwrap();
        assert!(body.contents.is_empty());
    }
}
