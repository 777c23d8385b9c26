//! Persisted auth token entry.
//!
//! One durable entry on disk: a small JSON file holding the bearer token
//! and its absolute expiry, the file-backed analog of a 7-day cookie.
//! `save`/`clear` are the only writers; `load` is the only reader.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Token lifetime, matching the cookie expiry of the web client
pub const TOKEN_TTL_DAYS: i64 = 7;

/// On-disk token entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    /// Opaque bearer credential
    pub token: String,

    /// Absolute expiry; entries past this point are treated as absent
    pub expires_at: DateTime<Utc>,
}

impl StoredToken {
    /// Whether the entry has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Durable storage for the single auth token entry
pub struct TokenStore {
    /// Path of the token file
    path: PathBuf,
}

impl TokenStore {
    /// Create a token store at a specific path
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Create a token store at the configured default location
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(crate::config::token_path()?))
    }

    /// Path of the token file
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the persisted token, if present and not expired.
    ///
    /// Expired or unreadable entries are removed and reported as absent;
    /// a stale credential must never become the current session.
    pub async fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read token file: {}", self.path.display()))?;

        let stored: StoredToken = match serde_json::from_str(&content) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Discarding unreadable token file: {}", e);
                let _ = fs::remove_file(&self.path).await;
                return Ok(None);
            }
        };

        if stored.is_expired() {
            tracing::debug!("Persisted token expired, removing");
            let _ = fs::remove_file(&self.path).await;
            return Ok(None);
        }

        Ok(Some(stored.token))
    }

    /// Persist a token with a fresh 7-day expiry
    pub async fn save(&self, token: &str) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let stored = StoredToken {
            token: token.to_string(),
            expires_at: Utc::now() + Duration::days(TOKEN_TTL_DAYS),
        };

        let content = serde_json::to_string_pretty(&stored)?;
        fs::write(&self.path, content)
            .await
            .with_context(|| format!("Failed to write token file: {}", self.path.display()))?;

        Ok(())
    }

    /// Remove the persisted entry
    pub async fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .await
                .with_context(|| format!("Failed to remove token file: {}", self.path.display()))?;
        }
        Ok(())
    }
}
