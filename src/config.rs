//! Configuration for the tbooke client.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (TBOOKE_API_BASE, TBOOKE_HOME, TBOOKE_TIMEOUT_SECS)
//! 2. Config file (.tbooke/config.yaml)
//! 3. Defaults (https://tbooke.net, ~/.tbooke)
//!
//! Config file discovery:
//! - Searches current directory and parents for .tbooke/config.yaml
//! - Paths in config file are relative to the config file's parent directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub api: Option<ApiConfig>,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    /// API base URL (e.g. https://tbooke.net)
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Client state directory (relative to config file)
    pub home: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// API base URL without trailing slash
    pub api_base: String,
    /// Absolute path to tbooke home (client state)
    pub home: PathBuf,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Path of the persisted auth token entry
    pub fn token_path(&self) -> PathBuf {
        self.home.join("auth_token.json")
    }

    /// Resolve a server storage reference (thumbnails, avatars) to a full URL
    pub fn storage_url(&self, reference: &str) -> String {
        format!(
            "{}/storage/{}",
            self.api_base,
            reference.trim_start_matches('/')
        )
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".tbooke").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Strip any trailing slash so URL joins stay predictable
fn normalize_base(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    // Default home directory
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".tbooke");

    // Check for config file
    let config_file = find_config_file();

    let (api_base, home, timeout_seconds) = if let Some(ref config_path) = config_file {
        // Config file found - use it as base
        let config = load_config_file(config_path)?;

        let api_base = if let Ok(env_base) = std::env::var("TBOOKE_API_BASE") {
            normalize_base(&env_base)
        } else if let Some(base) = config.api.as_ref().and_then(|a| a.base_url.clone()) {
            normalize_base(&base)
        } else {
            "https://tbooke.net".to_string()
        };

        // Resolve home path
        let home = if let Ok(env_home) = std::env::var("TBOOKE_HOME") {
            PathBuf::from(env_home)
        } else if let Some(ref home_path) = config.paths.home {
            // home is relative to the .tbooke/ directory
            let tbooke_dir = config_path.parent().unwrap_or(Path::new("."));
            resolve_path(tbooke_dir, home_path)
        } else {
            default_home.clone()
        };

        let timeout_seconds = std::env::var("TBOOKE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .or_else(|| config.api.as_ref().and_then(|a| a.timeout_seconds))
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        (api_base, home, timeout_seconds)
    } else {
        // No config file - use env vars or defaults
        let api_base = std::env::var("TBOOKE_API_BASE")
            .map(|b| normalize_base(&b))
            .unwrap_or_else(|_| "https://tbooke.net".to_string());

        let home = std::env::var("TBOOKE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_home.clone());

        let timeout_seconds = std::env::var("TBOOKE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        (api_base, home, timeout_seconds)
    };

    Ok(ResolvedConfig {
        api_base,
        home,
        timeout_seconds,
        config_file,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

// ============================================================================
// Convenience functions
// ============================================================================

/// Get the tbooke home directory (client state).
pub fn tbooke_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}

/// Get the API base URL
pub fn api_base() -> Result<String> {
    Ok(config()?.api_base.clone())
}

/// Get the persisted token path ($TBOOKE_HOME/auth_token.json)
pub fn token_path() -> Result<PathBuf> {
    Ok(config()?.token_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let tbooke_dir = temp.path().join(".tbooke");
        std::fs::create_dir_all(&tbooke_dir).unwrap();

        let config_path = tbooke_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
api:
  base_url: https://staging.tbooke.net/
  timeout_seconds: 20
paths:
  home: ./
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1.0");
        let api = config.api.unwrap();
        assert_eq!(
            api.base_url,
            Some("https://staging.tbooke.net/".to_string())
        );
        assert_eq!(api.timeout_seconds, Some(20));
        assert_eq!(config.paths.home, Some("./".to_string()));
    }

    #[test]
    fn test_normalize_base_strips_trailing_slash() {
        assert_eq!(normalize_base("https://tbooke.net/"), "https://tbooke.net");
        assert_eq!(normalize_base("https://tbooke.net"), "https://tbooke.net");
    }

    #[test]
    fn test_storage_url() {
        let config = ResolvedConfig {
            api_base: "https://tbooke.net".to_string(),
            home: PathBuf::from("/test/.tbooke"),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            config_file: None,
        };

        assert_eq!(
            config.storage_url("thumbnails/abc.jpg"),
            "https://tbooke.net/storage/thumbnails/abc.jpg"
        );
        assert_eq!(
            config.storage_url("/thumbnails/abc.jpg"),
            "https://tbooke.net/storage/thumbnails/abc.jpg"
        );
    }

    #[test]
    fn test_token_path_under_home() {
        let config = ResolvedConfig {
            api_base: "https://tbooke.net".to_string(),
            home: PathBuf::from("/test/.tbooke"),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            config_file: None,
        };

        assert_eq!(
            config.token_path(),
            PathBuf::from("/test/.tbooke/auth_token.json")
        );
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
        // Non-existent relative paths fall back to plain join
        assert_eq!(
            resolve_path(&base, "./state"),
            PathBuf::from("/home/user/project/./state")
        );
    }
}
