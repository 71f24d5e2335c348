//! Configuration file parser for the feed engine.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! All fields carry `#[serde(default)]` semantics so any subset of keys can
//! be specified.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Maximum page size accepted by the recipes API.
const MAX_PAGE_SIZE: u32 = 50;

/// Top-level engine configuration.
///
/// Custom Debug impl masks `session_token` to prevent secret leakage in
/// logs, error messages, and debug output.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the recipes API, e.g. `https://recipes.example.com`.
    pub api_base_url: String,

    /// Recipes requested per page. Clamped to `1..=50`.
    pub page_size: u32,

    /// Delay between a committed search and the fetch it triggers.
    pub search_debounce_ms: u64,

    /// Per-request timeout for gateway calls.
    pub request_timeout_secs: u64,

    /// Session token forwarded to the API host (cookie auth).
    /// The GRAZE_SESSION_TOKEN env var takes precedence over the config file.
    pub session_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            page_size: 12,
            search_debounce_ms: 500,
            request_timeout_secs: 30,
            session_token: None,
        }
    }
}

/// Mask session_token in Debug output to prevent secret leakage.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("page_size", &self.page_size)
            .field("search_debounce_ms", &self.search_debounce_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading to prevent memory exhaustion from a
        // corrupted or maliciously large config file.
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Empty config file, using defaults");
            return Ok(Self::default());
        }

        let mut config: Config = toml::from_str(&contents)?;
        config.normalize();
        Ok(config)
    }

    /// Clamp out-of-range values rather than failing.
    fn normalize(&mut self) {
        let clamped = self.page_size.clamp(1, MAX_PAGE_SIZE);
        if clamped != self.page_size {
            tracing::warn!(
                requested = self.page_size,
                clamped,
                "page_size out of range, clamping"
            );
            self.page_size = clamped;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_config(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "graze-config-test-{}-{}.toml",
            std::process::id(),
            name
        ));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load(Path::new("/nonexistent/graze.toml")).unwrap();
        assert_eq!(config.page_size, 12);
        assert_eq!(config.search_debounce_ms, 500);
        assert!(config.session_token.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let path = write_temp_config("partial", "api_base_url = \"https://api.example.com\"\n");
        let config = Config::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn page_size_is_clamped() {
        let path = write_temp_config("clamp", "page_size = 500\n");
        let config = Config::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let path = write_temp_config("invalid", "api_base_url = [not toml");
        let result = Config::load(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn debug_masks_session_token() {
        let config = Config {
            session_token: Some("super-secret-session".to_string()),
            ..Config::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-session"));
        assert!(debug.contains("[REDACTED]"));
    }
}
