//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_STORAGE_DIR` - Directory holding the cart files (default: .go-marketplace)
//! - `CART_STORAGE_KEY` - Storage key of the cart (default: @GoMarketplace:products)
//! - `CART_LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;

use go_marketplace_cart::DEFAULT_STORAGE_KEY;
use thiserror::Error;

const DEFAULT_STORAGE_DIR: &str = ".go-marketplace";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("expected `text` or `json`, got `{s}`")),
        }
    }
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory the file store writes to
    pub storage_dir: PathBuf,
    /// Key the cart is stored under
    pub storage_key: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_dir = PathBuf::from(
            non_empty(lookup("CART_STORAGE_DIR")).unwrap_or_else(|| DEFAULT_STORAGE_DIR.into()),
        );
        let storage_key = non_empty(lookup("CART_STORAGE_KEY"))
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
        let log_format = match non_empty(lookup("CART_LOG_FORMAT")) {
            Some(value) => value
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::InvalidEnvVar("CART_LOG_FORMAT".to_string(), e))?,
            None => LogFormat::default(),
        };
        let sentry_dsn = non_empty(lookup("SENTRY_DSN"));

        Ok(Self {
            storage_dir,
            storage_key,
            log_format,
            sentry_dsn,
        })
    }

    /// Apply command-line overrides.
    #[must_use]
    pub fn with_overrides(
        mut self,
        storage_dir: Option<PathBuf>,
        storage_key: Option<String>,
    ) -> Self {
        if let Some(dir) = storage_dir {
            self.storage_dir = dir;
        }
        if let Some(key) = storage_key {
            self.storage_key = key;
        }
        self
    }
}

/// Treat empty variables as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<CliConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CliConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.storage_dir, PathBuf::from(".go-marketplace"));
        assert_eq!(config.storage_key, "@GoMarketplace:products");
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_values_from_env() {
        let config = config_from(&[
            ("CART_STORAGE_DIR", "/var/lib/cart"),
            ("CART_STORAGE_KEY", "@Test:cart"),
            ("CART_LOG_FORMAT", "JSON"),
            ("SENTRY_DSN", "https://key@sentry.example.com/1"),
        ])
        .unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("/var/lib/cart"));
        assert_eq!(config.storage_key, "@Test:cart");
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let config = config_from(&[("CART_STORAGE_KEY", ""), ("SENTRY_DSN", " ")]).unwrap();
        assert_eq!(config.storage_key, "@GoMarketplace:products");
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_log_format() {
        let err = config_from(&[("CART_LOG_FORMAT", "xml")]).unwrap_err();
        assert!(err.to_string().contains("CART_LOG_FORMAT"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[])
            .unwrap()
            .with_overrides(Some(PathBuf::from("/tmp/x")), None);
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/x"));
        assert_eq!(config.storage_key, "@GoMarketplace:products");
    }
}
