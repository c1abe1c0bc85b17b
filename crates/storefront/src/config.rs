//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `DUKA_API_URL` - Base URL of the storefront API (required by API commands)
//! - `DUKA_STORE_ID` - Store identifier (required by order commands)
//! - `DUKA_DATA_DIR` - Directory holding the cart slot (default: platform data dir + `/duka`)
//! - `DUKA_HTTP_TIMEOUT_SECS` - HTTP request timeout (default: 15)
//! - `DUKA_CURRENCY` - Display currency (default: KES)
//! - `PAYSTACK_PUBLIC_KEY` - Payment widget public key
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use duka_core::{CurrencyCode, StoreId};
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DATA_DIR_NAME: &str = "duka";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("No data directory available; set DUKA_DATA_DIR")]
    NoDataDir,
}

/// HTTP settings shared by every API client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL all endpoints are joined onto
    pub base_url: Option<Url>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Storefront API settings
    pub api: ApiConfig,
    /// Store the customer is shopping in
    pub store_id: Option<StoreId>,
    /// Directory holding the persisted cart
    pub data_dir: PathBuf,
    /// Currency prices are displayed in
    pub currency: CurrencyCode,
    /// Payment widget public key (safe to expose)
    pub paystack_public_key: Option<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid, or if no data
    /// directory can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`StorefrontConfig::from_env`].
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = get("DUKA_API_URL")
            .map(|raw| {
                Url::parse(raw.trim()).map_err(|e| {
                    ConfigError::InvalidEnvVar("DUKA_API_URL".to_string(), e.to_string())
                })
            })
            .transpose()?;

        let timeout_secs = match get("DUKA_HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => {
                    return Err(ConfigError::InvalidEnvVar(
                        "DUKA_HTTP_TIMEOUT_SECS".to_string(),
                        "must be at least 1 second".to_string(),
                    ));
                }
                Ok(secs) => secs,
                Err(e) => {
                    return Err(ConfigError::InvalidEnvVar(
                        "DUKA_HTTP_TIMEOUT_SECS".to_string(),
                        e.to_string(),
                    ));
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let currency = match get("DUKA_CURRENCY") {
            Some(raw) => raw.parse::<CurrencyCode>().map_err(|e| {
                ConfigError::InvalidEnvVar("DUKA_CURRENCY".to_string(), e.to_string())
            })?,
            None => CurrencyCode::default(),
        };

        let data_dir = match get("DUKA_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        Ok(Self {
            api: ApiConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            store_id: get("DUKA_STORE_ID").map(|id| StoreId::new(id.trim())),
            data_dir,
            currency,
            paystack_public_key: get("PAYSTACK_PUBLIC_KEY"),
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
        })
    }

    /// The store id, or an error naming the variable to set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] if `DUKA_STORE_ID` is unset.
    pub fn require_store_id(&self) -> Result<&StoreId, ConfigError> {
        self.store_id
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("DUKA_STORE_ID".to_string()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// The platform data directory joined with `duka`.
fn default_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|dir| dir.join(DATA_DIR_NAME))
        .ok_or(ConfigError::NoDataDir)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let mut vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        vars.entry("DUKA_DATA_DIR".to_string())
            .or_insert_with(|| "/tmp/duka-test".to_string());
        StorefrontConfig::from_vars(move |key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert!(config.api.base_url.is_none());
        assert_eq!(config.api.timeout, Duration::from_secs(15));
        assert_eq!(config.currency, CurrencyCode::KES);
        assert!(config.store_id.is_none());
        assert_eq!(config.data_dir, PathBuf::from("/tmp/duka-test"));
    }

    #[test]
    fn test_full_config() {
        let config = load(&[
            ("DUKA_API_URL", "https://api.example.com/api/store-1"),
            ("DUKA_STORE_ID", " store-1 "),
            ("DUKA_HTTP_TIMEOUT_SECS", "30"),
            ("DUKA_CURRENCY", "usd"),
            ("PAYSTACK_PUBLIC_KEY", "pk_test_abc"),
        ])
        .unwrap();

        assert_eq!(
            config.api.base_url.unwrap().as_str(),
            "https://api.example.com/api/store-1"
        );
        assert_eq!(config.store_id.unwrap().as_str(), "store-1");
        assert_eq!(config.api.timeout, Duration::from_secs(30));
        assert_eq!(config.currency, CurrencyCode::USD);
        assert_eq!(config.paystack_public_key.as_deref(), Some("pk_test_abc"));
    }

    #[test]
    fn test_invalid_url() {
        let err = load(&[("DUKA_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "DUKA_API_URL"));
    }

    #[test]
    fn test_invalid_timeout() {
        let err = load(&[("DUKA_HTTP_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "DUKA_HTTP_TIMEOUT_SECS"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = load(&[("DUKA_HTTP_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "DUKA_HTTP_TIMEOUT_SECS"));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = load(&[("DUKA_STORE_ID", "  "), ("SENTRY_DSN", "")]).unwrap();
        assert!(config.store_id.is_none());
        assert!(config.sentry_dsn.is_none());
        assert!(matches!(
            config.require_store_id(),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }
}
