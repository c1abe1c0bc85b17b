//! Application state shared across commands.

use std::sync::Arc;

use tracing::info;

use crate::api::{ApiClient, ApiError, CatalogClient, CheckoutClient, OrdersClient};
use crate::cart::{CartStore, FileStorage};
use crate::config::StorefrontConfig;

/// Application state shared across all commands.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the API clients. The clients are only built when an API
/// URL is configured; cart commands work without one.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    clients: Option<Clients>,
}

struct Clients {
    catalog: CatalogClient,
    checkout: CheckoutClient,
    orders: OrdersClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if an API URL is configured but the HTTP client
    /// cannot be built from it.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let clients = match ApiClient::new(&config.api) {
            Ok(api) => {
                info!(base_url = %api.base_url(), "Storefront API configured");
                Some(Clients {
                    catalog: CatalogClient::new(api.clone()),
                    checkout: CheckoutClient::new(api.clone()),
                    orders: OrdersClient::new(api),
                })
            }
            Err(ApiError::NotConfigured) => None,
            Err(e) => return Err(e),
        };

        Ok(Self {
            inner: Arc::new(AppStateInner { config, clients }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the catalog client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotConfigured`] if no API URL is set.
    pub fn catalog(&self) -> Result<&CatalogClient, ApiError> {
        self.clients().map(|c| &c.catalog)
    }

    /// Get the checkout client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotConfigured`] if no API URL is set.
    pub fn checkout(&self) -> Result<&CheckoutClient, ApiError> {
        self.clients().map(|c| &c.checkout)
    }

    /// Get the orders client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotConfigured`] if no API URL is set.
    pub fn orders(&self) -> Result<&OrdersClient, ApiError> {
        self.clients().map(|c| &c.orders)
    }

    /// Open the customer's cart from the configured data directory.
    #[must_use]
    pub fn open_cart(&self) -> CartStore<FileStorage> {
        CartStore::open(FileStorage::new(&self.inner.config.data_dir))
    }

    fn clients(&self) -> Result<&Clients, ApiError> {
        self.inner.clients.as_ref().ok_or(ApiError::NotConfigured)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use url::Url;

    use super::*;
    use crate::config::ApiConfig;

    fn config(base_url: Option<&str>, data_dir: PathBuf) -> StorefrontConfig {
        StorefrontConfig {
            api: ApiConfig {
                base_url: base_url.map(|u| Url::parse(u).unwrap()),
                ..ApiConfig::default()
            },
            store_id: None,
            data_dir,
            currency: duka_core::CurrencyCode::KES,
            paystack_public_key: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_clients_require_api_url() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(config(None, dir.path().to_path_buf())).unwrap();

        assert!(matches!(state.catalog(), Err(ApiError::NotConfigured)));
        assert!(matches!(state.orders(), Err(ApiError::NotConfigured)));
        assert!(state.open_cart().is_empty());
    }

    #[test]
    fn test_clients_available_with_api_url() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(config(
            Some("https://api.example.com"),
            dir.path().to_path_buf(),
        ))
        .unwrap();

        assert!(state.catalog().is_ok());
        assert!(state.checkout().is_ok());
        assert!(state.orders().is_ok());
    }

    #[test]
    fn test_open_cart_persists_to_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(config(None, dir.path().to_path_buf())).unwrap();

        let product = crate::api::types::Product::new(
            duka_core::ProductId::new("p1"),
            "Servo",
            rust_decimal::Decimal::from(450),
        );
        let _ = state.open_cart().add_item(&product);

        let reopened = state.open_cart();
        assert_eq!(reopened.total_quantity(), 1);
        assert!(dir.path().join("cart-storage.json").exists());
    }
}
