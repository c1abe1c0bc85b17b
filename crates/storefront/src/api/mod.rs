//! Storefront API clients.
//!
//! # Architecture
//!
//! - The external API owns catalog, pricing, checkout and order state - the
//!   client never caches anything authoritative except catalog reads
//! - Plain JSON over `reqwest`; bodies are read as text first so failures can
//!   be logged with the payload that caused them
//! - Response interpretation lives in pure `parse_*` functions that take a
//!   [`RawResponse`], so every status/body combination is testable offline
//!
//! # Clients
//!
//! - [`CatalogClient`] - products and categories (cached for 5 minutes)
//! - [`CheckoutClient`] - starts a payment session for the cart
//! - [`OrdersClient`] - a customer's order history and single orders
//!
//! # Example
//!
//! ```rust,ignore
//! let api = ApiClient::new(&config.api)?;
//! let orders = OrdersClient::new(api.clone());
//!
//! let history = orders.customer_orders(&store_id, &email).await?;
//! ```

mod cache;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod types;

use std::sync::Arc;

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::config::ApiConfig;

pub use catalog::CatalogClient;
pub use checkout::{CheckoutClient, CheckoutDetails, CheckoutError, CheckoutForm, PaymentSession};
pub use orders::OrdersClient;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Maximum number of body characters kept in logs and error messages.
const BODY_PREVIEW_CHARS: usize = 500;

/// Errors that can occur when talking to the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No API base URL is configured.
    #[error("API URL not configured (set DUKA_API_URL)")]
    NotConfigured,

    /// An endpoint URL could not be built.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error: {status} - {body}")]
    Status { status: u16, body: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether this error points at the API or the network rather than at the
    /// caller's input.
    #[must_use]
    pub const fn is_server_side(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. } | Self::Parse(_))
    }
}

/// Status and body text of an API response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The first few hundred characters of the body, for logs.
    #[must_use]
    pub fn body_preview(&self) -> String {
        self.body.chars().take(BODY_PREVIEW_CHARS).collect()
    }

    /// Convert a non-success status into [`ApiError::Status`].
    #[must_use]
    pub fn status_error(&self) -> ApiError {
        ApiError::Status {
            status: self.status.as_u16(),
            body: self.body_preview(),
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Shared HTTP plumbing for the storefront API clients.
///
/// Cheaply cloneable; all clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the configured API.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotConfigured`] if no base URL is set, or an HTTP
    /// error if the underlying client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = config.base_url.clone().ok_or(ApiError::NotConfigured)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("duka/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner { client, base_url }),
        })
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build `{base}/{segments...}?{query...}`.
    ///
    /// Segments are percent-encoded, so ids can be passed through verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the base URL cannot take path segments.
    pub fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// `GET` a URL and return its status and body.
    pub(crate) async fn get(&self, url: Url) -> Result<RawResponse, ApiError> {
        let request = self.inner.client.get(url);
        self.send(request).await
    }

    /// `POST` a JSON body and return the status and body.
    pub(crate) async fn post_json<T: Serialize + Sync>(
        &self,
        url: Url,
        body: &T,
    ) -> Result<RawResponse, ApiError> {
        let request = self.inner.client.post(url).json(body);
        self.send(request).await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<RawResponse, ApiError> {
        let request_id = Uuid::new_v4().to_string();

        let response = request
            .header(REQUEST_ID_HEADER, &request_id)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        debug!(
            request_id = %request_id,
            status = %status,
            bytes = body.len(),
            "API response received"
        );

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn config(base: Option<&str>) -> ApiConfig {
        ApiConfig {
            base_url: base.map(|b| Url::parse(b).unwrap()),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_new_requires_base_url() {
        assert!(matches!(
            ApiClient::new(&config(None)),
            Err(ApiError::NotConfigured)
        ));
    }

    #[test]
    fn test_new_rejects_non_base_url() {
        assert!(matches!(
            ApiClient::new(&config(Some("mailto:shop@example.com"))),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_endpoint_joins_segments_and_query() {
        let api = ApiClient::new(&config(Some("https://api.example.com/api/store-1/"))).unwrap();

        let url = api
            .endpoint(&["orders", "customer"], &[("email", "a+b@example.com"), ("storeId", "s 1")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/api/store-1/orders/customer?email=a%2Bb%40example.com&storeId=s+1"
        );
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let api = ApiClient::new(&config(Some("https://api.example.com"))).unwrap();
        let url = api.endpoint(&["orders", "a/b"], &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/orders/a%2Fb");
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("order ord_1".to_string());
        assert_eq!(err.to_string(), "Not found: order ord_1");

        let err = ApiError::Status {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 500 - boom");
        assert!(err.is_server_side());
        assert!(!ApiError::NotConfigured.is_server_side());
    }

    #[test]
    fn test_body_preview_truncates() {
        let response = RawResponse::new(StatusCode::OK, "x".repeat(2000));
        assert_eq!(response.body_preview().len(), BODY_PREVIEW_CHARS);
    }
}
