//! Order history client.
//!
//! The list endpoint degrades rather than fails: "no orders" (404), a body
//! that is not a list, and transport failures all come back as an empty list
//! so the caller can still render something. The single-order endpoint keeps
//! "not found" distinct from other failures.

use duka_core::{Email, OrderId, StoreId};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::types::Order;
use super::{ApiClient, ApiError, RawResponse};

/// Client for the order endpoints.
#[derive(Clone)]
pub struct OrdersClient {
    api: ApiClient,
}

impl OrdersClient {
    /// Create a new orders client.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// All orders placed with `email` in `store_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error only for non-404 error statuses or an unusable base
    /// URL. Missing orders, malformed bodies and network failures yield `[]`.
    #[instrument(skip(self, email), fields(store_id = %store_id))]
    pub async fn customer_orders(
        &self,
        store_id: &StoreId,
        email: &Email,
    ) -> Result<Vec<Order>, ApiError> {
        let url = self.api.endpoint(
            &["orders", "customer"],
            &[("email", email.as_str()), ("storeId", store_id.as_str())],
        )?;

        let response = match self.api.get(url).await {
            Ok(response) => response,
            Err(ApiError::Http(e)) => {
                warn!(error = %e, "Network error fetching orders, showing none");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let mut orders = parse_order_list(&response)?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        info!(count = orders.len(), "Loaded customer orders");
        Ok(orders)
    }

    /// A single order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the order does not exist, and other
    /// [`ApiError`] variants for transport, status or parse failures.
    #[instrument(skip(self), fields(store_id = %store_id, order_id = %order_id))]
    pub async fn order(&self, store_id: &StoreId, order_id: &OrderId) -> Result<Order, ApiError> {
        let url = self.api.endpoint(
            &["orders", order_id.as_str()],
            &[("storeId", store_id.as_str())],
        )?;
        let response = self.api.get(url).await?;
        parse_order(&response, order_id)
    }
}

/// Interpret the order list response.
///
/// - 404 → no orders
/// - other error statuses → [`ApiError::Status`]
/// - a body that is not a JSON array → no orders
/// - array entries that do not parse as an [`Order`] are skipped
///
/// # Errors
///
/// Returns [`ApiError::Status`] for error statuses other than 404.
pub fn parse_order_list(response: &RawResponse) -> Result<Vec<Order>, ApiError> {
    if response.status == StatusCode::NOT_FOUND {
        info!("No orders found for customer");
        return Ok(Vec::new());
    }
    if !response.status.is_success() {
        tracing::error!(
            status = %response.status,
            body = %response.body_preview(),
            "Order API returned non-success status"
        );
        return Err(response.status_error());
    }

    let entries = match serde_json::from_str::<Value>(&response.body) {
        Ok(Value::Array(entries)) => entries,
        Ok(other) => {
            warn!(kind = json_kind(&other), "Order list response is not an array");
            return Ok(Vec::new());
        }
        Err(e) => {
            warn!(error = %e, body = %response.body_preview(), "Order list response is not JSON");
            return Ok(Vec::new());
        }
    };

    let total = entries.len();
    let orders: Vec<Order> = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Order>(entry) {
            Ok(order) => Some(order),
            Err(e) => {
                warn!(error = %e, "Skipping malformed order record");
                None
            }
        })
        .collect();

    if orders.len() != total {
        warn!(
            kept = orders.len(),
            skipped = total - orders.len(),
            "Some order records were malformed"
        );
    }

    Ok(orders)
}

/// Interpret the single-order response.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] on 404, [`ApiError::Status`] for other
/// error statuses and [`ApiError::Parse`] for malformed bodies.
pub fn parse_order(response: &RawResponse, order_id: &OrderId) -> Result<Order, ApiError> {
    if response.status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound(format!("order {order_id}")));
    }
    if !response.status.is_success() {
        tracing::error!(
            status = %response.status,
            body = %response.body_preview(),
            "Order API returned non-success status"
        );
        return Err(response.status_error());
    }

    serde_json::from_str(&response.body).map_err(|e| {
        tracing::error!(error = %e, body = %response.body_preview(), "Failed to parse order");
        ApiError::Parse(e)
    })
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use duka_core::DeliveryStatus;

    use super::*;

    const ORDER: &str = r#"{"id":"o1","customerName":"Kamau","deliveryStatus":"delivered","isPaid":true,
        "createdAt":"2025-02-01T10:00:00Z","updatedAt":"2025-02-03T10:00:00Z","orderItems":[],"trackingUpdates":null}"#;

    #[test]
    fn test_list_not_found_is_empty() {
        let response = RawResponse::new(StatusCode::NOT_FOUND, "No orders");
        assert!(parse_order_list(&response).unwrap().is_empty());
    }

    #[test]
    fn test_list_server_error_is_error() {
        let response = RawResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "oops");
        assert!(matches!(
            parse_order_list(&response),
            Err(ApiError::Status { status: 500, .. })
        ));
    }

    #[test]
    fn test_list_non_array_is_empty() {
        for body in [r#"{"orders":[]}"#, "null", "\"nope\"", "<html>"] {
            let response = RawResponse::new(StatusCode::OK, body);
            assert!(parse_order_list(&response).unwrap().is_empty(), "body: {body}");
        }
    }

    #[test]
    fn test_list_skips_malformed_entries() {
        let body = format!(r#"[{ORDER}, {{"id":"broken","createdAt":"never"}}, 42]"#);
        let response = RawResponse::new(StatusCode::OK, body);

        let orders = parse_order_list(&response).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id.as_str(), "o1");
        assert_eq!(orders[0].delivery_status, DeliveryStatus::Delivered);
        assert!(orders[0].tracking_updates.is_empty());
    }

    #[test]
    fn test_single_order_not_found() {
        let response = RawResponse::new(StatusCode::NOT_FOUND, "");
        let err = parse_order(&response, &OrderId::new("o404")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref what) if what == "order o404"));
    }

    #[test]
    fn test_single_order_parses() {
        let response = RawResponse::new(StatusCode::OK, ORDER);
        let order = parse_order(&response, &OrderId::new("o1")).unwrap();
        assert_eq!(order.customer_name, "Kamau");
        assert!(order.is_paid);
    }

    #[tokio::test]
    async fn test_customer_orders_network_error_is_empty() {
        let api = ApiClient::new(&crate::config::ApiConfig {
            base_url: Some(url::Url::parse("http://127.0.0.1:1/api").unwrap()),
            timeout: std::time::Duration::from_secs(2),
        })
        .unwrap();
        let orders = OrdersClient::new(api)
            .customer_orders(&StoreId::new("s1"), &Email::parse("kamau@example.com").unwrap())
            .await
            .unwrap();
        assert!(orders.is_empty());
    }

    #[test]
    fn test_single_order_malformed_is_parse_error() {
        let response = RawResponse::new(StatusCode::OK, "[]");
        assert!(matches!(
            parse_order(&response, &OrderId::new("o1")),
            Err(ApiError::Parse(_))
        ));
    }
}
