//! Domain types for the storefront API.
//!
//! Field names follow the API's camelCase JSON. Timestamps are normalized to
//! `DateTime<Utc>` on receipt, whatever form the server sent them in.

use chrono::{DateTime, NaiveDateTime, Utc};
use duka_core::{BillboardId, CategoryId, DeliveryStatus, OrderId, OrderItemId, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Image Types
// =============================================================================

/// Product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
}

impl Image {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

// =============================================================================
// Catalog Types
// =============================================================================

/// A named product attribute such as a size or a color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<Image>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub size: Option<ProductOption>,
    #[serde(default)]
    pub color: Option<ProductOption>,
}

impl Product {
    /// A product with only the fields the cart snapshots.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            images: Vec::new(),
            category: None,
            is_featured: false,
            is_archived: false,
            size: None,
            color: None,
        }
    }

    /// The first image, used as the thumbnail.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&Image> {
        self.images.first()
    }
}

/// Hero banner attached to a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Billboard {
    pub id: BillboardId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub image_url: String,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub billboard: Option<Billboard>,
}

/// Filters for the product listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    pub category_id: Option<CategoryId>,
    pub is_featured: Option<bool>,
}

// =============================================================================
// Order Types
// =============================================================================

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub quantity: u32,
    pub product: Product,
}

/// A delivery progress entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingUpdate {
    pub id: String,
    pub status: DeliveryStatus,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

/// A placed order as returned by the order API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub county: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub tracking_id: Option<String>,
    #[serde(default)]
    pub delivery_status: DeliveryStatus,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub order_items: Vec<OrderItem>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tracking_updates: Vec<TrackingUpdate>,
}

impl Order {
    /// Sum of product price times quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.order_items
            .iter()
            .map(|item| item.product.price * Decimal::from(item.quantity))
            .sum()
    }

    /// Total number of units ordered.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.order_items
            .iter()
            .map(|item| u64::from(item.quantity))
            .sum()
    }

    /// The most recent tracking update, if any.
    #[must_use]
    pub fn latest_update(&self) -> Option<&TrackingUpdate> {
        self.tracking_updates.iter().max_by_key(|u| u.timestamp)
    }
}

// =============================================================================
// Serde Helpers
// =============================================================================

/// Treat an explicit `null` list the same as a missing one.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse a server timestamp string.
///
/// Accepts RFC 3339 (`2025-03-01T09:30:00.000Z`, `+03:00` offsets) and
/// offset-less ISO datetimes, which are taken as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        FractionalMillis(f64),
        Text(String),
    }

    // Fractional millis truncate toward zero, as JavaScript dates do.
    #[allow(clippy::cast_possible_truncation)]
    fn from_fractional_millis(ms: f64) -> Option<DateTime<Utc>> {
        const LIMIT: f64 = 8.64e15;
        if !ms.is_finite() || ms.abs() > LIMIT {
            return None;
        }
        DateTime::from_timestamp_millis(ms.trunc() as i64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Millis(ms) => DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {ms}"))),
            Raw::FractionalMillis(ms) => from_fractional_millis(ms)
                .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {ms}"))),
            Raw::Text(text) => super::parse_timestamp(&text)
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {text}"))),
        }
    }
}
