//! Order delivery status.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Delivery progress of an order, as reported by the order API.
///
/// The API sends free-form strings (`"order_received"`, `"In Transit"`, ...).
/// Known values are matched case-insensitively; anything else is kept verbatim
/// in [`DeliveryStatus::Other`] so it can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DeliveryStatus {
    #[default]
    OrderReceived,
    Processing,
    InTransit,
    Delivered,
    Other(String),
}

impl DeliveryStatus {
    /// Classify a raw status string from the API.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "order_received" | "order received" | "order confirmed" | "order_confirmed" => {
                Self::OrderReceived
            }
            "processing" => Self::Processing,
            "shipped" | "in transit" | "in_transit" => Self::InTransit,
            "delivered" => Self::Delivered,
            _ => Self::Other(raw.to_owned()),
        }
    }

    /// Wire representation sent back to the API.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::OrderReceived => "order_received",
            Self::Processing => "processing",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Other(raw) => raw,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::OrderReceived => "Order received",
            Self::Processing => "Processing",
            Self::InTransit => "In transit",
            Self::Delivered => "Delivered",
            Self::Other(raw) => raw,
        }
    }

    /// Whether the order has reached the customer.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for DeliveryStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DeliveryStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_statuses() {
        assert_eq!(DeliveryStatus::parse("order_received"), DeliveryStatus::OrderReceived);
        assert_eq!(DeliveryStatus::parse("Order Confirmed"), DeliveryStatus::OrderReceived);
        assert_eq!(DeliveryStatus::parse("PROCESSING"), DeliveryStatus::Processing);
        assert_eq!(DeliveryStatus::parse("shipped"), DeliveryStatus::InTransit);
        assert_eq!(DeliveryStatus::parse("In Transit"), DeliveryStatus::InTransit);
        assert_eq!(DeliveryStatus::parse(" delivered "), DeliveryStatus::Delivered);
    }

    #[test]
    fn test_parse_unknown_keeps_raw() {
        let status = DeliveryStatus::parse("Awaiting pickup");
        assert_eq!(status, DeliveryStatus::Other("Awaiting pickup".to_string()));
        assert_eq!(status.label(), "Awaiting pickup");
        assert!(!status.is_final());
    }

    #[test]
    fn test_serde_uses_raw_strings() {
        let status: DeliveryStatus = serde_json::from_str("\"Delivered\"").unwrap();
        assert!(status.is_final());
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"delivered\"");
    }
}
