//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for everything a storefront command can
//! fail with. The binary calls [`AppError::report`] once, at the top, before
//! exiting.

use thiserror::Error;

use crate::api::{ApiError, CheckoutError};
use crate::config::ConfigError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storefront API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Checkout could not be started.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether the failure lies outside the user's control and should be
    /// reported to Sentry.
    #[must_use]
    pub const fn is_server_side(&self) -> bool {
        match self {
            Self::Api(err) | Self::Checkout(CheckoutError::Api(err)) => err.is_server_side(),
            Self::Config(_) | Self::Checkout(_) | Self::BadRequest(_) => false,
        }
    }

    /// Message suitable for showing to the customer.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(ApiError::NotFound(what)) => {
                format!("Not found: {what}")
            }
            Self::Api(ApiError::NotConfigured) | Self::Config(_) | Self::BadRequest(_) => {
                self.to_string()
            }
            Self::Api(_) | Self::Checkout(CheckoutError::Api(_)) => {
                "The store is unreachable right now. Please try again.".to_string()
            }
            Self::Checkout(err) => err.to_string(),
        }
    }

    /// Capture server-side errors to Sentry and log them.
    pub fn report(&self) {
        if self.is_server_side() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command error"
            );
        } else {
            tracing::debug!(error = %self, "Command rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from the customer's email.
///
/// Call this once the customer has identified themselves (checkout, order
/// lookup) to associate errors with them.
pub fn set_sentry_user(email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Product added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
