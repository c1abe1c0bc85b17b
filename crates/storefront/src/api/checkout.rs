//! Checkout: turn the cart into a payment session.
//!
//! The API prices the order, creates it, and hands back a payment reference
//! for the payment widget. Clearing the cart is the caller's job, and only
//! once the payment provider has confirmed success.

use duka_core::Email;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::{ApiClient, ApiError, RawResponse};
use crate::cart::CheckoutLine;

const DEFAULT_FAILURE_MESSAGE: &str = "Payment failed";

/// Errors that can occur when starting checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to buy.
    #[error("Your cart is empty")]
    EmptyCart,

    /// A required contact or delivery field is blank.
    #[error("Please fill in all required fields ({0} is missing)")]
    MissingField(&'static str),

    /// The email address does not look deliverable.
    #[error("Please enter a valid email")]
    InvalidEmail,

    /// The API refused to start payment.
    #[error("{0}")]
    Rejected(String),

    /// The API could not be reached or answered garbage.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Raw checkout inputs as typed by the customer.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub customer_name: String,
    pub phone: String,
    pub county: String,
    pub address: String,
    pub id_number: String,
    pub email: String,
}

/// Validated checkout inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDetails {
    customer_name: String,
    phone: String,
    county: String,
    address: String,
    id_number: String,
    email: Email,
}

impl CheckoutDetails {
    /// Validate a form. Fields are trimmed; every field is required.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidEmail`] or
    /// [`CheckoutError::MissingField`] naming the first blank field.
    pub fn new(form: &CheckoutForm) -> Result<Self, CheckoutError> {
        let email = Email::parse(&form.email).map_err(|_| CheckoutError::InvalidEmail)?;

        let required = |value: &str, name: &'static str| {
            let value = value.trim();
            if value.is_empty() {
                Err(CheckoutError::MissingField(name))
            } else {
                Ok(value.to_string())
            }
        };

        Ok(Self {
            customer_name: required(&form.customer_name, "full name")?,
            phone: required(&form.phone, "phone number")?,
            county: required(&form.county, "county")?,
            address: required(&form.address, "address")?,
            id_number: required(&form.id_number, "ID number")?,
            email,
        })
    }

    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    #[must_use]
    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }
}

/// Request body for `POST /checkout`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest<'a> {
    pub items: &'a [CheckoutLine],
    pub customer_email: &'a str,
    pub phone: &'a str,
    pub address: &'a str,
    pub county: &'a str,
    pub customer_name: &'a str,
    pub id_number: &'a str,
}

impl<'a> CheckoutRequest<'a> {
    #[must_use]
    pub fn new(items: &'a [CheckoutLine], details: &'a CheckoutDetails) -> Self {
        Self {
            items,
            customer_email: details.email.as_str(),
            phone: &details.phone,
            address: &details.address,
            county: &details.county,
            customer_name: &details.customer_name,
            id_number: &details.id_number,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct CheckoutResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    reference: Option<String>,
    #[serde(default)]
    amount: Option<Decimal>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// A payment ready to be completed with the payment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
    /// Provider transaction reference.
    pub reference: String,
    /// Amount in the currency's minor unit, as the payment widget expects.
    pub amount: Decimal,
    /// Email the provider will send the receipt to.
    pub email: String,
}

impl PaymentSession {
    /// The amount in the currency's standard unit.
    #[must_use]
    pub fn major_amount(&self) -> Decimal {
        self.amount / Decimal::ONE_HUNDRED
    }
}

/// Client for the checkout endpoint.
#[derive(Clone)]
pub struct CheckoutClient {
    api: ApiClient,
}

impl CheckoutClient {
    /// Create a new checkout client.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Submit the cart lines and customer details, returning a payment session.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] without calling the API if `lines`
    /// is empty, [`CheckoutError::Rejected`] if the API declines, and
    /// [`CheckoutError::Api`] for transport failures.
    #[instrument(skip_all, fields(lines = lines.len()))]
    pub async fn start(
        &self,
        lines: &[CheckoutLine],
        details: &CheckoutDetails,
    ) -> Result<PaymentSession, CheckoutError> {
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let url = self.api.endpoint(&["checkout"], &[])?;
        let request = CheckoutRequest::new(lines, details);
        let response = self.api.post_json(url, &request).await?;

        let session = parse_checkout_response(&response)?;
        info!(reference = %session.reference, "Checkout session created");
        Ok(session)
    }
}

/// Interpret the checkout response.
///
/// Success requires a 2xx status, `success: true`, a reference and an amount.
/// Anything else becomes [`CheckoutError::Rejected`] carrying the API's
/// `error` message, or a generic message when there is none.
///
/// # Errors
///
/// Returns [`CheckoutError::Rejected`] as described above.
pub fn parse_checkout_response(response: &RawResponse) -> Result<PaymentSession, CheckoutError> {
    let body: CheckoutResponse = serde_json::from_str(&response.body).unwrap_or_else(|e| {
        warn!(
            error = %e,
            status = %response.status,
            body = %response.body_preview(),
            "Checkout response is not JSON"
        );
        CheckoutResponse::default()
    });

    let rejected = |body: CheckoutResponse| {
        let message = body
            .error
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
        CheckoutError::Rejected(message)
    };

    if !response.status.is_success() {
        if response.status.is_server_error() || response.status == StatusCode::TOO_MANY_REQUESTS {
            tracing::error!(status = %response.status, "Checkout API returned error status");
        }
        return Err(rejected(body));
    }

    match body {
        CheckoutResponse {
            success: true,
            reference: Some(reference),
            amount: Some(amount),
            email,
            ..
        } => Ok(PaymentSession {
            reference,
            amount,
            email: email.unwrap_or_default(),
        }),
        other => Err(rejected(other)),
    }
}
