//! Cart snapshot encoding and the load/save contract.
//!
//! The slot holds a versioned envelope:
//!
//! ```json
//! {"state":{"items":[{"id":"p1","name":"Arduino Uno","price":"1500","images":[{"url":"..."}],"quantity":2}]},"version":0}
//! ```
//!
//! Loading never fails: a missing, unreadable, malformed or newer-version slot
//! gives an empty cart. Saving never fails either: errors are logged and the
//! in-memory cart stays authoritative for the rest of the process.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::storage::CartStorage;
use super::{CartLineItem, CartState};

/// Name of the slot holding the cart snapshot.
pub const CART_STORAGE_KEY: &str = "cart-storage";

/// Envelope version written by this build.
pub const SNAPSHOT_VERSION: u32 = 0;

/// Why a stored snapshot could not be used.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Not valid JSON, or not the expected shape.
    #[error("Malformed cart snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Written by a build with a different envelope version.
    #[error("Unsupported cart snapshot version {0}")]
    UnsupportedVersion(u32),
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: &'a CartState,
    version: u32,
}

#[derive(Deserialize)]
struct Envelope {
    state: CartState,
    #[serde(default)]
    version: u32,
}

/// Serialize `state` into the slot format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(state: &CartState) -> Result<String, serde_json::Error> {
    serde_json::to_string(&EnvelopeRef {
        state,
        version: SNAPSHOT_VERSION,
    })
}

/// Parse a slot value back into a cart state.
///
/// The result is normalized: lines with quantity 0 are dropped and lines that
/// share an id are merged into the first one.
///
/// # Errors
///
/// Returns a [`SnapshotError`] if the value is malformed or from another version.
pub fn decode(raw: &str) -> Result<CartState, SnapshotError> {
    let envelope: Envelope = serde_json::from_str(raw)?;
    if envelope.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(envelope.version));
    }
    Ok(normalize(envelope.state))
}

fn normalize(state: CartState) -> CartState {
    let mut items: Vec<CartLineItem> = Vec::with_capacity(state.items.len());

    for item in state.items {
        if item.quantity == 0 {
            continue;
        }
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
            None => items.push(item),
        }
    }

    CartState { items }
}

/// Rehydrate the cart from `storage`, falling back to an empty cart.
pub fn load<S: CartStorage + ?Sized>(storage: &S) -> CartState {
    let raw = match storage.read(CART_STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("No saved cart, starting empty");
            return CartState::default();
        }
        Err(e) => {
            warn!(error = %e, "Failed to read saved cart, starting empty");
            return CartState::default();
        }
    };

    match decode(&raw) {
        Ok(state) => state,
        Err(e) => {
            warn!(error = %e, "Discarding unusable saved cart");
            CartState::default()
        }
    }
}

/// Overwrite the slot with `state`. Failures are logged, never returned.
pub fn save<S: CartStorage + ?Sized>(storage: &S, state: &CartState) {
    let raw = match encode(state) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "Failed to encode cart snapshot");
            return;
        }
    };

    if let Err(e) = storage.write(CART_STORAGE_KEY, &raw) {
        warn!(error = %e, "Failed to save cart, keeping in-memory state");
    }
}
