pub mod cart;
pub mod checkout;
pub mod orders;

use actix_session::Session;

use crate::domain::cart::{self as domain_cart, Cart, SESSION_CART_KEY};
use crate::errors::AppError;

/// Reads the cart out of the session. Nothing here fails the request: an
/// unreadable session value starts an empty cart, and malformed entries are
/// dropped with a warning instead of poisoning the whole cart.
pub(crate) fn load_cart(session: &Session) -> Cart {
    let raw: Option<serde_json::Value> = match session.get(SESSION_CART_KEY) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("session cart value is unreadable, starting empty: {e}");
            None
        }
    };
    let decoded = domain_cart::decode(raw.as_ref());
    for skipped in &decoded.skipped {
        log::warn!(
            "dropping malformed session cart entry '{}': {}",
            skipped.key,
            skipped.reason
        );
    }
    decoded.cart
}

pub(crate) fn store_cart(session: &Session, cart: &Cart) -> Result<(), AppError> {
    session
        .insert(SESSION_CART_KEY, domain_cart::encode(cart))
        .map_err(|e| AppError::Internal(format!("failed to write session cart: {e}")))
}
