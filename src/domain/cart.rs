//! Session-resident shopping cart: the value type, its mutation helpers and
//! the codec that moves it in and out of the session blob.
//!
//! The session stores the cart as a JSON object mapping `"<product_id>:<size>"`
//! to a positive integer quantity. An empty size segment means "no size
//! selected"; legacy blobs may still carry bare `"<product_id>"` keys, which
//! decode to the same thing. Inside the crate the cart is only ever the typed
//! form below. No code outside this module touches the string keys.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

/// Session key the serialized cart lives under.
pub const SESSION_CART_KEY: &str = "cart";

/// Upper bound on a single line's quantity. The session blob is
/// client-influenced, so quantities are clamped here rather than trusted;
/// stock checks reject anything this large long before it matters.
pub const MAX_LINE_QUANTITY: u32 = 9_999;

/// Composite cart key. `size == None` means no size selected (simple-stock
/// products).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CartKey {
    pub product_id: i32,
    pub size: Option<String>,
}

impl CartKey {
    /// Builds a key, normalising an empty size label to `None`.
    pub fn new(product_id: i32, size: Option<String>) -> Self {
        Self {
            product_id,
            size: size.filter(|s| !s.is_empty()),
        }
    }

    pub fn sizeless(product_id: i32) -> Self {
        Self {
            product_id,
            size: None,
        }
    }

    fn encode(&self) -> String {
        format!("{}:{}", self.product_id, self.size.as_deref().unwrap_or(""))
    }
}

/// Session cart: composite key → quantity. Every stored quantity is >= 1; an
/// entry reduced to zero is removed, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    entries: BTreeMap<CartKey, u32>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&CartKey, u32)> {
        self.entries.iter().map(|(k, q)| (k, *q))
    }

    /// Quantity held for an exact key, zero when absent.
    pub fn quantity(&self, key: &CartKey) -> u32 {
        self.entries.get(key).copied().unwrap_or(0)
    }

    /// Total units across all entries (the cart badge count).
    pub fn total_units(&self) -> u32 {
        self.entries
            .values()
            .fold(0u32, |total, q| total.saturating_add(*q))
    }

    /// Units held for a product across all of its sizes.
    pub fn units_for_product(&self, product_id: i32) -> u32 {
        self.entries
            .iter()
            .filter(|(k, _)| k.product_id == product_id)
            .fold(0u32, |total, (_, q)| total.saturating_add(*q))
    }

    /// Increments the key's quantity by `count`, clamped to
    /// [`MAX_LINE_QUANTITY`]. Adding zero is a no-op.
    pub fn add(&mut self, key: CartKey, count: u32) {
        if count == 0 {
            return;
        }
        let quantity = self.entries.entry(key).or_insert(0);
        *quantity = quantity.saturating_add(count).min(MAX_LINE_QUANTITY);
    }

    /// Reduces the key's quantity by one, removing the entry at zero. Absent
    /// entries are left alone, not an error.
    pub fn decrement(&mut self, key: &CartKey) {
        if let Some(quantity) = self.entries.get_mut(key) {
            *quantity -= 1;
            if *quantity == 0 {
                self.entries.remove(key);
            }
        }
    }

    pub fn remove(&mut self, key: &CartKey) {
        self.entries.remove(key);
    }

    /// Sets the key's quantity, clamped to [`MAX_LINE_QUANTITY`]; anything
    /// <= 0 removes the entry.
    pub fn set_quantity(&mut self, key: CartKey, count: i64) {
        match u32::try_from(count) {
            Ok(0) => {
                self.entries.remove(&key);
            }
            Err(_) if count <= 0 => {
                self.entries.remove(&key);
            }
            Ok(count) => {
                self.entries.insert(key, count.min(MAX_LINE_QUANTITY));
            }
            // Positive but beyond u32: clamp like any oversized quantity.
            Err(_) => {
                self.entries.insert(key, MAX_LINE_QUANTITY);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EntryParseError {
    #[error("product id is not an integer")]
    BadProductId,
    #[error("quantity is not a positive integer")]
    BadQuantity,
}

/// A session entry the decoder had to drop, kept for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub key: String,
    pub reason: EntryParseError,
}

/// Result of decoding a session blob: the usable cart plus whatever entries
/// could not be parsed. Skipped entries never fail the whole cart.
#[derive(Debug, Default)]
pub struct DecodedCart {
    pub cart: Cart,
    pub skipped: Vec<SkippedEntry>,
}

/// Parses one session entry. Accepts both the composite `"id:size"` form and
/// the legacy bare `"id"` form; quantities may arrive as JSON numbers or
/// numeric strings, but must be positive.
pub fn parse_entry(key: &str, value: &Value) -> Result<(CartKey, u32), EntryParseError> {
    let (id_part, size_part) = match key.split_once(':') {
        Some((id, size)) => (id, Some(size)),
        None => (key, None),
    };
    let product_id: i32 = id_part
        .trim()
        .parse()
        .map_err(|_| EntryParseError::BadProductId)?;

    let quantity = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    let quantity = quantity
        .filter(|q| *q > 0)
        .map(|q| u32::try_from(q).unwrap_or(MAX_LINE_QUANTITY).min(MAX_LINE_QUANTITY))
        .ok_or(EntryParseError::BadQuantity)?;

    Ok((CartKey::new(product_id, size_part.map(str::to_owned)), quantity))
}

/// Decodes the raw session value. Missing or non-object values yield an empty
/// cart; malformed entries are collected, not raised. Aliased keys (legacy
/// `"7"` next to `"7:"`) merge by summing their quantities.
pub fn decode(raw: Option<&Value>) -> DecodedCart {
    let mut decoded = DecodedCart::default();
    let Some(Value::Object(map)) = raw else {
        return decoded;
    };
    for (key, value) in map {
        match parse_entry(key, value) {
            Ok((cart_key, quantity)) => decoded.cart.add(cart_key, quantity),
            Err(reason) => decoded.skipped.push(SkippedEntry {
                key: key.clone(),
                reason,
            }),
        }
    }
    decoded
}

/// Encodes the cart back to the session form. Always writes composite keys;
/// the legacy bare form is read-only compatibility.
pub fn encode(cart: &Cart) -> Value {
    let mut map = Map::new();
    for (key, quantity) in cart.entries() {
        map.insert(key.encode(), Value::from(quantity));
    }
    Value::Object(map)
}
