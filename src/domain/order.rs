//! Order lifecycle: the guarded state machine, order-code generation and the
//! value types that cross the repository boundary.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;
use super::pricing::Totals;

/// Order lifecycle state. `Pending` is the only state with outgoing payment
/// transitions; everything past `Paid` is back-office fulfilment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Applies an event, returning the next state or `InvalidTransition`.
    /// All idempotency decisions live at the call site: a repeated
    /// `PaymentConfirmed` on a `Paid` order is answered there with
    /// [`PaymentOutcome::AlreadyPaid`], never by bending the machine.
    pub fn apply(self, event: OrderEvent) -> Result<OrderStatus, DomainError> {
        use OrderEvent::*;
        use OrderStatus::*;
        match (self, event) {
            (Pending, PaymentConfirmed) => Ok(Paid),
            (Pending, PaymentCancelled) => Ok(Cancelled),
            (Paid, FulfilmentStarted) => Ok(Processing),
            (Processing, MarkShipped) => Ok(Shipped),
            (Shipped, MarkDelivered) => Ok(Delivered),
            (from, event) => Err(DomainError::InvalidTransition { from, event }),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::Internal(format!(
                "unknown order status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEvent {
    PaymentConfirmed,
    PaymentCancelled,
    FulfilmentStarted,
    MarkShipped,
    MarkDelivered,
}

impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderEvent::PaymentConfirmed => "payment_confirmed",
            OrderEvent::PaymentCancelled => "payment_cancelled",
            OrderEvent::FulfilmentStarted => "fulfilment_started",
            OrderEvent::MarkShipped => "mark_shipped",
            OrderEvent::MarkDelivered => "mark_delivered",
        })
    }
}

/// Result of a payment confirmation: either the order transitioned to `Paid`
/// now, or a previous callback already did and this one changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Confirmed,
    AlreadyPaid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
        }
    }
}

/// Generates a human-readable order code: timestamp plus a short random
/// suffix, e.g. `ORD-20250210143015-7F3A`. Uppercase throughout so lookups
/// can fold case by uppercasing the query.
pub fn generate_order_code(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(4)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    format!("ORD-{}-{}", now.format("%Y%m%d%H%M%S"), suffix)
}

/// An order line captured at promotion time. Unit price is a snapshot; later
/// catalog price changes never touch historical orders.
#[derive(Debug, Clone)]
pub struct OrderLineDraft {
    pub product_id: i32,
    pub size_label: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub line_total: BigDecimal,
}

/// Everything needed to persist a `Pending` order. The repository generates
/// the order code itself so it can regenerate on a collision.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer_id: Option<i32>,
    pub totals: Totals,
    pub payment_method: PaymentMethod,
    pub shipping_address: String,
    pub lines: Vec<OrderLineDraft>,
}

#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub id: i32,
    pub product_id: i32,
    pub size_label: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub line_total: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: i32,
    pub customer_id: Option<i32>,
    pub code: String,
    pub status: OrderStatus,
    pub subtotal: BigDecimal,
    pub tax: BigDecimal,
    pub shipping_cost: BigDecimal,
    pub discount: BigDecimal,
    pub total: BigDecimal,
    pub payment_method: String,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLineView>,
}
