use thiserror::Error;

use super::order::{OrderEvent, OrderStatus};

#[derive(Debug, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Not found")]
    NotFound,

    #[error("This product is not available")]
    Unavailable,

    #[error("This product requires a size selection")]
    SizeRequired,

    #[error("Unknown size '{0}' for this product")]
    InvalidSize(String),

    #[error("Only {remaining} unit(s) left in stock")]
    InsufficientStock { remaining: u32 },

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Your cart was emptied because its products are no longer available")]
    CartEmptied,

    #[error("Order cannot go from '{from}' on '{event}'")]
    InvalidTransition {
        from: OrderStatus,
        event: OrderEvent,
    },

    #[error("Cannot delete {0}: still referenced by existing orders")]
    Protected(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
