use bigdecimal::BigDecimal;

use super::catalog::ProductDetail;
use super::errors::DomainError;
use super::order::{OrderDraft, OrderView, PaymentOutcome};

/// Read side of the catalog plus the one write the engine cares about:
/// protected product deletion.
pub trait CatalogRepository: Send + Sync + 'static {
    /// Product with its size variants loaded, or `None`.
    fn find_product(&self, id: i32) -> Result<Option<ProductDetail>, DomainError>;

    /// Deletes a product. Fails with [`DomainError::Protected`] while order
    /// lines still reference it.
    fn delete_product(&self, id: i32) -> Result<(), DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Persists a `Pending` order with its lines, generating a unique order
    /// code (regenerated on the rare collision).
    fn create_pending(&self, draft: OrderDraft) -> Result<OrderView, DomainError>;

    fn find_by_id(&self, id: i32) -> Result<Option<OrderView>, DomainError>;

    /// Case-insensitive order-code lookup.
    fn find_by_code(&self, code: &str) -> Result<Option<OrderView>, DomainError>;

    /// Payment-success path: guarded `Pending → Paid` transition plus the
    /// stock decrement, atomically. Calling it again on a `Paid` order is a
    /// no-op answered with [`PaymentOutcome::AlreadyPaid`].
    fn confirm_paid(&self, order_id: i32) -> Result<PaymentOutcome, DomainError>;

    /// Cash-on-delivery path: decrements stock for every line without any
    /// state transition (the order stays `Pending` until fulfilment).
    fn decrement_stock(&self, order_id: i32) -> Result<(), DomainError>;

    /// Payment-cancel path: `Pending → Cancelled`, stock untouched.
    fn cancel(&self, order_id: i32) -> Result<(), DomainError>;
}

/// What the external gateway needs to open a hosted checkout page. The
/// amount is the order total as a single figure; never a per-line breakdown
/// that could drift from the computed total.
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub order_id: i32,
    pub code: String,
    pub amount: BigDecimal,
    pub success_url: String,
    pub cancel_url: String,
}

pub trait PaymentGateway: Send + Sync + 'static {
    /// Opens a checkout session and returns the URL to redirect the customer
    /// to.
    fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<String, DomainError>;
}
