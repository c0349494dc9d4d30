use serde::Serialize;

use crate::domain::errors::DomainError;
use crate::domain::ports::{CheckoutSessionRequest, PaymentGateway};

/// Adapter for a hosted-checkout style gateway: the session is opened by
/// redirecting the customer to the gateway's page with the order reference,
/// amount and the two callback URLs encoded in the query string. The gateway
/// calls back into `/payment/success/{id}` or `/payment/cancel/{id}`.
pub struct HostedCheckoutGateway {
    checkout_url: String,
}

impl HostedCheckoutGateway {
    pub fn new(checkout_url: String) -> Self {
        Self { checkout_url }
    }
}

#[derive(Serialize)]
struct CheckoutQuery<'a> {
    reference: &'a str,
    amount: String,
    success_url: &'a str,
    cancel_url: &'a str,
}

impl PaymentGateway for HostedCheckoutGateway {
    fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<String, DomainError> {
        let query = serde_urlencoded::to_string(CheckoutQuery {
            reference: &request.code,
            amount: request.amount.to_string(),
            success_url: &request.success_url,
            cancel_url: &request.cancel_url,
        })
        .map_err(|e| DomainError::Internal(format!("failed to encode checkout query: {e}")))?;

        log::info!(
            "opening checkout session for order {} ({})",
            request.order_id,
            request.code
        );
        Ok(format!("{}?{}", self.checkout_url, query))
    }
}
