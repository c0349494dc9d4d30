//! Order promotion: snapshot the cart, price it, persist a `Pending` order
//! and either hand the customer to the payment gateway (card) or commit the
//! stock immediately (cash on delivery).

use crate::domain::cart::Cart;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    OrderDraft, OrderLineDraft, OrderView, PaymentMethod, PaymentOutcome,
};
use crate::domain::ports::{
    CatalogRepository, CheckoutSessionRequest, OrderRepository, PaymentGateway,
};
use crate::domain::pricing::{self, ShippingMethod};

/// Shipping details captured from the checkout form.
#[derive(Debug, Clone)]
pub struct ShippingDetails {
    pub address: String,
    pub method: ShippingMethod,
}

/// How checkout continued after the order was persisted.
#[derive(Debug, Clone)]
pub enum CheckoutStarted {
    /// Card path: the customer must be redirected to the gateway's hosted
    /// page; stock is committed later, on the success callback.
    Redirect {
        order: OrderView,
        redirect_url: String,
    },
    /// Cash on delivery: stock already committed, cart already cleared; the
    /// order stays `Pending` until fulfilment.
    CashOnDelivery { order: OrderView },
}

pub struct CheckoutService<C, O, P> {
    catalog: C,
    orders: O,
    gateway: P,
    public_base_url: String,
}

impl<C, O, P> CheckoutService<C, O, P>
where
    C: CatalogRepository,
    O: OrderRepository,
    P: PaymentGateway,
{
    pub fn new(catalog: C, orders: O, gateway: P, public_base_url: impl Into<String>) -> Self {
        Self {
            catalog,
            orders,
            gateway,
            public_base_url: public_base_url.into(),
        }
    }

    /// Promotes the cart into a persisted `Pending` order.
    ///
    /// Cart entries whose product no longer exists are dropped with a warning
    /// rather than aborting checkout. If nothing survives, the cart is
    /// cleared and [`DomainError::CartEmptied`] tells the caller to show the
    /// "your cart was emptied" message.
    pub fn begin(
        &self,
        cart: &mut Cart,
        customer_id: Option<i32>,
        shipping: &ShippingDetails,
        payment_method: PaymentMethod,
    ) -> Result<CheckoutStarted, DomainError> {
        if cart.is_empty() {
            return Err(DomainError::EmptyCart);
        }

        let mut lines = Vec::new();
        let mut subtotals = Vec::new();
        for (key, quantity) in cart.entries() {
            let Some(product) = self.catalog.find_product(key.product_id)? else {
                log::warn!(
                    "checkout: dropping cart line for product {} which no longer exists",
                    key.product_id
                );
                continue;
            };
            let unit_price = pricing::round2(&pricing::unit_price(&product));
            let line_total = pricing::line_subtotal(&unit_price, quantity);
            subtotals.push(line_total.clone());
            lines.push(OrderLineDraft {
                product_id: key.product_id,
                size_label: key.size.clone().unwrap_or_default(),
                quantity: quantity as i32,
                unit_price,
                line_total,
            });
        }

        if lines.is_empty() {
            cart.clear();
            return Err(DomainError::CartEmptied);
        }

        let subtotal = pricing::cart_subtotal(subtotals.iter());
        let totals = pricing::order_totals(&subtotal, shipping.method);
        let order = self.orders.create_pending(OrderDraft {
            customer_id,
            totals,
            payment_method,
            shipping_address: shipping.address.clone(),
            lines,
        })?;

        match payment_method {
            PaymentMethod::Card => {
                let request = CheckoutSessionRequest {
                    order_id: order.id,
                    code: order.code.clone(),
                    amount: order.total.clone(),
                    success_url: format!(
                        "{}/payment/success/{}",
                        self.public_base_url, order.id
                    ),
                    cancel_url: format!("{}/payment/cancel/{}", self.public_base_url, order.id),
                };
                let redirect_url = self.gateway.create_checkout_session(&request)?;
                Ok(CheckoutStarted::Redirect {
                    order,
                    redirect_url,
                })
            }
            PaymentMethod::CashOnDelivery => {
                // No external confirmation step to wait for: commit stock now.
                self.orders.decrement_stock(order.id)?;
                cart.clear();
                log::info!(
                    "order {} placed as cash on delivery, stock committed",
                    order.code
                );
                Ok(CheckoutStarted::CashOnDelivery { order })
            }
        }
    }

    /// Gateway success callback: idempotent confirm (stock decremented at
    /// most once across duplicate invocations).
    pub fn payment_success(&self, order_id: i32) -> Result<PaymentOutcome, DomainError> {
        let outcome = self.orders.confirm_paid(order_id)?;
        if outcome == PaymentOutcome::AlreadyPaid {
            log::info!(
                "duplicate payment confirmation for order {order_id}; stock left untouched"
            );
        }
        Ok(outcome)
    }

    /// Gateway cancel callback: the order ends `Cancelled`, stock untouched.
    pub fn payment_cancelled(&self, order_id: i32) -> Result<(), DomainError> {
        self.orders.cancel(order_id)
    }

    /// Public order tracking by code, case-insensitive.
    pub fn track(&self, code: &str) -> Result<Option<OrderView>, DomainError> {
        self.orders.find_by_code(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::CartKey;
    use crate::domain::catalog::ProductDetail;
    use crate::domain::order::OrderStatus;
    use bigdecimal::BigDecimal;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::str::FromStr;
    use std::sync::Mutex;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    struct FakeCatalog {
        products: HashMap<i32, ProductDetail>,
    }

    impl CatalogRepository for FakeCatalog {
        fn find_product(&self, id: i32) -> Result<Option<ProductDetail>, DomainError> {
            Ok(self.products.get(&id).cloned())
        }

        fn delete_product(&self, _id: i32) -> Result<(), DomainError> {
            unimplemented!("not exercised by checkout tests")
        }
    }

    #[derive(Default)]
    struct FakeOrdersState {
        orders: Vec<OrderView>,
        decrements: Vec<i32>,
    }

    #[derive(Default)]
    struct FakeOrders {
        state: Mutex<FakeOrdersState>,
    }

    impl OrderRepository for FakeOrders {
        fn create_pending(&self, draft: OrderDraft) -> Result<OrderView, DomainError> {
            let mut state = self.state.lock().expect("lock");
            let id = state.orders.len() as i32 + 1;
            let order = OrderView {
                id,
                customer_id: draft.customer_id,
                code: format!("ORD-TEST-{id:04}"),
                status: OrderStatus::Pending,
                subtotal: draft.totals.subtotal,
                tax: draft.totals.tax,
                shipping_cost: draft.totals.shipping_cost,
                discount: draft.totals.discount,
                total: draft.totals.total,
                payment_method: draft.payment_method.as_str().to_string(),
                shipping_address: draft.shipping_address,
                created_at: Utc::now(),
                lines: draft
                    .lines
                    .iter()
                    .enumerate()
                    .map(|(i, l)| crate::domain::order::OrderLineView {
                        id: i as i32 + 1,
                        product_id: l.product_id,
                        size_label: l.size_label.clone(),
                        quantity: l.quantity,
                        unit_price: l.unit_price.clone(),
                        line_total: l.line_total.clone(),
                    })
                    .collect(),
            };
            state.orders.push(order.clone());
            Ok(order)
        }

        fn find_by_id(&self, id: i32) -> Result<Option<OrderView>, DomainError> {
            Ok(self
                .state
                .lock()
                .expect("lock")
                .orders
                .iter()
                .find(|o| o.id == id)
                .cloned())
        }

        fn find_by_code(&self, code: &str) -> Result<Option<OrderView>, DomainError> {
            Ok(self
                .state
                .lock()
                .expect("lock")
                .orders
                .iter()
                .find(|o| o.code.eq_ignore_ascii_case(code))
                .cloned())
        }

        fn confirm_paid(&self, order_id: i32) -> Result<PaymentOutcome, DomainError> {
            let mut state = self.state.lock().expect("lock");
            let order = state
                .orders
                .iter_mut()
                .find(|o| o.id == order_id)
                .ok_or(DomainError::NotFound)?;
            if order.status == OrderStatus::Paid {
                return Ok(PaymentOutcome::AlreadyPaid);
            }
            order.status = order
                .status
                .apply(crate::domain::order::OrderEvent::PaymentConfirmed)?;
            state.decrements.push(order_id);
            Ok(PaymentOutcome::Confirmed)
        }

        fn decrement_stock(&self, order_id: i32) -> Result<(), DomainError> {
            self.state.lock().expect("lock").decrements.push(order_id);
            Ok(())
        }

        fn cancel(&self, order_id: i32) -> Result<(), DomainError> {
            let mut state = self.state.lock().expect("lock");
            let order = state
                .orders
                .iter_mut()
                .find(|o| o.id == order_id)
                .ok_or(DomainError::NotFound)?;
            order.status = order
                .status
                .apply(crate::domain::order::OrderEvent::PaymentCancelled)?;
            Ok(())
        }
    }

    struct FakeGateway;

    impl PaymentGateway for FakeGateway {
        fn create_checkout_session(
            &self,
            request: &CheckoutSessionRequest,
        ) -> Result<String, DomainError> {
            Ok(format!(
                "https://pay.example/session?amount={}&reference={}",
                request.amount, request.code
            ))
        }
    }

    fn product(id: i32, price: &str, stock: i32) -> ProductDetail {
        ProductDetail {
            id,
            name: format!("Product {id}"),
            price: dec(price),
            sale_price: None,
            available: true,
            stock,
            variants: vec![],
        }
    }

    fn service(
        products: Vec<ProductDetail>,
    ) -> CheckoutService<FakeCatalog, FakeOrders, FakeGateway> {
        CheckoutService::new(
            FakeCatalog {
                products: products.into_iter().map(|p| (p.id, p)).collect(),
            },
            FakeOrders::default(),
            FakeGateway,
            "http://shop.example",
        )
    }

    fn delivery() -> ShippingDetails {
        ShippingDetails {
            address: "Calle Mayor 1, Madrid".to_string(),
            method: ShippingMethod::Delivery,
        }
    }

    #[test]
    fn empty_cart_cannot_check_out() {
        let service = service(vec![product(1, "10.00", 5)]);
        let mut cart = Cart::new();
        assert_eq!(
            service
                .begin(&mut cart, None, &delivery(), PaymentMethod::Card)
                .unwrap_err(),
            DomainError::EmptyCart
        );
    }

    #[test]
    fn card_checkout_persists_pending_order_and_redirects() {
        let service = service(vec![product(1, "10.00", 5)]);
        let mut cart = Cart::new();
        cart.add(CartKey::sizeless(1), 3);

        let started = service
            .begin(&mut cart, Some(7), &delivery(), PaymentMethod::Card)
            .expect("checkout failed");

        let CheckoutStarted::Redirect {
            order,
            redirect_url,
        } = started
        else {
            panic!("expected the redirect path");
        };
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.customer_id, Some(7));
        assert_eq!(order.subtotal, dec("30.00"));
        assert_eq!(order.shipping_cost, dec("0.00"));
        assert_eq!(order.tax, dec("3.00"));
        assert_eq!(order.total, dec("33.00"));
        assert!(redirect_url.contains("amount=33.00"));
        assert!(redirect_url.contains(&order.code));
        // card path: stock untouched, cart kept until the success callback
        assert!(service.orders.state.lock().unwrap().decrements.is_empty());
        assert!(!cart.is_empty());
    }

    #[test]
    fn cash_on_delivery_commits_stock_and_clears_cart() {
        let service = service(vec![product(1, "10.00", 5)]);
        let mut cart = Cart::new();
        cart.add(CartKey::sizeless(1), 2);

        let started = service
            .begin(&mut cart, None, &delivery(), PaymentMethod::CashOnDelivery)
            .expect("checkout failed");

        let CheckoutStarted::CashOnDelivery { order } = started else {
            panic!("expected the cash-on-delivery path");
        };
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_method, "cash_on_delivery");
        assert_eq!(
            service.orders.state.lock().unwrap().decrements,
            vec![order.id]
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn vanished_products_are_dropped_from_the_snapshot() {
        let service = service(vec![product(1, "10.00", 5)]);
        let mut cart = Cart::new();
        cart.add(CartKey::sizeless(1), 1);
        cart.add(CartKey::sizeless(42), 2);

        let started = service
            .begin(&mut cart, None, &delivery(), PaymentMethod::Card)
            .expect("checkout failed");

        let CheckoutStarted::Redirect { order, .. } = started else {
            panic!("expected the redirect path");
        };
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].product_id, 1);
    }

    #[test]
    fn cart_of_only_vanished_products_is_emptied() {
        let service = service(vec![]);
        let mut cart = Cart::new();
        cart.add(CartKey::sizeless(42), 2);

        let err = service
            .begin(&mut cart, None, &delivery(), PaymentMethod::Card)
            .unwrap_err();

        assert_eq!(err, DomainError::CartEmptied);
        assert!(cart.is_empty(), "cart must be cleared, not left stale");
    }

    #[test]
    fn duplicate_payment_success_decrements_once() {
        let service = service(vec![product(1, "10.00", 5)]);
        let mut cart = Cart::new();
        cart.add(CartKey::sizeless(1), 1);
        let CheckoutStarted::Redirect { order, .. } = service
            .begin(&mut cart, None, &delivery(), PaymentMethod::Card)
            .expect("checkout failed")
        else {
            panic!("expected the redirect path");
        };

        assert_eq!(
            service.payment_success(order.id).unwrap(),
            PaymentOutcome::Confirmed
        );
        assert_eq!(
            service.payment_success(order.id).unwrap(),
            PaymentOutcome::AlreadyPaid
        );
        assert_eq!(
            service.orders.state.lock().unwrap().decrements,
            vec![order.id],
            "second callback must not decrement again"
        );
    }

    #[test]
    fn cancel_leaves_stock_untouched() {
        let service = service(vec![product(1, "10.00", 5)]);
        let mut cart = Cart::new();
        cart.add(CartKey::sizeless(1), 1);
        let CheckoutStarted::Redirect { order, .. } = service
            .begin(&mut cart, None, &delivery(), PaymentMethod::Card)
            .expect("checkout failed")
        else {
            panic!("expected the redirect path");
        };

        service.payment_cancelled(order.id).expect("cancel failed");

        let state = service.orders.state.lock().unwrap();
        assert_eq!(state.orders[0].status, OrderStatus::Cancelled);
        assert!(state.decrements.is_empty());
    }

    #[test]
    fn tracking_is_case_insensitive() {
        let service = service(vec![product(1, "10.00", 5)]);
        let mut cart = Cart::new();
        cart.add(CartKey::sizeless(1), 1);
        let CheckoutStarted::Redirect { order, .. } = service
            .begin(&mut cart, None, &delivery(), PaymentMethod::Card)
            .expect("checkout failed")
        else {
            panic!("expected the redirect path");
        };

        let found = service
            .track(&order.code.to_lowercase())
            .expect("track failed");
        assert_eq!(found.map(|o| o.id), Some(order.id));
        assert!(service.track("ORD-MISSING-0000").unwrap().is_none());
    }
}
