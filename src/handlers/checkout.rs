use actix_session::Session;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::application::checkout_service::{CheckoutService, CheckoutStarted, ShippingDetails};
use crate::db::DbPool;
use crate::domain::cart::Cart;
use crate::domain::order::{PaymentMethod, PaymentOutcome};
use crate::domain::pricing::ShippingMethod;
use crate::errors::AppError;
use crate::infrastructure::catalog_repo::DieselCatalogRepository;
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::infrastructure::payment::HostedCheckoutGateway;
use crate::AppConfig;

use super::{load_cart, store_cart};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub customer_id: Option<i32>,
    pub shipping_address: String,
    /// "delivery" or "pickup"
    #[schema(value_type = String, example = "delivery")]
    pub shipping_method: ShippingMethod,
    /// "card" or "cash_on_delivery"
    #[schema(value_type = String, example = "card")]
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CardCheckoutResponse {
    pub order_id: i32,
    pub code: String,
    /// Hosted gateway page the customer must be redirected to.
    pub redirect_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CodCheckoutResponse {
    pub order_id: i32,
    pub code: String,
    pub status: String,
}

fn checkout_service(
    pool: DbPool,
    config: &AppConfig,
) -> CheckoutService<DieselCatalogRepository, DieselOrderRepository, HostedCheckoutGateway> {
    CheckoutService::new(
        DieselCatalogRepository::new(pool.clone()),
        DieselOrderRepository::new(pool),
        HostedCheckoutGateway::new(config.payment_gateway_url.clone()),
        config.public_base_url.clone(),
    )
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /checkout
///
/// Promotes the session cart into a `Pending` order. Card payments answer
/// with a gateway redirect URL and keep the cart until the success callback;
/// cash on delivery commits stock immediately and clears the cart.
#[utoipa::path(
    post,
    path = "/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order created, redirect to gateway", body = CardCheckoutResponse),
        (status = 400, description = "Cart is empty"),
        (status = 409, description = "All cart lines vanished; cart was emptied"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "checkout"
)]
pub async fn checkout(
    pool: web::Data<DbPool>,
    config: web::Data<AppConfig>,
    session: Session,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let mut cart = load_cart(&session);

    let (cart, started) = web::block(move || {
        let service = checkout_service(pool.get_ref().clone(), &config);
        let shipping = ShippingDetails {
            address: body.shipping_address,
            method: body.shipping_method,
        };
        let started = service.begin(&mut cart, body.customer_id, &shipping, body.payment_method);
        (cart, started)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?;

    // Written back even on failure: the emptied-cart path clears the cart.
    store_cart(&session, &cart)?;

    match started? {
        CheckoutStarted::Redirect {
            order,
            redirect_url,
        } => Ok(HttpResponse::Created().json(CardCheckoutResponse {
            order_id: order.id,
            code: order.code,
            redirect_url,
        })),
        CheckoutStarted::CashOnDelivery { order } => {
            Ok(HttpResponse::Created().json(CodCheckoutResponse {
                order_id: order.id,
                code: order.code,
                status: order.status.to_string(),
            }))
        }
    }
}

/// GET /payment/success/{order_id}
///
/// Gateway success callback. Confirms the payment (idempotently: a replayed
/// callback decrements nothing) and clears the session cart.
#[utoipa::path(
    get,
    path = "/payment/success/{order_id}",
    params(("order_id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Payment recorded"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not in a payable state"),
    ),
    tag = "checkout"
)]
pub async fn payment_success(
    pool: web::Data<DbPool>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let outcome = web::block(move || {
        let service = checkout_service(pool.get_ref().clone(), &config);
        service.payment_success(order_id)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    store_cart(&session, &Cart::new())?;

    Ok(HttpResponse::Ok().json(json!({
        "order_id": order_id,
        "status": "paid",
        "already_paid": outcome == PaymentOutcome::AlreadyPaid,
    })))
}

/// GET /payment/cancel/{order_id}
///
/// Gateway cancel callback. The order ends `Cancelled`; stock and the
/// session cart stay as they were, so the customer can try again.
#[utoipa::path(
    get,
    path = "/payment/cancel/{order_id}",
    params(("order_id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order cancelled"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not in a cancellable state"),
    ),
    tag = "checkout"
)]
pub async fn payment_cancel(
    pool: web::Data<DbPool>,
    config: web::Data<AppConfig>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    web::block(move || {
        let service = checkout_service(pool.get_ref().clone(), &config);
        service.payment_cancelled(order_id)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({
        "order_id": order_id,
        "status": "cancelled",
    })))
}
