use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::domain::order::{OrderLineView, OrderView};
use crate::domain::ports::OrderRepository;
use crate::errors::AppError;
use crate::infrastructure::order_repo::DieselOrderRepository;

// ── Response DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub id: i32,
    pub product_id: i32,
    /// Empty string for products without size variants.
    pub size_label: String,
    pub quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub unit_price: String,
    pub line_total: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub customer_id: Option<i32>,
    pub code: String,
    pub status: String,
    pub subtotal: String,
    pub tax: String,
    pub shipping_cost: String,
    pub discount: String,
    pub total: String,
    pub payment_method: String,
    pub shipping_address: String,
    pub created_at: String,
    pub lines: Vec<OrderLineResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        OrderResponse {
            id: order.id,
            customer_id: order.customer_id,
            code: order.code,
            status: order.status.to_string(),
            subtotal: order.subtotal.to_string(),
            tax: order.tax.to_string(),
            shipping_cost: order.shipping_cost.to_string(),
            discount: order.discount.to_string(),
            total: order.total.to_string(),
            payment_method: order.payment_method,
            shipping_address: order.shipping_address,
            created_at: order.created_at.to_rfc3339(),
            lines: order
                .lines
                .into_iter()
                .map(|l: OrderLineView| OrderLineResponse {
                    id: l.id,
                    product_id: l.product_id,
                    size_label: l.size_label,
                    quantity: l.quantity,
                    unit_price: l.unit_price.to_string(),
                    line_total: l.line_total.to_string(),
                })
                .collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /orders/{id}
///
/// Returns the order together with its lines.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || {
        let repo = DieselOrderRepository::new(pool.get_ref().clone());
        repo.find_by_id(order_id)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match order {
        Some(order) => Ok(HttpResponse::Ok().json(OrderResponse::from(order))),
        None => Err(AppError::NotFound),
    }
}

/// GET /orders/track/{code}
///
/// Public tracking lookup by order code, case-insensitive.
#[utoipa::path(
    get,
    path = "/orders/track/{code}",
    params(("code" = String, Path, description = "Order code, e.g. ORD-20250210143015-7F3A")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "No order with that code"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn track_order(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let code = path.into_inner();

    let order = web::block(move || {
        let repo = DieselOrderRepository::new(pool.get_ref().clone());
        repo.find_by_code(&code)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match order {
        Some(order) => Ok(HttpResponse::Ok().json(OrderResponse::from(order))),
        None => Err(AppError::NotFound),
    }
}
