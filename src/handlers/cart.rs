use actix_session::Session;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::cart_service::{CartService, CartView};
use crate::db::DbPool;
use crate::domain::cart::Cart;
use crate::domain::errors::DomainError;
use crate::errors::AppError;
use crate::infrastructure::catalog_repo::DieselCatalogRepository;

use super::{load_cart, store_cart};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    /// Size label, required for products that carry size variants.
    pub size: Option<String>,
    /// Units to add. Defaults to 1; zero is treated as 1.
    pub quantity: Option<u32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CartLineRequest {
    pub size: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartRequest {
    pub product_id: i32,
    pub size: Option<String>,
    /// New quantity for the line. Zero or negative removes it.
    pub quantity: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub product_id: i32,
    pub name: String,
    pub size: Option<String>,
    pub quantity: u32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub unit_price: String,
    pub subtotal: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub success: bool,
    pub cart_count: u32,
    pub cart_items: Vec<CartItemResponse>,
    pub cart_total: String,
}

impl From<CartView> for CartResponse {
    fn from(view: CartView) -> Self {
        CartResponse {
            success: true,
            cart_count: view.count,
            cart_items: view
                .items
                .into_iter()
                .map(|item| CartItemResponse {
                    product_id: item.product_id,
                    name: item.name,
                    size: item.size,
                    quantity: item.quantity,
                    unit_price: item.unit_price.to_string(),
                    subtotal: item.subtotal.to_string(),
                })
                .collect(),
            cart_total: view.total.to_string(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// Runs one cart mutation on a blocking thread and persists the resulting
/// cart back into the session. The cart is written back even when the
/// mutation failed: rejected mutations leave it untouched, so the write is a
/// no-op there, while partial outcomes (dropped stale lines) do stick.
async fn run_cart_op<F>(pool: web::Data<DbPool>, session: Session, op: F) -> Result<HttpResponse, AppError>
where
    F: FnOnce(&CartService<DieselCatalogRepository>, &mut Cart) -> Result<CartView, DomainError>
        + Send
        + 'static,
{
    let mut cart = load_cart(&session);

    let (cart, view) = web::block(move || {
        let service = CartService::new(DieselCatalogRepository::new(pool.get_ref().clone()));
        let view = op(&service, &mut cart);
        (cart, view)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?;

    store_cart(&session, &cart)?;
    let view = view?;
    Ok(HttpResponse::Ok().json(CartResponse::from(view)))
}

/// GET /cart
///
/// Renders the current session cart. Lines whose product has since been
/// removed from the catalog are hidden but not deleted.
#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "Current cart", body = CartResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn get_cart(
    pool: web::Data<DbPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    run_cart_op(pool, session, |service, cart| service.view(cart)).await
}

/// POST /cart/add/{product_id}
///
/// Adds units of a product (optionally a specific size) to the cart, after a
/// soft stock check against what the cart already holds.
#[utoipa::path(
    post,
    path = "/cart/add/{product_id}",
    params(("product_id" = i32, Path, description = "Product id")),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 400, description = "Size missing or unknown, or product unavailable"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Not enough remaining stock"),
    ),
    tag = "cart"
)]
pub async fn add_to_cart(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i32>,
    body: Option<web::Json<AddToCartRequest>>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let body = body.map(web::Json::into_inner).unwrap_or_default();

    run_cart_op(pool, session, move |service, cart| {
        service.add(
            cart,
            product_id,
            body.size.as_deref(),
            body.quantity.unwrap_or(1),
        )
    })
    .await
}

/// POST /cart/decrement/{product_id}
///
/// Removes one unit of the line; the line disappears when it reaches zero.
/// Decrementing an absent line is a no-op.
#[utoipa::path(
    post,
    path = "/cart/decrement/{product_id}",
    params(("product_id" = i32, Path, description = "Product id")),
    request_body = CartLineRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
    ),
    tag = "cart"
)]
pub async fn decrement_item(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i32>,
    body: Option<web::Json<CartLineRequest>>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let body = body.map(web::Json::into_inner).unwrap_or_default();

    run_cart_op(pool, session, move |service, cart| {
        service.decrement(cart, product_id, body.size.as_deref())
    })
    .await
}

/// POST /cart/remove/{product_id}
#[utoipa::path(
    post,
    path = "/cart/remove/{product_id}",
    params(("product_id" = i32, Path, description = "Product id")),
    request_body = CartLineRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
    ),
    tag = "cart"
)]
pub async fn remove_item(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i32>,
    body: Option<web::Json<CartLineRequest>>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let body = body.map(web::Json::into_inner).unwrap_or_default();

    run_cart_op(pool, session, move |service, cart| {
        service.remove(cart, product_id, body.size.as_deref())
    })
    .await
}

/// POST /cart/update
///
/// Sets a line to an absolute quantity; zero or negative removes the line.
#[utoipa::path(
    post,
    path = "/cart/update",
    request_body = UpdateCartRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
    ),
    tag = "cart"
)]
pub async fn update_item(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<UpdateCartRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    run_cart_op(pool, session, move |service, cart| {
        service.set_quantity(cart, body.product_id, body.size.as_deref(), body.quantity)
    })
    .await
}

/// POST /cart/clear
#[utoipa::path(
    post,
    path = "/cart/clear",
    responses(
        (status = 200, description = "Emptied cart", body = CartResponse),
    ),
    tag = "cart"
)]
pub async fn clear_cart(
    pool: web::Data<DbPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    run_cart_op(pool, session, |service, cart| service.clear(cart)).await
}
