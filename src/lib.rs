pub mod application;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

/// Runtime configuration shared with the handlers.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Externally reachable base URL of this service, used to build the
    /// payment callback URLs handed to the gateway. No trailing slash.
    pub public_base_url: String,
    /// Base URL of the hosted checkout page.
    pub payment_gateway_url: String,
    /// Master secret the session cookie keys are derived from. Must be at
    /// least 32 bytes.
    pub session_secret: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::cart::get_cart,
        handlers::cart::add_to_cart,
        handlers::cart::decrement_item,
        handlers::cart::remove_item,
        handlers::cart::update_item,
        handlers::cart::clear_cart,
        handlers::checkout::checkout,
        handlers::checkout::payment_success,
        handlers::checkout::payment_cancel,
        handlers::orders::get_order,
        handlers::orders::track_order,
    ),
    tags(
        (name = "cart", description = "Session shopping cart"),
        (name = "checkout", description = "Order promotion and payment callbacks"),
        (name = "orders", description = "Order lookup and tracking"),
    )
)]
pub struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    config: AppConfig,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let session_key = Key::derive_from(config.session_secret.as_bytes());

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config.clone()))
            .wrap(Logger::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
                    // Behind plain HTTP in dev and in tests.
                    .cookie_secure(false)
                    .build(),
            )
            .service(
                web::scope("/cart")
                    .route("", web::get().to(handlers::cart::get_cart))
                    .route("/add/{product_id}", web::post().to(handlers::cart::add_to_cart))
                    .route(
                        "/decrement/{product_id}",
                        web::post().to(handlers::cart::decrement_item),
                    )
                    .route(
                        "/remove/{product_id}",
                        web::post().to(handlers::cart::remove_item),
                    )
                    .route("/update", web::post().to(handlers::cart::update_item))
                    .route("/clear", web::post().to(handlers::cart::clear_cart)),
            )
            .route("/checkout", web::post().to(handlers::checkout::checkout))
            .service(
                web::scope("/payment")
                    .route(
                        "/success/{order_id}",
                        web::get().to(handlers::checkout::payment_success),
                    )
                    .route(
                        "/cancel/{order_id}",
                        web::get().to(handlers::checkout::payment_cancel),
                    ),
            )
            .service(
                web::scope("/orders")
                    .route("/track/{code}", web::get().to(handlers::orders::track_order))
                    .route("/{id}", web::get().to(handlers::orders::get_order)),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
