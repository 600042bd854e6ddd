mod config;
mod database;
mod error;
mod filters;
mod handlers;
mod middleware;
mod models;
mod movement;
mod stock;
mod tier_price;
mod utils;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use dotenvy::dotenv;

use config::Config;
use database::{create_database_pool, Database, PgStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let config = Config::from_env()?;

    let pool = create_database_pool(&config.database_url).await?;
    let db: Database = Arc::new(PgStore::new(pool));

    let app = create_router(db, &config.static_dir);

    let addr = config.bind_addr();
    log::info!("Warehouse admin listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn create_router(db: Database, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/dashboard", get(handlers::dashboard))
        .route("/dashboard/warehouse", post(handlers::select_warehouse))

        // Products
        .route("/dashboard/products", get(handlers::products::products_list))
        .route("/dashboard/products", post(handlers::products::create_product))
        .route("/dashboard/products/new", get(handlers::products::product_form))
        .route("/dashboard/products/delete", post(handlers::products::delete_products))
        .route("/dashboard/products/:id", get(handlers::products::product_edit_form))
        .route("/dashboard/products/:id", post(handlers::products::update_product))
        .route("/dashboard/products/:id/delete", post(handlers::products::delete_product))

        // Tier prices and packaging units of a product
        .route("/dashboard/products/:id/tiers", post(handlers::products::add_tier))
        .route("/dashboard/products/:id/tiers/:index", post(handlers::products::update_tier))
        .route("/dashboard/products/:id/tiers/:index/delete", post(handlers::products::delete_tier))
        .route("/dashboard/products/:id/units", post(handlers::products::add_unit))
        .route("/dashboard/products/:id/units/:unit_id/delete", post(handlers::products::delete_unit))

        // Categories
        .route("/dashboard/categories", get(handlers::categories::categories_list))
        .route("/dashboard/categories", post(handlers::categories::create_category))
        .route("/dashboard/categories/:id/delete", post(handlers::categories::delete_category))

        // Customers
        .route("/dashboard/customers", get(handlers::crm::customers_list))
        .route("/dashboard/customers", post(handlers::crm::create_customer))
        .route("/dashboard/customers/delete", post(handlers::crm::delete_customers))
        .route("/dashboard/customers/:id/delete", post(handlers::crm::delete_customer))

        // Stock movements
        .route("/dashboard/inbound", get(handlers::inventory::inbound_list))
        .route("/dashboard/inbound", post(handlers::inventory::create_inbound))
        .route("/dashboard/outbound", get(handlers::inventory::outbound_list))
        .route("/dashboard/outbound", post(handlers::inventory::create_outbound))
        .route("/dashboard/outbound/:id/approve", post(handlers::inventory::approve_outbound))
        .route("/dashboard/outbound/:id/reject", post(handlers::inventory::reject_outbound))

        // API routes
        .route("/api/products/:id/stock", get(handlers::api::product_stock))
        .route("/api/products/:id/tier-price", get(handlers::api::product_tier_price))
        .route("/api/customers", get(handlers::api::customers))

        // Static files
        .nest_service("/static", ServeDir::new(static_dir))

        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB
        )
        .with_state(db)
}
