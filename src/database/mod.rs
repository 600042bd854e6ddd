//! Persistence for the warehouse dashboard.
//!
//! Handlers talk to a [`Store`], never to SQL directly. [`PgStore`] is the
//! production backend; `MemoryStore` backs the tests.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use sqlx::{PgPool, Pool, Postgres};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Category, Customer, Movement, NewCategory, NewCustomer, NewMovement, NewUnit, Product,
    ProductInput, ProductUnit,
};
use crate::movement::MovementKind;

#[cfg(test)]
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Shared handle to the store, used as router state.
pub type Database = Arc<dyn Store>;

#[async_trait]
pub trait Store: Send + Sync {
    // Categories
    async fn list_categories(&self, warehouse_id: i32) -> Result<Vec<Category>>;
    async fn create_category(&self, new: NewCategory) -> Result<Category>;
    /// Fails with `InUse` while products still belong to the category.
    async fn delete_category(&self, category_id: i32) -> Result<()>;

    // Products
    async fn list_products(&self, warehouse_id: i32) -> Result<Vec<Product>>;
    async fn get_product(&self, product_id: Uuid) -> Result<Option<Product>>;
    async fn create_product(&self, input: ProductInput) -> Result<Product>;
    async fn update_product(&self, product_id: Uuid, input: ProductInput) -> Result<Product>;
    async fn update_tier_price(&self, product_id: Uuid, tier_price: String) -> Result<()>;
    /// Also removes the product's units and movements.
    async fn delete_product(&self, product_id: Uuid) -> Result<()>;
    async fn delete_products(&self, product_ids: &[Uuid]) -> Result<u64>;

    // Packaging units, largest ratio first
    async fn list_units(&self, product_id: Uuid) -> Result<Vec<ProductUnit>>;
    async fn list_warehouse_units(&self, warehouse_id: i32) -> Result<Vec<ProductUnit>>;
    async fn create_unit(&self, new: NewUnit) -> Result<ProductUnit>;
    async fn delete_unit(&self, unit_id: i32) -> Result<()>;

    // Customers
    async fn list_customers(&self, warehouse_id: i32) -> Result<Vec<Customer>>;
    async fn create_customer(&self, new: NewCustomer) -> Result<Customer>;
    async fn delete_customer(&self, customer_id: i32) -> Result<()>;
    async fn delete_customers(&self, customer_ids: &[i32]) -> Result<u64>;

    // Inbound / outbound, newest first
    async fn list_movements(&self, kind: MovementKind, warehouse_id: i32) -> Result<Vec<Movement>>;
    /// Inserts the movement and adjusts the product's stock in one step.
    async fn record_movement(&self, kind: MovementKind, new: NewMovement) -> Result<Movement>;
    async fn set_outbound_confirm(&self, outbound_id: i32, confirm: bool) -> Result<()>;
}

pub async fn create_database_pool(database_url: &str) -> Result<Pool<Postgres>> {
    let pool = PgPool::connect(database_url).await?;

    // Test the connection
    sqlx::query("SELECT 1")
        .fetch_one(&pool)
        .await?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(sqlx::Error::from)?;

    log::info!("Connected to database successfully");
    Ok(pool)
}
