//! PostgreSQL store backed by a sqlx pool.

use async_trait::async_trait;
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use super::Store;
use crate::error::{Error, Result};
use crate::models::{
    Category, Customer, Movement, NewCategory, NewCustomer, NewMovement, NewUnit, Product,
    ProductInput, ProductUnit,
};
use crate::movement::{self, MovementKind};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Table, id column and approval column of a movement kind.
fn movement_table(kind: MovementKind) -> (&'static str, &'static str, &'static str) {
    match kind {
        MovementKind::Inbound => ("inbound", "inbound_id", "NULL::boolean"),
        MovementKind::Outbound => ("outbound", "outbound_id", "m.confirm"),
    }
}

fn expect_one(rows: u64, what: String) -> Result<()> {
    if rows == 0 {
        return Err(Error::NotFound(what));
    }
    Ok(())
}

#[async_trait]
impl Store for PgStore {
    async fn list_categories(&self, warehouse_id: i32) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE warehouse_id = $1 ORDER BY name",
        )
        .bind(warehouse_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn create_category(&self, new: NewCategory) -> Result<Category> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (warehouse_id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(new.warehouse_id)
        .bind(&new.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    async fn delete_category(&self, category_id: i32) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Locking the row blocks product inserts that reference it until commit.
        sqlx::query_scalar::<_, i32>(
            "SELECT category_id FROM categories WHERE category_id = $1 FOR UPDATE",
        )
        .bind(category_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound(format!("category {}", category_id)))?;

        let in_use = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE category_id = $1",
        )
        .bind(category_id)
        .fetch_one(&mut *tx)
        .await?;
        if in_use > 0 {
            return Err(Error::InUse(format!(
                "category {} has {} products",
                category_id, in_use
            )));
        }

        sqlx::query("DELETE FROM categories WHERE category_id = $1")
            .bind(category_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_products(&self, warehouse_id: i32) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE warehouse_id = $1 ORDER BY name",
        )
        .bind(warehouse_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn get_product(&self, product_id: Uuid) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE product_id = $1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    async fn create_product(&self, input: ProductInput) -> Result<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                product_id, warehouse_id, category_id, name, description, image,
                sell_price, buy_price, tier_price, inputby
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.warehouse_id)
        .bind(input.category_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.image)
        .bind(input.sell_price)
        .bind(input.buy_price)
        .bind(&input.tier_price)
        .bind(&input.inputby)
        .fetch_one(&self.pool)
        .await?;
        Ok(product)
    }

    async fn update_product(&self, product_id: Uuid, input: ProductInput) -> Result<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                category_id = $2, name = $3, description = $4, image = $5,
                sell_price = $6, buy_price = $7, tier_price = $8, inputby = $9,
                updated_at = NOW()
            WHERE product_id = $1
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(input.category_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.image)
        .bind(input.sell_price)
        .bind(input.buy_price)
        .bind(&input.tier_price)
        .bind(&input.inputby)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("product {}", product_id)))
    }

    async fn update_tier_price(&self, product_id: Uuid, tier_price: String) -> Result<()> {
        let result = sqlx::query(
            "UPDATE products SET tier_price = $2, updated_at = NOW() WHERE product_id = $1",
        )
        .bind(product_id)
        .bind(tier_price)
        .execute(&self.pool)
        .await?;
        expect_one(result.rows_affected(), format!("product {}", product_id))
    }

    async fn delete_product(&self, product_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        expect_one(result.rows_affected(), format!("product {}", product_id))
    }

    async fn delete_products(&self, product_ids: &[Uuid]) -> Result<u64> {
        let result = sqlx::query("DELETE FROM products WHERE product_id = ANY($1)")
            .bind(product_ids.to_vec())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_units(&self, product_id: Uuid) -> Result<Vec<ProductUnit>> {
        let units = sqlx::query_as::<_, ProductUnit>(
            "SELECT * FROM product_units WHERE product_id = $1 ORDER BY ratio DESC, unit_id",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(units)
    }

    async fn list_warehouse_units(&self, warehouse_id: i32) -> Result<Vec<ProductUnit>> {
        let units = sqlx::query_as::<_, ProductUnit>(
            r#"
            SELECT u.* FROM product_units u
            JOIN products p ON p.product_id = u.product_id
            WHERE p.warehouse_id = $1
            ORDER BY u.product_id, u.ratio DESC, u.unit_id
            "#,
        )
        .bind(warehouse_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(units)
    }

    async fn create_unit(&self, new: NewUnit) -> Result<ProductUnit> {
        if new.ratio <= 0 {
            return Err(Error::InvalidUnit { name: new.name, ratio: i64::from(new.ratio) });
        }
        let unit = sqlx::query_as::<_, ProductUnit>(
            "INSERT INTO product_units (product_id, name, ratio) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(new.product_id)
        .bind(&new.name)
        .bind(new.ratio)
        .fetch_one(&self.pool)
        .await?;
        Ok(unit)
    }

    async fn delete_unit(&self, unit_id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM product_units WHERE unit_id = $1")
            .bind(unit_id)
            .execute(&self.pool)
            .await?;
        expect_one(result.rows_affected(), format!("unit {}", unit_id))
    }

    async fn list_customers(&self, warehouse_id: i32) -> Result<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE warehouse_id = $1 ORDER BY name",
        )
        .bind(warehouse_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    async fn create_customer(&self, new: NewCustomer) -> Result<Customer> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (warehouse_id, name, phone, address)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(new.warehouse_id)
        .bind(&new.name)
        .bind(&new.phone)
        .bind(&new.address)
        .fetch_one(&self.pool)
        .await?;
        Ok(customer)
    }

    async fn delete_customer(&self, customer_id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM customers WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&self.pool)
            .await?;
        expect_one(result.rows_affected(), format!("customer {}", customer_id))
    }

    async fn delete_customers(&self, customer_ids: &[i32]) -> Result<u64> {
        let result = sqlx::query("DELETE FROM customers WHERE customer_id = ANY($1)")
            .bind(customer_ids.to_vec())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_movements(&self, kind: MovementKind, warehouse_id: i32) -> Result<Vec<Movement>> {
        let (table, id_column, confirm) = movement_table(kind);
        let sql = format!(
            r#"
            SELECT m.{id_column} AS id, m.warehouse_id, m.product_id, p.name AS product_name,
                   m.quantity, m.notes, m.input_by, {confirm} AS confirm, m.created_at
            FROM {table} m
            LEFT JOIN products p ON p.product_id = m.product_id
            WHERE m.warehouse_id = $1
            ORDER BY m.created_at DESC, m.{id_column} DESC
            "#,
        );
        let movements = sqlx::query_as::<_, Movement>(&sql)
            .bind(warehouse_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(movements)
    }

    async fn record_movement(&self, kind: MovementKind, new: NewMovement) -> Result<Movement> {
        let (table, id_column, _) = movement_table(kind);
        let mut tx = self.pool.begin().await?;

        let (stock, product_name, warehouse_id) = sqlx::query_as::<_, (i64, String, i32)>(
            "SELECT stock, name, warehouse_id FROM products WHERE product_id = $1 FOR UPDATE",
        )
        .bind(new.product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound(format!("product {}", new.product_id)))?;
        if warehouse_id != new.warehouse_id {
            return Err(Error::NotFound(format!(
                "product {} in warehouse {}",
                new.product_id, new.warehouse_id
            )));
        }

        let stock = movement::apply(stock, kind, new.quantity)?;

        sqlx::query("UPDATE products SET stock = $2, updated_at = NOW() WHERE product_id = $1")
            .bind(new.product_id)
            .bind(stock)
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            r#"
            INSERT INTO {table} (warehouse_id, product_id, quantity, notes, input_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {id_column} AS id, warehouse_id, product_id, NULL::text AS product_name,
                      quantity, notes, input_by, NULL::boolean AS confirm, created_at
            "#,
        );
        let mut recorded = sqlx::query_as::<_, Movement>(&sql)
            .bind(new.warehouse_id)
            .bind(new.product_id)
            .bind(new.quantity)
            .bind(&new.notes)
            .bind(&new.input_by)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        log::info!(
            "Recorded {} of {} for product {}, stock now {}",
            kind, new.quantity, new.product_id, stock
        );
        recorded.product_name = Some(product_name);
        Ok(recorded)
    }

    async fn set_outbound_confirm(&self, outbound_id: i32, confirm: bool) -> Result<()> {
        let result = sqlx::query("UPDATE outbound SET confirm = $2 WHERE outbound_id = $1")
            .bind(outbound_id)
            .bind(confirm)
            .execute(&self.pool)
            .await?;
        expect_one(result.rows_affected(), format!("outbound {}", outbound_id))
    }
}
