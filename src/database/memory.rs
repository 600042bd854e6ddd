//! In-memory store for testing.
//!
//! Keeps every table in one lock so that a movement and its stock change are
//! applied together, the way the SQL transaction does in `PgStore`.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Store;
use crate::error::{Error, Result};
use crate::models::{
    Category, Customer, Movement, NewCategory, NewCustomer, NewMovement, NewUnit, Product,
    ProductInput, ProductUnit,
};
use crate::movement::{self, MovementKind};

#[derive(Default)]
struct Tables {
    next_id: i32,
    categories: Vec<Category>,
    products: Vec<Product>,
    units: Vec<ProductUnit>,
    customers: Vec<Customer>,
    inbound: Vec<Movement>,
    outbound: Vec<Movement>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn movements(&self, kind: MovementKind) -> &Vec<Movement> {
        match kind {
            MovementKind::Inbound => &self.inbound,
            MovementKind::Outbound => &self.outbound,
        }
    }

    fn movements_mut(&mut self, kind: MovementKind) -> &mut Vec<Movement> {
        match kind {
            MovementKind::Inbound => &mut self.inbound,
            MovementKind::Outbound => &mut self.outbound,
        }
    }

    fn product_mut(&mut self, product_id: Uuid) -> Result<&mut Product> {
        self.products
            .iter_mut()
            .find(|p| p.product_id == product_id)
            .ok_or_else(|| Error::NotFound(format!("product {}", product_id)))
    }

    fn remove_products(&mut self, product_ids: &[Uuid]) -> u64 {
        let before = self.products.len();
        self.products.retain(|p| !product_ids.contains(&p.product_id));
        self.units.retain(|u| !product_ids.contains(&u.product_id));
        self.inbound.retain(|m| !product_ids.contains(&m.product_id));
        self.outbound.retain(|m| !product_ids.contains(&m.product_id));
        (before - self.products.len()) as u64
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_name<T: Clone>(rows: impl Iterator<Item = T>, name: impl Fn(&T) -> String) -> Vec<T> {
    let mut rows: Vec<T> = rows.collect();
    rows.sort_by_key(|row| name(row));
    rows
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_categories(&self, warehouse_id: i32) -> Result<Vec<Category>> {
        let tables = self.tables.read().await;
        Ok(sorted_by_name(
            tables.categories.iter().filter(|c| c.warehouse_id == warehouse_id).cloned(),
            |c| c.name.clone(),
        ))
    }

    async fn create_category(&self, new: NewCategory) -> Result<Category> {
        let mut tables = self.tables.write().await;
        let category = Category {
            category_id: tables.next_id(),
            warehouse_id: new.warehouse_id,
            name: new.name,
            created_at: Utc::now(),
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn delete_category(&self, category_id: i32) -> Result<()> {
        let mut tables = self.tables.write().await;
        let in_use = tables
            .products
            .iter()
            .filter(|p| p.category_id == category_id)
            .count();
        if in_use > 0 {
            return Err(Error::InUse(format!(
                "category {} has {} products",
                category_id, in_use
            )));
        }
        let before = tables.categories.len();
        tables.categories.retain(|c| c.category_id != category_id);
        if tables.categories.len() == before {
            return Err(Error::NotFound(format!("category {}", category_id)));
        }
        Ok(())
    }

    async fn list_products(&self, warehouse_id: i32) -> Result<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(sorted_by_name(
            tables.products.iter().filter(|p| p.warehouse_id == warehouse_id).cloned(),
            |p| p.name.clone(),
        ))
    }

    async fn get_product(&self, product_id: Uuid) -> Result<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.iter().find(|p| p.product_id == product_id).cloned())
    }

    async fn create_product(&self, input: ProductInput) -> Result<Product> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let product = Product {
            product_id: Uuid::new_v4(),
            warehouse_id: input.warehouse_id,
            category_id: input.category_id,
            name: input.name,
            description: input.description,
            image: input.image,
            sell_price: input.sell_price,
            buy_price: input.buy_price,
            tier_price: input.tier_price,
            stock: 0,
            inputby: input.inputby,
            created_at: now,
            updated_at: now,
        };
        tables.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, product_id: Uuid, input: ProductInput) -> Result<Product> {
        let mut tables = self.tables.write().await;
        let product = tables.product_mut(product_id)?;
        product.category_id = input.category_id;
        product.name = input.name;
        product.description = input.description;
        product.image = input.image;
        product.sell_price = input.sell_price;
        product.buy_price = input.buy_price;
        product.tier_price = input.tier_price;
        product.inputby = input.inputby;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn update_tier_price(&self, product_id: Uuid, tier_price: String) -> Result<()> {
        let mut tables = self.tables.write().await;
        let product = tables.product_mut(product_id)?;
        product.tier_price = Some(tier_price);
        product.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_product(&self, product_id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.remove_products(&[product_id]) {
            0 => Err(Error::NotFound(format!("product {}", product_id))),
            _ => Ok(()),
        }
    }

    async fn delete_products(&self, product_ids: &[Uuid]) -> Result<u64> {
        let mut tables = self.tables.write().await;
        Ok(tables.remove_products(product_ids))
    }

    async fn list_units(&self, product_id: Uuid) -> Result<Vec<ProductUnit>> {
        let tables = self.tables.read().await;
        let mut units: Vec<ProductUnit> = tables
            .units
            .iter()
            .filter(|u| u.product_id == product_id)
            .cloned()
            .collect();
        units.sort_by(|a, b| b.ratio.cmp(&a.ratio).then(a.unit_id.cmp(&b.unit_id)));
        Ok(units)
    }

    async fn list_warehouse_units(&self, warehouse_id: i32) -> Result<Vec<ProductUnit>> {
        let tables = self.tables.read().await;
        let mut units: Vec<ProductUnit> = tables
            .units
            .iter()
            .filter(|u| {
                tables
                    .products
                    .iter()
                    .any(|p| p.product_id == u.product_id && p.warehouse_id == warehouse_id)
            })
            .cloned()
            .collect();
        units.sort_by(|a, b| {
            a.product_id
                .cmp(&b.product_id)
                .then(b.ratio.cmp(&a.ratio))
                .then(a.unit_id.cmp(&b.unit_id))
        });
        Ok(units)
    }

    async fn create_unit(&self, new: NewUnit) -> Result<ProductUnit> {
        if new.ratio <= 0 {
            return Err(Error::InvalidUnit { name: new.name, ratio: i64::from(new.ratio) });
        }
        let mut tables = self.tables.write().await;
        tables.product_mut(new.product_id)?;
        let unit = ProductUnit {
            unit_id: tables.next_id(),
            product_id: new.product_id,
            name: new.name,
            ratio: new.ratio,
        };
        tables.units.push(unit.clone());
        Ok(unit)
    }

    async fn delete_unit(&self, unit_id: i32) -> Result<()> {
        let mut tables = self.tables.write().await;
        let before = tables.units.len();
        tables.units.retain(|u| u.unit_id != unit_id);
        if tables.units.len() == before {
            return Err(Error::NotFound(format!("unit {}", unit_id)));
        }
        Ok(())
    }

    async fn list_customers(&self, warehouse_id: i32) -> Result<Vec<Customer>> {
        let tables = self.tables.read().await;
        Ok(sorted_by_name(
            tables.customers.iter().filter(|c| c.warehouse_id == warehouse_id).cloned(),
            |c| c.name.clone(),
        ))
    }

    async fn create_customer(&self, new: NewCustomer) -> Result<Customer> {
        let mut tables = self.tables.write().await;
        let customer = Customer {
            customer_id: tables.next_id(),
            warehouse_id: new.warehouse_id,
            name: new.name,
            phone: new.phone,
            address: new.address,
            created_at: Utc::now(),
        };
        tables.customers.push(customer.clone());
        Ok(customer)
    }

    async fn delete_customer(&self, customer_id: i32) -> Result<()> {
        let mut tables = self.tables.write().await;
        let before = tables.customers.len();
        tables.customers.retain(|c| c.customer_id != customer_id);
        if tables.customers.len() == before {
            return Err(Error::NotFound(format!("customer {}", customer_id)));
        }
        Ok(())
    }

    async fn delete_customers(&self, customer_ids: &[i32]) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.customers.len();
        tables.customers.retain(|c| !customer_ids.contains(&c.customer_id));
        Ok((before - tables.customers.len()) as u64)
    }

    async fn list_movements(&self, kind: MovementKind, warehouse_id: i32) -> Result<Vec<Movement>> {
        let tables = self.tables.read().await;
        Ok(tables
            .movements(kind)
            .iter()
            .rev()
            .filter(|m| m.warehouse_id == warehouse_id)
            .map(|m| {
                let mut m = m.clone();
                m.product_name = tables
                    .products
                    .iter()
                    .find(|p| p.product_id == m.product_id)
                    .map(|p| p.name.clone());
                m
            })
            .collect())
    }

    async fn record_movement(&self, kind: MovementKind, new: NewMovement) -> Result<Movement> {
        let mut tables = self.tables.write().await;
        let product = tables.product_mut(new.product_id)?;
        if product.warehouse_id != new.warehouse_id {
            return Err(Error::NotFound(format!(
                "product {} in warehouse {}",
                new.product_id, new.warehouse_id
            )));
        }
        product.stock = movement::apply(product.stock, kind, new.quantity)?;
        product.updated_at = Utc::now();
        let product_name = product.name.clone();

        let recorded = Movement {
            id: tables.next_id(),
            warehouse_id: new.warehouse_id,
            product_id: new.product_id,
            product_name: Some(product_name),
            quantity: new.quantity,
            notes: new.notes,
            input_by: new.input_by,
            confirm: None,
            created_at: Utc::now(),
        };
        tables.movements_mut(kind).push(recorded.clone());
        Ok(recorded)
    }

    async fn set_outbound_confirm(&self, outbound_id: i32, confirm: bool) -> Result<()> {
        let mut tables = self.tables.write().await;
        let outbound = tables
            .outbound
            .iter_mut()
            .find(|m| m.id == outbound_id)
            .ok_or_else(|| Error::NotFound(format!("outbound {}", outbound_id)))?;
        outbound.confirm = Some(confirm);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product_input(category_id: i32, name: &str) -> ProductInput {
        ProductInput {
            warehouse_id: 1,
            category_id,
            name: name.to_string(),
            description: "Sealed retail carton".to_string(),
            image: "/products/product-1.jpg".to_string(),
            sell_price: Decimal::new(1500, 0),
            buy_price: Decimal::new(1200, 0),
            tier_price: None,
            inputby: "admin".to_string(),
        }
    }

    fn movement(product_id: Uuid, quantity: i64) -> NewMovement {
        NewMovement {
            warehouse_id: 1,
            product_id,
            quantity,
            notes: None,
            input_by: "admin".to_string(),
        }
    }

    async fn seeded() -> (MemoryStore, Product) {
        let store = MemoryStore::new();
        let category = store
            .create_category(NewCategory { warehouse_id: 1, name: "Drinks".into() })
            .await
            .unwrap();
        let product = store
            .create_product(product_input(category.category_id, "Mineral Water"))
            .await
            .unwrap();
        (store, product)
    }

    #[tokio::test]
    async fn products_are_scoped_by_warehouse_and_sorted() {
        let (store, _) = seeded().await;
        let mut other = product_input(1, "Apple Juice");
        store.create_product(other.clone()).await.unwrap();
        other.warehouse_id = 2;
        other.name = "Cola".into();
        store.create_product(other).await.unwrap();

        let names: Vec<String> = store
            .list_products(1)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Apple Juice", "Mineral Water"]);
        assert_eq!(store.list_products(2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn movements_adjust_stock() {
        let (store, product) = seeded().await;
        store
            .record_movement(MovementKind::Inbound, movement(product.product_id, 30))
            .await
            .unwrap();
        let out = store
            .record_movement(MovementKind::Outbound, movement(product.product_id, 12))
            .await
            .unwrap();
        assert_eq!(out.product_name.as_deref(), Some("Mineral Water"));
        assert_eq!(out.confirm, None);

        let stock = store.get_product(product.product_id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 18);
    }

    #[tokio::test]
    async fn rejected_outbound_leaves_stock_untouched() {
        let (store, product) = seeded().await;
        store
            .record_movement(MovementKind::Inbound, movement(product.product_id, 5))
            .await
            .unwrap();
        let err = store
            .record_movement(MovementKind::Outbound, movement(product.product_id, 6))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientStock { available: 5, requested: 6 }));

        assert_eq!(store.get_product(product.product_id).await.unwrap().unwrap().stock, 5);
        assert!(store.list_movements(MovementKind::Outbound, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn movements_list_newest_first() {
        let (store, product) = seeded().await;
        for quantity in [1, 2, 3] {
            store
                .record_movement(MovementKind::Inbound, movement(product.product_id, quantity))
                .await
                .unwrap();
        }
        let quantities: Vec<i64> = store
            .list_movements(MovementKind::Inbound, 1)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.quantity)
            .collect();
        assert_eq!(quantities, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn outbound_approval_is_recorded() {
        let (store, product) = seeded().await;
        store
            .record_movement(MovementKind::Inbound, movement(product.product_id, 10))
            .await
            .unwrap();
        let out = store
            .record_movement(MovementKind::Outbound, movement(product.product_id, 4))
            .await
            .unwrap();
        store.set_outbound_confirm(out.id, true).await.unwrap();

        let listed = store.list_movements(MovementKind::Outbound, 1).await.unwrap();
        assert_eq!(listed[0].confirm, Some(true));
        assert!(matches!(
            store.set_outbound_confirm(999, false).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn units_list_largest_ratio_first() {
        let (store, product) = seeded().await;
        for (name, ratio) in [("piece", 1), ("carton", 144), ("box", 12)] {
            store
                .create_unit(NewUnit { product_id: product.product_id, name: name.into(), ratio })
                .await
                .unwrap();
        }
        let names: Vec<String> = store
            .list_units(product.product_id)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["carton", "box", "piece"]);
        assert_eq!(store.list_warehouse_units(1).await.unwrap().len(), 3);
        assert!(store.list_warehouse_units(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_products_cascades() {
        let (store, product) = seeded().await;
        store
            .create_unit(NewUnit { product_id: product.product_id, name: "box".into(), ratio: 12 })
            .await
            .unwrap();
        store
            .record_movement(MovementKind::Inbound, movement(product.product_id, 3))
            .await
            .unwrap();

        let removed = store.delete_products(&[product.product_id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.list_units(product.product_id).await.unwrap().is_empty());
        assert!(store.list_movements(MovementKind::Inbound, 1).await.unwrap().is_empty());
        assert!(matches!(
            store.delete_product(product.product_id).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn category_in_use_cannot_be_deleted() {
        let (store, product) = seeded().await;
        assert!(matches!(
            store.delete_category(product.category_id).await,
            Err(Error::InUse(_))
        ));
        store.delete_product(product.product_id).await.unwrap();
        store.delete_category(product.category_id).await.unwrap();
        assert!(store.list_categories(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn customers_delete_one_or_many() {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for name in ["Toko Maju", "CV Sentosa", "UD Makmur"] {
            let customer = store
                .create_customer(NewCustomer {
                    warehouse_id: 1,
                    name: name.into(),
                    phone: None,
                    address: None,
                })
                .await
                .unwrap();
            ids.push(customer.customer_id);
        }

        store.delete_customer(ids[0]).await.unwrap();
        assert_eq!(store.delete_customers(&ids).await.unwrap(), 2);
        assert!(store.list_customers(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn movement_from_another_warehouse_is_refused() {
        let (store, product) = seeded().await;
        let mut elsewhere = movement(product.product_id, 5);
        elsewhere.warehouse_id = 2;

        let err = store
            .record_movement(MovementKind::Inbound, elsewhere)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(store.get_product(product.product_id).await.unwrap().unwrap().stock, 0);
        assert!(store.list_movements(MovementKind::Inbound, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unit_ratio_must_be_positive() {
        let (store, product) = seeded().await;
        for ratio in [0, -12] {
            let err = store
                .create_unit(NewUnit { product_id: product.product_id, name: "crate".into(), ratio })
                .await
                .unwrap_err();
            assert!(matches!(err, Error::InvalidUnit { .. }));
        }
        assert!(store.list_units(product.product_id).await.unwrap().is_empty());
    }
}
