use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::stock::{self, Unit};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub category_id: i32,
    pub warehouse_id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub warehouse_id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub product_id: Uuid,
    pub warehouse_id: i32,
    pub category_id: i32,
    pub name: String,
    pub description: String,
    pub image: String,
    pub sell_price: Decimal,
    pub buy_price: Decimal,
    /// JSON-encoded tier price bands, see `tier_price::TierPriceList`
    pub tier_price: Option<String>,
    /// Total stock in base units
    pub stock: i64,
    pub inputby: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable product fields, used for both create and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInput {
    pub warehouse_id: i32,
    pub category_id: i32,
    pub name: String,
    pub description: String,
    pub image: String,
    pub sell_price: Decimal,
    pub buy_price: Decimal,
    pub tier_price: Option<String>,
    pub inputby: String,
}

/// Packaging unit ("satuan") of a product: `ratio` base units per unit.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductUnit {
    pub unit_id: i32,
    pub product_id: Uuid,
    pub name: String,
    pub ratio: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUnit {
    pub product_id: Uuid,
    pub name: String,
    pub ratio: i32,
}

impl From<&ProductUnit> for Unit {
    fn from(unit: &ProductUnit) -> Self {
        Unit::new(unit.name.clone(), i64::from(unit.ratio))
    }
}

/// An inbound or outbound row; which one depends on the table it came from.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Movement {
    pub id: i32,
    pub warehouse_id: i32,
    pub product_id: Uuid,
    pub product_name: Option<String>,
    pub quantity: i64,
    pub notes: Option<String>,
    pub input_by: String,
    /// Outbound approval: `None` while pending. Always `None` for inbound.
    pub confirm: Option<bool>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMovement {
    pub warehouse_id: i32,
    pub product_id: Uuid,
    pub quantity: i64,
    pub notes: Option<String>,
    pub input_by: String,
}

/// Render `total` base units with the given packaging units, largest first.
/// Falls back to the raw number when a unit definition is unusable.
pub fn stock_label(total: i64, units: &[ProductUnit]) -> String {
    let units: Vec<Unit> = units.iter().map(Unit::from).collect();
    let total_units = u64::try_from(total).unwrap_or_default();
    match stock::convert(total_units, &units) {
        Ok(breakdown) => {
            let mut label = breakdown.to_string();
            if breakdown.remainder > 0 || label.is_empty() {
                if !label.is_empty() {
                    label.push(' ');
                }
                label.push_str(&breakdown.remainder.to_string());
            }
            label
        }
        Err(e) => {
            log::warn!("Cannot break down stock of {}: {}", total, e);
            total.to_string()
        }
    }
}

// Template-friendly product row for listing
#[derive(Debug, Serialize)]
pub struct ProductDisplay {
    pub product_id: Uuid,
    pub name: String,
    pub category: String,
    pub sell_price: Decimal,
    pub buy_price: Decimal,
    pub stock: i64,
    pub stock_label: String,
}

impl ProductDisplay {
    pub fn new(product: Product, categories: &[Category], units: &[ProductUnit]) -> Self {
        let own_units: Vec<ProductUnit> = units
            .iter()
            .filter(|unit| unit.product_id == product.product_id)
            .cloned()
            .collect();
        let category = categories
            .iter()
            .find(|c| c.category_id == product.category_id)
            .map(|c| c.name.clone())
            .unwrap_or_default();

        Self {
            product_id: product.product_id,
            stock_label: stock_label(product.stock, &own_units),
            name: product.name,
            category,
            sell_price: product.sell_price,
            buy_price: product.buy_price,
            stock: product.stock,
        }
    }
}

// Template-friendly movement row
#[derive(Debug, Serialize)]
pub struct MovementDisplay {
    pub id: i32,
    pub product_name: String,
    pub quantity: i64,
    pub quantity_label: String,
    pub notes: String,
    pub input_by: String,
    pub status: String,
    pub pending: bool,
    pub created_at: String,
}

impl MovementDisplay {
    pub fn new(movement: Movement, units: &[ProductUnit]) -> Self {
        let own_units: Vec<ProductUnit> = units
            .iter()
            .filter(|unit| unit.product_id == movement.product_id)
            .cloned()
            .collect();
        let status = match movement.confirm {
            Some(true) => "Approved",
            Some(false) => "Rejected",
            None => "Not Approved",
        };

        Self {
            id: movement.id,
            product_name: movement.product_name.unwrap_or_default(),
            quantity: movement.quantity,
            quantity_label: stock_label(movement.quantity, &own_units),
            notes: movement.notes.unwrap_or_default(),
            input_by: movement.input_by,
            status: status.to_string(),
            pending: movement.confirm.is_none(),
            created_at: movement.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}
