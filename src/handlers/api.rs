use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    database::Database,
    middleware::current_warehouse,
    models::Customer,
    stock::{self, StockBreakdown, Unit},
    tier_price::TierPriceList,
};

#[derive(Serialize)]
pub struct StockResponse {
    pub product_id: Uuid,
    pub total: i64,
    pub breakdown: StockBreakdown,
}

#[derive(Deserialize)]
pub struct TierPriceQuery {
    pub quantity: f64,
}

#[derive(Serialize)]
pub struct TierPriceResponse {
    pub product_id: Uuid,
    pub quantity: f64,
    /// Price of the matching tier band, if any
    pub tier_price: Option<f64>,
    pub sell_price: Decimal,
}

#[derive(Serialize)]
pub struct CustomerResponse {
    pub customer_id: i32,
    pub name: String,
    pub phone: Option<String>,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            customer_id: customer.customer_id,
            name: customer.name,
            phone: customer.phone,
        }
    }
}

pub async fn product_stock(
    State(db): State<Database>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<StockResponse>, StatusCode> {
    let product = db
        .get_product(product_id)
        .await?
        .ok_or(StatusCode::NOT_FOUND)?;
    let units: Vec<Unit> = db
        .list_units(product_id)
        .await?
        .iter()
        .map(Unit::from)
        .collect();

    let total = u64::try_from(product.stock).unwrap_or_default();
    let breakdown = stock::convert(total, &units)?;

    Ok(Json(StockResponse {
        product_id,
        total: product.stock,
        breakdown,
    }))
}

pub async fn product_tier_price(
    State(db): State<Database>,
    Path(product_id): Path<Uuid>,
    Query(query): Query<TierPriceQuery>,
) -> Result<Json<TierPriceResponse>, StatusCode> {
    let product = db
        .get_product(product_id)
        .await?
        .ok_or(StatusCode::NOT_FOUND)?;
    let tiers = TierPriceList::load(product.tier_price.as_deref());

    Ok(Json(TierPriceResponse {
        product_id,
        quantity: query.quantity,
        tier_price: tiers.price_for(query.quantity),
        sell_price: product.sell_price,
    }))
}

pub async fn customers(
    State(db): State<Database>,
    cookies: Cookies,
) -> Result<Json<Vec<CustomerResponse>>, StatusCode> {
    let customers = db
        .list_customers(current_warehouse(&cookies))
        .await?
        .into_iter()
        .map(CustomerResponse::from)
        .collect();

    Ok(Json(customers))
}
