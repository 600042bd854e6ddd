use axum::{
    body::Bytes,
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use askama::Template;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    database::Database,
    error::Error,
    filters,
    middleware::current_warehouse,
    models::{stock_label, Category, NewUnit, Product, ProductDisplay, ProductInput, ProductUnit},
    tier_price::{TierField, TierPriceBand, TierPriceList},
    utils::{non_empty, repeated_values},
};

use super::render;

const DEFAULT_IMAGE: &str = "/products/product-1.jpg";

#[derive(Template)]
#[template(path = "products/list.html")]
struct ProductsTemplate {
    warehouse_id: i32,
    products: Vec<ProductDisplay>,
}

#[derive(Template)]
#[template(path = "products/form.html")]
struct ProductFormTemplate {
    warehouse_id: i32,
    editing: bool,
    action: String,
    values: ProductValues,
    categories: Vec<Category>,
    errors: Vec<String>,
    stock_label: String,
    units: Vec<ProductUnit>,
    tiers: Vec<TierPriceBand>,
    tier_text: String,
    tier_warnings: Vec<String>,
}

// What the form inputs show, either from a stored product or a rejected submit
#[derive(Debug, Default)]
struct ProductValues {
    name: String,
    description: String,
    image: String,
    sell_price: String,
    buy_price: String,
    category_id: i32,
    inputby: String,
}

impl From<&Product> for ProductValues {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            image: product.image.clone(),
            sell_price: product.sell_price.to_string(),
            buy_price: product.buy_price.to_string(),
            category_id: product.category_id,
            inputby: product.inputby.clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct ProductForm {
    name: String,
    description: String,
    image: Option<String>,
    sell_price: String,
    buy_price: String,
    category_id: Option<String>,
    inputby: Option<String>,
    tier_price: Option<String>,
}

impl ProductForm {
    fn values(&self) -> ProductValues {
        ProductValues {
            name: self.name.clone(),
            description: self.description.clone(),
            image: self.image.clone().unwrap_or_default(),
            sell_price: self.sell_price.clone(),
            buy_price: self.buy_price.clone(),
            category_id: self.category_id(),
            inputby: self.inputby.clone().unwrap_or_default(),
        }
    }

    fn category_id(&self) -> i32 {
        self.category_id
            .as_deref()
            .and_then(|id| id.trim().parse().ok())
            .unwrap_or_default()
    }

    /// Check the submitted fields and turn them into a product input.
    fn validate(&self, warehouse_id: i32, categories: &[Category]) -> Result<ProductInput, Vec<String>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        let name_len = name.chars().count();
        if !(6..=100).contains(&name_len) {
            errors.push("Product name must be between 6 and 100 characters".to_string());
        }

        let description = self.description.trim();
        let description_len = description.chars().count();
        if !(10..=1000).contains(&description_len) {
            errors.push("Description must be between 10 and 1000 characters".to_string());
        }

        let sell_price = parse_price("Sell price", &self.sell_price, &mut errors);
        let buy_price = parse_price("Buy price", &self.buy_price, &mut errors);

        let category_id = self.category_id();
        if !categories.iter().any(|c| c.category_id == category_id) {
            errors.push("Choose a category".to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ProductInput {
            warehouse_id,
            category_id,
            name: name.to_string(),
            description: description.to_string(),
            image: non_empty(self.image.clone()).unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            sell_price,
            buy_price,
            tier_price: None,
            inputby: non_empty(self.inputby.clone()).unwrap_or_else(|| "admin".to_string()),
        })
    }
}

fn parse_price(label: &str, raw: &str, errors: &mut Vec<String>) -> Decimal {
    match Decimal::from_str(raw.trim()) {
        Ok(price) if !price.is_sign_negative() => price,
        _ => {
            errors.push(format!("{} must be a number of at least 0", label));
            Decimal::ZERO
        }
    }
}

#[derive(Deserialize)]
pub struct TierForm {
    field: String,
    value: String,
}

#[derive(Deserialize)]
pub struct UnitForm {
    name: String,
    ratio: String,
}

async fn load_product(db: &Database, product_id: Uuid) -> Result<Product, StatusCode> {
    db.get_product(product_id)
        .await?
        .ok_or(StatusCode::NOT_FOUND)
}

async fn save_tiers(db: &Database, product_id: Uuid, tiers: &TierPriceList) -> Result<(), StatusCode> {
    let text = tiers.serialize()?;
    db.update_tier_price(product_id, text).await?;
    Ok(())
}

fn edit_url(product_id: Uuid) -> String {
    format!("/dashboard/products/{}", product_id)
}

async fn edit_page(
    db: &Database,
    warehouse_id: i32,
    product: &Product,
    values: ProductValues,
    errors: Vec<String>,
) -> Result<Html<String>, StatusCode> {
    let categories = db.list_categories(product.warehouse_id).await?;
    let units = db.list_units(product.product_id).await?;
    let tiers = TierPriceList::load(product.tier_price.as_deref());
    let tier_warnings = tiers
        .overlaps()
        .into_iter()
        .map(|(a, b)| format!("Tiers {} and {} overlap", a + 1, b + 1))
        .collect();

    let template = ProductFormTemplate {
        warehouse_id,
        editing: true,
        action: edit_url(product.product_id),
        values,
        categories,
        errors,
        stock_label: stock_label(product.stock, &units),
        units,
        tier_text: tiers.serialize()?,
        tiers: tiers.bands().to_vec(),
        tier_warnings,
    };
    render(&template)
}

fn new_page(
    warehouse_id: i32,
    values: ProductValues,
    categories: Vec<Category>,
    errors: Vec<String>,
) -> Result<Html<String>, StatusCode> {
    let template = ProductFormTemplate {
        warehouse_id,
        editing: false,
        action: "/dashboard/products".to_string(),
        values,
        categories,
        errors,
        stock_label: String::new(),
        units: Vec::new(),
        tiers: Vec::new(),
        tier_text: String::new(),
        tier_warnings: Vec::new(),
    };
    render(&template)
}

// Products list with stock shown in packaging units
pub async fn products_list(
    State(db): State<Database>,
    cookies: Cookies,
) -> Result<Html<String>, StatusCode> {
    let warehouse_id = current_warehouse(&cookies);

    let categories = db.list_categories(warehouse_id).await?;
    let units = db.list_warehouse_units(warehouse_id).await?;
    let products = db
        .list_products(warehouse_id)
        .await?
        .into_iter()
        .map(|product| ProductDisplay::new(product, &categories, &units))
        .collect();

    render(&ProductsTemplate { warehouse_id, products })
}

pub async fn product_form(
    State(db): State<Database>,
    cookies: Cookies,
) -> Result<Html<String>, StatusCode> {
    let warehouse_id = current_warehouse(&cookies);
    let categories = db.list_categories(warehouse_id).await?;
    let values = ProductValues {
        image: DEFAULT_IMAGE.to_string(),
        sell_price: "0".to_string(),
        buy_price: "0".to_string(),
        ..ProductValues::default()
    };
    new_page(warehouse_id, values, categories, Vec::new())
}

pub async fn create_product(
    State(db): State<Database>,
    cookies: Cookies,
    Form(form): Form<ProductForm>,
) -> Result<Response, StatusCode> {
    let warehouse_id = current_warehouse(&cookies);
    let categories = db.list_categories(warehouse_id).await?;

    match form.validate(warehouse_id, &categories) {
        Ok(input) => {
            let product = db.create_product(input).await?;
            log::info!("Created product {} ({})", product.name, product.product_id);
            Ok(Redirect::to(&edit_url(product.product_id)).into_response())
        }
        Err(errors) => {
            let page = new_page(warehouse_id, form.values(), categories, errors)?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

pub async fn product_edit_form(
    State(db): State<Database>,
    cookies: Cookies,
    Path(product_id): Path<Uuid>,
) -> Result<Html<String>, StatusCode> {
    let product = load_product(&db, product_id).await?;
    let values = ProductValues::from(&product);
    edit_page(&db, current_warehouse(&cookies), &product, values, Vec::new()).await
}

pub async fn update_product(
    State(db): State<Database>,
    cookies: Cookies,
    Path(product_id): Path<Uuid>,
    Form(form): Form<ProductForm>,
) -> Result<Response, StatusCode> {
    let product = load_product(&db, product_id).await?;
    let categories = db.list_categories(product.warehouse_id).await?;

    match form.validate(product.warehouse_id, &categories) {
        Ok(mut input) => {
            // The edit page posts back the tier list it was rendered with;
            // a form without the field leaves the stored list alone.
            input.tier_price = match form.tier_price.as_deref() {
                Some(text) => Some(TierPriceList::load(Some(text)).serialize()?),
                None => product.tier_price.clone(),
            };
            db.update_product(product_id, input).await?;
            Ok(Redirect::to("/dashboard/products").into_response())
        }
        Err(errors) => {
            let page = edit_page(&db, current_warehouse(&cookies), &product, form.values(), errors).await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

pub async fn delete_product(
    State(db): State<Database>,
    Path(product_id): Path<Uuid>,
) -> Result<Redirect, StatusCode> {
    db.delete_product(product_id).await?;
    log::info!("Deleted product {}", product_id);
    Ok(Redirect::to("/dashboard/products"))
}

// Bulk delete: the list page posts one `ids` field per checked row
pub async fn delete_products(
    State(db): State<Database>,
    body: Bytes,
) -> Result<Redirect, StatusCode> {
    let body = String::from_utf8(body.to_vec()).map_err(|_| StatusCode::BAD_REQUEST)?;
    let ids: Vec<Uuid> = repeated_values(&body, "ids");

    if !ids.is_empty() {
        let removed = db.delete_products(&ids).await?;
        log::info!("Deleted {} of {} selected products", removed, ids.len());
    }
    Ok(Redirect::to("/dashboard/products"))
}

pub async fn add_tier(
    State(db): State<Database>,
    Path(product_id): Path<Uuid>,
) -> Result<Redirect, StatusCode> {
    let product = load_product(&db, product_id).await?;
    let mut tiers = TierPriceList::load(product.tier_price.as_deref());
    tiers.add();
    save_tiers(&db, product_id, &tiers).await?;
    Ok(Redirect::to(&format!("{}#tiers", edit_url(product_id))))
}

pub async fn update_tier(
    State(db): State<Database>,
    Path((product_id, index)): Path<(Uuid, usize)>,
    Form(form): Form<TierForm>,
) -> Result<Redirect, StatusCode> {
    let field = TierField::from_str(&form.field)?;
    let value = form
        .value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(StatusCode::BAD_REQUEST)?;

    let product = load_product(&db, product_id).await?;
    let mut tiers = TierPriceList::load(product.tier_price.as_deref());
    tiers.update_field(index, field, value)?;
    save_tiers(&db, product_id, &tiers).await?;
    Ok(Redirect::to(&format!("{}#tiers", edit_url(product_id))))
}

pub async fn delete_tier(
    State(db): State<Database>,
    Path((product_id, index)): Path<(Uuid, usize)>,
) -> Result<Redirect, StatusCode> {
    let product = load_product(&db, product_id).await?;
    let mut tiers = TierPriceList::load(product.tier_price.as_deref());
    tiers.delete_at(index)?;
    save_tiers(&db, product_id, &tiers).await?;
    Ok(Redirect::to(&format!("{}#tiers", edit_url(product_id))))
}

pub async fn add_unit(
    State(db): State<Database>,
    Path(product_id): Path<Uuid>,
    Form(form): Form<UnitForm>,
) -> Result<Redirect, StatusCode> {
    let name = form.name.trim().to_string();
    if name.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let ratio = match form.ratio.trim().parse::<i32>() {
        Ok(ratio) if ratio > 0 => ratio,
        Ok(ratio) => return Err(Error::InvalidUnit { name, ratio: i64::from(ratio) }.into()),
        Err(_) => return Err(StatusCode::BAD_REQUEST),
    };

    load_product(&db, product_id).await?;
    db.create_unit(NewUnit { product_id, name, ratio }).await?;
    Ok(Redirect::to(&format!("{}#units", edit_url(product_id))))
}

pub async fn delete_unit(
    State(db): State<Database>,
    Path((product_id, unit_id)): Path<(Uuid, i32)>,
) -> Result<Redirect, StatusCode> {
    let units = db.list_units(product_id).await?;
    if !units.iter().any(|unit| unit.unit_id == unit_id) {
        return Err(StatusCode::NOT_FOUND);
    }
    db.delete_unit(unit_id).await?;
    Ok(Redirect::to(&format!("{}#units", edit_url(product_id))))
}
