use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use askama::Template;
use serde::Deserialize;
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    database::Database,
    error::Error,
    middleware::current_warehouse,
    models::{MovementDisplay, NewMovement, Product, ProductUnit},
    movement::MovementKind,
    utils::non_empty,
};

use super::render;

#[derive(Template)]
#[template(path = "inventory/movements.html")]
struct MovementsTemplate {
    warehouse_id: i32,
    title: String,
    path: String,
    is_outbound: bool,
    products: Vec<Product>,
    units: Vec<UnitOption>,
    movements: Vec<MovementDisplay>,
}

// Unit choice for the quantity input, labelled with its product
struct UnitOption {
    unit_id: i32,
    label: String,
}

#[derive(Deserialize)]
pub struct MovementForm {
    product_id: Uuid,
    quantity: String,
    unit_id: Option<String>,
    notes: Option<String>,
    input_by: Option<String>,
}

fn page_path(kind: MovementKind) -> String {
    format!("/dashboard/{}", kind)
}

async fn movements_page(
    db: &Database,
    cookies: &Cookies,
    kind: MovementKind,
) -> Result<Html<String>, StatusCode> {
    let warehouse_id = current_warehouse(cookies);

    let products = db.list_products(warehouse_id).await?;
    let units = db.list_warehouse_units(warehouse_id).await?;
    let movements = db
        .list_movements(kind, warehouse_id)
        .await?
        .into_iter()
        .map(|movement| MovementDisplay::new(movement, &units))
        .collect();
    let units = units
        .iter()
        .map(|unit| UnitOption {
            unit_id: unit.unit_id,
            label: unit_label(unit, &products),
        })
        .collect();

    let template = MovementsTemplate {
        warehouse_id,
        title: match kind {
            MovementKind::Inbound => "Inbound".to_string(),
            MovementKind::Outbound => "Outbound".to_string(),
        },
        path: page_path(kind),
        is_outbound: kind == MovementKind::Outbound,
        products,
        units,
        movements,
    };
    render(&template)
}

fn unit_label(unit: &ProductUnit, products: &[Product]) -> String {
    let product = products
        .iter()
        .find(|p| p.product_id == unit.product_id)
        .map(|p| p.name.as_str())
        .unwrap_or_default();
    format!("{} of {} ({})", unit.name, product, unit.ratio)
}

async fn record(
    db: &Database,
    cookies: &Cookies,
    kind: MovementKind,
    form: MovementForm,
) -> Result<Redirect, StatusCode> {
    let count = form
        .quantity
        .trim()
        .parse::<i64>()
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    // Quantities may be entered in a packaging unit of the product.
    let quantity = match non_empty(form.unit_id).map(|id| id.parse::<i32>()) {
        None => count,
        Some(Err(_)) => return Err(StatusCode::BAD_REQUEST),
        Some(Ok(unit_id)) => {
            let units = db.list_units(form.product_id).await?;
            let unit = units
                .iter()
                .find(|unit| unit.unit_id == unit_id)
                .ok_or(StatusCode::BAD_REQUEST)?;
            count
                .checked_mul(i64::from(unit.ratio))
                .ok_or(Error::InvalidQuantity(count))?
        }
    };

    let movement = db
        .record_movement(
            kind,
            NewMovement {
                warehouse_id: current_warehouse(cookies),
                product_id: form.product_id,
                quantity,
                notes: non_empty(form.notes),
                input_by: non_empty(form.input_by).unwrap_or_else(|| "admin".to_string()),
            },
        )
        .await?;
    log::info!(
        "{} {} of product {} by {}",
        kind, movement.quantity, movement.product_id, movement.input_by
    );

    Ok(Redirect::to(&page_path(kind)))
}

pub async fn inbound_list(
    State(db): State<Database>,
    cookies: Cookies,
) -> Result<Html<String>, StatusCode> {
    movements_page(&db, &cookies, MovementKind::Inbound).await
}

pub async fn create_inbound(
    State(db): State<Database>,
    cookies: Cookies,
    Form(form): Form<MovementForm>,
) -> Result<Redirect, StatusCode> {
    record(&db, &cookies, MovementKind::Inbound, form).await
}

pub async fn outbound_list(
    State(db): State<Database>,
    cookies: Cookies,
) -> Result<Html<String>, StatusCode> {
    movements_page(&db, &cookies, MovementKind::Outbound).await
}

pub async fn create_outbound(
    State(db): State<Database>,
    cookies: Cookies,
    Form(form): Form<MovementForm>,
) -> Result<Redirect, StatusCode> {
    record(&db, &cookies, MovementKind::Outbound, form).await
}

pub async fn approve_outbound(
    State(db): State<Database>,
    Path(outbound_id): Path<i32>,
) -> Result<Redirect, StatusCode> {
    db.set_outbound_confirm(outbound_id, true).await?;
    Ok(Redirect::to("/dashboard/outbound"))
}

pub async fn reject_outbound(
    State(db): State<Database>,
    Path(outbound_id): Path<i32>,
) -> Result<Redirect, StatusCode> {
    db.set_outbound_confirm(outbound_id, false).await?;
    Ok(Redirect::to("/dashboard/outbound"))
}
