pub mod api;
pub mod categories;
pub mod crm;
pub mod inventory;
pub mod products;

use axum::{
    extract::Form,
    http::StatusCode,
    response::{Html, Redirect},
};
use askama::Template;
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::middleware;

pub(crate) fn render<T: Template>(template: &T) -> Result<Html<String>, StatusCode> {
    template.render().map(Html).map_err(|e| {
        log::error!("Failed to render template: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

pub async fn dashboard() -> Redirect {
    Redirect::to("/dashboard/products")
}

#[derive(Deserialize)]
pub struct WarehouseForm {
    warehouse_id: i32,
    redirect: Option<String>,
}

// Switch the warehouse every dashboard page is scoped to
pub async fn select_warehouse(cookies: Cookies, Form(form): Form<WarehouseForm>) -> Redirect {
    middleware::select_warehouse(&cookies, form.warehouse_id);

    let target = form
        .redirect
        .filter(|path| path.starts_with('/') && !path.starts_with("//"))
        .unwrap_or_else(|| "/dashboard/products".to_string());
    Redirect::to(&target)
}
