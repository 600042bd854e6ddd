use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use askama::Template;
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::{
    database::Database,
    middleware::current_warehouse,
    models::{Category, NewCategory},
};

use super::render;

#[derive(Template)]
#[template(path = "categories.html")]
struct CategoriesTemplate {
    warehouse_id: i32,
    categories: Vec<Category>,
}

#[derive(Deserialize)]
pub struct CategoryForm {
    name: String,
}

pub async fn categories_list(
    State(db): State<Database>,
    cookies: Cookies,
) -> Result<Html<String>, StatusCode> {
    let warehouse_id = current_warehouse(&cookies);
    let categories = db.list_categories(warehouse_id).await?;
    render(&CategoriesTemplate { warehouse_id, categories })
}

pub async fn create_category(
    State(db): State<Database>,
    cookies: Cookies,
    Form(form): Form<CategoryForm>,
) -> Result<Redirect, StatusCode> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    db.create_category(NewCategory {
        warehouse_id: current_warehouse(&cookies),
        name: name.to_string(),
    })
    .await?;

    Ok(Redirect::to("/dashboard/categories"))
}

pub async fn delete_category(
    State(db): State<Database>,
    Path(category_id): Path<i32>,
) -> Result<Redirect, StatusCode> {
    db.delete_category(category_id).await?;
    Ok(Redirect::to("/dashboard/categories"))
}
