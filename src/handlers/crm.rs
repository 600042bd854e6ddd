use axum::{
    body::Bytes,
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
    models::{CustomerDisplay, NewCustomer},
    utils::{non_empty, repeated_values},
};

use super::render;

#[derive(Template)]
#[template(path = "customers.html")]
struct CustomersTemplate {
    warehouse_id: i32,
    customers: Vec<CustomerDisplay>,
}

#[derive(Deserialize)]
pub struct CustomerForm {
    name: String,
    phone: Option<String>,
    address: Option<String>,
}

// Customers List
pub async fn customers_list(
    State(db): State<Database>,
    cookies: Cookies,
) -> Result<Html<String>, StatusCode> {
    let warehouse_id = current_warehouse(&cookies);
    let customers = db
        .list_customers(warehouse_id)
        .await?
        .into_iter()
        .map(CustomerDisplay::from)
        .collect();

    render(&CustomersTemplate { warehouse_id, customers })
}

// Create Customer
pub async fn create_customer(
    State(db): State<Database>,
    cookies: Cookies,
    Form(form): Form<CustomerForm>,
) -> Result<Redirect, StatusCode> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let customer = db
        .create_customer(NewCustomer {
            warehouse_id: current_warehouse(&cookies),
            name: name.to_string(),
            phone: non_empty(form.phone),
            address: non_empty(form.address),
        })
        .await?;
    log::info!("Created customer {} ({})", customer.name, customer.customer_id);

    Ok(Redirect::to("/dashboard/customers"))
}

// Delete Customer
pub async fn delete_customer(
    State(db): State<Database>,
    Path(customer_id): Path<i32>,
) -> Result<Redirect, StatusCode> {
    db.delete_customer(customer_id).await?;
    Ok(Redirect::to("/dashboard/customers"))
}

// Delete the customers checked on the list page
pub async fn delete_customers(
    State(db): State<Database>,
    body: Bytes,
) -> Result<Redirect, StatusCode> {
    let body = String::from_utf8(body.to_vec()).map_err(|_| StatusCode::BAD_REQUEST)?;
    let ids: Vec<i32> = repeated_values(&body, "ids");

    if !ids.is_empty() {
        let removed = db.delete_customers(&ids).await?;
        log::info!("Deleted {} of {} selected customers", removed, ids.len());
    }
    Ok(Redirect::to("/dashboard/customers"))
}
