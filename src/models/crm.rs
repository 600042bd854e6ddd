use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub customer_id: i32,
    pub warehouse_id: i32,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub warehouse_id: i32,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

// Template-friendly display version for listing
#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerDisplay {
    pub customer_id: i32,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub created_at: String,
}

impl From<Customer> for CustomerDisplay {
    fn from(customer: Customer) -> Self {
        Self {
            customer_id: customer.customer_id,
            name: customer.name,
            phone: customer.phone.unwrap_or_default(),
            address: customer.address.unwrap_or_default(),
            created_at: customer.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}
