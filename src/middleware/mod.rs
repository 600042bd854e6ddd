pub mod warehouse;

pub use warehouse::{current_warehouse, select_warehouse};

#[cfg(test)]
pub use warehouse::DEFAULT_WAREHOUSE_ID;
