pub mod crm;
pub mod inventory;

pub use crm::{Customer, CustomerDisplay, NewCustomer};
pub use inventory::{
    Category, NewCategory,
    Product, ProductInput, ProductDisplay,
    ProductUnit, NewUnit,
    Movement, NewMovement, MovementDisplay,
    stock_label,
};
