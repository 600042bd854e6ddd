pub mod form;

pub use form::{non_empty, repeated_values};
