use askama::Result;
use std::fmt::Display;

// Prices with two decimals, usable as `|money` in the templates.
#[allow(clippy::unnecessary_wraps)]
pub fn money<T: Display>(value: T) -> Result<String> {
    Ok(format!("{:.2}", value))
}
