//! Error types for the warehouse dashboard.

use axum::http::StatusCode;
use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A packaging unit with a non-positive ratio was handed to the converter
    #[error("Invalid unit '{name}': ratio must be positive, got {ratio}")]
    InvalidUnit { name: String, ratio: i64 },

    /// Tier band index outside the current list
    #[error("Tier index {index} out of range for list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Unknown tier field: {0}")]
    UnknownTierField(String),

    /// Stored tier price text could not be decoded
    #[error("Failed to parse tier prices: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Movement quantity must be positive, got {0}")]
    InvalidQuantity(i64),

    #[error("Insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: i64, requested: i64 },

    #[error("Not found: {0}")]
    NotFound(String),

    /// Row still referenced by others, e.g. a category that has products
    #[error("Still in use: {0}")]
    InUse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Error {
    /// HTTP status a handler answers with when an operation fails with this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidUnit { .. }
            | Error::IndexOutOfRange { .. }
            | Error::UnknownTierField(_)
            | Error::Parse(_)
            | Error::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
            Error::InsufficientStock { .. } | Error::InUse(_) => StatusCode::CONFLICT,
            Error::Config(_) | Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for StatusCode {
    fn from(err: Error) -> Self {
        let status = err.status_code();
        if status.is_server_error() {
            log::error!("{}", err);
        } else {
            log::debug!("request rejected: {}", err);
        }
        status
    }
}
