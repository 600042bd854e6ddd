//! Inbound/outbound stock bookkeeping.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Inbound,
    Outbound,
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementKind::Inbound => f.write_str("inbound"),
            MovementKind::Outbound => f.write_str("outbound"),
        }
    }
}

/// Stock after moving `quantity` base units in or out.
///
/// Outbound movements may not take more than is on hand.
pub fn apply(stock: i64, kind: MovementKind, quantity: i64) -> Result<i64> {
    if quantity <= 0 {
        return Err(Error::InvalidQuantity(quantity));
    }
    match kind {
        MovementKind::Inbound => stock
            .checked_add(quantity)
            .ok_or(Error::InvalidQuantity(quantity)),
        MovementKind::Outbound if quantity > stock => Err(Error::InsufficientStock {
            available: stock,
            requested: quantity,
        }),
        MovementKind::Outbound => Ok(stock - quantity),
    }
}
