//! Stock unit conversion.
//!
//! Product stock is stored as a single total in the smallest unit (pieces).
//! The dashboard shows it broken down across the product's packaging units,
//! e.g. 27 pieces with `box = 12` and `piece = 1` reads as `2 box 3 piece`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// A packaging unit: how many base units one of it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub name: String,
    pub ratio: i64,
}

impl Unit {
    pub fn new(name: impl Into<String>, ratio: i64) -> Self {
        Self { name: name.into(), ratio }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitQuantity {
    pub unit: String,
    pub quantity: u64,
}

/// Quantities per unit name, in the order the units were supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StockBreakdown {
    pub units: Vec<UnitQuantity>,
    /// Base units left over once every supplied unit has been filled.
    pub remainder: u64,
}

impl StockBreakdown {
    pub fn non_zero(&self) -> impl Iterator<Item = &UnitQuantity> {
        self.units.iter().filter(|entry| entry.quantity != 0)
    }

    fn record(&mut self, unit: &str, quantity: u64) {
        // A repeated unit name keeps its first position and takes the latest value.
        match self.units.iter_mut().find(|entry| entry.unit == unit) {
            Some(entry) => entry.quantity = quantity,
            None => self.units.push(UnitQuantity {
                unit: unit.to_string(),
                quantity,
            }),
        }
    }
}

impl fmt::Display for StockBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for entry in self.non_zero() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{} {}", entry.quantity, entry.unit)?;
            first = false;
        }
        Ok(())
    }
}

/// Break `total` base units down across `units`, largest first.
///
/// Units are consumed in the order given; callers list them from the largest
/// ratio to the smallest. Nothing is dropped: base units that no supplied unit
/// covers end up in [`StockBreakdown::remainder`].
pub fn convert(total: u64, units: &[Unit]) -> Result<StockBreakdown> {
    let mut ratios = Vec::with_capacity(units.len());
    for unit in units {
        match u64::try_from(unit.ratio) {
            Ok(ratio) if ratio > 0 => ratios.push(ratio),
            _ => {
                return Err(Error::InvalidUnit {
                    name: unit.name.clone(),
                    ratio: unit.ratio,
                })
            }
        }
    }

    let mut breakdown = StockBreakdown::default();
    let mut remaining = total;
    for (unit, ratio) in units.iter().zip(ratios) {
        let quantity = remaining / ratio;
        remaining -= quantity * ratio;
        breakdown.record(&unit.name, quantity);
    }
    breakdown.remainder = remaining;

    Ok(breakdown)
}
