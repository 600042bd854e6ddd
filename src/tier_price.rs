//! Tiered pricing for products.
//!
//! A product carries an ordered list of quantity bands, each with its own
//! unit price. The list is edited band by band from the product page and
//! stored as JSON text in `products.tier_price`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierPriceBand {
    /// Creation sequence number: the list length when the band was added.
    /// Not renumbered on delete, so it is a label rather than a position.
    pub id: usize,
    pub from: f64,
    pub to: f64,
    pub price: f64,
}

impl TierPriceBand {
    pub fn contains(&self, quantity: f64) -> bool {
        self.from <= quantity && quantity <= self.to
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierField {
    From,
    To,
    Price,
}

impl FromStr for TierField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "from" => Ok(TierField::From),
            "to" => Ok(TierField::To),
            "price" => Ok(TierField::Price),
            other => Err(Error::UnknownTierField(other.to_string())),
        }
    }
}

/// The bands of one product, addressed by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierPriceList {
    bands: Vec<TierPriceBand>,
}

impl Default for TierPriceList {
    /// A single all-zero band, what a product without stored tiers starts with.
    fn default() -> Self {
        Self {
            bands: vec![TierPriceBand::default()],
        }
    }
}

impl From<Vec<TierPriceBand>> for TierPriceList {
    fn from(bands: Vec<TierPriceBand>) -> Self {
        Self { bands }
    }
}

impl TierPriceList {
    pub fn bands(&self) -> &[TierPriceBand] {
        &self.bands
    }

    /// Append an all-zero band whose id is the current length.
    pub fn add(&mut self) -> &TierPriceBand {
        let id = self.bands.len();
        self.bands.push(TierPriceBand {
            id,
            ..TierPriceBand::default()
        });
        &self.bands[id]
    }

    pub fn update_field(&mut self, index: usize, field: TierField, value: f64) -> Result<()> {
        let len = self.bands.len();
        let band = self
            .bands
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        match field {
            TierField::From => band.from = value,
            TierField::To => band.to = value,
            TierField::Price => band.price = value,
        }
        Ok(())
    }

    /// Remove the band at `index`. Later bands shift left and keep their ids.
    pub fn delete_at(&mut self, index: usize) -> Result<TierPriceBand> {
        if index >= self.bands.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.bands.len(),
            });
        }
        Ok(self.bands.remove(index))
    }

    pub fn serialize(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.bands)?)
    }

    /// Parse stored tier text. Missing, blank or `null` text yields the default
    /// single band; anything else must be a JSON array of bands.
    pub fn deserialize(text: Option<&str>) -> Result<Self> {
        let text = match text.map(str::trim) {
            None | Some("") => return Ok(Self::default()),
            Some(text) => text,
        };
        let bands: Option<Vec<TierPriceBand>> = serde_json::from_str(text)?;
        Ok(bands.map(Self::from).unwrap_or_default())
    }

    /// Like [`TierPriceList::deserialize`], but falls back to the default band
    /// when the stored text is malformed.
    pub fn load(text: Option<&str>) -> Self {
        Self::deserialize(text).unwrap_or_else(|e| {
            log::warn!("Discarding unreadable tier prices: {}", e);
            Self::default()
        })
    }

    /// Unit price of the first band whose range holds `quantity`.
    pub fn price_for(&self, quantity: f64) -> Option<f64> {
        self.bands
            .iter()
            .find(|band| band.contains(quantity))
            .map(|band| band.price)
    }

    /// Index pairs of bands whose `[from, to]` ranges intersect.
    pub fn overlaps(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, a) in self.bands.iter().enumerate() {
            for (j, b) in self.bands.iter().enumerate().skip(i + 1) {
                if a.from <= b.to && b.from <= a.to {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }
}
