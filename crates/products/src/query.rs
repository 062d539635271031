//! Catalog query criteria.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price range for listing products.
///
/// Both bounds are exclusive and independently optional: `min` selects
/// `price > min`, `max` selects `price < max`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(rename = "price_min", default)]
    pub min: Option<Decimal>,
    #[serde(rename = "price_max", default)]
    pub max: Option<Decimal>,
}

impl PriceRange {
    pub fn new(min: Option<Decimal>, max: Option<Decimal>) -> Self {
        Self { min, max }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, price: &Decimal) -> bool {
        self.min.is_none_or(|min| *price > min) && self.max.is_none_or(|max| *price < max)
    }
}
