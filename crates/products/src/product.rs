use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult, ProductId};

use crate::patch::Patch;

/// Timestamps are held at millisecond precision, the finest every store keeps.
pub fn stored_timestamp(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(3)
}

/// A catalog product record.
///
/// `price` is an arbitrary-precision decimal; it serializes as a decimal
/// string so no binary float ever sits between the caller and storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub quantity: i64,
    pub price: Decimal,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Build a freshly created product.
    ///
    /// `created_at` is `now` at millisecond precision. `updated_at` starts out
    /// empty; only updates set it.
    pub fn create(input: NewProduct, id: ProductId, now: DateTime<Utc>) -> DomainResult<Self> {
        input.validate()?;

        Ok(Self {
            id,
            name: input.name,
            quantity: input.quantity,
            price: input.price,
            status: input.status,
            created_at: stored_timestamp(now),
            updated_at: None,
        })
    }
}

/// Input for creating a product. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub quantity: i64,
    pub price: Decimal,
    pub status: bool,
}

impl NewProduct {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        // Negative quantity and price are accepted as-is.
        Ok(())
    }
}

/// Partial update of a product.
///
/// Only `Present` fields are written; `Absent` fields keep their stored value.
/// `updated_at` always changes on update: to the supplied value, or to the
/// time the update runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductUpdate {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub quantity: Patch<i64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub price: Patch<Decimal>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub status: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub updated_at: Patch<DateTime<Utc>>,
}

impl ProductUpdate {
    /// True when no attribute besides the timestamp would change.
    pub fn is_empty(&self) -> bool {
        self.quantity.is_absent() && self.price.is_absent() && self.status.is_absent()
    }

    /// Timestamp the update stamps on the record, at millisecond precision.
    pub fn effective_updated_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        stored_timestamp(self.updated_at.unwrap_or_else(|| now))
    }
}
