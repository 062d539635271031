//! Mapping between catalog types and stored documents.
//!
//! This is the storage boundary: products are flattened into documents on the
//! way in, and `product_from_document` is the explicit decode step on the way
//! out (decimal128 → `Decimal`, typed field checks). Nothing above this module
//! sees a `Document`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use catalog_core::ProductId;
use catalog_products::{PriceRange, Product, ProductUpdate};

use crate::document_store::{Decimal128, Decimal128Error, Document, Filter, Update, Value};

/// Persisted field names.
pub mod fields {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const QUANTITY: &str = "quantity";
    pub const PRICE: &str = "price";
    pub const STATUS: &str = "status";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` has unexpected type (expected {expected})")]
    UnexpectedType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field `price` cannot be decoded: {0}")]
    Price(#[from] Decimal128Error),
}

pub fn id_filter(id: ProductId) -> Filter {
    Filter::eq(fields::ID, *id.as_uuid())
}

/// Exclusive price bounds, encoded as decimal128 so the store compares them
/// against stored prices without a float round-trip.
pub fn price_filter(range: &PriceRange) -> Filter {
    let mut filter = Filter::all();
    if let Some(min) = &range.min {
        filter = filter.and_gt(fields::PRICE, Decimal128::from_decimal(min));
    }
    if let Some(max) = &range.max {
        filter = filter.and_lt(fields::PRICE, Decimal128::from_decimal(max));
    }
    filter
}

pub fn product_to_document(product: &Product) -> Document {
    let mut document = Document::new();
    document.insert(fields::ID.to_string(), Value::Uuid(*product.id.as_uuid()));
    document.insert(fields::NAME.to_string(), Value::String(product.name.clone()));
    document.insert(fields::QUANTITY.to_string(), Value::Int(product.quantity));
    document.insert(
        fields::PRICE.to_string(),
        Value::Decimal128(Decimal128::from_decimal(&product.price)),
    );
    document.insert(fields::STATUS.to_string(), Value::Bool(product.status));
    document.insert(fields::CREATED_AT.to_string(), Value::DateTime(product.created_at));
    document.insert(fields::UPDATED_AT.to_string(), Value::from(product.updated_at));
    document
}

/// `$set` document for a partial update: the present fields plus `updated_at`.
pub fn update_to_document(update: &ProductUpdate, now: DateTime<Utc>) -> Update {
    let mut set = Update::new();
    if let Some(quantity) = update.quantity.present() {
        set = set.set(fields::QUANTITY, *quantity);
    }
    if let Some(price) = update.price.present() {
        set = set.set(fields::PRICE, Decimal128::from_decimal(price));
    }
    if let Some(status) = update.status.present() {
        set = set.set(fields::STATUS, *status);
    }
    set.set(fields::UPDATED_AT, update.effective_updated_at(now))
}

pub fn product_from_document(document: &Document) -> Result<Product, MappingError> {
    let id = match required(document, fields::ID)? {
        Value::Uuid(u) => ProductId::from_uuid(*u),
        _ => return Err(unexpected(fields::ID, "uuid")),
    };
    let name = match required(document, fields::NAME)? {
        Value::String(s) => s.clone(),
        _ => return Err(unexpected(fields::NAME, "string")),
    };
    let quantity = match required(document, fields::QUANTITY)? {
        Value::Int(i) => *i,
        _ => return Err(unexpected(fields::QUANTITY, "int")),
    };
    let price = match required(document, fields::PRICE)? {
        Value::Decimal128(d) => d.to_decimal()?,
        Value::Int(i) => Decimal::from(*i),
        _ => return Err(unexpected(fields::PRICE, "decimal128")),
    };
    let status = match required(document, fields::STATUS)? {
        Value::Bool(b) => *b,
        _ => return Err(unexpected(fields::STATUS, "bool")),
    };
    let created_at = match required(document, fields::CREATED_AT)? {
        Value::DateTime(dt) => *dt,
        _ => return Err(unexpected(fields::CREATED_AT, "datetime")),
    };
    // Documents written before their first update may lack the field entirely.
    let updated_at = match document.get(fields::UPDATED_AT) {
        None | Some(Value::Null) => None,
        Some(Value::DateTime(dt)) => Some(*dt),
        Some(_) => return Err(unexpected(fields::UPDATED_AT, "datetime or null")),
    };

    Ok(Product {
        id,
        name,
        quantity,
        price,
        status,
        created_at,
        updated_at,
    })
}

fn required<'a>(document: &'a Document, field: &'static str) -> Result<&'a Value, MappingError> {
    document.get(field).ok_or(MappingError::MissingField(field))
}

fn unexpected(field: &'static str, expected: &'static str) -> MappingError {
    MappingError::UnexpectedType { field, expected }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_products::{stored_timestamp, NewProduct, Patch};
    use std::str::FromStr;

    fn widget() -> Product {
        let input = NewProduct {
            name: "Widget".to_string(),
            quantity: 5,
            price: Decimal::from_str("19.99").unwrap(),
            status: true,
        };
        Product::create(input, ProductId::new(), Utc::now()).unwrap()
    }

    #[test]
    fn product_survives_document_round_trip() {
        let product = widget();
        let decoded = product_from_document(&product_to_document(&product)).unwrap();

        assert_eq!(decoded, product);
        assert_eq!(decoded.price.to_string(), "19.99");
    }

    #[test]
    fn price_is_stored_as_decimal128() {
        let document = product_to_document(&widget());
        assert!(matches!(document[fields::PRICE], Value::Decimal128(_)));
        assert_eq!(document[fields::UPDATED_AT], Value::Null);
    }

    #[test]
    fn missing_updated_at_decodes_as_none() {
        let mut document = product_to_document(&widget());
        document.remove(fields::UPDATED_AT);

        assert_eq!(product_from_document(&document).unwrap().updated_at, None);
    }

    #[test]
    fn missing_required_field_is_reported() {
        let mut document = product_to_document(&widget());
        document.remove(fields::NAME);

        assert_eq!(
            product_from_document(&document),
            Err(MappingError::MissingField(fields::NAME))
        );
    }

    #[test]
    fn wrong_type_is_reported() {
        let mut document = product_to_document(&widget());
        document.insert(fields::QUANTITY.to_string(), Value::String("5".into()));

        assert_eq!(
            product_from_document(&document),
            Err(MappingError::UnexpectedType {
                field: fields::QUANTITY,
                expected: "int",
            })
        );
    }

    #[test]
    fn undecodable_price_is_reported() {
        let mut bytes = [0u8; 16];
        bytes[15] = 0x7C;
        let mut document = product_to_document(&widget());
        document.insert(
            fields::PRICE.to_string(),
            Value::Decimal128(Decimal128::from_bytes(bytes)),
        );

        assert_eq!(
            product_from_document(&document),
            Err(MappingError::Price(Decimal128Error::NaN))
        );
    }

    #[test]
    fn update_sets_only_present_fields_and_timestamp() {
        let now = Utc::now();
        let update = ProductUpdate {
            quantity: Patch::Present(3),
            ..ProductUpdate::default()
        };

        let set = update_to_document(&update, now);

        let keys: Vec<&str> = set.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec![fields::QUANTITY, fields::UPDATED_AT]);
        assert_eq!(
            set.fields()[fields::UPDATED_AT],
            Value::DateTime(stored_timestamp(now))
        );
    }

    #[test]
    fn update_keeps_supplied_timestamp() {
        let supplied = Utc::now() - chrono::Duration::hours(2);
        let update = ProductUpdate {
            price: Patch::Present(Decimal::new(2500, 2)),
            updated_at: Patch::Present(supplied),
            ..ProductUpdate::default()
        };

        let set = update_to_document(&update, Utc::now());

        assert_eq!(
            set.fields()[fields::UPDATED_AT],
            Value::DateTime(stored_timestamp(supplied))
        );
        assert_eq!(
            set.fields()[fields::PRICE],
            Value::Decimal128(Decimal128::from_decimal(&Decimal::new(2500, 2)))
        );
    }

    #[test]
    fn price_filter_uses_exclusive_decimal_bounds() {
        let range = PriceRange::new(Some(Decimal::from(10)), Some(Decimal::from(50)));
        let filter = price_filter(&range);

        assert_eq!(filter.clauses().len(), 2);
        assert!(filter.matches(&product_to_document(&widget())));

        let mut at_bound = widget();
        at_bound.price = Decimal::from(10);
        assert!(!filter.matches(&product_to_document(&at_bound)));
    }

    #[test]
    fn unbounded_price_filter_is_empty() {
        assert!(price_filter(&PriceRange::unbounded()).is_empty());
    }
}
