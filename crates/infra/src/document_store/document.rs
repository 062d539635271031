//! Documents, filter documents, and update documents.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::decimal128::Decimal128;

/// A field value as held by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    String(String),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    Decimal128(Decimal128),
}

impl Value {
    /// Store-side comparison used by filters.
    ///
    /// Integers and decimals compare numerically with each other. Values of
    /// unrelated kinds are incomparable and never satisfy a predicate.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::Decimal128(a), Value::Decimal128(b)) => a.compare(b),
            (Value::Int(a), Value::Decimal128(b)) => {
                Some(Decimal::from(*a).cmp(&b.to_decimal().ok()?))
            }
            (Value::Decimal128(a), Value::Int(b)) => {
                Some(a.to_decimal().ok()?.cmp(&Decimal::from(*b)))
            }
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value)
    }
}

impl From<Decimal128> for Value {
    fn from(value: Decimal128) -> Self {
        Value::Decimal128(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// A stored document: field name → value.
pub type Document = BTreeMap<String, Value>;

/// A single field predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Eq(Value),
    Gt(Value),
    Lt(Value),
}

impl Predicate {
    /// Evaluate against a field value (`None` when the field is missing).
    pub fn matches(&self, value: Option<&Value>) -> bool {
        match self {
            // A missing field equals null, as in MongoDB.
            Predicate::Eq(expected) => {
                let actual = value.unwrap_or(&Value::Null);
                actual.compare(expected) == Some(Ordering::Equal)
            }
            Predicate::Gt(bound) => {
                value.is_some_and(|v| v.compare(bound) == Some(Ordering::Greater))
            }
            Predicate::Lt(bound) => {
                value.is_some_and(|v| v.compare(bound) == Some(Ordering::Less))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub field: String,
    pub predicate: Predicate,
}

/// Filter document: a conjunction of field predicates.
///
/// An empty filter selects every document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and_eq(field, value)
    }

    pub fn and_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and(field, Predicate::Eq(value.into()))
    }

    pub fn and_gt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and(field, Predicate::Gt(value.into()))
    }

    pub fn and_lt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and(field, Predicate::Lt(value.into()))
    }

    pub fn and(mut self, field: impl Into<String>, predicate: Predicate) -> Self {
        self.clauses.push(Clause {
            field: field.into(),
            predicate,
        });
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.clauses
            .iter()
            .all(|c| c.predicate.matches(document.get(&c.field)))
    }
}

/// Update document: the fields to `$set` on the matched document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Update {
    set: Document,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.insert(field.into(), value.into());
        self
    }

    pub fn fields(&self) -> &Document {
        &self.set
    }

    /// Merge the `$set` fields on top of `document`; other fields are untouched.
    pub fn apply_to(&self, document: &mut Document) {
        for (field, value) in &self.set {
            document.insert(field.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(text: &str) -> Value {
        Value::Decimal128(Decimal128::from_decimal(&text.parse().unwrap()))
    }

    fn doc(pairs: &[(&str, Value)]) -> Document {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(Filter::all().matches(&Document::new()));
    }

    #[test]
    fn range_filter_excludes_bounds() {
        let filter = Filter::all()
            .and_gt("price", price("10"))
            .and_lt("price", price("50"));

        assert!(!filter.matches(&doc(&[("price", price("10.00"))])));
        assert!(!filter.matches(&doc(&[("price", price("50"))])));
        assert!(filter.matches(&doc(&[("price", price("10.01"))])));
        assert!(filter.matches(&doc(&[("price", Value::Int(20))])));
    }

    #[test]
    fn range_predicate_skips_missing_and_mismatched_fields() {
        let filter = Filter::all().and_gt("price", price("1"));

        assert!(!filter.matches(&Document::new()));
        assert!(!filter.matches(&doc(&[("price", Value::String("5".into()))])));
    }

    #[test]
    fn eq_filter_matches_uuid() {
        let id = Uuid::now_v7();
        let filter = Filter::eq("id", id);

        assert!(filter.matches(&doc(&[("id", Value::Uuid(id))])));
        assert!(!filter.matches(&doc(&[("id", Value::Uuid(Uuid::now_v7()))])));
    }

    #[test]
    fn eq_null_matches_missing_field() {
        assert!(Filter::eq("updated_at", Value::Null).matches(&Document::new()));
    }

    #[test]
    fn update_merges_on_top_of_document() {
        let mut document = doc(&[("name", "Widget".into()), ("quantity", Value::Int(5))]);

        Update::new().set("quantity", 3i64).apply_to(&mut document);

        assert_eq!(document.get("quantity"), Some(&Value::Int(3)));
        assert_eq!(document.get("name"), Some(&Value::String("Widget".into())));
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Value::from(None::<bool>), Value::Null);
        assert_eq!(Value::from(Some(true)), Value::Bool(true));
    }
}
