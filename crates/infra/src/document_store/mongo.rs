//! MongoDB-backed document store.
//!
//! Documents are converted to BSON at this boundary: UUIDs become binary
//! subtype 4, datetimes become BSON datetimes (millisecond precision) and
//! decimals stay decimal128, so range filters are evaluated by the server
//! on the same fixed-point values the application wrote.

use bson::spec::BinarySubtype;
use bson::{Binary, Bson};
use chrono::{DateTime, Utc};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use tokio_stream::StreamExt;
use uuid::Uuid;

use super::decimal128::Decimal128;
use super::document::{Document, Filter, Predicate, Update, Value};
use super::r#trait::{DocumentStore, DocumentStoreError, DocumentStream};

const DUPLICATE_KEY_CODE: i32 = 11000;
const UNIQUE_KEY: &str = "id";

/// MongoDB collection wrapper.
///
/// `Collection` is a cheap handle over the client's connection pool; clone it
/// freely and keep one store per process.
#[derive(Debug, Clone)]
pub struct MongoDocumentStore {
    collection: Collection<bson::Document>,
}

impl MongoDocumentStore {
    pub fn new(collection: Collection<bson::Document>) -> Self {
        Self { collection }
    }

    /// Connect and make sure the unique index on `id` exists.
    pub async fn connect(
        uri: &str,
        database: &str,
        collection: &str,
    ) -> Result<Self, DocumentStoreError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| map_mongo_error("connect", e))?;
        let collection = client
            .database(database)
            .collection::<bson::Document>(collection);

        let mut keys = bson::Document::new();
        keys.insert(UNIQUE_KEY, 1i32);
        let index = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection
            .create_index(index)
            .await
            .map_err(|e| map_mongo_error("create_index", e))?;

        tracing::info!(database, collection = collection.name(), "connected to mongodb");
        Ok(Self::new(collection))
    }
}

#[async_trait::async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn insert_one(&self, document: Document) -> Result<(), DocumentStoreError> {
        self.collection
            .insert_one(to_bson_document(&document))
            .await
            .map_err(|e| map_mongo_error("insert_one", e))?;
        Ok(())
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, DocumentStoreError> {
        let found = self
            .collection
            .find_one(filter_to_bson(filter))
            .await
            .map_err(|e| map_mongo_error("find_one", e))?;
        found.map(|d| from_bson_document(&d)).transpose()
    }

    async fn find(&self, filter: &Filter) -> Result<DocumentStream, DocumentStoreError> {
        let cursor = self
            .collection
            .find(filter_to_bson(filter))
            .await
            .map_err(|e| map_mongo_error("find", e))?;

        Ok(Box::pin(cursor.map(|item| {
            let document = item.map_err(|e| map_mongo_error("find", e))?;
            from_bson_document(&document)
        })))
    }

    async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<Document>, DocumentStoreError> {
        let mut set = bson::Document::new();
        set.insert("$set", to_bson_document(update.fields()));

        let updated = self
            .collection
            .find_one_and_update(filter_to_bson(filter), set)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| map_mongo_error("find_one_and_update", e))?;
        updated.map(|d| from_bson_document(&d)).transpose()
    }

    async fn delete_one(&self, filter: &Filter) -> Result<u64, DocumentStoreError> {
        let result = self
            .collection
            .delete_one(filter_to_bson(filter))
            .await
            .map_err(|e| map_mongo_error("delete_one", e))?;
        Ok(result.deleted_count)
    }
}

fn map_mongo_error(operation: &str, err: mongodb::error::Error) -> DocumentStoreError {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY_CODE => {
            DocumentStoreError::DuplicateKey(write.message.clone())
        }
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => {
            DocumentStoreError::Connection(format!("{operation}: {err}"))
        }
        _ => DocumentStoreError::Backend(format!("{operation}: {err}")),
    }
}

fn to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Int(i) => Bson::Int64(*i),
        Value::String(s) => Bson::String(s.clone()),
        Value::Uuid(u) => Bson::Binary(Binary {
            subtype: BinarySubtype::Uuid,
            bytes: u.as_bytes().to_vec(),
        }),
        Value::DateTime(dt) => Bson::DateTime(bson::DateTime::from_millis(dt.timestamp_millis())),
        Value::Decimal128(d) => Bson::Decimal128(bson::Decimal128::from_bytes(d.bytes())),
    }
}

fn from_bson(field: &str, value: &Bson) -> Result<Value, DocumentStoreError> {
    let unsupported = || {
        DocumentStoreError::Codec(format!(
            "field `{field}` has unsupported bson type {:?}",
            value.element_type()
        ))
    };

    Ok(match value {
        Bson::Null => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(i) => Value::Int(i64::from(*i)),
        Bson::Int64(i) => Value::Int(*i),
        Bson::String(s) => Value::String(s.clone()),
        Bson::Binary(b) if matches!(b.subtype, BinarySubtype::Uuid | BinarySubtype::UuidOld) => {
            let uuid = Uuid::from_slice(&b.bytes).map_err(|_| unsupported())?;
            Value::Uuid(uuid)
        }
        Bson::DateTime(dt) => {
            let dt = DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis())
                .ok_or_else(unsupported)?;
            Value::DateTime(dt)
        }
        Bson::Decimal128(d) => Value::Decimal128(Decimal128::from_bytes(d.bytes())),
        _ => return Err(unsupported()),
    })
}

fn to_bson_document(document: &Document) -> bson::Document {
    let mut out = bson::Document::new();
    for (field, value) in document {
        out.insert(field.clone(), to_bson(value));
    }
    out
}

fn from_bson_document(document: &bson::Document) -> Result<Document, DocumentStoreError> {
    document
        .iter()
        // `_id` is the server's own key; the catalog addresses records by `id`.
        .filter(|(field, _)| field.as_str() != "_id")
        .map(|(field, value)| -> Result<(String, Value), DocumentStoreError> {
            Ok((field.clone(), from_bson(field, value)?))
        })
        .collect()
}

fn filter_to_bson(filter: &Filter) -> bson::Document {
    let mut out = bson::Document::new();
    for clause in filter.clauses() {
        let (operator, value) = match &clause.predicate {
            Predicate::Eq(value) => {
                out.insert(clause.field.clone(), to_bson(value));
                continue;
            }
            Predicate::Gt(value) => ("$gt", value),
            Predicate::Lt(value) => ("$lt", value),
        };

        match out.get_mut(&clause.field) {
            Some(Bson::Document(operators)) => {
                operators.insert(operator, to_bson(value));
            }
            _ => {
                let mut operators = bson::Document::new();
                operators.insert(operator, to_bson(value));
                out.insert(clause.field.clone(), operators);
            }
        }
    }
    out
}
