use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;
use tokio_stream::Stream;

use super::document::{Document, Filter, Update};

/// Lazy sequence of documents returned by `find`.
///
/// Finite and not restartable: once drained, run the query again.
pub type DocumentStream = Pin<Box<dyn Stream<Item = Result<Document, DocumentStoreError>> + Send>>;

/// Document store operation error.
///
/// These are **infrastructure errors** (storage, connectivity, encoding) as
/// opposed to domain errors (validation, missing records).
#[derive(Debug, Error)]
pub enum DocumentStoreError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("store unavailable: {0}")]
    Connection(String),

    #[error("document codec error: {0}")]
    Codec(String),

    #[error("store operation failed: {0}")]
    Backend(String),
}

/// A single collection of documents, addressed by filter documents.
///
/// Implementations own their connection handle and must be safe to share
/// across tasks. Single-document operations are atomic; nothing spans more
/// than one call.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_one(&self, document: Document) -> Result<(), DocumentStoreError>;

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, DocumentStoreError>;

    /// Every matching document, in the store's natural order.
    async fn find(&self, filter: &Filter) -> Result<DocumentStream, DocumentStoreError>;

    /// Apply `update` to the first matching document and return it as it is
    /// *after* the update, or `None` when nothing matched.
    async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<Document>, DocumentStoreError>;

    /// Delete the first matching document; returns the number deleted (0 or 1).
    async fn delete_one(&self, filter: &Filter) -> Result<u64, DocumentStoreError>;
}

#[async_trait::async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn insert_one(&self, document: Document) -> Result<(), DocumentStoreError> {
        (**self).insert_one(document).await
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, DocumentStoreError> {
        (**self).find_one(filter).await
    }

    async fn find(&self, filter: &Filter) -> Result<DocumentStream, DocumentStoreError> {
        (**self).find(filter).await
    }

    async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<Document>, DocumentStoreError> {
        (**self).find_one_and_update(filter, update).await
    }

    async fn delete_one(&self, filter: &Filter) -> Result<u64, DocumentStoreError> {
        (**self).delete_one(filter).await
    }
}
