use std::sync::{PoisonError, RwLock};

use super::document::{Document, Filter, Update};
use super::r#trait::{DocumentStore, DocumentStoreError, DocumentStream};

/// In-memory document collection.
///
/// Intended for tests/dev. Documents keep insertion order, and a unique index
/// on one field (`id` by default) rejects duplicate inserts the way the
/// MongoDB store's index does.
#[derive(Debug)]
pub struct InMemoryDocumentStore {
    documents: RwLock<Vec<Document>>,
    unique_key: Option<String>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
            unique_key: Some("id".to_string()),
        }
    }

    /// A collection without any unique index.
    pub fn without_unique_key() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
            unique_key: None,
        }
    }

    /// Document count, read through a poisoned lock.
    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> DocumentStoreError {
    DocumentStoreError::Backend("lock poisoned".to_string())
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert_one(&self, document: Document) -> Result<(), DocumentStoreError> {
        let mut documents = self.documents.write().map_err(|_| poisoned())?;

        if let Some(key) = &self.unique_key {
            if let Some(value) = document.get(key) {
                if documents.iter().any(|d| d.get(key) == Some(value)) {
                    return Err(DocumentStoreError::DuplicateKey(format!(
                        "{key} = {value:?}"
                    )));
                }
            }
        }

        documents.push(document);
        Ok(())
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, DocumentStoreError> {
        let documents = self.documents.read().map_err(|_| poisoned())?;
        Ok(documents.iter().find(|d| filter.matches(d)).cloned())
    }

    async fn find(&self, filter: &Filter) -> Result<DocumentStream, DocumentStoreError> {
        // Snapshot under the read lock; the stream never holds it.
        let matching: Vec<Document> = {
            let documents = self.documents.read().map_err(|_| poisoned())?;
            documents.iter().filter(|d| filter.matches(d)).cloned().collect()
        };

        Ok(Box::pin(tokio_stream::iter(matching.into_iter().map(Ok))))
    }

    async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<Document>, DocumentStoreError> {
        let mut documents = self.documents.write().map_err(|_| poisoned())?;

        match documents.iter_mut().find(|d| filter.matches(d)) {
            Some(document) => {
                update.apply_to(document);
                Ok(Some(document.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_one(&self, filter: &Filter) -> Result<u64, DocumentStoreError> {
        let mut documents = self.documents.write().map_err(|_| poisoned())?;

        match documents.iter().position(|d| filter.matches(d)) {
            Some(idx) => {
                documents.remove(idx);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
