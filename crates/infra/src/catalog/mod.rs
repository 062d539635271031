//! Product catalog: the service and its storage-boundary mapping.

use thiserror::Error;

use catalog_core::{DomainError, ProductId};

use crate::document_store::DocumentStoreError;

pub mod mapping;
pub mod service;

pub use mapping::MappingError;
pub use service::{ProductCatalogService, ProductStream};

/// Catalog operation error.
///
/// `NotFound` and `Insert` are the two conditions callers are expected to
/// handle; `Store` carries any other storage failure unchanged.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    NotFound(String),

    #[error("failed to insert product: {0}")]
    Insert(#[source] DocumentStoreError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("stored product could not be decoded: {0}")]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Store(#[from] DocumentStoreError),
}

impl CatalogError {
    pub fn not_found(id: ProductId) -> Self {
        Self::NotFound(format!("product not found with id: {id}"))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }
}

impl From<DomainError> for CatalogError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound(msg) => CatalogError::NotFound(msg),
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                CatalogError::Validation(msg)
            }
        }
    }
}
