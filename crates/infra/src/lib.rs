//! Infrastructure layer: document store adapters and the catalog service.

pub mod catalog;
pub mod document_store;


pub use catalog::{CatalogError, ProductCatalogService, ProductStream};
pub use document_store::{DocumentStore, DocumentStoreError, InMemoryDocumentStore};
#[cfg(feature = "mongodb")]
pub use document_store::MongoDocumentStore;
