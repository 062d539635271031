//! Document store abstraction (insert / find / find-and-update / delete by filter).

pub mod decimal128;
pub mod document;
pub mod in_memory;
#[cfg(feature = "mongodb")]
pub mod mongo;
pub mod r#trait;

pub use decimal128::{Decimal128, Decimal128Error};
pub use document::{Clause, Document, Filter, Predicate, Update, Value};
pub use in_memory::InMemoryDocumentStore;
#[cfg(feature = "mongodb")]
pub use mongo::MongoDocumentStore;
pub use r#trait::{DocumentStore, DocumentStoreError, DocumentStream};
