//! Products domain module.
//!
//! This crate contains the product record and its input shapes (create input,
//! partial update, price range), implemented purely as deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod patch;
pub mod product;
pub mod query;

pub use patch::Patch;
pub use product::{stored_timestamp, NewProduct, Product, ProductUpdate};
pub use query::PriceRange;
