//! Request/response DTOs.
//!
//! Request bodies reuse the domain input types (`NewProduct`, `ProductUpdate`)
//! directly; only the envelopes below are API-specific.

use serde::Serialize;

use catalog_products::Product;

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct DeleteProductResponse {
    pub deleted: bool,
}
