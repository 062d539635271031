use std::pin::Pin;

use chrono::Utc;
use tokio_stream::{Stream, StreamExt};

use catalog_core::ProductId;
use catalog_products::{NewProduct, PriceRange, Product, ProductUpdate};

use super::CatalogError;
use super::mapping::{
    id_filter, price_filter, product_from_document, product_to_document, update_to_document,
};
use crate::document_store::{Document, DocumentStore};

/// Lazy sequence of products returned by `list`.
pub type ProductStream = Pin<Box<dyn Stream<Item = Result<Product, CatalogError>> + Send>>;

/// Product catalog operations over a document store.
///
/// Construct once at startup with the store handle and share it (e.g. behind
/// an `Arc`); it holds no other state.
#[derive(Debug)]
pub struct ProductCatalogService<S> {
    store: S,
}

impl<S> ProductCatalogService<S>
where
    S: DocumentStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a product with a freshly generated id.
    ///
    /// Any storage failure is reported as `CatalogError::Insert`.
    #[tracing::instrument(skip_all, fields(name = %input.name))]
    pub async fn create(&self, input: NewProduct) -> Result<Product, CatalogError> {
        let product = Product::create(input, ProductId::new(), Utc::now())?;

        self.store
            .insert_one(product_to_document(&product))
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "product insert failed");
                CatalogError::Insert(e)
            })?;

        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Product, CatalogError> {
        let document = self.find_existing(id).await?;
        Ok(product_from_document(&document)?)
    }

    /// Products whose price lies strictly inside `range`, in store order.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, range: PriceRange) -> Result<ProductStream, CatalogError> {
        let documents = self.store.find(&price_filter(&range)).await?;

        Ok(Box::pin(documents.map(|item| -> Result<Product, CatalogError> {
            let document = item?;
            Ok(product_from_document(&document)?)
        })))
    }

    /// Merge the present fields of `update` onto the stored product and
    /// stamp `updated_at`.
    ///
    /// The existence check and the update are separate store calls; if the
    /// product is deleted in between, the update reports `NotFound` as well.
    #[tracing::instrument(skip(self, update))]
    pub async fn update(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, CatalogError> {
        self.find_existing(id).await?;

        let set = update_to_document(&update, Utc::now());
        let document = self
            .store
            .find_one_and_update(&id_filter(id), &set)
            .await?
            .ok_or_else(|| {
                tracing::warn!("product removed between existence check and update");
                CatalogError::not_found(id)
            })?;

        tracing::info!(fields = set.fields().len(), "product updated");
        Ok(product_from_document(&document)?)
    }

    /// Hard delete. Returns whether a document was removed.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<bool, CatalogError> {
        self.find_existing(id).await?;

        let deleted = self.store.delete_one(&id_filter(id)).await?;
        tracing::info!(deleted, "product deleted");
        Ok(deleted > 0)
    }

    async fn find_existing(&self, id: ProductId) -> Result<Document, CatalogError> {
        match self.store.find_one(&id_filter(id)).await? {
            Some(document) => Ok(document),
            None => {
                tracing::debug!(product_id = %id, "product not found");
                Err(CatalogError::not_found(id))
            }
        }
    }
}
