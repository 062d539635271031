//! Store selection and the catalog service handle shared by all handlers.

use std::sync::Arc;

use catalog_core::ProductId;
use catalog_infra::{
    CatalogError, InMemoryDocumentStore, ProductCatalogService, ProductStream,
};
use catalog_products::{NewProduct, PriceRange, Product, ProductUpdate};

#[cfg(feature = "mongodb")]
use anyhow::Context;
#[cfg(feature = "mongodb")]
use catalog_infra::MongoDocumentStore;

use crate::config::{StoreBackend, StoreConfig};

pub type InMemoryCatalog = ProductCatalogService<Arc<InMemoryDocumentStore>>;

#[cfg(feature = "mongodb")]
pub type MongoCatalog = ProductCatalogService<MongoDocumentStore>;

/// Application services, one variant per store backend.
pub enum AppServices {
    InMemory {
        catalog: Arc<InMemoryCatalog>,
    },
    #[cfg(feature = "mongodb")]
    Mongo {
        catalog: Arc<MongoCatalog>,
    },
}

macro_rules! with_catalog {
    ($services:expr, $catalog:ident => $body:expr) => {
        match $services {
            AppServices::InMemory { catalog: $catalog } => $body,
            #[cfg(feature = "mongodb")]
            AppServices::Mongo { catalog: $catalog } => $body,
        }
    };
}

impl AppServices {
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryDocumentStore::new());
        AppServices::InMemory {
            catalog: Arc::new(ProductCatalogService::new(store)),
        }
    }

    pub fn backend(&self) -> &'static str {
        match self {
            AppServices::InMemory { .. } => "memory",
            #[cfg(feature = "mongodb")]
            AppServices::Mongo { .. } => "mongodb",
        }
    }

    pub async fn create(&self, input: NewProduct) -> Result<Product, CatalogError> {
        with_catalog!(self, catalog => catalog.create(input).await)
    }

    pub async fn get(&self, id: ProductId) -> Result<Product, CatalogError> {
        with_catalog!(self, catalog => catalog.get(id).await)
    }

    pub async fn list(&self, range: PriceRange) -> Result<ProductStream, CatalogError> {
        with_catalog!(self, catalog => catalog.list(range).await)
    }

    pub async fn update(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, CatalogError> {
        with_catalog!(self, catalog => catalog.update(id, update).await)
    }

    pub async fn delete(&self, id: ProductId) -> Result<bool, CatalogError> {
        with_catalog!(self, catalog => catalog.delete(id).await)
    }
}

/// Build services for the configured backend.
pub async fn build_services(config: &StoreConfig) -> anyhow::Result<AppServices> {
    let services = match &config.backend {
        StoreBackend::Memory => AppServices::in_memory(),
        #[cfg(feature = "mongodb")]
        StoreBackend::MongoDb { uri } => {
            let store = MongoDocumentStore::connect(uri, &config.database, &config.collection)
                .await
                .context("failed to connect to MongoDB")?;
            AppServices::Mongo {
                catalog: Arc::new(ProductCatalogService::new(store)),
            }
        }
        #[cfg(not(feature = "mongodb"))]
        StoreBackend::MongoDb { .. } => {
            anyhow::bail!("STORE_BACKEND=mongodb requires the `mongodb` feature")
        }
    };

    tracing::info!(backend = services.backend(), "catalog services ready");
    Ok(services)
}
