//! # Product Client
//!
//! Provides a high-level API for the in-process inventory and implements the
//! [`InventoryService`] port on top of it.

use crate::clients::actor_client::ActorClient;
use crate::framework::{FrameworkError, ResourceClient};
use crate::model::{Product, ProductCreate, ProductId, ProductUpdate};
use crate::ports::{InventoryService, ServiceError};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl ProductClient {
    pub fn new(inner: ResourceClient<Product>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Product> for ProductClient {
    type Error = ProductError;

    fn inner(&self) -> &ResourceClient<Product> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        ProductError::from(e)
    }
}

impl ProductClient {
    #[instrument(skip(self))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<ProductId, ProductError> {
        debug!("Sending request");
        self.inner
            .create(params)
            .await
            .map(|product| product.id)
            .map_err(Self::map_error)
    }

    /// Changes price and/or stock level.
    #[instrument(skip(self))]
    pub async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product, ProductError> {
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Check the current stock level for a product.
    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: ProductId) -> Result<u32, ProductError> {
        match self
            .inner
            .perform_action(id, ProductAction::CheckStock)
            .await
            .map_err(Self::map_error)?
        {
            ProductActionResult::CheckStock(level) => Ok(level),
            other => Err(ProductError::StoreUnavailable(format!(
                "unexpected result for CheckStock: {other:?}"
            ))),
        }
    }

    /// Reserve stock; returns what remains.
    #[instrument(skip(self))]
    pub async fn reserve_stock(&self, id: ProductId, quantity: u32) -> Result<u32, ProductError> {
        match self
            .inner
            .perform_action(id, ProductAction::ReserveStock(quantity))
            .await
            .map_err(Self::map_error)?
        {
            ProductActionResult::ReserveStock(left) => Ok(left),
            other => Err(ProductError::StoreUnavailable(format!(
                "unexpected result for ReserveStock: {other:?}"
            ))),
        }
    }

    /// Return units to the shelf; returns the new level.
    #[instrument(skip(self))]
    pub async fn restock(&self, id: ProductId, quantity: u32) -> Result<u32, ProductError> {
        match self
            .inner
            .perform_action(id, ProductAction::Restock(quantity))
            .await
            .map_err(Self::map_error)?
        {
            ProductActionResult::Restock(level) => Ok(level),
            other => Err(ProductError::StoreUnavailable(format!(
                "unexpected result for Restock: {other:?}"
            ))),
        }
    }
}

#[async_trait]
impl InventoryService for ProductClient {
    /// Unknown products are reported as unavailable rather than as a failure.
    async fn check_availability(&self, product_id: u64, quantity: u32) -> Result<bool, ServiceError> {
        match self.check_stock(ProductId(product_id)).await {
            Ok(level) => Ok(level >= quantity),
            Err(ProductError::NotFound(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
