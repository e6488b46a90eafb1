use std::sync::Arc;

use crate::{
    data_objects::{CatalogItem, OrderRequest, OrderStatusReport, PlacedOrder},
    ResellerApiError,
};

/// The three calls the top-up engine makes against a fulfillment provider.
///
/// Implementations make exactly one outbound call per method and never retry. Any failure (transport, timeout,
/// non-success status or an undecodable body) is reported as a [`ResellerApiError`].
#[allow(async_fn_in_trait)]
pub trait OrderGateway {
    /// Fetch the provider's current product catalog.
    async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>, ResellerApiError>;

    /// Place an order for a single unit of `request.product_sku`, delivered to the given game account.
    async fn place_order(&self, request: &OrderRequest) -> Result<PlacedOrder, ResellerApiError>;

    /// Ask the provider for the current status of an order it previously accepted.
    async fn query_status(&self, order_id: &str) -> Result<OrderStatusReport, ResellerApiError>;
}

impl<G: OrderGateway> OrderGateway for Arc<G> {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>, ResellerApiError> {
        self.as_ref().fetch_catalog().await
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<PlacedOrder, ResellerApiError> {
        self.as_ref().place_order(request).await
    }

    async fn query_status(&self, order_id: &str) -> Result<OrderStatusReport, ResellerApiError> {
        self.as_ref().query_status(order_id).await
    }
}
