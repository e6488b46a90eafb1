use mockall::mock;
use reseller_tools::{
    data_objects::{CatalogItem, OrderRequest, OrderStatusReport, PlacedOrder},
    OrderGateway,
    ResellerApiError,
};

mock! {
    pub Gateway {}
    impl OrderGateway for Gateway {
        async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>, ResellerApiError>;
        async fn place_order(&self, request: &OrderRequest) -> Result<PlacedOrder, ResellerApiError>;
        async fn query_status(&self, order_id: &str) -> Result<OrderStatusReport, ResellerApiError>;
    }
}

pub fn placed(order_id: &str) -> PlacedOrder {
    PlacedOrder {
        order_id: order_id.to_string(),
        status: "pending".to_string(),
        total_price: Default::default(),
        created_at: "2024-06-01 10:00:00".to_string(),
    }
}

pub fn status_report(order_id: &str, status: &str) -> OrderStatusReport {
    OrderStatusReport { order_id: order_id.to_string(), status: status.to_string(), ..Default::default() }
}
