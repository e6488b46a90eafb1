use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use reseller_tools::{
    data_objects::{CatalogItem, OrderRequest, OrderStatusReport, PlacedOrder},
    OrderGateway,
    ResellerApiError,
};
use tokio::sync::Barrier;

#[derive(Default)]
struct FakeProvider {
    catalog: Vec<CatalogItem>,
    statuses: HashMap<String, String>,
    queued_order_ids: VecDeque<String>,
    next_order: u64,
    reject_orders: bool,
    status_unavailable: bool,
    catalog_unavailable: bool,
    placed: Vec<OrderRequest>,
    status_queries: usize,
}

/// An in-process stand-in for the reseller API.
///
/// Orders are accepted with ids `VIP-1`, `VIP-2`, ... (or the ids queued with [`FakeGateway::queue_order_id`]) and
/// start out with provider status `pending`. Clones share state, so a test can keep a handle to inspect calls and
/// change provider statuses after handing a clone to an API.
#[derive(Clone, Default)]
pub struct FakeGateway {
    state: Arc<Mutex<FakeProvider>>,
    order_barrier: Option<Arc<Barrier>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeProvider> {
        self.state.lock().expect("fake gateway state poisoned")
    }

    pub fn with_catalog(self, catalog: Vec<CatalogItem>) -> Self {
        self.state().catalog = catalog;
        self
    }

    /// Every `place_order` call waits on the barrier before answering, so that concurrent checkouts are all in flight
    /// at the same time.
    pub fn with_order_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.order_barrier = Some(barrier);
        self
    }

    pub fn queue_order_id(&self, order_id: &str) {
        self.state().queued_order_ids.push_back(order_id.to_string());
    }

    pub fn reject_orders(&self, reject: bool) {
        self.state().reject_orders = reject;
    }

    pub fn make_status_unavailable(&self, unavailable: bool) {
        self.state().status_unavailable = unavailable;
    }

    pub fn make_catalog_unavailable(&self, unavailable: bool) {
        self.state().catalog_unavailable = unavailable;
    }

    pub fn set_status(&self, order_id: &str, status: &str) {
        self.state().statuses.insert(order_id.to_string(), status.to_string());
    }

    pub fn placed_orders(&self) -> Vec<OrderRequest> {
        self.state().placed.clone()
    }

    pub fn status_query_count(&self) -> usize {
        self.state().status_queries
    }
}

impl OrderGateway for FakeGateway {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>, ResellerApiError> {
        let state = self.state();
        if state.catalog_unavailable {
            return Err(ResellerApiError::QueryError { status: 503, message: "catalog unavailable".to_string() });
        }
        Ok(state.catalog.clone())
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<PlacedOrder, ResellerApiError> {
        if let Some(barrier) = &self.order_barrier {
            barrier.wait().await;
        }
        let mut state = self.state();
        if state.reject_orders {
            return Err(ResellerApiError::QueryError { status: 400, message: "order rejected".to_string() });
        }
        let order_id = match state.queued_order_ids.pop_front() {
            Some(id) => id,
            None => {
                state.next_order += 1;
                format!("VIP-{}", state.next_order)
            },
        };
        state.statuses.insert(order_id.clone(), "pending".to_string());
        state.placed.push(request.clone());
        Ok(PlacedOrder {
            order_id,
            status: "pending".to_string(),
            total_price: Default::default(),
            created_at: "2024-06-01 10:00:00".to_string(),
        })
    }

    async fn query_status(&self, order_id: &str) -> Result<OrderStatusReport, ResellerApiError> {
        let mut state = self.state();
        state.status_queries += 1;
        if state.status_unavailable {
            return Err(ResellerApiError::RestResponseError("operation timed out".to_string()));
        }
        let status = state
            .statuses
            .get(order_id)
            .cloned()
            .ok_or_else(|| ResellerApiError::QueryError { status: 404, message: format!("order {order_id} not found") })?;
        Ok(OrderStatusReport { order_id: order_id.to_string(), status, ..Default::default() })
    }
}
