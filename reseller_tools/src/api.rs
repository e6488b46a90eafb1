use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
    Method,
    StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::VipResellerConfig,
    data_objects::{ApiEnvelope, CatalogItem, OrderRequest, OrderStatusReport, PlacedOrder},
    OrderGateway,
    ResellerApiError,
};

/// REST client for the VIP Reseller top-up API.
///
/// The client is cheap to clone. Credentials are attached as default headers when the client is built, and every
/// request is bounded by the configured timeout.
#[derive(Clone)]
pub struct VipResellerApi {
    config: VipResellerConfig,
    client: Arc<Client>,
}

impl VipResellerApi {
    pub fn new(config: VipResellerConfig) -> Result<Self, ResellerApiError> {
        let mut headers = HeaderMap::with_capacity(3);
        let bearer = format!("Bearer {}", config.api_key.reveal());
        let auth = HeaderValue::from_str(&bearer).map_err(|e| ResellerApiError::Initialization(e.to_string()))?;
        headers.insert(AUTHORIZATION, auth);
        let user_id =
            HeaderValue::from_str(&config.user_id).map_err(|e| ResellerApiError::Initialization(e.to_string()))?;
        headers.insert("User-ID", user_id);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ResellerApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &VipResellerConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, ResellerApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| ResellerApiError::RestResponseError(e.to_string()))?;
        // Only a 200 counts as success, not any 2xx
        if response.status() == StatusCode::OK {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| ResellerApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| ResellerApiError::RestResponseError(e.to_string()))?;
            Err(ResellerApiError::QueryError { status, message })
        }
    }

    pub async fn get_game_features(&self) -> Result<Vec<CatalogItem>, ResellerApiError> {
        debug!("Fetching game feature catalog");
        let result = self.rest_query::<ApiEnvelope<Vec<CatalogItem>>, ()>(Method::GET, "/game-feature", None).await?;
        info!("Fetched {} catalog items. {}", result.data.len(), result.message);
        Ok(result.data)
    }

    pub async fn create_order(&self, order: &OrderRequest) -> Result<PlacedOrder, ResellerApiError> {
        debug!("Placing order for {} on {}/{}", order.product_sku, order.game_id, order.game_server);
        let result = self.rest_query::<ApiEnvelope<PlacedOrder>, &OrderRequest>(Method::POST, "/order", Some(order)).await?;
        info!("Order {} placed. Provider status: {}", result.data.order_id, result.data.status);
        Ok(result.data)
    }

    pub async fn check_status(&self, order_id: &str) -> Result<OrderStatusReport, ResellerApiError> {
        let path = format!("/status/{order_id}");
        debug!("Checking status of order {order_id}");
        let result = self.rest_query::<ApiEnvelope<OrderStatusReport>, ()>(Method::GET, &path, None).await?;
        debug!("Order {order_id} has provider status '{}'", result.data.status);
        Ok(result.data)
    }
}

impl OrderGateway for VipResellerApi {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>, ResellerApiError> {
        self.get_game_features().await
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<PlacedOrder, ResellerApiError> {
        self.create_order(request).await
    }

    async fn query_status(&self, order_id: &str) -> Result<OrderStatusReport, ResellerApiError> {
        self.check_status(order_id).await
    }
}
