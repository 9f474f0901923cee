use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::{InvoiceError, Result};
use crate::model::Order;

/// Where order records come from.
#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn fetch_order(&self, order_id: i64) -> Result<Order>;

    /// Fetches each id in turn; the first failure aborts the batch.
    async fn fetch_orders(&self, order_ids: &[i64]) -> Result<Vec<Order>> {
        let mut orders = Vec::with_capacity(order_ids.len());
        for id in order_ids {
            orders.push(self.fetch_order(*id).await?);
        }
        Ok(orders)
    }
}

/// HTTP client for `GET {base}/api/orders/{id}`. Requests are not retried.
pub struct OrderClient {
    client: Client,
    base_url: String,
}

impl OrderClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InvoiceError::config(format!("cannot build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(config.api_base_url.clone(), config.http_timeout)
    }

    pub fn order_url(&self, order_id: i64) -> String {
        format!("{}/api/orders/{}", self.base_url.trim_end_matches('/'), order_id)
    }
}

#[async_trait]
impl OrderSource for OrderClient {
    async fn fetch_order(&self, order_id: i64) -> Result<Order> {
        let url = self.order_url(order_id);
        debug!(%url, "fetching order");

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("Failed to send GET request to {}: {}", url, e);
            InvoiceError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%url, status = status.as_u16(), "order request rejected");
            return Err(InvoiceError::fetch(
                Some(status.as_u16()),
                format!("order {order_id}: server answered {status}: {}", body.trim()),
            ));
        }

        response.json::<Order>().await.map_err(|e| {
            InvoiceError::fetch(Some(status.as_u16()), format!("order {order_id}: invalid body: {e}"))
        })
    }
}
