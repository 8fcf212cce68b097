//! Magento 2 orders API — `GET /rest/V1/orders` with searchCriteria filters.

use async_trait::async_trait;
use ordersync_core::config::MagentoConfig;
use ordersync_core::error::{Result, SyncError};
use ordersync_core::traits::{OrderPage, OrderSource};
use ordersync_core::types::{Order, OrderQuery, format_timestamp};
use serde::Deserialize;

/// Body of a `GET /rest/V1/orders` response. Only `items` is used.
#[derive(Debug, Deserialize)]
struct OrdersResponse {
    #[serde(default)]
    items: Option<Vec<Order>>,
}

/// Orders API client authenticated with an integration token.
pub struct MagentoClient {
    config: MagentoConfig,
    client: reqwest::Client,
}

impl MagentoClient {
    pub fn new(config: MagentoConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn orders_url(&self) -> String {
        format!("{}/rest/V1/orders", self.config.host.trim_end_matches('/'))
    }
}

/// searchCriteria query pairs: status in group 0, the created_at range in group 1.
pub fn search_criteria(query: &OrderQuery, page: u32, page_size: usize) -> Vec<(String, String)> {
    let status = "searchCriteria[filter_groups][0][filters][0]";
    let from = "searchCriteria[filter_groups][1][filters][0]";
    let to = "searchCriteria[filter_groups][1][filters][1]";

    vec![
        (format!("{status}[field]"), "status".into()),
        (format!("{status}[value]"), query.status.clone()),
        (format!("{status}[condition_type]"), "eq".into()),
        (format!("{from}[field]"), "created_at".into()),
        (format!("{from}[value]"), format_timestamp(&query.range.start)),
        (format!("{from}[condition_type]"), "gteq".into()),
        (format!("{to}[field]"), "created_at".into()),
        (format!("{to}[value]"), format_timestamp(&query.range.end)),
        (format!("{to}[condition_type]"), "lteq".into()),
        ("searchCriteria[pageSize]".into(), page_size.to_string()),
        ("searchCriteria[currentPage]".into(), page.to_string()),
    ]
}

#[async_trait]
impl OrderSource for MagentoClient {
    fn name(&self) -> &str {
        "magento"
    }

    async fn fetch_page(&self, query: &OrderQuery, page: u32, page_size: usize) -> Result<OrderPage> {
        tracing::debug!("GET {} page={page} status={}", self.orders_url(), query.status);
        let response = self
            .client
            .get(self.orders_url())
            .query(&search_criteria(query, page, page_size))
            .bearer_auth(&self.config.token)
            .header("Content-Type", "application/json")
            .timeout(std::time::Duration::from_secs(self.config.timeout_secs))
            .send()
            .await
            .map_err(|e| SyncError::Orders(format!("GET orders page {page} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Ok(OrderPage::Rejected {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body: OrdersResponse = response
            .json()
            .await
            .map_err(|e| SyncError::Orders(format!("Invalid orders response: {e}")))?;

        Ok(OrderPage::Items(body.items.unwrap_or_default()))
    }
}
