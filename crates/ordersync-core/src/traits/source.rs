//! OrderSource trait — where orders come from.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Order, OrderQuery};

/// Outcome of a single page request.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderPage {
    Items(Vec<Order>),
    /// The API answered with a non-success status. Pagination stops here.
    Rejected { status: u16, reason: String },
}

/// A paginated order search endpoint.
///
/// Transport failures (unreachable host, undecodable body) are `Err`;
/// a non-success HTTP status is `Ok(OrderPage::Rejected)`.
#[async_trait]
pub trait OrderSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch page `page` (1-based) of orders matching `query`.
    async fn fetch_page(&self, query: &OrderQuery, page: u32, page_size: usize) -> Result<OrderPage>;
}
