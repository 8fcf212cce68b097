//! In-memory `OrderSource` and `Notifier` for exercising the pipeline
//! without a store or a chat workspace.
//!
//! ```rust
//! use ordersync_scheduler::mock::{MockNotifier, MockOrderSource};
//!
//! let source = MockOrderSource::with_pages(vec![MockOrderSource::orders("A", 3)]);
//! let notifier = MockNotifier::failing_on(2); // second send returns HTTP 500
//! # let _ = (source, notifier);
//! ```

use std::sync::Mutex;

use async_trait::async_trait;
use ordersync_core::error::{Result, SyncError};
use ordersync_core::traits::{Notifier, OrderPage, OrderSource};
use ordersync_core::types::{Order, OrderQuery};

/// Serves a fixed sequence of pages; page N is `pages[N - 1]`, later pages are empty.
#[derive(Default)]
pub struct MockOrderSource {
    pages: Vec<OrderPage>,
    requests: Mutex<Vec<(String, u32)>>,
}

impl MockOrderSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(pages: Vec<Vec<Order>>) -> Self {
        Self {
            pages: pages.into_iter().map(OrderPage::Items).collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Append a page the API refuses with `status`.
    pub fn then_reject(mut self, status: u16) -> Self {
        self.pages.push(OrderPage::Rejected {
            status,
            reason: "Service Unavailable".into(),
        });
        self
    }

    /// `count` orders named `{prefix}{n}`, all processing, 1000.00, created 2026-10-16 12:00 UTC.
    pub fn orders(prefix: &str, count: usize) -> Vec<Order> {
        (1..=count)
            .map(|n| Order {
                increment_id: format!("{prefix}{n}"),
                status: "processing".into(),
                created_at: "2026-10-16 12:00:00".into(),
                grand_total: Some(1000.0),
            })
            .collect()
    }

    /// `(status, page)` for every request made so far.
    pub fn requests(&self) -> Vec<(String, u32)> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl OrderSource for MockOrderSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_page(&self, query: &OrderQuery, page: u32, _page_size: usize) -> Result<OrderPage> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((query.status.clone(), page));
        }
        let index = page.saturating_sub(1) as usize;
        Ok(self
            .pages
            .get(index)
            .cloned()
            .unwrap_or(OrderPage::Items(Vec::new())))
    }
}

/// Records every message; optionally fails the Nth send (1-based) with HTTP 500.
#[derive(Default)]
pub struct MockNotifier {
    fail_on: Option<usize>,
    attempts: Mutex<usize>,
    sent: Mutex<Vec<String>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(attempt: usize) -> Self {
        Self {
            fail_on: Some(attempt),
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.lock().map(|a| *a).unwrap_or_default()
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, text: &str) -> Result<()> {
        let attempt = match self.attempts.lock() {
            Ok(mut attempts) => {
                *attempts += 1;
                *attempts
            }
            Err(_) => 0,
        };
        if self.fail_on == Some(attempt) {
            return Err(SyncError::Webhook {
                status: "Internal Server Error".into(),
                body: "mock failure".into(),
            });
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(text.to_string());
        }
        Ok(())
    }
}
