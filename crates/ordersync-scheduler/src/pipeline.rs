//! The fetch → filter → chunk → notify pipeline for one profile.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use ordersync_core::error::Result;
use ordersync_core::traits::{Notifier, OrderPage, OrderSource};
use ordersync_core::types::{
    DateRange, Order, OrderQuery, PAGE_SIZE, QueryProfile, format_timestamp,
};
use serde::Serialize;

use crate::notify;

/// Everything fetched for one query.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    /// Orders in fetch order, page after page.
    pub orders: Vec<Order>,
    /// Pages that returned items (or an empty list).
    pub pages: u32,
    /// The API refused a page, so `orders` may be partial.
    pub truncated: bool,
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub profile: String,
    pub status: String,
    pub window_start: String,
    pub window_end: String,
    pub pages_fetched: u32,
    pub fetched: usize,
    pub truncated: bool,
    pub matched: Vec<String>,
    pub messages_sent: usize,
}

/// Page through every order matching `query`.
///
/// Stops at the first page shorter than [`PAGE_SIZE`]. A refused page ends
/// pagination early and keeps what was collected; transport errors propagate.
pub async fn fetch_all(source: &dyn OrderSource, query: &OrderQuery) -> Result<FetchOutcome> {
    let mut outcome = FetchOutcome::default();
    let mut page: u32 = 1;

    loop {
        match source.fetch_page(query, page, PAGE_SIZE).await? {
            OrderPage::Rejected { status, reason } => {
                tracing::warn!(
                    "⚠️ Failed to fetch {} orders (page {page}): {status} {reason}",
                    query.status
                );
                outcome.truncated = true;
                break;
            }
            OrderPage::Items(items) => {
                let count = items.len();
                outcome.pages += 1;
                outcome.orders.extend(items);
                tracing::info!("📥 Fetched page {page}: {count} {} orders", query.status);
                if count < PAGE_SIZE {
                    break;
                }
                page += 1;
            }
        }
    }

    Ok(outcome)
}

/// Apply the profile's client-side filters and collect identifiers, keeping order.
pub fn select_ids(profile: &QueryProfile, orders: &[Order], range: &DateRange) -> Vec<String> {
    orders
        .iter()
        .filter(|order| profile.selects(order, range))
        .map(|order| order.increment_id.clone())
        .collect()
}

/// Runs profiles against one order source and one notifier.
pub struct Pipeline {
    source: Arc<dyn OrderSource>,
    notifier: Arc<dyn Notifier>,
    message_delay: Duration,
}

impl Pipeline {
    pub fn new(source: Arc<dyn OrderSource>, notifier: Arc<dyn Notifier>, message_delay: Duration) -> Self {
        Self {
            source,
            notifier,
            message_delay,
        }
    }

    /// Run `profile` as of `now`. A failed send aborts the remaining messages.
    pub async fn run(&self, profile: &QueryProfile, now: DateTime<Utc>) -> Result<RunReport> {
        let query = profile.query(now);
        tracing::info!(
            "🔎 [{}] {} orders from {} to {} via {}",
            profile.name,
            query.status,
            format_timestamp(&query.range.start),
            format_timestamp(&query.range.end),
            self.source.name()
        );

        let fetched = fetch_all(self.source.as_ref(), &query).await?;
        tracing::info!(
            "📦 [{}] Total fetched {} orders: {}",
            profile.name,
            query.status,
            fetched.orders.len()
        );

        let matched = select_ids(profile, &fetched.orders, &query.range);
        tracing::info!("🧾 [{}] Order numbers: {:?}", profile.name, matched);

        let chunks = notify::chunk_messages(&profile.label, &matched);
        let messages_sent =
            notify::deliver(self.notifier.as_ref(), &chunks, self.message_delay).await?;

        Ok(RunReport {
            profile: profile.name.clone(),
            status: query.status,
            window_start: format_timestamp(&query.range.start),
            window_end: format_timestamp(&query.range.end),
            pages_fetched: fetched.pages,
            fetched: fetched.orders.len(),
            truncated: fetched.truncated,
            matched,
            messages_sent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockNotifier, MockOrderSource};
    use chrono::TimeZone;
    use ordersync_core::error::SyncError;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 4, 0, 0).unwrap()
    }

    fn pipeline(source: Arc<MockOrderSource>, notifier: Arc<MockNotifier>) -> Pipeline {
        Pipeline::new(source, notifier, Duration::ZERO)
    }

    fn order(id: &str, created_at: &str, total: f64) -> Order {
        Order {
            increment_id: id.into(),
            status: "processing".into(),
            created_at: created_at.into(),
            grand_total: Some(total),
        }
    }

    #[tokio::test]
    async fn test_pagination_stops_at_first_short_page() {
        let source = MockOrderSource::with_pages(vec![
            MockOrderSource::orders("A", 100),
            MockOrderSource::orders("B", 100),
            MockOrderSource::orders("C", 42),
            MockOrderSource::orders("D", 100),
        ]);
        let query = QueryProfile::holded_recent().query(now());
        let outcome = fetch_all(&source, &query).await.unwrap();

        assert_eq!(outcome.pages, 3);
        assert_eq!(outcome.orders.len(), 242);
        assert!(!outcome.truncated);
        assert_eq!(outcome.orders[0].increment_id, "A1");
        assert_eq!(outcome.orders[100].increment_id, "B1");
        assert_eq!(outcome.orders[241].increment_id, "C42");
        let pages: Vec<u32> = source.requests().into_iter().map(|(_, p)| p).collect();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_exact_multiple_of_page_size_needs_empty_page() {
        let source = MockOrderSource::with_pages(vec![MockOrderSource::orders("A", 100)]);
        let query = QueryProfile::holded_recent().query(now());
        let outcome = fetch_all(&source, &query).await.unwrap();
        assert_eq!(outcome.pages, 2);
        assert_eq!(outcome.orders.len(), 100);
    }

    #[tokio::test]
    async fn test_rejected_page_keeps_partial_results() {
        let source = Arc::new(
            MockOrderSource::with_pages(vec![MockOrderSource::orders("H", 100)]).then_reject(503),
        );
        let notifier = Arc::new(MockNotifier::new());
        let report = pipeline(source.clone(), notifier.clone())
            .run(&QueryProfile::holded_recent(), now())
            .await
            .unwrap();

        assert!(report.truncated);
        assert_eq!(report.fetched, 100);
        assert_eq!(report.messages_sent, 10);
        assert_eq!(source.requests().len(), 2);
        assert!(notifier.sent()[0].starts_with("📦 Holded orders within last 30 days (1-10 of 100):\nH1, H2"));
    }

    #[tokio::test]
    async fn test_processing_profile_filters_window_and_threshold() {
        let source = Arc::new(MockOrderSource::with_pages(vec![vec![
            order("100", "2026-10-16 00:00:00", 501.0),
            order("101", "2026-10-15 23:59:59", 900.0),
            order("102", "2026-10-16 10:00:00", 500.0),
            order("103", "2026-10-16 23:59:59", 2500.0),
            order("104", "2026-10-17 00:00:00", 900.0),
            order("105", "2026-10-16 18:30:00", 499.99),
        ]]));
        let notifier = Arc::new(MockNotifier::new());
        let report = pipeline(source.clone(), notifier.clone())
            .run(&QueryProfile::processing_high_value(), now())
            .await
            .unwrap();

        assert_eq!(report.matched, vec!["100", "103"]);
        assert_eq!(report.window_start, "2026-10-16T00:00:00.000Z");
        assert_eq!(report.window_end, "2026-10-16T23:59:59.999Z");
        assert_eq!(
            notifier.sent(),
            vec!["💰 Processing orders > $500 from yesterday (1-2 of 2):\n100, 103"]
        );
        assert_eq!(source.requests(), vec![("processing".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_twenty_five_matches_send_three_messages() {
        let source = Arc::new(MockOrderSource::with_pages(vec![MockOrderSource::orders("P", 25)]));
        let notifier = Arc::new(MockNotifier::new());
        let report = pipeline(source, notifier.clone())
            .run(&QueryProfile::processing_high_value(), now())
            .await
            .unwrap();

        let sent = notifier.sent();
        assert_eq!(report.messages_sent, 3);
        assert_eq!(sent.len(), 3);
        assert!(sent[0].contains("(1-10 of 25)"));
        assert!(sent[1].contains("(11-20 of 25)"));
        assert!(sent[2].contains("(21-25 of 25)"));
    }

    #[tokio::test]
    async fn test_no_matches_sends_nothing() {
        let source = Arc::new(MockOrderSource::new());
        let notifier = Arc::new(MockNotifier::new());
        let report = pipeline(source, notifier.clone())
            .run(&QueryProfile::holded_recent(), now())
            .await
            .unwrap();
        assert_eq!(report.fetched, 0);
        assert_eq!(report.messages_sent, 0);
        assert_eq!(notifier.attempts(), 0);
    }

    #[tokio::test]
    async fn test_webhook_failure_aborts_remaining_chunks() {
        let source = Arc::new(MockOrderSource::with_pages(vec![MockOrderSource::orders("W", 30)]));
        let notifier = Arc::new(MockNotifier::failing_on(1));
        let result = pipeline(source, notifier.clone())
            .run(&QueryProfile::holded_recent(), now())
            .await;

        assert!(matches!(result, Err(SyncError::Webhook { .. })));
        assert_eq!(notifier.attempts(), 1);
        assert!(notifier.sent().is_empty());
    }
}
