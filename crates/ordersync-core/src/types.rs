//! Order, query profile and message chunk — the data that flows through a run.

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::normalize_cron;

/// Orders requested per API page.
pub const PAGE_SIZE: usize = 100;

/// Order identifiers per chat message.
pub const CHUNK_SIZE: usize = 10;

/// An order as returned by `GET /rest/V1/orders`. Read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, deserialize_with = "deserialize_text")]
    pub increment_id: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub status: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub created_at: String,
    /// Magento sends this as a number or a decimal string; anything else is `None`.
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub grand_total: Option<f64>,
}

impl Order {
    /// Creation time in UTC, if `created_at` parses.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }
}

/// Strings may arrive as `null` or as bare numbers; both decode without failing the page.
fn deserialize_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Parse an RFC 3339 timestamp or Magento's zone-less `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Render a timestamp the way the orders API filter expects it.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Inclusive time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Build a range; bounds are swapped if given in the wrong order.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        *ts >= self.start && *ts <= self.end
    }
}

/// Which creation-time window a profile looks at, relative to the run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderWindow {
    /// The previous UTC calendar day, 00:00:00.000 to 23:59:59.999.
    PreviousDay,
    /// From N days before the run up to the run time.
    LastDays(u32),
}

impl OrderWindow {
    pub fn resolve(&self, now: DateTime<Utc>) -> DateRange {
        match self {
            OrderWindow::PreviousDay => {
                let day = (now - Duration::days(1)).date_naive();
                let start = day.and_time(NaiveTime::MIN).and_utc();
                let end = start + Duration::days(1) - Duration::milliseconds(1);
                DateRange::new(start, end)
            }
            OrderWindow::LastDays(days) => {
                DateRange::new(now - Duration::days(i64::from(*days)), now)
            }
        }
    }
}

/// Filter sent to the orders API for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderQuery {
    pub status: String,
    pub range: DateRange,
}

/// One scheduled variant of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryProfile {
    pub name: String,
    /// Trigger identity: the cron expression that selects this profile.
    pub cron: String,
    /// Order status to query (`processing`, `holded`, ...).
    pub status: String,
    pub window: OrderWindow,
    /// Keep only orders whose total is strictly greater than this.
    #[serde(default)]
    pub min_grand_total: Option<f64>,
    /// Re-check `created_at` against the window on the client side.
    #[serde(default)]
    pub recheck_window: bool,
    /// Message header, e.g. "📦 Holded orders within last 30 days".
    pub label: String,
}

impl QueryProfile {
    /// High-value processing orders from yesterday, fired at 04:00 UTC.
    pub fn processing_high_value() -> Self {
        Self {
            name: "processing_high_value".into(),
            cron: "0 4 * * *".into(),
            status: "processing".into(),
            window: OrderWindow::PreviousDay,
            min_grand_total: Some(500.0),
            recheck_window: true,
            label: "💰 Processing orders > $500 from yesterday".into(),
        }
    }

    /// Orders on hold created within the last 30 days, fired at 05:00 UTC.
    pub fn holded_recent() -> Self {
        Self {
            name: "holded_recent".into(),
            cron: "0 5 * * *".into(),
            status: "holded".into(),
            window: OrderWindow::LastDays(30),
            min_grand_total: None,
            recheck_window: false,
            label: "📦 Holded orders within last 30 days".into(),
        }
    }

    pub fn defaults() -> Vec<Self> {
        vec![Self::processing_high_value(), Self::holded_recent()]
    }

    /// The profile scheduled as `cron`, compared with whitespace collapsed.
    pub fn find<'a>(profiles: &'a [Self], cron: &str) -> Option<&'a Self> {
        let wanted = normalize_cron(cron);
        profiles.iter().find(|profile| normalize_cron(&profile.cron) == wanted)
    }

    /// Build the API filter for a run starting at `now`.
    pub fn query(&self, now: DateTime<Utc>) -> OrderQuery {
        OrderQuery {
            status: self.status.clone(),
            range: self.window.resolve(now),
        }
    }

    /// Client-side selection applied after pagination.
    pub fn selects(&self, order: &Order, range: &DateRange) -> bool {
        if self.recheck_window {
            match order.created_at_utc() {
                Some(created) if range.contains(&created) => {}
                _ => return false,
            }
        }
        match self.min_grand_total {
            Some(threshold) => order.grand_total.is_some_and(|total| total > threshold),
            None => true,
        }
    }
}

/// A group of at most [`CHUNK_SIZE`] identifiers and the text sent for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageChunk {
    /// 1-based position of the first identifier in the full list.
    pub first: usize,
    /// 1-based position of the last identifier (inclusive).
    pub last: usize,
    pub total: usize,
    pub ids: Vec<String>,
    pub text: String,
}
