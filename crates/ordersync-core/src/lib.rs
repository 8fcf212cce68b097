//! # OrderSync Core
//!
//! Shared building blocks for the order sync notifier:
//! configuration, the error type, cron schedules, the order/profile/chunk data model,
//! and the two seams every run goes through (`OrderSource`, `Notifier`).

pub mod config;
pub mod error;
pub mod schedule;
pub mod traits;
pub mod types;

pub use config::SyncConfig;
pub use error::{Result, SyncError};
pub use schedule::CronSchedule;
pub use traits::{Notifier, OrderPage, OrderSource};
pub use types::{DateRange, MessageChunk, Order, OrderQuery, OrderWindow, QueryProfile};
