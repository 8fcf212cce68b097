//! # OrderSync Scheduler
//!
//! Runs query profiles on their cron schedule and posts the results.
//!
//! ## Architecture
//! ```text
//! Trigger ("0 4 * * *")
//!   └── Dispatcher → QueryProfile
//!         └── Pipeline
//!               ├── fetch_all   (OrderSource, 100 per page)
//!               ├── select_ids  (window re-check, total threshold)
//!               ├── chunk_messages (10 ids per message)
//!               └── deliver     (Notifier, 1s apart)
//! ```

pub mod cron;
pub mod dispatch;
pub mod engine;
pub mod mock;
pub mod notify;
pub mod pipeline;

pub use dispatch::Dispatcher;
pub use engine::spawn_scheduler;
pub use pipeline::{FetchOutcome, Pipeline, RunReport};
