//! Scheduler loop — sleeps until the next profile cron fires, then dispatches
//! every profile due at that instant. Runs are sequential; firings that pass
//! while a run is in progress are picked up as soon as it finishes.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::cron;
use crate::dispatch::Dispatcher;

/// Next fire time after `after` and every cron due at it.
pub fn next_due(dispatcher: &Dispatcher, after: DateTime<Utc>) -> Option<(DateTime<Utc>, Vec<String>)> {
    cron::next_fire(dispatcher.profiles().iter().map(|p| p.cron.as_str()), after)
}

/// Dispatch each schedule in `due` as of `at`. A failed run is logged and the
/// rest still run. Returns the number of runs that succeeded.
pub async fn run_due(dispatcher: &Dispatcher, due: &[String], at: DateTime<Utc>) -> usize {
    let mut succeeded = 0;
    for expression in due {
        match dispatcher.dispatch(expression, at).await {
            Ok(_) => succeeded += 1,
            Err(e) => tracing::error!("❌ Run for '{}' failed: {e}", expression),
        }
    }
    succeeded
}

/// Wait for the first firing after `cursor`, run it, and return its instant
/// so the caller can continue from there. `None` when nothing is schedulable.
pub async fn step(dispatcher: &Dispatcher, cursor: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let (at, due) = next_due(dispatcher, cursor)?;

    let wait = (at - Utc::now()).to_std().unwrap_or_default();
    if !wait.is_zero() {
        tracing::info!("⏳ Next run: {:?} at {}", due, at.format("%Y-%m-%d %H:%M UTC"));
        tokio::time::sleep(wait).await;
    }

    run_due(dispatcher, &due, at).await;
    Some(at)
}

/// Run forever. Returns only when no profile has a parseable cron.
pub async fn spawn_scheduler(dispatcher: Arc<Dispatcher>) {
    tracing::info!(
        "⏰ Scheduler started with {} profile(s)",
        dispatcher.profiles().len()
    );

    let mut cursor = Utc::now();
    while let Some(at) = step(&dispatcher, cursor).await {
        cursor = at;
    }
    tracing::warn!("⚠️ No schedulable profiles, scheduler stopping");
}
