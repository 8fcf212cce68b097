//! Next-run lookups over profile cron expressions.
//! Example: "0 4 * * *" = every day at 04:00 UTC

use chrono::{DateTime, Utc};
use ordersync_core::schedule::CronSchedule;

/// Parse a cron expression and compute the next run time.
pub fn next_run_from_cron(expression: &str, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match CronSchedule::parse(expression) {
        Ok(schedule) => schedule.next_after(&after),
        Err(e) => {
            tracing::warn!("{e}");
            None
        }
    }
}

/// Earliest firing after `after` and every expression due at that instant,
/// in the order given. Unparseable expressions are skipped.
pub fn next_fire<'a, I>(expressions: I, after: DateTime<Utc>) -> Option<(DateTime<Utc>, Vec<String>)>
where
    I: IntoIterator<Item = &'a str>,
{
    let upcoming: Vec<(DateTime<Utc>, &str)> = expressions
        .into_iter()
        .filter_map(|expr| next_run_from_cron(expr, after).map(|at| (at, expr)))
        .collect();

    let at = upcoming.iter().map(|(at, _)| *at).min()?;
    let due = upcoming
        .into_iter()
        .filter(|(t, _)| *t == at)
        .map(|(_, expr)| expr.to_string())
        .collect();
    Some((at, due))
}
