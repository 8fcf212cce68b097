//! Five-field cron expressions ("MIN HOUR DOM MON DOW", UTC) on top of the
//! `cron` crate, which wants a leading seconds field and numbers weekdays
//! 1-7 from Sunday instead of 0-7.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::config::normalize_cron;
use crate::error::{Result, SyncError};

/// A parsed profile schedule.
#[derive(Debug, Clone)]
pub struct CronSchedule {
    expression: String,
    schedule: cron::Schedule,
}

impl CronSchedule {
    pub fn parse(expression: &str) -> Result<Self> {
        let fields: Vec<&str> = expression.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(SyncError::InvalidSchedule(format!(
                "'{expression}' needs 5 fields: MIN HOUR DOM MON DOW"
            )));
        }

        let weekdays = weekday_field(fields[4])
            .map_err(|e| SyncError::InvalidSchedule(format!("'{expression}': {e}")))?;
        let full = format!(
            "0 {} {} {} {} {}",
            fields[0], fields[1], fields[2], fields[3], weekdays
        );
        let schedule = cron::Schedule::from_str(&full)
            .map_err(|e| SyncError::InvalidSchedule(format!("'{expression}': {e}")))?;

        Ok(Self {
            expression: normalize_cron(expression),
            schedule,
        })
    }

    /// The expression with whitespace collapsed.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First firing strictly after `after`.
    pub fn next_after(&self, after: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(after).next()
    }
}

/// Rewrite a 0-7 weekday field (0 and 7 are Sunday) into 1-7 numbering.
/// Names (`MON-FRI`) and `*`/`?` pass through.
fn weekday_field(field: &str) -> std::result::Result<String, String> {
    let mut out = Vec::new();
    for part in field.split(',') {
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => {
                let step: u32 = step.parse().map_err(|_| format!("bad step '{step}'"))?;
                if step == 0 {
                    return Err("step must be positive".into());
                }
                (range, Some(step))
            }
            None => (part, None),
        };

        if range == "*" || range == "?" || range.chars().any(|c| c.is_ascii_alphabetic()) {
            out.push(part.to_string());
            continue;
        }

        let (lo, hi) = match range.split_once('-') {
            Some((a, b)) => (weekday(a)?, weekday(b)?),
            // "N/step" runs to the end of the week
            None if step.is_some() => (weekday(range)?, 7),
            None => {
                let n = weekday(range)?;
                (n, n)
            }
        };
        if lo > hi {
            return Err(format!("empty weekday range '{range}'"));
        }

        let suffix = step.map(|s| format!("/{s}")).unwrap_or_default();
        if lo == hi {
            out.push((lo % 7 + 1).to_string());
        } else if hi < 7 {
            out.push(format!("{}-{}{suffix}", lo + 1, hi + 1));
        } else {
            // The trailing 7 is Sunday again, which the crate numbers 1.
            out.push(format!("{}-7{suffix}", lo + 1));
            if (7 - lo) % step.unwrap_or(1) == 0 {
                out.push("1".into());
            }
        }
    }
    Ok(out.join(","))
}

fn weekday(raw: &str) -> std::result::Result<u32, String> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n <= 7 => Ok(n),
        _ => Err(format!("weekday '{raw}' is not in 0-7")),
    }
}
