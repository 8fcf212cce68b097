//! Trigger dispatch — map a schedule identity to its profile and run it.

use chrono::{DateTime, Utc};
use ordersync_core::error::Result;
use ordersync_core::types::QueryProfile;

use crate::pipeline::{Pipeline, RunReport};

/// Holds the configured profiles and the pipeline they run through.
pub struct Dispatcher {
    profiles: Vec<QueryProfile>,
    pipeline: Pipeline,
}

impl Dispatcher {
    pub fn new(profiles: Vec<QueryProfile>, pipeline: Pipeline) -> Self {
        Self { profiles, pipeline }
    }

    pub fn profiles(&self) -> &[QueryProfile] {
        &self.profiles
    }

    /// Profile whose cron matches `cron` (whitespace-insensitive).
    pub fn profile_for(&self, cron: &str) -> Option<&QueryProfile> {
        QueryProfile::find(&self.profiles, cron)
    }

    /// Run the profile selected by `cron`. Unknown identities are a no-op (`Ok(None)`).
    pub async fn dispatch(&self, cron: &str, now: DateTime<Utc>) -> Result<Option<RunReport>> {
        let Some(profile) = self.profile_for(cron) else {
            tracing::debug!("No profile for schedule '{cron}', nothing to do");
            return Ok(None);
        };

        tracing::info!("🔔 Schedule '{}' fired → profile '{}'", cron, profile.name);
        let report = self.pipeline.run(profile, now).await?;
        tracing::info!(
            "✅ [{}] {} matched, {} message(s) sent{}",
            report.profile,
            report.matched.len(),
            report.messages_sent,
            if report.truncated { " (partial fetch)" } else { "" }
        );
        Ok(Some(report))
    }
}
