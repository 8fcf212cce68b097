//! Zoho Cliq incoming webhook — POST `{"text": ...}` to `{endpoint}?zapikey={token}`.

use async_trait::async_trait;
use ordersync_core::config::CliqConfig;
use ordersync_core::error::{Result, SyncError};
use ordersync_core::traits::Notifier;

/// Cliq channel posting through an incoming-webhook token.
pub struct CliqChannel {
    config: CliqConfig,
    client: reqwest::Client,
}

impl CliqChannel {
    pub fn new(config: CliqConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Message body. The bot block is only added when a display name is set.
    pub fn payload(&self, text: &str) -> serde_json::Value {
        match self.config.bot_name.as_deref().filter(|name| !name.is_empty()) {
            Some(name) => serde_json::json!({
                "text": text,
                "bot": { "name": name },
            }),
            None => serde_json::json!({ "text": text }),
        }
    }
}

#[async_trait]
impl Notifier for CliqChannel {
    fn name(&self) -> &str {
        "cliq"
    }

    async fn send(&self, text: &str) -> Result<()> {
        let resp = self
            .client
            .post(&self.config.endpoint)
            .query(&[("zapikey", self.config.webhook_token.as_str())])
            .json(&self.payload(text))
            .timeout(std::time::Duration::from_secs(self.config.timeout_secs))
            .send()
            .await
            .map_err(|e| SyncError::Http(format!("Cliq send failed: {e}")))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        if status.is_success() {
            tracing::debug!("Cliq response: {body}");
            Ok(())
        } else {
            tracing::warn!("⚠️ Cliq rejected message ({status}): {body}");
            Err(SyncError::Webhook {
                status: status
                    .canonical_reason()
                    .map(String::from)
                    .unwrap_or_else(|| status.as_str().to_string()),
                body,
            })
        }
    }
}
