//! OrderSync configuration system.
//!
//! Values come from `~/.ordersync/config.toml` (or an explicit path) and are
//! then overridden by the environment variables the worker is deployed with.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};
use crate::schedule::CronSchedule;
use crate::types::{OrderWindow, QueryProfile};

pub const ENV_MAGENTO_HOST: &str = "MAGENTO_HOST";
pub const ENV_MAGENTO_TOKEN: &str = "MAGENTO_TOKEN";
pub const ENV_CLIQ_ENDPOINT: &str = "ZOHO_CLIQ_API_ENDPOINT";
pub const ENV_CLIQ_WEBHOOK_TOKEN: &str = "ZOHO_CLIQ_WEBHOOK_TOKEN";
pub const ENV_CLIQ_BOTNAME: &str = "ZOHO_CLIQ_BOTNAME";

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub magento: MagentoConfig,
    #[serde(default)]
    pub cliq: CliqConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default = "QueryProfile::defaults")]
    pub profiles: Vec<QueryProfile>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            magento: MagentoConfig::default(),
            cliq: CliqConfig::default(),
            pipeline: PipelineConfig::default(),
            gateway: GatewayConfig::default(),
            profiles: QueryProfile::defaults(),
        }
    }
}

impl SyncConfig {
    /// Load config from the default path (~/.ordersync/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SyncError::Config(format!("Failed to read config {}: {e}", path.display())))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| SyncError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the OrderSync home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".ordersync")
    }

    /// Override connection settings from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override connection settings from any key lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get(ENV_MAGENTO_HOST) {
            self.magento.host = host;
        }
        if let Some(token) = get(ENV_MAGENTO_TOKEN) {
            self.magento.token = token;
        }
        if let Some(endpoint) = get(ENV_CLIQ_ENDPOINT) {
            self.cliq.endpoint = endpoint;
        }
        if let Some(token) = get(ENV_CLIQ_WEBHOOK_TOKEN) {
            self.cliq.webhook_token = token;
        }
        if let Some(bot) = get(ENV_CLIQ_BOTNAME) {
            self.cliq.bot_name = Some(bot);
        }
    }

    /// The profile a schedule identity selects, if any.
    pub fn profile_for(&self, cron: &str) -> Option<&QueryProfile> {
        QueryProfile::find(&self.profiles, cron)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.magento.host.trim().is_empty() {
            missing.push(ENV_MAGENTO_HOST);
        }
        if self.magento.token.trim().is_empty() {
            missing.push(ENV_MAGENTO_TOKEN);
        }
        if self.cliq.endpoint.trim().is_empty() {
            missing.push(ENV_CLIQ_ENDPOINT);
        }
        if self.cliq.webhook_token.trim().is_empty() {
            missing.push(ENV_CLIQ_WEBHOOK_TOKEN);
        }
        if !missing.is_empty() {
            return Err(SyncError::Config(format!(
                "Missing required settings: {}",
                missing.join(", ")
            )));
        }

        let mut seen = HashSet::new();
        for profile in &self.profiles {
            if profile.status.trim().is_empty() || profile.cron.trim().is_empty() {
                return Err(SyncError::Config(format!(
                    "Profile '{}' needs both a status and a cron expression",
                    profile.name
                )));
            }
            if profile.window == OrderWindow::LastDays(0) {
                return Err(SyncError::Config(format!(
                    "Profile '{}' has an empty window (last_days = 0)",
                    profile.name
                )));
            }
            CronSchedule::parse(&profile.cron).map_err(|e| {
                SyncError::Config(format!("Profile '{}' has an unusable schedule: {e}", profile.name))
            })?;
            if !seen.insert(normalize_cron(&profile.cron)) {
                return Err(SyncError::Config(format!(
                    "Cron '{}' is used by more than one profile",
                    profile.cron
                )));
            }
        }
        Ok(())
    }
}

/// Collapse whitespace so "0  4 * * *" and "0 4 * * *" compare equal.
pub fn normalize_cron(expression: &str) -> String {
    expression.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Magento orders API connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagentoConfig {
    /// Store base URL, e.g. `https://shop.example.com`.
    #[serde(default)]
    pub host: String,
    /// Integration access token (Bearer).
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_magento_timeout")]
    pub timeout_secs: u64,
}

fn default_magento_timeout() -> u64 { 30 }

impl Default for MagentoConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            token: String::new(),
            timeout_secs: default_magento_timeout(),
        }
    }
}

/// Zoho Cliq incoming webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliqConfig {
    /// Webhook endpoint without the `zapikey` query parameter.
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub webhook_token: String,
    /// Display name for the posting bot.
    #[serde(default)]
    pub bot_name: Option<String>,
    #[serde(default = "default_cliq_timeout")]
    pub timeout_secs: u64,
}

fn default_cliq_timeout() -> u64 { 10 }

impl Default for CliqConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            webhook_token: String::new(),
            bot_name: None,
            timeout_secs: default_cliq_timeout(),
        }
    }
}

/// Pipeline pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pause after every chat message.
    #[serde(default = "default_message_delay")]
    pub message_delay_ms: u64,
}

fn default_message_delay() -> u64 { 1000 }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { message_delay_ms: default_message_delay() }
    }
}

/// HTTP probe server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 { 8787 }
fn default_host() -> String { "127.0.0.1".into() }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}
