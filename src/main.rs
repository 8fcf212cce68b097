//! # OrderSync
//!
//! Posts Magento order digests to a Zoho Cliq channel on a schedule.
//!
//! Usage:
//!   ordersync run --cron "0 4 * * *"     # One invocation for that schedule
//!   ordersync daemon                     # Fire every profile on its cron
//!   ordersync serve --port 8787          # HTTP probe + /__scheduled trigger
//!   ordersync profiles                   # Show profiles and next run times

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ordersync_channels::CliqChannel;
use ordersync_core::SyncConfig;
use ordersync_providers::MagentoClient;
use ordersync_scheduler::{Dispatcher, Pipeline, RunReport, cron};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ordersync",
    version,
    about = "🛒 OrderSync — Magento order digests for Zoho Cliq"
)]
struct Cli {
    /// Config file (default: ~/.ordersync/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the profile selected by a schedule identity once
    Run {
        /// Cron expression of the profile to run, e.g. "0 4 * * *"
        #[arg(long)]
        cron: String,
    },
    /// Keep running and fire each profile on its cron schedule
    Daemon,
    /// Serve the HTTP probe and manual trigger endpoint
    Serve {
        /// Listen port (overrides [gateway].port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List configured profiles and their next run time
    Profiles,
}

fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).to_string())
}

fn load_config(path: Option<&str>) -> Result<SyncConfig> {
    let mut config = match path {
        Some(p) => SyncConfig::load_from(&expand_path(p))?,
        None => SyncConfig::load()?,
    };
    config.apply_env();
    tracing::debug!("Loaded {} profile(s)", config.profiles.len());
    Ok(config)
}

fn build_dispatcher(config: &SyncConfig) -> Result<Dispatcher> {
    config.validate().context("invalid configuration")?;
    let source = Arc::new(MagentoClient::new(config.magento.clone()));
    let notifier = Arc::new(CliqChannel::new(config.cliq.clone()));
    let pipeline = Pipeline::new(
        source,
        notifier,
        Duration::from_millis(config.pipeline.message_delay_ms),
    );
    Ok(Dispatcher::new(config.profiles.clone(), pipeline))
}

/// One invocation for `cron`. An identity no profile uses is a no-op and
/// needs no credentials.
async fn run_once(config: &SyncConfig, cron: &str) -> Result<Option<RunReport>> {
    if config.profile_for(cron).is_none() {
        return Ok(None);
    }
    let dispatcher = build_dispatcher(config)?;
    Ok(dispatcher.dispatch(cron, chrono::Utc::now()).await?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "ordersync=debug,tower_http=debug"
    } else {
        "ordersync=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Run { cron } => {
            match run_once(&config, &cron).await? {
                Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
                None => println!("No profile is scheduled as '{cron}', nothing to do."),
            }
        }
        Command::Daemon => {
            let dispatcher = Arc::new(build_dispatcher(&config)?);
            ordersync_scheduler::spawn_scheduler(dispatcher).await;
        }
        Command::Serve { port } => {
            let dispatcher = Arc::new(build_dispatcher(&config)?);
            let mut gateway = config.gateway.clone();
            if let Some(port) = port {
                gateway.port = port;
            }
            println!("🛒 OrderSync v{}", env!("CARGO_PKG_VERSION"));
            println!("   🌐 Probe:   http://{}:{}/", gateway.host, gateway.port);
            println!("   🔔 Trigger: http://{}:{}/__scheduled?cron=...", gateway.host, gateway.port);
            println!();
            ordersync_gateway::start(&gateway, ordersync_gateway::AppState::new(dispatcher)).await?;
        }
        Command::Profiles => {
            let now = chrono::Utc::now();
            for profile in &config.profiles {
                let next = cron::next_run_from_cron(&profile.cron, now)
                    .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                    .unwrap_or_else(|| "never (invalid cron)".into());
                println!("📅 {} [{}] status={} next={}", profile.name, profile.cron, profile.status, next);
                println!("   {}", profile.label);
            }
        }
    }

    Ok(())
}
