use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::sync::broadcast;

use celowatch_node::config::Settings;
use celowatch_node::discord::{wait_for_transport, DiscordNotifier};
use celowatch_node::{logging, HttpTimeSource, LogNotifier, Notifier, RetryingTimeSource, Scheduler};
use celowatch_observer::StatusEngine;

use super::opts::ConfigOpts;

#[derive(Debug, Parser)]
pub struct Opts {
    #[command(flatten)]
    pub common: ConfigOpts,

    /// Log alerts instead of posting them to Discord
    #[clap(long)]
    pub dry_run: bool,
}

pub async fn run(opts: &Opts) -> Result<()> {
    let settings = opts.common.load_settings(!opts.dry_run)?;
    logging::init_logging(settings.logs_path.clone(), settings.log_level.clone())?;

    log::info!("Settings: {:?}", settings);

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Received Ctrl-C, shutting down");
            let _ = signal_tx.send(());
        }
    });

    match (&settings.discord, opts.dry_run) {
        (Some(discord), false) => {
            let notifier = Arc::new(
                DiscordNotifier::new(&discord.token, &discord.channel)
                    .context("Failed to build Discord client")?,
            );
            tokio::spawn(wait_for_transport(
                notifier.clone(),
                settings.check_period,
                shutdown_tx.subscribe(),
            ));
            watch(&settings, notifier, &shutdown_tx).await
        }
        _ => {
            log::info!("Dry run: alerts go to the log only");
            watch(&settings, LogNotifier, &shutdown_tx).await
        }
    }
}

async fn watch<N: Notifier>(settings: &Settings, notifier: N, shutdown_tx: &broadcast::Sender<()>) -> Result<()> {
    let source = RetryingTimeSource::new(
        HttpTimeSource::new().context("Failed to build HTTP client")?,
        settings.retry,
    );
    log::info!(
        "Fetches retry up to {} times, pausing at most {:?} in total",
        source.policy().tries,
        source.policy().worst_case_backoff()
    );

    let scheduler = Scheduler::new(
        StatusEngine::new(settings.initial_status, settings.thresholds),
        source,
        notifier,
        settings.endpoints.clone(),
        settings.messages.clone(),
        settings.check_period,
    );

    scheduler.run(shutdown_tx.subscribe()).await
}
