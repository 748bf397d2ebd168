use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;

use celowatch_node::time_source::probe_signals;
use celowatch_node::{logging, HttpTimeSource, RetryingTimeSource};
use celowatch_observer::{engine, Probe};

use super::opts::ConfigOpts;

#[derive(Debug, Parser)]
pub struct Opts {
    #[command(flatten)]
    pub common: ConfigOpts,
}

pub async fn run(opts: &Opts) -> Result<()> {
    let settings = opts.common.load_settings(false)?;
    logging::init_logging(None, settings.log_level.clone().or_else(|| Some("warn".to_string())))?;

    let source = RetryingTimeSource::new(
        HttpTimeSource::new().context("Failed to build HTTP client")?,
        settings.retry,
    );

    let (validator, chain) = probe_signals(&source, &settings.endpoints).await;
    let now = Utc::now();

    print_probe("validator", &settings.endpoints.validator_url, &validator, now);
    print_probe("chain", &settings.endpoints.chain_url, &chain, now);

    let step = engine::evaluate(
        settings.initial_status,
        &settings.thresholds,
        &validator,
        &chain,
        now,
    );
    println!("status:    {} -> {}", settings.initial_status, step.status);
    if let Some(alert) = step.alert {
        println!("would send: {}", alert.render(&settings.messages));
    }

    Ok(())
}

fn print_probe(label: &str, url: &str, probe: &Probe, now: chrono::DateTime<Utc>) {
    println!("{}: {}", label, url);
    match probe {
        Probe::Observed(signal) => match signal.timestamp {
            Some(ts) => println!("  last activity {} ({} ago)", ts, signal.staleness(now)),
            None => println!("  no activity found"),
        },
        Probe::Failed(reason) => println!("  fetch failed: {}", reason),
    }
}
