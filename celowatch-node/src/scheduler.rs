use anyhow::Result;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use celowatch_observer::{MessageContext, Probe, Status, StatusEngine};

use crate::notifier::Notifier;
use crate::time_source::{probe_signals, Endpoints, TimeSource};

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The notifier was not ready; nothing was fetched
    Skipped,
    Evaluated { status: Status, notified: bool },
}

/// Drives the poll, evaluate, notify cycle
pub struct Scheduler<T, N> {
    engine: StatusEngine,
    source: T,
    notifier: N,
    endpoints: Endpoints,
    messages: MessageContext,
    period: Duration,
}

impl<T: TimeSource, N: Notifier> Scheduler<T, N> {
    pub fn new(
        engine: StatusEngine,
        source: T,
        notifier: N,
        endpoints: Endpoints,
        messages: MessageContext,
        period: Duration,
    ) -> Self {
        Self {
            engine,
            source,
            notifier,
            endpoints,
            messages,
            period,
        }
    }

    pub fn status(&self) -> Status {
        self.engine.current()
    }

    /// Run one tick, evaluating against the clock after both fetches return
    pub async fn tick(&mut self) -> TickOutcome {
        self.tick_with(None).await
    }

    /// Run one tick, evaluating as if it were `now`
    pub async fn tick_at(&mut self, now: DateTime<Utc>) -> TickOutcome {
        self.tick_with(Some(now)).await
    }

    async fn tick_with(&mut self, now: Option<DateTime<Utc>>) -> TickOutcome {
        if !self.notifier.is_ready() {
            log::debug!("Notification channel not resolved yet, skipping tick");
            return TickOutcome::Skipped;
        }

        let (validator, chain) = probe_signals(&self.source, &self.endpoints).await;
        let now = now.unwrap_or_else(Utc::now);
        self.evaluate(&validator, &chain, now).await
    }

    async fn evaluate(&mut self, validator: &Probe, chain: &Probe, now: DateTime<Utc>) -> TickOutcome {
        let step = self.engine.step(validator, chain, now);

        let notified = match step.alert {
            Some(alert) => {
                let notification = alert.render(&self.messages);
                match self.notifier.send(&notification).await {
                    Ok(()) => true,
                    Err(e) => {
                        log::error!("Failed to deliver '{}': {}", notification, e);
                        false
                    }
                }
            }
            None => false,
        };

        TickOutcome::Evaluated {
            status: step.status,
            notified,
        }
    }

    /// Tick every period until shutdown is signalled
    pub async fn run(mut self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        log::info!(
            "Watching {} and {} every {:?} (initial status: {})",
            self.endpoints.validator_url,
            self.endpoints.chain_url,
            self.period,
            self.engine.current()
        );

        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    log::info!("Scheduler shutting down (status: {})", self.engine.current());
                    break;
                }
                _ = interval.tick() => {
                    match self.tick().await {
                        TickOutcome::Skipped => {}
                        TickOutcome::Evaluated { status, notified } => {
                            log::debug!("Tick complete: status {}, notified {}", status, notified);
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
