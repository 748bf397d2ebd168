use chrono::{DateTime, Utc};

use crate::alert::Alert;
use crate::signal::{Probe, Thresholds};
use crate::status::Status;

/// Result of feeding one pair of probes to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub status: Status,
    pub alert: Option<Alert>,
}

impl Step {
    fn stay(status: Status) -> Self {
        Self { status, alert: None }
    }

    fn to(status: Status, alert: Alert) -> Self {
        Self { status, alert: Some(alert) }
    }
}

/// StatusEngine tracks the current health status and decides transitions
///
/// The engine only speaks when the status changes. A failed probe is
/// reported every time it happens but never moves the status.
#[derive(Debug, Clone)]
pub struct StatusEngine {
    current: Status,
    thresholds: Thresholds,
}

impl StatusEngine {
    pub fn new(initial: Status, thresholds: Thresholds) -> Self {
        if !thresholds.is_ordered() {
            log::warn!(
                "Validator threshold {:?} is shorter than chain threshold {:?}",
                thresholds.validator,
                thresholds.chain
            );
        }
        Self { current: initial, thresholds }
    }

    pub fn current(&self) -> Status {
        self.current
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Apply one pair of probes and move to the resulting status
    pub fn step(&mut self, validator: &Probe, chain: &Probe, now: DateTime<Utc>) -> Step {
        let step = evaluate(self.current, &self.thresholds, validator, chain, now);

        match (&step.alert, validator, chain) {
            (Some(Alert::ProbeFailed), Probe::Failed(reason), _)
            | (Some(Alert::ProbeFailed), _, Probe::Failed(reason)) => {
                log::warn!("Cannot probe network status: {}", reason);
            }
            _ => {}
        }

        if step.status != self.current {
            log::info!("Status {} -> {}", self.current, step.status);
            self.current = step.status;
        }

        step
    }
}

/// Compute the status that follows `current` without mutating anything
pub fn evaluate(
    current: Status,
    thresholds: &Thresholds,
    validator: &Probe,
    chain: &Probe,
    now: DateTime<Utc>,
) -> Step {
    let (validator, chain) = match (validator.signal(), chain.signal()) {
        (Some(v), Some(c)) => (v, c),
        _ => return Step::to(current, Alert::ProbeFailed),
    };

    let since_validator = validator.staleness(now);
    let since_chain = chain.staleness(now);

    log::debug!(
        "Evaluating from {}: validator last active {:?}, chain last active {:?}",
        current,
        validator.timestamp,
        chain.timestamp
    );

    match current {
        Status::ChainDown => {
            if since_validator.within(thresholds.chain.min(thresholds.validator)) {
                Step::to(Status::Ok, Alert::NetworkRecovered)
            } else if since_chain.within(thresholds.chain) {
                Step::to(Status::ValidatorDown, Alert::NetworkRecoveredValidatorSilent)
            } else {
                Step::stay(current)
            }
        }
        Status::ValidatorDown => {
            if since_chain.exceeds(thresholds.chain) {
                Step::to(Status::ChainDown, Alert::NetworkStoppedToo)
            } else if since_validator.within(thresholds.validator) {
                Step::to(Status::Ok, Alert::ValidatorRestored)
            } else {
                Step::stay(current)
            }
        }
        Status::Ok => {
            if since_chain.exceeds(thresholds.chain) {
                Step::to(
                    Status::ChainDown,
                    Alert::NetworkStopped {
                        since: since_chain,
                        threshold: thresholds.chain,
                    },
                )
            } else if since_validator.exceeds(thresholds.validator) {
                Step::to(
                    Status::ValidatorDown,
                    Alert::ValidatorStalled {
                        since: since_validator,
                        threshold: thresholds.validator,
                    },
                )
            } else {
                Step::stay(current)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;
    use chrono::TimeZone;
    use std::time::Duration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 12, 8, 12, 0, 0).unwrap()
    }

    fn minutes_ago(m: i64) -> Probe {
        Probe::Observed(Signal::new(Some(now() - chrono::Duration::minutes(m)), now()))
    }

    fn thresholds() -> Thresholds {
        Thresholds::new(Duration::from_secs(30 * 60), Duration::from_secs(5 * 60))
    }

    #[test]
    fn test_failed_probe_keeps_status_and_alerts() {
        let mut engine = StatusEngine::new(Status::ValidatorDown, thresholds());
        let failed = Probe::Failed("timed out".to_string());

        let step = engine.step(&failed, &minutes_ago(1), now());
        assert_eq!(step, Step { status: Status::ValidatorDown, alert: Some(Alert::ProbeFailed) });
        assert_eq!(engine.current(), Status::ValidatorDown);

        let step = engine.step(&minutes_ago(1), &failed, now());
        assert_eq!(step.alert, Some(Alert::ProbeFailed));
        assert_eq!(engine.current(), Status::ValidatorDown);
    }

    #[test]
    fn test_evaluate_does_not_mutate() {
        let engine = StatusEngine::new(Status::Ok, thresholds());
        let step = evaluate(engine.current(), engine.thresholds(), &minutes_ago(2), &minutes_ago(6), now());
        assert_eq!(step.status, Status::ChainDown);
        assert_eq!(engine.current(), Status::Ok);
    }

    #[test]
    fn test_step_moves_current() {
        let mut engine = StatusEngine::new(Status::Ok, thresholds());
        engine.step(&minutes_ago(31), &minutes_ago(1), now());
        assert_eq!(engine.current(), Status::ValidatorDown);
        engine.step(&minutes_ago(1), &minutes_ago(1), now());
        assert_eq!(engine.current(), Status::Ok);
    }
}
