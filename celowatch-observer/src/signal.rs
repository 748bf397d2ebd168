use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// Maximum tolerated staleness for each signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// How long the validator may go without producing a block
    pub validator: Duration,
    /// How long the chain may go without producing any block
    pub chain: Duration,
}

impl Thresholds {
    pub fn new(validator: Duration, chain: Duration) -> Self {
        Self { validator, chain }
    }

    /// The validator threshold is expected to be at least the chain threshold.
    /// Nothing enforces it; callers may warn when this returns false.
    pub fn is_ordered(&self) -> bool {
        self.validator >= self.chain
    }
}

/// A single fetched "last activity" measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal {
    /// When the activity happened; `None` if the source had no such record
    pub timestamp: Option<DateTime<Utc>>,
    /// When the measurement was taken
    pub fetched_at: DateTime<Utc>,
}

impl Signal {
    pub fn new(timestamp: Option<DateTime<Utc>>, fetched_at: DateTime<Utc>) -> Self {
        Self { timestamp, fetched_at }
    }

    /// A signal whose source reported no activity at all
    pub fn absent(fetched_at: DateTime<Utc>) -> Self {
        Self { timestamp: None, fetched_at }
    }

    pub fn staleness(&self, now: DateTime<Utc>) -> Staleness {
        match self.timestamp {
            Some(ts) => Staleness::Since(now - ts),
            None => Staleness::Never,
        }
    }
}

/// Time elapsed since the last observed activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    Since(chrono::Duration),
    /// No activity was ever observed; older than any threshold
    Never,
}

impl Staleness {
    /// True if the elapsed time is strictly greater than `threshold`.
    /// Activity stamped in the future counts as fresh.
    pub fn exceeds(&self, threshold: Duration) -> bool {
        match self {
            Staleness::Never => true,
            Staleness::Since(elapsed) => match elapsed.to_std() {
                Ok(elapsed) => elapsed > threshold,
                Err(_) => false,
            },
        }
    }

    pub fn within(&self, threshold: Duration) -> bool {
        !self.exceeds(threshold)
    }
}

impl fmt::Display for Staleness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Staleness::Since(elapsed) => {
                let secs = elapsed.num_seconds().max(0) as u64;
                f.write_str(&crate::alert::format_duration(Duration::from_secs(secs)))
            }
            Staleness::Never => f.write_str("ever"),
        }
    }
}

/// Outcome of fetching one signal, as handed to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    Observed(Signal),
    /// The source could not be reached; carries the reason for logging
    Failed(String),
}

impl Probe {
    pub fn is_failed(&self) -> bool {
        matches!(self, Probe::Failed(_))
    }

    pub fn signal(&self) -> Option<&Signal> {
        match self {
            Probe::Observed(signal) => Some(signal),
            Probe::Failed(_) => None,
        }
    }
}

impl<E: fmt::Display> From<std::result::Result<Signal, E>> for Probe {
    fn from(result: std::result::Result<Signal, E>) -> Self {
        match result {
            Ok(signal) => Probe::Observed(signal),
            Err(e) => Probe::Failed(e.to_string()),
        }
    }
}
