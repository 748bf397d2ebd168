use std::fmt;
use std::time::Duration;

use crate::signal::Staleness;

/// Tag prefixed to every outbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Unknown,
    Ok,
    Alerting,
    ChainStopped,
}

impl Severity {
    pub fn tag(&self) -> &'static str {
        match self {
            Severity::Unknown => "[??]",
            Severity::Ok => "[OK]",
            Severity::Alerting => "[Alerting]",
            Severity::ChainStopped => "[Chain stopped]",
        }
    }
}

/// Something worth telling the operator about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// One of the signals could not be fetched
    ProbeFailed,
    /// ChainDown -> Ok
    NetworkRecovered,
    /// ChainDown -> ValidatorDown
    NetworkRecoveredValidatorSilent,
    /// ValidatorDown -> ChainDown
    NetworkStoppedToo,
    /// ValidatorDown -> Ok
    ValidatorRestored,
    /// Ok -> ChainDown
    NetworkStopped { since: Staleness, threshold: Duration },
    /// Ok -> ValidatorDown
    ValidatorStalled { since: Staleness, threshold: Duration },
}

impl Alert {
    pub fn severity(&self) -> Severity {
        match self {
            Alert::ProbeFailed => Severity::Unknown,
            Alert::NetworkRecovered | Alert::ValidatorRestored => Severity::Ok,
            Alert::NetworkRecoveredValidatorSilent | Alert::ValidatorStalled { .. } => Severity::Alerting,
            Alert::NetworkStoppedToo | Alert::NetworkStopped { .. } => Severity::ChainStopped,
        }
    }

    pub fn render(&self, ctx: &MessageContext) -> Notification {
        let network = &ctx.network_name;
        let validator = &ctx.validator_name;
        let text = match self {
            Alert::ProbeFailed => format!(
                "cannot probe {} network status. maybe {} is down.",
                network, ctx.probe_host
            ),
            Alert::NetworkRecovered => format!("{} network got to work.", network),
            Alert::NetworkRecoveredValidatorSilent => format!(
                "{} network got to work but {} {} validator has not produced any blocks yet.",
                network, validator, network
            ),
            Alert::NetworkStoppedToo => format!("{} network has been stopped, too.", network),
            Alert::ValidatorRestored => format!(
                "{} {} validator has restored to producing blocks.",
                validator, network
            ),
            Alert::NetworkStopped { since: Staleness::Never, threshold } => format!(
                "{} network has been stopped, no block found at all (threshold {}).",
                network,
                format_duration(*threshold)
            ),
            Alert::NetworkStopped { since, threshold } => format!(
                "{} network has been stopped for the last {} (threshold {}).",
                network,
                since,
                format_duration(*threshold)
            ),
            Alert::ValidatorStalled { since: Staleness::Never, threshold } => format!(
                "{} {} validator has not produced any blocks at all (threshold {}).",
                validator,
                network,
                format_duration(*threshold)
            ),
            Alert::ValidatorStalled { since, threshold } => format!(
                "{} {} validator has not produced any blocks for the last {} (threshold {}).",
                validator,
                network,
                since,
                format_duration(*threshold)
            ),
        };

        Notification {
            severity: self.severity(),
            text,
        }
    }
}

/// Cosmetic labels used when rendering alerts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContext {
    pub validator_name: String,
    pub network_name: String,
    /// Host of the data source, mentioned when it cannot be reached
    pub probe_host: String,
}

/// A rendered message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub text: String,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.severity.tag(), self.text)
    }
}

const PERIODS: [(&str, u64); 6] = [
    ("year", 60 * 60 * 24 * 365),
    ("month", 60 * 60 * 24 * 30),
    ("day", 60 * 60 * 24),
    ("hour", 60 * 60),
    ("minute", 60),
    ("second", 1),
];

/// Render a duration as e.g. "1 hour, 5 minutes"
pub fn format_duration(duration: Duration) -> String {
    let mut seconds = duration.as_secs();
    let mut parts = Vec::new();

    for (name, period) in PERIODS {
        if seconds >= period {
            let value = seconds / period;
            seconds %= period;
            let plural = if value > 1 { "s" } else { "" };
            parts.push(format!("{} {}{}", value, name, plural));
        }
    }

    if parts.is_empty() {
        return "0 seconds".to_string();
    }
    parts.join(", ")
}
