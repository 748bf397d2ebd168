//! Runtime for celowatch.
//!
//! Polls a Blockscout explorer for the validator's and the chain's last
//! block times, feeds them to the [`celowatch_observer::StatusEngine`] and
//! delivers the resulting alerts to Discord.

pub mod config;
pub mod constants;
pub mod discord;
pub mod error;
pub mod logging;
pub mod notifier;
pub mod retry;
pub mod scheduler;
pub mod scrape;
pub mod time_source;

pub use error::{FetchError, NotifyError};
pub use notifier::{Channel, ChannelHandle, LogNotifier, Notifier};
pub use retry::{RetryPolicy, RetryingTimeSource};
pub use scheduler::{Scheduler, TickOutcome};
pub use time_source::{Endpoints, HttpTimeSource, TimeSource};
