//! Celo validator liveness observation
//!
//! This package derives the health status of a single validator and of the
//! chain it belongs to from two "last activity" timestamps.
//!
//! The status machine has three states:
//! - `Ok`: the chain produces blocks and so does the validator
//! - `ValidatorDown`: the chain is alive but the validator has been silent
//!   for longer than the validator threshold
//! - `ChainDown`: no block at all has been produced for longer than the
//!   chain threshold
//!
//! The engine speaks only when the status changes, plus a diagnostic alert
//! whenever one of the timestamps could not be fetched.

pub mod alert;
pub mod engine;
pub mod error;
pub mod signal;
pub mod status;

pub use alert::{format_duration, Alert, MessageContext, Notification, Severity};
pub use engine::{evaluate, Step, StatusEngine};
pub use error::{ObserverError, Result};
pub use signal::{Probe, Signal, Staleness, Thresholds};
pub use status::Status;
