//! CLI commands.
//!
//! - `run`: the monitoring daemon
//! - `probe`: one-shot diagnostic
//! - `opts`: configuration flags shared by both

pub mod opts;
pub mod probe;
pub mod run;
