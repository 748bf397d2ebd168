//! Centralized constants for the celowatch-node crate.
//!
//! Configuration defaults live here so the CLI, the config file loader and
//! the tests agree on them.

/// Blockscout explorer queried for both signals
pub const DEFAULT_EXPLORER_URL: &str = "https://baklava-blockscout.celo-testnet.org";

/// Network label used in outbound messages
pub const DEFAULT_NETWORK_NAME: &str = "Celo";

/// Validator label used in outbound messages
pub const DEFAULT_VALIDATOR_NAME: &str = "validator";

/// Maximum silence tolerated from the validator, in seconds
pub const DEFAULT_VALIDATOR_THRESHOLD_SECS: u64 = 30 * 60;

/// Maximum silence tolerated from the whole chain, in seconds
pub const DEFAULT_CHAIN_THRESHOLD_SECS: u64 = 5 * 60;

/// Poll period in seconds
pub const DEFAULT_CHECK_PERIOD_SECS: u64 = 60;

/// Attempts per fetch, including the first one
pub const DEFAULT_RETRY_TRIES: u32 = 4;

/// Delay before the first retry, in seconds
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 3;

/// Multiplier applied to the delay after every retry
pub const DEFAULT_RETRY_BACKOFF: f64 = 2.0;

/// Upper bound for a single HTTP request, in seconds
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 20;

/// Discord REST API root
pub const DEFAULT_DISCORD_API_URL: &str = "https://discord.com/api/v10";

/// File name used when logging to a directory
pub const LOG_FILE_NAME: &str = "celowatch.log";
