use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use celowatch_node::config::{Config, Settings};

/// Configuration flags shared by all commands.
///
/// Each flag can also be set through its environment variable or the JSON
/// file given with `--config`; flags and environment win over the file.
#[derive(Debug, Clone, Args)]
pub struct ConfigOpts {
    /// Path to a JSON config file
    #[clap(long, env = "CELO_MONITOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Display name of the validator used in messages
    #[clap(long, env = "CELO_VALIDATOR_NAME")]
    pub validator_name: Option<String>,

    /// Signer address of the validator
    #[clap(long, env = "CELO_VALIDATOR_SIGNER_ADDRESS")]
    pub validator_address: Option<String>,

    /// Base URL of the Blockscout explorer
    #[clap(long, env = "CELO_MONITOR_EXPLORER_URL")]
    pub explorer_url: Option<String>,

    /// Display name of the network used in messages
    #[clap(long, env = "CELO_MONITOR_NETWORK_NAME")]
    pub network_name: Option<String>,

    #[clap(long, env = "CELO_MONITOR_VALIDATOR_THRESHOLD_SECS")]
    pub validator_threshold_secs: Option<u64>,

    #[clap(long, env = "CELO_MONITOR_CHAIN_THRESHOLD_SECS")]
    pub chain_threshold_secs: Option<u64>,

    #[clap(long, env = "CELO_MONITOR_CHECK_PERIOD_SECS")]
    pub check_period_secs: Option<u64>,

    /// Status assumed at startup: ok, validator_down or chain_down
    #[clap(long, env = "CELO_MONITOR_INITIAL_STATUS")]
    pub initial_status: Option<String>,

    #[clap(long, env = "CELO_MONITOR_RETRY_TRIES")]
    pub retry_tries: Option<u32>,

    #[clap(long, env = "CELO_MONITOR_RETRY_DELAY_SECS")]
    pub retry_delay_secs: Option<u64>,

    #[clap(long, env = "CELO_MONITOR_RETRY_BACKOFF")]
    pub retry_backoff: Option<f64>,

    #[clap(long, env = "CELO_MONITOR_DISCORD_BOT_TOKEN", hide_env_values = true)]
    pub discord_bot_token: Option<String>,

    /// Name of the Discord channel alerts are posted to
    #[clap(long, env = "CELO_MONITOR_DISCORD_CHANNEL")]
    pub discord_channel: Option<String>,

    /// Directory for celowatch.log; terminal only when unset
    #[clap(long, env = "CELO_MONITOR_LOGS_PATH")]
    pub logs_path: Option<PathBuf>,

    #[clap(long, env = "CELO_MONITOR_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl ConfigOpts {
    fn as_config(&self) -> Config {
        Config {
            validator_name: self.validator_name.clone(),
            validator_address: self.validator_address.clone(),
            explorer_url: self.explorer_url.clone(),
            network_name: self.network_name.clone(),
            validator_threshold_secs: self.validator_threshold_secs,
            chain_threshold_secs: self.chain_threshold_secs,
            check_period_secs: self.check_period_secs,
            initial_status: self.initial_status.clone(),
            retry_tries: self.retry_tries,
            retry_delay_secs: self.retry_delay_secs,
            retry_backoff: self.retry_backoff,
            discord_bot_token: self.discord_bot_token.clone(),
            discord_channel: self.discord_channel.clone(),
            logs_path: self.logs_path.clone(),
            log_level: self.log_level.clone(),
        }
    }

    /// Merge the config file (if any) under the flags and validate
    pub fn load_settings(&self, needs_discord: bool) -> Result<Settings> {
        let file_config = match &self.config {
            Some(path) => Config::from_filepath(path)?,
            None => Config::default(),
        };
        file_config.overlay(self.as_config()).resolve(needs_discord)
    }
}
