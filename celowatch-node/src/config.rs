use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use celowatch_observer::{MessageContext, Status, Thresholds};

use crate::constants::*;
use crate::retry::RetryPolicy;
use crate::time_source::Endpoints;

/// Raw configuration, as read from a JSON file or collected from flags.
/// Every field is optional; see [`Config::resolve`] for defaults.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Config {
    pub validator_name: Option<String>,
    pub validator_address: Option<String>,
    pub explorer_url: Option<String>,
    pub network_name: Option<String>,
    pub validator_threshold_secs: Option<u64>,
    pub chain_threshold_secs: Option<u64>,
    pub check_period_secs: Option<u64>,
    pub initial_status: Option<String>,
    pub retry_tries: Option<u32>,
    pub retry_delay_secs: Option<u64>,
    pub retry_backoff: Option<f64>,
    pub discord_bot_token: Option<String>,
    pub discord_channel: Option<String>,
    pub logs_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Config {
    pub fn from_filepath(path: &Path) -> Result<Config> {
        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?;
        let mut config: Config = serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        if let Some(logs_path) = config.logs_path.take() {
            let config_dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let resolved = to_absolute_path(config_dir, &logs_path).with_context(|| {
                format!(
                    "Failed to resolve logs_path {} relative to config file {}",
                    logs_path.display(),
                    path.display()
                )
            })?;
            config.logs_path = Some(resolved);
        }

        Ok(config)
    }

    /// Fields set in `other` win over fields set in `self`
    pub fn overlay(self, other: Config) -> Config {
        Config {
            validator_name: other.validator_name.or(self.validator_name),
            validator_address: other.validator_address.or(self.validator_address),
            explorer_url: other.explorer_url.or(self.explorer_url),
            network_name: other.network_name.or(self.network_name),
            validator_threshold_secs: other.validator_threshold_secs.or(self.validator_threshold_secs),
            chain_threshold_secs: other.chain_threshold_secs.or(self.chain_threshold_secs),
            check_period_secs: other.check_period_secs.or(self.check_period_secs),
            initial_status: other.initial_status.or(self.initial_status),
            retry_tries: other.retry_tries.or(self.retry_tries),
            retry_delay_secs: other.retry_delay_secs.or(self.retry_delay_secs),
            retry_backoff: other.retry_backoff.or(self.retry_backoff),
            discord_bot_token: other.discord_bot_token.or(self.discord_bot_token),
            discord_channel: other.discord_channel.or(self.discord_channel),
            logs_path: other.logs_path.or(self.logs_path),
            log_level: other.log_level.or(self.log_level),
        }
    }

    /// Apply defaults and validate.
    ///
    /// Discord credentials are only required when `needs_discord` is set.
    pub fn resolve(&self, needs_discord: bool) -> Result<Settings> {
        let validator_address = match self.validator_address.as_deref().map(str::trim) {
            Some(address) if !address.is_empty() => address.to_string(),
            _ => bail!("validator address is required (CELO_VALIDATOR_SIGNER_ADDRESS)"),
        };

        let explorer_url = self
            .explorer_url
            .clone()
            .unwrap_or_else(|| DEFAULT_EXPLORER_URL.to_string());
        let endpoints = Endpoints::new(&explorer_url, &validator_address)
            .with_context(|| format!("Invalid explorer URL '{}'", explorer_url))?;

        let check_period_secs = self.check_period_secs.unwrap_or(DEFAULT_CHECK_PERIOD_SECS);
        if check_period_secs == 0 {
            bail!("check period must be at least one second");
        }

        let retry = RetryPolicy {
            tries: self.retry_tries.unwrap_or(DEFAULT_RETRY_TRIES),
            delay: Duration::from_secs(self.retry_delay_secs.unwrap_or(DEFAULT_RETRY_DELAY_SECS)),
            backoff: self.retry_backoff.unwrap_or(DEFAULT_RETRY_BACKOFF),
        };
        if retry.tries == 0 {
            bail!("retry tries must be at least 1");
        }
        if !(retry.backoff.is_finite() && retry.backoff >= 1.0) {
            bail!("retry backoff must be a finite number >= 1.0, got {}", retry.backoff);
        }

        let initial_status = match &self.initial_status {
            Some(s) => s.parse::<Status>().context("Invalid initial status")?,
            None => Status::default(),
        };

        let discord = match (&self.discord_bot_token, &self.discord_channel) {
            (Some(token), Some(channel)) if !token.is_empty() && !channel.is_empty() => Some(DiscordSettings {
                token: token.clone(),
                channel: channel.clone(),
            }),
            _ if needs_discord => {
                bail!("Discord bot token and channel are required (CELO_MONITOR_DISCORD_BOT_TOKEN, CELO_MONITOR_DISCORD_CHANNEL)")
            }
            _ => None,
        };

        let messages = MessageContext {
            validator_name: self
                .validator_name
                .clone()
                .unwrap_or_else(|| DEFAULT_VALIDATOR_NAME.to_string()),
            network_name: self
                .network_name
                .clone()
                .unwrap_or_else(|| DEFAULT_NETWORK_NAME.to_string()),
            probe_host: endpoints.host().to_string(),
        };

        Ok(Settings {
            messages,
            endpoints,
            thresholds: Thresholds::new(
                Duration::from_secs(self.validator_threshold_secs.unwrap_or(DEFAULT_VALIDATOR_THRESHOLD_SECS)),
                Duration::from_secs(self.chain_threshold_secs.unwrap_or(DEFAULT_CHAIN_THRESHOLD_SECS)),
            ),
            check_period: Duration::from_secs(check_period_secs),
            initial_status,
            retry,
            discord,
            logs_path: self.logs_path.clone(),
            log_level: self.log_level.clone(),
        })
    }
}

/// Validated settings with defaults applied
#[derive(Debug, Clone)]
pub struct Settings {
    pub messages: MessageContext,
    pub endpoints: Endpoints,
    pub thresholds: Thresholds,
    pub check_period: Duration,
    pub initial_status: Status,
    pub retry: RetryPolicy,
    pub discord: Option<DiscordSettings>,
    pub logs_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Clone)]
pub struct DiscordSettings {
    pub token: String,
    pub channel: String,
}

impl fmt::Debug for DiscordSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordSettings")
            .field("token", &"<redacted>")
            .field("channel", &self.channel)
            .finish()
    }
}

pub fn to_absolute_path(base_dir: &Path, relative_path: &Path) -> Result<PathBuf> {
    if relative_path.is_absolute() {
        return Ok(relative_path.to_path_buf());
    }
    let base_dir = base_dir.canonicalize()?;
    Ok(base_dir.join(relative_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn minimal() -> Config {
        Config {
            validator_address: Some("0xabc".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_defaults() {
        let settings = minimal().resolve(false).unwrap();
        assert_eq!(settings.thresholds.validator, Duration::from_secs(1800));
        assert_eq!(settings.thresholds.chain, Duration::from_secs(300));
        assert_eq!(settings.check_period, Duration::from_secs(60));
        assert_eq!(settings.initial_status, Status::Ok);
        assert_eq!(settings.retry, RetryPolicy::default());
        assert_eq!(settings.messages.network_name, "Celo");
        assert_eq!(settings.messages.probe_host, "baklava-blockscout.celo-testnet.org");
        assert!(settings.discord.is_none());
    }

    #[test]
    fn test_address_required() {
        let err = Config::default().resolve(false).unwrap_err();
        assert!(err.to_string().contains("validator address"));
    }

    #[test]
    fn test_discord_required_when_asked() {
        assert!(minimal().resolve(true).is_err());

        let config = Config {
            discord_bot_token: Some("secret".to_string()),
            discord_channel: Some("celo-alerts".to_string()),
            ..minimal()
        };
        let discord = config.resolve(true).unwrap().discord.unwrap();
        assert_eq!(discord.channel, "celo-alerts");
        assert!(!format!("{:?}", discord).contains("secret"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let zero_period = Config { check_period_secs: Some(0), ..minimal() };
        assert!(zero_period.resolve(false).is_err());

        let zero_tries = Config { retry_tries: Some(0), ..minimal() };
        assert!(zero_tries.resolve(false).is_err());

        let bad_status = Config { initial_status: Some("sideways".to_string()), ..minimal() };
        assert!(bad_status.resolve(false).is_err());

        let shrinking = Config { retry_backoff: Some(0.5), ..minimal() };
        assert!(shrinking.resolve(false).is_err());
    }

    #[test]
    fn test_overlay_prefers_other() {
        let file = Config {
            validator_name: Some("from-file".to_string()),
            chain_threshold_secs: Some(120),
            ..minimal()
        };
        let flags = Config {
            validator_name: Some("from-flags".to_string()),
            ..Config::default()
        };
        let merged = file.overlay(flags);
        assert_eq!(merged.validator_name.as_deref(), Some("from-flags"));
        assert_eq!(merged.chain_threshold_secs, Some(120));
        assert_eq!(merged.validator_address.as_deref(), Some("0xabc"));
    }

    #[test]
    fn test_from_filepath_resolves_logs_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"validator_address": "0xabc", "initial_status": "chain_down", "logs_path": "logs"}}"#
        )
        .unwrap();

        let config = Config::from_filepath(&path).unwrap();
        assert_eq!(config.initial_status.as_deref(), Some("chain_down"));
        let logs_path = config.logs_path.unwrap();
        assert!(logs_path.is_absolute());
        assert!(logs_path.ends_with("logs"));
    }

    #[test]
    fn test_from_filepath_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = Config::from_filepath(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
