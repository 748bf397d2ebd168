use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ObserverError;

/// Health status of the watched validator and its chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Chain and validator are both producing blocks
    #[default]
    Ok,
    /// Chain is alive but the validator has been silent too long
    ValidatorDown,
    /// The whole chain has stopped producing blocks
    ChainDown,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::ValidatorDown => "validator_down",
            Status::ChainDown => "chain_down",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ObserverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "ok" => Ok(Status::Ok),
            "validator_down" => Ok(Status::ValidatorDown),
            "chain_down" => Ok(Status::ChainDown),
            _ => Err(ObserverError::UnknownStatus(s.to_string())),
        }
    }
}
