use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ObserverError {
    #[error("Unknown status '{0}' (expected ok, validator_down or chain_down)")]
    UnknownStatus(String),
}

pub type Result<T> = std::result::Result<T, ObserverError>;
