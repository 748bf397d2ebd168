use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Gave up on {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Whether another attempt might succeed
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport { source, .. } => !source.is_builder(),
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            FetchError::Exhausted { .. } => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Discord request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Discord responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },
}
