use async_trait::async_trait;
use std::sync::{Arc, OnceLock};

use celowatch_observer::Notification;

use crate::error::NotifyError;

/// Delivers notifications to a destination resolved at runtime
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Whether the destination has been resolved
    fn is_ready(&self) -> bool;

    /// Deliver `notification`. Before the destination is resolved this is a
    /// silent no-op.
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

#[async_trait]
impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        (**self).send(notification).await
    }
}

/// A resolved destination channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: String,
    pub name: String,
}

/// Write-once reference to the destination channel
///
/// Resolution may happen on another task than the one polling; the cell
/// publishes the channel with acquire/release ordering.
#[derive(Debug, Clone, Default)]
pub struct ChannelHandle {
    inner: Arc<OnceLock<Channel>>,
}

impl ChannelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if a channel was already resolved; the first one sticks.
    pub fn resolve(&self, channel: Channel) -> bool {
        self.inner.set(channel).is_ok()
    }

    pub fn get(&self) -> Option<&Channel> {
        self.inner.get()
    }

    pub fn is_resolved(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// Writes notifications to the log instead of a chat channel
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn is_ready(&self) -> bool {
        true
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        log::warn!("{}", notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(id: &str) -> Channel {
        Channel {
            id: id.to_string(),
            name: "celo-alerts".to_string(),
        }
    }

    #[test]
    fn test_handle_starts_unresolved() {
        let handle = ChannelHandle::new();
        assert!(!handle.is_resolved());
        assert_eq!(handle.get(), None);
    }

    #[test]
    fn test_first_resolution_sticks() {
        let handle = ChannelHandle::new();
        assert!(handle.resolve(channel("1")));
        assert!(!handle.resolve(channel("2")));
        assert_eq!(handle.get().map(|c| c.id.as_str()), Some("1"));
    }

    #[test]
    fn test_clones_share_resolution() {
        let handle = ChannelHandle::new();
        let seen_by_loop = handle.clone();
        std::thread::spawn(move || handle.resolve(channel("42")))
            .join()
            .unwrap();
        assert!(seen_by_loop.is_resolved());
    }
}
