//! Discord delivery over the REST API
//!
//! The bot token authenticates every request. The destination channel is
//! looked up by name among the channels of every guild the bot belongs to.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use celowatch_observer::Notification;

use crate::constants::{DEFAULT_DISCORD_API_URL, HTTP_REQUEST_TIMEOUT_SECS};
use crate::error::NotifyError;
use crate::notifier::{Channel, ChannelHandle, Notifier};

#[derive(Debug, Deserialize)]
struct Guild {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct GuildChannel {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

/// Discord notifier
pub struct DiscordNotifier {
    client: Client,
    api_url: String,
    token: String,
    channel_name: String,
    channel: ChannelHandle,
}

impl DiscordNotifier {
    pub fn new(token: &str, channel_name: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self::with_api_url(client, DEFAULT_DISCORD_API_URL, token, channel_name))
    }

    pub fn with_api_url(client: Client, api_url: &str, token: &str, channel_name: &str) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            channel_name: channel_name.to_string(),
            channel: ChannelHandle::new(),
        }
    }

    pub fn channel(&self) -> &ChannelHandle {
        &self.channel
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("Authorization", format!("Bot {}", self.token))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, NotifyError> {
        let url = format!("{}{}", self.api_url, path);
        let res = self.authorized(self.client.get(&url)).send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(res.json().await?)
    }

    /// Resolve the destination channel by name.
    ///
    /// Returns whether the channel is resolved afterwards. Once resolved, the
    /// handle never changes.
    pub async fn on_transport_ready(&self) -> Result<bool, NotifyError> {
        if self.channel.is_resolved() {
            return Ok(true);
        }

        let guilds: Vec<Guild> = self.get("/users/@me/guilds").await?;
        log::debug!("Bot is a member of {} guild(s)", guilds.len());

        for guild in guilds {
            let channels: Vec<GuildChannel> = self.get(&format!("/guilds/{}/channels", guild.id)).await?;
            let found = channels
                .into_iter()
                .find(|c| c.name.as_deref() == Some(self.channel_name.as_str()));

            if let Some(found) = found {
                log::info!(
                    "Resolved channel #{} ({}) in guild {}",
                    self.channel_name,
                    found.id,
                    guild.name
                );
                self.channel.resolve(Channel {
                    id: found.id,
                    name: self.channel_name.clone(),
                });
                return Ok(true);
            }
        }

        Ok(false)
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn is_ready(&self) -> bool {
        self.channel.is_resolved()
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let channel = match self.channel.get() {
            Some(channel) => channel,
            None => {
                log::debug!("Channel not resolved yet, dropping: {}", notification);
                return Ok(());
            }
        };

        let url = format!("{}/channels/{}/messages", self.api_url, channel.id);
        let res = self
            .authorized(self.client.post(&url))
            .json(&json!({ "content": notification.to_string() }))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        log::info!("Sent to #{}: {}", channel.name, notification);
        Ok(())
    }
}

/// Keep trying to resolve the channel until it succeeds or shutdown
pub async fn wait_for_transport(
    notifier: Arc<DiscordNotifier>,
    retry_every: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    loop {
        match notifier.on_transport_ready().await {
            Ok(true) => return,
            Ok(false) => log::warn!(
                "Channel #{} not found in any guild, retrying in {:?}",
                notifier.channel_name,
                retry_every
            ),
            Err(e) => log::error!("Failed to resolve Discord channel: {}", e),
        }

        tokio::select! {
            _ = shutdown_rx.recv() => return,
            _ = tokio::time::sleep(retry_every) => {}
        }
    }
}
