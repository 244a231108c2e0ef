//! Discord notification sink
//!
//! Sends and deletes channel messages through serenity's HTTP client. The
//! gateway side of the bot lives in [`crate::discord`]; this sink only needs
//! REST access and can be constructed before the gateway connects.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{ChannelId, MessageId};
use serenity::http::Http;
use tracing::debug;

use super::{MessageRef, Notifier, NotifyError, NotifyResult};

/// [`Notifier`] backed by Discord channel messages
pub struct DiscordNotifier {
    http: Arc<Http>,
}

impl DiscordNotifier {
    /// Create a notifier over an existing HTTP client
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, channel_id: u64, text: &str) -> NotifyResult<MessageRef> {
        if channel_id == 0 {
            return Err(NotifyError::InvalidChannel(channel_id));
        }

        let message = ChannelId::new(channel_id)
            .say(&self.http, text)
            .await
            .map_err(NotifyError::from)?;

        debug!(channel_id, message_id = message.id.get(), "notification sent");

        Ok(MessageRef {
            channel_id,
            message_id: message.id.get(),
        })
    }

    async fn delete(&self, message: &MessageRef) -> NotifyResult<()> {
        if message.channel_id == 0 || message.message_id == 0 {
            return Err(NotifyError::InvalidChannel(message.channel_id));
        }

        ChannelId::new(message.channel_id)
            .delete_message(&self.http, MessageId::new(message.message_id))
            .await
            .map_err(NotifyError::from)?;

        debug!(
            channel_id = message.channel_id,
            message_id = message.message_id,
            "notification deleted"
        );

        Ok(())
    }
}
