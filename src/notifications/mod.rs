//! Chat notification seam
//!
//! Components that announce things (presence changes, restart progress) talk
//! to a [`Notifier`] rather than to the chat platform directly, so the
//! platform SDK stays confined to one implementation and tests can record
//! what would have been sent.

pub mod discord;

pub use discord::DiscordNotifier;

use async_trait::async_trait;
use thiserror::Error;

/// Reference to a message delivered through a [`Notifier`]
///
/// Plain identifiers rather than SDK types, so bookkeeping like the
/// presence tracker's delete-after-delay can live outside the Discord layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    /// Channel the message was sent to
    pub channel_id: u64,

    /// Platform identifier of the message
    pub message_id: u64,
}

/// Errors raised by notification delivery
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The chat platform rejected or failed the call
    #[error("chat platform error: {0}")]
    Platform(String),

    /// A channel identifier was zero or otherwise unusable
    #[error("invalid channel identifier: {0}")]
    InvalidChannel(u64),
}

impl From<serenity::Error> for NotifyError {
    fn from(err: serenity::Error) -> Self {
        Self::Platform(err.to_string())
    }
}

/// Result type for notification operations
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Outbound notification sink
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a message to a channel, returning a reference to it
    async fn send(&self, channel_id: u64, text: &str) -> NotifyResult<MessageRef>;

    /// Delete a previously sent message
    async fn delete(&self, message: &MessageRef) -> NotifyResult<()>;
}
