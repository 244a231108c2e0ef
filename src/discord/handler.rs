//! Gateway event handler
//!
//! Every event is caught at this boundary: a failure handling one message is
//! logged and answered with a generic apology, never allowed to take the
//! gateway task down.

use std::sync::Arc;

use serenity::all::{ChannelId, Context, EventHandler, GuildId, Member, Message, Ready, User};
use serenity::async_trait;
use tracing::{error, info, warn};

use crate::state::BotState;

use super::commands::dispatch;

/// The bot's gateway event handler
pub struct Handler {
    state: Arc<BotState>,
}

impl Handler {
    /// Create a handler over the shared state
    pub fn new(state: Arc<BotState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, "Discord gateway ready");
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        if let Err(e) = dispatch(&self.state, &ctx, &msg).await {
            error!(category = ?e.category(), error = %e, "command handling failed");
            if let Err(e) = msg
                .reply(&ctx.http, "❌ An error occurred while processing your command.")
                .await
            {
                error!(error = %e, "failed to send error reply");
            }
        }
    }

    async fn guild_member_addition(&self, ctx: Context, member: Member) {
        let text = format!("Welcome to the server, <@{}>! 🎉", member.user.id.get());
        if let Err(e) = ChannelId::new(self.state.config.target_channel_id)
            .say(&ctx.http, text)
            .await
        {
            warn!(error = %e, "failed to send welcome message");
        }
    }

    async fn guild_member_removal(
        &self,
        ctx: Context,
        _guild_id: GuildId,
        user: User,
        _member: Option<Member>,
    ) {
        let text = format!("Goodbye, {}! We'll miss you! 👋", user.name);
        if let Err(e) = ChannelId::new(self.state.config.target_channel_id)
            .say(&ctx.http, text)
            .await
        {
            warn!(error = %e, "failed to send goodbye message");
        }
    }
}
