//! Gateway client construction

use std::sync::Arc;

use anyhow::{Context as _, Result};
use serenity::all::{Client, GatewayIntents};

use crate::state::BotState;

use super::handler::Handler;

/// Build the gateway client with the intents the bot needs
///
/// Guild, message-content, and member intents cover command handling,
/// greeting relays, and the welcome/goodbye events.
pub async fn build_client(state: Arc<BotState>) -> Result<Client> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS;

    let token = state.config.discord_token.clone();

    Client::builder(&token, intents)
        .event_handler(Handler::new(state))
        .await
        .context("failed to build Discord client")
}
