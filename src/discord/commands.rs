//! Chat command parsing and dispatch
//!
//! Commands are plain text, case-insensitive, and independently
//! rate-limited. Parsing is pure so it can be tested without a gateway;
//! dispatch glues parsed commands onto the library components.

use std::sync::Arc;

use serenity::all::{
    ChannelId, Context, CreateAttachment, CreateMessage, Mentionable, Message, RoleId,
};
use tracing::{info, warn};

use crate::error::Result;
use crate::notifications::NotifyError;
use crate::rcon::sanitize_broadcast;
use crate::restart::RestartOutcome;
use crate::state::BotState;

/// A recognized chat command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `!players` / `!online`: list who is on the server
    Players,
    /// `!testrcon`: trigger an immediate presence poll
    TestRcon,
    /// `!restart` / `!restartserver`: run the restart countdown (privileged)
    Restart,
    /// `!announce <text>`: broadcast in-game (privileged)
    Announce(String),
    /// `!post [channel_id] <text>`: cross-post to a channel (privileged)
    Post {
        channel_id: Option<u64>,
        text: String,
    },
    /// `!help` / `!commands`
    Help,
}

/// A conversational greeting the bot plays along with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Greeting {
    Hello,
    Goodbye,
}

/// Parse message content into a command, if it is one
pub fn parse_command(content: &str) -> Option<Command> {
    let trimmed = content.trim();
    let lower = trimmed.to_lowercase();

    match lower.as_str() {
        "!players" | "!online" => return Some(Command::Players),
        "!testrcon" => return Some(Command::TestRcon),
        "!restart" | "!restartserver" => return Some(Command::Restart),
        "!help" | "!commands" => return Some(Command::Help),
        "!post" => {
            // Attachment-only cross-post.
            return Some(Command::Post {
                channel_id: None,
                text: String::new(),
            });
        }
        _ => {}
    }

    if lower.starts_with("!announce ") {
        return Some(Command::Announce(trimmed["!announce ".len()..].trim().to_string()));
    }

    if lower.starts_with("!post ") {
        let rest = trimmed["!post ".len()..].trim();
        let (channel_id, text) = split_channel_override(rest);
        return Some(Command::Post { channel_id, text });
    }

    None
}

/// Parse message content as a greeting
pub fn parse_greeting(content: &str) -> Option<Greeting> {
    match content.trim().to_lowercase().as_str() {
        "hi" | "hello" | "hey" => Some(Greeting::Hello),
        "bye" | "goodbye" | "see you" => Some(Greeting::Goodbye),
        _ => None,
    }
}

/// Snowflake identifiers are 17-20 digit numbers; a leading word that looks
/// like one selects the target channel.
fn split_channel_override(rest: &str) -> (Option<u64>, String) {
    let mut words = rest.splitn(2, ' ');
    let first = words.next().unwrap_or_default();

    if (17..=20).contains(&first.len()) && first.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(id) = first.parse::<u64>() {
            let text = words.next().unwrap_or_default().trim().to_string();
            return (Some(id), text);
        }
    }

    (None, rest.to_string())
}

/// Dispatch one inbound message
pub async fn dispatch(state: &Arc<BotState>, ctx: &Context, msg: &Message) -> Result<()> {
    if let Some(greeting) = parse_greeting(&msg.content) {
        return handle_greeting(state, ctx, msg, greeting).await;
    }

    let Some(command) = parse_command(&msg.content) else {
        return Ok(());
    };

    match command {
        Command::Players => handle_players(state, ctx, msg).await,
        Command::TestRcon => handle_testrcon(state, ctx, msg).await,
        Command::Restart => handle_restart(state, ctx, msg).await,
        Command::Announce(text) => handle_announce(state, ctx, msg, &text).await,
        Command::Post { channel_id, text } => {
            handle_post(state, ctx, msg, channel_id, &text).await
        }
        Command::Help => handle_help(ctx, msg).await,
    }
}

async fn handle_greeting(
    state: &Arc<BotState>,
    ctx: &Context,
    msg: &Message,
    greeting: Greeting,
) -> Result<()> {
    let (relay, reply_text) = match greeting {
        Greeting::Hello => (
            format!("{} said hi in {}! 👋", msg.author.mention(), msg.channel_id.mention()),
            "Hi there! 👋",
        ),
        Greeting::Goodbye => (
            format!("{} said bye in {}! 👋", msg.author.mention(), msg.channel_id.mention()),
            "Bye! See you later! 👋",
        ),
    };

    if let Err(e) = ChannelId::new(state.config.target_channel_id)
        .say(&ctx.http, relay)
        .await
    {
        warn!(error = %e, "failed to relay greeting");
    }

    reply(ctx, msg, reply_text).await
}

async fn handle_players(state: &Arc<BotState>, ctx: &Context, msg: &Message) -> Result<()> {
    if check_cooldown(state, ctx, msg, "players").await? {
        return Ok(());
    }

    let players = state.presence.snapshot().await;
    let text = if players.is_empty() {
        String::from("No players are currently online.")
    } else {
        let list: Vec<&str> = players.iter().map(String::as_str).collect();
        format!("🎮 Players online ({}): {}", players.len(), list.join(", "))
    };

    reply(ctx, msg, &text).await
}

async fn handle_testrcon(state: &Arc<BotState>, ctx: &Context, msg: &Message) -> Result<()> {
    if check_cooldown(state, ctx, msg, "testrcon").await? {
        return Ok(());
    }

    reply(ctx, msg, "Testing RCON connection... Check logs for details.").await?;

    let presence = Arc::clone(&state.presence);
    tokio::spawn(async move {
        presence.poll().await;
    });

    Ok(())
}

async fn handle_restart(state: &Arc<BotState>, ctx: &Context, msg: &Message) -> Result<()> {
    if !is_privileged(ctx, msg, state.config.admin_role_id) {
        return reply(
            ctx,
            msg,
            "❌ You need administrator permissions to restart the server.",
        )
        .await;
    }

    if check_cooldown(state, ctx, msg, "restart").await? {
        return Ok(());
    }

    if state.restart_flag.is_set() {
        return reply(ctx, msg, "⚠️ A restart is already in progress!").await;
    }

    info!(user = %msg.author.name, "manual restart requested");
    reply(ctx, msg, "✅ Server restart initiated! Countdown starting...").await?;

    match state.sequencer.run().await {
        RestartOutcome::Completed => Ok(()),
        RestartOutcome::AlreadyRunning => {
            reply(ctx, msg, "⚠️ A restart is already in progress!").await
        }
        _ => {
            reply(
                ctx,
                msg,
                "❌ Restart failed! Check the notifications channel for details.",
            )
            .await
        }
    }
}

async fn handle_announce(
    state: &Arc<BotState>,
    ctx: &Context,
    msg: &Message,
    text: &str,
) -> Result<()> {
    if !is_privileged(ctx, msg, state.config.admin_role_id) {
        return reply(
            ctx,
            msg,
            "❌ You need administrator permissions to send announcements.",
        )
        .await;
    }

    if check_cooldown(state, ctx, msg, "announce").await? {
        return Ok(());
    }

    if text.trim().is_empty() {
        return reply(ctx, msg, "❌ Please provide a message to announce.").await;
    }

    if state.session.broadcast(text).await {
        let confirmation = format!(
            "✅ Announcement sent to server: \"{}\"",
            sanitize_broadcast(text)
        );
        reply(ctx, msg, &confirmation).await
    } else {
        reply(ctx, msg, "❌ Failed to send announcement. Check bot logs.").await
    }
}

async fn handle_post(
    state: &Arc<BotState>,
    ctx: &Context,
    msg: &Message,
    channel_id: Option<u64>,
    text: &str,
) -> Result<()> {
    if !is_privileged(ctx, msg, state.config.admin_role_id) {
        return reply(
            ctx,
            msg,
            "❌ You need administrator permissions to cross-post announcements.",
        )
        .await;
    }

    if check_cooldown(state, ctx, msg, "post").await? {
        return Ok(());
    }

    if text.is_empty() && msg.attachments.is_empty() {
        return reply(
            ctx,
            msg,
            "❌ Please provide a message and/or attachment to send.\n\
             **Usage:** `!post [channel_id] <message>` or attach files",
        )
        .await;
    }

    let target = channel_id.unwrap_or(state.config.announcement_channel_id);

    let mut builder = CreateMessage::new();
    if !text.is_empty() {
        builder = builder.content(text);
    }

    for attachment in &msg.attachments {
        match CreateAttachment::url(&ctx.http, attachment.url.as_str()).await {
            Ok(file) => builder = builder.add_file(file),
            Err(e) => {
                warn!(error = %e, url = %attachment.url, "failed to fetch attachment");
                return reply(ctx, msg, "❌ Failed to fetch an attachment for forwarding.").await;
            }
        }
    }

    match ChannelId::new(target).send_message(&ctx.http, builder).await {
        Ok(_) => {
            info!(
                user = %msg.author.name,
                channel = target,
                attachments = msg.attachments.len(),
                "cross-post delivered"
            );
            let mut confirmation = format!("✅ Announcement sent to <#{target}>!");
            if !msg.attachments.is_empty() {
                confirmation.push_str(&format!(
                    " (with {} attachment{})",
                    msg.attachments.len(),
                    if msg.attachments.len() > 1 { "s" } else { "" }
                ));
            }
            reply(ctx, msg, &confirmation).await
        }
        Err(e) => {
            warn!(error = %e, channel = target, "cross-post failed");
            reply(
                ctx,
                msg,
                "❌ Channel not found or the bot cannot post there. Check the channel ID.",
            )
            .await
        }
    }
}

async fn handle_help(ctx: &Context, msg: &Message) -> Result<()> {
    let help = "\
**Warden Bot Commands:**

**General:**
- `!players` or `!online` - Check who's online
- `!testrcon` - Test the RCON connection
- `!help` or `!commands` - Show this message

**Admin:**
- `!restart` - Trigger the server restart countdown
- `!announce <message>` - Broadcast to in-game chat
- `!post [channel_id] <message>` - Cross-post to a Discord channel

**Automatic:**
- Scheduled server restarts
- Join/leave notifications
- Member welcome/goodbye messages

Commands have cooldowns to prevent spam.";

    reply(ctx, msg, help).await
}

/// Run a cooldown check, replying with the wait time if blocked.
/// Returns `true` when the command should not proceed.
async fn check_cooldown(
    state: &Arc<BotState>,
    ctx: &Context,
    msg: &Message,
    command: &str,
) -> Result<bool> {
    let status = state.cooldowns.check(command, msg.author.id.get()).await;
    if status.on_cooldown {
        let text = format!(
            "⏳ Please wait {:.1}s before using this command again.",
            status.remaining_secs()
        );
        reply(ctx, msg, &text).await?;
        return Ok(true);
    }
    Ok(false)
}

/// Whether the author may run privileged commands
///
/// With an admin role configured, membership in that role decides. Without
/// one, fall back to the Administrator permission resolved through the
/// cache; an uncached guild resolves to "no".
fn is_privileged(ctx: &Context, msg: &Message, admin_role_id: Option<u64>) -> bool {
    if let Some(role_id) = admin_role_id {
        return match &msg.member {
            Some(member) => member.roles.contains(&RoleId::new(role_id)),
            None => false,
        };
    }

    let Some(guild) = msg.guild(&ctx.cache) else {
        return false;
    };
    guild
        .members
        .get(&msg.author.id)
        .map(|member| guild.member_permissions(member).administrator())
        .unwrap_or(false)
}

async fn reply(ctx: &Context, msg: &Message, text: &str) -> Result<()> {
    msg.reply(&ctx.http, text)
        .await
        .map_err(NotifyError::from)?;
    Ok(())
}
