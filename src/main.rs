use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serenity::http::Http;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use palisade::config::BotConfig;
use palisade::discord::{self, CooldownTracker};
use palisade::http;
use palisade::notifications::{DiscordNotifier, Notifier};
use palisade::presence::{PresenceTracker, TrackerConfig};
use palisade::rcon::{RconSession, ZomboidConnector};
use palisade::restart::{RestartFlag, RestartSequencer, StageTable};
use palisade::scheduler::{RestartScheduler, ScheduleSpec};
use palisade::state::BotState;

#[derive(Parser)]
#[command(
    name = "palisade",
    version,
    about = "Discord warden bot for a Project Zomboid server",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot
    Run,

    /// Validate configuration and print the effective values
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    match cli.command {
        Commands::Run => run().await,
        Commands::CheckConfig => check_config(),
    }
}

async fn run() -> Result<()> {
    tracing::info!("palisade warden bot starting");

    let config = BotConfig::from_env()?;
    config.validate()?;

    // RCON session over the production connector.
    let connector = Arc::new(ZomboidConnector::new(
        config.rcon_host.clone(),
        config.rcon_port,
        config.rcon_password.clone(),
    ));
    let session = Arc::new(RconSession::new(connector));

    // REST-only Discord client for the notification sink; the gateway client
    // below keeps its own.
    let rest = Arc::new(Http::new(&config.discord_token));
    let notifier: Arc<dyn Notifier> = Arc::new(DiscordNotifier::new(rest));

    let restart_flag = Arc::new(RestartFlag::new());

    let tracker_config = TrackerConfig {
        poll_interval: config.poll_interval(),
        ..TrackerConfig::default()
    };
    let presence = Arc::new(PresenceTracker::new(
        Arc::clone(&session),
        Arc::clone(&notifier),
        config.notifications_channel_id,
        tracker_config,
    ));

    let sequencer = Arc::new(RestartSequencer::new(
        Arc::clone(&session),
        Arc::clone(&notifier),
        config.notifications_channel_id,
        Arc::clone(&presence),
        Arc::clone(&restart_flag),
        StageTable::default(),
    ));

    let schedule = ScheduleSpec::parse(&config.restart_schedule)?;

    let state = Arc::new(BotState {
        config: config.clone(),
        session: Arc::clone(&session),
        presence: Arc::clone(&presence),
        sequencer: Arc::clone(&sequencer),
        restart_flag: Arc::clone(&restart_flag),
        cooldowns: CooldownTracker::new(),
        start_time: Instant::now(),
    });

    // Background tasks: presence polling, history sweep, restart schedule.
    let poll_task = Arc::clone(&presence).spawn_poll_loop();
    let sweep_task = Arc::clone(&presence).spawn_history_sweep();
    let schedule_task = RestartScheduler::new(
        Arc::clone(&sequencer),
        Arc::clone(&restart_flag),
        Arc::clone(&notifier),
        config.notifications_channel_id,
        schedule,
    )
    .spawn();

    // Liveness endpoint with graceful shutdown.
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let http_task = tokio::spawn(http::serve(Arc::clone(&state), config.http_port, async move {
        let mut shutdown_rx = shutdown_rx;
        let _ = shutdown_rx.changed().await;
    }));

    // The gateway client runs until it fails or we get a shutdown signal.
    let mut client = discord::build_client(Arc::clone(&state)).await?;
    let shard_manager = client.shard_manager.clone();

    tokio::select! {
        result = client.start() => {
            result?;
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
            shard_manager.shutdown_all().await;
        }
    }

    // Teardown: stop timers, close the RCON handle, stop the HTTP surface.
    poll_task.abort();
    sweep_task.abort();
    schedule_task.abort();
    session.disconnect().await;
    let _ = shutdown_tx.send(true);
    if let Ok(result) = http_task.await {
        result?;
    }

    tracing::info!("palisade stopped");
    Ok(())
}

fn check_config() -> Result<()> {
    let config = BotConfig::from_env()?;
    config.validate()?;
    println!("{}", config.display());
    Ok(())
}

/// Resolve on SIGINT or, on unix, SIGTERM.
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let ctrl_c = tokio::signal::ctrl_c();
    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = ctrl_c => {}
                _ = term.recv() => {}
            }
        }
        Err(_) => {
            let _ = ctrl_c.await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("palisade=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("palisade=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    Ok(())
}
