//! spkr playback client - main entry point
//!
//! Wires the reconnecting stream transport to the player engine and an
//! external-player media sink: every clip payload arriving from the server is
//! logged, queued, and played back in arrival order with the configured gap.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spkr_common::config::TomlConfig;
use spkr_common::events::{EventBus, SpkrEvent};
use spkr_play::config::{Config, Overrides};
use spkr_play::player::{PlayerEngine, PlayerHandle, ProcessSink};
use spkr_play::state::{MessageLog, DEFAULT_LOG_CAPACITY};
use spkr_play::transport::StreamTransport;

/// Command-line arguments for spkr-play
#[derive(Parser, Debug)]
#[command(name = "spkr-play")]
#[command(about = "Sequential clip playback client for spkr")]
#[command(version)]
struct Args {
    /// Server event stream URL
    #[arg(short = 's', long, env = "SPKR_SERVER_URL")]
    server_url: Option<String>,

    /// Gap before first/next playback, in milliseconds
    #[arg(short = 'd', long, env = "SPKR_DELAY_MS")]
    delay_ms: Option<u64>,

    /// External player command (whitespace-separated, clip path appended)
    #[arg(short = 'p', long, env = "SPKR_PLAYER")]
    player: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let file_config = TomlConfig::load_or_default();

    // RUST_LOG > config file > compiled default
    let default_filter = file_config
        .log_level
        .clone()
        .unwrap_or_else(|| "spkr_play=debug,spkr_common=debug".to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::resolve(
        Overrides {
            server_url: args.server_url,
            delay_ms: args.delay_ms,
            player: args.player,
        },
        file_config,
    );

    info!("Starting spkr playback client");
    info!("Server stream: {}", config.server_url);
    info!(
        "Playback delay: {:?}, player: {}",
        config.delay,
        config.player_command.join(" ")
    );

    let bus = EventBus::new(100);
    let message_log = Arc::new(MessageLog::new(DEFAULT_LOG_CAPACITY));

    // Media sink and player engine
    let (sink_tx, sink_rx) = mpsc::unbounded_channel();
    let sink = ProcessSink::new(config.player_command.clone(), sink_tx)?;
    if !sink.check_player_available().await {
        warn!(
            "Player '{}' not found on PATH; playback attempts will fail",
            config.player_command[0]
        );
    }
    let (engine, handle) = PlayerEngine::new(Box::new(sink), sink_rx, config.delay, bus.clone());
    tokio::spawn(engine.run());

    // Status logging from the event bus
    tokio::spawn(log_events(bus.subscribe(), Arc::clone(&message_log)));

    // Transport, and the glue from received message to queued clip
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel();
    let transport = StreamTransport::new(config.server_url.clone())?;
    tokio::spawn(transport.run(msg_tx, bus.clone()));
    {
        let handle = handle.clone();
        let log = Arc::clone(&message_log);
        tokio::spawn(async move {
            while let Some(payload) = msg_rx.recv().await {
                log.append(format!("clip received ({} bytes)", payload.len()))
                    .await;
                handle.enqueue(payload);
            }
        });
    }

    // Replay control from stdin (the replay button)
    tokio::spawn(stdin_loop(handle));

    shutdown_signal().await;
    info!("Shutting down");
    Ok(())
}

/// Forward bus events to tracing and the message log
async fn log_events(mut rx: broadcast::Receiver<SpkrEvent>, log: Arc<MessageLog>) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                if let Ok(json) = serde_json::to_string(&event) {
                    debug!("event: {}", json);
                }
                match &event {
                    SpkrEvent::PlayerStateChanged {
                        old_state,
                        new_state,
                        ..
                    } => {
                        log.append(format!("player {:?} -> {:?}", old_state, new_state))
                            .await;
                    }
                    SpkrEvent::ClipStarted { clip_id, .. } => {
                        info!("Playing clip {}", clip_id);
                    }
                    SpkrEvent::TransportConnected { url, .. } => {
                        log.append(format!("connected to {}", url)).await;
                    }
                    SpkrEvent::TransportDisconnected { retry_in_ms, .. } => {
                        log.append(format!("disconnected, retrying in {} ms", retry_in_ms))
                            .await;
                    }
                    _ => {}
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Status logger lagged {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("Event bus closed, status logger stopping");
                break;
            }
        }
    }
}

/// Read replay commands from stdin until EOF
async fn stdin_loop(handle: PlayerHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match line.trim() {
            "r" | "replay" => handle.replay(),
            "" => {}
            other => debug!("Ignoring input '{}' (use 'r' to replay)", other),
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
