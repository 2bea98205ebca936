//! # Notification Runtime
//!
//! Connects to the notification backend over WebSocket and keeps a live,
//! deduplicated notification list for one user.
//!
//! ## Usage
//!
//! ```bash
//! # Local backend, no authentication
//! notify-runtime --user-id u-42
//!
//! # Remote backend with a session token and JSON logs
//! NC_TOKEN=... notify-runtime --ws-url wss://api.example.com/ws --user-id u-42 --json-logs
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Parse CLI flags (each falls back to an `NC_*` variable)
//! 2. Initialize logging
//! 3. Load center configuration from the environment, apply CLI overrides
//! 4. Start the WebSocket connection loop
//! 5. Drive the center until Ctrl-C

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_stream::StreamExt;
use tracing::{info, warn};

use notification_center::{
    CenterConfig, CenterSignal, DefaultPresentation, NotificationCenter, NotificationCenterApi,
};
use notify_runtime::{init_logging, render_list, LoggingConfig, WsConfig, WsTransport};
use notify_types::{UserId, ValidationMode};

/// Real-time notification center client
#[derive(Parser, Debug)]
#[command(name = "notify-runtime")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// WebSocket endpoint URL
    #[arg(long, env = "NC_WS_URL", default_value = "ws://localhost:3000/ws")]
    ws_url: String,

    /// User whose notifications are tracked
    #[arg(long, env = "NC_USER_ID")]
    user_id: String,

    /// Session token sent in the authentication handshake
    #[arg(long, env = "NC_TOKEN")]
    token: Option<String>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, env = "NC_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit JSON log lines
    #[arg(long, env = "NC_JSON_LOGS")]
    json_logs: bool,

    /// Repair non-conforming records instead of rejecting them
    #[arg(long)]
    lenient: bool,

    /// Drop read-state updates made while offline instead of queueing them
    #[arg(long)]
    no_outbox: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&LoggingConfig {
        log_level: args.log_level.clone(),
        json_logs: args.json_logs,
    })?;

    let mut config = CenterConfig::from_env().context("Invalid NC_* configuration")?;
    if args.lenient {
        config.validation = ValidationMode::Lenient;
    }
    if args.no_outbox {
        config.outbox_enabled = false;
    }

    info!("===========================================");
    info!("  Notification Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");
    info!(
        ws_url = %args.ws_url,
        user_id = %args.user_id,
        validation = ?config.validation,
        outbox = config.outbox_enabled,
        "Starting notification center"
    );

    let mut ws_config = WsConfig::new(args.ws_url);
    if let Some(token) = args.token {
        ws_config = ws_config.with_token(token);
    }
    let (transport, connection) = WsTransport::connect(ws_config);

    let center = NotificationCenter::new(config, UserId::new(args.user_id), transport.clone())
        .context("Failed to create notification center")?;

    let driver = tokio::spawn({
        let center = center.clone();
        async move { center.run().await }
    });

    let result = run_until_ctrl_c(&center).await;

    info!("Shutting down");
    center.shutdown();
    transport.close();
    let _ = driver.await;
    let _ = connection.await;

    result
}

/// Print the list on every unread-count change until Ctrl-C.
async fn run_until_ctrl_c(center: &NotificationCenter<WsTransport>) -> Result<()> {
    let presentation = DefaultPresentation::new();
    let signals = center.signal_stream();
    tokio::pin!(signals);

    loop {
        tokio::select! {
            signal = signals.next() => match signal {
                Some(CenterSignal::UnreadCountChanged { unread }) => {
                    info!(unread, "Unread count changed");
                    println!("{}", render_list(&presentation, &center.notifications(), unread));
                }
                Some(CenterSignal::RecoverableError(e)) => {
                    warn!(error = %e, "Recoverable error");
                }
                None => return Ok(()),
            },
            ctrl_c = tokio::signal::ctrl_c() => {
                ctrl_c.context("Failed to listen for Ctrl-C")?;
                return Ok(());
            }
        }
    }
}
