//! slirc-client entry point.

mod terminal;

use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use slirc_client::config::DEFAULT_PORT;
use slirc_client::{Client, ClientConfig, ConnectionError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::terminal::TerminalUi;

/// Minimal IRC client
#[derive(Parser, Debug)]
#[command(name = "slirc-client")]
#[command(about = "A minimal single-server IRC client")]
#[command(version)]
struct Args {
    /// Server host name or address
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Nickname to register with
    #[arg(short, long)]
    nick: String,

    /// User info sent at registration (defaults to the nickname)
    #[arg(short, long)]
    user_info: Option<String>,

    /// Channel to join after registration
    #[arg(short, long)]
    channel: Option<String>,

    /// File that receives the client's log output
    #[arg(long, default_value = "slirc-client.log")]
    log_file: PathBuf,
}

impl Args {
    fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(&self.host, self.port, &self.nick);
        if let Some(user_info) = &self.user_info {
            config = config.with_user_info(user_info);
        }
        if let Some(channel) = &self.channel {
            config = config.with_default_channel(channel);
        }
        config
    }
}

/// Log to an append-only file so output never mixes with the chat.
fn init_tracing(path: &Path) -> anyhow::Result<WorkerGuard> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("log file {} has no file name", path.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .init();
    Ok(guard)
}

/// Forward stdin lines on a plain thread; it dies with the process.
fn spawn_stdin_reader(tx: mpsc::Sender<String>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = init_tracing(&args.log_file)?;

    let config = args.config();
    config.validate().context("invalid configuration")?;
    info!(addr = %config.address(), nick = %config.nickname, "starting slirc-client");

    let (tx, rx) = mpsc::channel(64);
    spawn_stdin_reader(tx);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let mut client = Client::new(config, TerminalUi::new());
    match client.run(rx, cancel).await {
        Ok(()) => Ok(()),
        // Orderly close from the server side.
        Err(ConnectionError::Closed) => Ok(()),
        Err(err) => {
            error!(error = %err, "session ended");
            Err(err).context("connection failed")
        }
    }
}
