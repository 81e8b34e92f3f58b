//! Steganography client: command-line entry point.
//!
//! Hides a message inside an image, or reveals a hidden message, by calling a
//! remote steganography service over HTTP.
//!
//! # Usage
//!
//! ```text
//! stego-client [OPTIONS] <COMMAND>
//!
//! Commands:
//!   encode  --image <PATH> --message <TEXT> [--out <PATH>]
//!   decode  --image <PATH>
//!
//! Options:
//!   --config    <PATH>  Config file [default: platform config dir]
//!   --base-url  <URL>   Service base URL [env: STEGO_BASE_URL]
//!   --log-level <LEVEL> Log level when RUST_LOG is unset [env: STEGO_LOG_LEVEL]
//! ```
//!
//! Results go to stdout (the saved image path, or the revealed message);
//! status messages and logs go to stderr.  The exit code is non-zero when the
//! operation fails.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load AppConfig, apply CLI overrides
//!  └─ HttpTransport::new(base_url)
//!  └─ StegoAppState::new(transport)   -- both controllers + shared banner
//!  └─ ui_bridge commands: switch_tab → select_file → set_message → submit
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use stego_client::application::controller::ResultView;
use stego_client::infrastructure::http::HttpTransport;
use stego_client::infrastructure::storage::config::{load_config, load_config_from, AppConfig};
use stego_client::infrastructure::ui_bridge::{self, CommandResult, StegoAppState, Tab};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Hide a message in an image, or reveal one, using a remote steganography
/// service.
#[derive(Debug, Parser)]
#[command(name = "stego-client", version)]
struct Cli {
    /// Path of the TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the service; `encode/` and `decode/` are appended to it.
    #[arg(long, global = true, env = "STEGO_BASE_URL")]
    base_url: Option<String>,

    /// Log level used when `RUST_LOG` is not set.
    #[arg(long, global = true, env = "STEGO_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Hide a message inside an image.
    Encode {
        /// Cover image.
        #[arg(long)]
        image: PathBuf,
        /// Message to hide.
        #[arg(long)]
        message: String,
        /// Where to save the encoded image [default: <output_dir>/<service file name>].
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Reveal the message hidden in an image.
    Decode {
        /// Image produced by `encode`.
        #[arg(long)]
        image: PathBuf,
    },
}

impl Cli {
    /// Loads the config file and applies CLI/env overrides on top.
    fn resolve_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => load_config().context("failed to load config")?,
        };
        if let Some(base_url) = &self.base_url {
            config.service.base_url = base_url.clone();
        }
        if let Some(level) = &self.log_level {
            config.client.log_level = level.clone();
        }
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.client.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(base_url = %config.service.base_url, "stego-client starting");

    let transport = HttpTransport::new(&config.service.base_url)
        .with_context(|| format!("invalid service URL '{}'", config.service.base_url))?;
    let state = StegoAppState::new(Arc::new(transport));

    let result = match cli.command {
        Command::Encode {
            image,
            message,
            out,
        } => run_encode(&state, &config, image, message, out).await,
        Command::Decode { image } => run_decode(&state, image).await,
    };

    if let Err(e) = &result {
        error!("{e:#}");
    }
    result
}

// ── Commands ──────────────────────────────────────────────────────────────────

async fn run_encode(
    state: &Arc<StegoAppState>,
    config: &AppConfig,
    image: PathBuf,
    message: String,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    ui_bridge::switch_tab(Arc::clone(state), Tab::Encode).await;

    check(ui_bridge::select_file(Arc::clone(state), Tab::Encode, image).await, state)?;
    check(ui_bridge::set_message(Arc::clone(state), message).await, state)?;
    let snapshot = check(ui_bridge::submit(Arc::clone(state), Tab::Encode).await, state)?;

    if let Some(ResultView::EncodedArtifact { size, .. }) = &snapshot.result {
        info!(size, "encoded image received");
    }

    let path = check(
        ui_bridge::save_artifact(Arc::clone(state), out, &config.client.output_dir).await,
        state,
    )?;
    println!("{}", path.display());
    Ok(())
}

async fn run_decode(state: &Arc<StegoAppState>, image: PathBuf) -> anyhow::Result<()> {
    ui_bridge::switch_tab(Arc::clone(state), Tab::Decode).await;

    check(ui_bridge::select_file(Arc::clone(state), Tab::Decode, image).await, state)?;
    let snapshot = check(ui_bridge::submit(Arc::clone(state), Tab::Decode).await, state)?;

    match snapshot.result {
        Some(ResultView::RevealedMessage { message }) => {
            println!("{message}");
            Ok(())
        }
        other => bail!("unexpected decode result: {other:?}"),
    }
}

/// Prints the banner to stderr and unwraps a command result.
fn check<T: serde::Serialize>(
    result: CommandResult<T>,
    state: &StegoAppState,
) -> anyhow::Result<T> {
    let banner = state.relay.current();
    if banner.visible {
        eprintln!("[{}] {}", banner.severity, banner.message);
    }
    match (result.success, result.data) {
        (true, Some(data)) => Ok(data),
        _ => bail!(result
            .error
            .unwrap_or_else(|| "command failed without a message".to_string())),
    }
}
