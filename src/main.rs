#![forbid(unsafe_code)]

//! `podmigd` — pod migration coordinator daemon.
//!
//! Bootstraps configuration, registers the static pods, and serves the
//! migration API until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use podmigd::checkpointer::LocalCheckpointer;
use podmigd::config::GlobalConfig;
use podmigd::http;
use podmigd::migration::Coordinator;
use podmigd::registry::InMemoryPodRegistry;
use podmigd::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "podmigd", about = "Pod migration coordinator", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Override the configured checkpoint root.
    #[arg(long)]
    checkpoint_root: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("podmigd bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = GlobalConfig::load_from_path(&args.config)?;
    if let Some(root) = args.checkpoint_root {
        config.checkpoint_root = root;
    }
    info!(
        checkpoint_root = %config.checkpoint_root.display(),
        static_pods = config.static_pods.len(),
        "configuration loaded"
    );

    // ── Wire the registry, preparer, and coordinator ────
    let registry = Arc::new(InMemoryPodRegistry::with_pods(config.static_pods.clone()));
    let preparer = Arc::new(LocalCheckpointer::new(Arc::clone(&registry)));
    let coordinator = Arc::new(Coordinator::new(
        &config.checkpoint_root,
        registry,
        preparer,
    ));

    // ── Serve the migration API ─────────────────────────
    let ct = CancellationToken::new();
    let server_ct = ct.clone();
    let bind = config.bind();
    let server_handle = tokio::spawn(async move {
        if let Err(err) = http::serve(coordinator, bind, server_ct).await {
            error!(%err, "migration API failed");
        }
    });

    // ── Wait for shutdown signal ────────────────────────
    shutdown_signal().await;
    info!("shutdown signal received");
    ct.cancel();

    let _ = server_handle.await;
    info!("podmigd shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
