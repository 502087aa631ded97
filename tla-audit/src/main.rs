//! tla-audit - AI Time Leak Audit lead funnel
//!
//! Serves the landing page variants, the four-step questionnaire, the analyzing
//! screen, the results dashboard and the booking widget. Submitted audits are
//! scored locally, narrated by Gemini (with a static fallback) and forwarded to
//! the lead capture webhooks.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use tla_audit::session::SESSION_IDLE_TIMEOUT;
use tla_audit::AppState;
use tla_common::config::{load_toml_config_or_default, CliOverrides, Settings};

/// How often idle sessions are swept
const REAPER_INTERVAL: Duration = Duration::from_secs(300);

/// Command-line arguments for tla-audit
#[derive(Parser, Debug)]
#[command(name = "tla-audit")]
#[command(about = "AI Time Leak Audit lead funnel")]
#[command(version)]
struct Args {
    /// TOML config file (defaults to ~/.config/tla/tla-audit.toml)
    #[arg(short, long, env = "TLA_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Tracing starts before config loads; the resolved level replaces the initial
    // filter unless RUST_LOG is set
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).is_ok();
    let initial = args.log_level.clone().unwrap_or_else(|| "info".to_string());
    let (filter, filter_handle) = reload::Layer::new(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&initial)),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tla-audit (AI Time Leak Audit)");
    info!(
        "Version: {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let toml_config = load_toml_config_or_default(args.config.as_deref());
    let cli = CliOverrides {
        host: args.host,
        port: args.port,
        log_level: args.log_level,
    };
    let settings = Settings::resolve(&cli, &toml_config);

    if !rust_log {
        match EnvFilter::try_new(&settings.log_level) {
            Ok(level) => {
                if let Err(e) = filter_handle.reload(level) {
                    warn!("Failed to apply log level {}: {}", settings.log_level, e);
                }
            }
            Err(e) => warn!("Invalid log level {}: {}", settings.log_level, e),
        }
    }

    if !settings.gemini.api_key_configured {
        warn!("No Gemini API key configured; results will use the static fallback narrative");
    }
    info!(
        "Analyzing minimum delay: {}ms",
        settings.analyzing_min_delay.as_millis()
    );
    info!(
        "Analytics events: {}",
        if settings.analytics_enabled { "enabled" } else { "disabled" }
    );

    let addr = settings.listen_addr();
    let state = AppState::new(settings);
    state.sessions.spawn_reaper(REAPER_INTERVAL, SESSION_IDLE_TIMEOUT);

    let app = tla_audit::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
