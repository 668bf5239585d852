//! BearCart analytics dashboard backend.
//!
//! Serves a fixed-shape dashboard summary and per-tab analyses from one of:
//! - seeded mock data
//! - cleaned CSV exports
//! - another dashboard backend, fetched once per request

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use api::{router, AppState};
use dashboard_service::{build_source, SourceConfig};
use telemetry::init_tracing_from_env;

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    source: SourceConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8501
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            source: SourceConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing_from_env();

    info!("Starting BearCart dashboard v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    info!(
        source = %config.source.kind,
        raw_dir = %config.source.raw_dir.display(),
        upstream = %config.source.upstream_url,
        "Loaded config"
    );

    let source = build_source(&config.source)
        .await
        .context("Failed to build data source")?;

    // A failed check leaves the source unhealthy but still serving; remote
    // requests surface their own errors.
    match source.check().await {
        Ok(()) => info!(source = %source.kind(), "Data source: healthy"),
        Err(e) => warn!(source = %source.kind(), error = %e, "Data source: unhealthy"),
    }

    let app = router(AppState::new(source));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        .add_source(config::Config::try_from(&Config::default())?)
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("BEARCART")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Flat names for the settings most often changed from a shell.
    if let Ok(kind) = std::env::var("BEARCART_SOURCE_KIND") {
        config.source.kind = kind
            .parse()
            .with_context(|| format!("Invalid BEARCART_SOURCE_KIND: {}", kind))?;
    }
    if let Ok(dir) = std::env::var("BEARCART_SOURCE_RAW_DIR") {
        config.source.raw_dir = dir.into();
    }
    if let Ok(url) = std::env::var("BEARCART_SOURCE_UPSTREAM_URL") {
        config.source.upstream_url = url;
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
