//! Fieldlog Server - HTTP surface for the field data logger

mod api;
mod sampler;
mod settings;

use api::AppState;
use fieldlog_core::store::StoreConfig;
use fieldlog_core::{EngineConfig, LogEngine, SystemClock};
use parking_lot::Mutex;
use sampler::SimulatedSensor;
use settings::Settings;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen address
    pub http_addr: SocketAddr,
    /// Data directory
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:8080".parse().unwrap(),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl ServerConfig {
    /// Defaults with `FIELDLOG_ADDR` / `FIELDLOG_DATA` overrides applied
    fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("FIELDLOG_ADDR") {
            config.http_addr = addr.parse()?;
        }
        if let Ok(dir) = std::env::var("FIELDLOG_DATA") {
            config.data_dir = PathBuf::from(dir);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .pretty()
        .init();

    let config = ServerConfig::from_env()?;

    info!("Starting fieldlog server...");
    info!("Data directory: {:?}", config.data_dir);
    info!("HTTP server: http://{}", config.http_addr);

    // Load persisted settings
    let settings_path = Settings::path_in(&config.data_dir);
    let loaded = Settings::load(&settings_path);
    info!("Sampling every {}s", loaded.interval_seconds);

    // Initialize the log engine
    let engine = LogEngine::new(EngineConfig {
        store: StoreConfig {
            dir: config.data_dir.clone(),
            ..Default::default()
        },
        ..Default::default()
    });
    let engine = Arc::new(Mutex::new(engine));

    // Start the sampling loop
    let interval_seconds = Arc::new(AtomicU64::new(loaded.interval_seconds));
    tokio::spawn(sampler::run(
        engine.clone(),
        SimulatedSensor::new(),
        SystemClock,
        interval_seconds.clone(),
    ));

    // Create router
    let state = Arc::new(AppState {
        engine,
        settings: Mutex::new(loaded),
        settings_path,
        interval_seconds,
    });
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!("fieldlog server listening on {}", config.http_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
