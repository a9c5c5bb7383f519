//! Wayfarer catalog server binary.
//!
//! # Startup Sequence
//!
//! 1. Resolve the config path (first argument, then `WAYFARER_CONFIG`,
//!    then `wayfarer.yaml`)
//! 2. Load configuration, falling back to defaults when the file is absent
//! 3. Initialize structured logging (tracing) in the configured format
//! 4. Build the application state
//! 5. Serve until `Ctrl-C`

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wayfarer_server::config::LoggingConfig;
use wayfarer_server::{AppState, DEFAULT_CONFIG_FILE, WayfarerConfig, start_server};

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the state cannot be
/// built, or the server fails to bind or serve.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("WAYFARER_CONFIG").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let config_exists = config_path.exists();
    let config = WayfarerConfig::load(&config_path)?;

    init_tracing(&config.logging);

    info!("wayfarer-server starting");
    if config_exists {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(
        host = config.server.host,
        port = config.server.port,
        data_dir = %config.storage.data_dir.display(),
        public_url = config.server.public_url.as_deref().unwrap_or("(request host)"),
        "Server configuration"
    );
    if config.auth.username.is_none() || config.auth.password.is_none() {
        warn!("Admin credentials not configured; write endpoints are open");
    }

    let state = Arc::new(AppState::from_config(&config)?);
    start_server(&config.server, state).await?;

    info!("wayfarer-server exiting");
    Ok(())
}

/// Initialize the global subscriber. `RUST_LOG` wins over the configured
/// level.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if logging.format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}
