use std::sync::Arc;

#[cfg(unix)]
use std::{fs, path::Path};

use actix_web::{middleware::Logger, web, App, HttpServer};
use endpoint_relay_dispatch::ReqwestTransport;
use endpoint_relay_domain::config::{ApiConfig, ConfigError};
use endpoint_relay_domain::model::TransportError;
use endpoint_relay_domain::services::{
    telemetry::{init_telemetry, TelemetryConfig, TelemetryError},
    StaticEnvironment, TracingProgress,
};
use endpoint_relay_domain::storage::StorageError;
use endpoint_relay_storage::connect_record_store;
use thiserror::Error;
use tracing::info;

use crate::{
    handlers::{dispatch_handler, metrics_handler},
    state::AppState,
};

/// Service entry point: wires the collaborators from the environment and
/// serves until the server stops.
pub async fn run() -> Result<(), BootstrapError> {
    // 1. Load configuration (`.env` is hydrated on first access).
    let config = ApiConfig::load_from_env()?;

    // 2. Telemetry, configured from `API_*` variables.
    let telemetry_config = TelemetryConfig::from_env("API");
    let telemetry = init_telemetry(&telemetry_config)?;

    // 3. Record store. The URL scheme picks the adapter: http(s) talks to
    //    the Web API, anything else is a database URL.
    let relay = config.relay();
    let store = connect_record_store(relay.record_store_url(), relay.record_store_token()).await?;

    // 4. Outbound transport and the environment this process runs in.
    let transport = Arc::new(ReqwestTransport::new()?);
    let environment = Arc::new(StaticEnvironment::new(relay.current_environment()));

    // 5. Shared state. Every handler invocation borrows its collaborators
    //    from here; nothing else is global.
    let state = AppState::new(
        store,
        transport,
        environment,
        Arc::new(TracingProgress),
        relay.config_name(),
        telemetry,
    );
    info!(
        config_name = relay.config_name(),
        environment = relay.current_environment(),
        "relay api starting"
    );

    // 6. HTTP server. The closure runs once per worker thread.
    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .route("/api/v1/actions/dispatch", web::post().to(dispatch_handler))
            .route("/metrics", web::get().to(metrics_handler))
    });

    // 7. Bind a unix socket when configured, TCP otherwise.
    #[cfg(unix)]
    {
        if let Some(socket) = config.api_unix_socket() {
            cleanup_socket(socket)?;
            server = server.bind_uds(socket)?;
        } else {
            server = server.bind(config.api_bind_address())?;
        }
    }

    // Unix sockets are not available here.
    #[cfg(not(unix))]
    {
        if let Some(socket) = config.api_unix_socket() {
            return Err(BootstrapError::Io(std::io::Error::other(format!(
                "unix socket '{socket}' requested but this platform does not support it"
            ))));
        }
        server = server.bind(config.api_bind_address())?;
    }

    // 8. Serve until shutdown.
    server.run().await?;

    Ok(())
}

/// Anything that stops the service before or while it serves.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// bind_uds fails if a stale socket file from an unclean exit is still there.
#[cfg(unix)]
fn cleanup_socket(path: &str) -> std::io::Result<()> {
    let socket_path = Path::new(path);
    if socket_path.exists() {
        fs::remove_file(socket_path)?;
    }
    Ok(())
}
