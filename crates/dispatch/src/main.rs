//! CLI that runs a single endpoint action for one record identifier.

use std::io;

use clap::Parser;
use endpoint_relay_dispatch::{run_action, Collaborators, ReqwestTransport};
use endpoint_relay_domain::{
    config::{ConfigError, RelayConfig},
    error::RelayError,
    model::TransportError,
    services::{
        telemetry::{init_telemetry, TelemetryConfig, TelemetryError},
        StaticEnvironment, TracingProgress,
    },
    storage::StorageError,
};
use endpoint_relay_storage::connect_record_store;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(name = "endpoint-relay")]
#[command(version)]
#[command(about = "Resolve the endpoint for the current environment and post a record id to it")]
struct Cli {
    /// Record identifier to send; surrounding braces are stripped
    record_id: String,
    /// Configuration entry to read instead of `RELAY_CONFIG_NAME`
    #[arg(long)]
    config_name: Option<String>,
}

#[derive(Debug, Error)]
enum RelayCliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl RelayCliError {
    /// Only `Relay` comes from the action itself; everything else failed
    /// while wiring it up.
    fn phase(&self) -> &'static str {
        match self {
            RelayCliError::Relay(_) => "action failed",
            _ => "bootstrap failed",
        }
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("[relay] {}: {err}", err.phase());
        return Err(io::Error::other(err.to_string()));
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<(), RelayCliError> {
    let mut config = RelayConfig::load_from_env()?;
    if let Some(name) = cli.config_name {
        config = config.with_config_name(name);
    }
    let telemetry_config = TelemetryConfig::from_env("RELAY");
    init_telemetry(&telemetry_config)?;

    let store =
        connect_record_store(config.record_store_url(), config.record_store_token()).await?;
    let transport = ReqwestTransport::new()?;
    let environment = StaticEnvironment::new(config.current_environment());
    let progress = TracingProgress;

    let collaborators = Collaborators {
        store: store.as_ref(),
        transport: &transport,
        environment: &environment,
        progress: &progress,
    };
    let response = run_action(collaborators, config.config_name(), &cli.record_id).await?;
    println!("{}", response.body);

    Ok(())
}
