//! Server events listener.
//!
//! Connects to the configured admin endpoint, logs every server event it
//! receives and runs until Ctrl-C.

use std::process::ExitCode;
use std::sync::Arc;

use server_events::adapters::TungsteniteConnector;
use server_events::application::ServerEventsContext;
use server_events::config::AppConfig;
use server_events::domain::events::{event_names, DomainEvent};
use server_events::ports::{handler_fn, EventSubscriber};
use server_events::telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }
    if let Err(e) = telemetry::init_tracing(&config.telemetry) {
        eprintln!("Failed to initialise tracing: {e}");
        return ExitCode::FAILURE;
    }

    let connection = match config.connection.to_connection_config() {
        Ok(connection) => connection,
        Err(e) => {
            tracing::error!(error = %e, "Invalid connection settings");
            return ExitCode::FAILURE;
        }
    };

    let context = ServerEventsContext::new(Arc::new(TungsteniteConnector::new()));
    let bus = context.event_bus();
    for name in event_names::ALL {
        bus.on(name, handler_fn("log", log_event));
    }

    let channel = match context.server_event_channel(connection) {
        Ok(channel) => channel,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create server event channel");
            return ExitCode::FAILURE;
        }
    };
    channel.on_unknown_server_event(|event| {
        tracing::info!(raw = %event.raw, "Unknown server event");
    });
    channel.on_connection_lost(|| tracing::warn!("Server events connection lost"));
    channel.on_connection_restored(|| tracing::info!("Server events connection up"));

    tracing::info!(url = channel.config().url(), "Connecting to server events");
    channel.connect();

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }

    tracing::info!("Shutting down");
    context.shutdown();
    ExitCode::SUCCESS
}

fn log_event(event: &Arc<DomainEvent>) -> Result<(), server_events::domain::foundation::DomainError> {
    match serde_json::to_string(event.as_ref()) {
        Ok(json) => tracing::info!(event = event.name(), payload = %json, "Server event"),
        Err(e) => tracing::warn!(event = event.name(), error = %e, "Server event not serializable"),
    }
    Ok(())
}
