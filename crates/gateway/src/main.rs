// Authgate gateway server
// Decision: Only startup failures end the process; request failures are per-request responses

use anyhow::{Context, Result};
use authgate_core::shutdown_signal;
use authgate_core::telemetry::{init_telemetry, TelemetryConfig};
use authgate_gateway::{
    auth::{seed_users, CredentialStore},
    AuthState, GatewayConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    if let Ok(path) = dotenvy::dotenv() {
        eprintln!("Loaded environment from {}", path.display());
    }

    // Configure via environment variables:
    // - RUST_LOG: Log filter (default: "authgate_gateway=debug,tower_http=debug")
    // - GATEWAY_ADDR, GATEWAY_COOKIE_MAX_AGE: see GatewayConfig
    let mut telemetry_config = TelemetryConfig::from_env();
    if telemetry_config.service_name == "authgate" {
        telemetry_config.service_name = "authgate-gateway".to_string();
    }
    if telemetry_config.log_filter.is_none() {
        telemetry_config.log_filter =
            Some("authgate_gateway=debug,tower_http=debug".to_string());
    }
    telemetry_config.service_version = Some(env!("CARGO_PKG_VERSION").to_string());
    init_telemetry(telemetry_config)?;

    let config = GatewayConfig::from_env().context("Invalid gateway configuration")?;

    let store = CredentialStore::new(seed_users()).context("Invalid user list")?;
    tracing::info!(users = store.len(), "Credential store loaded");

    let state = AuthState::new(store, &config);
    let app = authgate_gateway::app(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!(
        addr = %config.listen_addr,
        cookie_max_age_secs = config.session_max_age.as_secs(),
        "HTTP server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}
