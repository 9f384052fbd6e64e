//! Tokenlease Server Binary
//!
//! Runs the broker HTTP server.

use std::env;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use tokenlease_server::{create_router, ServerSettings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = ServerSettings::from_env()?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(settings.log_level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let instance_id = env::var("TOKENLEASE_INSTANCE_ID")
        .unwrap_or_else(|_| format!("tokenlease-{}", uuid::Uuid::new_v4()));

    info!(
        instance_id = %instance_id,
        service = %settings.service_name,
        authority = ?settings.authority,
        min_ttl = %humantime::format_duration(settings.ttl_policy.min_ttl),
        max_lease_ttl = %humantime::format_duration(settings.ttl_policy.max_lease_ttl),
        bootstrapped = settings.bootstrap.is_some(),
        port = settings.port,
        "Starting tokenlease server"
    );

    let addr = format!("0.0.0.0:{}", settings.port);
    let state = settings.build_state();

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(addr = %addr, "Tokenlease listening");

    axum::serve(listener, app).await?;

    Ok(())
}
