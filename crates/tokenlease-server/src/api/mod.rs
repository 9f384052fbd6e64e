//! API module for the broker server

pub mod error;
pub mod handlers;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use error::ApiError;
use handlers::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Readiness check response
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadyResponse {
    /// True once a complete backend config is present
    pub ready: bool,
    pub configured: bool,
    pub authority: String,
}

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Readiness check endpoint
///
/// GET /ready
///
/// A config store that cannot be read answers 503 rather than "not configured".
pub async fn ready(State(state): State<Arc<AppState>>) -> Result<Json<ReadyResponse>, ApiError> {
    let config = state.store.read_config().await?;
    let configured = config.is_some();
    let complete = config
        .map(|c| c.ensure_complete().is_ok())
        .unwrap_or(false);

    Ok(Json(ReadyResponse {
        ready: complete,
        configured,
        authority: state.broker.authority().to_string(),
    }))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        // Issuance
        .route("/v1/login", post(handlers::login))
        // Backend configuration
        .route(
            "/v1/config",
            get(handlers::read_config)
                .post(handlers::write_config)
                .delete(handlers::clear_config),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Broker;
    use crate::storage::{ConfigStore, MemoryConfigStore, StorageError};
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use tokenlease_bridge::handlers::MockAuthority;
    use tokenlease_bridge::DelegatedExchange;
    use tokenlease_core::{BackendConfig, BoundedTtlPolicy, TracingSink};

    #[derive(Debug)]
    struct UnreadableStore;

    #[async_trait]
    impl ConfigStore for UnreadableStore {
        async fn read_config(&self) -> Result<Option<Arc<BackendConfig>>, StorageError> {
            Err(StorageError::Unavailable("config lock poisoned".into()))
        }

        async fn write_config(&self, _config: BackendConfig) -> Result<(), StorageError> {
            Ok(())
        }

        async fn clear_config(&self) -> Result<bool, StorageError> {
            Ok(false)
        }
    }

    fn state(store: Arc<dyn ConfigStore>) -> Arc<AppState> {
        let broker = Broker::new(
            store.clone(),
            Arc::new(BoundedTtlPolicy::default()),
            DelegatedExchange::new(MockAuthority::new()),
            Arc::new(TracingSink::new("tokenlease-test")),
        );
        Arc::new(AppState { broker, store })
    }

    #[tokio::test]
    async fn test_ready_reports_configuration() {
        let Json(empty) = ready(State(state(Arc::new(MemoryConfigStore::new()))))
            .await
            .unwrap();
        assert!(!empty.configured);
        assert!(!empty.ready);

        let store = MemoryConfigStore::with_config(BackendConfig::new("pachd:650", "admin"));
        let Json(configured) = ready(State(state(Arc::new(store)))).await.unwrap();
        assert!(configured.configured);
        assert!(configured.ready);
        assert_eq!(configured.authority, "mock authority");
    }

    #[tokio::test]
    async fn test_ready_store_outage_is_unavailable() {
        let err = ready(State(state(Arc::new(UnreadableStore))))
            .await
            .unwrap_err();

        assert_eq!(err.status_and_code().0, StatusCode::SERVICE_UNAVAILABLE);
    }
}
