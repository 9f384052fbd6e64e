//! Login Handler
//!
//! The broker's single issuance operation: validate the request, exchange the
//! admin credential for a subject-scoped token, return it as a lease.

use axum::{extract::State, Json};
use std::sync::Arc;

use tokenlease_core::{AuthResponse, IssuanceRequest};

use crate::api::error::ApiError;
use crate::core::Broker;
use crate::storage::ConfigStore;

/// Application state shared across handlers
pub struct AppState {
    /// Issuance pipeline
    pub broker: Broker,
    /// Backend configuration store (shared with the broker)
    pub store: Arc<dyn ConfigStore>,
}

/// Issue a lease-wrapped token for a subject
///
/// POST /v1/login
///
/// Body: `{"username": "...", "ttl": "45s", "max_ttl": "2h"}`; `ttl` and
/// `max_ttl` are optional.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IssuanceRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let response = state.broker.login(request).await?;
    Ok(Json(response))
}
