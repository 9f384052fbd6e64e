//! Backend Config Handlers
//!
//! Operator endpoints for the single backend configuration. The admin
//! credential can be written but is never returned.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use tokenlease_core::BackendConfig;

use super::login::AppState;
use crate::api::error::ApiError;

/// Request to write the backend configuration
///
/// Deliberately not `Debug`: it carries the admin credential in clear.
#[derive(Deserialize)]
pub struct WriteConfigRequest {
    /// Address of the upstream authority
    #[serde(default)]
    pub pachd_address: String,

    /// Admin credential used for delegated exchanges
    #[serde(default)]
    pub admin_token: String,
}

/// Public view of the backend configuration
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigView {
    pub pachd_address: String,
    pub admin_token_set: bool,
}

impl From<&BackendConfig> for ConfigView {
    fn from(config: &BackendConfig) -> Self {
        Self {
            pachd_address: config.upstream_address.clone(),
            admin_token_set: !config.admin_credential.is_empty(),
        }
    }
}

/// Response from clearing the configuration
#[derive(Debug, Serialize, Deserialize)]
pub struct ClearConfigResponse {
    pub cleared: bool,
}

/// Write the backend configuration
///
/// POST /v1/config
pub async fn write_config(
    State(state): State<Arc<AppState>>,
    Json(request): Json<WriteConfigRequest>,
) -> Result<Json<ConfigView>, ApiError> {
    if request.admin_token.is_empty() {
        return Err(ApiError::BadRequest("admin_token must not be empty".into()));
    }
    if request.pachd_address.is_empty() {
        return Err(ApiError::BadRequest("pachd_address must not be empty".into()));
    }

    let config = BackendConfig::new(request.pachd_address, request.admin_token);
    let view = ConfigView::from(&config);

    state.broker.write_config(config).await?;

    Ok(Json(view))
}

/// Read the backend configuration, without the admin credential
///
/// GET /v1/config
pub async fn read_config(State(state): State<Arc<AppState>>) -> Result<Json<ConfigView>, ApiError> {
    let config = state
        .store
        .read_config()
        .await?
        .ok_or_else(|| ApiError::NotFound("backend config".into()))?;

    Ok(Json(ConfigView::from(config.as_ref())))
}

/// Clear the backend configuration
///
/// DELETE /v1/config
pub async fn clear_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClearConfigResponse>, ApiError> {
    let cleared = state.store.clear_config().await?;
    Ok(Json(ClearConfigResponse { cleared }))
}
