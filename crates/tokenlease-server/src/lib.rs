//! Tokenlease Server
//!
//! HTTP host for the credential-issuance broker. It exchanges a stored admin
//! credential for a short-lived token scoped to the requested subject and
//! returns it wrapped as a renewable lease.
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /ready` - Readiness check; ready once a complete backend config exists
//! - `POST /v1/login` - Issue a lease-wrapped token for a subject
//! - `POST /v1/config` - Write the backend config (`pachd_address`, `admin_token`)
//! - `GET /v1/config` - Read the backend config, admin credential omitted
//! - `DELETE /v1/config` - Clear the backend config

pub mod api;
pub mod core;
pub mod settings;
pub mod storage;

pub use api::create_router;
pub use api::handlers::AppState;
pub use core::{Broker, CONFIG_WRITE_OPERATION, LOGIN_OPERATION};
pub use settings::{AuthorityMode, ServerSettings, SettingsError};
pub use storage::{ConfigStore, MemoryConfigStore, StorageError};
