//! Operation logging
//!
//! Every issuance call is reported to an [`OperationSink`] as one
//! [`OperationRecord`] carrying the operation name, request, response, error
//! and duration. Request and response are rendered through [`LogFields`],
//! which each type implements by hand with named fields only.
//! Credential-bearing fields always render as [`REDACTED`].

use serde_json::{json, Value};
use std::fmt::Display;
use std::time::Duration;
use tracing::{error, info};

use crate::response::AuthResponse;
use crate::types::{BackendConfig, IssuanceRequest, REDACTED};

/// Explicit, redacted rendering of a value for the operation log
pub trait LogFields {
    fn log_fields(&self) -> Value;
}

/// One completed (or failed) operation
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    /// Operation name, e.g. `login`
    pub operation: String,
    pub request: Value,
    /// Present on success
    pub response: Option<Value>,
    /// Present on failure
    pub error: Option<String>,
    pub duration: Duration,
}

impl OperationRecord {
    /// Record for an operation that succeeded
    pub fn completed(
        operation: impl Into<String>,
        request: &dyn LogFields,
        response: &dyn LogFields,
        duration: Duration,
    ) -> Self {
        Self {
            operation: operation.into(),
            request: request.log_fields(),
            response: Some(response.log_fields()),
            error: None,
            duration,
        }
    }

    /// Record for an operation that failed
    pub fn failed(
        operation: impl Into<String>,
        request: &dyn LogFields,
        error: &dyn Display,
        duration: Duration,
    ) -> Self {
        Self {
            operation: operation.into(),
            request: request.log_fields(),
            response: None,
            error: Some(error.to_string()),
            duration,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Destination for operation records
///
/// Sinks own formatting; callers only supply the fields.
pub trait OperationSink: Send + Sync {
    fn record(&self, record: OperationRecord);
}

/// Sink that emits each record as a `tracing` event
#[derive(Debug, Clone)]
pub struct TracingSink {
    service: String,
}

impl TracingSink {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }
}

impl OperationSink for TracingSink {
    fn record(&self, record: OperationRecord) {
        let duration_ms = record.duration.as_millis() as u64;
        let response = record.response.as_ref().unwrap_or(&Value::Null);

        match &record.error {
            Some(err) => error!(
                service = %self.service,
                method = %record.operation,
                request = %record.request,
                error = %err,
                duration_ms,
                "Operation failed"
            ),
            None => info!(
                service = %self.service,
                method = %record.operation,
                request = %record.request,
                response = %response,
                duration_ms,
                "Operation completed"
            ),
        }
    }
}

// =============================================================================
// LogFields implementations
// =============================================================================

impl LogFields for IssuanceRequest {
    fn log_fields(&self) -> Value {
        json!({
            "username": self.subject_name,
            "ttl": self.requested_ttl,
            "max_ttl": self.requested_max_ttl,
        })
    }
}

impl LogFields for BackendConfig {
    fn log_fields(&self) -> Value {
        json!({
            "pachd_address": self.upstream_address,
            "admin_token": REDACTED,
        })
    }
}

impl LogFields for AuthResponse {
    fn log_fields(&self) -> Value {
        let auth = &self.auth;
        json!({
            "auth": {
                "internal_data": {
                    "user_token": REDACTED,
                    "ttl": auth.internal_data.ttl,
                    "max_ttl": auth.internal_data.max_ttl,
                },
                "metadata": {
                    "user_token": REDACTED,
                    "pachd_address": auth.metadata.pachd_address,
                },
                "lease_options": {
                    "ttl": humantime::format_duration(auth.lease_options.ttl).to_string(),
                    "renewable": auth.lease_options.renewable,
                },
            }
        })
    }
}
