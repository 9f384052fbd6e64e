//! Issuance orchestration
//!
//! Composes the pieces of a login in order:
//!
//! 1. `validate_request` - subject present, TTL defaults applied
//! 2. config read - one snapshot per call, never cached
//! 3. `negotiate` - backend complete, TTLs within policy
//! 4. `DelegatedExchange::exchange` - one upstream call
//! 5. `package` - lease-bearing auth response
//!
//! Each call is reported to the operation sink once, with the request and
//! response rendered through their redacted log fields.

use std::sync::Arc;
use std::time::Instant;

use tokenlease_bridge::DelegatedExchange;
use tokenlease_core::{
    negotiate, package, validate_request, AuthResponse, BackendConfig, BrokerError,
    IssuanceRequest, LogFields, OperationRecord, OperationSink, Result, TtlPolicy,
};

use crate::storage::{ConfigStore, StorageError};

/// Operation name reported to the sink
pub const LOGIN_OPERATION: &str = "login";

/// Operation name reported for backend config writes
pub const CONFIG_WRITE_OPERATION: &str = "config_write";

/// Stateless issuance pipeline
///
/// Holds only shared, read-only collaborators, so one `Broker` serves any
/// number of concurrent logins.
pub struct Broker {
    store: Arc<dyn ConfigStore>,
    policy: Arc<dyn TtlPolicy>,
    exchange: DelegatedExchange,
    sink: Arc<dyn OperationSink>,
}

impl Broker {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        policy: Arc<dyn TtlPolicy>,
        exchange: DelegatedExchange,
        sink: Arc<dyn OperationSink>,
    ) -> Self {
        Self {
            store,
            policy,
            exchange,
            sink,
        }
    }

    /// Description of the configured upstream authority
    pub fn authority(&self) -> &str {
        self.exchange.description()
    }

    /// Issue a lease-wrapped token for the requested subject
    pub async fn login(&self, request: IssuanceRequest) -> Result<AuthResponse> {
        let started = Instant::now();
        let result = self.issue(&request).await;
        let elapsed = started.elapsed();

        let record = match &result {
            Ok(response) => OperationRecord::completed(LOGIN_OPERATION, &request, response, elapsed),
            Err(err) => OperationRecord::failed(LOGIN_OPERATION, &request, err, elapsed),
        };
        self.sink.record(record);

        result
    }

    /// Replace the backend config and report the write to the sink
    ///
    /// The record carries the config's log fields, so the admin credential
    /// shows up only as a placeholder.
    pub async fn write_config(&self, config: BackendConfig) -> std::result::Result<(), StorageError> {
        let started = Instant::now();
        let fields = config.log_fields();
        let result = self.store.write_config(config).await;

        let (response, error) = match &result {
            Ok(()) => (Some(fields.clone()), None),
            Err(err) => (None, Some(err.to_string())),
        };
        self.sink.record(OperationRecord {
            operation: CONFIG_WRITE_OPERATION.into(),
            request: fields,
            response,
            error,
            duration: started.elapsed(),
        });

        result
    }

    async fn issue(&self, request: &IssuanceRequest) -> Result<AuthResponse> {
        let requested = validate_request(request)?;

        let config = self
            .store
            .read_config()
            .await
            .map_err(|e| BrokerError::ConfigUnavailable(e.to_string()))?
            .ok_or_else(|| {
                BrokerError::MisconfiguredBackend("plugin has not been configured".into())
            })?;

        let validated = negotiate(requested, Some(config.as_ref()), self.policy.as_ref())?;

        let issued = self
            .exchange
            .exchange(
                &config.upstream_address,
                &config.admin_credential,
                &validated.requested.subject_name,
                validated.ttl,
            )
            .await?;

        Ok(package(&issued, &validated.requested))
    }
}
