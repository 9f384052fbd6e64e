//! Request validation and TTL negotiation
//!
//! Runs before any network exchange. Checks happen in a fixed order so the
//! caller always sees the most actionable error first:
//!
//! 1. subject name present ([`BrokerError::InvalidRequest`])
//! 2. backend config complete ([`BrokerError::MisconfiguredBackend`])
//! 3. TTLs parse and fit the policy ([`BrokerError::InvalidTtl`])
//!
//! [`validate_request`] covers step 1 and needs nothing but the request, so
//! a host can run it before touching its config store. [`negotiate`] covers
//! steps 2 and 3. [`validate`] composes both.

use tracing::{debug, warn};

use crate::error::{BrokerError, Result};
use crate::ttl::TtlPolicy;
use crate::types::{
    BackendConfig, IssuanceRequest, RequestedLease, ValidatedIssuance, DEFAULT_MAX_TTL, DEFAULT_TTL,
};

/// Check the subject and apply TTL defaults
pub fn validate_request(request: &IssuanceRequest) -> Result<RequestedLease> {
    if request.subject_name.is_empty() {
        return Err(BrokerError::InvalidRequest("username must not be empty".into()));
    }

    Ok(RequestedLease {
        subject_name: request.subject_name.clone(),
        ttl: or_default(&request.requested_ttl, DEFAULT_TTL),
        max_ttl: or_default(&request.requested_max_ttl, DEFAULT_MAX_TTL),
    })
}

/// Check backend completeness, then sanitize the requested TTLs
///
/// `config` is `None` when the backend has never been configured.
pub fn negotiate(
    requested: RequestedLease,
    config: Option<&BackendConfig>,
    policy: &dyn TtlPolicy,
) -> Result<ValidatedIssuance> {
    let config = config.ok_or_else(|| {
        BrokerError::MisconfiguredBackend("plugin has not been configured".into())
    })?;

    if let Err(e) = config.ensure_complete() {
        warn!(error = %e, "Rejecting issuance: backend is misconfigured");
        return Err(e);
    }

    let ttl = policy.sanitize(&requested.ttl, &requested.max_ttl)?;

    debug!(
        subject = %requested.subject_name,
        ttl = ?ttl.ttl(),
        max_ttl = ?ttl.max_ttl(),
        "Negotiated lease TTL"
    );

    Ok(ValidatedIssuance { requested, ttl })
}

/// Full validation: [`validate_request`] followed by [`negotiate`]
pub fn validate(
    request: &IssuanceRequest,
    config: Option<&BackendConfig>,
    policy: &dyn TtlPolicy,
) -> Result<ValidatedIssuance> {
    let requested = validate_request(request)?;
    negotiate(requested, config, policy)
}

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}
