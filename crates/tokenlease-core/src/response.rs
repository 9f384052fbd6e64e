//! Response packaging
//!
//! Shapes an [`IssuedCredential`] into the auth object the host expects:
//! internal data the host keeps for renewal, display metadata, and lease
//! options.
//!
//! The upstream token is placed in both `internal_data` and `metadata`.
//! Metadata is visible to anyone who can read the lease, so this exposes the
//! raw token outside the internal section. The behavior is kept as-is for
//! compatibility with existing consumers.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::{IssuedCredential, RequestedLease};

/// Top-level login response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub auth: Auth,
}

/// Auth object handed to the host lease subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auth {
    /// Host-private data, not displayed to the caller
    pub internal_data: InternalData,
    /// Display/audit data
    pub metadata: AuthMetadata,
    /// Lease parameters
    pub lease_options: LeaseOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalData {
    pub user_token: String,
    /// Effective TTL string the lease was negotiated from
    pub ttl: String,
    /// Effective max TTL string the lease was negotiated from
    pub max_ttl: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthMetadata {
    pub user_token: String,
    pub pachd_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseOptions {
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
    pub renewable: bool,
}

/// Compose the auth response for a freshly issued credential
pub fn package(credential: &IssuedCredential, requested: &RequestedLease) -> AuthResponse {
    AuthResponse {
        auth: Auth {
            internal_data: InternalData {
                user_token: credential.token().to_string(),
                ttl: requested.ttl.clone(),
                max_ttl: requested.max_ttl.clone(),
            },
            metadata: AuthMetadata {
                user_token: credential.token().to_string(),
                pachd_address: credential.upstream_address().to_string(),
            },
            lease_options: LeaseOptions {
                ttl: credential.ttl(),
                renewable: credential.renewable(),
            },
        },
    }
}
