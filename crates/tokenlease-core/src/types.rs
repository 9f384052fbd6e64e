//! Core types for credential issuance

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::error::{BrokerError, Result};

/// TTL applied when the caller leaves `ttl` empty
pub const DEFAULT_TTL: &str = "45s";

/// Max TTL applied when the caller leaves `max_ttl` empty
pub const DEFAULT_MAX_TTL: &str = "2h";

/// Placeholder rendered in place of any credential-bearing value
pub const REDACTED: &str = "[REDACTED]";

/// An inbound login request
///
/// Field names follow the wire format of the login operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IssuanceRequest {
    /// Identity the broker should mint a token for
    #[serde(rename = "username", default)]
    pub subject_name: String,

    /// Requested lease TTL (duration string, empty for default)
    #[serde(rename = "ttl", default)]
    pub requested_ttl: String,

    /// Requested lease max TTL (duration string, empty for default)
    #[serde(rename = "max_ttl", default)]
    pub requested_max_ttl: String,
}

impl IssuanceRequest {
    /// Create a request for a subject with default TTLs
    pub fn new(subject_name: impl Into<String>) -> Self {
        Self {
            subject_name: subject_name.into(),
            requested_ttl: String::new(),
            requested_max_ttl: String::new(),
        }
    }

    /// Set the requested TTL
    pub fn with_ttl(mut self, ttl: impl Into<String>) -> Self {
        self.requested_ttl = ttl.into();
        self
    }

    /// Set the requested max TTL
    pub fn with_max_ttl(mut self, max_ttl: impl Into<String>) -> Self {
        self.requested_max_ttl = max_ttl.into();
        self
    }
}

/// The privileged credential the broker authenticates upstream with
///
/// Never printed, never serialized. Callers must go through
/// [`AdminCredential::expose`] to read it, which keeps every use greppable.
pub struct AdminCredential(SecretString);

impl AdminCredential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// Borrow the raw credential for the duration of one exchange
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }
}

impl fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdminCredential({})", REDACTED)
    }
}

/// Backend configuration owned by the configuration subsystem
#[derive(Debug)]
pub struct BackendConfig {
    /// Address of the upstream identity authority (pachd)
    pub upstream_address: String,
    /// Break-glass credential used to authenticate the broker upstream
    pub admin_credential: AdminCredential,
}

impl BackendConfig {
    pub fn new(upstream_address: impl Into<String>, admin_credential: impl Into<String>) -> Self {
        Self {
            upstream_address: upstream_address.into(),
            admin_credential: AdminCredential::new(admin_credential),
        }
    }

    /// Check that both fields are present
    ///
    /// The admin credential is checked first so its absence is reported even
    /// when the address is also missing.
    pub fn ensure_complete(&self) -> Result<()> {
        if self.admin_credential.is_empty() {
            return Err(BrokerError::MisconfiguredBackend(
                "plugin is missing admin_token".into(),
            ));
        }
        if self.upstream_address.is_empty() {
            return Err(BrokerError::MisconfiguredBackend(
                "plugin is missing pachd_address".into(),
            ));
        }
        Ok(())
    }
}

/// Lease durations that passed the TTL policy
///
/// Invariant: `0 < ttl <= max_ttl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizedTtl {
    ttl: Duration,
    max_ttl: Duration,
}

impl SanitizedTtl {
    pub fn new(ttl: Duration, max_ttl: Duration) -> Result<Self> {
        if ttl.is_zero() {
            return Err(BrokerError::InvalidTtl("ttl must be greater than zero".into()));
        }
        if ttl > max_ttl {
            return Err(BrokerError::InvalidTtl(format!(
                "ttl ({}) must not exceed max_ttl ({})",
                humantime::format_duration(ttl),
                humantime::format_duration(max_ttl)
            )));
        }
        Ok(Self { ttl, max_ttl })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_ttl(&self) -> Duration {
        self.max_ttl
    }
}

/// A request that passed caller-level checks, with defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedLease {
    /// Non-empty subject name
    pub subject_name: String,
    /// Effective TTL string (requested or default)
    pub ttl: String,
    /// Effective max TTL string (requested or default)
    pub max_ttl: String,
}

/// Output of the validator: everything the executor needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedIssuance {
    pub requested: RequestedLease,
    pub ttl: SanitizedTtl,
}

/// A token minted by the upstream authority, wrapped in lease parameters
///
/// Created once per successful exchange and never mutated afterwards.
/// Ownership passes to the host lease subsystem.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedCredential {
    subject_name: String,
    token: String,
    upstream_address: String,
    ttl: SanitizedTtl,
    issued_at: DateTime<Utc>,
}

impl IssuedCredential {
    pub fn new(
        subject_name: impl Into<String>,
        token: impl Into<String>,
        upstream_address: impl Into<String>,
        ttl: SanitizedTtl,
    ) -> Self {
        Self {
            subject_name: subject_name.into(),
            token: token.into(),
            upstream_address: upstream_address.into(),
            ttl,
            issued_at: Utc::now(),
        }
    }

    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    /// The opaque upstream token, verbatim
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn upstream_address(&self) -> &str {
        &self.upstream_address
    }

    pub fn ttl(&self) -> Duration {
        self.ttl.ttl()
    }

    pub fn max_ttl(&self) -> Duration {
        self.ttl.max_ttl()
    }

    /// Always true at issuance; renewal outcome is the host's concern
    pub fn renewable(&self) -> bool {
        true
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }
}

impl fmt::Debug for IssuedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedCredential")
            .field("subject_name", &self.subject_name)
            .field("token", &REDACTED)
            .field("upstream_address", &self.upstream_address)
            .field("ttl", &self.ttl)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserializes_wire_names() {
        let request: IssuanceRequest =
            serde_json::from_str(r#"{"username":"alice","ttl":"1m"}"#).unwrap();

        assert_eq!(request.subject_name, "alice");
        assert_eq!(request.requested_ttl, "1m");
        assert_eq!(request.requested_max_ttl, "");
    }

    #[test]
    fn test_admin_credential_debug_is_redacted() {
        let config = BackendConfig::new("localhost:650", "super-secret-admin");
        let rendered = format!("{:?}", config);

        assert!(!rendered.contains("super-secret-admin"));
        assert!(rendered.contains(REDACTED));
        assert_eq!(config.admin_credential.expose(), "super-secret-admin");
    }

    #[test]
    fn test_backend_config_completeness() {
        assert!(BackendConfig::new("localhost:650", "admin").ensure_complete().is_ok());

        let missing_token = BackendConfig::new("localhost:650", "").ensure_complete();
        assert!(matches!(missing_token, Err(BrokerError::MisconfiguredBackend(msg)) if msg.contains("admin_token")));

        let missing_address = BackendConfig::new("", "admin").ensure_complete();
        assert!(matches!(missing_address, Err(BrokerError::MisconfiguredBackend(msg)) if msg.contains("pachd_address")));

        // Both missing: admin credential is reported
        let missing_both = BackendConfig::new("", "").ensure_complete();
        assert!(matches!(missing_both, Err(BrokerError::MisconfiguredBackend(msg)) if msg.contains("admin_token")));
    }

    #[test]
    fn test_sanitized_ttl_invariant() {
        assert!(SanitizedTtl::new(Duration::from_secs(45), Duration::from_secs(7200)).is_ok());
        assert!(SanitizedTtl::new(Duration::from_secs(60), Duration::from_secs(60)).is_ok());
        assert!(SanitizedTtl::new(Duration::ZERO, Duration::from_secs(60)).is_err());
        assert!(SanitizedTtl::new(Duration::from_secs(61), Duration::from_secs(60)).is_err());
    }

    #[test]
    fn test_issued_credential_debug_hides_token() {
        let ttl = SanitizedTtl::new(Duration::from_secs(45), Duration::from_secs(7200)).unwrap();
        let cred = IssuedCredential::new("alice", "tok-123", "localhost:650", ttl);

        assert!(!format!("{:?}", cred).contains("tok-123"));
        assert_eq!(cred.token(), "tok-123");
        assert!(cred.renewable());
    }
}
