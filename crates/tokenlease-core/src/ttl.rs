//! TTL bounds policy
//!
//! The same sanitization that governs every other lease in the host. The
//! broker consumes it through [`TtlPolicy`]; [`BoundedTtlPolicy`] is the
//! implementation the server ships with.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{BrokerError, Result};
use crate::types::SanitizedTtl;

/// Smallest lease the default policy will grant
pub const DEFAULT_MIN_TTL: Duration = Duration::from_secs(1);

/// System-wide lease ceiling of the default policy (32 days)
pub const DEFAULT_MAX_LEASE_TTL: Duration = Duration::from_secs(768 * 60 * 60);

/// Capability that turns requested duration strings into a sanitized lease
pub trait TtlPolicy: Send + Sync {
    /// Parse and bound-check `requested` / `requested_max`
    ///
    /// Returns [`BrokerError::InvalidTtl`] on parse failure or when a bound
    /// is violated.
    fn sanitize(&self, requested: &str, requested_max: &str) -> Result<SanitizedTtl>;
}

/// Bounds leases to `[min_ttl, max_lease_ttl]`
///
/// A ttl or max_ttl above the ceiling is an error. A ttl above the requested
/// max_ttl is clamped down to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundedTtlPolicy {
    /// Minimum TTL
    #[serde(with = "humantime_serde")]
    pub min_ttl: Duration,

    /// Absolute ceiling for both ttl and max_ttl
    #[serde(with = "humantime_serde")]
    pub max_lease_ttl: Duration,
}

impl BoundedTtlPolicy {
    pub fn new(min_ttl: Duration, max_lease_ttl: Duration) -> Self {
        Self {
            min_ttl,
            max_lease_ttl,
        }
    }
}

impl Default for BoundedTtlPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_TTL, DEFAULT_MAX_LEASE_TTL)
    }
}

impl TtlPolicy for BoundedTtlPolicy {
    fn sanitize(&self, requested: &str, requested_max: &str) -> Result<SanitizedTtl> {
        let ttl = parse_duration("ttl", requested)?;
        let max_ttl = parse_duration("max_ttl", requested_max)?;

        // Zero max_ttl means "no tighter bound than the ceiling"
        let max_ttl = if max_ttl.is_zero() {
            self.max_lease_ttl
        } else {
            max_ttl
        };

        if ttl > self.max_lease_ttl {
            return Err(BrokerError::InvalidTtl(format!(
                "\"ttl\" value must be less than allowed max lease TTL value ({})",
                humantime::format_duration(self.max_lease_ttl)
            )));
        }
        if max_ttl > self.max_lease_ttl {
            return Err(BrokerError::InvalidTtl(format!(
                "\"max_ttl\" value must be less than allowed max lease TTL value ({})",
                humantime::format_duration(self.max_lease_ttl)
            )));
        }

        let ttl = ttl.min(max_ttl);
        if ttl < self.min_ttl {
            return Err(BrokerError::InvalidTtl(format!(
                "\"ttl\" value must be at least {}",
                humantime::format_duration(self.min_ttl)
            )));
        }

        SanitizedTtl::new(ttl, max_ttl)
    }
}

/// Parse a duration string such as `45s`, `2h` or `1h30m`
///
/// A bare integer is read as seconds.
pub fn parse_duration(field: &str, value: &str) -> Result<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BrokerError::InvalidTtl(format!("\"{}\" is empty", field)));
    }

    if value.bytes().all(|b| b.is_ascii_digit()) {
        return value
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| BrokerError::InvalidTtl(format!("\"{}\" is out of range: {}", field, e)));
    }

    humantime::parse_duration(value).map_err(|e| {
        BrokerError::InvalidTtl(format!("\"{}\" value {:?} is not a duration: {}", field, value, e))
    })
}
