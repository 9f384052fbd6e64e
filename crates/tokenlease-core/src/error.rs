//! Error types for credential issuance

use thiserror::Error;

/// Result type alias using BrokerError
pub type Result<T> = std::result::Result<T, BrokerError>;

/// Errors that can end an issuance request
///
/// Every variant is terminal for the request that produced it and none is
/// fatal to the process. Messages never carry the admin credential.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// Caller supplied a malformed request (e.g. empty username)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Backend is missing its admin credential or upstream address
    #[error("Backend misconfigured: {0}")]
    MisconfiguredBackend(String),

    /// Requested ttl/max_ttl could not be parsed or violates policy bounds
    #[error("Invalid TTL: {0}")]
    InvalidTtl(String),

    /// Upstream authority was unreachable or rejected the exchange
    #[error("Token exchange failed: {0}")]
    ExchangeFailed(String),

    /// Backend configuration could not be read
    #[error("Backend configuration unavailable: {0}")]
    ConfigUnavailable(String),
}

impl BrokerError {
    /// Stable machine-readable code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            BrokerError::InvalidRequest(_) => "INVALID_REQUEST",
            BrokerError::MisconfiguredBackend(_) => "MISCONFIGURED_BACKEND",
            BrokerError::InvalidTtl(_) => "INVALID_TTL",
            BrokerError::ExchangeFailed(_) => "EXCHANGE_FAILED",
            BrokerError::ConfigUnavailable(_) => "CONFIG_UNAVAILABLE",
        }
    }

    /// Whether the error points at operator setup rather than the caller
    ///
    /// Operator faults are worth alerting on; caller faults are not.
    pub fn is_operator_fault(&self) -> bool {
        matches!(
            self,
            BrokerError::MisconfiguredBackend(_) | BrokerError::ConfigUnavailable(_)
        )
    }
}
