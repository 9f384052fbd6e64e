//! Error types for the upstream exchange

use thiserror::Error;
use tokenlease_core::BrokerError;

/// Result type for authority operations
pub type Result<T> = std::result::Result<T, AuthorityError>;

/// Errors reported by an upstream authority or the connection to it
///
/// Messages carry enough upstream detail to diagnose a failure but never
/// include the admin credential.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorityError {
    /// Upstream address could not be turned into an endpoint
    #[error("Invalid upstream address: {0}")]
    InvalidAddress(String),

    /// Authority could not be reached
    #[error("Authority unreachable: {0}")]
    Unreachable(String),

    /// Authority refused the admin credential
    #[error("Admin credential rejected: {0}")]
    AdminRejected(String),

    /// Authority refused to mint a token for the subject
    #[error("Subject '{subject}' rejected: {detail}")]
    SubjectRejected { subject: String, detail: String },

    /// Authority answered with an unexpected status
    #[error("Authority returned {status}: {detail}")]
    Upstream { status: u16, detail: String },

    /// Authority answered with a body we could not use
    #[error("Invalid authority response: {0}")]
    InvalidResponse(String),

    /// Local client could not be set up
    #[error("Client error: {0}")]
    Client(String),
}

impl From<reqwest::Error> for AuthorityError {
    fn from(err: reqwest::Error) -> Self {
        let is_builder = err.is_builder();
        let is_decode = err.is_decode();
        // The caller already knows the address
        let detail = err.without_url().to_string();

        if is_builder {
            AuthorityError::Client(detail)
        } else if is_decode {
            AuthorityError::InvalidResponse(detail)
        } else {
            AuthorityError::Unreachable(detail)
        }
    }
}

impl From<AuthorityError> for BrokerError {
    fn from(err: AuthorityError) -> Self {
        BrokerError::ExchangeFailed(err.to_string())
    }
}
