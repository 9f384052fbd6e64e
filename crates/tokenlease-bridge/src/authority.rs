//! Upstream authority capability
//!
//! The broker needs one thing from the upstream identity authority: given an
//! admin-authenticated session, mint a token for a subject. That is split in
//! two traits so a session's lifetime is visible in the type system:
//!
//! - [`AuthorityConnector::connect`] builds a single-use session bound to one
//!   address and authenticated with the admin credential
//! - [`AuthoritySession::get_auth_token`] performs the exchange
//!
//! Sessions release their resources on drop.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokenlease_core::AdminCredential;

use crate::error::Result;

/// Token returned by the authority
///
/// Opaque to the broker.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub token: String,
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("token", &tokenlease_core::REDACTED)
            .finish()
    }
}

/// Factory for admin-authenticated sessions
#[async_trait]
pub trait AuthorityConnector: Send + Sync {
    /// Open a session against `address`, authenticated as the broker
    ///
    /// # Arguments
    /// * `address` - Upstream authority address from backend config
    /// * `admin_credential` - Break-glass credential; must not outlive the session
    async fn connect(
        &self,
        address: &str,
        admin_credential: &AdminCredential,
    ) -> Result<Box<dyn AuthoritySession>>;

    /// Get a description of this connector (for logging)
    fn description(&self) -> &str {
        "upstream authority"
    }
}

/// A single-use, admin-authenticated connection to the authority
#[async_trait]
pub trait AuthoritySession: Send + Sync {
    /// Ask the authority to mint a token scoped to `subject`
    async fn get_auth_token(&self, subject: &str) -> Result<AuthToken>;
}
