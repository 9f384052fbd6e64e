//! Delegated exchange executor
//!
//! Turns (admin credential, subject) into a subject-scoped token with exactly
//! one call to the upstream authority. Minting is not idempotent upstream, so
//! a failed exchange is never retried here; the caller decides whether to
//! ask again.
//!
//! The session opened for an exchange lives only inside [`DelegatedExchange::exchange`]
//! and is dropped on every exit path. Dropping the returned future aborts an
//! in-flight exchange the same way.

use std::sync::Arc;
use tracing::{debug, info, warn};

use tokenlease_core::{AdminCredential, BrokerError, IssuedCredential, Result, SanitizedTtl};

use crate::authority::AuthorityConnector;
use crate::error::AuthorityError;

/// Executes one delegated exchange per call
#[derive(Clone)]
pub struct DelegatedExchange {
    connector: Arc<dyn AuthorityConnector>,
}

impl DelegatedExchange {
    /// Create an executor backed by the given connector
    pub fn new<C: AuthorityConnector + 'static>(connector: C) -> Self {
        Self {
            connector: Arc::new(connector),
        }
    }

    /// Create an executor from a shared connector
    pub fn from_shared(connector: Arc<dyn AuthorityConnector>) -> Self {
        Self { connector }
    }

    /// Description of the underlying connector
    pub fn description(&self) -> &str {
        self.connector.description()
    }

    /// Mint a token for `subject_name` and wrap it in lease parameters
    ///
    /// # Arguments
    /// * `upstream_address` - Validated, non-empty authority address
    /// * `admin_credential` - Validated, non-empty admin credential
    /// * `subject_name` - Validated, non-empty subject
    /// * `ttl` - Lease negotiated by the validator
    ///
    /// # Returns
    /// * `Ok(IssuedCredential)` - Token packaged verbatim
    /// * `Err(BrokerError::ExchangeFailed)` - Authority unreachable or refused
    pub async fn exchange(
        &self,
        upstream_address: &str,
        admin_credential: &AdminCredential,
        subject_name: &str,
        ttl: SanitizedTtl,
    ) -> Result<IssuedCredential> {
        if subject_name.is_empty() {
            return Err(BrokerError::InvalidRequest("username must not be empty".into()));
        }
        if upstream_address.is_empty() || admin_credential.is_empty() {
            return Err(BrokerError::MisconfiguredBackend(
                "exchange requires pachd_address and admin_token".into(),
            ));
        }

        debug!(
            authority = self.connector.description(),
            address = %upstream_address,
            subject = %subject_name,
            "Opening single-use authority session"
        );

        let session = self
            .connector
            .connect(upstream_address, admin_credential)
            .await
            .map_err(|e| exchange_failed(upstream_address, subject_name, e))?;

        let result = session.get_auth_token(subject_name).await;
        drop(session);

        let token = result.map_err(|e| exchange_failed(upstream_address, subject_name, e))?;

        if token.token.is_empty() {
            return Err(exchange_failed(
                upstream_address,
                subject_name,
                AuthorityError::InvalidResponse("authority returned an empty token".into()),
            ));
        }

        info!(
            address = %upstream_address,
            subject = %subject_name,
            ttl = ?ttl.ttl(),
            "Issued subject-scoped token"
        );

        Ok(IssuedCredential::new(
            subject_name,
            token.token,
            upstream_address,
            ttl,
        ))
    }
}

fn exchange_failed(address: &str, subject: &str, err: AuthorityError) -> BrokerError {
    warn!(
        address = %address,
        subject = %subject,
        error = %err,
        "Token exchange failed"
    );
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::MockAuthority;
    use std::time::Duration;

    fn ttl() -> SanitizedTtl {
        SanitizedTtl::new(Duration::from_secs(45), Duration::from_secs(7200)).unwrap()
    }

    fn admin() -> AdminCredential {
        AdminCredential::new("admin-token")
    }

    #[tokio::test]
    async fn test_successful_exchange() {
        let authority = MockAuthority::new().with_token("tok-123");
        let exchange = DelegatedExchange::new(authority.clone());

        let issued = exchange
            .exchange("localhost:650", &admin(), "alice", ttl())
            .await
            .unwrap();

        assert_eq!(issued.token(), "tok-123");
        assert_eq!(issued.subject_name(), "alice");
        assert_eq!(issued.upstream_address(), "localhost:650");
        assert_eq!(issued.ttl(), Duration::from_secs(45));
        assert!(issued.renewable());

        assert_eq!(authority.connect_count(), 1);
        assert_eq!(authority.exchange_count(), 1);
        assert_eq!(authority.live_sessions(), 0);
        assert_eq!(authority.subjects(), vec!["alice".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_is_not_retried() {
        let authority = MockAuthority::new().failing("connection reset by peer");
        let exchange = DelegatedExchange::new(authority.clone());

        let result = exchange
            .exchange("localhost:650", &admin(), "alice", ttl())
            .await;

        match result {
            Err(BrokerError::ExchangeFailed(msg)) => {
                assert!(msg.contains("connection reset by peer"));
            }
            other => panic!("Expected ExchangeFailed, got {:?}", other),
        }
        assert_eq!(authority.exchange_count(), 1);
        assert_eq!(authority.live_sessions(), 0);
    }

    #[tokio::test]
    async fn test_admin_rejected_on_connect() {
        let authority = MockAuthority::new().with_admin_credential("the-real-admin");
        let exchange = DelegatedExchange::new(authority.clone());

        let result = exchange
            .exchange("localhost:650", &admin(), "alice", ttl())
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, BrokerError::ExchangeFailed(_)));
        assert!(!err.to_string().contains("admin-token"));
        assert_eq!(authority.exchange_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_token_is_failure() {
        let authority = MockAuthority::new().with_token("");
        let exchange = DelegatedExchange::new(authority);

        let result = exchange
            .exchange("localhost:650", &admin(), "alice", ttl())
            .await;

        assert!(matches!(result, Err(BrokerError::ExchangeFailed(_))));
    }

    #[tokio::test]
    async fn test_unvalidated_inputs_never_reach_authority() {
        let authority = MockAuthority::new();
        let exchange = DelegatedExchange::new(authority.clone());

        let empty_subject = exchange.exchange("localhost:650", &admin(), "", ttl()).await;
        assert!(matches!(empty_subject, Err(BrokerError::InvalidRequest(_))));

        let empty_admin = exchange
            .exchange("localhost:650", &AdminCredential::new(""), "alice", ttl())
            .await;
        assert!(matches!(empty_admin, Err(BrokerError::MisconfiguredBackend(_))));

        assert_eq!(authority.connect_count(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_releases_session() {
        let authority = MockAuthority::new().hanging();
        let exchange = DelegatedExchange::new(authority.clone());

        let admin = admin();
        let result = tokio::time::timeout(
            Duration::from_millis(50),
            exchange.exchange("localhost:650", &admin, "alice", ttl()),
        )
        .await;

        assert!(result.is_err(), "hanging exchange should have been cancelled");
        assert_eq!(authority.exchange_count(), 1);
        assert_eq!(authority.live_sessions(), 0);
    }
}
