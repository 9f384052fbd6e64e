//! Mock Authority
//!
//! In-process stand-in for the upstream authority, for tests and local
//! development.
//!
//! Subjects are handled as follows:
//! - "FAIL:message" - Rejects the subject with the given message
//! - anything else - Mints the configured token, or "mock-token-{subject}"
//!
//! Clones share counters, so a test can hand one clone to the executor and
//! inspect the other.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokenlease_core::AdminCredential;

use crate::authority::{AuthToken, AuthorityConnector, AuthoritySession};
use crate::error::{AuthorityError, Result};

#[derive(Debug, Clone)]
enum Behavior {
    Issue,
    Fail(String),
    Hang,
}

#[derive(Debug, Default)]
struct MockState {
    connects: AtomicUsize,
    exchanges: AtomicUsize,
    live_sessions: AtomicUsize,
    subjects: Mutex<Vec<String>>,
}

/// Deterministic authority with call accounting
#[derive(Debug, Clone)]
pub struct MockAuthority {
    behavior: Behavior,
    token: Option<String>,
    expected_admin: Option<String>,
    state: Arc<MockState>,
}

impl MockAuthority {
    /// Create an authority that mints a token for every subject
    pub fn new() -> Self {
        Self {
            behavior: Behavior::Issue,
            token: None,
            expected_admin: None,
            state: Arc::new(MockState::default()),
        }
    }

    /// Always return this token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Reject sessions whose admin credential differs from `expected`
    pub fn with_admin_credential(mut self, expected: impl Into<String>) -> Self {
        self.expected_admin = Some(expected.into());
        self
    }

    /// Fail every exchange with an upstream error carrying `message`
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.behavior = Behavior::Fail(message.into());
        self
    }

    /// Never answer an exchange
    pub fn hanging(mut self) -> Self {
        self.behavior = Behavior::Hang;
        self
    }

    /// Sessions opened so far
    pub fn connect_count(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    /// Exchange calls made so far
    pub fn exchange_count(&self) -> usize {
        self.state.exchanges.load(Ordering::SeqCst)
    }

    /// Sessions not yet dropped
    pub fn live_sessions(&self) -> usize {
        self.state.live_sessions.load(Ordering::SeqCst)
    }

    /// Subjects seen by exchange calls, in order
    pub fn subjects(&self) -> Vec<String> {
        self.state
            .subjects
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

impl Default for MockAuthority {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthorityConnector for MockAuthority {
    async fn connect(
        &self,
        _address: &str,
        admin_credential: &AdminCredential,
    ) -> Result<Box<dyn AuthoritySession>> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);

        if let Some(expected) = &self.expected_admin {
            if admin_credential.expose() != expected {
                return Err(AuthorityError::AdminRejected(
                    "mock authority does not recognise the admin credential".into(),
                ));
            }
        }

        self.state.live_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            behavior: self.behavior.clone(),
            token: self.token.clone(),
            state: self.state.clone(),
        }))
    }

    fn description(&self) -> &str {
        "mock authority"
    }
}

struct MockSession {
    behavior: Behavior,
    token: Option<String>,
    state: Arc<MockState>,
}

#[async_trait]
impl AuthoritySession for MockSession {
    async fn get_auth_token(&self, subject: &str) -> Result<AuthToken> {
        self.state.exchanges.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut subjects) = self.state.subjects.lock() {
            subjects.push(subject.to_string());
        }

        match &self.behavior {
            Behavior::Fail(message) => {
                return Err(AuthorityError::Upstream {
                    status: 503,
                    detail: message.clone(),
                })
            }
            Behavior::Hang => return std::future::pending().await,
            Behavior::Issue => {}
        }

        if let Some(message) = subject.strip_prefix("FAIL:") {
            return Err(AuthorityError::SubjectRejected {
                subject: subject.to_string(),
                detail: message.to_string(),
            });
        }

        let token = self
            .token
            .clone()
            .unwrap_or_else(|| format!("mock-token-{}", subject));

        Ok(AuthToken { token })
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.state.live_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}
