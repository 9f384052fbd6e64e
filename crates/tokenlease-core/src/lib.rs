//! # tokenlease core
//!
//! Types and pure logic for the tokenlease credential-issuance broker.
//!
//! The broker takes a login request for a subject, checks it, negotiates the
//! lease TTL, has the upstream authority mint a subject-scoped token (see
//! `tokenlease-bridge`), and packages that token into a renewable lease.
//!
//! This crate holds everything that does not touch the network:
//!
//! - [`validation`]: request checks and TTL negotiation
//! - [`ttl`]: the TTL bounds policy
//! - [`response`]: packaging of issued credentials
//! - [`oplog`]: redacted operation records
//!
//! ## Issuance state machine
//!
//! ```text
//! Received -> Validating -> Rejected(InvalidRequest | MisconfiguredBackend | InvalidTtl)
//!                        -> Exchanging -> Rejected(ExchangeFailed)
//!                                      -> Issued
//! ```
//!
//! Every rejection is terminal. Nothing is retried.

pub mod error;
pub mod oplog;
pub mod response;
pub mod ttl;
pub mod types;
pub mod validation;

pub use error::{BrokerError, Result};
pub use oplog::{LogFields, OperationRecord, OperationSink, TracingSink};
pub use response::{package, AuthResponse};
pub use ttl::{BoundedTtlPolicy, TtlPolicy};
pub use types::{
    AdminCredential, BackendConfig, IssuanceRequest, IssuedCredential, RequestedLease,
    SanitizedTtl, ValidatedIssuance, DEFAULT_MAX_TTL, DEFAULT_TTL, REDACTED,
};
pub use validation::{negotiate, validate, validate_request};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
