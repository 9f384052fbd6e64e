//! Exchange Bridge
//!
//! The Exchange Bridge performs the delegated exchange at the heart of the
//! broker: it authenticates to the upstream identity authority with the
//! admin credential and asks it to mint a token scoped to a subject.
//!
//! ## Architecture
//!
//! The authority is reached through the [`AuthorityConnector`] capability,
//! which opens single-use [`AuthoritySession`]s:
//!
//! - **HTTP**: Talks to a real authority over HTTP (`reqwest`)
//! - **Mock**: In-process authority for tests and local development
//!
//! [`DelegatedExchange`] drives exactly one session and one exchange per
//! call.
//!
//! ## Usage
//!
//! ```ignore
//! use tokenlease_bridge::{DelegatedExchange, handlers::HttpAuthority};
//!
//! let exchange = DelegatedExchange::new(HttpAuthority::new());
//! let issued = exchange
//!     .exchange(&config.upstream_address, &config.admin_credential, "alice", ttl)
//!     .await?;
//! println!("Lease ttl: {:?}", issued.ttl());
//! ```

pub mod authority;
pub mod error;
pub mod exchange;
pub mod handlers;

pub use authority::{AuthToken, AuthorityConnector, AuthoritySession};
pub use error::{AuthorityError, Result};
pub use exchange::DelegatedExchange;
