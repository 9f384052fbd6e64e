//! Upstream authority implementations

pub mod http;
pub mod mock;

pub use http::{normalize_address, HttpAuthority, DEFAULT_TOKEN_PATH};
pub use mock::MockAuthority;
