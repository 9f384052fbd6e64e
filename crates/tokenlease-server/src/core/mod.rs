//! Core logic for the broker server

mod issuance;

pub use issuance::{Broker, CONFIG_WRITE_OPERATION, LOGIN_OPERATION};
