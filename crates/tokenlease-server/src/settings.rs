//! Server settings
//!
//! Read from `TOKENLEASE_*` environment variables:
//!
//! | Variable                    | Default      |
//! |-----------------------------|--------------|
//! | `TOKENLEASE_PORT`           | `8080`       |
//! | `TOKENLEASE_LOG_LEVEL`      | `info`       |
//! | `TOKENLEASE_SERVICE_NAME`   | `tokenlease` |
//! | `TOKENLEASE_MIN_TTL`        | `1s`         |
//! | `TOKENLEASE_MAX_LEASE_TTL`  | `768h`       |
//! | `TOKENLEASE_AUTHORITY`      | `http`       |
//! | `TOKENLEASE_TOKEN_PATH`     | `/v1/auth/token` |
//! | `TOKENLEASE_PACHD_ADDRESS`  | unset        |
//! | `TOKENLEASE_ADMIN_TOKEN`    | unset        |
//! | `TOKENLEASE_INSTANCE_ID`    | random, read by the binary |
//!
//! When both `TOKENLEASE_PACHD_ADDRESS` and `TOKENLEASE_ADMIN_TOKEN` are set,
//! the config store starts pre-loaded with them.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

use tokenlease_bridge::handlers::{HttpAuthority, MockAuthority, DEFAULT_TOKEN_PATH};
use tokenlease_bridge::DelegatedExchange;
use tokenlease_core::ttl::{DEFAULT_MAX_LEASE_TTL, DEFAULT_MIN_TTL};
use tokenlease_core::{BackendConfig, BoundedTtlPolicy, TracingSink};

use crate::api::handlers::AppState;
use crate::core::Broker;
use crate::storage::{ConfigStore, MemoryConfigStore};

/// Error for a malformed setting
#[derive(Debug, Error)]
#[error("{key}={value:?} is invalid: {reason}")]
pub struct SettingsError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Which upstream authority implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityMode {
    Http,
    Mock,
}

impl FromStr for AuthorityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(AuthorityMode::Http),
            "mock" => Ok(AuthorityMode::Mock),
            _ => Err(format!("unknown authority mode: {}", s)),
        }
    }
}

/// Process-level settings
#[derive(Debug)]
pub struct ServerSettings {
    pub port: u16,
    pub log_level: Level,
    /// Service name attached to operation log records
    pub service_name: String,
    pub ttl_policy: BoundedTtlPolicy,
    pub authority: AuthorityMode,
    pub token_path: String,
    /// Backend config to pre-load, if provided
    pub bootstrap: Option<BackendConfig>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8080,
            log_level: Level::INFO,
            service_name: "tokenlease".into(),
            ttl_policy: BoundedTtlPolicy::default(),
            authority: AuthorityMode::Http,
            token_path: DEFAULT_TOKEN_PATH.into(),
            bootstrap: None,
        }
    }
}

impl ServerSettings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = parse("TOKENLEASE_PORT", &lookup, defaults.port, |v| {
            v.parse::<u16>().map_err(|e| e.to_string())
        })?;
        let log_level = parse("TOKENLEASE_LOG_LEVEL", &lookup, defaults.log_level, |v| {
            v.parse::<Level>().map_err(|e| e.to_string())
        })?;
        let min_ttl = parse("TOKENLEASE_MIN_TTL", &lookup, DEFAULT_MIN_TTL, parse_duration)?;
        let max_lease_ttl = parse(
            "TOKENLEASE_MAX_LEASE_TTL",
            &lookup,
            DEFAULT_MAX_LEASE_TTL,
            parse_duration,
        )?;
        let authority = parse("TOKENLEASE_AUTHORITY", &lookup, defaults.authority, |v| {
            v.parse::<AuthorityMode>()
        })?;

        if min_ttl.is_zero() || min_ttl > max_lease_ttl {
            return Err(SettingsError {
                key: "TOKENLEASE_MIN_TTL",
                value: humantime::format_duration(min_ttl).to_string(),
                reason: "must be non-zero and no greater than TOKENLEASE_MAX_LEASE_TTL".into(),
            });
        }

        let service_name = lookup("TOKENLEASE_SERVICE_NAME").unwrap_or(defaults.service_name);
        let token_path = lookup("TOKENLEASE_TOKEN_PATH").unwrap_or(defaults.token_path);

        let bootstrap = match (
            lookup("TOKENLEASE_PACHD_ADDRESS"),
            lookup("TOKENLEASE_ADMIN_TOKEN"),
        ) {
            (Some(address), Some(token)) => Some(BackendConfig::new(address, token)),
            _ => None,
        };

        Ok(Self {
            port,
            log_level,
            service_name,
            ttl_policy: BoundedTtlPolicy::new(min_ttl, max_lease_ttl),
            authority,
            token_path,
            bootstrap,
        })
    }

    /// Build shared application state from these settings
    ///
    /// Consumes the bootstrap config, if any, into the returned store.
    pub fn build_state(self) -> Arc<AppState> {
        let store: Arc<dyn ConfigStore> = match self.bootstrap {
            Some(config) => Arc::new(MemoryConfigStore::with_config(config)),
            None => Arc::new(MemoryConfigStore::new()),
        };

        let exchange = match self.authority {
            AuthorityMode::Http => {
                DelegatedExchange::new(HttpAuthority::new().with_token_path(self.token_path))
            }
            AuthorityMode::Mock => DelegatedExchange::new(MockAuthority::new()),
        };

        let broker = Broker::new(
            store.clone(),
            Arc::new(self.ttl_policy),
            exchange,
            Arc::new(TracingSink::new(self.service_name)),
        );

        Arc::new(AppState { broker, store })
    }
}

fn parse<T, F, P>(key: &'static str, lookup: &F, default: T, parser: P) -> Result<T, SettingsError>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Result<T, String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => parser(&value).map_err(|reason| SettingsError {
            key,
            value,
            reason,
        }),
    }
}

fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime::parse_duration(value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = ServerSettings::from_lookup(lookup(&[])).unwrap();

        assert_eq!(settings.port, 8080);
        assert_eq!(settings.log_level, Level::INFO);
        assert_eq!(settings.service_name, "tokenlease");
        assert_eq!(settings.authority, AuthorityMode::Http);
        assert_eq!(settings.ttl_policy, BoundedTtlPolicy::default());
        assert!(settings.bootstrap.is_none());
    }

    #[test]
    fn test_overrides() {
        let settings = ServerSettings::from_lookup(lookup(&[
            ("TOKENLEASE_PORT", "9090"),
            ("TOKENLEASE_LOG_LEVEL", "debug"),
            ("TOKENLEASE_MAX_LEASE_TTL", "24h"),
            ("TOKENLEASE_AUTHORITY", "mock"),
            ("TOKENLEASE_PACHD_ADDRESS", "pachd:650"),
            ("TOKENLEASE_ADMIN_TOKEN", "admin"),
        ]))
        .unwrap();

        assert_eq!(settings.port, 9090);
        assert_eq!(settings.log_level, Level::DEBUG);
        assert_eq!(settings.ttl_policy.max_lease_ttl, Duration::from_secs(86400));
        assert_eq!(settings.authority, AuthorityMode::Mock);
        let bootstrap = settings.bootstrap.unwrap();
        assert_eq!(bootstrap.upstream_address, "pachd:650");
    }

    #[test]
    fn test_invalid_values() {
        let err = ServerSettings::from_lookup(lookup(&[("TOKENLEASE_PORT", "http")])).unwrap_err();
        assert_eq!(err.key, "TOKENLEASE_PORT");

        let err =
            ServerSettings::from_lookup(lookup(&[("TOKENLEASE_AUTHORITY", "grpc")])).unwrap_err();
        assert_eq!(err.key, "TOKENLEASE_AUTHORITY");

        let err = ServerSettings::from_lookup(lookup(&[
            ("TOKENLEASE_MIN_TTL", "2h"),
            ("TOKENLEASE_MAX_LEASE_TTL", "1h"),
        ]))
        .unwrap_err();
        assert_eq!(err.key, "TOKENLEASE_MIN_TTL");
    }

    #[test]
    fn test_admin_token_not_in_settings_debug() {
        let settings = ServerSettings::from_lookup(lookup(&[
            ("TOKENLEASE_PACHD_ADDRESS", "pachd:650"),
            ("TOKENLEASE_ADMIN_TOKEN", "bootstrap-secret"),
        ]))
        .unwrap();

        assert!(!format!("{:?}", settings).contains("bootstrap-secret"));
    }

    #[tokio::test]
    async fn test_build_state_bootstraps_store() {
        let settings = ServerSettings::from_lookup(lookup(&[
            ("TOKENLEASE_AUTHORITY", "mock"),
            ("TOKENLEASE_PACHD_ADDRESS", "pachd:650"),
            ("TOKENLEASE_ADMIN_TOKEN", "admin"),
        ]))
        .unwrap();

        let state = settings.build_state();
        let config = state.store.read_config().await.unwrap().unwrap();

        assert_eq!(config.upstream_address, "pachd:650");
        assert_eq!(state.broker.authority(), "mock authority");
    }
}
