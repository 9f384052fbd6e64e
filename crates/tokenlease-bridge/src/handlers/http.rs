//! HTTP Authority
//!
//! Talks to the upstream authority over HTTP. Each session owns its own
//! `reqwest::Client`, built with the admin credential as a sensitive bearer
//! header, and is dropped after the single exchange. No timeout is set here:
//! the caller's request context bounds the call.
//!
//! Wire contract:
//!
//! ```text
//! POST {address}/v1/auth/token
//! Authorization: Bearer <admin credential>
//! {"subject": "<subject>"}
//!
//! 200 {"token": "<opaque>"}
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Serialize;
use tokenlease_core::AdminCredential;
use tracing::debug;

use crate::authority::{AuthToken, AuthorityConnector, AuthoritySession};
use crate::error::{AuthorityError, Result};

/// Path of the token-minting endpoint on the authority
pub const DEFAULT_TOKEN_PATH: &str = "/v1/auth/token";

/// Longest slice of an upstream error body kept in error messages
const MAX_ERROR_BODY: usize = 256;

/// Connector for an HTTP upstream authority
#[derive(Debug, Clone)]
pub struct HttpAuthority {
    token_path: String,
}

impl HttpAuthority {
    pub fn new() -> Self {
        Self {
            token_path: DEFAULT_TOKEN_PATH.to_string(),
        }
    }

    /// Override the token endpoint path
    pub fn with_token_path(mut self, path: impl Into<String>) -> Self {
        self.token_path = path.into();
        self
    }

    fn endpoint(&self, address: &str) -> Result<String> {
        let base = normalize_address(address)?;
        let path = self.token_path.trim_start_matches('/');
        Ok(format!("{}/{}", base, path))
    }
}

impl Default for HttpAuthority {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthorityConnector for HttpAuthority {
    async fn connect(
        &self,
        address: &str,
        admin_credential: &AdminCredential,
    ) -> Result<Box<dyn AuthoritySession>> {
        let endpoint = self.endpoint(address)?;

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", admin_credential.expose()))
            .map_err(|_| {
                AuthorityError::Client("admin credential is not a valid header value".into())
            })?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        debug!(endpoint = %endpoint, "Prepared authority session");

        Ok(Box::new(HttpSession { client, endpoint }))
    }

    fn description(&self) -> &str {
        "HTTP authority"
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    subject: &'a str,
}

struct HttpSession {
    client: reqwest::Client,
    endpoint: String,
}

#[async_trait]
impl AuthoritySession for HttpSession {
    async fn get_auth_token(&self, subject: &str) -> Result<AuthToken> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&TokenRequest { subject })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<AuthToken>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, subject, truncate(&body)))
    }
}

/// Map a non-success status to the matching error kind
fn status_error(status: StatusCode, subject: &str, detail: String) -> AuthorityError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AuthorityError::AdminRejected(
            format!("{}: {}", status, detail),
        ),
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
            AuthorityError::SubjectRejected {
                subject: subject.to_string(),
                detail: format!("{}: {}", status, detail),
            }
        }
        _ => AuthorityError::Upstream {
            status: status.as_u16(),
            detail,
        },
    }
}

/// Turn a configured address into a base URL
///
/// `host:port` gets an `http://` scheme; explicit schemes are kept.
pub fn normalize_address(address: &str) -> Result<String> {
    let address = address.trim().trim_end_matches('/');
    if address.is_empty() {
        return Err(AuthorityError::InvalidAddress("address is empty".into()));
    }

    if address.contains("://") {
        if address.starts_with("http://") || address.starts_with("https://") {
            Ok(address.to_string())
        } else {
            Err(AuthorityError::InvalidAddress(format!(
                "unsupported scheme in {}",
                address
            )))
        }
    } else {
        Ok(format!("http://{}", address))
    }
}

fn truncate(body: &str) -> String {
    let body = body.trim();
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_address() {
        assert_eq!(normalize_address("localhost:650").unwrap(), "http://localhost:650");
        assert_eq!(
            normalize_address("https://pachd.example.com/").unwrap(),
            "https://pachd.example.com"
        );
        assert!(normalize_address("").is_err());
        assert!(normalize_address("grpc://pachd:650").is_err());
    }

    #[test]
    fn test_endpoint() {
        let authority = HttpAuthority::new();
        assert_eq!(
            authority.endpoint("localhost:650").unwrap(),
            "http://localhost:650/v1/auth/token"
        );

        let custom = HttpAuthority::new().with_token_path("auth/mint");
        assert_eq!(
            custom.endpoint("http://pachd:8080/").unwrap(),
            "http://pachd:8080/auth/mint"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "alice", "bad token".into()),
            AuthorityError::AdminRejected(_)
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "alice", "no such user".into()),
            AuthorityError::SubjectRejected { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, "alice", "".into()),
            AuthorityError::Upstream { status: 503, .. }
        ));
    }

    #[test]
    fn test_truncate_long_body() {
        let long = "x".repeat(1000);
        let truncated = truncate(&long);
        assert_eq!(truncated.len(), MAX_ERROR_BODY + 3);
        assert_eq!(truncate("  short  "), "short");
    }

    #[tokio::test]
    async fn test_invalid_header_value_rejected() {
        let result = HttpAuthority::new()
            .connect("localhost:650", &AdminCredential::new("line\nbreak"))
            .await;

        match result {
            Err(AuthorityError::Client(msg)) => assert!(!msg.contains("line")),
            Err(other) => panic!("Expected Client error, got {:?}", other),
            Ok(_) => panic!("Expected Client error, got a session"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_authority() {
        let session = HttpAuthority::new()
            .connect("127.0.0.1:1", &AdminCredential::new("admin"))
            .await
            .unwrap();

        let result = session.get_auth_token("alice").await;
        assert!(matches!(result, Err(AuthorityError::Unreachable(_))));
    }
}
