//! Admin Authentication Middleware
//!
//! HTTP Basic authentication for the `/admin` routes. Credentials are
//! checked through a `CredentialVerifier`; the default verifier compares
//! the password against the configured admin password and ignores the
//! username.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::state::AppState;
use crate::ServerError;

/// Decoded Basic credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Parse an `Authorization: Basic <base64>` header value
    pub fn from_basic_header(value: &str) -> Option<Self> {
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;

        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// Credential check for admin access
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, credentials: &Credentials) -> bool;
}

/// Single shared admin password
///
/// With no password configured nothing verifies.
#[derive(Clone, Default)]
pub struct SharedSecretVerifier {
    password: Option<String>,
}

impl SharedSecretVerifier {
    pub fn new(password: Option<String>) -> Self {
        Self {
            password: password.filter(|p| !p.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.password.is_some()
    }
}

impl CredentialVerifier for SharedSecretVerifier {
    fn verify(&self, credentials: &Credentials) -> bool {
        match &self.password {
            Some(expected) => {
                constant_time_compare(credentials.password.as_bytes(), expected.as_bytes())
            }
            None => false,
        }
    }
}

/// Basic-auth middleware for admin routes
///
/// Missing, malformed or rejected credentials all produce 401 with a
/// `WWW-Authenticate: Basic` challenge.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let realm = state.get_config().admin.realm.clone();

    let credentials = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(Credentials::from_basic_header);

    match credentials {
        Some(credentials) if state.verifier.verify(&credentials) => next.run(request).await,
        Some(_) => {
            tracing::warn!(
                path = %request.uri().path(),
                forwarded_for = ?request.headers().get("X-Forwarded-For"),
                "Rejected admin credentials"
            );
            ServerError::Unauthorized { realm }.into_response()
        }
        None => ServerError::Unauthorized { realm }.into_response(),
    }
}

/// Constant-time comparison to prevent timing attacks
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
