//! Realty Lead Agent Server
//!
//! Provides the chat, lead capture and admin HTTP endpoints.

pub mod auth;
pub mod http;
pub mod metrics;
pub mod state;
pub mod views;

pub use auth::{admin_auth_middleware, CredentialVerifier, Credentials, SharedSecretVerifier};
pub use http::create_router;
pub use metrics::init_metrics;
pub use state::AppState;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use realty_agent_agent::AgentError;
use realty_agent_persistence::PersistenceError;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    InvalidRequest(String),

    /// Admin credentials missing or wrong; carries the challenge realm
    #[error("Unauthorized")]
    Unauthorized { realm: String },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ServerError::Persistence(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        err.status_code()
    }
}

impl From<AgentError> for ServerError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::InvalidInput(msg) => ServerError::InvalidRequest(msg),
            AgentError::SessionStore(msg) => ServerError::Internal(msg),
        }
    }
}

impl From<PersistenceError> for ServerError {
    fn from(err: PersistenceError) -> Self {
        ServerError::Persistence(err.to_string())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ServerError::InvalidRequest(msg) => {
                (status, Json(serde_json::json!({ "error": msg }))).into_response()
            }
            ServerError::Unauthorized { realm } => {
                let challenge = HeaderValue::from_str(&format!("Basic realm=\"{}\"", realm))
                    .unwrap_or_else(|_| HeaderValue::from_static("Basic realm=\"admin\""));
                (
                    status,
                    [(header::WWW_AUTHENTICATE, challenge)],
                    "Authentication required",
                )
                    .into_response()
            }
            // Details stay in the log
            ServerError::Persistence(detail) | ServerError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                (
                    status,
                    Json(serde_json::json!({ "error": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            StatusCode::from(ServerError::InvalidRequest("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StatusCode::from(ServerError::Unauthorized {
                realm: "admin".into()
            }),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            StatusCode::from(ServerError::Persistence("disk full".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unauthorized_sets_challenge() {
        let response = ServerError::Unauthorized {
            realm: "admin".into(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"admin\""
        );
    }

    #[test]
    fn test_agent_error_maps_to_bad_request() {
        let err: ServerError = AgentError::InvalidInput("message is required".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
