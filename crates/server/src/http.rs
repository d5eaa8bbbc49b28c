//! HTTP Endpoints
//!
//! Chat, lead capture and admin API.

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::{HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use realty_agent_core::{Lead, NewLead};

use crate::auth::admin_auth_middleware;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::views::{render_dashboard, CHAT_UI_HTML};
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let config = state.get_config();
    let cors_layer = build_cors_layer(&config.server.cors_origins, config.server.cors_enabled);
    let timeout = Duration::from_secs(config.server.timeout_seconds);
    let expose_leads = config.server.expose_leads_endpoint;

    let admin = Router::new()
        .route("/admin", get(admin_dashboard))
        .route("/admin/data", get(admin_data))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    let mut router = Router::new()
        .route("/", get(index))
        .route("/chat", post(chat))
        .route("/lead", post(capture_lead))
        // Health check
        .route("/health", get(health_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        .merge(admin);

    // Unauthenticated lead listing, off unless configured
    if expose_leads {
        router = router.route("/leads", get(list_leads));
    }

    router
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!("No usable CORS origins configured, defaulting to localhost:3000");
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static("http://localhost:3000"))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// GET /
async fn index(State(state): State<AppState>) -> Response {
    if state.get_config().server.chat_ui {
        return Html(CHAT_UI_HTML).into_response();
    }

    Json(serde_json::json!({
        "status": "running",
        "message": "Chatbot API is live 🚀",
        "endpoint": "/chat (POST)",
    }))
    .into_response()
}

/// Chat request
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub session_id: Option<String>,
}

impl ChatRequest {
    /// Read a chat payload field by field
    ///
    /// `message` counts only when it is a string. `session_id` is an opaque
    /// key, so any scalar is taken in its text form.
    pub fn from_json(payload: &Value) -> Self {
        let session_id = match payload.get("session_id") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            Some(Value::Bool(id)) => Some(id.to_string()),
            _ => None,
        };

        Self {
            message: payload
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            session_id,
        }
    }
}

/// Chat response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    /// Present (and true) only once every slot is filled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_lead_form: Option<bool>,
}

/// POST /chat
async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatResponse>, ServerError> {
    // An unreadable body is treated as a missing message
    let request = match payload {
        Ok(Json(payload)) => ChatRequest::from_json(&payload),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable chat payload");
            ChatRequest::default()
        }
    };

    let reply = state
        .agent
        .handle_message(request.session_id.as_deref(), request.message.as_deref())
        .await?;

    Ok(Json(ChatResponse {
        reply: reply.reply,
        show_lead_form: reply.show_lead_form.then_some(true),
    }))
}

/// POST /lead
async fn capture_lead(
    State(state): State<AppState>,
    payload: Result<Json<NewLead>, JsonRejection>,
) -> Result<Json<Value>, ServerError> {
    let Json(lead) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Unreadable lead payload");
        ServerError::InvalidRequest("invalid lead payload".to_string())
    })?;

    let stored = state.leads.insert(lead).await?;
    metrics::counter!("realty_agent_leads_captured_total").increment(1);
    tracing::info!(lead_id = stored.id, "Lead captured");

    // Delivery outcome never affects the response
    state.notifications.dispatch(stored);

    Ok(Json(serde_json::json!({ "status": "lead captured" })))
}

/// GET /leads
async fn list_leads(State(state): State<AppState>) -> Result<Json<Vec<Lead>>, ServerError> {
    Ok(Json(state.leads.list().await?))
}

/// GET /admin
async fn admin_dashboard(State(state): State<AppState>) -> Result<Html<String>, ServerError> {
    let leads = state.leads.list().await?;
    let sessions = state.sessions().list().await?;

    let html = render_dashboard(&leads, &sessions)
        .map_err(|e| ServerError::Internal(format!("Failed to render dashboard: {}", e)))?;
    Ok(Html(html))
}

/// GET /admin/data
async fn admin_data(State(state): State<AppState>) -> Result<Json<Value>, ServerError> {
    let leads = state.leads.list().await?;
    let sessions = state.sessions().list().await?;

    Ok(Json(serde_json::json!({
        "leads": leads,
        "sessions": sessions,
    })))
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let mut checks = serde_json::Map::new();
    let mut all_healthy = true;

    match state.sessions().len().await {
        Ok(count) => {
            checks.insert(
                "sessions".to_string(),
                serde_json::json!({ "status": "ok", "count": count }),
            );
        }
        Err(e) => {
            all_healthy = false;
            tracing::warn!(error = %e, "Session store health check failed");
            checks.insert("sessions".to_string(), serde_json::json!({ "status": "error" }));
        }
    }

    match state.leads.count().await {
        Ok(count) => {
            checks.insert(
                "leads".to_string(),
                serde_json::json!({ "status": "ok", "count": count }),
            );
        }
        Err(e) => {
            all_healthy = false;
            tracing::warn!(error = %e, "Lead store health check failed");
            checks.insert("leads".to_string(), serde_json::json!({ "status": "error" }));
        }
    }

    let status = if all_healthy { "healthy" } else { "degraded" };
    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": status,
            "version": env!("CARGO_PKG_VERSION"),
            "checks": checks
        })),
    )
}
