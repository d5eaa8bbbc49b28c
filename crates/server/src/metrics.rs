//! Prometheus Metrics
//!
//! Installs the global recorder and serves the text exposition.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::state::AppState;

/// Install the Prometheus recorder
///
/// Returns `None` if a recorder is already installed for this process.
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            describe_metrics();
            Some(handle)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install Prometheus recorder");
            None
        }
    }
}

fn describe_metrics() {
    metrics::describe_counter!("realty_agent_chat_turns_total", "Chat messages handled");
    metrics::describe_counter!(
        "realty_agent_conversations_completed_total",
        "Conversations that reached the lead form"
    );
    metrics::describe_counter!("realty_agent_leads_captured_total", "Leads stored");
    metrics::describe_counter!(
        "realty_agent_notifications_sent_total",
        "Lead notifications delivered to the relay"
    );
    metrics::describe_counter!(
        "realty_agent_notifications_failed_total",
        "Lead notifications that failed or were dropped"
    );
    metrics::describe_counter!(
        "realty_agent_session_store_wipes_total",
        "Times the session cap cleared every session"
    );
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}
