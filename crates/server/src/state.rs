//! Application State
//!
//! Shared state across all handlers.

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use realty_agent_agent::{ChatAgent, InMemorySessionStore, SessionStore};
use realty_agent_config::Settings;
use realty_agent_persistence::{
    InMemoryLeadStore, LeadNotifier, LeadStore, NoopLeadNotifier, NotificationDispatcher,
};

use crate::auth::{CredentialVerifier, SharedSecretVerifier};

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration shared with middleware
    pub config: Arc<Settings>,
    /// Slot-filling agent (owns the session store)
    pub agent: Arc<ChatAgent>,
    /// Captured leads
    pub leads: Arc<dyn LeadStore>,
    /// Background lead notification queue
    pub notifications: NotificationDispatcher,
    /// Admin credential check
    pub verifier: Arc<dyn CredentialVerifier>,
    /// Prometheus handle, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create application state from already-built components
    ///
    /// The admin verifier defaults to the configured shared password.
    pub fn new(
        config: Settings,
        session_store: Arc<dyn SessionStore>,
        leads: Arc<dyn LeadStore>,
        notifications: NotificationDispatcher,
    ) -> Self {
        let agent = Arc::new(ChatAgent::new(&config.dialogue, session_store));
        let verifier = SharedSecretVerifier::new(config.admin.password.clone());
        if !verifier.is_configured() {
            tracing::warn!("No admin password configured, admin routes will reject every request");
        }

        Self {
            config: Arc::new(config),
            agent,
            leads,
            notifications,
            verifier: Arc::new(verifier),
            metrics: None,
        }
    }

    /// In-memory stores and no mail; spawns the notification worker
    pub fn in_memory(config: Settings) -> Self {
        Self::with_notifier(config, Arc::new(NoopLeadNotifier))
    }

    /// In-memory stores with a custom notifier
    pub fn with_notifier(config: Settings, notifier: Arc<dyn LeadNotifier>) -> Self {
        let (notifications, _worker) =
            NotificationDispatcher::spawn(notifier, config.mail.queue_capacity);
        Self::new(
            config,
            Arc::new(InMemorySessionStore::new()),
            Arc::new(InMemoryLeadStore::new()),
            notifications,
        )
    }

    /// Replace the admin credential check
    pub fn with_verifier(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Replace the lead store
    pub fn with_lead_store(mut self, leads: Arc<dyn LeadStore>) -> Self {
        self.leads = leads;
        self
    }

    /// Attach the Prometheus handle served at /metrics
    pub fn with_metrics_handle(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Current configuration
    pub fn get_config(&self) -> &Settings {
        &self.config
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        self.agent.store()
    }
}
