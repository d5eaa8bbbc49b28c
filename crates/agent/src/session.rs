//! Session Management
//!
//! Conversation state keyed by the client-supplied session id.
//!
//! The storage uses a trait-based abstraction so the agent can run
//! against a different backend:
//!
//! - `InMemorySessionStore` - Default, uses HashMap
//!
//! Sessions never survive a restart. The overflow policy is applied by
//! the agent, not the store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use realty_agent_core::{City, DialogueStage, Intent, PropertyType, SlotName};

use crate::AgentError;

/// Accumulated state of one conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Raw messages in arrival order
    pub messages: Vec<String>,
    pub intent: Option<Intent>,
    pub property_type: Option<PropertyType>,
    /// Budget text as matched, e.g. "50 lakh"
    pub budget: Option<String>,
    pub city: Option<City>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            messages: Vec::new(),
            intent: None,
            property_type: None,
            budget: None,
            city: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a slot already holds a value
    pub fn has(&self, slot: SlotName) -> bool {
        match slot {
            SlotName::Intent => self.intent.is_some(),
            SlotName::PropertyType => self.property_type.is_some(),
            SlotName::Budget => self.budget.is_some(),
            SlotName::City => self.city.is_some(),
        }
    }

    /// First unset slot in prompting order
    pub fn first_missing(&self) -> Option<SlotName> {
        SlotName::PRIORITY.into_iter().find(|slot| !self.has(*slot))
    }

    pub fn stage(&self) -> DialogueStage {
        DialogueStage::for_missing(self.first_missing())
    }

    pub fn is_complete(&self) -> bool {
        self.stage().is_complete()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Session store trait for pluggable backends
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Get a session by key
    async fn get(&self, key: &str) -> Result<Option<SessionState>, AgentError>;

    /// Insert or replace a session
    async fn set(&self, key: &str, state: SessionState) -> Result<(), AgentError>;

    /// Snapshot of every session, ordered by key
    async fn list(&self) -> Result<BTreeMap<String, SessionState>, AgentError>;

    /// Number of distinct session keys
    async fn len(&self) -> Result<usize, AgentError>;

    /// Drop every session
    async fn clear(&self) -> Result<(), AgentError>;
}

/// In-memory session store (default)
///
/// Sessions live in a HashMap for the life of the process.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionState>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<SessionState>, AgentError> {
        Ok(self.sessions.read().get(key).cloned())
    }

    async fn set(&self, key: &str, state: SessionState) -> Result<(), AgentError> {
        self.sessions.write().insert(key.to_string(), state);
        Ok(())
    }

    async fn list(&self) -> Result<BTreeMap<String, SessionState>, AgentError> {
        Ok(self
            .sessions
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn len(&self) -> Result<usize, AgentError> {
        Ok(self.sessions.read().len())
    }

    async fn clear(&self) -> Result<(), AgentError> {
        self.sessions.write().clear();
        Ok(())
    }
}
