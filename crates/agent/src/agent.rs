//! Chat Agent
//!
//! Runs one chat turn: extract, merge into the session, reply.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use realty_agent_config::DialogueConfig;
use realty_agent_text_processing::SlotExtractor;

use crate::dialogue::{DialoguePolicy, DialogueReply};
use crate::session::{SessionState, SessionStore};
use crate::AgentError;

/// Session key used when the client sends none
pub const DEFAULT_SESSION_ID: &str = "default";

/// Slot-filling chat agent
pub struct ChatAgent {
    extractor: SlotExtractor,
    policy: DialoguePolicy,
    store: Arc<dyn SessionStore>,
    max_sessions: usize,
    /// Serializes the cap check and the read-modify-write of a turn
    turn_lock: Mutex<()>,
}

impl ChatAgent {
    pub fn new(config: &DialogueConfig, store: Arc<dyn SessionStore>) -> Self {
        Self {
            extractor: SlotExtractor::new(),
            policy: DialoguePolicy::new(config.merge_policy),
            store,
            max_sessions: config.max_sessions,
            turn_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Handle one user message
    ///
    /// A missing session id falls back to [`DEFAULT_SESSION_ID`]. An empty
    /// or missing message is rejected before any state is touched.
    pub async fn handle_message(
        &self,
        session_id: Option<&str>,
        message: Option<&str>,
    ) -> Result<DialogueReply, AgentError> {
        let message = match message {
            Some(m) if !m.is_empty() => m,
            _ => return Err(AgentError::InvalidInput("message is required".to_string())),
        };
        let key = session_id.unwrap_or(DEFAULT_SESSION_ID);

        let _turn = self.turn_lock.lock().await;

        let mut state = match self.store.get(key).await? {
            Some(state) => state,
            None => {
                self.enforce_cap().await?;
                SessionState::new()
            }
        };

        let was_complete = state.is_complete();
        state.messages.push(message.to_string());

        let update = self.extractor.extract(message);
        if update.is_empty() {
            tracing::debug!(session_id = %key, "No slot values in message");
        }
        let changed = self.policy.merge(&mut state, update);
        state.updated_at = Utc::now();

        let reply = self.policy.respond(&state);
        self.store.set(key, state).await?;

        metrics::counter!("realty_agent_chat_turns_total").increment(1);
        if reply.show_lead_form && !was_complete {
            metrics::counter!("realty_agent_conversations_completed_total").increment(1);
        }

        tracing::debug!(
            session_id = %key,
            changed = ?changed,
            stage = %reply.stage,
            "Chat turn handled"
        );

        Ok(reply)
    }

    /// Wipe every session if admitting one more would exceed the cap
    async fn enforce_cap(&self) -> Result<(), AgentError> {
        let count = self.store.len().await?;
        if count >= self.max_sessions {
            tracing::warn!(
                sessions = count,
                max_sessions = self.max_sessions,
                "Session cap reached, clearing all sessions"
            );
            self.store.clear().await?;
            metrics::counter!("realty_agent_session_store_wipes_total").increment(1);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::{BUDGET_PROMPT, INTENT_PROMPT, PROPERTY_TYPE_PROMPT};
    use crate::session::InMemorySessionStore;
    use realty_agent_config::SlotMergePolicy;
    use realty_agent_core::{City, DialogueStage, Intent, PropertyType};

    fn agent_with(max_sessions: usize, merge_policy: SlotMergePolicy) -> ChatAgent {
        let config = DialogueConfig {
            max_sessions,
            merge_policy,
        };
        ChatAgent::new(&config, Arc::new(InMemorySessionStore::new()))
    }

    fn default_agent() -> ChatAgent {
        agent_with(1000, SlotMergePolicy::LastWriteWins)
    }

    #[tokio::test]
    async fn test_buy_asks_for_property_type() {
        let agent = default_agent();
        let reply = agent
            .handle_message(Some("s1"), Some("I want to buy"))
            .await
            .unwrap();

        assert_eq!(reply.reply, PROPERTY_TYPE_PROMPT);
        assert!(!reply.show_lead_form);

        let state = agent.store().get("s1").await.unwrap().unwrap();
        assert_eq!(state.intent, Some(Intent::Buy));
        assert_eq!(state.messages, vec!["I want to buy".to_string()]);
    }

    #[tokio::test]
    async fn test_full_conversation_completes() {
        let agent = default_agent();

        agent.handle_message(Some("s1"), Some("rent")).await.unwrap();
        let reply = agent.handle_message(Some("s1"), Some("a 3BHK")).await.unwrap();
        assert_eq!(reply.reply, BUDGET_PROMPT);
        agent
            .handle_message(Some("s1"), Some("around 45 lakh"))
            .await
            .unwrap();

        let reply = agent
            .handle_message(Some("s1"), Some("Pune please"))
            .await
            .unwrap();
        assert!(reply.show_lead_form);
        assert_eq!(reply.stage, DialogueStage::Complete);
        assert!(reply.reply.contains("Pune"));
        assert!(reply.reply.contains("rent"));
        assert!(reply.reply.contains("3BHK"));
        assert!(reply.reply.contains("45 lakh"));

        // Complete is sticky
        let reply = agent.handle_message(Some("s1"), Some("thanks")).await.unwrap();
        assert!(reply.show_lead_form);
    }

    #[tokio::test]
    async fn test_all_slots_in_one_message() {
        let agent = default_agent();
        let reply = agent
            .handle_message(Some("s1"), Some("Buy a villa in Hyderabad for 2 crore"))
            .await
            .unwrap();

        assert!(reply.show_lead_form);
        let state = agent.store().get("s1").await.unwrap().unwrap();
        assert_eq!(state.property_type, Some(PropertyType::Villa));
        assert_eq!(state.city, Some(City::Hyderabad));
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let agent = default_agent();

        let err = agent.handle_message(Some("s1"), Some("")).await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidInput(ref m) if m == "message is required"));
        assert!(agent.handle_message(Some("s1"), None).await.is_err());

        assert_eq!(agent.store().len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_session_id_uses_default() {
        let agent = default_agent();
        let reply = agent.handle_message(None, Some("hello")).await.unwrap();
        assert_eq!(reply.reply, INTENT_PROMPT);

        assert!(agent
            .store()
            .get(DEFAULT_SESSION_ID)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_session_cap_clears_everything() {
        let agent = agent_with(1000, SlotMergePolicy::LastWriteWins);

        agent
            .handle_message(Some("done"), Some("buy a 2bhk in Delhi for 80 lakh"))
            .await
            .unwrap();
        for i in 1..1000 {
            let id = format!("s{}", i);
            agent.handle_message(Some(&id), Some("hi")).await.unwrap();
        }
        assert_eq!(agent.store().len().await.unwrap(), 1000);

        // Existing keys never trigger the wipe
        agent.handle_message(Some("s1"), Some("hi")).await.unwrap();
        assert_eq!(agent.store().len().await.unwrap(), 1000);

        agent.handle_message(Some("s1000"), Some("hi")).await.unwrap();
        assert_eq!(agent.store().len().await.unwrap(), 1);
        assert!(agent.store().get("done").await.unwrap().is_none());
        assert!(agent.store().get("s1000").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_merge_policy_applies_to_city() {
        let agent = agent_with(1000, SlotMergePolicy::FirstWriteWins);
        agent.handle_message(Some("s1"), Some("Delhi")).await.unwrap();
        agent.handle_message(Some("s1"), Some("Mumbai")).await.unwrap();
        let state = agent.store().get("s1").await.unwrap().unwrap();
        assert_eq!(state.city, Some(City::Delhi));

        let agent = default_agent();
        agent.handle_message(Some("s1"), Some("Delhi")).await.unwrap();
        agent.handle_message(Some("s1"), Some("Mumbai")).await.unwrap();
        let state = agent.store().get("s1").await.unwrap().unwrap();
        assert_eq!(state.city, Some(City::Mumbai));
    }
}
