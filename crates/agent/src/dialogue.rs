//! Dialogue Policy
//!
//! Merges extracted slot values into a session and picks the reply:
//! the prompt for the first unset slot, or a summary plus the lead form
//! once all four slots are known.

use realty_agent_config::SlotMergePolicy;
use realty_agent_core::{DialogueStage, SlotName, SlotUpdate};

use crate::session::SessionState;

pub const INTENT_PROMPT: &str = "Are you looking to buy or rent a property?";
pub const PROPERTY_TYPE_PROMPT: &str =
    "What type of property are you looking for? (1BHK, 2BHK, 3BHK or Villa)";
pub const BUDGET_PROMPT: &str = "What is your budget? (for example 50 lakh or 1 crore)";
pub const CITY_PROMPT: &str =
    "Which city are you looking in? We cover Mumbai, Delhi, Bangalore, Pune and Hyderabad.";

/// Reply for one chat turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueReply {
    pub reply: String,
    /// Set once every slot is filled
    pub show_lead_form: bool,
    pub stage: DialogueStage,
}

/// Slot merge and prompt selection
#[derive(Debug, Clone, Copy, Default)]
pub struct DialoguePolicy {
    merge_policy: SlotMergePolicy,
}

impl DialoguePolicy {
    pub fn new(merge_policy: SlotMergePolicy) -> Self {
        Self { merge_policy }
    }

    /// Fold extracted values into the session
    ///
    /// Absent values never clear a slot. Returns the slots that changed.
    pub fn merge(&self, state: &mut SessionState, update: SlotUpdate) -> Vec<SlotName> {
        let mut changed = Vec::new();

        if let Some(intent) = update.intent {
            if self.apply(&mut state.intent, intent) {
                changed.push(SlotName::Intent);
            }
        }
        if let Some(property_type) = update.property_type {
            if self.apply(&mut state.property_type, property_type) {
                changed.push(SlotName::PropertyType);
            }
        }
        if let Some(budget) = update.budget {
            if self.apply(&mut state.budget, budget) {
                changed.push(SlotName::Budget);
            }
        }
        if let Some(city) = update.city {
            if self.apply(&mut state.city, city) {
                changed.push(SlotName::City);
            }
        }

        changed
    }

    fn apply<T: PartialEq>(&self, slot: &mut Option<T>, value: T) -> bool {
        match (self.merge_policy, slot.as_ref()) {
            (SlotMergePolicy::FirstWriteWins, Some(_)) => false,
            (_, Some(current)) if *current == value => false,
            _ => {
                *slot = Some(value);
                true
            }
        }
    }

    /// Reply for the current session state
    pub fn respond(&self, state: &SessionState) -> DialogueReply {
        let stage = state.stage();
        match stage.awaited_slot() {
            Some(slot) => DialogueReply {
                reply: Self::prompt_for(slot).to_string(),
                show_lead_form: false,
                stage,
            },
            None => DialogueReply {
                reply: Self::summary(state),
                show_lead_form: true,
                stage,
            },
        }
    }

    pub fn prompt_for(slot: SlotName) -> &'static str {
        match slot {
            SlotName::Intent => INTENT_PROMPT,
            SlotName::PropertyType => PROPERTY_TYPE_PROMPT,
            SlotName::Budget => BUDGET_PROMPT,
            SlotName::City => CITY_PROMPT,
        }
    }

    /// Completion summary; only meaningful when every slot is set
    pub fn summary(state: &SessionState) -> String {
        format!(
            "Great! Here is what I have: you want to {} a {} in {} with a budget of {}. \
             Please share your contact details and our team will reach out.",
            state.intent.map(|i| i.verb()).unwrap_or_default(),
            state.property_type.map(|p| p.as_str()).unwrap_or_default(),
            state.city.map(|c| c.as_str()).unwrap_or_default(),
            state.budget.as_deref().unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realty_agent_core::{City, Intent, PropertyType};

    fn update_with_city(city: City) -> SlotUpdate {
        SlotUpdate {
            city: Some(city),
            ..Default::default()
        }
    }

    #[test]
    fn test_prompts_in_order() {
        let policy = DialoguePolicy::default();
        let mut state = SessionState::new();

        assert_eq!(policy.respond(&state).reply, INTENT_PROMPT);

        policy.merge(
            &mut state,
            SlotUpdate {
                intent: Some(Intent::Buy),
                ..Default::default()
            },
        );
        let reply = policy.respond(&state);
        assert_eq!(reply.reply, PROPERTY_TYPE_PROMPT);
        assert_eq!(reply.stage, DialogueStage::AwaitPropertyType);
        assert!(!reply.show_lead_form);
    }

    #[test]
    fn test_summary_when_complete() {
        let policy = DialoguePolicy::default();
        let mut state = SessionState::new();
        state.intent = Some(Intent::Rent);
        state.property_type = Some(PropertyType::TwoBhk);
        state.budget = Some("40 lakh".to_string());
        state.city = Some(City::Pune);

        let reply = policy.respond(&state);
        assert!(reply.show_lead_form);
        assert_eq!(reply.stage, DialogueStage::Complete);
        assert_eq!(
            reply.reply,
            "Great! Here is what I have: you want to rent a 2BHK in Pune with a budget of 40 lakh. \
             Please share your contact details and our team will reach out."
        );
    }

    #[test]
    fn test_last_write_wins_replaces() {
        let policy = DialoguePolicy::new(SlotMergePolicy::LastWriteWins);
        let mut state = SessionState::new();

        policy.merge(&mut state, update_with_city(City::Delhi));
        let changed = policy.merge(&mut state, update_with_city(City::Mumbai));

        assert_eq!(state.city, Some(City::Mumbai));
        assert_eq!(changed, vec![SlotName::City]);
    }

    #[test]
    fn test_first_write_wins_keeps_first() {
        let policy = DialoguePolicy::new(SlotMergePolicy::FirstWriteWins);
        let mut state = SessionState::new();

        policy.merge(&mut state, update_with_city(City::Delhi));
        let changed = policy.merge(&mut state, update_with_city(City::Mumbai));

        assert_eq!(state.city, Some(City::Delhi));
        assert!(changed.is_empty());
    }

    #[test]
    fn test_empty_update_never_clears() {
        let policy = DialoguePolicy::default();
        let mut state = SessionState::new();
        state.budget = Some("1 crore".to_string());

        let changed = policy.merge(&mut state, SlotUpdate::default());
        assert!(changed.is_empty());
        assert_eq!(state.budget.as_deref(), Some("1 crore"));
    }
}
