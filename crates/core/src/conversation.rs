//! Conversation stages for the slot-filling dialogue

use serde::{Deserialize, Serialize};

use crate::slots::SlotName;

/// Dialogue stage, derived from which slots are still missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DialogueStage {
    /// Waiting to learn buy vs rent
    #[default]
    AwaitIntent,
    /// Waiting for 1BHK/2BHK/3BHK/Villa
    AwaitPropertyType,
    AwaitBudget,
    AwaitCity,
    /// All slots known; the lead form is offered
    Complete,
}

impl DialogueStage {
    /// Stage for the first missing slot, or `Complete`
    pub fn for_missing(slot: Option<SlotName>) -> Self {
        match slot {
            Some(SlotName::Intent) => DialogueStage::AwaitIntent,
            Some(SlotName::PropertyType) => DialogueStage::AwaitPropertyType,
            Some(SlotName::Budget) => DialogueStage::AwaitBudget,
            Some(SlotName::City) => DialogueStage::AwaitCity,
            None => DialogueStage::Complete,
        }
    }

    /// Slot this stage is waiting on
    pub fn awaited_slot(&self) -> Option<SlotName> {
        match self {
            DialogueStage::AwaitIntent => Some(SlotName::Intent),
            DialogueStage::AwaitPropertyType => Some(SlotName::PropertyType),
            DialogueStage::AwaitBudget => Some(SlotName::Budget),
            DialogueStage::AwaitCity => Some(SlotName::City),
            DialogueStage::Complete => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, DialogueStage::Complete)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DialogueStage::AwaitIntent => "Awaiting intent",
            DialogueStage::AwaitPropertyType => "Awaiting property type",
            DialogueStage::AwaitBudget => "Awaiting budget",
            DialogueStage::AwaitCity => "Awaiting city",
            DialogueStage::Complete => "Complete",
        }
    }
}

impl std::fmt::Display for DialogueStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
