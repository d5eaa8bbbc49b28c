//! Dialogue configuration

use serde::{Deserialize, Serialize};

use crate::constants::dialogue::MAX_SESSIONS;

/// How a newly extracted value interacts with one already in the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SlotMergePolicy {
    /// Any later extraction replaces the stored value
    #[default]
    LastWriteWins,
    /// The first extracted value is kept for the life of the session
    FirstWriteWins,
}

/// Slot-filling dialogue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// Distinct sessions allowed before the store is cleared
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Slot overwrite policy
    #[serde(default)]
    pub merge_policy: SlotMergePolicy,
}

fn default_max_sessions() -> usize {
    MAX_SESSIONS
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            merge_policy: SlotMergePolicy::default(),
        }
    }
}
