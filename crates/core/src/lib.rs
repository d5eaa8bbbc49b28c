//! Core types for the realty lead agent
//!
//! This crate provides foundational types used across all other crates:
//! - Slot value types (intent, property type, city) and slot updates
//! - Conversation stages for the slot-filling dialogue
//! - Lead records

pub mod conversation;
pub mod lead;
pub mod slots;

pub use conversation::DialogueStage;
pub use lead::{Lead, NewLead};
pub use slots::{City, Intent, PropertyType, SlotName, SlotUpdate};
