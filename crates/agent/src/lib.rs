//! Slot-Filling Chat Agent
//!
//! Features:
//! - Per-session slot state behind a pluggable `SessionStore`
//! - Fixed-order prompting for intent, property type, budget and city
//! - Configurable slot merge policy
//! - Session cap that clears the store on overflow

pub mod agent;
pub mod dialogue;
pub mod session;

pub use agent::{ChatAgent, DEFAULT_SESSION_ID};
pub use dialogue::{DialoguePolicy, DialogueReply};
pub use session::{InMemorySessionStore, SessionState, SessionStore};

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    /// Request cannot be processed as sent
    #[error("{0}")]
    InvalidInput(String),

    #[error("Session store error: {0}")]
    SessionStore(String),
}
