//! Text processing for the realty lead agent
//!
//! This crate turns a raw chat message into slot values:
//! - **Intent**: buy vs rent keywords
//! - **Property type**: 1BHK / 2BHK / 3BHK / Villa substrings
//! - **Budget**: `<digits> lakh|crore` amounts, kept verbatim
//! - **City**: membership in the covered city list
//!
//! # Example
//!
//! ```
//! use realty_agent_text_processing::SlotExtractor;
//!
//! let extractor = SlotExtractor::new();
//! let update = extractor.extract("Looking to rent a 2BHK in Pune under 40 lakh");
//! assert_eq!(update.budget.as_deref(), Some("40 lakh"));
//! ```

pub mod slot_extraction;

pub use slot_extraction::SlotExtractor;
