//! Slot Value Extraction for Chat Messages
//!
//! Rule-based extraction of the four dialogue slots from a user message.
//! Every extractor lowercases the message first, never consults session
//! state, and returns `None` when nothing matches.
//!
//! ## Matching rules
//!
//! - Keyword checks are plain substring checks with no word boundaries,
//!   so "31bhk" matches `1bhk` and "current" matches `rent`.
//! - Intent: buy keywords are checked before rent keywords, so a message
//!   containing both resolves to BUY.
//! - Budget: the first `\d+\s*(lakh|crore)` match is returned verbatim from
//!   the lowercased text. "10 lakh" and "1000 thousand" are not normalized.
//!
//! ## Static Patterns
//!
//! The budget regex is compiled once at program start using
//! `once_cell::sync::Lazy`.

use once_cell::sync::Lazy;
use regex::Regex;

use realty_agent_core::{City, Intent, PropertyType, SlotUpdate};

// =============================================================================
// STATIC PATTERNS
// =============================================================================

/// Keywords resolving to BUY (checked first)
static BUY_KEYWORDS: &[&str] = &["buy", "purchase", "investment"];

/// Keywords resolving to RENT
static RENT_KEYWORDS: &[&str] = &["rent", "lease"];

// Budget amount with a lakh/crore unit
static BUDGET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\s*(?:lakh|crore)").expect("budget pattern is valid"));

// =============================================================================
// SLOT EXTRACTOR
// =============================================================================

/// Slot extractor for chat messages
///
/// Stateless; cloning or constructing one is free.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotExtractor;

impl SlotExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Run all four extractors over one message
    pub fn extract(&self, message: &str) -> SlotUpdate {
        let lower = message.to_lowercase();

        let update = SlotUpdate {
            intent: intent_in(&lower),
            property_type: property_type_in(&lower),
            budget: budget_in(&lower),
            city: city_in(&lower),
        };

        tracing::trace!(
            intent = ?update.intent,
            property_type = ?update.property_type,
            budget = ?update.budget,
            city = ?update.city,
            "Extracted slots"
        );

        update
    }

    /// Extract buy/rent intent
    pub fn extract_intent(&self, message: &str) -> Option<Intent> {
        intent_in(&message.to_lowercase())
    }

    /// Extract property type (1BHK, 2BHK, 3BHK, Villa)
    pub fn extract_property_type(&self, message: &str) -> Option<PropertyType> {
        property_type_in(&message.to_lowercase())
    }

    /// Extract the budget text, e.g. "50 lakh"
    pub fn extract_budget(&self, message: &str) -> Option<String> {
        budget_in(&message.to_lowercase())
    }

    /// Extract a covered city, title-cased
    pub fn extract_city(&self, message: &str) -> Option<City> {
        city_in(&message.to_lowercase())
    }
}

// Helpers take already-lowercased text so `extract` lowercases once.

fn intent_in(lower: &str) -> Option<Intent> {
    if BUY_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(Intent::Buy);
    }
    if RENT_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(Intent::Rent);
    }
    None
}

fn property_type_in(lower: &str) -> Option<PropertyType> {
    PropertyType::ALL
        .into_iter()
        .find(|p| lower.contains(p.keyword()))
}

fn budget_in(lower: &str) -> Option<String> {
    BUDGET_PATTERN.find(lower).map(|m| m.as_str().to_string())
}

fn city_in(lower: &str) -> Option<City> {
    City::ALL.into_iter().find(|c| lower.contains(c.keyword()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_extraction() {
        let extractor = SlotExtractor::new();

        assert_eq!(extractor.extract_intent("I want to buy a flat"), Some(Intent::Buy));
        assert_eq!(
            extractor.extract_intent("Looking for an INVESTMENT property"),
            Some(Intent::Buy)
        );
        assert_eq!(extractor.extract_intent("purchase"), Some(Intent::Buy));
        assert_eq!(extractor.extract_intent("I need to rent"), Some(Intent::Rent));
        assert_eq!(extractor.extract_intent("long term lease"), Some(Intent::Rent));
        assert_eq!(extractor.extract_intent("hello there"), None);
    }

    #[test]
    fn test_buy_wins_over_rent() {
        let extractor = SlotExtractor::new();
        assert_eq!(
            extractor.extract_intent("should I rent or buy?"),
            Some(Intent::Buy)
        );
    }

    #[test]
    fn test_city_extraction_any_casing() {
        let extractor = SlotExtractor::new();

        for (message, city) in [
            ("flat in mumbai", City::Mumbai),
            ("DELHI please", City::Delhi),
            ("somewhere in BaNgAlOrE", City::Bangalore),
            ("Pune", City::Pune),
            ("near hyderabad airport", City::Hyderabad),
        ] {
            let found = extractor.extract_city(message).unwrap();
            assert_eq!(found, city);
        }

        assert_eq!(extractor.extract_city("pUnE").unwrap().as_str(), "Pune");
        assert!(extractor.extract_city("Chennai").is_none());
    }

    #[test]
    fn test_property_type_extraction() {
        let extractor = SlotExtractor::new();

        assert_eq!(
            extractor.extract_property_type("a 2BHK apartment"),
            Some(PropertyType::TwoBhk)
        );
        assert_eq!(
            extractor.extract_property_type("3bhk"),
            Some(PropertyType::ThreeBhk)
        );
        assert_eq!(
            extractor.extract_property_type("independent Villa"),
            Some(PropertyType::Villa)
        );
        // No word boundaries
        assert_eq!(
            extractor.extract_property_type("31bhk"),
            Some(PropertyType::OneBhk)
        );
        // "2 bhk" with a space is not a keyword
        assert_eq!(extractor.extract_property_type("2 bhk"), None);
    }

    #[test]
    fn test_budget_extraction() {
        let extractor = SlotExtractor::new();

        assert_eq!(
            extractor.extract_budget("budget is 50 lakh").as_deref(),
            Some("50 lakh")
        );
        assert_eq!(
            extractor.extract_budget("around 2Crore max").as_deref(),
            Some("2crore")
        );
        assert_eq!(
            extractor.extract_budget("90   LAKH").as_deref(),
            Some("90   lakh")
        );
        // First match wins
        assert_eq!(
            extractor.extract_budget("40 lakh or maybe 1 crore").as_deref(),
            Some("40 lakh")
        );
        // No unit, no budget
        assert!(extractor.extract_budget("5000000 rupees").is_none());
        assert!(extractor.extract_budget("a few lakh").is_none());
    }

    #[test]
    fn test_combined_extraction() {
        let extractor = SlotExtractor::new();

        let update = extractor.extract("I want to BUY a 3BHK in Delhi for 1 crore");
        assert_eq!(update.intent, Some(Intent::Buy));
        assert_eq!(update.property_type, Some(PropertyType::ThreeBhk));
        assert_eq!(update.budget.as_deref(), Some("1 crore"));
        assert_eq!(update.city, Some(City::Delhi));

        assert!(extractor.extract("hi").is_empty());
    }
}
