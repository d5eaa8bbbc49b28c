//! Slot value types
//!
//! The dialogue collects four slots before offering the lead form:
//! intent, property type, budget and city. Intent, property type and
//! city are closed sets; budget is kept as the raw matched text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the customer wants to buy or rent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Intent {
    Buy,
    Rent,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Buy => "BUY",
            Intent::Rent => "RENT",
        }
    }

    /// Verb used when summarizing the conversation
    pub fn verb(&self) -> &'static str {
        match self {
            Intent::Buy => "buy",
            Intent::Rent => "rent",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


/// Property configurations the bot understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "1BHK")]
    OneBhk,
    #[serde(rename = "2BHK")]
    TwoBhk,
    #[serde(rename = "3BHK")]
    ThreeBhk,
    #[serde(rename = "Villa")]
    Villa,
}

impl PropertyType {
    /// All property types in matching order
    pub const ALL: [PropertyType; 4] = [
        PropertyType::OneBhk,
        PropertyType::TwoBhk,
        PropertyType::ThreeBhk,
        PropertyType::Villa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::OneBhk => "1BHK",
            PropertyType::TwoBhk => "2BHK",
            PropertyType::ThreeBhk => "3BHK",
            PropertyType::Villa => "Villa",
        }
    }

    /// Lowercase keyword searched for in user messages
    pub fn keyword(&self) -> &'static str {
        match self {
            PropertyType::OneBhk => "1bhk",
            PropertyType::TwoBhk => "2bhk",
            PropertyType::ThreeBhk => "3bhk",
            PropertyType::Villa => "villa",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


/// Cities covered by the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    Mumbai,
    Delhi,
    Bangalore,
    Pune,
    Hyderabad,
}

impl City {
    pub const ALL: [City; 5] = [
        City::Mumbai,
        City::Delhi,
        City::Bangalore,
        City::Pune,
        City::Hyderabad,
    ];

    /// Canonical title-cased name
    pub fn as_str(&self) -> &'static str {
        match self {
            City::Mumbai => "Mumbai",
            City::Delhi => "Delhi",
            City::Bangalore => "Bangalore",
            City::Pune => "Pune",
            City::Hyderabad => "Hyderabad",
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            City::Mumbai => "mumbai",
            City::Delhi => "delhi",
            City::Bangalore => "bangalore",
            City::Pune => "pune",
            City::Hyderabad => "hyderabad",
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


/// Slot identifiers in the order the dialogue asks for them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotName {
    Intent,
    PropertyType,
    Budget,
    City,
}

impl SlotName {
    /// Fixed priority order for prompting
    pub const PRIORITY: [SlotName; 4] = [
        SlotName::Intent,
        SlotName::PropertyType,
        SlotName::Budget,
        SlotName::City,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotName::Intent => "intent",
            SlotName::PropertyType => "property_type",
            SlotName::Budget => "budget",
            SlotName::City => "city",
        }
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values extracted from a single message
///
/// `None` means the extractor found nothing; it never means "clear".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotUpdate {
    pub intent: Option<Intent>,
    pub property_type: Option<PropertyType>,
    pub budget: Option<String>,
    pub city: Option<City>,
}

impl SlotUpdate {
    pub fn is_empty(&self) -> bool {
        self.intent.is_none()
            && self.property_type.is_none()
            && self.budget.is_none()
            && self.city.is_none()
    }
}
