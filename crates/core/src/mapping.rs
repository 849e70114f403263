//! Closed mapping tables for the enumerated columns.
//!
//! Both the catalog and the timetable carry free-text values that the
//! scheduling database stores as enums. Each mapping is an exact-match table
//! with `None` as the only fallback, so callers decide how to report the
//! miss.

use std::fmt;

use serde::{Deserialize, Serialize};

/// University breadth-requirement category a course counts toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreadthRequirement {
    ArtLitLang,
    HisPhilCul,
    SocialSci,
    Quant,
    NatSci,
}

/// Catalog label -> breadth requirement.
pub const BREADTH_REQUIREMENTS: &[(&str, BreadthRequirement)] = &[
    (
        "Arts, Literature and Language",
        BreadthRequirement::ArtLitLang,
    ),
    (
        "History, Philosophy and Cultural Studies",
        BreadthRequirement::HisPhilCul,
    ),
    (
        "Social and Behavioural Sciences",
        BreadthRequirement::SocialSci,
    ),
    ("Quantitative Reasoning", BreadthRequirement::Quant),
    ("Natural Sciences", BreadthRequirement::NatSci),
];

impl BreadthRequirement {
    /// Look up the exact catalog label. Anything else is `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        BREADTH_REQUIREMENTS
            .iter()
            .find(|(known, _)| *known == label)
            .map(|(_, value)| *value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BreadthRequirement::ArtLitLang => "ART_LIT_LANG",
            BreadthRequirement::HisPhilCul => "HIS_PHIL_CUL",
            BreadthRequirement::SocialSci => "SOCIAL_SCI",
            BreadthRequirement::Quant => "QUANT",
            BreadthRequirement::NatSci => "NAT_SCI",
        }
    }
}

impl fmt::Display for BreadthRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a meeting section is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryMode {
    InPerson,
    OnlineSynchronous,
    OnlineAsynchronous,
}

/// Timetable label -> delivery mode.
pub const DELIVERY_MODES: &[(&str, DeliveryMode)] = &[
    ("In-person", DeliveryMode::InPerson),
    ("Online - Synchronous", DeliveryMode::OnlineSynchronous),
    ("Online - Asynchronous", DeliveryMode::OnlineAsynchronous),
];

impl DeliveryMode {
    /// Look up the exact timetable label. Anything else is `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        DELIVERY_MODES
            .iter()
            .find(|(known, _)| *known == label)
            .map(|(_, value)| *value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMode::InPerson => "IN_PERSON",
            DeliveryMode::OnlineSynchronous => "ONLINE_SYNCHRONOUS",
            DeliveryMode::OnlineAsynchronous => "ONLINE_ASYNCHRONOUS",
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decode the waitlist column: `Y` is waitlisted, any other value is not,
/// and a blank cell carries no information.
pub fn parse_waitlist(cell: Option<&str>) -> Option<bool> {
    match cell {
        Some(value) if !value.is_empty() => Some(value == "Y"),
        _ => None,
    }
}
