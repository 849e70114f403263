//! Non-fatal parsing gaps reported by the extractors.
//!
//! Extractors never print. They return every gap they hit next to the
//! records they produced, and the shell decides how loudly to report each
//! one.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A `Breadth Requirements:` value outside the known categories.
    UnknownBreadthRequirement { course: String, value: String },
    /// A delivery mode cell outside the known modes.
    UnknownDeliveryMode { course: String, value: String },
    /// The field pattern matched a label no extractor handles.
    InvalidField { course: String, label: String },
    /// A catalog header whose paired trailer comes before it.
    MisalignedSection { code: String },
    /// A timetable row with too few fields to decode.
    ShortRow { course: String, fields: usize },
}

impl Diagnostic {
    /// Gaps that point at a new category or a parsing defect. Short rows are
    /// expected noise from table detection and are not warnings.
    pub fn is_warning(&self) -> bool {
        !matches!(self, Diagnostic::ShortRow { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownBreadthRequirement { course, value } => {
                write!(f, "{course}: unknown breadth requirement {value:?}")
            }
            Diagnostic::UnknownDeliveryMode { course, value } => {
                write!(f, "{course}: unknown delivery mode {value:?}")
            }
            Diagnostic::InvalidField { course, label } => {
                write!(f, "{course}: invalid field {label:?}")
            }
            Diagnostic::MisalignedSection { code } => {
                write!(f, "{code}: section trailer precedes its header")
            }
            Diagnostic::ShortRow { course, fields } => {
                write!(f, "{course}: skipped row with {fields} fields")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_row_is_not_a_warning() {
        let d = Diagnostic::ShortRow {
            course: "ABCD01H3".to_string(),
            fields: 4,
        };
        assert!(!d.is_warning());
    }

    #[test]
    fn test_unknown_values_are_warnings() {
        let d = Diagnostic::UnknownBreadthRequirement {
            course: "ABCD01H3".to_string(),
            value: "Astrology".to_string(),
        };
        assert!(d.is_warning());
        assert_eq!(
            d.to_string(),
            "ABCD01H3: unknown breadth requirement \"Astrology\""
        );
    }
}
