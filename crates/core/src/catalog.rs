//! Course catalog extraction.
//!
//! The catalog is a two-column PDF. Each column region is plain text in
//! which every course looks like:
//!
//! ```text
//! ABCD01H3: Introduction to Things
//! and Stuff
//! A long free-form description of the course that wraps over several
//! lines of the column.
//! Prerequisite: ABCD02H3 and ABCD03H3
//! Breadth Requirements: Natural Sciences
//! Link to UTSC Timetable
//! ```
//!
//! A section runs from a code header to the trailer line. Inside a section
//! the name comes first, then the description, then any number of labeled
//! fields in any order.

use regex::Regex;

use crate::codes::{header_regex, requisite_codes};
use crate::diagnostics::Diagnostic;
use crate::mapping::BreadthRequirement;

/// Text that closes every course section in the catalog.
pub const DEFAULT_TRAILER: &str = "Link to UTSC Timetable";

/// Labels that start a field inside a course section.
pub const DEFAULT_FIELD_PATTERN: &str = r"(Exclusion|Breadth Requirements|Prerequisite|Corequisite|Course Experience|Note|Recommended Preparation):";

/// Continuation lines longer than this are the start of the description.
pub const DEFAULT_NAME_LINE_LIMIT: usize = 40;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Layout knobs for one catalog document.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Literal text that ends a course section.
    pub trailer: String,
    /// Maximum length (in characters) of a name continuation line.
    pub name_line_limit: usize,
    /// How many lines after the header line may still belong to the name.
    pub max_name_continuations: usize,
    /// Pattern locating field labels. The label is the match without its
    /// trailing colon.
    pub field_pattern: Regex,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            trailer: DEFAULT_TRAILER.to_string(),
            name_line_limit: DEFAULT_NAME_LINE_LIMIT,
            max_name_continuations: 2,
            field_pattern: Regex::new(DEFAULT_FIELD_PATTERN).unwrap(),
        }
    }
}

impl CatalogConfig {
    /// Replace the field-label pattern.
    pub fn with_field_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.field_pattern = Regex::new(pattern)?;
        Ok(self)
    }
}

/// A labeled field inside a course section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Exclusion,
    BreadthRequirements,
    Prerequisite,
    Corequisite,
    CourseExperience,
    Note,
    RecommendedPreparation,
}

pub const FIELD_LABELS: &[(&str, Field)] = &[
    ("Exclusion", Field::Exclusion),
    ("Breadth Requirements", Field::BreadthRequirements),
    ("Prerequisite", Field::Prerequisite),
    ("Corequisite", Field::Corequisite),
    ("Course Experience", Field::CourseExperience),
    ("Note", Field::Note),
    ("Recommended Preparation", Field::RecommendedPreparation),
];

impl Field {
    pub fn from_label(label: &str) -> Option<Self> {
        FIELD_LABELS
            .iter()
            .find(|(known, _)| *known == label)
            .map(|(_, field)| *field)
    }
}

/// One row of `courses.csv`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Course {
    pub code: String,
    pub name: String,
    pub description: String,
    pub breadth_requirement: Option<BreadthRequirement>,
    pub course_experience: String,
    pub recommended_preparation: String,
    pub prerequisite_description: String,
    pub exclusion_description: String,
    pub corequisite_description: String,
    pub note: String,
}

/// An edge `required -> course` from a prerequisite or corequisite field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requisite {
    pub required: String,
    pub course: String,
}

impl Requisite {
    fn new(required: &str, course: &str) -> Self {
        Self {
            required: required.to_string(),
            course: course.to_string(),
        }
    }
}

/// A course section located in a column region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    /// Course code without the header colon.
    pub code: &'a str,
    /// Everything after the header up to the trailer.
    pub body: &'a str,
}

/// Everything extracted from a catalog, plus the gaps found on the way.
#[derive(Debug, Clone, Default)]
pub struct CatalogExtraction {
    pub courses: Vec<Course>,
    pub prerequisites: Vec<Requisite>,
    pub corequisites: Vec<Requisite>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CatalogExtraction {
    pub fn extend(&mut self, other: CatalogExtraction) {
        self.courses.extend(other.courses);
        self.prerequisites.extend(other.prerequisites);
        self.corequisites.extend(other.corequisites);
        self.diagnostics.extend(other.diagnostics);
    }
}

// ---------------------------------------------------------------------------
// Section segmentation
// ---------------------------------------------------------------------------

/// Split a column region into course sections.
///
/// The k-th header is paired with the k-th trailer. Unpaired headers or
/// trailers are ignored; a pair whose trailer comes first is reported.
pub fn find_sections<'a>(
    text: &'a str,
    config: &CatalogConfig,
) -> (Vec<Section<'a>>, Vec<Diagnostic>) {
    let mut sections = Vec::new();
    let mut diagnostics = Vec::new();

    if config.trailer.is_empty() {
        return (sections, diagnostics);
    }

    let trailers = text.match_indices(config.trailer.as_str()).map(|(i, _)| i);

    for (header, trailer_start) in header_regex().find_iter(text).zip(trailers) {
        let code = header.as_str().trim_end_matches(':');
        if trailer_start < header.end() {
            diagnostics.push(Diagnostic::MisalignedSection {
                code: code.to_string(),
            });
            continue;
        }
        sections.push(Section {
            code,
            body: &text[header.end()..trailer_start],
        });
    }

    (sections, diagnostics)
}

// ---------------------------------------------------------------------------
// Section parsing
// ---------------------------------------------------------------------------

/// Split the leading name lines off a section body.
///
/// Returns the assembled name and the byte offset where the description
/// begins.
fn split_name<'a>(body: &'a str, config: &CatalogConfig) -> (String, usize) {
    let mut lines = body.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return (String::new(), 0);
    };

    let mut name = first.trim().to_string();
    let mut consumed = first.len();

    for line in lines.take(config.max_name_continuations) {
        // The last line of a section has no terminator; it is never part of
        // the name.
        if !line.ends_with('\n') {
            break;
        }
        let content = line.trim();
        if content.is_empty()
            || content.chars().count() > config.name_line_limit
            || starts_with_field(content, config)
        {
            break;
        }
        if !name.is_empty() {
            name.push(' ');
        }
        name.push_str(content);
        consumed += line.len();
    }

    (name, consumed)
}

fn starts_with_field(line: &str, config: &CatalogConfig) -> bool {
    config
        .field_pattern
        .find(line)
        .is_some_and(|m| m.start() == 0)
}

fn collapse(text: &str) -> String {
    text.trim().replace('\n', " ")
}

/// Parse one section into a course record and its requisite edges.
pub fn parse_section(section: &Section<'_>, config: &CatalogConfig) -> CatalogExtraction {
    let code = section.code;
    let mut out = CatalogExtraction::default();

    let (name, description_start) = split_name(section.body, config);
    let rest = &section.body[description_start..];

    let labels: Vec<regex::Match<'_>> = config.field_pattern.find_iter(rest).collect();

    let description_end = labels.first().map_or(rest.len(), |m| m.start());

    let mut course = Course {
        code: code.to_string(),
        name,
        description: collapse(&rest[..description_end]),
        ..Default::default()
    };

    for (i, label_match) in labels.iter().enumerate() {
        let value_end = labels.get(i + 1).map_or(rest.len(), |next| next.start());
        let value = collapse(&rest[label_match.end()..value_end]);
        let label = label_match.as_str().trim_end_matches(':').trim();

        match Field::from_label(label) {
            Some(Field::Exclusion) => course.exclusion_description = value,
            Some(Field::BreadthRequirements) => {
                course.breadth_requirement = BreadthRequirement::from_label(&value);
                if course.breadth_requirement.is_none() {
                    out.diagnostics.push(Diagnostic::UnknownBreadthRequirement {
                        course: code.to_string(),
                        value,
                    });
                }
            }
            Some(Field::Prerequisite) => {
                out.prerequisites.extend(
                    requisite_codes(&value)
                        .into_iter()
                        .map(|required| Requisite::new(required, code)),
                );
                course.prerequisite_description = value;
            }
            Some(Field::Corequisite) => {
                out.corequisites.extend(
                    requisite_codes(&value)
                        .into_iter()
                        .map(|required| Requisite::new(required, code)),
                );
                course.corequisite_description = value;
            }
            Some(Field::CourseExperience) => course.course_experience = value,
            Some(Field::Note) => course.note = value,
            Some(Field::RecommendedPreparation) => course.recommended_preparation = value,
            None => out.diagnostics.push(Diagnostic::InvalidField {
                course: code.to_string(),
                label: label.to_string(),
            }),
        }
    }

    out.courses.push(course);
    out
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Extract every course from a sequence of column regions.
///
/// Regions are processed in the order given (left column, then right
/// column, page by page) and records keep that order.
pub fn extract_catalog<I, S>(regions: I, config: &CatalogConfig) -> CatalogExtraction
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = CatalogExtraction::default();

    for region in regions {
        let text = region.as_ref();
        if text.trim().is_empty() {
            continue;
        }

        let (sections, diagnostics) = find_sections(text, config);
        out.diagnostics.extend(diagnostics);

        for section in &sections {
            out.extend(parse_section(section, config));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = "ABCD01H3Y: Introduction to Things\n\
        This course covers a great many things in considerable depth and at length.\n\
        Prerequisite: ABCD02H3, ABCD03H3\n\
        Link to UTSC Timetable\n";

    fn extract(text: &str) -> CatalogExtraction {
        extract_catalog([text], &CatalogConfig::default())
    }

    // ============================================================================
    // find_sections
    // ============================================================================

    #[test]
    fn test_find_sections_pairs_headers_and_trailers() {
        let text = "ABCD01H3: One\nBody one\nLink to UTSC Timetable\n\
                    ABCD02H3: Two\nBody two\nLink to UTSC Timetable\n";
        let (sections, diagnostics) = find_sections(text, &CatalogConfig::default());

        assert!(diagnostics.is_empty());
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].code, "ABCD01H3");
        assert_eq!(sections[0].body, " One\nBody one\n");
        assert_eq!(sections[1].code, "ABCD02H3");
    }

    #[test]
    fn test_find_sections_ignores_header_without_trailer() {
        let text = "ABCD01H3: One\nBody\nLink to UTSC Timetable\nABCD02H3: Cut off by the page";
        let (sections, _) = find_sections(text, &CatalogConfig::default());
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].code, "ABCD01H3");
    }

    #[test]
    fn test_find_sections_reports_misaligned_pair() {
        // A trailer left over from a course that started in the other column.
        let text = "Link to UTSC Timetable\nABCD01H3: One\nBody\n";
        let (sections, diagnostics) = find_sections(text, &CatalogConfig::default());
        assert!(sections.is_empty());
        assert_eq!(
            diagnostics,
            vec![Diagnostic::MisalignedSection {
                code: "ABCD01H3".to_string()
            }]
        );
    }

    // ============================================================================
    // Name extraction
    // ============================================================================

    #[test]
    fn test_name_single_line() {
        let out = extract(SCENARIO);
        assert_eq!(out.courses[0].name, "Introduction to Things");
    }

    #[test]
    fn test_name_folds_two_short_continuation_lines() {
        let text = "ABCD01H3: Introduction to\nThings and\nStuff\n\
            This course covers a great many things in considerable depth.\n\
            Link to UTSC Timetable\n";
        let out = extract(text);
        assert_eq!(out.courses[0].name, "Introduction to Things and Stuff");
        assert_eq!(
            out.courses[0].description,
            "This course covers a great many things in considerable depth."
        );
    }

    #[test]
    fn test_name_stops_after_two_continuations() {
        let text = "ABCD01H3: A\nB\nC\nD\nLink to UTSC Timetable\n";
        let out = extract(text);
        assert_eq!(out.courses[0].name, "A B C");
        assert_eq!(out.courses[0].description, "D");
    }

    #[test]
    fn test_name_stops_at_long_line() {
        let text = "ABCD01H3: Short Name\n\
            A description line that is clearly longer than forty characters.\n\
            Short tail\n\
            Link to UTSC Timetable\n";
        let out = extract(text);
        assert_eq!(out.courses[0].name, "Short Name");
        assert_eq!(
            out.courses[0].description,
            "A description line that is clearly longer than forty characters. Short tail"
        );
    }

    #[test]
    fn test_name_does_not_swallow_field_line() {
        let text = "ABCD01H3: Short Name\nNote: Tiny\nLink to UTSC Timetable\n";
        let out = extract(text);
        assert_eq!(out.courses[0].name, "Short Name");
        assert_eq!(out.courses[0].note, "Tiny");
        assert_eq!(out.courses[0].description, "");
    }

    #[test]
    fn test_name_line_limit_is_configurable() {
        let config = CatalogConfig {
            name_line_limit: 3,
            ..Default::default()
        };
        let text = "ABCD01H3: Name\nLonger continuation\nLink to UTSC Timetable\n";
        let out = extract_catalog([text], &config);
        assert_eq!(out.courses[0].name, "Name");
        assert_eq!(out.courses[0].description, "Longer continuation");
    }

    // ============================================================================
    // Fields
    // ============================================================================

    #[test]
    fn test_scenario_prerequisite_edges() {
        let out = extract(SCENARIO);

        assert_eq!(out.courses.len(), 1);
        let course = &out.courses[0];
        assert_eq!(course.code, "ABCD01H3Y");
        assert_eq!(
            course.description,
            "This course covers a great many things in considerable depth and at length."
        );
        assert_eq!(course.prerequisite_description, "ABCD02H3, ABCD03H3");
        assert_eq!(
            out.prerequisites,
            vec![
                Requisite::new("ABCD02H3", "ABCD01H3Y"),
                Requisite::new("ABCD03H3", "ABCD01H3Y"),
            ]
        );
        assert!(out.corequisites.is_empty());
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_every_field_is_routed() {
        let text = "ABCD01H3: Everything\n\
            Description body that is long enough to not be part of the name.\n\
            Exclusion: WXYZ01H3\n\
            Breadth Requirements: Quantitative Reasoning\n\
            Course Experience: University-Based\n\
            Experience\n\
            Recommended Preparation: Grade 12 math\n\
            Corequisite: ABCD05H3\n\
            Note: Offered in the\nfall only\n\
            Link to UTSC Timetable\n";
        let out = extract(text);
        let course = &out.courses[0];

        assert_eq!(course.exclusion_description, "WXYZ01H3");
        assert_eq!(course.breadth_requirement, Some(BreadthRequirement::Quant));
        assert_eq!(course.course_experience, "University-Based Experience");
        assert_eq!(course.recommended_preparation, "Grade 12 math");
        assert_eq!(course.corequisite_description, "ABCD05H3");
        assert_eq!(course.note, "Offered in the fall only");
        assert_eq!(
            out.corequisites,
            vec![Requisite::new("ABCD05H3", "ABCD01H3")]
        );
        assert!(out.prerequisites.is_empty());
    }

    #[test]
    fn test_exclusion_codes_are_not_edges() {
        let text = "ABCD01H3: Name\nExclusion: ABCD09H3\nLink to UTSC Timetable\n";
        let out = extract(text);
        assert!(out.prerequisites.is_empty());
        assert!(out.corequisites.is_empty());
    }

    #[test]
    fn test_section_without_fields() {
        let text = "ABCD01H3: Bare Course\n\
            Just a description that goes on for a while without any fields.\n\
            Link to UTSC Timetable\n";
        let out = extract(text);
        let course = &out.courses[0];

        assert_eq!(course.name, "Bare Course");
        assert_eq!(
            course.description,
            "Just a description that goes on for a while without any fields."
        );
        assert_eq!(course.breadth_requirement, None);
        assert_eq!(course.prerequisite_description, "");
        assert_eq!(course.note, "");
    }

    #[test]
    fn test_unknown_breadth_requirement_is_reported() {
        let text = "ABCD01H3: Name\nBreadth Requirements: Astrology\nLink to UTSC Timetable\n";
        let out = extract(text);

        assert_eq!(out.courses[0].breadth_requirement, None);
        assert_eq!(
            out.diagnostics,
            vec![Diagnostic::UnknownBreadthRequirement {
                course: "ABCD01H3".to_string(),
                value: "Astrology".to_string(),
            }]
        );
    }

    #[test]
    fn test_invalid_field_is_reported_and_skipped() {
        let config = CatalogConfig::default()
            .with_field_pattern(r"(Prerequisite|Enrolment Limits):")
            .unwrap();
        let text = "ABCD01H3: Name\n\
            Enrolment Limits: 40\n\
            Prerequisite: ABCD02H3\n\
            Link to UTSC Timetable\n";
        let out = extract_catalog([text], &config);

        assert_eq!(out.courses.len(), 1);
        assert_eq!(out.courses[0].prerequisite_description, "ABCD02H3");
        assert_eq!(
            out.diagnostics,
            vec![Diagnostic::InvalidField {
                course: "ABCD01H3".to_string(),
                label: "Enrolment Limits".to_string(),
            }]
        );
    }

    // ============================================================================
    // extract_catalog
    // ============================================================================

    #[test]
    fn test_extract_catalog_keeps_region_order() {
        let left = "ABCD01H3: Left\nLink to UTSC Timetable\n";
        let right = "ABCD02H3: Right\nLink to UTSC Timetable\n";
        let out = extract_catalog([left, "", right], &CatalogConfig::default());

        let codes: Vec<&str> = out.courses.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["ABCD01H3", "ABCD02H3"]);
    }

    #[test]
    fn test_extract_catalog_keeps_duplicates() {
        let region = "ABCD01H3: Name\nLink to UTSC Timetable\n";
        let out = extract_catalog([region, region], &CatalogConfig::default());
        assert_eq!(out.courses.len(), 2);
    }

    #[test]
    fn test_custom_trailer() {
        let config = CatalogConfig {
            trailer: "--- end ---".to_string(),
            ..Default::default()
        };
        let text = "ABCD01H3: Name\nPrerequisite: ABCD02H3\n--- end ---\n";
        let out = extract_catalog([text], &config);
        assert_eq!(out.prerequisites.len(), 1);
    }
}
