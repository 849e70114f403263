//! Course-code patterns.
//!
//! Codes look like `ABCD01H3` or `ABCD01H3Y`: four letters, two or three
//! digits, then an optional campus/weight suffix.

use std::sync::OnceLock;

use regex::Regex;

/// A catalog section header: the course code followed by a colon.
pub fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Z]{4}\d{2,3}[A-Z]?\d?[A-Z]?:").unwrap())
}

/// A code referenced from free text (prerequisites, corequisites).
pub fn requisite_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Z]{4}\d{2,3}[A-Z]?\d?").unwrap())
}

/// A numbered timetable listing such as `12. ABCD01H3Y ...`.
fn listing_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\.\s+([A-Z]{4}\d{2,3}[A-Z]?\d?[A-Z]?)").unwrap())
}

/// Every course code mentioned in `text`, in order of appearance.
///
/// Requisite fields are boolean combinations written as prose
/// (`ABCD01H3 and [ABCD02H3 or ABCD03H3]`); no attempt is made to parse the
/// logic, each referenced code is reported once per mention.
pub fn requisite_codes(text: &str) -> Vec<&str> {
    requisite_regex()
        .find_iter(text)
        .map(|m| m.as_str())
        .collect()
}

/// The course code of a numbered timetable listing line, if the line has one.
pub fn find_listed_course_code(line: &str) -> Option<&str> {
    listing_regex()
        .captures(line)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}
