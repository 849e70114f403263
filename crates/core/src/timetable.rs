//! Timetable extraction.
//!
//! The timetable PDF lists courses as numbered lines (`12. ABCD01H3Y ...`),
//! each followed by a table of meetings. Tables are detected per page by the
//! PDF layer; this module only sees text lines and string grids, so it can
//! be driven from any table source.
//!
//! Extraction is a fold over pages. The state carried between pages is the
//! current course code and the last table of the previous page, which is
//! enough to continue a table that overflows onto the next page.

use std::sync::OnceLock;

use regex::Regex;

use crate::codes::find_listed_course_code;
use crate::diagnostics::Diagnostic;
use crate::mapping::{DeliveryMode, parse_waitlist};

/// One table row. `None` is a cell with no text, `Some("")` a blank cell.
pub type Row = Vec<Option<String>>;

/// A detected table, top row first.
pub type Table = Vec<Row>;

/// Header text that opens a meeting table, compared after removing
/// whitespace and uppercasing.
pub const TABLE_START_INDICATORS: &[&str] = &["MEETINGSECTION", "MEETING"];

const WEEKDAYS: &[&str] = &["MO", "TU", "WE", "TH", "FR", "SA", "SU"];

const BLOB_ROW_END: &str = "Add to";

/// Private-use glyph the timetable font renders as a bullet.
const BULLET_GLYPH: char = '\u{f067}';

fn blob_row_start_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\n(?:\b(?:LEC|TUT|PRA)\d{2,4}\b|\b(?:MO|TU|WE|TH|FR|SA|SU)\b)").unwrap()
    })
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimetableConfig {
    /// Cells a row (and a table's first row) needs to count as a meeting
    /// row.
    pub min_table_columns: usize,
    /// Rows above the current one searched for a meeting section.
    pub lookback: usize,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        Self {
            min_table_columns: 10,
            lookback: 3,
        }
    }
}

/// The text lines and detected tables of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimetablePage {
    pub lines: Vec<String>,
    pub tables: Vec<Table>,
}

/// One row of `offerings_<session>.csv`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Offering {
    pub course_code: String,
    pub meeting_section: String,
    /// Session label, e.g. `Winter 2026`.
    pub offering: String,
    pub day: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub location: Option<String>,
    pub current: Option<String>,
    pub max: Option<String>,
    pub is_waitlisted: Option<bool>,
    pub delivery_mode: Option<DeliveryMode>,
    pub instructor: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TimetableExtraction {
    pub offerings: Vec<Offering>,
    pub diagnostics: Vec<Diagnostic>,
}

impl TimetableExtraction {
    pub fn extend(&mut self, other: TimetableExtraction) {
        self.offerings.extend(other.offerings);
        self.diagnostics.extend(other.diagnostics);
    }
}

/// State threaded from one page to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimetableState {
    /// Last course code seen in a listing line.
    pub current_code: String,
    /// Last table of the previous page, empty if it had none.
    pub previous_page_table: Table,
}

// ---------------------------------------------------------------------------
// Page scanning
// ---------------------------------------------------------------------------

/// Whether `text` opens a meeting table (`Meeting Section`, `MEETING`, ...).
pub fn is_table_header(text: &str) -> bool {
    let squashed: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    TABLE_START_INDICATORS
        .iter()
        .any(|indicator| squashed.starts_with(indicator))
}

/// A page starts with an overflow table when a table header shows up before
/// any course listing line.
pub fn page_has_overflow_table<S: AsRef<str>>(lines: &[S]) -> bool {
    for line in lines {
        let line = line.as_ref();
        if find_listed_course_code(line).is_some() {
            return false;
        }
        if is_table_header(line) {
            return true;
        }
    }
    false
}

/// Index of the first table at or after `cursor` whose first row has at
/// least `min_columns` cells. Falls back to `cursor` when none does.
pub fn next_wide_table(tables: &[Table], cursor: usize, min_columns: usize) -> usize {
    tables
        .iter()
        .enumerate()
        .skip(cursor)
        .find(|(_, table)| table.first().is_some_and(|row| row.len() >= min_columns))
        .map_or(cursor, |(i, _)| i)
}

// ---------------------------------------------------------------------------
// Row decoding
// ---------------------------------------------------------------------------

/// Meeting section for row `idx` of `table`.
///
/// Continuation rows leave the first cell blank, so the search walks up to
/// `lookback` rows back through `previous ++ table` and takes the first
/// non-blank, non-header first cell. Empty when there is none.
pub fn find_meeting_section(
    previous: &[Row],
    table: &[Row],
    idx: usize,
    lookback: usize,
) -> String {
    let position = previous.len() + idx;

    for offset in 0..=lookback {
        let Some(pos) = position.checked_sub(offset) else {
            break;
        };
        let row = if pos < previous.len() {
            &previous[pos]
        } else {
            match table.get(pos - previous.len()) {
                Some(row) => row,
                None => continue,
            }
        };
        if let Some(Some(first)) = row.first() {
            let section = first.replace('\n', "");
            if !section.trim().is_empty() && !is_table_header(&section) {
                return section;
            }
        }
    }

    String::new()
}

fn cell(row: &[Option<String>], idx: usize) -> Option<String> {
    row.get(idx)
        .and_then(|c| c.as_deref())
        .map(|c| c.replace('\n', ""))
        .filter(|c| !c.is_empty())
}

/// Build an offering from cells laid out as section, day, start, end,
/// location, current, max, waitlist, delivery mode, instructor, notes.
fn decode_row(
    cells: &[Option<String>],
    course_code: &str,
    meeting_section: String,
    session: &str,
    out: &mut TimetableExtraction,
) {
    let delivery_mode = cell(cells, 8).and_then(|value| {
        let mode = DeliveryMode::from_label(&value);
        if mode.is_none() {
            out.diagnostics.push(Diagnostic::UnknownDeliveryMode {
                course: course_code.to_string(),
                value,
            });
        }
        mode
    });

    out.offerings.push(Offering {
        course_code: course_code.to_string(),
        meeting_section,
        offering: session.to_string(),
        day: cell(cells, 1),
        start: cell(cells, 2),
        end: cell(cells, 3),
        location: cell(cells, 4),
        current: cell(cells, 5),
        max: cell(cells, 6),
        is_waitlisted: parse_waitlist(cell(cells, 7).as_deref()),
        delivery_mode,
        instructor: cell(cells, 9),
        notes: cell(cells, 10),
    });
}

fn is_blob_table(table: &[Row]) -> bool {
    matches!(
        table.first().and_then(|row| row.first()),
        Some(Some(first)) if first.trim().is_empty()
    )
}

/// Decode a table into offerings for `course_code`.
///
/// `previous` is the table read just before this one; it is only used for
/// the meeting-section lookback. Tables whose first cell is blank carry
/// their rows as text blobs and go through [`decode_blob_table`].
pub fn decode_table(
    table: &[Row],
    previous: &[Row],
    course_code: &str,
    session: &str,
    config: &TimetableConfig,
) -> TimetableExtraction {
    if is_blob_table(table) {
        return decode_blob_table(table, course_code, session);
    }

    let mut out = TimetableExtraction::default();

    for (idx, row) in table.iter().enumerate() {
        if matches!(row.first(), Some(Some(first)) if is_table_header(first)) {
            continue;
        }
        if row.len() < config.min_table_columns {
            out.diagnostics.push(Diagnostic::ShortRow {
                course: course_code.to_string(),
                fields: row.len(),
            });
            continue;
        }

        let section = find_meeting_section(previous, table, idx, config.lookback);
        decode_row(row, course_code, section, session, &mut out);
    }

    out
}

/// Fold multi-word values back into single tokens.
///
/// `Available on ACORN` sits in the location slot and `Online - X` in the
/// delivery mode slot.
fn join_split_values(tokens: &mut Vec<String>) {
    if tokens.len() > 6 && tokens[4] == "Available" {
        let joined = tokens[4..7].join(" ");
        tokens.splice(4..7, [joined]);
    }
    if tokens.len() > 10 && tokens[8] == "Online" && tokens[9] == "-" {
        let joined = tokens[8..11].join(" ");
        tokens.splice(8..11, [joined]);
    }
}

/// Decode a table whose cells hold whole meeting listings as raw text.
///
/// Each row inside a cell starts at a line beginning with a section name or
/// a weekday and ends at the `Add to` button label. Rows that start with a
/// weekday belong to the section of the row above.
pub fn decode_blob_table(table: &[Row], course_code: &str, session: &str) -> TimetableExtraction {
    let mut out = TimetableExtraction::default();

    for text in table.iter().flatten().flatten() {
        if text.is_empty() {
            continue;
        }

        let starts = blob_row_start_regex().find_iter(text).map(|m| m.start() + 1);
        let ends = text.match_indices(BLOB_ROW_END).map(|(i, _)| i);
        let mut previous_section = String::new();

        for (start, end) in starts.zip(ends) {
            if end <= start {
                continue;
            }

            let span = text[start..end].replace(BULLET_GLYPH, " ");
            let mut tokens: Vec<String> = span.split_whitespace().map(str::to_string).collect();

            if tokens
                .first()
                .is_some_and(|first| WEEKDAYS.contains(&first.as_str()))
            {
                tokens.insert(0, String::new());
            }

            join_split_values(&mut tokens);

            if tokens.len() < 10 {
                out.diagnostics.push(Diagnostic::ShortRow {
                    course: course_code.to_string(),
                    fields: tokens.len(),
                });
                continue;
            }

            let section = if tokens[0].is_empty() {
                previous_section.clone()
            } else {
                tokens[0].clone()
            };
            previous_section = section.clone();

            let instructor = tokens[9..tokens.len().min(11)].join(" ");
            let notes = tokens.get(11..).map(|rest| rest.join(" ")).unwrap_or_default();

            let mut cells: Row = tokens[..9].iter().cloned().map(Some).collect();
            cells.push(Some(instructor));
            cells.push(Some(notes));

            decode_row(&cells, course_code, section, session, &mut out);
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Page fold
// ---------------------------------------------------------------------------

/// Incremental timetable extraction, one page at a time.
#[derive(Debug, Clone)]
pub struct TimetableExtractor {
    session: String,
    config: TimetableConfig,
    state: TimetableState,
    out: TimetableExtraction,
}

impl TimetableExtractor {
    pub fn new(session: impl Into<String>, config: TimetableConfig) -> Self {
        Self {
            session: session.into(),
            config,
            state: TimetableState::default(),
            out: TimetableExtraction::default(),
        }
    }

    pub fn state(&self) -> &TimetableState {
        &self.state
    }

    /// Consume one page.
    ///
    /// An overflow table at the top of the page continues the previous
    /// course. Each listing line then claims the next wide table from the
    /// page's read cursor.
    pub fn push_page(&mut self, page: &TimetablePage) {
        let tables = &page.tables;
        let mut cursor = 0;

        if let (true, Some(first)) = (page_has_overflow_table(&page.lines), tables.first()) {
            self.out.extend(decode_table(
                first,
                &self.state.previous_page_table,
                &self.state.current_code,
                &self.session,
                &self.config,
            ));
            cursor += 1;
        }

        for line in &page.lines {
            let Some(code) = find_listed_course_code(line) else {
                continue;
            };
            self.state.current_code = code.to_string();

            if cursor >= tables.len() {
                continue;
            }
            cursor = next_wide_table(tables, cursor, self.config.min_table_columns);

            let previous = match cursor {
                0 => &self.state.previous_page_table,
                n => &tables[n - 1],
            };
            self.out.extend(decode_table(
                &tables[cursor],
                previous,
                &self.state.current_code,
                &self.session,
                &self.config,
            ));
            cursor += 1;
        }

        self.state.previous_page_table = tables.last().cloned().unwrap_or_default();
    }

    pub fn finish(self) -> TimetableExtraction {
        self.out
    }
}

/// Extract every offering from a sequence of pages with the default layout.
pub fn extract_timetable<'a, I>(pages: I, session: &str) -> TimetableExtraction
where
    I: IntoIterator<Item = &'a TimetablePage>,
{
    let mut extractor = TimetableExtractor::new(session, TimetableConfig::default());
    for page in pages {
        extractor.push_page(page);
    }
    extractor.finish()
}
