//! Table detection from text alignment.
//!
//! Timetable PDFs draw their grids as background fills that carry no
//! structure in the content stream, so tables are recovered from where the
//! text sits:
//!
//! 1. Spans are grouped into rows by baseline.
//! 2. Consecutive rows with at least `min_columns` separate cells form a
//!    band. A short, indented row right below a band row is a wrapped cell
//!    and stays in the band.
//! 3. Columns are anchored on the widest row of the band, plus any x
//!    position that enough rows align on.
//! 4. Every band row becomes a grid row; wrapped rows are folded into the
//!    cells above them with `\n`.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::layout::TextSpan;
use crate::geometry::BBox;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// A detected table. A row's empty cells left of its last text are
/// `Some("")`; cells right of it are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub bbox: BBox,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Spans sharing a baseline, already merged into cells.
#[derive(Debug, Clone)]
pub struct TableRowData {
    pub y: f32,
    pub font_size: f32,
    pub cells: Vec<TextSpan>,
}

/// Tuning knobs for the table detection heuristic.
#[derive(Debug, Clone)]
pub struct TableSettings {
    /// Rows with `min_columns` cells a band needs to be kept.
    pub min_rows: usize,
    /// Cells a row needs to open or extend a band.
    pub min_columns: usize,
    /// `y_tolerance = median_font_size * factor` when grouping rows.
    pub y_tolerance_factor: f32,
    /// Fraction of rows that must start a cell at an x position for it to
    /// become a column even when the widest row has nothing there.
    pub min_alignment_ratio: f32,
    /// Minimum horizontal distance (in points) between two columns. Runs on
    /// a row closer than half of this are one cell.
    pub min_column_gap: f32,
    /// A vertical gap larger than this multiple of the font size closes a
    /// band.
    pub max_row_gap_factor: f32,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 3,
            y_tolerance_factor: 0.3,
            min_alignment_ratio: 0.5,
            min_column_gap: 10.0,
            max_row_gap_factor: 2.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Table detection pipeline
// ---------------------------------------------------------------------------

/// Detect every table on a page, top to bottom.
pub fn detect_tables(spans: &[TextSpan], settings: &TableSettings) -> Vec<Table> {
    if spans.is_empty() {
        return Vec::new();
    }

    let y_tolerance = compute_y_tolerance(spans, settings.y_tolerance_factor);
    let rows = group_into_rows(spans, y_tolerance, settings.min_column_gap / 2.0);

    find_bands(&rows, settings)
        .into_iter()
        .filter_map(|band| band_to_table(&band, settings))
        .collect()
}

fn cmp_f32(a: f32, b: f32) -> std::cmp::Ordering {
    a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
}

/// Group spans into rows by baseline, top to bottom, merging runs on a row
/// that are closer than `cell_gap` into one cell.
pub fn group_into_rows(spans: &[TextSpan], y_tolerance: f32, cell_gap: f32) -> Vec<TableRowData> {
    let mut sorted: Vec<&TextSpan> = spans.iter().collect();
    sorted.sort_by(|a, b| cmp_f32(a.y, b.y).then_with(|| cmp_f32(a.x, b.x)));

    let mut groups: Vec<Vec<TextSpan>> = Vec::new();
    let mut current_y = f32::NEG_INFINITY;

    for span in sorted {
        if (span.y - current_y).abs() > y_tolerance {
            current_y = span.y;
            groups.push(Vec::new());
        }
        if let Some(group) = groups.last_mut() {
            group.push(span.clone());
        }
    }

    groups
        .into_iter()
        .map(|group| build_row(group, cell_gap))
        .collect()
}

fn build_row(mut spans: Vec<TextSpan>, cell_gap: f32) -> TableRowData {
    spans.sort_by(|a, b| cmp_f32(a.x, b.x));

    let y = spans.iter().map(|s| s.y).sum::<f32>() / spans.len() as f32;
    let font_size = spans.iter().map(|s| s.font_size).fold(0.0, f32::max);

    let mut cells: Vec<TextSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        if let Some(prev) = cells.last_mut() {
            if span.x - prev.right() < cell_gap {
                prev.text.push(' ');
                prev.text.push_str(span.text.trim());
                prev.width = span.right().max(prev.right()) - prev.x;
                continue;
            }
        }
        cells.push(span);
    }

    TableRowData {
        y,
        font_size,
        cells,
    }
}

/// Runs of rows that look like one table.
fn find_bands(rows: &[TableRowData], settings: &TableSettings) -> Vec<Vec<TableRowData>> {
    let mut bands: Vec<Vec<TableRowData>> = Vec::new();
    let mut current: Vec<TableRowData> = Vec::new();

    for row in rows {
        let wide = row.cells.len() >= settings.min_columns;

        let extends = current.last().is_some_and(|prev| {
            let gap = row.y - prev.y;
            let close = gap <= prev.font_size.max(row.font_size) * settings.max_row_gap_factor;
            close && (wide || is_wrapped_row(row, &current, settings))
        });

        if !extends {
            flush_band(&mut current, &mut bands, settings);
            if wide {
                current.push(row.clone());
            }
            continue;
        }

        current.push(row.clone());
    }

    flush_band(&mut current, &mut bands, settings);
    bands
}

/// A short row whose cells all sit right of the band's first column.
fn is_wrapped_row(row: &TableRowData, band: &[TableRowData], settings: &TableSettings) -> bool {
    let left = band
        .iter()
        .filter_map(|r| r.cells.first())
        .map(|c| c.x)
        .fold(f32::INFINITY, f32::min);

    !row.cells.is_empty()
        && row
            .cells
            .iter()
            .all(|cell| cell.x >= left + settings.min_column_gap)
}

fn flush_band(
    current: &mut Vec<TableRowData>,
    bands: &mut Vec<Vec<TableRowData>>,
    settings: &TableSettings,
) {
    let band = std::mem::take(current);
    let wide_rows = band
        .iter()
        .filter(|r| r.cells.len() >= settings.min_columns)
        .count();
    if wide_rows >= settings.min_rows {
        bands.push(band);
    }
}

/// Column anchors for a band.
///
/// The widest row (normally the header) gives the base columns. X positions
/// shared by at least `min_alignment_ratio` of the rows are added when no
/// anchor is within `min_column_gap` of them.
pub fn detect_columns(rows: &[TableRowData], settings: &TableSettings) -> Vec<f32> {
    let Some(widest) = rows.iter().max_by_key(|r| r.cells.len()) else {
        return Vec::new();
    };
    let mut columns: Vec<f32> = widest.cells.iter().map(|c| c.x).collect();

    // One vote per row per integer x bucket.
    let mut x_freq: BTreeMap<i32, (f32, usize)> = BTreeMap::new();
    for row in rows {
        let mut seen: HashSet<i32> = HashSet::new();
        for cell in &row.cells {
            let bucket = cell.x.round() as i32;
            if seen.insert(bucket) {
                let entry = x_freq.entry(bucket).or_insert((0.0, 0));
                entry.0 += cell.x;
                entry.1 += 1;
            }
        }
    }

    let min_count = (rows.len() as f32 * settings.min_alignment_ratio).ceil() as usize;
    for (sum, count) in x_freq.values() {
        let x = sum / *count as f32;
        if *count >= min_count
            && columns
                .iter()
                .all(|&col| (col - x).abs() >= settings.min_column_gap)
        {
            columns.push(x);
        }
    }

    columns.sort_by(|a, b| cmp_f32(*a, *b));
    columns
}

/// Column index for a cell starting at `x`: the rightmost column starting at
/// or before it, with a little slack for ragged alignment.
fn assign_column(x: f32, columns: &[f32], slack: f32) -> usize {
    columns
        .iter()
        .rposition(|&col| col <= x + slack)
        .unwrap_or(0)
}

fn band_to_table(band: &[TableRowData], settings: &TableSettings) -> Option<Table> {
    let columns = detect_columns(band, settings);
    if columns.len() < settings.min_columns {
        return None;
    }

    let slack = settings.min_column_gap / 2.0;
    let mut rows: Vec<Vec<Option<String>>> = Vec::new();

    for row in band {
        let wrapped = row.cells.len() < settings.min_columns;
        if !wrapped || rows.is_empty() {
            rows.push(vec![None; columns.len()]);
        }
        let Some(target) = rows.last_mut() else {
            continue;
        };

        for cell in &row.cells {
            let col = assign_column(cell.x, &columns, slack);
            let text = cell.text.trim();
            let separator = if wrapped { '\n' } else { ' ' };
            match &mut target[col] {
                Some(existing) if !existing.is_empty() => {
                    existing.push(separator);
                    existing.push_str(text);
                }
                slot => *slot = Some(text.to_string()),
            }
        }

        if !wrapped {
            mark_blank_cells(target);
        }
    }

    let x0 = band
        .iter()
        .flat_map(|r| r.cells.iter().map(|c| c.x))
        .fold(f32::INFINITY, f32::min);
    let x1 = band
        .iter()
        .flat_map(|r| r.cells.iter().map(TextSpan::right))
        .fold(f32::NEG_INFINITY, f32::max);
    let top = band.first().map_or(0.0, |r| r.y - r.font_size);
    let bottom = band.last().map_or(0.0, |r| r.y);

    Some(Table {
        bbox: BBox::new(x0, top, x1, bottom),
        rows,
    })
}

/// Empty slots left of the row's last text are blank cells of the row.
/// Slots past it stay `None`.
fn mark_blank_cells(row: &mut [Option<String>]) {
    let Some(last) = row.iter().rposition(Option::is_some) else {
        return;
    };
    for slot in &mut row[..last] {
        slot.get_or_insert_with(String::new);
    }
}

/// Median font size times `factor`, never below one point.
fn compute_y_tolerance(spans: &[TextSpan], factor: f32) -> f32 {
    let mut sizes: Vec<f32> = spans.iter().map(|s| s.font_size).collect();
    sizes.sort_by(|a, b| cmp_f32(*a, *b));
    let median = sizes[sizes.len() / 2];
    (median * factor).max(1.0)
}
