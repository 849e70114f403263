//! Text extraction and line grouping.
//!
//! ```text
//! content ops  ->  TextSpan[]  ->  TextLine[]
//!   (per page)      extract         group_spans_into_lines
//! ```
//!
//! Spans come out of the content stream in PDF user space (origin at the
//! bottom-left) and are flipped to top-down coordinates before anything else
//! sees them, so `y` grows down the page like reading order does.

use serde::Serialize;

use super::backend::{Operand, PageFont, PageId, PdfBackend};
use crate::cleanup::clean_span_text;
use crate::PdfError;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A single run of text at a specific position on the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextSpan {
    pub text: String,
    /// Left edge of the run.
    pub x: f32,
    /// Baseline, measured from the top of the page.
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
    pub font_name: String,
}

impl TextSpan {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Spans that share (approximately) the same baseline, left to right.
#[derive(Debug, Clone, Default)]
pub struct TextLine {
    pub spans: Vec<TextSpan>,
    pub y: f32,
    pub x: f32,
}

impl TextLine {
    /// Concatenate all span texts with a single space separator.
    pub fn text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Spans whose baselines differ by at most this many points share a line.
const Y_TOLERANCE: f32 = 2.0;

/// Approximate glyph width as a fraction of font size. The font widths
/// arrays are not consulted.
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Gap (in points) under which two spans on a line are glued without a space.
const MIN_WORD_GAP: f32 = 1.5;

// ---------------------------------------------------------------------------
// Internal: PDF text-state machine
// ---------------------------------------------------------------------------

/// The identity 2x3 text matrix: [a, b, c, d, tx, ty].
const IDENTITY_MATRIX: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

#[derive(Debug, Clone)]
struct TextState {
    font_key: Vec<u8>,
    font_name: String,
    font_size: f32,
    text_matrix: [f32; 6],
    line_matrix: [f32; 6],
    horiz_scale: f32,
    char_spacing: f32,
    word_spacing: f32,
    text_rise: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 0.0,
            text_matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn x(&self) -> f32 {
        self.text_matrix[4]
    }

    fn y(&self) -> f32 {
        self.text_matrix[5] + self.text_rise
    }

    /// `font_size * sqrt(b^2 + d^2)` from the text matrix.
    fn effective_font_size(&self) -> f32 {
        let scale = (self.text_matrix[1].powi(2) + self.text_matrix[3].powi(2)).sqrt();
        (self.font_size * scale).abs()
    }

    fn char_width(&self) -> f32 {
        self.font_size * APPROX_CHAR_WIDTH_RATIO * self.horiz_scale
    }

    fn advance_x(&mut self, dx: f32) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    /// `Td`: translate the line matrix and reset the text matrix to it.
    fn translate_line(&mut self, tx: f32, ty: f32) {
        let new_tx = self.line_matrix[0] * tx + self.line_matrix[2] * ty + self.line_matrix[4];
        let new_ty = self.line_matrix[1] * tx + self.line_matrix[3] * ty + self.line_matrix[5];
        self.line_matrix[4] = new_tx;
        self.line_matrix[5] = new_ty;
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }

    /// Width of `text` in user space, scaled by the text matrix.
    fn text_width(&self, text: &str) -> f32 {
        let n = text.chars().count() as f32;
        n * self.char_width() * self.text_matrix[0].abs().max(f32::EPSILON)
    }

    /// Move past `text` after it has been shown.
    fn advance_after_show(&mut self, text: &str) {
        let dx: f32 = text
            .chars()
            .map(|ch| {
                let spacing = if ch == ' ' { self.word_spacing } else { 0.0 };
                self.char_width() + self.char_spacing + spacing
            })
            .sum();
        self.advance_x(dx);
    }
}

fn decode_string(
    val: &Operand,
    backend: &dyn PdfBackend,
    page_id: PageId,
    font_key: &[u8],
) -> String {
    match val {
        Operand::Str(bytes) => backend.decode_text(page_id, font_key, bytes),
        _ => String::new(),
    }
}

fn number(operands: &[Operand], idx: usize) -> Option<f32> {
    operands.get(idx).and_then(Operand::as_number)
}

// ---------------------------------------------------------------------------
// Public API: span extraction
// ---------------------------------------------------------------------------

/// Walk a page's content stream and emit one [`TextSpan`] per text-showing
/// operator (one per contiguous run for `TJ`).
///
/// Positions are in PDF user space; see [`to_top_down`].
///
/// | Operator | Action |
/// |----------|--------|
/// | `BT`     | Begin text object, reset matrices |
/// | `Tf`     | Set font and size |
/// | `Tm`     | Set text matrix |
/// | `Td` `TD` `T*` | Move to a new line |
/// | `TL` `Tc` `Tw` `Tz` `Ts` | Text state parameters |
/// | `Tj` `TJ` `'` `"` | Show text |
pub fn extract_page_spans(
    backend: &dyn PdfBackend,
    page_id: PageId,
) -> Result<Vec<TextSpan>, PdfError> {
    let ops = backend.page_ops(page_id)?;
    let fonts = backend.page_fonts(page_id).unwrap_or_default();

    let mut state = TextState::default();
    let mut spans: Vec<TextSpan> = Vec::new();

    for op in &ops {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "BT" => {
                state.text_matrix = IDENTITY_MATRIX;
                state.line_matrix = IDENTITY_MATRIX;
            }
            "Tf" => handle_tf(operands, &fonts, &mut state),
            "Tm" => {
                let vals: Vec<f32> = operands.iter().filter_map(Operand::as_number).collect();
                if vals.len() >= 6 {
                    state.text_matrix = [vals[0], vals[1], vals[2], vals[3], vals[4], vals[5]];
                    state.line_matrix = state.text_matrix;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (number(operands, 0), number(operands, 1)) {
                    state.translate_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (number(operands, 0), number(operands, 1)) {
                    state.leading = -ty;
                    state.translate_line(tx, ty);
                }
            }
            "T*" => state.next_line(),
            "TL" => state.leading = number(operands, 0).unwrap_or(state.leading),
            "Tc" => state.char_spacing = number(operands, 0).unwrap_or(state.char_spacing),
            "Tw" => state.word_spacing = number(operands, 0).unwrap_or(state.word_spacing),
            "Tz" => {
                if let Some(v) = number(operands, 0) {
                    state.horiz_scale = v / 100.0;
                }
            }
            "Ts" => state.text_rise = number(operands, 0).unwrap_or(state.text_rise),
            "Tj" => {
                if let Some(first) = operands.first() {
                    show_string(first, backend, page_id, &mut state, &mut spans);
                }
            }
            "TJ" => {
                if let Some(Operand::Array(arr)) = operands.first() {
                    show_tj_array(arr, backend, page_id, &mut state, &mut spans);
                }
            }
            "'" => {
                state.next_line();
                if let Some(first) = operands.first() {
                    show_string(first, backend, page_id, &mut state, &mut spans);
                }
            }
            "\"" => {
                if operands.len() >= 3 {
                    state.word_spacing = number(operands, 0).unwrap_or(state.word_spacing);
                    state.char_spacing = number(operands, 1).unwrap_or(state.char_spacing);
                    state.next_line();
                    show_string(&operands[2], backend, page_id, &mut state, &mut spans);
                }
            }
            _ => {}
        }
    }

    Ok(spans)
}

fn handle_tf(operands: &[Operand], fonts: &[PageFont], state: &mut TextState) {
    let key = match operands.first() {
        Some(Operand::Name(n)) => n.clone(),
        _ => return,
    };
    state.font_size = number(operands, 1).unwrap_or(0.0);
    state.font_name = fonts
        .iter()
        .find(|font| font.key == key)
        .and_then(|font| font.base_font.clone())
        .unwrap_or_else(|| String::from_utf8_lossy(&key).into_owned());
    state.font_key = key;
}

fn push_span(text: &str, x: f32, y: f32, state: &TextState, spans: &mut Vec<TextSpan>) {
    let text = clean_span_text(text.trim_end());
    if text.trim().is_empty() {
        return;
    }
    spans.push(TextSpan {
        width: state.text_width(&text),
        text,
        x,
        y,
        font_size: state.effective_font_size(),
        font_name: state.font_name.clone(),
    });
}

fn show_string(
    operand: &Operand,
    backend: &dyn PdfBackend,
    page_id: PageId,
    state: &mut TextState,
    spans: &mut Vec<TextSpan>,
) {
    let text = decode_string(operand, backend, page_id, &state.font_key);
    if text.is_empty() {
        return;
    }
    push_span(&text, state.x(), state.y(), state, spans);
    state.advance_after_show(&text);
}

/// A `TJ` array mixes strings with kerning adjustments in thousandths of a
/// text-space unit. A large negative adjustment reads as a word gap.
fn show_tj_array(
    arr: &[Operand],
    backend: &dyn PdfBackend,
    page_id: PageId,
    state: &mut TextState,
    spans: &mut Vec<TextSpan>,
) {
    let mut buf = String::new();
    let mut span_x = state.x();
    let span_y = state.y();

    for elem in arr {
        match elem {
            Operand::Str(_) => {
                let fragment = decode_string(elem, backend, page_id, &state.font_key);
                if buf.is_empty() {
                    span_x = state.x();
                }
                buf.push_str(&fragment);
                state.advance_after_show(&fragment);
            }
            val => {
                if let Some(adj) = val.as_number() {
                    let dx = -adj / 1000.0 * state.font_size * state.horiz_scale;
                    if dx > state.char_width() * 0.3 && !buf.is_empty() && !buf.ends_with(' ') {
                        buf.push(' ');
                    }
                    state.advance_x(dx);
                }
            }
        }
    }

    push_span(&buf, span_x, span_y, state, spans);
}

/// Flip spans from PDF user space to top-down page coordinates.
pub fn to_top_down(spans: Vec<TextSpan>, page_height: f32) -> Vec<TextSpan> {
    spans
        .into_iter()
        .map(|span| TextSpan {
            y: page_height - span.y,
            ..span
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Public API: span -> line grouping
// ---------------------------------------------------------------------------

fn cmp_f32(a: f32, b: f32) -> std::cmp::Ordering {
    a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
}

/// Group spans into lines, top to bottom.
///
/// Spans whose baselines are within [`Y_TOLERANCE`] points of the first span
/// of the line are placed on it.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    spans.sort_by(|a, b| cmp_f32(a.y, b.y).then(cmp_f32(a.x, b.x)));

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();

    for span in spans {
        if let Some(first) = current.first() {
            if (span.y - first.y).abs() > Y_TOLERANCE {
                lines.push(assemble_line(std::mem::take(&mut current)));
            }
        }
        current.push(span);
    }

    if !current.is_empty() {
        lines.push(assemble_line(current));
    }

    lines
}

/// Build a line from spans on the same baseline, gluing runs that touch.
fn assemble_line(mut spans: Vec<TextSpan>) -> TextLine {
    spans.sort_by(|a, b| cmp_f32(a.x, b.x));

    let mut merged: Vec<TextSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        if let Some(prev) = merged.last_mut() {
            let gap = span.x - prev.right();
            if gap < MIN_WORD_GAP && gap > -prev.font_size {
                prev.text.push_str(&span.text);
                prev.width = span.right() - prev.x;
                continue;
            }
        }
        merged.push(span);
    }

    TextLine {
        y: merged.first().map_or(0.0, |s| s.y),
        x: merged.first().map_or(0.0, |s| s.x),
        spans: merged,
    }
}
