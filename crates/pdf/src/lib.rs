//! Text-layer access to PDF pages.
//!
//! A [`Document`] yields [`Page`]s whose spans are in top-down page
//! coordinates. A page can be cropped to a box, split into its left and
//! right halves, read back as plain text, or searched for tables.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use parser::backend::{LopdfBackend, PdfBackend};
use parser::layout::{TextLine, TextSpan};
use parser::table::{Table, TableSettings};

pub mod cleanup;
pub mod geometry;
pub mod parser;

pub use geometry::BBox;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("Page not found: {0}")]
    PageNotFound(u32),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// A loaded PDF document.
pub struct Document {
    backend: LopdfBackend,
}

impl Document {
    /// Read and parse the PDF at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PdfError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        Ok(Self {
            backend: LopdfBackend::load_bytes(bytes)?,
        })
    }

    pub fn page_count(&self) -> usize {
        self.backend.pages().len()
    }

    /// Extract a single page by its 1-based number.
    pub fn page(&self, number: u32) -> Result<Page, PdfError> {
        extract_page(&self.backend, number)
    }
}

/// One page of text spans. `bbox` is the visible area; it starts as the
/// whole page and shrinks with [`Page::within_bbox`].
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// 1-based page number.
    pub number: u32,
    pub bbox: BBox,
    pub spans: Vec<TextSpan>,
}

impl Page {
    /// Keep only the spans whose origin falls inside `bbox`.
    pub fn within_bbox(&self, bbox: BBox) -> Page {
        Page {
            number: self.number,
            bbox,
            spans: self
                .spans
                .iter()
                .filter(|span| bbox.contains(span.x, span.y))
                .cloned()
                .collect(),
        }
    }

    /// Split the page into its left and right halves.
    pub fn halves(&self) -> (Page, Page) {
        let (left, right) = self.bbox.split_halves();
        (self.within_bbox(left), self.within_bbox(right))
    }

    pub fn lines(&self) -> Vec<TextLine> {
        parser::layout::group_spans_into_lines(self.spans.clone())
    }

    /// Plain text, one line per baseline, top to bottom.
    pub fn extract_text(&self) -> String {
        self.lines()
            .iter()
            .map(TextLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn extract_tables(&self, settings: &TableSettings) -> Vec<Table> {
        parser::table::detect_tables(&self.spans, settings)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn extract_page(backend: &dyn PdfBackend, number: u32) -> Result<Page, PdfError> {
    let page_id = *backend
        .pages()
        .get(&number)
        .ok_or_else(|| PdfError::PageNotFound(number))?;

    let (width, height) = backend.page_size(page_id)?;
    let spans = parser::layout::extract_page_spans(backend, page_id)?;
    log::debug!("Page {number}: {} spans", spans.len());

    Ok(Page {
        number,
        bbox: BBox::new(0.0, 0.0, width, height),
        spans: parser::layout::to_top_down(spans, height),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use parser::backend::{decode_text_simple, ContentOp, Operand, PageFont, PageId};

    struct MockBackend {
        pages: Vec<Vec<ContentOp>>,
    }

    impl PdfBackend for MockBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            (1..=self.pages.len() as u32)
                .map(|n| (n, (n, 0)))
                .collect()
        }

        fn page_size(&self, _page: PageId) -> Result<(f32, f32), PdfError> {
            Ok((600.0, 800.0))
        }

        fn page_fonts(&self, _page: PageId) -> Result<Vec<PageFont>, PdfError> {
            Ok(vec![PageFont {
                key: b"F1".to_vec(),
                base_font: Some("Helvetica".to_string()),
            }])
        }

        fn page_ops(&self, page: PageId) -> Result<Vec<ContentOp>, PdfError> {
            Ok(self.pages[page.0 as usize - 1].clone())
        }

        fn decode_text(&self, _page: PageId, _font_name: &[u8], data: &[u8]) -> String {
            decode_text_simple(data)
        }
    }

    fn op(operator: &str, operands: Vec<Operand>) -> ContentOp {
        ContentOp {
            operator: operator.to_string(),
            operands,
        }
    }

    fn show(x: f32, y: f32, text: &str) -> Vec<ContentOp> {
        vec![
            op("BT", vec![]),
            op(
                "Tf",
                vec![Operand::Name(b"F1".to_vec()), Operand::Number(10.0)],
            ),
            op(
                "Tm",
                [1.0, 0.0, 0.0, 1.0, x, y]
                    .into_iter()
                    .map(Operand::Number)
                    .collect(),
            ),
            op("Tj", vec![Operand::Str(text.as_bytes().to_vec())]),
            op("ET", vec![]),
        ]
    }

    fn span(x: f32, y: f32, text: &str) -> TextSpan {
        TextSpan {
            text: text.to_string(),
            x,
            y,
            width: text.len() as f32 * 5.0,
            font_size: 10.0,
            font_name: "Helvetica".to_string(),
        }
    }

    fn page(spans: Vec<TextSpan>) -> Page {
        Page {
            number: 1,
            bbox: BBox::new(0.0, 0.0, 600.0, 800.0),
            spans,
        }
    }

    // -- extract_page --

    #[test]
    fn pages_are_numbered_and_flipped() {
        let backend = MockBackend {
            pages: vec![show(50.0, 700.0, "first"), show(50.0, 100.0, "second")],
        };

        let pages = [1, 2].map(|number| extract_page(&backend, number).unwrap());

        assert_eq!(pages[0].number, 1);
        assert_eq!(pages[0].spans[0].text, "first");
        assert_eq!(pages[0].spans[0].y, 100.0);
        assert_eq!(pages[1].number, 2);
        assert_eq!(pages[1].spans[0].y, 700.0);
        assert_eq!(pages[1].bbox, BBox::new(0.0, 0.0, 600.0, 800.0));
    }

    #[test]
    fn missing_page_is_an_error() {
        let backend = MockBackend {
            pages: vec![show(50.0, 700.0, "only")],
        };

        let err = extract_page(&backend, 3).unwrap_err();

        assert!(matches!(err, PdfError::PageNotFound(3)));
    }

    // -- cropping --

    #[test]
    fn halves_split_spans_by_origin() {
        let page = page(vec![
            span(20.0, 50.0, "left"),
            span(290.0, 60.0, "straddles"),
            span(310.0, 50.0, "right"),
        ]);

        let (left, right) = page.halves();

        assert_eq!(left.extract_text(), "left\nstraddles");
        assert_eq!(right.extract_text(), "right");
        assert_eq!(left.bbox.x1, 300.0);
        assert_eq!(right.bbox.x0, 300.0);
    }

    #[test]
    fn span_on_the_midline_belongs_to_the_right_half() {
        let page = page(vec![span(300.0, 50.0, "mid")]);

        let (left, right) = page.halves();

        assert!(left.spans.is_empty());
        assert_eq!(right.spans.len(), 1);
    }

    #[test]
    fn within_bbox_drops_outside_spans() {
        let page = page(vec![span(20.0, 50.0, "in"), span(20.0, 500.0, "out")]);

        let cropped = page.within_bbox(BBox::new(0.0, 0.0, 600.0, 100.0));

        assert_eq!(cropped.extract_text(), "in");
        assert_eq!(cropped.number, 1);
    }

    // -- text --

    #[test]
    fn extract_text_orders_lines_top_to_bottom() {
        let page = page(vec![
            span(20.0, 80.0, "second"),
            span(20.0, 40.0, "first"),
            span(60.0, 40.0, "again"),
        ]);

        assert_eq!(page.extract_text(), "first again\nsecond");
    }

    #[test]
    fn empty_page_has_no_text_or_tables() {
        let page = page(Vec::new());

        assert_eq!(page.extract_text(), "");
        assert!(page.extract_tables(&TableSettings::default()).is_empty());
    }
}
