use std::collections::BTreeMap;

use lopdf::content::Content;

use crate::PdfError;

/// `lopdf::ObjectId` of a page: (object number, generation).
pub type PageId = (u32, u16);

/// A font named in a page's resources.
#[derive(Debug, Clone)]
pub struct PageFont {
    /// Resource key used by `Tf`, e.g. `b"F1"`.
    pub key: Vec<u8>,
    pub base_font: Option<String>,
}

/// A content-stream operand. Only the shapes the text operators read are
/// kept; everything else is `Other`.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Number(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<Operand>),
    Other,
}

impl Operand {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Operand::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&lopdf::Object> for Operand {
    fn from(obj: &lopdf::Object) -> Self {
        match obj {
            lopdf::Object::Integer(i) => Operand::Number(*i as f32),
            lopdf::Object::Real(f) => Operand::Number(*f),
            lopdf::Object::Name(name) => Operand::Name(name.clone()),
            lopdf::Object::String(bytes, _) => Operand::Str(bytes.clone()),
            lopdf::Object::Array(items) => {
                Operand::Array(items.iter().map(Operand::from).collect())
            }
            _ => Operand::Other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<Operand>,
}

/// String bytes as text: UTF-16BE behind a BOM, else UTF-8, else Latin-1.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return utf16be(rest);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn utf16be(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// What the text layer reads from a parsed PDF.
pub trait PdfBackend {
    /// 1-based page number to [`PageId`].
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// `(width, height)` in points.
    fn page_size(&self, page: PageId) -> Result<(f32, f32), PdfError>;

    fn page_fonts(&self, page: PageId) -> Result<Vec<PageFont>, PdfError>;

    /// The page's decoded content-stream operations.
    fn page_ops(&self, page: PageId) -> Result<Vec<ContentOp>, PdfError>;

    /// Text of a string shown with the font at `font_key`.
    fn decode_text(&self, page: PageId, font_key: &[u8], bytes: &[u8]) -> String;
}

pub struct LopdfBackend {
    doc: lopdf::Document,
}

impl LopdfBackend {
    pub fn load_bytes(data: &[u8]) -> Result<Self, PdfError> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;
        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }
        Ok(Self { doc })
    }

    /// MediaBox `[llx lly urx ury]`, inherited from the page tree when the
    /// page has none.
    fn media_box(&self, page: PageId) -> Option<[f32; 4]> {
        let mut dict = self.doc.get_dictionary(page).ok()?;
        loop {
            if let Ok(obj) = dict.get(b"MediaBox") {
                let (_, array) = self.doc.dereference(obj).ok()?;
                let numbers = array
                    .as_array()
                    .ok()?
                    .iter()
                    .map(|item| self.doc.dereference(item).ok()?.1.as_float().ok())
                    .collect::<Option<Vec<f32>>>()?;
                return match numbers[..] {
                    [x0, y0, x1, y1, ..] => Some([x0, y0, x1, y1]),
                    _ => None,
                };
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
    }

    fn has_identity_encoding(&self, page: PageId, font_key: &[u8]) -> bool {
        let Ok(fonts) = self.doc.get_page_fonts(page) else {
            return false;
        };
        fonts
            .get(font_key)
            .and_then(|font| font.get(b"Encoding").ok())
            .and_then(|encoding| encoding.as_name().ok())
            .is_some_and(|name| name.starts_with(b"Identity"))
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_size(&self, page: PageId) -> Result<(f32, f32), PdfError> {
        let [x0, y0, x1, y1] = self
            .media_box(page)
            .ok_or_else(|| PdfError::Parse(format!("no usable MediaBox for page {page:?}")))?;
        Ok((x1 - x0, y1 - y0))
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<PageFont>, PdfError> {
        let fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| PdfError::Parse(format!("cannot read page fonts: {e}")))?;

        Ok(fonts
            .into_iter()
            .map(|(key, font)| PageFont {
                key,
                base_font: font
                    .get(b"BaseFont")
                    .and_then(|obj| obj.as_name())
                    .ok()
                    .map(|name| String::from_utf8_lossy(name).into_owned()),
            })
            .collect())
    }

    fn page_ops(&self, page: PageId) -> Result<Vec<ContentOp>, PdfError> {
        let data = self
            .doc
            .get_page_content(page)
            .map_err(|e| PdfError::Parse(format!("cannot read page content: {e}")))?;
        let content = Content::decode(&data)
            .map_err(|e| PdfError::Parse(format!("cannot decode content stream: {e}")))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operands: op.operands.iter().map(Operand::from).collect(),
                operator: op.operator,
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_key: &[u8], bytes: &[u8]) -> String {
        // Identity-H/V codes are two bytes wide and mostly UTF-16.
        if bytes.len() >= 2 && bytes.len() % 2 == 0 && self.has_identity_encoding(page, font_key) {
            let text = utf16be(bytes);
            if text.chars().any(|c| c != '\u{FFFD}' && c != '\0') {
                return text;
            }
        }
        decode_text_simple(bytes)
    }
}
