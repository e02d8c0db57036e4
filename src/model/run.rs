//! Positioned text runs and the source document that carries them.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::text::decode_bytes;
use crate::error::{Error, Result};

/// Axis-aligned bounding box in page units.
///
/// The origin is the top-left corner of the page and `y` grows downward,
/// so `y0` is the top edge of the box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }
}

/// A contiguous fragment of text sharing one font style, as reported by the
/// document model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Page index (0-based)
    pub page: usize,

    /// Position on the page
    pub bbox: BoundingBox,

    /// Font size in points
    pub font_size: f32,

    /// Font family name (e.g., "Helvetica-Bold")
    #[serde(default)]
    pub font_family: String,

    /// Bold style flag
    #[serde(default)]
    pub bold: bool,

    /// Italic style flag
    #[serde(default)]
    pub italic: bool,

    /// Vertical whitespace between this run and the previous one on the page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap_before: Option<f32>,

    /// Text was decoded as Latin-1 after the other encodings failed
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub encoding_fallback: bool,
}

impl TextRun {
    /// Create a new text run, inferring bold/italic from the family name.
    pub fn new(
        text: impl Into<String>,
        page: usize,
        bbox: BoundingBox,
        font_size: f32,
        font_family: impl Into<String>,
    ) -> Self {
        let mut run = Self {
            text: text.into(),
            page,
            bbox,
            font_size,
            font_family: font_family.into(),
            bold: false,
            italic: false,
            gap_before: None,
            encoding_fallback: false,
        };
        run.infer_style_from_family();
        run
    }

    /// Create a run from raw text bytes of unknown encoding.
    pub fn from_bytes(
        bytes: &[u8],
        page: usize,
        bbox: BoundingBox,
        font_size: f32,
        font_family: impl Into<String>,
    ) -> Self {
        let decoded = decode_bytes(bytes);
        Self {
            encoding_fallback: decoded.fallback,
            ..Self::new(decoded.text, page, bbox, font_size, font_family)
        }
    }

    /// Set the bold flag.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Set the italic flag.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Set the vertical gap to the previous run.
    pub fn with_gap_before(mut self, gap: f32) -> Self {
        self.gap_before = Some(gap);
        self
    }

    /// Turn on bold/italic when the family name says so.
    ///
    /// Flags already set are never cleared.
    pub fn infer_style_from_family(&mut self) {
        let family = self.font_family.to_lowercase();
        if family.contains("bold") || family.contains("black") || family.contains("heavy") {
            self.bold = true;
        }
        if family.contains("italic") || family.contains("oblique") {
            self.italic = true;
        }
    }

    /// Whether the run has no visible characters.
    pub fn is_blank(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }

    /// Number of non-whitespace characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().filter(|c| !c.is_whitespace()).count()
    }
}

/// Page dimensions in page units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
}

impl PageInfo {
    /// Create page info with explicit dimensions.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// US Letter size (612 x 792 points).
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    /// A4 size (595 x 842 points).
    pub fn a4() -> Self {
        Self::new(595.0, 842.0)
    }
}

impl Default for PageInfo {
    fn default() -> Self {
        Self::letter()
    }
}

/// A document as handed over by the external document model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Declared number of pages (0 = derive from pages and runs)
    #[serde(default)]
    pub page_count: usize,

    /// Per-page dimensions, indexed by page
    #[serde(default)]
    pub pages: Vec<PageInfo>,

    /// Whether the source is encrypted
    #[serde(default)]
    pub encrypted: bool,

    /// Reason the document model could not read the source, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unreadable: Option<String>,

    /// Text runs ordered by page, then reading order
    #[serde(default)]
    pub runs: Vec<TextRun>,
}

impl SourceDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page with the given dimensions.
    pub fn with_page(mut self, info: PageInfo) -> Self {
        self.pages.push(info);
        self
    }

    /// Append `count` pages of the same size.
    pub fn with_pages(mut self, count: usize, info: PageInfo) -> Self {
        self.pages.extend(std::iter::repeat(info).take(count));
        self
    }

    /// Append a text run.
    pub fn push_run(&mut self, run: TextRun) {
        self.runs.push(run);
    }

    /// Number of pages, taking the largest of the declared count, the page
    /// table and the highest page referenced by a run.
    pub fn effective_page_count(&self) -> usize {
        let from_runs = self.runs.iter().map(|r| r.page + 1).max().unwrap_or(0);
        self.page_count.max(self.pages.len()).max(from_runs)
    }

    /// Dimensions of a page, if known.
    pub fn page_info(&self, page: usize) -> Option<PageInfo> {
        self.pages.get(page).copied()
    }

    /// Parse a run document from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut doc: SourceDocument = serde_json::from_str(json)?;
        for run in &mut doc.runs {
            run.infer_style_from_family();
        }
        Ok(doc)
    }

    /// Read a run document from any reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut json = String::new();
        reader.read_to_string(&mut json)?;
        Self::from_json_str(&json)
    }

    /// Load a run document from a file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json).map_err(|e| match e {
            Error::Json(err) => Error::Unreadable(format!("{}: {}", path.display(), err)),
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_run_style_inference() {
        let run = TextRun::new(
            "Title",
            0,
            BoundingBox::new(0.0, 0.0, 100.0, 20.0),
            18.0,
            "Helvetica-BoldOblique",
        );
        assert!(run.bold);
        assert!(run.italic);

        let run = TextRun::new("Body", 0, BoundingBox::default(), 12.0, "Times-Roman");
        assert!(!run.bold);
        assert!(!run.italic);

        let run = TextRun::new("Black", 0, BoundingBox::default(), 12.0, "Arial Black");
        assert!(run.bold);
    }

    #[test]
    fn test_explicit_flags_survive_inference() {
        let mut run = TextRun::new("x", 0, BoundingBox::default(), 12.0, "Times").with_bold(true);
        run.infer_style_from_family();
        assert!(run.bold);
    }

    #[test]
    fn test_blank_and_char_count() {
        let run = TextRun::new("  \t ", 0, BoundingBox::default(), 12.0, "");
        assert!(run.is_blank());
        assert_eq!(run.char_count(), 0);

        let run = TextRun::new("a b c", 0, BoundingBox::default(), 12.0, "");
        assert!(!run.is_blank());
        assert_eq!(run.char_count(), 3);
    }

    #[test]
    fn test_from_bytes_decodes_utf16() {
        let bytes = [0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        let run = TextRun::from_bytes(&bytes, 0, BoundingBox::default(), 12.0, "Arial");
        assert_eq!(run.text, "Hi");
        assert!(!run.encoding_fallback);
    }

    #[test]
    fn test_from_bytes_marks_latin1_fallback() {
        let run = TextRun::from_bytes(b"Caf\xe9 Men\xfc", 0, BoundingBox::default(), 12.0, "Arial");
        assert_eq!(run.text, "Caf\u{00E9} Men\u{00FC}");
        assert!(run.encoding_fallback);
    }

    #[test]
    fn test_bounding_box_geometry() {
        let bbox = BoundingBox::new(10.0, 20.0, 110.0, 32.0);
        assert_eq!(bbox.width(), 100.0);
        assert_eq!(bbox.height(), 12.0);
        assert_eq!(bbox.center_x(), 60.0);
    }

    #[test]
    fn test_effective_page_count() {
        let mut doc = SourceDocument::new().with_page(PageInfo::letter());
        assert_eq!(doc.effective_page_count(), 1);

        doc.push_run(TextRun::new("x", 4, BoundingBox::default(), 12.0, ""));
        assert_eq!(doc.effective_page_count(), 5);

        doc.page_count = 9;
        assert_eq!(doc.effective_page_count(), 9);
    }

    #[test]
    fn test_source_document_from_json() {
        let json = r#"{
            "pages": [{"width": 595.0, "height": 842.0}],
            "runs": [
                {"text": "Intro", "page": 0, "bbox": {"x0": 72, "y0": 80, "x1": 140, "y1": 96},
                 "font_size": 16.0, "font_family": "Arial-Bold"}
            ]
        }"#;
        let doc = SourceDocument::from_json_str(json).unwrap();
        assert_eq!(doc.runs.len(), 1);
        assert!(doc.runs[0].bold);
        assert!(!doc.encrypted);
        assert_eq!(doc.page_info(0), Some(PageInfo::a4()));
        assert_eq!(doc.page_info(1), None);
    }

    #[test]
    fn test_source_document_invalid_json() {
        let result = SourceDocument::from_json_str("{\"runs\": 5}");
        assert!(matches!(result, Err(Error::Json(_))));
    }
}
