//! # docoutline
//!
//! Structured outline extraction from positioned document text.
//!
//! This library takes the text runs of a document (text, page, bounding box
//! and font information, as produced by a PDF document model) and recovers
//! its title and H1-H3 heading outline from visual cues alone.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docoutline::{extract_outline_from_file, JsonFormat};
//!
//! fn main() -> docoutline::Result<()> {
//!     // Load a run document and extract its outline
//!     let report = extract_outline_from_file("document.json")?;
//!
//!     // Emit {"title": ..., "outline": [...]}
//!     println!("{}", report.to_json(JsonFormat::Pretty)?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Font statistics**: body size, percentiles and font signatures per document
//! - **Heading scoring**: five weighted sub-scores behind a pluggable model
//! - **Title detection**: three fallback strategies, multi-line titles merged
//! - **Hierarchy**: H1-H3 from font groups, with in-order level resolution
//! - **Bounded time**: a processing budget with partial (degraded) results
//! - **Parallel processing**: Uses Rayon for runs within a page and for batches

pub mod analysis;
pub mod batch;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod render;

// Re-export commonly used types
pub use analysis::{
    ConfidenceModel, FontProfile, LinearScorer, OutlineConfig, ScoringWeights, StyleWeights,
    TitleSource,
};
pub use batch::{extract_batch, extract_paths, BatchItem, BatchStatus, BatchSummary};
pub use error::{Error, Result};
pub use model::{
    BoundingBox, DocumentOutline, HeadingLevel, OutlineEntry, PageInfo, SourceDocument, TextRun,
};
pub use pipeline::{Clock, DocumentAnalysis, OutlineExtractor, SteppingClock, SystemClock};
pub use render::{JsonFormat, OutlineReport, ProcessingStats, ProcessingStatus};

use std::io::Read;
use std::path::Path;

/// Load a run document from a JSON file.
///
/// # Example
///
/// ```no_run
/// use docoutline::load_document;
///
/// let doc = load_document("document.json").unwrap();
/// println!("Pages: {}", doc.effective_page_count());
/// ```
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<SourceDocument> {
    SourceDocument::open(path)
}

/// Load a run document from a reader.
pub fn load_document_from_reader<R: Read>(reader: R) -> Result<SourceDocument> {
    SourceDocument::from_reader(reader)
}

/// Extract the outline of a document with the default configuration.
///
/// # Example
///
/// ```no_run
/// use docoutline::{extract_outline, load_document};
///
/// let doc = load_document("document.json").unwrap();
/// let report = extract_outline(&doc).unwrap();
/// println!("{} headings", report.outline.len());
/// ```
pub fn extract_outline(doc: &SourceDocument) -> Result<OutlineReport> {
    extract_outline_with_config(doc, OutlineConfig::default())
}

/// Extract the outline of a document with a custom configuration.
///
/// # Example
///
/// ```no_run
/// use docoutline::{extract_outline_with_config, load_document, OutlineConfig};
///
/// let config = OutlineConfig::new()
///     .with_heading_threshold(0.55)
///     .with_max_processing_time(5.0);
/// let doc = load_document("document.json").unwrap();
/// let report = extract_outline_with_config(&doc, config).unwrap();
/// ```
pub fn extract_outline_with_config(
    doc: &SourceDocument,
    config: OutlineConfig,
) -> Result<OutlineReport> {
    OutlineExtractor::new(config)?.extract(doc)
}

/// Load a run document from a file and extract its outline.
pub fn extract_outline_from_file<P: AsRef<Path>>(path: P) -> Result<OutlineReport> {
    let doc = load_document(path)?;
    extract_outline(&doc)
}

/// Extract a file's outline straight to JSON.
///
/// # Example
///
/// ```no_run
/// use docoutline::{to_json, JsonFormat};
///
/// let json = to_json("document.json", JsonFormat::Pretty).unwrap();
/// std::fs::write("outline.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    extract_outline_from_file(path)?.to_json(format)
}

/// Builder for configuring and running outline extraction.
///
/// # Example
///
/// ```no_run
/// use docoutline::{JsonFormat, Outliner};
///
/// let json = Outliner::new()
///     .with_heading_threshold(0.55)
///     .with_timeout(5.0)
///     .sequential()
///     .extract_file("document.json")?
///     .to_json(JsonFormat::Compact)?;
/// # Ok::<(), docoutline::Error>(())
/// ```
pub struct Outliner {
    config: OutlineConfig,
    model: Option<Box<dyn ConfidenceModel>>,
}

impl Outliner {
    /// Create a new Outliner builder.
    pub fn new() -> Self {
        Self {
            config: OutlineConfig::default(),
            model: None,
        }
    }

    /// Start from an existing configuration.
    pub fn with_config(mut self, config: OutlineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the processing budget in seconds.
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.config = self.config.with_max_processing_time(seconds);
        self
    }

    /// Set the heading confidence threshold.
    pub fn with_heading_threshold(mut self, threshold: f32) -> Self {
        self.config = self.config.with_heading_threshold(threshold);
        self
    }

    /// Set the title confidence threshold.
    pub fn with_title_threshold(mut self, threshold: f32) -> Self {
        self.config = self.config.with_title_threshold(threshold);
        self
    }

    /// Set the sub-score weights.
    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.config = self.config.with_weights(weights);
        self
    }

    /// Set the page limit.
    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.config = self.config.with_max_pages(pages);
        self
    }

    /// Replace the confidence model.
    pub fn with_model(mut self, model: impl ConfidenceModel + 'static) -> Self {
        self.model = Some(Box::new(model));
        self
    }

    /// Score runs in parallel.
    pub fn parallel(mut self) -> Self {
        self.config = self.config.with_parallel(true);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.config = self.config.sequential();
        self
    }

    /// The configuration built so far.
    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Validate the configuration and build the extractor.
    pub fn build(self) -> Result<OutlineExtractor> {
        let extractor = OutlineExtractor::new(self.config)?;
        Ok(match self.model {
            Some(model) => extractor.with_boxed_model(model),
            None => extractor,
        })
    }

    /// Extract the outline of an in-memory document.
    pub fn extract(self, doc: &SourceDocument) -> Result<OutlineReport> {
        self.build()?.extract(doc)
    }

    /// Load a run document from a file and extract its outline.
    pub fn extract_file<P: AsRef<Path>>(self, path: P) -> Result<OutlineReport> {
        let extractor = self.build()?;
        let doc = load_document(path)?;
        extractor.extract(&doc)
    }
}

impl Default for Outliner {
    fn default() -> Self {
        Self::new()
    }
}
