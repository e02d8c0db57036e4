//! Intermediate values produced while scoring runs.

use serde::{Deserialize, Serialize};

use super::TextRun;

/// Font style key used to group headings of one kind.
///
/// Ordering is derived so signature sets iterate deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FontSignature {
    /// Font size divided by the bucket tolerance, rounded
    pub size_bucket: i32,
    /// Bold style flag
    pub bold: bool,
    /// Italic style flag
    pub italic: bool,
}

impl FontSignature {
    /// Compute the signature of a run.
    pub fn of(run: &TextRun, tolerance: f32) -> Self {
        let tolerance = if tolerance > 0.0 { tolerance } else { 1.0 };
        Self {
            size_bucket: (run.font_size / tolerance).round() as i32,
            bold: run.bold,
            italic: run.italic,
        }
    }
}

/// Per-run sub-scores, each in `[0, 1]` except `relative_size`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Raw ratio of the run's font size to the body size
    pub relative_size: f32,
    /// Size prominence
    pub size: f32,
    /// Bold/italic/heavy-family prominence
    pub weight: f32,
    /// Placement on the page
    pub position: f32,
    /// Vertical whitespace around the run
    pub whitespace: f32,
    /// Shape of the text itself
    pub text_pattern: f32,
}

/// A run whose confidence cleared the heading threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingCandidate {
    /// Index of the source run within the normalized run list
    pub run_index: usize,
    /// The run, with its text cleaned for output
    pub run: TextRun,
    /// Heading confidence in `[0, 1]`
    pub confidence: f32,
    /// Grouping key
    pub signature: FontSignature,
    /// Ratio of the run's font size to the body size
    pub relative_size: f32,
}

impl HeadingCandidate {
    /// Page index (0-based).
    pub fn page(&self) -> usize {
        self.run.page
    }

    /// Heading text.
    pub fn text(&self) -> &str {
        &self.run.text
    }
}
