//! Extraction options and configuration.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Weights of the five sub-scores in the linear confidence model.
///
/// Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Size prominence weight
    pub size: f32,
    /// Bold/italic weight
    pub weight: f32,
    /// Page placement weight
    pub position: f32,
    /// Surrounding whitespace weight
    pub whitespace: f32,
    /// Text shape weight
    pub text_pattern: f32,
}

impl ScoringWeights {
    /// Sum of all weights.
    pub fn sum(&self) -> f32 {
        self.size + self.weight + self.position + self.whitespace + self.text_pattern
    }

    fn as_array(&self) -> [f32; 5] {
        [
            self.size,
            self.weight,
            self.position,
            self.whitespace,
            self.text_pattern,
        ]
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            size: 0.40,
            weight: 0.20,
            position: 0.20,
            whitespace: 0.10,
            text_pattern: 0.10,
        }
    }
}

impl FromStr for ScoringWeights {
    type Err = Error;

    /// Parse `"size,weight,position,whitespace,text_pattern"`.
    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<f32>()
                    .map_err(|_| Error::InvalidConfig(format!("invalid weight '{}'", part.trim())))
            })
            .collect::<Result<Vec<f32>>>()?;

        match values.as_slice() {
            [size, weight, position, whitespace, text_pattern] => Ok(Self {
                size: *size,
                weight: *weight,
                position: *position,
                whitespace: *whitespace,
                text_pattern: *text_pattern,
            }),
            _ => Err(Error::InvalidConfig(format!(
                "expected 5 comma-separated weights, got {}",
                values.len()
            ))),
        }
    }
}

/// Weights that combine style flags into the weight sub-score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleWeights {
    /// Contribution of the bold flag
    pub bold: f32,
    /// Contribution of the italic flag
    pub italic: f32,
    /// Contribution of a heavy font family name
    pub family: f32,
}

impl Default for StyleWeights {
    fn default() -> Self {
        Self {
            bold: 0.6,
            italic: 0.2,
            family: 0.2,
        }
    }
}

/// Options for outline extraction.
///
/// Every field has a default, so a JSON config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Wall-clock budget for one document, in seconds
    pub max_processing_time_seconds: f64,

    /// Minimum confidence for a run to become a heading candidate
    pub heading_confidence_threshold: f32,

    /// Minimum confidence for a candidate to be taken as the title
    pub title_confidence_threshold: f32,

    /// Sub-score weights of the linear confidence model
    pub weights: ScoringWeights,

    /// Style flag weights of the weight sub-score
    pub style_weights: StyleWeights,

    /// Font size bucket width for signature grouping, in points
    pub size_bucket_tolerance: f32,

    /// Relative size at which the linear part of the size score saturates
    pub relative_size_ceiling: f32,

    /// Maximum number of pages accepted
    pub max_pages: usize,

    /// Longest text (in characters) still considered heading-shaped
    pub max_heading_chars: usize,

    /// Minimum visible characters for a placement-based title
    pub min_title_chars: usize,

    /// Minimum size (relative to body) for a font-analysis title
    pub title_min_size_ratio: f32,

    /// Groups at least this large relative to the largest group may be H1
    pub h1_min_relative_size: f32,

    /// Groups at least this large relative to the largest group may be H2
    pub h2_min_relative_size: f32,

    /// Merge heading fragments that sit on one visual line
    pub merge_line_fragments: bool,

    /// Score runs of a page in parallel
    pub parallel: bool,
}

impl OutlineConfig {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from JSON. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Processing budget as a duration.
    pub fn max_processing_time(&self) -> Duration {
        Duration::from_secs_f64(self.max_processing_time_seconds.max(0.0))
    }

    /// Set the processing budget in seconds.
    pub fn with_max_processing_time(mut self, seconds: f64) -> Self {
        self.max_processing_time_seconds = seconds;
        self
    }

    /// Set the heading confidence threshold.
    pub fn with_heading_threshold(mut self, threshold: f32) -> Self {
        self.heading_confidence_threshold = threshold;
        self
    }

    /// Set the title confidence threshold.
    pub fn with_title_threshold(mut self, threshold: f32) -> Self {
        self.title_confidence_threshold = threshold;
        self
    }

    /// Set the scoring weights.
    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the style weights.
    pub fn with_style_weights(mut self, weights: StyleWeights) -> Self {
        self.style_weights = weights;
        self
    }

    /// Set the font size bucket tolerance.
    pub fn with_size_bucket_tolerance(mut self, tolerance: f32) -> Self {
        self.size_bucket_tolerance = tolerance;
        self
    }

    /// Set the page limit.
    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.max_pages = pages;
        self
    }

    /// Enable or disable merging of same-line heading fragments.
    pub fn with_line_fragment_merging(mut self, merge: bool) -> Self {
        self.merge_line_fragments = merge;
        self
    }

    /// Enable or disable parallel scoring.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel scoring.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check every option. Called before any document is processed.
    pub fn validate(&self) -> Result<()> {
        fn invalid(msg: String) -> Result<()> {
            Err(Error::InvalidConfig(msg))
        }

        if !self.max_processing_time_seconds.is_finite() || self.max_processing_time_seconds <= 0.0
        {
            return invalid(format!(
                "max_processing_time_seconds must be positive, got {}",
                self.max_processing_time_seconds
            ));
        }

        for (name, value) in [
            ("heading_confidence_threshold", self.heading_confidence_threshold),
            ("title_confidence_threshold", self.title_confidence_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return invalid(format!("{} must be within [0, 1], got {}", name, value));
            }
        }

        let weights = self.weights.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return invalid(format!("scoring weights must be non-negative: {:?}", weights));
        }
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > 1e-3 {
            return invalid(format!("scoring weights must sum to 1.0, got {:.4}", sum));
        }

        let style = [
            self.style_weights.bold,
            self.style_weights.italic,
            self.style_weights.family,
        ];
        if style.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return invalid(format!("style weights must be non-negative: {:?}", style));
        }

        if !(self.size_bucket_tolerance.is_finite() && self.size_bucket_tolerance > 0.0) {
            return invalid(format!(
                "size_bucket_tolerance must be positive, got {}",
                self.size_bucket_tolerance
            ));
        }
        if !(self.relative_size_ceiling.is_finite() && self.relative_size_ceiling > 1.0) {
            return invalid(format!(
                "relative_size_ceiling must be greater than 1.0, got {}",
                self.relative_size_ceiling
            ));
        }
        if self.max_pages == 0 {
            return invalid("max_pages must be at least 1".to_string());
        }
        if self.max_heading_chars == 0 || self.min_title_chars > self.max_heading_chars {
            return invalid(format!(
                "min_title_chars ({}) must not exceed max_heading_chars ({})",
                self.min_title_chars, self.max_heading_chars
            ));
        }
        if !(self.title_min_size_ratio.is_finite() && self.title_min_size_ratio > 0.0) {
            return invalid(format!(
                "title_min_size_ratio must be positive, got {}",
                self.title_min_size_ratio
            ));
        }
        if !(0.0 < self.h2_min_relative_size
            && self.h2_min_relative_size <= self.h1_min_relative_size
            && self.h1_min_relative_size <= 1.0)
        {
            return invalid(format!(
                "relative size bands must satisfy 0 < h2 ({}) <= h1 ({}) <= 1",
                self.h2_min_relative_size, self.h1_min_relative_size
            ));
        }

        Ok(())
    }
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            max_processing_time_seconds: 10.0,
            heading_confidence_threshold: 0.6,
            title_confidence_threshold: 0.8,
            weights: ScoringWeights::default(),
            style_weights: StyleWeights::default(),
            size_bucket_tolerance: 1.0,
            relative_size_ceiling: 1.5,
            max_pages: 50,
            max_heading_chars: 200,
            min_title_chars: 3,
            title_min_size_ratio: 1.2,
            h1_min_relative_size: 0.8,
            h2_min_relative_size: 0.6,
            merge_line_fragments: true,
            parallel: false,
        }
    }
}
