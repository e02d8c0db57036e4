//! Outline analysis stages.
//!
//! The stages run strictly in sequence:
//!
//! 1. [`FontProfile`] - document-wide font statistics
//! 2. [`FeatureExtractor`] - per-run sub-scores
//! 3. [`HeadingScorer`] - confidence and candidate selection
//! 4. [`TitleDetector`] - title from the first page
//! 5. [`HierarchyBuilder`] - levels, context resolution and dedup
//! 6. [`assemble`] - final [`DocumentOutline`](crate::model::DocumentOutline)

mod assembler;
mod features;
mod font_stats;
mod hierarchy;
mod options;
mod scorer;
pub mod text;
mod title;

pub use assembler::assemble;
pub use features::{family_heaviness, on_same_line, FeatureExtractor, PageContext};
pub use font_stats::{FontProfile, DEFAULT_BODY_SIZE};
pub use hierarchy::{merge_line_fragments, resolve_levels, HierarchyBuilder};
pub use options::{OutlineConfig, ScoringWeights, StyleWeights};
pub use scorer::{ConfidenceModel, HeadingScorer, LinearScorer, PageScores, RunVerdict};
pub use title::{TitleDetector, TitleSelection, TitleSource, MAX_TITLE_CHARS};
