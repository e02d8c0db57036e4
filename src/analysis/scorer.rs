//! Heading confidence scoring.
//!
//! The scoring function sits behind [`ConfidenceModel`] so the linear
//! weighting can be swapped for another model without touching the rest of
//! the pipeline.

use rayon::prelude::*;

use super::features::{FeatureExtractor, PageContext};
use super::options::ScoringWeights;
use super::text::{clean_heading_text, is_artifact};
use crate::model::{FeatureVector, HeadingCandidate, TextRun};

/// Maps a feature vector to a heading confidence in `[0, 1]`.
pub trait ConfidenceModel: Send + Sync {
    /// Confidence that a run with these features is a heading.
    fn confidence(&self, features: &FeatureVector) -> f32;

    /// Upper bound of [`confidence`](Self::confidence) over every vector
    /// with the given size and text-pattern sub-scores.
    ///
    /// Runs whose bound falls below the threshold are rejected without
    /// computing the remaining sub-scores, so the bound must never be lower
    /// than an actual confidence. The default never allows skipping.
    fn ceiling(&self, size: f32, text_pattern: f32) -> f32 {
        let _ = (size, text_pattern);
        1.0
    }
}

/// Weighted sum of the five sub-scores.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinearScorer {
    weights: ScoringWeights,
}

impl LinearScorer {
    /// Create a scorer with the given weights.
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// The weights in use.
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }
}

impl ConfidenceModel for LinearScorer {
    fn confidence(&self, f: &FeatureVector) -> f32 {
        let w = &self.weights;
        (w.size * f.size
            + w.weight * f.weight
            + w.position * f.position
            + w.whitespace * f.whitespace
            + w.text_pattern * f.text_pattern)
            .clamp(0.0, 1.0)
    }

    fn ceiling(&self, size: f32, text_pattern: f32) -> f32 {
        // Same expression as `confidence` with the unknown sub-scores at
        // their maximum, so rounding cannot put the bound below a real score
        self.confidence(&FeatureVector {
            size,
            text_pattern,
            weight: 1.0,
            position: 1.0,
            whitespace: 1.0,
            relative_size: 0.0,
        })
    }
}

/// Outcome of scoring one run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunVerdict {
    /// Blank or glyph-only run, never a heading
    Ignored,
    /// Rejected from size and text pattern alone
    EarlyRejected,
    /// Fully scored, below the threshold
    Rejected(f32),
    /// Fully scored, at or above the threshold
    Accepted(HeadingCandidate),
}

impl RunVerdict {
    /// The candidate, if accepted.
    pub fn into_candidate(self) -> Option<HeadingCandidate> {
        match self {
            RunVerdict::Accepted(candidate) => Some(candidate),
            _ => None,
        }
    }

    /// Whether the run became a candidate.
    pub fn is_accepted(&self) -> bool {
        matches!(self, RunVerdict::Accepted(_))
    }
}

/// Scoring results for one page.
#[derive(Debug, Clone, Default)]
pub struct PageScores {
    /// Candidates in reading order
    pub candidates: Vec<HeadingCandidate>,
    /// Runs that were fully scored
    pub scored: usize,
    /// Runs rejected before the context-dependent sub-scores
    pub early_rejected: usize,
}

/// Classifies runs as heading candidates.
#[derive(Clone, Copy)]
pub struct HeadingScorer<'a> {
    extractor: FeatureExtractor<'a>,
    model: &'a dyn ConfidenceModel,
    threshold: f32,
}

impl<'a> HeadingScorer<'a> {
    /// Create a scorer.
    pub fn new(
        extractor: FeatureExtractor<'a>,
        model: &'a dyn ConfidenceModel,
        threshold: f32,
    ) -> Self {
        Self {
            extractor,
            model,
            threshold,
        }
    }

    /// Score a run, skipping the expensive sub-scores when they cannot
    /// change the outcome.
    pub fn score(
        &self,
        run_index: usize,
        run: &TextRun,
        ctx: &PageContext,
        slot: usize,
    ) -> RunVerdict {
        self.score_with(run_index, run, ctx, slot, true)
    }

    /// Score a run computing every sub-score.
    pub fn score_exhaustive(
        &self,
        run_index: usize,
        run: &TextRun,
        ctx: &PageContext,
        slot: usize,
    ) -> RunVerdict {
        self.score_with(run_index, run, ctx, slot, false)
    }

    fn score_with(
        &self,
        run_index: usize,
        run: &TextRun,
        ctx: &PageContext,
        slot: usize,
        early_exit: bool,
    ) -> RunVerdict {
        if run.is_blank() || is_artifact(&run.text) {
            return RunVerdict::Ignored;
        }

        let partial = self.extractor.prominence(run);
        if early_exit
            && partial.relative_size <= 1.0
            && partial.text_pattern == 0.0
            && self.model.ceiling(partial.size, partial.text_pattern) < self.threshold
        {
            return RunVerdict::EarlyRejected;
        }

        let features = self.extractor.complete(partial, run, ctx, slot);
        let confidence = self.model.confidence(&features);
        if confidence < self.threshold {
            return RunVerdict::Rejected(confidence);
        }

        let mut heading = run.clone();
        heading.text = clean_heading_text(&run.text);
        RunVerdict::Accepted(HeadingCandidate {
            run_index,
            signature: self.extractor.profile().signature_of(run),
            run: heading,
            confidence,
            relative_size: features.relative_size,
        })
    }

    /// Score every run of a page, in reading order.
    pub fn score_page(&self, runs: &[TextRun], ctx: &PageContext, parallel: bool) -> PageScores {
        let verdicts: Vec<RunVerdict> = if parallel {
            ctx.run_indices
                .par_iter()
                .enumerate()
                .map(|(slot, &index)| self.score(index, &runs[index], ctx, slot))
                .collect()
        } else {
            ctx.run_indices
                .iter()
                .enumerate()
                .map(|(slot, &index)| self.score(index, &runs[index], ctx, slot))
                .collect()
        };

        let mut scores = PageScores::default();
        for verdict in verdicts {
            match verdict {
                RunVerdict::Ignored => {}
                RunVerdict::EarlyRejected => scores.early_rejected += 1,
                RunVerdict::Rejected(_) => scores.scored += 1,
                RunVerdict::Accepted(candidate) => {
                    scores.scored += 1;
                    scores.candidates.push(candidate);
                }
            }
        }

        log::debug!(
            "Page {}: {} candidates, {} scored, {} rejected early",
            ctx.page,
            scores.candidates.len(),
            scores.scored,
            scores.early_rejected
        );

        scores
    }
}
