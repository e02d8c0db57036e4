//! Per-run feature extraction.
//!
//! Each run is described by five sub-scores in `[0, 1]`: size, weight,
//! position, whitespace and text pattern. Size and text pattern depend only
//! on the run and the [`FontProfile`]; the others need the run's
//! [`PageContext`].

use std::collections::BTreeMap;

use super::font_stats::{gap_between, FontProfile};
use super::options::OutlineConfig;
use super::text::{
    capitalization_score, collapse_whitespace, ends_with_sentence_punct, has_multiple_sentences,
    has_numbering_prefix, is_artifact, is_page_furniture, length_score,
};
use crate::model::{FeatureVector, PageInfo, TextRun};

/// Fraction of the font size within which two runs share a visual line.
pub const SAME_LINE_TOLERANCE: f32 = 0.3;

/// Whether two runs sit on the same visual line.
pub fn on_same_line(a: &TextRun, b: &TextRun) -> bool {
    let size = a.font_size.max(b.font_size).max(1.0);
    (a.bbox.y0 - b.bbox.y0).abs() < size * SAME_LINE_TOLERANCE
}

/// Page-level geometry shared by all runs of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContext {
    /// Page index (0-based)
    pub page: usize,
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
    /// Most common left edge of body-size text
    pub body_margin: f32,
    /// Indices of this page's runs, in reading order
    pub run_indices: Vec<usize>,
    /// Gap above and below each slot; `None` at the page edges
    gaps: Vec<(Option<f32>, Option<f32>)>,
}

impl PageContext {
    /// Build the context for one page.
    ///
    /// `run_indices` index into `runs` and must all belong to `page`.
    pub fn build(
        page: usize,
        runs: &[TextRun],
        run_indices: Vec<usize>,
        info: Option<PageInfo>,
        profile: &FontProfile,
    ) -> Self {
        let page_runs: Vec<&TextRun> = run_indices.iter().map(|&i| &runs[i]).collect();
        let visible: Vec<usize> = (0..page_runs.len())
            .filter(|&slot| !page_runs[slot].is_blank())
            .collect();

        let (width, height) = match info {
            Some(info) if info.width > 0.0 && info.height > 0.0 => (info.width, info.height),
            _ => {
                let fallback = PageInfo::default();
                let max_x = visible.iter().map(|&s| page_runs[s].bbox.x1).fold(0.0, f32::max);
                let max_y = visible.iter().map(|&s| page_runs[s].bbox.y1).fold(0.0, f32::max);
                (
                    if max_x > 0.0 { max_x } else { fallback.width },
                    if max_y > 0.0 { max_y } else { fallback.height },
                )
            }
        };

        let body_margin = dominant_margin(&page_runs, &visible, profile);

        let mut gaps = vec![(None, None); page_runs.len()];
        for (pos, &slot) in visible.iter().enumerate() {
            let run = page_runs[slot];

            let above = visible[..pos]
                .iter()
                .rposition(|&other| !on_same_line(page_runs[other], run))
                .map(|p| {
                    let prev = page_runs[visible[p]];
                    if p + 1 == pos {
                        gap_between(prev, run)
                    } else {
                        (run.bbox.y0 - prev.bbox.y1).max(0.0)
                    }
                });

            let below = visible[pos + 1..]
                .iter()
                .position(|&other| !on_same_line(page_runs[other], run))
                .map(|p| {
                    let next = page_runs[visible[pos + 1 + p]];
                    if p == 0 {
                        gap_between(run, next)
                    } else {
                        (next.bbox.y0 - run.bbox.y1).max(0.0)
                    }
                });

            gaps[slot] = (above, below);
        }

        Self {
            page,
            width,
            height,
            body_margin,
            run_indices,
            gaps,
        }
    }

    /// Number of runs on the page.
    pub fn len(&self) -> usize {
        self.run_indices.len()
    }

    /// Whether the page has no runs.
    pub fn is_empty(&self) -> bool {
        self.run_indices.is_empty()
    }

    /// Whitespace above the run in `slot`, or `None` at the top of the page.
    pub fn gap_above(&self, slot: usize) -> Option<f32> {
        self.gaps.get(slot).and_then(|g| g.0)
    }

    /// Whitespace below the run in `slot`, or `None` at the bottom of the page.
    pub fn gap_below(&self, slot: usize) -> Option<f32> {
        self.gaps.get(slot).and_then(|g| g.1)
    }
}

fn dominant_margin(page_runs: &[&TextRun], visible: &[usize], profile: &FontProfile) -> f32 {
    let mut histogram: BTreeMap<i32, usize> = BTreeMap::new();
    for &slot in visible {
        let run = page_runs[slot];
        if profile.is_body_size(run.font_size) {
            *histogram.entry(run.bbox.x0.round() as i32).or_insert(0) += run.char_count();
        }
    }

    let mut best: Option<(i32, usize)> = None;
    for (&x, &count) in &histogram {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((x, count));
        }
    }

    match best {
        Some((x, _)) => x as f32,
        None => visible
            .iter()
            .map(|&s| page_runs[s].bbox.x0)
            .reduce(f32::min)
            .unwrap_or(0.0),
    }
}

/// Computes feature vectors against one document's [`FontProfile`].
#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor<'a> {
    profile: &'a FontProfile,
    config: &'a OutlineConfig,
}

impl<'a> FeatureExtractor<'a> {
    /// Create an extractor.
    pub fn new(profile: &'a FontProfile, config: &'a OutlineConfig) -> Self {
        Self { profile, config }
    }

    /// The profile this extractor scores against.
    pub fn profile(&self) -> &FontProfile {
        self.profile
    }

    /// Size sub-score: a linear ramp on the relative size blended with a
    /// percentile step. Non-decreasing in the font size.
    pub fn size_score(&self, font_size: f32) -> f32 {
        let ratio = self.profile.relative_size(font_size);
        let ceiling = self.config.relative_size_ceiling;
        let linear = ((ratio.min(ceiling) - 1.0) / (ceiling - 1.0)).clamp(0.0, 1.0);

        let step = if ratio <= 1.0 {
            0.0
        } else if font_size >= self.profile.p95 {
            1.0
        } else if font_size >= self.profile.p90 {
            0.75
        } else if font_size >= self.profile.p75 {
            0.5
        } else {
            0.25
        };

        0.7 * linear + 0.3 * step
    }

    /// Weight sub-score from the style flags and the family name.
    pub fn weight_score(&self, run: &TextRun) -> f32 {
        let w = &self.config.style_weights;
        let bold = if run.bold { w.bold } else { 0.0 };
        let italic = if run.italic { w.italic } else { 0.0 };
        (bold + italic + w.family * family_heaviness(&run.font_family)).clamp(0.0, 1.0)
    }

    /// Position sub-score: closeness to the top of the page, blended with
    /// an indent or centering signal.
    pub fn position_score(&self, run: &TextRun, ctx: &PageContext) -> f32 {
        let vertical = (1.0 - run.bbox.y0 / ctx.height).clamp(0.0, 1.0);

        let indent = ((run.bbox.x0 - ctx.body_margin).abs() / (0.1 * ctx.width)).clamp(0.0, 1.0);
        let centered = (run.bbox.center_x() - ctx.width / 2.0).abs() <= 0.02 * ctx.width
            && run.bbox.width() < 0.6 * ctx.width;
        let margin = if centered { 1.0 } else { indent };

        0.6 * vertical + 0.4 * margin
    }

    /// Whitespace sub-score from the gaps above and below the run.
    pub fn whitespace_score(&self, ctx: &PageContext, slot: usize) -> f32 {
        let scale = self.profile.body_size.max(1.0);
        let side = |gap: Option<f32>| {
            gap.map_or(1.0, |g| ((g - self.profile.body_gap) / scale).clamp(0.0, 1.0))
        };
        0.5 * side(ctx.gap_above(slot)) + 0.5 * side(ctx.gap_below(slot))
    }

    /// Text-pattern sub-score. Artifacts, page labels, multi-sentence and
    /// over-long text get the minimum.
    pub fn text_pattern_score(&self, text: &str) -> f32 {
        let text = collapse_whitespace(text);
        if text.is_empty() || is_artifact(&text) || is_page_furniture(&text) {
            return 0.0;
        }

        let chars = text.chars().count();
        if chars > self.config.max_heading_chars || has_multiple_sentences(&text) {
            return 0.0;
        }

        let length = length_score(chars, self.config.max_heading_chars);
        let caps = capitalization_score(&text);
        let numbering = if has_numbering_prefix(&text) { 1.0 } else { 0.0 };
        let trailing = if ends_with_sentence_punct(&text) { 1.0 } else { 0.0 };

        (0.4 * length + 0.3 * caps + 0.3 * numbering - 0.5 * trailing).clamp(0.0, 1.0)
    }

    /// Features that need no page context: relative size, size and text
    /// pattern. The remaining sub-scores are left at zero.
    pub fn prominence(&self, run: &TextRun) -> FeatureVector {
        FeatureVector {
            relative_size: self.profile.relative_size(run.font_size),
            size: self.size_score(run.font_size),
            text_pattern: self.text_pattern_score(&run.text),
            ..Default::default()
        }
    }

    /// Fill in the context-dependent sub-scores of a partial vector.
    pub fn complete(
        &self,
        partial: FeatureVector,
        run: &TextRun,
        ctx: &PageContext,
        slot: usize,
    ) -> FeatureVector {
        FeatureVector {
            weight: self.weight_score(run),
            position: self.position_score(run, ctx),
            whitespace: self.whitespace_score(ctx, slot),
            ..partial
        }
    }

    /// Compute the full feature vector of the run in `slot`.
    pub fn extract(&self, run: &TextRun, ctx: &PageContext, slot: usize) -> FeatureVector {
        self.complete(self.prominence(run), run, ctx, slot)
    }
}

/// How heavy a font family name reads, in `[0, 1]`.
pub fn family_heaviness(family: &str) -> f32 {
    let family = family.to_lowercase();
    if ["black", "heavy", "extrabold", "ultrabold"]
        .iter()
        .any(|k| family.contains(k))
    {
        1.0
    } else if ["bold", "semibold", "demi"].iter().any(|k| family.contains(k)) {
        0.8
    } else if family.contains("medium") {
        0.4
    } else {
        0.0
    }
}
