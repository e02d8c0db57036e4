//! Document title detection.
//!
//! Three strategies run in order and the first acceptable result wins:
//! a high-confidence heading candidate on the first page, the largest
//! title-shaped text on the first page, then the first title-shaped run
//! near the top of the first page. Finding nothing yields an empty title.
//!
//! Text opening with a structural numbering prefix ("1. Introduction",
//! "Chapter 2") is a section heading and never becomes the title.

use serde::{Deserialize, Serialize};

use super::features::PageContext;
use super::font_stats::FontProfile;
use super::options::OutlineConfig;
use super::text::{
    clean_heading_text, collapse_whitespace, has_numbering_prefix, is_artifact, is_title_shaped,
    joins_without_space, truncate_at_word_boundary,
};
use crate::model::{HeadingCandidate, TextRun};

/// Longest title kept, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Fraction of the page height searched by the placement strategy.
const TOP_REGION: f32 = 0.2;

/// Which strategy produced the title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleSource {
    /// A first-page heading candidate above the title threshold
    HeadingCandidate,
    /// The largest title-shaped text on the first page
    FontAnalysis,
    /// The first title-shaped run near the top of the first page
    Placement,
    /// No title found
    #[default]
    None,
}

/// The detected title and the runs it was built from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TitleSelection {
    /// Cleaned title text (empty when none was found)
    pub text: String,
    /// Indices of the runs that make up the title
    pub run_indices: Vec<usize>,
    /// Strategy that produced the title
    pub source: TitleSource,
}

impl TitleSelection {
    /// Whether no title was found.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether a run is part of the title.
    pub fn contains_run(&self, index: usize) -> bool {
        self.run_indices.contains(&index)
    }

    /// Whether a heading's text duplicates the title.
    pub fn matches_text(&self, text: &str) -> bool {
        !self.text.is_empty() && collapse_whitespace(text) == self.text
    }
}

/// Picks the document title from the first page.
#[derive(Debug, Clone, Copy)]
pub struct TitleDetector<'a> {
    profile: &'a FontProfile,
    config: &'a OutlineConfig,
}

impl<'a> TitleDetector<'a> {
    /// Create a detector.
    pub fn new(profile: &'a FontProfile, config: &'a OutlineConfig) -> Self {
        Self { profile, config }
    }

    /// Detect the title.
    ///
    /// `first_page` is the context of page 0, or `None` when the document
    /// has no first-page text.
    pub fn detect(
        &self,
        runs: &[TextRun],
        first_page: Option<&PageContext>,
        candidates: &[HeadingCandidate],
    ) -> TitleSelection {
        let Some(ctx) = first_page.filter(|c| c.page == 0) else {
            return TitleSelection::default();
        };

        let selection = self
            .from_candidates(runs, ctx, candidates)
            .or_else(|| self.from_font_analysis(runs, ctx))
            .or_else(|| self.from_placement(runs, ctx))
            .unwrap_or_default();

        log::debug!(
            "Title ({:?}): {:?} from runs {:?}",
            selection.source,
            selection.text,
            selection.run_indices
        );
        selection
    }

    fn title_shaped(&self, text: &str) -> bool {
        let text = clean_heading_text(text);
        is_title_shaped(&text, self.config.min_title_chars, self.config.max_heading_chars)
            && !has_numbering_prefix(&text)
    }

    /// Stage 1: highest relative size among confident first-page candidates.
    fn from_candidates(
        &self,
        runs: &[TextRun],
        ctx: &PageContext,
        candidates: &[HeadingCandidate],
    ) -> Option<TitleSelection> {
        let mut best: Option<&HeadingCandidate> = None;
        for candidate in candidates.iter().filter(|c| {
            c.page() == 0
                && c.confidence >= self.config.title_confidence_threshold
                && self.title_shaped(c.text())
        }) {
            // Strict comparison keeps the first in reading order on ties
            if best.map_or(true, |b| candidate.relative_size > b.relative_size) {
                best = Some(candidate);
            }
        }

        best.map(|c| self.select(runs, ctx, c.run_index, TitleSource::HeadingCandidate))
    }

    /// Stage 2: largest title-shaped run, ties broken by the topmost.
    fn from_font_analysis(&self, runs: &[TextRun], ctx: &PageContext) -> Option<TitleSelection> {
        let mut best: Option<usize> = None;
        for &index in &ctx.run_indices {
            let run = &runs[index];
            if run.is_blank() || !self.title_shaped(&run.text) {
                continue;
            }
            let better = match best {
                None => true,
                Some(b) => {
                    let current = &runs[b];
                    run.font_size > current.font_size
                        || (run.font_size == current.font_size && run.bbox.y0 < current.bbox.y0)
                }
            };
            if better {
                best = Some(index);
            }
        }

        let index = best?;
        let min_size = self.profile.body_size * self.config.title_min_size_ratio;
        if runs[index].font_size < min_size {
            return None;
        }
        Some(self.select(runs, ctx, index, TitleSource::FontAnalysis))
    }

    /// Stage 3: first title-shaped run in the top of the page.
    fn from_placement(&self, runs: &[TextRun], ctx: &PageContext) -> Option<TitleSelection> {
        let limit = ctx.height * TOP_REGION;
        ctx.run_indices
            .iter()
            .copied()
            .find(|&i| {
                let run = &runs[i];
                !run.is_blank() && run.bbox.y0 <= limit && self.title_shaped(&run.text)
            })
            .map(|index| TitleSelection {
                text: finish_title(&runs[index].text),
                run_indices: vec![index],
                source: TitleSource::Placement,
            })
    }

    /// Build a selection starting at `start`, absorbing the lines that
    /// continue a multi-line title.
    fn select(
        &self,
        runs: &[TextRun],
        ctx: &PageContext,
        start: usize,
        source: TitleSource,
    ) -> TitleSelection {
        let run_indices = self.continuation(runs, ctx, start);
        let mut text = String::new();
        for &index in &run_indices {
            let part = clean_heading_text(&runs[index].text);
            if !text.is_empty() && !joins_without_space(&text, &part) {
                text.push(' ');
            }
            text.push_str(&part);
        }

        TitleSelection {
            text: finish_title(&text),
            run_indices,
            source,
        }
    }

    fn continuation(&self, runs: &[TextRun], ctx: &PageContext, start: usize) -> Vec<usize> {
        let mut selected = vec![start];
        let Some(start_slot) = ctx.run_indices.iter().position(|&i| i == start) else {
            return selected;
        };

        let mut last = &runs[start];
        let mut chars = clean_heading_text(&last.text).chars().count();
        for &index in &ctx.run_indices[start_slot + 1..] {
            let run = &runs[index];
            if run.is_blank() {
                continue;
            }

            let same_style = (run.font_size - last.font_size).abs() < 0.05
                && run.bold == last.bold
                && run.italic == last.italic;
            let size = last.font_size.max(1.0);
            let follows = run.bbox.y0 >= last.bbox.y0 - 0.3 * size
                && run.bbox.y0 - last.bbox.y1 < 2.0 * size;
            let text = clean_heading_text(&run.text);
            chars += text.chars().count() + 1;

            if !same_style
                || !follows
                || is_artifact(&text)
                || has_numbering_prefix(&text)
                || chars > self.config.max_heading_chars
            {
                break;
            }
            selected.push(index);
            last = run;
        }

        selected
    }
}

fn finish_title(text: &str) -> String {
    truncate_at_word_boundary(&clean_heading_text(text), MAX_TITLE_CHARS)
}
