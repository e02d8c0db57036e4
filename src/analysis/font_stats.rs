//! Document-wide font statistics.
//!
//! A [`FontProfile`] is built once per document from the normalized runs and
//! is then passed by reference to every later stage.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{FontSignature, TextRun};

/// Body size used when a document has no visible text.
pub const DEFAULT_BODY_SIZE: f32 = 12.0;

/// Font statistics for heading detection.
#[derive(Debug, Clone, PartialEq)]
pub struct FontProfile {
    /// Body text font size (character-weighted mode)
    pub body_size: f32,
    /// 75th percentile of run font sizes
    pub p75: f32,
    /// 90th percentile of run font sizes
    pub p90: f32,
    /// 95th percentile of run font sizes
    pub p95: f32,
    /// Largest font size seen
    pub max_size: f32,
    /// Median vertical gap between consecutive runs on a page
    pub body_gap: f32,
    /// Distinct font signatures
    pub signatures: BTreeSet<FontSignature>,
    /// Visible characters per font size, keyed by size in tenths of a point
    pub size_histogram: BTreeMap<i32, usize>,
    /// Number of non-blank runs
    pub run_count: usize,
    /// Bucket width used for signatures
    pub size_bucket_tolerance: f32,
}

impl FontProfile {
    /// Collect statistics from all runs of a document.
    ///
    /// Blank runs do not contribute to size statistics but still separate
    /// neighbors when measuring gaps.
    pub fn collect(runs: &[TextRun], size_bucket_tolerance: f32) -> Self {
        let mut size_histogram = BTreeMap::new();
        let mut signatures = BTreeSet::new();
        let mut sizes = Vec::new();

        for run in runs.iter().filter(|r| !r.is_blank() && r.font_size > 0.0) {
            *size_histogram.entry(size_key(run.font_size)).or_insert(0) += run.char_count();
            signatures.insert(FontSignature::of(run, size_bucket_tolerance));
            sizes.push(run.font_size);
        }

        // Ascending iteration with a strict comparison keeps the smaller size on ties
        let mut body_key = None;
        let mut body_count = 0;
        for (&key, &count) in &size_histogram {
            if count > body_count {
                body_key = Some(key);
                body_count = count;
            }
        }
        let body_size = body_key.map_or(DEFAULT_BODY_SIZE, |k| k as f32 / 10.0);

        sizes.sort_by(f32::total_cmp);
        let percentile = |p: f32| nearest_rank(&sizes, p).unwrap_or(body_size);

        let body_gap = median_gap(runs).unwrap_or(body_size * 0.5);

        let profile = Self {
            body_size,
            p75: percentile(0.75),
            p90: percentile(0.90),
            p95: percentile(0.95),
            max_size: sizes.last().copied().unwrap_or(body_size),
            body_gap,
            signatures,
            size_histogram,
            run_count: sizes.len(),
            size_bucket_tolerance,
        };

        log::debug!(
            "Font profile: body {:.1}pt, p75 {:.1}, p90 {:.1}, p95 {:.1}, max {:.1}, gap {:.1}, {} signatures",
            profile.body_size,
            profile.p75,
            profile.p90,
            profile.p95,
            profile.max_size,
            profile.body_gap,
            profile.signatures.len()
        );

        profile
    }

    /// Ratio of a font size to the body size.
    pub fn relative_size(&self, font_size: f32) -> f32 {
        if self.body_size > 0.0 {
            font_size / self.body_size
        } else {
            1.0
        }
    }

    /// Whether a font size rounds to the body size.
    pub fn is_body_size(&self, font_size: f32) -> bool {
        size_key(font_size) == size_key(self.body_size)
    }

    /// Signature of a run under this profile's bucket tolerance.
    pub fn signature_of(&self, run: &TextRun) -> FontSignature {
        FontSignature::of(run, self.size_bucket_tolerance)
    }
}

/// Round a font size to 0.1pt precision.
fn size_key(size: f32) -> i32 {
    (size * 10.0).round() as i32
}

fn nearest_rank(sorted: &[f32], p: f32) -> Option<f32> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (p * sorted.len() as f32).ceil() as usize;
    sorted.get(rank.clamp(1, sorted.len()) - 1).copied()
}

/// Vertical gap between a run and the run before it on the same page.
pub(crate) fn gap_between(prev: &TextRun, run: &TextRun) -> f32 {
    run.gap_before
        .unwrap_or(run.bbox.y0 - prev.bbox.y1)
        .max(0.0)
}

fn median_gap(runs: &[TextRun]) -> Option<f32> {
    let mut gaps: Vec<f32> = runs
        .windows(2)
        .filter(|w| w[0].page == w[1].page)
        .map(|w| gap_between(&w[0], &w[1]))
        .filter(|g| *g > 0.0)
        .collect();

    if gaps.is_empty() {
        return None;
    }
    gaps.sort_by(f32::total_cmp);
    Some(gaps[gaps.len() / 2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    fn run(text: &str, size: f32, y0: f32) -> TextRun {
        TextRun::new(
            text,
            0,
            BoundingBox::new(72.0, y0, 300.0, y0 + size),
            size,
            "Times",
        )
    }

    #[test]
    fn test_body_size_is_character_weighted() {
        // Many short 18pt runs, few long 11pt runs
        let mut runs = Vec::new();
        for i in 0..5 {
            runs.push(run("Head", 18.0, i as f32 * 100.0));
        }
        runs.push(run(&"body text ".repeat(20), 11.0, 600.0));

        let profile = FontProfile::collect(&runs, 1.0);
        assert!((profile.body_size - 11.0).abs() < 0.05);
        assert_eq!(profile.max_size, 18.0);
    }

    #[test]
    fn test_body_size_tie_prefers_smaller() {
        let runs = vec![run("abcd", 14.0, 0.0), run("wxyz", 10.0, 20.0)];
        let profile = FontProfile::collect(&runs, 1.0);
        assert!((profile.body_size - 10.0).abs() < 0.05);
    }

    #[test]
    fn test_empty_document_defaults() {
        let profile = FontProfile::collect(&[], 1.0);
        assert_eq!(profile.body_size, DEFAULT_BODY_SIZE);
        assert_eq!(profile.p95, DEFAULT_BODY_SIZE);
        assert_eq!(profile.body_gap, DEFAULT_BODY_SIZE * 0.5);
        assert!(profile.signatures.is_empty());
        assert_eq!(profile.run_count, 0);
    }

    #[test]
    fn test_blank_runs_ignored_for_sizes() {
        let runs = vec![run("   ", 40.0, 0.0), run("body", 12.0, 50.0)];
        let profile = FontProfile::collect(&runs, 1.0);
        assert_eq!(profile.max_size, 12.0);
        assert_eq!(profile.run_count, 1);
        assert_eq!(profile.signatures.len(), 1);
    }

    #[test]
    fn test_percentiles_nearest_rank() {
        let sizes = [10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 12.0, 14.0, 20.0];
        let runs: Vec<TextRun> = sizes
            .iter()
            .enumerate()
            .map(|(i, s)| run("text", *s, i as f32 * 30.0))
            .collect();
        let profile = FontProfile::collect(&runs, 1.0);
        assert_eq!(profile.p75, 12.0);
        assert_eq!(profile.p90, 14.0);
        assert_eq!(profile.p95, 20.0);
    }

    #[test]
    fn test_median_gap() {
        let runs = vec![
            run("a", 10.0, 0.0),
            run("b", 10.0, 14.0),
            run("c", 10.0, 28.0),
            run("d", 10.0, 60.0),
        ];
        // Gaps: 4, 4, 22
        let profile = FontProfile::collect(&runs, 1.0);
        assert_eq!(profile.body_gap, 4.0);
    }

    #[test]
    fn test_explicit_gap_before_wins() {
        let runs = vec![run("a", 10.0, 0.0), run("b", 10.0, 14.0).with_gap_before(9.0)];
        let profile = FontProfile::collect(&runs, 1.0);
        assert_eq!(profile.body_gap, 9.0);
    }

    #[test]
    fn test_relative_size() {
        let runs = vec![run("body text", 12.0, 0.0)];
        let profile = FontProfile::collect(&runs, 1.0);
        assert!((profile.relative_size(18.0) - 1.5).abs() < 1e-6);
        assert!(profile.is_body_size(12.04));
        assert!(!profile.is_body_size(12.5));
    }
}
