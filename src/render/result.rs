//! Extraction result with status and statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::json::{to_json, JsonFormat};
use crate::analysis::{PageScores, TitleSource};
use crate::error::Result;
use crate::model::DocumentOutline;

/// Why a result is partial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradeReason {
    /// The processing budget ran out
    Timeout,
}

/// Whether the whole document was processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Every page was processed
    #[default]
    Complete,
    /// Processing stopped early; the outline covers the processed pages
    Degraded {
        /// Why processing stopped
        reason: DegradeReason,
        /// Pages scored before stopping
        pages_processed: usize,
        /// Pages in the document
        pages_total: usize,
    },
}

impl ProcessingStatus {
    /// Whether the result is partial.
    pub fn is_degraded(&self) -> bool {
        matches!(self, ProcessingStatus::Degraded { .. })
    }
}

/// Result of extracting one document's outline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineReport {
    /// The extracted outline
    pub outline: DocumentOutline,

    /// Complete or degraded
    pub status: ProcessingStatus,

    /// Which strategy found the title
    pub title_source: TitleSource,

    /// Extraction statistics
    pub stats: ProcessingStats,

    /// When extraction finished
    pub processed_at: DateTime<Utc>,
}

impl OutlineReport {
    /// Create a report stamped with the current time.
    pub fn new(
        outline: DocumentOutline,
        status: ProcessingStatus,
        title_source: TitleSource,
        stats: ProcessingStats,
    ) -> Self {
        Self {
            outline,
            status,
            title_source,
            stats,
            processed_at: Utc::now(),
        }
    }

    /// Whether the outline covers only part of the document.
    pub fn is_degraded(&self) -> bool {
        self.status.is_degraded()
    }

    /// Serialize just the outline (`{"title", "outline"}`).
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        to_json(&self.outline, format)
    }

    /// Serialize the full report, including status and statistics.
    pub fn report_json(&self, format: JsonFormat) -> Result<String> {
        to_json(self, format)
    }

    /// Take the outline out of the report.
    pub fn into_outline(self) -> DocumentOutline {
        self.outline
    }
}

/// Statistics collected during outline extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Pages in the document
    pub page_count: usize,

    /// Pages scored
    pub pages_processed: usize,

    /// Runs handed over by the document model
    pub run_count: usize,

    /// Runs fully scored
    pub scored_runs: usize,

    /// Runs rejected before the context-dependent sub-scores
    pub early_rejected: usize,

    /// Runs that became heading candidates
    pub candidate_count: usize,

    /// Headings in the final outline
    pub heading_count: usize,

    /// Runs whose text needed repair
    pub encoding_fallbacks: usize,

    /// Wall-clock time spent, in milliseconds
    pub elapsed_ms: u64,
}

impl ProcessingStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one scored page.
    pub fn add_page(&mut self, scores: &PageScores) {
        self.pages_processed += 1;
        self.scored_runs += scores.scored;
        self.early_rejected += scores.early_rejected;
        self.candidate_count += scores.candidates.len();
    }

    /// Increment the encoding fallback count.
    pub fn add_encoding_fallback(&mut self) {
        self.encoding_fallbacks += 1;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ProcessingStats) {
        self.page_count += other.page_count;
        self.pages_processed += other.pages_processed;
        self.run_count += other.run_count;
        self.scored_runs += other.scored_runs;
        self.early_rejected += other.early_rejected;
        self.candidate_count += other.candidate_count;
        self.heading_count += other.heading_count;
        self.encoding_fallbacks += other.encoding_fallbacks;
        self.elapsed_ms += other.elapsed_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, FontSignature, HeadingCandidate, TextRun};

    #[test]
    fn test_stats_add_page() {
        let run = TextRun::new("Intro", 0, BoundingBox::default(), 18.0, "Arial-Bold");
        let scores = PageScores {
            candidates: vec![HeadingCandidate {
                run_index: 0,
                signature: FontSignature::of(&run, 1.0),
                run,
                confidence: 0.9,
                relative_size: 1.5,
            }],
            scored: 3,
            early_rejected: 7,
        };

        let mut stats = ProcessingStats::new();
        stats.add_page(&scores);
        stats.add_encoding_fallback();

        assert_eq!(stats.pages_processed, 1);
        assert_eq!(stats.scored_runs, 3);
        assert_eq!(stats.early_rejected, 7);
        assert_eq!(stats.candidate_count, 1);
        assert_eq!(stats.encoding_fallbacks, 1);
    }

    #[test]
    fn test_stats_merge() {
        let mut stats1 = ProcessingStats {
            page_count: 5,
            heading_count: 2,
            ..Default::default()
        };
        let stats2 = ProcessingStats {
            page_count: 3,
            heading_count: 1,
            encoding_fallbacks: 4,
            ..Default::default()
        };

        stats1.merge(&stats2);

        assert_eq!(stats1.page_count, 8);
        assert_eq!(stats1.heading_count, 3);
        assert_eq!(stats1.encoding_fallbacks, 4);
    }

    #[test]
    fn test_status_serialization() {
        let status = ProcessingStatus::Degraded {
            reason: DegradeReason::Timeout,
            pages_processed: 30,
            pages_total: 50,
        };
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(
            json,
            r#"{"state":"degraded","reason":"timeout","pages_processed":30,"pages_total":50}"#
        );
        assert!(status.is_degraded());
        assert!(!ProcessingStatus::Complete.is_degraded());
    }

    #[test]
    fn test_report_json_variants() {
        let report = OutlineReport::new(
            DocumentOutline {
                title: "T".into(),
                outline: vec![],
            },
            ProcessingStatus::Complete,
            TitleSource::Placement,
            ProcessingStats::new(),
        );

        let outline = report.to_json(JsonFormat::Compact).unwrap();
        assert_eq!(outline, r#"{"title":"T","outline":[]}"#);

        let full = report.report_json(JsonFormat::Compact).unwrap();
        assert!(full.contains(r#""status":{"state":"complete"}"#));
        assert!(full.contains(r#""title_source":"placement""#));
        assert!(full.contains("processed_at"));
    }
}
