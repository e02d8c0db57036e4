//! Pipeline driver: runs the analysis stages over one document within the
//! processing budget.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::analysis::text::normalize_run_text;
use crate::analysis::{
    assemble, ConfidenceModel, FeatureExtractor, FontProfile, HeadingScorer, HierarchyBuilder,
    LinearScorer, OutlineConfig, PageContext, TitleDetector,
};
use crate::error::{Error, Result};
use crate::model::{SourceDocument, TextRun};
use crate::render::{DegradeReason, OutlineReport, ProcessingStats, ProcessingStatus};

/// Monotonic time source for the processing budget.
pub trait Clock: Send + Sync {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that advances by a fixed step every time it is read.
///
/// Makes budget behavior reproducible: with a one-second step, each page
/// "takes" one second.
#[derive(Debug)]
pub struct SteppingClock {
    current: Mutex<Duration>,
    step: Duration,
}

impl SteppingClock {
    /// Create a clock starting at zero.
    pub fn new(step: Duration) -> Self {
        Self {
            current: Mutex::new(Duration::ZERO),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> Duration {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = *current;
        *current += self.step;
        now
    }
}

/// Intermediate analysis of a document, without hierarchy or title.
#[derive(Debug, Clone)]
pub struct DocumentAnalysis {
    /// Font statistics
    pub profile: FontProfile,
    /// Normalized runs, grouped by page in page order
    pub runs: Vec<TextRun>,
    /// Runs whose text needed repair
    pub encoding_fallbacks: usize,
}

/// Extracts outlines from source documents.
pub struct OutlineExtractor {
    config: OutlineConfig,
    model: Box<dyn ConfidenceModel>,
    clock: Box<dyn Clock>,
}

impl OutlineExtractor {
    /// Create an extractor with the linear confidence model.
    ///
    /// The configuration is validated here, before any document is seen.
    pub fn new(config: OutlineConfig) -> Result<Self> {
        config.validate()?;
        let model = LinearScorer::new(config.weights);
        Ok(Self {
            config,
            model: Box::new(model),
            clock: Box::new(SystemClock::new()),
        })
    }

    /// Replace the confidence model.
    pub fn with_model(self, model: impl ConfidenceModel + 'static) -> Self {
        self.with_boxed_model(Box::new(model))
    }

    /// Replace the confidence model with an already boxed one.
    pub fn with_boxed_model(mut self, model: Box<dyn ConfidenceModel>) -> Self {
        self.model = model;
        self
    }

    /// Replace the clock used for the processing budget.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Reject documents the pipeline must not process.
    pub fn check_input(&self, doc: &SourceDocument) -> Result<()> {
        if doc.encrypted {
            return Err(Error::Encrypted);
        }
        if let Some(reason) = &doc.unreadable {
            return Err(Error::Unreadable(reason.clone()));
        }
        let pages = doc.effective_page_count();
        if pages > self.config.max_pages {
            return Err(Error::PageLimitExceeded {
                pages,
                limit: self.config.max_pages,
            });
        }
        Ok(())
    }

    /// Normalize runs and collect font statistics.
    pub fn analyze(&self, doc: &SourceDocument) -> Result<DocumentAnalysis> {
        self.check_input(doc)?;

        let mut encoding_fallbacks = 0;
        let mut runs: Vec<TextRun> = doc
            .runs
            .iter()
            .map(|run| {
                let normalized = normalize_run_text(&run.text);
                if normalized.repaired || run.encoding_fallback {
                    encoding_fallbacks += 1;
                    log::debug!(
                        "Repaired text on page {}: {:?} -> {:?}",
                        run.page,
                        run.text,
                        normalized.text
                    );
                }
                TextRun {
                    text: normalized.text,
                    ..run.clone()
                }
            })
            .collect();
        // Stable: reading order within a page is kept
        runs.sort_by_key(|run| run.page);

        let profile = FontProfile::collect(&runs, self.config.size_bucket_tolerance);
        Ok(DocumentAnalysis {
            profile,
            runs,
            encoding_fallbacks,
        })
    }

    /// Extract the outline of one document.
    ///
    /// Encrypted, unreadable and over-long documents are rejected. Running
    /// out of time is not an error: the report is marked degraded and holds
    /// the outline of the pages processed so far.
    pub fn extract(&self, doc: &SourceDocument) -> Result<OutlineReport> {
        let start = self.clock.now();
        let budget = self.config.max_processing_time();

        let analysis = self.analyze(doc)?;
        let DocumentAnalysis {
            profile,
            runs,
            encoding_fallbacks,
        } = analysis;

        let mut stats = ProcessingStats {
            page_count: doc.effective_page_count(),
            run_count: runs.len(),
            encoding_fallbacks,
            ..Default::default()
        };

        let mut pages: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (index, run) in runs.iter().enumerate() {
            pages.entry(run.page).or_default().push(index);
        }

        let extractor = FeatureExtractor::new(&profile, &self.config);
        let scorer = HeadingScorer::new(
            extractor,
            self.model.as_ref(),
            self.config.heading_confidence_threshold,
        );

        let mut candidates = Vec::new();
        let mut first_page: Option<PageContext> = None;
        let mut status = ProcessingStatus::Complete;
        let total_pages = pages.len();

        for (position, (page, indices)) in pages.into_iter().enumerate() {
            let ctx = PageContext::build(page, &runs, indices, doc.page_info(page), &profile);
            let scores = scorer.score_page(&runs, &ctx, self.config.parallel);
            stats.add_page(&scores);
            candidates.extend(scores.candidates);
            if page == 0 {
                first_page = Some(ctx);
            }

            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed >= budget && position + 1 < total_pages {
                log::warn!(
                    "Processing budget of {:?} exhausted after {} of {} pages; returning partial outline",
                    budget,
                    position + 1,
                    total_pages
                );
                status = ProcessingStatus::Degraded {
                    reason: DegradeReason::Timeout,
                    pages_processed: position + 1,
                    pages_total: total_pages,
                };
                break;
            }
        }

        let title = TitleDetector::new(&profile, &self.config).detect(
            &runs,
            first_page.as_ref(),
            &candidates,
        );
        let nodes = HierarchyBuilder::new(&self.config).build(candidates, &title);
        let outline = assemble(&title.text, &nodes);

        stats.heading_count = outline.len();
        stats.elapsed_ms = self.clock.now().saturating_sub(start).as_millis() as u64;

        log::info!(
            "Extracted {} headings from {} pages (title: {:?}, {} candidates)",
            stats.heading_count,
            stats.pages_processed,
            outline.title,
            stats.candidate_count
        );

        Ok(OutlineReport::new(outline, status, title.source, stats))
    }
}

impl std::fmt::Debug for OutlineExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutlineExtractor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
