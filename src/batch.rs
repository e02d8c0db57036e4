//! Batch extraction with per-document isolation.
//!
//! Every document gets its own [`BatchStatus`]; one bad input never aborts
//! the rest of the batch.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use crate::error::Error;
use crate::model::SourceDocument;
use crate::pipeline::OutlineExtractor;
use crate::render::OutlineReport;

/// Outcome of one document in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchStatus {
    /// Fully processed
    Completed,
    /// Processed within the budget only partially
    Degraded,
    /// Not processed (encrypted input)
    Skipped {
        /// Why the document was skipped
        reason: String,
    },
    /// Not processed (unreadable, too long, I/O failure)
    Failed {
        /// Error message
        error: String,
    },
}

/// One document's entry in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    /// Document name (file name or caller-provided label)
    pub name: String,
    /// Outcome
    #[serde(flatten)]
    pub status: BatchStatus,
    /// The report, when an outline was produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<OutlineReport>,
}

impl BatchItem {
    fn from_result(name: String, result: crate::Result<OutlineReport>) -> Self {
        match result {
            Ok(report) => {
                let status = if report.is_degraded() {
                    BatchStatus::Degraded
                } else {
                    BatchStatus::Completed
                };
                Self {
                    name,
                    status,
                    report: Some(report),
                }
            }
            Err(Error::Encrypted) => {
                log::warn!("Skipping {}: document is encrypted", name);
                Self {
                    name,
                    status: BatchStatus::Skipped {
                        reason: Error::Encrypted.to_string(),
                    },
                    report: None,
                }
            }
            Err(e) => {
                log::warn!("Failed to extract outline from {}: {}", name, e);
                Self {
                    name,
                    status: BatchStatus::Failed {
                        error: e.to_string(),
                    },
                    report: None,
                }
            }
        }
    }

    /// Whether an outline was produced.
    pub fn has_outline(&self) -> bool {
        self.report.is_some()
    }
}

/// Results of a whole batch, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    /// One entry per input document
    pub items: Vec<BatchItem>,
}

impl BatchSummary {
    /// Number of documents in the batch.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the batch was empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Documents processed completely.
    pub fn completed(&self) -> usize {
        self.count(|s| matches!(s, BatchStatus::Completed))
    }

    /// Documents with a partial outline.
    pub fn degraded(&self) -> usize {
        self.count(|s| matches!(s, BatchStatus::Degraded))
    }

    /// Documents skipped.
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, BatchStatus::Skipped { .. }))
    }

    /// Documents that failed.
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, BatchStatus::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&BatchStatus) -> bool) -> usize {
        self.items.iter().filter(|item| pred(&item.status)).count()
    }
}

/// Extract outlines from in-memory documents.
///
/// Runs in parallel when the extractor's configuration enables it; the
/// summary keeps input order either way.
pub fn extract_batch<N>(extractor: &OutlineExtractor, docs: &[(N, SourceDocument)]) -> BatchSummary
where
    N: AsRef<str> + Sync,
{
    let process = |(name, doc): &(N, SourceDocument)| {
        BatchItem::from_result(name.as_ref().to_string(), extractor.extract(doc))
    };

    let items = if extractor.config().parallel {
        docs.par_iter().map(process).collect()
    } else {
        docs.iter().map(process).collect()
    };

    BatchSummary { items }
}

/// Load and extract run documents from files, reporting each finished item.
///
/// `on_item` may be called from several threads and in completion order.
pub fn extract_paths<F>(extractor: &OutlineExtractor, paths: &[PathBuf], on_item: F) -> BatchSummary
where
    F: Fn(&BatchItem) + Sync,
{
    let process = |path: &PathBuf| {
        let item = BatchItem::from_result(display_name(path), extract_path(extractor, path));
        on_item(&item);
        item
    };

    let items = if extractor.config().parallel {
        paths.par_iter().map(process).collect()
    } else {
        paths.iter().map(process).collect()
    };

    BatchSummary { items }
}

fn extract_path(extractor: &OutlineExtractor, path: &Path) -> crate::Result<OutlineReport> {
    let doc = SourceDocument::open(path)?;
    extractor.extract(&doc)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::OutlineConfig;
    use crate::model::{BoundingBox, PageInfo, TextRun};

    fn simple_doc() -> SourceDocument {
        let mut doc = SourceDocument::new().with_page(PageInfo::letter());
        doc.push_run(TextRun::new(
            "Overview",
            0,
            BoundingBox::new(256.0, 72.0, 356.0, 96.0),
            24.0,
            "Helvetica-Bold",
        ));
        doc.push_run(TextRun::new(
            "some body text.",
            0,
            BoundingBox::new(72.0, 130.0, 540.0, 142.0),
            12.0,
            "Times-Roman",
        ));
        doc
    }

    #[test]
    fn test_batch_isolates_failures() {
        let extractor = OutlineExtractor::new(OutlineConfig::default()).unwrap();
        let docs = vec![
            ("good.json", simple_doc()),
            (
                "locked.json",
                SourceDocument {
                    encrypted: true,
                    ..Default::default()
                },
            ),
            (
                "broken.json",
                SourceDocument {
                    unreadable: Some("truncated".into()),
                    ..Default::default()
                },
            ),
        ];

        let summary = extract_batch(&extractor, &docs);
        assert_eq!(summary.len(), 3);
        assert_eq!(summary.completed(), 1);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.items[0].name, "good.json");
        assert!(summary.items[0].has_outline());
        assert!(!summary.items[1].has_outline());
    }

    #[test]
    fn test_parallel_batch_keeps_order() {
        let extractor = OutlineExtractor::new(OutlineConfig::default().with_parallel(true)).unwrap();
        let docs: Vec<(String, SourceDocument)> = (0..8)
            .map(|i| (format!("doc{}", i), simple_doc()))
            .collect();

        let summary = extract_batch(&extractor, &docs);
        let names: Vec<&str> = summary.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["doc0", "doc1", "doc2", "doc3", "doc4", "doc5", "doc6", "doc7"]
        );
        assert_eq!(summary.completed(), 8);
    }

    #[test]
    fn test_status_serialization() {
        let item = BatchItem {
            name: "a.json".into(),
            status: BatchStatus::Failed {
                error: "boom".into(),
            },
            report: None,
        };
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"name":"a.json","status":"failed","error":"boom"}"#);
    }
}
