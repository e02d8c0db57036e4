//! Heading hierarchy construction.
//!
//! Candidates are grouped by font signature and the groups are ranked by
//! prominence to get H1-H3. A document-order pass then removes level jumps
//! that skip a level not seen before, and drops duplicates.

use std::collections::BTreeMap;

use super::features::on_same_line;
use super::options::OutlineConfig;
use super::text::joins_without_space;
use super::title::TitleSelection;
use crate::model::{FontSignature, HeadingCandidate, HeadingLevel, OutlineNode};

#[derive(Debug, Default)]
struct GroupStats {
    relative_size: f32,
    confidence: f32,
    font_size: f32,
    count: usize,
    first_seen: usize,
}

impl GroupStats {
    fn avg_relative_size(&self) -> f32 {
        self.relative_size / self.count as f32
    }

    fn avg_confidence(&self) -> f32 {
        self.confidence / self.count as f32
    }

    fn avg_font_size(&self) -> f32 {
        self.font_size / self.count as f32
    }
}

/// Builds the ordered outline nodes from heading candidates.
#[derive(Debug, Clone, Copy)]
pub struct HierarchyBuilder<'a> {
    config: &'a OutlineConfig,
}

impl<'a> HierarchyBuilder<'a> {
    /// Create a builder.
    pub fn new(config: &'a OutlineConfig) -> Self {
        Self { config }
    }

    /// Build outline nodes from candidates in document order.
    ///
    /// Title runs are excluded, and a first-page H1 repeating the title is
    /// dropped.
    pub fn build(
        &self,
        candidates: Vec<HeadingCandidate>,
        title: &TitleSelection,
    ) -> Vec<OutlineNode> {
        let candidates: Vec<HeadingCandidate> = candidates
            .into_iter()
            .filter(|c| !title.contains_run(c.run_index))
            .collect();

        let candidates = if self.config.merge_line_fragments {
            merge_line_fragments(candidates)
        } else {
            candidates
        };

        let candidates = drop_repeats(candidates);
        let group_levels = self.group_levels(&candidates);

        let mut items: Vec<(HeadingCandidate, HeadingLevel)> = candidates
            .into_iter()
            .map(|c| {
                let level = group_levels
                    .get(&c.signature)
                    .copied()
                    .unwrap_or(HeadingLevel::H3);
                (c, level)
            })
            .collect();

        // Removing a title duplicate can shift the levels that follow it,
        // so resolve again until nothing else is removed
        loop {
            let levels: Vec<HeadingLevel> = items.iter().map(|(_, level)| *level).collect();
            let resolved = resolve_levels(&levels);

            let duplicate = items.iter().zip(&resolved).position(|((c, _), level)| {
                *level == HeadingLevel::H1 && c.page() == 0 && title.matches_text(c.text())
            });

            match duplicate {
                Some(pos) => {
                    log::debug!("Dropping heading that repeats the title: {:?}", items[pos].0.text());
                    items.remove(pos);
                }
                None => {
                    return items
                        .into_iter()
                        .zip(resolved)
                        .map(|((c, _), level)| OutlineNode::new(level, c.run.text, c.run.page))
                        .collect();
                }
            }
        }
    }

    /// Assign a level to every font signature.
    ///
    /// Groups are ranked by average relative size, then average confidence,
    /// then first appearance. A group's level is the deeper of its rank and
    /// its size band relative to the most prominent group.
    pub fn group_levels(
        &self,
        candidates: &[HeadingCandidate],
    ) -> BTreeMap<FontSignature, HeadingLevel> {
        let mut groups: BTreeMap<FontSignature, GroupStats> = BTreeMap::new();
        for (order, candidate) in candidates.iter().enumerate() {
            let stats = groups.entry(candidate.signature).or_insert_with(|| GroupStats {
                first_seen: order,
                ..Default::default()
            });
            stats.relative_size += candidate.relative_size;
            stats.confidence += candidate.confidence;
            stats.font_size += candidate.run.font_size;
            stats.count += 1;
        }

        let mut ranked: Vec<(FontSignature, GroupStats)> = groups.into_iter().collect();
        ranked.sort_by(|(_, a), (_, b)| {
            b.avg_relative_size()
                .total_cmp(&a.avg_relative_size())
                .then_with(|| b.avg_confidence().total_cmp(&a.avg_confidence()))
                .then_with(|| a.first_seen.cmp(&b.first_seen))
        });

        let top_size = ranked
            .first()
            .map(|(_, stats)| stats.avg_font_size())
            .unwrap_or(0.0);

        ranked
            .iter()
            .enumerate()
            .map(|(rank, (signature, stats))| {
                let by_rank = (rank + 1).min(3) as u8;
                let by_band = if top_size <= 0.0 {
                    1
                } else {
                    let share = stats.avg_font_size() / top_size;
                    if share >= self.config.h1_min_relative_size {
                        1
                    } else if share >= self.config.h2_min_relative_size {
                        2
                    } else {
                        3
                    }
                };
                let level = HeadingLevel::from_depth(by_rank.max(by_band));
                log::debug!(
                    "Signature {:?}: {} headings, avg ratio {:.2} -> {}",
                    signature,
                    stats.count,
                    stats.avg_relative_size(),
                    level
                );
                (*signature, level)
            })
            .collect()
    }
}

/// Resolve levels in document order against a virtual root of depth 0.
///
/// A level deeper than the previous level plus one is pulled up to the
/// previous level plus one, unless every level it skips has already
/// appeared earlier in the document.
pub fn resolve_levels(levels: &[HeadingLevel]) -> Vec<HeadingLevel> {
    let mut established = [false; 4];
    let mut previous = 0u8;

    levels
        .iter()
        .map(|level| {
            let mut depth = level.depth();
            if depth > previous + 1 && !(previous + 1..depth).all(|d| established[d as usize]) {
                depth = previous + 1;
            }
            established[depth as usize] = true;
            previous = depth;
            HeadingLevel::from_depth(depth)
        })
        .collect()
}

/// Widest horizontal gap between two fragments of one heading, in points.
const MAX_FRAGMENT_GAP: f32 = 50.0;

/// One of two merged fragments must be at most this many characters.
const MAX_FRAGMENT_CHARS: usize = 5;

/// Merge candidates that are fragments of one visual line.
///
/// Fragments must be adjacent in reading order, share a page and a font
/// signature, start at the same height, sit at most 50pt apart, and at
/// least one of them must be a short piece such as a number.
pub fn merge_line_fragments(candidates: Vec<HeadingCandidate>) -> Vec<HeadingCandidate> {
    let mut merged: Vec<HeadingCandidate> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        if let Some(last) = merged.last_mut() {
            if last.page() == candidate.page()
                && last.signature == candidate.signature
                && on_same_line(&last.run, &candidate.run)
                && is_fragment_pair(last, &candidate)
            {
                if !joins_without_space(&last.run.text, &candidate.run.text) {
                    last.run.text.push(' ');
                }
                last.run.text.push_str(&candidate.run.text);
                last.run.bbox.x0 = last.run.bbox.x0.min(candidate.run.bbox.x0);
                last.run.bbox.x1 = last.run.bbox.x1.max(candidate.run.bbox.x1);
                last.run.bbox.y1 = last.run.bbox.y1.max(candidate.run.bbox.y1);
                last.confidence = last.confidence.max(candidate.confidence);
                continue;
            }
        }
        merged.push(candidate);
    }

    merged
}

fn is_fragment_pair(left: &HeadingCandidate, right: &HeadingCandidate) -> bool {
    let gap = right.run.bbox.x0 - left.run.bbox.x1;
    let short = |c: &HeadingCandidate| c.text().trim().chars().count() <= MAX_FRAGMENT_CHARS;
    gap <= MAX_FRAGMENT_GAP && (short(left) || short(right))
}

/// Drop a candidate whose text and page equal the one right before it.
fn drop_repeats(candidates: Vec<HeadingCandidate>) -> Vec<HeadingCandidate> {
    let mut kept: Vec<HeadingCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let repeat = kept
            .last()
            .is_some_and(|last| last.page() == candidate.page() && last.text() == candidate.text());
        if repeat {
            continue;
        }
        kept.push(candidate);
    }
    kept
}
