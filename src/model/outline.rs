//! Outline types: heading levels, nodes and the assembled document outline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Heading level. Only three levels are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeadingLevel {
    /// Top-level heading
    H1,
    /// Second-level heading
    H2,
    /// Third-level heading
    H3,
}

impl HeadingLevel {
    /// Numeric depth (1-3).
    pub fn depth(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    /// Level for a depth, clamped into 1-3.
    pub fn from_depth(depth: u8) -> Self {
        match depth {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.depth())
    }
}

/// A heading with its final level, before page numbering is converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineNode {
    /// Heading level
    pub level: HeadingLevel,
    /// Heading text
    pub text: String,
    /// Page index (0-based)
    pub page_index: usize,
}

impl OutlineNode {
    /// Create a new outline node.
    pub fn new(level: HeadingLevel, text: impl Into<String>, page_index: usize) -> Self {
        Self {
            level,
            text: text.into(),
            page_index,
        }
    }
}

/// One entry in the serialized outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Heading level
    pub level: HeadingLevel,
    /// Heading text
    pub text: String,
    /// Page number (1-based)
    pub page: usize,
}

/// Final extraction result: the title plus the ordered heading list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOutline {
    /// Document title (may be empty)
    pub title: String,
    /// Headings in document order
    pub outline: Vec<OutlineEntry>,
}

impl DocumentOutline {
    /// Create an empty outline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of headings.
    pub fn len(&self) -> usize {
        self.outline.len()
    }

    /// Whether there are no headings.
    pub fn is_empty(&self) -> bool {
        self.outline.is_empty()
    }

    /// Whether a title was found.
    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }

    /// Number of headings at the given level.
    pub fn count_level(&self, level: HeadingLevel) -> usize {
        self.outline.iter().filter(|e| e.level == level).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_depth() {
        assert_eq!(HeadingLevel::H1.depth(), 1);
        assert_eq!(HeadingLevel::from_depth(2), HeadingLevel::H2);
        assert_eq!(HeadingLevel::from_depth(7), HeadingLevel::H3);
        assert_eq!(HeadingLevel::from_depth(0), HeadingLevel::H1);
        assert_eq!(HeadingLevel::H3.to_string(), "H3");
    }

    #[test]
    fn test_outline_serialization_shape() {
        let outline = DocumentOutline {
            title: "Report".to_string(),
            outline: vec![OutlineEntry {
                level: HeadingLevel::H1,
                text: "Introduction".to_string(),
                page: 1,
            }],
        };
        let json = serde_json::to_string(&outline).unwrap();
        assert_eq!(
            json,
            r#"{"title":"Report","outline":[{"level":"H1","text":"Introduction","page":1}]}"#
        );
    }

    #[test]
    fn test_outline_counts() {
        let mut outline = DocumentOutline::new();
        assert!(outline.is_empty());
        assert!(!outline.has_title());

        outline.outline.push(OutlineEntry {
            level: HeadingLevel::H2,
            text: "A".into(),
            page: 2,
        });
        assert_eq!(outline.len(), 1);
        assert_eq!(outline.count_level(HeadingLevel::H2), 1);
        assert_eq!(outline.count_level(HeadingLevel::H1), 0);
    }
}
