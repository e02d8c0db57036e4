//! Outline assembly.

use crate::model::{DocumentOutline, OutlineEntry, OutlineNode};

/// Package the title and nodes into the final outline, converting page
/// indices to 1-based page numbers.
pub fn assemble(title: &str, nodes: &[OutlineNode]) -> DocumentOutline {
    DocumentOutline {
        title: title.to_string(),
        outline: nodes
            .iter()
            .map(|node| OutlineEntry {
                level: node.level,
                text: node.text.clone(),
                page: node.page_index + 1,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HeadingLevel;

    #[test]
    fn test_assemble_converts_pages() {
        let nodes = vec![
            OutlineNode::new(HeadingLevel::H1, "Introduction", 0),
            OutlineNode::new(HeadingLevel::H2, "Background", 2),
        ];
        let outline = assemble("Report", &nodes);

        assert_eq!(outline.title, "Report");
        assert_eq!(outline.outline[0].page, 1);
        assert_eq!(outline.outline[1].page, 3);
        assert_eq!(outline.outline[1].level, HeadingLevel::H2);
    }

    #[test]
    fn test_assemble_empty() {
        let outline = assemble("", &[]);
        assert_eq!(outline, DocumentOutline::default());
    }
}
