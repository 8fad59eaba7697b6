//! Document-level types.

use super::{Block, Page};
use serde::{Deserialize, Serialize};

/// A document as delivered by the layout converter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Pages in the document
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&Page> {
        self.pages.iter().find(|p| p.number == page_num)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// All blocks, page by page, in reading order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.pages.iter().flat_map(|p| p.blocks.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|p| p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, LayoutToken};

    #[test]
    fn test_document_iterators() {
        let mut page = Page::a4(1);
        page.add_block(Block::from_tokens(
            1,
            vec![
                LayoutToken::new(
                    "a",
                    0,
                    BoundingBox::from_point_and_dimensions(1, 0.0, 0.0, 5.0, 5.0),
                ),
                LayoutToken::without_coords("b", 1),
            ],
        ));
        let mut doc = Document::new();
        assert!(doc.is_empty());
        doc.add_page(page);
        doc.add_page(Page::a4(2));

        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.blocks().count(), 1);
        assert_eq!(doc.blocks().flat_map(|b| b.tokens.iter()).count(), 2);
        assert!(doc.get_page(2).is_some());
        assert!(doc.get_page(3).is_none());
        assert!(!doc.is_empty());
    }
}
