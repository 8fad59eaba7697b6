//! Page-level types.

use super::{tokens_to_text, BoundingBox, LayoutToken};
use crate::layout::calculate_one_box;
use serde::{Deserialize, Serialize};

/// An ordered run of tokens sharing one bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Page number (1-indexed)
    pub page: u32,

    /// Box enclosing the positioned tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,

    /// Tokens in reading order
    pub tokens: Vec<LayoutToken>,
}

impl Block {
    /// Create a block, deriving its box from the tokens.
    pub fn from_tokens(page: u32, tokens: Vec<LayoutToken>) -> Self {
        let bbox = calculate_one_box(&tokens, true);
        Self { page, bbox, tokens }
    }

    /// Create a block with an explicit box.
    pub fn with_bbox(page: u32, bbox: BoundingBox, tokens: Vec<LayoutToken>) -> Self {
        Self {
            page,
            bbox: Some(bbox),
            tokens,
        }
    }

    /// Plain text of the block.
    pub fn text(&self) -> String {
        tokens_to_text(&self.tokens)
    }

    /// Whether the token stream position falls inside this block.
    pub fn contains_offset(&self, offset: usize) -> bool {
        match (self.tokens.first(), self.tokens.last()) {
            (Some(first), Some(last)) => first.offset <= offset && offset <= last.offset,
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A single page in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points
    pub width: f64,

    /// Page height in points
    pub height: f64,

    /// Main content area, used as layout reference
    pub main_area: BoundingBox,

    /// Blocks in reading order
    pub blocks: Vec<Block>,
}

impl Page {
    /// Create a page whose main area is the whole page.
    pub fn new(number: u32, width: f64, height: f64) -> Self {
        Self {
            number,
            width,
            height,
            main_area: BoundingBox::from_point_and_dimensions(number, 0.0, 0.0, width, height),
            blocks: Vec::new(),
        }
    }

    /// Create a new page with standard A4 size (210 x 297 mm).
    pub fn a4(number: u32) -> Self {
        Self::new(number, 595.0, 842.0)
    }

    /// Set the main content area.
    pub fn with_main_area(mut self, main_area: BoundingBox) -> Self {
        self.main_area = main_area;
        self
    }

    /// Add a block to the page.
    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
