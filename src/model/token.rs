//! Layout tokens.

use super::BoundingBox;
use serde::{Deserialize, Serialize};

/// A piece of text with its position on the page.
///
/// Tokens lacking geometry (`bbox == None`) are skipped by every geometry
/// aggregation; they are never treated as a zero-sized box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutToken {
    /// Token text, whitespace tokens included
    pub text: String,

    /// Ordinal position in the document token stream
    pub offset: usize,

    /// Position on the page, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

impl LayoutToken {
    /// Create a positioned token.
    pub fn new(text: impl Into<String>, offset: usize, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            offset,
            bbox: Some(bbox),
        }
    }

    /// Create a token without coordinates.
    pub fn without_coords(text: impl Into<String>, offset: usize) -> Self {
        Self {
            text: text.into(),
            offset,
            bbox: None,
        }
    }

    pub fn has_coords(&self) -> bool {
        self.bbox.is_some()
    }

    /// Page of the token, if positioned.
    pub fn page(&self) -> Option<u32> {
        self.bbox.map(|b| b.page())
    }

    /// Whether the token carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl AsRef<str> for LayoutToken {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Concatenate token texts as they appear in the stream.
pub fn tokens_to_text(tokens: &[LayoutToken]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}
