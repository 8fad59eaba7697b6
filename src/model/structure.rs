//! Tables and figures recognised upstream.

use super::LayoutToken;
use crate::labeling::{FIGURE_LABEL, TABLE_LABEL};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Kind of structural object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    Table,
    Figure,
}

impl StructureKind {
    /// Label the tagger uses for this kind, e.g. `<table>`.
    pub fn label(&self) -> &'static str {
        match self {
            StructureKind::Table => TABLE_LABEL,
            StructureKind::Figure => FIGURE_LABEL,
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureKind::Table => write!(f, "table"),
            StructureKind::Figure => write!(f, "figure"),
        }
    }
}

/// A table or figure owning a sub-range of the document token stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralObject {
    pub kind: StructureKind,

    /// Tokens of the object, whitespace tokens included
    pub tokens: Vec<LayoutToken>,

    /// Caption sub-range, as indices into `tokens`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<Range<usize>>,
}

impl StructuralObject {
    pub fn table(tokens: Vec<LayoutToken>) -> Self {
        Self {
            kind: StructureKind::Table,
            tokens,
            caption: None,
        }
    }

    pub fn figure(tokens: Vec<LayoutToken>) -> Self {
        Self {
            kind: StructureKind::Figure,
            tokens,
            caption: None,
        }
    }

    /// Set the caption sub-range.
    pub fn with_caption(mut self, caption: Range<usize>) -> Self {
        self.caption = Some(caption);
        self
    }

    /// Caption tokens, empty when no valid caption range is set.
    pub fn caption_tokens(&self) -> &[LayoutToken] {
        self.caption
            .as_ref()
            .and_then(|r| self.tokens.get(r.clone()))
            .unwrap_or(&[])
    }

    /// Texts of the non-blank tokens, stripped.
    pub fn non_blank_texts(&self) -> Vec<&str> {
        self.tokens
            .iter()
            .map(|t| t.text.trim())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(texts: &[&str]) -> Vec<LayoutToken> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| LayoutToken::without_coords(*t, i))
            .collect()
    }

    #[test]
    fn test_kind_label() {
        assert_eq!(StructureKind::Table.label(), "<table>");
        assert_eq!(StructureKind::Figure.label(), "<figure>");
        assert_eq!(StructureKind::Figure.to_string(), "figure");
    }

    #[test]
    fn test_caption_tokens() {
        let fig = StructuralObject::figure(tokens(&["Fig", " ", "1", ".", " ", "Plot"]))
            .with_caption(0..4);
        assert_eq!(fig.caption_tokens().len(), 4);

        let fig = fig.with_caption(3..40);
        assert!(fig.caption_tokens().is_empty());
    }

    #[test]
    fn test_non_blank_texts() {
        let table = StructuralObject::table(tokens(&["Table", " ", "1", ":", "\n"]));
        assert_eq!(table.non_blank_texts(), vec!["Table", "1", ":"]);
    }
}
