//! Line-oriented tagger output.
//!
//! Each non-blank line is one token: feature columns followed by the
//! predicted label. Blank lines separate segments and are kept as
//! [`SequenceLine::Boundary`], so line offsets stay stable across rewrites.

use super::label::{base_label, is_begin, to_begin, to_continuation};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One token of tagger output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedRow {
    /// Feature columns; the first is the token text
    pub features: Vec<String>,
    pub label: String,
}

impl TaggedRow {
    pub fn new<S: Into<String>>(features: impl IntoIterator<Item = S>, label: impl Into<String>) -> Self {
        Self {
            features: features.into_iter().map(Into::into).collect(),
            label: label.into(),
        }
    }

    /// Token text (first column).
    pub fn token(&self) -> &str {
        self.features.first().map(String::as_str).unwrap_or("")
    }

    /// Number of columns, label included.
    pub fn column_count(&self) -> usize {
        self.features.len() + 1
    }

    pub fn is_begin(&self) -> bool {
        is_begin(&self.label)
    }

    /// Label without begin marker.
    pub fn base_label(&self) -> &str {
        base_label(&self.label)
    }

    pub fn has_base_label(&self, base: &str) -> bool {
        self.base_label() == base
    }

    /// Same row with another label.
    pub fn with_label(&self, label: impl Into<String>) -> Self {
        Self {
            features: self.features.clone(),
            label: label.into(),
        }
    }

    /// Same row relabeled `base`, as a begin or a continuation row.
    pub fn relabeled(&self, base: &str, begin: bool) -> Self {
        if begin {
            self.with_label(to_begin(base))
        } else {
            self.with_label(to_continuation(base))
        }
    }
}

/// A line of a tagged sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceLine {
    Row(TaggedRow),
    Boundary,
}

impl SequenceLine {
    pub fn as_row(&self) -> Option<&TaggedRow> {
        match self {
            SequenceLine::Row(row) => Some(row),
            SequenceLine::Boundary => None,
        }
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self, SequenceLine::Boundary)
    }
}

/// Tagger output, as an ordered list of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedSequence {
    lines: Vec<SequenceLine>,

    /// Columns are tab separated (otherwise single spaces)
    tab_separated: bool,

    trailing_newline: bool,
}

impl TaggedSequence {
    /// Build a tab-separated sequence from lines.
    pub fn from_lines(lines: Vec<SequenceLine>) -> Self {
        Self {
            lines,
            tab_separated: true,
            trailing_newline: true,
        }
    }

    /// Build a tab-separated sequence without boundaries.
    pub fn from_rows(rows: impl IntoIterator<Item = TaggedRow>) -> Self {
        Self::from_lines(rows.into_iter().map(SequenceLine::Row).collect())
    }

    /// Parse tagger output.
    ///
    /// Columns are split on tabs when the text contains any, otherwise on
    /// whitespace. Every non-blank line needs at least a token and a label.
    pub fn parse(text: &str) -> Result<Self> {
        let tab_separated = text.contains('\t') || !text.chars().any(|c| c == ' ');
        let trailing_newline = text.ends_with('\n');
        let body = text.strip_suffix('\n').unwrap_or(text);

        let mut lines = Vec::new();
        if body.is_empty() && !trailing_newline {
            return Ok(Self {
                lines,
                tab_separated,
                trailing_newline,
            });
        }

        for (index, raw) in body.split('\n').enumerate() {
            let raw = raw.strip_suffix('\r').unwrap_or(raw);
            if raw.trim().is_empty() {
                lines.push(SequenceLine::Boundary);
                continue;
            }
            let mut columns: Vec<String> = if tab_separated {
                raw.split('\t').map(str::to_string).collect()
            } else {
                raw.split_whitespace().map(str::to_string).collect()
            };
            if columns.len() < 2 {
                return Err(Error::MalformedSequence {
                    line: index + 1,
                    reason: "expected at least a token and a label".to_string(),
                });
            }
            let label = columns.pop().unwrap_or_default();
            lines.push(SequenceLine::Row(TaggedRow {
                features: columns,
                label,
            }));
        }

        Ok(Self {
            lines,
            tab_separated,
            trailing_newline,
        })
    }

    pub fn lines(&self) -> &[SequenceLine] {
        &self.lines
    }

    /// Number of lines, boundaries included.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Row at line `offset`, `None` for boundaries and out of range offsets.
    pub fn row(&self, offset: usize) -> Option<&TaggedRow> {
        self.lines.get(offset).and_then(SequenceLine::as_row)
    }

    /// Rows with their line offsets.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &TaggedRow)> {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| line.as_row().map(|row| (i, row)))
    }

    /// Column count of the first row, `None` without rows.
    pub fn column_count(&self) -> Option<usize> {
        self.rows().next().map(|(_, row)| row.column_count())
    }

    /// Number of rows labeled exactly `label`.
    pub fn count_label(&self, label: &str) -> usize {
        self.rows().filter(|(_, row)| row.label == label).count()
    }

    /// Replace the row at line `offset`. Boundaries and out of range offsets
    /// are left alone.
    pub(crate) fn set_row(&mut self, offset: usize, row: TaggedRow) {
        if let Some(SequenceLine::Row(current)) = self.lines.get_mut(offset) {
            *current = row;
        }
    }

    /// Same formatting, different lines.
    pub fn with_lines(&self, lines: Vec<SequenceLine>) -> Self {
        Self {
            lines,
            tab_separated: self.tab_separated,
            trailing_newline: self.trailing_newline,
        }
    }
}

impl FromStr for TaggedSequence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for TaggedSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if self.tab_separated { "\t" } else { " " };
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            if let SequenceLine::Row(row) = line {
                for column in &row.features {
                    write!(f, "{column}{separator}")?;
                }
                write!(f, "{}", row.label)?;
            }
        }
        if self.trailing_newline && !self.lines.is_empty() {
            writeln!(f)?;
        }
        Ok(())
    }
}
