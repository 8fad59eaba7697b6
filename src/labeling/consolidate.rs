//! Reconciliation of tagger output with validated tables and figures.
//!
//! Every function takes a sequence by reference and returns a rewritten
//! copy. Rows only ever change label; the column count of every row is
//! preserved.

use super::label::{base_label, to_begin};
use super::options::ConsolidationOptions;
use super::sequence::{SequenceLine, TaggedRow, TaggedSequence};
use super::{FIGURE_LABEL, PARAGRAPH_LABEL, TABLE_LABEL};
use crate::error::{Error, Result};
use crate::model::{StructuralObject, StructureKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn is_item_label(base: &str) -> bool {
    base == TABLE_LABEL || base == FIGURE_LABEL
}

/// Rewrite every table and figure row as paragraph text.
///
/// Continuation rows become `<paragraph>`. A begin row becomes
/// `I-<paragraph>`, unless the previous row was paragraph text, in which
/// case it continues that paragraph. Segment boundaries reset the context.
pub fn relabel_table_figure_as_paragraph(seq: &TaggedSequence) -> TaggedSequence {
    let mut lines = Vec::with_capacity(seq.len());
    let mut previous: Option<&str> = None;

    for line in seq.lines() {
        match line {
            SequenceLine::Boundary => {
                previous = None;
                lines.push(SequenceLine::Boundary);
            }
            SequenceLine::Row(row) => {
                let rewritten = if is_item_label(row.base_label()) {
                    let after_paragraph = previous.is_some_and(|p| p.ends_with(PARAGRAPH_LABEL));
                    row.relabeled(PARAGRAPH_LABEL, row.is_begin() && !after_paragraph)
                } else {
                    row.clone()
                };
                previous = Some(row.label.as_str());
                lines.push(SequenceLine::Row(rewritten));
            }
        }
    }

    seq.with_lines(lines)
}

/// Demote a table or figure begin row that directly follows a begin row of
/// the same kind, as in `I-<figure> I-<figure>`.
///
/// Rows are compared with the original previous label, so a run of begin
/// rows keeps only its first one.
pub fn fix_double_begin_markers(seq: &TaggedSequence) -> TaggedSequence {
    let mut lines = Vec::with_capacity(seq.len());
    let mut previous: Option<&str> = None;

    for line in seq.lines() {
        match line {
            SequenceLine::Boundary => {
                previous = None;
                lines.push(SequenceLine::Boundary);
            }
            SequenceLine::Row(row) => {
                let doubled = row.is_begin()
                    && is_item_label(row.base_label())
                    && previous == Some(row.label.as_str());
                lines.push(SequenceLine::Row(if doubled {
                    row.relabeled(row.base_label(), false)
                } else {
                    row.clone()
                }));
                previous = Some(row.label.as_str());
            }
        }
    }

    seq.with_lines(lines)
}

fn non_blank<T: AsRef<str>>(texts: &[T]) -> Vec<&str> {
    texts
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Offsets of rows that could start the span of `target` tokens.
///
/// A row is a candidate when its token equals the first non-blank target
/// token and it is labeled `label`. In strict mode only begin rows are
/// considered, unless none match; otherwise continuation rows are accepted
/// too. Several candidates are common: tables often start alike.
pub fn find_candidate_offsets<T: AsRef<str>>(
    target: &[T],
    seq: &TaggedSequence,
    label: &str,
    strict: bool,
) -> Vec<usize> {
    let Some(first) = non_blank(target).first().copied() else {
        return Vec::new();
    };
    let base = base_label(label);
    let begin = to_begin(base);

    let matching = |accept_continuation: bool| -> Vec<usize> {
        seq.rows()
            .filter(|(_, row)| row.token() == first)
            .filter(|(_, row)| row.label == begin || (accept_continuation && row.label == base))
            .map(|(offset, _)| offset)
            .collect()
    };

    let mut candidates = matching(false);
    if candidates.is_empty() || !strict {
        candidates = matching(true);
    }
    log::debug!("{} candidate offsets for '{}' {}", candidates.len(), first, base);
    candidates
}

/// Concatenated tokens of the `len` lines starting at `offset`.
fn window_text(seq: &TaggedSequence, offset: usize, len: usize) -> String {
    let end = offset.saturating_add(len).min(seq.len());
    seq.lines()
        .get(offset..end)
        .unwrap_or(&[])
        .iter()
        .map(|line| line.as_row().map_or("", TaggedRow::token))
        .collect()
}

/// The first candidate whose window of rows spells exactly the target
/// texts, blanks ignored. `None` when no candidate matches.
///
/// A lone candidate is verified like any other, which keeps repeated
/// reversions from landing on a different span.
pub fn disambiguate_candidate<T: AsRef<str>>(
    offsets: &[usize],
    seq: &TaggedSequence,
    target_texts: &[T],
) -> Option<usize> {
    let texts = non_blank(target_texts);
    if texts.is_empty() {
        return None;
    }
    let expected: String = texts.concat();
    offsets
        .iter()
        .copied()
        .find(|&offset| window_text(seq, offset, texts.len()) == expected)
}

/// Rewrite the rows of a located span as paragraph text; returns the
/// offset right after the span.
///
/// The span stops early at a boundary or at the next begin row. Rows with
/// another label inside the span are left alone.
fn revert_span(seq: &mut TaggedSequence, start: usize, len: usize, label: &str) -> usize {
    let end = start.saturating_add(len).min(seq.len());
    let mut offset = start;
    while offset < end {
        let Some(row) = seq.row(offset) else {
            break;
        };
        if offset > start && row.is_begin() {
            break;
        }
        if row.has_base_label(label) {
            let reverted = row.relabeled(PARAGRAPH_LABEL, row.is_begin());
            seq.set_row(offset, reverted);
        }
        offset += 1;
    }

    // the rest of a longer span would dangle without its begin row
    if let Some(row) = seq.row(offset) {
        if !row.is_begin() && row.has_base_label(label) {
            let promoted = row.relabeled(label, true);
            seq.set_row(offset, promoted);
        }
    }
    offset
}

/// Start of a span spelling `texts` under `label`, begin rows first.
///
/// In strict mode continuation rows are tried only when no begin row
/// spells the texts.
fn locate_span<T: AsRef<str>>(
    texts: &[T],
    seq: &TaggedSequence,
    label: &str,
    strict: bool,
) -> Option<usize> {
    let candidates = find_candidate_offsets(texts, seq, label, strict);
    disambiguate_candidate(&candidates, seq, texts).or_else(|| {
        if !strict {
            return None;
        }
        let candidates = find_candidate_offsets(texts, seq, label, false);
        disambiguate_candidate(&candidates, seq, texts)
    })
}

/// Rewrite the spans of rejected tables and figures as paragraph text.
///
/// Each object's span is located with [`find_candidate_offsets`] and
/// [`disambiguate_candidate`]. The search repeats until no row of the
/// object's kind starts a window spelling its text, so a repeated text or a
/// remainder promoted after a revert is reverted in the same call. Objects
/// that cannot be located are logged and leave the sequence unchanged.
///
/// Reverting only ever removes table and figure labels, so the result is a
/// fixed point: running this twice gives the same result as running it once.
pub fn revert_bad_spans(
    objects: &[StructuralObject],
    seq: &TaggedSequence,
    options: &ConsolidationOptions,
) -> TaggedSequence {
    let mut strict_by_kind: HashMap<StructureKind, bool> = HashMap::new();
    for kind in [StructureKind::Table, StructureKind::Figure] {
        let flagged = objects.iter().filter(|o| o.kind == kind).count();
        let begin_rows = seq.count_label(&to_begin(kind.label()));
        strict_by_kind.insert(kind, options.strictness.is_strict(flagged, begin_rows));
    }

    let mut result = seq.clone();
    let mut reverted = 0;
    for object in objects {
        let label = object.kind.label();
        let texts = object.non_blank_texts();
        let strict = strict_by_kind.get(&object.kind).copied().unwrap_or(true);

        let mut spans = 0;
        while let Some(start) = locate_span(&texts, &result, label, strict) {
            revert_span(&mut result, start, texts.len(), label);
            spans += 1;
        }

        match spans {
            0 => log::info!("No span found for a bad {}", object.kind),
            1 => reverted += 1,
            n => {
                log::debug!("text of a bad {} found in {} spans", object.kind, n);
                reverted += 1;
            }
        }
    }

    log::debug!("reverted {} of {} bad spans", reverted, objects.len());
    result
}

/// Rows pulled out of the tagger output, to be put back at line `offset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardedSpan {
    /// Line of the sequence before which the rows go back
    pub offset: usize,
    pub rows: Vec<TaggedRow>,
}

impl DiscardedSpan {
    pub fn new(offset: usize, rows: Vec<TaggedRow>) -> Self {
        Self { offset, rows }
    }
}

/// Insert discarded rows back as paragraph text.
///
/// Offsets refer to the sequence as given; spans are inserted in ascending
/// offset order. The first inserted row opens a paragraph unless it
/// follows paragraph text, and a paragraph begin row right after the
/// inserted rows becomes a continuation, so each paragraph run keeps a
/// single begin marker.
///
/// Fails with [`Error::MalformedSequence`] when an offset lies past the
/// end or a row's column count differs from the sequence's.
pub fn splice_discarded_tokens_back(
    spans: &[DiscardedSpan],
    seq: &TaggedSequence,
) -> Result<TaggedSequence> {
    let mut sorted: Vec<&DiscardedSpan> = spans.iter().filter(|s| !s.rows.is_empty()).collect();
    sorted.sort_by_key(|s| s.offset);

    let columns = seq
        .column_count()
        .or_else(|| sorted.first().and_then(|s| s.rows.first()).map(TaggedRow::column_count));
    for span in &sorted {
        if span.offset > seq.len() {
            return Err(Error::MalformedSequence {
                line: span.offset + 1,
                reason: format!("splice offset past the {} lines of the sequence", seq.len()),
            });
        }
        if let Some(expected) = columns {
            if let Some(bad) = span.rows.iter().find(|r| r.column_count() != expected) {
                return Err(Error::MalformedSequence {
                    line: span.offset + 1,
                    reason: format!(
                        "spliced row '{}' has {} columns, expected {}",
                        bad.token(),
                        bad.column_count(),
                        expected
                    ),
                });
            }
        }
    }

    let inserted: usize = sorted.iter().map(|s| s.rows.len()).sum();
    let mut lines: Vec<SequenceLine> = Vec::with_capacity(seq.len() + inserted);
    let mut pending = sorted.into_iter().peekable();

    for offset in 0..=seq.len() {
        let mut spliced = false;
        while let Some(span) = pending.next_if(|s| s.offset == offset) {
            let continues = matches!(
                lines.last(),
                Some(SequenceLine::Row(prev)) if prev.has_base_label(PARAGRAPH_LABEL)
            );
            for (i, row) in span.rows.iter().enumerate() {
                lines.push(SequenceLine::Row(row.relabeled(PARAGRAPH_LABEL, i == 0 && !continues)));
            }
            spliced = true;
        }

        let Some(line) = seq.lines().get(offset) else {
            break;
        };
        lines.push(match line {
            SequenceLine::Row(row)
                if spliced && row.is_begin() && row.has_base_label(PARAGRAPH_LABEL) =>
            {
                SequenceLine::Row(row.relabeled(PARAGRAPH_LABEL, false))
            }
            other => other.clone(),
        });
    }

    log::debug!("spliced {} discarded rows back", inserted);
    Ok(seq.with_lines(lines))
}
