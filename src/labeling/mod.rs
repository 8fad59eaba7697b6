//! Consolidation of sequence-labelling output.
//!
//! The tagger labels every token of the body text. Tables and figures that
//! fail validation downstream must go back to the paragraph flow, and the
//! label sequence has to be rewritten to match. This module holds the
//! tagged sequence type and the rewrite passes over it.

mod caption;
mod consolidate;
mod label;
mod options;
mod sequence;

pub use caption::{repair_caption_boundary, CaptionRepair, CAPTION_PREFIXES, CAPTION_PROXIMITY};
pub use consolidate::{
    disambiguate_candidate, find_candidate_offsets, fix_double_begin_markers,
    relabel_table_figure_as_paragraph, revert_bad_spans, splice_discarded_tokens_back,
    DiscardedSpan,
};
pub use label::{base_label, is_begin, to_begin, to_continuation};
pub use options::{ConsolidationOptions, Strictness};
pub use sequence::{SequenceLine, TaggedRow, TaggedSequence};

/// Marker opening a labelled span
pub const BEGIN_PREFIX: &str = "I-";

pub const TABLE_LABEL: &str = "<table>";
pub const FIGURE_LABEL: &str = "<figure>";
pub const PARAGRAPH_LABEL: &str = "<paragraph>";
