use paperweave::labeling::{
    fix_double_begin_markers, relabel_table_figure_as_paragraph, revert_bad_spans,
    ConsolidationOptions, SequenceLine, Strictness, TaggedRow, TaggedSequence,
};
use paperweave::model::{LayoutToken, StructuralObject};
use proptest::prelude::*;

const LABELS: [&str; 6] = [
    "I-<table>",
    "<table>",
    "I-<figure>",
    "<figure>",
    "I-<paragraph>",
    "<paragraph>",
];

/// Tokens drawn from a small alphabet so that span texts repeat.
const WORDS: [&str; 4] = ["Table", "1", "Fig", "a"];

/// Sequences over [`WORDS`]; `None` entries are boundaries.
fn arb_sequence() -> impl Strategy<Value = TaggedSequence> {
    prop::collection::vec(
        prop::option::weighted(0.9, (0..WORDS.len(), 0..LABELS.len())),
        1..60,
    )
    .prop_map(|rows| {
        let lines = rows
            .into_iter()
            .map(|row| match row {
                Some((w, l)) => SequenceLine::Row(TaggedRow::new([WORDS[w]], LABELS[l])),
                None => SequenceLine::Boundary,
            })
            .collect();
        TaggedSequence::from_lines(lines)
    })
}

fn arb_strictness() -> impl Strategy<Value = Strictness> {
    prop_oneof![
        Just(Strictness::Auto),
        Just(Strictness::Strict),
        Just(Strictness::Lenient),
    ]
}

/// Tables built from windows of the sequence's own rows.
fn objects_for(seq: &TaggedSequence, windows: &[(usize, usize)]) -> Vec<StructuralObject> {
    windows
        .iter()
        .map(|&(start, len)| {
            let start = start % seq.len();
            let end = (start + len).min(seq.len());
            let tokens = (start..end)
                .filter_map(|offset| seq.row(offset))
                .enumerate()
                .map(|(i, row)| LayoutToken::without_coords(row.token(), i))
                .collect();
            StructuralObject::table(tokens)
        })
        .collect()
}

fn item_rows(seq: &TaggedSequence) -> usize {
    LABELS[..4].iter().map(|l| seq.count_label(l)).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn revert_is_idempotent(
        seq in arb_sequence(),
        windows in prop::collection::vec((0usize..60, 1usize..8), 0..4),
        strictness in arb_strictness(),
    ) {
        let objects = objects_for(&seq, &windows);
        let options = ConsolidationOptions::new().with_strictness(strictness);

        let once = revert_bad_spans(&objects, &seq, &options);
        let twice = revert_bad_spans(&objects, &once, &options);
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.len(), seq.len());
    }

    #[test]
    fn revert_keeps_column_count(
        seq in arb_sequence(),
        windows in prop::collection::vec((0usize..60, 1usize..8), 0..4),
    ) {
        let objects = objects_for(&seq, &windows);
        let reverted = revert_bad_spans(&objects, &seq, &ConsolidationOptions::default());
        prop_assert!(reverted.rows().all(|(_, row)| row.column_count() == 2));
        prop_assert!(item_rows(&reverted) <= item_rows(&seq));
    }

    #[test]
    fn relabel_leaves_no_items(seq in arb_sequence()) {
        let relabeled = relabel_table_figure_as_paragraph(&seq);
        prop_assert_eq!(item_rows(&relabeled), 0);
        prop_assert_eq!(relabeled.rows().count(), seq.rows().count());
        prop_assert_eq!(relabel_table_figure_as_paragraph(&relabeled), relabeled);
    }

    #[test]
    fn fix_double_begin_is_idempotent(seq in arb_sequence()) {
        let fixed = fix_double_begin_markers(&seq);
        prop_assert_eq!(fix_double_begin_markers(&fixed), fixed.clone());
        prop_assert_eq!(item_rows(&fixed), item_rows(&seq));
    }
}
