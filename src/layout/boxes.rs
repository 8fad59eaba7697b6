//! Box consolidation primitives.
//!
//! Collapsing token boxes into line boxes, merging touching graphic
//! objects, and fixpoint merging/gluing of plain boxes. Every function
//! returns a new collection; inputs are never modified.

use crate::model::{BoundingBox, GraphicObject, LayoutToken, Page};
use std::cmp::Ordering;

/// Maximum vertical drift between two boxes of the same line.
pub const LINE_Y_TOLERANCE: f64 = 4.0;

/// Maximum horizontal gap between two boxes of the same line.
pub const LINE_X_GAP: f64 = 15.0;

/// Tolerance for two edges to count as shared.
pub const EDGE_TOLERANCE: f64 = 1.0;

/// Minimum perpendicular overlap and extent ratio for a partial-alignment merge.
pub const ALIGNMENT_PERCENTAGE: f64 = 0.85;

/// Glued boxes with width or height under this are dropped.
pub const MIN_GLUED_EXTENT: f64 = 5.0;

/// Graphic objects with a smaller area are never figures.
pub const MIN_GRAPHIC_AREA: f64 = 1000.0;

/// Graphic objects narrower or shorter than this are never figures.
pub const MIN_GRAPHIC_EXTENT: f64 = 50.0;

/// Fraction of a box allowed outside the page main area.
pub const MAX_OUTSIDE_RATIO: f64 = 0.03;

/// Objects at least this large are kept even when mostly outside the main area.
pub const MINIMUM_BITMAP_AREA: f64 = 20_000.0;

/// Union of the positioned tokens, `None` when no token has coordinates.
///
/// With `ignore_other_pages`, tokens on a different page than the first
/// positioned token are left out.
pub fn calculate_one_box(tokens: &[LayoutToken], ignore_other_pages: bool) -> Option<BoundingBox> {
    tokens
        .iter()
        .filter_map(|t| t.bbox)
        .reduce(|acc, b| {
            if ignore_other_pages {
                acc.union_excluding_other_page(&b)
            } else {
                acc.union(&b)
            }
        })
}

/// Whether `next` continues the line of `prev`: same page, aligned top and
/// bottom edges, starting at or after `prev` with a small horizontal gap.
pub fn near(prev: &BoundingBox, next: &BoundingBox) -> bool {
    prev.page() == next.page()
        && (prev.y() - next.y()).abs() < LINE_Y_TOLERANCE
        && (prev.y2() - next.y2()).abs() < LINE_Y_TOLERANCE
        && next.x() - prev.x2() < LINE_X_GAP
        && next.x() >= prev.x()
}

/// Collapse a token run into line-level boxes.
///
/// Tokens without coordinates or with a zero width/height are skipped. A
/// token joins the current line when it is [`near`] the previous token.
pub fn collapse_tokens_to_line_boxes(tokens: &[LayoutToken]) -> Vec<BoundingBox> {
    let mut lines: Vec<BoundingBox> = Vec::new();
    let mut previous: Option<BoundingBox> = None;

    for b in tokens.iter().filter_map(|t| t.bbox).filter(has_extent) {
        match (previous, lines.last_mut()) {
            (Some(prev), Some(line)) if near(&prev, &b) => *line = line.union(&b),
            _ => lines.push(b),
        }
        previous = Some(b);
    }

    lines
}

fn has_extent(b: &BoundingBox) -> bool {
    b.width().abs() > f64::MIN_POSITIVE && b.height().abs() > f64::MIN_POSITIVE
}

/// Boxes intersect, or share an edge (within [`EDGE_TOLERANCE`]) while
/// overlapping on the perpendicular axis.
pub fn touching_or_intersecting(a: &BoundingBox, b: &BoundingBox) -> bool {
    if a.page() != b.page() {
        return false;
    }
    if a.intersects(b) {
        return true;
    }
    let x_touch = (a.x2() - b.x()).abs() < EDGE_TOLERANCE || (b.x2() - a.x()).abs() < EDGE_TOLERANCE;
    let y_overlap = a.y() < b.y2() && a.y2() > b.y();
    let y_touch = (a.y2() - b.y()).abs() < EDGE_TOLERANCE || (b.y2() - a.y()).abs() < EDGE_TOLERANCE;
    let x_overlap = a.x() < b.x2() && a.x2() > b.x();
    (x_touch && y_overlap) || (y_touch && x_overlap)
}

/// Boxes touch or overlap along one axis and are well aligned on the other.
///
/// The overlap on the perpendicular axis must cover `alignment` of the
/// smaller extent, and the smaller/larger extent ratio must reach
/// `alignment` too, so L-shaped neighbours of different sizes stay apart.
pub fn touching_or_intersecting_with_partial(
    a: &BoundingBox,
    b: &BoundingBox,
    alignment: f64,
) -> bool {
    if a.page() != b.page() {
        return false;
    }

    let x_touch = (a.x2() - b.x()).abs() < EDGE_TOLERANCE
        || (b.x2() - a.x()).abs() < EDGE_TOLERANCE
        || (a.x() < b.x2() && a.x2() > b.x());
    if x_touch {
        let overlap = a.y2().min(b.y2()) - a.y().max(b.y());
        if aligned(overlap, a.height(), b.height(), alignment) {
            return true;
        }
    }

    let y_touch = (a.y2() - b.y()).abs() < EDGE_TOLERANCE
        || (b.y2() - a.y()).abs() < EDGE_TOLERANCE
        || (a.y() < b.y2() && a.y2() > b.y());
    if y_touch {
        let overlap = a.x2().min(b.x2()) - a.x().max(b.x());
        if aligned(overlap, a.width(), b.width(), alignment) {
            return true;
        }
    }

    false
}

fn aligned(overlap: f64, extent_a: f64, extent_b: f64, alignment: f64) -> bool {
    let min = extent_a.min(extent_b);
    let max = extent_a.max(extent_b);
    overlap > 0.0 && overlap / min >= alignment && min / max >= alignment
}

/// Merge graphic objects that touch into larger regions.
///
/// 1. Objects contained in another object are dropped (of two identical
///    boxes the later one survives).
/// 2. The rest is split into connected components of
///    [`touching_or_intersecting`] boxes, in order of first appearance.
/// 3. Each component is sorted by (y, x) and swept twice, merging runs of
///    neighbours that pass [`touching_or_intersecting_with_partial`].
///
/// Merged objects become [`VectorBox`](crate::model::GraphicObjectKind::VectorBox);
/// untouched objects keep their kind.
pub fn merge_touching_graphic_objects(objects: &[GraphicObject]) -> Vec<GraphicObject> {
    let survivors = drop_contained(objects);

    let mut result = Vec::with_capacity(survivors.len());
    for mut group in connected_components(&survivors) {
        if group.len() == 1 {
            result.append(&mut group);
            continue;
        }
        group.sort_by(|a, b| {
            a.bbox
                .y()
                .partial_cmp(&b.bbox.y())
                .unwrap_or(Ordering::Equal)
                .then(a.bbox.x().partial_cmp(&b.bbox.x()).unwrap_or(Ordering::Equal))
        });
        let first_pass = merge_sweep(group);
        result.extend(merge_sweep(first_pass));
    }

    log::debug!(
        "merged {} graphic objects into {}",
        objects.len(),
        result.len()
    );
    result
}

fn drop_contained(objects: &[GraphicObject]) -> Vec<GraphicObject> {
    let mut removed = vec![false; objects.len()];
    for i in 0..objects.len() {
        let contained = (0..objects.len())
            .any(|j| i != j && !removed[j] && objects[j].bbox.contains(&objects[i].bbox));
        removed[i] = contained;
    }
    objects
        .iter()
        .zip(&removed)
        .filter(|(_, &gone)| !gone)
        .map(|(go, _)| *go)
        .collect()
}

fn connected_components(objects: &[GraphicObject]) -> Vec<Vec<GraphicObject>> {
    let mut used = vec![false; objects.len()];
    let mut groups = Vec::new();

    for start in 0..objects.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut members = vec![start];
        let mut cursor = 0;
        while cursor < members.len() {
            let current = objects[members[cursor]].bbox;
            for (j, candidate) in objects.iter().enumerate() {
                if !used[j] && touching_or_intersecting(&current, &candidate.bbox) {
                    used[j] = true;
                    members.push(j);
                }
            }
            cursor += 1;
        }
        groups.push(members.into_iter().map(|i| objects[i]).collect());
    }

    groups
}

fn merge_sweep(group: Vec<GraphicObject>) -> Vec<GraphicObject> {
    let mut merged = Vec::with_capacity(group.len());
    let mut iter = group.into_iter();
    let Some(mut current) = iter.next() else {
        return merged;
    };

    for next in iter {
        if touching_or_intersecting_with_partial(&current.bbox, &next.bbox, ALIGNMENT_PERCENTAGE) {
            current = GraphicObject::vector_box(current.bbox.union(&next.bbox));
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);
    merged
}

/// Merge intersecting boxes until no pair intersects.
pub fn merge_boxes(boxes: &[BoundingBox]) -> Vec<BoundingBox> {
    merge_to_fixpoint(boxes.to_vec(), |a, b| a.intersects(b))
}

/// Merge boxes closer than `max_distance` until no such pair remains, then
/// drop boxes smaller than [`MIN_GLUED_EXTENT`] on either axis.
pub fn glue_boxes(boxes: &[BoundingBox], max_distance: f64) -> Vec<BoundingBox> {
    merge_to_fixpoint(boxes.to_vec(), |a, b| {
        a.page() == b.page() && a.distance_to(b) < max_distance
    })
    .into_iter()
    .filter(|b| b.width() >= MIN_GLUED_EXTENT && b.height() >= MIN_GLUED_EXTENT)
    .collect()
}

/// Each pass folds every box into the first already-kept box it should
/// merge with. A pass without any merge ends the loop; every other pass
/// strictly shrinks the list.
fn merge_to_fixpoint<F>(mut boxes: Vec<BoundingBox>, should_merge: F) -> Vec<BoundingBox>
where
    F: Fn(&BoundingBox, &BoundingBox) -> bool,
{
    loop {
        let mut merged_any = false;
        let mut kept: Vec<BoundingBox> = Vec::with_capacity(boxes.len());
        for b in boxes {
            match kept.iter_mut().find(|k| should_merge(k, &b)) {
                Some(k) => {
                    *k = k.union(&b);
                    merged_any = true;
                }
                None => kept.push(b),
            }
        }
        boxes = kept;
        if !merged_any {
            return boxes;
        }
    }
}

/// Whether a graphic object is large enough, and central enough, to be a figure.
///
/// Small objects lying mostly outside the page main area are noise; large
/// ones are kept even when partly outside (margin figures).
pub fn is_valid_graphic_object(go: &GraphicObject, page: &Page) -> bool {
    let b = go.bbox;
    if b.area() < MIN_GRAPHIC_AREA || b.width() < MIN_GRAPHIC_EXTENT || b.height() < MIN_GRAPHIC_EXTENT {
        return false;
    }
    !(b.outside_ratio(&page.main_area) > MAX_OUTSIDE_RATIO && b.area() < MINIMUM_BITMAP_AREA)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GraphicObjectKind;

    fn bb(x: f64, y: f64, w: f64, h: f64) -> BoundingBox {
        BoundingBox::from_point_and_dimensions(1, x, y, w, h)
    }

    fn bitmap(x: f64, y: f64, w: f64, h: f64) -> GraphicObject {
        GraphicObject::bitmap(bb(x, y, w, h))
    }

    fn boxes_of(objects: &[GraphicObject]) -> Vec<BoundingBox> {
        objects.iter().map(|go| go.bbox).collect()
    }

    #[test]
    fn test_calculate_one_box_skips_missing_coords() {
        let tokens = vec![
            LayoutToken::without_coords("x", 0),
            LayoutToken::new("a", 1, bb(10.0, 10.0, 5.0, 5.0)),
            LayoutToken::new("b", 2, bb(20.0, 12.0, 5.0, 5.0)),
            LayoutToken::new(
                "c",
                3,
                BoundingBox::from_point_and_dimensions(2, 0.0, 0.0, 5.0, 5.0),
            ),
        ];
        assert_eq!(calculate_one_box(&tokens, true), Some(bb(10.0, 10.0, 15.0, 7.0)));
        assert_eq!(calculate_one_box(&tokens, false), Some(bb(0.0, 0.0, 25.0, 17.0)));
        assert_eq!(calculate_one_box(&tokens[..1], true), None);
    }

    #[test]
    fn test_near() {
        let a = bb(0.0, 100.0, 20.0, 10.0);
        assert!(near(&a, &bb(25.0, 101.0, 20.0, 10.0)));
        assert!(!near(&a, &bb(40.0, 100.0, 20.0, 10.0)));
        assert!(!near(&a, &bb(25.0, 106.0, 20.0, 10.0)));
        assert!(!near(&bb(30.0, 100.0, 20.0, 10.0), &a));
    }

    #[test]
    fn test_collapse_tokens_to_line_boxes() {
        let tokens = vec![
            LayoutToken::new("The", 0, bb(10.0, 100.0, 20.0, 10.0)),
            LayoutToken::new(" ", 1, bb(30.0, 100.0, 0.0, 10.0)),
            LayoutToken::new("cat", 2, bb(33.0, 100.0, 20.0, 10.0)),
            LayoutToken::without_coords("\n", 3),
            LayoutToken::new("sat", 4, bb(10.0, 114.0, 20.0, 10.0)),
            LayoutToken::new("down", 5, bb(33.0, 114.5, 25.0, 10.0)),
        ];
        let lines = collapse_tokens_to_line_boxes(&tokens);
        assert_eq!(lines, vec![bb(10.0, 100.0, 43.0, 10.0), bb(10.0, 114.0, 48.0, 10.5)]);
    }

    #[test]
    fn test_collapse_compares_with_previous_token() {
        // the third token is near the second one but far from the line start
        let tokens = vec![
            LayoutToken::new("a", 0, bb(0.0, 0.0, 10.0, 10.0)),
            LayoutToken::new("b", 1, bb(20.0, 3.0, 10.0, 10.0)),
            LayoutToken::new("c", 2, bb(35.0, 6.0, 10.0, 10.0)),
        ];
        assert_eq!(collapse_tokens_to_line_boxes(&tokens), vec![bb(0.0, 0.0, 45.0, 16.0)]);
        assert!(collapse_tokens_to_line_boxes(&[]).is_empty());
    }

    #[test]
    fn test_touching_or_intersecting() {
        let a = bb(0.0, 0.0, 10.0, 10.0);
        assert!(touching_or_intersecting(&a, &bb(10.0, 0.0, 10.0, 10.0)));
        assert!(touching_or_intersecting(&a, &bb(0.0, 10.5, 10.0, 10.0)));
        assert!(touching_or_intersecting(&a, &bb(5.0, 5.0, 10.0, 10.0)));
        assert!(!touching_or_intersecting(&a, &bb(12.0, 0.0, 10.0, 10.0)));
        // corner contact only
        assert!(!touching_or_intersecting(&a, &bb(10.0, 10.0, 10.0, 10.0)));
        assert!(!touching_or_intersecting(
            &a,
            &BoundingBox::from_point_and_dimensions(2, 10.0, 0.0, 10.0, 10.0)
        ));
    }

    #[test]
    fn test_merge_touching_horizontal_pair() {
        let merged = merge_touching_graphic_objects(&[
            bitmap(0.0, 0.0, 10.0, 10.0),
            bitmap(10.0, 0.0, 10.0, 10.0),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].bbox, bb(0.0, 0.0, 20.0, 10.0));
        assert_eq!(merged[0].kind, GraphicObjectKind::VectorBox);
    }

    #[test]
    fn test_merge_touching_contained_collapses() {
        let outer = bitmap(0.0, 0.0, 20.0, 20.0);
        let merged = merge_touching_graphic_objects(&[outer, bitmap(5.0, 5.0, 5.0, 5.0)]);
        assert_eq!(merged, vec![outer]);
    }

    #[test]
    fn test_merge_touching_identical_keeps_one() {
        let merged = merge_touching_graphic_objects(&[
            bitmap(0.0, 0.0, 20.0, 20.0),
            GraphicObject::vector_box(bb(0.0, 0.0, 20.0, 20.0)),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].kind, GraphicObjectKind::VectorBox);
    }

    #[test]
    fn test_merge_touching_three_along_x() {
        let merged = merge_touching_graphic_objects(&[
            bitmap(0.0, 0.0, 10.0, 10.0),
            bitmap(10.0, 0.0, 10.0, 10.0),
            bitmap(20.0, 0.0, 10.0, 10.0),
        ]);
        assert_eq!(boxes_of(&merged), vec![bb(0.0, 0.0, 30.0, 10.0)]);
    }

    #[test]
    fn test_merge_touching_overlap_chain() {
        let merged = merge_touching_graphic_objects(&[
            bitmap(0.0, 0.0, 10.0, 10.0),
            bitmap(8.0, 0.0, 10.0, 10.0),
            bitmap(15.0, 0.0, 10.0, 10.0),
        ]);
        assert_eq!(boxes_of(&merged), vec![bb(0.0, 0.0, 25.0, 10.0)]);
    }

    #[test]
    fn test_merge_touching_three_along_y() {
        let merged = merge_touching_graphic_objects(&[
            bitmap(0.0, 20.0, 10.0, 10.0),
            bitmap(0.0, 0.0, 10.0, 10.0),
            bitmap(0.0, 10.0, 10.0, 10.0),
        ]);
        assert_eq!(boxes_of(&merged), vec![bb(0.0, 0.0, 10.0, 30.0)]);
    }

    #[test]
    fn test_merge_touching_l_shape_yields_two() {
        let merged = merge_touching_graphic_objects(&[
            bitmap(0.0, 0.0, 10.0, 10.0),
            bitmap(10.0, 0.0, 10.0, 10.0),
            bitmap(0.0, 10.0, 10.0, 10.0),
        ]);
        assert_eq!(
            boxes_of(&merged),
            vec![bb(0.0, 0.0, 20.0, 10.0), bb(0.0, 10.0, 10.0, 10.0)]
        );
    }

    #[test]
    fn test_merge_touching_l_shape_slightly_offset() {
        let merged = merge_touching_graphic_objects(&[
            bitmap(0.0, 0.0, 10.0, 10.0),
            bitmap(10.0, 0.0, 10.0, 10.0),
            bitmap(1.0, 10.5, 10.0, 10.0),
        ]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merge_touching_separate_components_keep_order() {
        let far = bitmap(100.0, 100.0, 10.0, 10.0);
        let merged = merge_touching_graphic_objects(&[
            far,
            bitmap(0.0, 0.0, 10.0, 10.0),
            bitmap(10.0, 0.0, 10.0, 10.0),
        ]);
        assert_eq!(merged[0], far);
        assert_eq!(merged[1].bbox, bb(0.0, 0.0, 20.0, 10.0));
        assert!(merge_touching_graphic_objects(&[]).is_empty());
    }

    #[test]
    fn test_merge_touching_never_crosses_pages() {
        let merged = merge_touching_graphic_objects(&[
            bitmap(0.0, 0.0, 10.0, 10.0),
            GraphicObject::bitmap(BoundingBox::from_point_and_dimensions(2, 10.0, 0.0, 10.0, 10.0)),
        ]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merge_boxes_to_fixpoint() {
        // c only intersects the union of a and b
        let merged = merge_boxes(&[
            bb(0.0, 0.0, 10.0, 10.0),
            bb(30.0, 0.0, 10.0, 10.0),
            bb(5.0, 5.0, 30.0, 2.0),
            bb(100.0, 100.0, 5.0, 5.0),
        ]);
        assert_eq!(merged, vec![bb(0.0, 0.0, 40.0, 10.0), bb(100.0, 100.0, 5.0, 5.0)]);
    }

    #[test]
    fn test_merge_boxes_late_intersection() {
        // the first pass builds a box that only then reaches the second one
        let merged = merge_boxes(&[
            bb(0.0, 0.0, 10.0, 10.0),
            bb(20.0, 0.0, 10.0, 10.0),
            bb(5.0, 20.0, 10.0, 10.0),
            bb(0.0, 5.0, 12.0, 20.0),
        ]);
        assert_eq!(merged.len(), 2);
        assert!(merged.contains(&bb(20.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_glue_boxes() {
        let glued = glue_boxes(
            &[
                bb(0.0, 0.0, 10.0, 10.0),
                bb(13.0, 0.0, 10.0, 10.0),
                bb(100.0, 0.0, 10.0, 10.0),
                bb(200.0, 200.0, 2.0, 2.0),
            ],
            5.0,
        );
        assert_eq!(glued, vec![bb(0.0, 0.0, 23.0, 10.0), bb(100.0, 0.0, 10.0, 10.0)]);
    }

    #[test]
    fn test_glue_boxes_respects_pages() {
        let glued = glue_boxes(
            &[
                bb(0.0, 0.0, 10.0, 10.0),
                BoundingBox::from_point_and_dimensions(2, 0.0, 0.0, 10.0, 10.0),
            ],
            5000.0,
        );
        assert_eq!(glued.len(), 2);
    }

    #[test]
    fn test_is_valid_graphic_object() {
        let page = Page::new(1, 600.0, 800.0)
            .with_main_area(bb(50.0, 50.0, 500.0, 700.0));

        assert!(is_valid_graphic_object(&bitmap(100.0, 100.0, 200.0, 200.0), &page));
        assert!(!is_valid_graphic_object(&bitmap(100.0, 100.0, 30.0, 200.0), &page));
        assert!(!is_valid_graphic_object(&bitmap(100.0, 100.0, 200.0, 40.0), &page));
        // small and mostly in the margin
        assert!(!is_valid_graphic_object(&bitmap(0.0, 0.0, 60.0, 60.0), &page));
        // large margin figure survives
        assert!(is_valid_graphic_object(&bitmap(0.0, 100.0, 200.0, 200.0), &page));
    }
}
