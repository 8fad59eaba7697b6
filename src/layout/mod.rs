//! Page geometry processing.
//!
//! Token-to-line collapsing, graphic object merging, vector graphics
//! extraction and layout statistics. Everything here works on values from
//! [`crate::model`] and returns new values.

mod boxes;
mod options;
mod path;
mod stats;
mod vector;

pub use boxes::{
    calculate_one_box, collapse_tokens_to_line_boxes, glue_boxes, is_valid_graphic_object,
    merge_boxes, merge_touching_graphic_objects, near, touching_or_intersecting,
    touching_or_intersecting_with_partial, ALIGNMENT_PERCENTAGE, EDGE_TOLERANCE, LINE_X_GAP,
    LINE_Y_TOLERANCE, MAX_OUTSIDE_RATIO, MINIMUM_BITMAP_AREA, MIN_GLUED_EXTENT, MIN_GRAPHIC_AREA,
    MIN_GRAPHIC_EXTENT,
};
pub use options::{PageSelection, VectorOptions, DEFAULT_FILE_SIZE_LIMIT, MINIMUM_VECTOR_BOX_AREA};
pub use path::path_bounds;
pub use stats::{
    median, median_block_distance, median_line_distance, median_vertical_distance,
    AdaptiveThresholds, LayoutInfo, LayoutStatistics, PageLayout, DEFAULT_BLOCK_DISTANCE,
    DEFAULT_LINE_DISTANCE,
};
pub use vector::{page_markup_path, VectorGraphicsExtractor, MIN_BOX_EXTENT, MIN_VISIBLE_OPACITY};
