//! Graphic objects found on pages.

use super::BoundingBox;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Origin of a graphic region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphicObjectKind {
    /// Embedded raster image
    Bitmap,
    /// Region derived from vector drawing operations, or a merge of regions
    VectorBox,
}

/// A graphic region on a page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphicObject {
    pub bbox: BoundingBox,
    pub kind: GraphicObjectKind,
}

impl GraphicObject {
    pub fn new(bbox: BoundingBox, kind: GraphicObjectKind) -> Self {
        Self { bbox, kind }
    }

    pub fn bitmap(bbox: BoundingBox) -> Self {
        Self::new(bbox, GraphicObjectKind::Bitmap)
    }

    pub fn vector_box(bbox: BoundingBox) -> Self {
        Self::new(bbox, GraphicObjectKind::VectorBox)
    }

    pub fn page(&self) -> u32 {
        self.bbox.page()
    }
}

/// Graphic objects grouped by page number, insertion order kept within a page.
pub type GraphicsByPage = BTreeMap<u32, Vec<GraphicObject>>;

/// Group objects by the page of their box.
pub fn group_by_page(objects: impl IntoIterator<Item = GraphicObject>) -> GraphicsByPage {
    let mut grouped = GraphicsByPage::new();
    for go in objects {
        grouped.entry(go.page()).or_default().push(go);
    }
    grouped
}
