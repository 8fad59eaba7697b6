//! Document model types for layout reconciliation.
//!
//! These are value types: geometry, tokens, blocks and pages as delivered
//! by the layout converter, plus the graphic and structural objects the
//! reconciliation stages produce or consume.

mod document;
mod geometry;
mod graphic;
mod page;
mod structure;
mod token;

pub use document::Document;
pub use geometry::{BoundingBox, PAGE_DISTANCE};
pub use graphic::{group_by_page, GraphicObject, GraphicObjectKind, GraphicsByPage};
pub use page::{Block, Page};
pub use structure::{StructuralObject, StructureKind};
pub use token::{tokens_to_text, LayoutToken};
