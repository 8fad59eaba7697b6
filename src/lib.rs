//! # paperweave
//!
//! Layout geometry reconciliation and tagger-output consolidation for
//! scholarly PDF extraction.
//!
//! The crate sits between a PDF-to-layout converter and a sequence tagger.
//! It works on positioned tokens, per-page vector markup and the tagger's
//! label sequence, and reconciles them into clean graphic regions, an
//! outline tree and a label sequence without dangling table or figure spans.
//!
//! ## Quick Start
//!
//! ```no_run
//! use paperweave::labeling::{revert_bad_spans, ConsolidationOptions};
//! use paperweave::model::StructuralObject;
//!
//! fn main() -> paperweave::Result<()> {
//!     let sequence = paperweave::load_tagged_sequence("fulltext.tagged")?;
//!     let rejected: Vec<StructuralObject> = paperweave::load_json("rejected.json")?;
//!
//!     let fixed = revert_bad_spans(&rejected, &sequence, &ConsolidationOptions::default());
//!     print!("{}", fixed);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Geometry kernel**: union, overlap and distance of page boxes
//! - **Box consolidation**: line boxes from tokens, merging of touching graphics
//! - **Vector graphics**: figure regions from per-page SVG markup, in parallel
//! - **Outline tree**: table of contents parsing and heading lookup
//! - **Layout statistics**: median spacing and adaptive merge thresholds
//! - **Label consolidation**: reverting rejected tables and figures to paragraphs

pub mod error;
pub mod labeling;
pub mod layout;
pub mod model;
pub mod outline;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use labeling::{ConsolidationOptions, Strictness, TaggedRow, TaggedSequence};
pub use layout::{
    AdaptiveThresholds, LayoutStatistics, PageSelection, VectorGraphicsExtractor, VectorOptions,
};
pub use model::{
    Block, BoundingBox, Document, GraphicObject, GraphicObjectKind, GraphicsByPage, LayoutToken,
    Page, StructuralObject, StructureKind,
};
pub use outline::{find_node_depth, DocumentNode};
pub use render::{to_json, JsonFormat};

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Read tagger output from a file.
///
/// # Example
///
/// ```no_run
/// let sequence = paperweave::load_tagged_sequence("fulltext.tagged").unwrap();
/// println!("{} lines", sequence.len());
/// ```
pub fn load_tagged_sequence<P: AsRef<Path>>(path: P) -> Result<TaggedSequence> {
    let text = fs::read_to_string(path)?;
    TaggedSequence::parse(&text)
}

/// Read any model value from a JSON file.
pub fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let text = fs::read_to_string(path)?;
    render::from_json(&text)
}

/// Read a document from a JSON file.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Document> {
    load_json(path)
}

/// Parse an outline XML file into a tree.
///
/// # Example
///
/// ```no_run
/// let root = paperweave::parse_outline_file("document.pdf_outline.xml").unwrap();
/// let depth = paperweave::find_node_depth(&root, "Introduction", 0);
/// ```
pub fn parse_outline_file<P: AsRef<Path>>(path: P) -> Result<DocumentNode> {
    let xml = fs::read_to_string(path)?;
    outline::parse_outline(&xml)
}

/// Extract vector graphics for every page of `document` from the
/// `image-<page>.svg` files in `dir`, with default options.
pub fn extract_vector_graphics<P: AsRef<Path>>(dir: P, document: &Document) -> GraphicsByPage {
    VectorGraphicsExtractor::new(VectorOptions::default()).extract_document(dir.as_ref(), document)
}
