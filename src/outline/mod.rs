//! Document outline tree.
//!
//! The outline is built once, from the converter's bookmark XML or by hand,
//! and then only queried.

mod alto;
mod node;

pub use alto::parse_outline;
pub use node::{find_node_depth, normalize_heading, DocumentNode, ROOT_ADDRESS};
