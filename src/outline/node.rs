//! Outline tree nodes and label lookup.

use crate::model::BoundingBox;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

/// Address of the root node.
pub const ROOT_ADDRESS: &str = "0";

/// A section of a hierarchically organized document.
///
/// `children` distinguishes a node that was never expanded (`None`) from
/// one known to have no sub-sections (`Some(vec![])`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,

    pub children: Option<Vec<DocumentNode>>,

    /// Gorn address: "0" for the root, "1", "2" for its children, "1.2" below
    pub address: String,

    /// First token position covered by the section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_token: Option<usize>,

    /// Last token position covered by the section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_token: Option<usize>,
}

impl DocumentNode {
    /// Create a detached node. Its address is set when it is added to a parent.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            bbox: None,
            children: None,
            address: String::new(),
            start_token: None,
            end_token: None,
        }
    }

    /// Create an unlabeled root node.
    pub fn root() -> Self {
        Self {
            address: ROOT_ADDRESS.to_string(),
            ..Self::new("")
        }
    }

    pub fn with_bounding_box(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Mark the node as explicitly having no sub-sections.
    pub fn with_no_children(mut self) -> Self {
        self.children = Some(Vec::new());
        self
    }

    /// Set the covered token positions, inclusive on both ends.
    pub fn with_token_span(mut self, start: usize, end: usize) -> Self {
        self.start_token = Some(start);
        self.end_token = Some(end);
        self
    }

    /// Append a child, addressing it and its subtree below this node.
    ///
    /// The end of this node's token span grows to cover the child's.
    pub fn add_child(&mut self, mut child: DocumentNode) {
        let children = self.children.get_or_insert_with(Vec::new);
        let address = if self.address == ROOT_ADDRESS {
            (children.len() + 1).to_string()
        } else if self.address.is_empty() {
            String::new()
        } else {
            format!("{}.{}", self.address, children.len() + 1)
        };
        child.set_address(address);

        if let Some(end) = child.end_token {
            if self.end_token.map_or(true, |current| end > current) {
                self.end_token = Some(end);
            }
        }
        children.push(child);
    }

    fn set_address(&mut self, address: String) {
        if let Some(children) = self.children.as_mut() {
            for (i, child) in children.iter_mut().enumerate() {
                let child_address = if address.is_empty() {
                    String::new()
                } else {
                    format!("{}.{}", address, i + 1)
                };
                child.set_address(child_address);
            }
        }
        self.address = address;
    }

    /// Children, empty when unexplored.
    pub fn children(&self) -> &[DocumentNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    /// Number of nodes in this subtree, this node included.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(DocumentNode::node_count).sum::<usize>()
    }

    fn spans(&self, position: usize) -> bool {
        matches!((self.start_token, self.end_token), (Some(s), Some(e)) if s <= position && position <= e)
    }

    /// Deepest node whose token span contains `position`.
    pub fn spanning_node(&self, position: usize) -> Option<&DocumentNode> {
        if !self.spans(position) {
            return None;
        }
        match self.children().iter().find(|c| c.spans(position)) {
            Some(child) => child.spanning_node(position),
            None => Some(self),
        }
    }

    /// Depth of the first node matching `query` below this one, or -1.
    pub fn depth_of(&self, query: &str) -> i32 {
        find_node_depth(self, query, 0)
    }
}

/// Depth of the first node labeled `query`, searching depth first with the
/// current node checked before its children; `start_depth` is the depth of
/// `node`. Returns -1 when no node matches.
///
/// A node matches on equal labels, or on a soft match: with leading section
/// numbers removed and case folded, one label contains the other. Queries
/// spanning several lines only match exactly.
pub fn find_node_depth(node: &DocumentNode, query: &str, start_depth: i32) -> i32 {
    let soft_query = (!query.contains('\n')).then(|| normalize_heading(query));
    find_depth(node, query, soft_query.as_deref(), start_depth).unwrap_or(-1)
}

fn find_depth(node: &DocumentNode, query: &str, soft_query: Option<&str>, depth: i32) -> Option<i32> {
    if node.label == query {
        return Some(depth);
    }
    if let Some(soft) = soft_query.filter(|s| !s.is_empty()) {
        let label = normalize_heading(&node.label);
        if !label.is_empty() && (label.contains(soft) || soft.contains(label.as_str())) {
            return Some(depth);
        }
    }
    node.children()
        .iter()
        .find_map(|child| find_depth(child, query, soft_query, depth + 1))
}

fn heading_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:(?:[0-9A-Za-z]{1,3}[.|])+[0-9]*\s*|[0-9]+\s+)").unwrap())
}

/// Heading text without its leading section number, NFKC-normalized and lower-cased.
pub fn normalize_heading(label: &str) -> String {
    let stripped = heading_marker().replace(label, "");
    stripped.nfkc().collect::<String>().to_lowercase().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> DocumentNode {
        let mut child1 = DocumentNode::new("child1");
        child1.add_child(DocumentNode::new("grandchild1"));
        let mut root = DocumentNode::root();
        root.add_child(child1);
        root.add_child(DocumentNode::new("child2"));
        root
    }

    #[test]
    fn test_find_node_depth() {
        let root = sample_tree();
        assert_eq!(find_node_depth(&root, "grandchild1", 0), 2);
        assert_eq!(find_node_depth(&root, "child2", 0), 1);
        assert_eq!(find_node_depth(&root, "unrelated", 0), -1);
        assert_eq!(find_node_depth(&root, "child2", 3), 4);
    }

    #[test]
    fn test_soft_match() {
        let mut root = DocumentNode::root();
        root.add_child(DocumentNode::new("1| Introduction"));
        root.add_child(DocumentNode::new("2| Crystal structure"));

        assert_eq!(root.depth_of("Crystal structure"), 1);
        assert_eq!(root.depth_of("CRYSTAL STRUCTURE"), 1);
        assert_eq!(root.depth_of("3. Crystal structure"), 1);
        assert_eq!(root.depth_of("3| Crystal\nstructure"), -1);
    }

    #[test]
    fn test_first_match_in_traversal_order() {
        let mut methods = DocumentNode::new("2. Methods");
        methods.add_child(DocumentNode::new("2.1 Results of the methods"));
        let mut root = DocumentNode::root();
        root.add_child(methods);
        root.add_child(DocumentNode::new("Results"));

        // the nested soft match is found before the exact sibling
        assert_eq!(root.depth_of("Results"), 2);
    }

    #[test]
    fn test_empty_labels_never_soft_match() {
        let mut root = DocumentNode::root();
        root.add_child(DocumentNode::new("1."));
        assert_eq!(root.depth_of("Anything"), -1);
        assert_eq!(root.depth_of("1."), 1);
    }

    #[test]
    fn test_addresses() {
        let root = sample_tree();
        assert_eq!(root.address, "0");
        assert_eq!(root.children()[0].address, "1");
        assert_eq!(root.children()[0].children()[0].address, "1.1");
        assert_eq!(root.children()[1].address, "2");
    }

    #[test]
    fn test_children_states() {
        let unexplored = DocumentNode::new("a");
        let empty = DocumentNode::new("b").with_no_children();
        assert_eq!(unexplored.children, None);
        assert_eq!(empty.children, Some(vec![]));
        assert!(unexplored.is_leaf() && empty.is_leaf());
        assert_eq!(sample_tree().node_count(), 4);
    }

    #[test]
    fn test_spanning_node() {
        let mut section = DocumentNode::new("Methods").with_token_span(10, 20);
        section.add_child(DocumentNode::new("Setup").with_token_span(10, 14));
        section.add_child(DocumentNode::new("Protocol").with_token_span(15, 30));
        assert_eq!(section.end_token, Some(30));

        let mut root = DocumentNode::root().with_token_span(0, 50);
        root.add_child(DocumentNode::new("Intro").with_token_span(0, 9));
        root.add_child(section);

        assert_eq!(root.spanning_node(12).map(|n| n.label.as_str()), Some("Setup"));
        assert_eq!(root.spanning_node(25).map(|n| n.label.as_str()), Some("Protocol"));
        assert_eq!(root.spanning_node(45).map(|n| n.label.as_str()), Some(""));
        assert!(root.spanning_node(51).is_none());
    }

    #[test]
    fn test_normalize_heading() {
        assert_eq!(normalize_heading("2| Crystal structure"), "crystal structure");
        assert_eq!(normalize_heading("3.1.2 Results"), "results");
        assert_eq!(normalize_heading("A. Appendix"), "appendix");
        assert_eq!(normalize_heading("12 Discussion"), "discussion");
        assert_eq!(normalize_heading("ﬁgures"), "figures");
        assert_eq!(normalize_heading("Abstract"), "abstract");
    }
}
