//! Outline (bookmark) XML produced by the layout converter.
//!
//! ```xml
//! <TOCITEMS>
//!   <TOCITEMLIST level="0">
//!     <ITEM id="0">
//!       <STRING>1. Introduction</STRING>
//!       <LINK page="1" top="72.0" bottom="90.0" left="56.0" right="300.0"/>
//!     </ITEM>
//!     <TOCITEMLIST level="1" idItemParent="0">
//!       <ITEM id="1"><STRING>1.1 Scope</STRING></ITEM>
//!     </TOCITEMLIST>
//!   </TOCITEMLIST>
//! </TOCITEMS>
//! ```

use super::node::DocumentNode;
use crate::error::{Error, Result};
use crate::model::BoundingBox;
use roxmltree::Node;
use std::collections::HashMap;

/// One `ITEM`, in document order.
struct OutlineItem {
    label: String,
    bbox: Option<BoundingBox>,
    /// Index of the parent item, `None` for the root
    parent: Option<usize>,
}

/// Build the outline tree from outline XML.
///
/// The parent of an item is the `idItemParent` of its list, or else the
/// nearest enclosing `ITEM`. Items referring to a parent that has not been
/// seen yet are attached to the root. Items without sub-items keep
/// `children == None`.
pub fn parse_outline(xml: &str) -> Result<DocumentNode> {
    let doc = roxmltree::Document::parse(xml)?;
    let root_element = doc.root_element();
    if root_element.tag_name().name() != "TOCITEMS" {
        return Err(Error::XmlParse(format!(
            "expected TOCITEMS root, found {}",
            root_element.tag_name().name()
        )));
    }

    let mut items: Vec<OutlineItem> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();
    let mut index_of_node: HashMap<roxmltree::NodeId, usize> = HashMap::new();

    for item in root_element.descendants().filter(|n| is_named(n, "ITEM")) {
        let parent = resolve_parent(item, &by_id, &index_of_node);
        let index = items.len();
        if let Some(id) = item.attribute("id") {
            if by_id.insert(id.trim().to_string(), index).is_some() {
                log::warn!("Duplicate outline item id {id}, the later item wins");
            }
        }
        index_of_node.insert(item.id(), index);
        items.push(OutlineItem {
            label: item_label(item),
            bbox: item_box(item),
            parent,
        });
    }

    log::debug!("outline: {} items", items.len());

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
    let mut top_level: Vec<usize> = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match item.parent {
            Some(parent) => children[parent].push(index),
            None => top_level.push(index),
        }
    }

    let mut root = DocumentNode::root();
    for index in top_level {
        root.add_child(build_node(index, &items, &children));
    }
    Ok(root)
}

fn build_node(index: usize, items: &[OutlineItem], children: &[Vec<usize>]) -> DocumentNode {
    let item = &items[index];
    let mut node = DocumentNode::new(item.label.clone());
    if let Some(bbox) = item.bbox {
        node = node.with_bounding_box(bbox);
    }
    for &child in &children[index] {
        node.add_child(build_node(child, items, children));
    }
    node
}

fn is_named(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn resolve_parent(
    item: Node,
    by_id: &HashMap<String, usize>,
    index_of_node: &HashMap<roxmltree::NodeId, usize>,
) -> Option<usize> {
    let list = item.parent().filter(|p| is_named(p, "TOCITEMLIST"))?;
    if let Some(parent_id) = list.attribute("idItemParent") {
        let parent_id = parent_id.trim();
        if parent_id == "-1" {
            return None;
        }
        return match by_id.get(parent_id) {
            Some(index) => Some(*index),
            None => {
                log::warn!("Outline parent {parent_id} not encountered yet, attaching to the root");
                None
            }
        };
    }
    list.ancestors()
        .skip(1)
        .find(|a| is_named(a, "ITEM"))
        .and_then(|a| index_of_node.get(&a.id()).copied())
}

fn item_label(item: Node) -> String {
    item.children()
        .find(|c| is_named(c, "STRING"))
        .map(|s| {
            s.descendants()
                .filter(|d| d.is_text())
                .filter_map(|d| d.text())
                .collect::<String>()
                .trim()
                .to_string()
        })
        .unwrap_or_default()
}

/// Box of the item's `LINK`: `left`/`top` corner, extents clamped to zero.
fn item_box(item: Node) -> Option<BoundingBox> {
    let link = item.children().find(|c| is_named(c, "LINK"))?;
    let page = match link.attribute("page").map(|p| p.trim().parse::<u32>()) {
        Some(Ok(page)) => page,
        Some(Err(_)) => {
            log::warn!("Invalid outline link page {:?}", link.attribute("page"));
            return None;
        }
        None => return None,
    };
    let coord = |name: &str| -> f64 {
        match link.attribute(name).map(|v| v.trim().parse::<f64>()) {
            Some(Ok(v)) => v,
            Some(Err(_)) => {
                log::warn!("Invalid outline link {name} {:?}", link.attribute(name));
                0.0
            }
            None => 0.0,
        }
    };
    let (top, bottom, left, right) = (coord("top"), coord("bottom"), coord("left"), coord("right"));
    Some(BoundingBox::from_point_and_dimensions(
        page,
        left,
        top,
        (right - left).max(0.0),
        (bottom - top).max(0.0),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TOCITEMS>
  <TOCITEMLIST level="0">
    <ITEM id="0">
      <STRING>Abstract</STRING>
      <LINK page="1" top="592.00" bottom="0.00" left="0.00" right="0.00"/>
    </ITEM>
    <ITEM id="1">
      <STRING>1 Background</STRING>
      <LINK page="1" top="100" bottom="120" left="50" right="250"/>
      <TOCITEMLIST level="1" idItemParent="1">
        <ITEM id="2"><STRING>1.1 Introduction</STRING></ITEM>
        <ITEM id="3"><STRING>1.2 Related work</STRING></ITEM>
      </TOCITEMLIST>
    </ITEM>
    <ITEM id="4"><STRING>References</STRING></ITEM>
  </TOCITEMLIST>
</TOCITEMS>"#;

    #[test]
    fn test_parse_nested_outline() {
        let root = parse_outline(NESTED).unwrap();
        assert_eq!(root.children().len(), 3);

        let abstract_node = &root.children()[0];
        assert_eq!(abstract_node.label, "Abstract");
        assert_eq!(abstract_node.children, None);
        assert_eq!(abstract_node.bbox.map(|b| b.page()), Some(1));
        assert_eq!(abstract_node.bbox.map(|b| b.height()), Some(0.0));

        let background = &root.children()[1];
        assert_eq!(background.children().len(), 2);
        assert_eq!(background.children()[1].address, "2.2");
        assert_eq!(
            background.bbox,
            Some(BoundingBox::from_point_and_dimensions(1, 50.0, 100.0, 200.0, 20.0))
        );
        assert_eq!(root.depth_of("Introduction"), 2);
    }

    #[test]
    fn test_parse_flat_lists_with_parent_ids() {
        let xml = r#"<TOCITEMS>
            <TOCITEMLIST level="0">
              <ITEM id="0"><STRING>Methods</STRING></ITEM>
            </TOCITEMLIST>
            <TOCITEMLIST level="1" idItemParent="0">
              <ITEM id="1"><STRING>Setup</STRING></ITEM>
            </TOCITEMLIST>
            <TOCITEMLIST level="1" idItemParent="9">
              <ITEM id="2"><STRING>Orphan</STRING></ITEM>
            </TOCITEMLIST>
        </TOCITEMS>"#;
        let root = parse_outline(xml).unwrap();
        let labels: Vec<&str> = root.children().iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Methods", "Orphan"]);
        assert_eq!(root.children()[0].children()[0].label, "Setup");
    }

    #[test]
    fn test_parse_rejects_other_documents() {
        assert!(matches!(parse_outline("<alto/>"), Err(Error::XmlParse(_))));
        assert!(matches!(parse_outline("<TOCITEMS>"), Err(Error::XmlParse(_))));
    }

    #[test]
    fn test_empty_outline() {
        let root = parse_outline("<TOCITEMS/>").unwrap();
        assert_eq!(root.children, None);
        assert_eq!(root.depth_of("Introduction"), -1);
    }
}
