//! Vector graphics region extraction.
//!
//! The layout converter writes the vector drawing operations of each page
//! to an SVG file (`image-<page>.svg`). Meaningful regions are recovered
//! from two sources:
//!
//! - `clipPath` elements, as the union of their non-transparent children;
//! - top-level `g` elements, unless every group of the page is a white
//!   backdrop ("dummy cache").
//!
//! Candidates are deduplicated, sorted by decreasing area, and kept when no
//! other candidate contains them and they sit (almost) inside the page
//! main area.

use super::boxes::merge_touching_graphic_objects;
use super::options::VectorOptions;
use super::path::path_bounds;
use crate::error::{Error, Result};
use crate::model::{group_by_page, BoundingBox, Document, GraphicObject, GraphicsByPage, Page};
use rayon::prelude::*;
use roxmltree::Node;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

/// Opacity under which an element is invisible.
pub const MIN_VISIBLE_OPACITY: f64 = 0.01;

/// Boxes thinner than this on either axis are rules, not graphics.
pub const MIN_BOX_EXTENT: f64 = 1.0;

/// Location of the vector markup of a page inside the converter output directory.
pub fn page_markup_path(dir: &Path, page: u32) -> PathBuf {
    dir.join(format!("image-{page}.svg"))
}

/// Extracts vector graphic regions page by page.
#[derive(Debug, Clone, Default)]
pub struct VectorGraphicsExtractor {
    options: VectorOptions,
}

impl VectorGraphicsExtractor {
    pub fn new(options: VectorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &VectorOptions {
        &self.options
    }

    /// Extract the regions of every selected page of `document` from the
    /// markup files in `dir`.
    ///
    /// Pages without a markup file are absent from the result. Oversized or
    /// unreadable pages are logged and skipped; they never fail the document.
    pub fn extract_document(&self, dir: &Path, document: &Document) -> GraphicsByPage {
        let pages: Vec<&Page> = document
            .pages
            .iter()
            .filter(|p| self.options.pages.includes(p.number))
            .collect();

        let per_page = |page: &&Page| -> Option<Vec<GraphicObject>> {
            let path = page_markup_path(dir, page.number);
            if !path.is_file() {
                return None;
            }
            match self.extract_page_file(&path, page) {
                Ok(boxes) => Some(self.to_graphic_objects(boxes)),
                Err(e) => {
                    log::warn!("Skipping vector graphics of page {}: {}", page.number, e);
                    None
                }
            }
        };

        let extracted: Vec<Vec<GraphicObject>> = if self.options.parallel {
            pages.par_iter().filter_map(per_page).collect()
        } else {
            pages.iter().filter_map(per_page).collect()
        };

        group_by_page(extracted.into_iter().flatten())
    }

    fn to_graphic_objects(&self, boxes: Vec<BoundingBox>) -> Vec<GraphicObject> {
        let objects: Vec<GraphicObject> = boxes.into_iter().map(GraphicObject::vector_box).collect();
        let mut objects = if self.options.merge_touching {
            merge_touching_graphic_objects(&objects)
        } else {
            objects
        };
        objects.retain(|o| o.bbox.area() > self.options.min_box_area);
        objects
    }

    /// Extract the regions of one page from a markup file.
    ///
    /// Files over the configured size limit fail with
    /// [`Error::OversizedInput`] before being read.
    pub fn extract_page_file(&self, path: &Path, page: &Page) -> Result<Vec<BoundingBox>> {
        let size = fs::metadata(path)?.len();
        if size > self.options.file_size_limit {
            return Err(Error::OversizedInput {
                path: path.to_path_buf(),
                size,
                limit: self.options.file_size_limit,
            });
        }
        let markup = fs::read_to_string(path)?;
        self.extract_page(&markup, page)
    }

    /// Extract the regions of one page from its markup.
    pub fn extract_page(&self, markup: &str, page: &Page) -> Result<Vec<BoundingBox>> {
        let doc = roxmltree::Document::parse(markup)?;
        let root = doc.root_element();
        let main_area = page.main_area;

        let mut candidates = clip_path_boxes(root, page.number);
        candidates.extend(self.group_boxes(root, page.number, &main_area));
        candidates.retain(|b| b.width() >= MIN_BOX_EXTENT && b.height() >= MIN_BOX_EXTENT);

        let mut unique: Vec<BoundingBox> = Vec::with_capacity(candidates.len());
        for b in candidates {
            if !unique.contains(&b) {
                unique.push(b);
            }
        }
        unique.sort_by(|a, b| b.area().partial_cmp(&a.area()).unwrap_or(Ordering::Equal));

        let kept: Vec<BoundingBox> = unique
            .iter()
            .enumerate()
            .filter(|(i, b)| {
                !unique
                    .iter()
                    .enumerate()
                    .any(|(j, other)| j != *i && other.contains(b))
            })
            .map(|(_, b)| *b)
            .filter(|b| {
                main_area.contains(b) || b.outside_ratio(&main_area) < self.options.max_outside_ratio
            })
            .collect();

        log::debug!(
            "page {}: kept {} of {} vector boxes",
            page.number,
            kept.len(),
            unique.len()
        );
        Ok(kept)
    }

    fn group_boxes(&self, root: Node, page: u32, main_area: &BoundingBox) -> Vec<BoundingBox> {
        let groups: Vec<Node> = root
            .descendants()
            .filter(|n| is_element(n, "g"))
            .filter(|n| !n.ancestors().skip(1).any(|a| is_element(&a, "g")))
            .collect();

        if groups.is_empty() || groups.iter().all(is_dummy_cache) {
            log::debug!("page {page}: no drawn groups, skipping group extraction");
            return Vec::new();
        }

        groups
            .iter()
            .filter(|g| !is_transparent(g))
            .filter_map(|g| element_box(*g, page).or_else(|| drawn_box(*g, page)))
            .filter(|b| {
                main_area.contains(b)
                    && b.area() > 0.0
                    && b.area() / main_area.area() <= self.options.max_group_page_fraction
            })
            .collect()
    }
}

fn is_element(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

/// Union of the visible children of every `clipPath`.
fn clip_path_boxes(root: Node, page: u32) -> Vec<BoundingBox> {
    root.descendants()
        .filter(|n| is_element(n, "clipPath"))
        .filter_map(|clip| {
            clip.children()
                .filter(|c| c.is_element() && !is_transparent(c))
                .filter_map(|c| element_box(c, page))
                .reduce(|acc, b| acc.union(&b))
        })
        .filter(|b| b.area() > 0.0)
        .collect()
}

/// Union of the visible shapes below `node`, ignoring non-rendered containers.
fn drawn_box(node: Node, page: u32) -> Option<BoundingBox> {
    node.children()
        .filter(|c| c.is_element() && !is_transparent(c))
        .filter(|c| !matches!(c.tag_name().name(), "defs" | "clipPath" | "mask" | "symbol"))
        .filter_map(|c| element_box(c, page).or_else(|| drawn_box(c, page)))
        .reduce(|acc, b| acc.union(&b))
}

/// Box of a shape element from its own geometry. Malformed geometry is
/// logged and the element skipped.
fn element_box(node: Node, page: u32) -> Option<BoundingBox> {
    match shape_box(node, page) {
        Ok(b) => b,
        Err(e) => {
            log::debug!(
                "skipping <{}> on page {}: {}",
                node.tag_name().name(),
                page,
                e
            );
            None
        }
    }
}

fn shape_box(node: Node, page: u32) -> Result<Option<BoundingBox>> {
    match node.tag_name().name() {
        "path" => match node.attribute("d") {
            Some(d) => path_bounds(d, page),
            None => Ok(None),
        },
        "rect" | "image" | "use" => {
            let (Some(w), Some(h)) = (number_attr(node, "width")?, number_attr(node, "height")?)
            else {
                return Ok(None);
            };
            let x = number_attr(node, "x")?.unwrap_or(0.0);
            let y = number_attr(node, "y")?.unwrap_or(0.0);
            if w < 0.0 || h < 0.0 {
                return Err(Error::MalformedGeometry(format!("negative size {w}x{h}")));
            }
            Ok(Some(BoundingBox::from_point_and_dimensions(page, x, y, w, h)))
        }
        "circle" => {
            let Some(r) = number_attr(node, "r")? else {
                return Ok(None);
            };
            ellipse_box(node, page, r, r)
        }
        "ellipse" => {
            let (Some(rx), Some(ry)) = (number_attr(node, "rx")?, number_attr(node, "ry")?) else {
                return Ok(None);
            };
            ellipse_box(node, page, rx, ry)
        }
        "line" => {
            let x1 = number_attr(node, "x1")?.unwrap_or(0.0);
            let y1 = number_attr(node, "y1")?.unwrap_or(0.0);
            let x2 = number_attr(node, "x2")?.unwrap_or(0.0);
            let y2 = number_attr(node, "y2")?.unwrap_or(0.0);
            BoundingBox::from_two_points(page, x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))
                .map(Some)
        }
        "polyline" | "polygon" => match node.attribute("points") {
            Some(points) => points_box(points, page),
            None => Ok(None),
        },
        _ => Ok(None),
    }
}

fn ellipse_box(node: Node, page: u32, rx: f64, ry: f64) -> Result<Option<BoundingBox>> {
    if rx < 0.0 || ry < 0.0 {
        return Err(Error::MalformedGeometry(format!("negative radius {rx}/{ry}")));
    }
    let cx = number_attr(node, "cx")?.unwrap_or(0.0);
    let cy = number_attr(node, "cy")?.unwrap_or(0.0);
    Ok(Some(BoundingBox::from_point_and_dimensions(
        page,
        cx - rx,
        cy - ry,
        2.0 * rx,
        2.0 * ry,
    )))
}

fn points_box(points: &str, page: u32) -> Result<Option<BoundingBox>> {
    let values = points
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .map_err(|_| Error::MalformedGeometry(format!("invalid point coordinate '{s}'")))
        })
        .collect::<Result<Vec<f64>>>()?;
    if values.len() % 2 != 0 {
        return Err(Error::MalformedGeometry(
            "odd number of point coordinates".to_string(),
        ));
    }
    let mut pairs = values.chunks_exact(2);
    let Some(first) = pairs.next() else {
        return Ok(None);
    };
    let (mut x1, mut y1, mut x2, mut y2) = (first[0], first[1], first[0], first[1]);
    for p in pairs {
        x1 = x1.min(p[0]);
        y1 = y1.min(p[1]);
        x2 = x2.max(p[0]);
        y2 = y2.max(p[1]);
    }
    BoundingBox::from_two_points(page, x1, y1, x2, y2).map(Some)
}

fn number_attr(node: Node, name: &str) -> Result<Option<f64>> {
    let Some(raw) = node.attribute(name) else {
        return Ok(None);
    };
    let trimmed = raw.trim().trim_end_matches("px").trim_end_matches("pt");
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| Error::MalformedGeometry(format!("invalid {name}='{raw}'")))
}

/// Value of a presentation property on the element itself, the `style`
/// attribute taking precedence over the plain attribute. Lower-cased.
fn own_property(node: &Node, name: &str) -> Option<String> {
    let from_style = node.attribute("style").and_then(|style| {
        style.split(';').find_map(|decl| {
            let (key, value) = decl.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_ascii_lowercase())
        })
    });
    from_style.or_else(|| node.attribute(name).map(|v| v.trim().to_ascii_lowercase()))
}

/// Value of an inherited presentation property.
fn inherited_property(node: &Node, name: &str) -> Option<String> {
    node.ancestors()
        .filter(|n| n.is_element())
        .find_map(|n| own_property(&n, name))
}

fn opacity_below_visible(value: Option<String>) -> bool {
    value
        .and_then(|v| v.parse::<f64>().ok())
        .is_some_and(|o| o < MIN_VISIBLE_OPACITY)
}

fn is_black(color: &str) -> bool {
    matches!(
        color,
        "black" | "#000" | "#000000" | "rgb(0,0,0)" | "rgb(0, 0, 0)"
    )
}

/// Whether nothing of the element would be painted: an (inherited) opacity
/// or fill-opacity under [`MIN_VISIBLE_OPACITY`], or no fill and no visible
/// non-black stroke.
fn is_transparent(node: &Node) -> bool {
    let faded = node
        .ancestors()
        .filter(|n| n.is_element())
        .any(|n| opacity_below_visible(own_property(&n, "opacity")));
    if faded || opacity_below_visible(inherited_property(node, "fill-opacity")) {
        return true;
    }

    let no_fill = inherited_property(node, "fill").is_some_and(|f| f == "none");
    if !no_fill {
        return false;
    }
    let visible_stroke = inherited_property(node, "stroke").is_some_and(|s| s != "none" && !is_black(&s))
        && !opacity_below_visible(inherited_property(node, "stroke-opacity"));
    !visible_stroke
}

/// A group painted in plain white, used by the converter as a backdrop.
fn is_dummy_cache(node: &Node) -> bool {
    own_property(node, "fill").is_some_and(|f| matches!(f.as_str(), "#ffffff" | "#fff" | "white"))
}
