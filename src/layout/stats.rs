//! Document layout statistics.
//!
//! Median vertical spacing between blocks and between lines, and the
//! adaptive block-merging thresholds derived from them.

use crate::error::{Error, Result};
use crate::model::{Block, BoundingBox, Document};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

/// Median block distance assumed for documents without blocks.
pub const DEFAULT_BLOCK_DISTANCE: f64 = 10.0;

/// Median line distance assumed for documents without blocks.
pub const DEFAULT_LINE_DISTANCE: f64 = 2.0;

/// Multi-column threshold when there are too few blocks to measure.
const DEFAULT_MULTI_COLUMN_THRESHOLD: f64 = 18.0;

/// Multi-column threshold when no blocks share a line.
const UNALIGNED_MULTI_COLUMN_THRESHOLD: f64 = 15.0;

const MIN_BLOCKS_FOR_COLUMN_STATS: usize = 10;

/// Blocks whose vertical gap is within this many points share a line.
const SAME_LINE_TOLERANCE: f64 = 3.0;

/// Median of `values`; the mean of the two middle values for an even count.
pub fn median(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::EmptyInput(
            "cannot compute the median of no values".to_string(),
        ));
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Ok(sorted[mid])
    } else {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Median of the strictly positive vertical gaps between consecutive
/// items of the same page, items sorted by (page, y).
///
/// Items without geometry are ignored. Fails with [`Error::EmptyInput`]
/// when no positive gap exists.
pub fn median_vertical_distance<T>(
    items: &[T],
    bbox_of: impl Fn(&T) -> Option<BoundingBox>,
) -> Result<f64> {
    let mut boxes: Vec<BoundingBox> = items.iter().filter_map(bbox_of).collect();
    boxes.sort_by(|a, b| {
        a.page()
            .cmp(&b.page())
            .then(a.y().partial_cmp(&b.y()).unwrap_or(Ordering::Equal))
    });

    let distances: Vec<f64> = boxes
        .windows(2)
        .filter(|w| w[0].page() == w[1].page())
        .map(|w| w[0].vertical_distance_to(&w[1]))
        .filter(|d| *d > 0.0)
        .collect();

    median(&distances)
}

/// Median vertical distance between the blocks of a document.
///
/// Returns [`DEFAULT_BLOCK_DISTANCE`] for a document without blocks.
pub fn median_block_distance(document: &Document) -> Result<f64> {
    let blocks: Vec<&Block> = document.blocks().collect();
    if blocks.is_empty() {
        return Ok(DEFAULT_BLOCK_DISTANCE);
    }
    median_vertical_distance(&blocks, |b| b.bbox)
}

/// Median vertical distance between the lines of a document.
///
/// A line is represented by the first token found at each (page, y)
/// position. Returns [`DEFAULT_LINE_DISTANCE`] for a document without blocks.
pub fn median_line_distance(document: &Document) -> Result<f64> {
    if document.blocks().next().is_none() {
        return Ok(DEFAULT_LINE_DISTANCE);
    }

    let mut seen = HashSet::new();
    let lines: Vec<BoundingBox> = document
        .blocks()
        .filter(|b| b.bbox.is_some())
        .flat_map(|b| b.tokens.iter())
        .filter_map(|t| t.bbox)
        .filter(|b| seen.insert((b.page(), b.y().to_bits())))
        .filter(|b| b.x() >= 0.0 && b.y() >= 0.0)
        .collect();

    median_vertical_distance(&lines, |b| Some(*b))
}

/// Block and line spacing of a document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutStatistics {
    pub median_block_distance: f64,
    pub median_line_distance: f64,
}

impl LayoutStatistics {
    pub fn compute(document: &Document) -> Result<Self> {
        Ok(Self {
            median_block_distance: median_block_distance(document)?,
            median_line_distance: median_line_distance(document)?,
        })
    }
}

/// Column structure of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page: u32,
    pub estimated_columns: usize,

    /// Block centres right before which a new column starts
    pub column_separators: Vec<f64>,
}

/// Column structure of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub has_multiple_columns: bool,

    /// Most common column count over the pages
    pub estimated_columns: usize,

    /// Whether every page has the most common column count
    pub consistent_columns: bool,

    pub pages: Vec<PageLayout>,
}

impl LayoutInfo {
    pub fn analyze(document: &Document) -> Self {
        let mut by_page: BTreeMap<u32, Vec<BoundingBox>> = BTreeMap::new();
        for block in document.blocks() {
            let entry = by_page.entry(block.page).or_default();
            if let Some(bbox) = block.bbox {
                entry.push(bbox);
            }
        }

        let pages: Vec<PageLayout> = by_page
            .into_iter()
            .map(|(page, boxes)| analyze_page(page, boxes))
            .collect();

        let mut frequency: BTreeMap<usize, usize> = BTreeMap::new();
        for p in &pages {
            *frequency.entry(p.estimated_columns).or_default() += 1;
        }
        let estimated_columns = frequency
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map_or(1, |(columns, _)| *columns);

        Self {
            has_multiple_columns: pages.iter().any(|p| p.estimated_columns > 1),
            estimated_columns,
            consistent_columns: pages.iter().all(|p| p.estimated_columns == estimated_columns),
            pages,
        }
    }
}

/// Columns are separated by centre gaps well above the median gap.
fn analyze_page(page: u32, mut boxes: Vec<BoundingBox>) -> PageLayout {
    boxes.sort_by(|a, b| a.x().partial_cmp(&b.x()).unwrap_or(Ordering::Equal));
    let centres: Vec<f64> = boxes.iter().map(|b| b.x() + b.width() / 2.0).collect();
    let gaps: Vec<f64> = centres.windows(2).map(|w| w[1] - w[0]).collect();

    let median_gap = median(&gaps).unwrap_or(0.0);
    let column_separators: Vec<f64> = gaps
        .iter()
        .enumerate()
        .filter(|(_, gap)| **gap > median_gap * 1.5)
        .map(|(i, _)| centres[i])
        .collect();

    PageLayout {
        page,
        estimated_columns: column_separators.len() + 1,
        column_separators,
    }
}

/// Block merging thresholds adapted to a document's spacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveThresholds {
    /// Maximum distance for merging blocks in reading order
    pub standard_threshold: f64,

    /// Maximum horizontal gap for merging blocks on the same line
    pub multi_column_threshold: f64,

    /// How close blocks must be vertically to count as aligned
    pub vertical_tolerance: f64,

    pub layout: LayoutInfo,
}

impl AdaptiveThresholds {
    pub fn from_document(document: &Document) -> Result<Self> {
        let stats = LayoutStatistics::compute(document)?;
        let layout = LayoutInfo::analyze(document);

        let standard_threshold = (stats.median_block_distance * 1.2).max(5.0);
        let multi_column_threshold = if layout.has_multiple_columns {
            multi_column_threshold(document)
        } else {
            standard_threshold * 1.3
        };
        let vertical_tolerance = (stats.median_line_distance * 0.8).max(1.0);

        log::debug!(
            "adaptive thresholds: standard {:.2}, multi-column {:.2}, vertical {:.2}",
            standard_threshold,
            multi_column_threshold,
            vertical_tolerance
        );

        Ok(Self {
            standard_threshold,
            multi_column_threshold,
            vertical_tolerance,
            layout,
        })
    }
}

/// 75th percentile of the horizontal offsets between blocks sharing a
/// line, with some slack, clamped to `15..=50`.
fn multi_column_threshold(document: &Document) -> f64 {
    let mut by_page: BTreeMap<u32, Vec<BoundingBox>> = BTreeMap::new();
    for bbox in document.blocks().filter_map(|b| b.bbox) {
        by_page.entry(bbox.page()).or_default().push(bbox);
    }
    let total: usize = by_page.values().map(Vec::len).sum();
    if total < MIN_BLOCKS_FOR_COLUMN_STATS {
        return DEFAULT_MULTI_COLUMN_THRESHOLD;
    }

    let mut offsets: Vec<f64> = Vec::new();
    for boxes in by_page.values_mut() {
        boxes.sort_by(|a, b| a.y().partial_cmp(&b.y()).unwrap_or(Ordering::Equal));
        offsets.extend(
            boxes
                .windows(2)
                .filter(|w| w[0].vertical_distance_to(&w[1]).abs() <= SAME_LINE_TOLERANCE)
                .map(|w| (w[0].x() - w[1].x()).abs()),
        );
    }
    if offsets.is_empty() {
        return UNALIGNED_MULTI_COLUMN_THRESHOLD;
    }

    offsets.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let index = ((offsets.len() as f64 * 0.75) as usize).min(offsets.len() - 1);
    (offsets[index] * 1.2).clamp(15.0, 50.0)
}
