//! Extraction options and configuration.

use crate::error::{Error, Result};
use std::ops::RangeInclusive;

/// Default cap on the size of a vector markup file: 100 MiB.
pub const DEFAULT_FILE_SIZE_LIMIT: u64 = 100 * 1024 * 1024;

/// Area under which a merged vector region is too small to be a figure.
pub const MINIMUM_VECTOR_BOX_AREA: f64 = 3000.0;

/// Options for vector graphics extraction.
#[derive(Debug, Clone)]
pub struct VectorOptions {
    /// Markup files larger than this many bytes are skipped
    pub file_size_limit: u64,

    /// Extract pages on the rayon thread pool
    pub parallel: bool,

    /// Pages to extract
    pub pages: PageSelection,

    /// Merge touching regions of each page after extraction
    pub merge_touching: bool,

    /// Boxes not inside the main area must have a smaller outside fraction
    pub max_outside_ratio: f64,

    /// Group boxes covering more of the main area than this are backdrops
    pub max_group_page_fraction: f64,

    /// Regions no larger than this, after merging, are dropped
    pub min_box_area: f64,
}

impl VectorOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file size limit in bytes.
    pub fn with_file_size_limit(mut self, limit: u64) -> Self {
        self.file_size_limit = limit;
        self
    }

    /// Enable or disable parallel page extraction.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, selection: PageSelection) -> Self {
        self.pages = selection;
        self
    }

    /// Enable or disable merging of touching regions.
    pub fn with_merge_touching(mut self, merge: bool) -> Self {
        self.merge_touching = merge;
        self
    }

    /// Set the tolerated outside fraction for boxes leaving the main area.
    pub fn with_max_outside_ratio(mut self, ratio: f64) -> Self {
        self.max_outside_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Set the main-area fraction above which a group box is a backdrop.
    pub fn with_max_group_page_fraction(mut self, fraction: f64) -> Self {
        self.max_group_page_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Drop final regions whose area does not exceed `area`.
    ///
    /// [`MINIMUM_VECTOR_BOX_AREA`] is the usual value for full-page figures.
    pub fn with_min_box_area(mut self, area: f64) -> Self {
        self.min_box_area = area.max(0.0);
        self
    }
}

impl Default for VectorOptions {
    fn default() -> Self {
        Self {
            file_size_limit: DEFAULT_FILE_SIZE_LIMIT,
            parallel: true,
            pages: PageSelection::All,
            merge_touching: true,
            max_outside_ratio: 0.03,
            max_group_page_fraction: 0.7,
            min_box_area: 0.0,
        }
    }
}

/// Page selection for extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start = parse_page(start)?;
                let end = parse_page(end)?;
                if start > end {
                    return Err(Error::InvalidPageRange(s.to_string()));
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                for p in parse_page(start)?..=parse_page(end)? {
                    if !pages.contains(&p) {
                        pages.push(p);
                    }
                }
            } else {
                let p = parse_page(part)?;
                if !pages.contains(&p) {
                    pages.push(p);
                }
            }
        }

        pages.sort_unstable();
        Ok(PageSelection::Pages(pages))
    }
}

fn parse_page(s: &str) -> Result<u32> {
    s.trim()
        .parse()
        .map_err(|_| Error::InvalidPageRange(format!("invalid page number '{}'", s.trim())))
}
