//! Page-scoped rectangle geometry.
//!
//! Every [`BoundingBox`] belongs to exactly one page. Operations between
//! boxes on different pages never produce a merged box: ratios fall back
//! to their 0/1 sentinels and intersection tests fail.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distance reported between boxes on different pages, per page of separation.
pub const PAGE_DISTANCE: f64 = 1000.0;

/// Axis-aligned rectangle on a page, with the origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    page: u32,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl BoundingBox {
    /// Create a box from its top-left corner and dimensions.
    pub fn from_point_and_dimensions(page: u32, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            page,
            x,
            y,
            width,
            height,
        }
    }

    /// Create a box from two corners.
    ///
    /// Fails when the second corner lies left of or above the first.
    pub fn from_two_points(page: u32, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self> {
        if x1 > x2 || y1 > y2 {
            return Err(Error::MalformedGeometry(format!(
                "inverted corners ({x1}, {y1}) -> ({x2}, {y2})"
            )));
        }
        Ok(Self::from_point_and_dimensions(
            page,
            x1,
            y1,
            x2 - x1,
            y2 - y1,
        ))
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Right edge.
    pub fn x2(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn y2(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Bounding box of both boxes.
    ///
    /// The page of `self` is kept; callers are expected to pass boxes from
    /// the same page. See [`union_excluding_other_page`](Self::union_excluding_other_page).
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let x2 = self.x2().max(other.x2());
        let y2 = self.y2().max(other.y2());
        BoundingBox::from_point_and_dimensions(self.page, x, y, x2 - x, y2 - y)
    }

    /// Like [`union`](Self::union), but returns `self` unchanged when the
    /// other box lives on a different page.
    pub fn union_excluding_other_page(&self, other: &BoundingBox) -> BoundingBox {
        if self.page != other.page {
            return *self;
        }
        self.union(other)
    }

    /// Strict overlap test; boxes that merely share an edge do not intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.page == other.page
            && self.x < other.x2()
            && self.x2() > other.x
            && self.y < other.y2()
            && self.y2() > other.y
    }

    /// Whether `other` lies entirely within `self` (edges may coincide).
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.page == other.page
            && self.x <= other.x
            && self.y <= other.y
            && self.x2() >= other.x2()
            && self.y2() >= other.y2()
    }

    /// Overlapping region of two boxes, if they intersect.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let x2 = self.x2().min(other.x2());
        let y2 = self.y2().min(other.y2());
        Some(BoundingBox::from_point_and_dimensions(
            self.page,
            x,
            y,
            x2 - x,
            y2 - y,
        ))
    }

    /// Intersection over union, rounded to two decimals.
    ///
    /// Returns 0.0 for boxes on different pages or without intersection.
    pub fn overlap_ratio(&self, other: &BoundingBox) -> f64 {
        let Some(inter) = self.intersection(other) else {
            return 0.0;
        };
        let inter_area = inter.area();
        let union_area = self.area() + other.area() - inter_area;
        if union_area <= 0.0 {
            return 0.0;
        }
        round2(inter_area / union_area)
    }

    /// Fraction of this box lying outside `reference`, rounded to two decimals.
    ///
    /// Returns 1.0 when the reference is on another page or has no area,
    /// 0.0 when this box is fully inside.
    pub fn outside_ratio(&self, reference: &BoundingBox) -> f64 {
        if self.page != reference.page || reference.area() <= 0.0 {
            return 1.0;
        }
        let area = self.area();
        if area <= 0.0 {
            return if reference.contains(self) { 0.0 } else { 1.0 };
        }
        let inside = self.intersection(reference).map_or(0.0, |b| b.area());
        round2((1.0 - inside / area).clamp(0.0, 1.0))
    }

    /// Gap between the nearest edges of two boxes; 0.0 when they touch or overlap.
    ///
    /// Boxes on different pages are [`PAGE_DISTANCE`] apart per page.
    pub fn distance_to(&self, other: &BoundingBox) -> f64 {
        if self.page != other.page {
            return PAGE_DISTANCE * (self.page as f64 - other.page as f64).abs();
        }
        let dx = (other.x - self.x2()).max(self.x - other.x2()).max(0.0);
        let dy = (other.y - self.y2()).max(self.y - other.y2()).max(0.0);
        dx.hypot(dy)
    }

    /// Gap between the nearest horizontal edges. Negative when the boxes
    /// overlap vertically.
    pub fn vertical_distance_to(&self, other: &BoundingBox) -> f64 {
        (other.y - self.y2()).max(self.y - other.y2())
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{:.2},{:.2},{:.2},{:.2}",
            self.page, self.x, self.y, self.width, self.height
        )
    }
}

impl FromStr for BoundingBox {
    type Err = Error;

    /// Parse the `page,x,y,width,height` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 5 {
            return Err(Error::MalformedGeometry(format!(
                "expected page,x,y,width,height but got '{s}'"
            )));
        }
        let page = parts[0]
            .parse::<u32>()
            .map_err(|_| Error::MalformedGeometry(format!("invalid page '{}'", parts[0])))?;
        let mut values = [0.0f64; 4];
        for (slot, raw) in values.iter_mut().zip(&parts[1..]) {
            *slot = raw
                .parse::<f64>()
                .map_err(|_| Error::MalformedGeometry(format!("invalid coordinate '{raw}'")))?;
        }
        Ok(BoundingBox::from_point_and_dimensions(
            page, values[0], values[1], values[2], values[3],
        ))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
