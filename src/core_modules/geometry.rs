// THEORY:
// `BoundingBox` is the universal spatial unit of the engine. Edge segments,
// flood-fill regions, components and pattern members are all expressed as
// axis-aligned boxes carrying a confidence score. Boxes are small `Copy` values:
// every stage receives its own copies and nothing is shared mutably.
//
// Conventions:
// - Coordinates are integer pixels; `width`/`height` are inclusive pixel extents,
//   so a box built from a single pixel is 1x1.
// - Every box the engine emits is clamped to the source image. `clamp_to` is the
//   only place that enforces this, and it never fails: out-of-range input is
//   squeezed into range.

use serde::{Deserialize, Serialize};

/// A simple struct to represent a 2D pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

/// An axis-aligned rectangle with a confidence score in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub confidence: f64,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32, confidence: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence: clamp_unit(confidence),
        }
    }

    /// Smallest box enclosing both corners (inclusive).
    pub fn from_extent(min: Point, max: Point, confidence: f64) -> Self {
        let (x0, x1) = (min.x.min(max.x), min.x.max(max.x));
        let (y0, y1) = (min.y.min(max.y), min.y.max(max.y));
        Self::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1, confidence)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// `width / height`, or 0 for a zero-height box.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Smallest box enclosing every box in `boxes`, with their mean confidence.
    pub fn union<'a>(boxes: impl IntoIterator<Item = &'a BoundingBox>) -> Option<BoundingBox> {
        let mut iter = boxes.into_iter();
        let first = iter.next()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.right(), first.bottom());
        let mut confidence = first.confidence;
        let mut count = 1.0;
        for bbox in iter {
            x0 = x0.min(bbox.x);
            y0 = y0.min(bbox.y);
            x1 = x1.max(bbox.right());
            y1 = y1.max(bbox.bottom());
            confidence += bbox.confidence;
            count += 1.0;
        }
        Some(BoundingBox::new(x0, y0, x1 - x0, y1 - y0, confidence / count))
    }

    /// Squeezes the box into a `width` x `height` image.
    pub fn clamp_to(&self, width: u32, height: u32) -> BoundingBox {
        let x = self.x.min(width);
        let y = self.y.min(height);
        BoundingBox {
            x,
            y,
            width: self.width.min(width - x),
            height: self.height.min(height - y),
            confidence: clamp_unit(self.confidence),
        }
    }
}

/// Clamps to [0, 1], mapping NaN to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Mean of `values`, or 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation, or 0 for an empty slice.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Row-major reading order of `boxes`, returned as indices.
///
/// Boxes are sorted top-to-bottom, then banded into rows: a box joins the
/// current row while its `y` is within `row_tolerance` of the row's first box.
/// Each row is then read left-to-right.
pub fn reading_order(boxes: &[BoundingBox], row_tolerance: u32) -> Vec<usize> {
    let mut by_top: Vec<usize> = (0..boxes.len()).collect();
    by_top.sort_by_key(|&i| (boxes[i].y, boxes[i].x, i));

    let mut order = Vec::with_capacity(boxes.len());
    let mut row: Vec<usize> = Vec::new();
    let mut row_top = 0;

    for index in by_top {
        let y = boxes[index].y;
        if !row.is_empty() && y - row_top > row_tolerance {
            row.sort_by_key(|&i| (boxes[i].x, boxes[i].y, i));
            order.append(&mut row);
        }
        if row.is_empty() {
            row_top = y;
        }
        row.push(index);
    }
    row.sort_by_key(|&i| (boxes[i].x, boxes[i].y, i));
    order.append(&mut row);
    order
}
