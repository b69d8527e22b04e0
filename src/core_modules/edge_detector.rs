// THEORY:
// The `EdgeDetector` is the first signal-processing layer. It turns the raw pixel
// grid into a short list of "edge segments": small boxes sitting on the borders
// between flat UI surfaces. The layout layer reads grid lines, spacing and
// alignment out of these boxes.
//
// Algorithm:
// 1.  **Gradient**: for every interior pixel (a 1-pixel border is skipped) take the
//     central differences of the channel-mean intensity,
//     `gx = gray(x+1, y) - gray(x-1, y)` and `gy = gray(x, y+1) - gray(x, y-1)`.
//     The magnitude `sqrt(gx² + gy²)` is on the 0..255 scale of the input.
// 2.  **Thresholding**: a pixel is an edge point when its magnitude exceeds the
//     configured threshold. Its confidence is `min(magnitude / 255, 1)`.
// 3.  **Clustering**: a single greedy pass in row-major order. Each point that is
//     not yet assigned becomes a seed and claims every unassigned point within
//     `cluster_distance` of it. A spatial hash keeps the lookup local instead of
//     scanning all points for each seed.
// 4.  **Collapse**: singleton clusters are noise and dropped; the rest collapse to
//     their inclusive bounding box with the mean member confidence.
//
// Images narrower or shorter than 3 pixels have no interior and yield nothing.

use crate::config::EdgeConfig;
use crate::core_modules::geometry::{BoundingBox, Point};
use crate::core_modules::pixel_buffer::PixelBuffer;
use std::collections::HashMap;
use tracing::debug;

/// A merged cluster of high-gradient pixels.
pub type EdgeSegment = BoundingBox;

/// A single thresholded gradient sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePoint {
    pub x: u32,
    pub y: u32,
    /// Gradient magnitude on the 0..255 scale.
    pub magnitude: f64,
    /// `min(magnitude / 255, 1)`.
    pub confidence: f64,
}

#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    config: EdgeConfig,
}

impl EdgeDetector {
    pub fn new(config: EdgeConfig) -> Self {
        Self { config }
    }

    /// Detects edge segments in `pixels`.
    pub fn detect_edges(&self, pixels: &PixelBuffer) -> Vec<EdgeSegment> {
        let points = self.edge_points(pixels);
        let segments = self.cluster(&points);
        debug!(
            edge_points = points.len(),
            segments = segments.len(),
            "edge detection complete"
        );
        segments
    }

    /// Every interior pixel whose gradient magnitude exceeds the threshold, in
    /// row-major order.
    pub fn edge_points(&self, pixels: &PixelBuffer) -> Vec<EdgePoint> {
        let (width, height) = (pixels.width(), pixels.height());
        if width < 3 || height < 3 {
            return Vec::new();
        }

        let mut points = Vec::new();
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let gx = pixels.gray(x + 1, y) - pixels.gray(x - 1, y);
                let gy = pixels.gray(x, y + 1) - pixels.gray(x, y - 1);
                let magnitude = (gx * gx + gy * gy).sqrt();
                if magnitude > self.config.gradient_threshold {
                    points.push(EdgePoint {
                        x,
                        y,
                        magnitude,
                        confidence: (magnitude / 255.0).min(1.0),
                    });
                }
            }
        }
        points
    }

    /// Greedy seed clustering of `points` (which must be in row-major order).
    pub fn cluster(&self, points: &[EdgePoint]) -> Vec<EdgeSegment> {
        let radius = self.config.cluster_distance;
        let cell = radius.ceil().max(1.0) as i64;
        let reach = (radius / cell as f64).ceil() as i64;
        let radius_sq = radius * radius;

        let cell_of = |p: &EdgePoint| (p.x as i64 / cell, p.y as i64 / cell);
        let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        for (index, point) in points.iter().enumerate() {
            grid.entry(cell_of(point)).or_default().push(index);
        }

        let mut assigned = vec![false; points.len()];
        let mut segments = Vec::new();

        for (seed_index, seed) in points.iter().enumerate() {
            if assigned[seed_index] {
                continue;
            }
            assigned[seed_index] = true;

            let mut min = Point { x: seed.x, y: seed.y };
            let mut max = min;
            let mut confidence_sum = seed.confidence;
            let mut members = 1usize;

            let (cx, cy) = cell_of(seed);
            for gy in cy - reach..=cy + reach {
                for gx in cx - reach..=cx + reach {
                    let Some(bucket) = grid.get(&(gx, gy)) else {
                        continue;
                    };
                    for &candidate in bucket {
                        if assigned[candidate] {
                            continue;
                        }
                        let point = &points[candidate];
                        let dx = point.x as f64 - seed.x as f64;
                        let dy = point.y as f64 - seed.y as f64;
                        if dx * dx + dy * dy <= radius_sq {
                            assigned[candidate] = true;
                            min.x = min.x.min(point.x);
                            min.y = min.y.min(point.y);
                            max.x = max.x.max(point.x);
                            max.y = max.y.max(point.y);
                            confidence_sum += point.confidence;
                            members += 1;
                        }
                    }
                }
            }

            // Isolated points are noise.
            if members > 1 {
                segments.push(BoundingBox::from_extent(
                    min,
                    max,
                    confidence_sum / members as f64,
                ));
            }
        }
        segments
    }
}
