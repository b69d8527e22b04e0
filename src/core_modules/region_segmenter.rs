// THEORY:
// The `RegionSegmenter` is the spatial grouping layer. It grows connected regions
// of similar colour out of seed pixels and reports each sufficiently large,
// solid region as a candidate UI element. The classifier decides later what, if
// anything, a candidate is.
//
// Key architectural principles & algorithm steps:
// 1.  **Coarse seeding**: seeds are taken from a lattice (`seed_stride` pixels
//     apart) instead of every pixel.
// 2.  **Region growing**: from each unvisited seed, an iterative fill expands
//     through the 4 direct neighbours while every RGB channel stays within
//     `color_tolerance` of the *seed* colour. The fill uses an explicit stack.
// 3.  **Run-scoped visited map**: one bitmap of `width * height` flags is shared by
//     every fill of a pass and owned by that pass alone. A pixel claimed by one
//     fill is never explored again.
// 4.  **Filtering**: only the extent and pixel count survive a fill. Regions under
//     `min_region_side` in either dimension or under `min_pixel_count` pixels are
//     dropped. Confidence is `min(pixel_count / confidence_pixel_count, 1)`.

use crate::config::SegmentationConfig;
use crate::core_modules::geometry::{BoundingBox, Point};
use crate::core_modules::pixel_buffer::PixelBuffer;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bookkeeping of one segmentation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationStats {
    /// Pixels claimed by any fill. Never exceeds `width * height`.
    pub visited_pixels: usize,
    /// Fills started, kept or not.
    pub fills: usize,
    /// Fills that passed the size filter.
    pub regions: usize,
}

/// The raw result of growing one region.
#[derive(Debug, Clone, Copy)]
struct Fill {
    min: Point,
    max: Point,
    pixel_count: usize,
}

/// Run-scoped visited flags, one per pixel.
struct VisitedMap {
    width: usize,
    flags: Vec<bool>,
}

impl VisitedMap {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as usize,
            flags: vec![false; width as usize * height as usize],
        }
    }

    #[inline]
    fn is_visited(&self, x: u32, y: u32) -> bool {
        self.flags[y as usize * self.width + x as usize]
    }

    #[inline]
    fn mark(&mut self, x: u32, y: u32) {
        self.flags[y as usize * self.width + x as usize] = true;
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegionSegmenter {
    config: SegmentationConfig,
}

impl RegionSegmenter {
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    /// Candidate UI element boxes, in seed order.
    pub fn segment_regions(&self, pixels: &PixelBuffer) -> Vec<BoundingBox> {
        self.segment_with_stats(pixels).0
    }

    /// Same as [`segment_regions`](Self::segment_regions), also reporting how much
    /// of the image the pass touched.
    pub fn segment_with_stats(
        &self,
        pixels: &PixelBuffer,
    ) -> (Vec<BoundingBox>, SegmentationStats) {
        let (width, height) = (pixels.width(), pixels.height());
        let mut stats = SegmentationStats::default();
        let mut regions = Vec::new();
        if width == 0 || height == 0 {
            return (regions, stats);
        }

        let stride = self.config.seed_stride.max(1) as usize;
        let mut visited = VisitedMap::new(width, height);

        for y in (0..height).step_by(stride) {
            for x in (0..width).step_by(stride) {
                if visited.is_visited(x, y) {
                    continue;
                }

                let fill = self.flood_fill(pixels, Point { x, y }, &mut visited);
                stats.fills += 1;
                stats.visited_pixels += fill.pixel_count;

                if let Some(region) = self.to_region(&fill) {
                    regions.push(region);
                }
            }
        }

        stats.regions = regions.len();
        debug!(
            regions = stats.regions,
            fills = stats.fills,
            visited_pixels = stats.visited_pixels,
            "segmentation complete"
        );
        (regions, stats)
    }

    /// Grows the region of pixels similar to the seed's colour.
    fn flood_fill(&self, pixels: &PixelBuffer, seed: Point, visited: &mut VisitedMap) -> Fill {
        let seed_color = pixels.pixel(seed.x, seed.y);
        let tolerance = self.config.color_tolerance;
        let (width, height) = (pixels.width(), pixels.height());

        let mut fill = Fill {
            min: seed,
            max: seed,
            pixel_count: 0,
        };
        let mut stack = vec![seed];
        visited.mark(seed.x, seed.y);

        while let Some(current) = stack.pop() {
            fill.pixel_count += 1;
            fill.min.x = fill.min.x.min(current.x);
            fill.min.y = fill.min.y.min(current.y);
            fill.max.x = fill.max.x.max(current.x);
            fill.max.y = fill.max.y.max(current.y);

            // Check all 4 direct neighbours (not diagonals).
            let neighbours = [
                (current.x.checked_sub(1), Some(current.y)),
                (current.x.checked_add(1).filter(|&nx| nx < width), Some(current.y)),
                (Some(current.x), current.y.checked_sub(1)),
                (Some(current.x), current.y.checked_add(1).filter(|&ny| ny < height)),
            ];
            for (nx, ny) in neighbours {
                let (Some(nx), Some(ny)) = (nx, ny) else {
                    continue;
                };
                if !visited.is_visited(nx, ny)
                    && pixels.pixel(nx, ny).within_tolerance(&seed_color, tolerance)
                {
                    visited.mark(nx, ny);
                    stack.push(Point { x: nx, y: ny });
                }
            }
        }
        fill
    }

    fn to_region(&self, fill: &Fill) -> Option<BoundingBox> {
        let confidence = fill.pixel_count as f64 / self.config.confidence_pixel_count;
        let region = BoundingBox::from_extent(fill.min, fill.max, confidence.min(1.0));
        let side = self.config.min_region_side;
        (region.width >= side
            && region.height >= side
            && fill.pixel_count >= self.config.min_pixel_count)
            .then_some(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::pixel::pixel::Pixel;

    #[test]
    fn uniform_image_is_one_region() {
        let pixels = PixelBuffer::filled(120, 80, Pixel::rgb(12, 200, 90));
        let (regions, stats) = RegionSegmenter::default().segment_with_stats(&pixels);
        assert_eq!(regions, vec![BoundingBox::new(0, 0, 120, 80, 1.0)]);
        assert_eq!(stats.fills, 1);
        assert_eq!(stats.visited_pixels, 120 * 80);
    }

    #[test]
    fn single_pixel_image_has_no_region() {
        let pixels = PixelBuffer::filled(1, 1, Pixel::WHITE);
        let (regions, stats) = RegionSegmenter::default().segment_with_stats(&pixels);
        assert!(regions.is_empty());
        assert_eq!(stats.visited_pixels, 1);
    }

    #[test]
    fn finds_rectangles_on_a_contrasting_canvas() {
        let pixels = PixelBuffer::from_fn(200, 120, |x, y| {
            let in_left = (20..80).contains(&x) && (20..60).contains(&y);
            let in_right = (120..180).contains(&x) && (20..100).contains(&y);
            if in_left || in_right {
                Pixel::WHITE
            } else {
                Pixel::rgb(20, 20, 60)
            }
        });
        let regions = RegionSegmenter::default().segment_regions(&pixels);
        assert_eq!(regions.len(), 3);
        assert_eq!((regions[0].width, regions[0].height), (200, 120));
        let r = &regions[1];
        assert_eq!((r.x, r.y, r.width, r.height), (20, 20, 60, 40));
        let r = &regions[2];
        assert_eq!((r.x, r.y, r.width, r.height), (120, 20, 60, 80));
        assert_eq!(regions[1].confidence, 1.0);
    }

    #[test]
    fn small_and_sparse_fills_are_dropped() {
        // A 15x15 patch is under the 20px side limit.
        let pixels = PixelBuffer::from_fn(100, 100, |x, y| {
            if (40..55).contains(&x) && (40..55).contains(&y) {
                Pixel::BLACK
            } else {
                Pixel::WHITE
            }
        });
        let regions = RegionSegmenter::default().segment_regions(&pixels);
        assert_eq!(regions.len(), 1);
        assert_eq!((regions[0].width, regions[0].height), (100, 100));
        assert!((regions[0].confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn tolerance_is_measured_against_the_seed() {
        // A horizontal ramp of +10 per column: pixels 5 columns away still match,
        // 6 columns away do not.
        let pixels = PixelBuffer::from_fn(60, 30, |x, _| {
            let v = (x * 10).min(255) as u8;
            Pixel::rgb(v, v, v)
        });
        let segmenter = RegionSegmenter::new(SegmentationConfig {
            min_region_side: 1,
            min_pixel_count: 1,
            ..SegmentationConfig::default()
        });
        let regions = segmenter.segment_regions(&pixels);
        assert_eq!((regions[0].x, regions[0].width), (0, 6));
    }

    #[test]
    fn confidence_scales_with_pixel_count() {
        let pixels = PixelBuffer::from_fn(100, 100, |x, y| {
            if (10..30).contains(&x) && (10..30).contains(&y) {
                Pixel::BLACK
            } else {
                Pixel::WHITE
            }
        });
        let regions = RegionSegmenter::default().segment_regions(&pixels);
        let patch = regions.iter().find(|r| r.x == 10).unwrap();
        assert_eq!((patch.width, patch.height), (20, 20));
        assert!((patch.confidence - 0.4).abs() < 1e-9);
    }
}
