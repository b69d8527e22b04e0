// THEORY:
// The `LayoutAnalyzer` reads page structure out of the edge segments and the
// segmented regions. It never looks at colours; everything here is geometry.
//
// Four independent measurements are combined into one `LayoutAnalysis`:
// 1.  **Grid**: long, thin segments are grid lines (horizontal when
//     `width > ratio * height`, vertical when `height > ratio * width`). Line
//     positions on each axis are sorted and merged whenever consecutive positions
//     are no more than `line_gap` apart. `n` distinct lines cut the axis into
//     `n + 1` tracks, so columns and rows are line counts plus one. Gaps are the
//     mean distance between distinct lines; gutters are the distance from each
//     image edge to the outermost line on that side.
// 2.  **Visual hierarchy**: each region is scored by
//     `(area / total) * 100 + (1 - y/H) * 50 + (1 - x/W) * 20 + confidence * 30`,
//     so top-left dominance wins ties of size. Ranked regions are cut into
//     primary, secondary and tertiary tiers.
// 3.  **Spacing**: distances between centres of segment pairs closer than
//     `spacing_max_distance`; consistency is `max(0, 1 - stddev / mean)`.
// 4.  **Alignment**: segments grouped by a shared coordinate (left, centre or
//     right x; top, middle or bottom y) within `alignment_tolerance`. A kind of
//     alignment is present when its largest group has more than one member.

use crate::config::LayoutConfig;
use crate::core_modules::edge_detector::EdgeDetector;
use crate::core_modules::geometry::{self, BoundingBox};
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::region_segmenter::RegionSegmenter;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutType {
    Grid,
    Flexbox,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Gutters {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridStructure {
    pub columns: usize,
    pub rows: usize,
    /// Mean distance between distinct vertical lines.
    pub column_gap: f64,
    /// Mean distance between distinct horizontal lines.
    pub row_gap: f64,
    pub gutters: Gutters,
    /// Distinct x positions of vertical lines.
    pub vertical_lines: Vec<u32>,
    /// Distinct y positions of horizontal lines.
    pub horizontal_lines: Vec<u32>,
}

impl GridStructure {
    /// More than one track on either axis.
    pub fn is_detected(&self) -> bool {
        self.columns > 1 || self.rows > 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedRegion {
    pub bounding_box: BoundingBox,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisualHierarchy {
    pub primary: Vec<RankedRegion>,
    pub secondary: Vec<RankedRegion>,
    pub tertiary: Vec<RankedRegion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacingAnalysis {
    /// Number of segment pairs that fed the statistics.
    pub pairs: usize,
    pub mean_distance: f64,
    pub std_dev: f64,
    /// 1 for perfectly even spacing, 0 for highly irregular spacing.
    pub consistency: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentGroup {
    pub present: bool,
    pub largest_group: usize,
    /// Coordinate of the first member of the largest group.
    pub position: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentAnalysis {
    pub left: AlignmentGroup,
    pub center: AlignmentGroup,
    pub right: AlignmentGroup,
    pub top: AlignmentGroup,
    pub middle: AlignmentGroup,
    pub bottom: AlignmentGroup,
}

impl AlignmentAnalysis {
    /// Largest group sharing an x coordinate (items stacked in a column).
    pub fn vertical_group(&self) -> usize {
        self.left
            .largest_group
            .max(self.center.largest_group)
            .max(self.right.largest_group)
    }

    /// Largest group sharing a y coordinate (items laid out in a row).
    pub fn horizontal_group(&self) -> usize {
        self.top
            .largest_group
            .max(self.middle.largest_group)
            .max(self.bottom.largest_group)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutAnalysis {
    pub layout_type: LayoutType,
    pub grid: GridStructure,
    pub hierarchy: VisualHierarchy,
    pub spacing: SpacingAnalysis,
    pub alignment: AlignmentAnalysis,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutAnalyzer {
    config: LayoutConfig,
    edges: EdgeDetector,
    segmenter: RegionSegmenter,
}

impl LayoutAnalyzer {
    pub fn new(config: LayoutConfig, edges: EdgeDetector, segmenter: RegionSegmenter) -> Self {
        Self {
            config,
            edges,
            segmenter,
        }
    }

    /// Runs edge detection and segmentation on `pixels`, then analyses the result.
    pub fn analyze_layout(&self, pixels: &PixelBuffer) -> LayoutAnalysis {
        let edges = self.edges.detect_edges(pixels);
        let regions = self.segmenter.segment_regions(pixels);
        self.analyze_segments(pixels.width(), pixels.height(), &edges, &regions)
    }

    /// Analyses already computed edge segments and regions of a `width` x `height` image.
    pub fn analyze_segments(
        &self,
        width: u32,
        height: u32,
        edges: &[BoundingBox],
        regions: &[BoundingBox],
    ) -> LayoutAnalysis {
        let grid = self.detect_grid(width, height, edges);
        let hierarchy = self.rank_regions(width, height, regions);
        let spacing = self.measure_spacing(edges);
        let alignment = self.detect_alignment(edges);

        let layout_type = if grid.columns >= 3 && grid.rows >= 3 {
            LayoutType::Grid
        } else if alignment.horizontal_group() > 2 || alignment.vertical_group() > 2 {
            LayoutType::Flexbox
        } else {
            LayoutType::Unknown
        };

        debug!(
            columns = grid.columns,
            rows = grid.rows,
            ?layout_type,
            consistency = spacing.consistency,
            "layout analysis complete"
        );

        LayoutAnalysis {
            layout_type,
            grid,
            hierarchy,
            spacing,
            alignment,
        }
    }

    pub fn detect_grid(&self, width: u32, height: u32, edges: &[BoundingBox]) -> GridStructure {
        let ratio = self.config.line_aspect_ratio;
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for edge in edges {
            let (w, h) = (edge.width as f64, edge.height as f64);
            if w > ratio * h {
                ys.push(edge.y);
            } else if h > ratio * w {
                xs.push(edge.x);
            }
        }

        let vertical_lines = self.distinct_lines(xs);
        let horizontal_lines = self.distinct_lines(ys);

        let gutters = Gutters {
            top: horizontal_lines.first().map_or(0.0, |&y| y as f64),
            bottom: horizontal_lines
                .last()
                .map_or(0.0, |&y| height.saturating_sub(y) as f64),
            left: vertical_lines.first().map_or(0.0, |&x| x as f64),
            right: vertical_lines
                .last()
                .map_or(0.0, |&x| width.saturating_sub(x) as f64),
        };

        GridStructure {
            columns: vertical_lines.len() + 1,
            rows: horizontal_lines.len() + 1,
            column_gap: mean_delta(&vertical_lines),
            row_gap: mean_delta(&horizontal_lines),
            gutters,
            vertical_lines,
            horizontal_lines,
        }
    }

    /// Sorted positions merged into lines; a gap above `line_gap` starts a new line.
    fn distinct_lines(&self, mut positions: Vec<u32>) -> Vec<u32> {
        positions.sort_unstable();
        let mut lines: Vec<u32> = Vec::new();
        let mut previous: Option<u32> = None;
        for position in positions {
            match previous {
                Some(p) if (position - p) as f64 <= self.config.line_gap => {}
                _ => lines.push(position),
            }
            previous = Some(position);
        }
        lines
    }

    pub fn rank_regions(
        &self,
        width: u32,
        height: u32,
        regions: &[BoundingBox],
    ) -> VisualHierarchy {
        if width == 0 || height == 0 || regions.is_empty() {
            return VisualHierarchy::default();
        }
        let (w, h) = (width as f64, height as f64);
        let total_area = w * h;

        let mut ranked: Vec<RankedRegion> = regions
            .iter()
            .map(|region| {
                let score = (region.area() as f64 / total_area) * 100.0
                    + (1.0 - region.y as f64 / h) * 50.0
                    + (1.0 - region.x as f64 / w) * 20.0
                    + region.confidence * 30.0;
                RankedRegion {
                    bounding_box: *region,
                    score,
                }
            })
            .collect();
        // Stable sort keeps seed order among equal scores.
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        let n = ranked.len();
        let cut = |share: f64| (((share * n as f64) - 1e-9).ceil().max(0.0) as usize).min(n);
        let primary_end = cut(self.config.primary_share);
        let secondary_end =
            cut(self.config.primary_share + self.config.secondary_share).max(primary_end);

        let tertiary = ranked.split_off(secondary_end);
        let secondary = ranked.split_off(primary_end);
        VisualHierarchy {
            primary: ranked,
            secondary,
            tertiary,
        }
    }

    pub fn measure_spacing(&self, edges: &[BoundingBox]) -> SpacingAnalysis {
        let max_distance = self.config.spacing_max_distance;
        let mut centers: Vec<(f64, f64)> = edges.iter().map(BoundingBox::center).collect();
        centers.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

        let mut distances = Vec::new();
        for (i, a) in centers.iter().enumerate() {
            for b in &centers[i + 1..] {
                if b.0 - a.0 >= max_distance {
                    break;
                }
                let distance = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
                if distance < max_distance {
                    distances.push(distance);
                }
            }
        }

        let mean_distance = geometry::mean(&distances);
        let std_dev = geometry::std_dev(&distances);
        let consistency = if mean_distance > 0.0 {
            (1.0 - std_dev / mean_distance).max(0.0)
        } else {
            0.0
        };
        SpacingAnalysis {
            pairs: distances.len(),
            mean_distance,
            std_dev,
            consistency,
        }
    }

    pub fn detect_alignment(&self, edges: &[BoundingBox]) -> AlignmentAnalysis {
        let group = |coordinate: fn(&BoundingBox) -> f64| {
            self.largest_group(edges.iter().map(coordinate).collect())
        };
        AlignmentAnalysis {
            left: group(|b| b.x as f64),
            center: group(|b| b.center().0),
            right: group(|b| b.right() as f64),
            top: group(|b| b.y as f64),
            middle: group(|b| b.center().1),
            bottom: group(|b| b.bottom() as f64),
        }
    }

    /// Sweeps sorted values into groups that stay within the tolerance of their
    /// first member, returning the largest.
    fn largest_group(&self, mut values: Vec<f64>) -> AlignmentGroup {
        values.sort_by(f64::total_cmp);
        let tolerance = self.config.alignment_tolerance;

        let mut best = AlignmentGroup::default();
        let mut start = 0;
        for end in 0..values.len() {
            while values[end] - values[start] > tolerance {
                start += 1;
            }
            let size = end - start + 1;
            if size > best.largest_group {
                best = AlignmentGroup {
                    present: size > 1,
                    largest_group: size,
                    position: values[start],
                };
            }
        }
        best
    }
}

/// Mean distance between consecutive sorted positions; 0 with fewer than two.
fn mean_delta(positions: &[u32]) -> f64 {
    let deltas: Vec<f64> = positions
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) as f64)
        .collect();
    geometry::mean(&deltas)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hline(x: u32, y: u32) -> BoundingBox {
        BoundingBox::new(x, y, 30, 2, 0.9)
    }

    fn vline(x: u32, y: u32) -> BoundingBox {
        BoundingBox::new(x, y, 2, 30, 0.9)
    }

    #[test]
    fn no_lines_means_a_single_track() {
        let grid = LayoutAnalyzer::default().detect_grid(800, 600, &[]);
        assert_eq!((grid.columns, grid.rows), (1, 1));
        assert!(!grid.is_detected());
        assert_eq!(grid.gutters, Gutters::default());
        assert_eq!(grid.column_gap, 0.0);
    }

    #[test]
    fn close_positions_merge_into_one_line() {
        let edges = [vline(100, 0), vline(110, 40), vline(300, 0), vline(500, 0), hline(0, 200)];
        let grid = LayoutAnalyzer::default().detect_grid(800, 600, &edges);
        assert_eq!(grid.vertical_lines, vec![100, 300, 500]);
        assert_eq!(grid.columns, 4);
        assert_eq!(grid.rows, 2);
        assert_eq!(grid.column_gap, 200.0);
        assert_eq!(grid.gutters.left, 100.0);
        assert_eq!(grid.gutters.right, 300.0);
        assert_eq!(grid.gutters.top, 200.0);
        assert_eq!(grid.gutters.bottom, 400.0);
    }

    #[test]
    fn square_segments_are_not_lines() {
        let edges = [BoundingBox::new(10, 10, 8, 8, 1.0), BoundingBox::new(10, 10, 9, 3, 1.0)];
        let grid = LayoutAnalyzer::default().detect_grid(100, 100, &edges);
        assert_eq!((grid.columns, grid.rows), (1, 1));
    }

    #[test]
    fn hierarchy_tiers_follow_shares() {
        let regions: Vec<BoundingBox> = (0..10)
            .map(|i| BoundingBox::new(i * 50, i * 30, 40, 20, 1.0))
            .collect();
        let hierarchy = LayoutAnalyzer::default().rank_regions(1000, 1000, &regions);
        assert_eq!(hierarchy.primary.len(), 2);
        assert_eq!(hierarchy.secondary.len(), 3);
        assert_eq!(hierarchy.tertiary.len(), 5);
        // Top-left region wins.
        assert_eq!(hierarchy.primary[0].bounding_box.x, 0);
        let all: Vec<f64> = hierarchy
            .primary
            .iter()
            .chain(&hierarchy.secondary)
            .chain(&hierarchy.tertiary)
            .map(|r| r.score)
            .collect();
        assert!(all.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn single_region_is_primary() {
        let whole = BoundingBox::new(0, 0, 100, 100, 1.0);
        let hierarchy = LayoutAnalyzer::default().rank_regions(100, 100, &[whole]);
        assert_eq!(hierarchy.primary.len(), 1);
        assert!(hierarchy.secondary.is_empty() && hierarchy.tertiary.is_empty());
        assert!((hierarchy.primary[0].score - 200.0).abs() < 1e-9);
    }

    #[test]
    fn evenly_spaced_segments_are_consistent() {
        let edges: Vec<BoundingBox> = (0..5)
            .map(|i| BoundingBox::new(i * 60, 0, 10, 10, 1.0))
            .collect();
        let spacing = LayoutAnalyzer::default().measure_spacing(&edges);
        assert_eq!(spacing.pairs, 4);
        assert_eq!(spacing.mean_distance, 60.0);
        assert_eq!(spacing.consistency, 1.0);
    }

    #[test]
    fn spacing_without_pairs_is_zero_not_nan() {
        let spacing =
            LayoutAnalyzer::default().measure_spacing(&[BoundingBox::new(0, 0, 5, 5, 1.0)]);
        assert_eq!(spacing, SpacingAnalysis::default());
    }

    #[test]
    fn alignment_groups_within_tolerance() {
        let edges = [
            BoundingBox::new(100, 10, 20, 20, 1.0),
            BoundingBox::new(103, 80, 20, 20, 1.0),
            BoundingBox::new(105, 150, 20, 20, 1.0),
            BoundingBox::new(300, 400, 20, 20, 1.0),
        ];
        let alignment = LayoutAnalyzer::default().detect_alignment(&edges);
        assert!(alignment.left.present);
        assert_eq!(alignment.left.largest_group, 3);
        assert_eq!(alignment.left.position, 100.0);
        assert!(!alignment.top.present);
        assert_eq!(alignment.vertical_group(), 3);
    }

    #[test]
    fn aligned_row_reads_as_flexbox() {
        let edges: Vec<BoundingBox> = (0..4)
            .map(|i| BoundingBox::new(i * 150, 40, 20, 20, 1.0))
            .collect();
        let layout = LayoutAnalyzer::default().analyze_segments(800, 200, &edges, &[]);
        assert_eq!(layout.layout_type, LayoutType::Flexbox);
    }

    #[test]
    fn three_by_three_lines_read_as_grid() {
        let edges = [
            vline(100, 0),
            vline(300, 0),
            hline(0, 100),
            hline(0, 300),
        ];
        let layout = LayoutAnalyzer::default().analyze_segments(600, 600, &edges, &[]);
        assert_eq!((layout.grid.columns, layout.grid.rows), (3, 3));
        assert_eq!(layout.layout_type, LayoutType::Grid);
    }
}
