//! Tunable parameters for every analysis stage.
//!
//! All thresholds in the engine are empirically chosen. They are collected here,
//! grouped by stage, so a host can tune them from a JSON file instead of patching
//! code. `AnalysisConfig::default()` reproduces the stock heuristics.
//!
//! ```no_run
//! use ui_vision::AnalysisConfig;
//! use std::path::Path;
//!
//! let config = AnalysisConfig::from_json_file(Path::new("vision.json"))?;
//! # Ok::<(), ui_vision::VisionError>(())
//! ```

use crate::core_modules::component::ComponentType;
use crate::error::{Result, VisionError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    pub edges: EdgeConfig,
    pub segmentation: SegmentationConfig,
    pub layout: LayoutConfig,
    pub classifier: ClassifierConfig,
    pub patterns: PatternConfig,
    pub accessibility: AccessibilityConfig,
    pub responsiveness: ResponsivenessConfig,
}

/// Gradient thresholding and edge-point clustering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgeConfig {
    /// Minimum gradient magnitude (0-255 scale) for a pixel to count as an edge.
    pub gradient_threshold: f64,
    /// Maximum Euclidean distance from a cluster seed, in pixels.
    pub cluster_distance: f64,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            gradient_threshold: 50.0,
            cluster_distance: 5.0,
        }
    }
}

/// Flood-fill region segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SegmentationConfig {
    /// Distance between seed candidates on the sampling lattice.
    pub seed_stride: u32,
    /// Maximum per-channel difference from the seed colour (inclusive).
    pub color_tolerance: u8,
    /// Minimum width and height of a kept region.
    pub min_region_side: u32,
    /// Minimum number of filled pixels of a kept region.
    pub min_pixel_count: usize,
    /// Pixel count at which a region reaches full confidence.
    pub confidence_pixel_count: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            seed_stride: 10,
            color_tolerance: 50,
            min_region_side: 20,
            min_pixel_count: 100,
            confidence_pixel_count: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// A segment is a line when its long side exceeds this multiple of its short side.
    pub line_aspect_ratio: f64,
    /// Consecutive line positions further apart than this start a new grid line.
    pub line_gap: f64,
    /// Only segment pairs closer than this feed the spacing statistics.
    pub spacing_max_distance: f64,
    /// Coordinates within this many pixels share an alignment group.
    pub alignment_tolerance: f64,
    /// Share of ranked regions in the primary tier.
    pub primary_share: f64,
    /// Share of ranked regions in the secondary tier.
    pub secondary_share: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_aspect_ratio: 3.0,
            line_gap: 20.0,
            spacing_max_distance: 100.0,
            alignment_tolerance: 5.0,
            primary_share: 0.2,
            secondary_share: 0.3,
        }
    }
}

/// Open interval bounds; `None` leaves that side unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Bounds {
    pub above: Option<f64>,
    pub below: Option<f64>,
}

impl Bounds {
    pub const ANY: Bounds = Bounds {
        above: None,
        below: None,
    };

    pub const fn above(value: f64) -> Self {
        Bounds {
            above: Some(value),
            below: None,
        }
    }

    pub const fn below(value: f64) -> Self {
        Bounds {
            above: None,
            below: Some(value),
        }
    }

    pub const fn between(above: f64, below: f64) -> Self {
        Bounds {
            above: Some(above),
            below: Some(below),
        }
    }

    pub fn admits(&self, value: f64) -> bool {
        self.above.is_none_or(|low| value > low) && self.below.is_none_or(|high| value < high)
    }
}

/// One `(predicate, type)` pair of the classification chain.
///
/// Every bound must admit the measured value for the rule to match. Fractions are
/// relative to the image dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRule {
    pub component_type: ComponentType,
    #[serde(default)]
    pub aspect_ratio: Bounds,
    #[serde(default)]
    pub width: Bounds,
    #[serde(default)]
    pub height: Bounds,
    #[serde(default)]
    pub area: Bounds,
    #[serde(default)]
    pub width_fraction: Bounds,
    #[serde(default)]
    pub height_fraction: Bounds,
}

impl TypeRule {
    pub fn new(component_type: ComponentType) -> Self {
        Self {
            component_type,
            aspect_ratio: Bounds::ANY,
            width: Bounds::ANY,
            height: Bounds::ANY,
            area: Bounds::ANY,
            width_fraction: Bounds::ANY,
            height_fraction: Bounds::ANY,
        }
    }

    /// The stock chain, in priority order.
    pub fn default_chain() -> Vec<TypeRule> {
        vec![
            TypeRule {
                aspect_ratio: Bounds::above(2.0),
                height: Bounds::below(50.0),
                ..TypeRule::new(ComponentType::Button)
            },
            TypeRule {
                aspect_ratio: Bounds::above(3.0),
                height: Bounds::below(40.0),
                ..TypeRule::new(ComponentType::Input)
            },
            TypeRule {
                area: Bounds::above(10_000.0),
                aspect_ratio: Bounds::between(0.5, 2.0),
                ..TypeRule::new(ComponentType::Card)
            },
            TypeRule {
                width_fraction: Bounds::above(0.8),
                height: Bounds::below(100.0),
                ..TypeRule::new(ComponentType::Header)
            },
            TypeRule {
                height_fraction: Bounds::above(0.8),
                width: Bounds::below(200.0),
                ..TypeRule::new(ComponentType::Sidebar)
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassifierConfig {
    /// Evaluated in order; the first matching rule names the component.
    pub rules: Vec<TypeRule>,
    /// Stride of the colour sampling lattice inside a region.
    pub color_sample_step: u32,
    /// Regions covering at least this share of both image dimensions are page background.
    pub background_coverage: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rules: TypeRule::default_chain(),
            color_sample_step: 10,
            background_coverage: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PatternConfig {
    /// Components starting above this y belong to the top band.
    pub navigation_band: u32,
    pub navigation_max_width: u32,
    pub navigation_max_height: u32,
    /// The navigation pattern needs more than this many items.
    pub navigation_min_items: usize,
    /// Cards whose y differ by at most this share a row.
    pub row_tolerance: u32,
    pub min_cards: usize,
    pub min_card_rows: usize,
    /// Patterns at or below this confidence are dropped.
    pub min_confidence: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            navigation_band: 100,
            navigation_max_width: 150,
            navigation_max_height: 50,
            navigation_min_items: 2,
            row_tolerance: 20,
            min_cards: 4,
            min_card_rows: 2,
            min_confidence: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessibilityConfig {
    pub row_tolerance: u32,
    /// A focus step moving up by more than this many pixels is a backward jump.
    pub max_backward_jump: u32,
    pub min_font_size: f64,
    pub max_line_characters: f64,
    /// Average glyph width as a share of the font size.
    pub glyph_width_ratio: f64,
    /// Text larger than this counts as large text.
    pub large_text_size: f64,
    /// Minimum contrast between an interactive component and its surroundings.
    pub non_text_min_contrast: f64,
}

impl Default for AccessibilityConfig {
    fn default() -> Self {
        Self {
            row_tolerance: 20,
            max_backward_jump: 50,
            min_font_size: 12.0,
            max_line_characters: 80.0,
            glyph_width_ratio: 0.6,
            large_text_size: 18.0,
            non_text_min_contrast: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakpointRule {
    pub name: String,
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResponsivenessConfig {
    pub breakpoints: Vec<BreakpointRule>,
}

impl Default for ResponsivenessConfig {
    fn default() -> Self {
        let breakpoint = |name: &str, width| BreakpointRule {
            name: name.to_string(),
            width,
        };
        Self {
            breakpoints: vec![
                breakpoint("mobile", 320),
                breakpoint("tablet", 768),
                breakpoint("desktop", 1024),
                breakpoint("large", 1280),
                breakpoint("xlarge", 1920),
            ],
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| VisionError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects values that would make a stage meaningless.
    pub fn validate(&self) -> Result<()> {
        fn non_negative(parameter: &str, value: f64) -> Result<()> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(VisionError::invalid_config(parameter, "must be a finite, non-negative number"))
            }
        }

        non_negative("edges.gradientThreshold", self.edges.gradient_threshold)?;
        non_negative("edges.clusterDistance", self.edges.cluster_distance)?;
        if self.segmentation.seed_stride == 0 {
            return Err(VisionError::invalid_config(
                "segmentation.seedStride",
                "must be at least 1",
            ));
        }
        if !(self.segmentation.confidence_pixel_count > 0.0) {
            return Err(VisionError::invalid_config(
                "segmentation.confidencePixelCount",
                "must be positive",
            ));
        }
        non_negative("layout.lineAspectRatio", self.layout.line_aspect_ratio)?;
        non_negative("layout.lineGap", self.layout.line_gap)?;
        non_negative("layout.spacingMaxDistance", self.layout.spacing_max_distance)?;
        non_negative("layout.alignmentTolerance", self.layout.alignment_tolerance)?;
        let shares = self.layout.primary_share + self.layout.secondary_share;
        if self.layout.primary_share < 0.0
            || self.layout.secondary_share < 0.0
            || !(shares <= 1.0)
        {
            return Err(VisionError::invalid_config(
                "layout.primaryShare",
                "primary and secondary shares must be non-negative and sum to at most 1",
            ));
        }
        if self.classifier.color_sample_step == 0 {
            return Err(VisionError::invalid_config(
                "classifier.colorSampleStep",
                "must be at least 1",
            ));
        }
        non_negative("classifier.backgroundCoverage", self.classifier.background_coverage)?;
        non_negative("patterns.minConfidence", self.patterns.min_confidence)?;
        non_negative("accessibility.minFontSize", self.accessibility.min_font_size)?;
        non_negative("accessibility.largeTextSize", self.accessibility.large_text_size)?;
        if !(self.accessibility.glyph_width_ratio > 0.0) {
            return Err(VisionError::invalid_config(
                "accessibility.glyphWidthRatio",
                "must be positive",
            ));
        }
        if self
            .responsiveness
            .breakpoints
            .windows(2)
            .any(|pair| pair[0].width >= pair[1].width)
        {
            return Err(VisionError::invalid_config(
                "responsiveness.breakpoints",
                "must be sorted by strictly increasing width",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_survive_json() {
        let config = AnalysisConfig::default();
        config.validate().unwrap();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(AnalysisConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config =
            AnalysisConfig::from_json_str(r#"{ "edges": { "gradientThreshold": 80 } }"#).unwrap();
        assert_eq!(config.edges.gradient_threshold, 80.0);
        assert_eq!(config.edges.cluster_distance, 5.0);
        assert_eq!(config.classifier.rules.len(), 5);
    }

    #[test]
    fn zero_stride_is_rejected() {
        let err = AnalysisConfig::from_json_str(r#"{ "segmentation": { "seedStride": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, VisionError::InvalidConfig { .. }));
    }

    #[test]
    fn unsorted_breakpoints_are_rejected() {
        let mut config = AnalysisConfig::default();
        config.responsiveness.breakpoints.swap(0, 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn bounds_are_open_intervals() {
        let bounds = Bounds::between(0.5, 2.0);
        assert!(bounds.admits(1.33));
        assert!(!bounds.admits(2.0));
        assert!(!bounds.admits(0.5));
        assert!(Bounds::ANY.admits(f64::MAX));
    }

    #[test]
    fn default_chain_keeps_documented_priority() {
        let order: Vec<ComponentType> = TypeRule::default_chain()
            .into_iter()
            .map(|rule| rule.component_type)
            .collect();
        assert_eq!(
            order,
            vec![
                ComponentType::Button,
                ComponentType::Input,
                ComponentType::Card,
                ComponentType::Header,
                ComponentType::Sidebar,
            ]
        );
    }
}
