// THEORY:
// The `pipeline` module is the top-level API of the engine. `UiAnalyzer` wires
// every stage together and turns one decoded image into one `AnalysisResult`.
//
// Stage order (each stage fully consumes the previous one's output):
//   pixels -> {edges, regions} -> layout (edges + regions)
//          -> components (regions) -> patterns (components)
//          -> structure, accessibility, responsiveness -> overall confidence
//
// The stages are synchronous and share nothing between runs: all scratch state
// (the segmentation visited map, the edge spatial hash) is created and dropped
// inside a single `analyze` call. Decoding is the one suspending boundary:
// `analyze_image_file` decodes on a blocking thread and only then runs the
// stages. Decoding failures are the only errors an analysis can produce; "no
// grid" or "no components" are ordinary, low-confidence results.

use crate::config::AnalysisConfig;
use crate::core_modules::accessibility::{AccessibilityAnalysis, AccessibilityAnalyzer};
use crate::core_modules::component::Component;
use crate::core_modules::component_classifier::ComponentClassifier;
use crate::core_modules::edge_detector::EdgeDetector;
use crate::core_modules::geometry;
use crate::core_modules::layout_analyzer::{LayoutAnalysis, LayoutAnalyzer};
use crate::core_modules::pattern_detector::{DesignPattern, PatternDetector};
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::region_segmenter::RegionSegmenter;
use crate::core_modules::responsiveness::{ResponsivenessAnalysis, ResponsivenessAnalyzer};
use crate::core_modules::structure_analyzer::{StructureAnalysis, StructureAnalyzer};
use crate::error::{Result, VisionError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

const GRID_FOUND: f64 = 0.8;
const GRID_MISSING: f64 = 0.3;
const COMPONENTS_FOUND: f64 = 0.9;
const COMPONENTS_MISSING: f64 = 0.2;
const PATTERNS_FOUND: f64 = 0.7;
const PATTERNS_MISSING: f64 = 0.4;

/// Everything the engine infers about one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub width: u32,
    pub height: u32,
    pub layout: LayoutAnalysis,
    pub components: Vec<Component>,
    pub patterns: Vec<DesignPattern>,
    pub structure: StructureAnalysis,
    pub accessibility: AccessibilityAnalysis,
    pub responsiveness: ResponsivenessAnalysis,
    /// Overall confidence in [0, 1].
    pub confidence: f64,
}

impl AnalysisResult {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Mean of the three presence signals: grid, components and patterns.
pub fn overall_confidence(grid_detected: bool, has_components: bool, has_patterns: bool) -> f64 {
    let signals = [
        if grid_detected { GRID_FOUND } else { GRID_MISSING },
        if has_components { COMPONENTS_FOUND } else { COMPONENTS_MISSING },
        if has_patterns { PATTERNS_FOUND } else { PATTERNS_MISSING },
    ];
    geometry::clamp_unit(geometry::mean(&signals))
}

/// The main, top-level entry point of the engine.
#[derive(Debug, Clone, Default)]
pub struct UiAnalyzer {
    config: AnalysisConfig,
    edges: EdgeDetector,
    segmenter: RegionSegmenter,
    layout: LayoutAnalyzer,
    classifier: ComponentClassifier,
    patterns: PatternDetector,
    structure: StructureAnalyzer,
    accessibility: AccessibilityAnalyzer,
    responsiveness: ResponsivenessAnalyzer,
}

impl UiAnalyzer {
    /// An analyzer with the stock heuristics.
    pub fn new() -> Self {
        Self::default()
    }

    /// An analyzer with tuned parameters. The configuration is validated first.
    pub fn with_config(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let edges = EdgeDetector::new(config.edges.clone());
        let segmenter = RegionSegmenter::new(config.segmentation.clone());
        Ok(Self {
            layout: LayoutAnalyzer::new(config.layout.clone(), edges.clone(), segmenter.clone()),
            classifier: ComponentClassifier::new(config.classifier.clone()),
            patterns: PatternDetector::new(config.patterns.clone()),
            structure: StructureAnalyzer::new(config.accessibility.row_tolerance),
            accessibility: AccessibilityAnalyzer::new(config.accessibility.clone()),
            responsiveness: ResponsivenessAnalyzer::new(config.responsiveness.clone()),
            edges,
            segmenter,
            config,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Runs every stage on an already decoded image.
    #[instrument(skip_all, fields(width = pixels.width(), height = pixels.height()))]
    pub fn analyze(&self, pixels: &PixelBuffer) -> AnalysisResult {
        let edges = self.edges.detect_edges(pixels);
        let regions = self.segmenter.segment_regions(pixels);
        let layout = self
            .layout
            .analyze_segments(pixels.width(), pixels.height(), &edges, &regions);

        let components = self.classifier.classify_regions(&regions, pixels);
        let patterns = self.patterns.detect_patterns(&components);
        let structure = self.structure.analyze_structure(&components, &patterns);
        let accessibility = self.accessibility.analyze_accessibility(pixels, &components);
        let responsiveness = self.responsiveness.analyze_responsiveness(pixels, &components);

        let confidence = overall_confidence(
            layout.grid.is_detected(),
            !components.is_empty(),
            !patterns.is_empty(),
        );
        info!(
            edges = edges.len(),
            regions = regions.len(),
            components = components.len(),
            patterns = patterns.len(),
            confidence,
            "analysis complete"
        );

        AnalysisResult {
            width: pixels.width(),
            height: pixels.height(),
            layout,
            components,
            patterns,
            structure,
            accessibility,
            responsiveness,
            confidence,
        }
    }

    /// Analyses a flat, row-major RGBA byte buffer (4 bytes per pixel).
    pub fn analyze_rgba(
        &self,
        width: u32,
        height: u32,
        data: Vec<u8>,
    ) -> Result<AnalysisResult> {
        let pixels = PixelBuffer::new(width, height, data)?;
        Ok(self.analyze(&pixels))
    }

    /// Decodes an encoded image (PNG, JPEG, ...) held in memory and analyses it.
    pub fn analyze_encoded(&self, bytes: &[u8]) -> Result<AnalysisResult> {
        let image = image::load_from_memory(bytes).map_err(VisionError::Decode)?;
        Ok(self.analyze(&PixelBuffer::from_image(&image)))
    }

    /// Decodes the image at `path` on a blocking thread, then analyses it.
    pub async fn analyze_image_file(&self, path: impl AsRef<Path>) -> Result<AnalysisResult> {
        let pixels = load_pixels(path.as_ref()).await?;
        Ok(self.analyze(&pixels))
    }
}

/// Decodes `path` into a pixel buffer without blocking the async runtime.
pub async fn load_pixels(path: &Path) -> Result<PixelBuffer> {
    let owned = path.to_path_buf();
    let pixels = tokio::task::spawn_blocking(move || {
        image::open(&owned)
            .map(|image| PixelBuffer::from_image(&image))
            .map_err(|source| VisionError::image_load(owned, source))
    })
    .await
    .map_err(|e| VisionError::Worker(format!("decode task failed: {e}")))??;
    debug!(
        path = %path.display(),
        width = pixels.width(),
        height = pixels.height(),
        "image decoded"
    );
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::pixel::pixel::Pixel;

    #[test]
    fn overall_confidence_is_the_mean_of_signals() {
        assert!((overall_confidence(true, true, true) - 0.8).abs() < 1e-9);
        assert!((overall_confidence(false, false, false) - 0.3).abs() < 1e-9);
        assert!((overall_confidence(true, true, false) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn uniform_image_yields_a_valid_empty_result() {
        let pixels = PixelBuffer::filled(300, 200, Pixel::rgb(240, 240, 240));
        let result = UiAnalyzer::new().analyze(&pixels);
        assert!(result.components.is_empty());
        assert!(result.patterns.is_empty());
        assert_eq!((result.layout.grid.columns, result.layout.grid.rows), (1, 1));
        assert!((result.confidence - 0.3).abs() < 1e-9);
        // Background region still feeds the hierarchy.
        assert_eq!(result.layout.hierarchy.primary.len(), 1);
    }

    #[test]
    fn rgba_length_is_checked() {
        let err = UiAnalyzer::new().analyze_rgba(10, 10, vec![0; 12]).unwrap_err();
        assert!(err.is_input_error());
        assert!(UiAnalyzer::new().analyze_rgba(10, 10, vec![255; 400]).is_ok());
    }

    #[test]
    fn keeps_the_validated_config() {
        let mut config = AnalysisConfig::default();
        config.segmentation.seed_stride = 7;
        let analyzer = UiAnalyzer::with_config(config.clone()).unwrap();
        assert_eq!(analyzer.config(), &config);
    }

    #[test]
    fn absurd_dimensions_come_back_as_an_error() {
        let err = UiAnalyzer::new()
            .analyze_rgba(u32::MAX, u32::MAX, vec![0; 16])
            .unwrap_err();
        assert!(matches!(err, VisionError::InvalidBuffer { .. }));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = UiAnalyzer::new().analyze_encoded(b"not an image").unwrap_err();
        assert!(matches!(err, VisionError::Decode(_)));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = AnalysisConfig::default();
        config.classifier.color_sample_step = 0;
        assert!(UiAnalyzer::with_config(config).is_err());
    }

    #[test]
    fn result_serializes_with_camel_case_fields() {
        let result = UiAnalyzer::new().analyze(&PixelBuffer::filled(40, 40, Pixel::WHITE));
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["layout"]["layoutType"].is_string());
        assert!(json["accessibility"]["focusOrder"]["valid"].as_bool().unwrap());
        assert_eq!(json["accessibility"]["contrast"]["compliance"], "AAA");
    }
}
