mod common;

use common::{card_grid, navigation_strip, scene, SLATE};
use ui_vision::config::EdgeConfig;
use ui_vision::core_modules::accessibility::{contrast_ratio, ComplianceLevel};
use ui_vision::core_modules::edge_detector::EdgeDetector;
use ui_vision::core_modules::layout_analyzer::{LayoutAnalyzer, LayoutType};
use ui_vision::core_modules::pattern_detector::{PatternType, CARD_GRID, HORIZONTAL_NAVIGATION};
use ui_vision::core_modules::region_segmenter::RegionSegmenter;
use ui_vision::{AnalysisConfig, ComponentType, Pixel, PixelBuffer, SemanticRole, UiAnalyzer};

#[test]
fn card_grid_is_recognised() {
    let pixels = card_grid();
    let result = UiAnalyzer::new().analyze(&pixels);

    assert_eq!(result.components.len(), 4);
    assert!(result.components.iter().all(|c| c.component_type == ComponentType::Card));
    assert!(result.components.iter().all(|c| c.semantic_role == SemanticRole::Article));
    let boxes: Vec<(u32, u32, u32, u32)> = result
        .components
        .iter()
        .map(|c| (c.bounding_box.x, c.bounding_box.y, c.bounding_box.width, c.bounding_box.height))
        .collect();
    assert_eq!(
        boxes,
        vec![(100, 100, 200, 150), (400, 100, 200, 150), (100, 350, 200, 150), (400, 350, 200, 150)]
    );
    // Region 0 is the canvas, rejected as background.
    let region_ids: Vec<usize> = result.components.iter().map(|c| c.region_id).collect();
    assert_eq!(region_ids, vec![1, 2, 3, 4]);

    assert_eq!(result.patterns.len(), 1);
    assert_eq!(result.patterns[0].name, CARD_GRID);
    assert_eq!(result.patterns[0].pattern_type, PatternType::Layout);
    assert_eq!(result.patterns[0].confidence, 0.9);

    // Top and bottom card edges give four horizontal grid lines.
    assert_eq!(result.layout.grid.horizontal_lines, vec![99, 249, 349, 499]);
    assert_eq!(result.layout.grid.rows, 5);
    assert!(result.layout.grid.is_detected());
    assert!((result.confidence - 0.8).abs() < 1e-9);

    assert_eq!(result.accessibility.contrast.compliance, ComplianceLevel::Aaa);
    assert!(result.accessibility.boundary_issues.is_empty());
    assert_eq!(result.structure.reading_order, vec![0, 1, 2, 3]);
}

#[test]
fn wider_edge_clusters_reveal_the_column_lines() {
    let mut config = AnalysisConfig::default();
    config.edges.cluster_distance = 6.0;
    let result = UiAnalyzer::with_config(config).unwrap().analyze(&card_grid());

    assert_eq!(result.layout.grid.vertical_lines, vec![99, 299, 399, 599]);
    assert_eq!((result.layout.grid.columns, result.layout.grid.rows), (5, 5));
    assert_eq!(result.layout.layout_type, LayoutType::Grid);
    assert_eq!(result.layout.grid.gutters.left, 99.0);
    assert_eq!(result.layout.grid.gutters.right, 601.0);
}

#[test]
fn navigation_strip_is_recognised() {
    let result = UiAnalyzer::new().analyze(&navigation_strip());

    assert_eq!(result.components.len(), 5);
    assert!(result.components.iter().all(|c| c.component_type == ComponentType::Button));
    assert!(result.components.iter().all(|c| c.properties.colors.background == "#3b82f6"));

    let navigation: Vec<_> = result
        .patterns
        .iter()
        .filter(|p| p.name == HORIZONTAL_NAVIGATION)
        .collect();
    assert_eq!(navigation.len(), 1);
    assert_eq!(navigation[0].confidence, 0.8);
    assert_eq!(navigation[0].elements.len(), 5);

    // Blue against the default black foreground is about 5.7:1.
    assert_eq!(result.accessibility.contrast.compliance, ComplianceLevel::Aa);
    assert!(result.accessibility.contrast.issues.is_empty());
    assert_eq!(result.accessibility.focus_order.order, vec![0, 1, 2, 3, 4]);
    assert!(result.accessibility.focus_order.valid);

    let nav_sections: Vec<_> = result
        .structure
        .sections
        .iter()
        .filter(|s| s.role == SemanticRole::Navigation)
        .collect();
    assert_eq!(nav_sections.len(), 1);
    assert_eq!(nav_sections[0].components, vec![0, 1, 2, 3, 4]);

    assert_eq!(result.responsiveness.breakpoints.len(), 2);
    assert_eq!(result.responsiveness.adaptive_components.len(), 5);
    assert!((result.confidence - 0.8).abs() < 1e-9);
}

#[test]
fn uniform_image_has_no_edges_and_one_region() {
    let pixels = PixelBuffer::filled(200, 150, SLATE);
    assert!(EdgeDetector::default().detect_edges(&pixels).is_empty());
    let regions = RegionSegmenter::default().segment_regions(&pixels);
    assert_eq!(regions.len(), 1);
    assert_eq!((regions[0].width, regions[0].height), (200, 150));

    let degenerate = PixelBuffer::filled(1, 1, SLATE);
    assert!(RegionSegmenter::default().segment_regions(&degenerate).is_empty());
    let result = UiAnalyzer::new().analyze(&degenerate);
    assert!(result.components.is_empty());
    assert!((result.confidence - 0.3).abs() < 1e-9);
}

#[test]
fn black_on_white_contrast_is_maximal() {
    let ratio = contrast_ratio(&Pixel::BLACK, &Pixel::WHITE);
    assert!((ratio - 21.0).abs() < 1e-9);
    assert_eq!(ComplianceLevel::for_ratio(ratio, false), ComplianceLevel::Aaa);
    assert_eq!(ComplianceLevel::for_ratio(ratio, true), ComplianceLevel::Aaa);
}

#[test]
fn header_band_and_sidebar_are_landmarks() {
    // Header band, grey sidebar, and a wide white main area that matches no rule.
    let pixels = PixelBuffer::from_fn(1400, 600, |x, y| {
        if y < 80 {
            Pixel::rgb(17, 24, 39)
        } else if x < 150 {
            Pixel::rgb(156, 163, 175)
        } else {
            Pixel::WHITE
        }
    });
    let result = UiAnalyzer::new().analyze(&pixels);
    let types: Vec<ComponentType> = result.components.iter().map(|c| c.component_type).collect();
    assert_eq!(types, vec![ComponentType::Header, ComponentType::Sidebar]);
    assert_eq!(
        result.accessibility.semantic_structure.landmarks,
        vec![SemanticRole::Header, SemanticRole::Aside]
    );
    assert_eq!(result.structure.sections.len(), 2);
    assert!(result.patterns.is_empty());
}

#[test]
fn layout_can_run_on_its_own() {
    let pixels = scene(600, 400, Pixel::WHITE, SLATE, &[(0, 100, 600, 40), (0, 260, 600, 40)]);
    let layout = LayoutAnalyzer::default().analyze_layout(&pixels);
    assert_eq!(layout.grid.horizontal_lines, vec![99, 139, 259, 299]);
    assert_eq!(layout.grid.rows, 5);
    assert!(!layout.hierarchy.primary.is_empty());
    assert_eq!(layout.grid.gutters.top, 99.0);

    let tighter = LayoutAnalyzer::new(
        Default::default(),
        EdgeDetector::new(EdgeConfig {
            gradient_threshold: 300.0,
            ..EdgeConfig::default()
        }),
        RegionSegmenter::default(),
    );
    assert_eq!(tighter.analyze_layout(&pixels).grid.rows, 1);
}
