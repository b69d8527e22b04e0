// THEORY:
// The `PatternDetector` looks at classified components as a group and names
// recurring arrangements. It only references component boxes; it never owns or
// changes the components themselves.
//
// Recognised patterns:
// - **Horizontal Navigation**: several small items in the top band of the page.
// - **Card Grid**: cards that line up in at least two rows, each row holding more
//   than one card.
//
// Content and interaction patterns are extension points: both families are part
// of the output model but produce nothing yet. Every emitted pattern must clear
// the configured minimum confidence.

use crate::config::PatternConfig;
use crate::core_modules::component::{Component, ComponentType};
use crate::core_modules::geometry::BoundingBox;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const HORIZONTAL_NAVIGATION: &str = "Horizontal Navigation";
pub const CARD_GRID: &str = "Card Grid";

const NAVIGATION_CONFIDENCE: f64 = 0.8;
const CARD_GRID_CONFIDENCE: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternType {
    Navigation,
    Layout,
    Content,
    Interaction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignPattern {
    pub name: String,
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
    pub elements: Vec<BoundingBox>,
    pub description: String,
    pub common_usage: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PatternDetector {
    config: PatternConfig,
}

impl PatternDetector {
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }

    pub fn detect_patterns(&self, components: &[Component]) -> Vec<DesignPattern> {
        let patterns: Vec<DesignPattern> = self
            .detect_navigation_patterns(components)
            .into_iter()
            .chain(self.detect_layout_patterns(components))
            .chain(self.detect_content_patterns(components))
            .chain(self.detect_interaction_patterns(components))
            .filter(|pattern| pattern.confidence > self.config.min_confidence)
            .collect();
        debug!(patterns = patterns.len(), "pattern detection complete");
        patterns
    }

    pub fn detect_navigation_patterns(&self, components: &[Component]) -> Vec<DesignPattern> {
        let items: Vec<BoundingBox> = components
            .iter()
            .map(|c| c.bounding_box)
            .filter(|b| {
                b.y < self.config.navigation_band
                    && b.width < self.config.navigation_max_width
                    && b.height < self.config.navigation_max_height
            })
            .collect();

        if items.len() <= self.config.navigation_min_items {
            return Vec::new();
        }
        vec![DesignPattern {
            name: HORIZONTAL_NAVIGATION.to_string(),
            pattern_type: PatternType::Navigation,
            elements: items,
            description: "Row of small navigation items along the top of the page".to_string(),
            common_usage: vec![
                "Primary site navigation".to_string(),
                "Top bars with section links".to_string(),
            ],
            confidence: NAVIGATION_CONFIDENCE,
        }]
    }

    pub fn detect_layout_patterns(&self, components: &[Component]) -> Vec<DesignPattern> {
        let mut cards: Vec<BoundingBox> = components
            .iter()
            .filter(|c| c.component_type == ComponentType::Card)
            .map(|c| c.bounding_box)
            .collect();
        if cards.len() < self.config.min_cards {
            return Vec::new();
        }
        cards.sort_by_key(|b| (b.y, b.x));

        let rows = group_rows(&cards, self.config.row_tolerance);
        if rows.len() < self.config.min_card_rows || rows.iter().any(|row| row.len() <= 1) {
            return Vec::new();
        }

        vec![DesignPattern {
            name: CARD_GRID.to_string(),
            pattern_type: PatternType::Layout,
            elements: cards,
            description: "Cards arranged in aligned rows and columns".to_string(),
            common_usage: vec![
                "Product listings".to_string(),
                "Dashboards".to_string(),
                "Content galleries".to_string(),
            ],
            confidence: CARD_GRID_CONFIDENCE,
        }]
    }

    pub fn detect_content_patterns(&self, _components: &[Component]) -> Vec<DesignPattern> {
        Vec::new()
    }

    pub fn detect_interaction_patterns(&self, _components: &[Component]) -> Vec<DesignPattern> {
        Vec::new()
    }
}

/// Splits boxes sorted by `y` into rows; a box joins the current row while its
/// `y` is within `tolerance` of the row's first box.
fn group_rows(sorted: &[BoundingBox], tolerance: u32) -> Vec<Vec<BoundingBox>> {
    let mut rows: Vec<Vec<BoundingBox>> = Vec::new();
    for bbox in sorted {
        match rows.last_mut() {
            Some(row) if bbox.y - row[0].y <= tolerance => row.push(*bbox),
            _ => rows.push(vec![*bbox]),
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::component_classifier::ComponentClassifier;
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::core_modules::pixel_buffer::PixelBuffer;

    fn component(component_type: ComponentType, bbox: BoundingBox) -> Component {
        let pixels = PixelBuffer::filled(1200, 800, Pixel::WHITE);
        let properties = ComponentClassifier::default().extract_properties(&bbox, &pixels);
        Component::new(0, component_type, bbox, properties)
    }

    fn card(x: u32, y: u32) -> Component {
        component(ComponentType::Card, BoundingBox::new(x, y, 200, 150, 1.0))
    }

    fn button(x: u32, y: u32) -> Component {
        component(ComponentType::Button, BoundingBox::new(x, y, 100, 30, 1.0))
    }

    #[test]
    fn two_by_two_cards_form_a_grid() {
        let cards = [card(100, 100), card(400, 105), card(100, 350), card(400, 350)];
        let patterns = PatternDetector::default().detect_patterns(&cards);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].name, CARD_GRID);
        assert_eq!(patterns[0].pattern_type, PatternType::Layout);
        assert_eq!(patterns[0].confidence, 0.9);
        assert_eq!(patterns[0].elements.len(), 4);
    }

    #[test]
    fn a_row_with_a_lone_card_breaks_the_grid() {
        let cards = [card(100, 100), card(400, 100), card(700, 100), card(100, 350)];
        assert!(PatternDetector::default().detect_layout_patterns(&cards).is_empty());
    }

    #[test]
    fn a_single_row_is_not_a_grid() {
        let cards: Vec<Component> = (0..4).map(|i| card(i * 250, 100)).collect();
        assert!(PatternDetector::default().detect_layout_patterns(&cards).is_empty());
    }

    #[test]
    fn three_small_items_in_the_top_band_are_navigation() {
        let items: Vec<Component> = (0..3).map(|i| button(20 + i * 120, 20)).collect();
        let patterns = PatternDetector::default().detect_patterns(&items);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].name, HORIZONTAL_NAVIGATION);
        assert_eq!(patterns[0].confidence, 0.8);
    }

    #[test]
    fn two_items_or_low_items_are_not_navigation() {
        let detector = PatternDetector::default();
        let pair: Vec<Component> = (0..2).map(|i| button(20 + i * 120, 20)).collect();
        assert!(detector.detect_navigation_patterns(&pair).is_empty());
        let low: Vec<Component> = (0..4).map(|i| button(20 + i * 120, 300)).collect();
        assert!(detector.detect_navigation_patterns(&low).is_empty());
    }

    #[test]
    fn extension_points_are_empty_and_threshold_filters() {
        let detector = PatternDetector::default();
        let items: Vec<Component> = (0..3).map(|i| button(20 + i * 120, 20)).collect();
        assert!(detector.detect_content_patterns(&items).is_empty());
        assert!(detector.detect_interaction_patterns(&items).is_empty());

        let strict = PatternDetector::new(PatternConfig {
            min_confidence: 0.85,
            ..PatternConfig::default()
        });
        assert!(strict.detect_patterns(&items).is_empty());
    }
}
