// THEORY:
// The `ComponentClassifier` turns a bare region into a named UI element. It is a
// rule engine, not a model: geometry picks the type, the behaviour table picks the
// role and interactions, and a fixed recipe estimates the visual properties.
//
// Steps for one region:
// 1.  **Background rejection**: a region covering (nearly) the whole image in both
//     dimensions is the page canvas, not an element.
// 2.  **Type chain**: the configured `TypeRule`s are tried in order and the first
//     whose bounds all admit the region's measurements wins. No match means
//     `Unknown`, and unknown regions are rejected.
// 3.  **Properties**: colours are sampled on a strided lattice inside the region
//     and ranked by frequency; the top four fill background, foreground, border
//     and accent, positionally. Typography, spacing, borders and effects are
//     estimates derived from the box size alone (there is no OCR).

use crate::config::{ClassifierConfig, TypeRule};
use crate::core_modules::component::{
    BorderStyle, Borders, ColorPalette, Component, ComponentProperties, ComponentType, Effects,
    SizeProperties, SizeScale, Sides, Spacing, Typography,
};
use crate::core_modules::geometry::BoundingBox;
use crate::core_modules::pixel_buffer::PixelBuffer;
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_BACKGROUND: &str = "#ffffff";
pub const DEFAULT_FOREGROUND: &str = "#000000";
pub const DEFAULT_BORDER: &str = "#cccccc";
pub const DEFAULT_ACCENT: &str = "#3b82f6";

const PLACEHOLDER_SHADOW: &str = "0 1px 3px rgba(0, 0, 0, 0.1)";

#[derive(Debug, Clone, Default)]
pub struct ComponentClassifier {
    config: ClassifierConfig,
}

impl ComponentClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Classifies `region` (the `region_id`-th region of the segmentation).
    /// Returns `None` for page background and unrecognised shapes.
    pub fn classify_region(
        &self,
        region_id: usize,
        region: &BoundingBox,
        pixels: &PixelBuffer,
    ) -> Option<Component> {
        let region = region.clamp_to(pixels.width(), pixels.height());
        if self.is_background(&region, pixels) {
            return None;
        }

        let component_type = self.infer_type(&region, pixels.width(), pixels.height());
        if component_type == ComponentType::Unknown {
            return None;
        }

        let properties = self.extract_properties(&region, pixels);
        Some(Component::new(region_id, component_type, region, properties))
    }

    /// Classifies every region, keeping recognised ones in region order.
    pub fn classify_regions(
        &self,
        regions: &[BoundingBox],
        pixels: &PixelBuffer,
    ) -> Vec<Component> {
        let components: Vec<Component> = regions
            .iter()
            .enumerate()
            .filter_map(|(region_id, region)| self.classify_region(region_id, region, pixels))
            .collect();
        debug!(
            regions = regions.len(),
            components = components.len(),
            "classification complete"
        );
        components
    }

    fn is_background(&self, region: &BoundingBox, pixels: &PixelBuffer) -> bool {
        let coverage = self.config.background_coverage;
        region.width as f64 >= coverage * pixels.width() as f64
            && region.height as f64 >= coverage * pixels.height() as f64
    }

    /// First matching rule of the chain, or `Unknown`.
    pub fn infer_type(
        &self,
        region: &BoundingBox,
        image_width: u32,
        image_height: u32,
    ) -> ComponentType {
        self.config
            .rules
            .iter()
            .find(|rule| rule_matches(rule, region, image_width, image_height))
            .map_or(ComponentType::Unknown, |rule| rule.component_type)
    }

    pub fn extract_properties(
        &self,
        region: &BoundingBox,
        pixels: &PixelBuffer,
    ) -> ComponentProperties {
        let (width, height) = (region.width as f64, region.height as f64);
        let padding = (width.min(height) * 0.1).max(4.0);

        ComponentProperties {
            size: SizeProperties {
                width: region.width,
                height: region.height,
                scale: SizeScale::from_area(region.area()),
            },
            colors: self.dominant_colors(region, pixels),
            typography: Typography {
                font_size: (height / 3.0).clamp(12.0, 24.0),
                font_weight: 400,
                line_height: height,
            },
            spacing: Spacing {
                padding: Sides::uniform(padding),
                margin: Sides::uniform(4.0),
            },
            borders: Borders {
                width: 1,
                style: BorderStyle::Solid,
                color: DEFAULT_BORDER.to_string(),
                radius: if region.height < 40 { 4 } else { 8 },
            },
            effects: Effects {
                shadow: PLACEHOLDER_SHADOW.to_string(),
                opacity: 1.0,
            },
        }
    }

    /// The four most frequent sampled colours, ties broken by first appearance.
    pub fn dominant_colors(&self, region: &BoundingBox, pixels: &PixelBuffer) -> ColorPalette {
        // hex -> (count, first seen)
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        for (index, pixel) in pixels.samples(region, self.config.color_sample_step).enumerate() {
            counts.entry(pixel.hex()).or_insert((0, index)).0 += 1;
        }

        let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.0.cmp(&a.1.0).then(a.1.1.cmp(&b.1.1)));
        let mut ranked = ranked.into_iter().map(|(hex, _)| hex);

        let mut slot = |fallback: &str| ranked.next().unwrap_or_else(|| fallback.to_string());
        ColorPalette {
            background: slot(DEFAULT_BACKGROUND),
            foreground: slot(DEFAULT_FOREGROUND),
            border: slot(DEFAULT_BORDER),
            accent: slot(DEFAULT_ACCENT),
        }
    }
}

fn rule_matches(
    rule: &TypeRule,
    region: &BoundingBox,
    image_width: u32,
    image_height: u32,
) -> bool {
    let (width, height) = (region.width as f64, region.height as f64);
    let fraction = |value: f64, total: u32| {
        if total == 0 { 0.0 } else { value / total as f64 }
    };
    rule.aspect_ratio.admits(region.aspect_ratio())
        && rule.width.admits(width)
        && rule.height.admits(height)
        && rule.area.admits(region.area() as f64)
        && rule.width_fraction.admits(fraction(width, image_width))
        && rule.height_fraction.admits(fraction(height, image_height))
}
