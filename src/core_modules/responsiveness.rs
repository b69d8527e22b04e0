// THEORY:
// A single screenshot cannot show how a page reflows, so the
// `ResponsivenessAnalyzer` reports what can be inferred from one frame and
// states the rest as fixed, optimistic defaults:
// - breakpoints: every configured breakpoint the captured width already reaches;
// - adaptive behaviour: the same illustrative width map for every component
//   (full width on mobile, halves on tablet, thirds on desktop);
// - scalability: text and images scale, layout flexibility 0.8.

use crate::config::ResponsivenessConfig;
use crate::core_modules::component::{Component, ComponentType};
use crate::core_modules::pixel_buffer::PixelBuffer;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    pub name: String,
    pub width: u32,
}

/// Width a component takes at each device class, as CSS-like percentages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidthBehavior {
    pub mobile: String,
    pub tablet: String,
    pub desktop: String,
}

impl Default for WidthBehavior {
    fn default() -> Self {
        Self {
            mobile: "100%".to_string(),
            tablet: "50%".to_string(),
            desktop: "33.333%".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveComponent {
    pub region_id: usize,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub adaptive: bool,
    pub width: WidthBehavior,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scalability {
    pub text_scaling: bool,
    pub image_scaling: bool,
    pub layout_flexibility: f64,
}

impl Default for Scalability {
    fn default() -> Self {
        Self {
            text_scaling: true,
            image_scaling: true,
            layout_flexibility: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsivenessAnalysis {
    pub breakpoints: Vec<Breakpoint>,
    pub adaptive_components: Vec<AdaptiveComponent>,
    pub scalability: Scalability,
}

#[derive(Debug, Clone, Default)]
pub struct ResponsivenessAnalyzer {
    config: ResponsivenessConfig,
}

impl ResponsivenessAnalyzer {
    pub fn new(config: ResponsivenessConfig) -> Self {
        Self { config }
    }

    pub fn analyze_responsiveness(
        &self,
        pixels: &PixelBuffer,
        components: &[Component],
    ) -> ResponsivenessAnalysis {
        let breakpoints: Vec<Breakpoint> = self
            .config
            .breakpoints
            .iter()
            .filter(|b| b.width <= pixels.width())
            .map(|b| Breakpoint {
                name: b.name.clone(),
                width: b.width,
            })
            .collect();

        let adaptive_components = components
            .iter()
            .map(|c| AdaptiveComponent {
                region_id: c.region_id,
                component_type: c.component_type,
                adaptive: true,
                width: WidthBehavior::default(),
            })
            .collect();

        debug!(
            breakpoints = breakpoints.len(),
            "responsiveness analysis complete"
        );
        ResponsivenessAnalysis {
            breakpoints,
            adaptive_components,
            scalability: Scalability::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::pixel::pixel::Pixel;

    fn widths(analysis: &ResponsivenessAnalysis) -> Vec<u32> {
        analysis.breakpoints.iter().map(|b| b.width).collect()
    }

    #[test]
    fn breakpoints_up_to_the_image_width() {
        let analyzer = ResponsivenessAnalyzer::default();
        let desktop =
            analyzer.analyze_responsiveness(&PixelBuffer::filled(1200, 10, Pixel::WHITE), &[]);
        assert_eq!(widths(&desktop), vec![320, 768, 1024]);

        let exact =
            analyzer.analyze_responsiveness(&PixelBuffer::filled(1920, 1, Pixel::WHITE), &[]);
        assert_eq!(widths(&exact), vec![320, 768, 1024, 1280, 1920]);

        let narrow =
            analyzer.analyze_responsiveness(&PixelBuffer::filled(300, 10, Pixel::WHITE), &[]);
        assert!(narrow.breakpoints.is_empty());
    }

    #[test]
    fn defaults_are_fixed_and_optimistic() {
        let pixels = PixelBuffer::filled(10, 10, Pixel::WHITE);
        let analysis = ResponsivenessAnalyzer::default().analyze_responsiveness(&pixels, &[]);
        assert_eq!(analysis.scalability.layout_flexibility, 0.8);
        assert!(analysis.scalability.text_scaling && analysis.scalability.image_scaling);
        assert_eq!(WidthBehavior::default().desktop, "33.333%");
        assert_eq!(analysis.breakpoints.first(), None);
    }
}
