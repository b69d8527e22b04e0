// THEORY:
// The `AccessibilityAnalyzer` audits classified components against a handful of
// WCAG-style checks. It works on estimates (sampled colours, font sizes derived
// from box heights), so every finding is a hint, never a verdict.
//
// Checks:
// 1.  **Text contrast**: each component's foreground against its background, using
//     the WCAG ratio `(Lmax + 0.05) / (Lmin + 0.05)`. Large text (font size above
//     `large_text_size`) needs 4.5 for AAA and 3 for AA; normal text needs 7 and
//     4.5. The page level is the weakest component's level.
// 2.  **Non-text contrast**: the 1-pixel ring just outside every interactive
//     component is averaged from the pixel buffer and compared with the
//     component's background. Controls need 3:1 against their surroundings.
// 3.  **Readability**: tiny fonts and estimated lines longer than
//     `max_line_characters` (width / (font size * glyph ratio)).
// 4.  **Focus order**: interactive components in row-major reading order. A step
//     that moves up by more than `max_backward_jump` pixels is a backward jump.
// 5.  **Semantic structure**: heading levels from font size, landmark coverage and
//     a warning when the page has no headings at all.

use crate::config::AccessibilityConfig;
use crate::core_modules::component::{Component, SemanticRole};
use crate::core_modules::geometry::{self, BoundingBox};
use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::pixel_buffer::PixelBuffer;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const AA_NORMAL: f64 = 4.5;
pub const AA_LARGE: f64 = 3.0;
pub const AAA_NORMAL: f64 = 7.0;
pub const AAA_LARGE: f64 = 4.5;

/// WCAG contrast ratio between two colours. Symmetric, in [1, 21].
pub fn contrast_ratio(a: &Pixel, b: &Pixel) -> f64 {
    let (la, lb) = (a.relative_luminance(), b.relative_luminance());
    (la.max(lb) + 0.05) / (la.min(lb) + 0.05)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComplianceLevel {
    #[serde(rename = "fail")]
    Fail,
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "AAA")]
    Aaa,
}

impl ComplianceLevel {
    pub fn for_ratio(ratio: f64, large_text: bool) -> Self {
        let (aaa, aa) = if large_text {
            (AAA_LARGE, AA_LARGE)
        } else {
            (AAA_NORMAL, AA_NORMAL)
        };
        if ratio >= aaa {
            ComplianceLevel::Aaa
        } else if ratio >= aa {
            ComplianceLevel::Aa
        } else {
            ComplianceLevel::Fail
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastCheck {
    pub region_id: usize,
    pub foreground: String,
    pub background: String,
    pub ratio: f64,
    pub large_text: bool,
    pub level: ComplianceLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastAnalysis {
    pub checks: Vec<ContrastCheck>,
    pub compliance: ComplianceLevel,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadabilityAnalysis {
    pub average_font_size: f64,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusOrder {
    /// Indices into the component list, in focus order.
    pub order: Vec<usize>,
    pub valid: bool,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heading {
    pub component: usize,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticStructure {
    pub headings: Vec<Heading>,
    pub landmarks: Vec<SemanticRole>,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityAnalysis {
    pub contrast: ContrastAnalysis,
    pub readability: ReadabilityAnalysis,
    pub focus_order: FocusOrder,
    pub semantic_structure: SemanticStructure,
    /// Interactive components that blend into their surroundings.
    pub boundary_issues: Vec<String>,
    /// Summary in [0, 1].
    pub score: f64,
}

/// Heading level from font size: 32px and up is h1, below 16px is h6.
pub fn heading_level(font_size: f64) -> u8 {
    match font_size {
        s if s >= 32.0 => 1,
        s if s >= 28.0 => 2,
        s if s >= 24.0 => 3,
        s if s >= 20.0 => 4,
        s if s >= 16.0 => 5,
        _ => 6,
    }
}

fn color_or(hex: &str, fallback: Pixel) -> Pixel {
    Pixel::from_hex(hex).unwrap_or(fallback)
}

#[derive(Debug, Clone, Default)]
pub struct AccessibilityAnalyzer {
    config: AccessibilityConfig,
}

impl AccessibilityAnalyzer {
    pub fn new(config: AccessibilityConfig) -> Self {
        Self { config }
    }

    pub fn analyze_accessibility(
        &self,
        pixels: &PixelBuffer,
        components: &[Component],
    ) -> AccessibilityAnalysis {
        let contrast = self.check_contrast(components);
        let readability = self.check_readability(components);
        let focus_order = self.check_focus_order(components);
        let semantic_structure = self.check_semantics(components);
        let boundary_issues = self.check_boundaries(pixels, components);

        let passing = contrast
            .checks
            .iter()
            .filter(|c| c.level >= ComplianceLevel::Aa)
            .count();
        let readable = components
            .iter()
            .filter(|c| self.readability_issues(c).is_empty())
            .count();
        let share = |n: usize| {
            if components.is_empty() {
                1.0
            } else {
                n as f64 / components.len() as f64
            }
        };
        let score = geometry::clamp_unit(geometry::mean(&[
            share(passing),
            share(readable),
            if focus_order.valid { 1.0 } else { 0.0 },
            if semantic_structure.headings.is_empty() { 0.0 } else { 1.0 },
        ]));

        debug!(
            compliance = ?contrast.compliance,
            focus_valid = focus_order.valid,
            boundary_issues = boundary_issues.len(),
            score,
            "accessibility analysis complete"
        );

        AccessibilityAnalysis {
            contrast,
            readability,
            focus_order,
            semantic_structure,
            boundary_issues,
            score,
        }
    }

    pub fn check_contrast(&self, components: &[Component]) -> ContrastAnalysis {
        let mut checks = Vec::with_capacity(components.len());
        let mut issues = Vec::new();

        for (index, component) in components.iter().enumerate() {
            let colors = &component.properties.colors;
            let foreground = color_or(&colors.foreground, Pixel::BLACK);
            let background = color_or(&colors.background, Pixel::WHITE);
            let ratio = contrast_ratio(&foreground, &background);
            let large_text =
                component.properties.typography.font_size > self.config.large_text_size;
            let level = ComplianceLevel::for_ratio(ratio, large_text);

            if level == ComplianceLevel::Fail {
                let required = if large_text { AA_LARGE } else { AA_NORMAL };
                issues.push(format!(
                    "Component {index} ({}): contrast {ratio:.2}:1 is below {required}:1",
                    component.component_type
                ));
            }
            checks.push(ContrastCheck {
                region_id: component.region_id,
                foreground: colors.foreground.clone(),
                background: colors.background.clone(),
                ratio,
                large_text,
                level,
            });
        }

        // An empty page has nothing failing.
        let compliance = checks
            .iter()
            .map(|c| c.level)
            .min()
            .unwrap_or(ComplianceLevel::Aaa);
        ContrastAnalysis {
            checks,
            compliance,
            issues,
        }
    }

    fn readability_issues(&self, component: &Component) -> Vec<String> {
        let font_size = component.properties.typography.font_size;
        let mut issues = Vec::new();
        if font_size < self.config.min_font_size {
            issues.push(format!("font too small ({font_size:.1}px)"));
        }
        let glyph = font_size * self.config.glyph_width_ratio;
        if glyph > 0.0 {
            let characters = component.bounding_box.width as f64 / glyph;
            if characters > self.config.max_line_characters {
                issues.push(format!("line too long (~{characters:.0} characters)"));
            }
        }
        issues
    }

    pub fn check_readability(&self, components: &[Component]) -> ReadabilityAnalysis {
        let sizes: Vec<f64> = components
            .iter()
            .map(|c| c.properties.typography.font_size)
            .collect();
        let issues = components
            .iter()
            .enumerate()
            .flat_map(|(index, component)| {
                self.readability_issues(component)
                    .into_iter()
                    .map(move |issue| format!("Component {index}: {issue}"))
            })
            .collect();
        ReadabilityAnalysis {
            average_font_size: geometry::mean(&sizes),
            issues,
        }
    }

    pub fn check_focus_order(&self, components: &[Component]) -> FocusOrder {
        let interactive: Vec<usize> = components
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_interactive())
            .map(|(i, _)| i)
            .collect();
        let boxes: Vec<BoundingBox> = interactive
            .iter()
            .map(|&i| components[i].bounding_box)
            .collect();
        let order: Vec<usize> = geometry::reading_order(&boxes, self.config.row_tolerance)
            .into_iter()
            .map(|i| interactive[i])
            .collect();

        let mut issues = Vec::new();
        for pair in order.windows(2) {
            let (previous, current) = (
                &components[pair[0]].bounding_box,
                &components[pair[1]].bounding_box,
            );
            if previous.y > current.y && previous.y - current.y > self.config.max_backward_jump {
                issues.push(format!(
                    "Focus moves up {}px from component {} to component {}",
                    previous.y - current.y,
                    pair[0],
                    pair[1]
                ));
            }
        }
        FocusOrder {
            order,
            valid: issues.is_empty(),
            issues,
        }
    }

    pub fn check_semantics(&self, components: &[Component]) -> SemanticStructure {
        let headings: Vec<Heading> = components
            .iter()
            .enumerate()
            .filter(|(_, c)| c.semantic_role == SemanticRole::Heading)
            .map(|(component, c)| Heading {
                component,
                level: heading_level(c.properties.typography.font_size),
            })
            .collect();

        let mut landmarks: Vec<SemanticRole> = Vec::new();
        for component in components {
            let role = component.semantic_role;
            if role.is_landmark() && !landmarks.contains(&role) {
                landmarks.push(role);
            }
        }

        let mut issues = Vec::new();
        if headings.is_empty() {
            issues.push("no headings found".to_string());
        }
        SemanticStructure {
            headings,
            landmarks,
            issues,
        }
    }

    pub fn check_boundaries(&self, pixels: &PixelBuffer, components: &[Component]) -> Vec<String> {
        let mut issues = Vec::new();
        for (index, component) in components.iter().enumerate() {
            if !component.is_interactive() {
                continue;
            }
            let Some(surround) = Pixel::mean(&ring_around(&component.bounding_box, pixels)) else {
                continue;
            };
            let background = color_or(&component.properties.colors.background, Pixel::WHITE);
            let ratio = contrast_ratio(&background, &surround);
            if ratio < self.config.non_text_min_contrast {
                issues.push(format!(
                    "Component {index} ({}): boundary contrast {ratio:.2}:1 against {} is below {}:1",
                    component.component_type,
                    surround.hex(),
                    self.config.non_text_min_contrast
                ));
            }
        }
        issues
    }
}

/// Pixels on the 1-pixel ring just outside `bbox`, limited to the image.
fn ring_around(bbox: &BoundingBox, pixels: &PixelBuffer) -> Vec<Pixel> {
    let (left, top) = (bbox.x as i64 - 1, bbox.y as i64 - 1);
    let (right, bottom) = (bbox.right() as i64, bbox.bottom() as i64);
    let at = |x: i64, y: i64| {
        if x < 0 || y < 0 {
            return None;
        }
        pixels.get(x as u32, y as u32)
    };

    let mut ring = Vec::new();
    for x in left..=right {
        ring.extend(at(x, top));
        ring.extend(at(x, bottom));
    }
    for y in top + 1..bottom {
        ring.extend(at(left, y));
        ring.extend(at(right, y));
    }
    ring
}
