// THEORY:
// The `StructureAnalyzer` arranges classified components into the document shape
// a screen reader or code generator would need:
// - a containment forest (a component's parent is the smallest other component
//   whose box fully contains it; identical boxes nest under the lower index);
// - page sections from landmark components and detected navigation bars;
// - a row-major reading order.
//
// Siblings and roots are listed in reading order so the forest reads top-left to
// bottom-right at every level.

use crate::core_modules::component::{Component, SemanticRole};
use crate::core_modules::geometry::{self, BoundingBox};
use crate::core_modules::pattern_detector::{DesignPattern, PatternType};
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_ROW_TOLERANCE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub role: SemanticRole,
    pub bounding_box: BoundingBox,
    /// Indices of the components making up the section.
    pub components: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureNode {
    pub component: usize,
    pub children: Vec<StructureNode>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureAnalysis {
    pub sections: Vec<Section>,
    pub hierarchy: Vec<StructureNode>,
    pub max_depth: usize,
    pub reading_order: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct StructureAnalyzer {
    row_tolerance: u32,
}

impl Default for StructureAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_TOLERANCE)
    }
}

impl StructureAnalyzer {
    pub fn new(row_tolerance: u32) -> Self {
        Self { row_tolerance }
    }

    pub fn analyze_structure(
        &self,
        components: &[Component],
        patterns: &[DesignPattern],
    ) -> StructureAnalysis {
        let boxes: Vec<BoundingBox> = components.iter().map(|c| c.bounding_box).collect();
        let reading_order = geometry::reading_order(&boxes, self.row_tolerance);

        // Rank of each component in reading order, used to sort siblings.
        let mut rank = vec![0usize; boxes.len()];
        for (position, &index) in reading_order.iter().enumerate() {
            rank[index] = position;
        }

        let parents: Vec<Option<usize>> = (0..boxes.len()).map(|i| parent_of(i, &boxes)).collect();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); boxes.len()];
        let mut roots = Vec::new();
        for (index, parent) in parents.iter().enumerate() {
            match parent {
                Some(p) => children[*p].push(index),
                None => roots.push(index),
            }
        }
        for list in children.iter_mut().chain(std::iter::once(&mut roots)) {
            list.sort_by_key(|&i| rank[i]);
        }

        let hierarchy: Vec<StructureNode> = roots
            .iter()
            .map(|&root| build_node(root, &children))
            .collect();
        let max_depth = hierarchy.iter().map(depth).max().unwrap_or(0);
        let sections = self.sections(components, patterns);

        debug!(
            roots = hierarchy.len(),
            max_depth,
            sections = sections.len(),
            "structure analysis complete"
        );
        StructureAnalysis {
            sections,
            hierarchy,
            max_depth,
            reading_order,
        }
    }

    fn sections(&self, components: &[Component], patterns: &[DesignPattern]) -> Vec<Section> {
        let mut sections: Vec<Section> = components
            .iter()
            .enumerate()
            .filter(|(_, c)| c.semantic_role.is_landmark())
            .map(|(index, c)| Section {
                role: c.semantic_role,
                bounding_box: c.bounding_box,
                components: vec![index],
            })
            .collect();

        for pattern in patterns.iter().filter(|p| p.pattern_type == PatternType::Navigation) {
            let Some(bounding_box) = BoundingBox::union(&pattern.elements) else {
                continue;
            };
            let members = components
                .iter()
                .enumerate()
                .filter(|(_, c)| pattern.elements.contains(&c.bounding_box))
                .map(|(index, _)| index)
                .collect();
            sections.push(Section {
                role: SemanticRole::Navigation,
                bounding_box,
                components: members,
            });
        }
        sections
    }
}

/// The smallest box containing `index`'s box; identical boxes resolve to the
/// lower index so containment can never cycle.
fn parent_of(index: usize, boxes: &[BoundingBox]) -> Option<usize> {
    let child = &boxes[index];
    boxes
        .iter()
        .enumerate()
        .filter(|&(candidate, bbox)| {
            candidate != index
                && bbox.contains(child)
                && (bbox.area() > child.area() || candidate < index)
        })
        .min_by_key(|&(candidate, bbox)| (bbox.area(), candidate))
        .map(|(candidate, _)| candidate)
}

fn build_node(index: usize, children: &[Vec<usize>]) -> StructureNode {
    StructureNode {
        component: index,
        children: children[index].iter().map(|&child| build_node(child, children)).collect(),
    }
}

fn depth(node: &StructureNode) -> usize {
    1 + node.children.iter().map(depth).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::component::ComponentType;
    use crate::core_modules::component_classifier::ComponentClassifier;
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::core_modules::pixel_buffer::PixelBuffer;

    fn component(component_type: ComponentType, bbox: BoundingBox) -> Component {
        let pixels = PixelBuffer::filled(1200, 800, Pixel::WHITE);
        let properties = ComponentClassifier::default().extract_properties(&bbox, &pixels);
        Component::new(0, component_type, bbox, properties)
    }

    #[test]
    fn empty_page_has_empty_structure() {
        let structure = StructureAnalyzer::default().analyze_structure(&[], &[]);
        assert_eq!(structure, StructureAnalysis::default());
    }

    #[test]
    fn flat_components_are_roots_in_reading_order() {
        let components = [
            component(ComponentType::Card, BoundingBox::new(400, 100, 200, 150, 1.0)),
            component(ComponentType::Card, BoundingBox::new(100, 100, 200, 150, 1.0)),
        ];
        let structure = StructureAnalyzer::default().analyze_structure(&components, &[]);
        assert_eq!(structure.reading_order, vec![1, 0]);
        let roots: Vec<usize> = structure.hierarchy.iter().map(|n| n.component).collect();
        assert_eq!(roots, vec![1, 0]);
        assert_eq!(structure.max_depth, 1);
    }

    #[test]
    fn nested_boxes_form_a_tree() {
        let components = [
            component(ComponentType::Button, BoundingBox::new(120, 120, 80, 30, 1.0)),
            component(ComponentType::Card, BoundingBox::new(100, 100, 200, 150, 1.0)),
            component(ComponentType::Sidebar, BoundingBox::new(0, 0, 400, 800, 1.0)),
        ];
        let structure = StructureAnalyzer::default().analyze_structure(&components, &[]);
        assert_eq!(structure.hierarchy.len(), 1);
        assert_eq!(structure.hierarchy[0].component, 2);
        assert_eq!(structure.hierarchy[0].children[0].component, 1);
        assert_eq!(structure.hierarchy[0].children[0].children[0].component, 0);
        assert_eq!(structure.max_depth, 3);
    }

    #[test]
    fn identical_boxes_do_not_cycle() {
        let bbox = BoundingBox::new(10, 10, 100, 30, 1.0);
        let components = [
            component(ComponentType::Button, bbox),
            component(ComponentType::Button, bbox),
        ];
        let structure = StructureAnalyzer::default().analyze_structure(&components, &[]);
        assert_eq!(structure.hierarchy.len(), 1);
        assert_eq!(structure.max_depth, 2);
    }

    #[test]
    fn landmarks_and_navigation_become_sections() {
        let buttons: Vec<Component> = (0..3)
            .map(|i| {
                let bbox = BoundingBox::new(20 + i * 120, 20, 100, 30, 1.0);
                component(ComponentType::Button, bbox)
            })
            .collect();
        let header_box = BoundingBox::new(0, 0, 1200, 80, 1.0);
        let mut components = vec![component(ComponentType::Header, header_box)];
        components.extend(buttons);
        let navigation = DesignPattern {
            name: "Horizontal Navigation".to_string(),
            pattern_type: PatternType::Navigation,
            elements: components[1..].iter().map(|c| c.bounding_box).collect(),
            description: String::new(),
            common_usage: Vec::new(),
            confidence: 0.8,
        };
        let structure = StructureAnalyzer::default().analyze_structure(&components, &[navigation]);
        assert_eq!(structure.sections.len(), 2);
        assert_eq!(structure.sections[0].role, SemanticRole::Header);
        assert_eq!(structure.sections[1].role, SemanticRole::Navigation);
        assert_eq!(structure.sections[1].components, vec![1, 2, 3]);
        assert_eq!(
            (structure.sections[1].bounding_box.x, structure.sections[1].bounding_box.width),
            (20, 340)
        );
    }
}
