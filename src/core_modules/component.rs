// THEORY:
// The `component` module holds the central entity of the engine: a classified UI
// element. A `Component` is created exactly once, by the classifier, from exactly
// one segmented region (`region_id`), and is never mutated afterwards.
//
// Every categorical field is a closed enum. The interaction set, the state set and
// the semantic role are not inferred independently: they are all read from one
// fixed table keyed by `ComponentType` (`ComponentType::behavior`). That table is
// an exhaustive `match`, so adding a component kind without deciding its role is a
// compile error, and `type`/`semanticRole` can never disagree.

use crate::core_modules::geometry::BoundingBox;
use serde::{Deserialize, Serialize};
use std::fmt;

use ComponentState as S;
use Interaction as I;

/// The kinds of UI element the engine can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentType {
    Button,
    Input,
    Textarea,
    Select,
    Checkbox,
    Radio,
    Toggle,
    Slider,
    Card,
    Header,
    Footer,
    Sidebar,
    Navigation,
    Main,
    Breadcrumb,
    Tabs,
    Menu,
    Dropdown,
    Modal,
    Tooltip,
    Popover,
    Alert,
    Toast,
    Badge,
    Avatar,
    Image,
    Icon,
    Heading,
    Text,
    Link,
    List,
    ListItem,
    Table,
    Form,
    Pagination,
    ProgressBar,
    Spinner,
    Divider,
    Container,
    Hero,
    #[default]
    Unknown,
}

/// ARIA-like accessibility roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SemanticRole {
    Button,
    Textbox,
    Combobox,
    Checkbox,
    Radio,
    Switch,
    Slider,
    Link,
    Heading,
    Header,
    Footer,
    Navigation,
    Main,
    Aside,
    Article,
    Dialog,
    Tooltip,
    Alert,
    Status,
    Img,
    List,
    Listitem,
    Table,
    Form,
    Tablist,
    Menu,
    Progressbar,
    Separator,
    #[default]
    Generic,
}

impl SemanticRole {
    /// Page landmarks: header, footer, navigation, main and aside.
    pub fn is_landmark(&self) -> bool {
        matches!(
            self,
            SemanticRole::Header
                | SemanticRole::Footer
                | SemanticRole::Navigation
                | SemanticRole::Main
                | SemanticRole::Aside
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interaction {
    Click,
    Hover,
    Focus,
    Drag,
    Scroll,
    Pinch,
    Swipe,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentState {
    Default,
    Hover,
    Active,
    Focus,
    Disabled,
    Loading,
    Error,
    Success,
}

/// The fixed behaviour of a component kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Behavior {
    pub interactions: &'static [Interaction],
    pub states: &'static [ComponentState],
    pub role: SemanticRole,
}

const STATIC: &[I] = &[I::None];
const DEFAULT_ONLY: &[S] = &[S::Default];
const CONTROL_STATES: &[S] = &[S::Default, S::Focus, S::Disabled, S::Error, S::Success];
const PRESSABLE_STATES: &[S] = &[S::Default, S::Hover, S::Active, S::Focus, S::Disabled];

const fn behave(
    interactions: &'static [Interaction],
    states: &'static [ComponentState],
    role: SemanticRole,
) -> Behavior {
    Behavior {
        interactions,
        states,
        role,
    }
}

impl ComponentType {
    pub fn behavior(&self) -> Behavior {
        match self {
            ComponentType::Button => behave(
                &[I::Click, I::Hover, I::Focus],
                &[S::Default, S::Hover, S::Active, S::Focus, S::Disabled, S::Loading],
                SemanticRole::Button,
            ),
            ComponentType::Input => {
                behave(&[I::Click, I::Focus], CONTROL_STATES, SemanticRole::Textbox)
            }
            ComponentType::Textarea => behave(
                &[I::Click, I::Focus, I::Scroll],
                CONTROL_STATES,
                SemanticRole::Textbox,
            ),
            ComponentType::Select | ComponentType::Dropdown => {
                behave(&[I::Click, I::Focus], CONTROL_STATES, SemanticRole::Combobox)
            }
            ComponentType::Checkbox => {
                behave(&[I::Click, I::Focus], PRESSABLE_STATES, SemanticRole::Checkbox)
            }
            ComponentType::Radio => {
                behave(&[I::Click, I::Focus], PRESSABLE_STATES, SemanticRole::Radio)
            }
            ComponentType::Toggle => {
                behave(&[I::Click, I::Focus], PRESSABLE_STATES, SemanticRole::Switch)
            }
            ComponentType::Slider => behave(
                &[I::Click, I::Drag, I::Focus],
                PRESSABLE_STATES,
                SemanticRole::Slider,
            ),
            ComponentType::Card => behave(
                &[I::Click, I::Hover],
                &[S::Default, S::Hover],
                SemanticRole::Article,
            ),
            ComponentType::Header => behave(STATIC, DEFAULT_ONLY, SemanticRole::Header),
            ComponentType::Footer => behave(STATIC, DEFAULT_ONLY, SemanticRole::Footer),
            ComponentType::Sidebar => behave(&[I::Scroll], DEFAULT_ONLY, SemanticRole::Aside),
            ComponentType::Navigation => behave(STATIC, DEFAULT_ONLY, SemanticRole::Navigation),
            ComponentType::Main => behave(&[I::Scroll], DEFAULT_ONLY, SemanticRole::Main),
            ComponentType::Breadcrumb | ComponentType::Pagination => behave(
                &[I::Click, I::Focus],
                &[S::Default, S::Hover, S::Focus],
                SemanticRole::Navigation,
            ),
            ComponentType::Tabs => {
                behave(&[I::Click, I::Focus], PRESSABLE_STATES, SemanticRole::Tablist)
            }
            ComponentType::Menu => behave(
                &[I::Click, I::Hover, I::Focus],
                &[S::Default, S::Hover, S::Focus],
                SemanticRole::Menu,
            ),
            ComponentType::Modal => {
                behave(&[I::Focus, I::Scroll], DEFAULT_ONLY, SemanticRole::Dialog)
            }
            ComponentType::Popover => behave(&[I::Click], DEFAULT_ONLY, SemanticRole::Dialog),
            ComponentType::Tooltip => behave(&[I::Hover], DEFAULT_ONLY, SemanticRole::Tooltip),
            ComponentType::Alert => behave(
                STATIC,
                &[S::Default, S::Error, S::Success],
                SemanticRole::Alert,
            ),
            ComponentType::Toast | ComponentType::Badge => {
                behave(STATIC, DEFAULT_ONLY, SemanticRole::Status)
            }
            ComponentType::Spinner => behave(STATIC, &[S::Loading], SemanticRole::Status),
            ComponentType::Avatar | ComponentType::Icon => {
                behave(STATIC, DEFAULT_ONLY, SemanticRole::Img)
            }
            ComponentType::Image => behave(&[I::Pinch, I::Swipe], DEFAULT_ONLY, SemanticRole::Img),
            ComponentType::Heading => behave(STATIC, DEFAULT_ONLY, SemanticRole::Heading),
            ComponentType::Link => behave(
                &[I::Click, I::Hover, I::Focus],
                &[S::Default, S::Hover, S::Active, S::Focus],
                SemanticRole::Link,
            ),
            ComponentType::List => behave(&[I::Scroll], DEFAULT_ONLY, SemanticRole::List),
            ComponentType::ListItem => behave(STATIC, DEFAULT_ONLY, SemanticRole::Listitem),
            ComponentType::Table => behave(&[I::Scroll], DEFAULT_ONLY, SemanticRole::Table),
            ComponentType::Form => behave(
                STATIC,
                &[S::Default, S::Error, S::Success],
                SemanticRole::Form,
            ),
            ComponentType::ProgressBar => behave(
                STATIC,
                &[S::Default, S::Loading, S::Success, S::Error],
                SemanticRole::Progressbar,
            ),
            ComponentType::Divider => behave(STATIC, DEFAULT_ONLY, SemanticRole::Separator),
            ComponentType::Text
            | ComponentType::Container
            | ComponentType::Hero
            | ComponentType::Unknown => behave(STATIC, DEFAULT_ONLY, SemanticRole::Generic),
        }
    }
}

impl fmt::Display for ComponentType {
    /// The kebab-case name used in serialized output, e.g. `progress-bar`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = serde_json::to_value(self).map_err(|_| fmt::Error)?;
        f.write_str(name.as_str().unwrap_or("unknown"))
    }
}

/// Size buckets by pixel area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeScale {
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
}

impl SizeScale {
    pub fn from_area(area: u64) -> Self {
        match area {
            a if a < 1_000 => SizeScale::Xs,
            a if a < 5_000 => SizeScale::Sm,
            a if a < 15_000 => SizeScale::Md,
            a if a < 50_000 => SizeScale::Lg,
            _ => SizeScale::Xl,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeProperties {
    pub width: u32,
    pub height: u32,
    pub scale: SizeScale,
}

/// Dominant colours as `#rrggbb`, assigned by sample frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorPalette {
    pub background: String,
    pub foreground: String,
    pub border: String,
    pub accent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    pub font_size: f64,
    pub font_weight: u16,
    pub line_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sides {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Sides {
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spacing {
    pub padding: Sides,
    pub margin: Sides,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BorderStyle {
    Solid,
    Dashed,
    Dotted,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Borders {
    pub width: u32,
    pub style: BorderStyle,
    pub color: String,
    pub radius: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effects {
    pub shadow: String,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentProperties {
    pub size: SizeProperties,
    pub colors: ColorPalette,
    pub typography: Typography,
    pub spacing: Spacing,
    pub borders: Borders,
    pub effects: Effects,
}

/// A classified UI element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Index of the source region in segmentation order.
    pub region_id: usize,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub bounding_box: BoundingBox,
    pub properties: ComponentProperties,
    pub states: Vec<ComponentState>,
    pub interactions: Vec<Interaction>,
    pub semantic_role: SemanticRole,
}

impl Component {
    /// Builds a component whose states, interactions and role come from the
    /// behaviour table of `component_type`.
    pub fn new(
        region_id: usize,
        component_type: ComponentType,
        bounding_box: BoundingBox,
        properties: ComponentProperties,
    ) -> Self {
        let behavior = component_type.behavior();
        Self {
            region_id,
            component_type,
            bounding_box,
            properties,
            states: behavior.states.to_vec(),
            interactions: behavior.interactions.to_vec(),
            semantic_role: behavior.role,
        }
    }

    /// Reachable by keyboard or pointer: the interaction set includes focus or click.
    pub fn is_interactive(&self) -> bool {
        self.interactions
            .iter()
            .any(|i| matches!(i, Interaction::Focus | Interaction::Click))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_table_matches_documented_examples() {
        let button = ComponentType::Button.behavior();
        assert_eq!(button.interactions, &[I::Click, I::Hover, I::Focus]);
        assert_eq!(button.role, SemanticRole::Button);

        let input = ComponentType::Input.behavior();
        assert_eq!(input.interactions, &[I::Click, I::Focus]);
        assert_eq!(input.role, SemanticRole::Textbox);

        let unknown = ComponentType::Unknown.behavior();
        assert_eq!(unknown.interactions, &[I::None]);
        assert_eq!(unknown.role, SemanticRole::Generic);
    }

    #[test]
    fn layout_types_map_to_landmarks() {
        assert!(ComponentType::Header.behavior().role.is_landmark());
        assert!(ComponentType::Sidebar.behavior().role.is_landmark());
        assert!(!ComponentType::Card.behavior().role.is_landmark());
    }

    #[test]
    fn size_scale_buckets() {
        assert_eq!(SizeScale::from_area(999), SizeScale::Xs);
        assert_eq!(SizeScale::from_area(1_000), SizeScale::Sm);
        assert_eq!(SizeScale::from_area(30_000), SizeScale::Lg);
        assert_eq!(SizeScale::from_area(50_000), SizeScale::Xl);
    }

    #[test]
    fn enums_serialize_as_kebab_case_strings() {
        assert_eq!(serde_json::to_string(&ComponentType::ProgressBar).unwrap(), "\"progress-bar\"");
        assert_eq!(serde_json::to_string(&SemanticRole::Textbox).unwrap(), "\"textbox\"");
        assert_eq!(serde_json::to_string(&SizeScale::Md).unwrap(), "\"md\"");
        assert_eq!(ComponentType::ListItem.to_string(), "list-item");
    }
}
