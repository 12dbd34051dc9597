pub mod kinds;
pub mod registry;
pub mod target;

pub use kinds::*;
pub use registry::*;
pub use target::*;

use serde_json::Value as JsonValue;

/// Identifies the kind of a component.
///
/// The five built-in kinds are closed variants the flow executor understands.
/// `Custom` slots are claimed through the [`ComponentRegistry`] and carry
/// presentation data the core never inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentType {
    FlowNode,
    Dialogue,
    Choice,
    DiceRoll,
    ProjectMeta,
    Custom(u16),
}

/// A single component instance attached to an entity.
///
/// Each entity holds at most one component per [`ComponentType`]. The closed
/// variants are the kinds the executor dispatches on; `Custom` round-trips
/// opaquely through serialization.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    FlowNode(FlowNode),
    Dialogue(Dialogue),
    Choice(Choice),
    DiceRoll(DiceRoll),
    ProjectMeta(ProjectMeta),
    Custom(CustomComponent),
}

impl Component {
    pub fn type_tag(&self) -> ComponentType {
        match self {
            Component::FlowNode(_) => ComponentType::FlowNode,
            Component::Dialogue(_) => ComponentType::Dialogue,
            Component::Choice(_) => ComponentType::Choice,
            Component::DiceRoll(_) => ComponentType::DiceRoll,
            Component::ProjectMeta(_) => ComponentType::ProjectMeta,
            Component::Custom(c) => ComponentType::Custom(c.slot),
        }
    }

    /// The component's payload as a JSON object, without the `"type"` key
    /// (the store adds it from the registry during serialization).
    pub fn to_json(&self) -> JsonValue {
        match self {
            Component::FlowNode(c) => serde_json::to_value(c).unwrap_or(JsonValue::Null),
            Component::Dialogue(c) => serde_json::to_value(c).unwrap_or(JsonValue::Null),
            Component::Choice(c) => serde_json::to_value(c).unwrap_or(JsonValue::Null),
            Component::DiceRoll(c) => serde_json::to_value(c).unwrap_or(JsonValue::Null),
            Component::ProjectMeta(c) => serde_json::to_value(c).unwrap_or(JsonValue::Null),
            Component::Custom(c) => c.data.clone(),
        }
    }

    /// A short human-readable label for diagnostics and editor lists.
    pub fn id_hint(&self) -> String {
        match self {
            Component::FlowNode(c) => c.name.clone(),
            Component::Dialogue(c) => c.lines.first().cloned().unwrap_or_default(),
            Component::Choice(c) => format!("{} options", c.options.len()),
            Component::DiceRoll(c) => format!("d{}", c.sides),
            Component::ProjectMeta(c) => c.project_name.clone(),
            Component::Custom(c) => c.key.clone(),
        }
    }
}

/// Defines borrowing accessors for each closed component variant.
macro_rules! component_accessors {
    ( $( ($variant:ident, $ty:ty, $as_ref:ident, $as_mut:ident) ),* $(,)? ) => {
        impl Component {
            $(
                pub fn $as_ref(&self) -> Option<&$ty> {
                    match self {
                        Component::$variant(c) => Some(c),
                        _ => None,
                    }
                }

                pub fn $as_mut(&mut self) -> Option<&mut $ty> {
                    match self {
                        Component::$variant(c) => Some(c),
                        _ => None,
                    }
                }
            )*
        }
    };
}

component_accessors! {
    (FlowNode, FlowNode, as_flow_node, as_flow_node_mut),
    (Dialogue, Dialogue, as_dialogue, as_dialogue_mut),
    (Choice, Choice, as_choice, as_choice_mut),
    (DiceRoll, DiceRoll, as_dice_roll, as_dice_roll_mut),
    (ProjectMeta, ProjectMeta, as_project_meta, as_project_meta_mut),
}
