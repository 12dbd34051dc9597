use super::target::Target;
use crate::entity::Entity;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A scene: an ordered event sequence plus linkage to other scenes.
///
/// The presentation lists (`characters`, `backgrounds`, `ui_layer`,
/// `object_layer`) are references the executor never inspects; only
/// `event_sequence` and `next_node` drive playback.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowNode {
    pub name: String,
    pub is_start: bool,
    pub is_end: bool,
    pub next_node: Option<Entity>,
    pub event_sequence: Vec<Entity>,
    pub characters: Vec<Entity>,
    pub backgrounds: Vec<Entity>,
    pub ui_layer: Vec<Entity>,
    pub object_layer: Vec<Entity>,
}

impl FlowNode {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A dialogue event: one speaker, one or more lines, an optional branch.
///
/// `triggered` is set by the host on user action; the executor clears it when
/// it consumes the trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dialogue {
    pub lines: Vec<String>,
    pub speaker: Option<Entity>,
    pub advance_on_click: bool,
    pub triggered: bool,
    pub target: Target,
}

impl Default for Dialogue {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            speaker: None,
            advance_on_click: true,
            triggered: false,
            target: Target::None,
        }
    }
}

/// A single selectable option of a [`Choice`] event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoiceOption {
    pub text: String,
    pub target: Target,
}

impl Default for ChoiceOption {
    fn default() -> Self {
        Self {
            text: String::new(),
            target: Target::None,
        }
    }
}

/// The literal separator of the legacy `"<label> -> <target>"` encoding.
pub const CHOICE_SEPARATOR: &str = " -> ";

impl ChoiceOption {
    pub fn new(text: impl Into<String>, target: Target) -> Self {
        Self {
            text: text.into(),
            target,
        }
    }

    /// Splits the legacy combined encoding on the first `" -> "` occurrence.
    /// A string without the separator is a plain label with no target.
    pub fn from_encoded(raw: &str) -> Self {
        match raw.split_once(CHOICE_SEPARATOR) {
            Some((label, target)) => Self {
                text: label.to_string(),
                target: Target::parse(target),
            },
            None => Self {
                text: raw.to_string(),
                target: Target::None,
            },
        }
    }

    pub fn encode(&self) -> String {
        format!("{}{}{}", self.text, CHOICE_SEPARATOR, self.target.encode())
    }
}

/// A multi-option branching event. Never auto-completes: the host picks an
/// option through [`FlowExecutor::choose`](crate::flow::FlowExecutor::choose).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Choice {
    pub options: Vec<ChoiceOption>,
}

/// A dice-check event. The executor never rolls; the host reports the outcome
/// through [`FlowExecutor::apply_dice_outcome`](crate::flow::FlowExecutor::apply_dice_outcome).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiceRoll {
    pub sides: i32,
    pub threshold: i32,
    pub on_success: Target,
    pub on_failure: Target,
}

impl Default for DiceRoll {
    fn default() -> Self {
        Self {
            sides: 6,
            threshold: 4,
            on_success: Target::None,
            on_failure: Target::None,
        }
    }
}

/// The root of scene ordering and the default playback entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectMeta {
    pub project_name: String,
    pub author: String,
    pub version: String,
    pub is_active: bool,
    pub start_node: Entity,
    pub scene_nodes: Vec<Entity>,
}

impl Default for ProjectMeta {
    fn default() -> Self {
        Self {
            project_name: String::new(),
            author: String::new(),
            version: "0.1.0".to_string(),
            is_active: true,
            start_node: Entity::INVALID,
            scene_nodes: Vec::new(),
        }
    }
}

/// An opaque presentation component round-tripped through a registry slot.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomComponent {
    pub slot: u16,
    pub key: String,
    pub data: JsonValue,
}
