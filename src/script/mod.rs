//! The runtime interchange format (`data.json`) and its binary snapshot.
//!
//! A [`Script`] is the flattened, editor-independent form of a project:
//! scenes in project order, each with its presentation references and event
//! list. It is what the export step writes and what a standalone player
//! consumes — the player instantiates the script back into a fresh
//! [`EntityStore`](crate::store::EntityStore) so the same
//! [`FlowExecutor`](crate::flow::FlowExecutor) drives it unchanged.

use crate::component::{ChoiceOption, Target};
use crate::error::ScriptError;
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use std::fs;
use std::path::Path;

mod convert;

/// A complete exported project.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Script {
    pub scenes: Vec<SceneExport>,
}

/// One scene of the export, with raw editor entity ids.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneExport {
    pub id: u64,
    pub name: String,
    pub is_start: bool,
    pub is_end: bool,
    pub next_node: Option<u64>,
    pub characters: Vec<u64>,
    pub backgrounds: Vec<u64>,
    pub ui_layer: Vec<u64>,
    pub object_layer: Vec<u64>,
    pub events: Vec<EventExport>,
}

/// One event of a scene. `Unknown` covers events whose entity carries no
/// recognized event component; players pass through them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventExport {
    Dialogue {
        id: u64,
        lines: Vec<String>,
        speaker: Option<u64>,
        advance_on_click: bool,
        target: Target,
    },
    Choice {
        id: u64,
        options: Vec<ChoiceOption>,
    },
    DiceRoll {
        id: u64,
        sides: i32,
        threshold: i32,
        on_success: Target,
        on_failure: Target,
    },
    Unknown {
        id: u64,
    },
}

impl EventExport {
    pub fn id(&self) -> u64 {
        match self {
            EventExport::Dialogue { id, .. }
            | EventExport::Choice { id, .. }
            | EventExport::DiceRoll { id, .. }
            | EventExport::Unknown { id } => *id,
        }
    }
}

// The canonical JSON shape uses camelCase keys and an inline "type" tag per
// event, so it is written and read by hand here; the serde derives above
// only serve the bincode snapshot.

impl Script {
    pub fn to_json(&self) -> JsonValue {
        json!({
            "scenes": self.scenes.iter().map(SceneExport::to_json).collect::<Vec<_>>(),
        })
    }

    pub fn from_json(json: &JsonValue) -> Result<Self, ScriptError> {
        let scenes = json
            .get("scenes")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| ScriptError::Malformed("missing scenes array".to_string()))?;
        Ok(Self {
            scenes: scenes
                .iter()
                .map(SceneExport::from_json)
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(&self.to_json()).unwrap_or_default()
    }

    /// Reads a script from a `data.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let json: JsonValue = serde_json::from_str(&content)
            .map_err(|err| ScriptError::Malformed(err.to_string()))?;
        Self::from_json(&json)
    }

    /// Writes the canonical `data.json` form.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ScriptError> {
        let path = path.as_ref();
        fs::write(path, self.to_json_string()).map_err(|source| ScriptError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Saves a compact binary snapshot of the script.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<(), ScriptError> {
        let path = path.as_ref();
        let bytes = bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|err| ScriptError::SnapshotEncode(err.to_string()))?;
        fs::write(path, bytes).map_err(|source| ScriptError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Loads a binary snapshot written by [`Script::save_snapshot`].
    pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ScriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_snapshot_bytes(&bytes)
    }

    pub fn from_snapshot_bytes(bytes: &[u8]) -> Result<Self, ScriptError> {
        bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            // bincode 2 returns a tuple (data, bytes_read)
            .map(|(script, _)| script)
            .map_err(|err| ScriptError::SnapshotDecode(err.to_string()))
    }
}

impl SceneExport {
    fn to_json(&self) -> JsonValue {
        json!({
            "id": self.id,
            "name": self.name,
            "isStart": self.is_start,
            "isEnd": self.is_end,
            "nextNode": self.next_node,
            "characters": self.characters,
            "backgrounds": self.backgrounds,
            "uiLayer": self.ui_layer,
            "objectLayer": self.object_layer,
            "events": self.events.iter().map(EventExport::to_json).collect::<Vec<_>>(),
        })
    }

    fn from_json(json: &JsonValue) -> Result<Self, ScriptError> {
        let object = json
            .as_object()
            .ok_or_else(|| ScriptError::Malformed("scene is not an object".to_string()))?;
        let events = match object.get("events").and_then(JsonValue::as_array) {
            Some(events) => events.iter().map(EventExport::from_json).collect(),
            None => Vec::new(),
        };
        Ok(Self {
            id: read_u64(object.get("id")),
            name: read_string(object.get("name")),
            is_start: read_bool(object.get("isStart")),
            is_end: read_bool(object.get("isEnd")),
            next_node: object.get("nextNode").and_then(JsonValue::as_u64),
            characters: read_id_list(object.get("characters")),
            backgrounds: read_id_list(object.get("backgrounds")),
            ui_layer: read_id_list(object.get("uiLayer")),
            object_layer: read_id_list(object.get("objectLayer")),
            events,
        })
    }
}

impl EventExport {
    fn to_json(&self) -> JsonValue {
        match self {
            EventExport::Dialogue {
                id,
                lines,
                speaker,
                advance_on_click,
                target,
            } => json!({
                "id": id,
                "type": "Dialogue",
                "lines": lines,
                "speaker": speaker,
                "advanceOnClick": advance_on_click,
                "target": target.encode(),
            }),
            EventExport::Choice { id, options } => json!({
                "id": id,
                "type": "Choice",
                "options": options
                    .iter()
                    .map(|o| json!({"text": o.text, "target": o.target.encode()}))
                    .collect::<Vec<_>>(),
            }),
            EventExport::DiceRoll {
                id,
                sides,
                threshold,
                on_success,
                on_failure,
            } => json!({
                "id": id,
                "type": "DiceRoll",
                "sides": sides,
                "threshold": threshold,
                "onSuccess": on_success.encode(),
                "onFailure": on_failure.encode(),
            }),
            EventExport::Unknown { id } => json!({"id": id, "type": "Unknown"}),
        }
    }

    /// Tolerant by construction: any unrecognized `type` string, and any
    /// missing field, degrades to `Unknown` or a default rather than failing
    /// the load.
    fn from_json(json: &JsonValue) -> Self {
        let id = read_u64(json.get("id"));
        match json.get("type").and_then(JsonValue::as_str) {
            Some("Dialogue") => EventExport::Dialogue {
                id,
                lines: read_string_list(json.get("lines")),
                speaker: json.get("speaker").and_then(JsonValue::as_u64),
                advance_on_click: json
                    .get("advanceOnClick")
                    .and_then(JsonValue::as_bool)
                    .unwrap_or(true),
                target: read_target(json.get("target")),
            },
            Some("Choice") => {
                let options = match json.get("options").and_then(JsonValue::as_array) {
                    Some(options) => options
                        .iter()
                        .map(|o| ChoiceOption {
                            text: read_string(o.get("text")),
                            target: read_target(o.get("target")),
                        })
                        .collect(),
                    None => Vec::new(),
                };
                EventExport::Choice { id, options }
            }
            Some("DiceRoll") => EventExport::DiceRoll {
                id,
                sides: json.get("sides").and_then(JsonValue::as_i64).unwrap_or(6) as i32,
                threshold: json.get("threshold").and_then(JsonValue::as_i64).unwrap_or(1) as i32,
                on_success: read_target(json.get("onSuccess")),
                on_failure: read_target(json.get("onFailure")),
            },
            _ => EventExport::Unknown { id },
        }
    }
}

fn read_u64(value: Option<&JsonValue>) -> u64 {
    value.and_then(JsonValue::as_u64).unwrap_or_default()
}

fn read_bool(value: Option<&JsonValue>) -> bool {
    value.and_then(JsonValue::as_bool).unwrap_or_default()
}

fn read_string(value: Option<&JsonValue>) -> String {
    value
        .and_then(JsonValue::as_str)
        .unwrap_or_default()
        .to_string()
}

fn read_target(value: Option<&JsonValue>) -> Target {
    Target::parse(value.and_then(JsonValue::as_str).unwrap_or_default())
}

fn read_id_list(value: Option<&JsonValue>) -> Vec<u64> {
    match value.and_then(JsonValue::as_array) {
        Some(items) => items.iter().filter_map(JsonValue::as_u64).collect(),
        None => Vec::new(),
    }
}

fn read_string_list(value: Option<&JsonValue>) -> Vec<String> {
    match value.and_then(JsonValue::as_array) {
        Some(items) => items
            .iter()
            .filter_map(JsonValue::as_str)
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}
