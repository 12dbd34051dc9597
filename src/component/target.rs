use crate::entity::Entity;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::fmt;

/// A branch destination referenced from an event.
///
/// Parsed once from the editor's string encoding at the JSON boundary, never
/// re-parsed at dispatch sites. The encoding is: empty string for `None`,
/// `"@Event:<decimal id>"` for an in-scene event jump, and any other
/// non-empty string for a scene switch by exact `FlowNode` name match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Target {
    /// No explicit destination; playback falls through to default advance.
    #[default]
    None,
    /// Jump to a specific event within the current scene's sequence.
    Event(Entity),
    /// Switch to the scene whose `FlowNode.name` equals this string.
    Scene(String),
}

impl Target {
    pub fn is_none(&self) -> bool {
        matches!(self, Target::None)
    }

    /// Decodes the editor's string form.
    ///
    /// A `"@Event:"` prefix with a non-numeric payload is treated as a scene
    /// name, matching the permissive editor encoding.
    pub fn parse(raw: &str) -> Target {
        if raw.is_empty() {
            return Target::None;
        }
        if let Some(id) = raw.strip_prefix("@Event:")
            && let Ok(id) = id.trim().parse::<u64>()
        {
            return Target::Event(Entity::from_raw(id));
        }
        Target::Scene(raw.to_string())
    }

    /// The inverse of [`Target::parse`].
    pub fn encode(&self) -> String {
        match self {
            Target::None => String::new(),
            Target::Event(e) => format!("@Event:{}", e.id()),
            Target::Scene(name) => name.clone(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::None => write!(f, "(default)"),
            Target::Event(e) => write!(f, "@Event:{}", e.id()),
            Target::Scene(name) => write!(f, "{}", name),
        }
    }
}

// Targets travel as their string encoding in every persisted format.

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Target::parse(&raw))
    }
}
