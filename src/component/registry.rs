use super::{Choice, ChoiceOption, Component, ComponentType, CustomComponent};
use ahash::AHashMap;
use serde_json::Value as JsonValue;
use tracing::warn;

/// A loader turning a JSON payload into a component instance.
///
/// Returns `None` on malformed payloads; the store treats that as a
/// recoverable per-component failure, not a fatal one.
pub type DeserializeFn = Box<dyn Fn(&JsonValue) -> Option<Component> + Send + Sync>;

struct RegistryEntry {
    key: String,
    deserialize: DeserializeFn,
}

/// Maps component types to stable string keys and JSON loaders.
///
/// Registries are explicit instances owned by the store — there is no global
/// registry. The built-in kinds are installed by [`ComponentRegistry::with_builtins`];
/// re-registering a type overwrites its entry (last registration wins).
/// `Custom` slots extend the component set with presentation data the
/// executor never inspects.
pub struct ComponentRegistry {
    entries: AHashMap<ComponentType, RegistryEntry>,
    by_key: AHashMap<String, ComponentType>,
    next_custom_slot: u16,
}

impl ComponentRegistry {
    /// An empty registry. Serialization will skip every component until
    /// deserializers are registered.
    pub fn new() -> Self {
        Self {
            entries: AHashMap::new(),
            by_key: AHashMap::new(),
            next_custom_slot: 0,
        }
    }

    /// A registry with the five built-in kinds installed.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(
            ComponentType::FlowNode,
            "flowNode",
            Box::new(|json| {
                serde_json::from_value(json.clone())
                    .ok()
                    .map(Component::FlowNode)
            }),
        );
        registry.register(
            ComponentType::Dialogue,
            "dialogue",
            Box::new(|json| {
                serde_json::from_value(json.clone())
                    .ok()
                    .map(Component::Dialogue)
            }),
        );
        registry.register(ComponentType::Choice, "choice", Box::new(deserialize_choice));
        registry.register(
            ComponentType::DiceRoll,
            "diceRoll",
            Box::new(|json| {
                serde_json::from_value(json.clone())
                    .ok()
                    .map(Component::DiceRoll)
            }),
        );
        registry.register(
            ComponentType::ProjectMeta,
            "projectMeta",
            Box::new(|json| {
                serde_json::from_value(json.clone())
                    .ok()
                    .map(Component::ProjectMeta)
            }),
        );
        registry
    }

    /// Associates `key` and `deserialize` with `component_type`.
    /// Overwrites any previous registration for the same type.
    pub fn register(
        &mut self,
        component_type: ComponentType,
        key: &str,
        deserialize: DeserializeFn,
    ) {
        if let Some(previous) = self.entries.get(&component_type) {
            self.by_key.remove(&previous.key);
        }
        self.by_key.insert(key.to_string(), component_type);
        self.entries.insert(
            component_type,
            RegistryEntry {
                key: key.to_string(),
                deserialize,
            },
        );
    }

    /// Claims the next `Custom` slot for `key` with an opaque passthrough
    /// loader, so presentation components round-trip without the core
    /// knowing their shape.
    pub fn register_custom(&mut self, key: &str) -> ComponentType {
        let slot = self.next_custom_slot;
        self.next_custom_slot += 1;
        let component_type = ComponentType::Custom(slot);
        let owned_key = key.to_string();
        self.register(
            component_type,
            key,
            Box::new(move |json| {
                Some(Component::Custom(CustomComponent {
                    slot,
                    key: owned_key.clone(),
                    data: json.clone(),
                }))
            }),
        );
        component_type
    }

    /// Runs the registered loader for `component_type`, if any.
    pub fn deserialize(
        &self,
        component_type: ComponentType,
        json: &JsonValue,
    ) -> Option<Component> {
        let entry = self.entries.get(&component_type)?;
        (entry.deserialize)(json)
    }

    pub fn key_for(&self, component_type: ComponentType) -> Option<&str> {
        self.entries.get(&component_type).map(|e| e.key.as_str())
    }

    pub fn type_for_key(&self, key: &str) -> Option<ComponentType> {
        self.by_key.get(key).copied()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Choice loader tolerant of the legacy encoding: each option may be either
/// a structured `{text, target}` object or a combined `"<label> -> <target>"`
/// string. Malformed options are skipped, not fatal.
fn deserialize_choice(json: &JsonValue) -> Option<Component> {
    let raw_options = match json.get("options") {
        Some(JsonValue::Array(items)) => items.as_slice(),
        Some(_) => return None,
        None => &[],
    };

    let mut options = Vec::with_capacity(raw_options.len());
    for item in raw_options {
        match item {
            JsonValue::String(encoded) => options.push(ChoiceOption::from_encoded(encoded)),
            JsonValue::Object(_) => match serde_json::from_value(item.clone()) {
                Ok(option) => options.push(option),
                Err(err) => warn!(%err, "skipping malformed choice option"),
            },
            other => warn!(?other, "skipping non-object choice option"),
        }
    }

    Some(Component::Choice(Choice { options }))
}
