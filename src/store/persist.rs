use super::EntityStore;
use crate::entity::{Entity, EntityKind};
use crate::error::PersistError;
use serde_json::{Value as JsonValue, json};
use tracing::warn;

// Persisted entity format, recursive:
//
// { "_meta": {"name": str, "type": int, "parent": uint},
//   "components": [ { ...component fields..., "type": "<registry key>" }, ... ],
//   "children": [ <same shape>, ... ] }

impl EntityStore {
    /// Serializes `entity` and its whole subtree, depth-first.
    ///
    /// Components whose type has no registry key are skipped with a
    /// diagnostic; they never fail the serialization.
    pub fn serialize_entity(&self, entity: Entity) -> Result<JsonValue, PersistError> {
        let meta = self
            .meta
            .get(&entity)
            .ok_or(PersistError::EntityNotFound(entity))?;

        let mut components: Vec<(String, JsonValue)> = Vec::new();
        for component in self.components(entity) {
            let Some(key) = self.registry().key_for(component.type_tag()) else {
                warn!(
                    %entity,
                    hint = %component.id_hint(),
                    "component type has no registry key, skipping"
                );
                continue;
            };
            let mut payload = component.to_json();
            let Some(object) = payload.as_object_mut() else {
                warn!(%entity, key, "component payload is not an object, skipping");
                continue;
            };
            object.insert("type".to_string(), JsonValue::String(key.to_string()));
            components.push((key.to_string(), payload));
        }
        // Stable output regardless of component map order.
        components.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut children = Vec::with_capacity(meta.children.len());
        for &child in &meta.children {
            match self.serialize_entity(child) {
                Ok(serialized) => children.push(serialized),
                Err(err) => warn!(%entity, %child, %err, "skipping dangling child"),
            }
        }

        Ok(json!({
            "_meta": {
                "name": meta.name,
                "type": meta.kind.as_index(),
                "parent": meta.parent.id(),
            },
            "components": components.into_iter().map(|(_, c)| c).collect::<Vec<_>>(),
            "children": children,
        }))
    }

    /// Recreates an entity tree from its serialized form.
    ///
    /// Ids are freshly allocated; the `_meta.parent` field is informational
    /// only, reparenting comes from the recursion. Components with an unknown
    /// type key or a failing loader are dropped with a diagnostic. Entity
    /// references inside component payloads are restored verbatim and still
    /// point at the ids of the originating store.
    pub fn deserialize_entity(&mut self, json: &JsonValue) -> Result<Entity, PersistError> {
        let object = json
            .as_object()
            .ok_or_else(|| PersistError::Malformed("expected an entity object".to_string()))?;
        let meta = object
            .get("_meta")
            .and_then(JsonValue::as_object)
            .ok_or_else(|| PersistError::Malformed("missing _meta".to_string()))?;

        let name = meta
            .get("name")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();
        let kind = meta
            .get("type")
            .and_then(JsonValue::as_u64)
            .map(EntityKind::from_index)
            .unwrap_or_default();

        let entity = self.create_root_entity();
        self.set_name(entity, name);
        self.set_kind(entity, kind);

        if let Some(components) = object.get("components").and_then(JsonValue::as_array) {
            for raw in components {
                self.deserialize_component_into(entity, raw);
            }
        }

        if let Some(children) = object.get("children").and_then(JsonValue::as_array) {
            for raw_child in children {
                let child = self.deserialize_entity(raw_child)?;
                // A freshly created child cannot form a cycle.
                if let Err(err) = self.set_entity_parent(child, entity) {
                    warn!(%entity, %child, %err, "failed to attach deserialized child");
                }
            }
        }

        Ok(entity)
    }

    /// Loads one serialized component onto `entity`, skip-and-continue on any
    /// failure.
    fn deserialize_component_into(&mut self, entity: Entity, raw: &JsonValue) {
        let Some(object) = raw.as_object() else {
            warn!(%entity, "component entry is not an object, skipping");
            return;
        };
        let Some(key) = object.get("type").and_then(JsonValue::as_str) else {
            warn!(%entity, "component entry has no type key, skipping");
            return;
        };
        let Some(component_type) = self.registry().type_for_key(key) else {
            warn!(%entity, key, "unknown component type, skipping");
            return;
        };

        let mut payload = object.clone();
        payload.remove("type");
        let payload = JsonValue::Object(payload);

        let component = self.registry().deserialize(component_type, &payload);
        match component {
            Some(component) => {
                if let Err(err) = self.add_component(entity, component) {
                    warn!(%entity, key, %err, "failed to attach deserialized component");
                }
            }
            None => warn!(%entity, key, "component loader failed, skipping"),
        }
    }
}
