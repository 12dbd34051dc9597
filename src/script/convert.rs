use super::{EventExport, SceneExport, Script};
use crate::component::{
    Choice, Component, DiceRoll, Dialogue, FlowNode, ProjectMeta, Target,
};
use crate::entity::{Entity, EntityKind};
use crate::error::ScriptError;
use crate::store::EntityStore;
use ahash::AHashMap;
use tracing::warn;

impl Script {
    /// Flattens the store's active project into a script, scenes in the
    /// project's order.
    ///
    /// Entries of `scene_nodes` without a `FlowNode` are skipped with a
    /// diagnostic; events without a recognized event component export as
    /// `Unknown`.
    pub fn build(store: &EntityStore) -> Result<Script, ScriptError> {
        let project = store
            .find_active_project()
            .ok_or(ScriptError::NoActiveProject)?;
        let project_meta = store
            .project_meta(project)
            .ok_or(ScriptError::NoActiveProject)?;

        let mut scenes = Vec::with_capacity(project_meta.scene_nodes.len());
        for &scene in &project_meta.scene_nodes {
            let Some(flow) = store.flow_node(scene) else {
                warn!(%scene, "project lists a scene without a FlowNode, skipping");
                continue;
            };
            scenes.push(SceneExport {
                id: scene.id(),
                name: flow.name.clone(),
                is_start: flow.is_start,
                is_end: flow.is_end,
                next_node: flow.next_node.filter(|n| n.is_valid()).map(Entity::id),
                characters: raw_ids(&flow.characters),
                backgrounds: raw_ids(&flow.backgrounds),
                ui_layer: raw_ids(&flow.ui_layer),
                object_layer: raw_ids(&flow.object_layer),
                events: flow
                    .event_sequence
                    .iter()
                    .map(|&event| export_event(store, event))
                    .collect(),
            });
        }
        Ok(Script { scenes })
    }

    /// Recreates the script as entities in `store` so a
    /// [`FlowExecutor`](crate::flow::FlowExecutor) can play it unchanged.
    ///
    /// Editor entity ids are remapped to fresh ids; `Target::Event` and all
    /// scene/presentation references are re-linked through the map (scene
    /// targets travel by name and need no remapping). Presentation ids that
    /// were not exported as entities get placeholder entities so the
    /// references stay alive for the visibility resolver.
    ///
    /// Returns the created project entity; its [`ProjectMeta::start_node`]
    /// is the scene flagged `is_start`, or the first scene.
    pub fn instantiate(&self, store: &mut EntityStore) -> Result<Entity, ScriptError> {
        let project = store.create_root_entity();
        store.set_name(project, "script");
        store.set_kind(project, EntityKind::Project);

        // Pass 1: allocate scene and event entities, recording the id map.
        let mut remap: AHashMap<u64, Entity> = AHashMap::new();
        for scene in &self.scenes {
            let scene_entity = store.create_entity(project);
            store.set_name(scene_entity, scene.name.clone());
            store.set_kind(scene_entity, EntityKind::Scene);
            remap.insert(scene.id, scene_entity);
            for event in &scene.events {
                let event_entity = store.create_entity(scene_entity);
                store.set_kind(event_entity, EntityKind::Node);
                remap.insert(event.id(), event_entity);
            }
        }

        // Pass 2: attach components with remapped references.
        let mut scene_entities = Vec::with_capacity(self.scenes.len());
        let mut start_scene = Entity::INVALID;
        for scene in &self.scenes {
            let scene_entity = remap[&scene.id];
            scene_entities.push(scene_entity);
            if scene.is_start && !start_scene.is_valid() {
                start_scene = scene_entity;
            }

            let flow = FlowNode {
                name: scene.name.clone(),
                is_start: scene.is_start,
                is_end: scene.is_end,
                next_node: scene.next_node.and_then(|id| lookup(&remap, id, "nextNode")),
                event_sequence: scene.events.iter().map(|e| remap[&e.id()]).collect(),
                characters: placeholders(store, &mut remap, scene_entity, &scene.characters, EntityKind::Character),
                backgrounds: placeholders(store, &mut remap, scene_entity, &scene.backgrounds, EntityKind::Background),
                ui_layer: placeholders(store, &mut remap, scene_entity, &scene.ui_layer, EntityKind::UiElement),
                object_layer: placeholders(store, &mut remap, scene_entity, &scene.object_layer, EntityKind::Object),
            };
            attach(store, scene_entity, Component::FlowNode(flow));

            for event in &scene.events {
                let event_entity = remap[&event.id()];
                match event {
                    EventExport::Dialogue {
                        lines,
                        speaker,
                        advance_on_click,
                        target,
                        ..
                    } => {
                        let dialogue = Dialogue {
                            lines: lines.clone(),
                            speaker: speaker.and_then(|id| lookup(&remap, id, "speaker")),
                            advance_on_click: *advance_on_click,
                            triggered: false,
                            target: remap_target(&remap, target),
                        };
                        attach(store, event_entity, Component::Dialogue(dialogue));
                    }
                    EventExport::Choice { options, .. } => {
                        let mut options = options.clone();
                        for option in &mut options {
                            option.target = remap_target(&remap, &option.target);
                        }
                        attach(store, event_entity, Component::Choice(Choice { options }));
                    }
                    EventExport::DiceRoll {
                        sides,
                        threshold,
                        on_success,
                        on_failure,
                        ..
                    } => {
                        let dice = DiceRoll {
                            sides: *sides,
                            threshold: *threshold,
                            on_success: remap_target(&remap, on_success),
                            on_failure: remap_target(&remap, on_failure),
                        };
                        attach(store, event_entity, Component::DiceRoll(dice));
                    }
                    // Unknown events stay bare entities; the executor passes
                    // through them.
                    EventExport::Unknown { .. } => {}
                }
            }
        }

        if !start_scene.is_valid() {
            start_scene = scene_entities.first().copied().unwrap_or(Entity::INVALID);
        }

        let meta = ProjectMeta {
            project_name: "script".to_string(),
            start_node: start_scene,
            scene_nodes: scene_entities,
            ..ProjectMeta::default()
        };
        attach(store, project, Component::ProjectMeta(meta));

        Ok(project)
    }
}

fn export_event(store: &EntityStore, event: Entity) -> EventExport {
    if let Some(dialogue) = store.dialogue(event) {
        return EventExport::Dialogue {
            id: event.id(),
            lines: dialogue.lines.clone(),
            speaker: dialogue.speaker.filter(|s| s.is_valid()).map(Entity::id),
            advance_on_click: dialogue.advance_on_click,
            target: dialogue.target.clone(),
        };
    }
    if let Some(choice) = store.choice(event) {
        return EventExport::Choice {
            id: event.id(),
            options: choice.options.clone(),
        };
    }
    if let Some(dice) = store.dice_roll(event) {
        return EventExport::DiceRoll {
            id: event.id(),
            sides: dice.sides,
            threshold: dice.threshold,
            on_success: dice.on_success.clone(),
            on_failure: dice.on_failure.clone(),
        };
    }
    EventExport::Unknown { id: event.id() }
}

fn raw_ids(entities: &[Entity]) -> Vec<u64> {
    entities
        .iter()
        .filter(|e| e.is_valid())
        .map(|e| e.id())
        .collect()
}

/// Maps exported presentation ids to entities, creating placeholders under
/// `parent` for ids the script does not define.
fn placeholders(
    store: &mut EntityStore,
    remap: &mut AHashMap<u64, Entity>,
    parent: Entity,
    ids: &[u64],
    kind: EntityKind,
) -> Vec<Entity> {
    ids.iter()
        .map(|&id| {
            *remap.entry(id).or_insert_with(|| {
                let placeholder = store.create_entity(parent);
                store.set_kind(placeholder, kind);
                placeholder
            })
        })
        .collect()
}

fn lookup(remap: &AHashMap<u64, Entity>, id: u64, field: &str) -> Option<Entity> {
    let mapped = remap.get(&id).copied();
    if mapped.is_none() {
        warn!(id, field, "script references an id it does not define");
    }
    mapped
}

fn remap_target(remap: &AHashMap<u64, Entity>, target: &Target) -> Target {
    match target {
        Target::Event(event) => match remap.get(&event.id()) {
            Some(&mapped) => Target::Event(mapped),
            None => {
                warn!(event = %event, "event target not defined by the script, dropping");
                Target::None
            }
        },
        other => other.clone(),
    }
}

fn attach(store: &mut EntityStore, entity: Entity, component: Component) {
    if let Err(err) = store.add_component(entity, component) {
        warn!(%entity, %err, "failed to attach script component");
    }
}
