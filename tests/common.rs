//! Common test utilities for building narrative projects in a fresh store.
use butai::prelude::*;

/// Creates a root entity carrying an active `ProjectMeta`.
#[allow(dead_code)]
pub fn create_project(store: &mut EntityStore, name: &str) -> Entity {
    let project = store.create_root_entity();
    store.set_name(project, name);
    store.set_kind(project, EntityKind::Project);
    store
        .add_component(
            project,
            Component::ProjectMeta(ProjectMeta {
                project_name: name.to_string(),
                ..ProjectMeta::default()
            }),
        )
        .expect("fresh project entity accepts ProjectMeta");
    project
}

/// Adds a scene under `project` and appends it to the project's scene order.
/// The first scene added becomes the project's start node.
#[allow(dead_code)]
pub fn add_scene(store: &mut EntityStore, project: Entity, name: &str) -> Entity {
    let scene = store.create_entity(project);
    store.set_name(scene, name);
    store.set_kind(scene, EntityKind::Scene);
    store
        .add_component(scene, Component::FlowNode(FlowNode::named(name)))
        .expect("fresh scene entity accepts FlowNode");

    let meta = store
        .project_meta_mut(project)
        .expect("project entity has ProjectMeta");
    if meta.scene_nodes.is_empty() {
        meta.start_node = scene;
    }
    meta.scene_nodes.push(scene);
    scene
}

/// Appends a dialogue event with the given lines and branch target.
#[allow(dead_code)]
pub fn add_dialogue(
    store: &mut EntityStore,
    scene: Entity,
    lines: &[&str],
    target: Target,
) -> Entity {
    let event = store.create_entity(scene);
    store
        .add_component(
            event,
            Component::Dialogue(Dialogue {
                lines: lines.iter().map(|l| l.to_string()).collect(),
                target,
                ..Dialogue::default()
            }),
        )
        .expect("fresh event entity accepts Dialogue");
    push_event(store, scene, event);
    event
}

/// Appends a multi-option choice event.
#[allow(dead_code)]
pub fn add_choice(store: &mut EntityStore, scene: Entity, options: Vec<ChoiceOption>) -> Entity {
    let event = store.create_entity(scene);
    store
        .add_component(event, Component::Choice(Choice { options }))
        .expect("fresh event entity accepts Choice");
    push_event(store, scene, event);
    event
}

/// Appends a dice-check event.
#[allow(dead_code)]
pub fn add_dice(
    store: &mut EntityStore,
    scene: Entity,
    sides: i32,
    threshold: i32,
    on_success: Target,
    on_failure: Target,
) -> Entity {
    let event = store.create_entity(scene);
    store
        .add_component(
            event,
            Component::DiceRoll(DiceRoll {
                sides,
                threshold,
                on_success,
                on_failure,
            }),
        )
        .expect("fresh event entity accepts DiceRoll");
    push_event(store, scene, event);
    event
}

/// Appends an event entity with no event component at all.
#[allow(dead_code)]
pub fn add_plain_event(store: &mut EntityStore, scene: Entity) -> Entity {
    let event = store.create_entity(scene);
    push_event(store, scene, event);
    event
}

/// Simulates the host reporting a user click on a dialogue event.
#[allow(dead_code)]
pub fn trigger(store: &mut EntityStore, event: Entity) {
    store
        .dialogue_mut(event)
        .expect("triggered event has a Dialogue")
        .triggered = true;
}

fn push_event(store: &mut EntityStore, scene: Entity, event: Entity) {
    store
        .flow_node_mut(scene)
        .expect("scene entity has a FlowNode")
        .event_sequence
        .push(event);
}
