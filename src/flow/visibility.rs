use super::FlowExecutor;
use crate::entity::Entity;
use crate::store::EntityStore;
use ahash::AHashSet;
use itertools::chain;

/// The set of entities a renderer should draw for `scene`.
///
/// Pure function of the store, the scene and the playback state: identical
/// inputs produce identical sets. Returns the union of the scene's
/// presentation lists plus either every event of the sequence (editor
/// preview, `playback == None`) or exactly the event under the executor's
/// cursor (playback active — the executor owns cursor truth, the resolver
/// never recomputes it).
///
/// A scene without a `FlowNode` component is not a scene: empty set.
pub fn visible_entities(
    store: &EntityStore,
    scene: Entity,
    playback: Option<&FlowExecutor>,
) -> AHashSet<Entity> {
    let Some(flow) = store.flow_node(scene) else {
        return AHashSet::new();
    };

    let mut visible: AHashSet<Entity> = chain!(
        &flow.characters,
        &flow.backgrounds,
        &flow.ui_layer,
        &flow.object_layer,
    )
    .copied()
    .collect();

    match playback {
        None => visible.extend(flow.event_sequence.iter().copied()),
        Some(executor) => {
            if let Some(&event) = flow.event_sequence.get(executor.current_event_index()) {
                visible.insert(event);
            }
        }
    }

    visible
}
