use crate::component::{
    Choice, Component, ComponentRegistry, ComponentType, DiceRoll, Dialogue, FlowNode, ProjectMeta,
};
use crate::entity::{Entity, EntityKind, EntityMeta};
use crate::error::{ComponentError, HierarchyError};
use ahash::AHashMap;
use tracing::warn;

mod persist;

/// Owns all entities of a project: their metadata, hierarchy and components.
///
/// The store is the single source of truth. It is an explicit instance — no
/// global singleton — so executors and resolvers can be tested against a
/// fresh store each time. All operations are synchronous and run to
/// completion; a multi-threaded host must serialize access externally.
pub struct EntityStore {
    next_id: u64,
    meta: AHashMap<Entity, EntityMeta>,
    components: AHashMap<Entity, AHashMap<ComponentType, Component>>,
    registry: ComponentRegistry,
}

impl EntityStore {
    /// A store with the built-in component kinds registered.
    pub fn new() -> Self {
        Self::with_registry(ComponentRegistry::with_builtins())
    }

    /// A store with a caller-assembled registry, for hosts that add custom
    /// presentation components before loading a project.
    pub fn with_registry(registry: ComponentRegistry) -> Self {
        Self {
            next_id: 1,
            meta: AHashMap::new(),
            components: AHashMap::new(),
            registry,
        }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    // --- Creation and destruction ---

    /// Allocates a fresh entity with empty metadata and no components.
    pub fn create_root_entity(&mut self) -> Entity {
        let entity = Entity::from_raw(self.next_id);
        self.next_id += 1;
        self.meta.insert(entity, EntityMeta::default());
        self.components.insert(entity, AHashMap::new());
        entity
    }

    /// Allocates a fresh entity attached under `parent`.
    ///
    /// An invalid parent yields a root entity; a parent handle the store does
    /// not know is ignored with a diagnostic and also yields a root.
    pub fn create_entity(&mut self, parent: Entity) -> Entity {
        let entity = self.create_root_entity();
        if parent.is_valid() {
            // A fresh entity cannot be an ancestor of anything.
            if let Err(err) = self.set_entity_parent(entity, parent) {
                warn!(%entity, %parent, %err, "created entity left as root");
            }
        }
        entity
    }

    /// Removes `entity` alone: its components and metadata are dropped, it is
    /// detached from its parent, and its children become roots.
    ///
    /// Returns `false` if the entity does not exist.
    pub fn destroy_node_only(&mut self, entity: Entity) -> bool {
        let Some(meta) = self.meta.remove(&entity) else {
            return false;
        };
        self.components.remove(&entity);
        if let Some(parent_meta) = self.meta.get_mut(&meta.parent) {
            parent_meta.children.retain(|&c| c != entity);
        }
        for child in meta.children {
            if let Some(child_meta) = self.meta.get_mut(&child) {
                child_meta.parent = Entity::INVALID;
            }
        }
        true
    }

    /// Removes `entity` and every descendant, depth-first.
    ///
    /// Returns `false` if the entity does not exist.
    pub fn destroy_subtree(&mut self, entity: Entity) -> bool {
        let Some(meta) = self.meta.get(&entity) else {
            return false;
        };
        let parent = meta.parent;
        if let Some(parent_meta) = self.meta.get_mut(&parent) {
            parent_meta.children.retain(|&c| c != entity);
        }

        let mut pending = vec![entity];
        while let Some(current) = pending.pop() {
            if let Some(meta) = self.meta.remove(&current) {
                pending.extend(meta.children);
            }
            self.components.remove(&current);
        }
        true
    }

    // --- Metadata and hierarchy ---

    pub fn contains(&self, entity: Entity) -> bool {
        self.meta.contains_key(&entity)
    }

    pub fn meta(&self, entity: Entity) -> Option<&EntityMeta> {
        self.meta.get(&entity)
    }

    pub fn set_name(&mut self, entity: Entity, name: impl Into<String>) -> bool {
        match self.meta.get_mut(&entity) {
            Some(meta) => {
                meta.name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn set_kind(&mut self, entity: Entity, kind: EntityKind) -> bool {
        match self.meta.get_mut(&entity) {
            Some(meta) => {
                meta.kind = kind;
                true
            }
            None => false,
        }
    }

    /// Iterates over all live entities, in no particular order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.meta.keys().copied()
    }

    /// Reparents `child` under `parent`, keeping both sides of the
    /// parent/child link consistent: the child is detached from its previous
    /// parent first, then appended to the new parent's children.
    ///
    /// Passing an invalid `parent` detaches the child into a root. Parenting
    /// an entity under its own descendant is rejected with
    /// [`HierarchyError::WouldCreateCycle`], which keeps every ancestor walk
    /// finite.
    pub fn set_entity_parent(
        &mut self,
        child: Entity,
        parent: Entity,
    ) -> Result<(), HierarchyError> {
        if !self.meta.contains_key(&child) {
            return Err(HierarchyError::EntityNotFound(child));
        }
        if parent.is_valid() {
            if !self.meta.contains_key(&parent) {
                return Err(HierarchyError::EntityNotFound(parent));
            }
            let mut ancestor = parent;
            while ancestor.is_valid() {
                if ancestor == child {
                    return Err(HierarchyError::WouldCreateCycle { child, parent });
                }
                ancestor = self
                    .meta
                    .get(&ancestor)
                    .map(|m| m.parent)
                    .unwrap_or(Entity::INVALID);
            }
        }

        let previous = self
            .meta
            .get(&child)
            .map(|m| m.parent)
            .unwrap_or(Entity::INVALID);
        if let Some(previous_meta) = self.meta.get_mut(&previous) {
            previous_meta.children.retain(|&c| c != child);
        }
        if let Some(meta) = self.meta.get_mut(&child) {
            meta.parent = parent;
        }
        if let Some(parent_meta) = self.meta.get_mut(&parent) {
            parent_meta.children.push(child);
        }
        Ok(())
    }

    /// Walks parent links up to the root. Terminates because
    /// [`EntityStore::set_entity_parent`] refuses cycles.
    pub fn root_of(&self, entity: Entity) -> Entity {
        let mut current = entity;
        loop {
            match self.meta.get(&current) {
                Some(meta) if meta.parent.is_valid() => current = meta.parent,
                Some(_) => return current,
                None => return Entity::INVALID,
            }
        }
    }

    // --- Components ---

    /// Attaches `component` under its own type tag.
    ///
    /// At most one component per type: a duplicate add leaves the original in
    /// place and reports [`ComponentError::AlreadyExists`].
    pub fn add_component(
        &mut self,
        entity: Entity,
        component: Component,
    ) -> Result<(), ComponentError> {
        if !entity.is_valid() {
            return Err(ComponentError::InvalidEntity);
        }
        let Some(map) = self.components.get_mut(&entity) else {
            return Err(ComponentError::EntityNotFound(entity));
        };
        let tag = component.type_tag();
        if map.contains_key(&tag) {
            return Err(ComponentError::AlreadyExists {
                entity,
                existing: tag,
            });
        }
        map.insert(tag, component);
        Ok(())
    }

    /// Returns `true` iff a component of that type was present and removed.
    pub fn remove_component(&mut self, entity: Entity, component_type: ComponentType) -> bool {
        self.components
            .get_mut(&entity)
            .is_some_and(|map| map.remove(&component_type).is_some())
    }

    pub fn component(&self, entity: Entity, component_type: ComponentType) -> Option<&Component> {
        self.components.get(&entity)?.get(&component_type)
    }

    pub fn component_mut(
        &mut self,
        entity: Entity,
        component_type: ComponentType,
    ) -> Option<&mut Component> {
        self.components.get_mut(&entity)?.get_mut(&component_type)
    }

    /// All components of `entity`, in no particular order.
    pub fn components(&self, entity: Entity) -> impl Iterator<Item = &Component> + '_ {
        self.components.get(&entity).into_iter().flatten().map(|(_, c)| c)
    }

    // --- Project helpers ---

    /// The entity carrying the active [`ProjectMeta`], lowest id first so the
    /// result is deterministic when several projects are loaded.
    pub fn find_active_project(&self) -> Option<Entity> {
        self.components
            .iter()
            .filter(|(_, map)| {
                map.get(&ComponentType::ProjectMeta)
                    .and_then(|c| c.as_project_meta())
                    .is_some_and(|p| p.is_active)
            })
            .map(|(&entity, _)| entity)
            .min()
    }

    /// Searches the active project's scene order for a `FlowNode` whose name
    /// matches exactly.
    pub fn find_scene_by_name(&self, name: &str) -> Option<Entity> {
        let project = self.find_active_project()?;
        let project_meta = self.project_meta(project)?;
        project_meta
            .scene_nodes
            .iter()
            .copied()
            .find(|&scene| self.flow_node(scene).is_some_and(|flow| flow.name == name))
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Defines typed component lookups on the store for the closed kinds.
macro_rules! typed_component_accessors {
    ( $( ($ty:ty, $tag:ident, $as_ref:ident, $as_mut:ident, $get:ident, $get_mut:ident) ),* $(,)? ) => {
        impl EntityStore {
            $(
                pub fn $get(&self, entity: Entity) -> Option<&$ty> {
                    self.component(entity, ComponentType::$tag)?.$as_ref()
                }

                pub fn $get_mut(&mut self, entity: Entity) -> Option<&mut $ty> {
                    self.component_mut(entity, ComponentType::$tag)?.$as_mut()
                }
            )*
        }
    };
}

typed_component_accessors! {
    (FlowNode, FlowNode, as_flow_node, as_flow_node_mut, flow_node, flow_node_mut),
    (Dialogue, Dialogue, as_dialogue, as_dialogue_mut, dialogue, dialogue_mut),
    (Choice, Choice, as_choice, as_choice_mut, choice, choice_mut),
    (DiceRoll, DiceRoll, as_dice_roll, as_dice_roll_mut, dice_roll, dice_roll_mut),
    (ProjectMeta, ProjectMeta, as_project_meta, as_project_meta_mut, project_meta, project_meta_mut),
}
