use std::fmt;

/// An opaque handle to an entity owned by an [`EntityStore`](crate::store::EntityStore).
///
/// Entities carry no data of their own; all state lives in the store's
/// metadata table and component maps. Ids are allocated monotonically and
/// never reused. `0` is reserved as the invalid sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Entity(u64);

impl Entity {
    /// The reserved "no entity" sentinel.
    pub const INVALID: Entity = Entity(0);

    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }

    /// `true` for any handle other than [`Entity::INVALID`].
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl Default for Entity {
    fn default() -> Self {
        Entity::INVALID
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Coarse classification of what an entity represents in the project tree.
///
/// Serialized as an integer in the persisted `_meta.type` field, so the
/// discriminant order is part of the on-disk format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntityKind {
    #[default]
    Node = 0,
    Folder = 1,
    Scene = 2,
    Character = 3,
    Background = 4,
    UiElement = 5,
    Object = 6,
    Project = 7,
}

impl EntityKind {
    pub const fn as_index(self) -> u64 {
        self as u64
    }

    /// Decodes a persisted kind index. Unknown indices fall back to `Node`
    /// so old project files keep loading.
    pub const fn from_index(index: u64) -> Self {
        match index {
            1 => EntityKind::Folder,
            2 => EntityKind::Scene,
            3 => EntityKind::Character,
            4 => EntityKind::Background,
            5 => EntityKind::UiElement,
            6 => EntityKind::Object,
            7 => EntityKind::Project,
            _ => EntityKind::Node,
        }
    }
}

/// Per-entity metadata: display name, kind and hierarchy links.
///
/// The parent/child links are maintained exclusively by the store. Invariant:
/// if `meta(child).parent == p`, then `p`'s `children` contains `child`
/// exactly once.
#[derive(Debug, Clone, Default)]
pub struct EntityMeta {
    pub name: String,
    pub kind: EntityKind,
    pub parent: Entity,
    pub children: Vec<Entity>,
}

impl EntityMeta {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: Entity::INVALID,
            children: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        !self.parent.is_valid()
    }
}
