use crate::component::ComponentType;
use crate::entity::Entity;
use thiserror::Error;

/// Structural errors from attaching or detaching components.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    #[error("The invalid entity handle cannot hold components")]
    InvalidEntity,

    #[error("Entity {0} was never created or has been destroyed")]
    EntityNotFound(Entity),

    #[error("Entity {entity} already has a {existing:?} component")]
    AlreadyExists {
        entity: Entity,
        existing: ComponentType,
    },
}

/// Errors from hierarchy mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("Entity {0} was never created or has been destroyed")]
    EntityNotFound(Entity),

    #[error("Parenting {child} under {parent} would create a cycle")]
    WouldCreateCycle { child: Entity, parent: Entity },
}

/// Errors from serializing or deserializing entity trees.
///
/// A malformed *component* inside a well-formed entity is not an error: it is
/// skipped with a diagnostic and loading continues.
#[derive(Error, Debug, Clone)]
pub enum PersistError {
    #[error("Entity {0} was never created or has been destroyed")]
    EntityNotFound(Entity),

    #[error("Malformed entity JSON: {0}")]
    Malformed(String),
}

/// Errors from host-driven flow actions (choice selection, dice outcomes).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("No scene is being played")]
    NoActiveScene,

    #[error("The active scene has no event at the current cursor")]
    NoCurrentEvent,

    #[error("Event {0} has no Choice component")]
    NotAChoice(Entity),

    #[error("Event {0} has no DiceRoll component")]
    NotADiceRoll(Entity),

    #[error("Choice option {index} is out of range (event has {len} options)")]
    OptionOutOfRange { index: usize, len: usize },
}

/// Errors from building, instantiating or snapshotting a runtime script.
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("The store contains no active project")]
    NoActiveProject,

    #[error("Malformed script JSON: {0}")]
    Malformed(String),

    #[error("Could not read or write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot encoding failed: {0}")]
    SnapshotEncode(String),

    #[error("Snapshot decoding failed: {0}")]
    SnapshotDecode(String),
}
