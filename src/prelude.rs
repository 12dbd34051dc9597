//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types from the butai crate.
//! Import this module to get access to the core functionality without having
//! to import each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use butai::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! // Load an exported script and rebuild it in a fresh store.
//! let script = Script::from_file("path/to/data.json")?;
//! let mut store = EntityStore::new();
//! let project = script.instantiate(&mut store)?;
//!
//! // Play from the project's start scene.
//! let start = store.project_meta(project).map(|p| p.start_node).unwrap_or_default();
//! let mut executor = FlowExecutor::new();
//! executor.tick(&mut store, start);
//! # Ok(())
//! # }
//! ```

// Store and entities
pub use crate::entity::{Entity, EntityKind, EntityMeta};
pub use crate::store::EntityStore;

// Components
pub use crate::component::{
    Choice, ChoiceOption, Component, ComponentRegistry, ComponentType, CustomComponent, DiceRoll,
    Dialogue, FlowNode, ProjectMeta, Target,
};

// Flow execution and visibility
pub use crate::flow::{FlowExecutor, TickStatus, visible_entities};

// Dice rolling
pub use crate::dice::DiceOutcome;

// Runtime script export
pub use crate::script::{EventExport, SceneExport, Script};

// Error types
pub use crate::error::{ComponentError, FlowError, HierarchyError, PersistError, ScriptError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
