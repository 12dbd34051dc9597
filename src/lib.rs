//! # Butai - Scene Flow Engine for Branching Narratives
//!
//! **Butai** is the engine core of a branching-narrative editor/runtime: a
//! project is a tree of entities, certain entities are *scenes* holding an
//! ordered sequence of *events* (dialogue lines, multi-option choices, dice
//! checks), and a deterministic state machine advances through those events
//! and resolves branch targets from scene to scene. Butai carries no
//! rendering, audio or UI code — the host editor or player owns all of that
//! and only calls into the store and the executor.
//!
//! ## Core Workflow
//!
//! 1.  **Populate the store**: create entities through the [`store::EntityStore`]
//!     and attach [`component::Component`] values (scenes, dialogue, choices,
//!     dice checks, project metadata). Custom presentation components go
//!     through the [`component::ComponentRegistry`].
//! 2.  **Drive playback**: call [`flow::FlowExecutor::tick`] once per host
//!     frame. Dialogue completes when the host sets its `triggered` flag;
//!     choices and dice checks are driven through
//!     [`flow::FlowExecutor::choose`] and
//!     [`flow::FlowExecutor::apply_dice_outcome`].
//! 3.  **Resolve visibility**: hand [`flow::visible_entities`] the store and
//!     the executor to get the set of entities a renderer should draw.
//! 4.  **Export and replay**: flatten a project into a [`script::Script`]
//!     (`data.json`), snapshot it to a compact binary, or instantiate it into
//!     a fresh store and play it with the same executor.
//!
//! ## Quick Start
//!
//! ```rust
//! use butai::prelude::*;
//!
//! // 1. Build a minimal project: one scene, one dialogue line.
//! let mut store = EntityStore::new();
//! let project = store.create_root_entity();
//! let scene = store.create_entity(project);
//! let line = store.create_entity(scene);
//!
//! store.add_component(line, Component::Dialogue(Dialogue {
//!     lines: vec!["Welcome to the stage.".to_string()],
//!     ..Dialogue::default()
//! }))?;
//! store.add_component(scene, Component::FlowNode(FlowNode {
//!     name: "Intro".to_string(),
//!     is_start: true,
//!     event_sequence: vec![line],
//!     ..FlowNode::default()
//! }))?;
//! store.add_component(project, Component::ProjectMeta(ProjectMeta {
//!     project_name: "Demo".to_string(),
//!     start_node: scene,
//!     scene_nodes: vec![scene],
//!     ..ProjectMeta::default()
//! }))?;
//!
//! // 2. Drive playback: the dialogue waits for the host's trigger.
//! let mut executor = FlowExecutor::new();
//! assert_eq!(executor.tick(&mut store, scene), TickStatus::Waiting);
//!
//! store.dialogue_mut(line).unwrap().triggered = true;
//! // Last event of the only scene: playback ends.
//! assert_eq!(executor.tick(&mut store, scene), TickStatus::Finished);
//! # Ok::<(), butai::error::ComponentError>(())
//! ```

pub mod component;
pub mod dice;
pub mod entity;
pub mod error;
pub mod flow;
pub mod prelude;
pub mod script;
pub mod store;
