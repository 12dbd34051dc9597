use crate::component::Target;
use crate::entity::Entity;
use crate::error::FlowError;
use crate::store::EntityStore;
use itertools::Itertools;
use tracing::{debug, warn};

mod visibility;

pub use visibility::visible_entities;

/// What a single [`FlowExecutor::tick`] (or host action) did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// Nothing to drive: no active scene, no flow node, or the cursor is
    /// already past the end of the event sequence.
    Idle,
    /// The current event is waiting for an external trigger or host action.
    Waiting,
    /// The cursor moved within the active scene.
    Advanced,
    /// Playback switched to another scene, which starts fresh next tick.
    SceneChanged(Entity),
    /// Playback ended and the executor reset itself.
    Finished,
}

/// How a [`Target`] resolved against the current scene and project.
enum Resolution {
    /// Jump the cursor to this index within the active scene.
    Jump(usize),
    /// Switch playback to this scene entity.
    Switch(Entity),
    /// Unresolved; fall through to default advance.
    Fallthrough,
}

/// The deterministic playback state machine.
///
/// The executor owns no entities — only the cursor state below. It reads
/// scene and event components from the store and writes nothing but the
/// `triggered` flag of dialogues it consumes. Drive it with one
/// [`tick`](FlowExecutor::tick) per host frame; extra ticks in the same frame
/// are safe and simply let auto-completable events chain ("catch-up" after a
/// scene switch).
#[derive(Debug, Default)]
pub struct FlowExecutor {
    active_scene: Entity,
    cursor: usize,
    last_event: Entity,
    event_completed: bool,
}

impl FlowExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all playback state. Called on every scene switch and whenever
    /// the host stops playback.
    pub fn reset(&mut self) {
        self.active_scene = Entity::INVALID;
        self.cursor = 0;
        self.last_event = Entity::INVALID;
        self.event_completed = false;
    }

    // --- Read-only accessors for the host and the visibility resolver ---

    pub fn current_scene(&self) -> Entity {
        self.active_scene
    }

    pub fn current_event_index(&self) -> usize {
        self.cursor
    }

    pub fn is_event_completed(&self) -> bool {
        self.event_completed
    }

    /// The event entity under the cursor, or `INVALID` outside a sequence.
    pub fn current_event(&self, store: &EntityStore) -> Entity {
        store
            .flow_node(self.active_scene)
            .and_then(|flow| flow.event_sequence.get(self.cursor).copied())
            .unwrap_or(Entity::INVALID)
    }

    // --- Driving ---

    /// Advances playback by at most one step.
    ///
    /// With no active scene, adopts `viewed_scene` (the host's "currently
    /// viewed scene" collaborator). Dialogue events complete when their
    /// `triggered` flag was set externally; Choice and DiceRoll events wait
    /// for [`choose`](FlowExecutor::choose) /
    /// [`apply_dice_outcome`](FlowExecutor::apply_dice_outcome); events with
    /// no known event component complete immediately (fail open).
    pub fn tick(&mut self, store: &mut EntityStore, viewed_scene: Entity) -> TickStatus {
        if !self.active_scene.is_valid() {
            if !viewed_scene.is_valid() {
                return TickStatus::Idle;
            }
            self.active_scene = viewed_scene;
            debug!(scene = %viewed_scene, "starting playback");
        }

        let Some(flow) = store.flow_node(self.active_scene) else {
            return TickStatus::Idle;
        };
        let Some(&event) = flow.event_sequence.get(self.cursor) else {
            return TickStatus::Idle;
        };

        // Entering a new event always starts "not completed".
        if event != self.last_event {
            self.event_completed = false;
            self.last_event = event;
        }

        if self.event_completed {
            return self.advance_past_current(store);
        }

        if store.dialogue(event).is_some() {
            return self.tick_dialogue(store, event);
        }
        if store.choice(event).is_some() || store.dice_roll(event).is_some() {
            return TickStatus::Waiting;
        }

        // Unknown event kinds complete immediately.
        self.event_completed = true;
        self.advance_past_current(store)
    }

    fn tick_dialogue(&mut self, store: &mut EntityStore, event: Entity) -> TickStatus {
        let Some(dialogue) = store.dialogue_mut(event) else {
            return TickStatus::Waiting;
        };
        if !dialogue.triggered {
            return TickStatus::Waiting;
        }
        dialogue.triggered = false;
        let target = dialogue.target.clone();
        self.apply_resolution(store, &target)
    }

    /// Picks option `option_index` of the current Choice event and resolves
    /// its target through the same logic dialogue uses.
    pub fn choose(
        &mut self,
        store: &mut EntityStore,
        option_index: usize,
    ) -> Result<TickStatus, FlowError> {
        if !self.active_scene.is_valid() {
            return Err(FlowError::NoActiveScene);
        }
        let event = self.current_event(store);
        if !event.is_valid() {
            return Err(FlowError::NoCurrentEvent);
        }
        let choice = store.choice(event).ok_or(FlowError::NotAChoice(event))?;
        let len = choice.options.len();
        let option = choice
            .options
            .get(option_index)
            .ok_or(FlowError::OptionOutOfRange {
                index: option_index,
                len,
            })?;
        let target = option.target.clone();
        Ok(self.apply_resolution(store, &target))
    }

    /// Reports the outcome of the current DiceRoll event and resolves the
    /// matching branch target. The executor never rolls dice itself.
    pub fn apply_dice_outcome(
        &mut self,
        store: &mut EntityStore,
        success: bool,
    ) -> Result<TickStatus, FlowError> {
        if !self.active_scene.is_valid() {
            return Err(FlowError::NoActiveScene);
        }
        let event = self.current_event(store);
        if !event.is_valid() {
            return Err(FlowError::NoCurrentEvent);
        }
        let dice = store
            .dice_roll(event)
            .ok_or(FlowError::NotADiceRoll(event))?;
        let target = if success {
            dice.on_success.clone()
        } else {
            dice.on_failure.clone()
        };
        Ok(self.apply_resolution(store, &target))
    }

    // --- Target resolution ---

    /// Precedence: in-scene event jump, then scene switch by name, then
    /// fall through to default advance.
    fn resolve_target(&self, store: &EntityStore, target: &Target) -> Resolution {
        match target {
            Target::None => Resolution::Fallthrough,
            Target::Event(event) => {
                let position = store.flow_node(self.active_scene).and_then(|flow| {
                    flow.event_sequence.iter().find_position(|&&e| e == *event)
                });
                match position {
                    Some((index, _)) => Resolution::Jump(index),
                    None => {
                        warn!(%event, "event target is not in the active scene, falling through");
                        Resolution::Fallthrough
                    }
                }
            }
            Target::Scene(name) => match store.find_scene_by_name(name) {
                Some(scene) => Resolution::Switch(scene),
                None => {
                    warn!(scene = %name, "no scene with this name, falling through");
                    Resolution::Fallthrough
                }
            },
        }
    }

    fn apply_resolution(&mut self, store: &mut EntityStore, target: &Target) -> TickStatus {
        match self.resolve_target(store, target) {
            Resolution::Jump(index) => {
                // Jumping supports looping back within the scene: the cursor
                // lands on the target without passing it.
                self.cursor = index;
                self.event_completed = false;
                TickStatus::Advanced
            }
            Resolution::Switch(scene) => self.switch_scene(scene),
            Resolution::Fallthrough => {
                self.event_completed = true;
                self.advance_past_current(store)
            }
        }
    }

    fn switch_scene(&mut self, scene: Entity) -> TickStatus {
        debug!(from = %self.active_scene, to = %scene, "switching scene");
        self.reset();
        self.active_scene = scene;
        TickStatus::SceneChanged(scene)
    }

    /// Increments the cursor; at the end of the sequence falls back through
    /// the scene's own `next_node`, then the project's scene order, then
    /// terminates playback.
    fn advance_past_current(&mut self, store: &EntityStore) -> TickStatus {
        let Some(flow) = store.flow_node(self.active_scene) else {
            return TickStatus::Idle;
        };

        self.cursor += 1;
        if self.cursor < flow.event_sequence.len() {
            return TickStatus::Advanced;
        }

        if let Some(next) = flow.next_node
            && next.is_valid()
        {
            return self.switch_scene(next);
        }

        if let Some(next) = self.next_project_scene(store) {
            return self.switch_scene(next);
        }

        debug!(scene = %self.active_scene, "playback finished");
        self.reset();
        TickStatus::Finished
    }

    /// The scene after the active one in the project's scene order, if any.
    fn next_project_scene(&self, store: &EntityStore) -> Option<Entity> {
        let project = store.find_active_project()?;
        let scenes = &store.project_meta(project)?.scene_nodes;
        let (index, _) = scenes.iter().find_position(|&&s| s == self.active_scene)?;
        scenes.get(index + 1).copied()
    }
}
