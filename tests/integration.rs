//! Integration tests for butai
//!
//! End-to-end tests that verify the store, the executor and the script
//! export work together.
//!
mod common;
use common::*;
use butai::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// Builds a small branching campaign:
    ///
    /// Tavern:  dialogue -> choice (cellar / rest)
    /// Cellar:  dice check (success skips the scare line) -> dialogue
    /// Morning: dialogue (end)
    fn build_campaign(store: &mut EntityStore) -> (Entity, Entity) {
        let project = create_project(store, "Campaign");
        let tavern = add_scene(store, project, "Tavern");
        let cellar = add_scene(store, project, "Cellar");
        let morning = add_scene(store, project, "Morning");

        add_dialogue(store, tavern, &["A stranger waves you over."], Target::None);
        add_choice(
            store,
            tavern,
            vec![
                ChoiceOption::new("Check the cellar", Target::Scene("Cellar".to_string())),
                ChoiceOption::new("Go to sleep", Target::Scene("Morning".to_string())),
            ],
        );

        let check = add_dice(store, cellar, 20, 11, Target::None, Target::None);
        add_dialogue(store, cellar, &["Something hisses in the dark!"], Target::None);
        let calm = add_dialogue(store, cellar, &["Just the house cat."], Target::None);
        store.dice_roll_mut(check).unwrap().on_success = Target::Event(calm);
        store.flow_node_mut(cellar).unwrap().next_node = Some(morning);

        add_dialogue(store, morning, &["Dawn breaks."], Target::None);

        (project, tavern)
    }

    #[test]
    fn test_campaign_playthrough_via_cellar() {
        let mut store = EntityStore::new();
        let (_, tavern) = build_campaign(&mut store);
        let mut executor = FlowExecutor::new();

        // Greeting dialogue.
        assert_eq!(executor.tick(&mut store, tavern), TickStatus::Waiting);
        let greeting = executor.current_event(&store);
        trigger(&mut store, greeting);
        assert_eq!(executor.tick(&mut store, tavern), TickStatus::Advanced);

        // Take the cellar branch.
        assert_eq!(executor.tick(&mut store, tavern), TickStatus::Waiting);
        let cellar = store.find_scene_by_name("Cellar").unwrap();
        assert_eq!(
            executor.choose(&mut store, 0).unwrap(),
            TickStatus::SceneChanged(cellar)
        );

        // Fail the dice check: the scare line plays first.
        assert_eq!(executor.tick(&mut store, tavern), TickStatus::Waiting);
        executor.apply_dice_outcome(&mut store, false).unwrap();
        assert_eq!(executor.current_event_index(), 1);
        let scare = executor.current_event(&store);
        trigger(&mut store, scare);
        executor.tick(&mut store, tavern);
        let calm = executor.current_event(&store);
        trigger(&mut store, calm);

        // End of the cellar: its next_node leads to Morning.
        let morning = store.find_scene_by_name("Morning").unwrap();
        assert_eq!(
            executor.tick(&mut store, tavern),
            TickStatus::SceneChanged(morning)
        );

        // Final line, then the project runs out of scenes.
        executor.tick(&mut store, tavern);
        let dawn = executor.current_event(&store);
        trigger(&mut store, dawn);
        assert_eq!(executor.tick(&mut store, tavern), TickStatus::Finished);
        assert_eq!(executor.current_scene(), Entity::INVALID);
    }

    #[test]
    fn test_script_export_uses_canonical_field_names() {
        let mut store = EntityStore::new();
        build_campaign(&mut store);

        let script = Script::build(&store).expect("active project exports");
        let json = script.to_json();

        let scenes = json.get("scenes").and_then(|s| s.as_array()).unwrap();
        assert_eq!(scenes.len(), 3);

        let tavern = &scenes[0];
        for key in ["id", "name", "isStart", "isEnd", "nextNode", "characters",
                    "backgrounds", "uiLayer", "objectLayer", "events"] {
            assert!(tavern.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(tavern.get("name").and_then(|n| n.as_str()), Some("Tavern"));
        assert_eq!(tavern.get("isStart").and_then(|b| b.as_bool()), Some(false));

        let events = tavern.get("events").and_then(|e| e.as_array()).unwrap();
        assert_eq!(events[0].get("type").and_then(|t| t.as_str()), Some("Dialogue"));
        assert_eq!(events[1].get("type").and_then(|t| t.as_str()), Some("Choice"));

        let cellar_events = scenes[1].get("events").and_then(|e| e.as_array()).unwrap();
        assert_eq!(
            cellar_events[0].get("type").and_then(|t| t.as_str()),
            Some("DiceRoll")
        );
        assert!(cellar_events[0].get("onSuccess").is_some());
    }

    #[test]
    fn test_script_json_round_trip() {
        let mut store = EntityStore::new();
        build_campaign(&mut store);

        let script = Script::build(&store).unwrap();
        let restored = Script::from_json(&script.to_json()).unwrap();
        assert_eq!(script, restored);
    }

    #[test]
    fn test_script_instantiate_replays_like_the_original() {
        let mut editor_store = EntityStore::new();
        build_campaign(&mut editor_store);
        let script = Script::build(&editor_store).unwrap();

        let mut store = EntityStore::new();
        let project = script.instantiate(&mut store).expect("script instantiates");
        let start = store.project_meta(project).unwrap().start_node;
        assert!(start.is_valid());
        assert_eq!(store.flow_node(start).unwrap().name, "Tavern");

        // Replay the sleep branch: greeting, choice, morning line, end.
        let mut executor = FlowExecutor::new();
        assert_eq!(executor.tick(&mut store, start), TickStatus::Waiting);
        let greeting = executor.current_event(&store);
        trigger(&mut store, greeting);
        executor.tick(&mut store, start);

        executor.tick(&mut store, start);
        let morning = store.find_scene_by_name("Morning").unwrap();
        assert_eq!(
            executor.choose(&mut store, 1).unwrap(),
            TickStatus::SceneChanged(morning)
        );

        executor.tick(&mut store, start);
        let dawn = executor.current_event(&store);
        trigger(&mut store, dawn);
        assert_eq!(executor.tick(&mut store, start), TickStatus::Finished);
    }

    #[test]
    fn test_script_instantiate_remaps_event_targets() {
        let mut editor_store = EntityStore::new();
        build_campaign(&mut editor_store);
        let script = Script::build(&editor_store).unwrap();

        let mut store = EntityStore::new();
        script.instantiate(&mut store).unwrap();

        let cellar = store.find_scene_by_name("Cellar").unwrap();
        let flow = store.flow_node(cellar).unwrap();
        let check = flow.event_sequence[0];
        let calm = flow.event_sequence[2];

        // The dice target points at the *new* entity for the calm line.
        let dice = store.dice_roll(check).unwrap();
        assert_eq!(dice.on_success, Target::Event(calm));
        // And next_node was remapped onto the new Morning scene.
        let morning = store.find_scene_by_name("Morning").unwrap();
        assert_eq!(store.flow_node(cellar).unwrap().next_node, Some(morning));
    }

    #[test]
    fn test_script_snapshot_round_trip() {
        let mut store = EntityStore::new();
        build_campaign(&mut store);
        let script = Script::build(&store).unwrap();

        let path = std::env::temp_dir().join("butai_snapshot_test.bin");
        script.save_snapshot(&path).expect("snapshot writes");
        let restored = Script::load_snapshot(&path).expect("snapshot reads");
        let _ = std::fs::remove_file(&path);

        assert_eq!(script, restored);
    }

    #[test]
    fn test_hand_written_data_json_loads_and_plays() {
        let raw = r#"{
            "scenes": [
                {
                    "id": 10,
                    "name": "Gate",
                    "isStart": true,
                    "isEnd": false,
                    "nextNode": null,
                    "characters": [77],
                    "backgrounds": [],
                    "uiLayer": [],
                    "objectLayer": [],
                    "events": [
                        {"id": 11, "type": "Dialogue", "lines": ["Halt!"],
                         "speaker": 77, "advanceOnClick": true, "target": ""},
                        {"id": 12, "type": "Choice", "options": [
                            {"text": "Bribe", "target": "@Event:13"},
                            {"text": "Fight", "target": "Courtyard"}
                        ]},
                        {"id": 13, "type": "Hologram", "weird": true},
                        {"id": 14, "type": "DiceRoll", "sides": 6, "threshold": 4,
                         "onSuccess": "", "onFailure": ""}
                    ]
                },
                {
                    "id": 20,
                    "name": "Courtyard",
                    "isStart": false,
                    "isEnd": true,
                    "nextNode": null,
                    "characters": [],
                    "backgrounds": [],
                    "uiLayer": [],
                    "objectLayer": [],
                    "events": []
                }
            ]
        }"#;

        let json: serde_json::Value = serde_json::from_str(raw).unwrap();
        let script = Script::from_json(&json).unwrap();

        // The unrecognized "Hologram" kind degrades to Unknown.
        assert!(matches!(script.scenes[0].events[2], EventExport::Unknown { id: 13 }));

        let mut store = EntityStore::new();
        let project = script.instantiate(&mut store).unwrap();
        let start = store.project_meta(project).unwrap().start_node;
        assert_eq!(store.flow_node(start).unwrap().name, "Gate");

        // The speaker id resolves to the same placeholder entity the
        // character list references.
        let (halt_line, characters) = {
            let flow = store.flow_node(start).unwrap();
            (flow.event_sequence[0], flow.characters.clone())
        };
        let speaker = store.dialogue(halt_line).unwrap().speaker.unwrap();
        assert_eq!(characters, vec![speaker]);

        // Play: dialogue, then take the bribe branch to the unknown event,
        // which passes through onto the dice check.
        let mut executor = FlowExecutor::new();
        executor.tick(&mut store, start);
        trigger(&mut store, halt_line);
        executor.tick(&mut store, start);

        executor.tick(&mut store, start);
        assert_eq!(executor.choose(&mut store, 0).unwrap(), TickStatus::Advanced);
        assert_eq!(executor.current_event_index(), 2);

        // Unknown event auto-completes onto the dice check.
        assert_eq!(executor.tick(&mut store, start), TickStatus::Advanced);
        assert_eq!(executor.current_event_index(), 3);

        // Dice with no targets: success still just advances, ending the
        // scene; the project order then reaches the Courtyard.
        let courtyard = store.find_scene_by_name("Courtyard").unwrap();
        assert_eq!(
            executor.apply_dice_outcome(&mut store, true).unwrap(),
            TickStatus::SceneChanged(courtyard)
        );
        // An empty scene finishes immediately... by reporting Idle forever,
        // since there is nothing to advance past.
        assert_eq!(executor.tick(&mut store, start), TickStatus::Idle);
    }

    #[test]
    fn test_seeded_dice_rolls_are_deterministic() {
        let dice = DiceRoll {
            sides: 20,
            threshold: 11,
            on_success: Target::None,
            on_failure: Target::None,
        };

        let mut first_rng = StdRng::seed_from_u64(42);
        let mut second_rng = StdRng::seed_from_u64(42);
        for _ in 0..32 {
            let a = dice.roll(&mut first_rng);
            let b = dice.roll(&mut second_rng);
            assert_eq!(a, b);
            assert!((1..=20).contains(&a.value));
            assert_eq!(a.success, a.value >= 11);
        }
    }

    #[test]
    fn test_dice_with_invalid_sides_clamps_to_one() {
        let dice = DiceRoll {
            sides: 0,
            threshold: 1,
            on_success: Target::None,
            on_failure: Target::None,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let outcome = dice.roll(&mut rng);
        assert_eq!(outcome.value, 1);
        assert!(outcome.success);
    }

    #[test]
    fn test_export_without_active_project_fails() {
        let mut store = EntityStore::new();
        let project = store.create_root_entity();
        store
            .add_component(
                project,
                Component::ProjectMeta(ProjectMeta {
                    is_active: false,
                    ..ProjectMeta::default()
                }),
            )
            .unwrap();

        assert!(matches!(
            Script::build(&store),
            Err(ScriptError::NoActiveProject)
        ));
    }
}
