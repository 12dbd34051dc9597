use butai::prelude::*;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{self, Write};

/// Auto-play safety net: a script whose dialogue targets loop forever would
/// otherwise never return control.
const MAX_AUTO_STEPS: usize = 10_000;

/// A standalone terminal player for exported butai scripts
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the exported script (data.json, or a binary snapshot)
    script_path: String,

    /// Seed for dice rolls; random when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write a compact binary snapshot of the script and exit
    #[arg(long)]
    snapshot_out: Option<String>,

    /// Auto-play: trigger dialogues, pick the first choice, roll immediately
    #[arg(short, long)]
    auto: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let script = load_script(&cli.script_path);

    if let Some(out_path) = cli.snapshot_out {
        script
            .save_snapshot(&out_path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to write snapshot: {}", e)));
        println!("Snapshot written to '{}'", out_path);
        return;
    }

    play(&script, cli.seed, cli.auto);
}

/// Loads either the canonical JSON form or a binary snapshot, keyed on the
/// file extension.
fn load_script(path: &str) -> Script {
    let result = if path.ends_with(".json") {
        Script::from_file(path)
    } else {
        Script::load_snapshot(path)
    };
    result.unwrap_or_else(|e| exit_with_error(&format!("Failed to load script '{}': {}", path, e)))
}

fn play(script: &Script, seed: Option<u64>, auto: bool) {
    let mut store = EntityStore::new();
    let project = script
        .instantiate(&mut store)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to instantiate script: {}", e)));
    let start = store
        .project_meta(project)
        .map(|p| p.start_node)
        .unwrap_or_default();

    let mut executor = FlowExecutor::new();
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    announce_scene(&store, start);

    let mut steps = 0;
    loop {
        steps += 1;
        if auto && steps > MAX_AUTO_STEPS {
            exit_with_error("Auto-play did not terminate; the script probably loops.");
        }

        match executor.tick(&mut store, start) {
            TickStatus::Finished => {
                println!("\n--- The story ends here. ---");
                return;
            }
            TickStatus::Idle => {
                println!("\nNothing to play.");
                return;
            }
            TickStatus::SceneChanged(scene) => announce_scene(&store, scene),
            TickStatus::Advanced => {}
            TickStatus::Waiting => drive_event(&mut store, &mut executor, &mut rng, auto),
        }
    }
}

fn announce_scene(store: &EntityStore, scene: Entity) {
    if let Some(flow) = store.flow_node(scene) {
        println!("\n=== {} ===", flow.name);
    }
}

/// Handles the event the executor is waiting on.
fn drive_event(store: &mut EntityStore, executor: &mut FlowExecutor, rng: &mut StdRng, auto: bool) {
    let event = executor.current_event(store);

    if let Some(dialogue) = store.dialogue(event) {
        let speaker = dialogue
            .speaker
            .and_then(|s| store.meta(s))
            .map(|m| m.name.clone());
        for line in &dialogue.lines {
            match &speaker {
                Some(name) if !name.is_empty() => println!("{}: {}", name, line),
                _ => println!("{}", line),
            }
        }
        if !auto && dialogue.advance_on_click {
            prompt_for_input("Press Enter to continue", None);
        }
        if let Some(dialogue) = store.dialogue_mut(event) {
            dialogue.triggered = true;
        }
        return;
    }

    if let Some(choice) = store.choice(event) {
        let len = choice.options.len();
        if len == 0 {
            // An empty choice can never resolve; skip it instead of hanging.
            if let Err(e) = executor.choose(store, 0) {
                exit_with_error(&format!("Empty choice event: {}", e));
            }
            return;
        }
        println!();
        for (index, option) in choice.options.iter().enumerate() {
            println!("  {}: {}", index + 1, option.text);
        }
        let selection = if auto {
            0
        } else {
            loop {
                let raw = prompt_for_input("Enter choice", Some("1"));
                match raw.trim().parse::<usize>() {
                    Ok(n) if n >= 1 && n <= len => break n - 1,
                    _ => println!("Invalid choice. Please enter 1..={}.", len),
                }
            }
        };
        if let Err(e) = executor.choose(store, selection) {
            exit_with_error(&format!("Choice failed: {}", e));
        }
        return;
    }

    if let Some(dice) = store.dice_roll(event).cloned() {
        println!("\nDice check: d{} against {}", dice.sides, dice.threshold);
        if !auto {
            prompt_for_input("Press Enter to roll", None);
        }
        let outcome = dice.roll(rng);
        println!(
            "Rolled {} -> {}",
            outcome.value,
            if outcome.success { "success" } else { "failure" }
        );
        if let Err(e) = executor.apply_dice_outcome(store, outcome.success) {
            exit_with_error(&format!("Dice outcome failed: {}", e));
        }
        return;
    }

    // The executor said Waiting but no event component matched; should not
    // happen, bail out rather than spin.
    exit_with_error(&format!("Event {} cannot be driven", event));
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default.map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    let _ = io::stdout().flush();

    if io::stdin().read_line(&mut line).is_err() {
        exit_with_error("Failed to read line");
    }
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
