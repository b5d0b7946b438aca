use clap::Args;
use std::path::PathBuf;

use brewguide_core::{BrewTimer, Recipe, RecordingCues};

#[derive(Args)]
pub struct SimulateArgs {
    /// Recipe JSON file
    pub recipe: PathBuf,
    /// Seconds to run after starting
    #[arg(long, default_value = "0")]
    pub ticks: u64,
    /// Pause at the end
    #[arg(long)]
    pub pause: bool,
    /// Confirm finish at the end (only honored on the last step)
    #[arg(long)]
    pub finish: bool,
}

/// Runs the engine without waiting on the wall clock and prints what happened.
pub fn run(args: SimulateArgs) -> brewguide_core::Result<()> {
    let recipe = Recipe::load(&args.recipe)?;
    let mut timer = BrewTimer::from_recipe(&recipe, RecordingCues::default());

    let mut events = Vec::new();
    events.extend(timer.start());
    for _ in 0..args.ticks {
        if !timer.is_running() {
            break;
        }
        events.extend(timer.tick());
    }
    if args.pause {
        events.extend(timer.pause());
    }
    if args.finish {
        events.extend(timer.finish());
    }

    let report = serde_json::json!({
        "events": events,
        "cues": timer.cues().played,
        "snapshot": timer.snapshot(),
        "projection": timer.projection(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
