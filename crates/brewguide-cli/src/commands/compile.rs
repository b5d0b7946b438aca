use clap::Args;
use std::path::PathBuf;

use brewguide_core::{compile, progress, Recipe};

#[derive(Args)]
pub struct CompileArgs {
    /// Recipe JSON file
    pub recipe: PathBuf,
    /// Also print total time and water
    #[arg(long)]
    pub summary: bool,
}

pub fn run(args: CompileArgs) -> brewguide_core::Result<()> {
    let recipe = Recipe::load(&args.recipe)?;
    let steps = compile(&recipe);

    if args.summary {
        let summary = serde_json::json!({
            "steps": steps,
            "totalTime": progress::total_time(&steps),
            "totalWater": progress::target_water(&steps),
            "checkpoints": progress::checkpoints(&steps),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&steps)?);
    }
    Ok(())
}
