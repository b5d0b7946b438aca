use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use brewguide_core::Config;

mod bell;
mod commands;

#[derive(Parser)]
#[command(name = "brewguide-cli", version, about = "Brewguide CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a recipe into timed steps
    Compile(commands::compile::CompileArgs),
    /// Run the brew timer without waiting on the clock
    Simulate(commands::simulate::SimulateArgs),
    /// Guided brew with a live countdown
    Brew(commands::brew::BrewArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Config::load_or_default().log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Commands::Compile(args) => commands::compile::run(args).map_err(Into::into),
        Commands::Simulate(args) => commands::simulate::run(args).map_err(Into::into),
        Commands::Brew(args) => commands::brew::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
