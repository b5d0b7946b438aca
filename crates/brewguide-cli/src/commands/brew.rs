use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use brewguide_core::{
    BrewTimer, Config, CuePlayer, CueSink, Event, Phase, Recipe, SilentCues, TickSource,
};

use crate::bell::TerminalBell;

#[derive(Args)]
pub struct BrewArgs {
    /// Recipe JSON file
    pub recipe: PathBuf,
    /// Do not ring the terminal bell
    #[arg(long)]
    pub silent: bool,
}

const HELP: &str = "commands: [enter]/p pause-resume, r reset, f finish, q quit";

pub fn run(args: BrewArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let recipe = Recipe::load(&args.recipe)?;
    let period = config.tick_period();

    // stdin is read on the blocking pool, so only the time driver is needed
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    let result = if args.silent {
        runtime.block_on(guided_brew(timer_for(&recipe, SilentCues), period))
    } else {
        let player = CuePlayer::new(TerminalBell, config.cue_settings());
        runtime.block_on(guided_brew(timer_for(&recipe, player), period))
    };
    // a pending stdin read cannot be cancelled; do not wait for it
    runtime.shutdown_background();
    result
}

fn timer_for<C: CueSink>(recipe: &Recipe, cues: C) -> BrewTimer<C> {
    BrewTimer::from_recipe(recipe, cues).with_completion_handler(|completion| {
        eprintln!(
            "\nbrew complete in {}",
            completion.brew_time.as_deref().unwrap_or("?")
        );
    })
}

async fn guided_brew<C: CueSink>(
    mut timer: BrewTimer<C>,
    period: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut source = TickSource::new(period);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    if let Some(prep) = timer.current_step() {
        eprintln!("{}: {}", prep.title, prep.description);
    }
    eprintln!("{HELP}");
    tracing::info!(
        steps = timer.steps().len(),
        period_ms = source.period().as_millis() as u64,
        "guided brew started"
    );
    emit(timer.start())?;
    source.sync(timer.is_running());

    while timer.phase() != Phase::Complete {
        tokio::select! {
            _ = source.tick() => {
                emit(timer.tick())?;
                status(&timer);
                if !stdin_open && timer.phase() == Phase::Overtime {
                    // nobody left to confirm
                    emit(timer.finish())?;
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    None => {
                        stdin_open = false;
                        if !timer.is_running() {
                            // stopped with no way left to resume
                            tracing::info!(phase = ?timer.phase(), "input closed, leaving brew");
                            break;
                        }
                    }
                    Some(cmd) => match cmd.trim() {
                        "" | "p" => {
                            let event = if timer.is_running() { timer.pause() } else { timer.start() };
                            emit(event)?;
                        }
                        "r" => emit(timer.reset())?,
                        "f" => {
                            if timer.state().is_last_step {
                                emit(timer.finish())?;
                            } else {
                                eprintln!("finish is available on the last step");
                            }
                        }
                        "q" => break,
                        other => eprintln!("unknown command '{other}'; {HELP}"),
                    },
                }
            }
        }
        source.sync(timer.is_running());
    }

    source.disarm();
    Ok(())
}

fn emit(event: Option<Event>) -> Result<(), serde_json::Error> {
    if let Some(event) = event {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}

fn status<C: CueSink>(timer: &BrewTimer<C>) {
    let projection = timer.projection();
    let title = timer.current_step().map(|s| s.title.as_str()).unwrap_or("");
    if timer.phase() == Phase::Overtime {
        eprint!(
            "\r{title} | overtime +{} | {}g poured     ",
            projection.overtime, projection.water.current_grams
        );
    } else {
        eprint!(
            "\r{title} | {} left | {:>5.1}% | {}g / {}g     ",
            projection.remaining,
            projection.progress_pct,
            projection.water.current_grams,
            projection.water.target_grams.round()
        );
    }
}
