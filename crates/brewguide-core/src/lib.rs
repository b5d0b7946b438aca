//! # Brewguide Core Library
//!
//! Core logic of the Brewguide coffee-brewing companion: it turns a recipe
//! into timed steps and walks the user through them with a countdown,
//! audible cues and live water figures. The CLI binary is a thin shell over
//! this crate.
//!
//! ## Architecture
//!
//! - **Step compiler**: recipe (structured steps, free text or nothing) to a
//!   normalized list of [`TimedStep`]s framed by Preparation and Complete
//! - **Timer engine**: a pure reducer plus the [`BrewTimer`] owner; the caller
//!   drives `tick()` once per second, typically through a [`TickSource`]
//! - **Cues**: tick and chime tones behind the [`CueSink`] seam
//! - **Progress**: pure projections (percent, checkpoints, water poured)
//! - **Storage**: TOML configuration

pub mod compiler;
pub mod cue;
pub mod error;
pub mod events;
pub mod progress;
pub mod recipe;
pub mod storage;
pub mod timer;

pub use compiler::{compile, TimedStep};
pub use cue::{Cue, CuePlayer, CueSettings, CueSink, RecordingCues, SilentCues};
pub use error::{ConfigError, CoreError, CueError, RecipeError, Result};
pub use events::{BrewCompletion, Event};
pub use progress::{Checkpoint, Projection, WaterProgress};
pub use recipe::{format_clock, parse_brew_time, ProcessStep, Recipe};
pub use storage::Config;
pub use timer::{BrewTimer, EngineState, Phase, TickSource};
