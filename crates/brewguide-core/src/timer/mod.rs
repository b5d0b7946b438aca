mod driver;
mod engine;
mod reducer;
mod state;

pub use driver::{TickSource, TICK_PERIOD};
pub use engine::BrewTimer;
pub use reducer::{find_next_active_step, is_last_step_index, reduce, Input, Outcome, Transition};
pub use state::{EngineState, Phase};
