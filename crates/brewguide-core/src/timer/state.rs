use serde::{Deserialize, Serialize};

use crate::compiler::TimedStep;

/// Coarse lifecycle view derived from [`EngineState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Never started since creation or the last reset.
    Idle,
    Running,
    Paused,
    /// Every timed step has run out; the timer counts up.
    Overtime,
    /// User confirmed finish.
    Complete,
}

/// Counters owned by the countdown engine.
///
/// All times are whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineState {
    pub current_step_index: usize,
    pub time_remaining: u32,
    pub is_running: bool,
    pub is_complete: bool,
    pub is_last_step: bool,
    pub overtime_seconds: u64,
    pub total_elapsed_time: u64,
}

impl EngineState {
    /// Fresh state for a compiled step list.
    pub fn initial(steps: &[TimedStep]) -> Self {
        Self {
            time_remaining: steps.first().map(|s| s.duration).unwrap_or(0),
            ..Self::default()
        }
    }

    /// The final active step has run out and ticks now count overtime.
    pub fn in_overtime(&self) -> bool {
        self.is_last_step && self.time_remaining == 0
    }

    pub fn has_started(&self) -> bool {
        self.current_step_index > 0 || self.total_elapsed_time > 0
    }

    pub fn phase(&self) -> Phase {
        if self.is_complete {
            Phase::Complete
        } else if self.in_overtime() && self.is_running {
            Phase::Overtime
        } else if self.is_running {
            Phase::Running
        } else if self.has_started() {
            Phase::Paused
        } else {
            Phase::Idle
        }
    }
}
