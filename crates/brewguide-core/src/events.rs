use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timer::{EngineState, Phase};

/// Every state change of the brew timer produces an Event.
/// The presentation layer renders them; the surrounding app listens for
/// `BrewFinished` to navigate away or store history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    BrewStarted {
        step_index: usize,
        step_title: String,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    BrewResumed {
        step_index: usize,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    BrewPaused {
        step_index: usize,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    BrewReset {
        at: DateTime<Utc>,
    },
    StepAdvanced {
        from_step: usize,
        to_step: usize,
        step_title: String,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    /// The final timed step ran out; the timer now counts up.
    OvertimeStarted {
        step_index: usize,
        at: DateTime<Utc>,
    },
    /// Started with no timed step left; complete without a confirmed finish.
    BrewSkipped {
        step_index: usize,
        at: DateTime<Utc>,
    },
    BrewFinished {
        completion: BrewCompletion,
    },
    StateSnapshot {
        phase: Phase,
        state: EngineState,
        step_title: String,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
}

/// Payload handed to the completion callback when the user confirms finish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrewCompletion {
    pub brew_id: Uuid,
    #[serde(default)]
    pub recipe_name: Option<String>,
    /// Recorded brew duration as `m:ss`.
    #[serde(default)]
    pub brew_time: Option<String>,
    pub total_elapsed_secs: u64,
    pub overtime_secs: u64,
    pub finished_at: DateTime<Utc>,
}
