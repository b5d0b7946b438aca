//! Display values derived from the steps and the engine state.
//!
//! Everything here is a pure function; nothing mutates the engine.

use serde::{Deserialize, Serialize};

use crate::compiler::TimedStep;
use crate::recipe::format_clock;
use crate::timer::EngineState;

/// A marker along the overall progress bar where a step begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub step_index: usize,
    pub title: String,
    /// Seconds from brew start.
    pub offset_secs: u64,
    pub percent: f64,
}

/// Live water figures for the current step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterProgress {
    /// Grams poured in all earlier steps.
    pub previous_water: f64,
    /// Grams poured so far in the current step.
    pub step_water: f64,
    pub flow_rate: Option<f64>,
    /// Rounded running total shown to the user.
    pub current_grams: u64,
    /// Running total the current step should end on.
    pub target_grams: f64,
}

/// Everything the presentation layer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub total_time: u64,
    pub progress_pct: f64,
    pub elapsed: String,
    pub remaining: String,
    pub overtime: String,
    pub water: WaterProgress,
    pub total_water: f64,
    pub checkpoints: Vec<Checkpoint>,
}

pub fn total_time(steps: &[TimedStep]) -> u64 {
    steps.iter().map(|s| u64::from(s.duration)).sum()
}

pub fn target_water(steps: &[TimedStep]) -> f64 {
    steps.iter().filter_map(|s| s.water_amount).sum()
}

pub fn progress_percentage(steps: &[TimedStep], state: &EngineState) -> f64 {
    let total = total_time(steps);
    if total == 0 {
        return 0.0;
    }
    (state.total_elapsed_time as f64 / total as f64 * 100.0).min(100.0)
}

/// Start offsets of every step after the first, skipping those that sit at
/// 0% or 100% of the brew.
pub fn checkpoints(steps: &[TimedStep]) -> Vec<Checkpoint> {
    let total = total_time(steps);
    if total == 0 {
        return Vec::new();
    }

    let mut offset = 0u64;
    let mut marks = Vec::new();
    for (i, pair) in steps.windows(2).enumerate() {
        offset += u64::from(pair[0].duration);
        let percent = offset as f64 / total as f64 * 100.0;
        if percent > 0.0 && percent < 100.0 {
            marks.push(Checkpoint {
                step_index: i + 1,
                title: pair[1].title.clone(),
                offset_secs: offset,
                percent,
            });
        }
    }
    marks
}

pub fn live_water(steps: &[TimedStep], state: &EngineState) -> WaterProgress {
    let index = state.current_step_index.min(steps.len());
    let previous_water: f64 = steps[..index].iter().filter_map(|s| s.water_amount).sum();

    let Some(step) = steps.get(index) else {
        return WaterProgress {
            previous_water,
            step_water: 0.0,
            flow_rate: None,
            current_grams: previous_water.round().max(0.0) as u64,
            target_grams: previous_water,
        };
    };

    let step_elapsed = step.duration.saturating_sub(state.time_remaining);
    let flow_rate = step.effective_flow_rate();
    let step_water = match (step.water_amount, flow_rate) {
        (Some(water), Some(rate)) => (f64::from(step_elapsed) * rate).min(water),
        _ => 0.0,
    };

    WaterProgress {
        previous_water,
        step_water,
        flow_rate,
        current_grams: (previous_water + step_water).round().max(0.0) as u64,
        target_grams: previous_water + step.water_amount.unwrap_or(0.0),
    }
}

pub fn project(steps: &[TimedStep], state: &EngineState) -> Projection {
    Projection {
        total_time: total_time(steps),
        progress_pct: progress_percentage(steps, state),
        elapsed: format_clock(state.total_elapsed_time),
        remaining: format_clock(u64::from(state.time_remaining)),
        overtime: format_clock(state.overtime_seconds),
        water: live_water(steps, state),
        total_water: target_water(steps),
        checkpoints: checkpoints(steps),
    }
}
