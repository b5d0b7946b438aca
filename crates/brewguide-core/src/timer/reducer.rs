//! Pure transition function of the countdown engine.
//!
//! `reduce(steps, state, input)` returns the next state plus the cues and the
//! outcome the owner should act on. Nothing here touches audio or clocks, so
//! the whole state machine can be exercised tick by tick in tests.
//!
//! ```text
//! Idle --start--> Running --(last step runs out)--> Overtime --finish--> Complete
//!                  |  ^
//!            pause |  | start
//!                  v  |
//!                 Paused
//! ```

use crate::compiler::TimedStep;
use crate::cue::Cue;

use super::state::EngineState;

/// Remaining seconds (checked before the decrement) that trigger a tick cue.
const TICK_CUE_FROM: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Start,
    Pause,
    Reset,
    Finish,
    /// One wall-clock second elapsed while running.
    Tick,
}

/// What a transition did, for the owner to turn into events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Started { step_index: usize },
    Resumed,
    Paused,
    Reset,
    Advanced { from: usize, to: usize },
    OvertimeStarted { step_index: usize },
    /// Start found nothing left to time and completed on its own.
    NothingToTime { step_index: usize },
    /// The user confirmed finish on the last step.
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: EngineState,
    pub cues: Vec<Cue>,
    /// First start of a brew; the audio output should be primed.
    pub unlock_audio: bool,
    pub outcome: Option<Outcome>,
}

impl Transition {
    fn unchanged(state: EngineState) -> Self {
        Self {
            state,
            cues: Vec::new(),
            unlock_audio: false,
            outcome: None,
        }
    }
}

/// First index at or after `from` whose step has a positive duration,
/// otherwise the last index. `None` only for an empty step list.
///
/// A `from` past the end also resolves to the last index.
pub fn find_next_active_step(steps: &[TimedStep], from: usize) -> Option<usize> {
    let last = steps.len().checked_sub(1)?;
    Some(
        steps
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, step)| step.is_timed())
            .map(|(i, _)| i)
            .unwrap_or(last),
    )
}

/// `index` is the terminal step, or the one before a zero-duration terminal.
pub fn is_last_step_index(steps: &[TimedStep], index: usize) -> bool {
    let Some(last) = steps.len().checked_sub(1) else {
        return false;
    };
    index == last || (index + 1 == last && !steps[last].is_timed())
}

pub fn reduce(steps: &[TimedStep], state: EngineState, input: Input) -> Transition {
    if steps.is_empty() {
        return Transition::unchanged(state);
    }
    match input {
        Input::Start => start(steps, state),
        Input::Pause => pause(state),
        Input::Reset => Transition {
            state: EngineState::initial(steps),
            cues: Vec::new(),
            unlock_audio: false,
            outcome: Some(Outcome::Reset),
        },
        Input::Finish => finish(state),
        Input::Tick => tick(steps, state),
    }
}

fn start(steps: &[TimedStep], state: EngineState) -> Transition {
    if state.is_running || state.is_complete {
        return Transition::unchanged(state);
    }

    let unlock_audio = state.current_step_index == 0 && state.total_elapsed_time == 0;
    let mut next = state;
    let index = state.current_step_index;

    let outcome = if state.time_remaining > 0 || state.in_overtime() {
        next.is_running = true;
        if state.has_started() {
            Outcome::Resumed
        } else {
            next.is_last_step = is_last_step_index(steps, index);
            Outcome::Started { step_index: index }
        }
    } else {
        let target = find_next_active_step(steps, index).unwrap_or(index);
        next.current_step_index = target;
        if !steps[target].is_timed() {
            // Straight to Complete, no finish confirmation involved.
            next.is_running = false;
            next.is_complete = true;
            next.is_last_step = true;
            next.time_remaining = 0;
            Outcome::NothingToTime { step_index: target }
        } else {
            next.is_running = true;
            next.time_remaining = steps[target].duration;
            next.is_last_step = is_last_step_index(steps, target);
            Outcome::Started { step_index: target }
        }
    };

    Transition {
        state: next,
        cues: vec![Cue::Chime],
        unlock_audio,
        outcome: Some(outcome),
    }
}

fn pause(state: EngineState) -> Transition {
    if !state.is_running {
        return Transition::unchanged(state);
    }
    Transition {
        state: EngineState {
            is_running: false,
            ..state
        },
        cues: Vec::new(),
        unlock_audio: false,
        outcome: Some(Outcome::Paused),
    }
}

fn finish(state: EngineState) -> Transition {
    if state.is_complete || !state.is_last_step {
        return Transition::unchanged(state);
    }
    Transition {
        state: EngineState {
            is_running: false,
            is_complete: true,
            ..state
        },
        cues: Vec::new(),
        unlock_audio: false,
        outcome: Some(Outcome::Finished),
    }
}

fn tick(steps: &[TimedStep], state: EngineState) -> Transition {
    if !state.is_running || state.is_complete {
        return Transition::unchanged(state);
    }

    let mut next = state;
    next.total_elapsed_time += 1;

    if next.is_last_step && next.time_remaining == 0 {
        next.overtime_seconds += 1;
        return Transition::unchanged(next);
    }
    if next.time_remaining == 0 {
        return Transition::unchanged(next);
    }

    let prev = next.time_remaining;
    let mut cues = Vec::new();
    let mut outcome = None;

    if prev <= 1 {
        cues.push(Cue::Chime);
        let from = next.current_step_index;
        let last = steps.len() - 1;

        if from < last {
            let target = find_next_active_step(steps, from + 1).unwrap_or(last);
            next.current_step_index = target;
            next.is_last_step = is_last_step_index(steps, target);
            if !steps[target].is_timed() {
                next.is_last_step = true;
                next.time_remaining = 0;
                outcome = Some(Outcome::OvertimeStarted { step_index: target });
            } else {
                next.time_remaining = steps[target].duration;
                outcome = Some(Outcome::Advanced { from, to: target });
            }
        } else {
            next.is_last_step = true;
            next.time_remaining = 0;
            outcome = Some(Outcome::OvertimeStarted { step_index: from });
        }
    } else {
        if prev <= TICK_CUE_FROM {
            cues.push(Cue::Tick);
        }
        next.time_remaining = prev - 1;
    }

    Transition {
        state: next,
        cues,
        unlock_audio: false,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(duration: u32) -> TimedStep {
        TimedStep {
            title: format!("{duration}s"),
            duration,
            description: String::new(),
            water_amount: None,
            flow_rate: None,
        }
    }

    fn steps(durations: &[u32]) -> Vec<TimedStep> {
        durations.iter().copied().map(step).collect()
    }

    fn run(steps: &[TimedStep], mut state: EngineState, inputs: &[Input]) -> EngineState {
        for input in inputs {
            state = reduce(steps, state, *input).state;
        }
        state
    }

    #[test]
    fn find_next_active_skips_zero_steps() {
        let s = steps(&[0, 0, 5, 0, 7, 0]);
        assert_eq!(find_next_active_step(&s, 0), Some(2));
        assert_eq!(find_next_active_step(&s, 3), Some(4));
        assert_eq!(find_next_active_step(&s, 5), Some(5));
        assert_eq!(find_next_active_step(&s, 99), Some(5));
        assert_eq!(find_next_active_step(&[], 0), None);
    }

    #[test]
    fn last_step_predicate() {
        let s = steps(&[0, 10, 20, 0]);
        assert!(!is_last_step_index(&s, 1));
        assert!(is_last_step_index(&s, 2));
        assert!(is_last_step_index(&s, 3));

        let timed_tail = steps(&[0, 10, 20]);
        assert!(!is_last_step_index(&timed_tail, 1));
        assert!(is_last_step_index(&timed_tail, 2));
    }

    #[test]
    fn start_skips_preparation() {
        let s = steps(&[0, 10, 20, 0]);
        let t = reduce(&s, EngineState::initial(&s), Input::Start);
        assert!(t.unlock_audio);
        assert_eq!(t.cues, vec![Cue::Chime]);
        assert_eq!(t.outcome, Some(Outcome::Started { step_index: 1 }));
        assert_eq!(t.state.current_step_index, 1);
        assert_eq!(t.state.time_remaining, 10);
        assert!(t.state.is_running);
        assert!(!t.state.is_last_step);
    }

    #[test]
    fn start_without_timed_steps_completes() {
        let s = steps(&[0, 0]);
        let t = reduce(&s, EngineState::initial(&s), Input::Start);
        assert_eq!(t.outcome, Some(Outcome::NothingToTime { step_index: 1 }));
        assert!(t.state.is_complete);
        assert!(!t.state.is_running);
        assert_eq!(t.state.current_step_index, 1);
        assert_eq!(t.cues, vec![Cue::Chime]);
    }

    #[test]
    fn tick_cues_in_final_seconds() {
        let s = steps(&[0, 8, 0]);
        let mut state = run(&s, EngineState::initial(&s), &[Input::Start]);
        let mut cues = Vec::new();
        for _ in 0..8 {
            let t = reduce(&s, state, Input::Tick);
            cues.push(t.cues);
            state = t.state;
        }
        // prev = 8, 7: silent; 6..=2: tick; 1: chime
        assert!(cues[0].is_empty());
        assert!(cues[1].is_empty());
        for c in &cues[2..7] {
            assert_eq!(c, &vec![Cue::Tick]);
        }
        assert_eq!(cues[7], vec![Cue::Chime]);
        assert_eq!(state.total_elapsed_time, 8);
    }

    #[test]
    fn advances_to_next_timed_step() {
        let s = steps(&[0, 2, 0, 3, 0]);
        let state = run(&s, EngineState::initial(&s), &[Input::Start, Input::Tick]);
        assert_eq!(state.time_remaining, 1);
        let t = reduce(&s, state, Input::Tick);
        assert_eq!(t.outcome, Some(Outcome::Advanced { from: 1, to: 3 }));
        assert_eq!(t.state.current_step_index, 3);
        assert_eq!(t.state.time_remaining, 3);
        assert!(t.state.is_last_step);
    }

    #[test]
    fn last_step_runs_into_overtime() {
        let s = steps(&[0, 2, 0]);
        let state = run(&s, EngineState::initial(&s), &[Input::Start, Input::Tick]);
        let t = reduce(&s, state, Input::Tick);
        assert_eq!(t.outcome, Some(Outcome::OvertimeStarted { step_index: 2 }));
        assert!(t.state.is_last_step);
        assert_eq!(t.state.time_remaining, 0);

        let after = run(&s, t.state, &[Input::Tick, Input::Tick, Input::Tick]);
        assert_eq!(after.overtime_seconds, 3);
        assert_eq!(after.current_step_index, 2);
        assert_eq!(after.total_elapsed_time, 5);
    }

    #[test]
    fn timed_terminal_step_enters_overtime_in_place() {
        let s = steps(&[0, 1]);
        let state = run(&s, EngineState::initial(&s), &[Input::Start]);
        assert!(state.is_last_step);
        let t = reduce(&s, state, Input::Tick);
        assert_eq!(t.outcome, Some(Outcome::OvertimeStarted { step_index: 1 }));
        assert_eq!(t.state.current_step_index, 1);
        assert_eq!(t.state.time_remaining, 0);
    }

    #[test]
    fn pause_and_resume_keep_position() {
        let s = steps(&[0, 30, 0]);
        let running = run(&s, EngineState::initial(&s), &[Input::Start, Input::Tick, Input::Tick]);
        let paused = reduce(&s, running, Input::Pause);
        assert_eq!(paused.outcome, Some(Outcome::Paused));
        assert!(!paused.state.is_running);

        // ticks while paused are ignored
        let idle_tick = reduce(&s, paused.state, Input::Tick);
        assert_eq!(idle_tick.state, paused.state);

        let resumed = reduce(&s, paused.state, Input::Start);
        assert_eq!(resumed.outcome, Some(Outcome::Resumed));
        assert!(!resumed.unlock_audio);
        assert_eq!(resumed.state.time_remaining, running.time_remaining);
        assert_eq!(resumed.state.current_step_index, running.current_step_index);
    }

    #[test]
    fn resume_in_overtime_keeps_counting() {
        let s = steps(&[0, 1, 0]);
        let over = run(&s, EngineState::initial(&s), &[Input::Start, Input::Tick, Input::Tick]);
        assert_eq!(over.overtime_seconds, 1);
        let resumed = run(&s, over, &[Input::Pause, Input::Start, Input::Tick]);
        assert!(!resumed.is_complete);
        assert_eq!(resumed.overtime_seconds, 2);
        assert_eq!(resumed.current_step_index, 2);
    }

    #[test]
    fn finish_requires_last_step() {
        let s = steps(&[0, 10, 10, 0]);
        let early = run(&s, EngineState::initial(&s), &[Input::Start, Input::Finish]);
        assert!(!early.is_complete);

        let mut state = early;
        for _ in 0..10 {
            state = reduce(&s, state, Input::Tick).state;
        }
        assert!(state.is_last_step);
        let t = reduce(&s, state, Input::Finish);
        assert_eq!(t.outcome, Some(Outcome::Finished));
        assert!(t.state.is_complete);
        assert!(!t.state.is_running);

        // finished brews ignore further input except reset
        assert_eq!(reduce(&s, t.state, Input::Start).outcome, None);
        assert_eq!(reduce(&s, t.state, Input::Tick).state, t.state);
    }

    #[test]
    fn reset_restores_initial_state() {
        let s = steps(&[0, 1, 0]);
        let messy = run(
            &s,
            EngineState::initial(&s),
            &[Input::Start, Input::Tick, Input::Tick, Input::Tick, Input::Finish],
        );
        let t = reduce(&s, messy, Input::Reset);
        assert_eq!(t.state, EngineState::initial(&s));
        assert_eq!(t.outcome, Some(Outcome::Reset));
    }

    #[test]
    fn empty_steps_ignore_everything() {
        let state = EngineState::default();
        for input in [Input::Start, Input::Tick, Input::Pause, Input::Finish, Input::Reset] {
            let t = reduce(&[], state, input);
            assert_eq!(t.state, state);
            assert!(t.outcome.is_none());
        }
    }
}
