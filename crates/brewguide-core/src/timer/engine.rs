//! Brew timer engine.
//!
//! `BrewTimer` owns the compiled steps, the [`EngineState`] and a cue sink.
//! It does not use internal threads or clocks: an external driver calls
//! `tick()` once per second while the timer is running (see
//! [`TickSource`](super::TickSource)). Every command runs the pure reducer,
//! plays the resulting cues and turns the outcome into an [`Event`].
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = BrewTimer::from_recipe(&recipe, SilentCues);
//! timer.start();
//! // once per second while timer.is_running():
//! timer.tick(); // Some(Event::StepAdvanced { .. }) at step boundaries
//! ```

use chrono::Utc;
use std::fmt;
use uuid::Uuid;

use super::reducer::{self, Input, Outcome};
use super::state::{EngineState, Phase};
use crate::compiler::{self, TimedStep};
use crate::cue::CueSink;
use crate::events::{BrewCompletion, Event};
use crate::progress::{self, Projection};
use crate::recipe::{format_clock, Recipe};

type CompletionHandler = Box<dyn FnMut(&BrewCompletion) + Send>;

pub struct BrewTimer<C: CueSink> {
    recipe_name: Option<String>,
    steps: Vec<TimedStep>,
    state: EngineState,
    cues: C,
    brew_id: Uuid,
    on_complete: Option<CompletionHandler>,
}

impl<C: CueSink> BrewTimer<C> {
    /// Create a timer over already compiled steps, idle at step 0.
    pub fn new(steps: Vec<TimedStep>, cues: C) -> Self {
        let state = EngineState::initial(&steps);
        Self {
            recipe_name: None,
            steps,
            state,
            cues,
            brew_id: Uuid::new_v4(),
            on_complete: None,
        }
    }

    pub fn from_recipe(recipe: &Recipe, cues: C) -> Self {
        let mut timer = Self::new(compiler::compile(recipe), cues);
        timer.recipe_name = recipe.name.clone();
        timer
    }

    /// Register the callback invoked when a brew finishes.
    pub fn with_completion_handler<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&BrewCompletion) + Send + 'static,
    {
        self.on_complete = Some(Box::new(handler));
        self
    }

    /// Swap in a new recipe. Counters start over; the cue sink is kept.
    pub fn load_recipe(&mut self, recipe: &Recipe) {
        self.recipe_name = recipe.name.clone();
        self.steps = compiler::compile(recipe);
        self.state = EngineState::initial(&self.steps);
        self.brew_id = Uuid::new_v4();
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn steps(&self) -> &[TimedStep] {
        &self.steps
    }

    pub fn current_step(&self) -> Option<&TimedStep> {
        self.steps.get(self.state.current_step_index)
    }

    pub fn cues(&self) -> &C {
        &self.cues
    }

    pub fn cues_mut(&mut self) -> &mut C {
        &mut self.cues
    }

    pub fn projection(&self) -> Projection {
        progress::project(&self.steps, &self.state)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase(),
            state: self.state,
            step_title: self
                .current_step()
                .map(|s| s.title.clone())
                .unwrap_or_default(),
            progress_pct: progress::progress_percentage(&self.steps, &self.state),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume. With no timed step left the timer completes at once
    /// and emits `BrewSkipped`; the completion handler is reserved for
    /// [`finish`](Self::finish).
    pub fn start(&mut self) -> Option<Event> {
        self.apply(Input::Start)
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.apply(Input::Pause)
    }

    pub fn reset(&mut self) -> Option<Event> {
        let event = self.apply(Input::Reset);
        if event.is_some() {
            self.brew_id = Uuid::new_v4();
        }
        event
    }

    /// User confirmation on the last step. Invokes the completion handler.
    pub fn finish(&mut self) -> Option<Event> {
        self.apply(Input::Finish)
    }

    /// Advance one second. Call only while running; ignored otherwise.
    pub fn tick(&mut self) -> Option<Event> {
        self.apply(Input::Tick)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply(&mut self, input: Input) -> Option<Event> {
        let transition = reducer::reduce(&self.steps, self.state, input);

        if transition.unlock_audio {
            self.cues.unlock();
        }
        for cue in &transition.cues {
            self.cues.play(*cue);
        }
        self.state = transition.state;

        let outcome = transition.outcome?;
        tracing::debug!(?input, ?outcome, step = self.state.current_step_index, "brew transition");
        Some(self.event_for(outcome))
    }

    fn event_for(&mut self, outcome: Outcome) -> Event {
        let at = Utc::now();
        match outcome {
            Outcome::Started { step_index } => {
                let step = &self.steps[step_index];
                Event::BrewStarted {
                    step_index,
                    step_title: step.title.clone(),
                    duration_secs: step.duration,
                    at,
                }
            }
            Outcome::Resumed => Event::BrewResumed {
                step_index: self.state.current_step_index,
                remaining_secs: self.state.time_remaining,
                at,
            },
            Outcome::Paused => Event::BrewPaused {
                step_index: self.state.current_step_index,
                remaining_secs: self.state.time_remaining,
                at,
            },
            Outcome::Reset => Event::BrewReset { at },
            Outcome::Advanced { from, to } => {
                let step = &self.steps[to];
                Event::StepAdvanced {
                    from_step: from,
                    to_step: to,
                    step_title: step.title.clone(),
                    duration_secs: step.duration,
                    at,
                }
            }
            Outcome::OvertimeStarted { step_index } => Event::OvertimeStarted { step_index, at },
            Outcome::NothingToTime { step_index } => {
                tracing::info!(step_index, "nothing to time, brew complete");
                Event::BrewSkipped { step_index, at }
            }
            Outcome::Finished => {
                let completion = BrewCompletion {
                    brew_id: self.brew_id,
                    recipe_name: self.recipe_name.clone(),
                    brew_time: Some(format_clock(self.state.total_elapsed_time)),
                    total_elapsed_secs: self.state.total_elapsed_time,
                    overtime_secs: self.state.overtime_seconds,
                    finished_at: at,
                };
                tracing::info!(
                    brew_time = completion.brew_time.as_deref().unwrap_or_default(),
                    overtime = completion.overtime_secs,
                    "brew finished"
                );
                if let Some(handler) = self.on_complete.as_mut() {
                    handler(&completion);
                }
                Event::BrewFinished { completion }
            }
        }
    }
}

impl<C: CueSink + fmt::Debug> fmt::Debug for BrewTimer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrewTimer")
            .field("recipe_name", &self.recipe_name)
            .field("steps", &self.steps.len())
            .field("state", &self.state)
            .field("cues", &self.cues)
            .field("brew_id", &self.brew_id)
            .field("has_completion_handler", &self.on_complete.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::{Cue, RecordingCues};
    use crate::recipe::ProcessStep;
    use std::sync::{Arc, Mutex};

    fn pour_over() -> Recipe {
        Recipe {
            name: Some("Morning V60".into()),
            dose: 15.0,
            water: 150.0,
            temperature: 94.0,
            brew_time: "3:00".into(),
            process_steps: Some(vec![
                ProcessStep {
                    description: "Bloom".into(),
                    duration: 30,
                    water_amount: Some(50.0),
                    flow_rate: None,
                },
                ProcessStep {
                    description: "Pour".into(),
                    duration: 90,
                    water_amount: Some(100.0),
                    flow_rate: None,
                },
            ]),
            ..Recipe::default()
        }
    }

    fn ticks(timer: &mut BrewTimer<RecordingCues>, n: usize) -> Vec<Event> {
        (0..n).filter_map(|_| timer.tick()).collect()
    }

    #[test]
    fn start_pause_resume() {
        let mut timer = BrewTimer::from_recipe(&pour_over(), RecordingCues::default());
        assert_eq!(timer.phase(), Phase::Idle);

        match timer.start() {
            Some(Event::BrewStarted { step_index, duration_secs, .. }) => {
                assert_eq!(step_index, 1);
                assert_eq!(duration_secs, 30);
            }
            other => panic!("expected BrewStarted, got {other:?}"),
        }
        assert_eq!(timer.phase(), Phase::Running);
        assert_eq!(timer.cues().unlocks, 1);
        assert_eq!(timer.cues().played, vec![Cue::Chime]);

        assert!(timer.start().is_none(), "already running");
        assert!(matches!(timer.pause(), Some(Event::BrewPaused { .. })));
        assert_eq!(timer.phase(), Phase::Paused);
        assert!(matches!(timer.start(), Some(Event::BrewResumed { .. })));
        assert_eq!(timer.cues().unlocks, 1);
    }

    #[test]
    fn full_brew_reaches_overtime_then_finishes() {
        let completions = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&completions);
        let mut timer = BrewTimer::from_recipe(&pour_over(), RecordingCues::default())
            .with_completion_handler(move |c| sink.lock().unwrap().push(c.clone()));

        timer.start();
        let events = ticks(&mut timer, 180);
        let advanced: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                Event::StepAdvanced { to_step, .. } => Some(*to_step),
                _ => None,
            })
            .collect();
        assert_eq!(advanced, vec![2, 3]);
        assert!(matches!(events.last(), Some(Event::OvertimeStarted { step_index: 4, .. })));
        assert_eq!(timer.phase(), Phase::Overtime);

        ticks(&mut timer, 5);
        assert_eq!(timer.state().overtime_seconds, 5);
        assert_eq!(timer.state().current_step_index, 4);

        match timer.finish() {
            Some(Event::BrewFinished { completion }) => {
                assert_eq!(completion.brew_time.as_deref(), Some("3:05"));
                assert_eq!(completion.overtime_secs, 5);
                assert_eq!(completion.recipe_name.as_deref(), Some("Morning V60"));
            }
            other => panic!("expected BrewFinished, got {other:?}"),
        }
        assert_eq!(timer.phase(), Phase::Complete);
        assert_eq!(completions.lock().unwrap().len(), 1);
    }

    #[test]
    fn chimes_at_each_boundary() {
        let mut timer = BrewTimer::from_recipe(&pour_over(), RecordingCues::default());
        timer.start();
        timer.cues_mut().take();
        ticks(&mut timer, 180);
        let played = timer.cues_mut().take();
        let chimes = played.iter().filter(|c| **c == Cue::Chime).count();
        let clicks = played.iter().filter(|c| **c == Cue::Tick).count();
        assert_eq!(chimes, 3);
        assert_eq!(clicks, 15);
    }

    #[test]
    fn reset_starts_a_new_brew() {
        let mut timer = BrewTimer::from_recipe(&pour_over(), RecordingCues::default());
        timer.start();
        ticks(&mut timer, 45);
        assert!(matches!(timer.reset(), Some(Event::BrewReset { .. })));
        let state = timer.state();
        assert_eq!(state, EngineState::initial(timer.steps()));
        assert!(!timer.is_running());

        // a fresh start after reset primes audio again
        timer.start();
        assert_eq!(timer.cues().unlocks, 2);
    }

    #[test]
    fn load_recipe_replaces_steps() {
        let mut timer = BrewTimer::from_recipe(&pour_over(), RecordingCues::default());
        timer.start();
        ticks(&mut timer, 10);
        timer.load_recipe(&Recipe::default());
        assert_eq!(timer.steps().len(), 5);
        assert_eq!(timer.state(), EngineState::initial(timer.steps()));
    }

    #[test]
    fn empty_timer_is_inert() {
        let mut timer = BrewTimer::new(Vec::new(), RecordingCues::default());
        assert!(timer.start().is_none());
        assert!(timer.tick().is_none());
        assert!(timer.finish().is_none());
        assert!(timer.cues().played.is_empty());
        assert!(timer.current_step().is_none());
    }

    #[test]
    fn untimed_start_completes_without_handler() {
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let untimed = vec![
            TimedStep {
                title: "Preparation".into(),
                duration: 0,
                description: String::new(),
                water_amount: None,
                flow_rate: None,
            },
            TimedStep {
                title: "Complete".into(),
                duration: 0,
                description: String::new(),
                water_amount: None,
                flow_rate: None,
            },
        ];
        let mut timer = BrewTimer::new(untimed, RecordingCues::default())
            .with_completion_handler(move |_| *counter.lock().unwrap() += 1);

        assert!(matches!(
            timer.start(),
            Some(Event::BrewSkipped { step_index: 1, .. })
        ));
        assert_eq!(timer.phase(), Phase::Complete);
        assert_eq!(*calls.lock().unwrap(), 0);
        assert!(timer.finish().is_none());
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn snapshot_reports_progress() {
        let mut timer = BrewTimer::from_recipe(&pour_over(), RecordingCues::default());
        timer.start();
        ticks(&mut timer, 90);
        match timer.snapshot() {
            Event::StateSnapshot { phase, step_title, progress_pct, .. } => {
                assert_eq!(phase, Phase::Running);
                assert_eq!(step_title, "Drawdown");
                assert!((progress_pct - 50.0).abs() < 1e-9);
            }
            other => panic!("expected StateSnapshot, got {other:?}"),
        }
    }
}
