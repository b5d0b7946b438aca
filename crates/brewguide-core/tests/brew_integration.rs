//! Integration tests for compiling recipes and walking them with the timer.

use brewguide_core::progress::live_water;
use brewguide_core::{compile, BrewTimer, Cue, Event, Phase, Recipe, RecordingCues};

const V60_JSON: &str = r#"{
    "name": "Three pour V60",
    "dose": 15,
    "water": 150,
    "ratio": "1:10",
    "temperature": 93,
    "brewTime": "3:00",
    "grindSize": "medium-fine",
    "processSteps": [
        { "description": "Bloom", "duration": 30, "waterAmount": 50 },
        { "description": "Main pour", "duration": 90, "waterAmount": 100 }
    ]
}"#;

fn v60() -> Recipe {
    Recipe::from_json(V60_JSON).unwrap()
}

#[test]
fn test_structured_recipe_compiles_to_expected_steps() {
    let steps = compile(&v60());
    let shape: Vec<(&str, u32, Option<f64>)> = steps
        .iter()
        .map(|s| (s.title.as_str(), s.duration, s.water_amount))
        .collect();
    assert_eq!(
        shape,
        vec![
            ("Preparation", 0, None),
            ("Step 1", 30, Some(50.0)),
            ("Step 2", 60, Some(100.0)),
            ("Drawdown", 90, None),
            ("Complete", 0, None),
        ]
    );
    let timed: u32 = steps[..steps.len() - 1].iter().map(|s| s.duration).sum();
    assert_eq!(timed, 180);
}

#[test]
fn test_guided_brew_end_to_end() {
    let mut timer = BrewTimer::from_recipe(&v60(), RecordingCues::default());
    assert_eq!(timer.phase(), Phase::Idle);

    timer.start();
    let mut events = Vec::new();
    for _ in 0..180 {
        events.extend(timer.tick());
    }
    assert_eq!(timer.phase(), Phase::Overtime);
    assert_eq!(timer.state().total_elapsed_time, 180);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::OvertimeStarted { step_index: 4, .. })));

    for expected in 1..=3 {
        timer.tick();
        assert_eq!(timer.state().overtime_seconds, expected);
        assert_eq!(timer.state().current_step_index, 4);
    }

    let finished = timer.finish();
    let completion = match finished {
        Some(Event::BrewFinished { completion }) => completion,
        other => panic!("expected BrewFinished, got {other:?}"),
    };
    assert_eq!(completion.brew_time.as_deref(), Some("3:03"));
    assert_eq!(completion.total_elapsed_secs, 183);
    assert_eq!(timer.phase(), Phase::Complete);
}

#[test]
fn test_live_water_follows_countdown() {
    let recipe = Recipe::from_json(
        r#"{ "brewTime": "1:30", "processSteps": [
            { "description": "Bloom", "duration": 30, "waterAmount": 40 },
            { "description": "Pour", "duration": 90, "waterAmount": 132 }
        ] }"#,
    )
    .unwrap();
    let mut timer = BrewTimer::from_recipe(&recipe, RecordingCues::default());
    timer.start();
    for _ in 0..60 {
        timer.tick();
    }
    // 30s into the 60s, 132g pour
    let state = timer.state();
    assert_eq!(state.current_step_index, 2);
    assert_eq!(state.time_remaining, 30);
    let water = live_water(timer.steps(), &state);
    assert!((water.flow_rate.unwrap() - 2.2).abs() < 1e-9);
    assert!((water.step_water - 66.0).abs() < 1e-9);
    assert_eq!(water.current_grams, 106);
    assert_eq!(water.target_grams, 172.0);
}

#[test]
fn test_recipe_without_process_uses_default_phases() {
    let recipe = Recipe::from_json(r#"{ "water": 250, "brewTime": "150" }"#).unwrap();
    let mut timer = BrewTimer::from_recipe(&recipe, RecordingCues::default());
    let titles: Vec<&str> = timer.steps().iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["Preparation", "Bloom", "Main Pour", "Drawdown", "Complete"]);

    timer.start();
    assert_eq!(timer.current_step().unwrap().title, "Bloom");
    assert_eq!(timer.state().time_remaining, 50);
}

#[test]
fn test_cues_around_a_step_boundary() {
    let recipe = Recipe::from_json(
        r#"{ "brewTime": "0:10", "processSteps": [
            { "description": "Pour", "duration": 10, "waterAmount": 30 }
        ] }"#,
    )
    .unwrap();
    let mut timer = BrewTimer::from_recipe(&recipe, RecordingCues::default());
    timer.start();
    assert_eq!(timer.cues_mut().take(), vec![Cue::Chime]);
    for _ in 0..10 {
        timer.tick();
    }
    let played = timer.cues_mut().take();
    assert_eq!(
        played,
        vec![Cue::Tick, Cue::Tick, Cue::Tick, Cue::Tick, Cue::Tick, Cue::Chime]
    );
}

#[test]
fn test_reset_after_overtime() {
    let mut timer = BrewTimer::from_recipe(&v60(), RecordingCues::default());
    timer.start();
    for _ in 0..200 {
        timer.tick();
    }
    assert!(timer.state().overtime_seconds > 0);
    timer.reset();
    let state = timer.state();
    assert_eq!(state.time_remaining, timer.steps()[0].duration);
    assert_eq!(state.overtime_seconds, 0);
    assert_eq!(state.total_elapsed_time, 0);
    assert_eq!(timer.phase(), Phase::Idle);
}
