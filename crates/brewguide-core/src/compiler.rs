//! Step compiler.
//!
//! Turns a [`Recipe`] into the flat list of [`TimedStep`]s the timer walks.
//! Compilation is total: malformed input degrades to fallback values and the
//! output always starts with a zero-duration "Preparation" step and ends with
//! a zero-duration "Complete" step.
//!
//! ## Paths
//!
//! ```text
//! processSteps present -> one step per entry (+ Drawdown filler up to brewTime)
//! process text present -> one step per non-blank line, brewTime split evenly
//! neither              -> Bloom / Main Pour / Drawdown, brewTime split in three
//! ```

use serde::{Deserialize, Serialize};

use crate::recipe::{ProcessStep, Recipe};

/// Share of the recipe water poured during the default bloom.
const BLOOM_SHARE: f64 = 0.3;

/// A normalized step. `duration` is the time allotted to this step alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedStep {
    pub title: String,
    /// Seconds allotted to this step (a delta, not cumulative).
    pub duration: u32,
    pub description: String,
    /// Grams poured during this step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_amount: Option<f64>,
    /// Explicit pour rate in g/s.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_rate: Option<f64>,
}

impl TimedStep {
    fn info(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            duration: 0,
            description: description.into(),
            water_amount: None,
            flow_rate: None,
        }
    }

    /// Explicit flow rate, or `water / duration` when one can be derived.
    pub fn effective_flow_rate(&self) -> Option<f64> {
        if let Some(rate) = self.flow_rate {
            return Some(rate);
        }
        match self.water_amount {
            Some(water) if self.duration > 0 => Some(water / f64::from(self.duration)),
            _ => None,
        }
    }

    pub fn is_timed(&self) -> bool {
        self.duration > 0
    }
}

/// Compile a recipe into timed steps.
pub fn compile(recipe: &Recipe) -> Vec<TimedStep> {
    let mut steps = vec![preparation(recipe)];

    match recipe.process_steps.as_deref() {
        Some(authored) if !authored.is_empty() => {
            compile_structured(authored, recipe.brew_time_secs(), &mut steps)
        }
        _ => compile_legacy(recipe, &mut steps),
    }

    steps.push(TimedStep::info("Complete", "Enjoy your coffee!"));
    tracing::debug!(count = steps.len(), "compiled recipe steps");
    steps
}

fn preparation(recipe: &Recipe) -> TimedStep {
    let mut description = format!(
        "Heat water to {}°C and weigh {}g of coffee",
        recipe.temperature, recipe.dose
    );
    if let Some(grind) = recipe.grind_size.as_deref().filter(|g| !g.trim().is_empty()) {
        description.push_str(&format!(", ground {}", grind.trim()));
    }
    description.push('.');
    TimedStep::info("Preparation", description)
}

fn compile_structured(authored: &[ProcessStep], brew_secs: u32, steps: &mut Vec<TimedStep>) {
    let mut previous_elapsed: i64 = 0;

    for (i, step) in authored.iter().enumerate() {
        let delta = step.duration - previous_elapsed;
        if delta < 0 {
            tracing::warn!(
                step = i + 1,
                elapsed = step.duration,
                previous = previous_elapsed,
                "process step ends before the previous one; clamping duration to 0"
            );
        }
        let duration = u32::try_from(delta.max(0)).unwrap_or(u32::MAX);

        let description = match step.water_amount {
            Some(water) if water > 0.0 => format!("Pour {water}g of water"),
            _ => step.description.clone(),
        };

        steps.push(TimedStep {
            title: format!("Step {}", i + 1),
            duration,
            description,
            water_amount: step.water_amount,
            flow_rate: step.flow_rate,
        });
        previous_elapsed = previous_elapsed.max(step.duration);
    }

    let drawdown = i64::from(brew_secs) - previous_elapsed;
    if drawdown > 0 {
        steps.push(TimedStep {
            title: "Drawdown".into(),
            duration: drawdown as u32,
            description: "Let the water drain through the coffee bed".into(),
            water_amount: None,
            flow_rate: None,
        });
    }
}

fn compile_legacy(recipe: &Recipe, steps: &mut Vec<TimedStep>) {
    let brew_secs = recipe.brew_time_secs();

    let lines: Vec<&str> = recipe
        .process
        .as_deref()
        .unwrap_or_default()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if !lines.is_empty() {
        let per_step = brew_secs / lines.len() as u32;
        steps.extend(lines.iter().enumerate().map(|(i, line)| TimedStep {
            title: format!("Step {}", i + 1),
            duration: per_step,
            description: (*line).to_string(),
            water_amount: None,
            flow_rate: None,
        }));
        return;
    }

    let per_phase = brew_secs / 3;
    let total_water = recipe.water.max(0.0);
    let bloom = (total_water * BLOOM_SHARE).round();
    let main = total_water - bloom;
    let grams = |g: f64| (g > 0.0).then_some(g);

    steps.push(TimedStep {
        title: "Bloom".into(),
        duration: per_phase,
        description: format!("Pour {bloom}g of water to bloom the grounds"),
        water_amount: grams(bloom),
        flow_rate: None,
    });
    steps.push(TimedStep {
        title: "Main Pour".into(),
        duration: per_phase,
        description: format!("Pour the remaining {main}g of water, up to {total_water}g total"),
        water_amount: grams(main),
        flow_rate: None,
    });
    steps.push(TimedStep {
        title: "Drawdown".into(),
        duration: per_phase,
        description: "Let the water drain through the coffee bed".into(),
        water_amount: None,
        flow_rate: None,
    });
}
