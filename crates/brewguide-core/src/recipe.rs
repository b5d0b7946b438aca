//! Recipe records as supplied by the recipe-management layer.
//!
//! The engine treats a [`Recipe`] as read-only input. Field names follow the
//! camelCase JSON shape produced by that layer, and every field the compiler
//! needs has a lenient default so a sparse record still compiles.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::error::RecipeError;

/// Brew time used when `brewTime` is missing or cannot be parsed.
pub const FALLBACK_BREW_SECS: u32 = 180;

/// One authored pour step. `duration` is cumulative (seconds since brew start),
/// `water_amount` is the grams poured during this step only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessStep {
    #[serde(default)]
    pub description: String,
    /// Signed so that out-of-order authoring survives deserialization.
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub water_amount: Option<f64>,
    #[serde(default)]
    pub flow_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(default)]
    pub name: Option<String>,
    /// Coffee dose in grams.
    #[serde(default)]
    pub dose: f64,
    /// Total water in grams.
    #[serde(default)]
    pub water: f64,
    /// "C:W" ratio string, informational only.
    #[serde(default)]
    pub ratio: String,
    /// Water temperature in °C.
    #[serde(default)]
    pub temperature: f64,
    /// `mm:ss` or bare seconds.
    #[serde(default, deserialize_with = "string_or_number")]
    pub brew_time: String,
    #[serde(default)]
    pub grind_size: Option<String>,
    #[serde(default)]
    pub process_steps: Option<Vec<ProcessStep>>,
    /// Legacy newline-delimited instructions.
    #[serde(default)]
    pub process: Option<String>,
}

impl Recipe {
    pub fn from_json(json: &str) -> Result<Self, RecipeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a recipe JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a recipe object.
    pub fn load(path: &Path) -> Result<Self, RecipeError> {
        let content = std::fs::read_to_string(path).map_err(|source| RecipeError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parsed brew time in seconds.
    pub fn brew_time_secs(&self) -> u32 {
        parse_brew_time(&self.brew_time)
    }
}

/// Parse a brew time into seconds.
///
/// A value containing `:` is read as `mm:ss`, anything else as whole seconds.
/// Unparseable input falls back to [`FALLBACK_BREW_SECS`].
pub fn parse_brew_time(raw: &str) -> u32 {
    let raw = raw.trim();
    let parsed = match raw.split_once(':') {
        Some((min, sec)) => min
            .trim()
            .parse::<u32>()
            .ok()
            .zip(sec.trim().parse::<u32>().ok())
            .and_then(|(m, s)| m.checked_mul(60)?.checked_add(s)),
        None => raw.parse::<u32>().ok(),
    };
    parsed.unwrap_or(FALLBACK_BREW_SECS)
}

/// Format whole seconds as `m:ss`.
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => (n.trunc() as i64).to_string(),
        Raw::Null(()) => String::new(),
    })
}
