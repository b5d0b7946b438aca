use brewguide_core::{Config, ConfigError};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting
    Get {
        /// Dotted key: cues.enabled, cues.volume (0-100), cues.sample_rate,
        /// timer.tick_interval_ms or log_level
        key: String,
    },
    /// Change one setting and save it
    Set {
        /// Dotted key, as for `get`
        key: String,
        /// New value; must match the setting's type
        value: String,
    },
    /// Print every setting as `key = value`
    List,
    /// Restore cue, timer and logging defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key).ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            println!("ok");
        }
        ConfigAction::List => {
            for (key, value) in Config::load()?.entries() {
                println!("{key} = {value}");
            }
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
