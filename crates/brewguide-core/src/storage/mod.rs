mod config;

pub use config::{Config, CueConfig, TimerConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the Brewguide config directory, creating it if needed.
///
/// `BREWGUIDE_CONFIG_DIR` overrides the location outright. Otherwise this is
/// `~/.config/brewguide[-dev]/`, with `BREWGUIDE_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("BREWGUIDE_CONFIG_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("BREWGUIDE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("brewguide-dev")
            } else {
                base_dir.join("brewguide")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DirUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
