mod preferences;

pub use preferences::{FileStore, MemoryStore, PreferenceStore, Preferences};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/cuetimer[-dev]/` based on CUETIMER_ENV, or
/// CUETIMER_DATA_DIR when set.
///
/// Set CUETIMER_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("CUETIMER_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("CUETIMER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("cuetimer-dev")
            } else {
                base_dir.join("cuetimer")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
