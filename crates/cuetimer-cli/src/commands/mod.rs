pub mod config;
pub mod history;
pub mod preset;
pub mod reminder;
pub mod run;
pub mod sound;

use std::path::PathBuf;

use cuetimer_core::audio::CueCatalog;
use cuetimer_core::storage::{data_dir, FileStore};
use cuetimer_core::{SystemClock, TimerEngine, ValidationError};

use crate::bell::TerminalBell;

/// Cue files live in `CUETIMER_SOUNDS_DIR`, or `<data_dir>/sounds`.
pub fn sounds_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    match std::env::var_os("CUETIMER_SOUNDS_DIR") {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => Ok(data_dir()?.join("sounds")),
    }
}

pub fn catalog() -> Result<CueCatalog, Box<dyn std::error::Error>> {
    Ok(CueCatalog::builtin(&sounds_dir()?))
}

/// Engine over the on-disk preferences, ringing the terminal bell.
pub fn open_engine(catalog: &CueCatalog) -> Result<TimerEngine, Box<dyn std::error::Error>> {
    let store = FileStore::open()?;
    tracing::debug!(path = %store.path().display(), "opened preferences");
    Ok(TimerEngine::open(
        SystemClock,
        Box::new(store),
        catalog,
        Box::new(TerminalBell::new()),
    ))
}

/// Convert a 1-based list number into an index.
pub fn list_index(number: usize, len: usize, field: &str) -> Result<usize, ValidationError> {
    match number.checked_sub(1) {
        Some(index) if index < len => Ok(index),
        _ => Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("no entry #{number} (have {len})"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_index_is_one_based() {
        assert_eq!(list_index(1, 3, "preset"), Ok(0));
        assert_eq!(list_index(3, 3, "preset"), Ok(2));
        assert!(list_index(0, 3, "preset").is_err());
        assert!(list_index(4, 3, "preset").is_err());
        assert!(list_index(1, 0, "reminder").is_err());
    }
}
