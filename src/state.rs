//! Persisted brightness state.
//!
//! The last applied level lives in a one-line text file so that every run
//! moves the backlight one step further.

use crate::error::StateError;
use crate::level::BrightnessLevel;

use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the state file inside the user configuration directory.
pub const STATE_FILE_NAME: &str = "keyboard_brightness_level";

/// Default location of the state file (`~/.config/keyboard_brightness_level` on Linux).
pub fn default_state_path() -> Result<PathBuf, StateError> {
    dirs::config_dir()
        .map(|dir| dir.join(STATE_FILE_NAME))
        .ok_or(StateError::NoConfigDir)
}

/// Loads, advances and stores the brightness level.
///
/// There is no locking; two simultaneous runs may race on the file.
#[derive(Debug, Clone)]
pub struct StateTracker {
    path: Option<PathBuf>,
}

impl StateTracker {
    /// Track state in the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Track state in the default per-user location.
    ///
    /// If that location cannot be resolved the tracker still works, but
    /// every run starts from level 0 and nothing is persisted.
    pub fn from_config_dir() -> Self {
        match default_state_path() {
            Ok(path) => Self::new(path),
            Err(e) => {
                warn!("{}", e);
                Self { path: None }
            }
        }
    }

    /// Path of the state file, if one was resolved.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read the previously stored level.
    ///
    /// A missing file is not an error and yields `Ok(None)`.
    pub fn load(&self) -> Result<Option<BrightnessLevel>, StateError> {
        let path = self.path.as_deref().ok_or(StateError::NoConfigDir)?;

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StateError::Read(e)),
        };

        let trimmed = contents.trim();
        let value = trimmed.parse::<i64>().map_err(|source| StateError::Parse {
            contents: trimmed.to_string(),
            source,
        })?;
        Ok(BrightnessLevel::from_persisted(value))
    }

    /// Overwrite the state file with `level`, creating its directory if needed.
    pub fn store(&self, level: BrightnessLevel) -> Result<(), StateError> {
        let path = self.path.as_deref().ok_or(StateError::NoConfigDir)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(StateError::Write)?;
        }
        fs::write(path, level.to_string()).map_err(StateError::Write)
    }

    /// Advance to the next level and persist it.
    ///
    /// Read and write failures are logged and otherwise ignored: an
    /// unreadable file counts as "no prior state", and a failed write
    /// still returns the computed level.
    pub fn next_level(&self) -> BrightnessLevel {
        let previous = self.load().unwrap_or_else(|e| {
            warn!("{}", e);
            None
        });

        let level = BrightnessLevel::after(previous);
        debug!("brightness level {:?} -> {}", previous, level);

        if let Err(e) = self.store(level) {
            warn!("{}", e);
        }
        level
    }
}
