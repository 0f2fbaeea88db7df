//! Local persistence of the selected app and user id.
//!
//! Stored as JSON in `~/.adk-chat/preferences.json`, so a restarted client
//! comes back with the same app and user.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const PREFERENCES_DIR: &str = ".adk-chat";
const PREFERENCES_FILE: &str = "preferences.json";

/// Values remembered between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub selected_app_name: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("home directory could not be determined")]
    NoHomeDirectory,

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid preferences file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads and writes the preferences file.
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    /// Store at the default location in the home directory.
    pub fn new() -> Result<Self, PreferencesError> {
        let home = dirs::home_dir().ok_or(PreferencesError::NoHomeDirectory)?;
        Ok(Self::with_path(home.join(PREFERENCES_DIR).join(PREFERENCES_FILE)))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load stored preferences. A missing file yields the defaults.
    pub fn load(&self) -> Result<Preferences, PreferencesError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Preferences::default())
            }
            Err(source) => {
                return Err(PreferencesError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_reader(BufReader::new(file)).map_err(|source| PreferencesError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Write preferences, creating the parent directory when needed.
    pub fn save(&self, preferences: &Preferences) -> Result<(), PreferencesError> {
        let io_err = |source| PreferencesError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let file = File::create(&self.path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, preferences).map_err(|source| {
            PreferencesError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        writer.flush().map_err(io_err)
    }

    /// Load, modify, save.
    pub fn update(&self, f: impl FnOnce(&mut Preferences)) -> Result<Preferences, PreferencesError> {
        let mut preferences = self.load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "discarding unreadable preferences");
            Preferences::default()
        });
        f(&mut preferences);
        self.save(&preferences)?;
        Ok(preferences)
    }

    /// Remove the preferences file. Succeeds when it does not exist.
    pub fn clear(&self) -> Result<(), PreferencesError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PreferencesError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
