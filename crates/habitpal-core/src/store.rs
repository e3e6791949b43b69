//! Whole-snapshot JSON persistence for habits and timezone preferences.
//!
//! Every mutation is load-all / mutate / save-all; there are no partial
//! updates. Saves go through a temp file and rename so a failed write
//! leaves the prior snapshot intact. Serialization of concurrent
//! mutations for the same user is the service layer's job, not the
//! store's.
//!
//! Data lives at `~/.config/habitpal/` as two documents keyed by user id:
//! `habits.json` (list of records per user) and `timezones.json`
//! (optional IANA zone preference per user).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::habit::{fold_name, HabitRecord, JobKey, UserId};

/// Returns `~/.config/habitpal[-dev]/` based on HABITPAL_ENV, or the
/// directory named by HABITPAL_DATA_DIR when set.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let dir = if let Ok(dir) = std::env::var("HABITPAL_DATA_DIR") {
        PathBuf::from(dir)
    } else {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config");
        match std::env::var("HABITPAL_ENV").as_deref() {
            Ok("dev") => base_dir.join("habitpal-dev"),
            _ => base_dir.join("habitpal"),
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| StoreError::DataDir(e.to_string()))?;
    Ok(dir)
}

/// Per-user timezone preference, wire shape `{"timezone": "..."}`.
///
/// A creation/display-time convenience only: changing it does not
/// reschedule habits whose UTC trigger time was already derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimezonePreference {
    pub timezone: String,
}

/// In-memory image of the full persisted state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreState {
    #[serde(default)]
    pub users: HashMap<UserId, Vec<HabitRecord>>,
    #[serde(default)]
    pub timezones: HashMap<UserId, TimezonePreference>,
}

impl StoreState {
    /// All habits for one user (empty slice if none).
    pub fn habits(&self, user_id: &UserId) -> &[HabitRecord] {
        self.users.get(user_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look up a habit by case-folded name.
    pub fn find_habit(&self, user_id: &UserId, name: &str) -> Option<&HabitRecord> {
        let folded = fold_name(name);
        self.habits(user_id)
            .iter()
            .find(|h| h.folded_name() == folded)
    }

    /// Mutable lookup by case-folded name.
    pub fn find_habit_mut(&mut self, user_id: &UserId, name: &str) -> Option<&mut HabitRecord> {
        let folded = fold_name(name);
        self.users
            .get_mut(user_id)?
            .iter_mut()
            .find(|h| h.folded_name() == folded)
    }

    /// Look up the record a fired trigger refers to.
    pub fn find_by_key(&self, key: &JobKey) -> Option<&HabitRecord> {
        self.habits(&key.user_id)
            .iter()
            .find(|h| h.folded_name() == key.folded_name)
    }

    /// The user's IANA zone preference, defaulting to UTC.
    pub fn zone_for(&self, user_id: &UserId) -> &str {
        self.timezones
            .get(user_id)
            .map(|p| p.timezone.as_str())
            .unwrap_or("UTC")
    }

    /// Every `(user, record)` pair across all users.
    pub fn all_records(&self) -> impl Iterator<Item = (&UserId, &HabitRecord)> {
        self.users
            .iter()
            .flat_map(|(user, habits)| habits.iter().map(move |h| (user, h)))
    }
}

/// Habit and timezone-preference persistence.
pub struct HabitStore {
    habits_path: PathBuf,
    timezones_path: PathBuf,
}

impl HabitStore {
    /// Open the store in the default data directory.
    pub fn open() -> Result<Self, StoreError> {
        Ok(Self::with_dir(data_dir()?))
    }

    /// Open the store in a specific directory (tests, custom deployments).
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            habits_path: dir.join("habits.json"),
            timezones_path: dir.join("timezones.json"),
        }
    }

    /// Load the full persisted state. Missing files read as empty.
    pub fn load_all(&self) -> Result<StoreState, StoreError> {
        Ok(StoreState {
            users: read_document(&self.habits_path)?,
            timezones: read_document(&self.timezones_path)?,
        })
    }

    /// Atomically replace the full persisted state.
    pub fn save_all(&self, state: &StoreState) -> Result<(), StoreError> {
        write_document(&self.habits_path, &state.users)?;
        write_document(&self.timezones_path, &state.timezones)?;
        Ok(())
    }
}

fn read_document<T>(path: &Path) -> Result<T, StoreError>
where
    T: Default + for<'de> Deserialize<'de>,
{
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).map_err(|e| StoreError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(StoreError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let save_err = |message: String| StoreError::SaveFailed {
        path: path.to_path_buf(),
        message,
    };

    let content = serde_json::to_string_pretty(value).map_err(|e| save_err(e.to_string()))?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, content).map_err(|e| save_err(e.to_string()))?;
    std::fs::rename(&tmp, path).map_err(|e| save_err(e.to_string()))
}
