//! Shared data types: users, habit records, job keys.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::HabitError;

/// Stable user identity, as provided by the command surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One tracked habit for one user.
///
/// `hour`/`minute` are the daily trigger time in UTC, derived once at
/// creation time from the user's local time and timezone preference.
/// Editing the timezone preference later does not reschedule existing
/// habits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitRecord {
    /// Display name; the uniqueness key is its case-folded form.
    #[serde(rename = "habit")]
    pub name: String,
    /// Scheduled trigger hour, UTC.
    #[serde(default = "default_hour")]
    pub hour: u32,
    /// Scheduled trigger minute, UTC.
    #[serde(default)]
    pub minute: u32,
    /// Consecutive on-time completions.
    #[serde(default)]
    pub streak: u32,
    /// UTC calendar date completion was last recorded, if ever.
    #[serde(default)]
    pub last_done: Option<NaiveDate>,
}

// Records persisted by older versions may lack a trigger time; they fall
// back to 10:00 UTC, matching the scheduler's historical default.
fn default_hour() -> u32 {
    10
}

impl HabitRecord {
    /// Create a record with a validated UTC trigger time.
    pub fn new(name: impl Into<String>, hour: u32, minute: u32) -> Result<Self, HabitError> {
        validate_schedule(hour, minute)?;
        Ok(Self {
            name: name.into(),
            hour,
            minute,
            streak: 0,
            last_done: None,
        })
    }

    /// Case-folded name, the per-user uniqueness and job key.
    pub fn folded_name(&self) -> String {
        fold_name(&self.name)
    }
}

/// Reject hour/minute outside the trigger range.
pub fn validate_schedule(hour: u32, minute: u32) -> Result<(), HabitError> {
    if hour > 23 || minute > 59 {
        return Err(HabitError::InvalidSchedule { hour, minute });
    }
    Ok(())
}

/// Case-fold a habit name for identity comparison.
pub fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

/// Stable identity of a live trigger: `(user, case-folded habit name)`.
///
/// Also the job descriptor handed to the dispatcher when a trigger fires;
/// the dispatcher re-fetches the current record by this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobKey {
    pub user_id: UserId,
    pub folded_name: String,
}

impl JobKey {
    pub fn new(user_id: &UserId, name: &str) -> Self {
        Self {
            user_id: user_id.clone(),
            folded_name: fold_name(name),
        }
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.user_id, self.folded_name)
    }
}

/// Outcome of a "mark done" transition.
///
/// `AlreadyDoneToday` is a rejected transition, `DeadlineMissed` a valid
/// one that resets the streak; neither is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// Marked within the grace window; carries the new streak value.
    StreakIncremented(u32),
    /// Marked after the deadline; streak reset to zero.
    DeadlineMissed,
    /// Already recorded for the current UTC day; nothing changed.
    AlreadyDoneToday,
}
