//! Reminder trigger registry.
//!
//! Maintains exactly one live daily trigger per `(user, folded habit
//! name)` pair, firing at the record's UTC hour and minute. Triggers are
//! process-memory only; [`ReminderScheduler::reconcile_all`] rebuilds the
//! whole set from the persisted state on startup, so no stale trigger can
//! survive a restart.
//!
//! Each trigger is a tokio task that sleeps until the next daily
//! occurrence, hands the job key to the dispatcher channel, and re-arms.
//! Sending on the channel is the only thing a trigger waits for --
//! delivery itself happens on the dispatcher's side of the channel.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::HabitError;
use crate::habit::{validate_schedule, HabitRecord, JobKey, UserId};
use crate::store::StoreState;

struct JobHandle {
    task: JoinHandle<()>,
    hour: u32,
    minute: u32,
}

/// Owns the live trigger set. Constructed once at process start and passed
/// by handle to wherever create/edit/delete happen.
pub struct ReminderScheduler {
    jobs: Mutex<HashMap<JobKey, JobHandle>>,
    dispatch_tx: mpsc::Sender<JobKey>,
}

impl ReminderScheduler {
    /// Create a scheduler that hands fired job keys to `dispatch_tx`.
    pub fn new(dispatch_tx: mpsc::Sender<JobKey>) -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            dispatch_tx,
        }
    }

    /// Create or replace the trigger for this record's job key.
    ///
    /// Upsert semantics: the replacement is registered before the previous
    /// trigger task is aborted, so there is no window with a missing
    /// trigger. A validation failure registers nothing.
    pub fn install(&self, user_id: &UserId, record: &HabitRecord) -> Result<(), HabitError> {
        validate_schedule(record.hour, record.minute)?;

        let key = JobKey::new(user_id, &record.name);
        let task = tokio::spawn(trigger_loop(
            key.clone(),
            record.hour,
            record.minute,
            self.dispatch_tx.clone(),
        ));

        let replaced = self.lock_jobs().insert(
            key.clone(),
            JobHandle {
                task,
                hour: record.hour,
                minute: record.minute,
            },
        );
        if let Some(old) = replaced {
            old.task.abort();
        }
        debug!(%key, hour = record.hour, minute = record.minute, "trigger installed");
        Ok(())
    }

    /// Cancel the trigger for `(user_id, name)`; no-op when absent.
    pub fn remove(&self, user_id: &UserId, name: &str) {
        let key = JobKey::new(user_id, name);
        if let Some(handle) = self.lock_jobs().remove(&key) {
            handle.task.abort();
            debug!(%key, "trigger removed");
        }
    }

    /// Rebuild the whole trigger set from persisted state.
    ///
    /// Returns the number of live triggers afterwards. A record that fails
    /// validation is skipped with a warning rather than aborting startup.
    pub fn reconcile_all(&self, state: &StoreState) -> usize {
        for (_, handle) in self.lock_jobs().drain() {
            handle.task.abort();
        }

        for (user_id, record) in state.all_records() {
            if let Err(e) = self.install(user_id, record) {
                warn!(user = %user_id, habit = %record.name, error = %e,
                    "skipping trigger for invalid persisted record");
            }
        }
        self.job_count()
    }

    /// Number of live trigger registrations.
    pub fn job_count(&self) -> usize {
        self.lock_jobs().len()
    }

    /// The UTC trigger time currently registered for a key, if any.
    pub fn trigger_time(&self, key: &JobKey) -> Option<(u32, u32)> {
        self.lock_jobs().get(key).map(|h| (h.hour, h.minute))
    }

    fn lock_jobs(&self) -> std::sync::MutexGuard<'_, HashMap<JobKey, JobHandle>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        for handle in self.lock_jobs().values() {
            handle.task.abort();
        }
    }
}

async fn trigger_loop(key: JobKey, hour: u32, minute: u32, tx: mpsc::Sender<JobKey>) {
    loop {
        let wait = duration_until_next(Utc::now(), hour, minute);
        tokio::time::sleep(wait).await;
        debug!(%key, "reminder trigger fired");
        if tx.send(key.clone()).await.is_err() {
            // Dispatcher is gone; stop re-arming.
            return;
        }
    }
}

/// Time until the next daily occurrence of `hour:minute` UTC after `now`.
fn duration_until_next(now: DateTime<Utc>, hour: u32, minute: u32) -> std::time::Duration {
    let today_fire = now.date_naive().and_time(NaiveTime::MIN)
        + Duration::hours(i64::from(hour))
        + Duration::minutes(i64::from(minute));
    let today_fire = Utc.from_utc_datetime(&today_fire);
    let next = if today_fire > now {
        today_fire
    } else {
        today_fire + Duration::days(1)
    };
    (next - now).to_std().unwrap_or_default()
}
