//! High-level habit operations shared by every command surface.
//!
//! Each operation is one load / mutate / save cycle against the store,
//! followed by the matching trigger change on the scheduler, so the live
//! trigger set stays 1:1 with the persisted habit set. Mutations for the
//! same user are serialized behind a per-user async mutex; unrelated
//! users never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex as AsyncMutex;
use tracing::info;

use crate::clock;
use crate::error::{CoreError, HabitError, Result};
use crate::habit::{fold_name, HabitRecord, MarkOutcome, UserId};
use crate::scheduler::ReminderScheduler;
use crate::store::{HabitStore, TimezonePreference};
use crate::streak;

/// Ties the store, scheduler, and per-user locking together.
pub struct HabitService {
    store: Arc<HabitStore>,
    scheduler: Arc<ReminderScheduler>,
    default_zone: String,
    user_locks: Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>,
}

impl HabitService {
    pub fn new(store: Arc<HabitStore>, scheduler: Arc<ReminderScheduler>) -> Self {
        Self::with_default_zone(store, scheduler, "UTC")
    }

    /// Use `default_zone` for users with no stored timezone preference.
    pub fn with_default_zone(
        store: Arc<HabitStore>,
        scheduler: Arc<ReminderScheduler>,
        default_zone: impl Into<String>,
    ) -> Self {
        Self {
            store,
            scheduler,
            default_zone: default_zone.into(),
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Create a habit reminded daily at the user's local `hour:minute`.
    ///
    /// The local time is converted to UTC once, using the user's timezone
    /// preference and today's offset; the stored trigger time never moves
    /// again, even if the preference changes later.
    pub async fn add_habit(
        &self,
        user_id: &UserId,
        name: &str,
        local_hour: u32,
        local_minute: u32,
    ) -> Result<HabitRecord> {
        let _guard = self.user_lock(user_id).lock_owned().await;

        let mut state = self.store.load_all()?;
        if state.find_habit(user_id, name).is_some() {
            return Err(HabitError::DuplicateHabit { name: name.into() }.into());
        }

        let zone = state
            .timezones
            .get(user_id)
            .map(|p| p.timezone.clone())
            .unwrap_or_else(|| self.default_zone.clone());
        let (hour, minute) = clock::to_utc(local_hour, local_minute, &zone, None)?;

        let record = HabitRecord::new(name, hour, minute)?;
        state
            .users
            .entry(user_id.clone())
            .or_default()
            .push(record.clone());
        self.store.save_all(&state)?;
        self.scheduler.install(user_id, &record)?;

        info!(user = %user_id, habit = %record.name, hour, minute, "habit added");
        Ok(record)
    }

    /// Record a completion at `now_utc` and persist the outcome.
    pub async fn mark_done(
        &self,
        user_id: &UserId,
        name: &str,
        now_utc: DateTime<Utc>,
    ) -> Result<MarkOutcome> {
        let _guard = self.user_lock(user_id).lock_owned().await;

        let mut state = self.store.load_all()?;
        let record = state
            .find_habit_mut(user_id, name)
            .ok_or_else(|| HabitError::HabitNotFound { name: name.into() })?;

        let outcome = streak::evaluate(record, now_utc);
        if outcome != MarkOutcome::AlreadyDoneToday {
            self.store.save_all(&state)?;
        }
        Ok(outcome)
    }

    /// All habits for the user, in stored order.
    pub async fn list_habits(&self, user_id: &UserId) -> Result<Vec<HabitRecord>> {
        Ok(self.store.load_all()?.habits(user_id).to_vec())
    }

    /// Delete a habit and cancel its trigger.
    pub async fn delete_habit(&self, user_id: &UserId, name: &str) -> Result<()> {
        let _guard = self.user_lock(user_id).lock_owned().await;

        let mut state = self.store.load_all()?;
        let folded = fold_name(name);
        let habits = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| HabitError::HabitNotFound { name: name.into() })?;
        let before = habits.len();
        habits.retain(|h| h.folded_name() != folded);
        if habits.len() == before {
            return Err(HabitError::HabitNotFound { name: name.into() }.into());
        }

        self.store.save_all(&state)?;
        self.scheduler.remove(user_id, name);
        info!(user = %user_id, habit = name, "habit deleted");
        Ok(())
    }

    /// Store the user's IANA timezone preference.
    ///
    /// Applies to habits created from now on; existing trigger times are
    /// deliberately left as they are.
    pub async fn set_timezone(&self, user_id: &UserId, zone: &str) -> Result<()> {
        clock::parse_zone(zone)?;
        let _guard = self.user_lock(user_id).lock_owned().await;

        let mut state = self.store.load_all()?;
        state.timezones.insert(
            user_id.clone(),
            TimezonePreference {
                timezone: zone.into(),
            },
        );
        self.store.save_all(&state)?;
        Ok(())
    }

    /// The user's stored timezone preference, if any.
    pub async fn timezone(&self, user_id: &UserId) -> Result<Option<String>> {
        Ok(self
            .store
            .load_all()?
            .timezones
            .get(user_id)
            .map(|p| p.timezone.clone()))
    }

    /// Rebuild the live trigger set from persisted state (startup).
    pub fn reconcile_all(&self) -> Result<usize, CoreError> {
        let state = self.store.load_all()?;
        Ok(self.scheduler.reconcile_all(&state))
    }

    fn user_lock(&self, user_id: &UserId) -> Arc<AsyncMutex<()>> {
        self.user_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(user_id.clone())
            .or_default()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tokio::sync::mpsc;

    use crate::habit::JobKey;

    fn setup() -> (tempfile::TempDir, HabitService, Arc<ReminderScheduler>) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(HabitStore::with_dir(dir.path()));
        let (tx, _rx) = mpsc::channel(8);
        let scheduler = Arc::new(ReminderScheduler::new(tx));
        let service = HabitService::new(store, scheduler.clone());
        (dir, service, scheduler)
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 27, 12, 0, 0).single().unwrap()
    }

    #[tokio::test]
    async fn add_converts_local_time_via_preference() {
        let (_dir, service, scheduler) = setup();
        let user = UserId::from("42");

        service.set_timezone(&user, "America/Bogota").await.unwrap();
        let record = service.add_habit(&user, "Run", 9, 0).await.unwrap();

        // Bogota is UTC-5 year-round.
        assert_eq!((record.hour, record.minute), (14, 0));
        assert_eq!(
            scheduler.trigger_time(&JobKey::new(&user, "run")),
            Some((14, 0))
        );
    }

    #[tokio::test]
    async fn add_without_preference_assumes_default_zone() {
        let (_dir, service, _scheduler) = setup();
        let record = service
            .add_habit(&UserId::from("42"), "Run", 9, 30)
            .await
            .unwrap();
        assert_eq!((record.hour, record.minute), (9, 30));
    }

    #[tokio::test]
    async fn duplicate_names_fold_case() {
        let (_dir, service, _scheduler) = setup();
        let user = UserId::from("42");

        service.add_habit(&user, "run", 9, 0).await.unwrap();
        let err = service.add_habit(&user, "Run", 10, 0).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Habit(HabitError::DuplicateHabit { .. })
        ));
        assert_eq!(service.list_habits(&user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mark_done_persists_streak() {
        let (_dir, service, _scheduler) = setup();
        let user = UserId::from("42");
        service.add_habit(&user, "Run", 10, 0).await.unwrap();

        let outcome = service.mark_done(&user, "RUN", noon()).await.unwrap();
        assert_eq!(outcome, MarkOutcome::StreakIncremented(1));

        let habits = service.list_habits(&user).await.unwrap();
        assert_eq!(habits[0].streak, 1);
        assert_eq!(habits[0].last_done, Some(noon().date_naive()));

        let again = service.mark_done(&user, "run", noon()).await.unwrap();
        assert_eq!(again, MarkOutcome::AlreadyDoneToday);
    }

    #[tokio::test]
    async fn mark_done_unknown_habit_fails() {
        let (_dir, service, _scheduler) = setup();
        let err = service
            .mark_done(&UserId::from("42"), "nope", noon())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Habit(HabitError::HabitNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn delete_removes_trigger_and_record() {
        let (_dir, service, scheduler) = setup();
        let user = UserId::from("42");
        service.add_habit(&user, "Run", 9, 0).await.unwrap();
        assert_eq!(scheduler.job_count(), 1);

        service.delete_habit(&user, "RUN").await.unwrap();
        assert_eq!(scheduler.job_count(), 0);
        assert!(service.list_habits(&user).await.unwrap().is_empty());

        let err = service.delete_habit(&user, "Run").await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Habit(HabitError::HabitNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn changing_timezone_does_not_reschedule_existing() {
        let (_dir, service, scheduler) = setup();
        let user = UserId::from("42");

        service.add_habit(&user, "Run", 9, 0).await.unwrap();
        let key = JobKey::new(&user, "run");
        let before = scheduler.trigger_time(&key);

        service.set_timezone(&user, "Asia/Kolkata").await.unwrap();
        assert_eq!(scheduler.trigger_time(&key), before);
        assert_eq!(
            service.list_habits(&user).await.unwrap()[0].hour,
            9
        );
    }

    #[tokio::test]
    async fn set_timezone_rejects_unknown_zone() {
        let (_dir, service, _scheduler) = setup();
        let err = service
            .set_timezone(&UserId::from("42"), "Nowhere/Atlantis")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Habit(HabitError::UnknownZone(_))));
    }

    #[tokio::test]
    async fn reconcile_rebuilds_from_store() {
        let (_dir, service, scheduler) = setup();
        let alice = UserId::from("alice");
        let bob = UserId::from("bob");
        service.add_habit(&alice, "Run", 9, 0).await.unwrap();
        service.add_habit(&alice, "Read", 21, 0).await.unwrap();
        service.add_habit(&bob, "Row", 6, 0).await.unwrap();

        assert_eq!(service.reconcile_all().unwrap(), 3);

        service.delete_habit(&alice, "Read").await.unwrap();
        assert_eq!(service.reconcile_all().unwrap(), 2);
    }
}
