//! Bridges fired triggers into the notification capability.
//!
//! Trigger tasks hand a job key over an mpsc channel and immediately go
//! back to sleep; the dispatcher does everything else on its own task.
//! A fired reminder reflects the habit's state at fire time: the current
//! record is re-fetched from the store by key, so an edit or delete after
//! install is honored without reinstalling anything here.
//!
//! Delivery failure is logged and swallowed. One failed delivery must not
//! disable future reminders for that habit or touch any other habit's
//! trigger.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::habit::{HabitRecord, JobKey};
use crate::notify::Notifier;
use crate::store::HabitStore;

/// Receives fired job keys and turns them into notifications.
pub struct Dispatcher<N: Notifier> {
    store: Arc<HabitStore>,
    notifier: N,
}

impl<N: Notifier> Dispatcher<N> {
    pub fn new(store: Arc<HabitStore>, notifier: N) -> Self {
        Self { store, notifier }
    }

    /// Consume the dispatcher into a background task draining `rx`.
    ///
    /// The task ends when every trigger's sender is dropped.
    pub fn spawn(self, rx: mpsc::Receiver<JobKey>) -> JoinHandle<()> {
        tokio::spawn(self.run(rx))
    }

    async fn run(self, mut rx: mpsc::Receiver<JobKey>) {
        while let Some(key) = rx.recv().await {
            self.dispatch(&key).await;
        }
    }

    /// Handle one fired trigger. Never returns an error: every failure
    /// path logs and moves on.
    pub async fn dispatch(&self, key: &JobKey) {
        let state = match self.store.load_all() {
            Ok(state) => state,
            Err(e) => {
                warn!(%key, error = %e, "could not load store for fired trigger");
                return;
            }
        };

        let Some(record) = state.find_by_key(key) else {
            // Deleted since the trigger was installed; the next reconcile
            // or remove() cleans the trigger itself up.
            debug!(%key, "fired trigger has no matching record, skipping");
            return;
        };

        if let Err(e) = self.notifier.notify(&key.user_id, &reminder_text(record)).await {
            warn!(user = %key.user_id, habit = %record.name, error = %e,
                "reminder delivery failed");
        }
    }
}

/// The reminder message for one habit.
pub fn reminder_text(record: &HabitRecord) -> String {
    format!(
        "Reminder: don't forget to **{}** today! Mark it with `habit done {}` to keep your streak alive.",
        record.name, record.name
    )
}
