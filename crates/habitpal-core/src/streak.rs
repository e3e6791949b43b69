//! Streak state machine.
//!
//! Judges a "mark done" event against the habit's grace window for the
//! current UTC day. The window is always anchored to *today's* scheduled
//! time, never to the previous completion: a habit ignored for a week is
//! judged only against today's window on its next mark. Streaks are not
//! proactively zeroed for days with no mark at all; that stays a product
//! decision outside this engine.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};

use crate::habit::{HabitRecord, MarkOutcome};

/// Marking done counts as on-time up to this long after the scheduled time.
pub const GRACE_HOURS: i64 = 9;

/// Apply a "mark done" event at `now_utc` to `record`.
///
/// Pure function of its explicit inputs; the caller supplies the clock.
/// `AlreadyDoneToday` leaves the record untouched. The other two outcomes
/// set `last_done` to today and either increment or reset the streak.
pub fn evaluate(record: &mut HabitRecord, now_utc: DateTime<Utc>) -> MarkOutcome {
    let today = now_utc.date_naive();
    if record.last_done == Some(today) {
        return MarkOutcome::AlreadyDoneToday;
    }

    let scheduled = Utc.from_utc_datetime(&today.and_time(NaiveTime::MIN))
        + Duration::hours(i64::from(record.hour))
        + Duration::minutes(i64::from(record.minute));
    let deadline = scheduled + Duration::hours(GRACE_HOURS);

    record.last_done = Some(today);
    if now_utc > deadline {
        record.streak = 0;
        MarkOutcome::DeadlineMissed
    } else {
        record.streak += 1;
        MarkOutcome::StreakIncremented(record.streak)
    }
}
