//! # HabitPal Core Library
//!
//! This library provides the core business logic for HabitPal, a per-user
//! daily habit tracker with streaks and timezone-aware reminders. It
//! implements a CLI-first philosophy where all operations are available via
//! a standalone CLI binary, with any chat frontend being a thin command
//! layer over the same core library.
//!
//! ## Architecture
//!
//! - **Streak Evaluator**: A pure state machine that judges a "mark done"
//!   event against the habit's 9-hour grace window for the current UTC day
//! - **Reminder Scheduler**: One daily trigger per `(user, habit)` pair,
//!   rebuilt from the persisted habit set on startup
//! - **Dispatcher**: Bridges fired triggers into the notification capability
//!   without letting delivery failures reach the trigger path
//! - **Storage**: Whole-snapshot JSON habit store and TOML-based
//!   configuration
//!
//! ## Key Components
//!
//! - [`HabitService`]: High-level operations shared by every command surface
//! - [`ReminderScheduler`]: Trigger registry keyed by `(user, folded name)`
//! - [`HabitStore`]: Habit and timezone-preference persistence
//! - [`Notifier`]: Trait for outbound reminder delivery

pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod habit;
pub mod notify;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod streak;

pub use clock::{to_local, to_utc};
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use error::{ConfigError, CoreError, HabitError, StoreError};
pub use habit::{HabitRecord, JobKey, MarkOutcome, UserId};
pub use notify::{ConsoleNotifier, DiscordNotifier, Notifier, NotifyError};
pub use scheduler::ReminderScheduler;
pub use service::HabitService;
pub use store::{HabitStore, StoreState, TimezonePreference};
