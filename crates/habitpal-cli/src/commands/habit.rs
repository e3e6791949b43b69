use chrono::Utc;
use clap::Subcommand;
use habitpal_core::{to_local, MarkOutcome, UserId};

use super::CmdResult;

#[derive(Subcommand)]
pub enum HabitAction {
    /// Add a habit reminded daily at a local time
    Add {
        /// Habit name (unique per user, case-insensitive)
        name: String,
        /// Local hour (0-23)
        hour: u32,
        /// Local minute (0-59)
        minute: u32,
    },
    /// Mark a habit done for today
    Done {
        /// Habit name
        name: String,
    },
    /// List habits with local reminder times and streaks
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a habit and cancel its reminder
    Delete {
        /// Habit name
        name: String,
    },
}

pub async fn run(user: &UserId, action: HabitAction) -> CmdResult {
    let boot = super::bootstrap()?;
    let service = &boot.service;

    match action {
        HabitAction::Add { name, hour, minute } => {
            let record = service.add_habit(user, &name, hour, minute).await?;
            println!(
                "Habit '{}' added, reminded daily at {:02}:{:02} ({:02}:{:02} UTC).",
                record.name, hour, minute, record.hour, record.minute
            );
        }
        HabitAction::Done { name } => {
            match service.mark_done(user, &name, Utc::now()).await? {
                MarkOutcome::StreakIncremented(n) => {
                    println!("You did it! Streak for '{name}' is now {n} days.");
                }
                MarkOutcome::DeadlineMissed => {
                    println!("You missed the deadline. Streak for '{name}' has been reset.");
                }
                MarkOutcome::AlreadyDoneToday => {
                    println!("You've already marked '{name}' as done today.");
                }
            }
        }
        HabitAction::List { json } => {
            let habits = service.list_habits(user).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&habits)?);
                return Ok(());
            }
            if habits.is_empty() {
                println!("No habits yet. Use `habit add` to create one.");
                return Ok(());
            }
            let zone = service
                .timezone(user)
                .await?
                .unwrap_or_else(|| boot.config.default_timezone.clone());
            for h in habits {
                // Display in the user's current zone; the trigger itself
                // stays at the stored UTC time.
                let (lh, lm) = to_local(h.hour, h.minute, &zone, None)?;
                println!(
                    "{} at {:02}:{:02} {} (streak: {})",
                    h.name, lh, lm, zone, h.streak
                );
            }
        }
        HabitAction::Delete { name } => {
            service.delete_habit(user, &name).await?;
            println!("Habit '{name}' has been deleted.");
        }
    }
    Ok(())
}
