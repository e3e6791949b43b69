use clap::Subcommand;
use habitpal_core::UserId;

use super::CmdResult;

#[derive(Subcommand)]
pub enum TimezoneAction {
    /// Set the IANA timezone used when adding habits
    Set {
        /// IANA zone name, e.g. America/Bogota
        zone: String,
    },
    /// Show the stored timezone preference
    Show,
}

pub async fn run(user: &UserId, action: TimezoneAction) -> CmdResult {
    let boot = super::bootstrap()?;

    match action {
        TimezoneAction::Set { zone } => {
            boot.service.set_timezone(user, &zone).await?;
            println!("Timezone set to {zone}. Existing reminders keep their current times.");
        }
        TimezoneAction::Show => match boot.service.timezone(user).await? {
            Some(zone) => println!("{zone}"),
            None => println!(
                "No timezone set; assuming {}.",
                boot.config.default_timezone
            ),
        },
    }
    Ok(())
}
