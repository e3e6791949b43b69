use clap::Args;
use habitpal_core::{ConsoleNotifier, DiscordNotifier, Dispatcher};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::CmdResult;

#[derive(Args)]
pub struct RunArgs {
    /// Discord webhook to deliver reminders through (overrides config)
    #[arg(long)]
    webhook_url: Option<String>,
}

/// Load the persisted habit set, rebuild all triggers, and serve reminders
/// until Ctrl-C.
pub async fn run(args: RunArgs) -> CmdResult {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let boot = super::bootstrap()?;
    let installed = boot.service.reconcile_all()?;
    info!(triggers = installed, "reminder scheduler started");

    let webhook = args
        .webhook_url
        .or_else(|| boot.config.notifications.discord_webhook_url.clone())
        .filter(|_| boot.config.notifications.enabled);
    match webhook {
        Some(url) => {
            Dispatcher::new(boot.store.clone(), DiscordNotifier::new(url)?).spawn(boot.dispatch_rx);
            info!("delivering reminders via Discord webhook");
        }
        None => {
            Dispatcher::new(boot.store.clone(), ConsoleNotifier).spawn(boot.dispatch_rx);
            info!("delivering reminders to the console");
        }
    }

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    Ok(())
}
