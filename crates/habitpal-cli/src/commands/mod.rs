pub mod habit;
pub mod run;
pub mod timezone;

use std::sync::Arc;

use habitpal_core::{Config, HabitService, HabitStore, JobKey, ReminderScheduler};
use tokio::sync::mpsc;

pub(crate) type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a command needs, wired the same way for one-shots and `run`.
pub(crate) struct Bootstrap {
    pub config: Config,
    pub store: Arc<HabitStore>,
    pub service: HabitService,
    pub dispatch_rx: mpsc::Receiver<JobKey>,
}

/// Open the store and build the service over a fresh scheduler.
///
/// One-shot commands go through the same service so scheduler bookkeeping
/// stays uniform; their triggers simply die with the process.
pub(crate) fn bootstrap() -> Result<Bootstrap, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = Arc::new(HabitStore::open()?);
    let (tx, dispatch_rx) = mpsc::channel(64);
    let scheduler = Arc::new(ReminderScheduler::new(tx));
    let service = HabitService::with_default_zone(
        store.clone(),
        scheduler,
        config.default_timezone.clone(),
    );
    Ok(Bootstrap {
        config,
        store,
        service,
        dispatch_rx,
    })
}
