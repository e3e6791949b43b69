use clap::{Parser, Subcommand};
use habitpal_core::UserId;

mod commands;

#[derive(Parser)]
#[command(name = "habitpal-cli", version, about = "HabitPal CLI")]
struct Cli {
    /// User identity habits are tracked under
    #[arg(long, global = true, env = "HABITPAL_USER", default_value = "local")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Habit management
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Timezone preference
    Timezone {
        #[command(subcommand)]
        action: commands::timezone::TimezoneAction,
    },
    /// Run the reminder scheduler until interrupted
    Run(commands::run::RunArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let user = UserId::new(cli.user);
    let result = match cli.command {
        Commands::Habit { action } => commands::habit::run(&user, action).await,
        Commands::Timezone { action } => commands::timezone::run(&user, action).await,
        Commands::Run(args) => commands::run::run(args).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
