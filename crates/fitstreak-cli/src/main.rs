use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use fitstreak_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "fitstreak", version, about = "Training streak tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate today and print the streak counters
    Status,
    /// Reconcile every day up to a date
    Evaluate {
        /// Date to evaluate through (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Re-evaluate the date even if it was already reconciled
        #[arg(long)]
        force: bool,
    },
    /// Mark a day as a rest day
    Rest {
        /// Day to mark (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Print daily status records
    Calendar {
        /// First day (default: Monday of the current week)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day (default: Sunday of the current week)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Record qualifying activity
    Log {
        #[command(subcommand)]
        action: commands::log::LogAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Config::load_or_default().logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Status => commands::streak::status(),
        Commands::Evaluate { date, force } => commands::streak::evaluate(date, force),
        Commands::Rest { date } => commands::streak::rest(date),
        Commands::Calendar { from, to } => commands::streak::calendar(from, to),
        Commands::Log { action } => commands::log::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
