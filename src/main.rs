mod commands;
mod logging;
mod render;
mod source;
mod utils;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "edtsync")]
#[command(about = "Mirror a timetable ICS export into a Google calendar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to Google and store the session
    Auth,
    /// List the calendars of the configured account
    Calendars,
    /// Show what a sync would delete and create, without changing anything
    Status {
        #[command(flatten)]
        pass: PassArgs,

        /// List every event instead of counts
        #[arg(short, long)]
        verbose: bool,
    },
    /// Replace the calendar's events with the timetable
    Sync {
        #[command(flatten)]
        pass: PassArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Options shared by `status` and `sync`.
#[derive(Args, Clone)]
pub struct PassArgs {
    /// Also replace events that already happened
    #[arg(long, conflicts_with = "from")]
    include_past: bool,

    /// Only touch events from this date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,

    /// Timetable export to read (file path or http(s) URL)
    #[arg(long)]
    ics: Option<String>,

    /// Destination calendar name
    #[arg(short, long)]
    calendar: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Auth => commands::auth::run().await,
        Commands::Calendars => commands::calendars::run().await,
        Commands::Status { pass, verbose } => commands::status::run(&pass, verbose).await,
        Commands::Sync { pass, json } => commands::sync::run(&pass, json).await,
    }
}
