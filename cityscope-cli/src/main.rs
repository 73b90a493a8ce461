use anyhow::Result;
use cityscope_core::Module;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "cityscope")]
#[command(about = "cityscope smart-city forecasting CLI", long_about = None)]
struct Cli {
    /// Path to the SQLite database (defaults to the configured one)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one prediction cycle now
    Generate,

    /// List stored predictions, newest first
    Predictions {
        /// Only show one module (traffic, energy, environmental, population)
        #[arg(short, long)]
        module: Option<String>,

        /// Maximum number of predictions
        #[arg(short, long, default_value = "50")]
        limit: i64,
    },

    /// Show the ten most recent predictions
    Latest,

    /// Show headline city metrics
    Dashboard,

    /// List system alerts, newest first
    Alerts {
        /// Only show alerts that are still open
        #[arg(short, long)]
        unresolved: bool,

        /// Maximum number of alerts
        #[arg(short, long, default_value = "50")]
        limit: i64,
    },

    /// Mark an alert resolved
    Resolve {
        /// Alert ID
        id: i64,
    },

    /// Show the system activity feed
    Activity {
        /// Maximum number of entries
        #[arg(short, long, default_value = "50")]
        limit: i64,
    },

    /// Print one module's readings in a time range as JSON
    Export {
        /// Module to export (traffic, energy, environmental, population)
        #[arg(short, long)]
        module: String,

        /// Range start, Unix milliseconds
        #[arg(short, long)]
        start: i64,

        /// Range end, Unix milliseconds (defaults to now)
        #[arg(short, long)]
        end: Option<i64>,
    },

    /// Insert simulated readings with back-dated timestamps
    Seed {
        /// Number of simulator ticks
        #[arg(short, long, default_value = "288")]
        ticks: usize,

        /// Minutes between ticks
        #[arg(short, long, default_value = "5")]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let db = cli.db;

    match cli.command {
        Commands::Generate => {
            commands::generate(db).await?;
        }

        Commands::Predictions { module, limit } => {
            let module = module.as_deref().map(str::parse::<Module>).transpose()?;
            commands::predictions(db, module, limit).await?;
        }

        Commands::Latest => {
            commands::latest(db).await?;
        }

        Commands::Dashboard => {
            commands::dashboard(db).await?;
        }

        Commands::Alerts { unresolved, limit } => {
            commands::alerts(db, unresolved, limit).await?;
        }

        Commands::Resolve { id } => {
            commands::resolve(db, id).await?;
        }

        Commands::Activity { limit } => {
            commands::activity(db, limit).await?;
        }

        Commands::Export { module, start, end } => {
            commands::export(db, module.parse::<Module>()?, start, end).await?;
        }

        Commands::Seed { ticks, interval } => {
            commands::seed(db, ticks, interval).await?;
        }
    }

    Ok(())
}
