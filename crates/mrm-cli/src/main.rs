use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "mrm")]
#[command(about = "Mr. Market watchlist tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty ledger store: one row per watchlist symbol plus CASH.
    Init {
        #[arg(long = "data-dir")]
        data_dir: PathBuf,

        /// Starting cash in dollars (e.g. 10000 or 10000.50)
        #[arg(long, default_value = "0")]
        cash: String,

        /// Config overlays layered on the built-in defaults, in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,
    },

    /// Run the daily batch: reconcile, benchmark, alerts, optional ingest.
    Run {
        #[arg(long = "data-dir")]
        data_dir: PathBuf,

        /// Market data file: snapshot `.json` or daily bars `.csv`
        #[arg(long)]
        market: PathBuf,

        /// Decision text file ingested after reconciliation
        #[arg(long)]
        decision: Option<PathBuf>,

        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Write manifest.json + summary.json under <exports>/<trade_date>/<run_id>/
        #[arg(long)]
        exports: Option<PathBuf>,
    },

    /// Ingest a decision file without market data.
    Ingest {
        #[arg(long = "data-dir")]
        data_dir: PathBuf,

        #[arg(long)]
        decision: PathBuf,

        /// Date for decisions without one (default: today, UTC)
        #[arg(long = "as-of")]
        as_of: Option<NaiveDate>,

        #[arg(long = "config")]
        config_paths: Vec<String>,

        #[arg(long)]
        exports: Option<PathBuf>,
    },

    /// Print regime status from the trigger history.
    Regime {
        #[arg(long = "data-dir")]
        data_dir: PathBuf,

        #[arg(long = "config")]
        config_paths: Vec<String>,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Overlay paths in merge order, applied on the built-in defaults
        paths: Vec<String>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    // Load .env.local if present (dev convenience); silent when absent.
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Init {
            data_dir,
            cash,
            config_paths,
        } => commands::batch::init(&data_dir, &cash, &config_paths)?,

        Commands::Run {
            data_dir,
            market,
            decision,
            config_paths,
            exports,
        } => commands::batch::run(
            &data_dir,
            &market,
            decision.as_deref(),
            &config_paths,
            exports.as_deref(),
        )?,

        Commands::Ingest {
            data_dir,
            decision,
            as_of,
            config_paths,
            exports,
        } => commands::batch::ingest(&data_dir, &decision, as_of, &config_paths, exports.as_deref())?,

        Commands::Regime {
            data_dir,
            config_paths,
        } => commands::batch::regime(&data_dir, &config_paths)?,

        Commands::ConfigHash { paths } => {
            let (_, loaded) = commands::load_config(&paths)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }
    }

    Ok(())
}
