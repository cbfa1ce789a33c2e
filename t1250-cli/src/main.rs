//! T1250 CLI
//!
//! Loads one T1250 consignment file into the job store.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;

use t1250::db::default_database_path;
use t1250::notify::{default_flags_directory, CommsQueue, FlagDirQueue};
use t1250::pipeline::{AbortReason, CancelFlag, FileOutcome, Pipeline, RunOptions};
use t1250::{load_config, Database, SqliteStore};

#[derive(Parser)]
#[command(name = "t1250")]
#[command(about = "T1250 consignment loader", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load one file inside a single transaction
    Ingest {
        /// Loader configuration (JSON)
        #[arg(long, env = "T1250_CONFIG")]
        config: PathBuf,

        /// Business unit code the file belongs to
        #[arg(long, short = 'b', env = "T1250_BUSINESS_UNIT")]
        business_unit: String,

        /// SQLite database; overrides the configuration
        #[arg(long, env = "T1250_DATABASE")]
        database: Option<PathBuf>,

        /// Directory receiving notification flags; overrides the configuration
        #[arg(long, env = "T1250_FLAGS_DIR")]
        flags_dir: Option<PathBuf>,

        /// Process every record, then roll back
        #[arg(long)]
        dry_run: bool,

        file: PathBuf,
    },
    /// Validate a configuration and every business unit it defines
    CheckConfig {
        #[arg(long, env = "T1250_CONFIG")]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Ingest {
            config,
            business_unit,
            database,
            flags_dir,
            dry_run,
            file,
        } => ingest(
            &config,
            &business_unit,
            database,
            flags_dir,
            dry_run,
            &file,
        ),
        Commands::CheckConfig { config } => check_config(&config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to bridge log records: {}", e);
    }
    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "t1250=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {}", e);
    }
}

fn ingest(
    config_path: &Path,
    business_unit: &str,
    database: Option<PathBuf>,
    flags_dir: Option<PathBuf>,
    dry_run: bool,
    file: &Path,
) -> Result<ExitCode> {
    let config = load_config(config_path)
        .with_context(|| format!("Loading {}", config_path.display()))?;
    let profile = config.resolve(business_unit)?;

    let database_path = database
        .or_else(|| config.database_path.as_ref().map(PathBuf::from))
        .or_else(default_database_path)
        .ok_or_else(|| anyhow!("No database path given and no home directory found"))?;
    let flags_dir = flags_dir
        .or_else(|| config.flags_directory.as_ref().map(PathBuf::from))
        .or_else(default_flags_directory)
        .ok_or_else(|| anyhow!("No flags directory given and no home directory found"))?;

    let db = Database::open(&database_path)
        .with_context(|| format!("Opening {}", database_path.display()))?;
    let queue: Box<dyn CommsQueue> = Box::new(FlagDirQueue::new(&flags_dir));
    let pipeline = Pipeline::new(Arc::new(profile), SqliteStore::new(db), queue);

    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    ctrlc::set_handler(move || {
        tracing::warn!("Interrupted, rolling back after the current record");
        handler_flag.cancel();
    })
    .context("Installing Ctrl-C handler")?;

    let options = RunOptions { dry_run, cancel };
    let report = pipeline.run_file(file, &options)?;

    println!(
        "{}: {} read, {} jobs created, {} jobs updated, {} items created, {} markers, {} alerts",
        report.run_id,
        report.records_read,
        report.jobs_created,
        report.jobs_updated,
        report.items_created,
        report.markers.len(),
        report.alerts.len(),
    );

    Ok(match report.outcome {
        FileOutcome::Committed | FileOutcome::RolledBack(AbortReason::DryRun) => {
            ExitCode::SUCCESS
        }
        FileOutcome::RolledBack(_) => ExitCode::FAILURE,
    })
}

fn check_config(config_path: &Path) -> Result<ExitCode> {
    let config = load_config(config_path)
        .with_context(|| format!("Loading {}", config_path.display()))?;
    for bu in &config.business_units {
        let profile = config.resolve(&bu.code)?;
        tracing::info!(
            business_unit = %profile.business_unit,
            bu_id = profile.bu_id,
            fields = profile.fields.len(),
            job_rules = profile.job_rules.len(),
            item_rules = profile.item_rules.len(),
            "Business unit resolved"
        );
    }
    println!("{} is valid", config_path.display());
    Ok(ExitCode::SUCCESS)
}
