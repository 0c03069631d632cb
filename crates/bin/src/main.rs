//! ridetime CLI binary.
//!
//! Provides the command-line interface for the trip duration training pipeline.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use ridetime::output::{ExportFormat, RunSummary};
use ridetime::{DEFAULT_DATE, Deployment, PipelineConfig, run_pipeline};
use ridetime_data::cache::default_cache_dir;
use ridetime_data::{FetchConfig, SourceLayout, get_paths};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ridetime")]
#[command(about = "ridetime: monthly trip duration model training", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on the month two before the reference date and validate on the month before
    Run {
        /// Reference date (YYYY-MM-DD)
        #[arg(long, default_value = DEFAULT_DATE)]
        date: String,

        /// Existing directory receiving the model artifacts
        #[arg(long, default_value = "models")]
        models_dir: PathBuf,

        /// Base URL or local directory holding the monthly trip files
        #[arg(long)]
        source_base: Option<String>,

        /// Disable caching (always download)
        #[arg(long)]
        no_cache: bool,

        /// Force refresh cached downloads
        #[arg(long)]
        refresh: bool,

        /// Write a run report (CSV when the extension is .csv, JSON otherwise)
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Show the training and validation sources for a reference date
    Paths {
        /// Reference date (YYYY-MM-DD)
        #[arg(long, default_value = DEFAULT_DATE)]
        date: String,

        /// Base URL or local directory holding the monthly trip files
        #[arg(long)]
        source_base: Option<String>,
    },

    /// Print the scheduler deployment declaration as JSON
    Deployment,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Run {
            date,
            models_dir,
            source_base,
            no_cache,
            refresh,
            report,
        } => {
            let config = PipelineConfig {
                date,
                models_dir,
                layout: layout(source_base),
                fetch: FetchConfig {
                    use_cache: !no_cache,
                    force_refresh: refresh,
                    cache_dir: None,
                },
                ..PipelineConfig::default()
            };
            train(&config, report).await?;
        }
        Commands::Paths { date, source_base } => {
            let paths = get_paths(&date, &layout(source_base))?;
            println!("Training ({}):   {}", paths.train_period, paths.train);
            println!("Validation ({}): {}", paths.validation_period, paths.validation);
        }
        Commands::Deployment => {
            println!("{}", Deployment::model_training().to_json()?);
        }
    }

    Ok(())
}

fn init_logging(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| e.to_string())?;
    Ok(())
}

fn layout(source_base: Option<String>) -> SourceLayout {
    source_base.map_or_else(SourceLayout::default, SourceLayout::with_base)
}

async fn train(
    config: &PipelineConfig,
    report: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Training trip duration model");
    println!("  Reference date: {}", config.date);
    println!("  Models directory: {}", config.models_dir.display());
    if config.fetch.use_cache {
        println!("  Cache location: {}", default_cache_dir().display());
    } else {
        println!("  Cache: Disabled");
    }
    println!();

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {elapsed} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Running pipeline...");

    let summary = match run_pipeline(config).await {
        Ok(summary) => {
            pb.finish_with_message("Pipeline finished");
            summary
        }
        Err(e) => {
            pb.finish_with_message("Pipeline failed");
            return Err(e.into());
        }
    };

    print_summary(&summary);

    if let Some(path) = report {
        summary.export_to_file(&path, ExportFormat::from_path(&path))?;
        println!("  Report: {}", path.display());
    }

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("  Training:   {} rows from {}", summary.train_rows, summary.train_source);
    println!(
        "  Validation: {} rows from {}",
        summary.validation_rows, summary.validation_source
    );
    println!("  Features:   {}", summary.n_features);
    println!("  RMSE (training):   {:.4}", summary.train_rmse);
    println!("  RMSE (validation): {:.4}", summary.validation_rmse);
    println!("  Vectorizer: {}", summary.vectorizer_path);
    println!("  Model:      {}", summary.model_path);
}
