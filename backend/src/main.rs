//! pipecsv CLI - turn pipe-delimited column and data files into a validated CSV
//!
//! # Main Command
//!
//! ```bash
//! pipecsv run                                   # Defaults: data/source -> data/destination
//! pipecsv run --expected-rows 2 --storage-dir archive
//! pipecsv run --config pipecsv.json --json      # Print the run report as JSON
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! pipecsv columns SOURCECOLUMNS.txt             # Show the prepared header
//! pipecsv preview SOURCECOLUMNS.txt SOURCEDATA.txt
//! pipecsv inspect data/destination/SOURCEDATA_<uuid>.csv --expected 1000
//! ```

use clap::{Parser, Subcommand};
use pipecsv::logging::init_logging;
use pipecsv::transform::compose_from_lines;
use pipecsv::{
    header_line, inspect_artifact, prepare_columns, read_lines_logged, validate_row_count,
    Pipeline, PipelineConfig, StorageConfig,
};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "pipecsv")]
#[command(about = "Pipe-delimited to CSV batch ETL with row-count validation", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full ETL pass
    Run {
        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Column definition file
        #[arg(long)]
        columns: Option<PathBuf>,

        /// Pipe-delimited data file
        #[arg(long)]
        data: Option<PathBuf>,

        /// Directory the artifact is written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Expected number of data rows (header excluded)
        #[arg(short, long)]
        expected_rows: Option<usize>,

        /// Move the validated artifact into this directory
        #[arg(long, conflicts_with = "storage_url")]
        storage_dir: Option<PathBuf>,

        /// Upload the validated artifact to this URL
        #[arg(long)]
        storage_url: Option<String>,

        /// Reject data rows whose field count differs from the column count
        #[arg(long)]
        strict: bool,

        /// Keep surrounding whitespace on input lines
        #[arg(long)]
        no_trim: bool,

        /// Print the run report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Print the header prepared from a column definition file
    Columns {
        /// Column definition file
        input: PathBuf,
    },

    /// Print the composed CSV without writing or validating it
    Preview {
        /// Column definition file
        columns: PathBuf,

        /// Pipe-delimited data file
        data: PathBuf,

        /// Number of body rows to show
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Reject data rows whose field count differs from the column count
        #[arg(long)]
        strict: bool,
    },

    /// Read an existing artifact back and report its shape
    Inspect {
        /// Artifact CSV file
        input: PathBuf,

        /// Also check the data row count against this value
        #[arg(short, long)]
        expected: Option<usize>,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            config,
            columns,
            data,
            output_dir,
            expected_rows,
            storage_dir,
            storage_url,
            strict,
            no_trim,
            json,
        } => build_config(config.as_deref()).and_then(|mut cfg| {
            if let Some(p) = columns {
                cfg.columns_path = p;
            }
            if let Some(p) = data {
                cfg.data_path = p;
            }
            if let Some(p) = output_dir {
                cfg.output_dir = p;
            }
            if let Some(n) = expected_rows {
                cfg.expected_row_count = n;
            }
            if let Some(url) = storage_url {
                cfg.storage = StorageConfig::Http { url };
            } else if let Some(dir) = storage_dir {
                cfg.storage = StorageConfig::Local { dir };
            }
            cfg.strict_field_count |= strict;
            if no_trim {
                cfg.trim_whitespace = false;
            }
            cmd_run(cfg, json)
        }),

        Commands::Columns { input } => cmd_columns(&input),

        Commands::Preview {
            columns,
            data,
            limit,
            strict,
        } => cmd_preview(&columns, &data, limit, strict),

        Commands::Inspect { input, expected } => cmd_inspect(&input, expected),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Defaults, then the optional config file, then `PIPECSV_*` variables.
fn build_config(path: Option<&Path>) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let base = match path {
        Some(p) => PipelineConfig::from_file(p)?,
        None => PipelineConfig::default(),
    };
    Ok(base.with_env()?)
}

fn cmd_run(config: PipelineConfig, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "Columns: {}, data: {}, expecting {} rows",
        config.columns_path.display(),
        config.data_path.display(),
        config.expected_row_count
    );

    let mut pipeline = Pipeline::from_config(config);
    let report = pipeline.run()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.storage.location);
    }
    Ok(())
}

fn cmd_columns(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let lines = read_lines_logged(input, true)?;
    let names = prepare_columns(&lines)?;
    println!("{}", header_line(&names));
    Ok(())
}

fn cmd_preview(
    columns: &Path,
    data: &Path,
    limit: usize,
    strict: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw_columns = read_lines_logged(columns, true)?;
    let raw_data = read_lines_logged(data, true)?;

    let (_, artifact) = compose_from_lines(&raw_columns, &raw_data, strict)?;
    for line in artifact.lines.iter().take(limit.saturating_add(1)) {
        println!("{}", line);
    }
    if artifact.data_rows() > limit {
        println!("... {} more rows", artifact.data_rows() - limit);
    }
    info!("{} data rows in total", artifact.data_rows());
    Ok(())
}

fn cmd_inspect(input: &Path, expected: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let summary = inspect_artifact(input)?;
    println!("Header: {}", summary.header.join(","));
    println!("Data rows: {}", summary.data_rows);

    if let Some(expected) = expected {
        validate_row_count(summary.data_rows + 1, expected)?;
        println!("Row count matches expected {}", expected);
    }
    Ok(())
}
