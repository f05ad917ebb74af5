//! Pipeline orchestration for one ETL run.
//!
//! Combines every step: reading both input files, column preparation, row
//! transformation, composition, the audit write, row-count validation and the
//! storage hand-off.
//!
//! # Example
//!
//! ```rust,ignore
//! use pipecsv::{Pipeline, PipelineConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut pipeline = Pipeline::from_config(PipelineConfig::default());
//!     let report = pipeline.run()?;
//!
//!     println!("Wrote {} rows to {}", report.data_rows, report.artifact_path.display());
//!     Ok(())
//! }
//! ```
//!
//! # States
//!
//! ```text
//! Idle → ColumnsLoaded → DataLoaded → Transformed → Composed → Validated → Persisted
//!   └──────────┴─────────────┴─────────────┴────────────┴───────────┴──→ Failed(stage)
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use super::columns::{header_line, prepare_columns};
use super::compose::{compose, ComposedArtifact};
use super::rows::{check_field_counts, transform_rows};
use crate::artifact::{artifact_name, ArtifactWriter};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult, SourceError};
use crate::source::read_lines_logged;
use crate::storage::{build_storage, Storage, StorageReceipt};
use crate::validation::validate_row_count;

/// Progress points of a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Stage {
    Idle,
    ColumnsLoaded,
    DataLoaded,
    Transformed,
    Composed,
    Validated,
    Persisted,
}

/// Where a pipeline instance is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    /// Last stage reached successfully.
    Active(Stage),
    /// The run stopped; carries the last stage reached before the error.
    Failed(Stage),
}

/// Summary of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Unique artifact file name
    pub artifact_name: String,

    /// Where the artifact was written before the hand-off
    pub artifact_path: PathBuf,

    /// Header names in output order
    pub columns: Vec<String>,

    /// Data rows written (header excluded)
    pub data_rows: usize,

    /// Configured expectation the run was validated against
    pub expected_rows: usize,

    /// What the storage backend reported
    pub storage: StorageReceipt,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// One ETL pass. Each instance runs at most once.
pub struct Pipeline<S: Storage> {
    config: PipelineConfig,
    storage: S,
    state: PipelineState,
}

impl Pipeline<Box<dyn Storage>> {
    /// Build a pipeline with the storage backend named in `config`.
    pub fn from_config(config: PipelineConfig) -> Self {
        let storage = build_storage(&config.storage);
        Self::new(config, storage)
    }
}

impl<S: Storage> Pipeline<S> {
    pub fn new(config: PipelineConfig, storage: S) -> Self {
        Self {
            config,
            storage,
            state: PipelineState::Active(Stage::Idle),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run every stage, stopping at the first failure.
    ///
    /// The artifact is written to `output_dir` before validation and stays
    /// there if validation fails; it only reaches storage once validated.
    pub fn run(&mut self) -> PipelineResult<RunReport> {
        if self.state != PipelineState::Active(Stage::Idle) {
            return Err(PipelineError::AlreadyRun);
        }

        match self.execute() {
            Ok(report) => Ok(report),
            Err(e) => {
                if let PipelineState::Active(stage) = self.state {
                    self.state = PipelineState::Failed(stage);
                }
                error!("ETL process failed: {}", e);
                Err(e)
            }
        }
    }

    fn advance(&mut self, stage: Stage) {
        self.state = PipelineState::Active(stage);
    }

    fn execute(&mut self) -> PipelineResult<RunReport> {
        let started_at = Utc::now();
        let trim = self.config.trim_whitespace;
        info!("Beginning the ETL process...");

        // Columns are prepared before the data file is touched.
        let raw_columns = read_input(&self.config.columns_path, trim)?;
        let columns = prepare_columns(&raw_columns)?;
        self.advance(Stage::ColumnsLoaded);
        info!("Prepared {} columns", columns.len());

        let raw_data = read_input(&self.config.data_path, trim)?;
        if self.config.strict_field_count {
            check_field_counts(&raw_data, columns.len())?;
        }
        self.advance(Stage::DataLoaded);

        info!("Prepping source data...");
        let body = transform_rows(&raw_data)?;
        self.advance(Stage::Transformed);

        info!("Composing CSV file...");
        let artifact = compose(&[header_line(&columns)], body)?;
        self.advance(Stage::Composed);

        info!("Writing CSV data to file...");
        let name = artifact_name(&self.config.artifact_stem());
        let artifact_path = ArtifactWriter::new(&self.config.output_dir).write(&artifact, &name)?;

        info!("Running row count verification...");
        if let Err(e) = validate_row_count(artifact.row_count, self.config.expected_row_count) {
            error!("Row counts between source data and CSV file not matching!");
            return Err(e);
        }
        self.advance(Stage::Validated);
        info!("Row count verification succeeded...");

        info!(
            "Attempting to move CSV file to destination ({})...",
            self.storage.name()
        );
        let storage = self.storage.load_csv(&artifact_path)?;
        self.advance(Stage::Persisted);
        info!("Successfully moved file {}...", name);

        info!("ETL process complete...");
        Ok(RunReport {
            artifact_name: name,
            artifact_path,
            data_rows: artifact.data_rows(),
            columns,
            expected_rows: self.config.expected_row_count,
            storage,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

/// Read a required input file; zero lines becomes [`PipelineError::EmptyInput`].
fn read_input(path: &Path, trim: bool) -> PipelineResult<Vec<String>> {
    read_lines_logged(path, trim).map_err(|e| match e {
        SourceError::Empty(path) => {
            PipelineError::EmptyInput(format!("{} has no lines", path.display()))
        }
        other => other.into(),
    })
}

/// Prepare, transform and compose already-read lines. No validation, no I/O.
///
/// Returns the prepared column names alongside the composed artifact.
pub fn compose_from_lines(
    raw_columns: &[String],
    raw_data: &[String],
    strict_field_count: bool,
) -> PipelineResult<(Vec<String>, ComposedArtifact)> {
    let columns = prepare_columns(raw_columns)?;
    if strict_field_count {
        check_field_counts(raw_data, columns.len())?;
    }
    let body = transform_rows(raw_data)?;
    let artifact = compose(&[header_line(&columns)], body)?;
    Ok((columns, artifact))
}

/// The in-memory core: compose, then validate against `expected_data_rows`.
pub fn run_core(
    raw_columns: &[String],
    raw_data: &[String],
    expected_data_rows: usize,
    strict_field_count: bool,
) -> PipelineResult<ComposedArtifact> {
    let (_, artifact) = compose_from_lines(raw_columns, raw_data, strict_field_count)?;
    validate_row_count(artifact.row_count, expected_data_rows)?;
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::KeepInPlace;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_run_core_scenario() {
        let artifact = run_core(
            &lines(&["1|name", "0|id"]),
            &lines(&["2|bob", "1|alice"]),
            2,
            false,
        )
        .unwrap();

        assert_eq!(artifact.lines, vec!["id,name", "2,bob", "1,alice"]);
        assert_eq!(artifact.row_count, 3);
    }

    #[test]
    fn test_run_core_integrity_failure() {
        let err = run_core(
            &lines(&["1|name", "0|id"]),
            &lines(&["2|bob", "1|alice"]),
            3,
            false,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Integrity {
                observed: 2,
                expected: 3
            }
        ));
    }

    #[test]
    fn test_run_core_is_deterministic() {
        let cols = lines(&["2|c", "0|a", "1|b"]);
        let data = lines(&["1|2|3", "4|5|6"]);
        let first = run_core(&cols, &data, 2, true).unwrap();
        let second = run_core(&cols, &data, 2, true).unwrap();
        assert_eq!(first.lines, second.lines);
    }

    #[test]
    fn test_permissive_field_count_by_default() {
        let cols = lines(&["0|id", "1|name"]);
        let data = lines(&["1|alice|extra"]);

        assert!(compose_from_lines(&cols, &data, false).is_ok());
        let err = compose_from_lines(&cols, &data, true).unwrap_err();
        assert!(matches!(err, PipelineError::FieldCountMismatch { .. }));
    }

    #[test]
    fn test_missing_columns_file_fails_at_idle() {
        let config = PipelineConfig {
            columns_path: PathBuf::from("does/not/exist/cols.txt"),
            ..PipelineConfig::default()
        };
        let mut pipeline = Pipeline::new(config, KeepInPlace);

        let err = pipeline.run().unwrap_err();
        assert!(matches!(err, PipelineError::Source(_)));
        assert_eq!(pipeline.state(), PipelineState::Failed(Stage::Idle));

        // A failed instance is spent.
        assert!(matches!(pipeline.run(), Err(PipelineError::AlreadyRun)));
    }
}
