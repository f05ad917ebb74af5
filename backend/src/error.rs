//! Error types for the pipecsv ETL pipeline.
//!
//! One enum per layer, converted upward with `#[from]` so `?` works across
//! boundaries:
//!
//! - [`SourceError`] - Reading the column and data files
//! - [`ArtifactError`] - Writing the composed CSV to disk
//! - [`StorageError`] - Handing the artifact to the storage backend
//! - [`ConfigError`] - Loading the pipeline configuration
//! - [`PipelineError`] - Top-level run errors
//!
//! None of these are recovered locally. Every variant carries enough context
//! (path, offending value, observed vs expected) to diagnose a failed run
//! without re-running it.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Line Source Errors
// =============================================================================

/// Errors while reading a line-oriented input file.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The location was empty or otherwise unusable.
    #[error("Invalid location '{0}': provide a valid file path")]
    InvalidLocation(String),

    /// The file could not be read.
    #[error("Failed to read file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but holds no lines.
    #[error("File {} is empty", .0.display())]
    Empty(PathBuf),
}

// =============================================================================
// Artifact Errors
// =============================================================================

/// Errors while writing the composed artifact to disk.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Directory creation, file write or read-back failed.
    #[error("Artifact IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An artifact read back from disk has an unreadable header.
    #[error("Failed to read artifact as CSV: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors from the storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Local move/copy failed.
    #[error("Storage IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP request could not be completed.
    #[error("Storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Storage rejected artifact (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while building the pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for [`crate::config::PipelineConfig`].
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An environment override could not be parsed.
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::transform::pipeline::Pipeline::run`] and by
/// each core stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required input is missing or has zero lines.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A column definition line breaks the `<ordinal>|<name>` contract.
    #[error("Malformed column definition at line {line} ('{value}'): {reason}")]
    MalformedInput {
        line: usize,
        value: String,
        reason: String,
    },

    /// A data row has a different field count than the column file (strict mode only).
    #[error("Data row {line} has {found} fields, expected {expected}")]
    FieldCountMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Header or body missing at composition time.
    #[error("Cannot compose CSV: {0}")]
    Composition(String),

    /// Data row count does not match the configured expectation.
    #[error("Row count mismatch: observed {observed} data rows, expected {expected}")]
    Integrity { observed: usize, expected: usize },

    /// The pipeline instance was already used.
    #[error("Pipeline has already run; create a new one for another pass")]
    AlreadyRun,

    /// Line source error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Artifact write error.
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// Storage hand-off error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for line source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for artifact operations.
pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
