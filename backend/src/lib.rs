//! # pipecsv - pipe-delimited to CSV batch ETL
//!
//! One run reads a column definition file (`<ordinal>|<name>` per line) and a
//! pipe-delimited data file, and produces a single CSV artifact whose header is
//! the column names in ordinal order. The artifact is checked against an
//! expected data row count before it is handed to storage.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Line Source │────▶│  Transform  │────▶│  Artifact   │────▶│  Validate   │────▶│   Storage   │
//! │ (auto-enc)  │     │ (cols+rows) │     │ (audit copy)│     │ (row count) │     │ (local/http)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pipecsv::{Pipeline, PipelineConfig};
//!
//! let mut pipeline = Pipeline::from_config(PipelineConfig::default());
//! let report = pipeline.run()?;
//! println!("{} rows -> {}", report.data_rows, report.storage.location);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`config`] - Layered pipeline configuration
//! - [`source`] - Line source with encoding detection
//! - [`transform`] - Column preparation, row transformation, composition, pipeline
//! - [`validation`] - Row-count integrity gate
//! - [`artifact`] - Artifact naming, writing and read-back
//! - [`storage`] - Storage backends
//! - [`logging`] - Tracing subscriber setup

// Core modules
pub mod config;
pub mod error;

// Input
pub mod source;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// Output
pub mod artifact;
pub mod storage;

pub mod logging;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ArtifactError, ConfigError, PipelineError, PipelineResult, SourceError, StorageError,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{PipelineConfig, StorageConfig};

// =============================================================================
// Re-exports - Line Source
// =============================================================================

pub use source::{read_lines, read_lines_logged};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    compose, header_line, prepare_columns, transform_rows, ColumnDefinition, ComposedArtifact,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid_row_count, validate_row_count};

// =============================================================================
// Re-exports - Artifact & Storage
// =============================================================================

pub use artifact::{artifact_name, inspect_artifact, ArtifactSummary, ArtifactWriter};
pub use storage::{build_storage, HttpStorage, KeepInPlace, LocalStorage, Storage, StorageReceipt};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    compose_from_lines, run_core, Pipeline, PipelineState, RunReport, Stage,
};
