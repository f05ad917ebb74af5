//! Transformation module.
//!
//! The in-memory core of the ETL pass plus its orchestration:
//! - Columns: column definitions to sorted header names
//! - Rows: pipe-delimited rows to comma-delimited rows
//! - Compose: header + body to the final CSV lines
//! - Pipeline: one full run, from input files to the storage hand-off

pub mod columns;
pub mod compose;
pub mod pipeline;
pub mod rows;

pub use columns::{header_line, parse_columns, prepare_columns, ColumnDefinition};
pub use compose::{compose, ComposedArtifact};
pub use pipeline::*;
pub use rows::{check_field_counts, transform_row, transform_rows};
