//! Artifact writer: names the output CSV and writes it to disk.
//!
//! The file written here stays on disk even when the run later fails
//! validation, so an operator can inspect what was produced.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::error::{ArtifactError, ArtifactResult};
use crate::transform::ComposedArtifact;

/// Unique artifact file name: `{stem}_{uuid}.csv`.
pub fn artifact_name(stem: &str) -> String {
    format!("{}_{}.csv", stem, Uuid::new_v4())
}

/// Writes composed artifacts into one directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Write `artifact` as `name` inside the output directory.
    ///
    /// Creates the directory if needed and returns the full path written.
    pub fn write(&self, artifact: &ComposedArtifact, name: &str) -> ArtifactResult<PathBuf> {
        fs::create_dir_all(&self.output_dir).map_err(|source| ArtifactError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let path = self.output_dir.join(name);
        fs::write(&path, artifact.contents()).map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;

        info!("Wrote {} rows to {}", artifact.row_count, path.display());
        Ok(path)
    }
}

/// What an artifact on disk contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactSummary {
    pub header: Vec<String>,
    pub data_rows: usize,
}

/// Read an artifact back and count its rows.
///
/// The header is parsed with fields taken verbatim (no quote handling,
/// matching how artifacts are written). Data rows are counted per `\n`
/// separator, so blank rows count the same way the pipeline counted them,
/// including a blank last row.
pub fn inspect_artifact(path: &Path) -> ArtifactResult<ArtifactSummary> {
    let contents = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(contents.as_bytes());
    let header = reader.headers()?.iter().map(str::to_string).collect();

    let data_rows = contents.split('\n').count().saturating_sub(1);

    Ok(ArtifactSummary { header, data_rows })
}
