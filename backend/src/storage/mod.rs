//! Storage backends for finished artifacts.
//!
//! The pipeline calls [`Storage::load_csv`] once, after validation passed, and
//! only looks at whether it failed. There is no retry.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pipecsv::storage::{build_storage, Storage};
//! use pipecsv::config::StorageConfig;
//!
//! let storage = build_storage(&StorageConfig::Local { dir: "archive".into() });
//! let receipt = storage.load_csv(Path::new("data/destination/SOURCEDATA_x.csv"))?;
//! println!("stored at {}", receipt.location);
//! ```

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::error::{StorageError, StorageResult};

/// Request timeout for HTTP uploads
const HTTP_TIMEOUT_SECS: u64 = 60;

/// What a backend reports after accepting an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageReceipt {
    /// Backend name (`local`, `http`, `none`)
    pub backend: String,
    /// Where the artifact ended up
    pub location: String,
}

/// A place finished artifacts are handed to.
pub trait Storage {
    /// Short backend name for logs and receipts.
    fn name(&self) -> &str;

    /// Take ownership of the file at `path`.
    fn load_csv(&self, path: &Path) -> StorageResult<StorageReceipt>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load_csv(&self, path: &Path) -> StorageResult<StorageReceipt> {
        (**self).load_csv(path)
    }
}

/// Build the backend described by `config`.
pub fn build_storage(config: &StorageConfig) -> Box<dyn Storage> {
    match config {
        StorageConfig::None => Box::new(KeepInPlace),
        StorageConfig::Local { dir } => Box::new(LocalStorage::new(dir)),
        StorageConfig::Http { url } => Box::new(HttpStorage::new(url.clone())),
    }
}

// =============================================================================
// No-op backend
// =============================================================================

/// Leaves the artifact where the writer put it.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepInPlace;

impl Storage for KeepInPlace {
    fn name(&self) -> &str {
        "none"
    }

    fn load_csv(&self, path: &Path) -> StorageResult<StorageReceipt> {
        Ok(StorageReceipt {
            backend: self.name().to_string(),
            location: path.display().to_string(),
        })
    }
}

// =============================================================================
// Local directory backend
// =============================================================================

/// Moves artifacts into a directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl Storage for LocalStorage {
    fn name(&self) -> &str {
        "local"
    }

    fn load_csv(&self, path: &Path) -> StorageResult<StorageReceipt> {
        fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;

        let file_name = path.file_name().ok_or_else(|| StorageError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        })?;
        let target = self.dir.join(file_name);

        // rename fails across filesystems
        if let Err(e) = fs::rename(path, &target) {
            debug!("rename failed ({}), falling back to copy", e);
            fs::copy(path, &target).map_err(io_err(&target))?;
            fs::remove_file(path).map_err(io_err(path))?;
        }

        info!("Moved {} to {}", path.display(), target.display());
        Ok(StorageReceipt {
            backend: self.name().to_string(),
            location: target.display().to_string(),
        })
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError {
    let path = path.to_path_buf();
    move |source| StorageError::Io { path, source }
}

// =============================================================================
// HTTP backend
// =============================================================================

/// Uploads artifacts as a `text/csv` POST body.
#[derive(Debug, Clone)]
pub struct HttpStorage {
    url: String,
}

impl HttpStorage {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Storage for HttpStorage {
    fn name(&self) -> &str {
        "http"
    }

    fn load_csv(&self, path: &Path) -> StorageResult<StorageReceipt> {
        let body = fs::read(path).map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("artifact.csv");

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        let response = client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "text/csv")
            .header("X-Artifact-Name", file_name)
            .body(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("Uploaded {} to {}", file_name, self.url);
        Ok(StorageReceipt {
            backend: self.name().to_string(),
            location: format!("{}#{}", self.url, file_name),
        })
    }
}
