//! Pipeline configuration.
//!
//! Built in layers: defaults, then an optional JSON file, then `PIPECSV_*`
//! environment variables, then CLI flags (applied by `main`). Tests build a
//! [`PipelineConfig`] directly with whatever values they need.
//!
//! ```json
//! {
//!   "columns_path": "data/source/SOURCECOLUMNS.txt",
//!   "data_path": "data/source/SOURCEDATA.txt",
//!   "output_dir": "data/destination",
//!   "expected_row_count": 1000,
//!   "storage": { "kind": "local", "dir": "data/archive" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

/// Default column definition file.
pub const DEFAULT_COLUMNS_PATH: &str = "data/source/SOURCECOLUMNS.txt";

/// Default data file.
pub const DEFAULT_DATA_PATH: &str = "data/source/SOURCEDATA.txt";

/// Default directory the artifact is written to.
pub const DEFAULT_OUTPUT_DIR: &str = "data/destination";

/// Default number of data rows a run must produce.
pub const DEFAULT_EXPECTED_ROW_COUNT: usize = 1000;

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "PIPECSV_";

/// Where the finished artifact goes after validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Leave the artifact where it was written.
    #[default]
    None,
    /// Move the artifact into a directory.
    Local { dir: PathBuf },
    /// Upload the artifact body to an HTTP endpoint.
    Http { url: String },
}

/// Everything one run needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Column definition file (`<ordinal>|<name>` per line)
    pub columns_path: PathBuf,

    /// Pipe-delimited data file
    pub data_path: PathBuf,

    /// Directory the artifact is written to
    pub output_dir: PathBuf,

    /// Data rows (header excluded) the artifact must contain
    pub expected_row_count: usize,

    /// Trim surrounding whitespace from every input line
    pub trim_whitespace: bool,

    /// Reject data rows whose field count differs from the column count
    pub strict_field_count: bool,

    /// Storage backend for the finished artifact
    pub storage: StorageConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            columns_path: PathBuf::from(DEFAULT_COLUMNS_PATH),
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            expected_row_count: DEFAULT_EXPECTED_ROW_COUNT,
            trim_whitespace: true,
            strict_field_count: false,
            storage: StorageConfig::None,
        }
    }
}

impl PipelineConfig {
    /// Load a JSON config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse a JSON config document.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply `PIPECSV_*` variables from the process environment.
    ///
    /// Variables outside the prefix are never decoded, so a non-Unicode
    /// entry elsewhere in the environment is harmless.
    pub fn with_env(self) -> ConfigResult<Self> {
        let vars = prefixed_vars(std::env::vars_os())?;
        self.with_overrides(vars)
    }

    /// Apply `PIPECSV_*` overrides from any key/value source.
    ///
    /// Unknown keys are ignored. `PIPECSV_STORAGE_URL` wins over
    /// `PIPECSV_STORAGE_DIR` when both are set.
    pub fn with_overrides<I, K, V>(mut self, vars: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut storage_dir = None;
        let mut storage_url = None;

        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value: String = value.into();

            match name {
                "COLUMNS" => self.columns_path = PathBuf::from(value),
                "DATA" => self.data_path = PathBuf::from(value),
                "OUTPUT_DIR" => self.output_dir = PathBuf::from(value),
                "EXPECTED_ROWS" => {
                    self.expected_row_count =
                        value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                            key: key.as_ref().to_string(),
                            value: value.clone(),
                        })?;
                }
                "TRIM" => self.trim_whitespace = parse_bool(key.as_ref(), &value)?,
                "STRICT" => self.strict_field_count = parse_bool(key.as_ref(), &value)?,
                "STORAGE_DIR" => storage_dir = Some(PathBuf::from(value)),
                "STORAGE_URL" => storage_url = Some(value),
                _ => {}
            }
        }

        if let Some(url) = storage_url {
            self.storage = StorageConfig::Http { url };
        } else if let Some(dir) = storage_dir {
            self.storage = StorageConfig::Local { dir };
        }

        Ok(self)
    }

    /// Artifact name stem: the data file's stem (`SOURCEDATA` by default).
    pub fn artifact_stem(&self) -> String {
        self.data_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("artifact")
            .to_string()
    }
}

/// Keep `PIPECSV_*` entries, requiring their values to be valid Unicode.
fn prefixed_vars<I>(vars: I) -> ConfigResult<Vec<(String, String)>>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut out = Vec::new();
    for (key, value) in vars {
        let Some(key) = key.to_str().filter(|k| k.starts_with(ENV_PREFIX)) else {
            continue;
        };
        let value = value.into_string().map_err(|raw| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string_lossy().into_owned(),
        })?;
        out.push((key.to_string(), value));
    }
    Ok(out)
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
