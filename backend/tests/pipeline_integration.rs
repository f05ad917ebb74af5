//! End-to-end runs of the pipeline against temporary directories.

use pipecsv::error::StorageResult;
use pipecsv::{
    inspect_artifact, LocalStorage, Pipeline, PipelineConfig, PipelineError, PipelineState, Stage,
    Storage, StorageReceipt,
};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// Storage double that records every hand-off and leaves the file alone.
#[derive(Default)]
struct RecordingStorage {
    calls: RefCell<Vec<PathBuf>>,
}

impl Storage for RecordingStorage {
    fn name(&self) -> &str {
        "recording"
    }

    fn load_csv(&self, path: &Path) -> StorageResult<StorageReceipt> {
        self.calls.borrow_mut().push(path.to_path_buf());
        Ok(StorageReceipt {
            backend: self.name().to_string(),
            location: path.display().to_string(),
        })
    }
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(columns: &str, data: &str) -> Self {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("source")).unwrap();
        fs::write(dir.path().join("source/SOURCECOLUMNS.txt"), columns).unwrap();
        fs::write(dir.path().join("source/SOURCEDATA.txt"), data).unwrap();
        Self { dir }
    }

    fn config(&self, expected_row_count: usize) -> PipelineConfig {
        PipelineConfig {
            columns_path: self.dir.path().join("source/SOURCECOLUMNS.txt"),
            data_path: self.dir.path().join("source/SOURCEDATA.txt"),
            output_dir: self.dir.path().join("destination"),
            expected_row_count,
            ..PipelineConfig::default()
        }
    }

    fn written_files(&self) -> Vec<PathBuf> {
        match fs::read_dir(self.dir.path().join("destination")) {
            Ok(entries) => entries.flatten().map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        }
    }
}

#[test]
fn test_successful_run() {
    let ws = Workspace::new("1|name\n0|id\n", "2|bob\n1|alice\n");
    let mut pipeline = Pipeline::new(ws.config(2), RecordingStorage::default());

    let report = pipeline.run().unwrap();

    assert_eq!(report.columns, vec!["id", "name"]);
    assert_eq!(report.data_rows, 2);
    assert!(report.artifact_name.starts_with("SOURCEDATA_"));
    assert_eq!(
        fs::read_to_string(&report.artifact_path).unwrap(),
        "id,name\n2,bob\n1,alice"
    );
    assert_eq!(pipeline.state(), PipelineState::Active(Stage::Persisted));
    assert_eq!(
        *pipeline.storage().calls.borrow(),
        vec![report.artifact_path.clone()]
    );
}

#[test]
fn test_row_count_mismatch_blocks_storage() {
    let ws = Workspace::new("1|name\n0|id\n", "2|bob\n1|alice\n");
    let mut pipeline = Pipeline::new(ws.config(3), RecordingStorage::default());

    let err = pipeline.run().unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Integrity {
            observed: 2,
            expected: 3
        }
    ));
    assert!(pipeline.storage().calls.borrow().is_empty());
    assert_eq!(pipeline.state(), PipelineState::Failed(Stage::Composed));

    // The audit copy stays on disk.
    let files = ws.written_files();
    assert_eq!(files.len(), 1);
    assert_eq!(
        fs::read_to_string(&files[0]).unwrap(),
        "id,name\n2,bob\n1,alice"
    );
}

#[test]
fn test_malformed_columns_stop_before_data_read() {
    // The data file is missing: a malformed column file must fail first.
    let ws = Workspace::new("abc|name\n", "");
    fs::remove_file(ws.dir.path().join("source/SOURCEDATA.txt")).unwrap();
    let mut pipeline = Pipeline::new(ws.config(1), RecordingStorage::default());

    let err = pipeline.run().unwrap_err();

    assert!(matches!(err, PipelineError::MalformedInput { line: 1, .. }));
    assert_eq!(pipeline.state(), PipelineState::Failed(Stage::Idle));
    assert!(ws.written_files().is_empty());
}

#[test]
fn test_empty_column_file() {
    let ws = Workspace::new("", "2|bob\n");
    let mut pipeline = Pipeline::new(ws.config(1), RecordingStorage::default());

    let err = pipeline.run().unwrap_err();

    assert!(matches!(err, PipelineError::EmptyInput(_)));
    assert!(ws.written_files().is_empty());
}

#[test]
fn test_empty_data_file() {
    let ws = Workspace::new("0|id\n", "");
    let mut pipeline = Pipeline::new(ws.config(0), RecordingStorage::default());

    let err = pipeline.run().unwrap_err();

    assert!(matches!(err, PipelineError::EmptyInput(_)));
    assert_eq!(pipeline.state(), PipelineState::Failed(Stage::ColumnsLoaded));
    assert!(ws.written_files().is_empty());
    assert!(pipeline.storage().calls.borrow().is_empty());
}

#[test]
fn test_strict_mode_rejects_ragged_rows() {
    let ws = Workspace::new("0|id\n1|name\n", "1|alice\n2|bob|extra\n");

    let mut permissive = Pipeline::new(ws.config(2), RecordingStorage::default());
    assert!(permissive.run().is_ok());

    let mut config = ws.config(2);
    config.strict_field_count = true;
    let mut strict = Pipeline::new(config, RecordingStorage::default());
    let err = strict.run().unwrap_err();
    assert!(matches!(
        err,
        PipelineError::FieldCountMismatch {
            line: 2,
            expected: 2,
            found: 3
        }
    ));
}

#[test]
fn test_two_runs_produce_identical_content() {
    let ws = Workspace::new("1|b\n0|a\n2|c\n", "1|2|3\n4|5|6\n7|8|9\n");

    let first = Pipeline::new(ws.config(3), RecordingStorage::default())
        .run()
        .unwrap();
    let second = Pipeline::new(ws.config(3), RecordingStorage::default())
        .run()
        .unwrap();

    assert_ne!(first.artifact_name, second.artifact_name);
    assert_eq!(
        fs::read_to_string(&first.artifact_path).unwrap(),
        fs::read_to_string(&second.artifact_path).unwrap()
    );
}

#[test]
fn test_local_storage_hand_off() {
    let ws = Workspace::new("0|id\n1|name\n", "1|alice\n");
    let archive = ws.dir.path().join("archive");
    let mut pipeline = Pipeline::new(ws.config(1), LocalStorage::new(&archive));

    let report = pipeline.run().unwrap();

    let stored = archive.join(&report.artifact_name);
    assert!(!report.artifact_path.exists());
    assert_eq!(report.storage.location, stored.display().to_string());

    let summary = inspect_artifact(&stored).unwrap();
    assert_eq!(summary.header, vec!["id", "name"]);
    assert_eq!(summary.data_rows, 1);
}

#[test]
fn test_inspect_agrees_with_run_on_blank_rows() {
    let ws = Workspace::new("0|id\n1|name\n", "1|a\n\n2|b\n");
    let mut pipeline = Pipeline::new(ws.config(3), RecordingStorage::default());

    let report = pipeline.run().unwrap();
    assert_eq!(report.data_rows, 3);

    let summary = inspect_artifact(&report.artifact_path).unwrap();
    assert_eq!(summary.data_rows, report.data_rows);
}
