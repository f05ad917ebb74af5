//! Row-count validation for composed artifacts.
//!
//! The only integrity gate before the storage hand-off: the number of data
//! rows (header excluded) must equal the configured expectation exactly.
//!
//! # Example
//!
//! ```rust,ignore
//! use pipecsv::validate_row_count;
//!
//! // header + 2 data rows
//! assert!(validate_row_count(3, 2).is_ok());
//! assert!(validate_row_count(3, 3).is_err());
//! ```

use crate::error::{PipelineError, PipelineResult};

/// Check `row_count - 1` against `expected_data_rows`.
///
/// `row_count` includes the header line. More rows is as much a failure as
/// fewer.
pub fn validate_row_count(row_count: usize, expected_data_rows: usize) -> PipelineResult<()> {
    let observed = row_count.saturating_sub(1);

    if observed == expected_data_rows {
        Ok(())
    } else {
        Err(PipelineError::Integrity {
            observed,
            expected: expected_data_rows,
        })
    }
}

/// Quick check: returns true if the count matches.
pub fn is_valid_row_count(row_count: usize, expected_data_rows: usize) -> bool {
    validate_row_count(row_count, expected_data_rows).is_ok()
}
