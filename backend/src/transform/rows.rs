//! Row transformation: pipe-delimited data rows to comma-delimited rows.
//!
//! Field values pass through untouched: no trimming, quoting or escaping.

use super::columns::{OUTPUT_DELIMITER, SOURCE_DELIMITER};
use crate::error::{PipelineError, PipelineResult};

/// Convert one data row.
pub fn transform_row(line: &str) -> String {
    line.replace(SOURCE_DELIMITER, &OUTPUT_DELIMITER.to_string())
}

/// Convert every data row, preserving order and count.
pub fn transform_rows(raw_lines: &[String]) -> PipelineResult<Vec<String>> {
    if raw_lines.is_empty() {
        return Err(PipelineError::EmptyInput(
            "data file contains no rows".to_string(),
        ));
    }

    Ok(raw_lines.iter().map(|line| transform_row(line)).collect())
}

/// Number of fields in a pipe-delimited row.
pub fn field_count(line: &str) -> usize {
    line.matches(SOURCE_DELIMITER).count() + 1
}

/// Check every data row has `column_count` fields.
///
/// Only used when strict mode is on; by default rows are trusted to line up
/// with the column file.
pub fn check_field_counts(raw_lines: &[String], column_count: usize) -> PipelineResult<()> {
    for (i, line) in raw_lines.iter().enumerate() {
        let found = field_count(line);
        if found != column_count {
            return Err(PipelineError::FieldCountMismatch {
                line: i + 1,
                expected: column_count,
                found,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_transform_rows() {
        let out = transform_rows(&lines(&["2|bob", "1|alice"])).unwrap();
        assert_eq!(out, vec!["2,bob", "1,alice"]);
    }

    #[test]
    fn test_values_kept_verbatim() {
        assert_eq!(transform_row(" a | b |"), " a , b ,");
        assert_eq!(transform_row("no delimiter"), "no delimiter");
    }

    #[test]
    fn test_length_and_field_count_preserved() {
        let raw = lines(&["a|b|c", "", "x||z", "|"]);
        let out = transform_rows(&raw).unwrap();
        assert_eq!(out.len(), raw.len());
        for (src, dst) in raw.iter().zip(&out) {
            let src_fields: Vec<&str> = src.split('|').collect();
            let dst_fields: Vec<&str> = dst.split(',').collect();
            assert_eq!(src_fields, dst_fields);
        }
    }

    #[test]
    fn test_empty_input() {
        let err = transform_rows(&[]).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput(_)));
    }

    #[test]
    fn test_check_field_counts() {
        let raw = lines(&["1|alice", "2|bob|extra"]);
        assert!(check_field_counts(&raw[..1], 2).is_ok());

        let err = check_field_counts(&raw, 2).unwrap_err();
        match err {
            PipelineError::FieldCountMismatch {
                line,
                expected,
                found,
            } => {
                assert_eq!((line, expected, found), (2, 2, 3));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
