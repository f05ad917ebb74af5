//! Column preparation: `<ordinal>|<name>` lines to header names in ordinal order.
//!
//! # Example
//!
//! ```text
//! 1|name          0|id           id
//! 0|id      →     1|name    →    name
//! ```

use std::collections::HashSet;
use tracing::warn;

use crate::error::{PipelineError, PipelineResult};

/// Field delimiter of both source files.
pub const SOURCE_DELIMITER: char = '|';

/// Field delimiter of the output artifact.
pub const OUTPUT_DELIMITER: char = ',';

/// One parsed column definition line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    /// Intended output position.
    pub ordinal: i64,
    /// Header label.
    pub name: String,
}

impl ColumnDefinition {
    /// Parse a single `<ordinal>|<name>` line.
    ///
    /// `line_no` is 1-based and only used for error context. Whitespace around
    /// the ordinal is tolerated; the name is kept verbatim.
    pub fn parse(line: &str, line_no: usize) -> PipelineResult<Self> {
        let malformed = |reason: &str| PipelineError::MalformedInput {
            line: line_no,
            value: line.to_string(),
            reason: reason.to_string(),
        };

        let (ordinal, name) = line
            .split_once(SOURCE_DELIMITER)
            .ok_or_else(|| malformed("missing '|' delimiter"))?;

        if name.contains(SOURCE_DELIMITER) {
            return Err(malformed("expected exactly one '|' delimiter"));
        }

        let ordinal = ordinal
            .trim()
            .parse::<i64>()
            .map_err(|_| malformed("ordinal is not an integer"))?;

        Ok(Self {
            ordinal,
            name: name.to_string(),
        })
    }
}

/// Parse every line, failing on the first malformed one.
pub fn parse_columns(raw_lines: &[String]) -> PipelineResult<Vec<ColumnDefinition>> {
    raw_lines
        .iter()
        .enumerate()
        .map(|(i, line)| ColumnDefinition::parse(line, i + 1))
        .collect()
}

/// Sort column definitions by ordinal and return their names.
///
/// The sort is stable: definitions sharing an ordinal keep their file order.
pub fn prepare_columns(raw_lines: &[String]) -> PipelineResult<Vec<String>> {
    if raw_lines.is_empty() {
        return Err(PipelineError::EmptyInput(
            "column definitions contain no lines".to_string(),
        ));
    }

    let mut columns = parse_columns(raw_lines)?;

    let mut seen = HashSet::new();
    for col in &columns {
        if !seen.insert(col.ordinal) {
            warn!(
                "Duplicate column ordinal {} ('{}'); keeping file order",
                col.ordinal, col.name
            );
        }
    }

    columns.sort_by_key(|col| col.ordinal);

    Ok(columns.into_iter().map(|col| col.name).collect())
}

/// Join prepared column names into the header line.
pub fn header_line(names: &[String]) -> String {
    let sep = OUTPUT_DELIMITER.to_string();
    names.join(sep.as_str())
}
