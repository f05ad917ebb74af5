//! CSV composition: header line + transformed rows.

use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};

/// The finished CSV payload of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedArtifact {
    /// Header line first, then every body row in input order.
    pub lines: Vec<String>,
    /// `lines.len()`, header included.
    pub row_count: usize,
}

impl ComposedArtifact {
    /// Rows excluding the header.
    pub fn data_rows(&self) -> usize {
        self.row_count.saturating_sub(1)
    }

    /// File contents: lines joined with `\n`, no trailing newline.
    pub fn contents(&self) -> String {
        self.lines.join("\n")
    }
}

/// Concatenate header and body.
///
/// `header` is the one-element sequence holding the joined column names.
pub fn compose(header: &[String], body: Vec<String>) -> PipelineResult<ComposedArtifact> {
    if header.is_empty() {
        return Err(PipelineError::Composition("header is missing".to_string()));
    }
    if body.is_empty() {
        return Err(PipelineError::Composition("body has no rows".to_string()));
    }

    let mut lines = Vec::with_capacity(header.len() + body.len());
    lines.extend_from_slice(header);
    lines.extend(body);

    let row_count = lines.len();
    Ok(ComposedArtifact { lines, row_count })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose() {
        let artifact = compose(
            &["id,name".to_string()],
            vec!["2,bob".to_string(), "1,alice".to_string()],
        )
        .unwrap();

        assert_eq!(artifact.lines, vec!["id,name", "2,bob", "1,alice"]);
        assert_eq!(artifact.row_count, 3);
        assert_eq!(artifact.data_rows(), 2);
        assert_eq!(artifact.contents(), "id,name\n2,bob\n1,alice");
    }

    #[test]
    fn test_body_not_reordered_or_deduplicated() {
        let body = vec!["b".to_string(), "a".to_string(), "a".to_string()];
        let artifact = compose(&["h".to_string()], body.clone()).unwrap();
        assert_eq!(&artifact.lines[1..], body.as_slice());
    }

    #[test]
    fn test_missing_header() {
        let err = compose(&[], vec!["1,a".to_string()]).unwrap_err();
        assert!(matches!(err, PipelineError::Composition(_)));
    }

    #[test]
    fn test_missing_body() {
        let err = compose(&["id".to_string()], vec![]).unwrap_err();
        assert!(err.to_string().contains("body"));
    }
}
