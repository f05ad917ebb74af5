//! Line source: read a text file into an ordered list of lines.
//!
//! Encoding is auto-detected so Latin-1 exports from older systems read the
//! same as UTF-8 ones. No pipeline-specific logic here.

use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{SourceError, SourceResult};

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string using the given encoding.
///
/// Unknown encodings and invalid UTF-8 fall back to a lossy UTF-8 decode.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        // windows-1252 matches ISO-8859-1 on every printable code point
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        _ => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
    }
}

/// Decode file bytes, returning the text and the encoding used.
///
/// Valid UTF-8 is taken as-is; detection only runs for anything else.
pub fn decode_bytes(bytes: &[u8]) -> (String, String) {
    match std::str::from_utf8(bytes) {
        Ok(s) => (s.to_string(), "utf-8".to_string()),
        Err(_) => {
            let encoding = detect_encoding(bytes);
            (decode_content(bytes, &encoding), encoding)
        }
    }
}

/// Split decoded content into lines, optionally trimming each one.
///
/// A trailing line terminator does not produce an extra empty line; blank
/// lines in the middle of the file are kept.
pub fn split_lines(content: &str, trim: bool) -> Vec<String> {
    content
        .lines()
        .map(|line| if trim { line.trim() } else { line })
        .map(str::to_string)
        .collect()
}

/// Read a file into lines.
///
/// # Example
/// ```ignore
/// let lines = read_lines(Path::new("data/source/SOURCECOLUMNS.txt"), true)?;
/// println!("{} column definitions", lines.len());
/// ```
pub fn read_lines(path: &Path, trim: bool) -> SourceResult<Vec<String>> {
    let bytes = std::fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (content, encoding) = decode_bytes(&bytes);
    debug!(path = %path.display(), %encoding, "Decoded file");

    Ok(split_lines(&content, trim))
}

/// Read a file into lines, with location checks and logging around it.
///
/// Zero lines is an error here: every caller needs at least one.
pub fn read_lines_logged(path: &Path, trim: bool) -> SourceResult<Vec<String>> {
    info!("Attempting to read file {}", path.display());

    if path.as_os_str().is_empty() {
        warn!("Invalid path. Provide a valid file path.");
        return Err(SourceError::InvalidLocation(path.display().to_string()));
    }

    let lines = read_lines(path, trim)?;
    if lines.is_empty() {
        warn!("File {} is empty.", path.display());
        return Err(SourceError::Empty(path.to_path_buf()));
    }

    info!("Successfully read file {} ({} lines)", path.display(), lines.len());
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn test_split_lines_trim() {
        let lines = split_lines("0|id  \r\n 1|name\n", true);
        assert_eq!(lines, vec!["0|id", "1|name"]);
    }

    #[test]
    fn test_split_lines_no_trim_keeps_inner_whitespace() {
        let lines = split_lines(" a|b \nc|d", false);
        assert_eq!(lines, vec![" a|b ", "c|d"]);
    }

    #[test]
    fn test_blank_middle_line_kept() {
        let lines = split_lines("a|b\n\nc|d\n", true);
        assert_eq!(lines, vec!["a|b", "", "c|d"]);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");

        // ¤ and ½ differ between ISO-8859-1 and ISO-8859-15
        let decoded = decode_content(b"1|cost \xA4 5 caf\xE9 \xBD", "iso-8859-1");
        assert_eq!(decoded, "1|cost ¤ 5 café ½");
    }

    #[test]
    fn test_decode_bytes_prefers_utf8() {
        let (decoded, encoding) = decode_bytes("0|price €".as_bytes());
        assert_eq!(encoding, "utf-8");
        assert_eq!(decoded, "0|price €");
    }

    #[test]
    fn test_read_lines_utf8_kept_verbatim() {
        let file = temp_file("0|price €\n1|José\n2|naïve café\n".as_bytes());
        let lines = read_lines(file.path(), true).unwrap();
        assert_eq!(lines, vec!["0|price €", "1|José", "2|naïve café"]);
    }

    #[test]
    fn test_read_lines() {
        let file = temp_file(b"1|name\n0|id\n");
        let lines = read_lines(file.path(), true).unwrap();
        assert_eq!(lines, vec!["1|name", "0|id"]);
    }

    #[test]
    fn test_logged_read_empty_file() {
        let file = temp_file(b"");
        let err = read_lines_logged(file.path(), true).unwrap_err();
        assert!(matches!(err, SourceError::Empty(_)));
    }

    #[test]
    fn test_logged_read_missing_file() {
        let err = read_lines_logged(Path::new("does/not/exist.txt"), true).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
        assert!(err.to_string().contains("exist.txt"));
    }

    #[test]
    fn test_logged_read_empty_location() {
        let err = read_lines_logged(Path::new(""), true).unwrap_err();
        assert!(matches!(err, SourceError::InvalidLocation(_)));
    }
}
