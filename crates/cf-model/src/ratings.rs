//! Parser for the MovieLens ratings file.
//!
//! Format: `userId::movieId::rating::timestamp`, one record per line, in
//! ISO-8859-1 encoding. Malformed rows are load errors; the trainer must
//! not silently drop history, since that would shift the matrix mappings.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{ModelError, Result};
use crate::types::RatingRecord;

/// Read a file with ISO-8859-1 encoding (Latin-1).
///
/// Each Latin-1 byte maps directly to the same Unicode code point, so the
/// byte-to-char conversion below is lossless.
fn read_lines_latin1(path: &Path) -> Result<Vec<String>> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    let content: String = bytes.iter().map(|&b| b as char).collect();
    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// Parse every record from a ratings file in file order
pub fn parse_ratings(path: &Path) -> Result<Vec<RatingRecord>> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let lines = read_lines_latin1(path)?;

    let mut records = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        records.push(parse_line(trimmed, &file_name, line_no)?);
    }
    Ok(records)
}

fn parse_line(line: &str, file: &str, line_no: usize) -> Result<RatingRecord> {
    const FIELDS: [&str; 4] = ["userId", "movieId", "rating", "timestamp"];

    let parts: Vec<&str> = line.split("::").collect();
    if parts.len() != FIELDS.len() {
        let reason = match FIELDS.get(parts.len()) {
            Some(missing) => format!("Missing {}", missing),
            None => format!("Expected {} fields, found {}", FIELDS.len(), parts.len()),
        };
        return Err(ModelError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason,
        });
    }

    Ok(RatingRecord {
        user_id: parse_field(parts[0], "userId", file, line_no)?,
        movie_id: parse_field(parts[1], "movieId", file, line_no)?,
        rating: parse_field(parts[2], "rating", file, line_no)?,
        timestamp: parse_field(parts[3], "timestamp", file, line_no)?,
    })
}

fn parse_field<T: std::str::FromStr>(
    value: &str,
    field: &str,
    file: &str,
    line_no: usize,
) -> Result<T> {
    value.parse().map_err(|_| ModelError::ParseError {
        file: file.to_string(),
        line: line_no,
        reason: format!("Invalid {}: {}", field, value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_ratings(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_valid_ratings() {
        let file = write_ratings("1::1193::5::978300760\n1::661::3::978302109\n");
        let records = parse_ratings(file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].user_id, 1);
        assert_eq!(records[0].movie_id, 1193);
        assert_eq!(records[0].rating, 5.0);
        assert_eq!(records[0].timestamp, 978300760);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let file = write_ratings("1::1193::5::978300760\n\n2::1193::4::978300761\n");
        let records = parse_ratings(file.path()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_non_numeric_rating_is_an_error() {
        let file = write_ratings("1::1193::5::978300760\n2::661::bad::978302109\n");
        let err = parse_ratings(file.path()).unwrap_err();
        match err {
            ModelError::ParseError { line, reason, .. } => {
                assert_eq!(line, 2);
                assert!(reason.contains("rating"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let file = write_ratings("1::1193::5\n");
        let err = parse_ratings(file.path()).unwrap_err();
        match err {
            ModelError::ParseError { line, reason, .. } => {
                assert_eq!(line, 1);
                assert!(reason.contains("timestamp"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
