//! Dataset scanning
//!
//! Reads one category's JSONL file line by line, pulls the text field out of
//! every record and tallies the numbers found in it. A bad line is logged and
//! skipped; it never aborts the scan.

use crate::extract::NumberExtractor;
use crate::models::FrequencyTable;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {source_name} at line {line}: {source}")]
    Io {
        source_name: String,
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Result of scanning one category's records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    pub counts: FrequencyTable,
    /// Lines that parsed as records
    pub records: usize,
    /// Lines skipped because they were not a JSON object
    pub malformed: usize,
}

/// Why a line was rejected.
enum LineProblem {
    Json(serde_json::Error),
    NotAnObject,
}

fn parse_record(line: &[u8]) -> Result<serde_json::Map<String, Value>, LineProblem> {
    match serde_json::from_slice::<Value>(line) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(LineProblem::NotAnObject),
        Err(e) => Err(LineProblem::Json(e)),
    }
}

/// Scan JSONL records from `reader`, tallying numbers found in `text_field`.
///
/// `source_name` is only used in log messages. Whitespace-only lines are
/// ignored. A missing or null text field reads as empty text.
pub fn scan_category<R: BufRead>(
    mut reader: R,
    source_name: &str,
    extractor: &NumberExtractor,
    text_field: &str,
) -> Result<ScanReport, ScanError> {
    let mut report = ScanReport::default();
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).map_err(|source| ScanError::Io {
            source_name: source_name.to_string(),
            line: line_no + 1,
            source,
        })?;
        if read == 0 {
            break;
        }
        line_no += 1;

        if buf.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let record = match parse_record(&buf) {
            Ok(record) => record,
            Err(LineProblem::Json(e)) => {
                warn!("Failed to parse line {} in {}: {}", line_no, source_name, e);
                report.malformed += 1;
                continue;
            }
            Err(LineProblem::NotAnObject) => {
                warn!(
                    "Line {} in {} is not a JSON object, skipping",
                    line_no, source_name
                );
                report.malformed += 1;
                continue;
            }
        };
        report.records += 1;

        let text = match record.get(text_field) {
            Some(Value::String(s)) => s.as_str(),
            None | Some(Value::Null) => "",
            Some(other) => {
                warn!(
                    "Field '{}' on line {} in {} is {} rather than a string, treating as empty",
                    text_field,
                    line_no,
                    source_name,
                    json_type_name(other)
                );
                ""
            }
        };

        report.counts.record_all(extractor.iter(text));
    }

    debug!(
        "Scanned {}: {} records, {} malformed, {} numbers",
        source_name,
        report.records,
        report.malformed,
        report.counts.total()
    );

    Ok(report)
}

/// Open `path` and scan it with [`scan_category`].
pub fn scan_file(
    path: &Path,
    extractor: &NumberExtractor,
    text_field: &str,
) -> Result<ScanReport, ScanError> {
    let file = File::open(path).map_err(|source| ScanError::Open {
        path: path.display().to_string(),
        source,
    })?;
    scan_category(
        BufReader::new(file),
        &path.display().to_string(),
        extractor,
        text_field,
    )
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn scan(input: &str) -> ScanReport {
        scan_category(
            Cursor::new(input.as_bytes()),
            "test.jsonl",
            &NumberExtractor::default(),
            "completion",
        )
        .expect("scan should succeed")
    }

    #[test]
    fn test_counts_numbers_across_records() {
        let report = scan(concat!(
            "{\"prompt\": \"list 101\", \"completion\": \"482, 117, 482\"}\n",
            "{\"completion\": \"117 and 5000\"}\n",
        ));
        assert_eq!(report.records, 2);
        assert_eq!(report.malformed, 0);
        assert_eq!(report.counts.get_or_default(482), 2);
        assert_eq!(report.counts.get_or_default(117), 2);
        // Only the completion field is scanned
        assert_eq!(report.counts.get_or_default(101), 0);
        assert_eq!(report.counts.len(), 2);
    }

    #[test]
    fn test_malformed_line_is_skipped() {
        let report = scan(concat!(
            "{\"completion\": \"111\"}\n",
            "{\"completion\": \"222\"}\n",
            "{not json at all\n",
            "{\"completion\": \"333\"}\n",
        ));
        assert_eq!(report.records, 3);
        assert_eq!(report.malformed, 1);
        assert_eq!(report.counts.total(), 3);
        for n in [111, 222, 333] {
            assert_eq!(report.counts.get_or_default(n), 1);
        }
    }

    #[test]
    fn test_non_object_lines_are_malformed() {
        let report = scan("[1, 2, 3]\n42\n\"text 555\"\n{\"completion\": \"555\"}\n");
        assert_eq!(report.malformed, 3);
        assert_eq!(report.records, 1);
        assert_eq!(report.counts.get_or_default(555), 1);
    }

    #[test]
    fn test_missing_or_null_field_reads_as_empty() {
        let report = scan("{\"prompt\": \"123\"}\n{\"completion\": null}\n");
        assert_eq!(report.records, 2);
        assert!(report.counts.is_empty());
    }

    #[test]
    fn test_non_string_field_treated_as_empty() {
        let report = scan("{\"completion\": 456}\n{\"completion\": [\"789\"]}\n");
        assert_eq!(report.records, 2);
        assert_eq!(report.malformed, 0);
        assert!(report.counts.is_empty());
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let report = scan("\n{\"completion\": \"640\"}\r\n   \r\n{\"completion\": \"640\"}");
        assert_eq!(report.records, 2);
        assert_eq!(report.malformed, 0);
        assert_eq!(report.counts.get_or_default(640), 2);
    }

    #[test]
    fn test_invalid_utf8_line_is_malformed() {
        let mut input = b"{\"completion\": \"\xff\xfe 321\"}\n".to_vec();
        input.extend_from_slice(b"{\"completion\": \"321\"}\n");
        let report = scan_category(
            Cursor::new(input),
            "bytes.jsonl",
            &NumberExtractor::default(),
            "completion",
        )
        .expect("scan should succeed");
        assert_eq!(report.malformed, 1);
        assert_eq!(report.counts.get_or_default(321), 1);
    }

    #[test]
    fn test_custom_text_field() {
        let report = scan_category(
            Cursor::new(&b"{\"completion\": \"100\", \"answer\": \"200 200\"}\n"[..]),
            "test.jsonl",
            &NumberExtractor::default(),
            "answer",
        )
        .expect("scan should succeed");
        assert_eq!(report.counts.get_or_default(200), 2);
        assert_eq!(report.counts.get_or_default(100), 0);
    }

    #[test]
    fn test_scan_file_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = scan_file(
            &dir.path().join("absent.jsonl"),
            &NumberExtractor::default(),
            "completion",
        )
        .expect_err("missing file should fail");
        assert!(matches!(err, ScanError::Open { .. }));
    }
}
