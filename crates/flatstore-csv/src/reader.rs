//! Tolerant row reader.

use std::fs;
use std::path::Path;

use flatstore_error::{FlatError, Result};
use tracing::{debug, warn};

use crate::{DELIMITER, QUOTE};

/// Rows recovered from a delimited text source, plus what was skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowScan {
    /// Parsed rows in file order, header included.
    pub rows: Vec<Vec<String>>,
    /// Blank lines (rows with zero fields).
    pub empty_rows: usize,
    /// Rows dropped because of broken quoting.
    pub malformed_rows: usize,
}

impl RowScan {
    /// Total rows that did not make it into `rows`.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.empty_rows + self.malformed_rows
    }
}

/// Read and parse the file at `path`.
pub fn read_rows(path: &Path) -> Result<RowScan> {
    let bytes = fs::read(path).map_err(|err| FlatError::io(path, err))?;
    let text = String::from_utf8(bytes).map_err(|err| {
        FlatError::parse(
            path,
            format!(
                "not valid UTF-8 at byte {}",
                err.utf8_error().valid_up_to()
            ),
        )
    })?;

    let scan = parse_rows(&text);
    if scan.malformed_rows > 0 {
        warn!(
            path = %path.display(),
            malformed_rows = scan.malformed_rows,
            "skipped rows with broken quoting"
        );
    }
    debug!(
        path = %path.display(),
        rows = scan.rows.len(),
        empty_rows = scan.empty_rows,
        malformed_rows = scan.malformed_rows,
        "read delimited rows"
    );
    Ok(scan)
}

enum Outcome {
    Row(Vec<String>),
    Empty,
    Malformed,
}

/// Parse delimited text held in memory.
#[must_use]
pub fn parse_rows(text: &str) -> RowScan {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let bytes = text.as_bytes();
    let mut scan = RowScan::default();
    let mut cursor = 0;

    while cursor < bytes.len() {
        let (outcome, next) = parse_record(bytes, cursor);
        match outcome {
            Outcome::Row(fields) => scan.rows.push(fields),
            Outcome::Empty => scan.empty_rows += 1,
            Outcome::Malformed => scan.malformed_rows += 1,
        }
        debug_assert!(next > cursor, "parser must make progress");
        cursor = next;
    }
    scan
}

/// Length of the line terminator at `at`, if one starts there.
fn line_break_len(bytes: &[u8], at: usize) -> Option<usize> {
    match bytes.get(at) {
        Some(b'\n') => Some(1),
        Some(b'\r') if bytes.get(at + 1) == Some(&b'\n') => Some(2),
        Some(b'\r') if at + 1 == bytes.len() => Some(1),
        _ => None,
    }
}

/// Position just past the end of the physical line containing `at`.
fn skip_line(bytes: &[u8], at: usize) -> usize {
    bytes[at..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |offset| at + offset + 1)
}

fn finish_field(fields: &mut Vec<String>, field: &mut Vec<u8>) {
    let raw = std::mem::take(field);
    // Fields are split only on ASCII bytes, so the slice stays valid UTF-8.
    let text = String::from_utf8(raw)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned());
    fields.push(text);
}

/// Parse one logical record starting at `start`; returns the outcome and the
/// position of the next record.
fn parse_record(bytes: &[u8], start: usize) -> (Outcome, usize) {
    if let Some(len) = line_break_len(bytes, start) {
        return (Outcome::Empty, start + len);
    }

    let mut fields = Vec::new();
    let mut field = Vec::new();
    let mut i = start;

    loop {
        if bytes.get(i) == Some(&QUOTE) {
            i += 1;
            loop {
                let Some(&b) = bytes.get(i) else {
                    // Unterminated quote: drop this line, rescan from the next.
                    return (Outcome::Malformed, skip_line(bytes, start));
                };
                if b == QUOTE {
                    if bytes.get(i + 1) == Some(&QUOTE) {
                        field.push(QUOTE);
                        i += 2;
                        continue;
                    }
                    i += 1;
                    break;
                }
                field.push(b);
                i += 1;
            }

            if i >= bytes.len() {
                finish_field(&mut fields, &mut field);
                return (Outcome::Row(fields), bytes.len());
            }
            if bytes[i] == DELIMITER {
                finish_field(&mut fields, &mut field);
                i += 1;
                continue;
            }
            if let Some(len) = line_break_len(bytes, i) {
                finish_field(&mut fields, &mut field);
                return (Outcome::Row(fields), i + len);
            }
            // Text after a closing quote.
            return (Outcome::Malformed, skip_line(bytes, i));
        }

        loop {
            let Some(&b) = bytes.get(i) else {
                finish_field(&mut fields, &mut field);
                return (Outcome::Row(fields), bytes.len());
            };
            if b == DELIMITER {
                finish_field(&mut fields, &mut field);
                i += 1;
                break;
            }
            if let Some(len) = line_break_len(bytes, i) {
                finish_field(&mut fields, &mut field);
                return (Outcome::Row(fields), i + len);
            }
            if b == QUOTE {
                return (Outcome::Malformed, skip_line(bytes, i));
            }
            field.push(b);
            i += 1;
        }
    }
}
