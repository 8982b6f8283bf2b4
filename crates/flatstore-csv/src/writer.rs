//! RFC 4180 writer: full rewrite and single-row append.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use flatstore_error::{FlatError, Result};
use tracing::debug;

use crate::{DELIMITER, LINE_ENDING, QUOTE};

/// Append `field` to `out`, quoting it if it contains a delimiter, quote, or
/// line break.
fn push_field(out: &mut String, field: &str) {
    let needs_quoting = field
        .bytes()
        .any(|b| b == DELIMITER || b == QUOTE || b == b'\n' || b == b'\r');

    if !needs_quoting {
        out.push_str(field);
        return;
    }

    out.push('"');
    for ch in field.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
}

/// Encode one row without a trailing line ending.
#[must_use]
pub fn encode_row<S: AsRef<str>>(fields: &[S]) -> String {
    let mut out = String::new();
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            out.push(char::from(DELIMITER));
        }
        push_field(&mut out, field.as_ref());
    }
    out
}

/// Truncate `path` and write `header` followed by every row.
pub fn write_all_rows<I>(path: &Path, header: &[&str], rows: I) -> Result<usize>
where
    I: IntoIterator,
    I::Item: AsRef<[String]>,
{
    let mut buf = encode_row(header);
    buf.push_str(LINE_ENDING);
    let mut written = 0_usize;
    for row in rows {
        buf.push_str(&encode_row(row.as_ref()));
        buf.push_str(LINE_ENDING);
        written += 1;
    }

    let mut file = File::create(path).map_err(|err| FlatError::io(path, err))?;
    file.write_all(buf.as_bytes())
        .map_err(|err| FlatError::io(path, err))?;
    file.sync_data().map_err(|err| FlatError::io(path, err))?;

    debug!(
        path = %path.display(),
        rows = written,
        bytes = buf.len(),
        "rewrote delimited file"
    );
    Ok(written)
}

/// Append a single row to an existing file.
///
/// The file must already exist. An empty file gets `header` first; a file
/// whose last line lacks a terminator gets one before the new row.
pub fn append_row(path: &Path, header: &[&str], row: &[String]) -> Result<()> {
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .open(path)
        .map_err(|err| FlatError::io(path, err))?;

    let len = fs::metadata(path)
        .map_err(|err| FlatError::io(path, err))?
        .len();

    let mut buf = String::new();
    if len == 0 {
        buf.push_str(&encode_row(header));
        buf.push_str(LINE_ENDING);
    } else if !ends_with_newline(&mut file).map_err(|err| FlatError::io(path, err))? {
        buf.push_str(LINE_ENDING);
    }
    buf.push_str(&encode_row(row));
    buf.push_str(LINE_ENDING);

    file.write_all(buf.as_bytes())
        .map_err(|err| FlatError::io(path, err))?;
    file.sync_data().map_err(|err| FlatError::io(path, err))?;

    debug!(
        path = %path.display(),
        offset_bytes = len,
        logical_len = buf.len(),
        "appended delimited row"
    );
    Ok(())
}

fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0_u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
