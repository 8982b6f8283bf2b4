//! Header-checked decoding of raw rows into records.

use std::path::Path;

use flatstore_error::{FlatError, Result};
use tracing::{debug, trace};

use crate::record::Record;

/// Records recovered from a row set, with per-cause drop counts.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeReport<R> {
    pub records: Vec<R>,
    /// Data rows whose field count differed from the header.
    pub column_mismatch: usize,
    /// Rows with the right shape that failed field coercion.
    pub rejected: usize,
}

impl<R> DecodeReport<R> {
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.column_mismatch + self.rejected
    }
}

fn header_matches<R: Record>(header: &[String]) -> bool {
    header.len() == R::HEADER.len()
        && header
            .iter()
            .zip(R::HEADER)
            .all(|(found, expected)| found.trim().eq_ignore_ascii_case(expected))
}

/// Decode `rows` (header first) read from `path`.
///
/// Individual bad rows are dropped and counted. The whole decode fails only
/// when the header is wrong or when no data row has the right number of
/// columns. An input without any rows is a freshly created backing file and
/// decodes to an empty collection.
pub fn decode_rows<R: Record>(path: &Path, rows: Vec<Vec<String>>) -> Result<DecodeReport<R>> {
    let mut rows = rows.into_iter();
    let Some(header) = rows.next() else {
        return Ok(DecodeReport {
            records: Vec::new(),
            column_mismatch: 0,
            rejected: 0,
        });
    };
    if !header_matches::<R>(&header) {
        return Err(FlatError::parse(
            path,
            format!(
                "unexpected {} header: found [{}], expected [{}]",
                R::KIND,
                header.join(", "),
                R::HEADER.join(", ")
            ),
        ));
    }

    let mut report = DecodeReport {
        records: Vec::with_capacity(rows.len()),
        column_mismatch: 0,
        rejected: 0,
    };
    let mut data_rows = 0_usize;

    for (idx, fields) in rows.enumerate() {
        data_rows += 1;
        if fields.len() != R::HEADER.len() {
            report.column_mismatch += 1;
            trace!(
                kind = R::KIND,
                row = idx + 2,
                fields = fields.len(),
                "dropped row with wrong column count"
            );
            continue;
        }
        match R::decode(&fields) {
            Ok(record) => report.records.push(record),
            Err(reject) => {
                report.rejected += 1;
                trace!(kind = R::KIND, row = idx + 2, %reject, "dropped invalid row");
            }
        }
    }

    if data_rows > 0 && report.column_mismatch == data_rows {
        return Err(FlatError::parse(
            path,
            format!(
                "none of {data_rows} data rows has the {} columns of the {} header",
                R::HEADER.len(),
                R::KIND
            ),
        ));
    }

    debug!(
        kind = R::KIND,
        path = %path.display(),
        records = report.records.len(),
        column_mismatch = report.column_mismatch,
        rejected = report.rejected,
        "decoded rows"
    );
    Ok(report)
}
