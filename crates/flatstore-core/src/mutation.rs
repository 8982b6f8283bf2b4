//! Append and rewrite paths.
//!
//! Both paths hold the store's write lock across their file I/O, so readers
//! never see the file and the cache disagree.

use flatstore_csv::{append_row, write_all_rows};
use flatstore_error::{FlatError, Result};
use flatstore_types::{Record, identity_matches};
use tracing::{info, warn};

use crate::store::RecordStore;

impl<R: Record> RecordStore<R> {
    /// Validate `record`, append it to the backing file, then push the
    /// decoded form of the written row to the cache.
    ///
    /// The cache is loaded first if it is empty, so it always mirrors the
    /// whole file afterwards. Types with a unique identity reject a record
    /// whose identity is already present.
    pub fn add(&self, record: R) -> Result<()> {
        record.validate()?;

        let mut cache = self.cache.write();
        self.fill_if_empty(&mut cache)?;

        if R::UNIQUE_IDENTITY
            && cache
                .iter()
                .any(|existing| identity_matches(existing.identity(), record.identity()))
        {
            return Err(FlatError::validation(
                R::KIND,
                "identity",
                format!("{:?} already exists", record.identity()),
            ));
        }

        // The cache holds what a reload would produce, not the caller's text.
        let row = record.encode();
        let stored = R::decode(&row).map_err(|reject| {
            FlatError::internal(format!(
                "{} does not survive its own encoding: {reject}",
                R::KIND
            ))
        })?;

        append_row(self.path(), R::HEADER, &row)?;
        info!(
            kind = R::KIND,
            path = %self.path().display(),
            identity = stored.identity(),
            records = cache.len() + 1,
            "appended record"
        );
        cache.push(stored);
        Ok(())
    }

    /// Remove every record whose identity matches `key` and rewrite the
    /// backing file. Returns the number of records removed.
    ///
    /// The current record set is read from the file, not the cache, so edits
    /// made behind the store's back are honoured.
    pub fn delete(&self, key: &str) -> Result<usize> {
        let mut cache = self.cache.write();

        let (records, mut stats) = self.read_file()?;
        let before = records.len();
        let kept: Vec<R> = records
            .into_iter()
            .filter(|record| !identity_matches(record.identity(), key))
            .collect();
        let removed = before - kept.len();
        if removed == 0 {
            return Err(FlatError::NotFound {
                kind: R::KIND,
                key: key.trim().to_owned(),
            });
        }

        if stats.skipped() > 0 {
            warn!(
                kind = R::KIND,
                path = %self.path().display(),
                skipped = stats.skipped(),
                "rewrite drops rows that did not decode"
            );
        }

        let rows: Vec<Vec<String>> = kept.iter().map(R::encode).collect();
        write_all_rows(self.path(), R::HEADER, &rows)?;

        stats.records = kept.len();
        self.record_stats(stats);
        *cache = kept;

        info!(
            kind = R::KIND,
            path = %self.path().display(),
            key = key.trim(),
            removed,
            records = cache.len(),
            "deleted records"
        );
        Ok(removed)
    }
}
