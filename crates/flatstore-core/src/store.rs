//! Shared cache with double-checked lazy loading.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use flatstore_csv::read_rows;
use flatstore_error::Result;
use flatstore_types::{Record, decode_rows};
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::Serialize;
use tracing::{debug, info};

/// What the most recent read of the backing file kept and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub records: usize,
    /// Blank lines.
    pub empty_rows: usize,
    /// Rows with broken quoting.
    pub malformed_rows: usize,
    /// Rows whose column count differs from the header.
    pub column_mismatch: usize,
    /// Well-formed rows that failed field validation.
    pub rejected: usize,
}

impl LoadStats {
    /// Rows present in the file that did not become records.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.empty_rows + self.malformed_rows + self.column_mismatch + self.rejected
    }
}

/// One record collection and the file it is loaded from.
///
/// The cache starts empty. The first reader loads it; later readers that
/// observe an empty cache take the write lock and re-check before loading,
/// so concurrent callers never read the file twice for one transition.
pub struct RecordStore<R: Record> {
    path: PathBuf,
    pub(crate) cache: RwLock<Vec<R>>,
    loads: AtomicU64,
    last_stats: Mutex<Option<LoadStats>>,
}

impl<R: Record> fmt::Debug for RecordStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("kind", &R::KIND)
            .field("path", &self.path)
            .field("loads", &self.loads.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<R: Record> RecordStore<R> {
    /// Create an unloaded store over `path`. Nothing is read until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(Vec::new()),
            loads: AtomicU64::new(0),
            last_stats: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the cached records, loading them first if the cache is empty.
    ///
    /// Load errors propagate and leave the cache empty so a later call can
    /// retry.
    pub fn ensure_loaded(&self) -> Result<RwLockReadGuard<'_, Vec<R>>> {
        let cache = self.cache.read();
        if !cache.is_empty() {
            return Ok(cache);
        }
        drop(cache);

        let mut cache = self.cache.write();
        self.fill_if_empty(&mut cache)?;
        Ok(RwLockWriteGuard::downgrade(cache))
    }

    /// Load into `cache` unless another caller already did. The caller holds
    /// the write lock.
    pub(crate) fn fill_if_empty(&self, cache: &mut Vec<R>) -> Result<()> {
        if !cache.is_empty() {
            return Ok(());
        }
        let (records, stats) = self.read_file()?;
        *cache = records;
        let loads = self.loads.fetch_add(1, Ordering::AcqRel) + 1;
        *self.last_stats.lock() = Some(stats);

        info!(
            kind = R::KIND,
            path = %self.path.display(),
            loads,
            records = stats.records,
            skipped = stats.skipped(),
            malformed_rows = stats.malformed_rows,
            column_mismatch = stats.column_mismatch,
            rejected = stats.rejected,
            "loaded records into cache"
        );
        Ok(())
    }

    /// Read and decode the backing file without touching the cache.
    pub(crate) fn read_file(&self) -> Result<(Vec<R>, LoadStats)> {
        let scan = read_rows(&self.path)?;
        let report = decode_rows::<R>(&self.path, scan.rows)?;
        let stats = LoadStats {
            records: report.records.len(),
            empty_rows: scan.empty_rows,
            malformed_rows: scan.malformed_rows,
            column_mismatch: report.column_mismatch,
            rejected: report.rejected,
        };
        Ok((report.records, stats))
    }

    pub(crate) fn record_stats(&self, stats: LoadStats) {
        *self.last_stats.lock() = Some(stats);
    }

    /// Drop the cached records so the next access re-reads the file.
    pub fn invalidate(&self) {
        let mut cache = self.cache.write();
        let dropped = cache.len();
        cache.clear();
        cache.shrink_to_fit();
        debug!(
            kind = R::KIND,
            path = %self.path.display(),
            dropped,
            "invalidated record cache"
        );
    }

    /// Number of times the cache has been filled from the backing file.
    #[must_use]
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Acquire)
    }

    /// Counters from the most recent read of the backing file.
    #[must_use]
    pub fn last_load_stats(&self) -> Option<LoadStats> {
        *self.last_stats.lock()
    }

    /// Records currently cached. Does not trigger a load.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Clone of every cached record, loading first if needed.
    pub fn snapshot(&self) -> Result<Vec<R>> {
        Ok(self.ensure_loaded()?.clone())
    }
}
