//! Cached, lock-guarded access to flat-file record collections.
//!
//! A [`RecordStore`] owns one backing file, one `RwLock`, and the decoded
//! records of that file. Queries share the read lock; `add` and `delete`
//! hold the write lock across their file I/O so the cache and the file never
//! disagree outside a critical section. [`Catalog`] pairs the app and review
//! stores behind the operations collaborators call.

pub mod catalog;
pub mod mutation;
pub mod query;
pub mod store;

pub use catalog::{Catalog, CatalogPaths, WarmReport};
pub use query::{AppFilter, MatchAll, PageRequest, Predicate, ReviewFilter};
pub use store::{LoadStats, RecordStore};

pub use flatstore_error::{FlatError, Result};
pub use flatstore_types::{App, Price, Record, Review};
