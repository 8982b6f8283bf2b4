//! The app and review stores behind one handle.

use std::path::PathBuf;

use flatstore_error::Result;
use flatstore_types::{App, Review};
use serde::Serialize;
use tracing::info;

use crate::query::{AppFilter, PageRequest, ReviewFilter};
use crate::store::{LoadStats, RecordStore};

/// Backing file locations. Always supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPaths {
    pub app_file: PathBuf,
    pub review_file: PathBuf,
}

/// Outcome of [`Catalog::warm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WarmReport {
    pub apps: LoadStats,
    pub reviews: LoadStats,
}

#[derive(Debug)]
pub struct Catalog {
    apps: RecordStore<App>,
    reviews: RecordStore<Review>,
}

impl Catalog {
    /// Build an unloaded catalog. No file is touched until first use.
    #[must_use]
    pub fn open(paths: CatalogPaths) -> Self {
        Self {
            apps: RecordStore::new(paths.app_file),
            reviews: RecordStore::new(paths.review_file),
        }
    }

    #[must_use]
    pub const fn apps(&self) -> &RecordStore<App> {
        &self.apps
    }

    #[must_use]
    pub const fn reviews(&self) -> &RecordStore<Review> {
        &self.reviews
    }

    /// Names of the apps on `page`, optionally restricted to one price.
    pub fn list_apps(&self, limit: i64, page: i64, price_filter: &str) -> Result<Vec<String>> {
        let (filter, page) = Self::app_query(limit, page, price_filter)?;
        self.apps.select(&filter, Some(page), |app| app.name.clone())
    }

    /// Like [`list_apps`](Self::list_apps) but returns whole records.
    pub fn query_apps(&self, limit: i64, page: i64, price_filter: &str) -> Result<Vec<App>> {
        let (filter, page) = Self::app_query(limit, page, price_filter)?;
        self.apps.query(&filter, Some(page))
    }

    fn app_query(limit: i64, page: i64, price_filter: &str) -> Result<(AppFilter, PageRequest)> {
        let page = PageRequest::new(limit, page)?;
        let filter = AppFilter::parse_price(price_filter)?;
        Ok((filter, page))
    }

    pub fn add_app(&self, app: App) -> Result<()> {
        self.apps.add(app)
    }

    pub fn delete_app(&self, name: &str) -> Result<usize> {
        self.apps.delete(name)
    }

    pub fn list_reviews(
        &self,
        app_name: Option<&str>,
        sentiment: Option<&str>,
        polarity_min: f64,
        polarity_max: f64,
    ) -> Result<Vec<Review>> {
        let filter = ReviewFilter::new(app_name, sentiment, polarity_min, polarity_max)?;
        self.reviews.query(&filter, None)
    }

    pub fn add_review(&self, review: Review) -> Result<()> {
        self.reviews.add(review)
    }

    /// Remove every review of `app_name`. The app itself is left alone.
    pub fn delete_reviews_by_app(&self, app_name: &str) -> Result<usize> {
        self.reviews.delete(app_name)
    }

    /// Load both stores now instead of on first query.
    pub fn warm(&self) -> Result<WarmReport> {
        drop(self.apps.ensure_loaded()?);
        drop(self.reviews.ensure_loaded()?);
        let report = WarmReport {
            apps: self.apps.last_load_stats().unwrap_or_default(),
            reviews: self.reviews.last_load_stats().unwrap_or_default(),
        };
        info!(
            apps = report.apps.records,
            reviews = report.reviews.records,
            "catalog warm"
        );
        Ok(report)
    }

    pub fn invalidate_all(&self) {
        self.apps.invalidate();
        self.reviews.invalidate();
    }
}
