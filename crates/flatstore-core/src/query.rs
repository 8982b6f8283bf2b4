//! Filtering and pagination over a warm cache.
//!
//! Predicates are conjunctive and evaluated in cache order; results keep the
//! relative order of the backing file. An empty result is a valid answer.

use std::ops::RangeInclusive;

use flatstore_error::{FlatError, Result};
use flatstore_types::review::POLARITY_RANGE;
use flatstore_types::{App, Price, Record, Review, identity_matches};

use crate::store::RecordStore;

/// A test applied to each cached record.
pub trait Predicate<R> {
    fn matches(&self, record: &R) -> bool;
}

impl<R, F> Predicate<R> for F
where
    F: Fn(&R) -> bool,
{
    fn matches(&self, record: &R) -> bool {
        self(record)
    }
}

/// Accepts every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchAll;

impl<R> Predicate<R> for MatchAll {
    fn matches(&self, _record: &R) -> bool {
        true
    }
}

/// Optional text filter: blank means "no constraint".
fn text_filter(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Filters for the app listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppFilter {
    /// Exact numeric price.
    pub price: Option<Price>,
}

impl AppFilter {
    /// Build a filter from the raw price text supplied by a caller. Blank
    /// text disables the price constraint; text finer than a cent is refused
    /// rather than rounded.
    pub fn parse_price(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let price = Price::parse_exact(raw)
            .ok_or_else(|| FlatError::invalid_argument("price filter", raw))?;
        Ok(Self { price: Some(price) })
    }
}

impl Predicate<App> for AppFilter {
    fn matches(&self, app: &App) -> bool {
        self.price.is_none_or(|price| app.price == price)
    }
}

/// Filters for the review listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewFilter {
    app_name: Option<String>,
    sentiment: Option<String>,
    polarity: RangeInclusive<f64>,
}

impl Default for ReviewFilter {
    fn default() -> Self {
        Self {
            app_name: None,
            sentiment: None,
            polarity: POLARITY_RANGE,
        }
    }
}

impl ReviewFilter {
    /// Blank `app_name` or `sentiment` match every record. The polarity
    /// bounds are inclusive and must satisfy `min <= max`.
    pub fn new(
        app_name: Option<&str>,
        sentiment: Option<&str>,
        polarity_min: f64,
        polarity_max: f64,
    ) -> Result<Self> {
        if !polarity_min.is_finite() || !polarity_max.is_finite() || polarity_min > polarity_max {
            return Err(FlatError::invalid_argument(
                "polarity range",
                format!("{polarity_min}..={polarity_max}"),
            ));
        }
        Ok(Self {
            app_name: text_filter(app_name),
            sentiment: text_filter(sentiment),
            polarity: polarity_min..=polarity_max,
        })
    }

    #[must_use]
    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }

    #[must_use]
    pub fn sentiment(&self) -> Option<&str> {
        self.sentiment.as_deref()
    }

    #[must_use]
    pub const fn polarity(&self) -> &RangeInclusive<f64> {
        &self.polarity
    }
}

impl Predicate<Review> for ReviewFilter {
    fn matches(&self, review: &Review) -> bool {
        self.app_name
            .as_deref()
            .is_none_or(|name| identity_matches(&review.app, name))
            && self
                .sentiment
                .as_deref()
                .is_none_or(|label| identity_matches(&review.sentiment, label))
            && self.polarity.contains(&review.sentiment_polarity)
    }
}

/// One page of a result set. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: usize,
    page: usize,
}

impl PageRequest {
    /// Validate raw caller input: `limit > 0`, `page >= 1`.
    pub fn new(limit: i64, page: i64) -> Result<Self> {
        let limit = usize::try_from(limit)
            .ok()
            .filter(|&limit| limit > 0)
            .ok_or_else(|| FlatError::invalid_argument("limit", limit))?;
        let page = usize::try_from(page)
            .ok()
            .filter(|&page| page >= 1)
            .ok_or_else(|| FlatError::invalid_argument("page", page))?;
        Ok(Self { limit, page })
    }

    #[must_use]
    pub const fn limit(self) -> usize {
        self.limit
    }

    #[must_use]
    pub const fn page(self) -> usize {
        self.page
    }

    /// Records to skip, or `None` when the offset does not fit in `usize`
    /// (which no result set can reach).
    #[must_use]
    pub const fn skip(self) -> Option<usize> {
        (self.page - 1).checked_mul(self.limit)
    }

    /// Restrict `items` to this page.
    pub fn apply<I: Iterator>(self, items: I) -> impl Iterator<Item = I::Item> {
        let (skip, take) = self.skip().map_or((0, 0), |skip| (skip, self.limit));
        items.skip(skip).take(take)
    }
}

impl<R: Record> RecordStore<R> {
    /// Records matching `predicate`, optionally paginated, in cache order.
    pub fn query<P>(&self, predicate: &P, page: Option<PageRequest>) -> Result<Vec<R>>
    where
        P: Predicate<R> + ?Sized,
    {
        self.select(predicate, page, R::clone)
    }

    /// Like [`query`](Self::query) but projects each match through `project`
    /// while the read lock is held.
    pub fn select<P, T, F>(
        &self,
        predicate: &P,
        page: Option<PageRequest>,
        project: F,
    ) -> Result<Vec<T>>
    where
        P: Predicate<R> + ?Sized,
        F: FnMut(&R) -> T,
    {
        let cache = self.ensure_loaded()?;
        let matches = cache.iter().filter(|record| predicate.matches(record));
        let out = match page {
            Some(page) => page.apply(matches).map(project).collect(),
            None => matches.map(project).collect(),
        };
        Ok(out)
    }

    /// Number of records matching `predicate`.
    pub fn count<P>(&self, predicate: &P) -> Result<usize>
    where
        P: Predicate<R> + ?Sized,
    {
        let cache = self.ensure_loaded()?;
        Ok(cache.iter().filter(|record| predicate.matches(record)).count())
    }
}
