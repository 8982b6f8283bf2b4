//! User review with sentiment scores.

use std::ops::RangeInclusive;

use flatstore_error::{FlatError, Result};
use serde::{Deserialize, Serialize};

use crate::record::{DecodeReject, Record, is_missing_identity, parse_finite, render_float};

pub const POLARITY_RANGE: RangeInclusive<f64> = -1.0..=1.0;
pub const SUBJECTIVITY_RANGE: RangeInclusive<f64> = 0.0..=1.0;

/// One review row. `app` refers to [`crate::App::name`] but nothing enforces
/// that the app exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub app: String,
    pub translated_review: String,
    pub sentiment: String,
    pub sentiment_polarity: f64,
    pub sentiment_subjectivity: f64,
}

impl Record for Review {
    const KIND: &'static str = "review";
    const HEADER: &'static [&'static str] = &[
        "App",
        "Translated_Review",
        "Sentiment",
        "Sentiment_Polarity",
        "Sentiment_Subjectivity",
    ];
    const UNIQUE_IDENTITY: bool = false;

    fn identity(&self) -> &str {
        &self.app
    }

    fn decode(fields: &[String]) -> std::result::Result<Self, DecodeReject> {
        let [app, translated_review, sentiment, polarity, subjectivity] = fields else {
            return Err(DecodeReject::new("row", "wrong column count", ""));
        };

        if is_missing_identity(app) {
            return Err(DecodeReject::new("App", "missing identity", app));
        }
        if sentiment.trim().eq_ignore_ascii_case("nan") {
            return Err(DecodeReject::new("Sentiment", "missing label", sentiment));
        }

        Ok(Self {
            app: app.clone(),
            translated_review: translated_review.clone(),
            sentiment: sentiment.clone(),
            sentiment_polarity: parse_finite("Sentiment_Polarity", polarity)?,
            sentiment_subjectivity: parse_finite("Sentiment_Subjectivity", subjectivity)?,
        })
    }

    fn encode(&self) -> Vec<String> {
        vec![
            self.app.clone(),
            self.translated_review.clone(),
            self.sentiment.clone(),
            render_float(self.sentiment_polarity),
            render_float(self.sentiment_subjectivity),
        ]
    }

    fn validate(&self) -> Result<()> {
        if is_missing_identity(&self.app) {
            return Err(FlatError::validation(Self::KIND, "app", "is required"));
        }
        if self.translated_review.trim().is_empty() {
            return Err(FlatError::validation(
                Self::KIND,
                "translated_review",
                "is required",
            ));
        }
        if is_missing_identity(&self.sentiment) {
            return Err(FlatError::validation(Self::KIND, "sentiment", "is required"));
        }
        if !POLARITY_RANGE.contains(&self.sentiment_polarity) {
            return Err(FlatError::validation(
                Self::KIND,
                "sentiment_polarity",
                format!("must be between -1 and 1, got {}", self.sentiment_polarity),
            ));
        }
        if !SUBJECTIVITY_RANGE.contains(&self.sentiment_subjectivity) {
            return Err(FlatError::validation(
                Self::KIND,
                "sentiment_subjectivity",
                format!(
                    "must be between 0 and 1, got {}",
                    self.sentiment_subjectivity
                ),
            ));
        }
        Ok(())
    }
}
