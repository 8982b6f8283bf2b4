//! Play Store application listing.

use flatstore_error::{FlatError, Result};
use serde::{Deserialize, Serialize};

use crate::price::Price;
use crate::record::{DecodeReject, Record, is_missing_identity, parse_finite, render_float};

/// Highest rating the store hands out.
pub const MAX_RATING: f64 = 5.0;

/// One application row. `name` is the identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct App {
    pub name: String,
    pub category: String,
    /// `None` when the source holds no rating.
    pub rating: Option<f64>,
    pub reviews: u64,
    pub size: String,
    /// Install bucket with thousands separators removed (`"10000+"`).
    pub installs: String,
    #[serde(rename = "type")]
    pub app_type: String,
    pub price: Price,
    pub content_rating: String,
    pub genres: String,
    pub last_updated: String,
    pub current_ver: String,
    pub android_ver: String,
}

fn strip_thousands(raw: &str) -> String {
    raw.trim().replace(',', "")
}

fn decode_rating(raw: &str) -> std::result::Result<Option<f64>, DecodeReject> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    let value = parse_finite("Rating", trimmed)?;
    if !(0.0..=MAX_RATING).contains(&value) {
        return Err(DecodeReject::new("Rating", "outside 0..=5", raw));
    }
    Ok(Some(value))
}

impl Record for App {
    const KIND: &'static str = "app";
    const HEADER: &'static [&'static str] = &[
        "App",
        "Category",
        "Rating",
        "Reviews",
        "Size",
        "Installs",
        "Type",
        "Price",
        "Content Rating",
        "Genres",
        "Last Updated",
        "Current Ver",
        "Android Ver",
    ];
    const UNIQUE_IDENTITY: bool = true;

    fn identity(&self) -> &str {
        &self.name
    }

    fn decode(fields: &[String]) -> std::result::Result<Self, DecodeReject> {
        let [
            name,
            category,
            rating,
            reviews,
            size,
            installs,
            app_type,
            price,
            content_rating,
            genres,
            last_updated,
            current_ver,
            android_ver,
        ] = fields
        else {
            return Err(DecodeReject::new("row", "wrong column count", ""));
        };

        if is_missing_identity(name) {
            return Err(DecodeReject::new("App", "missing identity", name));
        }
        let reviews = strip_thousands(reviews)
            .parse::<u64>()
            .map_err(|_| DecodeReject::new("Reviews", "not a count", reviews))?;

        Ok(Self {
            name: name.clone(),
            category: category.clone(),
            rating: decode_rating(rating)?,
            reviews,
            size: size.clone(),
            installs: strip_thousands(installs),
            app_type: app_type.clone(),
            price: Price::normalize(price),
            content_rating: content_rating.clone(),
            genres: genres.clone(),
            last_updated: last_updated.clone(),
            current_ver: current_ver.clone(),
            android_ver: android_ver.clone(),
        })
    }

    fn encode(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.category.clone(),
            self.rating.map_or_else(|| "NaN".to_owned(), render_float),
            self.reviews.to_string(),
            self.size.clone(),
            self.installs.clone(),
            self.app_type.clone(),
            self.price.to_string(),
            self.content_rating.clone(),
            self.genres.clone(),
            self.last_updated.clone(),
            self.current_ver.clone(),
            self.android_ver.clone(),
        ]
    }

    fn validate(&self) -> Result<()> {
        if is_missing_identity(&self.name) {
            return Err(FlatError::validation(Self::KIND, "name", "is required"));
        }
        if let Some(rating) = self.rating {
            if !rating.is_finite() || !(0.0..=MAX_RATING).contains(&rating) {
                return Err(FlatError::validation(
                    Self::KIND,
                    "rating",
                    format!("must be between 0 and {MAX_RATING}, got {rating}"),
                ));
            }
        }
        Ok(())
    }
}
