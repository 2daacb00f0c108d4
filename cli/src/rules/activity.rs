//! Online activity score
//!
//! Blends review count, photo count and rating into a score in `[0, 1]`,
//! scaled by how much visibility the business category is expected to have.

use serde::{Deserialize, Serialize};

use super::compiled::parse_number;

const REVIEWS_CAP: f64 = 300.0;
const PHOTOS_CAP: f64 = 100.0;

const REVIEWS_WEIGHT: f64 = 0.6;
const PHOTOS_WEIGHT: f64 = 0.25;
const RATING_WEIGHT: f64 = 0.15;

/// Parameters of an `activity_score` rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRule {
    #[serde(default = "default_reviews_column")]
    pub reviews_column: String,

    #[serde(default = "default_rating_column")]
    pub rating_column: String,

    #[serde(default = "default_photos_column")]
    pub photos_column: String,

    /// Expected visibility of the category; restaurants ~1.8, B2B ~0.4
    #[serde(default = "default_expected_visibility")]
    pub expected_visibility: f64,

    /// Scores at or below this mark a lack of activity
    #[serde(default = "default_activity_threshold")]
    pub threshold: f64,
}

fn default_reviews_column() -> String {
    "Reviews count".to_string()
}

fn default_rating_column() -> String {
    "Reviews rating".to_string()
}

fn default_photos_column() -> String {
    "Photos count".to_string()
}

fn default_expected_visibility() -> f64 {
    1.0
}

fn default_activity_threshold() -> f64 {
    0.2
}

impl Default for ActivityRule {
    fn default() -> Self {
        Self {
            reviews_column: default_reviews_column(),
            rating_column: default_rating_column(),
            photos_column: default_photos_column(),
            expected_visibility: default_expected_visibility(),
            threshold: default_activity_threshold(),
        }
    }
}

/// Activity score from raw column values.
///
/// Missing or unparseable inputs count as zero.
pub fn activity_score(reviews: &str, rating: &str, photos: &str, expected_visibility: f64) -> f64 {
    let reviews = parse_number(reviews).unwrap_or(0.0);
    let photos = parse_number(photos).map(f64::round).unwrap_or(0.0);
    let rating = parse_number(rating).unwrap_or(0.0);

    let norm_reviews = reviews.clamp(0.0, REVIEWS_CAP) / REVIEWS_CAP;
    let norm_photos = photos.clamp(0.0, PHOTOS_CAP) / PHOTOS_CAP;
    let norm_rating = if rating != 0.0 {
        ((rating - 3.0) / 2.0).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let activity =
        REVIEWS_WEIGHT * norm_reviews + PHOTOS_WEIGHT * norm_photos + RATING_WEIGHT * norm_rating;

    (activity / expected_visibility.max(0.1)).clamp(0.0, 1.0)
}
