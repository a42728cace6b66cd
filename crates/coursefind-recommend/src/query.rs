use serde::{Deserialize, Serialize};

use coursefind_core::types::Level;

pub const DEFAULT_TOP_N: usize = 5;
pub const DEFAULT_POPULARITY_WEIGHT: f32 = 0.5;
pub const FULL_RATING_RANGE: (f32, f32) = (0.0, 5.0);

/// One recommendation request. Stateless; never mutates the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendQuery {
    pub keyword: String,
    pub level: Option<Level>,
    /// Inclusive `(min, max)` rating bounds.
    pub rating_range: (f32, f32),
    pub platform: Option<String>,
    pub top_n: usize,
    /// Share of the relevance score taken by popularity, in [0, 1].
    pub popularity_weight: f32,
}

impl RecommendQuery {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            level: None,
            rating_range: FULL_RATING_RANGE,
            platform: None,
            top_n: DEFAULT_TOP_N,
            popularity_weight: DEFAULT_POPULARITY_WEIGHT,
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Option<Level>) -> Self { self.level = level; self }

    #[must_use]
    pub fn with_rating_range(mut self, min: f32, max: f32) -> Self { self.rating_range = (min, max); self }

    #[must_use]
    pub fn with_platform(mut self, platform: Option<String>) -> Self { self.platform = platform; self }

    #[must_use]
    pub fn with_top_n(mut self, top_n: usize) -> Self { self.top_n = top_n; self }

    #[must_use]
    pub fn with_popularity_weight(mut self, weight: f32) -> Self { self.popularity_weight = weight; self }
}
