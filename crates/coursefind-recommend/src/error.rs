use thiserror::Error;

use coursefind_core::types::Level;

/// Why a recommendation request was refused.
///
/// Validation variants carry the valid domain so callers can correct the
/// input. Embedder failures pass through untouched.
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("keyword must be a non-empty string")]
    InvalidKeyword,

    #[error("level {level} is not available; valid levels: {valid:?}")]
    InvalidLevel { level: Level, valid: Vec<Level> },

    #[error("rating range ({min}, {max}) must satisfy 0 <= min <= max <= 5")]
    InvalidRatingRange { min: f32, max: f32 },

    #[error("platform '{platform}' is not available; valid platforms: {valid:?}")]
    InvalidPlatform { platform: String, valid: Vec<String> },

    #[error("top_n must be a positive integer, got {0}")]
    InvalidTopN(usize),

    #[error("popularity weight must be in [0, 1], got {0}")]
    InvalidPopularityWeight(f32),

    #[error("dataset was embedded with '{expected}' but the query embedder is '{actual}'; rerun coursefind-preprocess")]
    EmbedderMismatch { expected: String, actual: String },

    #[error("embedding dimension mismatch: dataset has {expected}, embedder produced {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Embedding(#[from] anyhow::Error),
}
