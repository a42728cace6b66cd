//! coursefind-recommend
//!
//! The course recommendation engine: build a [`RecommendContext`] once from
//! the loaded dataset and an embedder, then answer any number of
//! [`RecommendQuery`] values with [`recommend`].

pub mod context;
pub mod engine;
pub mod error;
pub mod query;
pub mod similarity;

pub use context::RecommendContext;
pub use engine::{recommend, validate, CourseRecommendation, Recommendation};
pub use error::RecommendError;
pub use query::RecommendQuery;
pub use similarity::cosine_similarity;
