//! Course ranking.
//!
//! `recommend` validates the query against the context, narrows the dataset
//! with literal filters, then ranks the survivors by a blend of semantic
//! similarity and popularity relative to the surviving set.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

use coursefind_core::types::{Course, Level};

use crate::context::RecommendContext;
use crate::error::RecommendError;
use crate::query::RecommendQuery;
use crate::similarity::cosine_similarity;

/// One ranked course as shown to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecommendation {
    pub name: String,
    pub platform: String,
    pub rating: f32,
    pub level: Level,
    /// Raw skills text, `None` when the source row had none.
    pub skills: Option<String>,
    pub similarity: f32,
    pub relevance: f32,
}

/// Outcome of a valid query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "courses", rename_all = "snake_case")]
pub enum Recommendation {
    /// At least one and at most `top_n` rows, best first.
    Ranked(Vec<CourseRecommendation>),
    /// No course survived the keyword, level, rating and platform filters.
    NoResults,
}

impl Recommendation {
    pub fn rows(&self) -> &[CourseRecommendation] {
        match self {
            Recommendation::Ranked(rows) => rows,
            Recommendation::NoResults => &[],
        }
    }

    pub fn is_no_results(&self) -> bool { matches!(self, Recommendation::NoResults) }
}

struct Scored<'a> {
    position: usize,
    course: &'a Course,
    similarity: f32,
    relevance: f32,
}

// relevance desc, rating desc, name asc, platform asc, dataset position asc
fn rank_order(a: &Scored<'_>, b: &Scored<'_>) -> Ordering {
    b.relevance
        .total_cmp(&a.relevance)
        .then_with(|| b.course.rating.total_cmp(&a.course.rating))
        .then_with(|| a.course.name.cmp(&b.course.name))
        .then_with(|| a.course.platform.cmp(&b.course.platform))
        .then_with(|| a.position.cmp(&b.position))
}

/// Check the query against the context's domains, in a fixed order.
pub fn validate(ctx: &RecommendContext, query: &RecommendQuery) -> Result<(), RecommendError> {
    if query.keyword.trim().is_empty() {
        return Err(RecommendError::InvalidKeyword);
    }
    if let Some(level) = query.level {
        if !ctx.levels().contains(&level) {
            return Err(RecommendError::InvalidLevel { level, valid: ctx.levels().to_vec() });
        }
    }
    let (min, max) = query.rating_range;
    let in_scale = |r: f32| (0.0..=5.0).contains(&r);
    if !in_scale(min) || !in_scale(max) || min > max {
        return Err(RecommendError::InvalidRatingRange { min, max });
    }
    if let Some(platform) = &query.platform {
        if !ctx.platforms().iter().any(|p| p == platform) {
            return Err(RecommendError::InvalidPlatform { platform: platform.clone(), valid: ctx.platforms().to_vec() });
        }
    }
    if query.top_n == 0 {
        return Err(RecommendError::InvalidTopN(query.top_n));
    }
    if !(0.0..=1.0).contains(&query.popularity_weight) {
        return Err(RecommendError::InvalidPopularityWeight(query.popularity_weight));
    }
    Ok(())
}

/// Rank the courses matching `query`.
///
/// The keyword is trimmed and lowercased before matching and embedding.
/// Returns [`Recommendation::NoResults`] when nothing survives filtering; the
/// embedder is not called in that case.
#[allow(clippy::cast_precision_loss)]
pub fn recommend(ctx: &RecommendContext, query: &RecommendQuery) -> Result<Recommendation, RecommendError> {
    validate(ctx, query)?;

    let keyword = query.keyword.trim().to_lowercase();
    let (min_rating, max_rating) = query.rating_range;
    let platform_match = ctx.platform_match();
    let candidates: Vec<(usize, &Course)> = ctx
        .dataset()
        .courses()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.normalized_skills.contains(&keyword))
        .filter(|(_, c)| query.level.map_or(true, |l| c.level == l))
        .filter(|(_, c)| c.rating >= min_rating && c.rating <= max_rating)
        .filter(|(_, c)| query.platform.as_deref().map_or(true, |p| platform_match.matches(&c.platform, p)))
        .collect();

    if candidates.is_empty() {
        debug!(keyword = %keyword, "no courses survived filtering");
        return Ok(Recommendation::NoResults);
    }

    let keyword_embedding = ctx.embedder().embed(&keyword)?;
    if keyword_embedding.len() != ctx.dataset().dim() {
        return Err(RecommendError::DimensionMismatch { expected: ctx.dataset().dim(), actual: keyword_embedding.len() });
    }

    let max_students = candidates.iter().map(|(_, c)| c.num_students).max().unwrap_or(0);
    let w = query.popularity_weight;
    let mut scored: Vec<Scored<'_>> = candidates
        .into_iter()
        .map(|(position, course)| {
            let similarity = cosine_similarity(&keyword_embedding, &course.embedding);
            let popularity = if max_students == 0 { 0.0 } else { course.num_students as f32 / max_students as f32 };
            Scored { position, course, similarity, relevance: (1.0 - w) * similarity + w * popularity }
        })
        .collect();
    scored.sort_by(rank_order);

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let rows: Vec<CourseRecommendation> = scored
        .into_iter()
        .filter(|s| seen.insert((s.course.name.as_str(), s.course.platform.as_str())))
        .take(query.top_n)
        .map(|s| CourseRecommendation {
            name: s.course.name.clone(),
            platform: s.course.platform.clone(),
            rating: s.course.rating,
            level: s.course.level,
            skills: s.course.skills.clone(),
            similarity: s.similarity,
            relevance: s.relevance,
        })
        .collect();
    debug!(keyword = %keyword, rows = rows.len(), "ranked recommendations");
    Ok(Recommendation::Ranked(rows))
}
