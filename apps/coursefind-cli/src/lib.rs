//! Shared plumbing for the `coursefind` binaries: tracing setup, context
//! construction from configuration and plain-text rendering of results.

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use tracing_subscriber::{fmt, EnvFilter};

use coursefind_core::config::AppConfig;
use coursefind_embed::get_default_embedder;
use coursefind_recommend::{recommend, RecommendContext, RecommendQuery, Recommendation};
use coursefind_trends::{available_years, LanguageTrends, LearningMethod, RoleSummary, SurveyData};

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Load the augmented dataset and the embedder named by `settings`.
pub fn load_context(settings: &AppConfig) -> Result<RecommendContext> {
    let dataset_dir = settings.dataset_path();
    let dataset = tokio::runtime::Runtime::new()?
        .block_on(coursefind_store::load_dataset(&dataset_dir))
        .with_context(|| format!("loading dataset from {} (run coursefind-preprocess first)", dataset_dir.display()))?;
    let embedder = get_default_embedder(&settings.embedding, settings.model_dir_path().as_deref())?;
    let ctx = RecommendContext::new(dataset, embedder)?.with_platform_match(settings.recommend.platform_match);
    Ok(ctx)
}

/// The requested year if loaded, else the latest loaded year.
pub fn resolve_year(data: &SurveyData, requested: Option<i32>) -> Result<i32> {
    let years = available_years(data);
    match requested {
        Some(year) if years.contains(&year) => Ok(year),
        Some(year) => bail!("no survey data for {year}; available years: {years:?}"),
        None => years.last().copied().ok_or_else(|| anyhow!("no survey data loaded")),
    }
}

/// Recommendations for one rising language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingCourses {
    pub language: String,
    pub growth: i64,
    pub recommendation: Recommendation,
}

/// Run the recommender once per top rising language, using the language
/// name as the keyword.
pub fn trending_courses(
    ctx: &RecommendContext,
    trends: &LanguageTrends,
    languages: usize,
    template: &RecommendQuery,
) -> Result<Vec<TrendingCourses>> {
    trends
        .rising(languages)
        .iter()
        .filter(|t| t.growth > 0)
        .map(|t| -> Result<TrendingCourses> {
            let query = RecommendQuery { keyword: t.language.clone(), ..template.clone() };
            let recommendation = recommend(ctx, &query)?;
            Ok(TrendingCourses { language: t.language.clone(), growth: t.growth, recommendation })
        })
        .collect()
}

pub fn render_recommendation(keyword: &str, rec: &Recommendation) -> String {
    let mut out = String::new();
    match rec {
        Recommendation::NoResults => {
            let _ = writeln!(out, "No courses found for '{keyword}' with the selected filters.");
        }
        Recommendation::Ranked(rows) => {
            let _ = writeln!(out, "Recommended courses for '{keyword}':");
            for (i, r) in rows.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{:>2}. {}  [{}]  rating={:.1}  level={}  similarity={:.4}  relevance={:.4}",
                    i + 1,
                    r.name,
                    r.platform,
                    r.rating,
                    r.level,
                    r.similarity,
                    r.relevance
                );
                let _ = writeln!(out, "    skills: {}", r.skills.as_deref().unwrap_or("-"));
            }
        }
    }
    out
}

pub fn render_language_trends(trends: &LanguageTrends, limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Rising languages ({}):", trends.year);
    for t in trends.rising(limit) {
        let _ = writeln!(out, "  {:<28} {:>+8}  (used {}, desired {})", t.language, t.growth, t.used, t.desired);
    }
    let _ = writeln!(out, "Declining languages ({}):", trends.year);
    for t in trends.declining(limit) {
        let _ = writeln!(out, "  {:<28} {:>+8}  (used {}, desired {})", t.language, t.growth, t.used, t.desired);
    }
    out
}

pub fn render_role_summaries(year: i32, summaries: &[RoleSummary], limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Emerging roles ({year}):");
    for s in summaries.iter().take(limit) {
        let _ = writeln!(
            out,
            "  {:<40} +{:.1} / {:.1}  {}",
            s.role,
            s.avg_positive_growth,
            s.avg_negative_growth,
            s.top_languages.join(", ")
        );
    }
    out
}

pub fn render_learning_methods(year: i32, methods: &[LearningMethod], limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Learning methods ({year}):");
    for m in methods.iter().take(limit) {
        let _ = writeln!(out, "  {:<48} {:>8}  (offline {}, online {})", m.method, m.total, m.offline, m.online);
    }
    out
}

pub fn render_trending(items: &[TrendingCourses]) -> String {
    if items.is_empty() {
        return "No rising languages for the selected year.\n".to_string();
    }
    let mut out = String::new();
    for item in items {
        let _ = writeln!(out, "== {} (growth {:+}) ==", item.language, item.growth);
        out.push_str(&render_recommendation(&item.language, &item.recommendation));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursefind_recommend::CourseRecommendation;
    use coursefind_trends::{LanguageTrend, SurveyResponse};

    fn row(name: &str) -> CourseRecommendation {
        CourseRecommendation {
            name: name.into(),
            platform: "Udemy".into(),
            rating: 4.5,
            level: 1,
            skills: None,
            similarity: 0.5,
            relevance: 0.75,
        }
    }

    #[test]
    fn no_results_message() {
        let text = render_recommendation("cobol", &Recommendation::NoResults);
        assert!(text.contains("No courses found for 'cobol'"));
    }

    #[test]
    fn ranked_rows_are_numbered() {
        let text = render_recommendation("rust", &Recommendation::Ranked(vec![row("A"), row("B")]));
        assert!(text.contains(" 1. A  [Udemy]"));
        assert!(text.contains(" 2. B  [Udemy]"));
        assert!(text.contains("skills: -"));
    }

    #[test]
    fn year_resolution() {
        let data = SurveyData::new(vec![
            SurveyResponse { year: 2023, ..Default::default() },
            SurveyResponse { year: 2024, ..Default::default() },
        ]);
        assert_eq!(resolve_year(&data, None).unwrap(), 2024);
        assert_eq!(resolve_year(&data, Some(2023)).unwrap(), 2023);
        let err = resolve_year(&data, Some(2019)).unwrap_err().to_string();
        assert!(err.contains("2019") && err.contains("2023"));
        assert!(resolve_year(&SurveyData::default(), None).is_err());
    }

    #[test]
    fn language_table_has_both_views() {
        let trends = LanguageTrends {
            year: 2024,
            rows: vec![
                LanguageTrend { language: "Rust".into(), used: 1, desired: 5, growth: 4 },
                LanguageTrend { language: "Perl".into(), used: 3, desired: 0, growth: -3 },
            ],
        };
        let text = render_language_trends(&trends, 1);
        let rising = text.find("Rust").unwrap();
        let declining = text.find("Declining").unwrap();
        assert!(rising < declining);
        assert!(text[declining..].contains("Perl"));
        assert!(text.contains("+4"));
    }

    #[test]
    fn empty_trending_message() {
        assert!(render_trending(&[]).contains("No rising languages"));
    }
}
