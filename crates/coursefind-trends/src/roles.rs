//! Per-role language growth.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::languages::signed_growth;
use crate::survey::SurveyData;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleLanguageTrend {
    pub role: String,
    pub language: String,
    pub worked: u64,
    pub desired: u64,
    pub growth: i64,
}

/// Count, for every (role, language) pair, how many respondents in that role
/// worked with or want the language.
///
/// Only respondents answering all of `DevType`, `LanguageHaveWorkedWith` and
/// `LanguageWantToWorkWith` take part. Sorted by role ascending, growth
/// descending, language ascending.
pub fn analyze_roles(data: &SurveyData, year: i32) -> Vec<RoleLanguageTrend> {
    let mut counts: BTreeMap<(&str, &str), (u64, u64)> = BTreeMap::new();
    for response in data.for_year(year) {
        let (Some(roles), Some(worked), Some(wanted)) =
            (&response.dev_types, &response.languages_worked, &response.languages_wanted)
        else {
            continue;
        };
        for role in roles {
            for lang in worked {
                counts.entry((role.as_str(), lang.as_str())).or_default().0 += 1;
            }
            for lang in wanted {
                counts.entry((role.as_str(), lang.as_str())).or_default().1 += 1;
            }
        }
    }
    let mut rows: Vec<RoleLanguageTrend> = counts
        .into_iter()
        .map(|((role, language), (worked, desired))| RoleLanguageTrend {
            role: role.to_string(),
            language: language.to_string(),
            worked,
            desired,
            growth: signed_growth(desired, worked),
        })
        .collect();
    rows.sort_by(|a, b| {
        a.role.cmp(&b.role).then_with(|| b.growth.cmp(&a.growth)).then_with(|| a.language.cmp(&b.language))
    });
    debug!(year, pairs = rows.len(), "computed role trends");
    rows
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSummary {
    pub role: String,
    /// Mean of the role's positive growth values, 0 when there are none.
    pub avg_positive_growth: f64,
    /// Mean of the role's negative growth values, 0 when there are none.
    pub avg_negative_growth: f64,
    /// Up to `top_languages` languages with positive growth, best first.
    pub top_languages: Vec<String>,
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[i64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
    }
}

/// Collapse role trends into one row per role, sorted by mean positive
/// growth descending then role ascending.
pub fn summarize_roles(trends: &[RoleLanguageTrend], top_languages: usize) -> Vec<RoleSummary> {
    let mut by_role: BTreeMap<&str, Vec<&RoleLanguageTrend>> = BTreeMap::new();
    for t in trends {
        by_role.entry(t.role.as_str()).or_default().push(t);
    }
    let mut summaries: Vec<RoleSummary> = by_role
        .into_iter()
        .map(|(role, mut rows)| {
            rows.sort_by(|a, b| b.growth.cmp(&a.growth).then_with(|| a.language.cmp(&b.language)));
            let positive: Vec<i64> = rows.iter().map(|r| r.growth).filter(|g| *g > 0).collect();
            let negative: Vec<i64> = rows.iter().map(|r| r.growth).filter(|g| *g < 0).collect();
            RoleSummary {
                role: role.to_string(),
                avg_positive_growth: mean(&positive),
                avg_negative_growth: mean(&negative),
                top_languages: rows
                    .iter()
                    .filter(|r| r.growth > 0)
                    .take(top_languages)
                    .map(|r| r.language.clone())
                    .collect(),
            }
        })
        .collect();
    summaries.sort_by(|a, b| {
        b.avg_positive_growth.total_cmp(&a.avg_positive_growth).then_with(|| a.role.cmp(&b.role))
    });
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::SurveyResponse;

    fn list(v: &[&str]) -> Option<Vec<String>> { Some(v.iter().map(|s| (*s).to_string()).collect()) }

    fn trend(role: &str, language: &str, growth: i64) -> RoleLanguageTrend {
        RoleLanguageTrend { role: role.into(), language: language.into(), worked: 0, desired: 0, growth }
    }

    #[test]
    fn incomplete_respondents_are_ignored() {
        let data = SurveyData::new(vec![
            SurveyResponse {
                year: 2024,
                dev_types: list(&["Backend", "DevOps"]),
                languages_worked: list(&["Go"]),
                languages_wanted: list(&["Rust", "Go"]),
                ..Default::default()
            },
            SurveyResponse { year: 2024, dev_types: list(&["Backend"]), languages_worked: list(&["PHP"]), ..Default::default() },
        ]);
        let rows = analyze_roles(&data, 2024);
        let table: Vec<(&str, &str, u64, u64, i64)> =
            rows.iter().map(|r| (r.role.as_str(), r.language.as_str(), r.worked, r.desired, r.growth)).collect();
        assert_eq!(
            table,
            vec![
                ("Backend", "Rust", 0, 1, 1),
                ("Backend", "Go", 1, 1, 0),
                ("DevOps", "Rust", 0, 1, 1),
                ("DevOps", "Go", 1, 1, 0),
            ]
        );
    }

    #[test]
    fn summary_means_and_order() {
        let trends = vec![
            trend("Data", "Python", 4),
            trend("Data", "R", -2),
            trend("Data", "Julia", 2),
            trend("Web", "TypeScript", 10),
            trend("Web", "PHP", -6),
            trend("Web", "jQuery", -2),
            trend("Legacy", "Cobol", -1),
        ];
        let summary = summarize_roles(&trends, 1);
        let roles: Vec<&str> = summary.iter().map(|s| s.role.as_str()).collect();
        assert_eq!(roles, vec!["Web", "Data", "Legacy"]);
        assert_eq!(summary[0].avg_positive_growth, 10.0);
        assert_eq!(summary[0].avg_negative_growth, -4.0);
        assert_eq!(summary[0].top_languages, vec!["TypeScript"]);
        assert_eq!(summary[1].avg_positive_growth, 3.0);
        assert_eq!(summary[1].top_languages, vec!["Python"]);
        assert_eq!(summary[2].avg_positive_growth, 0.0);
        assert!(summary[2].top_languages.is_empty());
    }
}
