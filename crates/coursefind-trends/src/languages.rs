use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::survey::SurveyData;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageTrend {
    pub language: String,
    /// Respondents who worked with the language this year.
    pub used: u64,
    /// Respondents who want to work with it next year.
    pub desired: u64,
    pub growth: i64,
}

/// Language growth for one survey year, sorted by growth descending then
/// language ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageTrends {
    pub year: i32,
    pub rows: Vec<LanguageTrend>,
}

impl LanguageTrends {
    pub fn rows(&self) -> &[LanguageTrend] { &self.rows }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// The `n` fastest-growing languages.
    pub fn rising(&self, n: usize) -> &[LanguageTrend] { &self.rows[..n.min(self.rows.len())] }

    /// The last `n` rows, still in table order.
    pub fn declining(&self, n: usize) -> &[LanguageTrend] { &self.rows[self.rows.len().saturating_sub(n)..] }
}

pub(crate) fn signed_growth(desired: u64, used: u64) -> i64 {
    i64::try_from(desired).unwrap_or(i64::MAX).saturating_sub(i64::try_from(used).unwrap_or(i64::MAX))
}

/// Count used and desired mentions per language for `year`, outer-joined
/// with zero fill.
pub fn language_trends(data: &SurveyData, year: i32) -> LanguageTrends {
    let mut counts: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for response in data.for_year(year) {
        for lang in response.languages_worked.iter().flatten() {
            counts.entry(lang.as_str()).or_default().0 += 1;
        }
        for lang in response.languages_wanted.iter().flatten() {
            counts.entry(lang.as_str()).or_default().1 += 1;
        }
    }
    let mut rows: Vec<LanguageTrend> = counts
        .into_iter()
        .map(|(language, (used, desired))| LanguageTrend {
            language: language.to_string(),
            used,
            desired,
            growth: signed_growth(desired, used),
        })
        .collect();
    rows.sort_by(|a, b| b.growth.cmp(&a.growth).then_with(|| a.language.cmp(&b.language)));
    debug!(year, languages = rows.len(), "computed language trends");
    LanguageTrends { year, rows }
}
