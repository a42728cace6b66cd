use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::survey::SurveyData;

/// How often a learning channel was named, offline (`LearnCode`) and online
/// (`LearnCodeOnline`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningMethod {
    pub method: String,
    pub offline: u64,
    pub online: u64,
    pub total: u64,
}

/// Sorted by total descending then method ascending.
pub fn analyze_learning_methods(data: &SurveyData, year: i32) -> Vec<LearningMethod> {
    let mut counts: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for response in data.for_year(year) {
        for m in response.learn_code.iter().flatten() {
            counts.entry(m.as_str()).or_default().0 += 1;
        }
        for m in response.learn_code_online.iter().flatten() {
            counts.entry(m.as_str()).or_default().1 += 1;
        }
    }
    let mut rows: Vec<LearningMethod> = counts
        .into_iter()
        .map(|(method, (offline, online))| LearningMethod {
            method: method.to_string(),
            offline,
            online,
            total: offline + online,
        })
        .collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.method.cmp(&b.method)));
    rows
}
