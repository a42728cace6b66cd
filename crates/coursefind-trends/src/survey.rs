//! Survey export loading.
//!
//! Each year lives in `survey_results_public_<year>.csv`. Only the five
//! columns the trend tables use are kept; a file lacking any of them is
//! skipped as a whole.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use coursefind_core::error::Error;

pub const FILE_PREFIX: &str = "survey_results_public_";
pub const REQUIRED_COLUMNS: [&str; 5] =
    ["LanguageHaveWorkedWith", "LanguageWantToWorkWith", "DevType", "LearnCode", "LearnCodeOnline"];

/// One respondent. `None` marks a missing answer (`""` or `"NA"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub year: i32,
    pub languages_worked: Option<Vec<String>>,
    pub languages_wanted: Option<Vec<String>>,
    pub dev_types: Option<Vec<String>>,
    pub learn_code: Option<Vec<String>>,
    pub learn_code_online: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurveyData {
    responses: Vec<SurveyResponse>,
}

impl SurveyData {
    pub fn new(responses: Vec<SurveyResponse>) -> Self { Self { responses } }

    pub fn responses(&self) -> &[SurveyResponse] { &self.responses }

    pub fn len(&self) -> usize { self.responses.len() }

    pub fn is_empty(&self) -> bool { self.responses.is_empty() }

    pub fn for_year(&self, year: i32) -> impl Iterator<Item = &SurveyResponse> {
        self.responses.iter().filter(move |r| r.year == year)
    }
}

/// Sorted distinct years present in `data`.
pub fn available_years(data: &SurveyData) -> Vec<i32> {
    data.responses.iter().map(|r| r.year).collect::<BTreeSet<_>>().into_iter().collect()
}

/// Parse the year out of `survey_results_public_<year>.csv`.
pub fn year_from_file_name(name: &str) -> Option<i32> {
    name.strip_prefix(FILE_PREFIX)?.strip_suffix(".csv")?.parse().ok()
}

fn split_answer(raw: &str) -> Option<Vec<String>> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "NA" {
        return None;
    }
    let values: Vec<String> = raw.split(';').map(str::trim).filter(|v| !v.is_empty()).map(str::to_string).collect();
    (!values.is_empty()).then_some(values)
}

#[derive(Debug, Default)]
pub struct SurveyLoader;

impl SurveyLoader {
    pub fn new() -> Self { Self }

    /// Load every yearly export directly under `dir`, oldest year first.
    pub fn load_dir(&self, dir: &Path) -> Result<SurveyData> {
        if !dir.is_dir() {
            return Err(Error::NotFound(format!("survey directory {}", dir.display())).into());
        }
        let mut files: Vec<(i32, PathBuf)> = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(year) = entry.file_name().to_str().and_then(year_from_file_name) {
                files.push((year, entry.into_path()));
            }
        }
        files.sort();
        debug!(files = files.len(), dir = %dir.display(), "discovered survey exports");
        self.load_files(&files)
    }

    pub fn load_files(&self, files: &[(i32, PathBuf)]) -> Result<SurveyData> {
        let mut responses = Vec::new();
        for (year, path) in files {
            if let Some(rows) = self.load_file(path, *year)? {
                responses.extend(rows);
            }
        }
        let data = SurveyData::new(responses);
        info!(responses = data.len(), years = ?available_years(&data), "loaded survey data");
        Ok(data)
    }

    /// `Ok(None)` when the export lacks one of [`REQUIRED_COLUMNS`].
    pub fn load_file(&self, path: &Path, year: i32) -> Result<Option<Vec<SurveyResponse>>> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let rows = self.load_reader(file, year).with_context(|| format!("loading survey {}", path.display()))?;
        if rows.is_none() {
            warn!(path = %path.display(), year, "survey export lacks required columns; skipping");
        }
        Ok(rows)
    }

    pub fn load_reader<R: Read>(&self, reader: R, year: i32) -> Result<Option<Vec<SurveyResponse>>> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
        let headers = rdr.headers().context("reading CSV headers")?.clone();
        let mut idx = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, column) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
            match headers.iter().position(|h| h == column) {
                Some(i) => *slot = i,
                None => {
                    debug!(column, year, "missing survey column");
                    return Ok(None);
                }
            }
        }
        let mut rows = Vec::new();
        for (n, record) in rdr.records().enumerate() {
            let record = record.with_context(|| format!("malformed survey row at line {}", n + 2))?;
            let field = |i: usize| record.get(idx[i]).and_then(split_answer);
            rows.push(SurveyResponse {
                year,
                languages_worked: field(0),
                languages_wanted: field(1),
                dev_types: field(2),
                learn_code: field(3),
                learn_code_online: field(4),
            });
        }
        Ok(Some(rows))
    }
}
