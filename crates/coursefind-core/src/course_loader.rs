//! Raw course CSV loading.
//!
//! Expects the columns `Course_Name`, `Platform`, `Skills`, `Level`, `Rating`
//! and `Number of students`; any other column is ignored. Empty `Skills`
//! fields load as `None`.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::error::Error;
use crate::types::{Level, RawCourse};

pub const REQUIRED_COLUMNS: [&str; 6] = ["Course_Name", "Platform", "Skills", "Level", "Rating", "Number of students"];

#[derive(Debug, Deserialize)]
struct CsvCourseRow {
    #[serde(rename = "Course_Name")]
    name: String,
    #[serde(rename = "Platform")]
    platform: String,
    #[serde(rename = "Skills", default)]
    skills: Option<String>,
    #[serde(rename = "Level", deserialize_with = "level_from_number")]
    level: Level,
    #[serde(rename = "Rating")]
    rating: f32,
    #[serde(rename = "Number of students", deserialize_with = "count_from_number")]
    num_students: u64,
}

// Spreadsheet exports often write integral columns as `3.0`.
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    let v = f64::deserialize(deserializer)?;
    if !v.is_finite() || v.fract() != 0.0 {
        return Err(serde::de::Error::custom(format!("expected a whole number, got {v}")));
    }
    Ok(v)
}

#[allow(clippy::cast_possible_truncation)]
fn level_from_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Level, D::Error> {
    whole_number(deserializer).map(|v| v as Level)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count_from_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    let v = whole_number(deserializer)?;
    if v < 0.0 {
        return Err(serde::de::Error::custom(format!("student count must be non-negative, got {v}")));
    }
    Ok(v as u64)
}

#[derive(Debug, Default)]
pub struct CourseLoader;

impl CourseLoader {
    pub fn new() -> Self { Self }

    pub fn load(&self, path: &Path) -> Result<Vec<RawCourse>> {
        if !path.exists() {
            return Err(Error::NotFound(format!("course CSV {}", path.display())).into());
        }
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let courses = self.load_reader(file).with_context(|| format!("loading courses from {}", path.display()))?;
        info!(rows = courses.len(), path = %path.display(), "loaded raw courses");
        Ok(courses)
    }

    pub fn load_reader<R: Read>(&self, reader: R) -> Result<Vec<RawCourse>> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
        let headers = rdr.headers().context("reading CSV headers")?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(Error::MissingColumn {
                    column: column.to_string(),
                    available: headers.iter().map(str::to_string).collect(),
                }
                .into());
            }
        }
        let mut courses = Vec::new();
        for (idx, row) in rdr.deserialize::<CsvCourseRow>().enumerate() {
            // +2: one for the header line, one for 1-based numbering
            let row = row.with_context(|| format!("malformed course row at line {}", idx + 2))?;
            courses.push(RawCourse {
                name: row.name,
                platform: row.platform,
                skills: row.skills.filter(|s| !s.trim().is_empty()),
                level: row.level,
                rating: row.rating,
                num_students: row.num_students,
            });
        }
        debug!(rows = courses.len(), "parsed course rows");
        Ok(courses)
    }
}
