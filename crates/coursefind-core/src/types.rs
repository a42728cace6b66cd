//! Domain types used by the preprocessor, the store and the recommender.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::normalize::normalize_skills;

pub type Level = i64;

/// A course row as read from the raw CSV, before normalization and embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCourse {
    pub name: String,
    pub platform: String,
    pub skills: Option<String>,
    pub level: Level,
    pub rating: f32,
    pub num_students: u64,
}

impl RawCourse {
    pub fn normalized_skills(&self) -> String {
        normalize_skills(self.skills.as_deref())
    }

    /// Attach the embedding computed from `normalized_skills`.
    pub fn into_course(self, normalized_skills: String, embedding: Vec<f32>) -> Course {
        Course {
            name: self.name,
            platform: self.platform,
            skills: self.skills,
            normalized_skills,
            level: self.level,
            rating: self.rating,
            num_students: self.num_students,
            embedding,
        }
    }
}

/// One course of the augmented dataset.
///
/// - `skills`: raw comma-separated text, `None` when the source field was empty
/// - `normalized_skills`: `normalize(skills)`, computed once at preprocessing
/// - `embedding`: vector of the model dimension derived from `normalized_skills`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    pub platform: String,
    pub skills: Option<String>,
    pub normalized_skills: String,
    pub level: Level,
    pub rating: f32,
    pub num_students: u64,
    pub embedding: Vec<f32>,
}

/// How a platform filter value is compared against a course's platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformMatch {
    /// Case-sensitive containment: `"Cour"` also selects `"Coursera"`.
    #[default]
    Substring,
    Exact,
}

impl PlatformMatch {
    pub fn matches(self, course_platform: &str, wanted: &str) -> bool {
        match self {
            PlatformMatch::Substring => course_platform.contains(wanted),
            PlatformMatch::Exact => course_platform == wanted,
        }
    }
}

/// The augmented dataset: an ordered, immutable sequence of courses whose
/// embeddings all share one dimension.
///
/// `embedder_id` names the model that produced the embeddings when the
/// dataset was loaded from disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseDataset {
    courses: Vec<Course>,
    dim: usize,
    embedder_id: Option<String>,
}

impl CourseDataset {
    pub fn new(courses: Vec<Course>, dim: usize) -> Result<Self> {
        if let Some((idx, bad)) = courses.iter().enumerate().find(|(_, c)| c.embedding.len() != dim) {
            return Err(Error::InvalidDataset(format!(
                "course #{idx} '{}' has embedding of length {}, expected {dim}",
                bad.name,
                bad.embedding.len()
            )));
        }
        if let Some(bad) = courses.iter().find(|c| !(0.0..=5.0).contains(&c.rating)) {
            return Err(Error::InvalidDataset(format!("course '{}' has rating {} outside [0, 5]", bad.name, bad.rating)));
        }
        Ok(Self { courses, dim, embedder_id: None })
    }

    #[must_use]
    pub fn with_embedder_id(mut self, embedder_id: impl Into<String>) -> Self {
        self.embedder_id = Some(embedder_id.into());
        self
    }

    pub fn embedder_id(&self) -> Option<&str> { self.embedder_id.as_deref() }

    pub fn courses(&self) -> &[Course] { &self.courses }

    pub fn dim(&self) -> usize { self.dim }

    pub fn len(&self) -> usize { self.courses.len() }

    pub fn is_empty(&self) -> bool { self.courses.is_empty() }

    /// Distinct levels present, ascending.
    pub fn levels(&self) -> Vec<Level> {
        let mut levels: Vec<Level> = self.courses.iter().map(|c| c.level).collect();
        levels.sort_unstable();
        levels.dedup();
        levels
    }

    /// Distinct platforms present, sorted.
    pub fn platforms(&self) -> Vec<String> {
        let mut platforms: Vec<String> = self.courses.iter().map(|c| c.platform.clone()).collect();
        platforms.sort();
        platforms.dedup();
        platforms
    }
}
