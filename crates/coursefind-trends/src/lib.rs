//! coursefind-trends
//!
//! Technology trend tables computed from yearly developer survey exports:
//! language growth, per-role language growth and learning channels.

pub mod languages;
pub mod learning;
pub mod roles;
pub mod survey;

pub use languages::{language_trends, LanguageTrend, LanguageTrends};
pub use learning::{analyze_learning_methods, LearningMethod};
pub use roles::{analyze_roles, summarize_roles, RoleLanguageTrend, RoleSummary};
pub use survey::{available_years, SurveyData, SurveyLoader, SurveyResponse};
