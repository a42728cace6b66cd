//! Skills text normalization.
//!
//! Applied exactly once per course at preprocessing time; the recommender
//! only ever reads the stored result.

/// Text used in place of a missing `skills` field.
///
/// Missing skills are normalized and embedded as this literal word, never as
/// an empty string.
pub const MISSING_SKILLS_SENTINEL: &str = "nan";

/// Lowercase, turn commas into spaces, collapse whitespace runs and trim.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize an optional skills field, substituting [`MISSING_SKILLS_SENTINEL`].
pub fn normalize_skills(skills: Option<&str>) -> String {
    normalize(skills.unwrap_or(MISSING_SKILLS_SENTINEL))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_splits_commas() {
        assert_eq!(normalize("Python, Machine Learning,SQL"), "python machine learning sql");
    }

    #[test]
    fn collapses_whitespace_and_trims() {
        assert_eq!(normalize("  data \t science,,  \n r  "), "data science r");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" , ,"), "");
    }

    #[test]
    fn missing_skills_use_sentinel() {
        assert_eq!(normalize_skills(None), "nan");
        assert_eq!(normalize_skills(Some("Go, Rust")), "go rust");
    }

    #[test]
    fn idempotent() {
        for s in ["Python, Basics", "  A,,B  c ", "ÉLAN, Ünïcode", "already normal", "", "C#, .NET Core"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "input {s:?}");
        }
    }
}
