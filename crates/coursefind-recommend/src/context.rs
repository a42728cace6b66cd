use coursefind_core::traits::Embedder;
use coursefind_core::types::{CourseDataset, Level, PlatformMatch};

use crate::error::RecommendError;

/// Everything a query needs, built once at startup and shared by reference.
///
/// Holds the loaded dataset, the embedder and the valid level and platform
/// domains derived from the dataset. Never mutated after construction.
pub struct RecommendContext {
    dataset: CourseDataset,
    embedder: Box<dyn Embedder>,
    levels: Vec<Level>,
    platforms: Vec<String>,
    platform_match: PlatformMatch,
}

impl RecommendContext {
    /// Fails when the dataset was embedded by a different model than
    /// `embedder`, or when their dimensions differ.
    pub fn new(dataset: CourseDataset, embedder: Box<dyn Embedder>) -> Result<Self, RecommendError> {
        if let Some(expected) = dataset.embedder_id() {
            if expected != embedder.embedder_id() {
                return Err(RecommendError::EmbedderMismatch {
                    expected: expected.to_string(),
                    actual: embedder.embedder_id().to_string(),
                });
            }
        }
        if !dataset.is_empty() && embedder.dim() != dataset.dim() {
            return Err(RecommendError::DimensionMismatch { expected: dataset.dim(), actual: embedder.dim() });
        }
        let levels = dataset.levels();
        let platforms = dataset.platforms();
        Ok(Self { dataset, embedder, levels, platforms, platform_match: PlatformMatch::default() })
    }

    #[must_use]
    pub fn with_platform_match(mut self, platform_match: PlatformMatch) -> Self {
        self.platform_match = platform_match;
        self
    }

    pub fn dataset(&self) -> &CourseDataset { &self.dataset }

    pub fn embedder(&self) -> &dyn Embedder { self.embedder.as_ref() }

    pub fn levels(&self) -> &[Level] { &self.levels }

    pub fn platforms(&self) -> &[String] { &self.platforms }

    pub fn platform_match(&self) -> PlatformMatch { self.platform_match }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn context_is_shareable_across_threads() {
        assert_send_sync::<RecommendContext>();
    }
}
