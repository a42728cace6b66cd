use anyhow::anyhow;

/// The external embedding capability.
///
/// Implementations must be deterministic for a fixed `embedder_id`, and a
/// text must get the same vector whether it is embedded alone or in a batch.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the model (e.g. `minilm:all-MiniLM-L6-v2:d384`).
    fn embedder_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow!("embedder '{}' returned no vector", self.embedder_id()))
    }
}
