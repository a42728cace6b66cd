//! coursefind-embed
//!
//! Embedding capability for course skills and query keywords: a local
//! sentence-transformers MiniLM model run with candle, plus a deterministic
//! fake for tests. Use [`get_default_embedder`] to pick one from config.

use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use coursefind_core::config::EmbeddingConfig;
use coursefind_core::traits::Embedder;

mod device;
mod fake;
mod pool;
mod tokenize;

pub use device::select_device;
pub use fake::FakeEmbedder;
pub use pool::masked_mean_l2;
pub use tokenize::tokenize_on_device;

pub const DEFAULT_MODEL_NAME: &str = "all-MiniLM-L6-v2";
pub const FAKE_EMBEDDING_DIM: usize = 384;

/// sentence-transformers `all-MiniLM-L6-v2`: BERT encoder, mean pooling,
/// L2 normalization, 384 dimensions.
pub struct MiniLmEmbedder { model: BertModel, tokenizer: Tokenizer, device: Device, dim: usize, max_len: usize, id: String }

impl MiniLmEmbedder {
    pub fn load(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = select_device();
        info!(dir = %model_dir.display(), "loading MiniLM model");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let config_text = std::fs::read_to_string(&config_path).with_context(|| format!("reading {}", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&config_text)?;
        let raw: serde_json::Value = serde_json::from_str(&config_text)?;
        let dim = raw
            .get("hidden_size")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| anyhow!("{} has no hidden_size", config_path.display()))?;
        let dim = usize::try_from(dim)?;
        let max_len = raw
            .get("max_position_embeddings")
            .and_then(serde_json::Value::as_u64)
            .and_then(|m| usize::try_from(m).ok())
            .map_or(max_len, |m| m.min(max_len));

        let weights = load_weights(model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights, DTYPE, &device);
        let model = BertModel::load(vb, &config)?;

        let name = model_dir.file_name().map_or_else(|| DEFAULT_MODEL_NAME.to_string(), |n| n.to_string_lossy().to_string());
        let id = format!("minilm:{name}:d{dim}");
        info!(id = %id, max_len, "MiniLM model loaded");
        Ok(Self { model, tokenizer, device, dim, max_len, id })
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize_on_device(&self.tokenizer, text, self.max_len, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let emb: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        if emb.len() != self.dim { bail!("model produced {} dims, expected {}", emb.len(), self.dim); }
        if start.elapsed().as_millis() > 250 { warn!(ms = start.elapsed().as_millis(), "slow embedding"); }
        Ok(emb)
    }
}

impl Embedder for MiniLmEmbedder {
    fn embedder_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { self.max_len }

    // One forward pass per text: batch and single calls agree bit-for-bit.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_one(t)).collect()
    }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        debug!(path = %safetensors.display(), "reading safetensors weights");
        return Ok(candle_core::safetensors::load(&safetensors, device)?);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    if pickle.exists() {
        debug!(path = %pickle.display(), "reading pytorch weights");
        let weights = candle_core::pickle::read_all(&pickle)?;
        return weights
            .into_iter()
            .map(|(k, t)| -> Result<(String, Tensor)> { Ok((k, t.to_device(device)?)) })
            .collect();
    }
    bail!("no model.safetensors or pytorch_model.bin in {}", model_dir.display())
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).ok().is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Pick the embedder for this process.
///
/// `APP_USE_FAKE_EMBEDDINGS=1` or `embedding.use_fake` selects [`FakeEmbedder`];
/// otherwise the MiniLM model is loaded from [`resolve_model_dir`].
pub fn get_default_embedder(settings: &EmbeddingConfig, model_dir: Option<&Path>) -> Result<Box<dyn Embedder>> {
    if settings.use_fake || env_flag("APP_USE_FAKE_EMBEDDINGS") {
        info!("using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(FAKE_EMBEDDING_DIM)));
    }
    let dir = resolve_model_dir(model_dir)?;
    Ok(Box::new(MiniLmEmbedder::load(&dir, settings.max_len)?))
}

/// Locate the model directory: explicit setting, then `APP_MODEL_DIR`,
/// `MODEL_DIR`, then `models/all-MiniLM-L6-v2` relative to the working dir
/// or its parent.
pub fn resolve_model_dir(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = configured {
        if p.exists() { return Ok(p.to_path_buf()); }
        bail!("configured model dir {} does not exist", p.display());
    }
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            let p = PathBuf::from(&dir);
            if p.exists() { info!(var, dir = %p.display(), "using model dir from env"); return Ok(p); }
        }
    }
    for root in [Path::new("models"), Path::new("../models")] {
        let p = root.join(DEFAULT_MODEL_NAME);
        if p.exists() { info!(dir = %p.display(), "using model dir"); return Ok(p); }
    }
    Err(anyhow!("Could not locate {DEFAULT_MODEL_NAME} model directory"))
}
