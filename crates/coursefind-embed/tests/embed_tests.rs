use coursefind_core::config::EmbeddingConfig;
use coursefind_core::traits::Embedder;
use coursefind_embed::{get_default_embedder, FAKE_EMBEDDING_DIM};

#[test]
fn fake_embedder_shapes_and_determinism() {
    // Force fake embedder to avoid loading the model
    let settings = EmbeddingConfig { use_fake: true, ..EmbeddingConfig::default() };

    let embedder = get_default_embedder(&settings, None).expect("embedder");
    let texts = vec!["python basics".to_string(), "python basics".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), FAKE_EMBEDDING_DIM);
    assert_eq!(embedder.dim(), FAKE_EMBEDDING_DIM);

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    assert_eq!(v1, v2, "deterministic for same input");
    assert!(embedder.embedder_id().starts_with("fake:"));
}

/// Needs the model files; run with
/// `APP_MODEL_DIR=models/all-MiniLM-L6-v2 cargo test -p coursefind-embed -- --ignored`
#[ignore]
#[test]
fn minilm_embeds_related_skills_closer() {
    let embedder = get_default_embedder(&EmbeddingConfig::default(), None).expect("model");
    assert_eq!(embedder.dim(), 384);
    let q = embedder.embed("python").unwrap();
    let hit = embedder.embed("python machine learning").unwrap();
    let miss = embedder.embed("watercolor painting").unwrap();
    let cos = |a: &[f32], b: &[f32]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
    assert!(cos(&q, &hit) > cos(&q, &miss));
    let batch = embedder.embed_batch(&["python".to_string()]).unwrap();
    assert_eq!(batch[0], q, "single and batch calls agree");
}
