use coursefind_core::config::Config;
use coursefind_embed::get_default_embedder;

fn main() -> anyhow::Result<()> {
    let settings = Config::load()?.settings()?;
    let embedder = get_default_embedder(&settings.embedding, settings.model_dir_path().as_deref())?;
    let texts = vec!["python basics".to_string(), "machine learning".to_string()];
    let embs = embedder.embed_batch(&texts)?;
    println!("id={} B={} dim={}", embedder.embedder_id(), embs.len(), embedder.dim());
    Ok(())
}
