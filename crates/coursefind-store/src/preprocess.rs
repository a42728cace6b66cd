//! The one-shot embedding preprocessor.
//!
//! Reads the raw course CSV, normalizes skills, embeds them and persists the
//! augmented dataset. The dataset is written to a sibling staging directory
//! and only moved into place once every table is committed, so a reader
//! never sees a partial dataset. Reruns are skipped when the raw file and
//! embedder are unchanged.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use coursefind_core::course_loader::CourseLoader;
use coursefind_core::error::Error;
use coursefind_core::traits::Embedder;
use coursefind_core::types::{Course, RawCourse};
use crate::table::{open_db, read_meta, write_meta, DatasetMeta};
use crate::writer::CourseWriter;

#[derive(Debug, Clone)]
pub struct PreprocessOptions {
	pub batch_size: usize,
	/// Rebuild even when the persisted dataset is current.
	pub force: bool,
}

impl Default for PreprocessOptions {
	fn default() -> Self { Self { batch_size: 32, force: false } }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreprocessOutcome {
	Written(DatasetMeta),
	/// The persisted dataset already matches the input and embedder.
	Skipped(DatasetMeta),
}

impl PreprocessOutcome {
	pub fn meta(&self) -> &DatasetMeta {
		match self { PreprocessOutcome::Written(m) | PreprocessOutcome::Skipped(m) => m }
	}
}

pub fn fingerprint(bytes: &[u8]) -> String { blake3::hash(bytes).to_hex().to_string() }

pub struct Preprocessor<'a> { embedder: &'a dyn Embedder, options: PreprocessOptions }

impl<'a> Preprocessor<'a> {
	pub fn new(embedder: &'a dyn Embedder, options: PreprocessOptions) -> Self { Self { embedder, options } }

	pub async fn run(&self, input: &Path, output: &Path) -> Result<PreprocessOutcome> {
		if !input.exists() { return Err(Error::NotFound(format!("course CSV {}", input.display())).into()); }
		let raw_bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
		let fingerprint = fingerprint(&raw_bytes);

		if !self.options.force {
			if let Some(meta) = current_meta(output).await {
				if meta.is_current(&fingerprint, self.embedder.embedder_id()) {
					info!(output = %output.display(), rows = meta.rows, "dataset is up to date; skipping preprocessing");
					return Ok(PreprocessOutcome::Skipped(meta));
				}
			}
		}

		let raw = CourseLoader::new().load_reader(raw_bytes.as_slice()).with_context(|| format!("loading courses from {}", input.display()))?;
		let courses = self.embed_courses(raw)?;
		let meta = DatasetMeta {
			fingerprint,
			embedder_id: self.embedder.embedder_id().to_string(),
			dim: self.embedder.dim(),
			rows: courses.len(),
			created_at: Utc::now().to_rfc3339(),
		};

		let staging = sibling(output, "staging");
		if staging.exists() { fs::remove_dir_all(&staging)?; }
		if let Some(parent) = output.parent() { fs::create_dir_all(parent)?; }
		{
			let conn = open_db(&staging.to_string_lossy()).await?;
			let mut writer = CourseWriter::new(&conn, meta.dim);
			writer.write_all(&courses).await?;
			write_meta(&conn, &meta).await?;
		}
		swap_into_place(&staging, output)?;
		info!(output = %output.display(), rows = meta.rows, embedder = %meta.embedder_id, "augmented dataset written");
		Ok(PreprocessOutcome::Written(meta))
	}

	/// Normalize and embed every course, `batch_size` texts per embedder call.
	pub fn embed_courses(&self, raw: Vec<RawCourse>) -> Result<Vec<Course>> {
		let batch_size = self.options.batch_size.max(1);
		let pb = ProgressBar::new(raw.len() as u64);
		pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} courses ({percent}%) {msg}")?.progress_chars("#>-"));
		let mut courses = Vec::with_capacity(raw.len());
		let mut pending = raw.into_iter().peekable();
		while pending.peek().is_some() {
			let batch: Vec<RawCourse> = pending.by_ref().take(batch_size).collect();
			let texts: Vec<String> = batch.iter().map(RawCourse::normalized_skills).collect();
			let embeddings = self.embedder.embed_batch(&texts)?;
			if embeddings.len() != batch.len() { bail!("embedder returned {} vectors for {} texts", embeddings.len(), batch.len()); }
			for ((course, text), embedding) in batch.into_iter().zip(texts).zip(embeddings) {
				if embedding.len() != self.embedder.dim() { bail!("embedder returned {} dims, expected {}", embedding.len(), self.embedder.dim()); }
				courses.push(course.into_course(text, embedding));
			}
			pb.set_position(courses.len() as u64);
		}
		pb.finish_with_message("embedded");
		Ok(courses)
	}
}

async fn current_meta(output: &Path) -> Option<DatasetMeta> {
	if !output.exists() { return None; }
	let conn = open_db(&output.to_string_lossy()).await.ok()?;
	match read_meta(&conn).await {
		Ok(meta) => meta,
		Err(e) => { warn!(error = %e, "unreadable dataset meta; rebuilding"); None }
	}
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
	let mut name = path.file_name().map_or_else(|| OsString::from("dataset"), OsString::from);
	name.push(format!(".{suffix}"));
	path.with_file_name(name)
}

fn swap_into_place(staging: &Path, output: &Path) -> Result<()> {
	let retired = sibling(output, "old");
	if retired.exists() { fs::remove_dir_all(&retired)?; }
	if output.exists() { fs::rename(output, &retired)?; }
	fs::rename(staging, output).with_context(|| format!("moving {} to {}", staging.display(), output.display()))?;
	if retired.exists() { fs::remove_dir_all(&retired)?; }
	if let Some(parent) = output.parent() {
		if let Err(e) = sync_dir(parent) {
			warn!(dir = %parent.display(), error = %e, "could not sync dataset directory entries");
		}
	}
	Ok(())
}

/// Flush a directory's entries to disk. Not supported on every platform.
pub(crate) fn sync_dir(dir: &Path) -> std::io::Result<()> {
	fs::File::open(dir)?.sync_all()
}
