use anyhow::{bail, Result};
use arrow_array::{FixedSizeListArray, Float32Array, Int64Array, RecordBatch, RecordBatchIterator, StringArray};
use lancedb::Connection;
use std::sync::Arc;
use tracing::debug;

use coursefind_core::types::Course;
use crate::schema::{build_courses_schema, COURSES_TABLE};

pub const WRITE_BATCH_ROWS: usize = 1000;

/// Appends courses to the `courses` table in batches, recording each row's
/// position so the original order survives the round trip.
pub struct CourseWriter<'a> { db: &'a Connection, dim: usize, written: usize }

impl<'a> CourseWriter<'a> {
	pub fn new(db: &'a Connection, dim: usize) -> Self { Self { db, dim, written: 0 } }

	pub fn written(&self) -> usize { self.written }

	pub async fn write_all(&mut self, courses: &[Course]) -> Result<()> {
		for batch in courses.chunks(WRITE_BATCH_ROWS) {
			self.insert_batch(batch).await?;
		}
		Ok(())
	}

	async fn insert_batch(&mut self, courses: &[Course]) -> Result<()> {
		if courses.is_empty() { return Ok(()); }
		let record_batch = self.courses_to_record_batch(courses)?; let schema = record_batch.schema();
		let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
		if self.written > 0 {
			self.db.open_table(COURSES_TABLE).execute().await?.add(reader).execute().await?;
		} else {
			self.db.create_table(COURSES_TABLE, reader).execute().await?;
		}
		self.written += courses.len();
		debug!(rows = self.written, "courses batch committed");
		Ok(())
	}

	#[allow(clippy::cast_possible_wrap)]
	fn courses_to_record_batch(&self, courses: &[Course]) -> Result<RecordBatch> {
		let dim = i32::try_from(self.dim)?;
		let schema = build_courses_schema(dim);
		let mut row_ids = Vec::new(); let mut names = Vec::new(); let mut platforms = Vec::new(); let mut skills = Vec::new(); let mut normalized = Vec::new(); let mut levels = Vec::new(); let mut ratings = Vec::new(); let mut students = Vec::new(); let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::new();
		for (i, c) in courses.iter().enumerate() {
			if c.embedding.len() != self.dim { bail!("course '{}' has {} dims, table expects {}", c.name, c.embedding.len(), self.dim); }
			row_ids.push((self.written + i) as i64); names.push(c.name.as_str()); platforms.push(c.platform.as_str()); skills.push(c.skills.as_deref()); normalized.push(c.normalized_skills.as_str()); levels.push(c.level); ratings.push(c.rating); students.push(i64::try_from(c.num_students)?); vectors.push(Some(c.embedding.iter().map(|&x| Some(x)).collect()));
		}
		let record_batch = RecordBatch::try_new(schema, vec![
			Arc::new(Int64Array::from(row_ids)),
			Arc::new(StringArray::from(names)),
			Arc::new(StringArray::from(platforms)),
			Arc::new(StringArray::from(skills)),
			Arc::new(StringArray::from(normalized)),
			Arc::new(Int64Array::from(levels)),
			Arc::new(Float32Array::from(ratings)),
			Arc::new(Int64Array::from(students)),
			Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors.into_iter(), dim)),
		])?;
		Ok(record_batch)
	}
}
