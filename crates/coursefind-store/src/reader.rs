use anyhow::{anyhow, Result};
use arrow_array::cast::AsArray;
use arrow_array::types::Float32Type;
use arrow_array::{Array, FixedSizeListArray, Float32Array, Int64Array, RecordBatch};
use lancedb::Connection;
use tracing::info;

use coursefind_core::types::{Course, CourseDataset};
use crate::schema::COURSES_TABLE;
use crate::table::{read_meta, scan_table, string_column, table_exists};

fn int_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Int64Array> {
	batch.column_by_name(name).and_then(|c| c.as_any().downcast_ref::<Int64Array>()).ok_or_else(|| anyhow!("column '{name}' missing or not int64"))
}

/// Load the augmented dataset in its original row order.
pub async fn load_dataset(conn: &Connection) -> Result<CourseDataset> {
	let meta = read_meta(conn).await?.ok_or_else(|| anyhow!("dataset has no meta table; run the preprocessor first"))?;
	if !table_exists(conn, COURSES_TABLE).await? {
		if meta.rows == 0 { return Ok(CourseDataset::new(Vec::new(), meta.dim)?.with_embedder_id(meta.embedder_id)); }
		return Err(anyhow!("dataset meta lists {} rows but the courses table is missing", meta.rows));
	}
	let mut rows: Vec<(i64, Course)> = Vec::with_capacity(meta.rows);
	for batch in scan_table(conn, COURSES_TABLE).await? {
		let row_ids = int_column(&batch, "row_id")?;
		let names = string_column(&batch, "name")?;
		let platforms = string_column(&batch, "platform")?;
		let skills = string_column(&batch, "skills")?;
		let normalized = string_column(&batch, "normalized_skills")?;
		let levels = int_column(&batch, "level")?;
		let students = int_column(&batch, "num_students")?;
		let ratings = batch.column_by_name("rating").and_then(|c| c.as_any().downcast_ref::<Float32Array>()).ok_or_else(|| anyhow!("column 'rating' missing or not float32"))?;
		let vectors = batch.column_by_name("embedding").and_then(|c| c.as_any().downcast_ref::<FixedSizeListArray>()).ok_or_else(|| anyhow!("column 'embedding' missing or not a fixed-size list"))?;
		for i in 0..batch.num_rows() {
			let list = vectors.value(i);
			let embedding = list.as_primitive::<Float32Type>().values().to_vec();
			let course = Course {
				name: names.value(i).to_string(),
				platform: platforms.value(i).to_string(),
				skills: (!skills.is_null(i)).then(|| skills.value(i).to_string()),
				normalized_skills: normalized.value(i).to_string(),
				level: levels.value(i),
				rating: ratings.value(i),
				num_students: u64::try_from(students.value(i))?,
				embedding,
			};
			rows.push((row_ids.value(i), course));
		}
	}
	rows.sort_by_key(|(id, _)| *id);
	if rows.len() != meta.rows {
		return Err(anyhow!("dataset meta lists {} rows but {} were read", meta.rows, rows.len()));
	}
	info!(rows = rows.len(), dim = meta.dim, embedder = %meta.embedder_id, "loaded augmented dataset");
	Ok(CourseDataset::new(rows.into_iter().map(|(_, c)| c).collect(), meta.dim)?.with_embedder_id(meta.embedder_id))
}
