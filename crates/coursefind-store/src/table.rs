//! LanceDB connection and housekeeping helpers.
//!
//! Opens databases, scans whole tables, and reads/writes the key/value
//! `meta` table recording how the persisted dataset was produced.

use anyhow::{anyhow, Context, Result};
use arrow_array::{Array, RecordBatch, RecordBatchIterator, StringArray};
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::schema::{build_meta_schema, META_TABLE};

pub async fn open_db(uri: &str) -> Result<Connection> {
	Ok(connect(uri).execute().await?)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
	Ok(conn.table_names().execute().await?.iter().any(|t| t == name))
}

/// Read every row of `name`, in storage order.
pub async fn scan_table(conn: &Connection, name: &str) -> Result<Vec<RecordBatch>> {
	let t = conn.open_table(name).execute().await?;
	let rows = t.count_rows(None).await?;
	if rows == 0 { return Ok(Vec::new()); }
	let mut stream = t.query().limit(rows).execute().await?;
	let mut batches = Vec::new();
	while let Some(batch) = futures::TryStreamExt::try_next(&mut stream).await? {
		batches.push(batch);
	}
	Ok(batches)
}

pub(crate) fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
	batch
		.column_by_name(name)
		.and_then(|c| c.as_any().downcast_ref::<StringArray>())
		.ok_or_else(|| anyhow!("column '{name}' missing or not utf8"))
}

/// Provenance of a persisted dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMeta {
	/// blake3 hex digest of the raw course CSV bytes.
	pub fingerprint: String,
	pub embedder_id: String,
	pub dim: usize,
	pub rows: usize,
	/// RFC 3339 timestamp of the preprocessing run.
	pub created_at: String,
}

impl DatasetMeta {
	pub fn is_current(&self, fingerprint: &str, embedder_id: &str) -> bool {
		self.fingerprint == fingerprint && self.embedder_id == embedder_id
	}

	fn to_pairs(&self) -> Vec<(&'static str, String)> {
		vec![
			("fingerprint", self.fingerprint.clone()),
			("embedder_id", self.embedder_id.clone()),
			("dim", self.dim.to_string()),
			("rows", self.rows.to_string()),
			("created_at", self.created_at.clone()),
		]
	}

	fn from_pairs(mut map: HashMap<String, String>) -> Result<Self> {
		let mut take = |k: &str| map.remove(k).ok_or_else(|| anyhow!("meta key '{k}' missing"));
		Ok(Self {
			fingerprint: take("fingerprint")?,
			embedder_id: take("embedder_id")?,
			dim: take("dim")?.parse().context("meta 'dim'")?,
			rows: take("rows")?.parse().context("meta 'rows'")?,
			created_at: take("created_at")?,
		})
	}
}

pub async fn write_meta(conn: &Connection, meta: &DatasetMeta) -> Result<()> {
	let pairs = meta.to_pairs();
	let rb = RecordBatch::try_new(
		build_meta_schema(),
		vec![
			Arc::new(StringArray::from(pairs.iter().map(|(k, _)| *k).collect::<Vec<_>>())),
			Arc::new(StringArray::from(pairs.iter().map(|(_, v)| v.as_str()).collect::<Vec<_>>())),
		],
	)?;
	let reader = Box::new(RecordBatchIterator::new(vec![Ok(rb)].into_iter(), build_meta_schema()));
	conn.create_table(META_TABLE, reader).execute().await?;
	Ok(())
}

pub async fn read_meta(conn: &Connection) -> Result<Option<DatasetMeta>> {
	if !table_exists(conn, META_TABLE).await? { return Ok(None); }
	let mut map = HashMap::new();
	for batch in scan_table(conn, META_TABLE).await? {
		let keys = string_column(&batch, "key")?;
		let values = string_column(&batch, "value")?;
		for i in 0..batch.num_rows() {
			if keys.is_null(i) || values.is_null(i) { continue; }
			map.insert(keys.value(i).to_string(), values.value(i).to_string());
		}
	}
	DatasetMeta::from_pairs(map).map(Some)
}
