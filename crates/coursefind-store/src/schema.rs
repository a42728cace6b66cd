use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

pub const COURSES_TABLE: &str = "courses";
pub const META_TABLE: &str = "meta";

pub fn build_courses_schema(dim: i32) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("row_id", DataType::Int64, false),
		Field::new("name", DataType::Utf8, false),
		Field::new("platform", DataType::Utf8, false),
		Field::new("skills", DataType::Utf8, true),
		Field::new("normalized_skills", DataType::Utf8, false),
		Field::new("level", DataType::Int64, false),
		Field::new("rating", DataType::Float32, false),
		Field::new("num_students", DataType::Int64, false),
		Field::new("embedding", DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), false),
	]))
}

// Key/value rows describing how the dataset was produced.
pub fn build_meta_schema() -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("key", DataType::Utf8, false),
		Field::new("value", DataType::Utf8, false),
	]))
}
