//! coursefind-store
//!
//! Persistence of the augmented course dataset in a LanceDB directory and the
//! preprocessing pipeline that produces it.

pub mod preprocess;
pub mod reader;
pub mod schema;
pub mod table;
pub mod writer;

use anyhow::Result;
use coursefind_core::types::CourseDataset;
use std::path::Path;

pub use preprocess::{PreprocessOptions, PreprocessOutcome, Preprocessor};
pub use table::DatasetMeta;

/// Open the dataset directory and load every course.
pub async fn load_dataset(dir: &Path) -> Result<CourseDataset> {
    if !dir.exists() {
        return Err(coursefind_core::error::Error::NotFound(format!("dataset {}; run coursefind-preprocess first", dir.display())).into());
    }
    let conn = table::open_db(&dir.to_string_lossy()).await?;
    reader::load_dataset(&conn).await
}
