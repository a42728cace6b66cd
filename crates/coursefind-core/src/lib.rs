//! coursefind-core
//!
//! Domain types, skills normalization, raw course loading and the layered
//! configuration shared by every coursefind crate.

pub mod config;
pub mod course_loader;
pub mod error;
pub mod normalize;
pub mod traits;
pub mod types;
