//! # Entity Graph Model
//!
//! Immutable description of entities, ids, properties, associations and
//! converters. Values are built once by the ingestion front end and are
//! read-only during generation.

mod entity;
mod graph;
mod types;

pub use entity::*;
pub use graph::*;
pub use types::*;
