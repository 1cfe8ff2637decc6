//! # Table Code Generation
//!
//! Column resolution, association handling, converter wrappers and table
//! emission for entity graphs, plus rendering of the result.

pub mod association;
pub mod converter;
pub mod output;
pub mod render;
pub mod table_emitter;
pub mod type_resolver;

pub use association::{resolve_association, AssociationPlan, JoinTableOwners};
pub use converter::{synthesize_wrapper, ConvertedValue};
pub use output::*;
pub use render::{render_file, render_recipe, render_unit, GeneratedFile};
pub use table_emitter::TableEmitter;
pub use type_resolver::{resolve_column_recipe, ColumnRole, ResolveContext};
