//! # Entity Table Generator (etgen)
//!
//! Derives relational table DSL declarations (Exposed `Table` objects) from
//! a declarative entity graph: entities, primary keys, scalar properties and
//! associations between entities.
//!
//! etgen provides:
//! - Type-to-column resolution with annotation defaults
//! - Foreign key columns for owning `MANY_TO_ONE` / `ONE_TO_ONE` sides
//! - Join tables for `MANY_TO_MANY` associations
//! - Accessor functions for values stored through a converter
//! - Cross-namespace imports and a deterministic rendered output
//!
//! ## Quick Start
//!
//! ```rust
//! use etgen::{compile_to_source, EntityDefinition, EntityGraph, EntityGraphs, GeneratorConfig, IdDefinition, Type};
//!
//! let customer = EntityDefinition::new("pl.example.Customer", "customers")
//!     .with_id(IdDefinition::new("id", Type::new("kotlin", "Long")).generated());
//! let graphs = EntityGraphs::new(vec![EntityGraph::new("example").with_entity(customer)])?;
//!
//! let files = compile_to_source(&graphs, &GeneratorConfig::default())?;
//! assert!(files[0].source.contains("object CustomerTable : Table(\"customers\")"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! 1. **Model** - Entity graphs indexed by qualified name
//! 2. **Traversal** - Entities of each namespace, graph by graph, in declaration order
//! 3. **Emission** - Per-entity table, join tables and converter wrappers
//! 4. **Rendering** - Output units turned into source files

pub mod codegen;
pub mod compiler;
pub mod config;
pub mod error;
pub mod model;
pub mod naming;

// Re-export the main generation API
pub use compiler::{compile_to_source, generate_all, generate_namespace, generate_tables};

pub use codegen::{GeneratedFile, OutputUnit};
pub use config::GeneratorConfig;
pub use error::{ConfigError, EntityError, GenerationError, GenerationErrors, ModelError};

// Re-export model types
pub use model::{
    AssociationDefinition, AssociationType, ColumnAnnotation, ConverterDefinition,
    EntityDefinition, EntityGraph, EntityGraphs, EntityKey, IdDefinition, PropertyDefinition,
    SemanticType, Type,
};
