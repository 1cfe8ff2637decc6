//! # Error Types
//!
//! Model, configuration and generation errors.
//!
//! Generation errors are configuration errors in the entity graph, not I/O
//! failures. They are raised where an unsupported type is first dispatched
//! and grouped per entity, so a single run reports every problem at once.

use crate::model::{EntityKey, Type};
use std::fmt;
use thiserror::Error;

/// Errors raised while emitting a single entity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("id type not supported: {0}")]
    IdTypeNotSupported(Type),

    #[error("property type not supported: {0}")]
    PropertyTypeNotSupported(Type),

    #[error("type converter target not supported: {0} (expected a String or Long carrier)")]
    TypeConverterNotSupported(Type),

    #[error("entity `{entity}` has no id but is referenced by a join table")]
    MissingId { entity: String },

    #[error("association target `{0}` is not part of any entity graph")]
    UnknownEntity(EntityKey),
}

/// All errors of one entity; its declarations were not emitted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("entity `{entity}`: {}", join_errors(.errors))]
pub struct EntityError {
    pub entity: String,
    pub errors: Vec<GenerationError>,
}

fn join_errors(errors: &[GenerationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Run-level report of every entity that failed to emit
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationErrors(pub Vec<EntityError>);

impl GenerationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn push(&mut self, error: EntityError) {
        self.0.push(error);
    }

    pub fn extend(&mut self, other: GenerationErrors) {
        self.0.extend(other.0);
    }

    /// Every individual error, flattened across entities
    pub fn iter_errors(&self) -> impl Iterator<Item = &GenerationError> {
        self.0.iter().flat_map(|entity| entity.errors.iter())
    }

    /// `Ok(value)` when no entity failed
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for GenerationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "table generation failed for {} entities", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for GenerationErrors {}

/// Errors raised while assembling the entity graphs
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("entity `{0}` is declared more than once")]
    DuplicateEntity(EntityKey),

    #[error("association `{association}` on `{entity}` targets unknown entity `{target}`")]
    UnresolvedTarget {
        entity: EntityKey,
        association: String,
        target: EntityKey,
    },

    #[error("malformed entity graph JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading generator configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}
