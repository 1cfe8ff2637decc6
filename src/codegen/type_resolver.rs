//! # Type Resolver
//!
//! Maps a declared value type onto a column recipe of the table DSL.

use super::output::{ColumnKind, ColumnRecipe};
use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::model::{ColumnAnnotation, IdDefinition, PropertyDefinition, SemanticType, Type};

/// What kind of column is being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Id { generated: bool },
    Property { nullable: bool },
}

/// Dispatch target of a column: a native DSL type or a converter wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind<'a> {
    Native(SemanticType),
    Converted { wrapper: &'a str },
}

#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub role: ColumnRole,
    pub column_name: &'a str,
    pub annotation: Option<&'a ColumnAnnotation>,
    /// Name of the synthesized converter wrapper, when the value has a converter
    pub wrapper: Option<&'a str>,
}

/// Resolve the column recipe for `ty` in the given context
pub fn resolve_column_recipe(
    ty: &Type,
    context: &ResolveContext<'_>,
    config: &GeneratorConfig,
) -> Result<ColumnRecipe, GenerationError> {
    let value = classify(ty, context)?;

    let kind = match value {
        ValueKind::Converted { wrapper } => ColumnKind::Converted {
            wrapper: wrapper.to_string(),
        },
        ValueKind::Native(semantic) => native_kind(semantic, context.annotation, config),
    };

    let mut recipe = ColumnRecipe::new(kind, context.column_name);
    match context.role {
        ColumnRole::Id { generated } => {
            recipe.primary_key = true;
            if generated {
                if recipe.kind.is_integral() {
                    recipe.auto_increment = true;
                } else {
                    tracing::warn!(
                        "[RESOLVE] Ignoring generated value on non-integral id column '{}' ({})",
                        context.column_name,
                        ty
                    );
                }
            }
        }
        ColumnRole::Property { nullable } => {
            recipe.nullable = nullable;
        }
    }

    Ok(recipe)
}

fn classify<'a>(ty: &Type, context: &ResolveContext<'a>) -> Result<ValueKind<'a>, GenerationError> {
    if let Some(wrapper) = context.wrapper {
        return Ok(ValueKind::Converted { wrapper });
    }

    match (context.role, ty.semantic()) {
        (ColumnRole::Id { .. }, Some(semantic)) if semantic.is_id_capable() => {
            Ok(ValueKind::Native(semantic))
        }
        (ColumnRole::Id { .. }, _) => Err(GenerationError::IdTypeNotSupported(ty.clone())),
        (ColumnRole::Property { .. }, Some(semantic)) => Ok(ValueKind::Native(semantic)),
        (ColumnRole::Property { .. }, None) => {
            Err(GenerationError::PropertyTypeNotSupported(ty.clone()))
        }
    }
}

/// Native constructor for a semantic type, filling annotation defaults
pub fn native_kind(
    semantic: SemanticType,
    annotation: Option<&ColumnAnnotation>,
    config: &GeneratorConfig,
) -> ColumnKind {
    match semantic {
        SemanticType::String => ColumnKind::Varchar {
            length: annotation
                .and_then(|annotation| annotation.length)
                .unwrap_or(config.default_varchar_length),
        },
        SemanticType::Long => ColumnKind::Long,
        SemanticType::Int => ColumnKind::Integer,
        SemanticType::Short => ColumnKind::Short,
        SemanticType::Boolean => ColumnKind::Bool,
        SemanticType::Float => ColumnKind::Float,
        SemanticType::Double => ColumnKind::Double,
        SemanticType::BigDecimal => ColumnKind::Decimal {
            precision: annotation
                .and_then(|annotation| annotation.precision)
                .unwrap_or(config.default_decimal_precision),
            scale: annotation
                .and_then(|annotation| annotation.scale)
                .unwrap_or(config.default_decimal_scale),
        },
        SemanticType::Uuid => ColumnKind::Uuid,
        SemanticType::DateTime => ColumnKind::DateTime,
        SemanticType::LocalDateTime => ColumnKind::LocalDateTime,
        SemanticType::ZonedDateTime => ColumnKind::ZonedDateTime,
    }
}

/// Primary key column of an entity
pub fn resolve_id_column(
    id: &IdDefinition,
    wrapper: Option<&str>,
    config: &GeneratorConfig,
) -> Result<ColumnRecipe, GenerationError> {
    let context = ResolveContext {
        role: ColumnRole::Id {
            generated: id.generated_value,
        },
        column_name: &id.column_name,
        annotation: id.annotation.as_ref(),
        wrapper,
    };
    resolve_column_recipe(&id.ty, &context, config)
}

/// Column of a scalar property
pub fn resolve_property_column(
    property: &PropertyDefinition,
    wrapper: Option<&str>,
    config: &GeneratorConfig,
) -> Result<ColumnRecipe, GenerationError> {
    let context = ResolveContext {
        role: ColumnRole::Property {
            nullable: property.nullable,
        },
        column_name: &property.column_name,
        annotation: property.annotation.as_ref(),
        wrapper,
    };
    resolve_column_recipe(&property.ty, &context, config)
}
