//! # Entity Definitions
//!
//! Entities, their ids, properties, converters and associations, as handed
//! over by the ingestion front end.

use super::types::Type;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of an entity across all graphs: its qualified name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(pub String);

impl EntityKey {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self(qualified_name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Column annotation parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAnnotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
}

impl ColumnAnnotation {
    pub fn length(length: u32) -> Self {
        Self {
            length: Some(length),
            ..Self::default()
        }
    }

    pub fn decimal(precision: u32, scale: u32) -> Self {
        Self {
            precision: Some(precision),
            scale: Some(scale),
            ..Self::default()
        }
    }
}

/// A user converter between a stored primitive and an attribute type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConverterDefinition {
    /// Name of the converter unit, e.g. `pl.example.StatusConverter`
    pub name: String,
    /// Database-side type the converter writes
    pub target_type: Type,
}

impl ConverterDefinition {
    pub fn new(name: impl Into<String>, target_type: Type) -> Self {
        Self {
            name: name.into(),
            target_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdDefinition {
    pub name: String,
    pub column_name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<ColumnAnnotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converter: Option<ConverterDefinition>,
    #[serde(default)]
    pub generated_value: bool,
}

impl IdDefinition {
    /// Id whose column name equals its property name
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        let name = name.into();
        Self {
            column_name: name.clone(),
            name,
            ty,
            annotation: None,
            converter: None,
            generated_value: false,
        }
    }

    pub fn generated(mut self) -> Self {
        self.generated_value = true;
        self
    }

    pub fn with_column_name(mut self, column_name: impl Into<String>) -> Self {
        self.column_name = column_name.into();
        self
    }

    pub fn with_annotation(mut self, annotation: ColumnAnnotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn with_converter(mut self, converter: ConverterDefinition) -> Self {
        self.converter = Some(converter);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    pub column_name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<ColumnAnnotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converter: Option<ConverterDefinition>,
}

impl PropertyDefinition {
    /// Non-nullable property whose column name defaults to its name
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        let name = name.into();
        Self {
            column_name: name.clone(),
            name,
            ty,
            nullable: false,
            annotation: None,
            converter: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_column_name(mut self, column_name: impl Into<String>) -> Self {
        self.column_name = column_name.into();
        self
    }

    pub fn with_annotation(mut self, annotation: ColumnAnnotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn with_converter(mut self, converter: ConverterDefinition) -> Self {
        self.converter = Some(converter);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssociationType {
    ManyToOne,
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl fmt::Display for AssociationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ManyToOne => "MANY_TO_ONE",
            Self::OneToOne => "ONE_TO_ONE",
            Self::OneToMany => "ONE_TO_MANY",
            Self::ManyToMany => "MANY_TO_MANY",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationDefinition {
    pub name: String,
    /// Target entity, resolved through [`EntityGraphs`](super::EntityGraphs)
    pub target: EntityKey,
    #[serde(rename = "type")]
    pub association_type: AssociationType,
    pub target_id: IdDefinition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_column: Option<String>,
    /// Whether this side owns the foreign key
    #[serde(default = "default_mapped")]
    pub mapped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_by: Option<String>,
    /// Join table name, many-to-many only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_table: Option<String>,
}

fn default_mapped() -> bool {
    true
}

impl AssociationDefinition {
    pub fn new(
        name: impl Into<String>,
        association_type: AssociationType,
        target: &EntityDefinition,
        target_id: IdDefinition,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.key(),
            association_type,
            target_id,
            join_column: None,
            mapped: true,
            mapped_by: None,
            join_table: None,
        }
    }

    pub fn many_to_one(name: impl Into<String>, target: &EntityDefinition, target_id: IdDefinition) -> Self {
        Self::new(name, AssociationType::ManyToOne, target, target_id)
    }

    pub fn one_to_one(name: impl Into<String>, target: &EntityDefinition, target_id: IdDefinition) -> Self {
        Self::new(name, AssociationType::OneToOne, target, target_id)
    }

    pub fn one_to_many(
        name: impl Into<String>,
        target: &EntityDefinition,
        target_id: IdDefinition,
        mapped_by: impl Into<String>,
    ) -> Self {
        Self::new(name, AssociationType::OneToMany, target, target_id).mapped_by(mapped_by)
    }

    pub fn many_to_many(
        name: impl Into<String>,
        target: &EntityDefinition,
        target_id: IdDefinition,
        join_table: impl Into<String>,
    ) -> Self {
        let mut association = Self::new(name, AssociationType::ManyToMany, target, target_id);
        association.join_table = Some(join_table.into());
        association
    }

    pub fn with_join_column(mut self, join_column: impl Into<String>) -> Self {
        self.join_column = Some(join_column.into());
        self
    }

    /// Mark this side as the inverse of `property` on the target
    pub fn mapped_by(mut self, property: impl Into<String>) -> Self {
        self.mapped = false;
        self.mapped_by = Some(property.into());
        self
    }

    /// Whether this association stores a foreign key column on its source table
    pub fn owns_foreign_key(&self) -> bool {
        match self.association_type {
            AssociationType::ManyToOne => true,
            AssociationType::OneToOne => self.mapped,
            AssociationType::OneToMany | AssociationType::ManyToMany => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    pub name: String,
    pub qualified_name: String,
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<IdDefinition>,
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
    #[serde(default)]
    pub associations: Vec<AssociationDefinition>,
}

impl EntityDefinition {
    pub fn new(qualified_name: impl Into<String>, table: impl Into<String>) -> Self {
        let qualified_name = qualified_name.into();
        let name = qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(qualified_name.as_str())
            .to_string();
        Self {
            name,
            qualified_name,
            table: table.into(),
            id: None,
            properties: Vec::new(),
            associations: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: IdDefinition) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_property(mut self, property: PropertyDefinition) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_association(mut self, association: AssociationDefinition) -> Self {
        self.associations.push(association);
        self
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.qualified_name.clone())
    }

    /// Namespace of the entity: its qualified name up to the last `.`
    pub fn namespace(&self) -> &str {
        self.qualified_name
            .rsplit_once('.')
            .map(|(namespace, _)| namespace)
            .unwrap_or("")
    }

    /// Associations of one kind, in declaration order
    pub fn associations_of(
        &self,
        association_type: AssociationType,
    ) -> impl Iterator<Item = &AssociationDefinition> {
        self.associations
            .iter()
            .filter(move |association| association.association_type == association_type)
    }
}
