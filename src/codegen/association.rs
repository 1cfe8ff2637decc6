//! # Association Resolver
//!
//! Decides what each association edge contributes to the schema:
//!
//! - `MANY_TO_ONE` and mapped `ONE_TO_ONE` own a nullable foreign key column
//!   on the source table, typed like the target id
//! - unmapped `ONE_TO_ONE` and `ONE_TO_MANY` contribute nothing; the other
//!   side owns the key
//! - `MANY_TO_MANY` synthesizes a join table with two long foreign keys,
//!   emitted once per join table however many sides declare it

use super::converter::carrier_of;
use super::output::{Carrier, ColumnKind, ColumnRecipe, ColumnSpec, JoinKey, JoinTableDecl};
use super::type_resolver::native_kind;
use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::model::{
    AssociationDefinition, AssociationType, EntityDefinition, EntityGraphs, EntityKey, SemanticType, Type,
};
use crate::naming::{as_object, as_variable};
use std::collections::BTreeMap;

/// What an association produces on its declaring entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationPlan {
    ForeignKey(ColumnSpec),
    JoinTable(JoinTableDecl),
    Skip,
}

pub fn resolve_association(
    source: &EntityDefinition,
    association: &AssociationDefinition,
    graphs: &EntityGraphs,
    config: &GeneratorConfig,
) -> Result<AssociationPlan, GenerationError> {
    if association.owns_foreign_key() {
        let target = target_entity(association, graphs)?;
        return foreign_key(association, target, config).map(AssociationPlan::ForeignKey);
    }

    match association.association_type {
        AssociationType::ManyToMany => {
            let target = target_entity(association, graphs)?;
            join_table(source, association, target, config).map(AssociationPlan::JoinTable)
        }
        _ => Ok(AssociationPlan::Skip),
    }
}

/// The declaring association of every join table in a generation run.
///
/// Both sides of a many-to-many may declare the same join table, possibly
/// from different namespaces. The first declaration in traversal order
/// (graph order, then entity order, then association order) owns it.
#[derive(Debug, Clone, Default)]
pub struct JoinTableOwners {
    owners: BTreeMap<JoinKey, (EntityKey, String)>,
}

impl JoinTableOwners {
    pub fn collect(graphs: &EntityGraphs) -> Self {
        let mut owners = BTreeMap::new();
        for (_, entity) in graphs.entities() {
            for association in entity.associations_of(AssociationType::ManyToMany) {
                let Some(target) = graphs.entity(&association.target) else {
                    continue;
                };
                let key = JoinKey::new(
                    &entity.key(),
                    &target.key(),
                    &join_table_name(entity, association, target),
                );
                owners
                    .entry(key)
                    .or_insert_with(|| (entity.key(), association.name.clone()));
            }
        }
        tracing::debug!("[RESOLVE] {} join tables in this run", owners.len());
        Self { owners }
    }

    /// Whether `association` of `source` is the one that emits `table`
    pub fn owns(&self, source: &EntityDefinition, association: &AssociationDefinition, table: &JoinTableDecl) -> bool {
        let key = JoinKey::new(&table.source, &table.target, &table.table_name);
        self.owners
            .get(&key)
            .map_or(true, |(entity, name)| *entity == source.key() && *name == association.name)
    }
}

fn target_entity<'g>(
    association: &AssociationDefinition,
    graphs: &'g EntityGraphs,
) -> Result<&'g EntityDefinition, GenerationError> {
    graphs
        .entity(&association.target)
        .ok_or_else(|| GenerationError::UnknownEntity(association.target.clone()))
}

/// Default foreign key column name: `<property>_<targetId>`
pub fn foreign_key_column_name(association: &AssociationDefinition) -> String {
    association.join_column.clone().unwrap_or_else(|| {
        format!(
            "{}_{}",
            association.name,
            as_variable(&association.target_id.name)
        )
    })
}

fn foreign_key(
    association: &AssociationDefinition,
    target: &EntityDefinition,
    config: &GeneratorConfig,
) -> Result<ColumnSpec, GenerationError> {
    let target_id = &association.target_id;
    let annotation = target_id.annotation.as_ref();

    // a converter-backed target id is referenced through its carrier column
    let (kind, value_type) = match &target_id.converter {
        Some(converter) => {
            let kind = match carrier_of(converter)? {
                Carrier::String => native_kind(SemanticType::String, annotation, config),
                Carrier::Long => ColumnKind::Long,
            };
            (kind, converter.target_type.clone())
        }
        None => {
            let semantic = target_id
                .ty
                .semantic()
                .filter(|semantic| semantic.is_id_capable())
                .ok_or_else(|| GenerationError::IdTypeNotSupported(target_id.ty.clone()))?;
            (native_kind(semantic, annotation, config), target_id.ty.clone())
        }
    };

    let recipe = ColumnRecipe::new(kind, foreign_key_column_name(association))
        .references(config.table_object(&target.name), as_variable(&target_id.name))
        .nullable();

    Ok(ColumnSpec {
        name: association.name.clone(),
        value_type,
        recipe,
    })
}

fn join_table(
    source: &EntityDefinition,
    association: &AssociationDefinition,
    target: &EntityDefinition,
    config: &GeneratorConfig,
) -> Result<JoinTableDecl, GenerationError> {
    let source_id = source.id.as_ref().ok_or_else(|| GenerationError::MissingId {
        entity: source.name.clone(),
    })?;

    let source_var = as_variable(&source.name);
    // a self-referencing join table names its second column after the association
    let target_var = if source.key() == target.key() {
        as_variable(&association.name)
    } else {
        as_variable(&target.name)
    };

    let table_name = join_table_name(source, association, target);

    let long = |variable: &str, table_object: String, id_name: &str| ColumnSpec {
        name: format!("{}Id", variable),
        value_type: Type::new("kotlin", "Long"),
        recipe: ColumnRecipe::new(ColumnKind::Long, format!("{}_id", variable))
            .references(table_object, as_variable(id_name)),
    };

    Ok(JoinTableDecl {
        object_name: config.table_object(&format!(
            "{}{}",
            source.name,
            as_object(&association.name)
        )),
        table_name,
        source: source.key(),
        target: target.key(),
        columns: [
            long(&source_var, config.table_object(&source.name), &source_id.name),
            long(
                &target_var,
                config.table_object(&target.name),
                &association.target_id.name,
            ),
        ],
    })
}

/// Explicit join table name, or both table names in sorted order so that
/// either side of the association derives the same default
fn join_table_name(
    source: &EntityDefinition,
    association: &AssociationDefinition,
    target: &EntityDefinition,
) -> String {
    if let Some(name) = &association.join_table {
        return name.clone();
    }
    let mut tables = [source.table.as_str(), target.table.as_str()];
    tables.sort_unstable();
    tables.join("_")
}
