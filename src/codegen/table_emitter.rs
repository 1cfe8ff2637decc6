//! # Table Emitter
//!
//! Builds the table declaration of one entity, its join tables and its
//! converter wrappers. Everything is staged first and committed to the
//! output unit only when the whole entity resolved; otherwise every error
//! found in the entity is returned and the unit is left untouched.

use super::association::{resolve_association, AssociationPlan, JoinTableOwners};
use super::converter::{register_wrapper, synthesize_wrapper, ConvertedValue};
use super::output::{ColumnSpec, Declaration, EntityOutput, ExternalRef, OutputUnit, TableDecl};
use super::type_resolver::{resolve_id_column, resolve_property_column};
use crate::config::GeneratorConfig;
use crate::error::{EntityError, GenerationError};
use crate::model::{EntityDefinition, EntityGraph, EntityGraphs, EntityKey};

/// Emitter for one generation run over `graphs`
pub struct TableEmitter<'a> {
    graphs: &'a EntityGraphs,
    config: &'a GeneratorConfig,
    join_owners: JoinTableOwners,
}

impl<'a> TableEmitter<'a> {
    pub fn new(graphs: &'a EntityGraphs, config: &'a GeneratorConfig) -> Self {
        Self {
            graphs,
            config,
            join_owners: JoinTableOwners::collect(graphs),
        }
    }

    /// Emit every entity of `graph` that belongs to the unit's namespace
    pub fn emit_graph(&self, graph: &EntityGraph, unit: &mut OutputUnit) -> Vec<EntityError> {
        let mut errors = Vec::new();
        graph.traverse(|entity| {
            if entity.namespace() != unit.namespace {
                return;
            }
            if let Err(error) = self.emit_entity(entity, graph, unit) {
                errors.push(error);
            }
        });
        errors
    }

    /// Emit the unit's namespace from every graph, graph order then declaration order
    pub fn emit_namespace(&self, unit: &mut OutputUnit) -> Vec<EntityError> {
        let namespace = unit.namespace.clone();
        self.graphs
            .entities_in_namespace(&namespace)
            .filter_map(|(graph, entity)| self.emit_entity(entity, graph, unit).err())
            .collect()
    }

    /// Emit one entity into `unit`
    pub fn emit_entity(
        &self,
        entity: &EntityDefinition,
        graph: &EntityGraph,
        unit: &mut OutputUnit,
    ) -> Result<(), EntityError> {
        tracing::debug!(
            "[EMIT] {} (graph '{}', table '{}')",
            entity.name,
            graph.name,
            entity.table
        );

        let mut staged = EntityOutput::default();
        let mut errors = Vec::new();

        let mut table = TableDecl {
            object_name: self.config.table_object(&entity.name),
            table_name: entity.table.clone(),
            entity: entity.key(),
            primary_key: None,
            columns: Vec::new(),
        };

        if let Some(id) = &entity.id {
            let column = self
                .wrapper_for(unit, &mut staged, entity, ConvertedValue::of_id(id))
                .and_then(|wrapper| resolve_id_column(id, wrapper.as_deref(), self.config));
            match column {
                Ok(recipe) => {
                    table.primary_key = Some(ColumnSpec {
                        name: id.name.clone(),
                        value_type: id.ty.clone(),
                        recipe,
                    })
                }
                Err(error) => errors.push(error),
            }
        }

        for property in &entity.properties {
            let column = self
                .wrapper_for(unit, &mut staged, entity, ConvertedValue::of_property(property))
                .and_then(|wrapper| resolve_property_column(property, wrapper.as_deref(), self.config));
            match column {
                Ok(recipe) => table.columns.push(ColumnSpec {
                    name: property.name.clone(),
                    value_type: property.ty.clone(),
                    recipe,
                }),
                Err(error) => errors.push(error),
            }
        }

        let mut join_tables = Vec::new();
        for association in &entity.associations {
            match resolve_association(entity, association, self.graphs, self.config) {
                Ok(AssociationPlan::ForeignKey(column)) => {
                    self.reference(unit, &mut staged, &association.target);
                    table.columns.push(column);
                }
                Ok(AssociationPlan::JoinTable(join_table)) => {
                    if !self.join_owners.owns(entity, association, &join_table) {
                        tracing::debug!(
                            "[EMIT] Join table '{}' is declared by the other side, skipping {}.{}",
                            join_table.table_name,
                            entity.name,
                            association.name
                        );
                        continue;
                    }
                    self.reference(unit, &mut staged, &association.target);
                    join_tables.push(join_table);
                }
                Ok(AssociationPlan::Skip) => {
                    tracing::trace!(
                        "[EMIT] {}.{} ({}) owns no column",
                        entity.name,
                        association.name,
                        association.association_type
                    );
                }
                Err(error) => errors.push(error),
            }
        }

        if !errors.is_empty() {
            tracing::warn!(
                "[EMIT] {} failed with {} error(s), nothing emitted for it",
                entity.name,
                errors.len()
            );
            return Err(EntityError {
                entity: entity.name.clone(),
                errors,
            });
        }

        tracing::debug!(
            "[EMIT] {} -> {} ({} columns, {} join tables, {} wrappers)",
            entity.name,
            table.object_name,
            table.columns.len() + usize::from(table.primary_key.is_some()),
            join_tables.len(),
            staged.wrappers.len()
        );

        staged.declarations.push(Declaration::Table(table));
        staged
            .declarations
            .extend(join_tables.into_iter().map(Declaration::JoinTable));
        unit.commit(staged);

        Ok(())
    }

    /// Synthesize and register the converter wrapper of a value, if it has one
    fn wrapper_for(
        &self,
        unit: &OutputUnit,
        staged: &mut EntityOutput,
        entity: &EntityDefinition,
        value: Option<ConvertedValue<'_>>,
    ) -> Result<Option<String>, GenerationError> {
        let Some(value) = value else {
            return Ok(None);
        };
        let wrapper = synthesize_wrapper(value)?;
        Ok(Some(register_wrapper(unit, staged, &entity.name, wrapper)))
    }

    /// Record an import when the referenced table lives in another namespace
    fn reference(&self, unit: &OutputUnit, staged: &mut EntityOutput, target: &EntityKey) {
        let Some(target) = self.graphs.entity(target) else {
            return;
        };
        if target.namespace() != unit.namespace {
            staged.external_refs.insert(ExternalRef {
                namespace: target.namespace().to_string(),
                table_object: self.config.table_object(&target.name),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::output::ColumnKind;
    use crate::model::{AssociationDefinition, ConverterDefinition, IdDefinition, PropertyDefinition, Type};

    fn long_id() -> IdDefinition {
        IdDefinition::new("id", Type::new("kotlin", "Long")).generated()
    }

    fn single(entities: Vec<EntityDefinition>) -> EntityGraphs {
        let graph = entities
            .into_iter()
            .fold(EntityGraph::new("test"), EntityGraph::with_entity);
        EntityGraphs::new(vec![graph]).unwrap()
    }

    fn emit_all(graphs: &EntityGraphs, namespace: &str) -> (OutputUnit, Vec<EntityError>) {
        let config = GeneratorConfig::default();
        let mut unit = OutputUnit::new(namespace);
        let errors = TableEmitter::new(graphs, &config).emit_namespace(&mut unit);
        (unit, errors)
    }

    #[test]
    fn customer_scenario() {
        let customer = EntityDefinition::new("pl.example.Customer", "customers").with_id(long_id());
        let graphs = single(vec![customer]);
        let (unit, errors) = emit_all(&graphs, "pl.example");

        assert!(errors.is_empty());
        let table = unit.table("CustomerTable").unwrap();
        assert_eq!(table.table_name, "customers");
        assert!(table.columns.is_empty());
        let id = table.primary_key.as_ref().unwrap();
        assert_eq!(id.recipe.kind, ColumnKind::Long);
        assert!(id.recipe.primary_key && id.recipe.auto_increment);
    }

    #[test]
    fn columns_follow_declaration_order() {
        let target = EntityDefinition::new("pl.example.Target", "target").with_id(long_id());
        let entity = EntityDefinition::new("pl.example.Source", "source")
            .with_id(long_id())
            .with_association(AssociationDefinition::many_to_one("first", &target, long_id()))
            .with_property(PropertyDefinition::new("b", Type::new("kotlin", "Int")))
            .with_property(PropertyDefinition::new("a", Type::new("kotlin", "Boolean")))
            .with_association(AssociationDefinition::one_to_one("second", &target, long_id()));
        let graphs = single(vec![target, entity]);
        let (unit, _) = emit_all(&graphs, "pl.example");

        let names: Vec<_> = unit
            .table("SourceTable")
            .unwrap()
            .columns
            .iter()
            .map(|column| column.name.as_str())
            .collect();
        assert_eq!(names, ["b", "a", "first", "second"]);
    }

    #[test]
    fn failing_entity_is_isolated() {
        let good = EntityDefinition::new("pl.example.Good", "good").with_id(long_id());
        let bad = EntityDefinition::new("pl.example.Bad", "bad")
            .with_id(IdDefinition::new("id", Type::new("kotlin", "Double")))
            .with_property(PropertyDefinition::new("money", Type::new("pl.example", "Money")))
            .with_property(
                PropertyDefinition::new("status", Type::new("pl.example", "Status")).with_converter(
                    ConverterDefinition::new("pl.example.StatusConverter", Type::new("kotlin", "Int")),
                ),
            );
        let graphs = single(vec![bad, good]);
        let (unit, errors) = emit_all(&graphs, "pl.example");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].entity, "Bad");
        assert_eq!(
            errors[0].errors,
            vec![
                GenerationError::IdTypeNotSupported(Type::new("kotlin", "Double")),
                GenerationError::PropertyTypeNotSupported(Type::new("pl.example", "Money")),
                GenerationError::TypeConverterNotSupported(Type::new("kotlin", "Int")),
            ]
        );
        assert!(unit.table("BadTable").is_none());
        assert!(unit.table("GoodTable").is_some());
        assert!(unit.wrappers().is_empty());
    }

    #[test]
    fn reverse_many_to_many_is_emitted_once() {
        let student = EntityDefinition::new("pl.example.Student", "students").with_id(long_id());
        let course = EntityDefinition::new("pl.example.Course", "courses").with_id(long_id());
        let student_with = student
            .clone()
            .with_association(AssociationDefinition::many_to_many("courses", &course, long_id(), "enrollments"));
        let course_with = course
            .with_association(AssociationDefinition::many_to_many("students", &student, long_id(), "enrollments"));
        let graphs = single(vec![student_with, course_with]);
        let (unit, errors) = emit_all(&graphs, "pl.example");

        assert!(errors.is_empty());
        let join_tables: Vec<_> = unit.join_tables().collect();
        assert_eq!(join_tables.len(), 1);
        assert_eq!(join_tables[0].object_name, "StudentCoursesTable");
    }

    #[test]
    fn foreign_namespace_targets_are_recorded() {
        let country = EntityDefinition::new("pl.geo.Country", "countries").with_id(long_id());
        let address = EntityDefinition::new("pl.crm.Address", "addresses")
            .with_id(long_id())
            .with_association(AssociationDefinition::many_to_one("country", &country, long_id()));
        let graphs = EntityGraphs::new(vec![
            EntityGraph::new("geo").with_entity(country),
            EntityGraph::new("crm").with_entity(address),
        ])
        .unwrap();
        let (unit, errors) = emit_all(&graphs, "pl.crm");

        assert!(errors.is_empty());
        assert_eq!(unit.tables().count(), 1);
        let refs: Vec<_> = unit.external_refs().iter().collect();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].namespace, "pl.geo");
        assert_eq!(refs[0].table_object, "CountryTable");
    }
}
