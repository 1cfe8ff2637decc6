//! # Entity Graphs
//!
//! A graph is a closed set of entities produced from one processing unit.
//! [`EntityGraphs`] holds every graph of a generation run and indexes all
//! entities by key, so associations resolve their target by lookup instead
//! of owning it. Cycles between entities are harmless: traversal walks
//! entities, never association edges.

use super::entity::{EntityDefinition, EntityKey};
use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityGraph {
    pub name: String,
    pub entities: Vec<EntityDefinition>,
}

impl EntityGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: Vec::new(),
        }
    }

    pub fn with_entity(mut self, entity: EntityDefinition) -> Self {
        self.entities.push(entity);
        self
    }

    /// Visit every entity exactly once, in declaration order
    pub fn traverse<F>(&self, mut visit: F)
    where
        F: FnMut(&EntityDefinition),
    {
        for entity in &self.entities {
            visit(entity);
        }
    }
}

/// Location of an entity inside [`EntityGraphs`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    graph: usize,
    entity: usize,
}

/// Every graph visible during one generation run
#[derive(Debug, Clone, Default)]
pub struct EntityGraphs {
    graphs: Vec<EntityGraph>,
    index: HashMap<EntityKey, Slot>,
}

impl EntityGraphs {
    /// Index the graphs, rejecting duplicate entities and dangling targets
    pub fn new(graphs: Vec<EntityGraph>) -> Result<Self, ModelError> {
        let mut index = HashMap::new();
        for (graph_idx, graph) in graphs.iter().enumerate() {
            for (entity_idx, entity) in graph.entities.iter().enumerate() {
                let slot = Slot {
                    graph: graph_idx,
                    entity: entity_idx,
                };
                if index.insert(entity.key(), slot).is_some() {
                    return Err(ModelError::DuplicateEntity(entity.key()));
                }
            }
        }

        for entity in graphs.iter().flat_map(|graph| graph.entities.iter()) {
            for association in &entity.associations {
                if !index.contains_key(&association.target) {
                    return Err(ModelError::UnresolvedTarget {
                        entity: entity.key(),
                        association: association.name.clone(),
                        target: association.target.clone(),
                    });
                }
            }
        }

        tracing::debug!(
            "[MODEL] Indexed {} entities across {} graphs",
            index.len(),
            graphs.len()
        );

        Ok(Self { graphs, index })
    }

    /// Build from a JSON array of graphs
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let graphs: Vec<EntityGraph> = serde_json::from_str(json)?;
        Self::new(graphs)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(&self.graphs)?)
    }

    pub fn graphs(&self) -> &[EntityGraph] {
        &self.graphs
    }

    pub fn entity(&self, key: &EntityKey) -> Option<&EntityDefinition> {
        let slot = self.index.get(key)?;
        self.graphs
            .get(slot.graph)
            .and_then(|graph| graph.entities.get(slot.entity))
    }

    /// Every entity of every graph, graph order then declaration order
    pub fn entities(&self) -> impl Iterator<Item = (&EntityGraph, &EntityDefinition)> {
        self.graphs
            .iter()
            .flat_map(|graph| graph.entities.iter().map(move |entity| (graph, entity)))
    }

    /// Entities of all graphs that live in `namespace`
    pub fn entities_in_namespace<'a>(
        &'a self,
        namespace: &'a str,
    ) -> impl Iterator<Item = (&'a EntityGraph, &'a EntityDefinition)> + 'a {
        self.entities()
            .filter(move |(_, entity)| entity.namespace() == namespace)
    }

    /// Distinct namespaces across all graphs, in first-seen order
    pub fn namespaces(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.entities()
            .map(|(_, entity)| entity.namespace())
            .filter(|namespace| seen.insert(*namespace))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
