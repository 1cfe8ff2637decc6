//! # Table Generator
//!
//! Main entry points for generating table declarations from entity graphs.

use crate::codegen::{render_file, GeneratedFile, OutputUnit, TableEmitter};
use crate::config::GeneratorConfig;
use crate::error::GenerationErrors;
use crate::model::{EntityGraph, EntityGraphs};

/// Generate the output unit of one graph for `namespace`
///
/// Only entities of `graph` that live in `namespace` are emitted; references
/// to entities elsewhere (in `graphs`) are recorded as external references.
/// A join table declared from both sides is emitted only by the side that
/// comes first in `graphs`.
///
/// # Returns
///
/// * `Ok(OutputUnit)` - The declarations of every entity
/// * `Err(GenerationErrors)` - Every entity that failed, with all of its errors
pub fn generate_tables(
    graph: &EntityGraph,
    graphs: &EntityGraphs,
    namespace: &str,
    config: &GeneratorConfig,
) -> Result<OutputUnit, GenerationErrors> {
    tracing::info!(
        "[ETGEN] Generating tables for graph '{}' in '{}' ({} entities)",
        graph.name,
        namespace,
        graph.entities.len()
    );

    let mut unit = OutputUnit::new(namespace);
    let errors = GenerationErrors(TableEmitter::new(graphs, config).emit_graph(graph, &mut unit));
    errors.into_result(unit)
}

/// Generate the output unit of a namespace across all graphs sharing it
pub fn generate_namespace(
    graphs: &EntityGraphs,
    namespace: &str,
    config: &GeneratorConfig,
) -> Result<OutputUnit, GenerationErrors> {
    emit_namespace(&TableEmitter::new(graphs, config), namespace)
}

fn emit_namespace(emitter: &TableEmitter, namespace: &str) -> Result<OutputUnit, GenerationErrors> {
    let mut unit = OutputUnit::new(namespace);
    let errors = GenerationErrors(emitter.emit_namespace(&mut unit));

    tracing::debug!(
        "[ETGEN] Namespace '{}': {} declarations, {} wrappers, {} failed entities",
        namespace,
        unit.declarations().len(),
        unit.wrappers().len(),
        errors.len()
    );

    errors.into_result(unit)
}

/// Generate one output unit per namespace, in first-seen namespace order
///
/// All namespaces are attempted; the error report covers the whole run.
pub fn generate_all(
    graphs: &EntityGraphs,
    config: &GeneratorConfig,
) -> Result<Vec<OutputUnit>, GenerationErrors> {
    tracing::info!("[ETGEN] Starting table generation");
    tracing::info!(
        "[ETGEN] {} graphs, {} entities",
        graphs.graphs().len(),
        graphs.len()
    );

    let emitter = TableEmitter::new(graphs, config);
    let mut units = Vec::new();
    let mut errors = GenerationErrors::default();

    for namespace in graphs.namespaces() {
        match emit_namespace(&emitter, namespace) {
            Ok(unit) => units.push(unit),
            Err(failed) => errors.extend(failed),
        }
    }

    if errors.is_empty() {
        tracing::info!("[ETGEN] Generated {} output units", units.len());
    } else {
        tracing::warn!(
            "[ETGEN] Generation failed for {} entities",
            errors.len()
        );
    }

    errors.into_result(units)
}

/// Generate and render every namespace to source files
///
/// # Arguments
///
/// * `graphs` - All entity graphs of the run
/// * `config` - Generator configuration
///
/// # Returns
///
/// * `Ok(Vec<GeneratedFile>)` - One rendered file per namespace
/// * `Err(GenerationErrors)` - Every entity that failed, with all of its errors
pub fn compile_to_source(
    graphs: &EntityGraphs,
    config: &GeneratorConfig,
) -> Result<Vec<GeneratedFile>, GenerationErrors> {
    tracing::info!("[ETGEN] Phase 1: Emitting declarations...");
    let units = generate_all(graphs, config)?;

    tracing::info!("[ETGEN] Phase 2: Rendering sources...");
    let files: Vec<_> = units.iter().map(|unit| render_file(unit, config)).collect();

    tracing::info!(
        "[ETGEN] Rendering complete ({} files, {} bytes)",
        files.len(),
        files.iter().map(|file| file.source.len()).sum::<usize>()
    );

    Ok(files)
}
