//! # Source Renderer
//!
//! Renders an [`OutputUnit`] as an Exposed `Table` DSL source file.

use super::output::{
    ColumnKind, ColumnRecipe, ColumnSpec, ConverterWrapper, Declaration, JoinTableDecl,
    OutputUnit, TableDecl,
};
use crate::config::GeneratorConfig;
use crate::model::Type;
use serde::Serialize;
use std::collections::BTreeSet;

/// A rendered source file for one namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub namespace: String,
    pub file_name: String,
    pub source: String,
}

impl GeneratedFile {
    /// Path relative to a source root, e.g. `pl/example/tables.kt`
    pub fn relative_path(&self) -> String {
        if self.namespace.is_empty() {
            format!("{}.kt", self.file_name)
        } else {
            format!("{}/{}.kt", self.namespace.replace('.', "/"), self.file_name)
        }
    }
}

pub fn render_file(unit: &OutputUnit, config: &GeneratorConfig) -> GeneratedFile {
    GeneratedFile {
        namespace: unit.namespace.clone(),
        file_name: config.file_name.clone(),
        source: render_unit(unit, config),
    }
}

/// Render the whole unit: header, imports, table objects, wrapper functions
pub fn render_unit(unit: &OutputUnit, config: &GeneratorConfig) -> String {
    let mut code = String::new();

    code.push_str("// Auto-generated by etgen (Entity Table Generator)\n");
    code.push_str("// DO NOT EDIT - Changes will be overwritten\n\n");

    if !unit.namespace.is_empty() {
        code.push_str(&format!("package {}\n\n", unit.namespace));
    }

    for import in collect_imports(unit, config) {
        code.push_str(&format!("import {}\n", import));
    }
    code.push('\n');

    for declaration in unit.declarations() {
        match declaration {
            Declaration::Table(table) => code.push_str(&render_table(table, &unit.namespace)),
            Declaration::JoinTable(table) => code.push_str(&render_join_table(table, &unit.namespace)),
        }
        code.push('\n');
    }

    for wrapper in unit.wrappers() {
        code.push_str(&render_wrapper(wrapper, &unit.namespace));
        code.push('\n');
    }

    code
}

/// Sorted imports of everything the unit actually uses
fn collect_imports(unit: &OutputUnit, config: &GeneratorConfig) -> BTreeSet<String> {
    let mut imports = BTreeSet::new();
    let dsl = |name: &str| format!("{}.{}", config.dsl_package, name);
    let runtime = |name: &str| format!("{}.{}", config.runtime_package, name);

    if !unit.declarations().is_empty() || !unit.wrappers().is_empty() {
        imports.insert(dsl("Column"));
        imports.insert(dsl("Table"));
    }

    let columns = unit.declarations().iter().flat_map(|declaration| match declaration {
        Declaration::Table(table) => table
            .primary_key
            .iter()
            .chain(table.columns.iter())
            .collect::<Vec<_>>(),
        Declaration::JoinTable(table) => table.columns.iter().collect(),
    });
    for column in columns {
        match column.recipe.kind {
            ColumnKind::DateTime => {
                imports.insert(dsl("datetime"));
            }
            ColumnKind::LocalDateTime => {
                imports.insert(runtime("localDateTime"));
            }
            ColumnKind::ZonedDateTime => {
                imports.insert(runtime("zonedDateTime"));
            }
            _ => {}
        }
    }

    for wrapper in unit.wrappers() {
        imports.insert(runtime(wrapper.carrier.wrapper_fn()));
    }

    for reference in unit.external_refs() {
        imports.insert(format!("{}.{}", reference.namespace, reference.table_object));
    }

    imports
}

fn render_table(table: &TableDecl, namespace: &str) -> String {
    let mut code = String::new();
    code.push_str(&format!(
        "object {} : Table({}) {{\n",
        table.object_name,
        kotlin_string(&table.table_name)
    ));
    for column in table.primary_key.iter().chain(table.columns.iter()) {
        code.push_str(&render_column(column, namespace));
    }
    code.push_str("}\n");
    code
}

fn render_join_table(table: &JoinTableDecl, namespace: &str) -> String {
    let mut code = String::new();
    code.push_str(&format!(
        "object {} : Table({}) {{\n",
        table.object_name,
        kotlin_string(&table.table_name)
    ));
    for column in &table.columns {
        code.push_str(&render_column(column, namespace));
    }
    code.push_str("}\n");
    code
}

fn render_column(column: &ColumnSpec, namespace: &str) -> String {
    format!(
        "    val {}: Column<{}> = {}\n",
        column.name,
        kotlin_type(&column.value_type, column.recipe.nullable, namespace),
        render_recipe(&column.recipe)
    )
}

/// Column initializer, e.g. `varchar("prop1", 255).nullable()`
pub fn render_recipe(recipe: &ColumnRecipe) -> String {
    let mut args = vec![kotlin_string(&recipe.column_name)];
    args.extend(recipe.kind.parameters().iter().map(ToString::to_string));

    let mut code = format!("{}({})", recipe.kind.constructor_name(), args.join(", "));
    if recipe.primary_key {
        code.push_str(".primaryKey()");
    }
    if recipe.auto_increment {
        code.push_str(".autoIncrement()");
    }
    if let Some(reference) = &recipe.references {
        code.push_str(&format!(
            ".references({}.{})",
            reference.table_object, reference.column
        ));
    }
    if recipe.nullable {
        code.push_str(".nullable()");
    }
    code
}

fn render_wrapper(wrapper: &ConverterWrapper, namespace: &str) -> String {
    let ty = kotlin_type(&wrapper.attribute_type, false, namespace);
    format!(
        "fun Table.{name}(columnName: String): Column<{ty}> = {carrier}<{ty}>(columnName, {{ {converter}().convertToEntityAttribute(it) }}, {{ {converter}().convertToDatabaseColumn(it) }})\n",
        name = wrapper.name,
        ty = ty,
        carrier = wrapper.carrier.wrapper_fn(),
        converter = wrapper.converter,
    )
}

/// Kotlin spelling of a type as seen from `namespace`
fn kotlin_type(ty: &Type, nullable: bool, namespace: &str) -> String {
    let name = if ty.namespace == "kotlin" || ty.namespace == namespace {
        ty.simple_name.clone()
    } else if let Some(semantic) = ty.semantic() {
        // boxed java spellings render as their kotlin counterpart
        let canonical = semantic.as_type();
        if canonical.namespace == "kotlin" {
            canonical.simple_name
        } else {
            canonical.qualified_name()
        }
    } else {
        ty.qualified_name()
    };

    if nullable {
        format!("{}?", name)
    } else {
        name
    }
}

fn kotlin_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');
    for ch in value.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '$' => escaped.push_str("\\$"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(ch),
        }
    }
    escaped.push('"');
    escaped
}
