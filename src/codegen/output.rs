//! # Output Model
//!
//! Abstract declarations produced by the emitters. A column is described as
//! a recipe (constructor kind, ordered literal parameters, modifiers);
//! turning it into text is the renderer's job.

use crate::model::{EntityKey, Type};
use serde::Serialize;
use std::collections::BTreeSet;

/// Column constructor of the table DSL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Varchar { length: u32 },
    Long,
    Integer,
    Short,
    Bool,
    Float,
    Double,
    Decimal { precision: u32, scale: u32 },
    Uuid,
    DateTime,
    LocalDateTime,
    ZonedDateTime,
    /// Converter-backed column built by a synthesized wrapper function
    Converted { wrapper: String },
}

impl ColumnKind {
    pub fn constructor_name(&self) -> &str {
        match self {
            Self::Varchar { .. } => "varchar",
            Self::Long => "long",
            Self::Integer => "integer",
            Self::Short => "short",
            Self::Bool => "bool",
            Self::Float => "float",
            Self::Double => "double",
            Self::Decimal { .. } => "decimal",
            Self::Uuid => "uuid",
            Self::DateTime => "datetime",
            Self::LocalDateTime => "localDateTime",
            Self::ZonedDateTime => "zonedDateTime",
            Self::Converted { wrapper } => wrapper.as_str(),
        }
    }

    /// Literal parameters following the column name
    pub fn parameters(&self) -> Vec<u32> {
        match self {
            Self::Varchar { length } => vec![*length],
            Self::Decimal { precision, scale } => vec![*precision, *scale],
            _ => Vec::new(),
        }
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, Self::Long | Self::Integer | Self::Short)
    }
}

/// `<table_object>.<column>` target of a foreign key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRef {
    pub table_object: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRecipe {
    pub kind: ColumnKind,
    pub column_name: String,
    pub nullable: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub references: Option<ColumnRef>,
}

impl ColumnRecipe {
    pub fn new(kind: ColumnKind, column_name: impl Into<String>) -> Self {
        Self {
            kind,
            column_name: column_name.into(),
            nullable: false,
            primary_key: false,
            auto_increment: false,
            references: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn references(mut self, table_object: impl Into<String>, column: impl Into<String>) -> Self {
        self.references = Some(ColumnRef {
            table_object: table_object.into(),
            column: column.into(),
        });
        self
    }
}

/// A named column of a generated table, with the value type it holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    pub value_type: Type,
    pub recipe: ColumnRecipe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDecl {
    pub object_name: String,
    pub table_name: String,
    pub entity: EntityKey,
    pub primary_key: Option<ColumnSpec>,
    pub columns: Vec<ColumnSpec>,
}

impl TableDecl {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.primary_key
            .iter()
            .chain(self.columns.iter())
            .find(|column| column.name == name)
    }
}

/// Auxiliary table of a many-to-many association
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinTableDecl {
    pub object_name: String,
    pub table_name: String,
    pub source: EntityKey,
    pub target: EntityKey,
    pub columns: [ColumnSpec; 2],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Declaration {
    Table(TableDecl),
    JoinTable(JoinTableDecl),
}

/// Native column carrier of a converter-backed column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Carrier {
    String,
    Long,
}

impl Carrier {
    pub fn wrapper_fn(self) -> &'static str {
        match self {
            Self::String => "stringWrapper",
            Self::Long => "longWrapper",
        }
    }
}

/// Accessor bridging a converter to the DSL's read/write callbacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConverterWrapper {
    pub name: String,
    pub attribute_type: Type,
    pub converter: String,
    pub carrier: Carrier,
}

impl ConverterWrapper {
    /// Same body, ignoring the function name
    pub fn same_body(&self, other: &ConverterWrapper) -> bool {
        self.attribute_type == other.attribute_type
            && self.converter == other.converter
            && self.carrier == other.carrier
    }
}

/// Table object declared in another namespace that must be imported
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ExternalRef {
    pub namespace: String,
    pub table_object: String,
}

/// Identity of a join table: unordered entity pair plus table name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct JoinKey {
    low: EntityKey,
    high: EntityKey,
    table_name: String,
}

impl JoinKey {
    pub fn new(a: &EntityKey, b: &EntityKey, table_name: &str) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self {
            low: low.clone(),
            high: high.clone(),
            table_name: table_name.to_string(),
        }
    }
}

/// Declarations staged for one entity, committed only if it emits cleanly
#[derive(Debug, Clone, Default)]
pub struct EntityOutput {
    pub declarations: Vec<Declaration>,
    pub wrappers: Vec<ConverterWrapper>,
    pub external_refs: BTreeSet<ExternalRef>,
}

impl EntityOutput {
    pub fn wrapper(&self, name: &str) -> Option<&ConverterWrapper> {
        self.wrappers.iter().find(|wrapper| wrapper.name == name)
    }
}

/// Everything generated for one namespace. Append-only.
#[derive(Debug, Clone, Serialize)]
pub struct OutputUnit {
    pub namespace: String,
    declarations: Vec<Declaration>,
    wrappers: Vec<ConverterWrapper>,
    external_refs: BTreeSet<ExternalRef>,
}

impl OutputUnit {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            declarations: Vec::new(),
            wrappers: Vec::new(),
            external_refs: BTreeSet::new(),
        }
    }

    pub fn commit(&mut self, staged: EntityOutput) {
        self.declarations.extend(staged.declarations);
        self.wrappers.extend(staged.wrappers);
        self.external_refs.extend(staged.external_refs);
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableDecl> {
        self.declarations.iter().filter_map(|declaration| match declaration {
            Declaration::Table(table) => Some(table),
            Declaration::JoinTable(_) => None,
        })
    }

    pub fn join_tables(&self) -> impl Iterator<Item = &JoinTableDecl> {
        self.declarations.iter().filter_map(|declaration| match declaration {
            Declaration::JoinTable(table) => Some(table),
            Declaration::Table(_) => None,
        })
    }

    pub fn table(&self, object_name: &str) -> Option<&TableDecl> {
        self.tables().find(|table| table.object_name == object_name)
    }

    pub fn wrappers(&self) -> &[ConverterWrapper] {
        &self.wrappers
    }

    pub fn wrapper(&self, name: &str) -> Option<&ConverterWrapper> {
        self.wrappers.iter().find(|wrapper| wrapper.name == name)
    }

    pub fn external_refs(&self) -> &BTreeSet<ExternalRef> {
        &self.external_refs
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.wrappers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_parameters() {
        assert_eq!(ColumnKind::Varchar { length: 255 }.parameters(), [255]);
        assert_eq!(
            ColumnKind::Decimal {
                precision: 10,
                scale: 2
            }
            .parameters(),
            [10, 2]
        );
        assert!(ColumnKind::Uuid.parameters().is_empty());
        assert_eq!(
            ColumnKind::Converted {
                wrapper: "status".to_string()
            }
            .constructor_name(),
            "status"
        );
    }

    #[test]
    fn join_key_is_unordered() {
        let a = EntityKey::new("pl.A");
        let b = EntityKey::new("pl.B");
        assert_eq!(JoinKey::new(&a, &b, "a_b"), JoinKey::new(&b, &a, "a_b"));
        assert_ne!(JoinKey::new(&a, &b, "a_b"), JoinKey::new(&a, &b, "b_a"));
    }

    #[test]
    fn commit_appends_staged_output() {
        let mut unit = OutputUnit::new("pl.example");
        assert!(unit.is_empty());

        let mut staged = EntityOutput::default();
        staged.declarations.push(Declaration::Table(TableDecl {
            object_name: "CustomerTable".to_string(),
            table_name: "customers".to_string(),
            entity: EntityKey::new("pl.example.Customer"),
            primary_key: None,
            columns: Vec::new(),
        }));
        unit.commit(staged);

        assert!(unit.table("CustomerTable").is_some());
        assert_eq!(unit.join_tables().count(), 0);
        assert!(!unit.is_empty());
    }
}
