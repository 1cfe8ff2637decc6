//! # Value Types
//!
//! Declared types of ids, properties and converter targets, and the closed
//! set of semantic types the column DSL supports natively.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A declared value type, identified by namespace and simple name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Type {
    pub namespace: String,
    pub simple_name: String,
}

impl Type {
    pub fn new(namespace: impl Into<String>, simple_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            simple_name: simple_name.into(),
        }
    }

    /// Fully qualified name, e.g. `java.time.LocalDateTime`
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.simple_name.clone()
        } else {
            format!("{}.{}", self.namespace, self.simple_name)
        }
    }

    /// Map this type onto the column DSL's native types, if it is one
    pub fn semantic(&self) -> Option<SemanticType> {
        SemanticType::from_type(self)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

/// Value types with a native column constructor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticType {
    String,
    Long,
    Int,
    Short,
    Boolean,
    Float,
    Double,
    BigDecimal,
    Uuid,
    /// Legacy joda-style date time
    DateTime,
    LocalDateTime,
    ZonedDateTime,
}

impl SemanticType {
    /// Recognize both the Kotlin and the boxed Java spelling of a type
    pub fn from_type(ty: &Type) -> Option<Self> {
        let semantic = match (ty.namespace.as_str(), ty.simple_name.as_str()) {
            ("kotlin", "String") | ("java.lang", "String") => Self::String,
            ("kotlin", "Long") | ("java.lang", "Long") => Self::Long,
            ("kotlin", "Int") | ("java.lang", "Integer") => Self::Int,
            ("kotlin", "Short") | ("java.lang", "Short") => Self::Short,
            ("kotlin", "Boolean") | ("java.lang", "Boolean") => Self::Boolean,
            ("kotlin", "Float") | ("java.lang", "Float") => Self::Float,
            ("kotlin", "Double") | ("java.lang", "Double") => Self::Double,
            ("java.math", "BigDecimal") => Self::BigDecimal,
            ("java.util", "UUID") => Self::Uuid,
            ("org.joda.time", "DateTime") => Self::DateTime,
            ("java.time", "LocalDateTime") => Self::LocalDateTime,
            ("java.time", "ZonedDateTime") => Self::ZonedDateTime,
            _ => return None,
        };
        Some(semantic)
    }

    /// Canonical declared type for this semantic type
    pub fn as_type(self) -> Type {
        match self {
            Self::String => Type::new("kotlin", "String"),
            Self::Long => Type::new("kotlin", "Long"),
            Self::Int => Type::new("kotlin", "Int"),
            Self::Short => Type::new("kotlin", "Short"),
            Self::Boolean => Type::new("kotlin", "Boolean"),
            Self::Float => Type::new("kotlin", "Float"),
            Self::Double => Type::new("kotlin", "Double"),
            Self::BigDecimal => Type::new("java.math", "BigDecimal"),
            Self::Uuid => Type::new("java.util", "UUID"),
            Self::DateTime => Type::new("org.joda.time", "DateTime"),
            Self::LocalDateTime => Type::new("java.time", "LocalDateTime"),
            Self::ZonedDateTime => Type::new("java.time", "ZonedDateTime"),
        }
    }

    /// Types allowed as a primary key or as a foreign key mirroring one
    pub fn is_id_capable(self) -> bool {
        matches!(
            self,
            Self::String | Self::Long | Self::Int | Self::Short | Self::Uuid
        )
    }

    /// Types whose columns can be auto-incremented
    pub fn is_integral(self) -> bool {
        matches!(self, Self::Long | Self::Int | Self::Short)
    }
}
