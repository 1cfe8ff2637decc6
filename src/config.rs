//! # Generator Configuration
//!
//! Column defaults and naming settings. Every field has a default, so a
//! configuration file only needs the keys it overrides.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Validate, Serialize, Deserialize)]
#[serde(default)]
#[validate(schema(function = "validate_decimal_defaults"))]
pub struct GeneratorConfig {
    /// varchar length when a string column has no length annotation
    #[validate(range(min = 1, message = "default varchar length must be greater than 0"))]
    pub default_varchar_length: u32,

    /// decimal precision when unannotated
    pub default_decimal_precision: u32,

    /// decimal scale when unannotated
    pub default_decimal_scale: u32,

    /// Suffix of generated table objects (`Customer` -> `CustomerTable`)
    #[validate(length(min = 1, message = "table suffix cannot be empty"))]
    pub table_suffix: String,

    /// Name of the generated source file, without extension
    #[validate(length(min = 1, message = "file name cannot be empty"))]
    pub file_name: String,

    /// Package of the table DSL (`Table`, `Column`, `datetime`)
    #[validate(length(min = 1, message = "DSL package cannot be empty"))]
    pub dsl_package: String,

    /// Package providing `stringWrapper`, `longWrapper`, `localDateTime`, `zonedDateTime`
    #[validate(length(min = 1, message = "runtime package cannot be empty"))]
    pub runtime_package: String,
}

/// A zero precision leaves the decimal unconstrained; otherwise scale fits in it
fn validate_decimal_defaults(config: &GeneratorConfig) -> Result<(), ValidationError> {
    if config.default_decimal_precision > 0
        && config.default_decimal_scale > config.default_decimal_precision
    {
        let mut error = ValidationError::new("decimal_scale");
        error.message = Some("default decimal scale exceeds default decimal precision".into());
        return Err(error);
    }
    Ok(())
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            default_varchar_length: 255,
            default_decimal_precision: 0,
            default_decimal_scale: 0,
            table_suffix: "Table".to_string(),
            file_name: "tables".to_string(),
            dsl_package: "org.jetbrains.exposed.sql".to_string(),
            runtime_package: "pl.touk.exposed".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::info!("[CONFIG] Loading generator configuration from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Name of the table object generated for an entity
    pub fn table_object(&self, entity_name: &str) -> String {
        format!("{}{}", entity_name, self.table_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GeneratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_varchar_length, 255);
        assert_eq!(config.table_object("Customer"), "CustomerTable");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            GeneratorConfig::from_json_str(r#"{ "default_varchar_length": 64 }"#).unwrap();
        assert_eq!(config.default_varchar_length, 64);
        assert_eq!(config.file_name, "tables");
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            GeneratorConfig::from_json_str(r#"{ "default_varchar_length": 0 }"#),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            GeneratorConfig::from_json_str(
                r#"{ "default_decimal_precision": 5, "default_decimal_scale": 6 }"#
            ),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            GeneratorConfig::from_json_str(r#"{ "table_suffix": "" }"#),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            GeneratorConfig::from_json_str("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn decimal_scale_is_checked_against_precision() {
        let mut config = GeneratorConfig {
            default_decimal_precision: 10,
            default_decimal_scale: 12,
            ..GeneratorConfig::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.field_errors()["__all__"][0].code, "decimal_scale");

        config.default_decimal_scale = 2;
        assert!(config.validate().is_ok());

        // unconstrained precision accepts any scale
        config.default_decimal_precision = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        assert!(matches!(
            GeneratorConfig::from_file("/nonexistent/etgen.json"),
            Err(ConfigError::Read(_))
        ));
    }
}
