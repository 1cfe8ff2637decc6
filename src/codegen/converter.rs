//! # Converter Synthesizer
//!
//! Builds the accessor functions that let a converter-backed value be used
//! as a column: reads go through the converter's `toAttribute`, writes
//! through `toColumn`, on top of a native String or Long carrier column.

use super::output::{Carrier, ConverterWrapper, EntityOutput, OutputUnit};
use crate::error::GenerationError;
use crate::model::{ConverterDefinition, IdDefinition, PropertyDefinition, SemanticType, Type};
use crate::naming::{as_object, as_variable};

/// An id or property stored through a converter
#[derive(Debug, Clone, Copy)]
pub struct ConvertedValue<'a> {
    pub name: &'a str,
    pub attribute_type: &'a Type,
    pub converter: &'a ConverterDefinition,
}

impl<'a> ConvertedValue<'a> {
    pub fn of_id(id: &'a IdDefinition) -> Option<Self> {
        id.converter.as_ref().map(|converter| Self {
            name: &id.name,
            attribute_type: &id.ty,
            converter,
        })
    }

    pub fn of_property(property: &'a PropertyDefinition) -> Option<Self> {
        property.converter.as_ref().map(|converter| Self {
            name: &property.name,
            attribute_type: &property.ty,
            converter,
        })
    }
}

/// Native column type a converter stores its values in
pub fn carrier_of(converter: &ConverterDefinition) -> Result<Carrier, GenerationError> {
    match converter.target_type.semantic() {
        Some(SemanticType::String) => Ok(Carrier::String),
        Some(SemanticType::Long) => Ok(Carrier::Long),
        _ => Err(GenerationError::TypeConverterNotSupported(
            converter.target_type.clone(),
        )),
    }
}

/// Build the wrapper for one converter-backed property or id.
///
/// The wrapper always yields the non-null attribute type; nullability is
/// applied on the column.
pub fn synthesize_wrapper(value: ConvertedValue<'_>) -> Result<ConverterWrapper, GenerationError> {
    Ok(ConverterWrapper {
        name: value.name.to_string(),
        attribute_type: value.attribute_type.clone(),
        converter: value.converter.name.clone(),
        carrier: carrier_of(value.converter)?,
    })
}

/// Give `wrapper` a name that is unique in the output unit and stage it.
///
/// An identical wrapper already emitted under the same name is reused. A
/// conflicting one gets qualified with the entity name, then numbered.
/// Returns the name the column must call.
pub fn register_wrapper(
    unit: &OutputUnit,
    staged: &mut EntityOutput,
    entity_name: &str,
    wrapper: ConverterWrapper,
) -> String {
    let qualified = format!("{}{}", as_variable(entity_name), as_object(&wrapper.name));
    let mut attempt = 0;

    loop {
        let name = match attempt {
            0 => wrapper.name.clone(),
            1 => qualified.clone(),
            n => format!("{}{}", qualified, n),
        };
        attempt += 1;

        let existing = unit.wrapper(&name).or_else(|| staged.wrapper(&name)).cloned();
        match existing {
            Some(existing) if existing.same_body(&wrapper) => {
                tracing::debug!("[EMIT] Reusing converter wrapper '{}'", name);
                return name;
            }
            Some(_) => continue,
            None => {
                if name != wrapper.name {
                    tracing::debug!(
                        "[EMIT] Converter wrapper '{}' renamed to '{}' to avoid a conflict",
                        wrapper.name,
                        name
                    );
                }
                staged.wrappers.push(ConverterWrapper {
                    name: name.clone(),
                    ..wrapper
                });
                return name;
            }
        }
    }
}
