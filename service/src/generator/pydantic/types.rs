//! Scalar type resolution
//!
//! Maps a schema type onto the Python primitive used in annotations.

use linkml_core::types::TypeDefinition;
use tracing::debug;

use crate::generator::traits::{GeneratorError, GeneratorResult};
use crate::schema_view::SchemaView;

/// Resolve a type to its Python representation
///
/// `repr` wins over `base`; XSD date and datetime bases map to the `datetime`
/// module types; otherwise the `typeof` chain is followed.
///
/// # Errors
///
/// Returns [`GeneratorError::SchemaIntegrity`] when no primitive can be found
/// along the chain, when a `typeof` names an unknown type, or when the chain
/// is cyclic.
pub fn resolve_type(type_def: &TypeDefinition, view: &SchemaView) -> GeneratorResult<String> {
    let mut visited: Vec<&str> = Vec::new();
    let mut current = type_def;

    loop {
        if visited.contains(&current.name.as_str()) {
            return Err(GeneratorError::integrity(format!(
                "type '{}' has a cyclic typeof chain through '{}'",
                type_def.name, current.name
            )));
        }
        visited.push(&current.name);

        if let Some(pyrange) = primitive(current) {
            debug!(type_name = %type_def.name, pyrange, "resolved type");
            return Ok(pyrange.to_string());
        }

        let Some(parent) = current.typeof_.as_deref() else {
            return Err(GeneratorError::integrity(format!(
                "could not get range for type '{}': no base, repr or typeof",
                type_def.name
            )));
        };
        current = view.get_type(parent).ok_or_else(|| {
            GeneratorError::integrity(format!(
                "type '{}' has typeof '{parent}', which is not defined",
                current.name
            ))
        })?;
    }
}

fn primitive(type_def: &TypeDefinition) -> Option<&str> {
    match type_def.base.as_deref() {
        Some("XSDDateTime") => return Some("datetime"),
        Some("XSDDate") => return Some("date"),
        _ => {}
    }
    type_def.repr.as_deref().or(type_def.base.as_deref())
}
