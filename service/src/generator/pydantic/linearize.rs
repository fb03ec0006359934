//! Class ordering
//!
//! Python requires a base class to be defined before any class that
//! derives from it, so classes are emitted in a parents-first order.

use indexmap::IndexMap;
use linkml_core::types::ClassDefinition;
use linkml_core::utils::camelcase;

use crate::generator::traits::{GeneratorError, GeneratorResult};

/// Name of the shared base model of classes without parents
pub const BASE_MODEL_NAME: &str = "ConfiguredBaseModel";

/// Order classes so every class follows its `is_a` parent and mixins
///
/// Each pass places the first remaining class whose parents are all placed,
/// so the result is stable with respect to schema order.
///
/// # Errors
///
/// Returns [`GeneratorError::SchemaIntegrity`] naming the remaining classes
/// when no progress can be made (a cycle or an undefined parent).
pub fn sort_classes(classes: &[ClassDefinition]) -> GeneratorResult<Vec<ClassDefinition>> {
    let mut remaining: Vec<&ClassDefinition> = classes.iter().collect();
    let mut placed: Vec<&str> = Vec::with_capacity(classes.len());
    let mut sorted = Vec::with_capacity(classes.len());

    while !remaining.is_empty() {
        let next = remaining
            .iter()
            .position(|c| c.parents().iter().all(|p| placed.contains(p)));
        let Some(index) = next else {
            let names: Vec<&str> = remaining.iter().map(|c| c.name.as_str()).collect();
            return Err(GeneratorError::integrity(format!(
                "could not find suitable element in {names:?} that does not ref {placed:?}"
            )));
        };
        let class = remaining.remove(index);
        placed.push(&class.name);
        sorted.push(class.clone());
    }

    Ok(sorted)
}

/// Base classes of every class, keyed by generated class name
///
/// Parents are ordered by their position in `sorted_names` (unknown names
/// last) and then reversed, so the most derived parent comes first and the
/// MRO stays consistent. Mixins count as parents only when
/// `gen_mixin_inheritance` is set.
#[must_use]
pub fn class_bases(
    classes: &[ClassDefinition],
    sorted_names: &[String],
    gen_mixin_inheritance: bool,
) -> IndexMap<String, Vec<String>> {
    let position = |name: &str| {
        sorted_names
            .iter()
            .position(|n| n == name)
            .unwrap_or(sorted_names.len())
    };

    classes
        .iter()
        .map(|class| {
            let mut parents: Vec<String> = class.is_a.iter().map(|p| camelcase(p)).collect();
            if gen_mixin_inheritance {
                parents.extend(class.mixins.iter().map(|m| camelcase(m)));
            }

            let bases = if parents.is_empty() {
                vec![BASE_MODEL_NAME.to_string()]
            } else {
                parents.sort_by_key(|p| position(p));
                parents.reverse();
                parents
            };
            (camelcase(&class.name), bases)
        })
        .collect()
}
