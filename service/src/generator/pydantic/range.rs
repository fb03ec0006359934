//! Range classification
//!
//! Decides the scalar Python type of a slot: a class reference (by name,
//! polymorphic union or identifier type), an enum, a resolved type, or a
//! `Literal` for type designators.

use linkml_core::types::SlotDefinition;
use linkml_core::utils::camelcase;
use tracing::trace;

use super::designators::accepted_type_designator_values;
use super::types::resolve_type;
use crate::generator::base::BaseCodeFormatter;
use crate::generator::traits::{GeneratorError, GeneratorResult};
use crate::schema_view::SchemaView;

/// `class_uri` marking a class that stands for any value
pub const LINKML_ANY: &str = "linkml:Any";

/// Join alternatives into `Union[...]`, or return the single alternative
#[must_use]
pub fn union_of(alternatives: &[String]) -> String {
    match alternatives {
        [single] => single.clone(),
        many => format!("Union[{}]", many.join(", ")),
    }
}

/// Classifies slot ranges into Python type expressions
#[derive(Debug, Clone, Copy)]
pub struct RangeClassifier<'a> {
    view: &'a SchemaView,
    gen_mixin_inheritance: bool,
}

impl<'a> RangeClassifier<'a> {
    /// Create a classifier over `view`
    #[must_use]
    pub fn new(view: &'a SchemaView, gen_mixin_inheritance: bool) -> Self {
        Self {
            view,
            gen_mixin_inheritance,
        }
    }

    /// The declared ranges of a slot: one per `any_of` alternative (falling
    /// back to the slot's own range), else the slot range
    #[must_use]
    pub fn slot_ranges(slot: &SlotDefinition) -> Vec<Option<String>> {
        if slot.any_of.is_empty() {
            vec![slot.range.clone()]
        } else {
            slot.any_of
                .iter()
                .map(|alt| alt.range.clone().or_else(|| slot.range.clone()))
                .collect()
        }
    }

    /// Scalar type of a whole slot
    ///
    /// Every declared range is classified; the results are deduplicated and
    /// sorted, and several alternatives become a `Union`.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::SchemaIntegrity`] for unknown ranges.
    pub fn classify_slot(&self, slot: &SlotDefinition, class_name: &str) -> GeneratorResult<String> {
        let mut pyranges = Self::slot_ranges(slot)
            .iter()
            .map(|range| self.classify(range.as_deref(), slot, class_name))
            .collect::<GeneratorResult<Vec<_>>>()?;
        pyranges.sort();
        pyranges.dedup();

        if pyranges.is_empty() {
            return Err(GeneratorError::integrity(format!(
                "could not generate python range for {class_name}.{}",
                slot.name
            )));
        }
        Ok(union_of(&pyranges))
    }

    /// Python type for a single range of `slot` as used on `class_name`
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::SchemaIntegrity`] when the range is not a
    /// class, enum or type.
    pub fn classify(
        &self,
        range: Option<&str>,
        slot: &SlotDefinition,
        class_name: &str,
    ) -> GeneratorResult<String> {
        if slot.is_type_designator() {
            let values = accepted_type_designator_values(self.view, slot, class_name)?;
            let quoted: Vec<String> = values
                .iter()
                .map(|v| BaseCodeFormatter::python_string(v))
                .collect();
            return Ok(format!("Literal[{}]", quoted.join(", ")));
        }

        let Some(range) = range else {
            return Ok("str".to_string());
        };

        let pyrange = if self.view.get_class(range).is_some() {
            self.class_slot_range(
                range,
                slot.inlined.unwrap_or(false),
                slot.inlined_as_list.unwrap_or(false),
            )?
        } else if self.view.get_enum(range).is_some() {
            camelcase(range)
        } else if let Some(type_def) = self.view.get_type(range) {
            resolve_type(type_def, self.view)?
        } else {
            return Err(GeneratorError::integrity(format!(
                "unknown range '{range}' for slot '{}' on class '{class_name}'",
                slot.name
            )));
        };

        trace!(slot = %slot.name, class = class_name, range, %pyrange, "classified range");
        Ok(pyrange)
    }

    /// Python type of a reference to the class `range_class`
    ///
    /// Inlined references, and references to classes that can only be
    /// inlined (no identifier or key, not a mixin), use the class itself or
    /// the union of its descendants when it has a type designator. Other
    /// references use the identifier type.
    ///
    /// # Errors
    ///
    /// Returns an error if the class hierarchy or identifier slots cannot be
    /// resolved.
    pub fn class_slot_range(
        &self,
        range_class: &str,
        inlined: bool,
        inlined_as_list: bool,
    ) -> GeneratorResult<String> {
        let class = self
            .view
            .get_class(range_class)
            .ok_or_else(|| GeneratorError::integrity(format!("unknown class '{range_class}'")))?;

        if class.class_uri.as_deref() == Some(LINKML_ANY) {
            return Ok("Any".to_string());
        }

        let identifier = self.view.get_identifier_slot(range_class, true)?;
        let is_mixin = self.view.is_mixin(range_class);

        if inlined || inlined_as_list || (identifier.is_none() && !is_mixin) {
            let has_designator = self
                .view
                .class_induced_slots(range_class)?
                .iter()
                .any(SlotDefinition::is_type_designator);
            let descendants = self.view.class_descendants(range_class, true, true)?;
            if has_designator && descendants.len() > 1 {
                let names: Vec<String> = descendants.iter().map(|d| camelcase(d)).collect();
                return Ok(union_of(&names));
            }
            return Ok(camelcase(range_class));
        }

        let mut identifier_range = "str".to_string();
        if self.gen_mixin_inheritance && is_mixin {
            if let Some(mixin_range) = self.mixin_identifier_range(range_class)? {
                identifier_range = mixin_range;
            }
        }
        if let Some(identifier) = identifier.filter(|i| i.range.is_some()) {
            identifier_range = self.classify(identifier.range.as_deref(), &identifier, range_class)?;
        }
        Ok(identifier_range)
    }

    /// Identifier type of references to a mixin: the identifier types of all
    /// its descendants, deduplicated and sorted
    ///
    /// Returns `None` when no descendant has an identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if a descendant's identifier cannot be classified.
    pub fn mixin_identifier_range(&self, mixin: &str) -> GeneratorResult<Option<String>> {
        let mut ranges: Vec<String> = Vec::new();
        for descendant in self.view.class_descendants(mixin, true, true)? {
            if let Some(identifier) = self.view.get_identifier_slot(&descendant, false)? {
                ranges.push(self.classify(identifier.range.as_deref(), &identifier, &descendant)?);
            }
        }
        ranges.sort();
        ranges.dedup();

        Ok((!ranges.is_empty()).then(|| union_of(&ranges)))
    }
}
