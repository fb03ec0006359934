//! Collection shapes
//!
//! Wraps the scalar type of a slot into its final shape: an array type, a
//! `List`, a keyed `Dict`, and finally `Optional` when the field may be
//! omitted.

use linkml_core::types::SlotDefinition;

use super::array::ArrayRepresentation;
use super::range::{RangeClassifier, union_of};
use super::template::{BuildResult, SlotResult};
use super::types::resolve_type;
use crate::generator::traits::{GeneratorError, GeneratorResult};
use crate::schema_view::SchemaView;

/// Plans the collection shape of slots
#[derive(Debug, Clone, Copy)]
pub struct CollectionPlanner<'a> {
    view: &'a SchemaView,
    classifier: RangeClassifier<'a>,
}

impl<'a> CollectionPlanner<'a> {
    /// Create a planner sharing `classifier`'s view
    #[must_use]
    pub fn new(view: &'a SchemaView, classifier: RangeClassifier<'a>) -> Self {
        Self { view, classifier }
    }

    /// The key type of an inlined collection of class instances
    ///
    /// Looks at the identifier (or key) slot of every class among `ranges`.
    /// Returns `None` when no range class has one.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::SchemaIntegrity`] when the range classes
    /// disagree on the key type.
    pub fn collection_key(&self, ranges: &[Option<String>]) -> GeneratorResult<Option<String>> {
        let mut keys: Vec<String> = Vec::new();
        for range in ranges.iter().flatten() {
            if self.view.get_class(range).is_none() {
                continue;
            }
            if let Some(identifier) = self.view.get_identifier_slot(range, true)? {
                let key = self
                    .classifier
                    .classify(identifier.range.as_deref(), &identifier, range)?;
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }

        match keys.len() {
            0 => Ok(None),
            1 => Ok(keys.pop()),
            _ => Err(GeneratorError::integrity(format!(
                "slot ranges {ranges:?} have conflicting collection keys: {keys:?}"
            ))),
        }
    }

    /// Value type of an inlined dict whose entries can be written as
    /// `key: value`
    ///
    /// Applies when the range class has an identifier (or key) and exactly
    /// one other slot, whose range is a type. Returns `None` otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the range class slots cannot be induced.
    pub fn simple_dict_value(&self, slot: &SlotDefinition) -> GeneratorResult<Option<String>> {
        if !slot.inlined.unwrap_or(false) || slot.inlined_as_list.unwrap_or(false) {
            return Ok(None);
        }
        let Some(range) = slot.range.as_deref() else {
            return Ok(None);
        };
        if self.view.get_class(range).is_none() {
            return Ok(None);
        }
        let Some(identifier) = self.view.get_identifier_slot(range, true)? else {
            return Ok(None);
        };

        let slots = self.view.class_slots(range)?;
        if slots.len() != 2 {
            return Ok(None);
        }
        let Some(value_slot_name) = slots.iter().find(|s| **s != identifier.name) else {
            return Ok(None);
        };
        let value_slot = self.view.induced_slot(value_slot_name, range)?;
        match value_slot.range.as_deref().and_then(|r| self.view.get_type(r)) {
            Some(type_def) => Ok(Some(resolve_type(type_def, self.view)?)),
            None => Ok(None),
        }
    }

    /// Give `result` its final type, starting from the scalar type `pyrange`
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Configuration`] for array slots when no
    /// array representation is configured, and
    /// [`GeneratorError::SchemaIntegrity`] for conflicting collection keys.
    pub fn plan(
        &self,
        slot: &SlotDefinition,
        pyrange: String,
        array_representations: &[ArrayRepresentation],
        mut result: SlotResult,
    ) -> GeneratorResult<SlotResult> {
        let ranges = RangeClassifier::slot_ranges(slot);
        let mut pyrange = pyrange;

        if let Some(array) = &slot.array {
            if array_representations.is_empty() {
                return Err(GeneratorError::configuration(format!(
                    "slot '{}' is an array but no array representation is configured",
                    slot.name
                )));
            }
            let mut alternatives = Vec::with_capacity(array_representations.len());
            for representation in array_representations {
                let mut array_result = representation.generator().make(array, &pyrange)?;
                if let Some(range) = array_result.attribute.range.take() {
                    alternatives.push(range);
                }
                result = result.merge(array_result);
            }
            pyrange = union_of(&alternatives);
        } else if slot.is_multivalued() {
            let inlined = slot.inlined.unwrap_or(false);
            let inlined_as_list = slot.inlined_as_list.unwrap_or(false);
            let key = if inlined || inlined_as_list {
                self.collection_key(&ranges)?
            } else {
                None
            };

            pyrange = match key {
                Some(key) if slot.inlined != Some(false) && !inlined_as_list => {
                    let simple = if ranges.len() == 1 {
                        self.simple_dict_value(slot)?
                    } else {
                        None
                    };
                    match simple {
                        Some(value) if value == pyrange => format!("Dict[str, {value}]"),
                        Some(value) => format!("Dict[str, Union[{value}, {pyrange}]]"),
                        None => format!("Dict[{key}, {pyrange}]"),
                    }
                }
                _ => format!("List[{pyrange}]"),
            };
        }

        let mandatory = slot.is_required() || slot.is_identifier() || slot.is_key();
        if !mandatory && !slot.is_type_designator() {
            pyrange = format!("Optional[{pyrange}]");
        }

        result.attribute.range = Some(pyrange);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkml_core::types::{ArrayExpression, SchemaDefinition};
    use pretty_assertions::assert_eq;

    fn view() -> SchemaView {
        let schema = SchemaDefinition::from_yaml(
            r"
id: https://example.org/org
name: org
default_prefix: org
default_range: string
classes:
  Person:
    slots: [id, name]
  Setting:
    slots: [key_name, value]
  Team:
    slots: [code]
  Container:
    slots: [members, settings, teams]
slots:
  id:
    identifier: true
  name: {}
  key_name:
    key: true
  value:
    range: integer
  code:
    identifier: true
    range: integer
  members:
    range: Person
    multivalued: true
  settings:
    range: Setting
    multivalued: true
    inlined: true
  teams:
    range: Team
    multivalued: true
",
        )
        .expect("test schema parses");
        SchemaView::new(schema)
    }

    fn plan_slot(view: &SchemaView, slot: &SlotDefinition, class_name: &str) -> GeneratorResult<String> {
        let classifier = RangeClassifier::new(view, true);
        let planner = CollectionPlanner::new(view, classifier);
        let pyrange = classifier.classify_slot(slot, class_name)?;
        let result = planner.plan(slot, pyrange, &[ArrayRepresentation::List], SlotResult::default())?;
        Ok(result.attribute.range.unwrap_or_default())
    }

    #[test]
    fn test_reference_list_and_optional() -> GeneratorResult<()> {
        let view = view();
        let members = view.induced_slot("members", "Container")?;
        assert_eq!(plan_slot(&view, &members, "Container")?, "Optional[List[str]]");

        let id = view.induced_slot("id", "Person")?;
        assert_eq!(plan_slot(&view, &id, "Person")?, "str");
        Ok(())
    }

    #[test]
    fn test_inlined_dict_shapes() -> GeneratorResult<()> {
        let view = view();

        let mut members = view.induced_slot("members", "Container")?;
        members.inlined = Some(true);
        // Person has two slots and a string value: simple dict of str
        assert_eq!(plan_slot(&view, &members, "Container")?, "Optional[Dict[str, Union[str, Person]]]");

        let settings = view.induced_slot("settings", "Container")?;
        assert_eq!(plan_slot(&view, &settings, "Container")?, "Optional[Dict[str, Union[int, Setting]]]");

        let mut teams = view.induced_slot("teams", "Container")?;
        teams.inlined = Some(true);
        assert_eq!(plan_slot(&view, &teams, "Container")?, "Optional[Dict[int, Team]]");

        teams.inlined_as_list = Some(true);
        assert_eq!(plan_slot(&view, &teams, "Container")?, "Optional[List[Team]]");
        Ok(())
    }

    #[test]
    fn test_conflicting_keys() -> GeneratorResult<()> {
        let view = view();
        let classifier = RangeClassifier::new(&view, true);
        let planner = CollectionPlanner::new(&view, classifier);
        let ranges = vec![Some("Person".to_string()), Some("Team".to_string())];
        assert!(matches!(planner.collection_key(&ranges), Err(GeneratorError::SchemaIntegrity(_))));
        assert_eq!(planner.collection_key(&[Some("Person".to_string()), None])?.as_deref(), Some("str"));
        Ok(())
    }

    #[test]
    fn test_array_without_representation() -> GeneratorResult<()> {
        let view = view();
        let classifier = RangeClassifier::new(&view, true);
        let planner = CollectionPlanner::new(&view, classifier);
        let slot = SlotDefinition {
            range: Some("integer".to_string()),
            array: Some(ArrayExpression {
                exact_number_dimensions: Some(2),
                ..ArrayExpression::default()
            }),
            ..SlotDefinition::new("matrix")
        };
        assert!(matches!(
            planner.plan(&slot, "int".to_string(), &[], SlotResult::default()),
            Err(GeneratorError::Configuration(_))
        ));

        let both = planner.plan(
            &slot,
            "int".to_string(),
            &[ArrayRepresentation::List, ArrayRepresentation::Numpydantic],
            SlotResult::default(),
        )?;
        assert_eq!(
            both.attribute.range.as_deref(),
            Some("Optional[Union[List[List[int]], NDArray[Shape[\"*, *\"], int]]]")
        );
        assert!(both.imports.as_ref().and_then(|i| i.get("numpydantic")).is_some());
        Ok(())
    }
}
