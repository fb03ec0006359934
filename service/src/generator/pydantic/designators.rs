//! Type designator values
//!
//! A slot with `designates_type: true` carries the concrete class of the
//! object it belongs to. The value written depends on the slot's range:
//! `uri` ranges take the expanded class URI, `uriorcurie` ranges the CURIE,
//! anything else the class name.

use linkml_core::types::SlotDefinition;

use crate::generator::traits::GeneratorResult;
use crate::schema_view::SchemaView;

/// The designator value identifying `class_name` through `slot`
///
/// # Errors
///
/// Returns an error if the class is unknown or its URI cannot be built.
pub fn type_designator_value(
    view: &SchemaView,
    slot: &SlotDefinition,
    class_name: &str,
) -> GeneratorResult<String> {
    let slot_types = match slot.range.as_deref() {
        Some(range) if view.get_type(range).is_some() => view.type_ancestors(range)?,
        _ => Vec::new(),
    };

    if slot_types.iter().any(|t| t == "uri") {
        Ok(view.class_uri(class_name, true)?)
    } else if slot_types.iter().any(|t| t == "uriorcurie") {
        Ok(view.class_uri(class_name, false)?)
    } else {
        Ok(class_name.to_string())
    }
}

/// Every designator value accepted for an instance typed as `class_name`:
/// its own value followed by those of its descendants, without duplicates
///
/// # Errors
///
/// Returns an error if the class hierarchy cannot be walked.
pub fn accepted_type_designator_values(
    view: &SchemaView,
    slot: &SlotDefinition,
    class_name: &str,
) -> GeneratorResult<Vec<String>> {
    let mut values = vec![type_designator_value(view, slot, class_name)?];
    for descendant in view.class_descendants(class_name, true, false)? {
        let value = type_designator_value(view, slot, &descendant)?;
        if !values.contains(&value) {
            values.push(value);
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkml_core::types::SchemaDefinition;
    use pretty_assertions::assert_eq;

    fn view() -> SchemaView {
        let schema = SchemaDefinition::from_yaml(
            r"
id: https://example.org/zoo
name: zoo
default_prefix: zoo
prefixes:
  zoo: https://example.org/zoo/
classes:
  Animal:
    slots: [kind]
  Dog:
    is_a: Animal
  Puppy:
    is_a: Dog
slots:
  kind:
    designates_type: true
    range: string
",
        )
        .expect("test schema parses");
        SchemaView::new(schema)
    }

    fn slot_with_range(range: &str) -> SlotDefinition {
        SlotDefinition {
            range: Some(range.to_string()),
            designates_type: Some(true),
            ..SlotDefinition::new("kind")
        }
    }

    #[test]
    fn test_value_follows_range() -> GeneratorResult<()> {
        let view = view();
        assert_eq!(type_designator_value(&view, &slot_with_range("string"), "Dog")?, "Dog");
        assert_eq!(type_designator_value(&view, &slot_with_range("uriorcurie"), "Dog")?, "zoo:Dog");
        assert_eq!(
            type_designator_value(&view, &slot_with_range("uri"), "Dog")?,
            "https://example.org/zoo/Dog"
        );
        Ok(())
    }

    #[test]
    fn test_accepted_values_include_descendants() -> GeneratorResult<()> {
        let view = view();
        let slot = slot_with_range("string");
        assert_eq!(
            accepted_type_designator_values(&view, &slot, "Animal")?,
            vec!["Animal", "Dog", "Puppy"]
        );
        assert_eq!(accepted_type_designator_values(&view, &slot, "Puppy")?, vec!["Puppy"]);
        Ok(())
    }
}
