//! Tests for SchemaView API

use linkml_core::error::Result;
use linkml_core::types::SchemaDefinition;
use linkml_core::types::{ClassDefinition, PrefixDefinition, SlotDefinition};
use linkml_pydantic::schema_view::SchemaView;
use pretty_assertions::assert_eq;

/// Create a test schema with inheritance
fn create_test_schema() -> SchemaDefinition {
    let mut schema = SchemaDefinition {
        id: "https://example.org/test".to_string(),
        name: "test_schema".to_string(),
        default_prefix: Some("test".to_string()),
        ..Default::default()
    };
    schema.prefixes.insert(
        "test".to_string(),
        PrefixDefinition::Simple("https://example.org/test/".to_string()),
    );

    // Add base class
    let mut base_class = ClassDefinition::new("BaseClass");
    base_class.description = Some("Base class for testing".to_string());
    base_class.slots = vec!["id".to_string(), "name".to_string()];
    schema.classes.insert("BaseClass".to_string(), base_class);

    // Add derived class
    let mut derived_class = ClassDefinition::new("DerivedClass");
    derived_class.is_a = Some("BaseClass".to_string());
    derived_class.slots = vec!["extra_field".to_string()];
    schema
        .classes
        .insert("DerivedClass".to_string(), derived_class);

    // Add mixin class
    let mut mixin_class = ClassDefinition::new("TimestampMixin");
    mixin_class.mixin = Some(true);
    mixin_class.slots = vec!["created_at".to_string()];
    schema
        .classes
        .insert("TimestampMixin".to_string(), mixin_class);

    // Add class with mixin
    let mut mixed_class = ClassDefinition::new("MixedClass");
    mixed_class.is_a = Some("BaseClass".to_string());
    mixed_class.mixins = vec!["TimestampMixin".to_string()];
    mixed_class.slot_usage.insert(
        "name".to_string(),
        SlotDefinition {
            description: Some("Name of the mixed thing".to_string()),
            ..SlotDefinition::new("name")
        },
    );
    schema.classes.insert("MixedClass".to_string(), mixed_class);

    // Add slots
    let mut id_slot = SlotDefinition::new("id");
    id_slot.identifier = Some(true);
    id_slot.range = Some("string".to_string());
    schema.slots.insert("id".to_string(), id_slot);

    let mut name_slot = SlotDefinition::new("name");
    name_slot.range = Some("string".to_string());
    schema.slots.insert("name".to_string(), name_slot);

    let mut extra_slot = SlotDefinition::new("extra_field");
    extra_slot.range = Some("string".to_string());
    schema.slots.insert("extra_field".to_string(), extra_slot);

    let mut created_slot = SlotDefinition::new("created_at");
    created_slot.range = Some("datetime".to_string());
    schema.slots.insert("created_at".to_string(), created_slot);

    schema
}

#[test]
fn test_schema_view_creation() {
    let view = SchemaView::new(create_test_schema());

    let classes = view.all_classes();
    assert_eq!(classes.len(), 4);
    assert!(classes.contains_key("BaseClass"));
    assert!(classes.contains_key("DerivedClass"));
    assert!(view.get_type("datetime").is_some());
}

#[test]
fn test_class_inheritance() -> Result<()> {
    let view = SchemaView::new(create_test_schema());

    assert_eq!(view.class_ancestors("DerivedClass")?, vec!["DerivedClass", "BaseClass"]);
    assert_eq!(
        view.class_ancestors("MixedClass")?,
        vec!["MixedClass", "BaseClass", "TimestampMixin"]
    );

    let descendants = view.class_descendants("BaseClass", true, false)?;
    assert_eq!(descendants, vec!["DerivedClass", "MixedClass"]);
    assert_eq!(view.class_descendants("TimestampMixin", true, false)?, vec!["MixedClass"]);
    assert!(view.class_descendants("TimestampMixin", false, false)?.is_empty());
    Ok(())
}

#[test]
fn test_induced_slots() -> Result<()> {
    let view = SchemaView::new(create_test_schema());

    let slots: Vec<String> = view
        .class_induced_slots("DerivedClass")?
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(slots, vec!["extra_field", "id", "name"]);

    let id = view.induced_slot("id", "DerivedClass")?;
    assert_eq!(id.required, Some(true));
    assert_eq!(id.owner.as_deref(), Some("DerivedClass"));
    Ok(())
}

#[test]
fn test_class_with_mixins() -> Result<()> {
    let view = SchemaView::new(create_test_schema());

    let slots = view.class_slots("MixedClass")?;
    assert!(slots.contains(&"created_at".to_string()));
    assert!(slots.contains(&"id".to_string()));

    let name = view.induced_slot("name", "MixedClass")?;
    assert_eq!(name.description.as_deref(), Some("Name of the mixed thing"));
    let base_name = view.induced_slot("name", "BaseClass")?;
    assert!(base_name.description.is_none());
    Ok(())
}

#[test]
fn test_identifier_slot() -> Result<()> {
    let view = SchemaView::new(create_test_schema());
    let identifier = view.get_identifier_slot("DerivedClass", false)?;
    assert_eq!(identifier.map(|s| s.name).as_deref(), Some("id"));
    assert!(view.get_identifier_slot("TimestampMixin", true)?.is_none());
    Ok(())
}

#[test]
fn test_class_uri() -> Result<()> {
    let view = SchemaView::new(create_test_schema());
    assert_eq!(view.class_uri("DerivedClass", false)?, "test:DerivedClass");
    assert_eq!(
        view.class_uri("DerivedClass", true)?,
        "https://example.org/test/DerivedClass"
    );
    Ok(())
}

#[test]
fn test_missing_class() {
    let view = SchemaView::new(create_test_schema());
    assert!(view.class_ancestors("Nope").is_err());
    assert!(view.induced_slot("id", "Nope").is_err());
}
