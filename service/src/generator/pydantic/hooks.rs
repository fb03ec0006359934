//! Lifecycle hooks around the generation steps
//!
//! Every hook receives the value about to be used and returns the value to
//! use instead. The defaults pass their input through unchanged, so an
//! implementation only overrides the steps it cares about.

use indexmap::IndexMap;
use linkml_core::types::{ClassDefinition, EnumDefinition, SlotDefinition};

use super::template::{ClassResult, PydanticEnum, PydanticModule, SlotResult};
use crate::schema_view::SchemaView;

/// Hooks called by [`super::PydanticGenerator`] while it builds a module
///
/// Order within [`super::PydanticGenerator::render`]:
///
/// 1. `before_generate_enums`, then `after_generate_enums`
/// 2. `before_generate_classes`
/// 3. per class: `before_generate_class`, the slot hooks, `after_generate_class`
/// 4. `after_generate_classes`
/// 5. `before_render_template`
///
/// `after_render_template` runs on the serialized source.
#[allow(unused_variables)]
pub trait GenerationHooks: Send + Sync + std::fmt::Debug {
    /// Receives every enum of the schema
    fn before_generate_enums(&self, enums: Vec<EnumDefinition>, view: &SchemaView) -> Vec<EnumDefinition> {
        enums
    }

    /// Receives the built enums keyed by generated name
    fn after_generate_enums(
        &self,
        enums: IndexMap<String, PydanticEnum>,
        view: &SchemaView,
    ) -> IndexMap<String, PydanticEnum> {
        enums
    }

    /// Receives the classes in emission order
    fn before_generate_classes(&self, classes: Vec<ClassDefinition>, view: &SchemaView) -> Vec<ClassDefinition> {
        classes
    }

    /// Receives one class before its model is built
    fn before_generate_class(&self, class: ClassDefinition, view: &SchemaView) -> ClassDefinition {
        class
    }

    /// Receives the built class with its imports and injected classes
    fn after_generate_class(&self, result: ClassResult, view: &SchemaView) -> ClassResult {
        result
    }

    /// Receives every built class in emission order
    fn after_generate_classes(&self, results: Vec<ClassResult>, view: &SchemaView) -> Vec<ClassResult> {
        results
    }

    /// Receives the induced slots of one class
    fn before_generate_slots(&self, slots: Vec<SlotDefinition>, view: &SchemaView) -> Vec<SlotDefinition> {
        slots
    }

    /// Receives one induced slot before its field is built
    fn before_generate_slot(&self, slot: SlotDefinition, view: &SchemaView) -> SlotDefinition {
        slot
    }

    /// Receives the built field with its side effects
    fn after_generate_slot(&self, result: SlotResult, view: &SchemaView) -> SlotResult {
        result
    }

    /// Receives every built field of one class
    fn after_generate_slots(&self, results: Vec<SlotResult>, view: &SchemaView) -> Vec<SlotResult> {
        results
    }

    /// Receives the assembled module before it is turned into text
    fn before_render_template(&self, module: PydanticModule, view: &SchemaView) -> PydanticModule {
        module
    }

    /// Receives the module source after formatting
    fn after_render_template(&self, code: String, view: &SchemaView) -> String {
        code
    }
}

/// Hooks that change nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl GenerationHooks for NoHooks {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::pydantic::template::PydanticClass;
    use linkml_core::types::SchemaDefinition;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_hooks_pass_through() {
        let view = SchemaView::new(SchemaDefinition::new("empty"));
        let result = ClassResult {
            cls: PydanticClass {
                name: "Book".to_string(),
                ..PydanticClass::default()
            },
            ..ClassResult::default()
        };
        assert_eq!(NoHooks.after_generate_class(result.clone(), &view), result);
        assert_eq!(
            NoHooks.after_render_template("x = 1\n".to_string(), &view),
            "x = 1\n"
        );
        let class = ClassDefinition::new("Book");
        assert_eq!(NoHooks.before_generate_class(class.clone(), &view), class);
    }
}
