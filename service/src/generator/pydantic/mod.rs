//! Pydantic v2 model generator
//!
//! Translates a `LinkML` schema into a Python module of Pydantic models.
//! Per slot, the scalar type comes from [`range::RangeClassifier`], the
//! collection shape from [`collection::CollectionPlanner`], and the default
//! from the precomputed predefined values. Classes are emitted parents
//! first ([`linearize`]), and the assembled [`template::PydanticModule`] is
//! turned into text by [`render::TemplateEnvironment`].

pub mod array;
pub mod collection;
pub mod compile;
pub mod designators;
pub mod hooks;
pub mod ifabsent;
pub mod linearize;
pub mod metadata;
pub mod options;
pub mod range;
pub mod render;
pub mod template;
pub mod types;

use std::sync::Arc;

use indexmap::IndexMap;
use linkml_core::prelude::*;
use tracing::{debug, error, info};

use self::collection::CollectionPlanner;
use self::designators::type_designator_value;
use self::hooks::{GenerationHooks, NoHooks};
use self::ifabsent::ifabsent_value_declaration;
use self::linearize::{BASE_MODEL_NAME, class_bases, sort_classes};
use self::metadata::{ArtifactKind, include_metadata};
use self::range::{LINKML_ANY, RangeClassifier};
use self::render::TemplateEnvironment;
use self::template::{
    BuildResult, ClassResult, LINKML_META, PydanticAttribute, PydanticBaseModel, PydanticClass,
    PydanticEnum, PydanticEnumValue, PydanticModule, SlotResult, default_imports,
};
use super::base::{BaseCodeFormatter, PythonFormatter};
use super::traits::{CodeFormatter, Generator, GeneratorResult};
use crate::schema_view::SchemaView;

pub use self::array::ArrayRepresentation;
pub use self::metadata::MetadataMode;
pub use self::options::{ExtraFields, PydanticGeneratorOptions};

/// Predefined field defaults keyed by generated class name, then slot name
pub type PredefinedSlotValues = IndexMap<String, IndexMap<String, String>>;

/// Pydantic v2 generator bound to one schema
///
/// The class order, base classes and field defaults are computed once in
/// [`PydanticGenerator::new`]; the generator is read-only afterwards.
/// Lifecycle hooks set with [`PydanticGenerator::with_hooks`] may rewrite
/// the inputs and results of each step.
#[derive(Debug)]
pub struct PydanticGenerator {
    name: String,
    description: String,
    view: SchemaView,
    options: PydanticGeneratorOptions,
    sorted_classes: Vec<ClassDefinition>,
    class_bases: IndexMap<String, Vec<String>>,
    predefined_slot_values: PredefinedSlotValues,
    hooks: Arc<dyn GenerationHooks>,
}

impl PydanticGenerator {
    /// Create a generator for `view`
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unusable options and a schema
    /// integrity error when the classes cannot be ordered or a default
    /// cannot be computed.
    pub fn new(view: SchemaView, options: PydanticGeneratorOptions) -> GeneratorResult<Self> {
        options.validate()?;

        let all_classes: Vec<ClassDefinition> = view.all_classes().values().cloned().collect();
        let sorted_classes: Vec<ClassDefinition> = sort_classes(&all_classes)?
            .into_iter()
            .filter(|c| c.class_uri.as_deref() != Some(LINKML_ANY))
            .collect();
        let sorted_names: Vec<String> = sorted_classes.iter().map(|c| camelcase(&c.name)).collect();
        let bases = class_bases(&sorted_classes, &sorted_names, options.gen_mixin_inheritance);

        let mut predefined = compute_predefined_slot_values(&view)?;
        for (class_name, values) in &options.predefined_slot_values {
            let entry = predefined.entry(class_name.clone()).or_default();
            for (slot_name, value) in values {
                entry.insert(slot_name.clone(), value.clone());
            }
        }

        debug!(
            classes = sorted_classes.len(),
            schema = %view.schema().name,
            "prepared pydantic generator"
        );

        Ok(Self {
            name: "pydantic".to_string(),
            description: "Generate Pydantic v2 models from LinkML schemas".to_string(),
            view,
            options,
            sorted_classes,
            class_bases: bases,
            predefined_slot_values: predefined,
            hooks: Arc::new(NoHooks),
        })
    }

    /// Replace the lifecycle hooks
    #[must_use]
    pub fn with_hooks(mut self, hooks: impl GenerationHooks + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// The schema view this generator reads
    #[must_use]
    pub fn view(&self) -> &SchemaView {
        &self.view
    }

    /// The options this generator was built with
    #[must_use]
    pub fn options(&self) -> &PydanticGeneratorOptions {
        &self.options
    }

    /// Classes in emission order, parents first, `linkml:Any` classes left out
    #[must_use]
    pub fn sort_classes(&self) -> &[ClassDefinition] {
        &self.sorted_classes
    }

    /// Base classes keyed by generated class name
    #[must_use]
    pub fn class_bases(&self) -> &IndexMap<String, Vec<String>> {
        &self.class_bases
    }

    /// Field defaults keyed by generated class name, then slot name
    #[must_use]
    pub fn predefined_slot_values(&self) -> &PredefinedSlotValues {
        &self.predefined_slot_values
    }

    fn classifier(&self) -> RangeClassifier<'_> {
        RangeClassifier::new(&self.view, self.options.gen_mixin_inheritance)
    }

    /// Build the model of one class
    ///
    /// # Errors
    ///
    /// Returns an error if any of its slots cannot be generated.
    pub fn generate_class(&self, class: &ClassDefinition) -> GeneratorResult<ClassResult> {
        let name = camelcase(&class.name);
        debug!(class = %class.name, "generating class");

        let bases = self
            .class_bases
            .get(&name)
            .cloned()
            .unwrap_or_else(|| vec![BASE_MODEL_NAME.to_string()]);
        let mut result = ClassResult {
            cls: PydanticClass {
                name,
                bases,
                description: class.description.as_deref().map(BaseCodeFormatter::escape_description),
                ..PydanticClass::default()
            },
            ..ClassResult::default()
        };

        let slots = self
            .hooks
            .before_generate_slots(self.view.class_induced_slots(&class.name)?, &self.view);
        let mut slot_results = Vec::with_capacity(slots.len());
        for slot in slots {
            let slot = self.hooks.before_generate_slot(slot, &self.view);
            let slot_result = self.hooks.after_generate_slot(self.generate_slot(&slot, class)?, &self.view);
            result = result.merge(slot_result.clone());
            slot_results.push(slot_result);
        }
        result.cls.attributes = self
            .hooks
            .after_generate_slots(slot_results, &self.view)
            .into_iter()
            .map(|r| (r.attribute.name.clone(), r.attribute))
            .collect();
        result.cls.meta = include_metadata(self.options.metadata_mode, ArtifactKind::Class, class)?;
        Ok(result)
    }

    /// Build the field for an induced slot of `class`
    ///
    /// # Errors
    ///
    /// Returns a schema integrity error for unknown ranges or conflicting
    /// collection keys, and a configuration error for array slots without
    /// a configured representation.
    pub fn generate_slot(&self, slot: &SlotDefinition, class: &ClassDefinition) -> GeneratorResult<SlotResult> {
        let predefined = self
            .predefined_slot_values
            .get(&camelcase(&class.name))
            .and_then(|values| values.get(&slot.name))
            .cloned();

        let attribute = PydanticAttribute {
            name: underscore(&slot.name),
            required: slot.required,
            identifier: slot.identifier,
            key: slot.key,
            predefined,
            title: slot.title.clone(),
            description: slot.description.as_deref().map(BaseCodeFormatter::escape_description),
            pattern: slot.pattern.clone(),
            minimum_value: slot.minimum_value.clone(),
            maximum_value: slot.maximum_value.clone(),
            equals_number: slot.equals_number,
            meta: include_metadata(self.options.metadata_mode, ArtifactKind::Field, slot)?,
            range: None,
        };

        let classifier = self.classifier();
        let pyrange = classifier.classify_slot(slot, &class.name)?;
        CollectionPlanner::new(&self.view, classifier).plan(
            slot,
            pyrange,
            &self.options.array_representations,
            SlotResult::new(attribute),
        )
    }

    /// Build the models of all enums
    #[must_use]
    pub fn generate_enums(&self) -> IndexMap<String, PydanticEnum> {
        let source_enums = self
            .view
            .all_enums()
            .iter()
            .map(|(name, enum_def)| {
                let mut enum_def = enum_def.clone();
                if enum_def.name.is_empty() {
                    enum_def.name.clone_from(name);
                }
                enum_def
            })
            .collect();
        let enums = self.hooks.before_generate_enums(source_enums, &self.view);
        let generated = enums
            .iter()
            .map(|enum_def| {
                let values = enum_def
                    .permissible_values
                    .iter()
                    .map(|pv| {
                        let label = BaseCodeFormatter::enum_label(pv.text());
                        let value = PydanticEnumValue {
                            label: label.clone(),
                            value: pv.text().to_string(),
                            description: pv.description().map(BaseCodeFormatter::escape_description),
                        };
                        (label, value)
                    })
                    .collect();
                let pyenum = PydanticEnum {
                    name: camelcase(&enum_def.name),
                    description: enum_def.description.as_deref().map(BaseCodeFormatter::escape_description),
                    values,
                };
                (pyenum.name.clone(), pyenum)
            })
            .collect();
        self.hooks.after_generate_enums(generated, &self.view)
    }

    /// Assemble the complete module model
    ///
    /// # Errors
    ///
    /// Returns the first error raised while generating a class.
    pub fn render(&self) -> GeneratorResult<PydanticModule> {
        info!(schema = %self.view.schema().name, "rendering pydantic module");

        let mut imports = default_imports();
        for import in &self.options.imports {
            imports += import.clone();
        }

        let mut injected: Vec<String> = vec![LINKML_META.to_string()];
        injected.extend(self.options.injected_classes.iter().cloned());

        let enums = self.generate_enums();

        let source_classes = self.hooks.before_generate_classes(self.sorted_classes.clone(), &self.view);
        let mut class_results = Vec::with_capacity(source_classes.len());
        for class in source_classes {
            let class = self.hooks.before_generate_class(class, &self.view);
            let mut result = self.hooks.after_generate_class(self.generate_class(&class)?, &self.view);
            if let Some(class_imports) = result.imports.take() {
                imports += class_imports;
            }
            if let Some(class_injected) = result.injected_classes.take() {
                injected.extend(class_injected);
            }
            class_results.push(result);
        }
        let classes = self
            .hooks
            .after_generate_classes(class_results, &self.view)
            .into_iter()
            .map(|r| (r.cls.name.clone(), r.cls))
            .collect();

        let schema = self.view.source_schema();
        let module = PydanticModule {
            metamodel_version: schema.metamodel_version.clone(),
            version: schema.version.clone(),
            python_imports: imports,
            base_model: PydanticBaseModel {
                extra_fields: self.options.extra_fields.to_string(),
                fields: self.options.injected_fields.clone(),
                ..PydanticBaseModel::default()
            },
            injected_classes: clean_injected_classes(injected),
            enums,
            classes,
            meta: include_metadata(self.options.metadata_mode, ArtifactKind::Module, schema)?,
        };
        Ok(self.hooks.before_render_template(module, &self.view))
    }

    /// Render the module to Python source
    ///
    /// # Errors
    ///
    /// Returns an error if the module cannot be assembled or a template
    /// override is invalid.
    pub fn serialize(&self) -> GeneratorResult<String> {
        let module = self.render()?;
        let env = match &self.options.template_dir {
            Some(dir) => TemplateEnvironment::with_template_dir(dir)?,
            None => TemplateEnvironment::new(),
        };
        let mut code = env.render_module(&module)?;
        if self.options.format_output {
            code = PythonFormatter.format_code(&code)?;
        }
        Ok(self.hooks.after_render_template(code, &self.view))
    }

    /// Render the module and check the result is structurally valid Python
    ///
    /// # Errors
    ///
    /// Returns [`super::traits::GeneratorError::Compilation`] when the check
    /// fails; the generated source is logged at `error` level.
    pub fn compile_module(&self) -> GeneratorResult<String> {
        let code = self.serialize()?;
        if let Err(e) = compile::check_python_source(&code) {
            error!(error = %e, source = %code, "generated pydantic module failed to compile");
            return Err(e);
        }
        Ok(code)
    }
}

/// Dedent injected class text and drop duplicates, keeping first occurrences
fn clean_injected_classes(injected: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(injected.len());
    for text in injected {
        let text = BaseCodeFormatter::dedent(&text).trim_end().to_string();
        if !text.is_empty() && !cleaned.contains(&text) {
            cleaned.push(text);
        }
    }
    cleaned
}

/// Whether any class among the slot's ranges has an identifier or key
fn range_class_has_identifier_slot(view: &SchemaView, slot: &SlotDefinition) -> GeneratorResult<bool> {
    for range in RangeClassifier::slot_ranges(slot).iter().flatten() {
        if view.get_class(range).is_some() && view.get_identifier_slot(range, true)?.is_some() {
            return Ok(true);
        }
    }
    Ok(false)
}

fn compute_predefined_slot_values(view: &SchemaView) -> GeneratorResult<PredefinedSlotValues> {
    let mut values = PredefinedSlotValues::new();
    for class in view.all_classes().values() {
        let mut class_values = IndexMap::new();
        for slot in view.class_induced_slots(&class.name)? {
            let value = if slot.is_type_designator() {
                let designator = BaseCodeFormatter::python_string(&type_designator_value(view, &slot, &class.name)?);
                Some(if slot.is_multivalued() {
                    format!("[{designator}]")
                } else {
                    designator
                })
            } else if slot.ifabsent.is_some() {
                ifabsent_value_declaration(view, &slot, &class.name)?
            } else if slot.is_multivalued() {
                let keyed = slot.inlined.unwrap_or(false)
                    && !slot.inlined_as_list.unwrap_or(false)
                    && range_class_has_identifier_slot(view, &slot)?;
                Some(if keyed { "default_factory=dict" } else { "default_factory=list" }.to_string())
            } else {
                None
            };
            if let Some(value) = value {
                class_values.insert(slot.name.clone(), value);
            }
        }
        values.insert(camelcase(&class.name), class_values);
    }
    Ok(values)
}

impl Generator for PydanticGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn generate(&self, schema: &SchemaDefinition) -> Result<String> {
        let mut generator = PydanticGenerator::new(SchemaView::new(schema.clone()), self.options.clone())?;
        generator.hooks = Arc::clone(&self.hooks);
        Ok(generator.serialize()?)
    }

    fn get_file_extension(&self) -> &str {
        "py"
    }

    fn get_default_filename(&self) -> &str {
        "models.py"
    }

    fn validate_schema(&self, schema: &SchemaDefinition) -> Result<()> {
        if schema.name.is_empty() {
            return Err(LinkMLError::integrity("schema must have a name"));
        }
        let classes: Vec<ClassDefinition> = schema.classes.values().cloned().collect();
        sort_classes(&classes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::traits::GeneratorError;
    use pretty_assertions::assert_eq;

    fn generator(yaml: &str) -> GeneratorResult<PydanticGenerator> {
        let schema = SchemaDefinition::from_yaml(yaml)?;
        PydanticGenerator::new(SchemaView::new(schema), PydanticGeneratorOptions::default())
    }

    const PEOPLE: &str = r"
id: https://example.org/people
name: people
default_prefix: people
default_range: string
prefixes:
  people: https://example.org/people/
classes:
  NamedThing:
    slots: [id, name]
  Person:
    is_a: NamedThing
    slots: [friends, category, nicknames, status]
  Organization:
    is_a: NamedThing
    slots: [members]
slots:
  id:
    identifier: true
  name:
    required: true
  friends:
    range: Person
    multivalued: true
  members:
    range: Person
    multivalued: true
    inlined: true
  category:
    designates_type: true
  nicknames:
    multivalued: true
  status:
    ifabsent: string(active)
";

    #[test]
    fn test_predefined_values() -> GeneratorResult<()> {
        let generator = generator(PEOPLE)?;
        let person = &generator.predefined_slot_values()["Person"];
        assert_eq!(person["category"], "\"Person\"");
        assert_eq!(person["friends"], "default_factory=list");
        assert_eq!(person["nicknames"], "default_factory=list");
        assert_eq!(person["status"], "\"active\"");
        assert!(!person.contains_key("name"));
        assert_eq!(generator.predefined_slot_values()["Organization"]["members"], "default_factory=dict");
        Ok(())
    }

    #[test]
    fn test_predefined_override() -> GeneratorResult<()> {
        let schema = SchemaDefinition::from_yaml(PEOPLE)?;
        let mut options = PydanticGeneratorOptions::default();
        options
            .predefined_slot_values
            .entry("Person".to_string())
            .or_default()
            .insert("status".to_string(), "\"retired\"".to_string());
        let generator = PydanticGenerator::new(SchemaView::new(schema), options)?;
        assert_eq!(generator.predefined_slot_values()["Person"]["status"], "\"retired\"");
        Ok(())
    }

    #[test]
    fn test_generate_class() -> GeneratorResult<()> {
        let generator = generator(PEOPLE)?;
        let person = generator
            .view()
            .get_class("Person")
            .cloned()
            .ok_or_else(|| GeneratorError::integrity("Person"))?;
        let result = generator.generate_class(&person)?;

        assert_eq!(result.cls.bases, vec!["NamedThing"]);
        let ranges: Vec<(&str, &str)> = result
            .cls
            .attributes
            .values()
            .map(|a| (a.name.as_str(), a.range.as_deref().unwrap_or_default()))
            .collect();
        assert_eq!(
            ranges,
            vec![
                ("friends", "Optional[List[str]]"),
                ("category", "Literal[\"Person\"]"),
                ("nicknames", "Optional[List[str]]"),
                ("status", "Optional[str]"),
                ("id", "str"),
                ("name", "str"),
            ]
        );
        assert_eq!(result.cls.attributes["friends"].field(), "default_factory=list");
        assert_eq!(result.cls.attributes["name"].field(), "...");
        Ok(())
    }

    #[test]
    fn test_render_module() -> GeneratorResult<()> {
        let generator = generator(PEOPLE)?;
        let module = generator.render()?;
        assert_eq!(
            module.classes.keys().collect::<Vec<_>>(),
            vec!["NamedThing", "Person", "Organization"]
        );
        assert_eq!(module.injected_classes.len(), 1);
        assert!(module.injected_classes[0].starts_with("class LinkMLMeta(RootModel):"));
        assert_eq!(module.base_model.extra_fields, "forbid");
        let meta = module.meta.unwrap_or_default();
        assert_eq!(meta.get("id"), Some(&serde_json::json!("https://example.org/people")));
        assert!(!meta.contains_key("classes"));
        Ok(())
    }

    #[test]
    fn test_compile_module() -> GeneratorResult<()> {
        let code = generator(PEOPLE)?.compile_module()?;
        assert!(code.contains("class Person(NamedThing):"));
        assert!(code.contains("Person.model_rebuild()"));
        Ok(())
    }

    #[test]
    fn test_clean_injected_classes() {
        let cleaned = clean_injected_classes(vec![
            "    class A:\n        pass\n".to_string(),
            "class A:\n    pass".to_string(),
            String::new(),
        ]);
        assert_eq!(cleaned, vec!["class A:\n    pass"]);
    }

    #[test]
    fn test_generator_trait() -> Result<()> {
        let generator = generator(PEOPLE)?;
        let schema = SchemaDefinition::from_yaml(PEOPLE)?;
        generator.validate_schema(&schema)?;
        let code = generator.generate(&schema)?;
        assert_eq!(code, generator.serialize()?);
        assert_eq!(generator.get_file_extension(), "py");
        Ok(())
    }
}
