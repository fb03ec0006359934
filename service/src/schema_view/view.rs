//! Main `SchemaView` API for schema introspection

use linkml_core::{
    error::{LinkMLError, Result},
    linkml_types::builtin_types,
    types::{ClassDefinition, EnumDefinition, SchemaDefinition, SlotDefinition, TypeDefinition},
    utils::{camelcase, expand_curie, merge_slot_definitions},
};
use indexmap::IndexMap;
use std::path::Path;
use std::sync::RwLock;

use super::navigation::{NavigationCache, closure};

/// Error type for `SchemaView` operations
#[derive(Debug, thiserror::Error)]
pub enum SchemaViewError {
    /// Circular dependency detected in an inheritance chain
    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    /// Error accessing cached data
    #[error("Cache error: {0}")]
    CacheError(String),
}

impl From<SchemaViewError> for LinkMLError {
    fn from(err: SchemaViewError) -> Self {
        match err {
            SchemaViewError::CircularDependency(msg) => LinkMLError::integrity(msg),
            SchemaViewError::CacheError(msg) => LinkMLError::service(msg),
        }
    }
}

/// Read-only view over a schema merged with the built-in `linkml:types`
///
/// Element lookups are plain map reads; derived queries (ancestors, induced
/// slots) are memoized in a [`NavigationCache`].
#[derive(Debug)]
pub struct SchemaView {
    schema: SchemaDefinition,

    /// The schema as given, before built-ins were merged in
    source: SchemaDefinition,

    /// Navigation cache for repeated lookups
    nav_cache: RwLock<NavigationCache>,
}

impl SchemaView {
    /// Create a new `SchemaView` from a schema definition
    #[must_use]
    pub fn new(schema: SchemaDefinition) -> Self {
        let source = schema.clone();
        let mut merged = schema;

        // Built-ins go underneath; a schema type of the same name wins
        let mut types = builtin_types();
        for (name, definition) in std::mem::take(&mut merged.types) {
            types.insert(name, definition);
        }
        merged.types = types;

        let schema_id = merged.id.clone();
        for class in merged.classes.values_mut() {
            class.from_schema.get_or_insert_with(|| schema_id.clone());
        }
        for slot in merged.slots.values_mut() {
            slot.from_schema.get_or_insert_with(|| schema_id.clone());
        }
        for enum_def in merged.enums.values_mut() {
            enum_def.from_schema.get_or_insert_with(|| schema_id.clone());
        }

        Self {
            schema: merged,
            source,
            nav_cache: RwLock::new(NavigationCache::new()),
        }
    }

    /// Load a schema from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(SchemaDefinition::from_yaml_file(path)?))
    }

    /// The merged schema
    #[must_use]
    pub fn schema(&self) -> &SchemaDefinition {
        &self.schema
    }

    /// The schema as it was loaded, without the merged built-in types
    #[must_use]
    pub fn source_schema(&self) -> &SchemaDefinition {
        &self.source
    }

    // === Element Operations ===

    /// All classes, in schema order
    #[must_use]
    pub fn all_classes(&self) -> &IndexMap<String, ClassDefinition> {
        &self.schema.classes
    }

    /// All top-level slots, in schema order
    #[must_use]
    pub fn all_slots(&self) -> &IndexMap<String, SlotDefinition> {
        &self.schema.slots
    }

    /// All enums, in schema order
    #[must_use]
    pub fn all_enums(&self) -> &IndexMap<String, EnumDefinition> {
        &self.schema.enums
    }

    /// All types, built-ins first
    #[must_use]
    pub fn all_types(&self) -> &IndexMap<String, TypeDefinition> {
        &self.schema.types
    }

    /// Get a class definition
    #[must_use]
    pub fn get_class(&self, name: &str) -> Option<&ClassDefinition> {
        self.schema.classes.get(name)
    }

    /// Get a top-level slot definition
    #[must_use]
    pub fn get_slot(&self, name: &str) -> Option<&SlotDefinition> {
        self.schema.slots.get(name)
    }

    /// Get a type definition
    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.schema.types.get(name)
    }

    /// Get an enum definition
    #[must_use]
    pub fn get_enum(&self, name: &str) -> Option<&EnumDefinition> {
        self.schema.enums.get(name)
    }

    fn require_class(&self, name: &str) -> Result<&ClassDefinition> {
        self.get_class(name)
            .ok_or_else(|| LinkMLError::not_found("class", name))
    }

    // === Class Operations ===

    /// Direct parents of a class: `is_a` first, then mixins (when requested)
    ///
    /// # Errors
    ///
    /// Returns an error if the class does not exist.
    pub fn class_parents(&self, name: &str, mixins: bool) -> Result<Vec<String>> {
        let class = self.require_class(name)?;
        let mut parents: Vec<String> = class.is_a.iter().cloned().collect();
        if mixins {
            parents.extend(class.mixins.iter().cloned());
        }
        Ok(parents)
    }

    /// Direct children of a class, in schema order
    #[must_use]
    pub fn class_children(&self, name: &str, mixins: bool) -> Vec<String> {
        self.schema
            .classes
            .values()
            .filter(|c| {
                c.is_a.as_deref() == Some(name) || (mixins && c.mixins.iter().any(|m| m == name))
            })
            .map(|c| c.name.clone())
            .collect()
    }

    /// All ancestors of a class, itself first, following `is_a` and mixins
    ///
    /// # Errors
    ///
    /// Returns an error if the class or one of its ancestors does not exist.
    pub fn class_ancestors(&self, name: &str) -> Result<Vec<String>> {
        if let Some(cached) = self.read_cache()?.get_ancestors(name) {
            return Ok(cached);
        }

        let ancestors = closure(name, true, |c| self.class_parents(c, true))?;

        self.write_cache()?
            .cache_ancestors(name.to_string(), ancestors.clone());
        Ok(ancestors)
    }

    /// All descendants of a class
    ///
    /// # Errors
    ///
    /// Returns an error if the class does not exist.
    pub fn class_descendants(&self, name: &str, mixins: bool, reflexive: bool) -> Result<Vec<String>> {
        self.require_class(name)?;
        closure(name, reflexive, |c| Ok(self.class_children(c, mixins)))
    }

    /// Is this class declared as a mixin?
    #[must_use]
    pub fn is_mixin(&self, name: &str) -> bool {
        self.get_class(name)
            .and_then(|c| c.mixin)
            .unwrap_or(false)
    }

    /// Names of every slot applicable to a class, own slots first, then
    /// inherited ones; attributes are included
    ///
    /// # Errors
    ///
    /// Returns an error if the class or one of its ancestors does not exist.
    pub fn class_slots(&self, class_name: &str) -> Result<Vec<String>> {
        let mut slots: Vec<String> = Vec::new();
        for ancestor in self.class_ancestors(class_name)? {
            let class = self.require_class(&ancestor)?;
            for slot in class.slots.iter().chain(class.attributes.keys()) {
                if !slots.contains(slot) {
                    slots.push(slot.clone());
                }
            }
        }
        Ok(slots)
    }

    /// Induced slots of a class, in `class_slots` order
    ///
    /// # Errors
    ///
    /// Returns an error if any slot cannot be induced.
    pub fn class_induced_slots(&self, class_name: &str) -> Result<Vec<SlotDefinition>> {
        self.class_slots(class_name)?
            .iter()
            .map(|slot| self.induced_slot(slot, class_name))
            .collect()
    }

    // === Slot Operations ===

    /// Ancestors of a slot along `is_a` and mixins, nearest first, excluding
    /// the slot itself. Shared or cyclic parents are visited once.
    fn slot_ancestors(&self, slot: &SlotDefinition) -> Result<Vec<SlotDefinition>> {
        let mut chain: Vec<SlotDefinition> = Vec::new();
        let mut seen: Vec<String> = vec![slot.name.clone()];
        let mut todo: Vec<String> = slot.is_a.iter().chain(slot.mixins.iter()).cloned().collect();
        todo.reverse();

        while let Some(parent_name) = todo.pop() {
            if seen.contains(&parent_name) {
                continue;
            }
            let parent = self
                .get_slot(&parent_name)
                .ok_or_else(|| LinkMLError::not_found("slot", parent_name.clone()))?;
            seen.push(parent_name);
            let mut next: Vec<String> = parent.is_a.iter().chain(parent.mixins.iter()).cloned().collect();
            next.reverse();
            todo.extend(next);
            chain.push(parent.clone());
        }

        Ok(chain)
    }

    /// Get a fully resolved slot in the context of a specific class
    ///
    /// The base definition is the nearest attribute of that name along the
    /// class ancestry, else the schema-level slot. `slot_usage` is then
    /// applied from the most general ancestor to the class itself, and
    /// unset properties are filled from the slot's own `is_a` chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot or class does not exist.
    pub fn induced_slot(&self, slot_name: &str, class_name: &str) -> Result<SlotDefinition> {
        if let Some(cached) = self.read_cache()?.get_induced_slot(class_name, slot_name) {
            return Ok(cached);
        }

        let ancestors = self.class_ancestors(class_name)?;

        let mut induced = ancestors
            .iter()
            .filter_map(|a| self.get_class(a))
            .find_map(|c| c.attributes.get(slot_name))
            .or_else(|| self.get_slot(slot_name))
            .cloned()
            .ok_or_else(|| LinkMLError::not_found("slot", slot_name))?;
        induced.name = slot_name.to_string();

        for ancestor in ancestors.iter().rev() {
            if let Some(usage) = self.get_class(ancestor).and_then(|c| c.slot_usage.get(slot_name)) {
                induced = merge_slot_definitions(&induced, usage);
                induced.name = slot_name.to_string();
            }
        }

        for parent in self.slot_ancestors(&induced)? {
            induced = merge_slot_definitions(&parent, &induced);
        }

        if induced.range.is_none() {
            induced.range.clone_from(&self.schema.default_range);
        }
        if induced.inlined_as_list == Some(true) {
            induced.inlined = Some(true);
        }
        if induced.is_identifier() || induced.is_key() {
            induced.required = Some(true);
        }
        induced.owner = Some(class_name.to_string());
        induced.domain_of = self
            .schema
            .classes
            .values()
            .filter(|c| c.slots.iter().any(|s| s == slot_name) || c.attributes.contains_key(slot_name))
            .map(|c| c.name.clone())
            .collect();
        if induced.from_schema.is_none() {
            induced.from_schema = Some(self.schema.id.clone());
        }

        self.write_cache()?
            .cache_induced_slot(class_name, slot_name, induced.clone());
        Ok(induced)
    }

    /// Get the identifier slot of a class, falling back to a key slot when
    /// `use_key` is set
    ///
    /// # Errors
    ///
    /// Returns an error if the class slots cannot be induced.
    pub fn get_identifier_slot(&self, class_name: &str, use_key: bool) -> Result<Option<SlotDefinition>> {
        let slots = self.class_induced_slots(class_name)?;
        if let Some(identifier) = slots.iter().find(|s| s.is_identifier()) {
            return Ok(Some(identifier.clone()));
        }
        if use_key {
            return Ok(slots.into_iter().find(SlotDefinition::is_key));
        }
        Ok(None)
    }

    // === Type Operations ===

    /// A type followed by its `typeof` chain
    ///
    /// # Errors
    ///
    /// Returns an error if a type in the chain does not exist or the chain is
    /// cyclic.
    pub fn type_ancestors(&self, type_name: &str) -> Result<Vec<String>> {
        let mut chain = Vec::new();
        let mut current = Some(type_name.to_string());
        while let Some(name) = current.take() {
            if chain.contains(&name) {
                return Err(SchemaViewError::CircularDependency(format!(
                    "type '{type_name}' has a cyclic typeof chain through '{name}'"
                ))
                .into());
            }
            let definition = self
                .get_type(&name)
                .ok_or_else(|| LinkMLError::not_found("type", name.clone()))?;
            current.clone_from(&definition.typeof_);
            chain.push(name);
        }
        Ok(chain)
    }

    // === URI Operations ===

    /// The CURIE (or, with `expand`, the full URI) of a class
    ///
    /// Uses `class_uri` when declared, else the schema default prefix and the
    /// camel-cased class name.
    ///
    /// # Errors
    ///
    /// Returns an error if the class does not exist or its prefix is unknown.
    pub fn class_uri(&self, class_name: &str, expand: bool) -> Result<String> {
        let class = self.require_class(class_name)?;
        let curie = match &class.class_uri {
            Some(uri) => uri.clone(),
            None => {
                let prefix = self
                    .schema
                    .default_prefix
                    .clone()
                    .unwrap_or_else(|| self.schema.name.clone());
                format!("{prefix}:{}", camelcase(class_name))
            }
        };
        if !expand {
            return Ok(curie);
        }
        match expand_curie(&curie, &self.schema.prefixes) {
            Ok(uri) => Ok(uri),
            // No declared namespace for the default prefix: hang it off the schema id
            Err(_) if class.class_uri.is_none() => Ok(format!(
                "{}/{}",
                self.schema.id.trim_end_matches('/'),
                camelcase(class_name)
            )),
            Err(e) => Err(e),
        }
    }

    // === Cache access ===

    fn read_cache(&self) -> Result<std::sync::RwLockReadGuard<'_, NavigationCache>> {
        self.nav_cache.read().map_err(|_| {
            SchemaViewError::CacheError("Failed to acquire cache read lock".into()).into()
        })
    }

    fn write_cache(&self) -> Result<std::sync::RwLockWriteGuard<'_, NavigationCache>> {
        self.nav_cache.write().map_err(|_| {
            SchemaViewError::CacheError("Failed to acquire cache write lock".into()).into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn view() -> SchemaView {
        let schema = SchemaDefinition::from_yaml(
            r"
id: https://example.org/people
name: people
default_prefix: ex
default_range: string
prefixes:
  ex: https://example.org/people/
slots:
  id:
    identifier: true
  name:
    description: a name
  aliases:
    multivalued: true
  full_name:
    is_a: name
    required: true
classes:
  Named:
    mixin: true
    slots: [name]
  Entity:
    slots: [id]
  Person:
    is_a: Entity
    mixins: [Named]
    slots: [aliases, full_name]
    slot_usage:
      name:
        required: true
  Employee:
    is_a: Person
    attributes:
      salary:
        range: integer
    slot_usage:
      name:
        description: the employee name
",
        )
        .expect("test schema parses");
        SchemaView::new(schema)
    }

    #[test]
    fn test_builtin_types_merged() {
        let view = view();
        assert!(view.get_type("string").is_some());
        assert!(view.get_type("integer").is_some());
        assert!(view.source_schema().types.is_empty());
    }

    #[test]
    fn test_class_ancestors_and_descendants() -> Result<()> {
        let view = view();
        assert_eq!(view.class_ancestors("Employee")?, vec!["Employee", "Person", "Entity", "Named"]);
        assert_eq!(view.class_descendants("Entity", true, true)?, vec!["Entity", "Person", "Employee"]);
        assert_eq!(view.class_descendants("Named", true, false)?, vec!["Person", "Employee"]);
        assert!(view.class_descendants("Named", false, false)?.is_empty());
        assert!(view.is_mixin("Named"));
        assert!(!view.is_mixin("Person"));
        Ok(())
    }

    #[test]
    fn test_class_slots_own_first() -> Result<()> {
        let view = view();
        assert_eq!(
            view.class_slots("Employee")?,
            vec!["salary", "aliases", "full_name", "id", "name"]
        );
        Ok(())
    }

    #[test]
    fn test_induced_slot_applies_usage_and_defaults() -> Result<()> {
        let view = view();

        let name = view.induced_slot("name", "Employee")?;
        assert_eq!(name.required, Some(true));
        assert_eq!(name.description.as_deref(), Some("the employee name"));
        assert_eq!(name.range.as_deref(), Some("string"));
        assert_eq!(name.owner.as_deref(), Some("Employee"));
        assert_eq!(name.domain_of, vec!["Named"]);

        let id = view.induced_slot("id", "Person")?;
        assert_eq!(id.required, Some(true));

        let full_name = view.induced_slot("full_name", "Person")?;
        assert_eq!(full_name.description.as_deref(), Some("a name"));

        let salary = view.induced_slot("salary", "Employee")?;
        assert_eq!(salary.range.as_deref(), Some("integer"));
        Ok(())
    }

    #[test]
    fn test_identifier_slot() -> Result<()> {
        let view = view();
        assert_eq!(
            view.get_identifier_slot("Employee", false)?.map(|s| s.name),
            Some("id".to_string())
        );
        assert!(view.get_identifier_slot("Named", true)?.is_none());
        Ok(())
    }

    #[test]
    fn test_class_uri() -> Result<()> {
        let view = view();
        assert_eq!(view.class_uri("Person", false)?, "ex:Person");
        assert_eq!(view.class_uri("Person", true)?, "https://example.org/people/Person");
        Ok(())
    }

    #[test]
    fn test_missing_class_is_error() {
        let view = view();
        assert!(view.class_ancestors("Nope").is_err());
        assert!(view.induced_slot("nope", "Person").is_err());
    }

    #[test]
    fn test_type_cycle_detected() {
        let mut schema = SchemaDefinition::new("cyclic");
        schema.types.insert(
            "a".to_string(),
            TypeDefinition {
                typeof_: Some("b".to_string()),
                ..TypeDefinition::new("a")
            },
        );
        schema.types.insert(
            "b".to_string(),
            TypeDefinition {
                typeof_: Some("a".to_string()),
                ..TypeDefinition::new("b")
            },
        );
        let view = SchemaView::new(schema);
        assert!(matches!(
            view.type_ancestors("a"),
            Err(LinkMLError::SchemaIntegrityError { .. })
        ));
    }
}
