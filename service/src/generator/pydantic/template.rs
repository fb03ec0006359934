//! Intermediate models handed to the renderer
//!
//! Each model corresponds to one template (see [`super::render`]). They are
//! plain data: the generator fills them in, the renderer turns them into
//! Python source.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::{Add, AddAssign};

/// Metadata dictionary attached to a module, class or field
pub type Meta = IndexMap<String, Value>;

/// An object imported from a module (`from module import name as alias`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectImport {
    /// Imported object name
    pub name: String,
    /// Optional local alias
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl ObjectImport {
    /// Import `name` without an alias
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }
}

/// A Python import statement
///
/// Without objects this is `import module [as alias]`, otherwise
/// `from module import a, b`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    /// Module path
    pub module: String,
    /// Module alias, only for plain imports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Objects imported from the module
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<ObjectImport>,
}

impl Import {
    /// `import module`
    #[must_use]
    pub fn module(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            alias: None,
            objects: Vec::new(),
        }
    }

    /// `from module import objects...`
    #[must_use]
    pub fn from_objects(module: impl Into<String>, objects: &[&str]) -> Self {
        Self {
            module: module.into(),
            alias: None,
            objects: objects.iter().map(|o| ObjectImport::new(*o)).collect(),
        }
    }
}

/// Ordered, mergeable collection of imports
///
/// Adding an import for a module that is already present merges the object
/// lists (first occurrence wins, order preserved). A plain import of an
/// already-imported module with the same alias is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Imports {
    imports: Vec<Import>,
}

impl Imports {
    /// Empty import list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one import, merging with an existing import of the same module
    pub fn push(&mut self, import: Import) {
        let existing = self.imports.iter_mut().find(|i| {
            i.module == import.module
                && ((!i.objects.is_empty() && !import.objects.is_empty())
                    || (i.objects.is_empty() && import.objects.is_empty() && i.alias == import.alias))
        });

        match existing {
            Some(current) => {
                for object in import.objects {
                    if !current.objects.iter().any(|o| o.name == object.name) {
                        current.objects.push(object);
                    }
                }
            }
            None => self.imports.push(import),
        }
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Import> {
        self.imports.iter()
    }

    /// Number of distinct import statements
    #[must_use]
    pub fn len(&self) -> usize {
        self.imports.len()
    }

    /// Whether there are no imports
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// Find the import of a module
    #[must_use]
    pub fn get(&self, module: &str) -> Option<&Import> {
        self.imports.iter().find(|i| i.module == module)
    }
}

impl FromIterator<Import> for Imports {
    fn from_iter<I: IntoIterator<Item = Import>>(iter: I) -> Self {
        let mut imports = Imports::new();
        for import in iter {
            imports.push(import);
        }
        imports
    }
}

impl<'a> IntoIterator for &'a Imports {
    type Item = &'a Import;
    type IntoIter = std::slice::Iter<'a, Import>;

    fn into_iter(self) -> Self::IntoIter {
        self.imports.iter()
    }
}

impl Add<Import> for Imports {
    type Output = Imports;

    fn add(mut self, rhs: Import) -> Imports {
        self.push(rhs);
        self
    }
}

impl AddAssign<Import> for Imports {
    fn add_assign(&mut self, rhs: Import) {
        self.push(rhs);
    }
}

impl AddAssign<Imports> for Imports {
    fn add_assign(&mut self, rhs: Imports) {
        for import in rhs.imports {
            self.push(import);
        }
    }
}

/// The imports every generated module starts with
#[must_use]
pub fn default_imports() -> Imports {
    Imports::new()
        + Import::from_objects("__future__", &["annotations"])
        + Import::from_objects("datetime", &["datetime", "date"])
        + Import::from_objects("decimal", &["Decimal"])
        + Import::from_objects("enum", &["Enum"])
        + Import::module("re")
        + Import::module("sys")
        + Import::from_objects(
            "typing",
            &["Any", "ClassVar", "List", "Literal", "Dict", "Optional", "Union"],
        )
        + Import::from_objects(
            "pydantic",
            &["BaseModel", "ConfigDict", "Field", "RootModel", "field_validator"],
        )
}

/// Root model holding the `linkml_meta` dictionaries, injected into every
/// generated module
pub const LINKML_META: &str = r"class LinkMLMeta(RootModel):
    root: Dict[str, Any] = {}
    model_config = ConfigDict(frozen=True)

    def __getattr__(self, key:str):
        return getattr(self.root, key)

    def __getitem__(self, key:str):
        return self.root[key]

    def __setitem__(self, key:str, value):
        self.root[key] = value

    def __contains__(self, key:str) -> bool:
        return key in self.root
";

/// A generated model field
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PydanticAttribute {
    /// Python field name
    pub name: String,
    /// Field type expression, e.g. `Optional[List[str]]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<bool>,
    /// Default expression placed first in `Field(...)`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predefined: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equals_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl PydanticAttribute {
    /// The first argument of `Field(...)`: the predefined value, `...` for
    /// required fields, else `None`
    #[must_use]
    pub fn field(&self) -> String {
        if let Some(predefined) = &self.predefined {
            return predefined.clone();
        }
        let mandatory = [self.required, self.identifier, self.key]
            .iter()
            .any(|flag| flag.unwrap_or(false));
        if mandatory {
            "...".to_string()
        } else {
            "None".to_string()
        }
    }
}

/// A generated model class
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PydanticClass {
    /// Python class name
    pub name: String,
    /// Base classes, in declaration order
    pub bases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fields keyed by Python field name
    pub attributes: IndexMap<String, PydanticAttribute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

/// One member of a generated enum
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PydanticEnumValue {
    /// Python identifier
    pub label: String,
    /// Underlying string value
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A generated `str` enum
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PydanticEnum {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Members keyed by label
    pub values: IndexMap<String, PydanticEnumValue>,
}

/// The shared base class every generated class without parents derives from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PydanticBaseModel {
    pub name: String,
    /// Pydantic `extra` policy: `allow`, `forbid` or `ignore`
    pub extra_fields: String,
    /// Whether to validate in strict mode
    pub strict: bool,
    /// Extra field definitions injected verbatim
    pub fields: Vec<String>,
}

impl Default for PydanticBaseModel {
    fn default() -> Self {
        Self {
            name: "ConfiguredBaseModel".to_string(),
            extra_fields: "forbid".to_string(),
            strict: false,
            fields: Vec::new(),
        }
    }
}

/// A complete generated module
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PydanticModule {
    pub metamodel_version: Option<String>,
    pub version: Option<String>,
    pub python_imports: Imports,
    pub base_model: PydanticBaseModel,
    /// Verbatim class definitions, deduplicated and dedented
    pub injected_classes: Vec<String>,
    pub enums: IndexMap<String, PydanticEnum>,
    pub classes: IndexMap<String, PydanticClass>,
    pub meta: Option<Meta>,
}

/// Accumulated side effects of building one artifact
pub trait BuildResult: Sized {
    /// Imports requested while building
    fn imports_mut(&mut self) -> &mut Option<Imports>;

    /// Verbatim classes requested while building
    fn injected_classes_mut(&mut self) -> &mut Option<Vec<String>>;

    /// Fold another result's imports and injected classes into this one
    #[must_use]
    fn merge<O: BuildResult>(mut self, mut other: O) -> Self {
        if let Some(imports) = other.imports_mut().take() {
            match self.imports_mut() {
                Some(existing) => *existing += imports,
                slot @ None => *slot = Some(imports),
            }
        }
        if let Some(injected) = other.injected_classes_mut().take() {
            let existing = self.injected_classes_mut().get_or_insert_with(Vec::new);
            for class in injected {
                if !existing.contains(&class) {
                    existing.push(class);
                }
            }
        }
        self
    }
}

/// A built field plus its side effects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotResult {
    pub attribute: PydanticAttribute,
    pub imports: Option<Imports>,
    pub injected_classes: Option<Vec<String>>,
}

impl SlotResult {
    /// Wrap an attribute with no side effects
    #[must_use]
    pub fn new(attribute: PydanticAttribute) -> Self {
        Self {
            attribute,
            imports: None,
            injected_classes: None,
        }
    }
}

impl BuildResult for SlotResult {
    fn imports_mut(&mut self) -> &mut Option<Imports> {
        &mut self.imports
    }

    fn injected_classes_mut(&mut self) -> &mut Option<Vec<String>> {
        &mut self.injected_classes
    }
}

/// A built class plus its side effects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassResult {
    pub cls: PydanticClass,
    pub imports: Option<Imports>,
    pub injected_classes: Option<Vec<String>>,
}

impl BuildResult for ClassResult {
    fn imports_mut(&mut self) -> &mut Option<Imports> {
        &mut self.imports
    }

    fn injected_classes_mut(&mut self) -> &mut Option<Vec<String>> {
        &mut self.injected_classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_imports_merge_objects() {
        let imports = Imports::new()
            + Import::from_objects("typing", &["List", "Dict"])
            + Import::module("re")
            + Import::from_objects("typing", &["Dict", "Union"])
            + Import::module("re");

        assert_eq!(imports.len(), 2);
        let typing: Vec<&str> = imports
            .get("typing")
            .map(|i| i.objects.iter().map(|o| o.name.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(typing, vec!["List", "Dict", "Union"]);
    }

    #[test]
    fn test_plain_import_with_alias_kept_separately() {
        let imports = Imports::new()
            + Import::module("numpy")
            + Import {
                alias: Some("np".to_string()),
                ..Import::module("numpy")
            };
        assert_eq!(imports.len(), 2);
    }

    #[test]
    fn test_default_imports_order() {
        let modules: Vec<String> = default_imports().iter().map(|i| i.module.clone()).collect();
        assert_eq!(
            modules,
            vec!["__future__", "datetime", "decimal", "enum", "re", "sys", "typing", "pydantic"]
        );
    }

    #[test]
    fn test_attribute_field_argument() {
        let mut attr = PydanticAttribute {
            name: "id".to_string(),
            identifier: Some(true),
            ..PydanticAttribute::default()
        };
        assert_eq!(attr.field(), "...");

        attr.identifier = None;
        assert_eq!(attr.field(), "None");

        attr.predefined = Some("default_factory=list".to_string());
        assert_eq!(attr.field(), "default_factory=list");
    }

    #[test]
    fn test_build_result_merge() {
        let base = ClassResult::default();
        let slot = SlotResult {
            imports: Some(Imports::new() + Import::from_objects("numpydantic", &["NDArray"])),
            injected_classes: Some(vec!["class A: pass".to_string()]),
            ..SlotResult::default()
        };
        let again = SlotResult {
            imports: Some(Imports::new() + Import::from_objects("numpydantic", &["Shape"])),
            injected_classes: Some(vec!["class A: pass".to_string()]),
            ..SlotResult::default()
        };

        let merged = base.merge(slot).merge(again);
        let imports = merged.imports.unwrap_or_default();
        assert_eq!(imports.len(), 1);
        assert_eq!(imports.get("numpydantic").map(|i| i.objects.len()), Some(2));
        assert_eq!(merged.injected_classes.map(|c| c.len()), Some(1));
    }
}
