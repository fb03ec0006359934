//! Rendering of the intermediate models into Python source
//!
//! Every model has a built-in renderer. A template directory may override
//! any of them with a `<name>.py.tmpl` file; `{{ key }}` placeholders in an
//! override are replaced with the pieces listed in [`TEMPLATE_KEYS`].
//! Nested models are rendered first, so an override of `attribute` also
//! applies inside the built-in `class` renderer.

use indexmap::IndexMap;
use regex::Regex;
use std::fmt::Write;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;
use walkdir::WalkDir;

use super::template::{
    Import, Imports, PydanticAttribute, PydanticBaseModel, PydanticClass, PydanticEnum, PydanticModule,
};
use crate::generator::base::BaseCodeFormatter;
use crate::generator::traits::{GeneratorError, GeneratorResult, IndentStyle};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("Valid placeholder pattern"));

/// File suffix of override templates
pub const TEMPLATE_SUFFIX: &str = ".py.tmpl";

/// Template names and the placeholders each provides
pub const TEMPLATE_KEYS: [(&str, &[&str]); 6] = [
    ("imports", &["imports"]),
    (
        "attribute",
        &["name", "range", "field", "title", "description", "constraints", "meta", "validator"],
    ),
    ("class", &["name", "bases", "description", "meta", "attributes"]),
    ("enum", &["name", "description", "values"]),
    ("base_model", &["name", "extra_fields", "strict", "fields"]),
    (
        "module",
        &[
            "imports",
            "metamodel_version",
            "version",
            "base_model",
            "injected_classes",
            "meta",
            "enums",
            "classes",
            "rebuilds",
        ],
    ),
];

type Context = IndexMap<&'static str, String>;

fn fmt_error_to_generator_error(e: std::fmt::Error) -> GeneratorError {
    GeneratorError::Io(std::io::Error::other(e))
}

/// Renders models with built-in templates and optional overrides
#[derive(Debug, Clone, Default)]
pub struct TemplateEnvironment {
    overrides: IndexMap<String, String>,
    indent: IndentStyle,
}

impl TemplateEnvironment {
    /// Environment with built-in templates only
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment whose templates are overridden by `<name>.py.tmpl` files
    /// found directly in `dir`
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Configuration`] if `dir` is not a directory
    /// and [`GeneratorError::Io`] if a template cannot be read.
    pub fn with_template_dir(dir: &Path) -> GeneratorResult<Self> {
        if !dir.is_dir() {
            return Err(GeneratorError::configuration(format!(
                "template directory {} does not exist",
                dir.display()
            )));
        }

        let mut env = Self::new();
        for entry in WalkDir::new(dir).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| GeneratorError::Io(std::io::Error::other(e)))?;
            let file_name = entry.file_name().to_string_lossy();
            let Some(name) = file_name.strip_suffix(TEMPLATE_SUFFIX) else {
                continue;
            };
            if !TEMPLATE_KEYS.iter().any(|(known, _)| *known == name) {
                debug!(template = name, "ignoring unknown template override");
                continue;
            }
            let text = std::fs::read_to_string(entry.path())?;
            debug!(template = name, path = %entry.path().display(), "loaded template override");
            env.overrides.insert(name.to_string(), text);
        }
        Ok(env)
    }

    /// Names of the overridden templates
    pub fn overridden(&self) -> impl Iterator<Item = &str> {
        self.overrides.keys().map(String::as_str)
    }

    fn indent_block(&self, text: &str) -> String {
        BaseCodeFormatter::indent(text, &self.indent.single())
    }

    /// Render with the override for `name` if there is one
    fn apply(&self, name: &str, context: &Context) -> Option<GeneratorResult<String>> {
        let template = self.overrides.get(name)?;
        let mut missing: Option<String> = None;
        let rendered = PLACEHOLDER.replace_all(template, |caps: &regex::Captures<'_>| {
            let key = &caps[1];
            context.get(key).cloned().unwrap_or_else(|| {
                missing.get_or_insert_with(|| key.to_string());
                String::new()
            })
        });
        Some(match missing {
            Some(key) => Err(GeneratorError::Template(format!(
                "template '{name}' uses unknown placeholder '{key}', available: {}",
                context.keys().copied().collect::<Vec<_>>().join(", ")
            ))),
            None => Ok(rendered.into_owned()),
        })
    }

    // === Imports ===

    fn import_line(import: &Import) -> String {
        let alias = |a: &Option<String>| a.as_ref().map(|a| format!(" as {a}")).unwrap_or_default();
        match import.objects.as_slice() {
            [] => format!("import {}{}", import.module, alias(&import.alias)),
            [single] => format!("from {} import {}{}", import.module, single.name, alias(&single.alias)),
            objects => {
                let mut line = format!("from {} import (\n", import.module);
                for object in objects {
                    line.push_str(&format!("    {}{},\n", object.name, alias(&object.alias)));
                }
                line.push(')');
                line
            }
        }
    }

    /// Render an import list
    ///
    /// # Errors
    ///
    /// Returns an error if an override template is invalid.
    pub fn render_imports(&self, imports: &Imports) -> GeneratorResult<String> {
        let lines: Vec<String> = imports.iter().map(Self::import_line).collect();
        let text = lines.join("\n");
        let context: Context = IndexMap::from([("imports", text.clone())]);
        self.apply("imports", &context).unwrap_or(Ok(text))
    }

    // === Attribute ===

    fn attribute_context(attr: &PydanticAttribute) -> Context {
        let title = attr
            .title
            .as_ref()
            .map(|t| format!(", title={}", BaseCodeFormatter::python_string(t)))
            .unwrap_or_default();
        let description = attr
            .description
            .as_ref()
            .map(|d| format!(", description=\"\"\"{d}\"\"\""))
            .unwrap_or_default();

        let constraints = match attr.equals_number {
            Some(n) => format!(", le={n}, ge={n}"),
            None => {
                let mut c = String::new();
                if let Some(min) = &attr.minimum_value {
                    c.push_str(&format!(", ge={}", BaseCodeFormatter::python_literal(min)));
                }
                if let Some(max) = &attr.maximum_value {
                    c.push_str(&format!(", le={}", BaseCodeFormatter::python_literal(max)));
                }
                c
            }
        };

        let meta = attr
            .meta
            .as_ref()
            .map(|m| {
                let value = serde_json::Value::Object(m.clone().into_iter().collect());
                format!(
                    ", json_schema_extra = {{ \"linkml_meta\": {} }}",
                    BaseCodeFormatter::python_literal(&value)
                )
            })
            .unwrap_or_default();

        let validator = attr
            .pattern
            .as_ref()
            .map(|pattern| {
                let name = &attr.name;
                let pattern = BaseCodeFormatter::python_string(pattern);
                format!(
                    "@field_validator('{name}')\n\
                     def pattern_{name}(cls, v):\n    \
                         pattern=re.compile({pattern})\n    \
                         if isinstance(v, list):\n        \
                             for element in v:\n            \
                                 if isinstance(element, str) and not pattern.match(element):\n                \
                                     raise ValueError(f\"Invalid {name} format: {{element}}\")\n    \
                         elif isinstance(v, str):\n        \
                             if not pattern.match(v):\n            \
                                 raise ValueError(f\"Invalid {name} format: {{v}}\")\n    \
                         return v"
                )
            })
            .unwrap_or_default();

        IndexMap::from([
            ("name", attr.name.clone()),
            ("range", attr.range.clone().unwrap_or_else(|| "Any".to_string())),
            ("field", attr.field()),
            ("title", title),
            ("description", description),
            ("constraints", constraints),
            ("meta", meta),
            ("validator", validator),
        ])
    }

    /// Render one field, followed by its pattern validator if any
    ///
    /// # Errors
    ///
    /// Returns an error if an override template is invalid.
    pub fn render_attribute(&self, attr: &PydanticAttribute) -> GeneratorResult<String> {
        let context = Self::attribute_context(attr);
        if let Some(rendered) = self.apply("attribute", &context) {
            return rendered;
        }

        let mut out = format!(
            "{}: {} = Field({}{}{}{}{})",
            context["name"],
            context["range"],
            context["field"],
            context["title"],
            context["description"],
            context["constraints"],
            context["meta"]
        );
        if !context["validator"].is_empty() {
            out.push_str("\n\n");
            out.push_str(&context["validator"]);
        }
        Ok(out)
    }

    // === Class ===

    /// Render one class with its fields
    ///
    /// # Errors
    ///
    /// Returns an error if an override template is invalid.
    pub fn render_class(&self, class: &PydanticClass) -> GeneratorResult<String> {
        let attributes = class
            .attributes
            .values()
            .map(|a| self.render_attribute(a))
            .collect::<GeneratorResult<Vec<_>>>()?;

        let meta = class
            .meta
            .as_ref()
            .map(|m| {
                let value = serde_json::Value::Object(m.clone().into_iter().collect());
                format!(
                    "linkml_meta: ClassVar[LinkMLMeta] = LinkMLMeta({})",
                    BaseCodeFormatter::python_literal(&value)
                )
            })
            .unwrap_or_default();

        let context: Context = IndexMap::from([
            ("name", class.name.clone()),
            ("bases", class.bases.join(", ")),
            ("description", class.description.clone().unwrap_or_default()),
            ("meta", meta),
            ("attributes", attributes.join("\n")),
        ]);
        if let Some(rendered) = self.apply("class", &context) {
            return rendered;
        }

        let mut out = String::new();
        writeln!(out, "class {}({}):", context["name"], context["bases"])
            .map_err(fmt_error_to_generator_error)?;
        let mut body: Vec<String> = Vec::new();
        if !context["description"].is_empty() {
            body.push(format!("\"\"\"\n{}\n\"\"\"", context["description"]));
        }
        if !context["meta"].is_empty() {
            body.push(context["meta"].clone());
        }
        body.extend(attributes);
        if body.is_empty() {
            body.push("pass".to_string());
        }
        write!(out, "{}", self.indent_block(&body.join("\n\n"))).map_err(fmt_error_to_generator_error)?;
        Ok(out)
    }

    // === Enum ===

    /// Render a `str` enum
    ///
    /// # Errors
    ///
    /// Returns an error if an override template is invalid.
    pub fn render_enum(&self, enum_def: &PydanticEnum) -> GeneratorResult<String> {
        let values: Vec<String> = enum_def
            .values
            .values()
            .map(|v| {
                let member = format!("{} = {}", v.label, BaseCodeFormatter::python_string(&v.value));
                match &v.description {
                    Some(d) => format!("{member}\n\"\"\"\n{d}\n\"\"\""),
                    None => member,
                }
            })
            .collect();

        let context: Context = IndexMap::from([
            ("name", enum_def.name.clone()),
            ("description", enum_def.description.clone().unwrap_or_default()),
            ("values", values.join("\n")),
        ]);
        if let Some(rendered) = self.apply("enum", &context) {
            return rendered;
        }

        let mut out = String::new();
        let base = if values.is_empty() { "str" } else { "str, Enum" };
        writeln!(out, "class {}({base}):", context["name"]).map_err(fmt_error_to_generator_error)?;
        let mut body: Vec<String> = Vec::new();
        if !context["description"].is_empty() {
            body.push(format!("\"\"\"\n{}\n\"\"\"", context["description"]));
        }
        body.extend(values);
        if body.is_empty() || enum_def.values.is_empty() {
            body.push("pass".to_string());
        }
        write!(out, "{}", self.indent_block(&body.join("\n"))).map_err(fmt_error_to_generator_error)?;
        Ok(out)
    }

    // === Base model ===

    /// Render the shared base model
    ///
    /// # Errors
    ///
    /// Returns an error if an override template is invalid.
    pub fn render_base_model(&self, base: &PydanticBaseModel) -> GeneratorResult<String> {
        let strict = if base.strict { "True" } else { "False" };
        let context: Context = IndexMap::from([
            ("name", base.name.clone()),
            ("extra_fields", base.extra_fields.clone()),
            ("strict", strict.to_string()),
            ("fields", base.fields.join("\n")),
        ]);
        if let Some(rendered) = self.apply("base_model", &context) {
            return rendered;
        }

        let mut out = String::new();
        writeln!(out, "class {}(BaseModel):", base.name).map_err(fmt_error_to_generator_error)?;
        writeln!(out, "    model_config = ConfigDict(").map_err(fmt_error_to_generator_error)?;
        writeln!(out, "        validate_assignment = True,").map_err(fmt_error_to_generator_error)?;
        writeln!(out, "        validate_default = True,").map_err(fmt_error_to_generator_error)?;
        writeln!(out, "        extra = \"{}\",", base.extra_fields).map_err(fmt_error_to_generator_error)?;
        writeln!(out, "        arbitrary_types_allowed = True,").map_err(fmt_error_to_generator_error)?;
        writeln!(out, "        use_enum_values = True,").map_err(fmt_error_to_generator_error)?;
        writeln!(out, "        strict = {strict},").map_err(fmt_error_to_generator_error)?;
        writeln!(out, "    )").map_err(fmt_error_to_generator_error)?;
        if base.fields.is_empty() {
            write!(out, "    pass").map_err(fmt_error_to_generator_error)?;
        } else {
            let fields: Vec<String> = base.fields.iter().map(|f| BaseCodeFormatter::dedent(f)).collect();
            writeln!(out).map_err(fmt_error_to_generator_error)?;
            write!(out, "{}", self.indent_block(&fields.join("\n"))).map_err(fmt_error_to_generator_error)?;
        }
        Ok(out)
    }

    // === Module ===

    /// Render a complete module
    ///
    /// # Errors
    ///
    /// Returns an error if an override template is invalid.
    pub fn render_module(&self, module: &PydanticModule) -> GeneratorResult<String> {
        let enums = module
            .enums
            .values()
            .map(|e| self.render_enum(e))
            .collect::<GeneratorResult<Vec<_>>>()?;
        let classes = module
            .classes
            .values()
            .map(|c| self.render_class(c))
            .collect::<GeneratorResult<Vec<_>>>()?;
        let rebuilds: Vec<String> = module
            .classes
            .values()
            .map(|c| format!("{}.model_rebuild()", c.name))
            .collect();
        let meta = module
            .meta
            .as_ref()
            .map(|m| {
                let value = serde_json::Value::Object(m.clone().into_iter().collect());
                format!("linkml_meta = LinkMLMeta({})", BaseCodeFormatter::python_literal(&value))
            })
            .unwrap_or_default();

        let context: Context = IndexMap::from([
            ("imports", self.render_imports(&module.python_imports)?),
            (
                "metamodel_version",
                module.metamodel_version.clone().unwrap_or_else(|| "None".to_string()),
            ),
            ("version", module.version.clone().unwrap_or_else(|| "None".to_string())),
            ("base_model", self.render_base_model(&module.base_model)?),
            ("injected_classes", module.injected_classes.join("\n\n\n")),
            ("meta", meta),
            ("enums", enums.join("\n\n\n")),
            ("classes", classes.join("\n\n\n")),
            ("rebuilds", rebuilds.join("\n")),
        ]);
        if let Some(rendered) = self.apply("module", &context) {
            return rendered;
        }

        let mut sections: Vec<String> = vec![
            context["imports"].clone(),
            format!(
                "metamodel_version = \"{}\"\nversion = \"{}\"",
                context["metamodel_version"], context["version"]
            ),
            context["base_model"].clone(),
        ];
        for key in ["injected_classes", "meta", "enums", "classes"] {
            if !context[key].is_empty() {
                sections.push(context[key].clone());
            }
        }
        sections.push(format!(
            "# Model rebuild\n# see https://pydantic-docs.helpmanual.io/usage/models/#rebuilding-a-model\n{}",
            context["rebuilds"]
        ));

        let mut out = sections.join("\n\n\n");
        out.push('\n');
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::pydantic::template::{PydanticEnumValue, default_imports};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn attribute() -> PydanticAttribute {
        PydanticAttribute {
            name: "age".to_string(),
            range: Some("Optional[int]".to_string()),
            description: Some("Age in years".to_string()),
            minimum_value: Some(json!(0)),
            maximum_value: Some(json!(200)),
            meta: Some(IndexMap::from([("domain_of".to_string(), json!(["Person"]))])),
            ..PydanticAttribute::default()
        }
    }

    #[test]
    fn test_attribute_line() -> GeneratorResult<()> {
        let env = TemplateEnvironment::new();
        assert_eq!(
            env.render_attribute(&attribute())?,
            "age: Optional[int] = Field(None, description=\"\"\"Age in years\"\"\", ge=0, le=200, json_schema_extra = { \"linkml_meta\": {'domain_of': ['Person']} })"
        );
        Ok(())
    }

    #[test]
    fn test_attribute_pattern_validator() -> GeneratorResult<()> {
        let env = TemplateEnvironment::new();
        let attr = PydanticAttribute {
            name: "code".to_string(),
            range: Some("str".to_string()),
            required: Some(true),
            pattern: Some(r"^\d+$".to_string()),
            ..PydanticAttribute::default()
        };
        let text = env.render_attribute(&attr)?;
        assert!(text.starts_with("code: str = Field(...)\n\n@field_validator('code')\ndef pattern_code(cls, v):\n"));
        assert!(text.contains("pattern=re.compile(\"^\\\\d+$\")"));
        Ok(())
    }

    #[test]
    fn test_class_and_empty_class() -> GeneratorResult<()> {
        let env = TemplateEnvironment::new();
        let mut class = PydanticClass {
            name: "Person".to_string(),
            bases: vec!["ConfiguredBaseModel".to_string()],
            ..PydanticClass::default()
        };
        assert_eq!(env.render_class(&class)?, "class Person(ConfiguredBaseModel):\n    pass");

        class.attributes.insert("age".to_string(), attribute());
        class.description = Some("A person".to_string());
        let text = env.render_class(&class)?;
        assert!(text.starts_with("class Person(ConfiguredBaseModel):\n    \"\"\"\n    A person\n    \"\"\"\n\n    age: Optional[int]"));
        Ok(())
    }

    #[test]
    fn test_enum() -> GeneratorResult<()> {
        let env = TemplateEnvironment::new();
        let mut e = PydanticEnum {
            name: "Color".to_string(),
            ..PydanticEnum::default()
        };
        e.values.insert(
            "dark_blue".to_string(),
            PydanticEnumValue {
                label: "dark_blue".to_string(),
                value: "dark blue".to_string(),
                description: None,
            },
        );
        assert_eq!(env.render_enum(&e)?, "class Color(str, Enum):\n    dark_blue = \"dark blue\"");
        e.values.clear();
        assert_eq!(env.render_enum(&e)?, "class Color(str):\n    pass");
        Ok(())
    }

    #[test]
    fn test_imports() -> GeneratorResult<()> {
        let env = TemplateEnvironment::new();
        let text = env.render_imports(&default_imports())?;
        assert!(text.starts_with("from __future__ import annotations\nfrom datetime import (\n    datetime,\n    date,\n)\n"));
        assert!(text.contains("\nimport re\nimport sys\n"));
        Ok(())
    }

    #[test]
    fn test_override_directory() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join("class.py.tmpl"),
            "class {{ name }}({{bases}}):\n    # custom\n    pass",
        )?;
        std::fs::write(dir.path().join("notes.txt"), "ignored")?;

        let env = TemplateEnvironment::with_template_dir(dir.path())?;
        assert_eq!(env.overridden().collect::<Vec<_>>(), vec!["class"]);
        let class = PydanticClass {
            name: "Thing".to_string(),
            bases: vec!["ConfiguredBaseModel".to_string()],
            ..PydanticClass::default()
        };
        assert_eq!(env.render_class(&class)?, "class Thing(ConfiguredBaseModel):\n    # custom\n    pass");

        std::fs::write(dir.path().join("enum.py.tmpl"), "{{ nonsense }}")?;
        let env = TemplateEnvironment::with_template_dir(dir.path())?;
        assert!(matches!(env.render_enum(&PydanticEnum::default()), Err(GeneratorError::Template(_))));
        Ok(())
    }

    #[test]
    fn test_missing_template_dir() {
        let result = TemplateEnvironment::with_template_dir(Path::new("/nonexistent/templates"));
        assert!(matches!(result, Err(GeneratorError::Configuration(_))));
    }
}
