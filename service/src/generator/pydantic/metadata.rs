//! Metadata inclusion policy
//!
//! Decides which attributes of a schema element are copied into the
//! `linkml_meta` dictionary of the module, class or field generated from it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::template::Meta;
use crate::generator::traits::{GeneratorError, GeneratorResult};

/// How much schema metadata to carry into generated code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MetadataMode {
    /// Every non-empty attribute
    Full,
    /// Every non-empty attribute except child collections
    ExceptChildren,
    /// Only attributes not otherwise represented in the generated code
    #[default]
    Auto,
    /// No metadata
    None,
}

impl MetadataMode {
    /// Accepted spellings, in documentation order
    pub const VARIANTS: [&'static str; 4] = ["full", "except_children", "auto", "none"];

    /// The configuration spelling of this mode
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::ExceptChildren => "except_children",
            Self::Auto => "auto",
            Self::None => "none",
        }
    }
}

impl fmt::Display for MetadataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataMode {
    type Err = GeneratorError;

    fn from_str(s: &str) -> GeneratorResult<Self> {
        match s {
            "full" => Ok(Self::Full),
            "except_children" => Ok(Self::ExceptChildren),
            "auto" => Ok(Self::Auto),
            "none" => Ok(Self::None),
            other => Err(GeneratorError::integrity(format!(
                "unknown metadata mode '{other}', expected one of: {}",
                Self::VARIANTS.join(", ")
            ))),
        }
    }
}

impl TryFrom<String> for MetadataMode {
    type Error = GeneratorError;

    fn try_from(value: String) -> GeneratorResult<Self> {
        value.parse()
    }
}

impl From<MetadataMode> for String {
    fn from(mode: MetadataMode) -> Self {
        mode.as_str().to_string()
    }
}

/// Which generated artifact metadata is being collected for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// The module, sourced from the schema
    Module,
    /// A class, sourced from a class definition
    Class,
    /// A field, sourced from an induced slot
    Field,
}

impl ArtifactKind {
    /// Fields of the generated model; in `auto` mode these are already
    /// represented in the output
    fn model_fields(self) -> &'static [&'static str] {
        match self {
            Self::Module => &[
                "metamodel_version",
                "version",
                "python_imports",
                "base_model",
                "injected_classes",
                "enums",
                "classes",
                "meta",
            ],
            Self::Class => &["name", "bases", "description", "attributes", "meta"],
            Self::Field => &[
                "name",
                "required",
                "identifier",
                "key",
                "predefined",
                "range",
                "title",
                "description",
                "equals_number",
                "minimum_value",
                "maximum_value",
                "pattern",
                "meta",
            ],
        }
    }

    /// Source attributes never copied in `auto` mode
    fn meta_exclude(self) -> &'static [&'static str] {
        match self {
            Self::Module => &["slots"],
            Self::Class => &["slots", "is_a"],
            Self::Field => &["from_schema", "owner", "range", "inlined", "inlined_as_list"],
        }
    }

    /// Source attributes that generate child artifacts of their own
    fn children(self) -> &'static [&'static str] {
        match self {
            Self::Module => &["classes", "slots", "enums"],
            Self::Class => &["attributes"],
            Self::Field => &[],
        }
    }
}

/// Recursively drop nulls, empty strings, empty lists and empty maps
///
/// Returns `None` when nothing is left.
#[must_use]
pub fn remove_empty_items(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(items) => {
            let items: Vec<Value> = items.into_iter().filter_map(remove_empty_items).collect();
            (!items.is_empty()).then_some(Value::Array(items))
        }
        Value::Object(map) => {
            let map: serde_json::Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| remove_empty_items(v).map(|v| (k, v)))
                .collect();
            (!map.is_empty()).then_some(Value::Object(map))
        }
        other => Some(other),
    }
}

/// Collect the metadata dictionary for one artifact
///
/// `source` is the schema element the artifact was generated from. Returns
/// `None` when the mode is `none` or nothing survives filtering.
///
/// # Errors
///
/// Returns an error if `source` cannot be serialized.
pub fn include_metadata<T: Serialize>(
    mode: MetadataMode,
    kind: ArtifactKind,
    source: &T,
) -> GeneratorResult<Option<Meta>> {
    if mode == MetadataMode::None {
        return Ok(None);
    }

    let value = serde_json::to_value(source)
        .map_err(|e| GeneratorError::Template(format!("cannot serialize metadata: {e}")))?;
    let Some(Value::Object(cleaned)) = remove_empty_items(value) else {
        return Ok(None);
    };

    let meta: Meta = cleaned
        .into_iter()
        .filter(|(key, _)| match mode {
            MetadataMode::Full => true,
            MetadataMode::ExceptChildren => !kind.children().contains(&key.as_str()),
            MetadataMode::Auto => {
                !kind.model_fields().contains(&key.as_str())
                    && !kind.meta_exclude().contains(&key.as_str())
            }
            MetadataMode::None => false,
        })
        .collect();

    Ok((!meta.is_empty()).then_some(meta))
}
