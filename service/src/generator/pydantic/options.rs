//! Options for the Pydantic generator

use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::array::ArrayRepresentation;
use super::metadata::MetadataMode;
use super::template::Import;
use crate::generator::traits::{GeneratorError, GeneratorResult};

/// Pydantic policy for fields not declared on a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExtraFields {
    /// Keep undeclared fields
    Allow,
    /// Reject undeclared fields
    #[default]
    Forbid,
    /// Drop undeclared fields silently
    Ignore,
}

impl fmt::Display for ExtraFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Allow => "allow",
            Self::Forbid => "forbid",
            Self::Ignore => "ignore",
        })
    }
}

/// Configuration of a [`super::PydanticGenerator`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PydanticGeneratorOptions {
    /// Representations generated for array slots; several become a union
    pub array_representations: Vec<ArrayRepresentation>,

    /// Pydantic `extra` policy of the base model
    pub extra_fields: ExtraFields,

    /// Whether mixins become Python base classes
    pub gen_mixin_inheritance: bool,

    /// Class definitions copied verbatim into the module
    pub injected_classes: Vec<String>,

    /// Field definitions copied verbatim into the base model
    pub injected_fields: Vec<String>,

    /// Imports added to the module
    pub imports: Vec<Import>,

    /// How much schema metadata to carry into the output
    pub metadata_mode: MetadataMode,

    /// Directory of `<name>.py.tmpl` template overrides
    pub template_dir: Option<PathBuf>,

    /// Single template file; no longer supported, use `template_dir`
    pub template_file: Option<PathBuf>,

    /// Normalize blank lines and whitespace of the output
    pub format_output: bool,

    /// Field defaults keyed by generated class name, then slot name; these
    /// replace computed defaults
    pub predefined_slot_values: IndexMap<String, IndexMap<String, String>>,
}

impl Default for PydanticGeneratorOptions {
    fn default() -> Self {
        Self {
            array_representations: vec![ArrayRepresentation::List],
            extra_fields: ExtraFields::default(),
            gen_mixin_inheritance: true,
            injected_classes: Vec::new(),
            injected_fields: Vec::new(),
            imports: Vec::new(),
            metadata_mode: MetadataMode::default(),
            template_dir: None,
            template_file: None,
            format_output: true,
            predefined_slot_values: IndexMap::new(),
        }
    }
}

impl PydanticGeneratorOptions {
    /// Check the options can be honoured
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Configuration`] when `template_file` is set
    /// or `template_dir` does not exist.
    pub fn validate(&self) -> GeneratorResult<()> {
        if let Some(file) = &self.template_file {
            return Err(GeneratorError::configuration(format!(
                "template_file ({}) is no longer supported; put overrides in a template_dir instead",
                file.display()
            )));
        }
        if let Some(dir) = &self.template_dir {
            if !dir.is_dir() {
                return Err(GeneratorError::configuration(format!(
                    "template directory {} does not exist",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}
