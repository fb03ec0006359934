//! Configuration loading for the generator
//!
//! Configuration files are YAML with `${VAR}` / `${VAR:-default}`
//! environment substitution applied before parsing.

use linkml_core::{LinkMLError, Result};
use regex::{Captures, Regex};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::sync::LazyLock;

use crate::generator::pydantic::PydanticGeneratorOptions;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}:]+)(?::(-)?([^}]*))?\}").expect("Valid environment variable pattern")
});

/// Load configuration from `YAML` file with environment variable substitution
///
/// # Errors
///
/// Returns `LinkMLError::IoError` if the file cannot be read
/// Returns `LinkMLError::ConfigError` if the YAML cannot be parsed
pub fn load_config<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path).map_err(LinkMLError::IoError)?;
    parse_config(&contents)
}

/// Parse configuration text, substituting environment variables first
///
/// # Errors
///
/// Returns `LinkMLError::ConfigError` if the YAML cannot be parsed
pub fn parse_config<T: for<'de> Deserialize<'de>>(contents: &str) -> Result<T> {
    let substituted = substitute_env_vars(contents);
    serde_yaml::from_str(&substituted)
        .map_err(|e| LinkMLError::ConfigError(format!("Failed to parse YAML config: {e}")))
}

/// Load and check generator options
///
/// An empty file yields the default options.
///
/// # Errors
///
/// Returns `LinkMLError::ConfigError` if the file cannot be parsed or the
/// options cannot be honoured.
pub fn load_generator_options(path: &Path) -> Result<PydanticGeneratorOptions> {
    let options: Option<PydanticGeneratorOptions> = load_config(path)?;
    let options = options.unwrap_or_default();
    options.validate()?;
    Ok(options)
}

/// Substitute environment variables in the format ${VAR:-default}
fn substitute_env_vars(content: &str) -> String {
    ENV_VAR
        .replace_all(content, |caps: &Captures| {
            let var_name = &caps[1];
            let default_value = caps.get(3).map_or("", |m| m.as_str());
            env::var(var_name).unwrap_or_else(|_| default_value.to_string())
        })
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::pydantic::{ExtraFields, MetadataMode};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_env_var_substitution() {
        let content = "server: ${LINKML_PYDANTIC_NONEXISTENT:-default_value}";
        assert_eq!(substitute_env_vars(content), "server: default_value");

        let content = "${LINKML_PYDANTIC_VAR1:-val1} and ${LINKML_PYDANTIC_VAR2:-val2}";
        assert_eq!(substitute_env_vars(content), "val1 and val2");

        assert_eq!(substitute_env_vars("x: ${LINKML_PYDANTIC_UNSET}"), "x: ");
    }

    #[test]
    fn test_existing_variable_wins() {
        if let Ok(path) = env::var("PATH") {
            assert_eq!(substitute_env_vars("${PATH:-fallback}"), path);
        }
    }

    #[test]
    fn test_load_generator_options() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(
            file,
            "extra_fields: ${{LINKML_PYDANTIC_EXTRA:-allow}}\nmetadata_mode: none\ngen_mixin_inheritance: false"
        )?;
        let options = load_generator_options(file.path())?;
        assert_eq!(options.extra_fields, ExtraFields::Allow);
        assert_eq!(options.metadata_mode, MetadataMode::None);
        assert!(!options.gen_mixin_inheritance);
        Ok(())
    }

    #[test]
    fn test_empty_config_is_default() -> anyhow::Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        assert_eq!(load_generator_options(file.path())?, PydanticGeneratorOptions::default());
        Ok(())
    }

    #[test]
    fn test_bad_config_rejected() {
        let result: Result<PydanticGeneratorOptions> = parse_config("extra_fields: sometimes");
        assert!(matches!(result, Err(LinkMLError::ConfigError(_))));
    }
}
