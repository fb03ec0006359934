//! Command-line interface of `gen-pydantic`
//!
//! Options are read from an optional configuration file first; flags given
//! on the command line override them.

use clap::Parser;
use linkml_core::error::{LinkMLError, Result};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::load_generator_options;
use crate::generator::pydantic::{
    ArrayRepresentation, ExtraFields, MetadataMode, PydanticGenerator, PydanticGeneratorOptions,
};
use crate::schema_view::SchemaView;

/// Generate Pydantic v2 models from a `LinkML` schema
#[derive(Parser, Debug, Clone)]
#[command(name = "gen-pydantic", author, version, about, long_about = None)]
pub struct GenPydanticCli {
    /// Schema file (YAML)
    pub schema: PathBuf,

    /// Directory of `<name>.py.tmpl` files overriding the built-in templates
    #[arg(long)]
    pub template_dir: Option<PathBuf>,

    /// Single template file (no longer supported)
    #[arg(long, hide = true)]
    pub template_file: Option<PathBuf>,

    /// Representations generated for array slots
    #[arg(long, value_enum, value_delimiter = ',')]
    pub array_representations: Vec<ArrayRepresentation>,

    /// How models treat fields they do not declare
    #[arg(long, value_enum)]
    pub extra_fields: Option<ExtraFields>,

    /// Schema metadata carried into the models: full, except_children, auto or none
    #[arg(long = "meta")]
    pub metadata_mode: Option<MetadataMode>,

    /// Normalize whitespace of the generated module
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub format: Option<bool>,

    /// Do not turn mixins into base classes
    #[arg(long)]
    pub no_mixin_inheritance: bool,

    /// Check the generated module is structurally valid Python
    #[arg(long)]
    pub check: bool,

    /// Configuration file (YAML) with generator options
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output file; the module is printed when absent
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl GenPydanticCli {
    /// Generator options from the configuration file overlaid with flags
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be loaded or the
    /// resulting options are unusable.
    pub fn options(&self) -> Result<PydanticGeneratorOptions> {
        let mut options = match &self.config {
            Some(path) => load_generator_options(path)?,
            None => PydanticGeneratorOptions::default(),
        };

        if let Some(dir) = &self.template_dir {
            options.template_dir = Some(dir.clone());
        }
        if let Some(file) = &self.template_file {
            options.template_file = Some(file.clone());
        }
        if !self.array_representations.is_empty() {
            options.array_representations.clone_from(&self.array_representations);
        }
        if let Some(extra) = self.extra_fields {
            options.extra_fields = extra;
        }
        if let Some(mode) = self.metadata_mode {
            options.metadata_mode = mode;
        }
        if let Some(format) = self.format {
            options.format_output = format;
        }
        if self.no_mixin_inheritance {
            options.gen_mixin_inheritance = false;
        }

        options.validate()?;
        Ok(options)
    }

    fn log_filter(&self) -> EnvFilter {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }
}

/// The `gen-pydantic` application
#[derive(Debug)]
pub struct GenPydanticApp {
    cli: GenPydanticCli,
}

impl GenPydanticApp {
    /// Create the application from command line arguments
    #[must_use]
    pub fn from_args() -> Self {
        Self::new(GenPydanticCli::parse())
    }

    /// Create the application from parsed arguments
    #[must_use]
    pub fn new(cli: GenPydanticCli) -> Self {
        Self { cli }
    }

    /// Install the tracing subscriber; `RUST_LOG` overrides `-v`
    pub fn init_logging(&self) {
        tracing_subscriber::fmt()
            .with_env_filter(self.cli.log_filter())
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    /// Generate the module and write it out
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be read, the module cannot be
    /// generated, or the output cannot be written.
    pub fn run(&self) -> Result<()> {
        match self.generate() {
            Ok(code) => {
                self.write(&code)?;
                info!("Generation completed successfully");
                Ok(())
            }
            Err(err) => {
                error!("Generation failed: {}", err);
                Err(err)
            }
        }
    }

    /// Generate the module text
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be read or the module cannot be
    /// generated.
    pub fn generate(&self) -> Result<String> {
        let options = self.cli.options()?;
        info!(schema = %self.cli.schema.display(), "Generating pydantic models");
        let view = SchemaView::from_yaml_file(&self.cli.schema)?;
        let generator = PydanticGenerator::new(view, options)?;
        let code = if self.cli.check {
            generator.compile_module()?
        } else {
            generator.serialize()?
        };
        Ok(code)
    }

    fn write(&self, code: &str) -> Result<()> {
        match &self.cli.output {
            Some(path) => {
                std::fs::write(path, code).map_err(LinkMLError::IoError)?;
                info!(output = %path.display(), "Wrote pydantic module");
            }
            None => print!("{code}"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flags_override_defaults() -> Result<()> {
        let cli = GenPydanticCli::try_parse_from([
            "gen-pydantic",
            "schema.yaml",
            "--extra-fields",
            "allow",
            "--meta",
            "none",
            "--array-representations",
            "list,numpydantic",
            "--format",
            "false",
            "--no-mixin-inheritance",
        ])
        .map_err(|e| LinkMLError::config(e.to_string()))?;

        let options = cli.options()?;
        assert_eq!(options.extra_fields, ExtraFields::Allow);
        assert_eq!(options.metadata_mode, MetadataMode::None);
        assert_eq!(
            options.array_representations,
            vec![ArrayRepresentation::List, ArrayRepresentation::Numpydantic]
        );
        assert!(!options.format_output);
        assert!(!options.gen_mixin_inheritance);
        Ok(())
    }

    #[test]
    fn test_bare_format_flag() -> Result<()> {
        let cli = GenPydanticCli::try_parse_from(["gen-pydantic", "schema.yaml", "--format"])
            .map_err(|e| LinkMLError::config(e.to_string()))?;
        assert_eq!(cli.format, Some(true));
        assert_eq!(cli.options()?, PydanticGeneratorOptions::default());
        Ok(())
    }

    #[test]
    fn test_unknown_meta_mode_rejected() {
        let parsed = GenPydanticCli::try_parse_from(["gen-pydantic", "schema.yaml", "--meta", "lots"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_template_file_rejected() {
        let cli = GenPydanticCli::try_parse_from(["gen-pydantic", "schema.yaml", "--template-file", "x.jinja"])
            .expect("arguments parse");
        assert!(matches!(cli.options(), Err(LinkMLError::ConfigError(_))));
    }

    #[test]
    fn test_generate_to_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let schema = dir.path().join("schema.yaml");
        std::fs::write(
            &schema,
            "id: https://example.org/s\nname: s\ndefault_range: string\nclasses:\n  Thing:\n    attributes:\n      label: {}\n",
        )?;
        let output = dir.path().join("model.py");
        let cli = GenPydanticCli::try_parse_from([
            "gen-pydantic".into(),
            schema.into_os_string(),
            "--check".into(),
            "-o".into(),
            output.clone().into_os_string(),
        ])?;
        GenPydanticApp::new(cli).run()?;
        let code = std::fs::read_to_string(output)?;
        assert!(code.contains("class Thing(ConfiguredBaseModel):"));
        Ok(())
    }
}
