//! # LinkML Pydantic
//!
//! Pydantic v2 model generation from `LinkML` schemas, plus a loader that
//! reads RDF and JSON-LD documents into the generated classes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use linkml_pydantic::generator::pydantic::{PydanticGenerator, PydanticGeneratorOptions};
//! use linkml_pydantic::schema_view::SchemaView;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let view = SchemaView::from_yaml_file("person_schema.yaml")?;
//!     let generator = PydanticGenerator::new(view, PydanticGeneratorOptions::default())?;
//!     std::fs::write("person.py", generator.serialize()?)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Generation
//!
//! Each slot of each class goes through the same steps:
//! - its scalar type is resolved (types, enums, classes, `any_of` unions)
//! - its collection shape is planned (list, keyed dict, array)
//! - its default is taken from designators, `ifabsent` or the collection
//!
//! Classes are emitted parents first. Metadata inclusion, extra-field
//! policy, mixin inheritance and array representations are configurable,
//! and every output template can be overridden from a directory.
//!
//! ## Loading
//!
//! [`loader::RdfLoader`] reads Turtle, N-Triples, RDF/XML and other RDF
//! syntaxes or JSON-LD, frames the document around its root node and
//! deserializes it into any type implementing [`loader::LinkMLClass`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)] // subjective determination
#![allow(clippy::doc_markdown)] // LinkML, Pydantic, JSON-LD, RDF are proper nouns
#![allow(clippy::collapsible_if)] // sometimes separate ifs are more readable
#![allow(clippy::match_same_arms)] // explicit matching can improve clarity
#![allow(clippy::cast_possible_truncation)] // values are bounded
#![allow(clippy::too_many_arguments)] // loader entry points mirror the document source parameters
#![allow(clippy::missing_panics_doc)] // only static regex construction can panic

/// Command-line interface
pub mod cli;

/// Configuration loading
pub mod config;

/// Code generation
pub mod generator;

/// Data loading
pub mod loader;

/// Prelude module for convenient imports
pub mod prelude;

/// SchemaView - High-level `API` for schema introspection
pub mod schema_view;

pub use linkml_core::error::LinkMLError;
pub use linkml_core::prelude::*;
