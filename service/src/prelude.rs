//! Prelude module for LinkML Pydantic
//!
//! This module re-exports commonly used types and functions for convenient import.

// Re-export core types and traits
pub use linkml_core::prelude::*;

// Re-export generator types
pub use crate::generator::pydantic::hooks::{GenerationHooks, NoHooks};
pub use crate::generator::pydantic::{
    ArrayRepresentation, ExtraFields, MetadataMode, PydanticGenerator, PydanticGeneratorOptions,
};
pub use crate::generator::{Generator, GeneratorError, GeneratorResult};

// Re-export loader types
pub use crate::loader::{LinkMLClass, LoaderError, LoaderResult, RdfLoader, RdfSource};

// Re-export schema view
pub use crate::schema_view::SchemaView;
