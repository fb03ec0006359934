//! # `LinkML` Core
//!
//! Core schema types for generating code from `LinkML` schemas in Rust.
//!
//! This crate provides the read-only schema model consumed by the code
//! generators and data loaders: schema, class, slot, type and enum
//! definitions, the built-in `linkml:types` library, naming helpers, and
//! the shared error type.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Core error types for `LinkML` operations
pub mod error;

/// Type definitions for `LinkML` schemas
pub mod types;

/// Built-in `linkml:types` scalar library
pub mod linkml_types;

/// Naming, CURIE and slot merging helpers
pub mod utils;

// Re-export commonly used types
pub use error::{LinkMLError, Result};
pub use serde_json::Value;
pub use types::{
    ClassDefinition, EnumDefinition, IfAbsentAction, SchemaDefinition, SlotDefinition,
    TypeDefinition,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{LinkMLError, Result};
    pub use crate::types::*;
    pub use crate::utils::{camelcase, underscore};
}
