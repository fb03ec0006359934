//! SchemaView - read-only API for LinkML schema introspection
//!
//! This module provides a "denormalized view" of a schema: inheritance and
//! `slot_usage` are resolved, and the built-in `linkml:types` are merged in,
//! so generators can ask about the effective shape of every class.

pub mod navigation;
pub mod view;

pub use navigation::{NavigationCache, closure};
pub use view::{SchemaView, SchemaViewError};
