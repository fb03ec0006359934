//! Schema navigation utilities for traversing `LinkML` schemas

use linkml_core::{error::Result, types::SlotDefinition};
use std::collections::HashMap;

/// Cache for navigation results
///
/// Induced slots are computed repeatedly during generation (once per class
/// slot, plus lookups for identifier slots and simple-dict checks), so they
/// are memoized here.
#[derive(Debug, Default)]
pub struct NavigationCache {
    /// Cached induced slots (key: "`class_name.slot_name`")
    induced_slots: HashMap<String, SlotDefinition>,

    /// Cached reflexive ancestor lists, mixins included
    ancestors: HashMap<String, Vec<String>>,
}

impl NavigationCache {
    /// Create a new navigation cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached induced slot for a class
    #[must_use]
    pub fn get_induced_slot(&self, class_name: &str, slot_name: &str) -> Option<SlotDefinition> {
        let key = format!("{class_name}.{slot_name}");
        self.induced_slots.get(&key).cloned()
    }

    /// Cache an induced slot for a class
    pub fn cache_induced_slot(&mut self, class_name: &str, slot_name: &str, slot: SlotDefinition) {
        let key = format!("{class_name}.{slot_name}");
        self.induced_slots.insert(key, slot);
    }

    /// Get cached ancestors of a class
    #[must_use]
    pub fn get_ancestors(&self, class_name: &str) -> Option<Vec<String>> {
        self.ancestors.get(class_name).cloned()
    }

    /// Cache ancestors of a class
    pub fn cache_ancestors(&mut self, class_name: String, ancestors: Vec<String>) {
        self.ancestors.insert(class_name, ancestors);
    }
}

/// Transitive closure of `next` starting at `start`.
///
/// The traversal is depth first, but results are reported in discovery
/// order: `start` first (when `reflexive`), then direct neighbours in the
/// order `next` returns them, and so on. Every element appears at most once,
/// so cyclic graphs terminate.
///
/// # Errors
///
/// Propagates any error returned by `next`.
pub fn closure<F>(start: &str, reflexive: bool, mut next: F) -> Result<Vec<String>>
where
    F: FnMut(&str) -> Result<Vec<String>>,
{
    let mut result = if reflexive {
        vec![start.to_string()]
    } else {
        Vec::new()
    };
    let mut visited: Vec<String> = Vec::new();
    let mut todo = vec![start.to_string()];

    while let Some(current) = todo.pop() {
        let neighbours = next(&current)?;
        visited.push(current);
        for neighbour in neighbours {
            if !visited.contains(&neighbour) && !result.contains(&neighbour) {
                todo.push(neighbour.clone());
                result.push(neighbour);
            }
        }
    }

    Ok(result)
}
