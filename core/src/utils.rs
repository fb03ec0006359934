//! Utility functions and helpers for LinkML operations

use crate::error::{LinkMLError, Result};
use crate::types::{PrefixDefinition, SlotDefinition};
use indexmap::IndexMap;
use regex::Regex;

static WORD_SPLIT: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("Valid word split pattern"));

/// Convert an element name to a class-style name.
///
/// Words are split on any non-alphanumeric character and the first letter
/// of each word is upper-cased; the rest of each word is kept as written,
/// so `"my class"` becomes `MyClass` and `"HTTPRequest"` stays as is.
#[must_use]
pub fn camelcase(name: &str) -> String {
    WORD_SPLIT
        .split(name)
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Convert an element name to a field-style name by replacing anything that
/// is not a word character with an underscore.
#[must_use]
pub fn underscore(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Extract prefix from a CURIE (Compact URI)
#[must_use]
pub fn extract_prefix(curie: &str) -> Option<(&str, &str)> {
    if curie.contains("://") {
        return None;
    }
    curie.split_once(':')
}

/// Expand a CURIE using a schema prefix map
///
/// # Errors
///
/// Returns an error if the prefix is not found in the prefix map.
pub fn expand_curie(curie: &str, prefixes: &IndexMap<String, PrefixDefinition>) -> Result<String> {
    if let Some((prefix, local)) = extract_prefix(curie) {
        if let Some(expansion) = prefixes.get(prefix) {
            Ok(format!("{}{local}", expansion.expansion()))
        } else {
            Err(LinkMLError::other(format!("Unknown prefix: {prefix}")))
        }
    } else {
        // Not a CURIE, return as-is
        Ok(curie.to_string())
    }
}

/// Merge slot definitions, with override taking precedence
///
/// Used both for walking slot `is_a` chains and for applying `slot_usage`
/// refinements on top of an inherited slot.
#[must_use]
pub fn merge_slot_definitions(
    base: &SlotDefinition,
    override_def: &SlotDefinition,
) -> SlotDefinition {
    SlotDefinition {
        name: override_def.name.clone(),
        description: override_def
            .description
            .clone()
            .or_else(|| base.description.clone()),
        title: override_def.title.clone().or_else(|| base.title.clone()),
        range: override_def.range.clone().or_else(|| base.range.clone()),
        required: override_def.required.or(base.required),
        recommended: override_def.recommended.or(base.recommended),
        multivalued: override_def.multivalued.or(base.multivalued),
        identifier: override_def.identifier.or(base.identifier),
        key: override_def.key.or(base.key),
        designates_type: override_def.designates_type.or(base.designates_type),
        readonly: override_def.readonly.or(base.readonly),
        inlined: override_def.inlined.or(base.inlined),
        inlined_as_list: override_def.inlined_as_list.or(base.inlined_as_list),
        pattern: override_def
            .pattern
            .clone()
            .or_else(|| base.pattern.clone()),
        minimum_value: override_def
            .minimum_value
            .clone()
            .or_else(|| base.minimum_value.clone()),
        maximum_value: override_def
            .maximum_value
            .clone()
            .or_else(|| base.maximum_value.clone()),
        equals_string: override_def
            .equals_string
            .clone()
            .or_else(|| base.equals_string.clone()),
        equals_number: override_def.equals_number.or(base.equals_number),
        slot_uri: override_def
            .slot_uri
            .clone()
            .or_else(|| base.slot_uri.clone()),
        ifabsent: override_def
            .ifabsent
            .clone()
            .or_else(|| base.ifabsent.clone()),
        array: override_def.array.clone().or_else(|| base.array.clone()),
        any_of: if override_def.any_of.is_empty() {
            base.any_of.clone()
        } else {
            override_def.any_of.clone()
        },
        exactly_one_of: if override_def.exactly_one_of.is_empty() {
            base.exactly_one_of.clone()
        } else {
            override_def.exactly_one_of.clone()
        },
        domain: override_def.domain.clone().or_else(|| base.domain.clone()),
        is_a: override_def.is_a.clone().or_else(|| base.is_a.clone()),
        mixins: if override_def.mixins.is_empty() {
            base.mixins.clone()
        } else {
            override_def.mixins.clone()
        },
        inverse: override_def
            .inverse
            .clone()
            .or_else(|| base.inverse.clone()),
        owner: override_def.owner.clone().or_else(|| base.owner.clone()),
        domain_of: merge_vec(&base.domain_of, &override_def.domain_of),
        from_schema: override_def
            .from_schema
            .clone()
            .or_else(|| base.from_schema.clone()),
        aliases: merge_vec(&base.aliases, &override_def.aliases),
        see_also: merge_vec(&base.see_also, &override_def.see_also),
        deprecated: override_def
            .deprecated
            .clone()
            .or_else(|| base.deprecated.clone()),
        notes: merge_vec(&base.notes, &override_def.notes),
        comments: merge_vec(&base.comments, &override_def.comments),
        rank: override_def.rank.or(base.rank),
        exact_mappings: merge_vec(&base.exact_mappings, &override_def.exact_mappings),
        close_mappings: merge_vec(&base.close_mappings, &override_def.close_mappings),
        related_mappings: merge_vec(&base.related_mappings, &override_def.related_mappings),
        narrow_mappings: merge_vec(&base.narrow_mappings, &override_def.narrow_mappings),
        broad_mappings: merge_vec(&base.broad_mappings, &override_def.broad_mappings),
    }
}

/// Helper to merge two vectors, removing duplicates
fn merge_vec<T: Clone + PartialEq>(base: &[T], override_vec: &[T]) -> Vec<T> {
    let mut result = base.to_vec();
    for item in override_vec {
        if !result.contains(item) {
            result.push(item.clone());
        }
    }
    result
}
