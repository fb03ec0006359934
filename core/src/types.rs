//! Core type definitions for `LinkML` schemas

use crate::error::{LinkMLError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Schema definition - the root of a `LinkML` schema
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SchemaDefinition {
    /// Unique identifier for the schema
    #[serde(default)]
    pub id: String,

    /// Name of the schema
    #[serde(default)]
    pub name: String,

    /// Human-readable title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Description of the schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Version of the schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// License information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    /// Default prefix for the schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_prefix: Option<String>,

    /// Default range for slots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_range: Option<String>,

    /// Prefix declarations
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub prefixes: IndexMap<String, PrefixDefinition>,

    /// Import statements
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,

    /// Class definitions
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "deserialize_element_map"
    )]
    pub classes: IndexMap<String, ClassDefinition>,

    /// Slot definitions
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "deserialize_element_map"
    )]
    pub slots: IndexMap<String, SlotDefinition>,

    /// Type definitions
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "deserialize_element_map"
    )]
    pub types: IndexMap<String, TypeDefinition>,

    /// Enum definitions
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "deserialize_element_map"
    )]
    pub enums: IndexMap<String, EnumDefinition>,

    /// Subset definitions
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "deserialize_element_map"
    )]
    pub subsets: IndexMap<String, SubsetDefinition>,

    /// Generation date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_date: Option<String>,

    /// Source file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,

    /// Metamodel version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metamodel_version: Option<String>,

    /// Schema status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Schema keywords
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    /// See also references
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub see_also: Vec<String>,
}

/// Class definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClassDefinition {
    /// Name of the class
    #[serde(default)]
    pub name: String,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Human-readable title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Is this class abstract?
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_: Option<bool>,

    /// Is this a mixin?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mixin: Option<bool>,

    /// Parent class (single inheritance)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_a: Option<String>,

    /// Mixin classes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<String>,

    /// Slots used by this class
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<String>,

    /// Slot usage overrides
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "deserialize_element_map"
    )]
    pub slot_usage: IndexMap<String, SlotDefinition>,

    /// Attributes (inline slots)
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "deserialize_element_map"
    )]
    pub attributes: IndexMap<String, SlotDefinition>,

    /// Class URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_uri: Option<String>,

    /// Tree root flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree_root: Option<bool>,

    /// Schema this class was loaded from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_schema: Option<String>,

    /// Alternative names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    /// See also references
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub see_also: Vec<String>,

    /// Deprecation notice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,

    /// Todos
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub todos: Vec<String>,

    /// Notes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,

    /// Comments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,

    /// Exact mappings to external ontology terms
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exact_mappings: Vec<String>,

    /// Close mappings to external ontology terms
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub close_mappings: Vec<String>,

    /// Related mappings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_mappings: Vec<String>,

    /// Narrow mappings (more specific terms)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub narrow_mappings: Vec<String>,

    /// Broad mappings (more general terms)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub broad_mappings: Vec<String>,
}

/// Default value to use when a slot value is absent.
///
/// Parsed from the `LinkML` function syntax, e.g. `string(unknown)`,
/// `int(5)`, `true`, `date(2020-01-31)` or `class_curie`.
#[derive(Debug, Clone, PartialEq)]
pub enum IfAbsentAction {
    /// Literal string value
    String(String),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// ISO date (`YYYY-MM-DD`)
    Date(String),
    /// ISO datetime (`YYYY-MM-DDTHH:MM:SS`)
    Datetime(String),
    /// Literal URI
    Uri(String),
    /// Literal CURIE
    Curie(String),
    /// Fresh blank node
    Bnode,
    /// CURIE of the owning class
    ClassCurie,
    /// URI of the owning class
    ClassUri,
    /// Name of the owning class
    ClassName,
    /// CURIE of the slot
    SlotCurie,
    /// URI of the slot
    SlotUri,
    /// Name of the slot
    SlotName,
    /// The schema's default range
    DefaultRange,
    /// The schema's default namespace prefix
    DefaultNs,
}

fn strip_call<'a>(expr: &'a str, func: &str) -> Option<&'a str> {
    expr.strip_prefix(func)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
}

impl FromStr for IfAbsentAction {
    type Err = LinkMLError;

    fn from_str(s: &str) -> Result<Self> {
        let expr = s.trim();
        match expr {
            "true" | "True" => return Ok(Self::Bool(true)),
            "false" | "False" => return Ok(Self::Bool(false)),
            "bnode" => return Ok(Self::Bnode),
            "class_curie" => return Ok(Self::ClassCurie),
            "class_uri" => return Ok(Self::ClassUri),
            "class_name" => return Ok(Self::ClassName),
            "slot_curie" => return Ok(Self::SlotCurie),
            "slot_uri" => return Ok(Self::SlotUri),
            "slot_name" => return Ok(Self::SlotName),
            "default_range" => return Ok(Self::DefaultRange),
            "default_ns" => return Ok(Self::DefaultNs),
            _ => {}
        }

        if let Some(arg) = strip_call(expr, "string") {
            return Ok(Self::String(arg.to_string()));
        }
        if let Some(arg) = strip_call(expr, "int") {
            return arg
                .trim()
                .parse()
                .map(Self::Int)
                .map_err(|e| LinkMLError::ifabsent(expr, e.to_string()));
        }
        if let Some(arg) = strip_call(expr, "float") {
            return arg
                .trim()
                .parse()
                .map(Self::Float)
                .map_err(|e| LinkMLError::ifabsent(expr, e.to_string()));
        }
        if let Some(arg) = strip_call(expr, "datetime") {
            return Ok(Self::Datetime(arg.trim().to_string()));
        }
        if let Some(arg) = strip_call(expr, "date") {
            return Ok(Self::Date(arg.trim().to_string()));
        }
        if let Some(arg) = strip_call(expr, "uri") {
            return Ok(Self::Uri(arg.trim().to_string()));
        }
        if let Some(arg) = strip_call(expr, "curie") {
            return Ok(Self::Curie(arg.trim().to_string()));
        }

        // Bare numbers are accepted as shorthand
        if let Ok(i) = expr.parse::<i64>() {
            return Ok(Self::Int(i));
        }
        if let Ok(f) = expr.parse::<f64>() {
            return Ok(Self::Float(f));
        }

        Err(LinkMLError::ifabsent(expr, "unrecognized function"))
    }
}

impl fmt::Display for IfAbsentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "string({s})"),
            Self::Int(i) => write!(f, "int({i})"),
            Self::Float(x) => write!(f, "float({x})"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "date({d})"),
            Self::Datetime(d) => write!(f, "datetime({d})"),
            Self::Uri(u) => write!(f, "uri({u})"),
            Self::Curie(c) => write!(f, "curie({c})"),
            Self::Bnode => f.write_str("bnode"),
            Self::ClassCurie => f.write_str("class_curie"),
            Self::ClassUri => f.write_str("class_uri"),
            Self::ClassName => f.write_str("class_name"),
            Self::SlotCurie => f.write_str("slot_curie"),
            Self::SlotUri => f.write_str("slot_uri"),
            Self::SlotName => f.write_str("slot_name"),
            Self::DefaultRange => f.write_str("default_range"),
            Self::DefaultNs => f.write_str("default_ns"),
        }
    }
}

impl Serialize for IfAbsentAction {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

// Accepts the function syntax as a string as well as bare YAML scalars
impl<'de> Deserialize<'de> for IfAbsentAction {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct IfAbsentActionVisitor;

        impl Visitor<'_> for IfAbsentActionVisitor {
            type Value = IfAbsentAction;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an ifabsent expression")
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<IfAbsentAction, E>
            where
                E: de::Error,
            {
                value.parse().map_err(E::custom)
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<IfAbsentAction, E>
            where
                E: de::Error,
            {
                Ok(IfAbsentAction::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<IfAbsentAction, E>
            where
                E: de::Error,
            {
                Ok(IfAbsentAction::Int(value))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<IfAbsentAction, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .map(IfAbsentAction::Int)
                    .map_err(E::custom)
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<IfAbsentAction, E>
            where
                E: de::Error,
            {
                Ok(IfAbsentAction::Float(value))
            }
        }

        deserializer.deserialize_any(IfAbsentActionVisitor)
    }
}

/// Slot definition
///
/// When obtained from a schema view for a particular class this is the
/// *induced* slot: inheritance and `slot_usage` have already been applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SlotDefinition {
    /// Name of the slot
    #[serde(default)]
    pub name: String,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Human-readable title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Range (type) of the slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,

    /// Is this slot required?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    /// Is this slot recommended?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended: Option<bool>,

    /// Is this slot multivalued?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multivalued: Option<bool>,

    /// Is this slot an identifier?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<bool>,

    /// Is this slot a key (unique within its container)?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<bool>,

    /// Does this slot carry the concrete class of its owner?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designates_type: Option<bool>,

    /// Is this slot readonly?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readonly: Option<bool>,

    /// Is this slot inlined?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inlined: Option<bool>,

    /// Is this slot inlined as list?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inlined_as_list: Option<bool>,

    /// Pattern for validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Minimum value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_value: Option<Value>,

    /// Maximum value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_value: Option<Value>,

    /// Value must equal this string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equals_string: Option<String>,

    /// Value must equal this number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equals_number: Option<i64>,

    /// Slot URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_uri: Option<String>,

    /// Default value or action when value is absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ifabsent: Option<IfAbsentAction>,

    /// Array shape, when the slot holds an n-dimensional array
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array: Option<ArrayExpression>,

    /// `any_of` alternatives - at least one must be satisfied
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<AnonymousSlotExpression>,

    /// `exactly_one_of` alternatives
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exactly_one_of: Vec<AnonymousSlotExpression>,

    /// Domain class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Parent slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_a: Option<String>,

    /// Mixins
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<String>,

    /// Inverse relationship
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverse: Option<String>,

    /// Class that owns this induced slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Classes that declare this slot
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain_of: Vec<String>,

    /// Schema this slot was loaded from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_schema: Option<String>,

    /// Aliases
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    /// See also references
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub see_also: Vec<String>,

    /// Deprecation notice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,

    /// Notes about this slot
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,

    /// Comments about this slot
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,

    /// Rank for ordering
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i32>,

    /// Exact mappings to external ontology terms
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exact_mappings: Vec<String>,

    /// Close mappings to external ontology terms
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub close_mappings: Vec<String>,

    /// Related mappings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_mappings: Vec<String>,

    /// Narrow mappings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub narrow_mappings: Vec<String>,

    /// Broad mappings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub broad_mappings: Vec<String>,
}

/// Anonymous slot expression, used for `any_of` alternatives
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnonymousSlotExpression {
    /// Range constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Pattern constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Minimum value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_value: Option<Value>,

    /// Maximum value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_value: Option<Value>,

    /// Required constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    /// Multivalued constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multivalued: Option<bool>,

    /// Inlined constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inlined: Option<bool>,
}

/// Upper bound on the number of array dimensions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MaximumDimensions {
    /// Fixed upper bound
    Bounded(u32),
    /// `false` means any number of dimensions
    Unbounded(bool),
}

/// Shape of an n-dimensional array slot
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArrayExpression {
    /// Exact number of dimensions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact_number_dimensions: Option<u32>,

    /// Minimum number of dimensions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_number_dimensions: Option<u32>,

    /// Maximum number of dimensions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_number_dimensions: Option<MaximumDimensions>,

    /// Explicit per-dimension constraints
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<DimensionExpression>,
}

/// Constraint on a single array dimension
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DimensionExpression {
    /// Name of the dimension
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Exact length
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact_cardinality: Option<u32>,

    /// Minimum length
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_cardinality: Option<u32>,

    /// Maximum length
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_cardinality: Option<u32>,
}

/// Type definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TypeDefinition {
    /// Name of the type
    #[serde(default)]
    pub name: String,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parent type this type specializes
    #[serde(skip_serializing_if = "Option::is_none", rename = "typeof")]
    pub typeof_: Option<String>,

    /// Name of the base runtime class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    /// Target-language representation, overriding `base`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repr: Option<String>,

    /// Type URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Pattern constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Minimum value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_value: Option<Value>,

    /// Maximum value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_value: Option<Value>,

    /// Schema this type was loaded from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_schema: Option<String>,
}

/// Enum definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EnumDefinition {
    /// Name of the enum
    #[serde(default)]
    pub name: String,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Enum URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_uri: Option<String>,

    /// Permissible values
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_permissible_values"
    )]
    pub permissible_values: Vec<PermissibleValue>,

    /// Schema this enum was loaded from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_schema: Option<String>,
}

/// Permissible value metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PermissibleValueMetadata {
    /// Description of this permissible value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Meaning URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
}

/// Permissible value of an enumeration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PermissibleValue {
    /// Simple string value
    Simple(String),
    /// Complex value with metadata
    Complex {
        /// The value text
        text: String,
        /// Description
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        /// Meaning URI
        #[serde(skip_serializing_if = "Option::is_none")]
        meaning: Option<String>,
    },
}

impl PermissibleValue {
    /// The value text
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Simple(text) | Self::Complex { text, .. } => text,
        }
    }

    /// The value description, if any
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Simple(_) => None,
            Self::Complex { description, .. } => description.as_deref(),
        }
    }
}

/// Prefix definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PrefixDefinition {
    /// Simple string expansion
    Simple(String),
    /// Complex prefix with reference
    Complex {
        /// Prefix name
        prefix_prefix: String,
        /// Expansion
        prefix_reference: String,
    },
}

impl PrefixDefinition {
    /// The namespace this prefix expands to
    #[must_use]
    pub fn expansion(&self) -> &str {
        match self {
            Self::Simple(s) => s,
            Self::Complex {
                prefix_reference, ..
            } => prefix_reference,
        }
    }
}

/// Subset definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubsetDefinition {
    /// Name of the subset
    #[serde(default)]
    pub name: String,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Elements that carry their own name inside a name-keyed map
pub trait NamedElement {
    /// Set the element name from its map key
    fn set_name(&mut self, name: &str);
}

macro_rules! impl_named_element {
    ($($ty:ty),* $(,)?) => {
        $(impl NamedElement for $ty {
            fn set_name(&mut self, name: &str) {
                if self.name.is_empty() {
                    self.name = name.to_string();
                }
            }
        })*
    };
}

impl_named_element!(
    ClassDefinition,
    SlotDefinition,
    TypeDefinition,
    EnumDefinition,
    SubsetDefinition,
);

/// Deserialize a name-keyed map whose values may be omitted (`attr:` with
/// no body) and whose values usually leave their own `name` implicit.
fn deserialize_element_map<'de, D, T>(
    deserializer: D,
) -> std::result::Result<IndexMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default + NamedElement,
{
    let raw = IndexMap::<String, Option<T>>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| {
            let mut element = value.unwrap_or_default();
            element.set_name(&key);
            (key, element)
        })
        .collect())
}

/// Custom deserializer for `permissible_values` that handles both map and sequence formats
fn deserialize_permissible_values<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<PermissibleValue>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct PermissibleValuesVisitor;

    impl<'de> Visitor<'de> for PermissibleValuesVisitor {
        type Value = Vec<PermissibleValue>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a sequence or map of permissible values")
        }

        fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Vec<PermissibleValue>, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut values = Vec::new();
            while let Some(value) = seq.next_element::<PermissibleValue>()? {
                values.push(value);
            }
            Ok(values)
        }

        fn visit_map<M>(self, mut map: M) -> std::result::Result<Vec<PermissibleValue>, M::Error>
        where
            M: de::MapAccess<'de>,
        {
            let mut values = Vec::new();
            while let Some((key, value)) =
                map.next_entry::<String, Option<PermissibleValueMetadata>>()?
            {
                let pv = match value {
                    Some(metadata) if metadata.description.is_some() || metadata.meaning.is_some() => {
                        PermissibleValue::Complex {
                            text: key,
                            description: metadata.description,
                            meaning: metadata.meaning,
                        }
                    }
                    _ => PermissibleValue::Simple(key),
                };
                values.push(pv);
            }
            Ok(values)
        }
    }

    deserializer.deserialize_any(PermissibleValuesVisitor)
}

impl SchemaDefinition {
    /// Create a new schema definition with the given name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: format!("https://example.org/{name}"),
            name,
            ..Default::default()
        }
    }

    /// Parse a schema from YAML text
    ///
    /// # Errors
    ///
    /// Returns a parse error if the YAML is malformed or does not describe a schema.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let schema: Self = serde_yaml::from_str(text)?;
        tracing::debug!(
            schema = %schema.name,
            classes = schema.classes.len(),
            slots = schema.slots.len(),
            "parsed schema"
        );
        Ok(schema)
    }

    /// Read and parse a schema from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, or a parse error.
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut schema = Self::from_yaml(&text)
            .map_err(|e| LinkMLError::parse_at(e.to_string(), path.display().to_string()))?;
        if schema.source_file.is_none() {
            schema.source_file = Some(path.display().to_string());
        }
        Ok(schema)
    }
}

impl ClassDefinition {
    /// Create a new class definition with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Direct parents: `is_a` followed by mixins
    #[must_use]
    pub fn parents(&self) -> Vec<&str> {
        self.is_a
            .iter()
            .chain(self.mixins.iter())
            .map(String::as_str)
            .collect()
    }
}

impl SlotDefinition {
    /// Create a new slot definition with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Slot must be present
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    /// Slot is the identifier of its class
    #[must_use]
    pub fn is_identifier(&self) -> bool {
        self.identifier.unwrap_or(false)
    }

    /// Slot is a key of its class
    #[must_use]
    pub fn is_key(&self) -> bool {
        self.key.unwrap_or(false)
    }

    /// Slot holds more than one value
    #[must_use]
    pub fn is_multivalued(&self) -> bool {
        self.multivalued.unwrap_or(false)
    }

    /// Slot is a type designator
    #[must_use]
    pub fn is_type_designator(&self) -> bool {
        self.designates_type.unwrap_or(false)
    }
}

impl TypeDefinition {
    /// Create a new type definition with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl EnumDefinition {
    /// Create a new enum definition with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_schema_serialization() -> crate::Result<()> {
        let schema = SchemaDefinition {
            id: "https://example.org/test".to_string(),
            name: "test_schema".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_string(&schema)?;
        assert!(json.contains("test_schema"));

        let parsed: SchemaDefinition = serde_json::from_str(&json)?;
        assert_eq!(parsed.name, "test_schema");
        Ok(())
    }

    #[test]
    fn test_yaml_fills_element_names() -> crate::Result<()> {
        let schema = SchemaDefinition::from_yaml(
            r"
id: https://example.org/people
name: people
classes:
  Person:
    attributes:
      id:
        identifier: true
      nickname:
  Thing:
types:
  PositiveInt:
    typeof: integer
enums:
  Color:
    permissible_values:
      red:
      green:
        description: the green one
",
        )?;

        let person = &schema.classes["Person"];
        assert_eq!(person.name, "Person");
        assert_eq!(person.attributes["id"].name, "id");
        assert_eq!(person.attributes["nickname"].name, "nickname");
        assert_eq!(schema.classes["Thing"].name, "Thing");
        assert_eq!(schema.types["PositiveInt"].typeof_.as_deref(), Some("integer"));

        let color = &schema.enums["Color"];
        assert_eq!(color.permissible_values.len(), 2);
        assert_eq!(color.permissible_values[0].text(), "red");
        assert_eq!(color.permissible_values[1].description(), Some("the green one"));
        Ok(())
    }

    #[test]
    fn test_ifabsent_parsing() {
        let cases = [
            ("string(unknown)", IfAbsentAction::String("unknown".to_string())),
            ("int(42)", IfAbsentAction::Int(42)),
            ("float(1.5)", IfAbsentAction::Float(1.5)),
            ("True", IfAbsentAction::Bool(true)),
            ("date(2020-01-31)", IfAbsentAction::Date("2020-01-31".to_string())),
            (
                "datetime(2020-01-31T03:04:05)",
                IfAbsentAction::Datetime("2020-01-31T03:04:05".to_string()),
            ),
            ("class_curie", IfAbsentAction::ClassCurie),
            ("bnode", IfAbsentAction::Bnode),
        ];
        for (text, expected) in cases {
            let parsed: IfAbsentAction = text.parse().expect("valid ifabsent");
            assert_eq!(parsed, expected, "parsing {text}");
        }

        assert!("int(abc)".parse::<IfAbsentAction>().is_err());
        assert!("frobnicate(1)".parse::<IfAbsentAction>().is_err());
    }

    #[test]
    fn test_ifabsent_from_yaml_scalars() -> crate::Result<()> {
        let slot: SlotDefinition = serde_yaml::from_str("name: count\nifabsent: 3\n")?;
        assert_eq!(slot.ifabsent, Some(IfAbsentAction::Int(3)));

        let slot: SlotDefinition = serde_yaml::from_str("name: flag\nifabsent: true\n")?;
        assert_eq!(slot.ifabsent, Some(IfAbsentAction::Bool(true)));

        let json = serde_json::to_value(&slot)?;
        assert_eq!(json["ifabsent"], serde_json::json!("true"));
        Ok(())
    }

    #[test]
    fn test_array_expression() -> crate::Result<()> {
        let slot: SlotDefinition = serde_yaml::from_str(
            r"
name: image
range: float
array:
  maximum_number_dimensions: false
  dimensions:
    - alias: x
      exact_cardinality: 3
",
        )?;
        let array = slot.array.expect("array parsed");
        assert_eq!(
            array.maximum_number_dimensions,
            Some(MaximumDimensions::Unbounded(false))
        );
        assert_eq!(array.dimensions[0].exact_cardinality, Some(3));
        Ok(())
    }

    #[test]
    fn test_class_parents_order() {
        let class = ClassDefinition {
            is_a: Some("Base".to_string()),
            mixins: vec!["HasName".to_string(), "HasAge".to_string()],
            ..ClassDefinition::new("Person")
        };
        assert_eq!(class.parents(), vec!["Base", "HasName", "HasAge"]);
    }
}
