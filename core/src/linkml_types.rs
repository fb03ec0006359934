//! The built-in `linkml:types` library
//!
//! Every schema implicitly imports these scalar types. A schema view merges
//! them underneath the schema's own types, so a schema may shadow any of them
//! by declaring a type with the same name.

use crate::types::TypeDefinition;
use indexmap::IndexMap;

/// Schema id the built-in types are reported as coming from
pub const LINKML_TYPES_SCHEMA: &str = "https://w3id.org/linkml/types";

// name, uri, base, repr
const BUILTIN_TYPES: &[(&str, &str, &str, Option<&str>)] = &[
    ("string", "xsd:string", "str", None),
    ("integer", "xsd:integer", "int", None),
    ("boolean", "xsd:boolean", "Bool", Some("bool")),
    ("float", "xsd:float", "float", None),
    ("double", "xsd:double", "float", None),
    ("decimal", "xsd:decimal", "Decimal", None),
    ("time", "xsd:time", "XSDTime", Some("str")),
    ("date", "xsd:date", "XSDDate", Some("str")),
    ("datetime", "xsd:dateTime", "XSDDateTime", Some("str")),
    ("date_or_datetime", "linkml:DateOrDatetime", "str", Some("str")),
    ("uriorcurie", "xsd:anyURI", "URIorCURIE", Some("str")),
    ("curie", "xsd:string", "Curie", Some("str")),
    ("uri", "xsd:anyURI", "URI", Some("str")),
    ("ncname", "xsd:string", "NCName", Some("str")),
    ("objectidentifier", "shex:iri", "ElementIdentifier", Some("str")),
    ("nodeidentifier", "shex:nonLiteral", "NodeIdentifier", Some("str")),
    ("jsonpointer", "xsd:string", "str", Some("str")),
    ("jsonpath", "xsd:string", "str", Some("str")),
    ("sparqlpath", "xsd:string", "str", Some("str")),
];

/// Build the built-in type definitions, keyed by name
#[must_use]
pub fn builtin_types() -> IndexMap<String, TypeDefinition> {
    BUILTIN_TYPES
        .iter()
        .map(|(name, uri, base, repr)| {
            let definition = TypeDefinition {
                uri: Some((*uri).to_string()),
                base: Some((*base).to_string()),
                repr: repr.map(str::to_string),
                from_schema: Some(LINKML_TYPES_SCHEMA.to_string()),
                ..TypeDefinition::new(*name)
            };
            ((*name).to_string(), definition)
        })
        .collect()
}
