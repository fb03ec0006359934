//! JSON-LD processing for the RDF loader
//!
//! Covers what loading into generated classes needs: converting a graph to
//! expanded JSON-LD, processing contexts (terms, prefixes, `@vocab`,
//! keyword aliases, type coercion), flattening a document into a node map,
//! and framing a single root node with its referenced nodes embedded.

use indexmap::IndexMap;
use oxigraph::model::{Graph, NamedOrBlankNodeRef, TermRef};
use serde_json::{Map, Number, Value as JsonValue};
use tracing::debug;
use url::Url;

use super::traits::{LoaderError, LoaderResult};

/// `rdf:type`
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
const MAX_IRI_DEPTH: usize = 16;

/// Resolves a context reference (URL or path) to its JSON document
pub type ContextResolver<'a> = dyn Fn(&str) -> LoaderResult<JsonValue> + 'a;

/// Convert RDF term subject to a node identifier
fn subject_id(subject: NamedOrBlankNodeRef<'_>) -> String {
    match subject {
        NamedOrBlankNodeRef::NamedNode(n) => n.as_str().to_string(),
        NamedOrBlankNodeRef::BlankNode(b) => format!("_:{}", b.as_str()),
    }
}

/// Native JSON value of a literal with a numeric or boolean datatype
fn native_literal(value: &str, datatype: &str) -> Option<JsonValue> {
    match datatype {
        "http://www.w3.org/2001/XMLSchema#integer"
        | "http://www.w3.org/2001/XMLSchema#int"
        | "http://www.w3.org/2001/XMLSchema#long" => value.parse::<i64>().ok().map(|n| JsonValue::Number(n.into())),
        "http://www.w3.org/2001/XMLSchema#decimal"
        | "http://www.w3.org/2001/XMLSchema#double"
        | "http://www.w3.org/2001/XMLSchema#float" => value
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(JsonValue::Number),
        "http://www.w3.org/2001/XMLSchema#boolean" => match value {
            "true" | "1" => Some(JsonValue::Bool(true)),
            "false" | "0" => Some(JsonValue::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

/// Convert RDF term to an expanded JSON-LD object
fn term_to_jsonld(term: TermRef<'_>) -> JsonValue {
    let mut object = Map::new();
    match term {
        TermRef::NamedNode(n) => {
            object.insert("@id".to_string(), JsonValue::String(n.as_str().to_string()));
        }
        TermRef::BlankNode(b) => {
            object.insert("@id".to_string(), JsonValue::String(format!("_:{}", b.as_str())));
        }
        TermRef::Literal(l) => {
            let datatype = l.datatype().as_str();
            if let Some(language) = l.language() {
                object.insert("@value".to_string(), JsonValue::String(l.value().to_string()));
                object.insert("@language".to_string(), JsonValue::String(language.to_string()));
            } else if let Some(native) = native_literal(l.value(), datatype) {
                object.insert("@value".to_string(), native);
            } else {
                object.insert("@value".to_string(), JsonValue::String(l.value().to_string()));
                if datatype != XSD_STRING {
                    object.insert("@type".to_string(), JsonValue::String(datatype.to_string()));
                }
            }
        }
    }
    JsonValue::Object(object)
}

/// Convert a graph to expanded JSON-LD
///
/// Nodes appear in the order their subjects are first seen. Numeric and
/// boolean literals become native JSON values.
#[must_use]
pub fn graph_to_jsonld(graph: &Graph) -> JsonValue {
    let mut nodes: IndexMap<String, Map<String, JsonValue>> = IndexMap::new();
    for triple in graph {
        let id = subject_id(triple.subject);
        let node = nodes.entry(id.clone()).or_insert_with(|| {
            let mut node = Map::new();
            node.insert("@id".to_string(), JsonValue::String(id));
            node
        });

        let predicate = triple.predicate.as_str();
        let (key, value) = match triple.object {
            TermRef::NamedNode(n) if predicate == RDF_TYPE => ("@type", JsonValue::String(n.as_str().to_string())),
            TermRef::BlankNode(b) if predicate == RDF_TYPE => ("@type", JsonValue::String(format!("_:{}", b.as_str()))),
            object => (predicate, term_to_jsonld(object)),
        };
        if let JsonValue::Array(values) = node
            .entry(key.to_string())
            .or_insert_with(|| JsonValue::Array(Vec::new()))
        {
            values.push(value);
        }
    }
    JsonValue::Array(nodes.into_values().map(JsonValue::Object).collect())
}

/// Definition of a context term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermDefinition {
    /// Expanded IRI or keyword the term stands for
    pub id: String,
    /// Type coercion: `@id`, `@vocab` or a datatype IRI
    pub type_mapping: Option<String>,
    /// `@list`, `@set` or another container
    pub container: Option<String>,
}

impl TermDefinition {
    fn is_keyword_alias(&self) -> bool {
        self.id.starts_with('@')
    }

    fn is_prefix(&self) -> bool {
        self.id.ends_with(['/', '#', ':', '?', '@', '[', ']'])
    }
}

/// An active JSON-LD context
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    base: Option<String>,
    vocab: Option<String>,
    terms: IndexMap<String, TermDefinition>,
    sources: Vec<JsonValue>,
}

#[derive(Debug, Clone)]
struct RawTerm {
    id: Option<String>,
    type_mapping: Option<String>,
    container: Option<String>,
}

impl Context {
    /// Empty context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from several context documents, later ones winning
    ///
    /// # Errors
    ///
    /// Returns an error if a context is malformed or cannot be resolved.
    pub fn from_values(values: &[JsonValue], resolver: &ContextResolver<'_>) -> LoaderResult<Self> {
        let mut context = Self::new();
        for value in values {
            context.merge(value, resolver)?;
        }
        Ok(context)
    }

    /// `@vocab` mapping
    #[must_use]
    pub fn vocab(&self) -> Option<&str> {
        self.vocab.as_deref()
    }

    /// Term definition by name
    #[must_use]
    pub fn term(&self, name: &str) -> Option<&TermDefinition> {
        self.terms.get(name)
    }

    /// Context documents folded into this context, for the `@context` of
    /// framed output
    #[must_use]
    pub fn source(&self) -> Option<JsonValue> {
        match self.sources.len() {
            0 => None,
            1 => self.sources.first().cloned(),
            _ => Some(JsonValue::Array(self.sources.clone())),
        }
    }

    /// Fold a context value into this one
    ///
    /// Accepts a context object, a document wrapping one in `@context`, an
    /// array of contexts, a reference resolved through `resolver`, or null
    /// to reset.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Parse`] for malformed definitions and whatever
    /// `resolver` returns for unresolvable references.
    pub fn merge(&mut self, value: &JsonValue, resolver: &ContextResolver<'_>) -> LoaderResult<()> {
        match value {
            JsonValue::Null => {
                *self = Self::new();
                Ok(())
            }
            JsonValue::Array(items) => items.iter().try_for_each(|item| self.merge(item, resolver)),
            JsonValue::String(reference) => {
                debug!(context = %reference, "resolving context reference");
                let document = resolver(reference)?;
                self.merge(&document, resolver)
            }
            JsonValue::Object(object) => match object.get("@context") {
                Some(inner) => self.merge(inner, resolver),
                None => self.merge_definitions(object),
            },
            other => Err(LoaderError::Parse(format!("Invalid context: {other}"))),
        }
    }

    fn merge_definitions(&mut self, object: &Map<String, JsonValue>) -> LoaderResult<()> {
        let mut raw: IndexMap<String, RawTerm> = IndexMap::new();
        for (key, value) in object {
            match key.as_str() {
                "@base" => self.base = value.as_str().map(ToString::to_string),
                "@vocab" => self.vocab = value.as_str().map(ToString::to_string),
                k if k.starts_with('@') => {}
                _ => match value {
                    JsonValue::Null => {
                        self.terms.shift_remove(key);
                    }
                    JsonValue::String(id) => {
                        raw.insert(
                            key.clone(),
                            RawTerm {
                                id: Some(id.clone()),
                                type_mapping: None,
                                container: None,
                            },
                        );
                    }
                    JsonValue::Object(definition) => {
                        if definition.contains_key("@reverse") {
                            debug!(term = %key, "skipping reverse term");
                            continue;
                        }
                        let container = match definition.get("@container") {
                            Some(JsonValue::String(c)) => Some(c.clone()),
                            Some(JsonValue::Array(cs)) => cs.iter().find_map(|c| c.as_str().map(ToString::to_string)),
                            _ => None,
                        };
                        raw.insert(
                            key.clone(),
                            RawTerm {
                                id: definition.get("@id").and_then(JsonValue::as_str).map(ToString::to_string),
                                type_mapping: definition
                                    .get("@type")
                                    .and_then(JsonValue::as_str)
                                    .map(ToString::to_string),
                                container,
                            },
                        );
                    }
                    other => {
                        return Err(LoaderError::Parse(format!("Invalid definition of term '{key}': {other}")));
                    }
                },
            }
        }

        // Raw ids may use prefixes defined in the same context
        for (name, term) in &raw {
            self.terms.insert(
                name.clone(),
                TermDefinition {
                    id: term.id.clone().unwrap_or_else(|| name.clone()),
                    type_mapping: term.type_mapping.clone(),
                    container: term.container.clone(),
                },
            );
        }
        if let Some(vocab) = self.vocab.clone() {
            self.vocab = Some(self.resolve_iri(&vocab, true, 0)?);
        }
        for (name, term) in raw {
            let id = match &term.id {
                Some(id) => self.resolve_iri(id, false, 0)?,
                None if name.contains(':') => self.resolve_iri(&name, false, 0)?,
                None => match &self.vocab {
                    Some(vocab) => format!("{vocab}{name}"),
                    None => {
                        return Err(LoaderError::Parse(format!(
                            "Term '{name}' has no @id and the context has no @vocab"
                        )));
                    }
                },
            };
            let type_mapping = match term.type_mapping {
                Some(t) if t.starts_with('@') => Some(t),
                Some(t) => Some(self.resolve_iri(&t, true, 0)?),
                None => None,
            };
            self.terms.insert(
                name,
                TermDefinition {
                    id,
                    type_mapping,
                    container: term.container,
                },
            );
        }

        let mut source = object.clone();
        source.remove("@context");
        self.sources.push(JsonValue::Object(source));
        Ok(())
    }

    /// Expand a compact IRI while term ids may still be compact themselves
    fn resolve_iri(&self, value: &str, vocab: bool, depth: usize) -> LoaderResult<String> {
        if depth > MAX_IRI_DEPTH {
            return Err(LoaderError::Parse(format!("Cyclic IRI mapping for '{value}'")));
        }
        if vocab {
            if let Some(term) = self.terms.get(value) {
                if term.id != value {
                    return self.resolve_iri(&term.id, false, depth + 1);
                }
            }
        }
        if let Some((prefix, suffix)) = value.split_once(':') {
            if prefix != "_" && !suffix.starts_with("//") {
                if let Some(term) = self.terms.get(prefix) {
                    let expanded = self.resolve_iri(&term.id, false, depth + 1)?;
                    return Ok(format!("{expanded}{suffix}"));
                }
            }
        }
        Ok(value.to_string())
    }

    /// Expand a term, compact IRI or relative IRI
    ///
    /// With `vocab`, terms and `@vocab` apply; otherwise relative IRIs are
    /// resolved against `@base`.
    #[must_use]
    pub fn expand_iri(&self, value: &str, vocab: bool) -> String {
        if value.starts_with('@') {
            return value.to_string();
        }
        if vocab {
            if let Some(term) = self.terms.get(value) {
                return term.id.clone();
            }
        }
        if let Some((prefix, suffix)) = value.split_once(':') {
            if prefix == "_" || suffix.starts_with("//") {
                return value.to_string();
            }
            return match self.terms.get(prefix) {
                Some(term) if !term.is_keyword_alias() => format!("{}{suffix}", term.id),
                _ => value.to_string(),
            };
        }
        if vocab {
            if let Some(vocab) = &self.vocab {
                return format!("{vocab}{value}");
            }
        } else if let Some(joined) = self
            .base
            .as_deref()
            .and_then(|base| Url::parse(base).ok())
            .and_then(|base| base.join(value).ok())
        {
            return joined.to_string();
        }
        value.to_string()
    }

    /// Compact an IRI to a term, a `@vocab`-relative name or a compact IRI
    #[must_use]
    pub fn compact_iri(&self, iri: &str, vocab: bool) -> String {
        if vocab {
            if let Some((name, _)) = self
                .terms
                .iter()
                .find(|(_, term)| !term.is_keyword_alias() && term.id == iri)
            {
                return name.clone();
            }
            if let Some(rest) = self.vocab.as_deref().and_then(|v| iri.strip_prefix(v)) {
                if !rest.is_empty() && !rest.contains(':') && !self.terms.contains_key(rest) {
                    return rest.to_string();
                }
            }
        }

        let mut best: Option<String> = None;
        for (name, term) in &self.terms {
            if term.is_keyword_alias() || !term.is_prefix() {
                continue;
            }
            let Some(suffix) = iri.strip_prefix(term.id.as_str()) else {
                continue;
            };
            if suffix.is_empty() {
                continue;
            }
            let candidate = format!("{name}:{suffix}");
            let better = best
                .as_ref()
                .is_none_or(|b| candidate.len() < b.len() || (candidate.len() == b.len() && candidate < *b));
            if better {
                best = Some(candidate);
            }
        }
        best.unwrap_or_else(|| iri.to_string())
    }

    /// The keyword `key` stands for, if any
    #[must_use]
    pub fn keyword(&self, key: &str) -> Option<String> {
        if key.starts_with('@') {
            return Some(key.to_string());
        }
        self.terms
            .get(key)
            .filter(|term| term.is_keyword_alias())
            .map(|term| term.id.clone())
    }

    /// The key used for `keyword` in compacted output
    #[must_use]
    pub fn alias(&self, keyword: &str) -> String {
        self.terms
            .iter()
            .find(|(_, term)| term.id == keyword)
            .map_or_else(|| keyword.to_string(), |(name, _)| name.clone())
    }
}

/// Object of a property in a flattened node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeObject {
    /// Reference to another node by identifier
    Reference(String),
    /// Literal value
    Value {
        /// JSON value
        value: JsonValue,
        /// Datatype IRI
        datatype: Option<String>,
        /// Language tag
        language: Option<String>,
    },
}

/// A node of a flattened document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    /// IRI or blank node identifier
    pub id: String,
    /// Expanded type IRIs
    pub types: Vec<String>,
    /// Property values keyed by expanded property IRI
    pub properties: IndexMap<String, Vec<NodeObject>>,
}

impl Node {
    fn has_content(&self) -> bool {
        !self.types.is_empty() || !self.properties.is_empty()
    }
}

/// Nodes keyed by identifier, in document order
pub type NodeMap = IndexMap<String, Node>;

struct Flattener<'a, 'r> {
    nodes: NodeMap,
    next_blank: usize,
    resolver: &'a ContextResolver<'r>,
}

impl Flattener<'_, '_> {
    fn blank_id(&mut self) -> String {
        loop {
            let id = format!("_:b{}", self.next_blank);
            self.next_blank += 1;
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    fn local_context(&self, object: &Map<String, JsonValue>, context: &Context) -> LoaderResult<Context> {
        let mut local = context.clone();
        if let Some(embedded) = object.get("@context") {
            local.merge(embedded, self.resolver)?;
        }
        Ok(local)
    }

    fn add_top_level(&mut self, element: &JsonValue, context: &Context) -> LoaderResult<()> {
        match element {
            JsonValue::Array(items) => items.iter().try_for_each(|item| self.add_top_level(item, context)),
            JsonValue::Object(object) => {
                let local = self.local_context(object, context)?;
                let graph_key = object.keys().find(|k| local.keyword(k).as_deref() == Some("@graph"));
                let only_graph = object
                    .keys()
                    .all(|k| matches!(local.keyword(k).as_deref(), Some("@graph" | "@context" | "@id")));
                match graph_key {
                    Some(key) if only_graph => self.add_top_level(&object[key], &local),
                    _ => self.add_node(object, &local).map(|_| ()),
                }
            }
            JsonValue::Null => Ok(()),
            other => Err(LoaderError::Parse(format!("Expected a JSON-LD node object, found {other}"))),
        }
    }

    fn add_node(&mut self, object: &Map<String, JsonValue>, context: &Context) -> LoaderResult<String> {
        let local = self.local_context(object, context)?;
        let id = match object.iter().find(|(k, _)| local.keyword(k).as_deref() == Some("@id")) {
            Some((_, JsonValue::String(id))) => local.expand_iri(id, false),
            Some((_, other)) => return Err(LoaderError::Parse(format!("Invalid @id: {other}"))),
            None => self.blank_id(),
        };
        self.nodes.entry(id.clone()).or_insert_with(|| Node {
            id: id.clone(),
            ..Node::default()
        });

        for (key, value) in object {
            match local.keyword(key).as_deref() {
                Some("@type") => {
                    let types: Vec<String> = match value {
                        JsonValue::String(t) => vec![local.expand_iri(t, true)],
                        JsonValue::Array(ts) => ts
                            .iter()
                            .filter_map(JsonValue::as_str)
                            .map(|t| local.expand_iri(t, true))
                            .collect(),
                        _ => Vec::new(),
                    };
                    if let Some(node) = self.nodes.get_mut(&id) {
                        for t in types {
                            if !node.types.contains(&t) {
                                node.types.push(t);
                            }
                        }
                    }
                }
                Some("@graph") => self.add_top_level(value, &local)?,
                Some(_) => {}
                None => {
                    let property = local.expand_iri(key, true);
                    if !property.contains(':') {
                        debug!(property = %key, "dropping property without an IRI mapping");
                        continue;
                    }
                    let objects = self.expand_value(value, local.term(key), &local)?;
                    if objects.is_empty() {
                        continue;
                    }
                    if let Some(node) = self.nodes.get_mut(&id) {
                        node.properties.entry(property).or_default().extend(objects);
                    }
                }
            }
        }
        Ok(id)
    }

    fn expand_value(
        &mut self,
        value: &JsonValue,
        term: Option<&TermDefinition>,
        context: &Context,
    ) -> LoaderResult<Vec<NodeObject>> {
        let coercion = term.and_then(|t| t.type_mapping.as_deref());
        match value {
            JsonValue::Null => Ok(Vec::new()),
            JsonValue::Array(items) => {
                let mut objects = Vec::new();
                for item in items {
                    objects.extend(self.expand_value(item, term, context)?);
                }
                Ok(objects)
            }
            JsonValue::String(s) => Ok(vec![match coercion {
                Some("@id") => NodeObject::Reference(context.expand_iri(s, false)),
                Some("@vocab") => NodeObject::Reference(context.expand_iri(s, true)),
                datatype => NodeObject::Value {
                    value: value.clone(),
                    datatype: datatype.map(ToString::to_string),
                    language: None,
                },
            }]),
            JsonValue::Number(_) | JsonValue::Bool(_) => Ok(vec![NodeObject::Value {
                value: value.clone(),
                datatype: coercion.filter(|c| !c.starts_with('@')).map(ToString::to_string),
                language: None,
            }]),
            JsonValue::Object(object) => {
                let keyword_value = |keyword: &str| {
                    object
                        .iter()
                        .find(|(k, _)| context.keyword(k).as_deref() == Some(keyword))
                        .map(|(_, v)| v)
                };
                if let Some(inner) = keyword_value("@value") {
                    if inner.is_null() {
                        return Ok(Vec::new());
                    }
                    return Ok(vec![NodeObject::Value {
                        value: inner.clone(),
                        datatype: keyword_value("@type")
                            .and_then(JsonValue::as_str)
                            .map(|t| context.expand_iri(t, true)),
                        language: keyword_value("@language")
                            .and_then(JsonValue::as_str)
                            .map(ToString::to_string),
                    }]);
                }
                if let Some(inner) = keyword_value("@list").or_else(|| keyword_value("@set")) {
                    return self.expand_value(inner, term, context);
                }
                let is_reference = object
                    .keys()
                    .all(|k| context.keyword(k).as_deref() == Some("@id"));
                if is_reference {
                    if let Some(JsonValue::String(id)) = keyword_value("@id") {
                        return Ok(vec![NodeObject::Reference(context.expand_iri(id, false))]);
                    }
                }
                Ok(vec![NodeObject::Reference(self.add_node(object, context)?)])
            }
        }
    }
}

/// Flatten a JSON-LD document into a node map
///
/// Nested nodes are given their own entries and replaced with references;
/// unnamed nodes get fresh blank node identifiers.
///
/// # Errors
///
/// Returns [`LoaderError::Parse`] for documents that are not JSON-LD.
pub fn flatten(document: &JsonValue, context: &Context, resolver: &ContextResolver<'_>) -> LoaderResult<NodeMap> {
    let mut flattener = Flattener {
        nodes: NodeMap::new(),
        next_blank: 0,
        resolver,
    };
    flattener.add_top_level(document, context)?;
    Ok(flattener.nodes)
}

/// Local name of an IRI: the part after the last `/`, `#` or `:`
fn local_name(iri: &str) -> &str {
    iri.rfind(['/', '#', ':']).map_or(iri, |pos| &iri[pos + 1..])
}

/// Pick the node a document is about
///
/// That is the single node no other node refers to. When several qualify,
/// the first one typed `class_name` wins.
fn select_root<'n>(nodes: &'n NodeMap, class_name: Option<&str>) -> LoaderResult<&'n Node> {
    let referenced: Vec<&str> = nodes
        .values()
        .flat_map(|node| {
            node.properties.values().flatten().filter_map(move |object| match object {
                NodeObject::Reference(id) if *id != node.id => Some(id.as_str()),
                _ => None,
            })
        })
        .collect();

    let candidates: Vec<&Node> = nodes
        .values()
        .filter(|node| node.has_content() && !referenced.contains(&node.id.as_str()))
        .collect();
    if candidates.is_empty() {
        // Every node is referenced: the document is a cycle
        return nodes
            .values()
            .find(|node| node.has_content())
            .ok_or_else(|| LoaderError::Framing("document contains no nodes".to_string()));
    }

    match candidates.as_slice() {
        [] => Err(LoaderError::Framing("document contains no nodes".to_string())),
        [single] => Ok(*single),
        many => class_name
            .and_then(|class| {
                many.iter()
                    .find(|node| node.types.iter().any(|t| local_name(t) == class))
                    .copied()
            })
            .ok_or_else(|| {
                LoaderError::Framing(format!(
                    "document has {} top-level nodes and none is typed {}",
                    many.len(),
                    class_name.unwrap_or("<unspecified>")
                ))
            }),
    }
}

struct Framer<'a> {
    nodes: &'a NodeMap,
    context: &'a Context,
    embedded: Vec<String>,
}

impl Framer<'_> {
    fn embed(&mut self, node: &Node) -> Map<String, JsonValue> {
        self.embedded.push(node.id.clone());
        let mut object = Map::new();

        if !node.id.starts_with("_:") {
            object.insert(
                self.context.alias("@id"),
                JsonValue::String(self.context.compact_iri(&node.id, false)),
            );
        }
        if !node.types.is_empty() {
            let mut types: Vec<JsonValue> = node
                .types
                .iter()
                .map(|t| JsonValue::String(self.context.compact_iri(t, true)))
                .collect();
            let value = if types.len() == 1 {
                types.remove(0)
            } else {
                JsonValue::Array(types)
            };
            object.insert(self.context.alias("@type"), value);
        }

        for (property, values) in &node.properties {
            let key = self.context.compact_iri(property, true);
            let term = self.context.term(&key).cloned();
            let mut compacted: Vec<JsonValue> = values
                .iter()
                .map(|value| self.compact_object(value, term.as_ref()))
                .collect();
            let as_array = matches!(
                term.as_ref().and_then(|t| t.container.as_deref()),
                Some("@list" | "@set")
            );
            let value = if compacted.len() == 1 && !as_array {
                compacted.remove(0)
            } else {
                JsonValue::Array(compacted)
            };
            object.insert(key, value);
        }
        object
    }

    fn compact_object(&mut self, value: &NodeObject, term: Option<&TermDefinition>) -> JsonValue {
        let coercion = term.and_then(|t| t.type_mapping.as_deref());
        match value {
            NodeObject::Reference(id) => {
                let nodes = self.nodes;
                let target = nodes.get(id).filter(|n| n.has_content());
                if let Some(node) = target.filter(|n| !self.embedded.contains(&n.id)) {
                    return JsonValue::Object(self.embed(node));
                }
                match coercion {
                    Some("@id") => JsonValue::String(self.context.compact_iri(id, false)),
                    Some("@vocab") => JsonValue::String(self.context.compact_iri(id, true)),
                    _ => {
                        let mut reference = Map::new();
                        reference.insert(
                            self.context.alias("@id"),
                            JsonValue::String(self.context.compact_iri(id, false)),
                        );
                        JsonValue::Object(reference)
                    }
                }
            }
            NodeObject::Value {
                value,
                datatype,
                language,
            } => {
                if let Some(language) = language {
                    let mut object = Map::new();
                    object.insert(self.context.alias("@value"), value.clone());
                    object.insert(self.context.alias("@language"), JsonValue::String(language.clone()));
                    return JsonValue::Object(object);
                }
                match datatype.as_deref() {
                    None => value.clone(),
                    Some(dt) if coercion == Some(dt) => value.clone(),
                    Some(dt) => {
                        let mut object = Map::new();
                        object.insert(self.context.alias("@value"), value.clone());
                        object.insert(
                            self.context.alias("@type"),
                            JsonValue::String(self.context.compact_iri(dt, true)),
                        );
                        JsonValue::Object(object)
                    }
                }
            }
        }
    }
}

/// Frame a flattened document into one compacted object
///
/// The root is chosen by [`select_root`]; nodes it references are embedded
/// the first time they are reached and referenced afterwards. Blank node
/// identifiers of embedded nodes are dropped.
///
/// # Errors
///
/// Returns [`LoaderError::Framing`] when no single root can be chosen.
pub fn frame(nodes: &NodeMap, context: &Context, class_name: Option<&str>) -> LoaderResult<Map<String, JsonValue>> {
    let root = select_root(nodes, class_name)?;
    let mut framer = Framer {
        nodes,
        context,
        embedded: Vec::new(),
    };
    let body = framer.embed(root);

    let mut framed = Map::new();
    if let Some(source) = context.source() {
        framed.insert("@context".to_string(), source);
    }
    framed.extend(body);
    Ok(framed)
}
