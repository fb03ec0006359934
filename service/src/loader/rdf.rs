//! RDF data loader for `LinkML` generated classes
//!
//! Reads RDF (Turtle, N-Triples, N-Quads, TriG, RDF/XML, N3) or JSON-LD from
//! a URL, a file, text, an in-memory graph or an already framed mapping,
//! frames it into a single JSON object and deserializes that into a target
//! class.

use chrono::{DateTime, Utc};
use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::{Graph, Triple};
use serde_json::{Map, Value as JsonValue};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use url::Url;

use super::fetch::{HttpFetcher, SourceFetcher, TransportConfig};
use super::jsonld::{Context, flatten, frame, graph_to_jsonld};
use super::traits::{DataInstance, FileInfo, LinkMLClass, LoaderError, LoaderResult};

/// `Accept` header sent when fetching RDF
pub const RDF_MIME_TYPES: &str =
    "application/x-turtle;q=0.9, application/rdf+n3;q=0.8, application/rdf+xml;q=0.5, text/plain;q=0.1";

/// Format name of JSON-LD sources
pub const JSON_LD: &str = "json-ld";

/// Where RDF data comes from
#[derive(Debug, Clone)]
pub enum RdfSource {
    /// Remote document
    Url(Url),
    /// Local file, relative to the base directory when relative
    File(PathBuf),
    /// Document text
    Text(String),
    /// Parsed graph
    Graph(Graph),
    /// Already framed JSON object
    Mapping(Map<String, JsonValue>),
}

impl RdfSource {
    /// Classify a string as a URL, an existing file or document text
    #[must_use]
    pub fn detect(source: &str, base_dir: Option<&Path>) -> Self {
        if !source.contains('\n') {
            if let Ok(url) = Url::parse(source) {
                if matches!(url.scheme(), "http" | "https" | "file") {
                    return Self::Url(url);
                }
            }
            let path = PathBuf::from(source);
            let resolved = match base_dir {
                Some(base) if path.is_relative() => base.join(&path),
                _ => path.clone(),
            };
            if resolved.is_file() {
                return Self::File(path);
            }
        }
        Self::Text(source.to_string())
    }
}

impl From<Graph> for RdfSource {
    fn from(graph: Graph) -> Self {
        Self::Graph(graph)
    }
}

impl From<Map<String, JsonValue>> for RdfSource {
    fn from(mapping: Map<String, JsonValue>) -> Self {
        Self::Mapping(mapping)
    }
}

/// Map a format name to an oxigraph `RdfFormat`
///
/// # Errors
///
/// Returns [`LoaderError::Configuration`] for unknown names.
pub fn rdf_format(name: &str) -> LoaderResult<RdfFormat> {
    match name.to_ascii_lowercase().as_str() {
        "turtle" | "ttl" => Ok(RdfFormat::Turtle),
        "nt" | "ntriples" | "n-triples" => Ok(RdfFormat::NTriples),
        "nquads" | "nq" | "n-quads" => Ok(RdfFormat::NQuads),
        "trig" => Ok(RdfFormat::TriG),
        "xml" | "rdfxml" | "rdf/xml" | "pretty-xml" => Ok(RdfFormat::RdfXml),
        "n3" => Ok(RdfFormat::N3),
        other => Err(LoaderError::Configuration(format!("Unsupported RDF format: {other}"))),
    }
}

/// Parse RDF text into a graph; named graphs are merged into one
///
/// # Errors
///
/// Returns [`LoaderError::Parse`] if the text is not valid in `format`.
pub fn parse_rdf(text: &str, format: &str, base_iri: Option<&str>) -> LoaderResult<Graph> {
    let parser = RdfParser::from_format(rdf_format(format)?);
    let parser = if let Some(base) = base_iri {
        parser
            .with_base_iri(base)
            .map_err(|e| LoaderError::Configuration(format!("Invalid base IRI: {e}")))?
    } else {
        parser
    };

    let mut graph = Graph::new();
    for quad in parser.for_reader(Cursor::new(text.as_bytes())) {
        let quad = quad.map_err(|e| LoaderError::Parse(format!("Failed to parse RDF: {e}")))?;
        graph.insert(&Triple::from(quad));
    }
    Ok(graph)
}

/// Remove `@context`, nulls and empty lists and maps, recursively
#[must_use]
pub fn json_clean(value: JsonValue) -> Option<JsonValue> {
    match value {
        JsonValue::Null => None,
        JsonValue::Array(items) => {
            let cleaned: Vec<JsonValue> = items.into_iter().filter_map(json_clean).collect();
            (!cleaned.is_empty()).then_some(JsonValue::Array(cleaned))
        }
        JsonValue::Object(object) => {
            let cleaned: Map<String, JsonValue> = object
                .into_iter()
                .filter(|(key, _)| key != "@context")
                .filter_map(|(key, value)| json_clean(value).map(|v| (key, v)))
                .collect();
            (!cleaned.is_empty()).then_some(JsonValue::Object(cleaned))
        }
        other => Some(other),
    }
}

/// Loads RDF documents into generated classes
pub struct RdfLoader {
    fetcher: Box<dyn SourceFetcher>,
}

impl Default for RdfLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RdfLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RdfLoader").finish_non_exhaustive()
    }
}

impl RdfLoader {
    /// Create a loader that fetches over HTTP
    #[must_use]
    pub fn new() -> Self {
        Self::with_fetcher(HttpFetcher)
    }

    /// Create a loader with a custom fetcher
    #[must_use]
    pub fn with_fetcher(fetcher: impl SourceFetcher + 'static) -> Self {
        Self {
            fetcher: Box::new(fetcher),
        }
    }

    /// Load `source` into `T`
    ///
    /// `base_dir` resolves relative files and is recorded in `metadata`;
    /// `contexts` (objects, arrays, URLs or paths) drive framing; `format`
    /// names the RDF syntax of text sources (`json-ld` for JSON-LD).
    ///
    /// A document typed other than `T::class_name()` is loaded anyway after
    /// a warning.
    ///
    /// # Errors
    ///
    /// Returns a [`LoaderError`] if the source cannot be read, parsed,
    /// framed, or deserialized into `T`.
    pub fn load<T: LinkMLClass>(
        &self,
        source: RdfSource,
        base_dir: Option<&Path>,
        contexts: &[JsonValue],
        format: &str,
        metadata: Option<&mut FileInfo>,
    ) -> LoaderResult<T> {
        let object = self.load_object(source, base_dir, contexts, format, metadata, T::class_name())?;
        serde_json::from_value(JsonValue::Object(object)).map_err(|e| {
            LoaderError::Structural(format!("Cannot load data into {}: {e}", T::class_name()))
        })
    }

    /// Load `source` into `T` without a base directory
    ///
    /// # Errors
    ///
    /// Same as [`RdfLoader::load`].
    pub fn loads<T: LinkMLClass>(
        &self,
        source: RdfSource,
        contexts: &[JsonValue],
        format: &str,
        metadata: Option<&mut FileInfo>,
    ) -> LoaderResult<T> {
        self.load(source, None, contexts, format, metadata)
    }

    /// Load `source` as an untyped instance of `class_name`
    ///
    /// # Errors
    ///
    /// Same as [`RdfLoader::load`], except no structural check is made.
    pub fn load_instance(
        &self,
        source: RdfSource,
        base_dir: Option<&Path>,
        contexts: &[JsonValue],
        format: &str,
        class_name: &str,
    ) -> LoaderResult<DataInstance> {
        let mut info = FileInfo::default();
        let mut object = self.load_object(source, base_dir, contexts, format, Some(&mut info), class_name)?;

        let id = ["@id", "id"]
            .iter()
            .find_map(|key| object.remove(*key))
            .and_then(|value| value.as_str().map(ToString::to_string));

        Ok(DataInstance {
            class_name: class_name.to_string(),
            data: object.into_iter().collect(),
            id,
            metadata: info.to_metadata(),
        })
    }

    fn load_object(
        &self,
        source: RdfSource,
        base_dir: Option<&Path>,
        contexts: &[JsonValue],
        format: &str,
        metadata: Option<&mut FileInfo>,
        class_name: &str,
    ) -> LoaderResult<Map<String, JsonValue>> {
        let mut local_info = FileInfo::default();
        let info = metadata.unwrap_or(&mut local_info);
        if let Some(base) = base_dir {
            if info.base_path.is_none() {
                info.base_path = Some(base.to_path_buf());
            }
        }

        let mut format = format.to_string();
        let text = match source {
            RdfSource::Mapping(mapping) => return Ok(Self::finish(mapping, class_name)),
            RdfSource::Graph(graph) => {
                format = JSON_LD.to_string();
                graph_to_jsonld(&graph).to_string()
            }
            RdfSource::Url(url) => {
                info!(%url, "loading RDF from URL");
                let transport = TransportConfig::rdf(RDF_MIME_TYPES);
                let text = self.fetcher.fetch(&url, &transport)?;
                info.source_file = Some(url.to_string());
                info.source_file_size = Some(text.len() as u64);
                text
            }
            RdfSource::File(path) => {
                let path = match base_dir {
                    Some(base) if path.is_relative() => base.join(path),
                    _ => path,
                };
                info!(path = %path.display(), "loading RDF from file");
                let text = std::fs::read_to_string(&path)?;
                let file_metadata = std::fs::metadata(&path)?;
                info.source_file = Some(path.display().to_string());
                info.source_file_size = Some(file_metadata.len());
                info.source_file_date = file_metadata.modified().ok().map(DateTime::<Utc>::from);
                text
            }
            RdfSource::Text(text) => text,
        };

        let document = if format == JSON_LD {
            serde_json::from_str(&text).map_err(|e| LoaderError::Parse(format!("Invalid JSON-LD: {e}")))?
        } else {
            let base_iri = info.source_file.as_deref().filter(|s| Url::parse(s).is_ok());
            let graph = parse_rdf(&text, &format, base_iri)?;
            debug!(triples = graph.len(), "parsed RDF graph");
            graph_to_jsonld(&graph)
        };

        let resolver = |reference: &str| self.resolve_context(reference, base_dir);
        let context = match (contexts, document.get("@context")) {
            ([], Some(own)) => Context::from_values(std::slice::from_ref(own), &resolver)?,
            _ => Context::from_values(contexts, &resolver)?,
        };
        let nodes = flatten(&document, &Context::new(), &resolver)?;
        let framed = frame(&nodes, &context, Some(class_name))?;
        Ok(Self::finish(framed, class_name))
    }

    /// Check the document type and clean the framed object
    fn finish(mut object: Map<String, JsonValue>, class_name: &str) -> Map<String, JsonValue> {
        let typ = object
            .remove("@type")
            .filter(|t| !t.is_null())
            .or_else(|| object.remove("type"));
        let matches = match &typ {
            None => true,
            Some(JsonValue::String(t)) => t == class_name,
            Some(JsonValue::Array(ts)) => ts.iter().any(|t| t.as_str() == Some(class_name)),
            Some(_) => false,
        };
        if !matches {
            if let Some(actual) = &typ {
                warn!(expected = %class_name, actual = %actual, "input type mismatch");
            }
        }

        match json_clean(JsonValue::Object(object)) {
            Some(JsonValue::Object(cleaned)) => cleaned,
            _ => Map::new(),
        }
    }

    fn resolve_context(&self, reference: &str, base_dir: Option<&Path>) -> LoaderResult<JsonValue> {
        let text = match Url::parse(reference) {
            Ok(url) if matches!(url.scheme(), "http" | "https" | "file") => {
                let transport = TransportConfig::rdf("application/ld+json, application/json;q=0.9");
                self.fetcher.fetch(&url, &transport)?
            }
            _ => {
                let path = PathBuf::from(reference);
                let path = match base_dir {
                    Some(base) if path.is_relative() => base.join(path),
                    _ => path,
                };
                std::fs::read_to_string(&path).map_err(|e| {
                    LoaderError::Configuration(format!("Cannot read context {}: {e}", path.display()))
                })?
            }
        };
        serde_json::from_str(&text).map_err(|e| LoaderError::Parse(format!("Invalid context {reference}: {e}")))
    }
}
