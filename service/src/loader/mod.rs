//! Data loading for LinkML generated classes
//!
//! This module loads RDF and JSON-LD documents into the classes produced by
//! the generators, framing the document around a single root node first.

pub mod fetch;
pub mod jsonld;
pub mod rdf;
pub mod traits;

pub use fetch::{HttpFetcher, SourceFetcher, TransportConfig};
pub use jsonld::{Context, NodeMap, graph_to_jsonld};
pub use rdf::{JSON_LD, RDF_MIME_TYPES, RdfLoader, RdfSource, json_clean};
pub use traits::{DataInstance, FileInfo, LinkMLClass, LoaderError, LoaderResult};
