//! IEC 61970-552 CIMXML parser.
//!
//! A streaming RDF/XML parser with the CIMXML extensions used for exchanging
//! power-system network models (CGMES): the `iec61970-552` processing
//! instruction, the implicit `urn:uuid:` base, UUID normalization,
//! `rdf:parseType="Statements"` difference containers, and profile-driven
//! literal typing.
//!
//! # Example
//!
//! ```
//! use cimxml_parser::CimXmlReader;
//!
//! let cimxml = r#"<?xml version="1.0" encoding="utf-8"?>
//! <rdf:RDF xmlns:cim="http://iec.ch/TC57/CIM100#"
//!          xmlns:md="http://iec.ch/TC57/61970-552/ModelDescription/1#"
//!          xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
//!  <md:FullModel rdf:about="urn:uuid:08984e27-811f-4042-9125-1531ae0de0f6">
//!    <md:Model.profile>http://example.org/CIM/MyProfile/1.1</md:Model.profile>
//!  </md:FullModel>
//!  <cim:MyEquipment rdf:ID="_f67fc354-9e39-4191-a456-67537399bc48">
//!    <cim:IdentifiedObject.name>My Custom Equipment</cim:IdentifiedObject.name>
//!  </cim:MyEquipment>
//! </rdf:RDF>"#;
//!
//! let reader = CimXmlReader::new();
//! let dataset = reader.parse_cim_model_str(cimxml).unwrap();
//! assert!(dataset.is_full_model());
//! assert_eq!(dataset.body().unwrap().len(), 2);
//! ```

mod error;
mod iri;
mod parser;
mod sink;
mod uuid;
mod xml;

pub use error::{CollectingErrorHandler, ErrorHandler, ParseError, Result, TracingErrorHandler};
pub use parser::Parser;
pub use sink::{CimXmlSink, DatasetSink};
pub use xml::{ElementHead, QName, XmlAttribute, XmlEvent, XmlSource};

use cimxml_graph::{Dataset, IndexedGraph, DEFAULT_GRAPH_IRI};
use cimxml_profile::{CimProfile, ProfileRegistry};
use std::io::BufRead;
use std::sync::Arc;

/// Entry point for parsing CIMXML models and CIM profile documents.
///
/// The reader owns a [`ProfileRegistry`]; profiles registered through
/// [`CimXmlReader::parse_and_register_cim_profile`] drive the typing of
/// literals in subsequently parsed models.
pub struct CimXmlReader {
    registry: Arc<ProfileRegistry>,
}

impl CimXmlReader {
    /// Create a reader with an empty profile registry.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ProfileRegistry::new()),
        }
    }

    /// Create a reader sharing an existing registry.
    pub fn with_registry(registry: Arc<ProfileRegistry>) -> Self {
        Self { registry }
    }

    /// The profile registry of this reader.
    pub fn registry(&self) -> &Arc<ProfileRegistry> {
        &self.registry
    }

    /// Parse a CIMXML model document into a [`Dataset`].
    pub fn parse_cim_model(&self, input: impl BufRead) -> Result<Dataset> {
        self.parse_cim_model_inner(input, None)
    }

    /// Parse a CIMXML model document with a supplied base IRI.
    pub fn parse_cim_model_with_base(&self, input: impl BufRead, base: &str) -> Result<Dataset> {
        self.parse_cim_model_inner(input, Some(base))
    }

    /// Parse a CIMXML model document from a string.
    pub fn parse_cim_model_str(&self, input: &str) -> Result<Dataset> {
        self.parse_cim_model(input.as_bytes())
    }

    fn parse_cim_model_inner(&self, input: impl BufRead, base: Option<&str>) -> Result<Dataset> {
        let mut sink = DatasetSink::new();
        let mut handler = TracingErrorHandler;
        let result = run_parse(
            input,
            Some(self.registry.as_ref()),
            base,
            &mut sink,
            &mut handler,
        );
        result?;
        Ok(sink.into_dataset())
    }

    /// Parse a plain RDF/XML document into a single graph.
    ///
    /// No profile registry is consulted; the result is the default graph of
    /// the produced dataset, carrying the document's prefixes.
    pub fn parse_graph(&self, input: impl BufRead) -> Result<IndexedGraph> {
        self.parse_graph_inner(input, None)
    }

    /// Parse a plain RDF/XML document with a supplied base IRI.
    pub fn parse_graph_with_base(&self, input: impl BufRead, base: &str) -> Result<IndexedGraph> {
        self.parse_graph_inner(input, Some(base))
    }

    /// Parse a plain RDF/XML document from a string.
    pub fn parse_graph_str(&self, input: &str) -> Result<IndexedGraph> {
        self.parse_graph(input.as_bytes())
    }

    fn parse_graph_inner(&self, input: impl BufRead, base: Option<&str>) -> Result<IndexedGraph> {
        let mut sink = DatasetSink::new();
        let mut handler = TracingErrorHandler;
        run_parse(input, None, base, &mut sink, &mut handler)?;
        let mut dataset = sink.into_dataset();
        dataset
            .remove_graph(DEFAULT_GRAPH_IRI)
            .ok_or_else(|| ParseError::Syntax {
                position: 0,
                message: "parse produced no default graph".to_string(),
            })
    }

    /// Parse a CIM profile document, register it, and return the wrapper.
    pub fn parse_and_register_cim_profile(&self, input: impl BufRead) -> Result<Arc<CimProfile>> {
        let graph = self.parse_graph(input)?;
        let profile = CimProfile::wrap(graph)?;
        Ok(self.registry.register(profile)?)
    }

    /// Parse and register a CIM profile from a string.
    pub fn parse_and_register_cim_profile_str(&self, input: &str) -> Result<Arc<CimProfile>> {
        self.parse_and_register_cim_profile(input.as_bytes())
    }
}

impl Default for CimXmlReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive one parse: the sink's `start`/`finish` bracket the run even when
/// the parse fails.
pub fn run_parse<R: BufRead, S: CimXmlSink>(
    input: R,
    registry: Option<&ProfileRegistry>,
    base: Option<&str>,
    sink: &mut S,
    handler: &mut dyn ErrorHandler,
) -> Result<()> {
    let xml = XmlSource::new(input);
    sink.start();
    let mut parser = Parser::new(xml, registry, base, sink, handler);
    let result = parser.parse();
    sink.finish();
    result
}
