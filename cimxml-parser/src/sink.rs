//! Sink interface consumed by the parser, and the dataset-building sink
//!
//! The parser emits prefixes, the base, and triples to a [`CimXmlSink`]
//! without knowing the concrete destination. [`DatasetSink`] routes triples
//! to the named graph selected by the current document context, creating
//! graphs on demand with the context-appropriate indexing strategy.

use cimxml_graph::{Dataset, DocumentContext, IndexedGraph, ModelHeader, Triple};
use cimxml_vocab::cim::CimVersion;
use rayon::prelude::*;
use std::sync::Arc;

/// Event-driven destination of a CIMXML parse.
pub trait CimXmlSink {
    /// Called once before any other event.
    fn start(&mut self);

    /// A parsed triple, routed by the current context.
    fn triple(&mut self, triple: Triple);

    /// A namespace binding of the document.
    fn prefix(&mut self, prefix: &str, namespace: &str);

    /// The document base IRI (explicit or implicit).
    fn base(&mut self, base: &str);

    /// Called once after the parse, successful or not. Finalizes lazy
    /// indexes.
    fn finish(&mut self);

    /// The CIM version derived from the `cim` prefix.
    fn set_version_of_cimxml(&mut self, version: CimVersion);

    /// The CIM version derived from the `cim` prefix.
    fn version_of_cimxml(&self) -> CimVersion;

    /// The verbatim data of the `iec61970-552` processing instruction.
    fn set_version_of_iec61970_552(&mut self, version: &str);

    /// The verbatim data of the `iec61970-552` processing instruction.
    fn version_of_iec61970_552(&self) -> Option<&str>;

    /// Switch the target graph.
    fn set_current_context(&mut self, context: DocumentContext);

    /// The current target context.
    fn current_context(&self) -> DocumentContext;

    /// The model header parsed so far, if a header graph exists.
    fn model_header(&self) -> Option<ModelHeader<'_>>;
}

/// Sink that populates a [`Dataset`].
pub struct DatasetSink {
    dataset: Dataset,
    current_graph: Arc<str>,
    current_context: DocumentContext,
    version_of_cimxml: CimVersion,
    version_of_iec61970_552: Option<String>,
}

impl DatasetSink {
    /// Create a sink with the default graph prepared for the body context.
    pub fn new() -> Self {
        let context = DocumentContext::Body;
        let mut dataset = Dataset::new();
        dataset.add_graph(
            context.graph_name(),
            IndexedGraph::new(context.indexing_mode()),
        );
        Self {
            dataset,
            current_graph: Arc::from(context.graph_name()),
            current_context: context,
            version_of_cimxml: CimVersion::NoCim,
            version_of_iec61970_552: None,
        }
    }

    /// The dataset built so far.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Hand the dataset to the caller.
    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }
}

impl Default for DatasetSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CimXmlSink for DatasetSink {
    fn start(&mut self) {}

    fn triple(&mut self, triple: Triple) {
        if let Some(graph) = self.dataset.graph_mut(&self.current_graph) {
            graph.add(triple);
        }
    }

    fn prefix(&mut self, prefix: &str, namespace: &str) {
        self.dataset.set_prefix(prefix, namespace);
        if let Some(graph) = self.dataset.graph_mut(&self.current_graph) {
            graph.set_prefix(prefix, namespace);
        }
    }

    fn base(&mut self, _base: &str) {}

    fn finish(&mut self) {
        // Initialize indexes in parallel for all graphs that opted into
        // lazy indexing.
        let graphs: Vec<&IndexedGraph> = self.dataset.graphs().collect();
        graphs.par_iter().for_each(|g| g.init_index_parallel());
    }

    fn set_version_of_cimxml(&mut self, version: CimVersion) {
        self.version_of_cimxml = version;
    }

    fn version_of_cimxml(&self) -> CimVersion {
        self.version_of_cimxml
    }

    fn set_version_of_iec61970_552(&mut self, version: &str) {
        self.version_of_iec61970_552 = Some(version.to_string());
    }

    fn version_of_iec61970_552(&self) -> Option<&str> {
        self.version_of_iec61970_552.as_deref()
    }

    fn set_current_context(&mut self, context: DocumentContext) {
        let name = context.graph_name();
        if !self.dataset.contains_graph(name) {
            let mut graph = IndexedGraph::new(context.indexing_mode());
            // New graphs start with the prefixes known so far.
            graph.set_prefixes(self.dataset.prefixes());
            self.dataset.add_graph(name, graph);
        }
        self.current_graph = Arc::from(name);
        self.current_context = context;
    }

    fn current_context(&self) -> DocumentContext {
        self.current_context
    }

    fn model_header(&self) -> Option<ModelHeader<'_>> {
        self.dataset.model_header().ok()
    }
}
