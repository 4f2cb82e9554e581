//! Document context of a CIMXML parse
//!
//! The context selects the named graph incoming triples are routed to. It is
//! orthogonal to the RDF/XML grammar state: recognizing a CIMXML element tag
//! switches the context, never the grammar.

use crate::dataset::DEFAULT_GRAPH_IRI;
use crate::IndexingMode;
use cimxml_vocab::{dm, md};

/// The part of a CIMXML document currently being parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocumentContext {
    /// Inside the `md:FullModel` header element
    FullModel,
    /// Payload of a full model (the default graph)
    Body,
    /// Inside the `dm:DifferenceModel` header element
    DifferenceModel,
    /// Inside `dm:forwardDifferences`
    ForwardDifferences,
    /// Inside `dm:reverseDifferences`
    ReverseDifferences,
    /// Inside `dm:preconditions`
    Preconditions,
}

impl DocumentContext {
    /// The name of the graph this context routes triples to.
    pub fn graph_name(self) -> &'static str {
        match self {
            DocumentContext::FullModel => md::FULL_MODEL,
            DocumentContext::Body => DEFAULT_GRAPH_IRI,
            DocumentContext::DifferenceModel => dm::DIFFERENCE_MODEL,
            DocumentContext::ForwardDifferences => dm::FORWARD_DIFFERENCES,
            DocumentContext::ReverseDifferences => dm::REVERSE_DIFFERENCES,
            DocumentContext::Preconditions => dm::PRECONDITIONS,
        }
    }

    /// Indexing strategy for the graph behind this context.
    ///
    /// Header metadata is small; the data parts can be large.
    pub fn indexing_mode(self) -> IndexingMode {
        match self {
            DocumentContext::FullModel | DocumentContext::DifferenceModel => IndexingMode::Minimal,
            _ => IndexingMode::LazyParallel,
        }
    }
}
