//! In-memory graph data model for IEC 61970-552 CIM models.
//!
//! This crate provides the triple store side of the CIMXML toolchain:
//!
//! - [`Term`], [`Triple`], [`TriplePattern`] - the RDF data model
//! - [`IndexedGraph`] - a set-semantics triple store with a lazily built
//!   triple-pattern index and a per-graph prefix map
//! - [`DeltaGraph`] - an additions/deletions overlay over a borrowed base
//! - [`DisjointUnion`] - a non-deduplicating read-only union view
//! - [`Dataset`] - named graphs plus a default graph, with the CIM model
//!   accessors (header, body, difference containers) and difference
//!   application
//! - [`ModelHeader`] - view over a header graph (FullModel/DifferenceModel)
//!
//! # Key Design Principles
//!
//! 1. **Expanded IRIs only** - terms always carry full IRIs; prefix maps are
//!    presentation metadata and never affect triple identity.
//!
//! 2. **Set semantics** - a graph never contains duplicate triples.
//!
//! 3. **Borrowed composition** - delta and union views borrow their
//!    constituents; dropping a view never drops a base graph.

mod context;
mod dataset;
mod delta;
mod error;
mod graph;
mod header;
mod term;
mod triple;
mod union;

pub use context::DocumentContext;
pub use dataset::{Dataset, Transactional, TxnType, DEFAULT_GRAPH_IRI};
pub use delta::DeltaGraph;
pub use error::{DatasetTransactionError, GraphError, Result};
pub use graph::{GraphView, IndexedGraph, IndexingMode, PrefixMap};
pub use header::ModelHeader;
pub use term::{BlankId, Datatype, Term};
pub use triple::{Triple, TriplePattern};
pub use union::DisjointUnion;
