//! Dataset: named graphs plus a default graph, with CIM model accessors
//!
//! A parsed CIMXML document becomes a [`Dataset`]: the model header lands in
//! a named graph (`md:FullModel` or `dm:DifferenceModel`), the payload of a
//! full model in the default graph, and the difference containers in their
//! own named graphs. Graphs are added lazily as contexts appear while
//! parsing.
//!
//! Transactions are best effort: each step is propagated to every
//! participating graph that supports transactions, failures are collected,
//! and a composite error surfaces if any step failed. The in-memory
//! [`IndexedGraph`] does not participate.

use crate::{
    DatasetTransactionError, DeltaGraph, DisjointUnion, GraphError, GraphView, IndexedGraph,
    ModelHeader, PrefixMap, Triple,
};
use cimxml_vocab::{dm, md};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Reserved graph name of the default graph.
pub const DEFAULT_GRAPH_IRI: &str = "urn:x-cimxml:DefaultGraph";

/// Transaction type for best-effort dataset transactions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxnType {
    /// Read-only transaction
    Read,
    /// Read-write transaction
    Write,
}

/// Per-graph transaction participation.
///
/// A graph opts into dataset transactions by returning `true` from
/// `supports_transactions`; each step may fail independently and the dataset
/// aggregates the failures.
pub trait Transactional {
    /// True if this graph participates in dataset transactions.
    fn supports_transactions(&self) -> bool {
        false
    }

    /// Open a transaction.
    fn begin(&self, _txn: TxnType) -> std::result::Result<(), String> {
        Ok(())
    }

    /// Commit the open transaction.
    fn commit(&self) -> std::result::Result<(), String> {
        Ok(())
    }

    /// Abort the open transaction.
    fn abort(&self) -> std::result::Result<(), String> {
        Ok(())
    }

    /// End the transaction.
    fn end(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

// The in-memory store does not journal, so it stays out of transactions.
impl Transactional for IndexedGraph {}

/// Keyed collection of named graphs plus a default graph.
#[derive(Default)]
pub struct Dataset {
    graphs: FxHashMap<Arc<str>, IndexedGraph>,
    prefixes: PrefixMap,
    txn: Mutex<Option<TxnType>>,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a named graph. The default graph uses
    /// [`DEFAULT_GRAPH_IRI`].
    pub fn add_graph(&mut self, name: impl AsRef<str>, graph: IndexedGraph) {
        self.graphs.insert(Arc::from(name.as_ref()), graph);
    }

    /// Remove a graph. This also removes its transactional participation.
    pub fn remove_graph(&mut self, name: &str) -> Option<IndexedGraph> {
        self.graphs.remove(name)
    }

    /// Look up a graph by name.
    pub fn graph(&self, name: &str) -> Option<&IndexedGraph> {
        self.graphs.get(name)
    }

    /// Look up a graph mutably by name.
    pub fn graph_mut(&mut self, name: &str) -> Option<&mut IndexedGraph> {
        self.graphs.get_mut(name)
    }

    /// The default graph, if present.
    pub fn default_graph(&self) -> Option<&IndexedGraph> {
        self.graphs.get(DEFAULT_GRAPH_IRI)
    }

    /// True if a graph with the given name exists.
    pub fn contains_graph(&self, name: &str) -> bool {
        self.graphs.contains_key(name)
    }

    /// All graph names, in no particular order.
    pub fn graph_names(&self) -> impl Iterator<Item = &str> {
        self.graphs.keys().map(|k| k.as_ref())
    }

    /// All graphs, in no particular order.
    pub fn graphs(&self) -> impl Iterator<Item = &IndexedGraph> {
        self.graphs.values()
    }

    /// All graphs mutably; used by the sink for index finalization.
    pub fn graphs_mut(&mut self) -> impl Iterator<Item = &mut IndexedGraph> {
        self.graphs.values_mut()
    }

    /// Number of graphs (including the default graph when present).
    pub fn graph_count(&self) -> usize {
        self.graphs.len()
    }

    /// Bind a prefix on the dataset-wide prefix map.
    pub fn set_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// The dataset-wide prefix map.
    pub fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }

    // ---- CIM model accessors

    /// True if this dataset contains a FullModel header graph.
    pub fn is_full_model(&self) -> bool {
        self.contains_graph(md::FULL_MODEL)
    }

    /// True if this dataset contains a DifferenceModel header graph.
    pub fn is_difference_model(&self) -> bool {
        self.contains_graph(dm::DIFFERENCE_MODEL)
    }

    /// The model header of this FullModel or DifferenceModel.
    pub fn model_header(&self) -> Result<ModelHeader<'_>, GraphError> {
        if let Some(g) = self.graph(md::FULL_MODEL) {
            return Ok(ModelHeader::new(g));
        }
        if let Some(g) = self.graph(dm::DIFFERENCE_MODEL) {
            return Ok(ModelHeader::new(g));
        }
        Err(GraphError::NoModelSubject)
    }

    /// The body graph of this FullModel (the default graph).
    pub fn body(&self) -> Result<&IndexedGraph, GraphError> {
        if !self.is_full_model() {
            return Err(GraphError::NotAFullModel);
        }
        self.default_graph().ok_or(GraphError::NotAFullModel)
    }

    /// The forward differences graph of this DifferenceModel.
    pub fn forward_differences(&self) -> Result<&IndexedGraph, GraphError> {
        self.difference_graph(dm::FORWARD_DIFFERENCES)
    }

    /// The reverse differences graph of this DifferenceModel.
    pub fn reverse_differences(&self) -> Result<&IndexedGraph, GraphError> {
        self.difference_graph(dm::REVERSE_DIFFERENCES)
    }

    /// The preconditions graph of this DifferenceModel.
    pub fn preconditions(&self) -> Result<&IndexedGraph, GraphError> {
        self.difference_graph(dm::PRECONDITIONS)
    }

    fn difference_graph(&self, name: &str) -> Result<&IndexedGraph, GraphError> {
        if !self.is_difference_model() {
            return Err(GraphError::NotADifferenceModel);
        }
        self.graph(name).ok_or(GraphError::NotADifferenceModel)
    }

    /// Combine the model header and the body into one non-deduplicating
    /// union graph carrying the header's prefixes.
    pub fn full_model_to_single_graph(&self) -> Result<DisjointUnion<'_>, GraphError> {
        let header = self.model_header()?;
        if !header.is_full_model() {
            return Err(GraphError::NotAFullModel);
        }
        let body = self.body()?;

        let mut union = DisjointUnion::new(vec![header.graph(), body]);
        union.set_prefixes(header.graph().prefixes());
        Ok(union)
    }

    /// Apply this DifferenceModel to a predecessor FullModel.
    ///
    /// Returns a delta over the predecessor body with the forward
    /// differences as additions and the reverse differences as deletions.
    /// The predecessor's model IRI must appear in this model's Supersedes
    /// set, and every precondition triple must be contained in the
    /// predecessor body.
    pub fn difference_model_to_full_model<'a>(
        &self,
        predecessor: &'a Dataset,
    ) -> Result<DeltaGraph<'a>, GraphError> {
        if !self.is_difference_model() {
            return Err(GraphError::NotADifferenceModel);
        }
        if !predecessor.is_full_model() {
            return Err(GraphError::NotAFullModel);
        }

        let predecessor_model = predecessor.model_header()?.model()?;
        let supersedes = self.model_header()?.supersedes()?;
        // Supersedes references are literals when no header profile typed
        // them during parsing; compare textually so both forms match.
        let superseded = supersedes
            .iter()
            .any(|s| term_text(s) == term_text(&predecessor_model));
        if !superseded {
            return Err(GraphError::PredecessorNotSuperseded {
                model: predecessor_model,
            });
        }

        let predecessor_body = predecessor.body()?;

        let preconditions = self.preconditions()?;
        if !preconditions.is_empty() {
            let missing: Vec<Triple> = preconditions
                .iter()
                .filter(|t| !predecessor_body.contains(t))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(GraphError::MissingPreconditions { missing });
            }
        }

        let additions = self.forward_differences()?.clone();
        let deletions = self.reverse_differences()?.clone();

        let mut delta = DeltaGraph::from_parts(predecessor_body, additions, deletions);
        delta.set_prefixes(self.model_header()?.graph().prefixes());
        Ok(delta)
    }

    // ---- Best-effort transactions

    /// Open a transaction on the dataset and every transactional graph.
    pub fn begin(&self, txn: TxnType) -> Result<(), GraphError> {
        let mut guard = self.txn.lock();
        if guard.is_some() {
            return Err(GraphError::AlreadyInTransaction);
        }
        let mut opened: Vec<&IndexedGraph> = Vec::new();
        for graph in self.graphs.values().filter(|g| g.supports_transactions()) {
            if let Err(message) = Transactional::begin(graph, txn) {
                for g in opened {
                    let _ = g.abort();
                }
                return Err(DatasetTransactionError {
                    failures: vec![message],
                }
                .into());
            }
            opened.push(graph);
        }
        *guard = Some(txn);
        Ok(())
    }

    /// Commit the open transaction, collecting per-graph failures.
    pub fn commit(&self) -> Result<(), GraphError> {
        self.step(|g| g.commit())
    }

    /// Abort the open transaction, collecting per-graph failures.
    pub fn abort(&self) -> Result<(), GraphError> {
        self.step(|g| Transactional::abort(g))
    }

    /// End the transaction, collecting per-graph failures.
    pub fn end(&self) -> Result<(), GraphError> {
        let result = self.step(|g| g.end());
        *self.txn.lock() = None;
        result
    }

    /// True while the dataset's own transaction lock is held.
    pub fn is_in_transaction(&self) -> bool {
        self.txn.lock().is_some()
    }

    fn step(
        &self,
        op: impl Fn(&IndexedGraph) -> std::result::Result<(), String>,
    ) -> Result<(), GraphError> {
        if self.txn.lock().is_none() {
            return Err(GraphError::NotInTransaction);
        }
        let failures: Vec<String> = self
            .graphs
            .values()
            .filter(|g| g.supports_transactions())
            .filter_map(|g| op(g).err())
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(DatasetTransactionError { failures }.into())
        }
    }
}

fn term_text(term: &crate::Term) -> &str {
    match term {
        crate::Term::Iri(iri) => iri,
        crate::Term::Literal { lexical, .. } => lexical,
        crate::Term::Blank(id) => id.as_str(),
    }
}
