//! View over the model header graph of a CIMXML document
//!
//! The header graph is expected to contain exactly one subject typed either
//! `md:FullModel` or `dm:DifferenceModel`, with zero or more
//! `Model.profile`, `Model.Supersedes`, and `Model.DependentOn` references.

use crate::{GraphError, GraphView, IndexedGraph, PrefixMap, Term, Triple, TriplePattern};
use cimxml_vocab::{dm, md, rdf};
use std::collections::BTreeSet;

/// A read-only view over a header graph.
#[derive(Clone, Copy)]
pub struct ModelHeader<'a> {
    graph: &'a IndexedGraph,
}

impl<'a> ModelHeader<'a> {
    /// Wrap a header graph.
    pub fn new(graph: &'a IndexedGraph) -> Self {
        Self { graph }
    }

    /// The underlying graph.
    pub fn graph(&self) -> &'a IndexedGraph {
        self.graph
    }

    /// True if the header declares a full model.
    pub fn is_full_model(&self) -> bool {
        self.has_type(md::FULL_MODEL)
    }

    /// True if the header declares a difference model.
    pub fn is_difference_model(&self) -> bool {
        self.has_type(dm::DIFFERENCE_MODEL)
    }

    /// The model subject (the one typed `md:FullModel` or
    /// `dm:DifferenceModel`).
    pub fn model(&self) -> Result<Term, GraphError> {
        for class in [md::FULL_MODEL, dm::DIFFERENCE_MODEL] {
            let pattern = TriplePattern::with_po(Term::iri(rdf::TYPE), Term::iri(class));
            if let Some(t) = self.graph.find(&pattern).next() {
                return Ok(t.s.clone());
            }
        }
        Err(GraphError::NoModelSubject)
    }

    /// The `Model.profile` objects of the model subject.
    ///
    /// Each references one version IRI of a registered profile ontology.
    /// Without a registered header profile the objects are plain literals.
    pub fn profiles(&self) -> Result<BTreeSet<Term>, GraphError> {
        self.objects_of(md::MODEL_PROFILE)
    }

    /// The `Model.Supersedes` objects of the model subject.
    pub fn supersedes(&self) -> Result<BTreeSet<Term>, GraphError> {
        self.objects_of(md::MODEL_SUPERSEDES)
    }

    /// The `Model.DependentOn` objects of the model subject.
    pub fn dependent_on(&self) -> Result<BTreeSet<Term>, GraphError> {
        self.objects_of(md::MODEL_DEPENDENT_ON)
    }

    fn has_type(&self, class: &str) -> bool {
        let pattern = TriplePattern::with_po(Term::iri(rdf::TYPE), Term::iri(class));
        self.graph.find(&pattern).next().is_some()
    }

    fn objects_of(&self, predicate: &str) -> Result<BTreeSet<Term>, GraphError> {
        let model = self.model()?;
        let pattern = TriplePattern::with_sp(model, Term::iri(predicate));
        Ok(self.graph.find(&pattern).map(|t| t.o.clone()).collect())
    }
}

impl GraphView for ModelHeader<'_> {
    fn contains(&self, triple: &Triple) -> bool {
        self.graph.contains(triple)
    }

    fn find<'b>(&'b self, pattern: &TriplePattern) -> Box<dyn Iterator<Item = &'b Triple> + 'b> {
        self.graph.find(pattern)
    }

    fn len(&self) -> usize {
        self.graph.len()
    }

    fn prefixes(&self) -> &PrefixMap {
        self.graph.prefixes()
    }
}
