//! Delta overlay: additions and deletions over a borrowed base graph
//!
//! The net view is `(base - deletions) ∪ additions`, maintained under the
//! invariants `additions ∩ base = ∅` and `deletions ⊆ base`. The delta
//! borrows its base; dropping the delta never drops the base.

use crate::{GraphView, IndexedGraph, IndexingMode, PrefixMap, Triple, TriplePattern};

/// Additions/deletions overlay over a base graph.
///
/// Materializes a difference model against a predecessor full model without
/// copying the base. `add` of a triple already in the base and `delete` of a
/// triple not in the base are no-ops on the respective set.
pub struct DeltaGraph<'a> {
    base: &'a dyn GraphView,
    additions: IndexedGraph,
    deletions: IndexedGraph,
    prefixes: PrefixMap,
}

impl<'a> DeltaGraph<'a> {
    /// Create an empty delta over the given base.
    pub fn new(base: &'a dyn GraphView) -> Self {
        Self {
            base,
            additions: IndexedGraph::new(IndexingMode::LazyParallel),
            deletions: IndexedGraph::new(IndexingMode::LazyParallel),
            prefixes: PrefixMap::new(),
        }
    }

    /// Create a delta from pre-built addition and deletion sets.
    ///
    /// The caller vouches that `deletions ⊆ base` and
    /// `additions ∩ base = ∅`.
    pub fn from_parts(
        base: &'a dyn GraphView,
        additions: IndexedGraph,
        deletions: IndexedGraph,
    ) -> Self {
        Self {
            base,
            additions,
            deletions,
            prefixes: PrefixMap::new(),
        }
    }

    /// Rebase onto a new base graph, reusing the addition/deletion sets.
    ///
    /// No compatibility checks are performed; the caller vouches that the
    /// new base is compatible with the previous one.
    pub fn rebase<'b>(self, new_base: &'b dyn GraphView) -> DeltaGraph<'b> {
        DeltaGraph {
            base: new_base,
            additions: self.additions,
            deletions: self.deletions,
            prefixes: self.prefixes,
        }
    }

    /// Add a triple to the net view.
    pub fn add(&mut self, triple: Triple) {
        if !self.base.contains(&triple) {
            self.additions.add(triple.clone());
        }
        self.deletions.delete(&triple);
    }

    /// Delete a triple from the net view.
    pub fn delete(&mut self, triple: &Triple) {
        self.additions.delete(triple);
        if self.base.contains(triple) {
            self.deletions.add(triple.clone());
        }
    }

    /// True if the delta carries any additions or deletions.
    pub fn has_changes(&self) -> bool {
        !self.additions.is_empty() || !self.deletions.is_empty()
    }

    /// The base graph.
    pub fn base(&self) -> &dyn GraphView {
        self.base
    }

    /// The addition set.
    pub fn additions(&self) -> &IndexedGraph {
        &self.additions
    }

    /// The deletion set.
    pub fn deletions(&self) -> &IndexedGraph {
        &self.deletions
    }

    /// Bind a prefix on the delta's own prefix map.
    pub fn set_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Copy all bindings from the given prefix map.
    pub fn set_prefixes(&mut self, prefixes: &PrefixMap) {
        for (p, ns) in prefixes {
            self.prefixes.insert(p.clone(), ns.clone());
        }
    }
}

impl GraphView for DeltaGraph<'_> {
    fn contains(&self, triple: &Triple) -> bool {
        if self.base.contains(triple) {
            !self.deletions.contains(triple)
        } else {
            self.additions.contains(triple)
        }
    }

    fn find<'b>(&'b self, pattern: &TriplePattern) -> Box<dyn Iterator<Item = &'b Triple> + 'b> {
        // Base matches minus deletions, then additions; disjoint by
        // construction, so no deduplication is needed.
        let base_part = self
            .base
            .find(pattern)
            .filter(|t| !self.deletions.contains(t));
        Box::new(base_part.chain(self.additions.find(pattern)))
    }

    fn len(&self) -> usize {
        self.base.len() + self.additions.len() - self.deletions.len()
    }

    fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }
}
