//! Non-deduplicating read-only union of several graphs
//!
//! Intended for presenting "header + body" as a single graph cheaply.
//! `find` concatenates the component results without removing duplicates; a
//! triple present in two components is reported twice, and `len` is the sum
//! of the component sizes.

use crate::{GraphView, PrefixMap, Triple, TriplePattern};

/// Read-only view over an ordered list of graphs.
pub struct DisjointUnion<'a> {
    parts: Vec<&'a dyn GraphView>,
    prefixes: PrefixMap,
}

impl<'a> DisjointUnion<'a> {
    /// Create a union over the given graphs, in order.
    pub fn new(parts: Vec<&'a dyn GraphView>) -> Self {
        Self {
            parts,
            prefixes: PrefixMap::new(),
        }
    }

    /// Append another component graph.
    pub fn push(&mut self, graph: &'a dyn GraphView) {
        self.parts.push(graph);
    }

    /// The component graphs, in order.
    pub fn parts(&self) -> &[&'a dyn GraphView] {
        &self.parts
    }

    /// Copy all bindings from the given prefix map.
    pub fn set_prefixes(&mut self, prefixes: &PrefixMap) {
        for (p, ns) in prefixes {
            self.prefixes.insert(p.clone(), ns.clone());
        }
    }
}

impl GraphView for DisjointUnion<'_> {
    fn contains(&self, triple: &Triple) -> bool {
        self.parts.iter().any(|g| g.contains(triple))
    }

    fn find<'b>(&'b self, pattern: &TriplePattern) -> Box<dyn Iterator<Item = &'b Triple> + 'b> {
        let pattern = pattern.clone();
        Box::new(
            self.parts
                .iter()
                .flat_map(move |g| g.find(&pattern)),
        )
    }

    fn len(&self) -> usize {
        self.parts.iter().map(|g| g.len()).sum()
    }

    fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }
}
