//! Set-semantics triple store with a lazily built triple-pattern index
//!
//! [`IndexedGraph`] is the concrete store every parsed graph lands in. Small
//! header graphs use [`IndexingMode::Minimal`] and answer `find` by scanning;
//! body and difference graphs use [`IndexingMode::LazyParallel`], which
//! builds by-subject/by-predicate/by-object posting lists on first use (or
//! eagerly in parallel when the sink finalizes the dataset).
//!
//! The prefix map is attached per graph and never affects triple identity.

use crate::{Triple, TriplePattern};
use once_cell::sync::OnceCell;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;

use crate::Term;

/// Prefix -> namespace IRI mapping, deterministic iteration order.
pub type PrefixMap = BTreeMap<String, String>;

/// Indexing strategy for a graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexingMode {
    /// No pattern index; `find` scans. For small graphs (model headers).
    Minimal,
    /// Pattern index built lazily, in parallel when requested via
    /// [`IndexedGraph::init_index_parallel`]. For body and difference
    /// graphs.
    LazyParallel,
}

/// The read contract shared by all graph shapes.
///
/// `find` returns a lazy iterator; any pattern component may be a wildcard.
/// After index finalization, `find` returns every matching triple exactly
/// once, in no particular order.
pub trait GraphView {
    /// Concrete-triple membership test.
    fn contains(&self, triple: &Triple) -> bool;

    /// All triples matching the pattern.
    fn find<'a>(&'a self, pattern: &TriplePattern) -> Box<dyn Iterator<Item = &'a Triple> + 'a>;

    /// Number of triples in the view.
    fn len(&self) -> usize;

    /// True if the view holds no triples.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The prefix map of the view.
    fn prefixes(&self) -> &PrefixMap;
}

#[derive(Clone, Debug, Default)]
struct PatternIndex {
    by_subject: FxHashMap<Term, Vec<Triple>>,
    by_predicate: FxHashMap<Term, Vec<Triple>>,
    by_object: FxHashMap<Term, Vec<Triple>>,
}

impl PatternIndex {
    fn build(triples: &FxHashSet<Triple>) -> Self {
        fn group_by<'a>(
            triples: impl Iterator<Item = &'a Triple>,
            key: fn(&Triple) -> &Term,
        ) -> FxHashMap<Term, Vec<Triple>> {
            let mut map: FxHashMap<Term, Vec<Triple>> = FxHashMap::default();
            for t in triples {
                map.entry(key(t).clone()).or_default().push(t.clone());
            }
            map
        }

        // The three posting maps are independent; build them on separate
        // rayon tasks.
        let (by_subject, (by_predicate, by_object)) = rayon::join(
            || group_by(triples.iter(), |t| &t.s),
            || {
                rayon::join(
                    || group_by(triples.iter(), |t| &t.p),
                    || group_by(triples.iter(), |t| &t.o),
                )
            },
        );

        PatternIndex {
            by_subject,
            by_predicate,
            by_object,
        }
    }

    /// Smallest posting list applicable to the bound pattern components,
    /// or None when the pattern is fully unbound.
    fn candidates(&self, pattern: &TriplePattern) -> Option<&[Triple]> {
        static EMPTY: &[Triple] = &[];
        fn consider<'a>(best: Option<&'a [Triple]>, list: Option<&'a Vec<Triple>>) -> Option<&'a [Triple]> {
            let list = list.map(Vec::as_slice).unwrap_or(EMPTY);
            match best {
                Some(b) if b.len() <= list.len() => best,
                _ => Some(list),
            }
        }
        let mut best: Option<&[Triple]> = None;
        if let Some(s) = &pattern.s {
            best = consider(best, self.by_subject.get(s));
        }
        if let Some(p) = &pattern.p {
            best = consider(best, self.by_predicate.get(p));
        }
        if let Some(o) = &pattern.o {
            best = consider(best, self.by_object.get(o));
        }
        best
    }
}

/// An in-memory triple set with indexed pattern lookup and a prefix map.
#[derive(Debug)]
pub struct IndexedGraph {
    mode: IndexingMode,
    triples: FxHashSet<Triple>,
    index: OnceCell<PatternIndex>,
    prefixes: PrefixMap,
}

impl IndexedGraph {
    /// Create an empty graph with the given indexing mode.
    pub fn new(mode: IndexingMode) -> Self {
        Self {
            mode,
            triples: FxHashSet::default(),
            index: OnceCell::new(),
            prefixes: PrefixMap::new(),
        }
    }

    /// The indexing mode of this graph.
    pub fn indexing_mode(&self) -> IndexingMode {
        self.mode
    }

    /// Add a triple. Returns false if the triple was already present.
    pub fn add(&mut self, triple: Triple) -> bool {
        let inserted = self.triples.insert(triple);
        if inserted {
            self.invalidate_index();
        }
        inserted
    }

    /// Delete a triple. Returns false if the triple was not present.
    pub fn delete(&mut self, triple: &Triple) -> bool {
        let removed = self.triples.remove(triple);
        if removed {
            self.invalidate_index();
        }
        removed
    }

    /// Remove all triples.
    pub fn clear(&mut self) {
        self.triples.clear();
        self.invalidate_index();
    }

    /// Concrete-triple membership test, O(1).
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Number of triples.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// True if the graph holds no triples.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Iterate over all triples.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// All triples matching the pattern, lazily.
    pub fn find<'a>(
        &'a self,
        pattern: &TriplePattern,
    ) -> Box<dyn Iterator<Item = &'a Triple> + 'a> {
        let pattern = pattern.clone();
        if self.mode == IndexingMode::LazyParallel && !pattern.is_any() {
            let index = self.index.get_or_init(|| PatternIndex::build(&self.triples));
            if let Some(candidates) = index.candidates(&pattern) {
                return Box::new(
                    candidates
                        .iter()
                        .filter(move |t| pattern.matches(t)),
                );
            }
        }
        Box::new(self.triples.iter().filter(move |t| pattern.matches(t)))
    }

    /// Eagerly build the pattern index for a lazy graph.
    ///
    /// Idempotent; a no-op for [`IndexingMode::Minimal`] graphs. Called by
    /// the sink when a parse finishes, before the graph becomes visible to
    /// concurrent readers.
    pub fn init_index_parallel(&self) {
        if self.mode == IndexingMode::LazyParallel {
            self.index.get_or_init(|| PatternIndex::build(&self.triples));
        }
    }

    /// True once the pattern index has been built.
    pub fn is_index_initialized(&self) -> bool {
        self.index.get().is_some()
    }

    /// Bind a prefix to a namespace IRI on this graph.
    pub fn set_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Copy all bindings from the given prefix map into this graph's map.
    pub fn set_prefixes(&mut self, prefixes: &PrefixMap) {
        for (p, ns) in prefixes {
            self.prefixes.insert(p.clone(), ns.clone());
        }
    }

    /// The prefix map of this graph.
    pub fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }

    fn invalidate_index(&mut self) {
        if self.index.get().is_some() {
            self.index = OnceCell::new();
        }
    }
}

impl Clone for IndexedGraph {
    fn clone(&self) -> Self {
        // The clone starts with an unbuilt index.
        Self {
            mode: self.mode,
            triples: self.triples.clone(),
            index: OnceCell::new(),
            prefixes: self.prefixes.clone(),
        }
    }
}

impl Default for IndexedGraph {
    fn default() -> Self {
        Self::new(IndexingMode::LazyParallel)
    }
}

impl GraphView for IndexedGraph {
    fn contains(&self, triple: &Triple) -> bool {
        IndexedGraph::contains(self, triple)
    }

    fn find<'a>(&'a self, pattern: &TriplePattern) -> Box<dyn Iterator<Item = &'a Triple> + 'a> {
        IndexedGraph::find(self, pattern)
    }

    fn len(&self) -> usize {
        IndexedGraph::len(self)
    }

    fn prefixes(&self) -> &PrefixMap {
        IndexedGraph::prefixes(self)
    }
}

impl Extend<Triple> for IndexedGraph {
    fn extend<T: IntoIterator<Item = Triple>>(&mut self, iter: T) {
        for t in iter {
            self.add(t);
        }
    }
}

impl FromIterator<Triple> for IndexedGraph {
    fn from_iter<T: IntoIterator<Item = Triple>>(iter: T) -> Self {
        let mut g = IndexedGraph::default();
        g.extend(iter);
        g
    }
}
