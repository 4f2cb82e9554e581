//! RDF triple (statement) and triple patterns
//!
//! A triple is a single RDF statement: subject-predicate-object. A triple
//! pattern is a triple in which any component may be a wildcard; graphs
//! expose `find(pattern)` as their primary query operation.

use crate::Term;
use serde::{Deserialize, Serialize};

/// An RDF triple (subject-predicate-object)
///
/// # Invariants
///
/// - Subject can be IRI or blank node (not literal)
/// - Predicate must be IRI
/// - Object can be any term
///
/// These invariants are not enforced at construction time; the parser only
/// ever produces conforming triples.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    /// Subject (IRI or blank node)
    pub s: Term,
    /// Predicate (IRI only)
    pub p: Term,
    /// Object (IRI, blank node, or literal)
    pub o: Term,
}

impl Triple {
    /// Create a new triple
    pub fn new(s: Term, p: Term, o: Term) -> Self {
        Self { s, p, o }
    }

    /// Get the subject
    pub fn subject(&self) -> &Term {
        &self.s
    }

    /// Get the predicate
    pub fn predicate(&self) -> &Term {
        &self.p
    }

    /// Get the object
    pub fn object(&self) -> &Term {
        &self.o
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} .", self.s, self.p, self.o)
    }
}

/// A triple pattern: each component is either a concrete term or a wildcard.
///
/// `None` matches any term. [`TriplePattern::ANY`] matches every triple.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriplePattern {
    /// Subject to match, or wildcard
    pub s: Option<Term>,
    /// Predicate to match, or wildcard
    pub p: Option<Term>,
    /// Object to match, or wildcard
    pub o: Option<Term>,
}

impl TriplePattern {
    /// The pattern matching every triple.
    pub const ANY: TriplePattern = TriplePattern {
        s: None,
        p: None,
        o: None,
    };

    /// Create a pattern from optional components.
    pub fn new(s: Option<Term>, p: Option<Term>, o: Option<Term>) -> Self {
        Self { s, p, o }
    }

    /// Pattern with a concrete subject.
    pub fn with_subject(s: Term) -> Self {
        Self {
            s: Some(s),
            p: None,
            o: None,
        }
    }

    /// Pattern with a concrete predicate and object.
    pub fn with_po(p: Term, o: Term) -> Self {
        Self {
            s: None,
            p: Some(p),
            o: Some(o),
        }
    }

    /// Pattern with a concrete subject and predicate.
    pub fn with_sp(s: Term, p: Term) -> Self {
        Self {
            s: Some(s),
            p: Some(p),
            o: None,
        }
    }

    /// True if all three components are concrete.
    pub fn is_concrete(&self) -> bool {
        self.s.is_some() && self.p.is_some() && self.o.is_some()
    }

    /// True if all three components are wildcards.
    pub fn is_any(&self) -> bool {
        self.s.is_none() && self.p.is_none() && self.o.is_none()
    }

    /// Check whether a triple matches this pattern.
    pub fn matches(&self, triple: &Triple) -> bool {
        fn component(slot: &Option<Term>, term: &Term) -> bool {
            match slot {
                Some(t) => t == term,
                None => true,
            }
        }
        component(&self.s, &triple.s)
            && component(&self.p, &triple.p)
            && component(&self.o, &triple.o)
    }
}

impl From<&Triple> for TriplePattern {
    fn from(t: &Triple) -> Self {
        TriplePattern {
            s: Some(t.s.clone()),
            p: Some(t.p.clone()),
            o: Some(t.o.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple() -> Triple {
        Triple::new(
            Term::iri("http://example.org/alice"),
            Term::iri("http://example.org/name"),
            Term::string("Alice"),
        )
    }

    #[test]
    fn test_pattern_any_matches_everything() {
        assert!(TriplePattern::ANY.matches(&triple()));
    }

    #[test]
    fn test_pattern_component_match() {
        let t = triple();
        assert!(TriplePattern::with_subject(Term::iri("http://example.org/alice")).matches(&t));
        assert!(!TriplePattern::with_subject(Term::iri("http://example.org/bob")).matches(&t));

        let po = TriplePattern::with_po(
            Term::iri("http://example.org/name"),
            Term::string("Alice"),
        );
        assert!(po.matches(&t));

        let wrong_object = TriplePattern::with_po(
            Term::iri("http://example.org/name"),
            Term::string("Bob"),
        );
        assert!(!wrong_object.matches(&t));
    }

    #[test]
    fn test_pattern_concrete() {
        let t = triple();
        let concrete = TriplePattern::from(&t);
        assert!(concrete.is_concrete());
        assert!(concrete.matches(&t));
        assert!(!concrete.is_any());
    }
}
