//! RDF term types: IRI, blank node, and literal
//!
//! Terms are the building blocks of triples. A term can be:
//! - An IRI (always expanded, never prefixed)
//! - A blank node (label stable within one parsed document)
//! - A literal (lexical form + datatype + optional language tag)

use cimxml_vocab::{rdf, xsd};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Blank node identifier
///
/// Blank node labels are stable within a document but have no global
/// meaning. Labels from `rdf:nodeID` are interned per parse so that equal
/// labels denote the same node; generated nodes use `b<counter>` labels.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlankId(Arc<str>);

impl BlankId {
    /// Create a blank node ID from a label (without the `_:` prefix).
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(Arc::from(label.as_ref()))
    }

    /// Get the label (without `_:` prefix)
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlankId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// RDF literal datatype
///
/// Datatypes are always explicit: plain string literals carry `xsd:string`,
/// language-tagged literals carry `rdf:langString`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Datatype(Arc<str>);

impl Datatype {
    /// Create a datatype from an expanded IRI
    pub fn from_iri(iri: impl AsRef<str>) -> Self {
        Datatype(Arc::from(iri.as_ref()))
    }

    /// xsd:string - default for plain string literals
    pub fn xsd_string() -> Self {
        Datatype(Arc::from(xsd::STRING))
    }

    /// xsd:boolean
    pub fn xsd_boolean() -> Self {
        Datatype(Arc::from(xsd::BOOLEAN))
    }

    /// xsd:float
    pub fn xsd_float() -> Self {
        Datatype(Arc::from(xsd::FLOAT))
    }

    /// xsd:anyURI
    pub fn xsd_any_uri() -> Self {
        Datatype(Arc::from(xsd::ANY_URI))
    }

    /// rdf:langString - for language-tagged literals
    pub fn rdf_lang_string() -> Self {
        Datatype(Arc::from(rdf::LANG_STRING))
    }

    /// rdf:XMLLiteral - for `parseType="Literal"` content
    pub fn rdf_xml_literal() -> Self {
        Datatype(Arc::from(rdf::XML_LITERAL))
    }

    /// Get the IRI of this datatype
    pub fn as_iri(&self) -> &str {
        &self.0
    }

    /// Check if this is the xsd:string datatype
    pub fn is_xsd_string(&self) -> bool {
        self.0.as_ref() == xsd::STRING
    }

    /// Check if this is the xsd:anyURI datatype
    pub fn is_xsd_any_uri(&self) -> bool {
        self.0.as_ref() == xsd::ANY_URI
    }

    /// Check if this is the rdf:langString datatype
    pub fn is_lang_string(&self) -> bool {
        self.0.as_ref() == rdf::LANG_STRING
    }
}

impl PartialEq for Datatype {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Datatype {}

impl std::hash::Hash for Datatype {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialOrd for Datatype {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Datatype {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl std::fmt::Display for Datatype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An RDF term (subject, predicate, or object position)
///
/// # Invariants
///
/// - `Term::Iri` always contains an expanded IRI, never a prefixed form.
/// - A literal with a language tag has datatype `rdf:langString`; literals
///   of datatype `xsd:string` never carry a language tag.
/// - The predicate position of a triple can only be `Term::Iri`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    /// Blank node with a document-stable label
    Blank(BlankId),

    /// Full expanded IRI
    Iri(Arc<str>),

    /// Literal with lexical form and explicit datatype
    Literal {
        /// The lexical form
        lexical: Arc<str>,
        /// Datatype (always present)
        datatype: Datatype,
        /// Language tag (only with datatype rdf:langString)
        language: Option<Arc<str>>,
    },
}

impl Term {
    /// Create an IRI term from an expanded IRI string
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Term::Iri(Arc::from(iri.as_ref()))
    }

    /// Create a blank node term
    pub fn blank(label: impl AsRef<str>) -> Self {
        Term::Blank(BlankId::new(label))
    }

    /// Create a plain string literal (xsd:string)
    pub fn string(lexical: impl AsRef<str>) -> Self {
        Term::Literal {
            lexical: Arc::from(lexical.as_ref()),
            datatype: Datatype::xsd_string(),
            language: None,
        }
    }

    /// Create a language-tagged string literal (rdf:langString)
    pub fn lang_string(lexical: impl AsRef<str>, lang: impl AsRef<str>) -> Self {
        Term::Literal {
            lexical: Arc::from(lexical.as_ref()),
            datatype: Datatype::rdf_lang_string(),
            language: Some(Arc::from(lang.as_ref())),
        }
    }

    /// Create a typed literal
    pub fn typed(lexical: impl AsRef<str>, datatype: Datatype) -> Self {
        Term::Literal {
            lexical: Arc::from(lexical.as_ref()),
            datatype,
            language: None,
        }
    }

    /// Check if this is an IRI term
    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    /// Check if this is a blank node
    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Blank(_))
    }

    /// Check if this is a literal
    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal { .. })
    }

    /// Try to get as IRI string
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Try to get as blank node ID
    pub fn as_blank(&self) -> Option<&BlankId> {
        match self {
            Term::Blank(id) => Some(id),
            _ => None,
        }
    }

    /// Try to get the lexical form of a literal
    pub fn lexical_form(&self) -> Option<&str> {
        match self {
            Term::Literal { lexical, .. } => Some(lexical),
            _ => None,
        }
    }

    /// Try to get literal components (lexical form, datatype, language)
    pub fn as_literal(&self) -> Option<(&str, &Datatype, Option<&str>)> {
        match self {
            Term::Literal {
                lexical,
                datatype,
                language,
            } => Some((lexical, datatype, language.as_deref())),
            _ => None,
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::Blank(id) => write!(f, "{id}"),
            Term::Literal {
                lexical,
                datatype,
                language,
            } => {
                write!(f, "\"{lexical}\"")?;
                if let Some(lang) = language {
                    write!(f, "@{lang}")
                } else if !datatype.is_xsd_string() {
                    write!(f, "^^<{datatype}>")
                } else {
                    Ok(())
                }
            }
        }
    }
}
