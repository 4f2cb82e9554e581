//! CIM profile ontology wrappers
//!
//! A profile graph is recognized as one of three flavors:
//!
//! - **CIM 16** (CGMES 2.4.15): version IRIs and keyword are `cims:isFixed`
//!   texts on `...Version.shortName` / `...Version.entsoeURI*` /
//!   `...Version.baseURI*` properties;
//! - **CIM 17** (CGMES 3.0): one `owl:Ontology` subject with `dcat:keyword`
//!   and `owl:versionIRI`;
//! - **CIM 18**: as CIM 17, with document-header profiles identified by
//!   their version IRI.
//!
//! Header profiles describe the metadata block of a model document; they are
//! not referenced by version IRI from models, and CIM 16/17 header profiles
//! report the synthetic keyword `"DH"` for backward compatibility.

use crate::{ProfileError, Result};
use cimxml_graph::{IndexedGraph, Term, TriplePattern};
use cimxml_vocab::cim::CimVersion;
use cimxml_vocab::{cims, dcat, owl, rdf};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Profile IRI endings for CGMES 2.4.15, e.g.
/// `http://entsoe.eu/CIM/SchemaExtension/3/1#EquipmentVersion`.
const PROFILE_VERSION_POSTFIX: &str = "Version";

/// Header-profile package marker in CIM 16/17 profiles.
const PACKAGE_FILE_HEADER_PROFILE: &str = "#Package_FileHeaderProfile";

/// Version-IRI prefix identifying CIM 18 document-header profiles.
const DOCUMENT_HEADER_VERSION_IRI_START: &str = "https://ap-voc.cim4.eu/DocumentHeader";

/// A recognized CIM profile ontology, one variant per schema flavor.
#[derive(Debug)]
pub enum CimProfile {
    /// CGMES 2.4.15 style profile
    Cim16(Profile16),
    /// CGMES 3.0 style profile
    Cim17(Profile17),
    /// CIM 18 style profile
    Cim18(Profile18),
}

impl CimProfile {
    /// Detect the flavor of a profile graph and wrap it.
    ///
    /// The CIM version is derived from the graph's `cim` prefix, then the
    /// flavor-specific recognizer runs. Graphs with neither the ontology
    /// fingerprint nor the header-class fingerprint are rejected.
    pub fn wrap(graph: IndexedGraph) -> Result<CimProfile> {
        let cim_namespace = graph
            .prefixes()
            .get("cim")
            .ok_or(ProfileError::NotACimGraph)?;
        let version = CimVersion::from_namespace(cim_namespace);

        match version {
            CimVersion::NoCim => Err(ProfileError::NotACimGraph),
            CimVersion::Cim16 => {
                if is_class_category_header(&graph) {
                    return Ok(CimProfile::Cim16(Profile16 {
                        graph,
                        is_header: true,
                    }));
                }
                if has_cim16_version_iri_and_keyword(&graph) {
                    return Ok(CimProfile::Cim16(Profile16 {
                        graph,
                        is_header: false,
                    }));
                }
                Err(ProfileError::MissingCim16VersionInfo)
            }
            CimVersion::Cim17 => {
                if is_class_category_header(&graph) {
                    // Header profiles keep the CIM 16 fingerprint even in
                    // CGMES 3.0 documents.
                    return Ok(CimProfile::Cim17(Profile17 {
                        graph,
                        is_header: true,
                    }));
                }
                let profile = Profile17::checked(graph, false)?;
                Ok(CimProfile::Cim17(profile))
            }
            CimVersion::Cim18 => {
                if is_cim18_document_header(&graph) {
                    return Ok(CimProfile::Cim18(Profile18(Profile17 {
                        graph,
                        is_header: true,
                    })));
                }
                let profile = Profile17::checked(graph, false)?;
                Ok(CimProfile::Cim18(Profile18(profile)))
            }
        }
    }

    /// The wrapped profile graph.
    pub fn graph(&self) -> &IndexedGraph {
        match self {
            CimProfile::Cim16(p) => &p.graph,
            CimProfile::Cim17(p) => &p.graph,
            CimProfile::Cim18(p) => &p.0.graph,
        }
    }

    /// The CIM version of this profile.
    pub fn cim_version(&self) -> CimVersion {
        match self {
            CimProfile::Cim16(_) => CimVersion::Cim16,
            CimProfile::Cim17(_) => CimVersion::Cim17,
            CimProfile::Cim18(_) => CimVersion::Cim18,
        }
    }

    /// True for header profiles (model/document header schemas).
    pub fn is_header_profile(&self) -> bool {
        match self {
            CimProfile::Cim16(p) => p.is_header,
            CimProfile::Cim17(p) => p.is_header,
            CimProfile::Cim18(p) => p.0.is_header,
        }
    }

    /// The keyword of the profile (`dcat:keyword`, or the CGMES 2.4.15
    /// `...Version.shortName` fixed text). CIM 16/17 header profiles report
    /// the synthetic keyword `"DH"`.
    pub fn dcat_keyword(&self) -> Option<String> {
        match self {
            CimProfile::Cim16(p) => p.dcat_keyword(),
            CimProfile::Cim17(p) => p.dcat_keyword(),
            CimProfile::Cim18(p) => p.0.dcat_keyword(),
        }
    }

    /// The version IRIs of the profile; non-empty for non-header profiles.
    pub fn owl_version_iris(&self) -> BTreeSet<Arc<str>> {
        match self {
            CimProfile::Cim16(p) => p.owl_version_iris(),
            CimProfile::Cim17(p) => p.owl_version_iris(),
            CimProfile::Cim18(p) => p.0.owl_version_iris(),
        }
    }

    /// The `owl:versionInfo` of the ontology subject; CGMES 2.4.15 profiles
    /// have none.
    pub fn owl_version_info(&self) -> Option<String> {
        match self {
            CimProfile::Cim16(_) => None,
            CimProfile::Cim17(p) => p.owl_version_info(),
            CimProfile::Cim18(p) => p.0.owl_version_info(),
        }
    }
}

impl PartialEq for CimProfile {
    /// Two profiles are equal if they have the same CIM version and either
    /// both are header profiles or they have the same set of version IRIs.
    fn eq(&self, other: &Self) -> bool {
        if self.cim_version() != other.cim_version() {
            return false;
        }
        if self.is_header_profile() {
            return other.is_header_profile();
        }
        if other.is_header_profile() {
            return false;
        }
        self.owl_version_iris() == other.owl_version_iris()
    }
}

impl Eq for CimProfile {}

/// A CGMES 2.4.15 profile.
#[derive(Debug)]
pub struct Profile16 {
    graph: IndexedGraph,
    is_header: bool,
}

impl Profile16 {
    fn dcat_keyword(&self) -> Option<String> {
        if self.is_header {
            // CGMES 2.4.15 file header profiles carry no keyword; report
            // "DH" to match the new ontology document header profiles.
            return Some("DH".to_string());
        }
        cim16_fixed_texts(&self.graph, ".shortName").into_iter().next()
    }

    fn owl_version_iris(&self) -> BTreeSet<Arc<str>> {
        let mut iris: BTreeSet<Arc<str>> = BTreeSet::new();
        for text in cim16_fixed_texts(&self.graph, ".entsoeURI") {
            iris.insert(Arc::from(text.as_str()));
        }
        for text in cim16_fixed_texts(&self.graph, ".baseURI") {
            iris.insert(Arc::from(text.as_str()));
        }
        iris
    }
}

/// A CGMES 3.0 profile.
#[derive(Debug)]
pub struct Profile17 {
    graph: IndexedGraph,
    is_header: bool,
}

impl Profile17 {
    fn checked(graph: IndexedGraph, is_header: bool) -> Result<Profile17> {
        if ontology_subject(&graph).is_none() {
            return Err(ProfileError::MissingOntology);
        }
        if !has_cim17_version_iri_and_keyword(&graph) {
            return Err(ProfileError::MissingVersionIriOrKeyword);
        }
        Ok(Profile17 { graph, is_header })
    }

    fn dcat_keyword(&self) -> Option<String> {
        if self.is_header {
            return Some("DH".to_string());
        }
        let ontology = ontology_subject(&self.graph)?;
        let pattern = TriplePattern::with_sp(ontology, Term::iri(dcat::KEYWORD));
        self.graph
            .find(&pattern)
            .next()
            .map(|t| term_text(&t.o).to_string())
    }

    fn owl_version_iris(&self) -> BTreeSet<Arc<str>> {
        let Some(ontology) = ontology_subject(&self.graph) else {
            return BTreeSet::new();
        };
        let pattern = TriplePattern::with_sp(ontology, Term::iri(owl::VERSION_IRI));
        self.graph
            .find(&pattern)
            .map(|t| Arc::from(term_text(&t.o)))
            .collect()
    }

    fn owl_version_info(&self) -> Option<String> {
        let ontology = ontology_subject(&self.graph)?;
        let pattern = TriplePattern::with_sp(ontology, Term::iri(owl::VERSION_INFO));
        self.graph
            .find(&pattern)
            .next()
            .map(|t| term_text(&t.o).to_string())
    }
}

/// A CIM 18 profile; the ontology shape is the CIM 17 one, only header
/// detection differs.
#[derive(Debug)]
pub struct Profile18(Profile17);

/// The textual value of a term: IRI string or literal lexical form.
fn term_text(term: &Term) -> &str {
    match term {
        Term::Iri(iri) => iri,
        Term::Literal { lexical, .. } => lexical,
        Term::Blank(id) => id.as_str(),
    }
}

/// CGMES 2.4.15 fixed texts for one profile-version property.
///
/// Finds triples `?property rdfs:domain ?class` where the class IRI ends
/// with `Version` and the property IRI is `<class>` + `<name>` (name given
/// with its leading dot), then collects the `cims:isFixed` literal values of
/// those properties.
fn cim16_fixed_texts(graph: &IndexedGraph, property_name_with_dot: &str) -> Vec<String> {
    let domain_pattern = TriplePattern::new(None, Some(Term::iri(cimxml_vocab::rdfs::DOMAIN)), None);
    let mut texts = Vec::new();
    for t in graph.find(&domain_pattern) {
        let (Some(subject), Some(object)) = (t.s.as_iri(), t.o.as_iri()) else {
            continue;
        };
        if !object.ends_with(PROFILE_VERSION_POSTFIX) {
            continue;
        }
        if !subject.starts_with(object) || !subject[object.len()..].starts_with(property_name_with_dot)
        {
            continue;
        }
        let fixed_pattern = TriplePattern::with_sp(t.s.clone(), Term::iri(cims::IS_FIXED));
        for fixed in graph.find(&fixed_pattern) {
            if let Some(lexical) = fixed.o.lexical_form() {
                texts.push(lexical.to_string());
            }
        }
    }
    texts.sort();
    texts
}

fn has_cim16_version_iri_and_keyword(graph: &IndexedGraph) -> bool {
    if cim16_fixed_texts(graph, ".shortName").is_empty() {
        return false;
    }
    !cim16_fixed_texts(graph, ".entsoeURI").is_empty()
        || !cim16_fixed_texts(graph, ".baseURI").is_empty()
}

/// CIM 16/17 header fingerprint: a `cims:ClassCategory` subject whose IRI
/// ends with `#Package_FileHeaderProfile`.
fn is_class_category_header(graph: &IndexedGraph) -> bool {
    let pattern = TriplePattern::with_po(Term::iri(rdf::TYPE), Term::iri(cims::CLASS_CATEGORY));
    graph
        .find(&pattern)
        .any(|t| matches!(t.s.as_iri(), Some(iri) if iri.ends_with(PACKAGE_FILE_HEADER_PROFILE)))
}

fn ontology_subject(graph: &IndexedGraph) -> Option<Term> {
    let pattern = TriplePattern::with_po(Term::iri(rdf::TYPE), Term::iri(owl::ONTOLOGY));
    graph.find(&pattern).next().map(|t| t.s.clone())
}

fn has_cim17_version_iri_and_keyword(graph: &IndexedGraph) -> bool {
    let keyword = TriplePattern::new(None, Some(Term::iri(dcat::KEYWORD)), None);
    let version_iri = TriplePattern::new(None, Some(Term::iri(owl::VERSION_IRI)), None);
    graph.find(&keyword).next().is_some() && graph.find(&version_iri).next().is_some()
}

/// CIM 18 header fingerprint: an ontology with a version IRI starting with
/// the document-header vocabulary.
fn is_cim18_document_header(graph: &IndexedGraph) -> bool {
    let Some(ontology) = ontology_subject(graph) else {
        return false;
    };
    let pattern = TriplePattern::with_sp(ontology, Term::iri(owl::VERSION_IRI));
    graph
        .find(&pattern)
        .any(|t| term_text(&t.o).starts_with(DOCUMENT_HEADER_VERSION_IRI_START))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cimxml_graph::{IndexingMode, Triple};
    use cimxml_vocab::{cim, rdfs};

    fn cim16_profile_graph() -> IndexedGraph {
        let mut g = IndexedGraph::new(IndexingMode::LazyParallel);
        g.set_prefix("cim", cim::NS_CIM16);
        let class = "http://entsoe.eu/CIM/SchemaExtension/3/1#EquipmentVersion";
        let short_name = format!("{class}.shortName");
        let entsoe_uri = format!("{class}.entsoeURIcore");
        g.add(Triple::new(
            Term::iri(&short_name),
            Term::iri(rdfs::DOMAIN),
            Term::iri(class),
        ));
        g.add(Triple::new(
            Term::iri(&short_name),
            Term::iri(cims::IS_FIXED),
            Term::string("EQ"),
        ));
        g.add(Triple::new(
            Term::iri(&entsoe_uri),
            Term::iri(rdfs::DOMAIN),
            Term::iri(class),
        ));
        g.add(Triple::new(
            Term::iri(&entsoe_uri),
            Term::iri(cims::IS_FIXED),
            Term::string("http://entsoe.eu/CIM/EquipmentCore/3/1"),
        ));
        g
    }

    fn cim17_profile_graph() -> IndexedGraph {
        let mut g = IndexedGraph::new(IndexingMode::LazyParallel);
        g.set_prefix("cim", cim::NS_CIM17);
        let ontology = Term::iri("http://iec.ch/TC57/ns/CIM/CoreEquipment-EU");
        g.add(Triple::new(
            ontology.clone(),
            Term::iri(rdf::TYPE),
            Term::iri(owl::ONTOLOGY),
        ));
        g.add(Triple::new(
            ontology.clone(),
            Term::iri(dcat::KEYWORD),
            Term::string("EQ"),
        ));
        g.add(Triple::new(
            ontology.clone(),
            Term::iri(owl::VERSION_IRI),
            Term::iri("http://iec.ch/TC57/ns/CIM/CoreEquipment-EU/3.0"),
        ));
        g.add(Triple::new(
            ontology,
            Term::iri(owl::VERSION_INFO),
            Term::string("3.0.0"),
        ));
        g
    }

    #[test]
    fn test_wrap_cim16() {
        let profile = CimProfile::wrap(cim16_profile_graph()).unwrap();
        assert_eq!(profile.cim_version(), CimVersion::Cim16);
        assert!(!profile.is_header_profile());
        assert_eq!(profile.dcat_keyword().as_deref(), Some("EQ"));
        let iris = profile.owl_version_iris();
        assert_eq!(iris.len(), 1);
        assert!(iris.contains("http://entsoe.eu/CIM/EquipmentCore/3/1"));
        assert_eq!(profile.owl_version_info(), None);
    }

    #[test]
    fn test_wrap_cim16_header() {
        let mut g = IndexedGraph::new(IndexingMode::LazyParallel);
        g.set_prefix("cim", cim::NS_CIM16);
        g.add(Triple::new(
            Term::iri("http://entsoe.eu/CIM/SchemaExtension/3/1#Package_FileHeaderProfile"),
            Term::iri(rdf::TYPE),
            Term::iri(cims::CLASS_CATEGORY),
        ));
        let profile = CimProfile::wrap(g).unwrap();
        assert!(profile.is_header_profile());
        assert_eq!(profile.dcat_keyword().as_deref(), Some("DH"));
    }

    #[test]
    fn test_wrap_cim16_rejects_incomplete() {
        let mut g = IndexedGraph::new(IndexingMode::LazyParallel);
        g.set_prefix("cim", cim::NS_CIM16);
        assert!(matches!(
            CimProfile::wrap(g),
            Err(ProfileError::MissingCim16VersionInfo)
        ));
    }

    #[test]
    fn test_wrap_cim17() {
        let profile = CimProfile::wrap(cim17_profile_graph()).unwrap();
        assert_eq!(profile.cim_version(), CimVersion::Cim17);
        assert!(!profile.is_header_profile());
        assert_eq!(profile.dcat_keyword().as_deref(), Some("EQ"));
        assert!(profile
            .owl_version_iris()
            .contains("http://iec.ch/TC57/ns/CIM/CoreEquipment-EU/3.0"));
        assert_eq!(profile.owl_version_info().as_deref(), Some("3.0.0"));
    }

    #[test]
    fn test_wrap_cim17_requires_ontology() {
        let mut g = IndexedGraph::new(IndexingMode::LazyParallel);
        g.set_prefix("cim", cim::NS_CIM17);
        assert!(matches!(
            CimProfile::wrap(g),
            Err(ProfileError::MissingOntology)
        ));
    }

    #[test]
    fn test_wrap_cim18_document_header() {
        let mut g = IndexedGraph::new(IndexingMode::LazyParallel);
        g.set_prefix("cim", cim::NS_CIM18);
        let ontology = Term::iri("https://ap-voc.cim4.eu/DocumentHeader-EU");
        g.add(Triple::new(
            ontology.clone(),
            Term::iri(rdf::TYPE),
            Term::iri(owl::ONTOLOGY),
        ));
        g.add(Triple::new(
            ontology.clone(),
            Term::iri(dcat::KEYWORD),
            Term::string("DH"),
        ));
        g.add(Triple::new(
            ontology,
            Term::iri(owl::VERSION_IRI),
            Term::iri("https://ap-voc.cim4.eu/DocumentHeader/2.3"),
        ));
        let profile = CimProfile::wrap(g).unwrap();
        assert_eq!(profile.cim_version(), CimVersion::Cim18);
        assert!(profile.is_header_profile());
    }

    #[test]
    fn test_wrap_rejects_non_cim_graph() {
        let g = IndexedGraph::new(IndexingMode::LazyParallel);
        assert!(matches!(
            CimProfile::wrap(g),
            Err(ProfileError::NotACimGraph)
        ));
    }

    #[test]
    fn test_profile_equality() {
        let a = CimProfile::wrap(cim17_profile_graph()).unwrap();
        let b = CimProfile::wrap(cim17_profile_graph()).unwrap();
        assert_eq!(a, b);

        let c = CimProfile::wrap(cim16_profile_graph()).unwrap();
        assert_ne!(a, c);
    }
}
