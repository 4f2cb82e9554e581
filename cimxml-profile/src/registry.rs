//! Registry of CIM profile ontologies and their compiled datatype maps
//!
//! Registration compiles each profile graph into a property ->
//! [`PropertyInfo`] map once; lookups for the profile sets referenced by
//! model headers are answered from per-profile maps, with merged maps cached
//! by profile-set key. The registry is read-mostly and safe for concurrent
//! reads once populated.

use crate::{builtin_primitive_table, CimProfile, ProfileError, Result};
use cimxml_graph::{Datatype, IndexedGraph, Term, TriplePattern};
use cimxml_vocab::cim::CimVersion;
use cimxml_vocab::{cims, rdfs, xsd};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Information about a CIM property: its domain, and either the RDF datatype
/// of its values or the class its values reference.
///
/// Exactly one of `primitive_datatype` and `reference_type` is set:
/// a datatype property carries the former, an object property the latter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyInfo {
    /// The domain class of this property
    pub rdf_type: Term,
    /// The property IRI
    pub property: Term,
    /// The CIM datatype definition node, when one exists
    pub cim_datatype: Option<Term>,
    /// RDF datatype for primitive-valued properties
    pub primitive_datatype: Option<Datatype>,
    /// Range class for object properties
    pub reference_type: Option<Term>,
}

/// Compiled property map of one or more profiles.
pub type PropertyMap = FxHashMap<Term, PropertyInfo>;

struct Entry {
    id: u32,
    profile: Arc<CimProfile>,
    properties: Arc<PropertyMap>,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u32,
    profiles: Vec<Arc<Entry>>,
    single_version_iri: FxHashMap<Arc<str>, Arc<Entry>>,
    multi_version_iri: FxHashMap<BTreeSet<Arc<str>>, Arc<Entry>>,
    header_profiles: FxHashMap<CimVersion, Arc<Entry>>,
    merged_cache: FxHashMap<BTreeSet<u32>, Arc<PropertyMap>>,
    primitives: FxHashMap<String, Datatype>,
}

/// Registry for CIM profile ontologies and their associated datatypes.
pub struct ProfileRegistry {
    inner: RwLock<RegistryInner>,
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileRegistry {
    /// Create a registry initialized with the built-in primitive type table.
    pub fn new() -> Self {
        let inner = RegistryInner {
            primitives: builtin_primitive_table(),
            ..RegistryInner::default()
        };
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Register a profile.
    ///
    /// Rejects a profile whose single version IRI is already registered,
    /// whose version IRI set is already registered, or - for header
    /// profiles - whose CIM version already has one. On acceptance the
    /// profile graph is compiled into its property map.
    pub fn register(&self, profile: CimProfile) -> Result<Arc<CimProfile>> {
        let mut inner = self.inner.write();
        let properties = Arc::new(compile_properties(profile.graph(), &inner.primitives));
        let profile = Arc::new(profile);

        if profile.is_header_profile() {
            let version = profile.cim_version();
            if version == CimVersion::NoCim {
                return Err(ProfileError::HeaderProfileWithoutVersion);
            }
            if inner.header_profiles.contains_key(&version) {
                return Err(ProfileError::DuplicateHeaderProfile(version));
            }
            let entry = inner.new_entry(profile.clone(), properties);
            inner.header_profiles.insert(version, entry);
            return Ok(profile);
        }

        let version_iris = profile.owl_version_iris();
        if version_iris.is_empty() {
            return Err(ProfileError::NoVersionIri);
        }

        if version_iris.len() == 1 {
            let Some(iri) = version_iris.iter().next().cloned() else {
                return Err(ProfileError::NoVersionIri);
            };
            if inner.single_version_iri.contains_key(&iri) {
                return Err(ProfileError::DuplicateVersionIri(iri.to_string()));
            }
            let entry = inner.new_entry(profile.clone(), properties);
            inner.single_version_iri.insert(iri, entry);
        } else {
            if inner.multi_version_iri.contains_key(&version_iris) {
                return Err(ProfileError::DuplicateVersionIriSet);
            }
            let entry = inner.new_entry(profile.clone(), properties);
            inner.multi_version_iri.insert(version_iris, entry);
        }
        Ok(profile)
    }

    /// True if every version IRI in the set resolves to a registered
    /// profile.
    pub fn contains_profile(&self, version_iris: &BTreeSet<Arc<str>>) -> Result<bool> {
        if version_iris.is_empty() {
            return Err(ProfileError::EmptyVersionIriSet);
        }
        let inner = self.inner.read();
        Ok(version_iris.iter().all(|iri| inner.resolve(iri).is_some()))
    }

    /// True if a header profile is registered for the given CIM version.
    pub fn contains_header_profile(&self, version: CimVersion) -> Result<bool> {
        if version == CimVersion::NoCim {
            return Err(ProfileError::InvalidCimVersion);
        }
        Ok(self.inner.read().header_profiles.contains_key(&version))
    }

    /// All registered profiles, including header profiles.
    pub fn registered_profiles(&self) -> Vec<Arc<CimProfile>> {
        self.inner
            .read()
            .profiles
            .iter()
            .map(|e| e.profile.clone())
            .collect()
    }

    /// The merged property map for a set of version IRIs as found in a
    /// model header.
    ///
    /// Returns `None` when any of the IRIs does not resolve to a registered
    /// profile. Repeated calls with an equal set return the same cached map.
    pub fn properties_and_datatypes(
        &self,
        version_iris: &BTreeSet<Arc<str>>,
    ) -> Result<Option<Arc<PropertyMap>>> {
        if version_iris.is_empty() {
            return Err(ProfileError::EmptyVersionIriSet);
        }

        let inner = self.inner.read();

        if version_iris.len() == 1 {
            if let Some(iri) = version_iris.iter().next() {
                if let Some(entry) = inner.single_version_iri.get(iri) {
                    return Ok(Some(entry.properties.clone()));
                }
            }
        }

        if let Some(entry) = inner.multi_version_iri.get(version_iris) {
            return Ok(Some(entry.properties.clone()));
        }

        let mut entries: FxHashMap<u32, Arc<Entry>> = FxHashMap::default();
        for iri in version_iris {
            match inner.resolve(iri) {
                Some(entry) => {
                    entries.insert(entry.id, entry);
                }
                None => return Ok(None),
            }
        }

        if entries.len() == 1 {
            if let Some(entry) = entries.values().next() {
                return Ok(Some(entry.properties.clone()));
            }
        }

        let key: BTreeSet<u32> = entries.keys().copied().collect();
        if let Some(merged) = inner.merged_cache.get(&key) {
            return Ok(Some(merged.clone()));
        }
        drop(inner);

        let mut inner = self.inner.write();
        if let Some(merged) = inner.merged_cache.get(&key) {
            return Ok(Some(merged.clone()));
        }
        let mut merged = PropertyMap::default();
        for entry in entries.values() {
            for (k, v) in entry.properties.iter() {
                merged.insert(k.clone(), v.clone());
            }
        }
        let merged = Arc::new(merged);
        inner.merged_cache.insert(key, merged.clone());
        Ok(Some(merged))
    }

    /// The property map of the header profile registered for the given CIM
    /// version, or `None` when there is none.
    pub fn header_properties_and_datatypes(
        &self,
        version: CimVersion,
    ) -> Result<Option<Arc<PropertyMap>>> {
        if version == CimVersion::NoCim {
            return Err(ProfileError::InvalidCimVersion);
        }
        Ok(self
            .inner
            .read()
            .header_profiles
            .get(&version)
            .map(|e| e.properties.clone()))
    }

    /// Insert or overwrite a CIM primitive type mapping.
    ///
    /// Custom mappings affect profiles registered afterwards.
    pub fn register_primitive_type(&self, name: impl Into<String>, datatype: Datatype) {
        self.inner.write().primitives.insert(name.into(), datatype);
    }

    /// The current primitive type mapping.
    pub fn primitive_type_mapping(&self) -> FxHashMap<String, Datatype> {
        self.inner.read().primitives.clone()
    }
}

impl RegistryInner {
    fn new_entry(&mut self, profile: Arc<CimProfile>, properties: Arc<PropertyMap>) -> Arc<Entry> {
        let entry = Arc::new(Entry {
            id: self.next_id,
            profile,
            properties,
        });
        self.next_id += 1;
        self.profiles.push(entry.clone());
        entry
    }

    /// Resolve one version IRI to its registered profile: the singleton map
    /// first, otherwise any multi-IRI profile containing it.
    fn resolve(&self, iri: &Arc<str>) -> Option<Arc<Entry>> {
        if let Some(entry) = self.single_version_iri.get(iri) {
            return Some(entry.clone());
        }
        self.multi_version_iri
            .iter()
            .find(|(iris, _)| iris.contains(iri))
            .map(|(_, entry)| entry.clone())
    }
}

/// Compile the property/datatype map of one profile graph.
///
/// This is the fixed registry query, hand-written against the graph-pattern
/// contract: for each property with an `rdfs:domain`, either its
/// `rdfs:range` yields a reference type (subject to the optional
/// `cims:AssociationUsed "Yes"` filter), or its `cims:dataType` leads - via
/// a CIMDatatype's `value` attribute or directly - to a Primitive whose
/// label names the primitive type.
fn compile_properties(
    graph: &IndexedGraph,
    primitives: &FxHashMap<String, Datatype>,
) -> PropertyMap {
    let mut map = PropertyMap::default();

    let domain_pattern = TriplePattern::new(None, Some(Term::iri(rdfs::DOMAIN)), None);
    for domain_triple in graph.find(&domain_pattern) {
        let property = &domain_triple.s;
        let rdf_type = &domain_triple.o;

        // rdfs:range branch: object property, unless an AssociationUsed
        // marker says the association is not used in this profile.
        let range_pattern = TriplePattern::with_sp(property.clone(), Term::iri(rdfs::RANGE));
        for range_triple in graph.find(&range_pattern) {
            if association_used(graph, property) {
                map.insert(
                    property.clone(),
                    PropertyInfo {
                        rdf_type: rdf_type.clone(),
                        property: property.clone(),
                        cim_datatype: None,
                        primitive_datatype: None,
                        reference_type: Some(range_triple.o.clone()),
                    },
                );
            }
        }

        // cims:dataType branch: datatype property.
        let datatype_pattern = TriplePattern::with_sp(property.clone(), Term::iri(cims::DATA_TYPE));
        for datatype_triple in graph.find(&datatype_pattern) {
            let cim_datatype = &datatype_triple.o;
            let Some(primitive_name) = primitive_name_of(graph, cim_datatype) else {
                continue;
            };
            let datatype = resolve_primitive(primitives, &primitive_name);
            map.insert(
                property.clone(),
                PropertyInfo {
                    rdf_type: rdf_type.clone(),
                    property: property.clone(),
                    cim_datatype: Some(cim_datatype.clone()),
                    primitive_datatype: Some(datatype),
                    reference_type: None,
                },
            );
        }
    }

    map
}

/// Optional `cims:AssociationUsed` filter: unbound or "Yes" passes.
fn association_used(graph: &IndexedGraph, property: &Term) -> bool {
    let pattern = TriplePattern::with_sp(property.clone(), Term::iri(cims::ASSOCIATION_USED));
    match graph.find(&pattern).next() {
        None => true,
        Some(t) => t.o.lexical_form() == Some("Yes"),
    }
}

fn has_stereotype(graph: &IndexedGraph, node: &Term, stereotype: &str) -> bool {
    let pattern = TriplePattern::with_sp(node.clone(), Term::iri(cims::STEREOTYPE));
    graph
        .find(&pattern)
        .any(|t| t.o.lexical_form() == Some(stereotype))
}

fn label_of(graph: &IndexedGraph, node: &Term) -> Option<String> {
    let pattern = TriplePattern::with_sp(node.clone(), Term::iri(rdfs::LABEL));
    graph
        .find(&pattern)
        .next()
        .and_then(|t| t.o.lexical_form().map(str::to_string))
}

/// The primitive type name behind a `cims:dataType` node.
///
/// Either the node is a CIMDatatype whose `value` attribute's datatype is a
/// Primitive, or the node itself is a Primitive; the Primitive's label is
/// the name.
fn primitive_name_of(graph: &IndexedGraph, cim_datatype: &Term) -> Option<String> {
    if has_stereotype(graph, cim_datatype, "CIMDatatype") {
        let attr_pattern =
            TriplePattern::with_po(Term::iri(rdfs::DOMAIN), cim_datatype.clone());
        for attr_triple in graph.find(&attr_pattern) {
            let attribute = &attr_triple.s;
            if label_of(graph, attribute).as_deref() != Some("value") {
                continue;
            }
            let inner_pattern =
                TriplePattern::with_sp(attribute.clone(), Term::iri(cims::DATA_TYPE));
            for inner in graph.find(&inner_pattern) {
                if has_stereotype(graph, &inner.o, "Primitive") {
                    if let Some(name) = label_of(graph, &inner.o) {
                        return Some(name);
                    }
                }
            }
        }
    }
    if has_stereotype(graph, cim_datatype, "Primitive") {
        return label_of(graph, cim_datatype);
    }
    None
}

fn resolve_primitive(primitives: &FxHashMap<String, Datatype>, name: &str) -> Datatype {
    match primitives.get(name) {
        Some(datatype) => datatype.clone(),
        None => {
            tracing::warn!(
                primitive = name,
                "unknown mapping from CIM primitive to XSD datatype, using xsd:string as fallback"
            );
            Datatype::from_iri(xsd::STRING)
        }
    }
}
