//! Streaming RDF/XML + CIMXML state machine
//!
//! A pull-driven parser over the XML event stream, emitting triples to a
//! [`CimXmlSink`]. The RDF/XML 2004 grammar is implemented with the CIMXML
//! extensions: the `iec61970-552` processing instruction, the implicit
//! `urn:uuid:` document base, UUID normalization of `rdf:about`/`rdf:ID`/
//! `rdf:resource` values, `rdf:parseType="Statements"` difference
//! containers, and profile-driven typing of literals that carry no explicit
//! `rdf:datatype`.
//!
//! Document-context transitions are orthogonal to the grammar: recognizing
//! `md:FullModel`, `dm:DifferenceModel`, or a difference container switches
//! the sink's target graph, never the grammar state.

use crate::error::{ErrorHandler, ParseError, Result};
use crate::iri::IriResolver;
use crate::sink::CimXmlSink;
use crate::uuid::{normalize_cim_uuid, CimUuid};
use crate::xml::{ElementHead, QName, XmlEvent, XmlSource};
use cimxml_graph::{Datatype, DocumentContext, Term, Triple};
use cimxml_profile::{ProfileRegistry, PropertyMap};
use cimxml_vocab::cim::CimVersion;
use cimxml_vocab::{dm, md, rdf};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;
use std::sync::Arc;

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";
const IMPLICIT_CIMXML_BASE: &str = "urn:uuid:";
const PI_IEC61970_552: &str = "iec61970-552";

const PARSE_TYPE_RESOURCE: &str = "Resource";
const PARSE_TYPE_LITERAL: &str = "Literal";
const PARSE_TYPE_LITERAL_LOWER: &str = "literal";
const PARSE_TYPE_STATEMENTS: &str = "Statements";
const PARSE_TYPE_COLLECTION: &str = "Collection";

/// The RDF/XML + CIMXML parser.
///
/// Single-threaded: reads from the XML source synchronously and emits to
/// the sink on the same thread.
pub struct Parser<'a, R: BufRead, S: CimXmlSink> {
    xml: XmlSource<R>,
    sink: &'a mut S,
    registry: Option<&'a ProfileRegistry>,
    handler: &'a mut dyn ErrorHandler,
    resolver: IriResolver,

    has_rdf: bool,
    has_cimxml_namespace: bool,
    is_cimxml_model: bool,
    version_of_cimxml: CimVersion,

    blank_labels: FxHashMap<String, Term>,
    blank_counter: u32,

    // rdf:ID reuse tracking per base scope; capped because the map only
    // grows and a base may be re-introduced.
    used_ids: FxHashMap<Option<String>, FxHashMap<String, u64>>,
    tracked_id_count: usize,

    datatype_map: Option<Arc<PropertyMap>>,
    properties_not_in_profile: FxHashSet<Term>,
    current_profiles: Vec<Term>,

    emitted: u64,
}

impl<'a, R: BufRead, S: CimXmlSink> Parser<'a, R, S> {
    /// Create a parser over the given XML source.
    pub fn new(
        xml: XmlSource<R>,
        registry: Option<&'a ProfileRegistry>,
        base: Option<&str>,
        sink: &'a mut S,
        handler: &'a mut dyn ErrorHandler,
    ) -> Self {
        Self {
            xml,
            sink,
            registry,
            handler,
            resolver: IriResolver::new(base),
            has_rdf: false,
            has_cimxml_namespace: false,
            is_cimxml_model: false,
            version_of_cimxml: CimVersion::NoCim,
            blank_labels: FxHashMap::default(),
            blank_counter: 0,
            used_ids: FxHashMap::default(),
            tracked_id_count: 0,
            datatype_map: None,
            properties_not_in_profile: FxHashSet::default(),
            current_profiles: Vec::new(),
            emitted: 0,
        }
    }

    /// Parse the whole document.
    pub fn parse(&mut self) -> Result<()> {
        let span = tracing::info_span!("cimxml_parse", triples = tracing::field::Empty);
        let guard = span.enter();
        let result = self.parse_document();
        drop(guard);
        span.record("triples", self.emitted);
        result
    }

    fn parse_document(&mut self) -> Result<()> {
        let mut ev = self.next_event_any()?;
        while matches!(&ev, XmlEvent::Characters(s) if is_whitespace(s)) {
            ev = self.next_event_any()?;
        }

        if matches!(ev, XmlEvent::Eof) {
            return Err(self.fatal("Empty document"));
        }
        if matches!(ev, XmlEvent::DocType) {
            ev = self.next_event_tag()?;
        }

        let head = match ev {
            XmlEvent::StartElement(head) => head,
            other => {
                return Err(self.fatal(&format!("Not a start element: {}", event_name(&other))))
            }
        };

        if head.name.is(rdf::NS, "RDF") {
            let has_frame = self.push_frames_from(&head);
            self.emit_root_namespaces_and_base(&head);
            self.has_rdf = true;

            let ev = self.next_event_tag()?;
            let ev = self.node_element_loop(ev)?;
            if !matches!(ev, XmlEvent::EndElement(_)) {
                return Err(self.fatal(&format!(
                    "Expected end of rdf:RDF, got {}",
                    event_name(&ev)
                )));
            }
            if has_frame {
                self.resolver.pop_frame();
            }

            let mut ev = self.next_event_any()?;
            while matches!(&ev, XmlEvent::Characters(s) if is_whitespace(s)) {
                ev = self.next_event_any()?;
            }
        } else {
            // Loosely: a document may be a single node element.
            self.node_element(head, None)?;
        }
        Ok(())
    }

    // ---- Event reading

    fn next_event_raw(&mut self) -> Result<XmlEvent> {
        self.xml.next_event()
    }

    /// Next event, skipping comments and handling processing instructions.
    fn next_event_any(&mut self) -> Result<XmlEvent> {
        loop {
            let ev = self.xml.next_event()?;
            match ev {
                XmlEvent::Comment(_) => continue,
                XmlEvent::ProcessingInstruction { target, data } => {
                    if target == PI_IEC61970_552 {
                        self.sink.set_version_of_iec61970_552(&data);
                    } else {
                        self.warn("XML processing instruction - ignored");
                    }
                    continue;
                }
                other => return Ok(other),
            }
        }
    }

    /// Next start or end element, skipping comments, DTDs, and ignorable
    /// whitespace.
    fn next_event_tag(&mut self) -> Result<XmlEvent> {
        loop {
            let ev = self.xml.next_event()?;
            match ev {
                XmlEvent::StartElement(_) | XmlEvent::EndElement(_) | XmlEvent::Eof => {
                    return Ok(ev)
                }
                XmlEvent::Characters(s) => {
                    if !is_whitespace(&s) {
                        return Err(self.fatal(&format!(
                            "Expecting a start or end element. Got characters '{}'",
                            non_whitespace_msg(&s)
                        )));
                    }
                }
                XmlEvent::Comment(_) | XmlEvent::DocType => {}
                other => {
                    return Err(self.fatal(&format!("Unexpected event {}", event_name(&other))))
                }
            }
        }
    }

    // ---- Base and language frames

    fn push_frames_from(&mut self, head: &ElementHead) -> bool {
        let base_attr = head.attribute(XML_NS, "base").map(str::to_string);
        let lang_attr = head.attribute(XML_NS, "lang").map(str::to_string);
        if base_attr.is_none() && lang_attr.is_none() {
            return false;
        }
        let resolved_base = base_attr.map(|b| {
            let resolved = self.resolver.resolve(&b);
            if resolved.is_relative {
                self.warn(&format!("Relative URI for base: <{b}>"));
            }
            resolved.iri.to_string()
        });
        self.resolver
            .push_frame(resolved_base.as_deref(), lang_attr.as_deref());
        true
    }

    // ---- rdf:RDF

    fn emit_root_namespaces_and_base(&mut self, head: &ElementHead) {
        for (prefix, uri) in &head.ns_decls {
            if prefix == "cim" {
                self.version_of_cimxml = CimVersion::from_namespace(uri);
                if self.version_of_cimxml == CimVersion::NoCim {
                    self.warn(&format!("Unrecognized 'cim' namespace: {uri}"));
                }
            }
            self.sink.prefix(prefix, uri);
        }

        let mut xml_base = head.attribute(XML_NS, "base").map(str::to_string);
        if self.version_of_cimxml != CimVersion::NoCim {
            self.has_cimxml_namespace = true;
            self.sink.set_version_of_cimxml(self.version_of_cimxml);
            if xml_base.is_none() {
                xml_base = Some(IMPLICIT_CIMXML_BASE.to_string());
                self.resolver.set_base(IMPLICIT_CIMXML_BASE);
            }
        }
        if let Some(base) = xml_base {
            self.sink.base(&base);
        }
    }

    // ---- Node elements

    fn node_element_loop(&mut self, mut ev: XmlEvent) -> Result<XmlEvent> {
        loop {
            match ev {
                XmlEvent::StartElement(head) => {
                    self.node_element(head, None)?;
                    ev = self.next_event_tag()?;
                }
                other => return Ok(other),
            }
        }
    }

    /// Process one node element. The subject may already have been
    /// determined (nested node elements, collection items).
    fn node_element(&mut self, head: ElementHead, subject: Option<Term>) -> Result<()> {
        if !allowed_node_element(&head.name) {
            return Err(self.fatal(&format!(
                "Not allowed as a node element tag: '{}'",
                head.name
            )));
        }
        if head.attribute(rdf::NS, "resource").is_some() {
            return Err(self.fatal(&format!(
                "rdf:resource not allowed as attribute here: {}",
                head.name
            )));
        }

        let has_frame = self.push_frames_from(&head);
        let subject = match subject {
            Some(subject) => subject,
            None => self.attributes_to_subject_node(&head)?,
        };
        let result = self.node_element_process(&head, &subject);
        if has_frame {
            self.resolver.pop_frame();
        }
        result
    }

    fn node_element_process(&mut self, head: &ElementHead, subject: &Term) -> Result<()> {
        let qname = &head.name;
        let mut is_full_model = false;

        if !qname.is(rdf::NS, "Description") {
            // Typed node element.
            if is_member_property(qname) {
                self.warn(&format!("{qname} is being used on a typed node"));
            } else if not_recognized_rdf_type(qname) {
                self.warn(&format!("{qname} is not a recognized RDF term for a type"));
            }

            if self.has_cimxml_namespace && !self.is_cimxml_model {
                if qname.is(md::NS, md::LOCAL_FULL_MODEL) {
                    self.sink.set_current_context(DocumentContext::FullModel);
                    is_full_model = true;
                    self.is_cimxml_model = true;
                } else if qname.is(dm::NS, dm::LOCAL_DIFFERENCE_MODEL) {
                    self.sink.set_current_context(DocumentContext::DifferenceModel);
                    self.is_cimxml_model = true;
                }

                if self.is_cimxml_model {
                    let registry = self.registry;
                    match registry {
                        None => self.warn(
                            "No profile registry has been provided, so missing datatypes in CIMXML cannot be resolved",
                        ),
                        Some(registry) => {
                            match registry.header_properties_and_datatypes(self.version_of_cimxml)
                            {
                                Ok(Some(map)) => self.datatype_map = Some(map),
                                _ => self.warn(&format!(
                                    "No header profile has been registered for CIM version {}",
                                    self.version_of_cimxml
                                )),
                            }
                            self.properties_not_in_profile.clear();
                        }
                    }
                }
            }

            let type_iri = self.qname_to_iri(qname, "typed node element")?;
            self.emit(subject.clone(), Term::iri(rdf::TYPE), type_iri);
        }

        self.process_property_attributes(Some(subject.clone()), head, false)?;

        let ev = self.next_event_tag()?;
        let ev = self.property_element_loop(subject, ev)?;
        if !matches!(ev, XmlEvent::EndElement(_)) {
            return Err(self.fatal(&format!("Expected end element for {qname}")));
        }

        if self.is_cimxml_model && is_full_model {
            self.sink.set_current_context(DocumentContext::Body);
            self.install_model_header_profile_map();
        }
        Ok(())
    }

    /// After the model header closed (or on first entry into a difference
    /// container): capture the profile IRIs from the header and install the
    /// matching property map for literal typing.
    fn install_model_header_profile_map(&mut self) {
        let header_profiles = self.sink.model_header().map(|header| header.profiles());
        let profiles = match header_profiles {
            None => {
                self.warn("No model header has been found in CIMXML");
                return;
            }
            Some(Err(_)) => {
                self.warn("No model header subject has been found in CIMXML");
                return;
            }
            Some(Ok(profiles)) => profiles,
        };
        if profiles.is_empty() {
            self.warn("No profile IRIs have been found in the CIMXML model header");
            return;
        }

        let mut profiles: Vec<Term> = profiles.into_iter().collect();
        self.current_profiles = profiles.clone();

        let Some(registry) = self.registry else {
            return;
        };

        if profiles.iter().any(|p| !p.is_iri()) {
            self.warn(
                "The profiles in the model header are not URIs. Most likely no file header profile has been provided. Converting them to URI nodes.",
            );
            profiles = profiles
                .iter()
                .map(|p| match p {
                    Term::Literal { lexical, .. } => Term::iri(lexical.as_ref()),
                    other => other.clone(),
                })
                .collect();
            self.current_profiles = profiles.clone();
        }

        self.properties_not_in_profile.clear();
        let iris: BTreeSet<Arc<str>> = profiles
            .iter()
            .filter_map(|p| p.as_iri().map(Arc::from))
            .collect();

        match registry.properties_and_datatypes(&iris) {
            Ok(Some(map)) => self.datatype_map = Some(map),
            _ => {
                self.datatype_map = None;
                self.warn(&format!(
                    "The profiles in the model header could not be found in the profile registry. Profiles: {}",
                    terms_to_string(&profiles)
                ));
            }
        }
    }

    // ---- Property elements

    fn property_element_loop(&mut self, subject: &Term, mut ev: XmlEvent) -> Result<XmlEvent> {
        let mut li_counter: u32 = 1;
        loop {
            match ev {
                XmlEvent::StartElement(head) => {
                    self.property_element(subject, head, &mut li_counter)?;
                    ev = self.next_event_tag()?;
                }
                other => return Ok(other),
            }
        }
    }

    fn property_element(
        &mut self,
        subject: &Term,
        head: ElementHead,
        li_counter: &mut u32,
    ) -> Result<()> {
        let has_frame = self.push_frames_from(&head);

        if !allowed_property_element(&head.name) {
            return Err(self.fatal(&format!("QName not allowed for property: {}", head.name)));
        }
        if not_recognized_rdf_property(&head.name) {
            self.warn(&format!("{} is not a recognized RDF property", head.name));
        }

        let result = self.property_element_process(subject, &head, li_counter);
        if has_frame {
            self.resolver.pop_frame();
        }
        result
    }

    fn property_element_process(
        &mut self,
        subject: &Term,
        head: &ElementHead,
        li_counter: &mut u32,
    ) -> Result<()> {
        let qname = &head.name;
        let node_id_attr = head.attribute(rdf::NS, "nodeID").map(str::to_string);
        let resource_attr = head.attribute(rdf::NS, "resource").map(str::to_string);
        let datatype_attr = head.attribute(rdf::NS, "datatype").map(str::to_string);
        let parse_type_attr = head.attribute(rdf::NS, "parseType").map(str::to_string);

        let mut property;
        let mut datatype_from_profile: Option<Datatype> = None;

        if qname.is(rdf::NS, "li") {
            property = Term::iri(rdf::member_property(*li_counter));
            *li_counter += 1;
        } else {
            property = self.qname_to_iri(qname, "property element")?;

            if self.has_cimxml_namespace
                && parse_type_attr.as_deref() != Some(PARSE_TYPE_STATEMENTS)
            {
                if let Some(map) = self.datatype_map.clone() {
                    match map.get(&property) {
                        Some(info) => {
                            // Reuse of property references across profiles:
                            // the profile's own term replaces the parsed one.
                            property = info.property.clone();
                            datatype_from_profile = info.primitive_datatype.clone();
                        }
                        None => {
                            if !self.properties_not_in_profile.contains(&property) {
                                self.properties_not_in_profile.insert(property.clone());
                                let profiles = terms_to_string(&self.current_profiles);
                                self.warn(&format!(
                                    "Property '{qname}' could not be found in current profiles. Profiles: {profiles}"
                                ));
                            }
                        }
                    }
                }
            }
        }

        let reify = match head.attribute(rdf::NS, "ID").map(str::to_string) {
            Some(id) => Some(self.iri_from_id_cim_aware(&id)?),
            None => None,
        };

        if datatype_attr.is_some() {
            if parse_type_attr.is_some() {
                return Err(self.fatal("rdf:datatype can not be used with rdf:parseType."));
            }
            if resource_attr.is_some() {
                return Err(self.fatal("rdf:datatype can not be used with rdf:resource."));
            }
            if node_id_attr.is_some() {
                return Err(self.fatal("rdf:datatype can not be used with rdf:nodeID."));
            }
        }
        if resource_attr.is_some() && node_id_attr.is_some() {
            return Err(
                self.fatal("Can't have both rdf:nodeID and rdf:resource on a property element")
            );
        }
        if resource_attr.is_some() && parse_type_attr.is_some() {
            return Err(self.fatal(
                "Both rdf:resource and rdf:parseType on a property element. Only one allowed",
            ));
        }
        if node_id_attr.is_some() && parse_type_attr.is_some() {
            return Err(self.fatal(
                "Both rdf:nodeID and rdf:parseType on a property element. Only one allowed",
            ));
        }

        let mut resource_obj: Option<Term> = None;
        if let Some(resource) = &resource_attr {
            resource_obj = Some(self.iri_resolve_cim_aware(resource)?);
        }
        if let Some(label) = &node_id_attr {
            resource_obj = Some(self.blank_node_labeled(label));
        }

        let inner = self.process_property_attributes(resource_obj.clone(), head, true)?;
        if resource_obj.is_none() {
            if let Some(inner_subject) = inner {
                self.emit_maybe_reified(&reify, subject.clone(), property, inner_subject);
                return self.expect_end_element(
                    "Expecting end element tag when using property attributes on a property element",
                );
            }
        }

        if let Some(object) = resource_obj {
            self.emit_maybe_reified(&reify, subject.clone(), property, object);
            return self.expect_end_element(
                "Expecting end element tag when using rdf:resource or rdf:nodeID on a property.",
            );
        }

        if let Some(parse_type) = parse_type_attr.as_deref() {
            let mut effective = parse_type;
            if parse_type == PARSE_TYPE_LITERAL_LOWER {
                self.warn("Encountered rdf:parseType='literal'. Treated as rdf:parseType='Literal'");
                effective = PARSE_TYPE_LITERAL;
            } else if parse_type == PARSE_TYPE_STATEMENTS && !self.has_cimxml_namespace {
                self.warn(
                    "Encountered rdf:parseType='Statements'. Treated as rdf:parseType='Literal'",
                );
                effective = PARSE_TYPE_LITERAL;
            }

            return match effective {
                PARSE_TYPE_RESOURCE => self.parse_type_resource(subject, &property, &reify),
                PARSE_TYPE_LITERAL => self.parse_type_literal(subject, &property, &reify),
                PARSE_TYPE_COLLECTION => self.parse_type_collection(subject, &property, &reify),
                PARSE_TYPE_STATEMENTS => self.parse_type_statements(subject, &property, &reify, qname),
                other => Err(self.fatal(&format!("Not a legal defined rdf:parseType: {other}"))),
            };
        }

        // No syntax attribute decided the object: either text content or a
        // nested node element. Accumulate all consecutive text before
        // deciding literal-vs-nested.
        let mut ev = self.next_event_any()?;
        match ev {
            XmlEvent::Characters(first) => {
                let mut lexical = first;
                loop {
                    ev = self.next_event_any()?;
                    match ev {
                        XmlEvent::Characters(more) => lexical.push_str(&more),
                        other => {
                            ev = other;
                            break;
                        }
                    }
                }
                match ev {
                    XmlEvent::StartElement(inner_head) => {
                        if !is_whitespace(&lexical) {
                            return Err(self.fatal(&format!(
                                "Content before node element. '{}'",
                                non_whitespace_msg(&lexical)
                            )));
                        }
                        self.process_nested_node_element(subject, &property, &reify, inner_head)
                    }
                    XmlEvent::EndElement(_) => {
                        let object = self.literal_object(
                            lexical,
                            datatype_from_profile,
                            datatype_attr.as_deref(),
                        );
                        self.emit_maybe_reified(&reify, subject.clone(), property, object);
                        Ok(())
                    }
                    other => {
                        Err(self.fatal(&format!("Unexpected element: {}", event_name(&other))))
                    }
                }
            }
            XmlEvent::StartElement(inner_head) => {
                self.process_nested_node_element(subject, &property, &reify, inner_head)
            }
            XmlEvent::EndElement(_) => {
                self.emit_maybe_reified(&reify, subject.clone(), property, Term::string(""));
                Ok(())
            }
            other => Err(self.fatal(&format!("Malformed property. {}", event_name(&other)))),
        }
    }

    /// Literal typing policy: explicit `rdf:datatype` first, then the
    /// profile datatype (where `xsd:anyURI` yields an IRI term), then
    /// `xml:lang`, else a plain string.
    fn literal_object(
        &mut self,
        lexical: String,
        from_profile: Option<Datatype>,
        datatype_attr: Option<&str>,
    ) -> Term {
        if let Some(datatype) = datatype_attr {
            return Term::typed(lexical, Datatype::from_iri(datatype));
        }
        if let Some(datatype) = from_profile {
            if !datatype.is_xsd_string() {
                if datatype.is_xsd_any_uri() {
                    return Term::iri(lexical);
                }
                return Term::typed(lexical, datatype);
            }
        }
        if let Some(lang) = self.resolver.current_lang() {
            return Term::lang_string(lexical, lang);
        }
        Term::string(lexical)
    }

    fn process_nested_node_element(
        &mut self,
        subject: &Term,
        property: &Term,
        reify: &Option<Term>,
        inner_head: ElementHead,
    ) -> Result<()> {
        let has_frame = self.push_frames_from(&inner_head);
        let inner_subject = self.attributes_to_subject_node(&inner_head)?;
        self.emit_maybe_reified(reify, subject.clone(), property.clone(), inner_subject.clone());

        self.node_element(inner_head, Some(inner_subject))?;

        let ev = self.next_event_tag()?;
        match ev {
            XmlEvent::StartElement(head) => {
                return Err(self.fatal(&format!(
                    "Start tag after inner node element (only one node element permitted): got {}",
                    head.name
                )))
            }
            XmlEvent::EndElement(_) => {}
            other => {
                return Err(
                    self.fatal(&format!("Expected an end element: got {}", event_name(&other)))
                )
            }
        }
        if has_frame {
            self.resolver.pop_frame();
        }
        Ok(())
    }

    // ---- Property attributes

    fn process_property_attributes(
        &mut self,
        resource_obj: Option<Term>,
        head: &ElementHead,
        is_property_element: bool,
    ) -> Result<Option<Term>> {
        let indexes = self.gather_property_attributes(head)?;
        if indexes.is_empty() {
            return Ok(None);
        }
        if is_property_element && head.attribute(rdf::NS, "parseType").is_some() {
            return Err(self.fatal(&format!(
                "The attribute rdf:parseType is not permitted with property attributes on a property element: {}",
                head.name
            )));
        }

        let inner_subject = match resource_obj {
            Some(subject) => subject,
            None => self.fresh_blank_node(),
        };
        self.output_property_attributes(&inner_subject, &indexes, head)?;
        Ok(Some(inner_subject))
    }

    fn gather_property_attributes(&mut self, head: &ElementHead) -> Result<Vec<usize>> {
        let mut indexes = Vec::new();
        for (i, attr) in head.attributes.iter().enumerate() {
            if self.check_property_attribute(&attr.name)? {
                indexes.push(i);
            }
        }
        Ok(indexes)
    }

    fn check_property_attribute(&mut self, qname: &QName) -> Result<bool> {
        if is_syntax_attribute(qname) {
            return Ok(false);
        }
        if is_core_syntax_term(qname) {
            return Ok(false);
        }
        if !allowed_property_attribute(qname) {
            return Err(self.fatal(&format!("Not allowed as a property attribute: '{qname}'")));
        }
        if not_recognized_rdf_property(qname) {
            self.warn(&format!(
                "{qname} is not a recognized RDF term for a property attribute"
            ));
        }
        if is_xml_reserved(qname) {
            return Ok(false);
        }
        if qname.in_namespace(XML_NS) {
            self.warn(&format!("Unrecognized XML attribute: '{qname}'"));
            return Ok(false);
        }
        if qname.namespace.is_none() {
            if allowed_unqualified_term(&qname.local) {
                return Ok(true);
            }
            if qname.local.len() >= 3 && qname.local[..3].eq_ignore_ascii_case("xml") {
                self.warn(&format!(
                    "Unrecognized XML non-namespaced attribute '{}' - ignored",
                    qname.local
                ));
                return Ok(false);
            }
            return Err(self.fatal(&format!(
                "Non-namespaced attribute not allowed as a property attribute: '{}'",
                qname.local
            )));
        }
        Ok(true)
    }

    fn output_property_attributes(
        &mut self,
        subject: &Term,
        indexes: &[usize],
        head: &ElementHead,
    ) -> Result<()> {
        for &i in indexes {
            let attr = &head.attributes[i];
            if attr.name.is(rdf::NS, "type") {
                let object = self.iri_resolve_cim_aware(&attr.value)?;
                self.emit(subject.clone(), Term::iri(rdf::TYPE), object);
                return Ok(());
            }
            let property = self.attribute_to_iri(&attr.name)?;
            let object = match self.resolver.current_lang() {
                Some(lang) => Term::lang_string(&attr.value, lang),
                None => Term::string(&attr.value),
            };
            self.emit(subject.clone(), property, object);
        }
        Ok(())
    }

    // ---- parseType variants

    fn parse_type_resource(
        &mut self,
        subject: &Term,
        property: &Term,
        reify: &Option<Term>,
    ) -> Result<()> {
        // Implicit fresh blank node, then striped property elements on it.
        let inner = self.fresh_blank_node();
        self.emit_maybe_reified(reify, subject.clone(), property.clone(), inner.clone());
        let ev = self.next_event_tag()?;
        self.property_element_loop(&inner, ev)?;
        Ok(())
    }

    fn parse_type_literal(
        &mut self,
        subject: &Term,
        property: &Term,
        reify: &Option<Term>,
    ) -> Result<()> {
        let lexical = self.xml_literal_accumulate()?;
        let object = Term::typed(lexical, Datatype::rdf_xml_literal());
        self.emit_maybe_reified(reify, subject.clone(), property.clone(), object);
        Ok(())
    }

    fn parse_type_collection(
        &mut self,
        subject: &Term,
        property: &Term,
        reify: &Option<Term>,
    ) -> Result<()> {
        let mut last_cell: Option<Term> = None;
        loop {
            let ev = self.next_event_tag()?;
            let head = match ev {
                XmlEvent::StartElement(head) => head,
                _ => break,
            };
            let this_cell = self.fresh_blank_node();
            match &last_cell {
                // First list item links the list in; later cells chain
                // without reification.
                None => self.emit_maybe_reified(
                    reify,
                    subject.clone(),
                    property.clone(),
                    this_cell.clone(),
                ),
                Some(previous) => {
                    self.emit(previous.clone(), Term::iri(rdf::REST), this_cell.clone())
                }
            }
            let item_subject = self.attributes_to_subject_node(&head)?;
            self.emit(this_cell.clone(), Term::iri(rdf::FIRST), item_subject.clone());
            self.node_element(head, Some(item_subject))?;
            last_cell = Some(this_cell);
        }

        match last_cell {
            Some(cell) => self.emit(cell, Term::iri(rdf::REST), Term::iri(rdf::NIL)),
            None => {
                self.emit_maybe_reified(reify, subject.clone(), property.clone(), Term::iri(rdf::NIL))
            }
        }
        Ok(())
    }

    /// `parseType="Statements"`: nested node elements parsed into the named
    /// graph of the recognized difference container.
    fn parse_type_statements(
        &mut self,
        subject: &Term,
        property: &Term,
        reify: &Option<Term>,
        qname: &QName,
    ) -> Result<()> {
        let container = if qname.is(dm::NS, dm::LOCAL_FORWARD_DIFFERENCES) {
            Some(DocumentContext::ForwardDifferences)
        } else if qname.is(dm::NS, dm::LOCAL_REVERSE_DIFFERENCES) {
            Some(DocumentContext::ReverseDifferences)
        } else if qname.is(dm::NS, dm::LOCAL_PRECONDITIONS) {
            Some(DocumentContext::Preconditions)
        } else {
            None
        };

        match container {
            Some(context) => {
                let old_context = self.sink.current_context();
                self.sink.set_current_context(context);
                if old_context == DocumentContext::DifferenceModel {
                    self.install_model_header_profile_map();
                }
                let ev = self.next_event_tag()?;
                self.node_element_loop(ev)?;
                Ok(())
            }
            None => {
                self.warn(
                    "rdf:parseType='Statements' used on an element that is not a recognized CIMXML difference model container (forwardDifferences, reverseDifferences, preconditions). Treated as rdf:parseType='Literal'",
                );
                self.parse_type_literal(subject, property, reify)
            }
        }
    }

    // ---- XML literal canonicalization

    fn xml_literal_accumulate(&mut self) -> Result<String> {
        let mut namespaces: BTreeMap<String, String> = BTreeMap::new();
        let mut stack: Vec<BTreeMap<String, String>> = Vec::new();
        let mut out = String::new();
        let mut depth: i32 = 0;

        loop {
            let ev = self.next_event_raw()?;
            match ev {
                XmlEvent::StartElement(head) => {
                    depth += 1;
                    stack.push(namespaces.clone());

                    out.push('<');
                    push_qname(&mut out, &head.name);

                    // Namespaces are declared at first use within the
                    // literal subtree, sorted by prefix.
                    let mut output_ns: BTreeMap<String, String> = BTreeMap::new();
                    collect_literal_namespace(&mut output_ns, &mut namespaces, &head.name);
                    for attr in &head.attributes {
                        collect_literal_namespace(&mut output_ns, &mut namespaces, &attr.name);
                    }
                    for (prefix, uri) in &output_ns {
                        out.push(' ');
                        if prefix.is_empty() {
                            out.push_str("xmlns=\"");
                        } else {
                            out.push_str("xmlns:");
                            out.push_str(prefix);
                            out.push_str("=\"");
                        }
                        out.push_str(uri);
                        out.push('"');
                    }

                    // Attributes sorted alphabetically by qualified name.
                    let mut attrs: BTreeMap<String, &str> = BTreeMap::new();
                    for attr in &head.attributes {
                        attrs.insert(attr.name.to_string(), attr.value.as_str());
                    }
                    for (name, value) in attrs {
                        out.push(' ');
                        out.push_str(&name);
                        out.push_str("=\"");
                        out.push_str(&escape_attribute_value(value));
                        out.push('"');
                    }
                    out.push('>');
                }
                XmlEvent::EndElement(name) => {
                    depth -= 1;
                    if depth < 0 {
                        break;
                    }
                    namespaces = stack.pop().unwrap_or_default();
                    out.push_str("</");
                    push_qname(&mut out, &name);
                    out.push('>');
                }
                XmlEvent::Characters(text) => out.push_str(&escape_text(&text)),
                XmlEvent::Comment(comment) => {
                    out.push_str("<!--");
                    out.push_str(&comment);
                    out.push_str("-->");
                }
                XmlEvent::ProcessingInstruction { target, data } => {
                    out.push_str("<?");
                    out.push_str(&target);
                    out.push(' ');
                    out.push_str(&data);
                    out.push_str("?>");
                }
                other => {
                    return Err(self.fatal(&format!(
                        "Unexpected event in rdf:XMLLiteral: {}",
                        event_name(&other)
                    )))
                }
            }
        }
        Ok(out)
    }

    // ---- Subjects and terms

    /// Subject of a node element: at most one of `rdf:about`, `rdf:ID`,
    /// `rdf:nodeID`; a fresh blank node otherwise.
    fn attributes_to_subject_node(&mut self, head: &ElementHead) -> Result<Term> {
        let about = head.attribute(rdf::NS, "about").map(str::to_string);
        let id = head.attribute(rdf::NS, "ID").map(str::to_string);
        let node_id = head.attribute(rdf::NS, "nodeID").map(str::to_string);

        if about.is_some() && id.is_some() && node_id.is_some() {
            return Err(
                self.fatal("All of rdf:about, rdf:nodeID and rdf:ID found. Must be only one.")
            );
        }
        if about.is_some() && id.is_some() {
            return Err(self.fatal("Both rdf:about and rdf:ID found. Must be only one."));
        }
        if about.is_some() && node_id.is_some() {
            return Err(self.fatal("Both rdf:about and rdf:nodeID found. Must be only one."));
        }
        if id.is_some() && node_id.is_some() {
            return Err(self.fatal("Both rdf:nodeID and rdf:ID found. Must be only one."));
        }

        if let Some(about) = about {
            return self.iri_resolve_cim_aware(&about);
        }
        if let Some(id) = id {
            return self.iri_from_id_cim_aware(&id);
        }
        if let Some(label) = node_id {
            return Ok(self.blank_node_labeled(&label));
        }
        Ok(self.fresh_blank_node())
    }

    fn qname_to_iri(&mut self, qname: &QName, usage: &str) -> Result<Term> {
        match qname.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => Ok(Term::iri(format!("{ns}{}", qname.local))),
            _ => Err(self.fatal(&format!(
                "Unqualified {usage} not allowed: <{}>",
                qname.local
            ))),
        }
    }

    fn attribute_to_iri(&mut self, qname: &QName) -> Result<Term> {
        match qname.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => Ok(Term::iri(format!("{ns}{}", qname.local))),
            _ => {
                if allowed_unqualified_term(&qname.local) {
                    Ok(Term::iri(format!("{}{}", rdf::NS, qname.local)))
                } else {
                    Err(self.fatal(&format!(
                        "Unqualified property attribute not allowed: '{}'",
                        qname.local
                    )))
                }
            }
        }
    }

    fn fresh_blank_node(&mut self) -> Term {
        self.blank_counter += 1;
        Term::blank(format!("b{}", self.blank_counter))
    }

    /// `rdf:nodeID` labels are interned per parse: equal labels produce the
    /// same blank node.
    fn blank_node_labeled(&mut self, label: &str) -> Term {
        self.check_valid_ncname(label);
        if let Some(term) = self.blank_labels.get(label) {
            return term.clone();
        }
        let term = self.fresh_blank_node();
        self.blank_labels.insert(label.to_string(), term.clone());
        term
    }

    fn iri_from_id(&mut self, id: &str) -> Result<Term> {
        self.check_valid_ncname(id);
        if let Some(previous) = self.previous_use_of_id(id) {
            self.warn(&format!("Reuse of rdf:ID '{id}' at byte {previous}"));
        }
        self.iri_resolve(&format!("#{id}"))
    }

    fn previous_use_of_id(&mut self, id: &str) -> Option<u64> {
        let position = self.xml.position();
        let base_key = self.resolver.base().map(str::to_string);
        let scope = self.used_ids.entry(base_key).or_default();
        if let Some(&previous) = scope.get(id) {
            return Some(previous);
        }
        if self.tracked_id_count > 10_000 {
            return None;
        }
        scope.insert(id.to_string(), position);
        self.tracked_id_count += 1;
        None
    }

    fn iri_resolve(&mut self, reference: &str) -> Result<Term> {
        // <_:label> syntax passes through untouched.
        if reference.starts_with("_:") {
            return Ok(Term::iri(reference));
        }
        if self.resolver.base().is_none() && !crate::iri::has_scheme(reference) {
            self.warn(&format!("Relative URI with no base: <{reference}>"));
        }
        let resolved = self.resolver.resolve(reference);
        if resolved.is_relative {
            return Err(self.fatal(&format!("Relative URI encountered: <{}>", resolved.iri)));
        }
        Ok(Term::iri(resolved.iri.as_ref()))
    }

    fn iri_resolve_cim_aware(&mut self, uri: &str) -> Result<Term> {
        if self.has_cimxml_namespace {
            if let Some(part) = uri.strip_prefix("#_") {
                match normalize_cim_uuid(part) {
                    CimUuid::Canonical(iri) => return Ok(Term::iri(iri)),
                    CimUuid::Fixed { iri, note } => {
                        self.warn(&note);
                        return Ok(Term::iri(iri));
                    }
                    CimUuid::NotAUuid => self.warn(&format!("Not a valid CIM UUID: '{uri}'")),
                }
            }
        }
        self.iri_resolve(uri)
    }

    fn iri_from_id_cim_aware(&mut self, id: &str) -> Result<Term> {
        if self.has_cimxml_namespace {
            if let Some(part) = id.strip_prefix('_') {
                match normalize_cim_uuid(part) {
                    CimUuid::Canonical(iri) => return Ok(Term::iri(iri)),
                    CimUuid::Fixed { iri, note } => {
                        self.warn(&note);
                        return Ok(Term::iri(iri));
                    }
                    CimUuid::NotAUuid => self.warn(&format!("Not a valid CIM UUID: '{id}'")),
                }
            }
        }
        self.iri_from_id(id)
    }

    // ---- Output

    fn emit(&mut self, s: Term, p: Term, o: Term) {
        self.emitted += 1;
        self.sink.triple(Triple::new(s, p, o));
    }

    fn emit_maybe_reified(&mut self, reify: &Option<Term>, s: Term, p: Term, o: Term) {
        self.emit(s.clone(), p.clone(), o.clone());
        if let Some(statement) = reify {
            self.emit(statement.clone(), Term::iri(rdf::TYPE), Term::iri(rdf::STATEMENT));
            self.emit(statement.clone(), Term::iri(rdf::SUBJECT), s);
            self.emit(statement.clone(), Term::iri(rdf::PREDICATE), p);
            self.emit(statement.clone(), Term::iri(rdf::OBJECT), o);
        }
    }

    // ---- Diagnostics

    fn warn(&mut self, message: &str) {
        self.handler.warning(message, self.xml.position());
    }

    fn fatal(&mut self, message: &str) -> ParseError {
        let position = self.xml.position();
        self.handler.error(message, position);
        ParseError::Syntax {
            position,
            message: message.to_string(),
        }
    }

    fn expect_end_element(&mut self, message: &str) -> Result<()> {
        let ev = self.next_event_any()?;
        match ev {
            XmlEvent::EndElement(_) => Ok(()),
            _ => Err(self.fatal(message)),
        }
    }

    fn check_valid_ncname(&mut self, value: &str) {
        if !is_valid_ncname(value) {
            self.warn(&format!("Not a valid XML NCName: '{value}'"));
        }
    }
}

// ---- Grammar production guards (RDF/XML 2004, section 6.2)

fn is_rdf(qname: &QName) -> bool {
    qname.in_namespace(rdf::NS)
}

fn is_core_syntax_term(qname: &QName) -> bool {
    is_rdf(qname)
        && matches!(
            qname.local.as_str(),
            "RDF" | "ID" | "about" | "parseType" | "resource" | "nodeID" | "datatype"
        )
}

fn is_old_term(qname: &QName) -> bool {
    is_rdf(qname)
        && matches!(
            qname.local.as_str(),
            "aboutEach" | "aboutEachPrefix" | "bagID"
        )
}

fn allowed_node_element(qname: &QName) -> bool {
    if !is_rdf(qname) {
        return true;
    }
    !is_core_syntax_term(qname) && qname.local != "li" && !is_old_term(qname)
}

fn allowed_property_element(qname: &QName) -> bool {
    if !is_rdf(qname) {
        return true;
    }
    !is_core_syntax_term(qname) && qname.local != "Description" && !is_old_term(qname)
}

fn allowed_property_attribute(qname: &QName) -> bool {
    if !is_rdf(qname) {
        return true;
    }
    !is_core_syntax_term(qname)
        && qname.local != "Description"
        && qname.local != "li"
        && !is_old_term(qname)
}

fn is_syntax_attribute(qname: &QName) -> bool {
    is_rdf(qname)
        && matches!(
            qname.local.as_str(),
            "RDF" | "about" | "nodeID" | "ID" | "parseType" | "datatype" | "resource"
        )
}

fn allowed_unqualified_term(local: &str) -> bool {
    matches!(local, "about" | "ID" | "resource" | "parseType" | "type")
}

fn is_xml_reserved(qname: &QName) -> bool {
    qname.in_namespace(XML_NS) && matches!(qname.local.as_str(), "base" | "lang" | "space")
}

fn is_member_property(qname: &QName) -> bool {
    is_rdf(qname) && rdf::is_member_property_local_name(&qname.local)
}

fn not_recognized_rdf_type(qname: &QName) -> bool {
    is_rdf(qname) && !rdf::KNOWN_TERMS.contains(&qname.local.as_str())
}

fn not_recognized_rdf_property(qname: &QName) -> bool {
    if !is_rdf(qname) {
        return false;
    }
    if rdf::is_member_property_local_name(&qname.local) {
        return false;
    }
    !rdf::KNOWN_TERMS.contains(&qname.local.as_str())
}

// ---- Helpers

fn is_whitespace(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// The start of the non-whitespace content, shortened for error messages.
fn non_whitespace_msg(text: &str) -> String {
    const MAX_LEN: usize = 10;
    let trimmed = text.trim_start();
    let snippet: String = trimmed.chars().take(MAX_LEN).collect();
    let mut out = snippet.escape_default().to_string();
    if trimmed.chars().count() > MAX_LEN {
        out.push_str("...");
    }
    out
}

fn event_name(ev: &XmlEvent) -> String {
    match ev {
        XmlEvent::StartElement(head) => head.name.to_string(),
        XmlEvent::EndElement(name) => format!("/{name}"),
        XmlEvent::Characters(_) => "Event Characters".to_string(),
        XmlEvent::Comment(_) => "Event Comment".to_string(),
        XmlEvent::ProcessingInstruction { .. } => "Event ProcessingInstruction".to_string(),
        XmlEvent::DocType => "DTD".to_string(),
        XmlEvent::Eof => "Event EndDocument".to_string(),
    }
}

fn is_valid_ncname(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '\u{00B7}'))
}

fn push_qname(out: &mut String, qname: &QName) {
    if let Some(prefix) = &qname.prefix {
        out.push_str(prefix);
        out.push(':');
    }
    out.push_str(&qname.local);
}

/// Insert the namespace of a QName into the literal output when its prefix
/// is not yet bound (or bound differently) within the literal subtree.
fn collect_literal_namespace(
    output_ns: &mut BTreeMap<String, String>,
    namespaces: &mut BTreeMap<String, String>,
    qname: &QName,
) {
    let Some(uri) = &qname.namespace else {
        return;
    };
    if uri.is_empty() || uri == XML_NS {
        return;
    }
    let prefix = qname.prefix.clone().unwrap_or_default();
    if namespaces.get(&prefix).map(String::as_str) != Some(uri.as_str()) {
        output_ns.insert(prefix.clone(), uri.clone());
        namespaces.insert(prefix, uri.clone());
    }
}

/// Escape text content of an XML literal.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

/// Escape an attribute value of an XML literal.
fn escape_attribute_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

fn terms_to_string(terms: &[Term]) -> String {
    terms
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
