//! Namespace-resolved XML event stream
//!
//! [`XmlSource`] adapts the quick-xml pull parser into the owned event shape
//! the RDF/XML state machine consumes: start/end elements with resolved
//! QNames and attributes, character data, comments, processing instructions.
//! Empty elements are expanded into start + end.
//!
//! The source tracks namespace scopes itself (one frame per open element),
//! so the parser can enumerate the declarations of the root element and
//! resolve prefixes while canonicalizing XML literals. Unprefixed attributes
//! have no namespace.

use crate::error::{ParseError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::BufRead;

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A resolved XML qualified name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QName {
    /// The namespace IRI the prefix (or default namespace) resolved to.
    pub namespace: Option<String>,
    /// The local part.
    pub local: String,
    /// The prefix as written, if any.
    pub prefix: Option<String>,
}

impl QName {
    /// True if the name has the given namespace and local part.
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.local == local && self.namespace.as_deref() == Some(namespace)
    }

    /// True if the name is in the given namespace.
    pub fn in_namespace(&self, namespace: &str) -> bool {
        self.namespace.as_deref() == Some(namespace)
    }

    /// The concatenated namespace + local IRI, when a namespace is bound.
    pub fn expanded(&self) -> Option<String> {
        self.namespace
            .as_ref()
            .map(|ns| format!("{ns}{}", self.local))
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{prefix}:{}", self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// A resolved attribute. Namespace declarations never appear here.
#[derive(Clone, Debug)]
pub struct XmlAttribute {
    /// The attribute name.
    pub name: QName,
    /// The unescaped attribute value.
    pub value: String,
}

/// A start element with its resolved attributes and the namespace
/// declarations written on it.
#[derive(Clone, Debug)]
pub struct ElementHead {
    /// The element name.
    pub name: QName,
    /// The attributes, namespace declarations excluded.
    pub attributes: Vec<XmlAttribute>,
    /// Namespace declarations on this element: (prefix or "", namespace).
    pub ns_decls: Vec<(String, String)>,
}

impl ElementHead {
    /// The value of the attribute with the given namespace and local name.
    pub fn attribute(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.is(namespace, local))
            .map(|a| a.value.as_str())
    }

    /// The value of an unprefixed attribute.
    pub fn unqualified_attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.namespace.is_none() && a.name.local == local)
            .map(|a| a.value.as_str())
    }
}

/// An owned XML event.
#[derive(Debug)]
pub enum XmlEvent {
    /// Start of an element (empty elements are expanded)
    StartElement(ElementHead),
    /// End of an element
    EndElement(QName),
    /// Character data (text or CDATA), entity references expanded
    Characters(String),
    /// A comment
    Comment(String),
    /// A processing instruction
    ProcessingInstruction {
        /// PI target
        target: String,
        /// Everything after the target, verbatim
        data: String,
    },
    /// A document type declaration
    DocType,
    /// End of the document
    Eof,
}

fn xml_error(position: u64, e: impl std::fmt::Display) -> ParseError {
    ParseError::Xml {
        position,
        message: e.to_string(),
    }
}

/// Pull source of [`XmlEvent`]s over any `BufRead` input.
pub struct XmlSource<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    ns_stack: Vec<Vec<(String, Option<String>)>>,
    pending_end: Option<QName>,
}

impl<R: BufRead> XmlSource<R> {
    /// Create a source over the given input.
    pub fn new(input: R) -> Self {
        let mut reader = Reader::from_reader(input);
        let config = reader.config_mut();
        config.expand_empty_elements = true;
        config.trim_text_start = false;
        config.trim_text_end = false;
        Self {
            reader,
            buf: Vec::new(),
            ns_stack: Vec::new(),
            pending_end: None,
        }
    }

    /// Byte offset of the reader, for diagnostics.
    pub fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    /// Read the next event.
    pub fn next_event(&mut self) -> Result<XmlEvent> {
        if let Some(name) = self.pending_end.take() {
            self.ns_stack.pop();
            return Ok(XmlEvent::EndElement(name));
        }
        loop {
            self.buf.clear();
            let position = self.position();
            // Extract owned data from each event before touching any other
            // state: the event borrows the read buffer.
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(e) => return Err(xml_error(position, e)),
            };
            return match event {
                Event::Decl(_) => continue,
                Event::Start(e) => {
                    let e = e.into_owned();
                    let head = self.element_head(&e, position)?;
                    Ok(XmlEvent::StartElement(head))
                }
                Event::Empty(e) => {
                    // Seen only when empty-element expansion is off; keep
                    // the start/end pairing by synthesizing the end event.
                    let e = e.into_owned();
                    let head = self.element_head(&e, position)?;
                    self.pending_end = Some(head.name.clone());
                    Ok(XmlEvent::StartElement(head))
                }
                Event::End(e) => {
                    let raw = e.name().as_ref().to_vec();
                    let name = self.resolve_element_name(&raw, position)?;
                    self.ns_stack.pop();
                    Ok(XmlEvent::EndElement(name))
                }
                Event::Text(t) => {
                    let text = match t.unescape() {
                        Ok(text) => text.into_owned(),
                        Err(e) => return Err(xml_error(position, e)),
                    };
                    Ok(XmlEvent::Characters(text))
                }
                Event::CData(t) => Ok(XmlEvent::Characters(
                    String::from_utf8_lossy(&t.into_inner()).into_owned(),
                )),
                Event::Comment(t) => Ok(XmlEvent::Comment(
                    String::from_utf8_lossy(t.as_ref()).into_owned(),
                )),
                Event::PI(pi) => {
                    let target = String::from_utf8_lossy(pi.target()).into_owned();
                    let data = String::from_utf8_lossy(pi.content()).into_owned();
                    Ok(XmlEvent::ProcessingInstruction { target, data })
                }
                Event::DocType(_) => Ok(XmlEvent::DocType),
                Event::Eof => Ok(XmlEvent::Eof),
            };
        }
    }

    fn element_head(&mut self, e: &BytesStart<'static>, position: u64) -> Result<ElementHead> {
        // Collect this element's namespace declarations and open its scope
        // before resolving anything.
        let mut ns_decls: Vec<(String, Option<String>)> = Vec::new();
        let mut plain_attrs: Vec<(String, String)> = Vec::new();

        for attr in e.attributes().with_checks(false) {
            let attr = match attr {
                Ok(attr) => attr,
                Err(err) => return Err(xml_error(position, err)),
            };
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = match attr.unescape_value() {
                Ok(value) => value.into_owned(),
                Err(err) => return Err(xml_error(position, err)),
            };
            if key == "xmlns" {
                let binding = if value.is_empty() { None } else { Some(value) };
                ns_decls.push((String::new(), binding));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                ns_decls.push((prefix.to_string(), Some(value)));
            } else {
                plain_attrs.push((key, value));
            }
        }

        self.ns_stack.push(ns_decls.clone());

        let name = self.resolve_element_name(e.name().as_ref(), position)?;

        let mut attributes = Vec::with_capacity(plain_attrs.len());
        for (key, value) in plain_attrs {
            let name = self.resolve_attribute_name(&key, position)?;
            attributes.push(XmlAttribute { name, value });
        }

        let declared = ns_decls
            .into_iter()
            .map(|(prefix, ns)| (prefix, ns.unwrap_or_default()))
            .collect();

        Ok(ElementHead {
            name,
            attributes,
            ns_decls: declared,
        })
    }

    fn resolve_element_name(&self, raw: &[u8], position: u64) -> Result<QName> {
        let raw = String::from_utf8_lossy(raw).into_owned();
        match raw.split_once(':') {
            Some((prefix, local)) => {
                let namespace = self
                    .lookup_prefix(prefix)
                    .ok_or_else(|| xml_error(position, format!("unbound namespace prefix '{prefix}'")))?;
                Ok(QName {
                    namespace: Some(namespace.to_string()),
                    local: local.to_string(),
                    prefix: Some(prefix.to_string()),
                })
            }
            None => Ok(QName {
                // The default namespace applies to elements.
                namespace: self.lookup_prefix("").map(str::to_string),
                local: raw,
                prefix: None,
            }),
        }
    }

    fn resolve_attribute_name(&self, raw: &str, position: u64) -> Result<QName> {
        match raw.split_once(':') {
            Some((prefix, local)) => {
                let namespace = self
                    .lookup_prefix(prefix)
                    .ok_or_else(|| xml_error(position, format!("unbound namespace prefix '{prefix}'")))?;
                Ok(QName {
                    namespace: Some(namespace.to_string()),
                    local: local.to_string(),
                    prefix: Some(prefix.to_string()),
                })
            }
            // The default namespace does not apply to attributes.
            None => Ok(QName {
                namespace: None,
                local: raw.to_string(),
                prefix: None,
            }),
        }
    }

    /// Resolve a prefix against the current scope stack. `""` looks up the
    /// default namespace. Returns None for unbound (or explicitly unbound)
    /// prefixes.
    pub fn lookup_prefix(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE);
        }
        for frame in self.ns_stack.iter().rev() {
            for (p, ns) in frame.iter().rev() {
                if p == prefix {
                    return ns.as_deref();
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(xml: &str) -> XmlSource<&[u8]> {
        XmlSource::new(xml.as_bytes())
    }

    fn next_start(src: &mut XmlSource<&[u8]>) -> ElementHead {
        loop {
            match src.next_event().unwrap() {
                XmlEvent::StartElement(head) => return head,
                XmlEvent::Eof => panic!("unexpected EOF"),
                _ => {}
            }
        }
    }

    #[test]
    fn test_namespace_resolution() {
        let mut src = source(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
                 <rdf:Description rdf:about="http://e.org/x"/>
               </rdf:RDF>"#,
        );
        let root = next_start(&mut src);
        assert!(root
            .name
            .is("http://www.w3.org/1999/02/22-rdf-syntax-ns#", "RDF"));
        assert_eq!(root.ns_decls.len(), 1);

        let child = next_start(&mut src);
        assert!(child
            .name
            .is("http://www.w3.org/1999/02/22-rdf-syntax-ns#", "Description"));
        assert_eq!(
            child.attribute("http://www.w3.org/1999/02/22-rdf-syntax-ns#", "about"),
            Some("http://e.org/x")
        );

        // The expanded empty element yields an end event.
        match src.next_event().unwrap() {
            XmlEvent::EndElement(name) => assert_eq!(name.local, "Description"),
            other => panic!("expected end element, got {other:?}"),
        }
    }

    #[test]
    fn test_unprefixed_attribute_has_no_namespace() {
        let mut src = source(r#"<doc xmlns="http://e.org/ns#" about="x"/>"#);
        let head = next_start(&mut src);
        // Default namespace applies to the element...
        assert!(head.name.is("http://e.org/ns#", "doc"));
        // ...but not to the attribute.
        assert_eq!(head.unqualified_attribute("about"), Some("x"));
        assert!(head.attribute("http://e.org/ns#", "about").is_none());
    }

    #[test]
    fn test_scope_shadowing_and_unbinding() {
        let mut src = source(
            r#"<a xmlns:p="http://one/"><b xmlns:p="http://two/"><p:c/></b><p:d/></a>"#,
        );
        let _a = next_start(&mut src);
        let _b = next_start(&mut src);
        let c = next_start(&mut src);
        assert_eq!(c.name.namespace.as_deref(), Some("http://two/"));
        // end c, end b
        let _ = src.next_event().unwrap();
        let _ = src.next_event().unwrap();
        let d = next_start(&mut src);
        assert_eq!(d.name.namespace.as_deref(), Some("http://one/"));
    }

    #[test]
    fn test_entities_and_text() {
        let mut src = source("<a>x &amp; y</a>");
        let _ = next_start(&mut src);
        match src.next_event().unwrap() {
            XmlEvent::Characters(text) => assert_eq!(text, "x & y"),
            other => panic!("expected characters, got {other:?}"),
        }
    }

    #[test]
    fn test_processing_instruction() {
        let mut src = source(r#"<?iec61970-552 version="2.0"?><a/>"#);
        match src.next_event().unwrap() {
            XmlEvent::ProcessingInstruction { target, data } => {
                assert_eq!(target, "iec61970-552");
                assert_eq!(data, r#"version="2.0""#);
            }
            other => panic!("expected PI, got {other:?}"),
        }
    }

    #[test]
    fn test_xml_prefix_is_predeclared() {
        let mut src = source(r#"<a xml:lang="en"/>"#);
        let head = next_start(&mut src);
        assert_eq!(
            head.attribute(XML_NAMESPACE, "lang"),
            Some("en")
        );
    }
}
