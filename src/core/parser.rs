//! XMP RDF/XML parser
//!
//! Reads `x:xmpmeta` / `rdf:RDF` / `rdf:Description` trees into an
//! [`XmpDocument`]. Simple properties may be written as attributes or
//! elements; arrays are `rdf:Seq`, `rdf:Bag` and `rdf:Alt` of simple
//! `rdf:li` items. Anything structured is reported as an operation fatal
//! fault.

use crate::core::document::XmpDocument;
use crate::core::error::{XmpError, XmpResult};
use crate::core::namespace::{ns, NamespaceMap};
use crate::core::node::{ArrayItem, ArrayKind, Property};
use crate::engine::fault::{cause, EngineFault, ErrorSeverity, FaultDecision};
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Element context while walking the tree
enum Frame {
    /// x:xmpmeta, rdf:RDF or anything else outside a description
    Wrapper,
    Description,
    Property {
        namespace: String,
        name: String,
        text: String,
        array: Option<(ArrayKind, Vec<ArrayItem>)>,
    },
    Container {
        kind: ArrayKind,
        items: Vec<ArrayItem>,
    },
    Item {
        text: String,
        lang: Option<String>,
    },
    /// Content of an element that was reported and skipped
    Skip,
}

/// Parser for XMP packets
pub struct XmpParser<'a> {
    namespaces: &'a mut NamespaceMap,
    on_fault: &'a dyn Fn(&EngineFault) -> bool,
    scopes: Vec<Vec<(String, String)>>,
    saw_rdf: bool,
}

impl<'a> XmpParser<'a> {
    /// Create a parser that registers declared namespaces into `namespaces`
    /// and reports faults through `on_fault`
    pub fn new(
        namespaces: &'a mut NamespaceMap,
        on_fault: &'a dyn Fn(&EngineFault) -> bool,
    ) -> Self {
        Self {
            namespaces,
            on_fault,
            scopes: Vec::new(),
            saw_rdf: false,
        }
    }

    /// Parse `xml` and add every property found to `doc`
    pub fn parse_into(mut self, doc: &mut XmpDocument, xml: &str) -> XmpResult<()> {
        let xml = xml.trim_start_matches('\u{FEFF}');
        if xml.trim().is_empty() {
            return Ok(());
        }

        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Frame> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let frame = self.open_element(doc, &stack, &e)?;
                    stack.push(frame);
                }
                Ok(Event::Empty(e)) => {
                    let frame = self.open_element(doc, &stack, &e)?;
                    self.close_element(doc, &mut stack, frame)?;
                }
                Ok(Event::End(_)) => {
                    let frame = stack
                        .pop()
                        .ok_or_else(|| XmpError::Parse("Unbalanced end tag".to_string()))?;
                    self.close_element(doc, &mut stack, frame)?;
                }
                Ok(Event::Text(e)) => {
                    let raw = String::from_utf8_lossy(e.as_ref());
                    let text = unescape(&raw).map_err(|e| XmpError::Parse(e.to_string()))?;
                    append_text(&mut stack, &text);
                }
                Ok(Event::CData(e)) => {
                    append_text(&mut stack, &String::from_utf8_lossy(e.as_ref()));
                }
                Ok(Event::GeneralRef(e)) => {
                    let entity = format!("&{};", String::from_utf8_lossy(e.as_ref()));
                    let text = unescape(&entity).map_err(|e| XmpError::Parse(e.to_string()))?;
                    append_text(&mut stack, &text);
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(XmpError::Parse(format!(
                        "XML parsing error at position {}: {}",
                        reader.error_position(),
                        e
                    )));
                }
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(XmpError::Parse("Unexpected end of XMP packet".to_string()));
        }
        if !self.saw_rdf {
            self.report(
                ErrorSeverity::OperationFatal,
                cause::BAD_XMP,
                "No rdf:RDF element found",
            )?;
        }
        Ok(())
    }

    fn open_element(
        &mut self,
        doc: &mut XmpDocument,
        stack: &[Frame],
        e: &BytesStart<'_>,
    ) -> XmpResult<Frame> {
        let qname = String::from_utf8_lossy(e.name().as_ref()).to_string();
        let attrs = collect_attributes(e)?;
        self.push_scope(&attrs);

        let (prefix, local) = split_qname(&qname);
        let uri = self.resolve(prefix);
        let is_rdf = uri.as_deref() == Some(ns::RDF);

        match stack.last() {
            None | Some(Frame::Wrapper) => {
                if is_rdf && local == "RDF" {
                    self.saw_rdf = true;
                }
                if is_rdf && local == "Description" {
                    self.saw_rdf = true;
                    self.read_description(doc, &attrs)?;
                    return Ok(Frame::Description);
                }
                Ok(Frame::Wrapper)
            }
            Some(Frame::Description) => {
                let Some(namespace) = uri else {
                    self.report(
                        ErrorSeverity::Recoverable,
                        cause::BAD_XMP,
                        &format!("Undeclared namespace prefix on property {}", qname),
                    )?;
                    return Ok(Frame::Skip);
                };
                self.open_property(namespace, local, &attrs)
            }
            Some(Frame::Property { .. }) => {
                if is_rdf {
                    if let Some(kind) = ArrayKind::from_element(local) {
                        return Ok(Frame::Container {
                            kind,
                            items: Vec::new(),
                        });
                    }
                }
                self.structured(&qname)
            }
            Some(Frame::Container { .. }) => {
                if is_rdf && local == "li" {
                    if attrs
                        .iter()
                        .any(|(key, value)| key == "rdf:parseType" && value == "Resource")
                    {
                        return self.structured(&qname);
                    }
                    let lang = attrs
                        .iter()
                        .find(|(key, _)| key == "xml:lang")
                        .map(|(_, value)| value.clone());
                    return Ok(Frame::Item {
                        text: String::new(),
                        lang,
                    });
                }
                self.report(
                    ErrorSeverity::OperationFatal,
                    cause::BAD_RDF,
                    &format!("Expected rdf:li inside array, found {}", qname),
                )?;
                Ok(Frame::Skip)
            }
            Some(Frame::Item { .. }) => self.structured(&qname),
            Some(Frame::Skip) => Ok(Frame::Skip),
        }
    }

    fn open_property(
        &mut self,
        namespace: String,
        name: &str,
        attrs: &[(String, String)],
    ) -> XmpResult<Frame> {
        let mut text = String::new();
        for (key, value) in attrs {
            match key.as_str() {
                "rdf:resource" => text = value.clone(),
                "rdf:parseType" => {
                    return self.structured(&format!("{} (parseType {})", name, value));
                }
                k if k.starts_with("xmlns") || k == "xml:lang" || k.starts_with("rdf:") => {}
                other => {
                    return self.structured(&format!("{} (field {})", name, other));
                }
            }
        }
        Ok(Frame::Property {
            namespace,
            name: name.to_string(),
            text,
            array: None,
        })
    }

    fn read_description(
        &mut self,
        doc: &mut XmpDocument,
        attrs: &[(String, String)],
    ) -> XmpResult<()> {
        for (key, value) in attrs {
            if key.starts_with("xmlns") || key == "xml:lang" {
                continue;
            }
            if key == "rdf:about" {
                if doc.about.is_empty() {
                    doc.about = value.clone();
                }
                continue;
            }
            let (prefix, local) = split_qname(key);
            if self.resolve(prefix).as_deref() == Some(ns::RDF) {
                continue;
            }
            match self.resolve(prefix) {
                Some(namespace) if !prefix.is_empty() => {
                    doc.put(Property::simple(&namespace, local, value.clone()));
                }
                _ => {
                    self.report(
                        ErrorSeverity::Recoverable,
                        cause::BAD_XMP,
                        &format!("Undeclared namespace prefix on property {}", key),
                    )?;
                }
            }
        }
        Ok(())
    }

    fn close_element(
        &mut self,
        doc: &mut XmpDocument,
        stack: &mut [Frame],
        frame: Frame,
    ) -> XmpResult<()> {
        self.scopes.pop();
        match frame {
            Frame::Property {
                namespace,
                name,
                text,
                array,
            } => match array {
                Some((kind, items)) => doc.put(Property::array(&namespace, &name, kind, items)),
                None => doc.put(Property::simple(&namespace, &name, text)),
            },
            Frame::Container { kind, items } => {
                if let Some(Frame::Property { array, .. }) = stack.last_mut() {
                    *array = Some((kind, items));
                }
            }
            Frame::Item { text, lang } => {
                if let Some(Frame::Container { items, .. }) = stack.last_mut() {
                    items.push(match lang {
                        Some(lang) => ArrayItem::with_lang(text, &lang),
                        None => ArrayItem::new(text),
                    });
                }
            }
            Frame::Wrapper | Frame::Description | Frame::Skip => {}
        }
        Ok(())
    }

    fn structured(&self, what: &str) -> XmpResult<Frame> {
        self.report(
            ErrorSeverity::OperationFatal,
            cause::BAD_RDF,
            &format!("Structured values are not supported: {}", what),
        )?;
        Ok(Frame::Skip)
    }

    /// Hand a fault to the callback; only recoverable faults may continue
    fn report(&self, severity: ErrorSeverity, code: i32, message: &str) -> XmpResult<()> {
        let fault = EngineFault::new(severity, code, message);
        let proceed = (self.on_fault)(&fault);
        if proceed && severity.decision() == FaultDecision::Continue {
            Ok(())
        } else {
            Err(XmpError::Parse(fault.message))
        }
    }

    fn push_scope(&mut self, attrs: &[(String, String)]) {
        let mut scope = Vec::new();
        for (key, value) in attrs {
            if let Some(prefix) = key.strip_prefix("xmlns:") {
                // Unusable prefixes still resolve locally
                let _ = self.namespaces.register(value, prefix);
                scope.push((prefix.to_string(), value.clone()));
            }
        }
        self.scopes.push(scope);
    }

    fn resolve(&self, prefix: &str) -> Option<String> {
        if prefix == "xml" {
            return Some(ns::XML.to_string());
        }
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter())
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.clone())
    }
}

fn append_text(stack: &mut [Frame], text: &str) {
    match stack.last_mut() {
        Some(Frame::Property {
            text: value,
            array: None,
            ..
        })
        | Some(Frame::Item { text: value, .. }) => value.push_str(text),
        _ => {}
    }
}

fn split_qname(qname: &str) -> (&str, &str) {
    qname.split_once(':').unwrap_or(("", qname))
}

fn collect_attributes(e: &BytesStart<'_>) -> XmpResult<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| XmpError::Parse(format!("Bad attribute: {}", e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let raw = String::from_utf8_lossy(attr.value.as_ref());
        let value = unescape(&raw)
            .map_err(|e| XmpError::Parse(e.to_string()))?
            .to_string();
        attrs.push((key, value));
    }
    Ok(attrs)
}
