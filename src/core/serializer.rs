//! XMP RDF/XML serializer
//!
//! Writes an [`XmpDocument`] as `x:xmpmeta` / `rdf:RDF` / `rdf:Description`
//! with one element per property, optionally inside an `<?xpacket?>`
//! wrapper with whitespace padding.

use crate::core::document::XmpDocument;
use crate::core::error::{XmpError, XmpResult};
use crate::core::namespace::{ns, NamespaceMap};
use crate::core::node::{Property, PropertyNode};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

/// Packet id shared by every XMP packet
pub const PACKET_ID: &str = "W5M0MpCehiHzreSzNTczkc9d";

const TOOLKIT_NAME: &str = concat!("xmpbridge ", env!("CARGO_PKG_VERSION"));

/// Opening processing instruction of a packet wrapper
pub fn packet_header() -> String {
    format!("<?xpacket begin=\"\u{FEFF}\" id=\"{}\"?>", PACKET_ID)
}

/// Closing processing instruction of a packet wrapper
pub fn packet_trailer(writeable: bool) -> String {
    format!("<?xpacket end=\"{}\"?>", if writeable { 'w' } else { 'r' })
}

/// Serializer for XMP packets
pub struct XmpSerializer<'a> {
    namespaces: &'a NamespaceMap,
}

impl<'a> XmpSerializer<'a> {
    /// Create a serializer that resolves prefixes through `namespaces`
    pub fn new(namespaces: &'a NamespaceMap) -> Self {
        Self { namespaces }
    }

    /// Serialize to a bare `x:xmpmeta` element
    pub fn serialize_rdf(&self, doc: &XmpDocument) -> XmpResult<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        let mut meta = BytesStart::new("x:xmpmeta");
        meta.push_attribute(("xmlns:x", ns::ADOBE_META));
        meta.push_attribute(("x:xmptk", TOOLKIT_NAME));
        writer.write_event(Event::Start(meta))?;

        let mut rdf = BytesStart::new("rdf:RDF");
        rdf.push_attribute(("xmlns:rdf", ns::RDF));
        writer.write_event(Event::Start(rdf))?;

        let mut description = BytesStart::new("rdf:Description");
        description.push_attribute(("rdf:about", doc.about.as_str()));
        let mut declared: Vec<&str> = Vec::new();
        for property in doc.properties() {
            if declared.contains(&property.namespace.as_str()) {
                continue;
            }
            let prefix = self.prefix(&property.namespace)?;
            let declaration = format!("xmlns:{}", prefix);
            description.push_attribute((declaration.as_str(), property.namespace.as_str()));
            declared.push(property.namespace.as_str());
        }

        if doc.is_empty() {
            writer.write_event(Event::Empty(description))?;
        } else {
            writer.write_event(Event::Start(description))?;
            for property in doc.properties() {
                self.write_property(&mut writer, property)?;
            }
            writer.write_event(Event::End(BytesEnd::new("rdf:Description")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("rdf:RDF")))?;
        writer.write_event(Event::End(BytesEnd::new("x:xmpmeta")))?;

        let result = writer.into_inner().into_inner();
        String::from_utf8(result)
            .map_err(|e| XmpError::Serialization(format!("UTF-8 encoding error: {}", e)))
    }

    /// Serialize inside a packet wrapper followed by `padding` bytes of
    /// whitespace
    pub fn serialize_packet(
        &self,
        doc: &XmpDocument,
        padding: usize,
        writeable: bool,
    ) -> XmpResult<String> {
        let body = self.serialize_rdf(doc)?;
        Ok(wrap_packet(&body, padding, writeable))
    }

    /// Serialize inside a packet wrapper padded to exactly `length` bytes
    ///
    /// Fails when the unpadded packet is already longer than `length`.
    pub fn serialize_packet_exact(
        &self,
        doc: &XmpDocument,
        length: usize,
        writeable: bool,
    ) -> XmpResult<String> {
        let body = self.serialize_rdf(doc)?;
        let minimum = wrap_packet(&body, 0, writeable).len();
        if minimum > length {
            return Err(XmpError::Serialization(format!(
                "Packet needs {} bytes but only {} are available",
                minimum, length
            )));
        }
        Ok(wrap_packet(&body, length - minimum, writeable))
    }

    fn write_property(
        &self,
        writer: &mut Writer<Cursor<Vec<u8>>>,
        property: &Property,
    ) -> XmpResult<()> {
        let qname = format!("{}:{}", self.prefix(&property.namespace)?, property.name);
        match &property.node {
            PropertyNode::Simple(value) => {
                if value.is_empty() {
                    writer.write_event(Event::Empty(BytesStart::new(qname.as_str())))?;
                } else {
                    writer.write_event(Event::Start(BytesStart::new(qname.as_str())))?;
                    writer.write_event(Event::Text(BytesText::new(value)))?;
                    writer.write_event(Event::End(BytesEnd::new(qname.as_str())))?;
                }
            }
            PropertyNode::Array { kind, items } => {
                let container = format!("rdf:{}", kind.rdf_type());
                writer.write_event(Event::Start(BytesStart::new(qname.as_str())))?;
                if items.is_empty() {
                    writer.write_event(Event::Empty(BytesStart::new(container.as_str())))?;
                } else {
                    writer.write_event(Event::Start(BytesStart::new(container.as_str())))?;
                    for item in items {
                        let mut li = BytesStart::new("rdf:li");
                        if let Some(lang) = &item.lang {
                            li.push_attribute(("xml:lang", lang.as_str()));
                        }
                        writer.write_event(Event::Start(li))?;
                        writer.write_event(Event::Text(BytesText::new(&item.value)))?;
                        writer.write_event(Event::End(BytesEnd::new("rdf:li")))?;
                    }
                    writer.write_event(Event::End(BytesEnd::new(container.as_str())))?;
                }
                writer.write_event(Event::End(BytesEnd::new(qname.as_str())))?;
            }
        }
        Ok(())
    }

    fn prefix(&self, uri: &str) -> XmpResult<&'a str> {
        self.namespaces.get_prefix(uri).ok_or_else(|| {
            XmpError::BadSchema(format!("Unregistered schema namespace URI: {}", uri))
        })
    }
}

fn wrap_packet(body: &str, padding: usize, writeable: bool) -> String {
    let header = packet_header();
    let trailer = packet_trailer(writeable);
    let mut packet = String::with_capacity(header.len() + body.len() + padding + trailer.len() + 2);
    packet.push_str(&header);
    packet.push('\n');
    packet.push_str(body);
    packet.push('\n');
    packet.push_str(&padding_block(padding));
    packet.push_str(&trailer);
    packet
}

/// Whitespace padding with a newline every 100 bytes
pub fn padding_block(size: usize) -> String {
    (1..=size)
        .map(|i| if i % 100 == 0 { '\n' } else { ' ' })
        .collect()
}
