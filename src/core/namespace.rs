//! Namespace management for XMP
//!
//! XMP organizes properties into schemas identified by namespace URIs. Each
//! URI is bound to exactly one prefix, and each prefix to one URI.

use crate::core::error::{XmpError, XmpResult};
use std::collections::HashMap;

/// Built-in XMP namespaces
pub mod ns {
    /// XMP Basic namespace
    pub const XMP: &str = "http://ns.adobe.com/xap/1.0/";
    /// Dublin Core namespace
    pub const DC: &str = "http://purl.org/dc/elements/1.1/";
    /// EXIF namespace
    pub const EXIF: &str = "http://ns.adobe.com/exif/1.0/";
    /// TIFF namespace
    pub const TIFF: &str = "http://ns.adobe.com/tiff/1.0/";
    /// Photoshop namespace
    pub const PHOTOSHOP: &str = "http://ns.adobe.com/photoshop/1.0/";
    /// XMP Rights namespace
    pub const XMP_RIGHTS: &str = "http://ns.adobe.com/xap/1.0/rights/";
    /// XMP Media Management namespace
    pub const XMP_MM: &str = "http://ns.adobe.com/xap/1.0/mm/";
    /// PDF namespace
    pub const PDF: &str = "http://ns.adobe.com/pdf/1.3/";
    /// PDF/A identification namespace
    pub const PDFA_ID: &str = "http://www.aiim.org/pdfa/ns/id/";
    /// PDF/UA identification namespace
    pub const PDFUA_ID: &str = "http://www.aiim.org/pdfua/ns/id/";
    /// IPTC Core namespace
    pub const IPTC_CORE: &str = "http://iptc.org/std/Iptc4xmpCore/1.0/xmlns/";
    /// XMP Dynamic Media namespace
    pub const XMP_DM: &str = "http://ns.adobe.com/xmp/1.0/DynamicMedia/";
    /// RDF namespace
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// XML namespace (for xml:lang, etc.)
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    /// Namespace of the `x:xmpmeta` wrapper element
    pub const ADOBE_META: &str = "adobe:ns:meta/";
}

const BUILTIN: &[(&str, &str)] = &[
    (ns::XMP, "xmp"),
    (ns::DC, "dc"),
    (ns::EXIF, "exif"),
    (ns::TIFF, "tiff"),
    (ns::PHOTOSHOP, "photoshop"),
    (ns::XMP_RIGHTS, "xmpRights"),
    (ns::XMP_MM, "xmpMM"),
    (ns::PDF, "pdf"),
    (ns::PDFA_ID, "pdfaid"),
    (ns::PDFUA_ID, "pdfuaid"),
    (ns::IPTC_CORE, "Iptc4xmpCore"),
    (ns::XMP_DM, "xmpDM"),
    (ns::RDF, "rdf"),
    (ns::XML, "xml"),
    (ns::ADOBE_META, "x"),
];

/// Bidirectional map of namespace URI and prefix
#[derive(Debug, Clone, Default)]
pub struct NamespaceMap {
    uri_to_prefix: HashMap<String, String>,
    prefix_to_uri: HashMap<String, String>,
}

impl NamespaceMap {
    /// Create a new namespace map with built-in namespaces registered
    pub fn new() -> Self {
        let mut map = Self::default();
        for (uri, prefix) in BUILTIN {
            map.bind(uri, prefix);
        }
        map
    }

    /// Register a namespace URI with a suggested prefix
    ///
    /// Returns the prefix actually bound. A URI that is already registered
    /// keeps its prefix. When the suggestion is taken by another URI, the
    /// first free `{prefix}_{n}_` is used instead.
    ///
    /// # Example
    ///
    /// ```rust
    /// use xmpbridge::core::namespace::NamespaceMap;
    ///
    /// let mut map = NamespaceMap::new();
    /// assert_eq!(map.register("http://example.com/a/", "ex").unwrap(), "ex");
    /// assert_eq!(map.register("http://example.com/b/", "ex").unwrap(), "ex_1_");
    /// assert_eq!(map.register("http://example.com/a/", "other").unwrap(), "ex");
    /// ```
    pub fn register(&mut self, uri: &str, suggested_prefix: &str) -> XmpResult<String> {
        if uri.is_empty() {
            return Err(XmpError::BadSchema("URI cannot be empty".to_string()));
        }
        let suggested = suggested_prefix.trim_end_matches(':');
        if !is_xml_name(suggested) {
            return Err(XmpError::BadSchema(format!(
                "Invalid namespace prefix: '{}'",
                suggested_prefix
            )));
        }

        if let Some(existing) = self.uri_to_prefix.get(uri) {
            return Ok(existing.clone());
        }

        let mut prefix = suggested.to_string();
        let mut n = 1;
        while self.prefix_to_uri.contains_key(&prefix) {
            prefix = format!("{}_{}_", suggested, n);
            n += 1;
        }
        self.bind(uri, &prefix);
        Ok(prefix)
    }

    fn bind(&mut self, uri: &str, prefix: &str) {
        self.uri_to_prefix.insert(uri.to_string(), prefix.to_string());
        self.prefix_to_uri.insert(prefix.to_string(), uri.to_string());
    }

    /// Get the prefix for a namespace URI
    pub fn get_prefix(&self, uri: &str) -> Option<&str> {
        self.uri_to_prefix.get(uri).map(|s| s.as_str())
    }

    /// Get the URI for a namespace prefix
    pub fn get_uri(&self, prefix: &str) -> Option<&str> {
        self.prefix_to_uri.get(prefix).map(|s| s.as_str())
    }

    /// Check if a namespace URI is registered
    pub fn has_uri(&self, uri: &str) -> bool {
        self.uri_to_prefix.contains_key(uri)
    }
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
