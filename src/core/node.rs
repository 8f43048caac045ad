//! XMP node types
//!
//! The bundled engine models the flat part of the XMP data model:
//! - simple properties holding a single string
//! - arrays (`rdf:Seq`, `rdf:Bag`, `rdf:Alt`) of simple items, each with an
//!   optional `xml:lang` qualifier

use crate::types::options::PropertyOptions;

/// Kind of array container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
    /// Ordered array (rdf:Seq)
    Seq,
    /// Unordered array (rdf:Bag)
    Bag,
    /// Alternative array (rdf:Alt)
    Alt,
}

impl ArrayKind {
    /// Get the RDF type name for this array kind
    pub fn rdf_type(self) -> &'static str {
        match self {
            ArrayKind::Seq => "Seq",
            ArrayKind::Bag => "Bag",
            ArrayKind::Alt => "Alt",
        }
    }

    /// Map an RDF container element name (with or without prefix)
    pub fn from_element(name: &str) -> Option<Self> {
        match name.rsplit(':').next() {
            Some("Seq") => Some(ArrayKind::Seq),
            Some("Bag") => Some(ArrayKind::Bag),
            Some("Alt") => Some(ArrayKind::Alt),
            _ => None,
        }
    }
}

/// An array item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayItem {
    pub value: String,
    /// `xml:lang` qualifier, normalized to lower case
    pub lang: Option<String>,
}

impl ArrayItem {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            lang: None,
        }
    }

    pub fn with_lang(value: impl Into<String>, lang: &str) -> Self {
        Self {
            value: value.into(),
            lang: Some(normalize_lang(lang)),
        }
    }

    /// Options reported for this item
    pub fn options(&self) -> PropertyOptions {
        if self.lang.is_some() {
            PropertyOptions::HAS_LANG | PropertyOptions::HAS_QUALIFIERS
        } else {
            PropertyOptions::empty()
        }
    }
}

/// Value of a property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyNode {
    Simple(String),
    Array {
        kind: ArrayKind,
        items: Vec<ArrayItem>,
    },
}

impl PropertyNode {
    /// Whether the value carries no data
    pub fn is_empty(&self) -> bool {
        match self {
            PropertyNode::Simple(value) => value.is_empty(),
            PropertyNode::Array { items, .. } => items.is_empty(),
        }
    }

    /// Whether this is an `rdf:Alt` whose items are all language tagged
    pub fn is_alt_text(&self) -> bool {
        match self {
            PropertyNode::Array {
                kind: ArrayKind::Alt,
                items,
            } => items.iter().all(|item| item.lang.is_some()),
            _ => false,
        }
    }
}

/// A top-level property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Namespace URI
    pub namespace: String,
    /// Local name
    pub name: String,
    pub node: PropertyNode,
}

impl Property {
    pub fn simple(namespace: &str, name: &str, value: impl Into<String>) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            node: PropertyNode::Simple(value.into()),
        }
    }

    pub fn array(namespace: &str, name: &str, kind: ArrayKind, items: Vec<ArrayItem>) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            node: PropertyNode::Array { kind, items },
        }
    }

    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.namespace == namespace && self.name == name
    }

    /// Options describing the shape of this property
    pub fn options(&self) -> PropertyOptions {
        match &self.node {
            PropertyNode::Simple(_) => PropertyOptions::empty(),
            PropertyNode::Array { kind, .. } => {
                let mut options = PropertyOptions::VALUE_IS_ARRAY;
                match kind {
                    ArrayKind::Seq => options |= PropertyOptions::ARRAY_IS_ORDERED,
                    ArrayKind::Bag => {}
                    ArrayKind::Alt => {
                        options |= PropertyOptions::ARRAY_IS_ORDERED
                            | PropertyOptions::ARRAY_IS_ALTERNATE;
                        if self.node.is_alt_text() {
                            options |= PropertyOptions::ARRAY_IS_ALT_TEXT;
                        }
                    }
                }
                options
            }
        }
    }
}

/// Normalize a language tag the way XMP compares them
pub fn normalize_lang(lang: &str) -> String {
    lang.trim().to_ascii_lowercase()
}
