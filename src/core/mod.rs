//! XMP Core module
//!
//! Errors and namespaces are always available. The in-memory document
//! model, parser and serializer back the bundled engine and are only built
//! with the `basic` feature.

pub mod error;
pub mod namespace;

#[cfg(feature = "basic")]
pub mod document;
#[cfg(feature = "basic")]
pub mod node;
#[cfg(feature = "basic")]
pub mod parser;
#[cfg(feature = "basic")]
pub mod serializer;

pub use error::{XmpError, XmpResult};
pub use namespace::{ns, NamespaceMap};

#[cfg(feature = "basic")]
pub use document::XmpDocument;
#[cfg(feature = "basic")]
pub use node::{ArrayItem, ArrayKind, Property, PropertyNode};
#[cfg(feature = "basic")]
pub use parser::XmpParser;
#[cfg(feature = "basic")]
pub use serializer::XmpSerializer;
