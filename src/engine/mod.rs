//! Metadata engine capability
//!
//! [`MetadataEngine`] is the seam between this crate and the component that
//! actually parses, models and serializes XMP. Everything above it, the
//! lifecycle, sessions, the merge-write strategy and the batch operations,
//! only talks to the engine through this trait.
//!
//! The crate bundles [`BasicEngine`] (feature `basic`), a pure Rust engine
//! for flat XMP with sidecar and packet-scanning file support.

pub mod fault;
pub mod lifecycle;

#[cfg(feature = "basic")]
pub mod basic;

#[cfg(feature = "basic")]
pub use basic::BasicEngine;
pub use fault::{default_error_callback, EngineFault, ErrorCallback, ErrorSeverity, FaultDecision};
pub use lifecycle::{EngineLifecycle, ShutdownGuard};

use crate::core::error::XmpResult;
use crate::files::flags::OpenFlags;
use crate::files::format::{FileFormat, FileInfo};
use crate::types::options::{PropertyOptions, TemplateFlags};
use crate::types::packet::PacketInfo;
use crate::utils::datetime::XmpDateTime;
use std::path::Path;

/// Result of a localized text lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedText {
    pub value: String,
    /// Language of the item that was selected
    pub actual_lang: String,
    pub options: PropertyOptions,
}

/// Operations the layer above needs from an XMP engine
///
/// Methods take `&self`; engines are shared between threads and guard their
/// own registries. Documents and files are owned by the caller.
///
/// The typed setters default to the string encodings XMP uses for those
/// types, so an engine only has to implement [`set_property`].
///
/// [`set_property`]: MetadataEngine::set_property
pub trait MetadataEngine: Send + Sync + 'static {
    /// In-memory XMP document
    type Document: Clone + Send;
    /// Open file handle
    type File: Send;

    /// Start the document model (namespace registry, parser)
    fn initialize_document_model(&self) -> XmpResult<()>;

    fn terminate_document_model(&self);

    /// Start file I/O, optionally loading handler plug-ins from `plugin_path`
    fn initialize_file_io(&self, plugin_path: Option<&Path>) -> XmpResult<()>;

    fn terminate_file_io(&self);

    /// Install the callback that receives engine faults
    fn set_error_callback(&self, callback: ErrorCallback);

    fn new_document(&self) -> Self::Document;

    /// Feed one chunk of a serialized packet
    ///
    /// Chunks are accumulated until `more_coming` is false; the document is
    /// only complete after that final call.
    fn parse_chunk(
        &self,
        doc: &mut Self::Document,
        chunk: &[u8],
        more_coming: bool,
    ) -> XmpResult<()>;

    /// Serialize to a packet with an `<?xpacket?>` wrapper
    fn serialize(&self, doc: &Self::Document) -> XmpResult<String>;

    /// Value and options of a property; arrays report an empty value
    fn get_property(
        &self,
        doc: &Self::Document,
        namespace: &str,
        name: &str,
    ) -> XmpResult<Option<(String, PropertyOptions)>>;

    fn set_property(
        &self,
        doc: &mut Self::Document,
        namespace: &str,
        name: &str,
        value: &str,
    ) -> XmpResult<()>;

    fn set_property_bool(
        &self,
        doc: &mut Self::Document,
        namespace: &str,
        name: &str,
        value: bool,
    ) -> XmpResult<()> {
        let encoded = if value { "True" } else { "False" };
        self.set_property(doc, namespace, name, encoded)
    }

    fn set_property_int32(
        &self,
        doc: &mut Self::Document,
        namespace: &str,
        name: &str,
        value: i32,
    ) -> XmpResult<()> {
        self.set_property(doc, namespace, name, &value.to_string())
    }

    fn set_property_int64(
        &self,
        doc: &mut Self::Document,
        namespace: &str,
        name: &str,
        value: i64,
    ) -> XmpResult<()> {
        self.set_property(doc, namespace, name, &value.to_string())
    }

    fn set_property_float(
        &self,
        doc: &mut Self::Document,
        namespace: &str,
        name: &str,
        value: f64,
    ) -> XmpResult<()> {
        self.set_property(doc, namespace, name, &format!("{:.6}", value))
    }

    fn set_property_date(
        &self,
        doc: &mut Self::Document,
        namespace: &str,
        name: &str,
        value: &XmpDateTime,
    ) -> XmpResult<()> {
        self.set_property(doc, namespace, name, &value.format())
    }

    fn delete_property(&self, doc: &mut Self::Document, namespace: &str, name: &str)
        -> XmpResult<()>;

    /// Select an item of an alt-text array
    fn get_localized_text(
        &self,
        doc: &Self::Document,
        namespace: &str,
        name: &str,
        generic_lang: &str,
        specific_lang: &str,
    ) -> XmpResult<Option<LocalizedText>>;

    #[allow(clippy::too_many_arguments)]
    fn set_localized_text(
        &self,
        doc: &mut Self::Document,
        namespace: &str,
        name: &str,
        generic_lang: &str,
        specific_lang: &str,
        value: &str,
        options: PropertyOptions,
    ) -> XmpResult<()>;

    /// Remove every property, internal ones only when asked to
    fn remove_properties(&self, doc: &mut Self::Document, include_internal: bool)
        -> XmpResult<()>;

    /// Merge `template` into `dest` as `flags` describe
    fn apply_template(
        &self,
        dest: &mut Self::Document,
        template: &Self::Document,
        flags: TemplateFlags,
    ) -> XmpResult<()>;

    /// Register a namespace
    ///
    /// Returns whether the suggested prefix was used and the prefix that is
    /// now bound to `uri`.
    fn register_namespace(&self, uri: &str, suggested_prefix: &str) -> XmpResult<(bool, String)>;

    fn namespace_prefix(&self, uri: &str) -> Option<String>;

    fn current_date_time(&self) -> XmpDateTime;

    fn open_file(&self, path: &Path, format: FileFormat, flags: OpenFlags) -> XmpResult<Self::File>;

    /// Close the file, flushing pending updates
    fn close_file(&self, file: Self::File) -> XmpResult<()>;

    /// Read the metadata of an open file; `None` when it carries no XMP
    fn get_xmp(&self, file: &mut Self::File) -> XmpResult<Option<(Self::Document, PacketInfo)>>;

    /// Whether `doc` can be written to `file`
    fn can_put_xmp(&self, file: &Self::File, doc: &Self::Document) -> XmpResult<bool>;

    /// Queue `doc` for writing; it reaches the file on close
    fn put_xmp(&self, file: &mut Self::File, doc: &Self::Document) -> XmpResult<()>;

    fn file_info(&self, file: &Self::File) -> XmpResult<FileInfo>;
}
