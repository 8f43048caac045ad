//! Bundled pure Rust engine
//!
//! [`BasicEngine`] covers the flat part of the XMP data model: simple
//! properties and arrays of simple, optionally language tagged, items.
//! Packets with structured values are rejected with an operation fatal
//! fault. Files are handled by the XMP sidecar smart handler or by packet
//! scanning.

use crate::core::document::XmpDocument;
use crate::core::error::{XmpError, XmpResult};
use crate::core::namespace::NamespaceMap;
use crate::core::node::PropertyNode;
use crate::core::parser::XmpParser;
use crate::core::serializer::XmpSerializer;
use crate::engine::fault::{cause, EngineFault, ErrorCallback, ErrorSeverity, FaultDecision};
use crate::engine::{LocalizedText, MetadataEngine};
use crate::files::file::BasicFile;
use crate::files::flags::OpenFlags;
use crate::files::format::{FileFormat, FileInfo};
use crate::types::options::{PropertyOptions, TemplateFlags};
use crate::types::packet::PacketInfo;
use crate::utils::datetime::XmpDateTime;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Padding written after a rewritten sidecar packet
pub const SIDECAR_PADDING: usize = 2048;

/// The bundled metadata engine
///
/// # Example
///
/// ```rust
/// use xmpbridge::engine::{BasicEngine, MetadataEngine};
/// use xmpbridge::ns;
///
/// let engine = BasicEngine::new();
/// engine.initialize_document_model()?;
///
/// let mut doc = engine.new_document();
/// engine.set_property(&mut doc, ns::XMP, "CreatorTool", "xmpbridge")?;
/// let packet = engine.serialize(&doc)?;
/// assert!(packet.contains("<xmp:CreatorTool>xmpbridge</xmp:CreatorTool>"));
/// # Ok::<(), xmpbridge::XmpError>(())
/// ```
pub struct BasicEngine {
    namespaces: RwLock<NamespaceMap>,
    callback: RwLock<Option<ErrorCallback>>,
    plugin_path: RwLock<Option<PathBuf>>,
    document_model: AtomicBool,
    file_io: AtomicBool,
}

impl Default for BasicEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BasicEngine {
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(NamespaceMap::new()),
            callback: RwLock::new(None),
            plugin_path: RwLock::new(None),
            document_model: AtomicBool::new(false),
            file_io: AtomicBool::new(false),
        }
    }

    /// Plug-in directory given to file I/O initialization
    ///
    /// The basic engine has no plug-ins; the path is only recorded.
    pub fn plugin_path(&self) -> Option<PathBuf> {
        self.plugin_path.read().ok().and_then(|path| path.clone())
    }

    fn namespaces(&self) -> XmpResult<RwLockReadGuard<'_, NamespaceMap>> {
        self.namespaces
            .read()
            .map_err(|_| XmpError::Internal("Namespace registry lock poisoned".to_string()))
    }

    fn namespaces_mut(&self) -> XmpResult<RwLockWriteGuard<'_, NamespaceMap>> {
        self.namespaces
            .write()
            .map_err(|_| XmpError::Internal("Namespace registry lock poisoned".to_string()))
    }

    fn require_document_model(&self) -> XmpResult<()> {
        if self.document_model.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(XmpError::Usage("Metadata engine is not initialized".to_string()))
        }
    }

    fn require_file_io(&self) -> XmpResult<()> {
        if self.file_io.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(XmpError::Usage("File I/O is not initialized".to_string()))
        }
    }

    fn require_namespace(&self, namespace: &str) -> XmpResult<()> {
        if self.namespaces()?.has_uri(namespace) {
            Ok(())
        } else {
            Err(XmpError::BadSchema(format!(
                "Unregistered schema namespace URI: {}",
                namespace
            )))
        }
    }

    /// Hand a fault to the installed callback, logging it when none is set
    ///
    /// Returns whether the engine may continue.
    fn report(&self, fault: &EngineFault) -> bool {
        let callback = self
            .callback
            .read()
            .ok()
            .and_then(|callback| callback.clone());
        match callback {
            Some(callback) => callback(fault),
            None => {
                tracing::warn!("{}", fault);
                fault.severity.decision() == FaultDecision::Continue
            }
        }
    }

    fn file_fault(&self, severity: ErrorSeverity, code: i32, path: &Path, error: &XmpError) {
        let fault = EngineFault::new(severity, code, error.to_string()).with_file(path);
        self.report(&fault);
    }

    /// Serialize with a packet wrapper and `padding` bytes of padding
    pub fn serialize_packet(&self, doc: &XmpDocument, padding: usize) -> XmpResult<String> {
        let namespaces = self.namespaces()?;
        XmpSerializer::new(&namespaces).serialize_packet(doc, padding, true)
    }

    fn packet_for(&self, file: &BasicFile, doc: &XmpDocument) -> XmpResult<String> {
        let namespaces = self.namespaces()?;
        let serializer = XmpSerializer::new(&namespaces);
        match file.target_length() {
            Some(length) => serializer.serialize_packet_exact(doc, length, true),
            None => serializer.serialize_packet(doc, SIDECAR_PADDING, true),
        }
    }
}

impl MetadataEngine for BasicEngine {
    type Document = XmpDocument;
    type File = BasicFile;

    fn initialize_document_model(&self) -> XmpResult<()> {
        if !self.document_model.swap(true, Ordering::AcqRel) {
            *self.namespaces_mut()? = NamespaceMap::new();
        }
        Ok(())
    }

    fn terminate_document_model(&self) {
        self.document_model.store(false, Ordering::Release);
    }

    fn initialize_file_io(&self, plugin_path: Option<&Path>) -> XmpResult<()> {
        self.require_document_model()?;
        if let Some(path) = plugin_path {
            if !path.is_dir() {
                tracing::warn!(path = %path.display(), "plug-in directory does not exist");
            }
        }
        if let Ok(mut recorded) = self.plugin_path.write() {
            *recorded = plugin_path.map(Path::to_path_buf);
        }
        self.file_io.store(true, Ordering::Release);
        Ok(())
    }

    fn terminate_file_io(&self) {
        self.file_io.store(false, Ordering::Release);
    }

    fn set_error_callback(&self, callback: ErrorCallback) {
        if let Ok(mut installed) = self.callback.write() {
            *installed = Some(callback);
        }
    }

    fn new_document(&self) -> XmpDocument {
        XmpDocument::new()
    }

    fn parse_chunk(&self, doc: &mut XmpDocument, chunk: &[u8], more_coming: bool) -> XmpResult<()> {
        self.require_document_model()?;
        doc.pending.extend_from_slice(chunk);
        if more_coming {
            return Ok(());
        }

        let buffer = std::mem::take(&mut doc.pending);
        let text = std::str::from_utf8(&buffer).map_err(|e| {
            let fault = EngineFault::new(
                ErrorSeverity::OperationFatal,
                cause::BAD_XML,
                format!("Packet is not valid UTF-8: {}", e),
            );
            self.report(&fault);
            XmpError::Parse(fault.message)
        })?;

        let mut namespaces = self.namespaces_mut()?;
        let on_fault = |fault: &EngineFault| self.report(fault);
        XmpParser::new(&mut namespaces, &on_fault).parse_into(doc, text)
    }

    fn serialize(&self, doc: &XmpDocument) -> XmpResult<String> {
        self.require_document_model()?;
        self.serialize_packet(doc, 0)
    }

    fn get_property(
        &self,
        doc: &XmpDocument,
        namespace: &str,
        name: &str,
    ) -> XmpResult<Option<(String, PropertyOptions)>> {
        Ok(doc.get(namespace, name).map(|property| {
            let value = match &property.node {
                PropertyNode::Simple(value) => value.clone(),
                PropertyNode::Array { .. } => String::new(),
            };
            (value, property.options())
        }))
    }

    fn set_property(
        &self,
        doc: &mut XmpDocument,
        namespace: &str,
        name: &str,
        value: &str,
    ) -> XmpResult<()> {
        self.require_namespace(namespace)?;
        doc.set_simple(namespace, name, value)
    }

    fn delete_property(&self, doc: &mut XmpDocument, namespace: &str, name: &str) -> XmpResult<()> {
        doc.delete(namespace, name);
        Ok(())
    }

    fn get_localized_text(
        &self,
        doc: &XmpDocument,
        namespace: &str,
        name: &str,
        generic_lang: &str,
        specific_lang: &str,
    ) -> XmpResult<Option<LocalizedText>> {
        Ok(doc
            .localized_text(namespace, name, generic_lang, specific_lang)
            .map(|found| LocalizedText {
                value: found.value.to_string(),
                actual_lang: found.lang.to_string(),
                options: found.item.options(),
            }))
    }

    fn set_localized_text(
        &self,
        doc: &mut XmpDocument,
        namespace: &str,
        name: &str,
        generic_lang: &str,
        specific_lang: &str,
        value: &str,
        _options: PropertyOptions,
    ) -> XmpResult<()> {
        self.require_namespace(namespace)?;
        doc.set_localized_text(namespace, name, generic_lang, specific_lang, value)
    }

    fn remove_properties(&self, doc: &mut XmpDocument, include_internal: bool) -> XmpResult<()> {
        doc.remove_properties(include_internal);
        Ok(())
    }

    fn apply_template(
        &self,
        dest: &mut XmpDocument,
        template: &XmpDocument,
        flags: TemplateFlags,
    ) -> XmpResult<()> {
        dest.apply_template(template, flags);
        Ok(())
    }

    fn register_namespace(&self, uri: &str, suggested_prefix: &str) -> XmpResult<(bool, String)> {
        self.require_document_model()?;
        let prefix = self.namespaces_mut()?.register(uri, suggested_prefix)?;
        let accepted = prefix == suggested_prefix.trim_end_matches(':');
        Ok((accepted, prefix))
    }

    fn namespace_prefix(&self, uri: &str) -> Option<String> {
        self.namespaces()
            .ok()
            .and_then(|namespaces| namespaces.get_prefix(uri).map(str::to_string))
    }

    fn current_date_time(&self) -> XmpDateTime {
        XmpDateTime::now()
    }

    fn open_file(&self, path: &Path, format: FileFormat, flags: OpenFlags) -> XmpResult<BasicFile> {
        self.require_file_io()?;
        BasicFile::open(path, format, flags).inspect_err(|e| {
            let code = match e {
                XmpError::IoError(_) => cause::NO_FILE,
                _ => cause::NO_FILE_HANDLER,
            };
            self.file_fault(ErrorSeverity::FileFatal, code, path, e);
        })
    }

    fn close_file(&self, file: BasicFile) -> XmpResult<()> {
        let path = file.path().to_path_buf();
        file.close().inspect_err(|e| {
            self.file_fault(ErrorSeverity::FileFatal, cause::WRITE_ERROR, &path, e);
        })
    }

    fn get_xmp(&self, file: &mut BasicFile) -> XmpResult<Option<(XmpDocument, PacketInfo)>> {
        let Some(packet) = file.packet_bytes() else {
            return Ok(None);
        };
        let mut doc = XmpDocument::new();
        self.parse_chunk(&mut doc, packet, false)?;
        Ok(Some((doc, file.packet_info())))
    }

    fn can_put_xmp(&self, file: &BasicFile, doc: &XmpDocument) -> XmpResult<bool> {
        if !file.is_writeable() {
            return Ok(false);
        }
        match file.target_length() {
            Some(length) => Ok(self.serialize_packet(doc, 0)?.len() <= length),
            None => Ok(true),
        }
    }

    fn put_xmp(&self, file: &mut BasicFile, doc: &XmpDocument) -> XmpResult<()> {
        let packet = self.packet_for(file, doc).inspect_err(|e| {
            self.file_fault(ErrorSeverity::OperationFatal, cause::BAD_SERIALIZE, file.path(), e);
        })?;
        file.stage(packet.as_bytes())
    }

    fn file_info(&self, file: &BasicFile) -> XmpResult<FileInfo> {
        Ok(file.info())
    }
}
