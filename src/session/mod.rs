//! Metadata sessions
//!
//! A [`Session`] binds one open file to the engine. It is either closed or
//! open; an open session owns the engine file handle, the document and the
//! packet info, and loads the metadata lazily on first use.
//!
//! Failed operations never leave a half-open session behind: a failed open
//! keeps the session closed, a failed load closes it.

pub mod batch;
pub mod merge;
pub mod report;

pub use batch::{check_file, FileScope};
pub use merge::{parse_in_chunks, WriteMode, PARSE_CHUNK_SIZE};
pub use report::PacketReport;

use crate::core::error::{XmpError, XmpResult};
use crate::engine::MetadataEngine;
use crate::files::flags::OpenFlags;
use crate::files::format::{FileFormat, FileInfo};
use crate::toolkit::Toolkit;
use crate::types::options::PropertyOptions;
use crate::types::packet::PacketInfo;
use crate::types::value::PropertyValue;
use std::path::{Path, PathBuf};

/// Result of [`Session::property`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyLookup {
    pub exists: bool,
    /// Empty when the property does not exist
    pub value: String,
    pub options: PropertyOptions,
}

/// Result of [`Session::localized_text`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedLookup {
    pub exists: bool,
    pub value: String,
    /// Language of the item that was selected
    pub actual_lang: String,
    pub options: PropertyOptions,
}

struct OpenSession<E: MetadataEngine> {
    file: E::File,
    document: E::Document,
    packet: PacketInfo,
    loaded: bool,
    path: PathBuf,
    flags: OpenFlags,
}

enum State<E: MetadataEngine> {
    Closed,
    Open(OpenSession<E>),
}

/// One file open in the metadata engine
///
/// Every operation that reads or changes metadata takes `&mut self`; share a
/// session between threads by wrapping it in a `Mutex`.
///
/// # Example
///
/// ```rust,no_run
/// use xmpbridge::{ns, BasicEngine, OpenFlags, Toolkit};
///
/// let toolkit = Toolkit::new(BasicEngine::new());
/// let mut session = toolkit.session();
/// session.open_with("photo.xmp", OpenFlags::default().for_update().use_smart_handler())?;
///
/// let rating = session.property(ns::XMP, "Rating")?;
/// if !rating.exists {
///     session.set_property(ns::XMP, "Rating", 3)?;
/// }
/// session.commit()?;
/// session.try_close()?;
/// # Ok::<(), xmpbridge::XmpError>(())
/// ```
pub struct Session<E: MetadataEngine> {
    toolkit: Toolkit<E>,
    state: State<E>,
}

impl<E: MetadataEngine> Session<E> {
    /// A closed session on `toolkit`'s engine
    pub fn new(toolkit: &Toolkit<E>) -> Self {
        Self {
            toolkit: toolkit.clone(),
            state: State::Closed,
        }
    }

    fn engine(&self) -> &E {
        self.toolkit.engine()
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open(_))
    }

    pub fn is_loaded(&self) -> bool {
        matches!(&self.state, State::Open(session) if session.loaded)
    }

    /// Path of the open file
    pub fn path(&self) -> Option<&Path> {
        match &self.state {
            State::Open(session) => Some(&session.path),
            State::Closed => None,
        }
    }

    /// Flags the file was opened with
    pub fn open_flags(&self) -> Option<OpenFlags> {
        match &self.state {
            State::Open(session) => Some(session.flags),
            State::Closed => None,
        }
    }

    /// Open read-only through the smart handler
    pub fn open(&mut self, path: impl AsRef<Path>) -> XmpResult<()> {
        self.open_with(path, OpenFlags::DEFAULT_READ)
    }

    /// Open with explicit flags
    ///
    /// Starts the engine if needed. Opening an already open session is a
    /// usage error; a failed open leaves the session closed.
    pub fn open_with(&mut self, path: impl AsRef<Path>, flags: OpenFlags) -> XmpResult<()> {
        let path = path.as_ref();
        if self.is_open() {
            return Err(XmpError::Usage(format!(
                "Session already open, close it before opening {}",
                path.display()
            )));
        }
        self.toolkit.initialize(None)?;

        let engine = self.engine();
        let file = engine
            .open_file(path, FileFormat::Unknown, flags)
            .map_err(|e| XmpError::Io(format!("Failed to open file {}: {}", path.display(), e)))?;
        let document = engine.new_document();
        tracing::debug!(path = %path.display(), flags = ?flags.names(), "session opened");

        self.state = State::Open(OpenSession {
            file,
            document,
            packet: PacketInfo::default(),
            loaded: false,
            path: path.to_path_buf(),
            flags,
        });
        Ok(())
    }

    /// Read the file's metadata into the document
    ///
    /// Runs at most once per open. A file without XMP loads as an empty
    /// document. When loading fails the session is closed.
    pub fn load(&mut self) -> XmpResult<()> {
        let toolkit = self.toolkit.clone();
        let session = match &mut self.state {
            State::Open(session) => session,
            State::Closed => return Err(not_open()),
        };
        if session.loaded {
            return Ok(());
        }

        match toolkit.engine().get_xmp(&mut session.file) {
            Ok(Some((document, packet))) => {
                session.document = document;
                session.packet = packet;
            }
            Ok(None) => {
                tracing::debug!(path = %session.path.display(), "file has no XMP");
            }
            Err(e) => {
                let message = format!("{}: {}", session.path.display(), e);
                self.close();
                return Err(XmpError::MetadataLoad(message));
            }
        }
        session.loaded = true;
        tracing::debug!(path = %session.path.display(), "metadata loaded");
        Ok(())
    }

    fn loaded(&mut self) -> XmpResult<&mut OpenSession<E>> {
        self.load()?;
        match &mut self.state {
            State::Open(session) => Ok(session),
            State::Closed => Err(not_open()),
        }
    }

    /// Look up a property
    pub fn property(&mut self, namespace: &str, name: &str) -> XmpResult<PropertyLookup> {
        let toolkit = self.toolkit.clone();
        let session = self.loaded()?;
        let found = toolkit
            .engine()
            .get_property(&session.document, namespace, name)?;
        Ok(match found {
            Some((value, options)) => PropertyLookup {
                exists: true,
                value,
                options,
            },
            None => PropertyLookup::default(),
        })
    }

    /// Look up a localized text item
    ///
    /// `generic_lang` defaults to no generic language.
    pub fn localized_text(
        &mut self,
        namespace: &str,
        name: &str,
        generic_lang: Option<&str>,
        specific_lang: &str,
    ) -> XmpResult<LocalizedLookup> {
        let toolkit = self.toolkit.clone();
        let session = self.loaded()?;
        let found = toolkit.engine().get_localized_text(
            &session.document,
            namespace,
            name,
            generic_lang.unwrap_or(""),
            specific_lang,
        )?;
        Ok(match found {
            Some(text) => LocalizedLookup {
                exists: true,
                value: text.value,
                actual_lang: text.actual_lang,
                options: text.options,
            },
            None => LocalizedLookup::default(),
        })
    }

    /// Set a property, encoded according to the value's type
    pub fn set_property(
        &mut self,
        namespace: &str,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> XmpResult<()> {
        let toolkit = self.toolkit.clone();
        let engine = toolkit.engine();
        let doc = &mut self.loaded()?.document;
        match value.into() {
            PropertyValue::String(value) => engine.set_property(doc, namespace, name, &value),
            PropertyValue::Bool(value) => engine.set_property_bool(doc, namespace, name, value),
            PropertyValue::Int32(value) => engine.set_property_int32(doc, namespace, name, value),
            PropertyValue::Int64(value) => engine.set_property_int64(doc, namespace, name, value),
            PropertyValue::Float(value) => engine.set_property_float(doc, namespace, name, value),
            PropertyValue::DateTime(value) => {
                engine.set_property_date(doc, namespace, name, &value)
            }
        }
    }

    pub fn delete_property(&mut self, namespace: &str, name: &str) -> XmpResult<()> {
        let toolkit = self.toolkit.clone();
        let session = self.loaded()?;
        toolkit
            .engine()
            .delete_property(&mut session.document, namespace, name)
    }

    /// Set a localized text item
    pub fn set_localized_text(
        &mut self,
        namespace: &str,
        name: &str,
        generic_lang: Option<&str>,
        specific_lang: &str,
        value: &str,
        options: PropertyOptions,
    ) -> XmpResult<()> {
        let toolkit = self.toolkit.clone();
        let session = self.loaded()?;
        toolkit.engine().set_localized_text(
            &mut session.document,
            namespace,
            name,
            generic_lang.unwrap_or(""),
            specific_lang,
            value,
            options,
        )
    }

    /// Merge or replace the document with a serialized packet
    ///
    /// See [`merge::replace_or_merge`]. `None` or an empty buffer means no
    /// incoming metadata.
    pub fn replace_or_merge(&mut self, incoming: Option<&[u8]>, mode: WriteMode) -> XmpResult<()> {
        let toolkit = self.toolkit.clone();
        let session = self.loaded()?;
        merge::replace_or_merge(toolkit.engine(), &mut session.document, incoming, mode)
    }

    /// Hand the document to the engine for writing
    ///
    /// The data reaches the file when the session is closed. When the engine
    /// cannot write the document, the error carries the serialized document.
    pub fn commit(&mut self) -> XmpResult<()> {
        let toolkit = self.toolkit.clone();
        let engine = toolkit.engine();
        let session = self.loaded()?;

        if !engine.can_put_xmp(&session.file, &session.document)? {
            return Err(XmpError::MetadataWrite {
                message: format!("Can't update XMP new data in {}", session.path.display()),
                payload: engine.serialize(&session.document).ok(),
            });
        }
        engine
            .put_xmp(&mut session.file, &session.document)
            .map_err(|e| XmpError::MetadataWrite {
                message: format!("{}: {}", session.path.display(), e),
                payload: None,
            })?;
        tracing::debug!(path = %session.path.display(), "metadata committed");
        Ok(())
    }

    /// Packet location and framing, after loading
    pub fn packet_info(&mut self) -> XmpResult<PacketInfo> {
        Ok(self.loaded()?.packet.clone())
    }

    /// Format and handler information of the open file
    pub fn file_info(&self) -> XmpResult<FileInfo> {
        match &self.state {
            State::Open(session) => self.engine().file_info(&session.file),
            State::Closed => Err(not_open()),
        }
    }

    /// The current document as a packet
    pub fn serialize(&mut self) -> XmpResult<String> {
        let toolkit = self.toolkit.clone();
        let session = self.loaded()?;
        toolkit.engine().serialize(&session.document)
    }

    /// Close the session, flushing pending writes
    ///
    /// Errors are logged; use [`Session::try_close`] to handle them.
    pub fn close(&mut self) {
        if let Err(e) = self.try_close() {
            tracing::warn!("failed to close session: {}", e);
        }
    }

    /// Close the session, flushing pending writes
    ///
    /// Closing a closed session does nothing. The session is closed even
    /// when the flush fails.
    pub fn try_close(&mut self) -> XmpResult<()> {
        let State::Open(session) = std::mem::replace(&mut self.state, State::Closed) else {
            return Ok(());
        };
        let path = session.path;
        self.engine()
            .close_file(session.file)
            .map_err(|e| XmpError::Io(format!("Failed to close file {}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "session closed");
        Ok(())
    }
}

impl<E: MetadataEngine> Drop for Session<E> {
    fn drop(&mut self) {
        self.close();
    }
}

fn not_open() -> XmpError {
    XmpError::Usage("No file open".to_string())
}
