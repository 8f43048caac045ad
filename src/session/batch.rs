//! Batch operations
//!
//! One-call helpers that validate a file, open it with the smart handler,
//! fall back to packet scanning, do their work and always close the file.

use crate::core::error::{XmpError, XmpResult};
use crate::engine::MetadataEngine;
use crate::files::flags::OpenFlags;
use crate::session::merge::WriteMode;
use crate::session::report::PacketReport;
use crate::session::Session;
use crate::toolkit::Toolkit;
use std::fs::{self, OpenOptions};
use std::path::Path;

const UPDATE_SMART: OpenFlags = OpenFlags::from_bits(
    OpenFlags::OPEN_FOR_UPDATE.bits() | OpenFlags::OPEN_USE_SMART_HANDLER.bits(),
);
const UPDATE_SCAN: OpenFlags = OpenFlags::from_bits(
    OpenFlags::OPEN_FOR_UPDATE.bits() | OpenFlags::OPEN_USE_PACKET_SCANNING.bits(),
);
const READ_SCAN: OpenFlags = OpenFlags::from_bits(
    OpenFlags::OPEN_FOR_READ.bits() | OpenFlags::OPEN_USE_PACKET_SCANNING.bits(),
);

/// How [`Toolkit::with_xmp_file`] opens its file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileScope {
    pub open_flags: OpenFlags,
    /// Flags for a second attempt when the first open fails
    pub fallback_flags: Option<OpenFlags>,
    /// Terminate the engine once the file is closed
    pub auto_terminate: bool,
}

impl Default for FileScope {
    fn default() -> Self {
        Self::for_read()
    }
}

impl FileScope {
    /// Read-only, smart handler then packet scanning
    pub fn for_read() -> Self {
        Self {
            open_flags: OpenFlags::DEFAULT_READ,
            fallback_flags: Some(READ_SCAN),
            auto_terminate: false,
        }
    }

    /// Update, smart handler then packet scanning
    pub fn for_update() -> Self {
        Self {
            open_flags: UPDATE_SMART,
            fallback_flags: Some(UPDATE_SCAN),
            auto_terminate: false,
        }
    }

    pub fn auto_terminate(mut self, auto_terminate: bool) -> Self {
        self.auto_terminate = auto_terminate;
        self
    }
}

/// Check that `path` is an existing regular file we may read, and write
/// when `writable` is set
pub fn check_file(path: &Path, writable: bool) -> XmpResult<()> {
    let metadata = fs::metadata(path)
        .map_err(|_| XmpError::FileNotFound(format!("{} does not exist", path.display())))?;
    if !metadata.is_file() {
        return Err(XmpError::FileNotFound(format!(
            "{} is not a regular file",
            path.display()
        )));
    }
    fs::File::open(path)
        .map_err(|_| XmpError::FileNotFound(format!("{} is not readable", path.display())))?;
    if writable {
        OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|_| XmpError::FileNotFound(format!("{} is not writable", path.display())))?;
    }
    Ok(())
}

fn merge_and_commit<E: MetadataEngine>(
    session: &mut Session<E>,
    incoming: Option<&[u8]>,
    mode: WriteMode,
) -> XmpResult<()> {
    session.load()?;
    session.replace_or_merge(incoming, mode)?;
    session.commit()
}

/// Close after `result`: flush errors surface only when the work succeeded
fn finish<E: MetadataEngine, T>(session: &mut Session<E>, result: XmpResult<T>) -> XmpResult<T> {
    match result {
        Ok(value) => session.try_close().map(|()| value),
        Err(e) => {
            session.close();
            Err(e)
        }
    }
}

impl<E: MetadataEngine> Toolkit<E> {
    /// Open `path`, retrying once with `fallback` flags
    ///
    /// Without a fallback the open error is returned as is; when the retry
    /// fails too the file is reported as not recognized.
    fn open_with_fallback(
        &self,
        session: &mut Session<E>,
        path: &Path,
        flags: OpenFlags,
        fallback: Option<OpenFlags>,
    ) -> XmpResult<()> {
        let first = match session.open_with(path, flags) {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        let Some(fallback) = fallback else {
            return Err(first);
        };
        tracing::debug!(
            path = %path.display(),
            error = %first,
            "retrying open with packet scanning"
        );
        session
            .open_with(path, fallback)
            .map_err(|e| XmpError::NotRecognized {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Merge or replace the XMP of a file with a serialized packet
    ///
    /// The file must exist and be readable and writable. It is opened for
    /// update with the smart handler, or with packet scanning when no smart
    /// handler accepts it.
    pub fn write_xmp_to_file(
        &self,
        path: impl AsRef<Path>,
        incoming: Option<&[u8]>,
        mode: WriteMode,
    ) -> XmpResult<()> {
        let path = path.as_ref();
        check_file(path, true)?;
        self.initialize(None)?;

        let mut session = self.session();
        self.open_with_fallback(&mut session, path, UPDATE_SMART, Some(UPDATE_SCAN))?;
        let result = merge_and_commit(&mut session, incoming, mode);
        finish(&mut session, result)?;
        tracing::debug!(path = %path.display(), mode = %mode, "xmp written");
        Ok(())
    }

    /// The XMP of a file, serialized as a packet
    pub fn read_xmp_from_file(&self, path: impl AsRef<Path>) -> XmpResult<String> {
        let path = path.as_ref();
        check_file(path, false)?;
        self.initialize(None)?;

        let mut session = self.session();
        self.open_with_fallback(&mut session, path, OpenFlags::DEFAULT_READ, Some(READ_SCAN))?;
        let result = session.serialize();
        finish(&mut session, result)
    }

    /// Packet report of a file
    pub fn read_packet_report(&self, path: impl AsRef<Path>) -> XmpResult<PacketReport> {
        let path = path.as_ref();
        check_file(path, false)?;
        self.initialize(None)?;

        let mut session = self.session();
        self.open_with_fallback(&mut session, path, OpenFlags::DEFAULT_READ, Some(READ_SCAN))?;
        let result = session
            .serialize()
            .and_then(|raw| Ok(PacketReport::new(raw, &session.file_info()?)));
        finish(&mut session, result)
    }

    /// Register a namespace, returning the prefix bound to `uri`
    ///
    /// A URI that is already registered keeps its prefix. A suggested prefix
    /// that is taken by another URI is made unique by the engine.
    pub fn register_namespace(&self, uri: &str, suggested_prefix: &str) -> XmpResult<String> {
        self.initialize(None)?;
        let engine = self.engine();
        if let Some(existing) = engine.namespace_prefix(uri) {
            tracing::info!(uri, prefix = %existing, "namespace already registered");
            return Ok(existing);
        }
        let (accepted, prefix) = engine.register_namespace(uri, suggested_prefix)?;
        if !accepted {
            tracing::debug!(uri, suggested_prefix, prefix = %prefix, "namespace prefix adjusted");
        }
        Ok(prefix)
    }

    /// Run `f` on an open session for `path`
    ///
    /// The file is committed when it was opened for update, `f` succeeded
    /// and left the session open. It is always closed afterwards.
    pub fn with_xmp_file<T, F>(
        &self,
        path: impl AsRef<Path>,
        scope: FileScope,
        f: F,
    ) -> XmpResult<T>
    where
        F: FnOnce(&mut Session<E>) -> XmpResult<T>,
    {
        let path = path.as_ref();
        check_file(path, scope.open_flags.is_update())?;
        self.initialize(None)?;

        let mut session = self.session();
        let result = self
            .open_with_fallback(&mut session, path, scope.open_flags, scope.fallback_flags)
            .and_then(|()| {
                let value = f(&mut session)?;
                if session.open_flags().is_some_and(OpenFlags::is_update) {
                    session.commit()?;
                }
                Ok(value)
            });
        let result = finish(&mut session, result);

        if scope.auto_terminate {
            self.terminate();
        }
        result
    }
}

#[cfg(feature = "basic")]
mod global {
    use super::*;
    use crate::engine::basic::BasicEngine;

    fn toolkit() -> &'static Toolkit<BasicEngine> {
        Toolkit::global()
    }

    /// [`Toolkit::write_xmp_to_file`] on the process-wide toolkit
    pub fn write_xmp_to_file(
        path: impl AsRef<Path>,
        incoming: Option<&[u8]>,
        mode: WriteMode,
    ) -> XmpResult<()> {
        toolkit().write_xmp_to_file(path, incoming, mode)
    }

    /// [`Toolkit::read_xmp_from_file`] on the process-wide toolkit
    pub fn read_xmp_from_file(path: impl AsRef<Path>) -> XmpResult<String> {
        toolkit().read_xmp_from_file(path)
    }

    /// [`Toolkit::read_packet_report`] on the process-wide toolkit
    pub fn read_packet_report(path: impl AsRef<Path>) -> XmpResult<PacketReport> {
        toolkit().read_packet_report(path)
    }

    /// [`Toolkit::register_namespace`] on the process-wide toolkit
    pub fn register_namespace(uri: &str, suggested_prefix: &str) -> XmpResult<String> {
        toolkit().register_namespace(uri, suggested_prefix)
    }

    /// [`Toolkit::with_xmp_file`] on the process-wide toolkit
    pub fn with_xmp_file<T, F>(path: impl AsRef<Path>, scope: FileScope, f: F) -> XmpResult<T>
    where
        F: FnOnce(&mut Session<BasicEngine>) -> XmpResult<T>,
    {
        toolkit().with_xmp_file(path, scope, f)
    }

    /// Start the process-wide engine
    pub fn initialize(plugin_path: Option<&Path>) -> XmpResult<()> {
        toolkit().initialize(plugin_path)
    }

    /// Stop the process-wide engine
    pub fn terminate() {
        toolkit().terminate();
    }

    pub fn is_initialized() -> bool {
        toolkit().is_initialized()
    }
}

#[cfg(feature = "basic")]
pub use global::{
    initialize, is_initialized, read_packet_report, read_xmp_from_file, register_namespace,
    terminate, with_xmp_file, write_xmp_to_file,
};
