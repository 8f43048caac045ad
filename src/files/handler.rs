//! File handler trait for XMP packets
//!
//! A handler knows how to find the packet in a file and how to produce the
//! updated file bytes once a new packet has been serialized.

use crate::core::error::XmpResult;
use crate::files::flags::{HandlerFlags, OpenFlags};
use crate::files::format::FileFormat;
use crate::files::scanner::{PacketLocation, PacketScanner};
use crate::files::sidecar::SidecarHandler;
use std::path::Path;

/// Trait implemented by the file handlers of the bundled engine
pub trait FileHandler {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Whether this handler accepts the file
    fn can_handle(&self, path: &Path, data: &[u8]) -> bool;

    /// Format reported for an accepted file
    fn format(&self, path: &Path) -> FileFormat;

    fn handler_flags(&self) -> HandlerFlags;

    /// Find the packet; `None` when the file carries no XMP
    fn locate(&self, data: &[u8]) -> Option<PacketLocation>;

    /// Exact packet length required on write, `None` when any size fits
    fn target_length(&self, location: Option<&PacketLocation>) -> Option<usize>;

    /// Produce the new file content with `packet` in place of the old one
    fn rewrite(
        &self,
        data: &[u8],
        location: Option<&PacketLocation>,
        packet: &[u8],
    ) -> XmpResult<Vec<u8>>;
}

/// Handler selected for an open file
#[derive(Debug, Clone, Copy)]
pub enum Handler {
    /// Smart handler for standalone XMP documents
    Sidecar(SidecarHandler),
    /// Format-agnostic packet scanning
    Scanner(PacketScanner),
}

impl Handler {
    /// Pick a handler the way the open flags ask for
    ///
    /// Without explicit flags the smart handler is tried first and packet
    /// scanning second.
    pub fn select(path: &Path, data: &[u8], format: FileFormat, flags: OpenFlags) -> Option<Self> {
        let scan_only = flags.contains(OpenFlags::OPEN_USE_PACKET_SCANNING);
        let smart_only = flags.contains(OpenFlags::OPEN_USE_SMART_HANDLER)
            || flags.contains(OpenFlags::OPEN_STRICTLY);

        if !scan_only {
            let sidecar = SidecarHandler;
            let forced =
                flags.contains(OpenFlags::FORCE_GIVEN_HANDLER) && format == FileFormat::Xml;
            if forced || sidecar.can_handle(path, data) {
                return Some(Handler::Sidecar(sidecar));
            }
            if smart_only {
                return None;
            }
        }

        let scanner = PacketScanner;
        scanner
            .can_handle(path, data)
            .then_some(Handler::Scanner(scanner))
    }

    fn inner(&self) -> &dyn FileHandler {
        match self {
            Handler::Sidecar(h) => h,
            Handler::Scanner(h) => h,
        }
    }
}

impl FileHandler for Handler {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn can_handle(&self, path: &Path, data: &[u8]) -> bool {
        self.inner().can_handle(path, data)
    }

    fn format(&self, path: &Path) -> FileFormat {
        self.inner().format(path)
    }

    fn handler_flags(&self) -> HandlerFlags {
        self.inner().handler_flags()
    }

    fn locate(&self, data: &[u8]) -> Option<PacketLocation> {
        self.inner().locate(data)
    }

    fn target_length(&self, location: Option<&PacketLocation>) -> Option<usize> {
        self.inner().target_length(location)
    }

    fn rewrite(
        &self,
        data: &[u8],
        location: Option<&PacketLocation>,
        packet: &[u8],
    ) -> XmpResult<Vec<u8>> {
        self.inner().rewrite(data, location, packet)
    }
}
