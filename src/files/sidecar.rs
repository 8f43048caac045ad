//! Smart handler for standalone XMP documents
//!
//! Accepts `.xmp` sidecars and any file whose content is itself an XMP
//! document. The whole file is the packet, so updates rewrite the file.

use crate::core::error::XmpResult;
use crate::files::flags::HandlerFlags;
use crate::files::format::FileFormat;
use crate::files::handler::FileHandler;
use crate::files::scanner::{find_packet, PacketLocation};
use crate::types::packet::CharForm;
use std::path::Path;

/// Bytes inspected when sniffing the content of a file
const SNIFF_LIMIT: usize = 4096;

const XMP_ROOTS: &[&str] = &["<x:xmpmeta", "<x:xapmeta", "<rdf:RDF"];

/// Handler for XMP sidecar files
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarHandler;

impl SidecarHandler {
    fn has_xmp_extension(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xmp"))
    }

    fn looks_like_xmp(data: &[u8]) -> bool {
        let head = &data[..data.len().min(SNIFF_LIMIT)];
        let text = String::from_utf8_lossy(head);
        let text = text.trim_start_matches('\u{FEFF}').trim_start();
        if text.starts_with("<?xpacket") {
            return true;
        }
        if text.starts_with("<?xml") || text.starts_with("<!--") {
            return XMP_ROOTS.iter().any(|root| text.contains(root));
        }
        XMP_ROOTS.iter().any(|root| text.starts_with(root))
    }
}

impl FileHandler for SidecarHandler {
    fn name(&self) -> &'static str {
        "xmp sidecar"
    }

    fn can_handle(&self, path: &Path, data: &[u8]) -> bool {
        Self::has_xmp_extension(path) || Self::looks_like_xmp(data)
    }

    fn format(&self, _path: &Path) -> FileFormat {
        FileFormat::Xml
    }

    fn handler_flags(&self) -> HandlerFlags {
        HandlerFlags::CAN_INJECT_XMP
            | HandlerFlags::CAN_EXPAND
            | HandlerFlags::CAN_REWRITE
            | HandlerFlags::ALLOWS_ONLY_XMP
            | HandlerFlags::RETURNS_RAW_PACKET
            | HandlerFlags::ALLOWS_SAFE_UPDATE
    }

    fn locate(&self, data: &[u8]) -> Option<PacketLocation> {
        if data.iter().all(|b| b.is_ascii_whitespace()) {
            return None;
        }
        if let Some(location) = find_packet(data) {
            return Some(location);
        }
        Some(PacketLocation {
            offset: 0,
            length: data.len(),
            pad_size: 0,
            writeable: true,
            has_wrapper: false,
            char_form: CharForm::detect(data),
        })
    }

    fn target_length(&self, _location: Option<&PacketLocation>) -> Option<usize> {
        None
    }

    fn rewrite(
        &self,
        _data: &[u8],
        _location: Option<&PacketLocation>,
        packet: &[u8],
    ) -> XmpResult<Vec<u8>> {
        Ok(packet.to_vec())
    }
}
