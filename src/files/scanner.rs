//! Packet scanning
//!
//! Locates a UTF-8 `<?xpacket?>` wrapped packet anywhere in a file without
//! understanding the file format. Updates happen in place, so the new
//! packet must fit in the bytes of the old one.

use crate::core::error::{XmpError, XmpResult};
use crate::files::flags::HandlerFlags;
use crate::files::format::FileFormat;
use crate::files::handler::FileHandler;
use crate::types::packet::{CharForm, PacketInfo};
use std::ops::Range;
use std::path::Path;

const HEADER: &[u8] = b"<?xpacket begin=";
const TRAILER: &[u8] = b"<?xpacket end=";

/// Position of a packet inside a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketLocation {
    /// Byte offset of the `<?xpacket begin` instruction
    pub offset: usize,
    /// Length up to and including the closing `?>` of the trailer
    pub length: usize,
    /// Trailing whitespace in front of the trailer
    pub pad_size: usize,
    /// Trailer says `end="w"`
    pub writeable: bool,
    /// Framed by `<?xpacket?>` instructions
    pub has_wrapper: bool,
    pub char_form: CharForm,
}

impl PacketLocation {
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }

    pub fn packet_info(&self) -> PacketInfo {
        PacketInfo {
            offset: self.offset as i64,
            length: self.length as i64,
            pad_size: self.pad_size as i64,
            char_form: self.char_form,
            writeable: self.writeable,
            has_wrapper: self.has_wrapper,
            pad_byte: b' ',
        }
    }
}

/// Handler that works on any file containing a writeable packet
#[derive(Debug, Clone, Copy, Default)]
pub struct PacketScanner;

impl FileHandler for PacketScanner {
    fn name(&self) -> &'static str {
        "packet scanner"
    }

    fn can_handle(&self, _path: &Path, data: &[u8]) -> bool {
        find_packet(data).is_some()
    }

    fn format(&self, path: &Path) -> FileFormat {
        FileFormat::from_extension(path)
    }

    fn handler_flags(&self) -> HandlerFlags {
        HandlerFlags::PREFERS_IN_PLACE
            | HandlerFlags::ALLOWS_ONLY_XMP
            | HandlerFlags::RETURNS_RAW_PACKET
            | HandlerFlags::ALLOWS_SAFE_UPDATE
    }

    fn locate(&self, data: &[u8]) -> Option<PacketLocation> {
        find_packet(data)
    }

    fn target_length(&self, location: Option<&PacketLocation>) -> Option<usize> {
        location.map(|location| location.length)
    }

    fn rewrite(
        &self,
        data: &[u8],
        location: Option<&PacketLocation>,
        packet: &[u8],
    ) -> XmpResult<Vec<u8>> {
        let location = location.ok_or_else(|| {
            XmpError::NotSupported("Packet scanning cannot inject a new packet".to_string())
        })?;
        if !location.writeable {
            return Err(XmpError::NotSupported("Packet is read-only".to_string()));
        }
        if packet.len() != location.length {
            return Err(XmpError::Internal(format!(
                "In-place packet must be {} bytes, got {}",
                location.length,
                packet.len()
            )));
        }
        let mut updated = data.to_vec();
        updated[location.range()].copy_from_slice(packet);
        Ok(updated)
    }
}

/// Find the first complete packet in `data`
pub fn find_packet(data: &[u8]) -> Option<PacketLocation> {
    let mut search_pos = 0;
    while let Some(pos) = find(&data[search_pos..], HEADER) {
        let start = search_pos + pos;
        match locate_trailer(data, start + HEADER.len()) {
            Some((trailer_start, end, writeable)) => {
                let pad_size = data[start..trailer_start]
                    .iter()
                    .rev()
                    .take_while(|b| b.is_ascii_whitespace())
                    .count();
                return Some(PacketLocation {
                    offset: start,
                    length: end - start,
                    pad_size,
                    writeable,
                    has_wrapper: true,
                    char_form: CharForm::detect(&data[start..end]),
                });
            }
            None => search_pos = start + 1,
        }
    }
    None
}

/// Returns trailer start, end of the trailer and the write access flag
fn locate_trailer(data: &[u8], from: usize) -> Option<(usize, usize, bool)> {
    let trailer_start = from + find(&data[from..], TRAILER)?;
    let access_pos = trailer_start + TRAILER.len();
    let rest = data.get(access_pos..)?;
    let close = find(rest, b"?>")?;
    let access = &rest[..close];
    let writeable = match access {
        b"\"w\"" | b"'w'" => true,
        b"\"r\"" | b"'r'" => false,
        _ => return None,
    };
    Some((trailer_start, access_pos + close + 2, writeable))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_find_packet_in_binary() {
        let mut data = vec![0xFF, 0xD8, 0x00, 0x10];
        let packet = b"<?xpacket begin=\"\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?><x/>    <?xpacket end=\"w\"?>";
        data.extend_from_slice(packet);
        data.extend_from_slice(&[0xFF, 0xD9]);

        let location = find_packet(&data).unwrap();
        assert_eq!(location.offset, 4);
        assert_eq!(location.length, packet.len());
        assert_eq!(location.pad_size, 4);
        assert!(location.writeable);
        assert_eq!(&data[location.range()], &packet[..]);
        assert_eq!(location.packet_info().offset, 4);
    }

    #[test]
    fn test_read_only_and_broken_packets() {
        let data = b"<?xpacket begin=''?><x/><?xpacket end='r'?>";
        let location = find_packet(data).unwrap();
        assert!(!location.writeable);

        assert_eq!(find_packet(b"<?xpacket begin=\"\"?><x/>"), None);
        assert_eq!(find_packet(b"<?xpacket begin=\"\"?><?xpacket end=\"q\"?>"), None);
        assert_eq!(find_packet(b"plain text"), None);
    }

    #[test]
    fn test_rewrite_in_place() {
        let data = b"AB<?xpacket begin=''?><x/>  <?xpacket end='w'?>CD".to_vec();
        let location = find_packet(&data).unwrap();
        let replacement = vec![b'#'; location.length];
        let updated = PacketScanner
            .rewrite(&data, Some(&location), &replacement)
            .unwrap();
        assert_eq!(updated.len(), data.len());
        assert!(updated.starts_with(b"AB#"));
        assert!(updated.ends_with(b"#CD"));

        assert!(PacketScanner.rewrite(&data, Some(&location), b"short").is_err());
        assert!(PacketScanner.rewrite(&data, None, b"").is_err());
    }
}
