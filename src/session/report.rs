//! Packet report
//!
//! Summary of a file's XMP packet: the wrapper attributes, the packet with
//! and without its `<?xpacket?>` instructions, and what the file layer knows
//! about the file.

use crate::files::flags::HandlerFlags;
use crate::files::format::{FileFormat, FileInfo};
#[cfg(feature = "serde")]
use serde::{Serialize, Serializer};

/// XMP packet of a file, as returned by [`crate::Toolkit::read_packet_report`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketReport {
    /// `begin` attribute of the packet header, usually a byte order mark
    pub begin: String,
    /// `id` attribute of the packet header
    pub packet_id: String,
    /// Packet without the `<?xpacket?>` instructions
    pub xmp_data: String,
    /// Packet including its wrapper
    pub raw: String,
    pub format: FileFormat,
    pub handler_flags: HandlerFlags,
}

impl PacketReport {
    /// Build a report from a serialized packet and the file it came from
    pub fn new(raw: String, info: &FileInfo) -> Self {
        let header = processing_instructions(&raw)
            .into_iter()
            .find(|pi| pi.contains("begin="));
        let (begin, packet_id) = match header {
            Some(pi) => (
                attribute(pi, "begin").unwrap_or_default(),
                attribute(pi, "id").unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        };
        Self {
            begin,
            packet_id,
            xmp_data: strip_wrapper(&raw),
            raw,
            format: info.format,
            handler_flags: info.handler_flags,
        }
    }
}

/// Every `<?xpacket ...?>` instruction in `text`
fn processing_instructions(text: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("<?xpacket") {
        let Some(len) = rest[start..].find("?>") else {
            break;
        };
        found.push(&rest[start..start + len + 2]);
        rest = &rest[start + len + 2..];
    }
    found
}

fn strip_wrapper(raw: &str) -> String {
    let mut stripped = raw.to_string();
    for pi in processing_instructions(raw) {
        stripped = stripped.replacen(pi, "", 1);
    }
    stripped.trim().to_string()
}

/// Value of `name="..."` or `name='...'` inside a processing instruction
fn attribute(pi: &str, name: &str) -> Option<String> {
    let key = format!("{}=", name);
    let start = pi.find(&key)? + key.len();
    let rest = &pi[start..];
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    let end = value.find(quote)?;
    Some(value[..end].to_string())
}

#[cfg(feature = "serde")]
impl Serialize for PacketReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("PacketReport", 6)?;
        state.serialize_field("begin", &self.begin)?;
        state.serialize_field("packet_id", &self.packet_id)?;
        state.serialize_field("xmp_data", &self.xmp_data)?;
        state.serialize_field("raw", &self.raw)?;
        state.serialize_field("format", &self.format)?;
        state.serialize_field("handler_flags", &self.handler_flags.names())?;
        state.end()
    }
}
