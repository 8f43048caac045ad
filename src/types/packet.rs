//! Packet location descriptor
//!
//! Describes where the embedded XMP packet lives inside its carrier file and
//! how it is framed. Populated by the engine when a session loads metadata.

#[cfg(feature = "serde")]
use serde::Serialize;

/// Character encoding of a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum CharForm {
    /// UTF-8
    #[default]
    Utf8,
    /// Encoding could not be determined
    Unknown,
    /// UTF-16, big endian
    Utf16Big,
    /// UTF-16, little endian
    Utf16Little,
    /// UTF-32, big endian
    Utf32Big,
    /// UTF-32, little endian
    Utf32Little,
}

impl CharForm {
    /// Numeric code used by the engine
    pub fn code(self) -> u8 {
        match self {
            CharForm::Utf8 => 0,
            CharForm::Unknown => 1,
            CharForm::Utf16Big => 2,
            CharForm::Utf16Little => 3,
            CharForm::Utf32Big => 4,
            CharForm::Utf32Little => 5,
        }
    }

    /// Map an engine code back to a char form
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => CharForm::Utf8,
            2 => CharForm::Utf16Big,
            3 => CharForm::Utf16Little,
            4 => CharForm::Utf32Big,
            5 => CharForm::Utf32Little,
            _ => CharForm::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CharForm::Utf8 => "8Bit",
            CharForm::Unknown => "unknown",
            CharForm::Utf16Big => "16BitBig",
            CharForm::Utf16Little => "16BitLittle",
            CharForm::Utf32Big => "32BitBig",
            CharForm::Utf32Little => "32BitLittle",
        }
    }

    /// Detect the encoding from the bytes that start a packet
    ///
    /// `<?xpacket` always begins with `<`, so the position of its zero bytes
    /// tells the unit width and byte order.
    pub fn detect(bytes: &[u8]) -> Self {
        match bytes {
            [b'<', 0, 0, 0, ..] => CharForm::Utf32Little,
            [0, 0, 0, b'<', ..] => CharForm::Utf32Big,
            [b'<', 0, ..] => CharForm::Utf16Little,
            [0, b'<', ..] => CharForm::Utf16Big,
            [b'<', ..] => CharForm::Utf8,
            _ => CharForm::Unknown,
        }
    }
}

/// Physical location and framing of an embedded packet
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PacketInfo {
    /// Byte offset of the packet in the file, `-1` if unknown
    pub offset: i64,
    /// Packet length in bytes including padding, `-1` if unknown
    pub length: i64,
    /// Bytes of padding between the content and the trailer
    pub pad_size: i64,
    pub char_form: CharForm,
    /// The trailer is `end="w"`
    pub writeable: bool,
    /// The packet is framed by `<?xpacket?>` processing instructions
    pub has_wrapper: bool,
    /// Byte used for padding
    pub pad_byte: u8,
}

impl Default for PacketInfo {
    fn default() -> Self {
        Self {
            offset: -1,
            length: -1,
            pad_size: 0,
            char_form: CharForm::Utf8,
            writeable: false,
            has_wrapper: false,
            pad_byte: b' ',
        }
    }
}

impl PacketInfo {
    /// Whether the engine located a packet at all
    pub fn is_located(&self) -> bool {
        self.offset >= 0 && self.length >= 0
    }
}
