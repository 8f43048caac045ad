//! File format codes
//!
//! Formats are identified by four-character codes packed into a `u32`,
//! the way the XMP file layer reports them.

use crate::files::flags::{HandlerFlags, OpenFlags};
#[cfg(feature = "serde")]
use serde::{Serialize, Serializer};
use std::path::Path;

macro_rules! file_formats {
    ($($variant:ident = $code:literal, $name:literal, [$($ext:literal),*];)*) => {
        /// Carrier file format
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum FileFormat {
            $($variant,)*
        }

        impl FileFormat {
            const ALL: &'static [FileFormat] = &[$(FileFormat::$variant,)*];

            /// Four-character code
            pub fn code(self) -> u32 {
                match self {
                    $(FileFormat::$variant => $code,)*
                }
            }

            /// Constant name of the format
            pub fn name(self) -> &'static str {
                match self {
                    $(FileFormat::$variant => $name,)*
                }
            }

            fn extensions(self) -> &'static [&'static str] {
                match self {
                    $(FileFormat::$variant => &[$($ext),*],)*
                }
            }
        }
    };
}

file_formats! {
    Pdf = 0x5044_4620, "kXMP_PDFFile", ["pdf"];
    PostScript = 0x5053_2020, "kXMP_PostScriptFile", ["ps"];
    Eps = 0x4550_5320, "kXMP_EPSFile", ["eps"];
    Jpeg = 0x4A50_4547, "kXMP_JPEGFile", ["jpg", "jpeg", "jpe"];
    Jpeg2K = 0x4A50_5820, "kXMP_JPEG2KFile", ["jp2", "jpx"];
    Tiff = 0x5449_4646, "kXMP_TIFFFile", ["tif", "tiff", "dng"];
    Gif = 0x4749_4620, "kXMP_GIFFile", ["gif"];
    Png = 0x504E_4720, "kXMP_PNGFile", ["png"];
    Swf = 0x5357_4620, "kXMP_SWFFile", ["swf"];
    Flv = 0x464C_5620, "kXMP_FLVFile", ["flv"];
    Mov = 0x4D4F_5620, "kXMP_MOVFile", ["mov"];
    Avi = 0x4156_4920, "kXMP_AVIFile", ["avi"];
    Wav = 0x5741_5620, "kXMP_WAVFile", ["wav"];
    Mp3 = 0x4D50_3320, "kXMP_MP3File", ["mp3"];
    Mpeg = 0x4D50_4547, "kXMP_MPEGFile", ["mpg", "mpeg"];
    Mpeg4 = 0x4D50_3420, "kXMP_MPEG4File", ["mp4", "m4a", "m4v"];
    Aiff = 0x4149_4646, "kXMP_AIFFFile", ["aif", "aiff"];
    Heif = 0x4845_4946, "kXMP_HEIFFile", ["heif", "heic", "avif"];
    Html = 0x4854_4D4C, "kXMP_HTMLFile", ["htm", "html"];
    Xml = 0x584D_4C20, "kXMP_XMLFile", ["xml", "xmp"];
    Text = 0x7465_7874, "kXMP_TextFile", ["txt"];
    Svg = 0x5356_4720, "kXMP_SVGFile", ["svg"];
    Photoshop = 0x5053_4420, "kXMP_PhotoshopFile", ["psd"];
    Illustrator = 0x4149_2020, "kXMP_IllustratorFile", ["ai"];
    InDesign = 0x494E_4444, "kXMP_InDesignFile", ["indd"];
    Ucf = 0x5543_4620, "kXMP_UCFFile", ["ucf"];
    Unknown = 0x2020_2020, "kXMP_UnknownFile", [];
}

impl FileFormat {
    /// Look up a format by its four-character code
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|format| format.code() == code)
    }

    /// Guess the format from a file extension, case-insensitively
    pub fn from_extension(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return FileFormat::Unknown;
        };
        let ext = ext.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|format| format.extensions().contains(&ext.as_str()))
            .unwrap_or(FileFormat::Unknown)
    }
}

#[cfg(feature = "serde")]
impl Serialize for FileFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Information about an open file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    pub format: FileFormat,
    /// Flags the file was opened with
    pub open_flags: OpenFlags,
    /// Capabilities of the handler in charge of the file
    pub handler_flags: HandlerFlags,
}

#[cfg(feature = "serde")]
impl Serialize for FileInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("FileInfo", 3)?;
        state.serialize_field("format", &self.format)?;
        state.serialize_field("open_flags", &self.open_flags.names())?;
        state.serialize_field("handler_flags", &self.handler_flags.names())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_spell_names() {
        assert_eq!(&FileFormat::Pdf.code().to_be_bytes(), b"PDF ");
        assert_eq!(&FileFormat::Jpeg.code().to_be_bytes(), b"JPEG");
        assert_eq!(&FileFormat::Text.code().to_be_bytes(), b"text");
        assert_eq!(FileFormat::from_code(0x584D_4C20), Some(FileFormat::Xml));
        assert_eq!(FileFormat::from_code(1), None);
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(FileFormat::from_extension(Path::new("a/b.JPG")), FileFormat::Jpeg);
        assert_eq!(FileFormat::from_extension(Path::new("photo.xmp")), FileFormat::Xml);
        assert_eq!(FileFormat::from_extension(Path::new("noext")), FileFormat::Unknown);
        assert_eq!(FileFormat::Unknown.name(), "kXMP_UnknownFile");
    }
}
