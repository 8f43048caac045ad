//! Open file handle of the bundled engine
//!
//! The file content is read once at open time. A packet handed to
//! [`BasicFile::stage`] is not written to disk immediately: the file keeps
//! the new bytes and writes them when it is closed.

use crate::core::error::{XmpError, XmpResult};
use crate::files::flags::{HandlerFlags, OpenFlags};
use crate::files::format::{FileFormat, FileInfo};
use crate::files::handler::{FileHandler, Handler};
use crate::files::scanner::PacketLocation;
use crate::types::packet::PacketInfo;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// An open file
///
/// # Example
///
/// ```rust,no_run
/// use xmpbridge::files::{BasicFile, FileFormat};
/// use xmpbridge::OpenFlags;
///
/// let file = BasicFile::open("photo.xmp", FileFormat::Unknown, OpenFlags::DEFAULT_READ)?;
/// if let Some(packet) = file.packet_bytes() {
///     println!("{} bytes of XMP", packet.len());
/// }
/// file.close()?;
/// # Ok::<(), xmpbridge::XmpError>(())
/// ```
#[derive(Debug)]
pub struct BasicFile {
    path: PathBuf,
    flags: OpenFlags,
    handler: Handler,
    format: FileFormat,
    data: Vec<u8>,
    location: Option<PacketLocation>,
    staged: Option<Vec<u8>>,
}

impl BasicFile {
    /// Open `path` with the handler selected by `flags`
    pub fn open(path: impl AsRef<Path>, format: FileFormat, flags: OpenFlags) -> XmpResult<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let handler = Handler::select(path, &data, format, flags).ok_or_else(|| {
            if flags.contains(OpenFlags::OPEN_USE_PACKET_SCANNING) {
                XmpError::NotSupported("No XMP packet found by packet scanning".to_string())
            } else {
                XmpError::NotSupported("No smart file handler available to handle file".to_string())
            }
        })?;
        let location = handler.locate(&data);
        tracing::debug!(
            path = %path.display(),
            handler = handler.name(),
            packet = location.is_some(),
            "opened file"
        );
        Ok(Self {
            path: path.to_path_buf(),
            flags,
            format: handler.format(path),
            handler,
            data,
            location,
            staged: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn open_flags(&self) -> OpenFlags {
        self.flags
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub fn handler_flags(&self) -> HandlerFlags {
        self.handler.handler_flags()
    }

    pub fn info(&self) -> FileInfo {
        FileInfo {
            format: self.format,
            open_flags: self.flags,
            handler_flags: self.handler_flags(),
        }
    }

    /// Raw bytes of the packet, `None` when the file has no XMP
    pub fn packet_bytes(&self) -> Option<&[u8]> {
        self.location
            .as_ref()
            .map(|location| &self.data[location.range()])
    }

    /// Where the packet sits, default info when the file has no XMP
    pub fn packet_info(&self) -> PacketInfo {
        self.location
            .as_ref()
            .map(PacketLocation::packet_info)
            .unwrap_or_default()
    }

    /// Exact packet length a rewrite must produce, `None` when any size fits
    pub fn target_length(&self) -> Option<usize> {
        self.handler.target_length(self.location.as_ref())
    }

    /// Whether the existing packet may be rewritten at all
    pub fn is_writeable(&self) -> bool {
        self.flags.is_update()
            && match (&self.handler, &self.location) {
                (Handler::Scanner(_), Some(location)) => location.writeable,
                (Handler::Scanner(_), None) => false,
                (Handler::Sidecar(_), _) => true,
            }
    }

    /// Replace the packet; the change reaches the disk on close
    pub fn stage(&mut self, packet: &[u8]) -> XmpResult<()> {
        if !self.flags.is_update() {
            return Err(XmpError::Usage(format!(
                "File not opened for update: {}",
                self.path.display()
            )));
        }
        let updated = self
            .handler
            .rewrite(&self.data, self.location.as_ref(), packet)?;
        self.staged = Some(updated);
        Ok(())
    }

    pub fn has_staged_changes(&self) -> bool {
        self.staged.is_some()
    }

    /// Close the file, writing staged changes
    pub fn close(self) -> XmpResult<()> {
        let Some(updated) = self.staged else {
            return Ok(());
        };
        let file = fs::File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&updated)?;
        writer.flush()?;
        tracing::debug!(path = %self.path.display(), bytes = updated.len(), "wrote file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PACKET: &str = "<?xpacket begin=\"\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?><x:xmpmeta xmlns:x=\"adobe:ns:meta/\"/>          <?xpacket end=\"w\"?>";

    fn binary_with_packet() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.write_all(b"\xFF\xD8\xFF\xE1").unwrap();
        file.write_all(PACKET.as_bytes()).unwrap();
        file.write_all(b"\xFF\xD9").unwrap();
        file
    }

    #[test]
    fn test_open_scanned_file() {
        let tmp = binary_with_packet();
        let flags = OpenFlags::default().for_read().use_packet_scanning();
        let file = BasicFile::open(tmp.path(), FileFormat::Unknown, flags).unwrap();
        assert_eq!(file.packet_bytes().unwrap(), PACKET.as_bytes());
        assert_eq!(file.packet_info().offset, 4);
        assert_eq!(file.info().format, FileFormat::Jpeg);
        assert!(!file.is_writeable());
        file.close().unwrap();
    }

    #[test]
    fn test_smart_handler_rejects_binary() {
        let tmp = binary_with_packet();
        let err =
            BasicFile::open(tmp.path(), FileFormat::Unknown, OpenFlags::DEFAULT_READ).unwrap_err();
        assert!(matches!(err, XmpError::NotSupported(_)));
    }

    #[test]
    fn test_staged_write_lands_on_close() {
        let tmp = binary_with_packet();
        let original = fs::read(tmp.path()).unwrap();
        let flags = OpenFlags::default().for_update().use_packet_scanning();
        let mut file = BasicFile::open(tmp.path(), FileFormat::Unknown, flags).unwrap();
        assert_eq!(file.target_length(), Some(PACKET.len()));

        let replacement = PACKET.replace("          ", "<!--new-->");
        file.stage(replacement.as_bytes()).unwrap();
        assert!(file.has_staged_changes());
        assert_eq!(fs::read(tmp.path()).unwrap(), original);

        file.close().unwrap();
        let written = fs::read(tmp.path()).unwrap();
        assert_eq!(written.len(), original.len());
        assert!(String::from_utf8_lossy(&written).contains("<!--new-->"));
    }

    #[test]
    fn test_stage_requires_update() {
        let tmp = binary_with_packet();
        let flags = OpenFlags::default().use_packet_scanning();
        let mut file = BasicFile::open(tmp.path(), FileFormat::Unknown, flags).unwrap();
        assert!(matches!(file.stage(b"x"), Err(XmpError::Usage(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = BasicFile::open(
            "/nonexistent/a.xmp",
            FileFormat::Unknown,
            OpenFlags::DEFAULT_READ,
        )
        .unwrap_err();
        assert!(matches!(err, XmpError::IoError(_)));
    }
}
