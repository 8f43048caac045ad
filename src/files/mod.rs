//! File layer
//!
//! Open flags, handler flags and format codes are shared with every engine.
//! The handlers, packet scanner and file handle belong to the bundled engine.

pub mod flags;
pub mod format;

#[cfg(feature = "basic")]
pub mod file;
#[cfg(feature = "basic")]
pub mod handler;
#[cfg(feature = "basic")]
pub mod scanner;
#[cfg(feature = "basic")]
pub mod sidecar;

#[cfg(feature = "basic")]
pub use file::BasicFile;
pub use flags::{HandlerFlags, OpenFlags};
pub use format::{FileFormat, FileInfo};
#[cfg(feature = "basic")]
pub use handler::{FileHandler, Handler};
#[cfg(feature = "basic")]
pub use scanner::{find_packet, PacketLocation, PacketScanner};
#[cfg(feature = "basic")]
pub use sidecar::SidecarHandler;
