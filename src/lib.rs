//! # xmpbridge
//!
//! Session, lifecycle and merge-write layer for XMP metadata embedded in
//! files.
//!
//! The crate sits between application code and an XMP engine:
//!
//! - [`EngineLifecycle`] starts the engine once and stops it on shutdown.
//! - [`Session`] binds one file to the engine and loads its metadata lazily.
//! - [`session::merge`] replaces or upserts a file's metadata with a
//!   serialized packet.
//! - [`Toolkit`] bundles it all into one-call batch operations.
//!
//! The engine is any type implementing [`MetadataEngine`]. With the `basic`
//! feature (on by default) the crate ships [`BasicEngine`], a pure Rust
//! engine for flat XMP in sidecar files and scannable packets.
//!
//! ## Example
//!
//! ```rust,no_run
//! use xmpbridge::{ns, WriteMode};
//!
//! let packet = std::fs::read("incoming.xmp")?;
//! xmpbridge::write_xmp_to_file("photo.jpg", Some(packet.as_slice()), WriteMode::Upsert)?;
//!
//! let prefix = xmpbridge::register_namespace("http://example.com/ns/", "ex")?;
//! println!("bound to {}", prefix);
//! println!("{}", xmpbridge::read_xmp_from_file("photo.jpg")?);
//! # let _ = ns::XMP;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[macro_use]
pub mod types;

pub mod config;
pub mod core;
pub mod engine;
pub mod files;
pub mod session;
pub mod toolkit;
pub mod utils;

pub use config::ToolkitConfig;
pub use core::error::{XmpError, XmpResult};
pub use core::namespace::ns;
pub use engine::{
    EngineFault, EngineLifecycle, ErrorCallback, ErrorSeverity, FaultDecision, LocalizedText,
    MetadataEngine, ShutdownGuard,
};
pub use files::{FileFormat, FileInfo, HandlerFlags, OpenFlags};
pub use session::{
    check_file, FileScope, LocalizedLookup, PacketReport, PropertyLookup, Session, WriteMode,
};
pub use toolkit::Toolkit;
pub use types::{CharForm, PacketInfo, PropertyOptions, PropertyValue, TemplateFlags};
pub use utils::{TimeZone, XmpDateTime};

#[cfg(feature = "basic")]
pub use engine::BasicEngine;
#[cfg(feature = "basic")]
pub use session::batch::{
    initialize, is_initialized, read_packet_report, read_xmp_from_file, register_namespace,
    terminate, with_xmp_file, write_xmp_to_file,
};

/// Session on the bundled engine
#[cfg(feature = "basic")]
pub type XmpSession = Session<BasicEngine>;
