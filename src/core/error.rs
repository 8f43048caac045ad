//! Error types for XMP operations
//!
//! This module defines all error types surfaced by the engine lifecycle,
//! sessions, the merge-write path and the bundled engine.

use std::path::PathBuf;
use thiserror::Error;

/// Error types for XMP operations
#[derive(Debug, Error)]
pub enum XmpError {
    /// The metadata engine could not be started
    #[error("Engine initialization failed: {0}")]
    EngineInit(String),

    /// Open or close of a file failed
    #[error("IO error: {0}")]
    Io(String),

    /// IO error raised by the standard library
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// File is missing or lacks the required permissions
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Neither the smart handler nor packet scanning could open the file
    #[error("File not recognized: {path}: {reason}")]
    NotRecognized {
        /// File that was rejected
        path: PathBuf,
        /// Failure reported by the last strategy tried
        reason: String,
    },

    /// Reading the metadata of an open file failed
    #[error("Failed to load XMP metadata: {0}")]
    MetadataLoad(String),

    /// Writing metadata back to a file failed
    ///
    /// When the engine refuses the write, `payload` holds the serialized
    /// document that would have been written.
    #[error("Failed to write XMP metadata: {message}")]
    MetadataWrite {
        /// What went wrong
        message: String,
        /// Serialized document, if one was produced
        payload: Option<String>,
    },

    /// API misuse, e.g. opening a session twice
    #[error("Usage error: {0}")]
    Usage(String),

    /// Bad argument provided to a function
    #[error("Bad argument: {0}")]
    Argument(String),

    /// Parse error (XML/RDF parsing failed)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Bad schema URI or namespace
    #[error("Bad schema: {0}")]
    BadSchema(String),

    /// Bad value provided (e.g., invalid property value)
    #[error("Bad value: {0}")]
    BadValue(String),

    /// Operation not supported
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl XmpError {
    /// Serialized document attached to a refused write, if any
    pub fn payload(&self) -> Option<&str> {
        match self {
            XmpError::MetadataWrite { payload, .. } => payload.as_deref(),
            _ => None,
        }
    }
}

/// Result type alias for XMP operations
pub type XmpResult<T> = Result<T, XmpError>;
