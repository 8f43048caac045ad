//! Engine fault reporting
//!
//! The engine reports problems through a callback that answers whether the
//! current operation may continue. Only recoverable faults continue.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Fault cause codes used by the bundled engine
pub mod cause {
    pub const BAD_PARAM: i32 = 4;
    pub const BAD_VALUE: i32 = 5;
    pub const INTERNAL_FAILURE: i32 = 9;
    pub const BAD_SCHEMA: i32 = 101;
    pub const BAD_SERIALIZE: i32 = 107;
    pub const BAD_FILE_FORMAT: i32 = 108;
    pub const NO_FILE_HANDLER: i32 = 109;
    pub const NO_FILE: i32 = 111;
    pub const WRITE_ERROR: i32 = 115;
    pub const BAD_XML: i32 = 201;
    pub const BAD_RDF: i32 = 202;
    pub const BAD_XMP: i32 = 203;
}

/// Severity of an engine fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// The engine can skip the offending input and carry on
    Recoverable,
    /// The current operation cannot complete
    OperationFatal,
    /// The file being processed is unusable
    FileFatal,
    /// The engine itself is unusable
    ProcessFatal,
}

/// What the engine should do after reporting a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultDecision {
    Continue,
    Abort,
}

impl ErrorSeverity {
    /// Decision table: continue only for recoverable faults
    pub fn decision(self) -> FaultDecision {
        match self {
            ErrorSeverity::Recoverable => FaultDecision::Continue,
            ErrorSeverity::OperationFatal
            | ErrorSeverity::FileFatal
            | ErrorSeverity::ProcessFatal => FaultDecision::Abort,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ErrorSeverity::Recoverable => "RECOVERABLE",
            ErrorSeverity::OperationFatal => "FATAL OPERATION",
            ErrorSeverity::FileFatal => "FATAL FILE",
            ErrorSeverity::ProcessFatal => "FATAL PROCESS",
        }
    }
}

/// A fault reported by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFault {
    pub severity: ErrorSeverity,
    /// Engine-specific cause code, see [`cause`]
    pub cause: i32,
    pub message: String,
    /// File being processed, for file-level faults
    pub file_path: Option<PathBuf>,
}

impl EngineFault {
    pub fn new(severity: ErrorSeverity, cause: i32, message: impl Into<String>) -> Self {
        Self {
            severity,
            cause,
            message: message.into(),
            file_path: None,
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }
}

impl fmt::Display for EngineFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] cause=0x{:x}", self.severity.name(), self.cause)?;
        if let Some(path) = &self.file_path {
            write!(f, " file=\"{}\"", path.display())?;
        }
        write!(f, " msg=\"{}\"", self.message)
    }
}

/// Callback installed into the engine; returns `true` to continue
pub type ErrorCallback = Arc<dyn Fn(&EngineFault) -> bool + Send + Sync>;

/// Callback that logs every fault and applies the severity decision table
pub fn default_error_callback() -> ErrorCallback {
    Arc::new(|fault: &EngineFault| {
        match fault.severity {
            ErrorSeverity::Recoverable => tracing::warn!(
                cause = fault.cause,
                file = ?fault.file_path,
                "recoverable engine fault: {}",
                fault.message
            ),
            severity => tracing::error!(
                severity = severity.name(),
                cause = fault.cause,
                file = ?fault.file_path,
                "engine fault: {}",
                fault.message
            ),
        }
        fault.severity.decision() == FaultDecision::Continue
    })
}
