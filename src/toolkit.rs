//! Toolkit handle
//!
//! A [`Toolkit`] is a cheap, clonable handle on one engine lifecycle. It
//! starts the engine on demand and hands out sessions. The batch operations
//! live in [`crate::session::batch`].

use crate::config::ToolkitConfig;
use crate::core::error::XmpResult;
use crate::engine::fault::ErrorCallback;
use crate::engine::lifecycle::{EngineLifecycle, ShutdownGuard};
use crate::engine::MetadataEngine;
use crate::session::Session;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared handle on an engine and its lifecycle
///
/// # Example
///
/// ```rust,no_run
/// use xmpbridge::{BasicEngine, Toolkit, WriteMode};
///
/// let toolkit = Toolkit::new(BasicEngine::new());
/// let incoming = std::fs::read("update.xmp")?;
/// toolkit.write_xmp_to_file("photo.xmp", Some(incoming.as_slice()), WriteMode::Upsert)?;
/// println!("{}", toolkit.read_xmp_from_file("photo.xmp")?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Toolkit<E: MetadataEngine> {
    lifecycle: Arc<EngineLifecycle<E>>,
}

impl<E: MetadataEngine> Clone for Toolkit<E> {
    fn clone(&self) -> Self {
        Self {
            lifecycle: Arc::clone(&self.lifecycle),
        }
    }
}

impl<E: MetadataEngine> Toolkit<E> {
    /// Wrap `engine`, configured from the environment
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, ToolkitConfig::from_env())
    }

    pub fn with_config(engine: E, config: ToolkitConfig) -> Self {
        Self {
            lifecycle: Arc::new(EngineLifecycle::new(engine, config)),
        }
    }

    pub fn engine(&self) -> &E {
        self.lifecycle.engine()
    }

    pub fn lifecycle(&self) -> &Arc<EngineLifecycle<E>> {
        &self.lifecycle
    }

    /// Start the engine if needed
    pub fn initialize(&self, plugin_path: Option<&Path>) -> XmpResult<()> {
        self.lifecycle.ensure_initialized(plugin_path)
    }

    pub fn terminate(&self) {
        self.lifecycle.terminate();
    }

    pub fn is_initialized(&self) -> bool {
        self.lifecycle.is_initialized()
    }

    pub fn plugin_path(&self) -> Option<PathBuf> {
        self.lifecycle.plugin_path()
    }

    pub fn set_error_callback(&self, callback: ErrorCallback) {
        self.lifecycle.set_error_callback(callback);
    }

    /// A closed session on this toolkit's engine
    pub fn session(&self) -> Session<E> {
        Session::new(self)
    }

    /// Guard that terminates the engine when dropped
    pub fn shutdown_guard(&self) -> ShutdownGuard<E> {
        ShutdownGuard::new(Arc::clone(&self.lifecycle))
    }
}

#[cfg(feature = "basic")]
mod global {
    use super::Toolkit;
    use crate::engine::basic::BasicEngine;
    use std::sync::OnceLock;

    static GLOBAL: OnceLock<Toolkit<BasicEngine>> = OnceLock::new();

    impl Toolkit<BasicEngine> {
        /// Process-wide toolkit on the bundled engine
        pub fn global() -> &'static Toolkit<BasicEngine> {
            GLOBAL.get_or_init(|| Toolkit::new(BasicEngine::new()))
        }
    }
}
