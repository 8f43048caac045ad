//! Engine lifecycle
//!
//! The engine is started once per [`EngineLifecycle`] and shared by every
//! session created from it. Initialization is serialized by a mutex, so
//! concurrent first callers start the engine exactly once; the plug-in path
//! of the first successful caller wins.

use crate::config::ToolkitConfig;
use crate::core::error::{XmpError, XmpResult};
use crate::engine::fault::{default_error_callback, ErrorCallback};
use crate::engine::MetadataEngine;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct EngineState {
    initialized: bool,
    plugin_path: Option<PathBuf>,
    callback: ErrorCallback,
}

/// Owns an engine and tracks whether it is started
pub struct EngineLifecycle<E: MetadataEngine> {
    engine: E,
    config: ToolkitConfig,
    state: Mutex<EngineState>,
}

impl<E: MetadataEngine> EngineLifecycle<E> {
    pub fn new(engine: E, config: ToolkitConfig) -> Self {
        Self {
            engine,
            config,
            state: Mutex::new(EngineState {
                initialized: false,
                plugin_path: None,
                callback: default_error_callback(),
            }),
        }
    }

    /// The engine; callers must have initialized it first
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &ToolkitConfig {
        &self.config
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start the engine unless it is already running
    ///
    /// `plugin_path` overrides the configured plug-in directory. It is only
    /// used by the call that actually starts the engine.
    pub fn ensure_initialized(&self, plugin_path: Option<&Path>) -> XmpResult<()> {
        let mut state = self.state();
        if state.initialized {
            return Ok(());
        }

        let plugin_path = plugin_path
            .map(Path::to_path_buf)
            .or_else(|| self.config.plugin_path.clone());

        self.engine
            .initialize_document_model()
            .map_err(|e| XmpError::EngineInit(format!("document model: {}", e)))?;

        if let Err(e) = self.engine.initialize_file_io(plugin_path.as_deref()) {
            self.engine.terminate_document_model();
            return Err(XmpError::EngineInit(format!("file I/O: {}", e)));
        }

        self.engine.set_error_callback(Arc::clone(&state.callback));
        state.initialized = true;
        state.plugin_path = plugin_path;
        tracing::info!(plugin_path = ?state.plugin_path, "metadata engine initialized");
        Ok(())
    }

    /// Stop the engine; does nothing when it is not running
    pub fn terminate(&self) {
        let mut state = self.state();
        if !state.initialized {
            return;
        }
        self.engine.terminate_file_io();
        self.engine.terminate_document_model();
        state.initialized = false;
        state.plugin_path = None;
        tracing::info!("metadata engine terminated");
    }

    pub fn is_initialized(&self) -> bool {
        self.state().initialized
    }

    /// Plug-in path the running engine was started with
    pub fn plugin_path(&self) -> Option<PathBuf> {
        self.state().plugin_path.clone()
    }

    /// Replace the fault callback, now and for later restarts
    pub fn set_error_callback(&self, callback: ErrorCallback) {
        let mut state = self.state();
        if state.initialized {
            self.engine.set_error_callback(Arc::clone(&callback));
        }
        state.callback = callback;
    }
}

impl<E: MetadataEngine> Drop for EngineLifecycle<E> {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Terminates the engine when dropped
///
/// Useful for lifecycles that are never dropped themselves, such as the
/// process-wide toolkit.
#[must_use = "the engine is terminated when the guard is dropped"]
pub struct ShutdownGuard<E: MetadataEngine> {
    lifecycle: Arc<EngineLifecycle<E>>,
}

impl<E: MetadataEngine> ShutdownGuard<E> {
    pub fn new(lifecycle: Arc<EngineLifecycle<E>>) -> Self {
        Self { lifecycle }
    }
}

impl<E: MetadataEngine> Drop for ShutdownGuard<E> {
    fn drop(&mut self) {
        self.lifecycle.terminate();
    }
}
