//! Toolkit configuration

use std::env;
use std::path::PathBuf;

/// Environment variable naming the engine plug-in directory
pub const PLUGINS_PATH_ENV: &str = "XMP_TOOLKIT_PLUGINS_PATH";

/// Settings applied when the engine is started
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolkitConfig {
    /// Plug-in directory used when the caller does not pass one
    pub plugin_path: Option<PathBuf>,
}

impl ToolkitConfig {
    /// Read the configuration from the environment
    ///
    /// An empty `XMP_TOOLKIT_PLUGINS_PATH` counts as unset.
    pub fn from_env() -> Self {
        Self::from_plugin_var(env::var_os(PLUGINS_PATH_ENV).map(PathBuf::from))
    }

    fn from_plugin_var(value: Option<PathBuf>) -> Self {
        Self {
            plugin_path: value.filter(|path| !path.as_os_str().is_empty()),
        }
    }

    pub fn with_plugin_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.plugin_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_plugin_path_is_ignored() {
        assert_eq!(ToolkitConfig::from_plugin_var(Some(PathBuf::new())).plugin_path, None);
        assert_eq!(
            ToolkitConfig::from_plugin_var(Some(PathBuf::from("/opt/plugins"))).plugin_path,
            Some(PathBuf::from("/opt/plugins"))
        );
        assert_eq!(ToolkitConfig::from_plugin_var(None), ToolkitConfig::default());
    }

    #[test]
    fn test_builder() {
        let config = ToolkitConfig::default().with_plugin_path("/plugins");
        assert_eq!(config.plugin_path, Some(PathBuf::from("/plugins")));
    }
}
