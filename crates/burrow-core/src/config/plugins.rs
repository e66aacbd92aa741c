//! Plugin catalog configuration.

use serde::{Deserialize, Serialize};

/// Plugin catalog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// Directory containing per-plugin `<name>.toml` configuration files.
    ///
    /// A plugin without a readable configuration file here is disabled.
    pub config_dir: String,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            config_dir: "config/plugins".to_string(),
        }
    }
}
