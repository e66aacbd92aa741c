//! Plugin discovery and per-plugin configuration evaluation.
//!
//! Plugins are compiled in; the catalog pairs each builtin with its
//! configuration file under `plugins.config_dir` and produces the candidate
//! descriptors handed to the resolver. Routes are collected from every
//! discovered descriptor, active or not, because binding is unconditional.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use burrow_core::AppResult;
use burrow_core::config::PluginsConfig;

pub use crate::descriptor::PluginSettings;
use crate::descriptor::PluginDescriptor;
use crate::routes::RouteDescriptor;

/// A compiled-in plugin registration.
///
/// Each plugin crate exports one of these; `main` collects them into the
/// catalog. `build` receives the evaluated settings and enabled flag and
/// returns the full descriptor.
pub struct BuiltinPlugin {
    pub name: &'static str,
    pub build: fn(PluginSettings, bool) -> AppResult<PluginDescriptor>,
}

/// The discovered plugin candidates, configuration already evaluated.
#[derive(Debug, Clone, Default)]
pub struct PluginCatalog {
    descriptors: Vec<Arc<PluginDescriptor>>,
}

impl PluginCatalog {
    /// Evaluates configuration for every builtin and builds its descriptor.
    ///
    /// A missing or unreadable configuration file leaves the plugin
    /// disabled; the descriptor is still built so its routes get bound. A
    /// builtin whose `build` fails is dropped from the catalog entirely.
    pub fn discover(config: &PluginsConfig, builtins: &[BuiltinPlugin]) -> Self {
        let dir = Path::new(&config.config_dir);
        let mut descriptors = Vec::with_capacity(builtins.len());
        for builtin in builtins {
            let (settings, enabled) = evaluate_config(dir, builtin.name);
            match (builtin.build)(settings, enabled) {
                Ok(descriptor) => {
                    debug!(
                        plugin = %descriptor.name,
                        enabled = descriptor.enabled,
                        "discovered plugin"
                    );
                    descriptors.push(Arc::new(descriptor));
                }
                Err(error) => {
                    warn!(plugin = %builtin.name, %error, "plugin descriptor failed to build");
                }
            }
        }
        Self { descriptors }
    }

    pub fn descriptors(&self) -> &[Arc<PluginDescriptor>] {
        &self.descriptors
    }

    /// Every declared route from every discovered plugin.
    pub fn routes(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.descriptors.iter().flat_map(|d| d.routes.iter())
    }
}

/// Reads `<dir>/<name>.toml` and extracts `[plugin] enabled` plus the
/// free-form `[settings]` table. No file, unreadable file, or invalid TOML
/// all mean disabled with empty settings.
fn evaluate_config(dir: &Path, name: &str) -> (PluginSettings, bool) {
    let path = dir.join(format!("{name}.toml"));
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(error) => {
            debug!(plugin = %name, path = %path.display(), %error, "no plugin config, disabling");
            return (PluginSettings::default(), false);
        }
    };
    let parsed: toml::Value = match toml::from_str(&text) {
        Ok(value) => value,
        Err(error) => {
            warn!(plugin = %name, path = %path.display(), %error, "invalid plugin config, disabling");
            return (PluginSettings::default(), false);
        }
    };

    let enabled = parsed
        .get("plugin")
        .and_then(|p| p.get("enabled"))
        .and_then(toml::Value::as_bool)
        .unwrap_or(true);

    let settings = parsed
        .get("settings")
        .and_then(|s| serde_json::to_value(s).ok())
        .and_then(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_else(Map::new);

    (PluginSettings::new(settings), enabled)
}
