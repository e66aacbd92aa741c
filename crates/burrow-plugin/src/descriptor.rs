//! Plugin descriptors: the static, process-wide identity of a plugin.
//!
//! A descriptor carries everything the resolver and the route binder need
//! without a live instance: name, version, dependency and conflict edges,
//! declared hooks, declared routes, evaluated settings, and a factory that
//! produces fresh per-session instances.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use burrow_core::{AppError, AppResult};

use crate::hooks::{HookPoint, MazePlugin};
use crate::routes::RouteDescriptor;

/// Evaluated per-plugin settings, sourced from the plugin's configuration
/// file. Free-form; plugins pull out what they understand.
#[derive(Debug, Clone, Default)]
pub struct PluginSettings(Map<String, Value>);

impl PluginSettings {
    pub fn new(values: Map<String, Value>) -> Self {
        Self(values)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.0.get(key).and_then(Value::as_str).unwrap_or(default)
    }

    pub fn u64_or(&self, key: &str, default: u64) -> u64 {
        self.0.get(key).and_then(Value::as_u64).unwrap_or(default)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Creates a fresh per-session instance from a descriptor.
pub type PluginFactory = Arc<dyn Fn(&PluginDescriptor) -> AppResult<Arc<dyn MazePlugin>> + Send + Sync>;

/// Static identity of a plugin, shared by every session.
#[derive(Clone)]
pub struct PluginDescriptor {
    pub name: String,
    pub version: String,
    /// Names of plugins that must be active for this one to stay active.
    pub dependencies: BTreeSet<String>,
    /// Names of plugins this one cannot coexist with.
    pub conflicts: BTreeSet<String>,
    /// Hook points the per-session instance participates in.
    pub hooks: BTreeSet<HookPoint>,
    /// Routes to bind at startup on this plugin's behalf.
    pub routes: Vec<RouteDescriptor>,
    /// Settings evaluated from the plugin's configuration file.
    pub settings: PluginSettings,
    /// Whether configuration marked the plugin enabled.
    pub enabled: bool,
    factory: PluginFactory,
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("dependencies", &self.dependencies)
            .field("conflicts", &self.conflicts)
            .field("hooks", &self.hooks)
            .field("routes", &self.routes)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl PluginDescriptor {
    pub fn builder(name: impl Into<String>, version: impl Into<String>) -> PluginDescriptorBuilder {
        PluginDescriptorBuilder {
            name: name.into(),
            version: version.into(),
            dependencies: BTreeSet::new(),
            conflicts: BTreeSet::new(),
            hooks: BTreeSet::new(),
            routes: Vec::new(),
            settings: PluginSettings::default(),
            enabled: true,
            factory: None,
        }
    }

    /// Creates a fresh instance for a new session.
    pub fn instantiate(&self) -> AppResult<Arc<dyn MazePlugin>> {
        (self.factory)(self)
    }

    pub fn declares_hook(&self, hook: HookPoint) -> bool {
        self.hooks.contains(&hook)
    }
}

pub struct PluginDescriptorBuilder {
    name: String,
    version: String,
    dependencies: BTreeSet<String>,
    conflicts: BTreeSet<String>,
    hooks: BTreeSet<HookPoint>,
    routes: Vec<RouteDescriptor>,
    settings: PluginSettings,
    enabled: bool,
    factory: Option<PluginFactory>,
}

impl PluginDescriptorBuilder {
    pub fn dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.insert(name.into());
        self
    }

    pub fn conflict(mut self, name: impl Into<String>) -> Self {
        self.conflicts.insert(name.into());
        self
    }

    pub fn hook(mut self, hook: HookPoint) -> Self {
        self.hooks.insert(hook);
        self
    }

    pub fn route(mut self, route: RouteDescriptor) -> Self {
        self.routes.push(route);
        self
    }

    pub fn settings(mut self, settings: PluginSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn factory(mut self, factory: PluginFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn build(self) -> AppResult<PluginDescriptor> {
        let factory = self
            .factory
            .ok_or_else(|| AppError::plugin(format!("plugin '{}' declares no factory", self.name)))?;
        Ok(PluginDescriptor {
            name: self.name,
            version: self.version,
            dependencies: self.dependencies,
            conflicts: self.conflicts,
            hooks: self.hooks,
            routes: self.routes,
            settings: self.settings,
            enabled: self.enabled,
            factory,
        })
    }
}
