//! # burrow-plugin
//!
//! The plugin engine at the heart of Burrow. Provides:
//!
//! - Plugin descriptors and the catalog loader that evaluates per-plugin
//!   configuration (`enabled` flags, free-form settings)
//! - The four-phase dependency/conflict fixpoint resolver producing the
//!   process-wide [`ActiveRegistry`]
//! - Per-session plugin instantiation ([`SessionPluginSet`]) and the ordered
//!   hook-invocation protocol driven through [`GameSession`]
//! - Tagged route descriptors that let plugin instance methods serve HTTP
//!   requests resolved against the current session's instance
//! - Wire serialization of mazes and rooms, with hook participation

pub mod catalog;
pub mod descriptor;
pub mod hooks;
pub mod resolver;
pub mod routes;
pub mod session;
pub mod wire;

pub use catalog::{BuiltinPlugin, PluginCatalog, PluginSettings};
pub use descriptor::{PluginDescriptor, PluginDescriptorBuilder};
pub use hooks::{HookPoint, MazePlugin};
pub use resolver::{ActiveRegistry, resolve};
pub use routes::{
    FreeContext, MazeAccess, PluginRequest, PluginResponse, RouteDescriptor, RouteKind,
    handler_fn,
};
pub use session::{GameSession, SessionPluginSet};
pub use wire::{maze_value, room_value};
