//! Route descriptors and the request/response types plugin handlers see.
//!
//! A plugin declares routes on its descriptor; the HTTP layer binds every
//! declared route at startup regardless of which sessions later activate the
//! plugin. Each descriptor is tagged with the dispatch shape it needs, so
//! the binder never has to inspect handler internals.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use burrow_core::AppResult;

use crate::session::GameSession;

/// Whether a route needs the requesting session to hold a maze.
///
/// Declared on the route descriptor so the dispatch wrapper can refuse the
/// request up front instead of inspecting handler internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MazeAccess {
    /// The handler runs with or without a session maze.
    NotRequired,
    /// Requests from sessions without a maze are answered with no-maze.
    Required,
}

/// The dispatch shape of a declared route.
#[derive(Clone)]
pub enum RouteKind {
    /// A plain handler with no session affinity.
    Free(FreeHandler),
    /// A handler with session context but no plugin instance. Used for the
    /// engine's own routes and for plugin routes that only need the session.
    Class(ClassHandler),
    /// A handler served by the requesting session's live instance of the
    /// declaring plugin. Requests from sessions where the plugin is not
    /// active are rejected with not-found.
    Instance {
        /// Identifier passed to [`MazePlugin::handle_route`].
        ///
        /// [`MazePlugin::handle_route`]: crate::hooks::MazePlugin::handle_route
        route_id: String,
    },
}

impl fmt::Debug for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteKind::Free(_) => f.write_str("Free"),
            RouteKind::Class(_) => f.write_str("Class"),
            RouteKind::Instance { route_id } => {
                f.debug_struct("Instance").field("route_id", route_id).finish()
            }
        }
    }
}

pub type FreeHandler =
    Arc<dyn Fn(FreeContext) -> Pin<Box<dyn Future<Output = AppResult<PluginResponse>> + Send>> + Send + Sync>;

pub type ClassHandler = Arc<
    dyn Fn(FreeContext) -> Pin<Box<dyn Future<Output = AppResult<PluginResponse>> + Send>>
        + Send
        + Sync,
>;

/// Wraps an async closure into the boxed shape handlers are stored in.
pub fn handler_fn<F, Fut>(f: F) -> FreeHandler
where
    F: Fn(FreeContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<PluginResponse>> + Send + 'static,
{
    Arc::new(move |context| Box::pin(f(context)))
}

/// Context handed to free and class handlers.
pub struct FreeContext {
    /// The requesting session's identifier.
    pub session_id: Uuid,
    /// The session itself, when one exists. Free routes may run before any
    /// session was created.
    pub session: Option<Arc<RwLock<GameSession>>>,
    /// The decoded request.
    pub request: PluginRequest,
}

/// A single route declared by a plugin descriptor.
#[derive(Clone)]
pub struct RouteDescriptor {
    /// Name of the declaring plugin.
    pub plugin: String,
    /// HTTP method the route answers.
    pub method: Method,
    /// Path relative to the server root, axum syntax for captures.
    pub path: String,
    /// Maze access the handler needs.
    pub access: MazeAccess,
    /// Dispatch shape.
    pub kind: RouteKind,
}

impl fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("plugin", &self.plugin)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("access", &self.access)
            .field("kind", &self.kind)
            .finish()
    }
}

impl RouteDescriptor {
    pub fn instance(
        plugin: impl Into<String>,
        method: Method,
        path: impl Into<String>,
        access: MazeAccess,
        route_id: impl Into<String>,
    ) -> Self {
        Self {
            plugin: plugin.into(),
            method,
            path: path.into(),
            access,
            kind: RouteKind::Instance { route_id: route_id.into() },
        }
    }

    pub fn free(
        plugin: impl Into<String>,
        method: Method,
        path: impl Into<String>,
        access: MazeAccess,
        handler: FreeHandler,
    ) -> Self {
        Self {
            plugin: plugin.into(),
            method,
            path: path.into(),
            access,
            kind: RouteKind::Free(handler),
        }
    }

    pub fn class(
        plugin: impl Into<String>,
        method: Method,
        path: impl Into<String>,
        handler: ClassHandler,
    ) -> Self {
        Self {
            plugin: plugin.into(),
            method,
            path: path.into(),
            access: MazeAccess::NotRequired,
            kind: RouteKind::Class(handler),
        }
    }
}

/// The decoded request a plugin handler receives.
#[derive(Debug, Clone, Default)]
pub struct PluginRequest {
    /// Captured path parameters, in declaration order.
    pub params: HashMap<String, String>,
    /// Query string parameters.
    pub query: HashMap<String, String>,
    /// Raw request body.
    pub body: Bytes,
}

impl PluginRequest {
    /// Decodes the body as JSON.
    pub fn json(&self) -> AppResult<Value> {
        serde_json::from_slice(&self.body)
            .map_err(|e| burrow_core::AppError::validation(format!("invalid JSON body: {e}")))
    }
}

/// What a plugin handler produces; the HTTP layer turns this into a response.
#[derive(Debug, Clone)]
pub enum PluginResponse {
    /// A JSON document, served as `application/json`.
    Json(Value),
    /// Raw bytes with an explicit content type. Used for static assets.
    Raw { content_type: String, body: Bytes },
    /// 204 with no body.
    NoContent,
}

impl PluginResponse {
    pub fn json(value: Value) -> Self {
        PluginResponse::Json(value)
    }

    pub fn raw(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        PluginResponse::Raw { content_type: content_type.into(), body: body.into() }
    }
}
