//! Router assembly: core routes plus every discovered plugin route, all
//! bound through the same dispatch wrapper.

use axum::Router;
use axum::middleware::from_fn;
use tower_http::trace::TraceLayer;

use burrow_plugin::RouteDescriptor;

use crate::binder::bind;
use crate::handlers::core_routes;
use crate::middleware::request_logging;
use crate::state::AppState;

/// Builds the complete application router.
///
/// `plugin_routes` are the declared routes of every discovered plugin,
/// active or not; per-request activity checks happen in dispatch.
pub fn build_router(state: AppState, plugin_routes: Vec<RouteDescriptor>) -> Router {
    let mut routes = core_routes(state.clone());
    routes.extend(plugin_routes);

    bind(Router::new(), routes)
        .layer(from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
