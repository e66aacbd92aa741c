//! Binds route descriptors onto the axum router.
//!
//! Every discovered descriptor's routes are bound unconditionally, active
//! plugin or not; activity is enforced per request by the dispatch wrapper.
//! A malformed descriptor loses that route only, never the process.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, RawPathParams, State};
use axum::http::Method;
use axum::routing::{MethodFilter, on};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, warn};

use burrow_plugin::{PluginRequest, RouteDescriptor};

use crate::dispatch::dispatch;
use crate::state::AppState;

/// Registers `routes` on `router`, wrapping each in the dispatch closure.
pub fn bind(mut router: Router<AppState>, routes: Vec<RouteDescriptor>) -> Router<AppState> {
    let mut bound: HashSet<(Method, String)> = HashSet::new();

    for descriptor in routes {
        if !valid_path(&descriptor.path) {
            warn!(
                plugin = %descriptor.plugin,
                path = %descriptor.path,
                "invalid route path, skipping"
            );
            continue;
        }
        let filter = match MethodFilter::try_from(descriptor.method.clone()) {
            Ok(filter) => filter,
            Err(_) => {
                warn!(
                    plugin = %descriptor.plugin,
                    method = %descriptor.method,
                    "unsupported route method, skipping"
                );
                continue;
            }
        };
        let key = (descriptor.method.clone(), descriptor.path.clone());
        if !bound.insert(key) {
            warn!(
                plugin = %descriptor.plugin,
                method = %descriptor.method,
                path = %descriptor.path,
                "route already bound, skipping duplicate"
            );
            continue;
        }

        debug!(
            plugin = %descriptor.plugin,
            method = %descriptor.method,
            path = %descriptor.path,
            "binding route"
        );
        let path = descriptor.path.clone();
        let descriptor = Arc::new(descriptor);
        let handler = move |State(state): State<AppState>,
                            jar: CookieJar,
                            raw_params: RawPathParams,
                            Query(query): Query<HashMap<String, String>>,
                            body: Bytes| {
            let descriptor = Arc::clone(&descriptor);
            async move {
                let params = raw_params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                let request = PluginRequest { params, query, body };
                dispatch(state, &descriptor, jar, request).await
            }
        };
        router = router.route(&path, on(filter, handler));
    }

    router
}

fn valid_path(path: &str) -> bool {
    !path.is_empty() && path.starts_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_validation() {
        assert!(valid_path("/maze"));
        assert!(valid_path("/"));
        assert!(!valid_path(""));
        assert!(!valid_path("maze"));
    }
}
