//! The dispatch wrapper: the single interception point every bound route
//! passes through.
//!
//! Per request it resolves the session from the cookie (minting one when
//! absent), then routes by descriptor kind. The same URL can therefore be
//! served, refused, or effectively absent depending on which plugins were
//! active when the requesting session's maze was created.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::debug;
use uuid::Uuid;

use burrow_core::AppError;
use burrow_plugin::{
    FreeContext, MazeAccess, PluginRequest, PluginResponse, RouteDescriptor, RouteKind,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Session id from the cookie, or a freshly minted one. The returned jar
/// always carries the cookie so every response refreshes it.
fn session_cookie(state: &AppState, jar: CookieJar) -> (Uuid, CookieJar) {
    let name = state.config.session.cookie_name.clone();
    let existing = jar
        .get(&name)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());
    let id = existing.unwrap_or_else(Uuid::new_v4);

    let mut cookie = Cookie::new(name, id.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    (id, jar.add(cookie))
}

/// Runs one bound route against the requesting session.
pub async fn dispatch(
    state: AppState,
    descriptor: &RouteDescriptor,
    jar: CookieJar,
    request: PluginRequest,
) -> Result<(CookieJar, Response), ApiError> {
    let (session_id, jar) = session_cookie(&state, jar);
    let session = state.sessions.get(session_id);

    let response = match &descriptor.kind {
        RouteKind::Free(handler) => {
            if descriptor.access == MazeAccess::Required && session.is_none() {
                return Err(AppError::no_maze().into());
            }
            let context = FreeContext { session_id, session, request };
            handler(context).await?
        }
        RouteKind::Class(handler) => {
            let context = FreeContext { session_id, session, request };
            handler(context).await?
        }
        RouteKind::Instance { route_id } => {
            let Some(session) = session else {
                debug!(plugin = %descriptor.plugin, "instance route without a session");
                return Err(AppError::not_found("no active session").into());
            };
            let session = session.read().await;
            let Some(instance) = session.plugin(&descriptor.plugin) else {
                debug!(
                    plugin = %descriptor.plugin,
                    "plugin not active for this session"
                );
                return Err(AppError::not_found(format!(
                    "plugin '{}' is not active",
                    descriptor.plugin
                ))
                .into());
            };
            instance.handle_route(route_id, session.maze(), request).await?
        }
    };

    Ok((jar, render(response)))
}

/// Turns a plugin-level response into an HTTP response.
fn render(response: PluginResponse) -> Response {
    match response {
        PluginResponse::Json(value) => axum::Json(value).into_response(),
        PluginResponse::Raw { content_type, body } => {
            ([(header::CONTENT_TYPE, content_type)], body).into_response()
        }
        PluginResponse::NoContent => StatusCode::NO_CONTENT.into_response(),
    }
}
