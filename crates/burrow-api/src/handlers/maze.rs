//! The core maze routes, expressed as free route descriptors and bound
//! through the same binder and dispatch wrapper as plugin routes.

use axum::http::Method;
use bytes::Bytes;
use serde_json::{Map, Value};
use tracing::debug;

use burrow_core::{AppError, AppResult};
use burrow_maze::{Maze, MazeSpec, RoomPos};
use burrow_plugin::{
    FreeContext, GameSession, MazeAccess, PluginResponse, RouteDescriptor, handler_fn, maze_value,
    room_value,
};

use crate::state::AppState;

const KNOWN_SPEC_KEYS: [&str; 4] = ["width", "height", "walls", "seed"];

/// The engine's own HTTP surface.
pub fn core_routes(state: AppState) -> Vec<RouteDescriptor> {
    vec![
        RouteDescriptor::free(
            "core",
            Method::GET,
            "/",
            MazeAccess::NotRequired,
            handler_fn(|_context| async { Ok(PluginResponse::raw("text/plain", Bytes::new())) }),
        ),
        RouteDescriptor::free(
            "core",
            Method::GET,
            "/maze",
            MazeAccess::Required,
            handler_fn(get_maze),
        ),
        RouteDescriptor::free("core", Method::POST, "/maze", MazeAccess::NotRequired, {
            let state = state.clone();
            handler_fn(move |context| create_maze(state.clone(), context))
        }),
        RouteDescriptor::free(
            "core",
            Method::PUT,
            "/maze",
            MazeAccess::NotRequired,
            handler_fn(update_maze),
        ),
        RouteDescriptor::free("core", Method::DELETE, "/maze", MazeAccess::NotRequired, {
            let state = state.clone();
            handler_fn(move |context| delete_maze(state.clone(), context))
        }),
        RouteDescriptor::free(
            "core",
            Method::GET,
            "/maze/{room_identifier}",
            MazeAccess::Required,
            handler_fn(get_room),
        ),
    ]
}

async fn get_maze(context: FreeContext) -> AppResult<PluginResponse> {
    let session = context.session.ok_or_else(AppError::no_maze)?;
    let session = session.read().await;
    Ok(PluginResponse::json(maze_value(&session).await?))
}

async fn create_maze(state: AppState, context: FreeContext) -> AppResult<PluginResponse> {
    let spec = parse_spec(&context.request.body, &state.config.maze)?;
    let session = GameSession::create(&state.registry, spec).await?;
    let session = state.sessions.insert(context.session_id, session);
    let session = session.read().await;
    Ok(PluginResponse::json(maze_value(&session).await?))
}

async fn update_maze(context: FreeContext) -> AppResult<PluginResponse> {
    let session = context
        .session
        .ok_or_else(|| AppError::validation("no maze to update"))?;
    let payload: Value = serde_json::from_slice(&context.request.body)
        .map_err(|_| AppError::validation("request body must be a JSON object"))?;
    let Some(object) = payload.as_object() else {
        return Err(AppError::validation("request body must be a JSON object"));
    };

    let mut session = session.write().await;
    if let Some(target) = object.get("current_room") {
        let identifier = target
            .as_u64()
            .and_then(|id| u32::try_from(id).ok())
            .ok_or_else(|| AppError::validation("current_room must be a room identifier"))?;
        apply_move(session.maze_mut(), identifier)?;
    }

    let Value::Object(mut result) = maze_value(&session).await? else {
        return Err(AppError::internal("maze value is not an object"));
    };
    session.run_update_maze(&payload, &mut result).await?;
    Ok(PluginResponse::json(Value::Object(result)))
}

async fn delete_maze(state: AppState, context: FreeContext) -> AppResult<PluginResponse> {
    state.sessions.remove(context.session_id);
    Ok(PluginResponse::NoContent)
}

async fn get_room(context: FreeContext) -> AppResult<PluginResponse> {
    let session = context.session.ok_or_else(AppError::no_maze)?;
    let identifier: u32 = context
        .request
        .params
        .get("room_identifier")
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| AppError::not_found("no such room"))?;

    let session = session.read().await;
    let maze = session.maze();
    let pos = reachable_position(maze, identifier)?;
    Ok(PluginResponse::json(room_value(&session, pos, true).await?))
}

/// Builds a [`MazeSpec`] from the optional request body, falling back to
/// configured defaults and a random nonzero seed. Unknown keys are ignored.
fn parse_spec(body: &[u8], defaults: &burrow_core::config::MazeConfig) -> AppResult<MazeSpec> {
    let payload: Value = if body.is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_slice(body)
            .map_err(|_| AppError::validation("request body must be a JSON object"))?
    };
    let Some(object) = payload.as_object() else {
        return Err(AppError::validation("request body must be a JSON object"));
    };

    for key in object.keys() {
        if !KNOWN_SPEC_KEYS.contains(&key.as_str()) {
            debug!(key = %key, "ignoring unknown maze parameter");
        }
    }

    let spec = MazeSpec {
        width: dimension(object, "width", defaults.default_width)?,
        height: dimension(object, "height", defaults.default_height)?,
        walls: dimension(object, "walls", defaults.default_walls)?,
        seed: match object.get("seed") {
            None => random_seed(),
            Some(value) => value
                .as_u64()
                .and_then(|seed| u32::try_from(seed).ok())
                .ok_or_else(|| AppError::validation("seed must be a 32-bit integer"))?,
        },
    };
    spec.validate()?;
    Ok(spec)
}

fn dimension(object: &Map<String, Value>, key: &str, default: usize) -> AppResult<usize> {
    match object.get(key) {
        None => Ok(default),
        Some(value) => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .filter(|&n| n > 0)
            .ok_or_else(|| AppError::validation(format!("{key} must be a positive integer"))),
    }
}

fn random_seed() -> u32 {
    loop {
        let seed: u32 = rand::random();
        if seed != 0 {
            return seed;
        }
    }
}

/// Position of `identifier`, provided the room is the current room or
/// directly connected to it.
fn reachable_position(maze: &Maze, identifier: u32) -> AppResult<RoomPos> {
    let pos = maze
        .position_of(identifier)
        .ok_or_else(|| AppError::not_found(format!("no room {identifier}")))?;
    if identifier == maze.current_room() {
        return Ok(pos);
    }
    let current = maze
        .position_of(maze.current_room())
        .ok_or_else(|| AppError::internal("current room has no position"))?;
    if !maze.connected(current, pos) {
        return Err(AppError::forbidden(format!(
            "room {identifier} is not reachable from the current room"
        )));
    }
    Ok(pos)
}

fn apply_move(maze: &mut Maze, identifier: u32) -> AppResult<()> {
    reachable_position(maze, identifier)?;
    maze.set_current_room(identifier)
}
