//! The hook protocol: extension points a plugin may implement.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use burrow_core::AppResult;
use burrow_maze::{Maze, RoomPos};

use crate::routes::{PluginRequest, PluginResponse};

/// Enumeration of the extension points in the maze lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPoint {
    /// Fired after the empty maze exists, before topology is carved.
    PreInitialize,
    /// Fired after topology, identifiers, and the default current room exist.
    PostInitialize,
    /// Fired while serializing the whole-maze wire representation.
    GetMaze,
    /// Fired after a client move has been applied and re-serialized.
    UpdateMaze,
    /// Fired for every room wire representation produced.
    GetRoom,
}

/// A live plugin instance, created once per session from its descriptor.
///
/// All hook defaults are no-ops; a plugin implements only the extension
/// points it declared. Hook errors are not caught by the engine — they
/// propagate to the HTTP error layer and fail the whole request.
///
/// Instances may be stateful; state is per-session because the instance is.
/// Hooks run sequentially on the request task, so interior mutability with a
/// plain mutex is enough.
#[async_trait]
pub trait MazePlugin: Send + Sync {
    /// The plugin name, matching its descriptor.
    fn name(&self) -> &str;

    /// Called before the maze topology is carved. May pre-seed state the
    /// carving step will respect, such as doors opened ahead of time.
    async fn pre_initialize(&self, _maze: &mut Maze) -> AppResult<()> {
        Ok(())
    }

    /// Called after carving, identifier assignment, and the default current
    /// room. May override derived state, e.g. relocate the current room.
    async fn post_initialize(&self, _maze: &mut Maze) -> AppResult<()> {
        Ok(())
    }

    /// Called while the whole-maze wire value is generated. Keys written to
    /// `result` appear verbatim in the response; on collision the last
    /// writer in session order wins.
    async fn get_maze(&self, _maze: &Maze, _result: &mut Map<String, Value>) -> AppResult<()> {
        Ok(())
    }

    /// Called after a client-requested move has been validated and applied
    /// and the post-move representation built. `value` is the raw client
    /// payload.
    async fn update_maze(
        &self,
        _maze: &Maze,
        _value: &Value,
        _result: &mut Map<String, Value>,
    ) -> AppResult<()> {
        Ok(())
    }

    /// Called for every room wire value produced — the requested room and,
    /// when deep detail was asked for, each directly reachable neighbour.
    /// `neighbor_details` is informational only; it never suppresses the
    /// call.
    async fn get_room(
        &self,
        _maze: &Maze,
        _pos: RoomPos,
        _neighbor_details: bool,
        _result: &mut Map<String, Value>,
    ) -> AppResult<()> {
        Ok(())
    }

    /// Serves an instance route declared by this plugin's descriptor.
    ///
    /// `route_id` is the identifier stamped on the route descriptor; the
    /// dispatch wrapper resolves this instance from the requesting session
    /// before calling.
    async fn handle_route(
        &self,
        route_id: &str,
        _maze: &Maze,
        _request: PluginRequest,
    ) -> AppResult<PluginResponse> {
        Err(burrow_core::AppError::not_found(format!(
            "plugin '{}' has no route '{route_id}'",
            self.name()
        )))
    }
}
