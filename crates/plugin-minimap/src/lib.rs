//! # plugin-minimap
//!
//! Renders a character map of the maze into the `minimap` key of the maze
//! value and serves it under `GET /minimap`. Depends on `trail`: when the
//! shared result already carries a `trail` key, the rendering prefers it.
//! That works because hooks run in registry order and `trail` resolves
//! before its dependents; there is no stronger ordering guarantee.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http::Method;
use serde_json::{Map, Value, json};

use burrow_core::{AppError, AppResult};
use burrow_maze::{Maze, RoomPos};
use burrow_plugin::{
    BuiltinPlugin, FreeContext, HookPoint, MazeAccess, MazePlugin, PluginDescriptor,
    PluginRequest, PluginResponse, RouteDescriptor, handler_fn,
};

pub const NAME: &str = "minimap";
pub const MINIMAP_KEY: &str = "minimap";

const ROUTE_RENDER: &str = "render";

const MARK_CURRENT: char = '@';
const MARK_VISITED: char = '*';
const MARK_UNKNOWN: char = '.';

pub fn builtin() -> BuiltinPlugin {
    BuiltinPlugin {
        name: NAME,
        build: |settings, enabled| {
            let marks = Marks {
                current: mark(&settings, "mark_current", MARK_CURRENT),
                visited: mark(&settings, "mark_visited", MARK_VISITED),
                unknown: mark(&settings, "mark_unknown", MARK_UNKNOWN),
            };
            PluginDescriptor::builder(NAME, env!("CARGO_PKG_VERSION"))
                .dependency(plugin_trail::NAME)
                .settings(settings)
                .enabled(enabled)
                .hook(HookPoint::PostInitialize)
                .hook(HookPoint::GetMaze)
                .hook(HookPoint::UpdateMaze)
                .route(RouteDescriptor::instance(
                    NAME,
                    Method::GET,
                    "/minimap",
                    MazeAccess::NotRequired,
                    ROUTE_RENDER,
                ))
                .route(RouteDescriptor::class(
                    NAME,
                    Method::GET,
                    "/minimap/legend",
                    handler_fn(legend),
                ))
                .factory(Arc::new(move |_| {
                    Ok(Arc::new(MinimapPlugin::new(marks)) as Arc<dyn MazePlugin>)
                }))
                .build()
        },
    }
}

fn mark(settings: &burrow_plugin::PluginSettings, key: &str, default: char) -> char {
    settings
        .get(key)
        .and_then(Value::as_str)
        .and_then(|s| s.chars().next())
        .unwrap_or(default)
}

/// The default mark legend; needs no session, hence a class route.
async fn legend(_context: FreeContext) -> AppResult<PluginResponse> {
    Ok(PluginResponse::json(json!({
        "current": MARK_CURRENT.to_string(),
        "visited": MARK_VISITED.to_string(),
        "unknown": MARK_UNKNOWN.to_string(),
    })))
}

#[derive(Clone, Copy)]
struct Marks {
    current: char,
    visited: char,
    unknown: char,
}

pub struct MinimapPlugin {
    marks: Marks,
    visited: Mutex<HashSet<u32>>,
}

impl MinimapPlugin {
    fn new(marks: Marks) -> Self {
        Self {
            marks,
            visited: Mutex::new(HashSet::new()),
        }
    }

    /// Rows of marks, northernmost row first.
    fn render(&self, maze: &Maze, visited: &HashSet<u32>) -> Vec<String> {
        let mut rows = Vec::with_capacity(maze.height());
        for y in (0..maze.height()).rev() {
            let mut row = String::with_capacity(maze.width());
            for x in 0..maze.width() {
                let identifier = maze.room(RoomPos::new(x, y)).identifier;
                let mark = if identifier == maze.current_room() {
                    self.marks.current
                } else if visited.contains(&identifier) {
                    self.marks.visited
                } else {
                    self.marks.unknown
                };
                row.push(mark);
            }
            rows.push(row);
        }
        rows
    }

    fn record(&self, identifier: u32) {
        self.visited.lock().unwrap().insert(identifier);
    }
}

#[async_trait]
impl MazePlugin for MinimapPlugin {
    fn name(&self) -> &str {
        NAME
    }

    async fn post_initialize(&self, maze: &mut Maze) -> AppResult<()> {
        self.record(maze.current_room());
        Ok(())
    }

    async fn get_maze(&self, maze: &Maze, result: &mut Map<String, Value>) -> AppResult<()> {
        // Prefer the journal trail already wrote into the shared result.
        let visited: HashSet<u32> = match result.get(plugin_trail::TRAIL_KEY) {
            Some(Value::Array(ids)) => ids
                .iter()
                .filter_map(Value::as_u64)
                .filter_map(|id| u32::try_from(id).ok())
                .collect(),
            _ => self.visited.lock().unwrap().clone(),
        };
        result.insert(MINIMAP_KEY.into(), json!(self.render(maze, &visited)));
        Ok(())
    }

    async fn update_maze(
        &self,
        maze: &Maze,
        _value: &Value,
        result: &mut Map<String, Value>,
    ) -> AppResult<()> {
        self.record(maze.current_room());
        let visited = self.visited.lock().unwrap().clone();
        result.insert(MINIMAP_KEY.into(), json!(self.render(maze, &visited)));
        Ok(())
    }

    async fn handle_route(
        &self,
        route_id: &str,
        maze: &Maze,
        _request: PluginRequest,
    ) -> AppResult<PluginResponse> {
        match route_id {
            ROUTE_RENDER => {
                let visited = self.visited.lock().unwrap().clone();
                Ok(PluginResponse::json(json!({
                    MINIMAP_KEY: self.render(maze, &visited)
                })))
            }
            _ => Err(AppError::not_found(format!("no route '{route_id}'"))),
        }
    }
}
