//! # plugin-trail
//!
//! Keeps a per-session journal of visited rooms and publishes it as the
//! `trail` key of the maze value, a `visited` flag on every room value,
//! and `GET /trail`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http::Method;
use serde_json::{Map, Value, json};

use burrow_core::{AppError, AppResult};
use burrow_maze::{Maze, RoomPos};
use burrow_plugin::{
    BuiltinPlugin, HookPoint, MazeAccess, MazePlugin, PluginDescriptor, PluginRequest,
    PluginResponse, RouteDescriptor,
};

pub const NAME: &str = "trail";
pub const TRAIL_KEY: &str = "trail";

const ROUTE_JOURNAL: &str = "journal";
const DEFAULT_LIMIT: u64 = 1000;

pub fn builtin() -> BuiltinPlugin {
    BuiltinPlugin {
        name: NAME,
        build: |settings, enabled| {
            let limit = settings.u64_or("limit", DEFAULT_LIMIT) as usize;
            PluginDescriptor::builder(NAME, env!("CARGO_PKG_VERSION"))
                .settings(settings)
                .enabled(enabled)
                .hook(HookPoint::PostInitialize)
                .hook(HookPoint::GetMaze)
                .hook(HookPoint::UpdateMaze)
                .hook(HookPoint::GetRoom)
                .route(RouteDescriptor::instance(
                    NAME,
                    Method::GET,
                    "/trail",
                    MazeAccess::NotRequired,
                    ROUTE_JOURNAL,
                ))
                .factory(Arc::new(move |_| {
                    Ok(Arc::new(TrailPlugin::new(limit)) as Arc<dyn MazePlugin>)
                }))
                .build()
        },
    }
}

/// One journal per session; instances are never shared.
pub struct TrailPlugin {
    limit: usize,
    journal: Mutex<Vec<u32>>,
}

impl TrailPlugin {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            journal: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, identifier: u32) {
        let mut journal = self.journal.lock().unwrap();
        if journal.last() == Some(&identifier) {
            return;
        }
        journal.push(identifier);
        if journal.len() > self.limit {
            let excess = journal.len() - self.limit;
            journal.drain(..excess);
        }
    }

    fn snapshot(&self) -> Vec<u32> {
        self.journal.lock().unwrap().clone()
    }
}

#[async_trait]
impl MazePlugin for TrailPlugin {
    fn name(&self) -> &str {
        NAME
    }

    async fn post_initialize(&self, maze: &mut Maze) -> AppResult<()> {
        self.record(maze.current_room());
        Ok(())
    }

    async fn get_maze(&self, _maze: &Maze, result: &mut Map<String, Value>) -> AppResult<()> {
        result.insert(TRAIL_KEY.into(), json!(self.snapshot()));
        Ok(())
    }

    async fn update_maze(
        &self,
        maze: &Maze,
        _value: &Value,
        result: &mut Map<String, Value>,
    ) -> AppResult<()> {
        // The move has already been applied; the trail written by get_maze
        // in the same request predates it, so overwrite the key.
        self.record(maze.current_room());
        result.insert(TRAIL_KEY.into(), json!(self.snapshot()));
        Ok(())
    }

    async fn get_room(
        &self,
        maze: &Maze,
        pos: RoomPos,
        _neighbor_details: bool,
        result: &mut Map<String, Value>,
    ) -> AppResult<()> {
        let identifier = maze.room(pos).identifier;
        let visited = self.journal.lock().unwrap().contains(&identifier);
        result.insert("visited".into(), json!(visited));
        Ok(())
    }

    async fn handle_route(
        &self,
        route_id: &str,
        _maze: &Maze,
        _request: PluginRequest,
    ) -> AppResult<PluginResponse> {
        match route_id {
            ROUTE_JOURNAL => Ok(PluginResponse::json(json!({ TRAIL_KEY: self.snapshot() }))),
            _ => Err(AppError::not_found(format!("no route '{route_id}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_deduplicates_consecutive_rooms() {
        let plugin = TrailPlugin::new(10);
        plugin.record(1);
        plugin.record(1);
        plugin.record(2);
        plugin.record(1);
        assert_eq!(plugin.snapshot(), vec![1, 2, 1]);
    }

    #[test]
    fn journal_is_capped_dropping_oldest() {
        let plugin = TrailPlugin::new(3);
        for id in 1..=5 {
            plugin.record(id);
        }
        assert_eq!(plugin.snapshot(), vec![3, 4, 5]);
    }

    #[tokio::test]
    async fn update_maze_overwrites_the_trail_key() {
        let plugin = TrailPlugin::new(10);
        plugin.record(7);
        let mut maze = Maze::new(2, 1).unwrap();
        let mut sequence = burrow_maze::IdentifierSequence::new(5).unwrap();
        burrow_maze::carve(&mut maze, &mut sequence);
        maze.assign_identifiers(&mut sequence);
        let start = maze.start_room();
        maze.set_current_room(start).unwrap();

        let mut result = Map::new();
        result.insert(TRAIL_KEY.into(), json!([7]));
        plugin
            .update_maze(&maze, &Value::Null, &mut result)
            .await
            .unwrap();
        assert_eq!(result[TRAIL_KEY], json!([7, start]));
    }
}
