//! Wire representations of mazes and rooms, with hook participation.
//!
//! Plugins see the partially built maps and may add, overwrite, or remove
//! keys. Hooks run in session plugin order, so on a key collision the last
//! plugin in the registry wins. Neighbour room maps are completed, hooks
//! included, before the outer room's `get_room` hooks fire.

use std::collections::HashMap;

use serde_json::{Map, Value, json};

use burrow_core::{AppError, AppResult};
use burrow_maze::{Direction, Maze, RoomPos};

use crate::session::GameSession;

/// The whole-maze wire value, including the deep current-room value and the
/// `get_maze` hook keys.
pub async fn maze_value(session: &GameSession) -> AppResult<Value> {
    let maze = session.maze();
    let mut result = Map::new();
    result.insert("width".into(), json!(maze.width()));
    result.insert("height".into(), json!(maze.height()));
    result.insert("walls".into(), json!(maze.wall_count()));
    result.insert("plugins".into(), json!(session.plugins().names()));
    result.insert("start_room".into(), json!(maze.start_room()));

    let current_pos = maze
        .position_of(maze.current_room())
        .ok_or_else(|| AppError::internal("current room has no position"))?;
    let current = room_value(session, current_pos, true).await?;
    result.insert("current_room".into(), current);

    session.run_get_maze(&mut result).await?;
    Ok(Value::Object(result))
}

/// The wire value of one room.
///
/// With `deep`, open non-edge walls carry the neighbour's shallow room
/// value instead of its bare identifier, and each neighbour's `get_room`
/// hooks run before the outer room's.
pub async fn room_value(session: &GameSession, pos: RoomPos, deep: bool) -> AppResult<Value> {
    let maze = session.maze();

    let mut neighbor_values: HashMap<Direction, Value> = HashMap::new();
    if deep {
        for dir in Direction::ALL {
            if maze.edge(pos, dir) || !maze.is_open(pos, dir) {
                continue;
            }
            let npos = maze
                .neighbor(pos, dir)
                .ok_or_else(|| AppError::internal("open interior wall without neighbour"))?;
            let mut map = skeleton(maze, npos, HashMap::new());
            session.run_get_room(npos, false, &mut map).await?;
            neighbor_values.insert(dir, Value::Object(map));
        }
    }

    let mut result = skeleton(maze, pos, neighbor_values);
    session.run_get_room(pos, deep, &mut result).await?;
    Ok(Value::Object(result))
}

/// The hook-free shape of a room map. Walls appear in wire order and only
/// for non-edge directions; `target` is null for a closed wall, overridden
/// by `neighbor_values` for walls being serialized deep.
fn skeleton(
    maze: &Maze,
    pos: RoomPos,
    mut neighbor_values: HashMap<Direction, Value>,
) -> Map<String, Value> {
    let room = maze.room(pos);
    let (cx, cy) = maze.center(pos);

    let mut walls = Vec::new();
    for dir in Direction::ALL {
        if maze.edge(pos, dir) {
            continue;
        }
        let (start, end) = dir.span();
        let target = if !maze.is_open(pos, dir) {
            Value::Null
        } else if let Some(value) = neighbor_values.remove(&dir) {
            value
        } else {
            match maze.neighbor(pos, dir) {
                Some(npos) => json!(maze.room(npos).identifier),
                None => Value::Null,
            }
        };
        walls.push(json!({
            "span": { "start": start, "end": end },
            "target": target,
        }));
    }

    let mut result = Map::new();
    result.insert("identifier".into(), json!(room.identifier));
    result.insert("position".into(), json!({ "x": pos.x, "y": pos.y }));
    result.insert("center".into(), json!({ "x": cx, "y": cy }));
    result.insert("walls".into(), Value::Array(walls));
    result
}
