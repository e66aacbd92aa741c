//! Randomized-Prim maze carving.

use std::collections::HashSet;

use crate::grid::{Direction, Maze, RoomPos};
use crate::sequence::IdentifierSequence;

/// Carves a spanning maze over the whole grid using randomized Prim,
/// starting at (0, 0) and drawing all randomness from `sequence`.
///
/// Doors opened before carving (for example by a `pre_initialize` hook) are
/// left open; carving only ever adds doors.
pub fn carve(maze: &mut Maze, sequence: &mut IdentifierSequence) {
    let start = RoomPos::new(0, 0);
    let mut visited: HashSet<RoomPos> = HashSet::new();
    visited.insert(start);

    let mut frontier: Vec<(RoomPos, Direction)> = Vec::new();
    push_walls(maze, start, &visited, &mut frontier);

    while !frontier.is_empty() {
        let pick = sequence.below(frontier.len());
        let (pos, dir) = frontier.swap_remove(pick);

        let Some(next) = maze.neighbor(pos, dir) else {
            continue;
        };
        if visited.contains(&next) {
            continue;
        }

        // Interior wall into an unvisited room; opening cannot fail.
        maze.open(pos, dir).expect("frontier wall is interior");
        visited.insert(next);
        push_walls(maze, next, &visited, &mut frontier);
    }
}

fn push_walls(
    maze: &Maze,
    pos: RoomPos,
    visited: &HashSet<RoomPos>,
    frontier: &mut Vec<(RoomPos, Direction)>,
) {
    for dir in Direction::ALL {
        if let Some(next) = maze.neighbor(pos, dir) {
            if !visited.contains(&next) {
                frontier.push((pos, dir));
            }
        }
    }
}
