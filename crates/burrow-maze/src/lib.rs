//! # burrow-maze
//!
//! The maze topology collaborator: a rectangular grid of four-walled rooms,
//! randomized-Prim carving, and the deterministic pseudo-random sequence
//! used both to drive carving and to assign room identifiers.
//!
//! The plugin engine treats this crate as an external collaborator: it only
//! needs [`Maze`] queries (dimensions, connectivity, wall geometry) and the
//! [`MazeSpec`] validation rules.

pub mod carve;
pub mod grid;
pub mod sequence;

pub use carve::carve;
pub use grid::{Direction, Maze, Room, RoomPos};
pub use sequence::IdentifierSequence;

use burrow_core::AppError;
use serde::{Deserialize, Serialize};

/// Number of walls per room supported by the quad topology.
pub const QUAD_WALLS: usize = 4;

/// Parameters for creating a maze.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MazeSpec {
    /// Width in rooms.
    pub width: usize,
    /// Height in rooms.
    pub height: usize,
    /// Walls per room; only 4 (quad) is supported.
    pub walls: usize,
    /// Seed for the identifier sequence; must be nonzero.
    pub seed: u32,
}

impl MazeSpec {
    /// Validates the requested parameters against the supported topology.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.width == 0 || self.height == 0 {
            return Err(AppError::validation("invalid maze dimensions"));
        }
        if self.walls != QUAD_WALLS {
            return Err(AppError::validation(format!(
                "unsupported wall count {}; only {QUAD_WALLS} is available",
                self.walls
            )));
        }
        if self.seed == 0 {
            return Err(AppError::validation("seed must be nonzero"));
        }
        Ok(())
    }
}
