//! Default maze dimensions.

use serde::{Deserialize, Serialize};

/// Defaults applied when `POST /maze` omits a parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Default maze width in rooms.
    pub default_width: usize,
    /// Default maze height in rooms.
    pub default_height: usize,
    /// Default number of walls per room.
    pub default_walls: usize,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            default_width: 30,
            default_height: 20,
            default_walls: 4,
        }
    }
}
