//! Quad maze grid: rooms, door state, identifiers, and wall geometry.

use std::collections::HashMap;
use std::f64::consts::PI;

use burrow_core::AppError;
use serde::{Deserialize, Serialize};

use crate::sequence::IdentifierSequence;

/// A room position in the maze matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomPos {
    /// Column, 0 at the left edge.
    pub x: usize,
    /// Row, 0 at the bottom edge.
    pub y: usize,
}

impl RoomPos {
    /// Creates a position.
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// One of the four wall directions of a quad room.
///
/// The order here is the wall iteration order on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    East,
    North,
    West,
    South,
}

impl Direction {
    /// All directions, in wire order.
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::North,
        Direction::West,
        Direction::South,
    ];

    /// The opposite wall.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::East => Direction::West,
            Direction::North => Direction::South,
            Direction::West => Direction::East,
            Direction::South => Direction::North,
        }
    }

    /// Grid delta for stepping through this wall.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::East => (1, 0),
            Direction::North => (0, 1),
            Direction::West => (-1, 0),
            Direction::South => (0, -1),
        }
    }

    /// Angular span `(start, end)` of this wall in radians, measured
    /// counter-clockwise from the positive x axis at the room centre.
    pub fn span(self) -> (f64, f64) {
        let center = match self {
            Direction::East => 0.0,
            Direction::North => PI / 2.0,
            Direction::West => PI,
            Direction::South => 3.0 * PI / 2.0,
        };
        (center - PI / 4.0, center + PI / 4.0)
    }

    fn bit(self) -> u8 {
        match self {
            Direction::East => 1,
            Direction::North => 2,
            Direction::West => 4,
            Direction::South => 8,
        }
    }
}

/// A single room: its identifier and which of its walls carry doors.
#[derive(Debug, Clone, Default)]
pub struct Room {
    /// Identifier assigned from the sequence; unique within the maze.
    pub identifier: u32,
    doors: u8,
}

impl Room {
    /// Whether the wall in `dir` has a door.
    pub fn has_door(&self, dir: Direction) -> bool {
        self.doors & dir.bit() != 0
    }

    fn open(&mut self, dir: Direction) {
        self.doors |= dir.bit();
    }
}

/// A rectangular maze of four-walled rooms.
///
/// Rooms start fully walled; carving opens doors pairwise. Identifiers are
/// assigned in one pass from an [`IdentifierSequence`] after carving.
#[derive(Debug, Clone)]
pub struct Maze {
    width: usize,
    height: usize,
    rooms: Vec<Room>,
    identifiers: HashMap<u32, RoomPos>,
    current_room: u32,
}

impl Maze {
    /// Creates a fully-walled maze. Dimensions must be nonzero.
    pub fn new(width: usize, height: usize) -> Result<Self, AppError> {
        if width == 0 || height == 0 {
            return Err(AppError::validation("invalid maze dimensions"));
        }
        Ok(Self {
            width,
            height,
            rooms: vec![Room::default(); width * height],
            identifiers: HashMap::new(),
            current_room: 0,
        })
    }

    /// Width in rooms.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in rooms.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of walls per room.
    pub fn wall_count(&self) -> usize {
        crate::QUAD_WALLS
    }

    fn index(&self, pos: RoomPos) -> usize {
        pos.y * self.width + pos.x
    }

    /// Whether `pos` lies inside the maze.
    pub fn contains(&self, pos: RoomPos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// The room at `pos`. Panics if `pos` is outside the maze.
    pub fn room(&self, pos: RoomPos) -> &Room {
        &self.rooms[self.index(pos)]
    }

    /// Iterates all room positions, row by row from (0, 0).
    pub fn positions(&self) -> impl Iterator<Item = RoomPos> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| RoomPos::new(x, y)))
    }

    /// The neighbouring position through wall `dir`, or `None` at the edge.
    pub fn neighbor(&self, pos: RoomPos, dir: Direction) -> Option<RoomPos> {
        let (dx, dy) = dir.delta();
        let x = pos.x.checked_add_signed(dx)?;
        let y = pos.y.checked_add_signed(dy)?;
        let next = RoomPos::new(x, y);
        self.contains(next).then_some(next)
    }

    /// Whether wall `dir` of `pos` is an outer edge of the maze.
    pub fn edge(&self, pos: RoomPos, dir: Direction) -> bool {
        self.neighbor(pos, dir).is_none()
    }

    /// Whether wall `dir` of `pos` carries a door.
    pub fn is_open(&self, pos: RoomPos, dir: Direction) -> bool {
        self.room(pos).has_door(dir)
    }

    /// Opens the wall between `pos` and its neighbour in `dir`, both sides.
    pub fn open(&mut self, pos: RoomPos, dir: Direction) -> Result<(), AppError> {
        let other = self
            .neighbor(pos, dir)
            .ok_or_else(|| AppError::internal("cannot open an edge wall"))?;
        let idx = self.index(pos);
        self.rooms[idx].open(dir);
        let other_idx = self.index(other);
        self.rooms[other_idx].open(dir.opposite());
        Ok(())
    }

    /// Whether `a` and `b` are neighbouring rooms joined by a door.
    pub fn connected(&self, a: RoomPos, b: RoomPos) -> bool {
        Direction::ALL
            .iter()
            .any(|&dir| self.neighbor(a, dir) == Some(b) && self.is_open(a, dir))
    }

    /// Assigns an identifier to every room and records the reverse mapping.
    pub fn assign_identifiers(&mut self, sequence: &mut IdentifierSequence) {
        self.identifiers.clear();
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = RoomPos::new(x, y);
                let identifier = sequence.next_value();
                let idx = self.index(pos);
                self.rooms[idx].identifier = identifier;
                self.identifiers.insert(identifier, pos);
            }
        }
    }

    /// Position of the room carrying `identifier`, if any.
    pub fn position_of(&self, identifier: u32) -> Option<RoomPos> {
        self.identifiers.get(&identifier).copied()
    }

    /// Identifier of the room at (0, 0).
    pub fn start_room(&self) -> u32 {
        self.room(RoomPos::new(0, 0)).identifier
    }

    /// Identifier of the current room.
    pub fn current_room(&self) -> u32 {
        self.current_room
    }

    /// Moves the current room to `identifier`, which must exist.
    pub fn set_current_room(&mut self, identifier: u32) -> Result<(), AppError> {
        if self.position_of(identifier).is_none() {
            return Err(AppError::not_found(format!(
                "room {identifier} does not exist"
            )));
        }
        self.current_room = identifier;
        Ok(())
    }

    /// Physical centre of a room.
    pub fn center(&self, pos: RoomPos) -> (f64, f64) {
        (pos.x as f64 + 0.5, pos.y as f64 + 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maze_3x3() -> Maze {
        Maze::new(3, 3).unwrap()
    }

    #[test]
    fn new_rejects_empty_dimensions() {
        assert!(Maze::new(0, 3).is_err());
        assert!(Maze::new(3, 0).is_err());
    }

    #[test]
    fn open_is_symmetric() {
        let mut maze = maze_3x3();
        let a = RoomPos::new(0, 0);
        let b = RoomPos::new(1, 0);
        assert!(!maze.connected(a, b));
        maze.open(a, Direction::East).unwrap();
        assert!(maze.is_open(a, Direction::East));
        assert!(maze.is_open(b, Direction::West));
        assert!(maze.connected(a, b));
        assert!(maze.connected(b, a));
    }

    #[test]
    fn edge_detection() {
        let maze = maze_3x3();
        assert!(maze.edge(RoomPos::new(0, 0), Direction::West));
        assert!(maze.edge(RoomPos::new(0, 0), Direction::South));
        assert!(!maze.edge(RoomPos::new(0, 0), Direction::East));
        assert!(maze.edge(RoomPos::new(2, 2), Direction::North));
    }

    #[test]
    fn connected_requires_a_door() {
        let mut maze = maze_3x3();
        let a = RoomPos::new(0, 0);
        let b = RoomPos::new(0, 1);
        assert!(!maze.connected(a, b));
        maze.open(a, Direction::North).unwrap();
        assert!(maze.connected(a, b));
        // Diagonals are never connected.
        assert!(!maze.connected(a, RoomPos::new(1, 1)));
    }

    #[test]
    fn identifiers_round_trip() {
        let mut maze = maze_3x3();
        let mut seq = IdentifierSequence::new(5).unwrap();
        maze.assign_identifiers(&mut seq);
        for pos in maze.positions() {
            let id = maze.room(pos).identifier;
            assert_eq!(maze.position_of(id), Some(pos));
        }
        assert_eq!(
            maze.start_room(),
            maze.room(RoomPos::new(0, 0)).identifier
        );
    }

    #[test]
    fn set_current_room_validates() {
        let mut maze = maze_3x3();
        let mut seq = IdentifierSequence::new(5).unwrap();
        maze.assign_identifiers(&mut seq);
        let id = maze.room(RoomPos::new(1, 1)).identifier;
        maze.set_current_room(id).unwrap();
        assert_eq!(maze.current_room(), id);
        assert!(maze.set_current_room(0).is_err());
    }

    #[test]
    fn spans_cover_the_circle() {
        let mut total = 0.0;
        for dir in Direction::ALL {
            let (start, end) = dir.span();
            total += end - start;
        }
        assert!((total - 2.0 * PI).abs() < 1e-9);
    }
}
