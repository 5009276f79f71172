//! Grid positions and movement directions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cell position on the game grid
///
/// `x` is the column and `y` is the row; `(0, 0)` is the top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Sentinel used for players that have left the game
    pub const GONE: Position = Position { x: -1, y: -1 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The adjacent cell one step in `direction`
    pub const fn step(self, direction: Direction) -> Self {
        match direction {
            Direction::North => Self::new(self.x, self.y - 1),
            Direction::South => Self::new(self.x, self.y + 1),
            Direction::East => Self::new(self.x + 1, self.y),
            Direction::West => Self::new(self.x - 1, self.y),
        }
    }

    /// All cells within Chebyshev distance `radius`, excluding `self`
    ///
    /// Cells are yielded row by row. No bounds checking is done here.
    pub fn surrounding(self, radius: i32) -> impl Iterator<Item = Position> {
        (-radius..=radius)
            .flat_map(move |dy| (-radius..=radius).map(move |dx| (dx, dy)))
            .filter(|&(dx, dy)| dx != 0 || dy != 0)
            .map(move |(dx, dy)| Position::new(self.x + dx, self.y + dy))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

/// Movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Parse a direction name, ignoring case
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "north" => Some(Self::North),
            "south" => Some(Self::South),
            "east" => Some(Self::East),
            "west" => Some(Self::West),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_offsets() {
        let origin = Position::new(5, 5);
        assert_eq!(origin.step(Direction::North), Position::new(5, 4));
        assert_eq!(origin.step(Direction::South), Position::new(5, 6));
        assert_eq!(origin.step(Direction::East), Position::new(6, 5));
        assert_eq!(origin.step(Direction::West), Position::new(4, 5));
    }

    #[test]
    fn test_surrounding_excludes_center() {
        let center = Position::new(1, 1);
        let cells: Vec<_> = center.surrounding(1).collect();
        assert_eq!(cells.len(), 8);
        assert!(!cells.contains(&center));
        assert!(cells.contains(&Position::new(0, 0)));
        assert!(cells.contains(&Position::new(2, 2)));
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("NoRtH"), Some(Direction::North));
        assert_eq!(Direction::parse("west"), Some(Direction::West));
        assert_eq!(Direction::parse("up"), None);
        for direction in Direction::ALL {
            assert_eq!(Direction::parse(direction.as_str()), Some(direction));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Position::new(3, -1).to_string(), "3, -1");
    }
}
