//! Grid coordinates and the four movement directions

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// A point on the play field, in pixels.
///
/// Snake segments and the target always sit on multiples of [`crate::SQ`],
/// so two positions either coincide exactly or occupy different cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Positive direction is to the right.
    pub x: i32,
    /// Positive direction is down.
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position of the top-left corner of grid cell (`column`, `row`).
    pub const fn from_cell(column: i32, row: i32) -> Self {
        Self {
            x: column * crate::SQ,
            y: row * crate::SQ,
        }
    }

    /// Component-wise product.
    pub fn scale_by(self, other: Position) -> Position {
        Position {
            x: self.x * other.x,
            y: self.y * other.y,
        }
    }

    /// True when both axes lie inside the inclusive range `[min, max]`.
    pub fn within(self, min: Position, max: Position) -> bool {
        self.x >= min.x && self.x <= max.x && self.y >= min.y && self.y <= max.y
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, other: Position) -> Position {
        Position {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, other: Position) -> Position {
        Position {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<i32> for Position {
    type Output = Position;

    fn mul(self, scalar: i32) -> Position {
        Position {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl Neg for Position {
    type Output = Position;

    fn neg(self) -> Position {
        self * -1
    }
}

/// One of the four unit steps a snake can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit vector for this direction. Screen coordinates, so `Up` is -y.
    pub fn unit(self) -> Position {
        match self {
            Direction::Up => Position::new(0, -1),
            Direction::Down => Position::new(0, 1),
            Direction::Left => Position::new(-1, 0),
            Direction::Right => Position::new(1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl Neg for Direction {
    type Output = Direction;

    fn neg(self) -> Direction {
        self.opposite()
    }
}
