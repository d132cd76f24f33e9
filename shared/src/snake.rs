//! The snake entity: body shift register, growth and direction locking

use crate::position::{Direction, Position};
use crate::{DrawTarget, SQ};
use std::collections::HashMap;

/// RGB color of a snake or the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const TARGET: Color = Color::rgb(200, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Default color for the snake at roster index `index`.
    ///
    /// Colors are never sent over the wire, so host and clients derive them
    /// from the roster position to agree on who is who.
    pub fn for_index(index: usize) -> Color {
        const PALETTE: [Color; 8] = [
            Color::rgb(80, 200, 120),
            Color::rgb(90, 140, 255),
            Color::rgb(250, 210, 70),
            Color::rgb(190, 100, 240),
            Color::rgb(255, 150, 60),
            Color::rgb(70, 220, 220),
            Color::rgb(240, 100, 180),
            Color::rgb(230, 230, 230),
        ];
        PALETTE[index % PALETTE.len()]
    }
}

/// Maps raw input symbols to directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    bindings: HashMap<u8, Direction>,
}

impl Controls {
    pub fn new(up: u8, down: u8, left: u8, right: u8) -> Self {
        let bindings = HashMap::from([
            (up, Direction::Up),
            (down, Direction::Down),
            (left, Direction::Left),
            (right, Direction::Right),
        ]);
        Self { bindings }
    }

    /// The W/A/S/D scheme used by every networked and local player.
    pub fn wasd() -> Self {
        Self::new(b'W', b'S', b'A', b'D')
    }

    pub fn direction(&self, symbol: u8) -> Option<Direction> {
        self.bindings.get(&symbol).copied()
    }

    pub fn symbols(&self) -> impl Iterator<Item = u8> + '_ {
        self.bindings.keys().copied()
    }
}

/// Inclusive rectangle the snake heads must stay in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: Position,
    pub max: Position,
}

impl Bounds {
    pub const fn new(min: Position, max: Position) -> Self {
        Self { min, max }
    }
}

/// A player's snake.
///
/// `body` is head-first. A `None` slot is a pending segment: grown but not
/// yet on the board. It takes the position of its predecessor on the next
/// [`Snake::step`].
#[derive(Debug, Clone)]
pub struct Snake {
    body: Vec<Option<Position>>,
    color: Color,
    dir: Direction,
    old_dir: Direction,
    controls: Option<Controls>,
}

impl Snake {
    /// Creates a snake of `size` segments with the head at `head` and the
    /// body laid out behind it along `body_dir`. The snake heads away from
    /// its body.
    pub fn new(head: Position, size: usize, body_dir: Direction, color: Color) -> Self {
        let size = size.max(1);
        let body = (0..size)
            .map(|i| Some(head + body_dir.unit() * (SQ * i as i32)))
            .collect();
        let dir = body_dir.opposite();

        Self {
            body,
            color,
            dir,
            old_dir: dir,
            controls: None,
        }
    }

    pub fn with_controls(mut self, controls: Controls) -> Self {
        self.controls = Some(controls);
        self
    }

    pub fn set_controls(&mut self, controls: Controls) {
        self.controls = Some(controls);
    }

    pub fn controls(&self) -> Option<&Controls> {
        self.controls.as_ref()
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn direction(&self) -> Direction {
        self.dir
    }

    /// Direction the snake moved on the last step.
    pub fn previous_direction(&self) -> Direction {
        self.old_dir
    }

    /// Total slots, pending ones included.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn head(&self) -> Option<Position> {
        self.body.first().copied().flatten()
    }

    pub fn tail(&self) -> Option<Position> {
        self.body.last().copied().flatten()
    }

    pub fn segments(&self) -> &[Option<Position>] {
        &self.body
    }

    /// Positions of the segments currently on the board, head-first.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.body.iter().filter_map(|segment| *segment)
    }

    pub fn occupies(&self, position: Position) -> bool {
        self.positions().any(|p| p == position)
    }

    /// Appends one pending slot, realized on the next step.
    pub fn grow(&mut self) {
        self.body.push(None);
    }

    /// Overwrites segment `index`, used when applying host snapshots.
    pub(crate) fn set_segment(&mut self, index: usize, position: Option<Position>) {
        if let Some(slot) = self.body.get_mut(index) {
            *slot = position;
        }
    }

    /// Feeds one input symbol. Unknown symbols and reversals onto the
    /// direction of the previous step are ignored.
    pub fn send_input(&mut self, symbol: u8) {
        let Some(wanted) = self.controls.as_ref().and_then(|c| c.direction(symbol)) else {
            return;
        };

        if wanted != self.old_dir.opposite() {
            self.dir = wanted;
        }
    }

    /// Where the head lands on the next step.
    pub fn next_head(&self) -> Option<Position> {
        self.head().map(|head| head + self.dir.unit() * SQ)
    }

    /// Advances the snake one cell. Returns `true` when the move is blocked
    /// (out of bounds or into a body), in which case no segment moves.
    pub fn step<'a, I>(&mut self, bounds: Bounds, others: I) -> bool
    where
        I: IntoIterator<Item = &'a Snake>,
    {
        self.old_dir = self.dir;

        let Some(next) = self.next_head() else {
            return true;
        };

        if !next.within(bounds.min, bounds.max) {
            return true;
        }

        if self.body.iter().skip(1).flatten().any(|&p| p == next) {
            return true;
        }

        if others.into_iter().any(|other| other.occupies(next)) {
            return true;
        }

        // Tail to head so every slot reads its predecessor before it moves.
        // A pending slot picks up its predecessor's old position here.
        for i in (1..self.body.len()).rev() {
            self.body[i] = self.body[i - 1];
        }
        self.body[0] = Some(next);

        false
    }

    /// Draws every positioned segment.
    pub fn draw_to<T: DrawTarget + ?Sized>(&self, target: &mut T) {
        for position in self.positions() {
            target.fill_cell(position, self.color);
        }
    }
}
