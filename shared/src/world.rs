//! The shared play field: every snake plus the target they compete for

use crate::position::Position;
use crate::snake::{Bounds, Color, Snake};
use crate::{DrawTarget, GRID_COLUMNS, GRID_ROWS};
use rand::seq::SliceRandom;
use rand::Rng;

/// Ordered roster of snakes and the single target.
///
/// Roster order is significant: snapshots address snakes by index.
#[derive(Debug, Clone)]
pub struct World {
    snakes: Vec<Snake>,
    target: Position,
}

/// Outcome of one [`World::advance`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Indices of snakes whose move was blocked this step.
    pub blocked: Vec<usize>,
    /// Indices of snakes that reached the target this step.
    pub ate: Vec<usize>,
}

impl World {
    pub fn new(target: Position) -> Self {
        Self {
            snakes: Vec::new(),
            target,
        }
    }

    /// Empty world with the target on a random cell.
    pub fn with_random_target<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let target = Position::from_cell(rng.gen_range(0..GRID_COLUMNS), rng.gen_range(0..GRID_ROWS));
        Self::new(target)
    }

    pub fn snakes(&self) -> &[Snake] {
        &self.snakes
    }

    pub fn snake_mut(&mut self, index: usize) -> Option<&mut Snake> {
        self.snakes.get_mut(index)
    }

    /// Appends a snake and returns its roster index.
    pub fn push_snake(&mut self, snake: Snake) -> usize {
        self.snakes.push(snake);
        self.snakes.len() - 1
    }

    pub fn target(&self) -> Position {
        self.target
    }

    pub fn set_target(&mut self, target: Position) {
        self.target = target;
    }

    pub fn is_occupied(&self, position: Position) -> bool {
        self.snakes.iter().any(|snake| snake.occupies(position))
    }

    /// Grid cells no positioned segment sits on.
    pub fn free_cells(&self) -> Vec<Position> {
        (0..GRID_ROWS)
            .flat_map(|row| (0..GRID_COLUMNS).map(move |column| Position::from_cell(column, row)))
            .filter(|&cell| !self.is_occupied(cell))
            .collect()
    }

    /// Moves the target to a random unoccupied cell. Returns `false`, leaving
    /// the target where it is, when the board is completely full.
    pub fn relocate_target<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        match self.free_cells().choose(rng) {
            Some(&cell) => {
                self.target = cell;
                true
            }
            None => false,
        }
    }

    /// Steps every snake once, in roster order, each against all the others.
    ///
    /// A snake whose head lands on the target grows and the target moves
    /// before the next snake steps.
    pub fn advance<R: Rng + ?Sized>(&mut self, bounds: Bounds, rng: &mut R) -> StepReport {
        let mut report = StepReport::default();

        for index in 0..self.snakes.len() {
            let (before, rest) = self.snakes.split_at_mut(index);
            let Some((snake, after)) = rest.split_first_mut() else {
                break;
            };

            if snake.step(bounds, before.iter().chain(after.iter())) {
                report.blocked.push(index);
            }

            if snake.head() == Some(self.target) {
                snake.grow();
                report.ate.push(index);
                self.relocate_target(rng);
            }
        }

        report
    }

    /// Draws every snake, then the target on top.
    pub fn draw_to<T: DrawTarget + ?Sized>(&self, target: &mut T) {
        for snake in &self.snakes {
            snake.draw_to(target);
        }
        target.fill_cell(self.target, Color::TARGET);
    }
}

/// Counts rendered frames down to the next simulation step.
#[derive(Debug, Clone, Copy)]
pub struct StepTimer {
    frames_per_step: u32,
    remaining: u32,
}

impl StepTimer {
    pub fn new(frames_per_step: u32) -> Self {
        let frames_per_step = frames_per_step.max(1);
        Self {
            frames_per_step,
            remaining: frames_per_step,
        }
    }

    /// Registers one frame. Returns `true` on frames where a step is due.
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.remaining = self.frames_per_step;
            true
        } else {
            false
        }
    }

    pub fn frames_per_step(&self) -> u32 {
        self.frames_per_step
    }
}
