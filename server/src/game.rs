use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{
    Color, Controls, Direction, Position, Snake, Snapshot, StepReport, StepTimer, World, ARENA,
    GRID_COLUMNS, GRID_ROWS, INITIAL_LENGTH, SQ,
};

/// The host's canonical simulation.
///
/// `position_cache[i]` holds the positioned segments of snake `i` as of the
/// last step or spawn, which is exactly what goes on the wire.
pub struct HostGame {
    world: World,
    position_cache: Vec<Vec<Position>>,
    timer: StepTimer,
    rng: StdRng,
    steps: u64,
}

impl HostGame {
    pub fn new(frames_per_step: u32) -> Self {
        Self::with_rng(frames_per_step, StdRng::from_entropy())
    }

    pub fn with_rng(frames_per_step: u32, mut rng: StdRng) -> Self {
        let world = World::with_random_target(&mut rng);
        Self {
            world,
            position_cache: Vec::new(),
            timer: StepTimer::new(frames_per_step),
            rng,
            steps: 0,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn roster_len(&self) -> usize {
        self.world.snakes().len()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Adds a snake for a newly connected player at the end of the roster.
    /// Returns `None` when the board has no room for it.
    pub fn spawn_player(&mut self) -> Option<usize> {
        let head = self.spawn_point(None)?;
        Some(self.place_player(self.roster_len(), head))
    }

    /// Picks where a new snake's head goes, ignoring the snake at `replacing`
    /// if it is about to be swapped out.
    ///
    /// Players enter from the right edge, heading left, on a random row whose
    /// entry cells are free. When every such row is taken, any spot on the
    /// board whose head and body cells are free will do.
    pub fn spawn_point(&mut self, replacing: Option<usize>) -> Option<Position> {
        let column = GRID_COLUMNS - 1;
        let edge: Vec<Position> = (0..GRID_ROWS)
            .map(|row| Position::from_cell(column, row))
            .filter(|&head| {
                self.is_free(head, replacing)
                    && self.is_free(head + Direction::Left.unit() * SQ, replacing)
            })
            .collect();

        if !edge.is_empty() {
            return Some(edge[self.rng.gen_range(0..edge.len())]);
        }

        let anywhere: Vec<Position> = (0..GRID_ROWS)
            .flat_map(|row| (0..GRID_COLUMNS).map(move |c| Position::from_cell(c, row)))
            .filter(|&head| {
                (0..INITIAL_LENGTH as i32)
                    .map(|i| head + Direction::Right.unit() * (SQ * i))
                    .filter(|cell| cell.within(ARENA.min, ARENA.max))
                    .all(|cell| self.is_free(cell, replacing))
            })
            .collect();

        if anywhere.is_empty() {
            None
        } else {
            Some(anywhere[self.rng.gen_range(0..anywhere.len())])
        }
    }

    /// Puts a fresh snake with its head at `head` into roster slot `index`,
    /// replacing whatever snake was there, or appending when `index` is the
    /// roster length.
    pub fn place_player(&mut self, index: usize, head: Position) -> usize {
        let snake = Snake::new(head, INITIAL_LENGTH, Direction::Right, Color::for_index(index))
            .with_controls(Controls::wasd());
        let cached: Vec<Position> = snake.positions().collect();

        match self.world.snake_mut(index) {
            Some(slot) => {
                *slot = snake;
                self.position_cache[index] = cached;
                info!("Snake {} respawned at {:?}", index, head);
                index
            }
            None => {
                self.position_cache.push(cached);
                let index = self.world.push_snake(snake);
                info!("New snake {} at {:?}", index, head);
                index
            }
        }
    }

    fn is_free(&self, cell: Position, ignoring: Option<usize>) -> bool {
        !self
            .world
            .snakes()
            .iter()
            .enumerate()
            .any(|(i, snake)| Some(i) != ignoring && snake.occupies(cell))
    }

    /// Feeds one input symbol to the snake at `index`. Returns false when no
    /// snake is paired with that index yet.
    pub fn apply_input(&mut self, index: usize, symbol: u8) -> bool {
        match self.world.snake_mut(index) {
            Some(snake) => {
                snake.send_input(symbol);
                true
            }
            None => false,
        }
    }

    /// Registers one frame and steps the world when the step timer fires.
    pub fn frame(&mut self) -> Option<StepReport> {
        if !self.timer.tick() {
            return None;
        }
        Some(self.step())
    }

    /// Steps every snake once and refreshes the position cache.
    pub fn step(&mut self) -> StepReport {
        let report = self.world.advance(ARENA, &mut self.rng);
        self.steps += 1;

        for &index in &report.ate {
            debug!(
                "Snake {} ate, target moved to {:?}",
                index,
                self.world.target()
            );
        }

        self.position_cache = self
            .world
            .snakes()
            .iter()
            .map(|snake| snake.positions().collect())
            .collect();

        report
    }

    /// The snapshot every client receives this frame.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            snakes: self.position_cache.clone(),
            target: self.world.target(),
        }
    }
}
