//! Singleplayer: the same simulation as a hosted game, one snake, no sockets.

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{
    Color, Controls, Direction, InputSource, Position, Snake, StepReport, StepTimer, World, ARENA,
    FRAMES_PER_STEP, GRID_COLUMNS, GRID_ROWS, INITIAL_LENGTH, INPUT_SYMBOLS,
};

pub struct SoloSession {
    world: World,
    timer: StepTimer,
    rng: StdRng,
}

impl SoloSession {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_rng(rng: StdRng) -> Self {
        let mut session = Self {
            world: World::new(Position::default()),
            timer: StepTimer::new(FRAMES_PER_STEP),
            rng,
        };
        session.restart();
        session
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn snake(&self) -> &Snake {
        &self.world.snakes()[0]
    }

    /// Puts a fresh snake in the middle of the board heading left.
    pub fn restart(&mut self) {
        let snake = Snake::new(
            Position::from_cell(GRID_COLUMNS / 2, GRID_ROWS / 2),
            INITIAL_LENGTH,
            Direction::Right,
            Color::for_index(0),
        )
        .with_controls(Controls::wasd());

        self.world = World::new(Position::default());
        self.world.push_snake(snake);
        self.world.relocate_target(&mut self.rng);
        self.timer = StepTimer::new(self.timer.frames_per_step());
        info!("Singleplayer game started");
    }

    /// Advances one rendered frame. Keys are only read on step frames.
    pub fn frame<I: InputSource + ?Sized>(&mut self, input: &I) -> Option<StepReport> {
        if !self.timer.tick() {
            return None;
        }

        if let Some(snake) = self.world.snake_mut(0) {
            for symbol in INPUT_SYMBOLS {
                if input.is_pressed(symbol) {
                    snake.send_input(symbol);
                }
            }
        }

        let report = self.world.advance(ARENA, &mut self.rng);
        if !report.ate.is_empty() {
            info!("Snake grew to {}", self.snake().len());
        }
        Some(report)
    }
}

impl Default for SoloSession {
    fn default() -> Self {
        Self::new()
    }
}
