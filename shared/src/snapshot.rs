//! Full-state snapshots and how a receiver folds them into its roster.
//!
//! The wire carries no spawn or grow messages. A receiver infers new players
//! and longer bodies purely from list lengths, see [`plan_update`].

use crate::position::{Direction, Position};
use crate::protocol::ProtocolError;
use crate::snake::{Color, Snake};
use crate::world::World;
use serde::{Deserialize, Serialize};

/// Every snake's positioned segments in roster order, plus the target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub snakes: Vec<Vec<Position>>,
    pub target: Position,
}

/// What applying one snapshot entry does to the local snake at that index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeUpdate {
    /// No local snake yet: create one with this many segments.
    Spawn { len: usize },
    /// Local body is shorter: grow it by this many slots first.
    Grow { by: usize },
    /// Lengths already line up (or the local body is longer).
    Overwrite,
}

/// Decides how entry `incoming_len` reconciles with the local snake, given
/// its current length or `None` when the roster has no snake at that index.
pub fn plan_update(existing_len: Option<usize>, incoming_len: usize) -> SnakeUpdate {
    match existing_len {
        None => SnakeUpdate::Spawn { len: incoming_len },
        Some(len) if len < incoming_len => SnakeUpdate::Grow {
            by: incoming_len - len,
        },
        Some(_) => SnakeUpdate::Overwrite,
    }
}

impl Snapshot {
    /// Captures the world as it would go on the wire.
    pub fn capture(world: &World) -> Self {
        Self {
            snakes: world
                .snakes()
                .iter()
                .map(|snake| snake.positions().collect())
                .collect(),
            target: world.target(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Overwrites `world` with this snapshot.
    ///
    /// Snakes beyond the local roster are created, shorter local bodies are
    /// grown before their positions are assigned. Local segments past the end
    /// of an entry go back to pending until a later snapshot places them.
    pub fn apply_to(&self, world: &mut World) {
        for (index, incoming) in self.snakes.iter().enumerate() {
            let existing = world.snakes().get(index).map(Snake::len);

            match plan_update(existing, incoming.len()) {
                SnakeUpdate::Spawn { len } => {
                    let head = incoming.first().copied().unwrap_or_default();
                    world.push_snake(Snake::new(
                        head,
                        len,
                        Direction::Right,
                        Color::for_index(index),
                    ));
                }
                SnakeUpdate::Grow { by } => {
                    if let Some(snake) = world.snake_mut(index) {
                        for _ in 0..by {
                            snake.grow();
                        }
                    }
                }
                SnakeUpdate::Overwrite => {}
            }

            if let Some(snake) = world.snake_mut(index) {
                for segment in 0..snake.len() {
                    snake.set_segment(segment, incoming.get(segment).copied());
                }
            }
        }

        world.set_target(self.target);
    }
}
