//! Simulation model and wire protocol shared by the host and the clients.
//!
//! Both sides run the same [`Snake`] and [`World`] types: the host advances
//! them, clients only overwrite them from [`Snapshot`]s. Anything rendered or
//! polled from a keyboard goes through the two small contracts below,
//! [`DrawTarget`] and [`InputSource`].

pub mod position;
pub mod protocol;
pub mod snake;
pub mod snapshot;
pub mod world;

pub use position::{Direction, Position};
pub use protocol::{read_frame, write_frame, ProtocolError, MAX_FRAME_LEN};
pub use snake::{Bounds, Color, Controls, Snake};
pub use snapshot::{plan_update, Snapshot, SnakeUpdate};
pub use world::{StepReport, StepTimer, World};

/// Side of one grid cell, in pixels.
pub const SQ: i32 = 32;
pub const WIDTH: i32 = 640;
pub const HEIGHT: i32 = 480;
pub const GRID_COLUMNS: i32 = WIDTH / SQ;
pub const GRID_ROWS: i32 = HEIGHT / SQ;

/// Inclusive area a snake head may occupy.
pub const ARENA: Bounds = Bounds::new(Position::new(0, 0), Position::new(WIDTH - SQ, HEIGHT - SQ));

pub const DEFAULT_PORT: u16 = 7777;
pub const MAX_PLAYERS: usize = 8;
/// Segments a freshly spawned snake starts with.
pub const INITIAL_LENGTH: usize = 3;
/// Rendered frames per simulation step.
pub const FRAMES_PER_STEP: u32 = 4;

/// Direction keys in the order a client checks them each frame.
pub const INPUT_SYMBOLS: [u8; 4] = [b'W', b'A', b'S', b'D'];

/// A surface entities can be drawn onto, one grid cell at a time.
pub trait DrawTarget {
    fn fill_cell(&mut self, at: Position, color: Color);
}

/// Per-frame keyboard query.
pub trait InputSource {
    fn is_pressed(&self, symbol: u8) -> bool;

    /// First pressed symbol among [`INPUT_SYMBOLS`].
    fn poll_direction(&self) -> Option<u8> {
        INPUT_SYMBOLS
            .iter()
            .copied()
            .find(|&symbol| self.is_pressed(symbol))
    }
}
