use macroquad::prelude::{clear_background, draw_line, draw_rectangle, Color as Paint};
use shared::{Color, DrawTarget, Position, World, HEIGHT, SQ, WIDTH};

const BACKGROUND: Paint = Paint::new(0.08, 0.08, 0.08, 1.0);
const GRID_LINE: Paint = Paint::new(0.2, 0.2, 0.2, 1.0);

fn paint(color: Color) -> Paint {
    Paint::from_rgba(color.r, color.g, color.b, 255)
}

/// Draws the board into the macroquad window, one `SQ`-sized cell at a time.
#[derive(Debug, Default)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&mut self, world: &World) {
        clear_background(BACKGROUND);

        self.draw_grid();

        world.draw_to(self);
    }

    fn draw_grid(&self) {
        for x in (0..=WIDTH).step_by(SQ as usize) {
            draw_line(x as f32, 0.0, x as f32, HEIGHT as f32, 1.0, GRID_LINE);
        }
        for y in (0..=HEIGHT).step_by(SQ as usize) {
            draw_line(0.0, y as f32, WIDTH as f32, y as f32, 1.0, GRID_LINE);
        }
    }
}

impl DrawTarget for Renderer {
    fn fill_cell(&mut self, at: Position, color: Color) {
        draw_rectangle(at.x as f32, at.y as f32, SQ as f32, SQ as f32, paint(color));
    }
}
