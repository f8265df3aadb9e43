mod hud;
mod renderer;
mod transform;

pub use renderer::Renderer;
pub use transform::{world_len_to_px, world_to_screen, Viewport, PIXELS_PER_WORLD};

pub const MARKER_HALF_SIZE_PX: i32 = 6;
