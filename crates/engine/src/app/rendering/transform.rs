use crate::app::{Camera2D, Vec2};

pub const PIXELS_PER_WORLD: f32 = 24.0;
const MIN_ZOOM: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

pub fn camera_pixels_per_world(camera: &Camera2D) -> f32 {
    let zoom = if camera.zoom.is_finite() {
        camera.zoom.max(MIN_ZOOM)
    } else {
        MIN_ZOOM
    };
    PIXELS_PER_WORLD * zoom
}

/// Maps a ground-plane point (world x, world z) to screen pixels. World -z is
/// screen up, so a player at yaw 0 faces the top of the screen.
pub fn world_to_screen(ground: Vec2, camera: &Camera2D, viewport: Viewport) -> (i32, i32) {
    let ppw = camera_pixels_per_world(camera);
    let x = (ground.x - camera.position.x) * ppw + viewport.width as f32 * 0.5;
    let y = (ground.y - camera.position.y) * ppw + viewport.height as f32 * 0.5;
    (x.round() as i32, y.round() as i32)
}

pub fn world_len_to_px(length: f32, camera: &Camera2D) -> i32 {
    (length * camera_pixels_per_world(camera)).round() as i32
}
