use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::tools::text::Canvas;
use crate::app::tools::{draw_overlay, OverlayData};
use crate::app::{Camera2D, Entity, RenderableKind, SceneWorld};

use super::hud::draw_hud;
use super::{world_len_to_px, world_to_screen, Viewport, MARKER_HALF_SIZE_PX};

const CLEAR_COLOR: [u8; 4] = [6, 6, 9, 255];
const FLOOR_COLOR: [u8; 4] = [34, 32, 30, 255];
const FLOOR_EDGE_COLOR: [u8; 4] = [70, 64, 58, 255];
const HOVER_COLOR: [u8; 4] = [255, 214, 90, 255];
const FACING_TICK_WORLD: f32 = 0.9;

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_world(
        &mut self,
        world: &SceneWorld,
        overlay_data: Option<&OverlayData>,
    ) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        let viewport = self.viewport;
        let mut canvas = Canvas::new(self.pixels.frame_mut(), viewport.width, viewport.height);
        draw_world(&mut canvas, world, viewport);
        draw_hud(&mut canvas, world.hud());
        if let Some(data) = overlay_data {
            draw_overlay(&mut canvas, data);
        }

        self.pixels.render()
    }
}

fn draw_world(canvas: &mut Canvas<'_>, world: &SceneWorld, viewport: Viewport) {
    canvas.clear(CLEAR_COLOR);
    let camera = world.camera();

    for rect in world.floor_plan() {
        let (left, top) = world_to_screen(rect.min, camera, viewport);
        let (right, bottom) = world_to_screen(rect.max, camera, viewport);
        canvas.fill_rect(left, top, right - left, bottom - top, FLOOR_COLOR);
        canvas.rect_outline(left, top, right - left, bottom - top, FLOOR_EDGE_COLOR);
    }

    let hovered = world.visual_state().hovered_interactable;
    for entity in world.entities_in_draw_order() {
        if !entity.visible {
            continue;
        }
        draw_entity(canvas, camera, viewport, entity, hovered == Some(entity.id));
    }
}

fn draw_entity(
    canvas: &mut Canvas<'_>,
    camera: &Camera2D,
    viewport: Viewport,
    entity: &Entity,
    is_hovered: bool,
) {
    let (cx, cy) = world_to_screen(entity.transform.position.ground(), camera, viewport);
    let color = entity.renderable.color;

    match entity.renderable.kind {
        RenderableKind::Slab {
            half_width,
            half_depth,
        } => {
            let hw = world_len_to_px(half_width, camera).max(1);
            let hd = world_len_to_px(half_depth, camera).max(1);
            let (x, y, w, h) = (cx - hw, cy - hd, hw * 2, hd * 2);
            if entity.translucent {
                canvas.rect_outline(x, y, w, h, color);
            } else {
                canvas.fill_rect(x, y, w, h, color);
            }
            if is_hovered {
                canvas.rect_outline(x - 2, y - 2, w + 4, h + 4, HOVER_COLOR);
                canvas.rect_outline(x - 3, y - 3, w + 6, h + 6, HOVER_COLOR);
            }
        }
        RenderableKind::Marker => {
            let half = MARKER_HALF_SIZE_PX;
            canvas.fill_rect(cx - half, cy - half, half * 2 + 1, half * 2 + 1, color);
            if let Some(yaw) = entity.transform.yaw_radians {
                let reach = world_len_to_px(FACING_TICK_WORLD, camera) as f32;
                let tip = (
                    cx + (-yaw.sin() * reach).round() as i32,
                    cy + (-yaw.cos() * reach).round() as i32,
                );
                canvas.line((cx, cy), tip, color);
            }
            if is_hovered {
                canvas.rect_outline(cx - half - 2, cy - half - 2, half * 2 + 5, half * 2 + 5, HOVER_COLOR);
            }
        }
    }
}
