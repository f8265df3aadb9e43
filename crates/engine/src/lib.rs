pub mod app;
pub mod raycast;

pub use app::{
    run_app, world_to_screen, AppError, Camera2D, Entity, EntityId, FloorRect, HudPanel,
    HudState, InputAction, InputEdge, InputSnapshot, LoopConfig, LoopMetricsSnapshot,
    RenderableDesc, RenderableKind, Renderer, Scene, SceneCommand, SceneVisualState, SceneWorld,
    Transform, Vec2, Vec3, Viewport, PIXELS_PER_WORLD, RENDER_FPS_CAP_ENV_VAR, SLOW_FRAME_ENV_VAR,
};
pub use raycast::{raycast_nearest, Ray, RaycastBox, RaycastHit};
