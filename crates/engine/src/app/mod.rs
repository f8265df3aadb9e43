mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;
mod tools;

pub use input::{InputAction, InputEdge};
pub use loop_runner::{run_app, AppError, LoopConfig, RENDER_FPS_CAP_ENV_VAR, SLOW_FRAME_ENV_VAR};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{world_to_screen, Renderer, Viewport, PIXELS_PER_WORLD};
pub use scene::{
    Camera2D, Entity, EntityId, FloorRect, HudPanel, HudState, InputSnapshot, RenderableDesc,
    RenderableKind, Scene, SceneCommand, SceneVisualState, SceneWorld, Transform, Vec2, Vec3,
};
