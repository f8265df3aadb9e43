use std::env;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{debug, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{DeviceEvent, ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowBuilder};

use super::input::{ActionStates, EdgeStates};
use super::metrics::MetricsAccumulator;
use super::scene::SceneHost;
use super::tools::OverlayData;
use super::{InputAction, InputEdge, InputSnapshot, Renderer, Scene, SceneCommand, Vec2};

pub const SLOW_FRAME_ENV_VAR: &str = "AWAKENED_SLOW_FRAME_MS";
pub const RENDER_FPS_CAP_ENV_VAR: &str = "AWAKENED_RENDER_FPS_CAP";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Awakened Room".to_string(),
            window_width: 1280,
            window_height: 720,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            simulated_slow_frame_ms: 0,
            max_render_fps: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig, scene: Box<dyn Scene>) -> Result<(), AppError> {
    let mut host = SceneHost::new(scene);

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    let slow_frame_delay = resolve_slow_frame_delay(config.simulated_slow_frame_ms);
    let effective_render_cap = resolve_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);
    let mut input_collector = InputCollector::default();

    host.load();
    info!(
        entity_count = host.world().entity_count(),
        "scene_loaded"
    );
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        render_fps_cap = %format_render_cap(effective_render_cap),
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval, Instant::now());
    let mut last_applied_title: Option<String> = None;
    let mut overlay_visible = false;
    let mut pointer_locked = false;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::Focused(false) => {
                    input_collector.release_all();
                    if pointer_locked {
                        apply_pointer_lock(&window, false);
                        pointer_locked = false;
                    }
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input_collector.handle_mouse_input(button, state, pointer_locked);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_key(event.physical_key, event.state);
                }
                WindowEvent::RedrawRequested => {
                    if input_collector.take_overlay_toggle_pressed() {
                        overlay_visible = !overlay_visible;
                        info!(overlay_visible, "overlay_toggled");
                    }

                    if slow_frame_delay > Duration::ZERO {
                        // Debug perturbation only; not the FPS cap.
                        thread::sleep(slow_frame_delay);
                    }

                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    accumulator = accumulator.saturating_add(clamped_frame_dt);

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    let mut executed = 0u32;
                    for _ in 0..step_plan.ticks_to_run {
                        let input_snapshot = input_collector.snapshot_for_tick();
                        let command = host.update(fixed_dt_seconds, &input_snapshot);
                        executed += 1;
                        if command == SceneCommand::Quit {
                            info!(reason = "scene_quit", "shutdown_requested");
                            window_target.exit();
                            break;
                        }
                    }
                    accumulator = step_plan.remaining_accumulator;
                    let dropped_ticks = step_plan.dropped_ticks(fixed_dt);
                    metrics_accumulator.record_ticks(executed, dropped_ticks);

                    if step_plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    let wants_lock = host.wants_pointer_lock();
                    if wants_lock != pointer_locked {
                        pointer_locked = apply_pointer_lock(&window, wants_lock);
                        if !pointer_locked {
                            input_collector.discard_look_delta();
                        }
                    }

                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep =
                        compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    let overlay = overlay_visible.then(|| OverlayData {
                        metrics: metrics_accumulator.latest(),
                        render_fps_cap: effective_render_cap,
                        slow_frame_delay_ms: slow_frame_delay.as_millis() as u64,
                        entity_count: host.world().entity_count(),
                        scene_title: host.debug_title(),
                        scene_lines: host.debug_lines(),
                    });
                    if let Err(error) = renderer.render_world(host.world(), overlay.as_ref()) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    last_present_instant = Instant::now();

                    let next_title = host.debug_title();
                    if next_title != last_applied_title {
                        match &next_title {
                            Some(title) => window.set_title(title),
                            None => window.set_title(&config.window_title),
                        }
                        last_applied_title = next_title;
                    }
                    metrics_accumulator.record_frame(raw_frame_dt);

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            dropped_ticks = snapshot.dropped_ticks,
                            entity_count = host.world().entity_count(),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } => {
                if pointer_locked {
                    input_collector.add_look_delta(delta.0 as f32, delta.1 as f32);
                }
            }
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                if pointer_locked {
                    apply_pointer_lock(&window, false);
                }
                host.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Returns whether the pointer ended up captured.
fn apply_pointer_lock(window: &Window, lock: bool) -> bool {
    if !lock {
        if let Err(error) = window.set_cursor_grab(CursorGrabMode::None) {
            warn!(error = %error, "pointer_release_failed");
        }
        window.set_cursor_visible(true);
        debug!("pointer_released");
        return false;
    }

    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    match grabbed {
        Ok(()) => {
            window.set_cursor_visible(false);
            debug!("pointer_locked");
            true
        }
        Err(error) => {
            warn!(error = %error, "pointer_lock_failed");
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyBinding {
    Action(InputAction),
    Edge(InputEdge),
    ToggleOverlay,
}

fn binding_for_key(key: PhysicalKey) -> Option<KeyBinding> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    let binding = match code {
        KeyCode::KeyW | KeyCode::ArrowUp => KeyBinding::Action(InputAction::MoveForward),
        KeyCode::KeyS | KeyCode::ArrowDown => KeyBinding::Action(InputAction::MoveBackward),
        KeyCode::KeyA | KeyCode::ArrowLeft => KeyBinding::Action(InputAction::MoveLeft),
        KeyCode::KeyD | KeyCode::ArrowRight => KeyBinding::Action(InputAction::MoveRight),
        KeyCode::ShiftLeft | KeyCode::ShiftRight => KeyBinding::Action(InputAction::Run),
        KeyCode::KeyJ => KeyBinding::Action(InputAction::TurnLeft),
        KeyCode::KeyL => KeyBinding::Action(InputAction::TurnRight),
        KeyCode::KeyE => KeyBinding::Edge(InputEdge::Interact),
        KeyCode::Enter | KeyCode::NumpadEnter | KeyCode::Space => {
            KeyBinding::Edge(InputEdge::Confirm)
        }
        KeyCode::KeyP => KeyBinding::Edge(InputEdge::Pause),
        KeyCode::KeyR => KeyBinding::Edge(InputEdge::Restart),
        KeyCode::Escape => KeyBinding::Edge(InputEdge::Back),
        KeyCode::F8 => KeyBinding::Edge(InputEdge::DumpState),
        KeyCode::F3 => KeyBinding::ToggleOverlay,
        _ => return None,
    };
    Some(binding)
}

#[derive(Debug, Default)]
struct InputCollector {
    held_keys: Vec<KeyCode>,
    action_states: ActionStates,
    edge_states: EdgeStates,
    overlay_toggle_pressed_edge: bool,
    left_mouse_is_down: bool,
    look_delta_px: Vec2,
}

impl InputCollector {

    fn handle_key(&mut self, key: PhysicalKey, state: ElementState) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        let is_pressed = state == ElementState::Pressed;
        let fresh_press = match state {
            ElementState::Pressed if !self.held_keys.contains(&code) => {
                self.held_keys.push(code);
                true
            }
            ElementState::Pressed => false,
            ElementState::Released => {
                self.held_keys.retain(|held| *held != code);
                false
            }
        };

        match binding_for_key(key) {
            Some(KeyBinding::Action(action)) => self.action_states.set(action, is_pressed),
            Some(KeyBinding::Edge(edge)) if fresh_press => self.edge_states.mark(edge),
            Some(KeyBinding::ToggleOverlay) if fresh_press => {
                self.overlay_toggle_pressed_edge = true;
            }
            _ => {}
        }
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState, pointer_locked: bool) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.left_mouse_is_down && pointer_locked {
                    self.edge_states.mark(InputEdge::Interact);
                }
                self.left_mouse_is_down = true;
            }
            ElementState::Released => self.left_mouse_is_down = false,
        }
    }

    fn add_look_delta(&mut self, dx: f32, dy: f32) {
        self.look_delta_px.x += dx;
        self.look_delta_px.y += dy;
    }

    fn discard_look_delta(&mut self) {
        self.look_delta_px = Vec2::default();
    }

    /// Drops held keys so nothing stays stuck down after focus loss.
    fn release_all(&mut self) {
        self.held_keys.clear();
        self.action_states = ActionStates::default();
        self.left_mouse_is_down = false;
        self.discard_look_delta();
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.action_states,
            self.edge_states,
            self.look_delta_px,
        );
        self.edge_states = EdgeStates::default();
        self.look_delta_px = Vec2::default();
        snapshot
    }

    fn take_overlay_toggle_pressed(&mut self) -> bool {
        let was_pressed = self.overlay_toggle_pressed_edge;
        self.overlay_toggle_pressed_edge = false;
        was_pressed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

impl StepPlan {
    fn dropped_ticks(&self, fixed_dt: Duration) -> u32 {
        if fixed_dt.is_zero() {
            return 0;
        }
        (self.dropped_backlog.as_nanos() / fixed_dt.as_nanos()).min(u32::MAX as u128) as u32
    }
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;
    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}

/// Parses an unsigned env override. Unset or malformed values yield `None`;
/// malformed ones are logged.
fn read_u64_env(var: &'static str) -> Option<u64> {
    match env::var(var) {
        Ok(value) => match value.trim().parse::<u64>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                warn!(
                    env_var = var,
                    value = value.as_str(),
                    "invalid env var value; falling back to config"
                );
                None
            }
        },
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(env_var = var, error = %err, "unable to read env var; falling back to config");
            None
        }
    }
}

fn resolve_slow_frame_delay(config_slow_frame_ms: u64) -> Duration {
    Duration::from_millis(read_u64_env(SLOW_FRAME_ENV_VAR).unwrap_or(config_slow_frame_ms))
}

fn resolve_render_fps_cap(config_cap: Option<u32>) -> Option<u32> {
    let from_env = read_u64_env(RENDER_FPS_CAP_ENV_VAR).map(|fps| fps.min(u32::MAX as u64) as u32);
    match from_env {
        Some(fps) => normalize_render_fps_cap(Some(fps)),
        None => normalize_render_fps_cap(config_cap),
    }
}
