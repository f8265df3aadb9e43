use std::f32::consts::FRAC_PI_2;

use engine::{InputAction, InputSnapshot, Vec3};
use serde::Serialize;

use super::level::{LevelPhase, ZoneBounds, ANTAGONIST_TRIGGER_Z, PLAYER_SPAWN};
use super::lifecycle::GameLifecycleState;
use super::pursuit;
use super::simulation::SimulationState;

pub(crate) const WALK_SPEED: f32 = 5.0;
pub(crate) const RUN_SPEED: f32 = 10.0;
const VELOCITY_DECAY_RATE: f32 = 10.0;
pub(crate) const MOUSE_SENSITIVITY: f32 = 0.002;
pub(crate) const KEY_TURN_SPEED: f32 = 2.0;
pub(crate) const PITCH_LIMIT: f32 = FRAC_PI_2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ControlIntent {
    pub(crate) forward: bool,
    pub(crate) backward: bool,
    pub(crate) left: bool,
    pub(crate) right: bool,
    pub(crate) run: bool,
}

impl ControlIntent {
    pub(crate) fn from_input(input: &InputSnapshot) -> Self {
        Self {
            forward: input.is_down(InputAction::MoveForward),
            backward: input.is_down(InputAction::MoveBackward),
            left: input.is_down(InputAction::MoveLeft),
            right: input.is_down(InputAction::MoveRight),
            run: input.is_down(InputAction::Run),
        }
    }

    fn speed(self) -> f32 {
        if self.run {
            RUN_SPEED
        } else {
            WALK_SPEED
        }
    }
}

/// Camera rotation requested this tick, in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct LookIntent {
    pub(crate) yaw_delta: f32,
    pub(crate) pitch_delta: f32,
}

impl LookIntent {
    pub(crate) fn from_input(input: &InputSnapshot, dt: f32) -> Self {
        let look = input.look_delta_px();
        let mut yaw_delta = -look.x * MOUSE_SENSITIVITY;
        if input.is_down(InputAction::TurnLeft) {
            yaw_delta += KEY_TURN_SPEED * dt;
        }
        if input.is_down(InputAction::TurnRight) {
            yaw_delta -= KEY_TURN_SPEED * dt;
        }
        Self {
            yaw_delta,
            pitch_delta: -look.y * MOUSE_SENSITIVITY,
        }
    }
}

/// Velocity in the player's own frame. `forward` runs along the horizontal
/// view direction, `lateral` along the right vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub(crate) struct LocalVelocity {
    pub(crate) forward: f32,
    pub(crate) lateral: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct PlayerState {
    /// Eye position.
    pub(crate) position: Vec3,
    pub(crate) yaw: f32,
    pub(crate) pitch: f32,
    pub(crate) velocity: LocalVelocity,
    pub(crate) running: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            position: PLAYER_SPAWN,
            yaw: 0.0,
            pitch: 0.0,
            velocity: LocalVelocity::default(),
            running: false,
        }
    }
}

impl PlayerState {
    pub(crate) fn horizontal_forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    pub(crate) fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    pub(crate) fn view_forward(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(-sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
    }

    /// Teleport used by phase transitions. Momentum does not carry over.
    pub(crate) fn relocate(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = LocalVelocity::default();
    }

    pub(crate) fn apply_look(&mut self, look: LookIntent) {
        if !look.yaw_delta.is_finite() || !look.pitch_delta.is_finite() {
            return;
        }
        self.yaw = (self.yaw + look.yaw_delta).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + look.pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MoveOutcome {
    /// Not playing, or no displacement this tick.
    Idle,
    Moved,
    /// Candidate left the active zone; position kept.
    Blocked,
}

/// Integrates one tick of player motion and gates it against the active
/// phase's zone. Also fires the one-shot antagonist trigger.
pub(crate) fn step(state: &mut SimulationState, intent: ControlIntent, dt: f32) -> MoveOutcome {
    if state.lifecycle != GameLifecycleState::Playing {
        return MoveOutcome::Idle;
    }
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

    let player = &mut state.player;
    player.running = intent.run;

    let retain = (1.0 - VELOCITY_DECAY_RATE * dt).max(0.0);
    player.velocity.forward *= retain;
    player.velocity.lateral *= retain;

    let along = f32::from(u8::from(intent.forward)) - f32::from(u8::from(intent.backward));
    let across = f32::from(u8::from(intent.right)) - f32::from(u8::from(intent.left));
    let norm = (along * along + across * across).sqrt();
    if norm > 0.0 {
        let impulse = intent.speed() * dt / norm;
        if intent.forward || intent.backward {
            player.velocity.forward += along * impulse;
        }
        if intent.left || intent.right {
            player.velocity.lateral += across * impulse;
        }
    }

    // Velocity is a per-tick displacement; it is not scaled by dt again.
    let displacement = player.horizontal_forward() * player.velocity.forward
        + player.right() * player.velocity.lateral;

    let outcome = if displacement.length() <= f32::EPSILON {
        MoveOutcome::Idle
    } else {
        let candidate = player.position + displacement;
        if ZoneBounds::for_phase(state.phase).contains(candidate) {
            player.position = candidate;
            MoveOutcome::Moved
        } else {
            MoveOutcome::Blocked
        }
    };

    if state.phase == LevelPhase::Corridor
        && !state.antagonist.active
        && state.player.position.z < ANTAGONIST_TRIGGER_Z
    {
        pursuit::activate(state);
    }

    outcome
}
