use engine::Vec3;
use serde::Serialize;
use tracing::info;

use super::level::ANTAGONIST_SPAWN;
use super::lifecycle::GameLifecycleState;
use super::outcome;
use super::simulation::{SimEvent, SimulationState};

pub(crate) const CHASE_SPEED: f32 = 12.0;
pub(crate) const CAPTURE_RADIUS: f32 = 2.5;
/// Beyond this distance the danger signal is zero.
pub(crate) const DANGER_RADIUS: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct AntagonistState {
    pub(crate) position: Vec3,
    pub(crate) yaw: f32,
    pub(crate) active: bool,
}

impl Default for AntagonistState {
    fn default() -> Self {
        Self {
            position: ANTAGONIST_SPAWN,
            yaw: 0.0,
            active: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PursuitOutcome {
    Inactive,
    Chasing { distance: f32 },
    Captured,
}

/// One-shot wake-up. Returns `false` if already active.
pub(crate) fn activate(state: &mut SimulationState) -> bool {
    if state.antagonist.active {
        return false;
    }
    state.antagonist.active = true;
    info!(
        player_z = state.player.position.z,
        antagonist_z = state.antagonist.position.z,
        "antagonist_activated"
    );
    state.events.emit(SimEvent::AntagonistActivated);
    true
}

pub(crate) fn update(state: &mut SimulationState, dt: f32) -> PursuitOutcome {
    if !state.antagonist.active || state.lifecycle != GameLifecycleState::Playing {
        return PursuitOutcome::Inactive;
    }
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

    let target = state.player.position;
    let antagonist = &mut state.antagonist;
    let to_player = (target - antagonist.position).horizontal();
    if let Some(direction) = to_player.try_normalize() {
        let advance = (CHASE_SPEED * dt).min(to_player.length());
        antagonist.position = antagonist.position + direction * advance;
        antagonist.yaw = (-direction.x).atan2(-direction.z);
    }

    let distance = antagonist.position.distance(target);
    if capture_if_within_reach(state, distance) {
        return PursuitOutcome::Captured;
    }
    PursuitOutcome::Chasing { distance }
}

/// Capture test against the current positions, without moving anyone.
pub(crate) fn check_capture(state: &mut SimulationState) -> bool {
    if state.lifecycle != GameLifecycleState::Playing {
        return false;
    }
    match distance_to_player(state) {
        Some(distance) => capture_if_within_reach(state, distance),
        None => false,
    }
}

fn capture_if_within_reach(state: &mut SimulationState, distance: f32) -> bool {
    if distance >= CAPTURE_RADIUS {
        return false;
    }
    info!(distance, "player_captured");
    state.events.emit(SimEvent::Captured);
    outcome::fail(state);
    true
}

/// Presentation intensity in `[0, 1]`: zero outside the danger band, rising
/// linearly to one as the antagonist closes to the capture radius.
pub(crate) fn danger_signal(distance: f32) -> f32 {
    if !distance.is_finite() || distance <= CAPTURE_RADIUS || distance >= DANGER_RADIUS {
        return 0.0;
    }
    (DANGER_RADIUS - distance) / (DANGER_RADIUS - CAPTURE_RADIUS)
}

/// 3D distance to the player while the antagonist is awake.
pub(crate) fn distance_to_player(state: &SimulationState) -> Option<f32> {
    state
        .antagonist
        .active
        .then(|| state.antagonist.position.distance(state.player.position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::gameplay::level::{LevelPhase, EYE_HEIGHT};

    const DT: f32 = 1.0 / 60.0;

    fn chasing_state(player_z: f32) -> SimulationState {
        let mut state = SimulationState::new();
        state.lifecycle = GameLifecycleState::Playing;
        state.phase = LevelPhase::Corridor;
        state.player.relocate(Vec3::new(0.0, EYE_HEIGHT, player_z));
        state.antagonist.active = true;
        state
    }

    #[test]
    fn inactive_antagonist_does_not_move() {
        let mut state = chasing_state(-40.0);
        state.antagonist.active = false;
        assert_eq!(update(&mut state, DT), PursuitOutcome::Inactive);
        assert_eq!(state.antagonist.position, ANTAGONIST_SPAWN);
    }

    #[test]
    fn chase_closes_distance_at_chase_speed() {
        let mut state = chasing_state(-61.0);
        let before = state.antagonist.position;
        update(&mut state, 0.5);
        let moved = before.distance(state.antagonist.position);
        assert!((moved - CHASE_SPEED * 0.5).abs() < 1e-4);
        assert!(state.antagonist.position.z < before.z);
        assert_eq!(state.antagonist.position.y, 0.0);
    }

    #[test]
    fn antagonist_faces_the_player_with_yaw_only() {
        let mut state = chasing_state(-61.0);
        update(&mut state, DT);
        assert!(state.antagonist.yaw.abs() < 1e-4);

        state.player.relocate(Vec3::new(3.0, EYE_HEIGHT, state.antagonist.position.z));
        update(&mut state, DT);
        assert!((state.antagonist.yaw + std::f32::consts::FRAC_PI_2).abs() < 1e-3);
    }

    #[test]
    fn capture_inside_radius_fails_the_run_once() {
        let mut state = chasing_state(-21.0);
        assert_eq!(update(&mut state, DT), PursuitOutcome::Captured);
        assert_eq!(state.lifecycle, GameLifecycleState::Failed);

        let captured = state
            .events
            .drain()
            .into_iter()
            .filter(|event| *event == SimEvent::Captured)
            .count();
        assert_eq!(captured, 1);
        assert_eq!(update(&mut state, DT), PursuitOutcome::Inactive);
    }

    #[test]
    fn check_capture_uses_positions_as_they_stand() {
        let mut state = chasing_state(-40.0);
        assert!(!check_capture(&mut state));
        assert_eq!(state.antagonist.position, ANTAGONIST_SPAWN);

        state.antagonist.position = Vec3::new(0.0, 0.0, -41.5);
        assert!(check_capture(&mut state));
        assert_eq!(state.lifecycle, GameLifecycleState::Failed);
        assert!(!check_capture(&mut state));
    }

    #[test]
    fn activation_is_one_shot() {
        let mut state = SimulationState::new();
        assert!(activate(&mut state));
        assert!(!activate(&mut state));
        assert_eq!(state.events.drain(), vec![SimEvent::AntagonistActivated]);
    }

    #[test]
    fn danger_signal_is_zero_outside_band_and_linear_inside() {
        assert_eq!(danger_signal(2.5), 0.0);
        assert_eq!(danger_signal(1.0), 0.0);
        assert_eq!(danger_signal(10.0), 0.0);
        assert_eq!(danger_signal(f32::NAN), 0.0);
        assert!((danger_signal(6.25) - 0.5).abs() < 1e-6);
        assert!(danger_signal(3.0) > danger_signal(8.0));
        assert!(danger_signal(2.5001) <= 1.0);
    }

    #[test]
    fn distance_is_reported_only_while_active() {
        let mut state = chasing_state(-30.0);
        assert!(distance_to_player(&state).is_some());
        state.antagonist.active = false;
        assert_eq!(distance_to_player(&state), None);
    }
}
