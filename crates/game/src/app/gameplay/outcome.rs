use serde::Serialize;
use tracing::{debug, info};

use super::level::{LevelPhase, CORRIDOR_ENTRY, SECOND_ROOM_ENTRY};
use super::lifecycle::{transition_to, GameLifecycleState, LifecycleEvent};
use super::movement::PlayerState;
use super::pursuit::AntagonistState;
use super::simulation::{SimEvent, SimulationState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) enum ScheduledAction {
    EnterCorridor,
    EnterSecondRoom,
    Capture,
    FinalDoorSuccess,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct TimedAction {
    pub(crate) due_at_seconds: f64,
    pub(crate) action: ScheduledAction,
}

/// Outstanding pacing actions keyed to the simulation clock.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(crate) struct PendingActions {
    actions: Vec<TimedAction>,
}

impl PendingActions {
    pub(crate) fn schedule(&mut self, now: f64, delay_seconds: f64, action: ScheduledAction) {
        self.actions.push(TimedAction {
            due_at_seconds: now + delay_seconds.max(0.0),
            action,
        });
    }

    /// Removes and returns the earliest action due at `now`. Ties keep
    /// scheduling order.
    pub(crate) fn pop_due(&mut self, now: f64) -> Option<ScheduledAction> {
        let mut earliest: Option<usize> = None;
        for (index, timed) in self.actions.iter().enumerate() {
            if timed.due_at_seconds > now {
                continue;
            }
            match earliest {
                Some(best) if self.actions[best].due_at_seconds <= timed.due_at_seconds => {}
                _ => earliest = Some(index),
            }
        }
        earliest.map(|index| self.actions.remove(index).action)
    }

    pub(crate) fn cancel_all(&mut self) -> usize {
        let cancelled = self.actions.len();
        self.actions.clear();
        cancelled
    }

    pub(crate) fn len(&self) -> usize {
        self.actions.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TimedAction> {
        self.actions.iter()
    }
}

fn cancel_pending(state: &mut SimulationState, reason: &'static str) {
    if state.pending.is_empty() {
        return;
    }
    let cancelled = state.pending.cancel_all();
    debug!(cancelled, reason, "timed_actions_cancelled");
}

pub(crate) fn fail(state: &mut SimulationState) -> bool {
    if !transition_to(state, LifecycleEvent::CaptureEvent) {
        return false;
    }
    cancel_pending(state, "failed");
    state.resolution_pending = false;
    state.target = None;
    true
}

pub(crate) fn succeed(state: &mut SimulationState) -> bool {
    if !transition_to(state, LifecycleEvent::FinalDoorSuccess) {
        return false;
    }
    cancel_pending(state, "succeeded");
    state.resolution_pending = false;
    state.target = None;
    true
}

/// Resets the playthrough from any state and resumes play in the first room.
pub(crate) fn restart(state: &mut SimulationState) {
    cancel_pending(state, "restart");
    state.player = PlayerState::default();
    state.antagonist = AntagonistState::default();
    for interactable in &mut state.interactables {
        interactable.reset();
    }
    state.target = None;
    state.resolution_pending = false;

    let previous_phase = state.phase;
    state.phase = LevelPhase::FirstRoom;
    if previous_phase != LevelPhase::FirstRoom {
        state.events.emit(SimEvent::PhaseChanged {
            from: previous_phase,
            to: LevelPhase::FirstRoom,
        });
    }

    let from = state.lifecycle;
    state.lifecycle = GameLifecycleState::Playing;
    if from != GameLifecycleState::Playing {
        state.events.emit(SimEvent::LifecycleChanged {
            from,
            to: GameLifecycleState::Playing,
        });
    }
    info!(from = from.label(), "playthrough_restarted");
    state.events.emit(SimEvent::Restarted);
}

fn change_phase(state: &mut SimulationState, to: LevelPhase) {
    let from = state.phase;
    state.phase = to;
    info!(from = from.label(), to = to.label(), "phase_changed");
    state.events.emit(SimEvent::PhaseChanged { from, to });
}

/// Fires every action due at the current clock, earliest first. Stops once
/// the run reaches a terminal state.
pub(crate) fn run_due_actions(state: &mut SimulationState) {
    while state.lifecycle == GameLifecycleState::Playing {
        let Some(action) = state.pending.pop_due(state.clock_seconds) else {
            break;
        };
        debug!(?action, clock_seconds = state.clock_seconds, "timed_action_fired");
        match action {
            ScheduledAction::EnterCorridor => {
                state.player.relocate(CORRIDOR_ENTRY);
                change_phase(state, LevelPhase::Corridor);
                state.resolution_pending = false;
            }
            ScheduledAction::EnterSecondRoom => {
                state.player.relocate(SECOND_ROOM_ENTRY);
                change_phase(state, LevelPhase::SecondRoom);
            }
            ScheduledAction::Capture => {
                fail(state);
            }
            ScheduledAction::FinalDoorSuccess => {
                succeed(state);
            }
        }
    }
}
