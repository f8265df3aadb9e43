use serde::Serialize;
use tracing::{debug, info};

use super::simulation::{SimEvent, SimulationState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub(crate) enum GameLifecycleState {
    Loading,
    Menu,
    Playing,
    Paused,
    Failed,
    Succeeded,
}

impl GameLifecycleState {
    pub(crate) fn is_terminal(self) -> bool {
        matches!(self, GameLifecycleState::Failed | GameLifecycleState::Succeeded)
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            GameLifecycleState::Loading => "loading",
            GameLifecycleState::Menu => "menu",
            GameLifecycleState::Playing => "playing",
            GameLifecycleState::Paused => "paused",
            GameLifecycleState::Failed => "failed",
            GameLifecycleState::Succeeded => "succeeded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub(crate) enum LifecycleEvent {
    AssetsReady,
    StartCommand,
    PauseToggle,
    CaptureEvent,
    FinalDoorSuccess,
    RestartCommand,
}

/// Transition table. `None` means the event is not legal from `state`.
pub(crate) fn next_state(
    state: GameLifecycleState,
    event: LifecycleEvent,
) -> Option<GameLifecycleState> {
    use GameLifecycleState as S;
    use LifecycleEvent as E;

    match (state, event) {
        (S::Loading, E::AssetsReady) => Some(S::Menu),
        (S::Menu, E::StartCommand) => Some(S::Playing),
        (S::Playing, E::PauseToggle) => Some(S::Paused),
        (S::Paused, E::PauseToggle) => Some(S::Playing),
        (S::Playing, E::CaptureEvent) => Some(S::Failed),
        (S::Playing, E::FinalDoorSuccess) => Some(S::Succeeded),
        (S::Failed | S::Succeeded, E::RestartCommand) => Some(S::Playing),
        _ => None,
    }
}

/// Applies `event` to the lifecycle. Illegal events are ignored and return
/// `false`; legal ones emit [`SimEvent::LifecycleChanged`].
///
/// This only moves the lifecycle. Resetting the playthrough on restart is the
/// outcome controller's job.
pub(crate) fn transition_to(state: &mut SimulationState, event: LifecycleEvent) -> bool {
    let from = state.lifecycle;
    let Some(to) = next_state(from, event) else {
        debug!(from = from.label(), ?event, "lifecycle_transition_ignored");
        return false;
    };

    state.lifecycle = to;
    info!(from = from.label(), to = to.label(), ?event, "lifecycle_changed");
    state.events.emit(SimEvent::LifecycleChanged { from, to });
    true
}
