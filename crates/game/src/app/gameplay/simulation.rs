use serde::Serialize;
use tracing::{debug, warn};

use super::interaction::{self, default_interactables, DoorSet, Interactable, InteractionTarget};
use super::level::LevelPhase;
use super::lifecycle::{transition_to, GameLifecycleState, LifecycleEvent};
use super::movement::{self, ControlIntent, LookIntent, MoveOutcome, PlayerState};
use super::outcome::{self, PendingActions, TimedAction};
use super::pursuit::{self, AntagonistState, PursuitOutcome};

/// Longest step the simulation accepts in one tick.
const MAX_TICK_SECONDS: f32 = 0.25;

/// Notifications for presentation collaborators, drained once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum SimEvent {
    LifecycleChanged {
        from: GameLifecycleState,
        to: GameLifecycleState,
    },
    PhaseChanged {
        from: LevelPhase,
        to: LevelPhase,
    },
    DoorResolved {
        set: DoorSet,
        index: usize,
        correct: bool,
    },
    AntagonistActivated,
    Captured,
    Restarted,
}

#[derive(Debug, Default)]
pub(crate) struct SimEventBus {
    events: Vec<SimEvent>,
}

impl SimEventBus {
    pub(crate) fn emit(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub(crate) fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}

/// All mutable game state. Owned by [`Simulation`] and passed by reference
/// to each component.
#[derive(Debug)]
pub(crate) struct SimulationState {
    pub(crate) lifecycle: GameLifecycleState,
    pub(crate) phase: LevelPhase,
    pub(crate) player: PlayerState,
    pub(crate) antagonist: AntagonistState,
    pub(crate) interactables: Vec<Interactable>,
    pub(crate) target: Option<InteractionTarget>,
    pub(crate) resolution_pending: bool,
    pub(crate) pending: PendingActions,
    /// Seconds of play. Frozen outside `Playing`, so pauses hold pacing delays.
    pub(crate) clock_seconds: f64,
    pub(crate) events: SimEventBus,
}

impl SimulationState {
    pub(crate) fn new() -> Self {
        Self {
            lifecycle: GameLifecycleState::Loading,
            phase: LevelPhase::FirstRoom,
            player: PlayerState::default(),
            antagonist: AntagonistState::default(),
            interactables: default_interactables(),
            target: None,
            resolution_pending: false,
            pending: PendingActions::default(),
            clock_seconds: 0.0,
            events: SimEventBus::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct SimulationInput {
    pub(crate) intent: ControlIntent,
    pub(crate) look: LookIntent,
    pub(crate) interact: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TickReport {
    pub(crate) movement: MoveOutcome,
    pub(crate) pursuit: PursuitOutcome,
    pub(crate) interacted: bool,
}

impl TickReport {
    const SUSPENDED: TickReport = TickReport {
        movement: MoveOutcome::Idle,
        pursuit: PursuitOutcome::Inactive,
        interacted: false,
    };
}

/// Serializable view of the whole simulation for the debug dump.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SimulationSnapshot {
    pub(crate) lifecycle: GameLifecycleState,
    pub(crate) phase: LevelPhase,
    pub(crate) clock_seconds: f64,
    pub(crate) player: PlayerState,
    pub(crate) antagonist: AntagonistState,
    pub(crate) danger: f32,
    pub(crate) interactables: Vec<Interactable>,
    pub(crate) target: Option<InteractionTarget>,
    pub(crate) resolution_pending: bool,
    pub(crate) pending: Vec<TimedAction>,
}

#[derive(Debug)]
pub(crate) struct Simulation {
    state: SimulationState,
}

impl Simulation {
    pub(crate) fn new() -> Self {
        Self {
            state: SimulationState::new(),
        }
    }

    pub(crate) fn state(&self) -> &SimulationState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub(crate) fn lifecycle(&self) -> GameLifecycleState {
        self.state.lifecycle
    }

    /// Routes a lifecycle event to the component that owns its side effects.
    /// Returns `false` when the event is not legal right now.
    pub(crate) fn request(&mut self, event: LifecycleEvent) -> bool {
        match event {
            LifecycleEvent::RestartCommand => {
                if !self.state.lifecycle.is_terminal() {
                    debug!(
                        from = self.state.lifecycle.label(),
                        ?event,
                        "lifecycle_transition_ignored"
                    );
                    return false;
                }
                outcome::restart(&mut self.state);
                true
            }
            LifecycleEvent::CaptureEvent => outcome::fail(&mut self.state),
            LifecycleEvent::FinalDoorSuccess => outcome::succeed(&mut self.state),
            LifecycleEvent::AssetsReady
            | LifecycleEvent::StartCommand
            | LifecycleEvent::PauseToggle => transition_to(&mut self.state, event),
        }
    }

    /// Unconditional reset back into play.
    pub(crate) fn restart(&mut self) {
        outcome::restart(&mut self.state);
    }

    /// Runs one tick: capture check, look, movement, prompt query,
    /// interaction, pursuit, then due pacing actions. Does nothing outside
    /// `Playing`.
    pub(crate) fn tick(&mut self, input: &SimulationInput, dt: f32) -> TickReport {
        let state = &mut self.state;
        if state.lifecycle != GameLifecycleState::Playing {
            state.target = None;
            return TickReport::SUSPENDED;
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let dt = if dt > MAX_TICK_SECONDS {
            warn!(dt, max = MAX_TICK_SECONDS, "tick_delta_clamped");
            MAX_TICK_SECONDS
        } else {
            dt
        };
        state.clock_seconds += f64::from(dt);

        if pursuit::check_capture(state) {
            return TickReport {
                pursuit: PursuitOutcome::Captured,
                ..TickReport::SUSPENDED
            };
        }

        state.player.apply_look(input.look);
        let movement = movement::step(state, input.intent, dt);
        interaction::refresh_target(state);
        let interacted = input.interact && interaction::resolve_interaction(state);
        let pursuit = pursuit::update(state, dt);
        outcome::run_due_actions(state);

        TickReport {
            movement,
            pursuit,
            interacted,
        }
    }

    /// Vignette intensity for the display; zero unless the antagonist is
    /// awake and within the danger band during play.
    pub(crate) fn danger_level(&self) -> f32 {
        if self.state.lifecycle != GameLifecycleState::Playing {
            return 0.0;
        }
        pursuit::distance_to_player(&self.state)
            .map(pursuit::danger_signal)
            .unwrap_or(0.0)
    }

    pub(crate) fn drain_events(&mut self) -> Vec<SimEvent> {
        self.state.events.drain()
    }

    pub(crate) fn snapshot(&self) -> SimulationSnapshot {
        let state = &self.state;
        SimulationSnapshot {
            lifecycle: state.lifecycle,
            phase: state.phase,
            clock_seconds: state.clock_seconds,
            player: state.player,
            antagonist: state.antagonist,
            danger: self.danger_level(),
            interactables: state.interactables.clone(),
            target: state.target,
            resolution_pending: state.resolution_pending,
            pending: state.pending.iter().copied().collect(),
        }
    }
}
