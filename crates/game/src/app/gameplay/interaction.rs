use engine::{raycast_nearest, Ray, RaycastBox, Vec3};
use serde::Serialize;
use tracing::{debug, info};

use super::level::{
    DOOR_CENTER_Y, DOOR_HALF_EXTENTS, ENTRY_CORRECT_INDEX, ENTRY_DOOR_XS, ENTRY_DOOR_Z,
    EXIT_CORRECT_INDEX, EXIT_DOOR_XS, EXIT_DOOR_Z,
};
use super::lifecycle::GameLifecycleState;
use super::outcome::ScheduledAction;
use super::simulation::{SimEvent, SimulationState};

/// Targets farther than this are neither prompted nor resolvable.
pub(crate) const INTERACT_REACH: f32 = 3.0;
pub(crate) const ENTRY_OPEN_DELAY_SECONDS: f64 = 1.0;
pub(crate) const WRONG_DOOR_DELAY_SECONDS: f64 = 2.0;
pub(crate) const EXIT_RELOCATE_DELAY_SECONDS: f64 = 0.5;
pub(crate) const EXIT_SUCCESS_DELAY_SECONDS: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub(crate) enum DoorSet {
    Entry,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct Door {
    pub(crate) set: DoorSet,
    pub(crate) index: usize,
    pub(crate) is_correct: bool,
    pub(crate) open: bool,
    pub(crate) position: Vec3,
}

impl Door {
    fn build_set(set: DoorSet) -> [Door; 3] {
        let (xs, z, correct) = match set {
            DoorSet::Entry => (ENTRY_DOOR_XS, ENTRY_DOOR_Z, ENTRY_CORRECT_INDEX),
            DoorSet::Exit => (EXIT_DOOR_XS, EXIT_DOOR_Z, EXIT_CORRECT_INDEX),
        };
        std::array::from_fn(|index| Door {
            set,
            index,
            is_correct: index == correct,
            open: false,
            position: Vec3::new(xs[index], DOOR_CENTER_Y, z),
        })
    }

    pub(crate) fn entry_set() -> [Door; 3] {
        Self::build_set(DoorSet::Entry)
    }

    pub(crate) fn exit_set() -> [Door; 3] {
        Self::build_set(DoorSet::Exit)
    }

    fn try_interact(&self) -> InteractionOutcome {
        match (self.set, self.is_correct) {
            (DoorSet::Entry, true) => InteractionOutcome::AdvanceToCorridor,
            (DoorSet::Exit, true) => InteractionOutcome::Escape,
            (_, false) => InteractionOutcome::WrongChoice,
        }
    }
}

/// Anything the player can aim at and use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) enum Interactable {
    Door(Door),
}

impl Interactable {
    pub(crate) fn try_interact(&self) -> InteractionOutcome {
        match self {
            Interactable::Door(door) => door.try_interact(),
        }
    }

    fn bounds(&self) -> (Vec3, Vec3) {
        match self {
            Interactable::Door(door) => (door.position, DOOR_HALF_EXTENTS),
        }
    }

    pub(crate) fn as_door(&self) -> Option<&Door> {
        match self {
            Interactable::Door(door) => Some(door),
        }
    }

    pub(crate) fn reset(&mut self) {
        match self {
            Interactable::Door(door) => door.open = false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InteractionOutcome {
    AdvanceToCorridor,
    Escape,
    WrongChoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct InteractionTarget {
    /// Index into `SimulationState::interactables`.
    pub(crate) slot: usize,
    pub(crate) distance: f32,
}

pub(crate) fn default_interactables() -> Vec<Interactable> {
    Door::entry_set()
        .into_iter()
        .chain(Door::exit_set())
        .map(Interactable::Door)
        .collect()
}

/// Casts from the eye along the view direction and returns the nearest
/// interactable within reach.
pub(crate) fn query_target(state: &SimulationState) -> Option<InteractionTarget> {
    let ray = Ray {
        origin: state.player.position,
        direction: state.player.view_forward(),
    };
    let boxes = state
        .interactables
        .iter()
        .enumerate()
        .map(|(slot, interactable)| {
            let (center, half_extents) = interactable.bounds();
            RaycastBox::from_center(slot, center, half_extents)
        });

    raycast_nearest(ray, INTERACT_REACH, boxes)
        .filter(|hit| hit.distance < INTERACT_REACH)
        .map(|hit| InteractionTarget {
            slot: hit.key,
            distance: hit.distance,
        })
}

/// Refreshes `state.target` for the prompt. Only runs while playing; other
/// states clear it.
pub(crate) fn refresh_target(state: &mut SimulationState) {
    state.target = if state.lifecycle == GameLifecycleState::Playing {
        query_target(state)
    } else {
        None
    };
}

/// Resolves an explicit interact press against the current target. Returns
/// `false` when ignored: not playing, nothing targeted, or a previous
/// resolution is still pending.
pub(crate) fn resolve_interaction(state: &mut SimulationState) -> bool {
    if state.lifecycle != GameLifecycleState::Playing {
        return false;
    }
    if state.resolution_pending {
        debug!("interaction_ignored_pending");
        return false;
    }
    let Some(target) = state.target else {
        return false;
    };
    let Some(interactable) = state.interactables.get_mut(target.slot) else {
        return false;
    };

    let outcome = interactable.try_interact();
    let Interactable::Door(door) = interactable;
    if outcome != InteractionOutcome::WrongChoice {
        door.open = true;
    }
    let door = *door;

    let now = state.clock_seconds;
    match outcome {
        InteractionOutcome::AdvanceToCorridor => {
            state.pending.schedule(
                now,
                ENTRY_OPEN_DELAY_SECONDS,
                ScheduledAction::EnterCorridor,
            );
        }
        InteractionOutcome::Escape => {
            state.pending.schedule(
                now,
                EXIT_RELOCATE_DELAY_SECONDS,
                ScheduledAction::EnterSecondRoom,
            );
            state.pending.schedule(
                now,
                EXIT_SUCCESS_DELAY_SECONDS,
                ScheduledAction::FinalDoorSuccess,
            );
        }
        InteractionOutcome::WrongChoice => {
            state
                .pending
                .schedule(now, WRONG_DOOR_DELAY_SECONDS, ScheduledAction::Capture);
        }
    }
    state.resolution_pending = true;

    info!(
        set = ?door.set,
        index = door.index,
        correct = door.is_correct,
        distance = target.distance,
        "door_resolved"
    );
    state.events.emit(SimEvent::DoorResolved {
        set: door.set,
        index: door.index,
        correct: door.is_correct,
    });
    true
}
