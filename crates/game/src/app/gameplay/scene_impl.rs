use engine::{
    EntityId, HudPanel, InputEdge, InputSnapshot, RenderableDesc, RenderableKind, Scene,
    SceneCommand, SceneWorld, Transform,
};
use tracing::{debug, info, warn};

use super::interaction::{DoorSet, Interactable};
use super::level::{self, LevelPhase, DOOR_HALF_EXTENTS};
use super::lifecycle::{GameLifecycleState, LifecycleEvent};
use super::movement::{ControlIntent, LookIntent, MoveOutcome};
use super::pursuit;
use super::pursuit::PursuitOutcome;
use super::simulation::{SimEvent, Simulation, SimulationInput, TickReport};

pub(crate) const LOADING_SPLASH_SECONDS: f32 = 1.0;

const ENTRY_DOOR_COLOR: [u8; 4] = [122, 84, 52, 255];
const EXIT_DOOR_COLOR: [u8; 4] = [96, 70, 48, 255];
const PLAYER_COLOR: [u8; 4] = [224, 224, 240, 255];
const ANTAGONIST_COLOR: [u8; 4] = [196, 34, 34, 255];

pub(crate) const HINT_START: &str = "You woke up in a strange room. Find a way out...";
pub(crate) const HINT_ENTRY_CORRECT: &str = "Correct! The door opens...";
pub(crate) const HINT_CORRIDOR: &str = "Move forward carefully...";
pub(crate) const HINT_WRONG_DOOR: &str = "Wrong choice!";
pub(crate) const HINT_ANTAGONIST: &str = "The monster has awakened! Run!";
pub(crate) const HINT_ESCAPED: &str = "Correct! You escaped!";

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ActiveHint {
    pub(crate) text: &'static str,
    pub(crate) remaining_seconds: f32,
}

/// Maps a simulation notification to the hint it should raise, with its
/// display duration.
pub(crate) fn hint_for_event(event: &SimEvent) -> Option<ActiveHint> {
    let (text, seconds) = match *event {
        SimEvent::LifecycleChanged {
            from: GameLifecycleState::Menu,
            to: GameLifecycleState::Playing,
        }
        | SimEvent::Restarted => (HINT_START, 5.0),
        SimEvent::DoorResolved {
            correct: false, ..
        } => (HINT_WRONG_DOOR, 2.0),
        SimEvent::DoorResolved {
            set: DoorSet::Entry,
            correct: true,
            ..
        } => (HINT_ENTRY_CORRECT, 3.0),
        SimEvent::DoorResolved {
            set: DoorSet::Exit,
            correct: true,
            ..
        } => (HINT_ESCAPED, 3.0),
        SimEvent::PhaseChanged {
            to: LevelPhase::Corridor,
            ..
        } => (HINT_CORRIDOR, 3.0),
        SimEvent::AntagonistActivated => (HINT_ANTAGONIST, 3.0),
        _ => return None,
    };
    Some(ActiveHint {
        text,
        remaining_seconds: seconds,
    })
}

fn panel(title: &str, lines: &[&str]) -> HudPanel {
    HudPanel {
        title: title.to_string(),
        lines: lines.iter().map(|line| line.to_string()).collect(),
    }
}

fn panel_for(lifecycle: GameLifecycleState) -> Option<HudPanel> {
    let hud_panel = match lifecycle {
        GameLifecycleState::Loading => panel("AWAKENED ROOM", &["LOADING..."]),
        GameLifecycleState::Menu => panel(
            "AWAKENED ROOM",
            &[
                "PRESS ENTER TO START",
                "WASD MOVE - SHIFT RUN - MOUSE OR J/L LOOK",
                "E OR CLICK OPENS A DOOR",
                "P PAUSE - ESC QUIT",
            ],
        ),
        GameLifecycleState::Playing => return None,
        GameLifecycleState::Paused => panel("PAUSED", &["P OR ESC TO RESUME"]),
        GameLifecycleState::Failed => panel("YOU WERE CAUGHT", &["R TRY AGAIN", "ESC QUIT"]),
        GameLifecycleState::Succeeded => panel("YOU ESCAPED", &["R PLAY AGAIN", "ESC QUIT"]),
    };
    Some(hud_panel)
}

pub(crate) struct AwakenedRoomScene {
    sim: Simulation,
    loading_remaining_seconds: f32,
    hint: Option<ActiveHint>,
    door_entities: Vec<EntityId>,
    player_entity: Option<EntityId>,
    antagonist_entity: Option<EntityId>,
    last_report: Option<TickReport>,
}

impl AwakenedRoomScene {
    pub(crate) fn new() -> Self {
        Self {
            sim: Simulation::new(),
            loading_remaining_seconds: LOADING_SPLASH_SECONDS,
            hint: None,
            door_entities: Vec::new(),
            player_entity: None,
            antagonist_entity: None,
            last_report: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn simulation(&self) -> &Simulation {
        &self.sim
    }

    #[cfg(test)]
    pub(crate) fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    #[cfg(test)]
    pub(crate) fn active_hint(&self) -> Option<ActiveHint> {
        self.hint
    }

    /// Returns `Quit` when the back key is pressed on a screen that has
    /// nothing to go back to.
    fn handle_edges(&mut self, input: &InputSnapshot) -> SceneCommand {
        if input.pressed(InputEdge::Confirm) {
            self.sim.request(LifecycleEvent::StartCommand);
        }
        if input.pressed(InputEdge::Pause) {
            self.sim.request(LifecycleEvent::PauseToggle);
        }
        if input.pressed(InputEdge::Restart) {
            self.sim.request(LifecycleEvent::RestartCommand);
        }
        if input.pressed(InputEdge::DumpState) {
            self.dump_state();
        }
        if input.pressed(InputEdge::Back) {
            match self.sim.lifecycle() {
                GameLifecycleState::Playing | GameLifecycleState::Paused => {
                    self.sim.request(LifecycleEvent::PauseToggle);
                }
                GameLifecycleState::Menu
                | GameLifecycleState::Failed
                | GameLifecycleState::Succeeded => {
                    info!(from = self.sim.lifecycle().label(), "quit_requested");
                    return SceneCommand::Quit;
                }
                GameLifecycleState::Loading => {}
            }
        }
        SceneCommand::None
    }

    fn dump_state(&self) {
        match serde_json::to_string(&self.sim.snapshot()) {
            Ok(json) => info!(state = %json, "state_dump"),
            Err(error) => warn!(error = %error, "state_dump_failed"),
        }
    }

    fn advance_hint(&mut self, dt: f32) {
        for event in self.sim.drain_events() {
            if let Some(hint) = hint_for_event(&event) {
                self.hint = Some(hint);
            }
        }
        if let Some(hint) = self.hint.as_mut() {
            hint.remaining_seconds -= dt;
        }
        if self.hint.is_some_and(|hint| hint.remaining_seconds <= 0.0) {
            self.hint = None;
        }
    }

    fn sync_world(&self, world: &mut SceneWorld) {
        let state = self.sim.state();

        for (slot, interactable) in state.interactables.iter().enumerate() {
            let Some(entity_id) = self.door_entities.get(slot).copied() else {
                continue;
            };
            let Some(entity) = world.find_entity_mut(entity_id) else {
                continue;
            };
            let Interactable::Door(door) = interactable;
            entity.translucent = door.open;
        }

        if let Some(entity) = self
            .player_entity
            .and_then(|id| world.find_entity_mut(id))
        {
            entity.transform.position = state.player.position;
            entity.transform.yaw_radians = Some(state.player.yaw);
        }
        if let Some(entity) = self
            .antagonist_entity
            .and_then(|id| world.find_entity_mut(id))
        {
            entity.transform.position = state.antagonist.position;
            entity.transform.yaw_radians = Some(state.antagonist.yaw);
            entity.visible = state.antagonist.active;
        }

        let hovered = state
            .target
            .and_then(|target| self.door_entities.get(target.slot).copied());
        world.set_hovered_interactable_visual(hovered);
        world.camera_mut().position = state.player.position.ground();

        let prompt = match state.target {
            Some(target) if !state.resolution_pending => state
                .interactables
                .get(target.slot)
                .and_then(Interactable::as_door)
                .map(|door| format!("DOOR {} - [E] OPEN", door.index + 1)),
            _ => None,
        };

        let hud = world.hud_mut();
        hud.panel = panel_for(state.lifecycle);
        hud.hint = self.hint.map(|hint| hint.text.to_string());
        hud.prompt = prompt;
        hud.vignette = self.sim.danger_level();
    }
}

impl Scene for AwakenedRoomScene {
    fn load(&mut self, world: &mut SceneWorld) {
        self.sim = Simulation::new();
        self.loading_remaining_seconds = LOADING_SPLASH_SECONDS;
        self.hint = None;
        self.last_report = None;

        world.set_floor_plan(level::floor_plan());
        self.door_entities = self
            .sim
            .state()
            .interactables
            .iter()
            .map(|interactable| {
                let Interactable::Door(door) = interactable;
                let color = match door.set {
                    DoorSet::Entry => ENTRY_DOOR_COLOR,
                    DoorSet::Exit => EXIT_DOOR_COLOR,
                };
                world.spawn(
                    Transform {
                        position: door.position,
                        yaw_radians: None,
                    },
                    RenderableDesc {
                        kind: RenderableKind::Slab {
                            half_width: DOOR_HALF_EXTENTS.x,
                            half_depth: DOOR_HALF_EXTENTS.z,
                        },
                        color,
                        debug_name: "door",
                    },
                )
            })
            .collect();

        let state = self.sim.state();
        self.antagonist_entity = Some(world.spawn(
            Transform {
                position: state.antagonist.position,
                yaw_radians: Some(state.antagonist.yaw),
            },
            RenderableDesc {
                kind: RenderableKind::Marker,
                color: ANTAGONIST_COLOR,
                debug_name: "antagonist",
            },
        ));
        self.player_entity = Some(world.spawn(
            Transform {
                position: state.player.position,
                yaw_radians: Some(state.player.yaw),
            },
            RenderableDesc {
                kind: RenderableKind::Marker,
                color: PLAYER_COLOR,
                debug_name: "player",
            },
        ));
        world.hud_mut().panel = panel_for(state.lifecycle);

        info!(doors = self.door_entities.len(), "scene_loaded");
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        if self.sim.lifecycle() == GameLifecycleState::Loading {
            self.loading_remaining_seconds -= fixed_dt_seconds;
            if self.loading_remaining_seconds <= 0.0 {
                self.sim.request(LifecycleEvent::AssetsReady);
            }
        }

        let command = self.handle_edges(input);

        let sim_input = SimulationInput {
            intent: ControlIntent::from_input(input),
            look: LookIntent::from_input(input, fixed_dt_seconds),
            interact: input.pressed(InputEdge::Interact),
        };
        let report = self.sim.tick(&sim_input, fixed_dt_seconds);
        if sim_input.interact && !report.interacted {
            debug!(lifecycle = self.sim.lifecycle().label(), "interact_press_ignored");
        }
        self.last_report = Some(report);

        self.advance_hint(fixed_dt_seconds);
        self.sync_world(world);
        command
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.door_entities.clear();
        self.player_entity = None;
        self.antagonist_entity = None;
        info!(lifecycle = self.sim.lifecycle().label(), "scene_unloaded");
    }

    fn debug_title(&self) -> Option<String> {
        Some("Awakened Room".to_string())
    }

    fn debug_lines(&self) -> Vec<String> {
        let state = self.sim.state();
        let position = state.player.position;
        let antagonist = match self.last_report.map(|report| report.pursuit) {
            Some(PursuitOutcome::Chasing { distance }) => format!("chasing {distance:.1}"),
            Some(PursuitOutcome::Captured) => "captured".to_string(),
            _ => pursuit::distance_to_player(state)
                .map(|distance| format!("{distance:.1}"))
                .unwrap_or_else(|| "asleep".to_string()),
        };
        let movement = match self.last_report.map(|report| report.movement) {
            Some(MoveOutcome::Moved) => "moved",
            Some(MoveOutcome::Blocked) => "blocked",
            _ => "idle",
        };
        vec![
            format!("state: {}", state.lifecycle.label()),
            format!("phase: {}", state.phase.label()),
            format!(
                "pos: {:.2} {:.2} {:.2}",
                position.x, position.y, position.z
            ),
            format!("move: {movement}"),
            format!("antagonist: {antagonist}"),
            format!(
                "pending: {} ({} timed)",
                state.resolution_pending,
                state.pending.len()
            ),
            format!("clock: {:.2}", state.clock_seconds),
        ]
    }

    fn wants_pointer_lock(&self) -> bool {
        self.sim.lifecycle() == GameLifecycleState::Playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_doors_in_either_set_share_a_hint() {
        for set in [DoorSet::Entry, DoorSet::Exit] {
            let hint = hint_for_event(&SimEvent::DoorResolved {
                set,
                index: 2,
                correct: false,
            })
            .expect("hint");
            assert_eq!(hint.text, HINT_WRONG_DOOR);
            assert_eq!(hint.remaining_seconds, 2.0);
        }
    }

    #[test]
    fn only_starting_play_from_the_menu_shows_the_start_hint() {
        let resume = SimEvent::LifecycleChanged {
            from: GameLifecycleState::Paused,
            to: GameLifecycleState::Playing,
        };
        assert_eq!(hint_for_event(&resume), None);
        assert_eq!(
            hint_for_event(&SimEvent::Restarted).map(|hint| hint.text),
            Some(HINT_START)
        );
        assert_eq!(hint_for_event(&SimEvent::Captured), None);
    }

    #[test]
    fn panels_cover_every_non_playing_state() {
        assert!(panel_for(GameLifecycleState::Playing).is_none());
        for state in [
            GameLifecycleState::Loading,
            GameLifecycleState::Menu,
            GameLifecycleState::Paused,
            GameLifecycleState::Failed,
            GameLifecycleState::Succeeded,
        ] {
            let panel = panel_for(state).expect("panel");
            assert!(!panel.lines.is_empty());
        }
    }
}
