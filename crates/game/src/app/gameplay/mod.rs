//! Simulation core for the awakened-room game and the scene that hosts it.
//!
//! Components own disjoint slices of [`simulation::SimulationState`] and run
//! in a fixed order each tick: look, movement, prompt query, interaction,
//! pursuit, then due pacing actions.

use engine::Scene;

mod interaction;
mod level;
mod lifecycle;
mod movement;
mod outcome;
mod pursuit;
mod scene_impl;
mod simulation;

pub(crate) fn build_scene() -> Box<dyn Scene> {
    Box::new(scene_impl::AwakenedRoomScene::new())
}
