//! Fixed level geometry: walkable zones per phase, spawn points, door layout.

use engine::{FloorRect, Vec2, Vec3};
use serde::Serialize;

pub(crate) const EYE_HEIGHT: f32 = 1.6;
pub(crate) const PLAYER_SPAWN: Vec3 = Vec3::new(0.0, EYE_HEIGHT, 0.0);
pub(crate) const CORRIDOR_ENTRY: Vec3 = Vec3::new(0.0, EYE_HEIGHT, -15.0);
pub(crate) const SECOND_ROOM_ENTRY: Vec3 = Vec3::new(0.0, EYE_HEIGHT, -121.0);
pub(crate) const ANTAGONIST_SPAWN: Vec3 = Vec3::new(0.0, 0.0, -20.0);
/// Crossing this depth inside the corridor wakes the antagonist.
pub(crate) const ANTAGONIST_TRIGGER_Z: f32 = -60.0;

pub(crate) const DOOR_HALF_EXTENTS: Vec3 = Vec3::new(1.0, 1.75, 0.1);
pub(crate) const DOOR_CENTER_Y: f32 = 1.75;
pub(crate) const ENTRY_DOOR_XS: [f32; 3] = [-3.0, 0.0, 3.0];
pub(crate) const ENTRY_DOOR_Z: f32 = -9.8;
pub(crate) const ENTRY_CORRECT_INDEX: usize = 1;
pub(crate) const EXIT_DOOR_XS: [f32; 3] = [-4.0, 0.0, 4.0];
pub(crate) const EXIT_DOOR_Z: f32 = -120.0;
pub(crate) const EXIT_CORRECT_INDEX: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub(crate) enum LevelPhase {
    FirstRoom,
    Corridor,
    SecondRoom,
}

impl LevelPhase {
    pub(crate) fn label(self) -> &'static str {
        match self {
            LevelPhase::FirstRoom => "first_room",
            LevelPhase::Corridor => "corridor",
            LevelPhase::SecondRoom => "second_room",
        }
    }
}

/// Open rectangle on the ground plane. Edges are excluded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ZoneBounds {
    pub(crate) min_x: f32,
    pub(crate) max_x: f32,
    pub(crate) min_z: f32,
    pub(crate) max_z: f32,
}

impl ZoneBounds {
    pub(crate) const fn for_phase(phase: LevelPhase) -> ZoneBounds {
        match phase {
            LevelPhase::FirstRoom => ZoneBounds {
                min_x: -9.0,
                max_x: 9.0,
                min_z: -9.0,
                max_z: 9.0,
            },
            LevelPhase::Corridor => ZoneBounds {
                min_x: -3.5,
                max_x: 3.5,
                min_z: -118.0,
                max_z: 0.0,
            },
            LevelPhase::SecondRoom => ZoneBounds {
                min_x: -7.0,
                max_x: 7.0,
                min_z: -122.0,
                max_z: -110.0,
            },
        }
    }

    pub(crate) fn contains(&self, point: Vec3) -> bool {
        point.x > self.min_x && point.x < self.max_x && point.z > self.min_z && point.z < self.max_z
    }

    pub(crate) fn floor_rect(&self) -> FloorRect {
        FloorRect {
            min: Vec2 {
                x: self.min_x,
                y: self.min_z,
            },
            max: Vec2 {
                x: self.max_x,
                y: self.max_z,
            },
        }
    }
}

/// Every zone, in phase order, for the top-down floor plan.
pub(crate) fn floor_plan() -> Vec<FloorRect> {
    [
        LevelPhase::FirstRoom,
        LevelPhase::Corridor,
        LevelPhase::SecondRoom,
    ]
    .into_iter()
    .map(|phase| ZoneBounds::for_phase(phase).floor_rect())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_edges_are_excluded() {
        let room = ZoneBounds::for_phase(LevelPhase::FirstRoom);
        assert!(room.contains(Vec3::new(8.99, EYE_HEIGHT, 0.0)));
        assert!(!room.contains(Vec3::new(9.0, EYE_HEIGHT, 0.0)));
        assert!(!room.contains(Vec3::new(0.0, EYE_HEIGHT, -9.0)));
    }

    #[test]
    fn corridor_stops_short_of_exit_doors() {
        let corridor = ZoneBounds::for_phase(LevelPhase::Corridor);
        assert!(corridor.contains(Vec3::new(0.0, EYE_HEIGHT, -117.9)));
        assert!(!corridor.contains(Vec3::new(0.0, EYE_HEIGHT, -118.0)));
        assert!(!corridor.contains(Vec3::new(3.5, EYE_HEIGHT, -50.0)));
        assert!(!corridor.contains(Vec3::new(0.0, EYE_HEIGHT, 0.0)));
    }

    #[test]
    fn spawn_points_lie_inside_their_zones() {
        assert!(ZoneBounds::for_phase(LevelPhase::FirstRoom).contains(PLAYER_SPAWN));
        assert!(ZoneBounds::for_phase(LevelPhase::Corridor).contains(CORRIDOR_ENTRY));
        assert!(ZoneBounds::for_phase(LevelPhase::SecondRoom).contains(SECOND_ROOM_ENTRY));
    }

    #[test]
    fn floor_plan_covers_all_three_zones() {
        let plan = floor_plan();
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[1].min, Vec2 { x: -3.5, y: -118.0 });
    }
}
