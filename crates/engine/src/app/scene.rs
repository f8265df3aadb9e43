use std::ops::{Add, Mul, Sub};

use serde::Serialize;

use super::input::{ActionStates, EdgeStates, InputAction, InputEdge};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    actions: ActionStates,
    edges: EdgeStates,
    look_delta_px: Vec2,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        actions: ActionStates,
        edges: EdgeStates,
        look_delta_px: Vec2,
    ) -> Self {
        Self {
            actions,
            edges,
            look_delta_px,
        }
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn pressed(&self, edge: InputEdge) -> bool {
        self.edges.was_pressed(edge)
    }

    /// Accumulated pointer motion since the previous tick, in physical pixels.
    pub fn look_delta_px(&self) -> Vec2 {
        self.look_delta_px
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_pressed(mut self, edge: InputEdge) -> Self {
        self.edges.mark(edge);
        self
    }

    pub fn with_look_delta_px(mut self, look_delta_px: Vec2) -> Self {
        self.look_delta_px = look_delta_px;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn distance(self, other: Vec3) -> f32 {
        (other - self).length()
    }

    /// Drops the vertical component.
    pub fn horizontal(self) -> Vec3 {
        Vec3 {
            x: self.x,
            y: 0.0,
            z: self.z,
        }
    }

    /// Returns `None` for vectors too short to carry a direction.
    pub fn try_normalize(self) -> Option<Vec3> {
        let len = self.length();
        if !len.is_finite() || len <= 1e-6 {
            return None;
        }
        Some(self * len.recip())
    }

    /// Top-down projection onto the x/z ground plane.
    pub fn ground(self) -> Vec2 {
        Vec2 {
            x: self.x,
            y: self.z,
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

pub const CAMERA_ZOOM_DEFAULT: f32 = 1.0;

/// Top-down camera. `position` is on the ground plane (world x, world z).
#[derive(Debug, Clone, Copy)]
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            position: Vec2::default(),
            zoom: CAMERA_ZOOM_DEFAULT,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Transform {
    pub position: Vec3,
    pub yaw_radians: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderableKind {
    Marker,
    Slab { half_width: f32, half_depth: f32 },
}

#[derive(Debug, Clone)]
pub struct RenderableDesc {
    pub kind: RenderableKind,
    pub color: [u8; 4],
    pub debug_name: &'static str,
}

/// Walkable floor area drawn beneath entities, in ground-plane coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorRect {
    pub min: Vec2,
    pub max: Vec2,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudPanel {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HudState {
    pub panel: Option<HudPanel>,
    pub hint: Option<String>,
    pub prompt: Option<String>,
    /// 0 disables the vignette, 1 is full strength.
    pub vignette: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneVisualState {
    pub hovered_interactable: Option<EntityId>,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub transform: Transform,
    pub renderable: RenderableDesc,
    pub visible: bool,
    pub translucent: bool,
    applied_spawn_order: u64,
}

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug, Default)]
pub struct SceneWorld {
    allocator: EntityIdAllocator,
    entities: Vec<Entity>,
    pending_spawns: Vec<Entity>,
    next_applied_spawn_order: u64,
    camera: Camera2D,
    floor_plan: Vec<FloorRect>,
    visual_state: SceneVisualState,
    hud: HudState,
}

impl SceneWorld {
    pub fn spawn(&mut self, transform: Transform, renderable: RenderableDesc) -> EntityId {
        let id = self.allocator.allocate();
        self.pending_spawns.push(Entity {
            id,
            transform,
            renderable,
            visible: true,
            translucent: false,
            applied_spawn_order: 0,
        });
        id
    }

    pub fn apply_pending(&mut self) {
        for mut entity in self.pending_spawns.drain(..) {
            entity.applied_spawn_order = self.next_applied_spawn_order;
            self.next_applied_spawn_order = self.next_applied_spawn_order.saturating_add(1);
            self.entities.push(entity);
        }
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.pending_spawns.clear();
        self.next_applied_spawn_order = 0;
        self.camera = Camera2D::default();
        self.floor_plan.clear();
        self.visual_state = SceneVisualState::default();
        self.hud = HudState::default();
    }

    pub fn set_floor_plan(&mut self, floor_plan: Vec<FloorRect>) {
        self.floor_plan = floor_plan;
    }

    pub fn floor_plan(&self) -> &[FloorRect] {
        &self.floor_plan
    }

    pub fn set_hovered_interactable_visual(&mut self, hovered: Option<EntityId>) {
        self.visual_state.hovered_interactable = hovered;
    }

    pub fn visual_state(&self) -> &SceneVisualState {
        &self.visual_state
    }

    pub fn hud(&self) -> &HudState {
        &self.hud
    }

    pub fn hud_mut(&mut self) -> &mut HudState {
        &mut self.hud
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Entities ordered back to front by spawn order.
    pub fn entities_in_draw_order(&self) -> Vec<&Entity> {
        let mut ordered: Vec<&Entity> = self.entities.iter().collect();
        ordered.sort_by_key(|entity| entity.applied_spawn_order);
        ordered
    }

    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn find_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self) -> Option<String> {
        None
    }
    fn debug_lines(&self) -> Vec<String> {
        Vec::new()
    }
    /// Whether the pointer should be captured for mouse look.
    fn wants_pointer_lock(&self) -> bool {
        false
    }
}

pub(crate) struct SceneHost {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneHost {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            world: SceneWorld::default(),
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self) {
        if self.is_loaded {
            return;
        }
        self.scene.load(&mut self.world);
        self.world.apply_pending();
        self.is_loaded = true;
    }

    pub(crate) fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        let command = self.scene.update(fixed_dt_seconds, input, &mut self.world);
        self.world.apply_pending();
        command
    }

    pub(crate) fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title()
    }

    pub(crate) fn debug_lines(&self) -> Vec<String> {
        self.scene.debug_lines()
    }

    pub(crate) fn wants_pointer_lock(&self) -> bool {
        self.scene.wants_pointer_lock()
    }

    pub(crate) fn shutdown(&mut self) {
        if !self.is_loaded {
            return;
        }
        self.scene.unload(&mut self.world);
        self.world.clear();
        self.is_loaded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(debug_name: &'static str) -> RenderableDesc {
        RenderableDesc {
            kind: RenderableKind::Marker,
            color: [255, 255, 255, 255],
            debug_name,
        }
    }

    struct CountingScene {
        spawn_count: usize,
    }

    impl Scene for CountingScene {
        fn load(&mut self, world: &mut SceneWorld) {
            for _ in 0..self.spawn_count {
                world.spawn(Transform::default(), marker("test"));
            }
        }

        fn update(
            &mut self,
            _fixed_dt_seconds: f32,
            _input: &InputSnapshot,
            world: &mut SceneWorld,
        ) -> SceneCommand {
            world.spawn(Transform::default(), marker("late"));
            SceneCommand::None
        }

        fn unload(&mut self, _world: &mut SceneWorld) {}
    }

    #[test]
    fn spawned_entities_are_pending_until_applied() {
        let mut world = SceneWorld::default();
        let id = world.spawn(Transform::default(), marker("a"));

        assert_eq!(world.entity_count(), 0);
        assert!(world.find_entity(id).is_none());

        world.apply_pending();
        assert_eq!(world.entity_count(), 1);
        assert!(world.find_entity(id).is_some());
    }

    #[test]
    fn entity_ids_are_unique_and_monotonic() {
        let mut world = SceneWorld::default();
        let a = world.spawn(Transform::default(), marker("a"));
        let b = world.spawn(Transform::default(), marker("b"));
        assert!(b.0 > a.0);
    }

    #[test]
    fn draw_order_follows_spawn_order() {
        let mut world = SceneWorld::default();
        let first = world.spawn(Transform::default(), marker("first"));
        world.apply_pending();
        let second = world.spawn(Transform::default(), marker("second"));
        world.apply_pending();

        let ids: Vec<EntityId> = world
            .entities_in_draw_order()
            .into_iter()
            .map(|entity| entity.id)
            .collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn clear_resets_entities_hud_and_camera() {
        let mut world = SceneWorld::default();
        world.spawn(Transform::default(), marker("a"));
        world.apply_pending();
        world.camera_mut().position = Vec2 { x: 4.0, y: -2.0 };
        world.hud_mut().hint = Some("hello".to_string());
        world.set_floor_plan(vec![FloorRect {
            min: Vec2 { x: -1.0, y: -1.0 },
            max: Vec2 { x: 1.0, y: 1.0 },
        }]);

        world.clear();

        assert_eq!(world.entity_count(), 0);
        assert!(world.floor_plan().is_empty());
        assert_eq!(world.hud(), &HudState::default());
        assert_eq!(world.camera().position, Vec2::default());
    }

    #[test]
    fn host_loads_once_and_applies_spawns_after_update() {
        let mut host = SceneHost::new(Box::new(CountingScene { spawn_count: 3 }));
        host.load();
        host.load();
        assert_eq!(host.world().entity_count(), 3);

        let command = host.update(1.0 / 60.0, &InputSnapshot::empty());
        assert_eq!(command, SceneCommand::None);
        assert_eq!(host.world().entity_count(), 4);

        host.shutdown();
        assert_eq!(host.world().entity_count(), 0);
    }

    #[test]
    fn input_snapshot_builders_set_actions_edges_and_look() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(InputAction::MoveForward, true)
            .with_pressed(InputEdge::Interact)
            .with_look_delta_px(Vec2 { x: 3.0, y: -1.0 });

        assert!(snapshot.is_down(InputAction::MoveForward));
        assert!(!snapshot.is_down(InputAction::Run));
        assert!(snapshot.pressed(InputEdge::Interact));
        assert!(!snapshot.pressed(InputEdge::Confirm));
        assert_eq!(snapshot.look_delta_px(), Vec2 { x: 3.0, y: -1.0 });
    }

    #[test]
    fn vec3_normalize_rejects_zero_length() {
        assert!(Vec3::ZERO.try_normalize().is_none());
        let unit = Vec3::new(3.0, 0.0, 4.0).try_normalize().expect("unit");
        assert!((unit.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn vec3_horizontal_and_ground_drop_height() {
        let v = Vec3::new(1.0, 1.6, -2.0);
        assert_eq!(v.horizontal(), Vec3::new(1.0, 0.0, -2.0));
        assert_eq!(v.ground(), Vec2 { x: 1.0, y: -2.0 });
        assert!((Vec3::new(0.0, 0.0, 0.0).distance(Vec3::new(0.0, 3.0, 4.0)) - 5.0).abs() < 1e-6);
    }
}
