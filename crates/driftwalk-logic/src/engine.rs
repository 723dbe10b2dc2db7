//! Per-frame simulation step and the render snapshot.
//!
//! One cooperative step per display refresh: steering → collision →
//! camera → patrol → proximity → edge-triggered interaction. The step
//! is the only writer of simulation state; the renderer reads a
//! snapshot and draws elsewhere. While a wipe runs, and while the
//! overlay is open, the world sim is frozen — a host that regains
//! focus re-baselines its timestamp instead of replaying missed time.

use serde::Serialize;

use crate::camera::CameraFollow;
use crate::constants::{INTERACT_RADIUS, MAX_STEP_SECONDS};
use crate::interaction::{dispatch, Biome, Effect, EventLog, WipeTransition};
use crate::pathfinding::{GridPos, PatrolPath};
use crate::proximity::nearest_structure;
use crate::steering::{AvatarKind, SteeringBody};
use crate::world::{Button, InputSource, TileWorld, WorldView};

/// Full simulation state. One writer (`step`), any number of readers.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub avatar: SteeringBody,
    pub camera: CameraFollow,
    pub wipe: WipeTransition,
    /// Terminal overlay open; toggled only by a completed wipe.
    pub overlay_active: bool,
    pub biome: Biome,
    pub patrol: PatrolPath,
    pub log: EventLog,
    /// Index into the world's structure list, when one is in range.
    pub near: Option<usize>,
}

impl Simulation {
    pub fn new(kind: AvatarKind, spawn: (f32, f32), patrol: PatrolPath) -> Self {
        Self {
            avatar: SteeringBody::new(kind, spawn.0, spawn.1),
            camera: CameraFollow::centered_on(spawn.0, spawn.1),
            wipe: WipeTransition::default(),
            overlay_active: false,
            biome: Biome::default(),
            patrol,
            log: EventLog::default(),
            near: None,
        }
    }

    /// Convenience constructor off the stock tile world.
    pub fn from_world(world: &TileWorld) -> Self {
        Self::new(AvatarKind::Strider, world.spawn(), world.patrol())
    }

    /// Advance one frame. `dt` is wall-clock seconds since the last
    /// step, clamped here to [`MAX_STEP_SECONDS`] so pauses cannot
    /// produce one catastrophic integration step.
    pub fn step<W: WorldView, I: InputSource>(&mut self, world: &W, input: &mut I, dt: f32) {
        let dt = dt.clamp(0.0, MAX_STEP_SECONDS);

        // A running wipe owns the frame.
        if self.wipe.active {
            if self.wipe.advance(dt) {
                self.overlay_active = !self.overlay_active;
            }
            return;
        }
        // An open overlay freezes the world sim.
        if self.overlay_active {
            return;
        }

        let (old_x, old_y) = (self.avatar.x, self.avatar.y);
        self.avatar
            .update(dt, input.axis(), input.is_held(Button::Sprint));
        resolve_collision(&mut self.avatar, world, old_x, old_y);

        self.camera.update(dt, self.avatar.x, self.avatar.y);
        self.patrol.advance(dt);

        self.near = nearest_structure(
            world.structures(),
            self.avatar.x,
            self.avatar.y,
            INTERACT_RADIUS,
        );

        if input.consume_edge(Button::Interact) {
            if let Some(structure) = self.near.and_then(|i| world.structures().get(i)) {
                let effect = dispatch(structure);
                self.apply(effect);
            }
        }
    }

    /// Host-facing path to the same wipe the terminal gate triggers
    /// (UI button, overlay close). Same rule: no restart, no stacking.
    pub fn request_overlay_wipe(&mut self) -> bool {
        self.wipe.begin()
    }

    /// Host-facing avatar form switch; pose and motion carry over.
    pub fn cycle_avatar_kind(&mut self) {
        self.avatar.set_kind(self.avatar.kind.cycled());
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::ToggleBiome => self.biome = self.biome.toggled(),
            Effect::BeginWipe => {
                self.wipe.begin();
            }
            Effect::Log(line) => self.log.push(line),
        }
    }

    /// Immutable per-frame view for the renderer.
    pub fn snapshot<W: WorldView>(&self, world: &W) -> RenderSnapshot {
        RenderSnapshot {
            x: self.avatar.x,
            y: self.avatar.y,
            heading: self.avatar.heading,
            lean: self.avatar.lean,
            gait_phase: self.avatar.gait_phase,
            kind: self.avatar.kind,
            size: self.avatar.kind.profile().size,
            camera_x: self.camera.x,
            camera_y: self.camera.y,
            wipe_active: self.wipe.active,
            wipe_t: self.wipe.t,
            overlay_active: self.overlay_active,
            biome: self.biome,
            patrol_marker: self.patrol.marker(),
            near_title: self
                .near
                .and_then(|i| world.structures().get(i))
                .map(|s| s.title.clone()),
        }
    }
}

/// Per-axis slide against blocked tiles: a blocked axis reverts and
/// its velocity component zeroes, the free axis keeps moving.
fn resolve_collision<W: WorldView>(body: &mut SteeringBody, world: &W, old_x: f32, old_y: f32) {
    let (new_tx, _) = TileWorld::tile_at(body.x, old_y);
    let (_, old_ty) = TileWorld::tile_at(old_x, old_y);
    if world.is_blocked(new_tx, old_ty) {
        body.x = old_x;
        body.vx = 0.0;
    }
    let (tx, ty) = TileWorld::tile_at(body.x, body.y);
    if world.is_blocked(tx, ty) {
        body.y = old_y;
        body.vy = 0.0;
    }
}

/// Pose, camera, and transition state for one rendered frame. The core
/// never draws; this is everything a renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub x: f32,
    pub y: f32,
    pub heading: f32,
    pub lean: f32,
    pub gait_phase: f32,
    pub kind: AvatarKind,
    pub size: f32,
    pub camera_x: f32,
    pub camera_y: f32,
    pub wipe_active: bool,
    pub wipe_t: f32,
    pub overlay_active: bool,
    pub biome: Biome,
    pub patrol_marker: GridPos,
    pub near_title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{TILE_SIZE, WIPE_SECONDS};
    use crate::proximity::{Structure, StructureKind};
    use crate::world::ManualInput;

    const DT: f32 = 1.0 / 60.0;

    /// Open-field world with a configurable structure list.
    struct OpenWorld {
        structures: Vec<Structure>,
    }

    impl WorldView for OpenWorld {
        fn is_blocked(&self, _tile_x: i32, _tile_y: i32) -> bool {
            false
        }
        fn structures(&self) -> &[Structure] {
            &self.structures
        }
    }

    fn structure(kind: StructureKind, x: f32, y: f32, title: &str) -> Structure {
        Structure {
            kind,
            x,
            y,
            radius: INTERACT_RADIUS,
            title: title.to_string(),
            subtitle: String::new(),
        }
    }

    fn sim() -> Simulation {
        Simulation::new(
            AvatarKind::Strider,
            (0.0, 0.0),
            PatrolPath::new(vec![GridPos::new(0, 0), GridPos::new(0, 1)], 0.5),
        )
    }

    #[test]
    fn input_moves_avatar_and_camera_follows() {
        let world = OpenWorld { structures: vec![] };
        let mut input = ManualInput::default();
        input.set_axis(1.0, 0.0);
        let mut s = sim();
        for _ in 0..60 {
            s.step(&world, &mut input, DT);
        }
        assert!(s.avatar.x > 50.0, "avatar barely moved: {}", s.avatar.x);
        assert!(s.camera.x > 0.0 && s.camera.x < s.avatar.x, "camera trails the avatar");
    }

    #[test]
    fn oversized_dt_is_clamped() {
        let world = OpenWorld { structures: vec![] };
        let mut input = ManualInput::default();
        input.set_axis(1.0, 0.0);
        let mut a = sim();
        a.step(&world, &mut input, 5.0);
        let mut b = sim();
        b.step(&world, &mut input, MAX_STEP_SECONDS);
        assert_eq!(a.avatar.x, b.avatar.x, "a 5 s pause must integrate as one clamped step");
    }

    #[test]
    fn interact_edge_near_terminal_gate_runs_wipe_then_overlay() {
        let world = OpenWorld {
            structures: vec![structure(StructureKind::TerminalGate, 30.0, 0.0, "Gate")],
        };
        let mut input = ManualInput::default();
        let mut s = sim();
        s.step(&world, &mut input, DT); // populate proximity
        assert_eq!(s.near, Some(0));

        input.press(Button::Interact);
        s.step(&world, &mut input, DT);
        assert!(s.wipe.active);
        assert!(!s.overlay_active);

        // A second press mid-wipe must not restart or stack.
        input.release(Button::Interact);
        input.press(Button::Interact);
        let mut steps = 0;
        while s.wipe.active {
            s.step(&world, &mut input, DT);
            steps += 1;
            assert!(steps < 100, "wipe never finished");
        }
        assert!(s.overlay_active, "completed wipe toggles the overlay");
        let elapsed = steps as f32 * DT;
        assert!(
            (elapsed - WIPE_SECONDS).abs() <= 2.0 * DT,
            "wipe ran {elapsed} s"
        );
    }

    #[test]
    fn avatar_is_frozen_during_wipe_and_overlay() {
        let world = OpenWorld {
            structures: vec![structure(StructureKind::TerminalGate, 0.0, 0.0, "Gate")],
        };
        let mut input = ManualInput::default();
        let mut s = sim();
        input.press(Button::Interact);
        s.step(&world, &mut input, DT);
        s.step(&world, &mut input, DT);
        assert!(s.wipe.active);

        input.set_axis(1.0, 0.0);
        let x = s.avatar.x;
        for _ in 0..200 {
            s.step(&world, &mut input, DT);
        }
        // Wipe finished into the overlay; the whole time the avatar
        // must not have moved.
        assert!(s.overlay_active);
        assert_eq!(s.avatar.x, x);
    }

    #[test]
    fn overlay_exit_wipe_resumes_sim() {
        let world = OpenWorld { structures: vec![] };
        let mut input = ManualInput::default();
        let mut s = sim();
        s.overlay_active = true;
        assert!(s.request_overlay_wipe());
        for _ in 0..60 {
            s.step(&world, &mut input, DT);
        }
        assert!(!s.overlay_active, "exit wipe closes the overlay");
        input.set_axis(0.0, 1.0);
        s.step(&world, &mut input, DT);
        assert!(s.avatar.vy > 0.0, "sim resumed after overlay closed");
    }

    #[test]
    fn portal_gate_toggles_biome_immediately() {
        let world = OpenWorld {
            structures: vec![structure(StructureKind::PortalGate, 10.0, 10.0, "Arch")],
        };
        let mut input = ManualInput::default();
        let mut s = sim();
        s.step(&world, &mut input, DT);
        input.press(Button::Interact);
        s.step(&world, &mut input, DT);
        assert_eq!(s.biome, Biome::City);
        assert!(!s.wipe.active, "portal gate must not start a wipe");

        input.release(Button::Interact);
        input.press(Button::Interact);
        s.step(&world, &mut input, DT);
        assert_eq!(s.biome, Biome::Jungle, "second press toggles back");
    }

    #[test]
    fn activation_out_of_range_is_a_no_op() {
        let world = OpenWorld {
            structures: vec![structure(StructureKind::Monolith, 5000.0, 0.0, "Slab")],
        };
        let mut input = ManualInput::default();
        let mut s = sim();
        input.press(Button::Interact);
        s.step(&world, &mut input, DT);
        assert_eq!(s.near, None);
        assert!(s.log.is_empty());
    }

    #[test]
    fn held_interact_dispatches_once() {
        let world = OpenWorld {
            structures: vec![structure(StructureKind::Monolith, 10.0, 0.0, "Slab")],
        };
        let mut input = ManualInput::default();
        let mut s = sim();
        input.press(Button::Interact);
        for _ in 0..30 {
            s.step(&world, &mut input, DT); // key held the whole time
        }
        assert_eq!(s.log.len(), 1, "edge input must dispatch exactly once per press");
    }

    #[test]
    fn collision_slides_along_walls() {
        use crate::layout::{RuinDemo, WorldLayout};
        // Full wall column at tile x=2; avatar pushes east and south,
        // so east stays blocked while south keeps sliding.
        let layout = WorldLayout {
            spawn: [24.0, 8.0],
            tiles: vec![
                "0010".to_string(),
                "0010".to_string(),
                "0010".to_string(),
            ],
            structures: vec![],
            ruin: RuinDemo {
                rows: vec!["00".to_string()],
                start: GridPos::new(0, 0),
                goal: GridPos::new(0, 1),
                patrol_rate: 0.08,
            },
        };
        let world = TileWorld::from_layout(&layout).unwrap();
        let mut s = Simulation::from_world(&world);
        let mut input = ManualInput::default();
        input.set_axis(1.0, 1.0);
        for _ in 0..120 {
            s.step(&world, &mut input, DT);
        }
        let wall_edge = 2.0 * TILE_SIZE;
        assert!(s.avatar.x < wall_edge, "pushed through the wall to x={}", s.avatar.x);
        assert!(s.avatar.y > 30.0, "free axis should keep sliding, y={}", s.avatar.y);
    }

    #[test]
    fn snapshot_reflects_state() {
        let world = OpenWorld {
            structures: vec![structure(StructureKind::Monolith, 20.0, 0.0, "Slab")],
        };
        let mut input = ManualInput::default();
        let mut s = sim();
        s.step(&world, &mut input, DT);
        let snap = s.snapshot(&world);
        assert_eq!(snap.near_title.as_deref(), Some("Slab"));
        assert_eq!(snap.biome, Biome::Jungle);
        assert!(!snap.wipe_active);
        assert_eq!((snap.x, snap.y), (s.avatar.x, s.avatar.y));
        assert_eq!(snap.patrol_marker, s.patrol.marker());
    }

    #[test]
    fn kind_cycle_preserves_motion() {
        let world = OpenWorld { structures: vec![] };
        let mut input = ManualInput::default();
        input.set_axis(1.0, 0.0);
        let mut s = sim();
        for _ in 0..30 {
            s.step(&world, &mut input, DT);
        }
        let (x, vx) = (s.avatar.x, s.avatar.vx);
        s.cycle_avatar_kind();
        assert_eq!(s.avatar.kind, AvatarKind::Jaguar);
        assert_eq!((s.avatar.x, s.avatar.vx), (x, vx));
    }
}
