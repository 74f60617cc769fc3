//! Game session and stack state machine
//!
//! One `GameSession` owns everything a run needs: the physics world, the
//! scene, the stack, the debris and the score. Restart rebuilds it in place.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::autopilot::Autopilot;
use super::body::{Layer, Overhang};
use super::bridge::{Debris, SimulationBridge};
use super::geometry::{Axis, Footprint, compute_overlap, next_footprint, overhang_footprint};
use crate::physics::{PhysicsWorld, RapierWorld};
use crate::scene::{BoxScene, Camera, Scene, hsl_to_rgb};
use crate::settings::Settings;

/// Phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Nothing placed yet
    Idle,
    /// Top layer sliding, waiting for a drop
    Active,
    /// A layer missed; only restart leaves this phase
    Ended,
}

/// Who drops the layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pilot {
    /// The player (drop on interact)
    Manual,
    /// Attract-mode demo (any interact starts a real game)
    Autopilot,
}

/// Something the front end should react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A run started
    Started { pilot: Pilot },
    /// A layer landed; `score` is the new score
    Placed { score: u32 },
    /// A layer missed and the run ended with `score`
    Missed { score: u32, pilot: Pilot },
}

/// What the page's renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub phase: GamePhase,
    pub pilot: Pilot,
    pub score: u32,
    pub camera: &'a Camera,
    pub scene: &'a BoxScene,
}

/// Layers from the foundation up; the last one is the mover
#[derive(Debug, Clone, Default)]
pub struct Stack {
    layers: Vec<Layer>,
}

impl Stack {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn pop(&mut self) -> Option<Layer> {
        self.layers.pop()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn top(&self) -> Option<&Layer> {
        self.layers.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// The layer beneath the top and the top itself
    pub fn top_two(&self) -> Option<(&Layer, &Layer)> {
        match self.layers.as_slice() {
            [.., previous, top] => Some((previous, top)),
            _ => None,
        }
    }

    /// Like `top_two`, with the top mutable
    pub fn top_two_mut(&mut self) -> Option<(&Layer, &mut Layer)> {
        match self.layers.as_mut_slice() {
            [.., previous, top] => Some((&*previous, top)),
            _ => None,
        }
    }

    /// Forget every layer without touching world or scene
    fn forget_all(&mut self) {
        self.layers.clear();
    }
}

/// Everything one run of the game needs
pub struct GameSession<W: PhysicsWorld = RapierWorld, S: Scene = BoxScene> {
    pub settings: Settings,
    pub world: W,
    pub scene: S,
    pub camera: Camera,
    pub stack: Stack,
    pub debris: Debris,
    pub bridge: SimulationBridge,
    pub autopilot: Autopilot,
    pub phase: GamePhase,
    pub pilot: Pilot,
    /// Successful drops this run
    pub score: u32,
    /// Timestamp of the previous frame (ms); None until the first frame
    pub last_time: Option<f64>,
    events: Vec<GameEvent>,
}

impl GameSession<RapierWorld, BoxScene> {
    /// Session backed by Rapier and a retained box scene
    pub fn new(settings: Settings, seed: u64) -> Self {
        let world =
            RapierWorld::new(settings.gravity).with_solver_iterations(settings.solver_iterations);
        Self::with_parts(settings, world, BoxScene::new(), seed)
    }
}

impl<W: PhysicsWorld, S: Scene> GameSession<W, S> {
    /// Session over caller-supplied physics and scene backends
    pub fn with_parts(settings: Settings, world: W, scene: S, seed: u64) -> Self {
        let settings = settings.sanitized();
        Self {
            camera: Camera::new(settings.camera_width, 1.0),
            bridge: SimulationBridge::new(&settings),
            autopilot: Autopilot::new(seed, settings.autopilot_spread),
            settings,
            world,
            scene,
            stack: Stack::new(),
            debris: Debris::new(),
            phase: GamePhase::Idle,
            pilot: Pilot::Manual,
            score: 0,
            last_time: None,
            events: Vec::new(),
        }
    }

    /// Start the attract-mode demo
    pub fn start_demo(&mut self) {
        self.start(Pilot::Autopilot);
    }

    /// Start a game for the player
    pub fn start_game(&mut self) {
        self.start(Pilot::Manual);
    }

    /// Throw everything away and start a fresh player game
    pub fn restart(&mut self) {
        self.start_game();
    }

    /// Tear down and lay the foundation plus the first mover
    fn start(&mut self, pilot: Pilot) {
        self.world.clear();
        self.scene.clear();
        self.stack.forget_all();
        self.debris.forget_all();
        self.camera.reset();
        self.autopilot.redraw();

        self.phase = GamePhase::Active;
        self.pilot = pilot;
        self.score = 0;
        self.last_time = None;

        let size = self.settings.box_size;
        self.add_layer(Footprint::new(Vec3::ZERO, size, size), None);
        let first = Vec3::new(self.settings.spawn_offset, 0.0, 0.0);
        self.add_layer(Footprint::new(first, size, size), Some(Axis::X));

        log::info!("Game started ({:?})", pilot);
        self.events.push(GameEvent::Started { pilot });
    }

    /// Pointer/touch/space: start a real game from the demo, otherwise drop.
    /// Ignored once a player game has ended.
    pub fn interact(&mut self) {
        match (self.phase, self.pilot) {
            (GamePhase::Idle, _) | (_, Pilot::Autopilot) => self.start_game(),
            (GamePhase::Active, Pilot::Manual) => self.drop_layer(),
            (GamePhase::Ended, Pilot::Manual) => {}
        }
    }

    /// Freeze the mover and cut it against the layer below.
    ///
    /// A hit keeps the overlapping part, releases the rest as debris and
    /// spawns the next mover on the other axis. A miss ends the run. Does
    /// nothing unless a mover sits on top of another layer.
    ///
    /// Debris takes the colour of the layer about to be added, one hue step
    /// past the layer it was cut from.
    pub fn drop_layer(&mut self) {
        if self.phase != GamePhase::Active {
            return;
        }
        let color = self.layer_color(self.stack.len());
        let height = self.settings.box_height;

        let Some((previous, top)) = self.stack.top_two_mut() else {
            return;
        };
        let Some(axis) = top.axis else {
            return;
        };

        let overlap = compute_overlap(top.footprint(), previous.footprint(), axis);
        if !overlap.is_hit() {
            self.miss();
            return;
        }

        top.cut(&mut self.world, &mut self.scene, &overlap);
        let cut = *top.footprint();

        if !overlap.is_perfect() {
            let piece = overhang_footprint(&cut, &overlap);
            let mass = self.settings.overhang_mass_for(piece.width, piece.depth);
            let overhang = Overhang::spawn(&mut self.world, &mut self.scene, piece, height, mass, color);
            self.debris.push(overhang);
        }

        self.score = (self.stack.len() - 1) as u32;
        log::debug!(
            "Placed layer {} on {} (overlap {:.3}, overhang {:.3})",
            self.score,
            axis.as_str(),
            overlap.overlap,
            overlap.overhang
        );

        let (next, next_axis) = next_footprint(&cut, axis, height, self.settings.spawn_offset);
        self.add_layer(next, Some(next_axis));
        self.events.push(GameEvent::Placed { score: self.score });
    }

    /// End the run: the mover leaves the stack and falls as a whole
    pub fn miss(&mut self) {
        if self.phase != GamePhase::Active || self.stack.len() < 2 {
            return;
        }
        let color = self.layer_color(self.stack.len());
        let Some(failed) = self.stack.pop() else {
            return;
        };

        let footprint = *failed.footprint();
        failed.pair.despawn(&mut self.world, &mut self.scene);
        let mass = self
            .settings
            .overhang_mass_for(footprint.width, footprint.depth);
        let piece = Overhang::spawn(
            &mut self.world,
            &mut self.scene,
            footprint,
            self.settings.box_height,
            mass,
            color,
        );
        self.debris.push(piece);

        self.phase = GamePhase::Ended;
        log::info!("Game over ({:?}), score {}", self.pilot, self.score);
        self.events.push(GameEvent::Missed {
            score: self.score,
            pilot: self.pilot,
        });
    }

    /// Advance the mover by `elapsed_ms`: slide it (ending the run if it
    /// passes the travel limit), or let the autopilot drop it.
    pub fn advance_mover(&mut self, elapsed_ms: f32) {
        if self.phase != GamePhase::Active {
            return;
        }
        let Some((previous, top)) = self.stack.top_two_mut() else {
            return;
        };

        let should_move = match self.pilot {
            Pilot::Manual => true,
            Pilot::Autopilot => !self.autopilot.should_drop(top, previous),
        };

        if should_move {
            top.slide(
                &mut self.world,
                &mut self.scene,
                self.settings.slide_speed * elapsed_ms,
            );
            if top
                .coordinate()
                .is_some_and(|c| c > self.settings.travel_limit)
            {
                self.miss();
            }
        } else {
            self.drop_layer();
            self.autopilot.redraw();
        }
    }

    /// Raise the camera toward the settled part of the stack
    pub fn follow_camera(&mut self, elapsed_ms: f32) {
        let settled = self.stack.len() as f32 - 2.0;
        let target = self.settings.box_height * settled + self.settings.camera_lead;
        self.camera
            .follow(target, self.settings.slide_speed * elapsed_ms);
    }

    /// Colour of the layer at `index` on the stack
    pub fn layer_color(&self, index: usize) -> u32 {
        let hue = self.settings.hue_base + index as f32 * self.settings.hue_step;
        hsl_to_rgb(hue, 1.0, 0.5)
    }

    /// Take the events queued since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Push a layer one box above the current top
    fn add_layer(&mut self, mut footprint: Footprint, axis: Option<Axis>) {
        let index = self.stack.len();
        footprint.position.y = self.settings.box_height * index as f32;
        let color = self.layer_color(index);
        let layer = Layer::spawn(
            &mut self.world,
            &mut self.scene,
            footprint,
            self.settings.box_height,
            axis,
            color,
        );
        self.stack.push(layer);
    }
}

impl<W: PhysicsWorld> GameSession<W, BoxScene> {
    /// Borrowed view of everything the renderer draws
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            phase: self.phase,
            pilot: self.pilot,
            score: self.score,
            camera: &self.camera,
            scene: &self.scene,
        }
    }
}
