//! Bounce scene: bodies with hitboxes reacting to collision notifications
//!
//! Same lifecycle as the flock, but instead of neighbor steering every tick runs
//! edge checks and pairwise body checks, then reacts to the emitted events:
//! - Edge: reflect the velocity component orthogonal to that edge
//! - Body: tint both sprites for that tick

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arena::EntityArena;
use super::entity::{EntityBuilder, EntityId};
use super::physics::PhysicsBody2D;
use super::rigid::CollisionEvent;
use super::scene::{
    InputState, Scene, ScenePhase, UiSignal, Viewport, ensure_valid, remap_entities,
    validated_viewport,
};
use super::sprite::Sprite;
use crate::consts::*;
use crate::error::SimError;
use crate::random::SeededRandom;

/// Startup parameters for the bounce scene
#[derive(Debug, Clone)]
pub struct BounceConfig {
    pub ball_count: usize,
    pub seed: Option<u32>,
    /// Initial speed range (pixels/second)
    pub min_speed: f32,
    pub max_speed: f32,
    /// Downward acceleration (pixels/s²)
    pub gravity: f32,
}

impl Default for BounceConfig {
    fn default() -> Self {
        Self {
            ball_count: 12,
            seed: None,
            min_speed: 60.0,
            max_speed: 180.0,
            gravity: 0.0,
        }
    }
}

/// Running collision totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionCounts {
    pub edge: u64,
    pub body: u64,
}

pub struct BounceScene {
    config: BounceConfig,
    arena: EntityArena,
    rng: SeededRandom,
    viewport: Viewport,
    phase: ScenePhase,
    input: InputState,
    events: Vec<CollisionEvent>,
    counts: CollisionCounts,
    /// Balls ever spawned; numbers ball names
    spawned: u64,
    tick_count: u64,
}

impl BounceScene {
    pub fn new(config: BounceConfig, viewport: Viewport) -> Self {
        let rng = SeededRandom::from_seed(config.seed);
        Self {
            config,
            arena: EntityArena::new(),
            rng,
            viewport,
            phase: ScenePhase::Idle,
            input: InputState::default(),
            events: Vec::new(),
            counts: CollisionCounts::default(),
            spawned: 0,
            tick_count: 0,
        }
    }

    pub fn arena(&self) -> &EntityArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut EntityArena {
        &mut self.arena
    }

    pub fn counts(&self) -> CollisionCounts {
        self.counts
    }

    /// Events raised during the most recent tick
    pub fn last_events(&self) -> &[CollisionEvent] {
        &self.events
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn controls_visible(&self) -> bool {
        self.input.controls_visible()
    }

    /// Spawn one ball; used at creation and for user-added balls
    pub fn spawn_ball(&mut self, position: Vec2, velocity: Vec2) -> Result<EntityId, SimError> {
        let physics = PhysicsBody2D::new(position, velocity).with_gravity(self.config.gravity);
        let id = self.arena.spawn(
            EntityBuilder::new(format!("ball-{}", self.spawned))
                .size(BALL_SIZE)
                .sprite(Sprite::filled(BALL_SIZE, BALL_COLOR))
                .physics(physics)
                .rigid(Vec2::splat(BALL_SIZE)),
        )?;
        self.spawned += 1;
        Ok(id)
    }

    fn react(&mut self) {
        let events = std::mem::take(&mut self.events);
        for event in &events {
            match *event {
                CollisionEvent::Edge { entity, edge } => {
                    self.counts.edge += 1;
                    if let Some(physics) = self.arena.get_mut(entity).and_then(|e| e.physics_mut()) {
                        physics.velocity = edge.reflect(physics.velocity);
                    }
                }
                CollisionEvent::Body { this, other } => {
                    self.counts.body += 1;
                    for id in [this, other] {
                        if let Some(sprite) = self.arena.get_mut(id).and_then(|e| e.sprite_mut()) {
                            sprite.set_color(HIT_COLOR);
                        }
                    }
                }
            }
        }
        self.events = events;
    }
}

impl Scene for BounceScene {
    fn create(&mut self) -> Result<(), SimError> {
        if self.phase != ScenePhase::Idle {
            log::warn!("create: bounce scene is {:?}, ignored", self.phase);
            return Ok(());
        }
        ensure_valid(&self.viewport)?;
        let inset = BALL_SIZE;
        for _ in 0..self.config.ball_count {
            let x = self.rng.random_float(inset, self.viewport.width - inset);
            let y = self.rng.random_float(inset, self.viewport.height - inset);
            let angle = self
                .rng
                .random_float(-std::f32::consts::PI, std::f32::consts::PI);
            let speed = self
                .rng
                .random_float(self.config.min_speed, self.config.max_speed);
            self.spawn_ball(Vec2::new(x, y), Vec2::from_angle(angle) * speed)?;
        }
        self.phase = ScenePhase::Active;
        log::info!("Bounce scene created: {} balls", self.arena.len());
        Ok(())
    }

    fn update(&mut self, dt: f32) {
        if self.phase != ScenePhase::Active {
            return;
        }
        self.events.clear();

        for entity in self.arena.iter_mut() {
            entity.integrate(dt);
            if let Some(sprite) = entity.sprite_mut() {
                sprite.set_color(BALL_COLOR);
            }
        }

        let ids = self.arena.ids();
        for (i, &a) in ids.iter().enumerate() {
            let Some(first) = self.arena.get(a) else {
                continue;
            };
            first.check_collide_screen_edge(
                self.viewport.width,
                self.viewport.height,
                EDGE_MARGIN,
                &mut self.events,
            );
            for &b in &ids[i + 1..] {
                if let Some(second) = self.arena.get(b) {
                    first.check_body_on_body_collision(second, &mut self.events);
                }
            }
        }

        self.react();
        for entity in self.arena.iter_mut() {
            entity.sync_sprite();
        }
        self.tick_count += 1;
    }

    fn resize(&mut self, width: Option<f32>, height: Option<f32>) {
        if self.phase == ScenePhase::ShutDown {
            return;
        }
        let Some(new) = validated_viewport(width, height) else {
            return;
        };
        remap_entities(&mut self.arena, &self.viewport, &new);
        self.viewport = new;
    }

    fn shutdown(&mut self) {
        if self.phase == ScenePhase::ShutDown {
            return;
        }
        self.arena.clear();
        self.events.clear();
        self.phase = ScenePhase::ShutDown;
        log::info!(
            "Bounce scene shut down: {} edge hits, {} body hits",
            self.counts.edge,
            self.counts.body
        );
    }

    fn handle_signal(&mut self, signal: UiSignal) {
        if self.phase == ScenePhase::ShutDown {
            return;
        }
        self.input.handle_signal(signal);
    }

    fn phase(&self) -> ScenePhase {
        self.phase
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}
