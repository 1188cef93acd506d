//! Flocking scene: a flat sequence of boids steered from neighbor queries
//!
//! Per tick:
//! 1. Read one settings snapshot (every boid in the tick sees the same values)
//! 2. Capture positions/velocities of all enabled boids
//! 3. Compute steering for each boid against that capture
//! 4. Integrate, wrap around the viewport, write the sprite

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

use super::arena::EntityArena;
use super::boid::{
    Boid, BoidReport, BoidState, flock_steering, follows_leader, heading_variance, place_flock,
    seek,
};
use super::entity::{EntityBuilder, EntityId};
use super::physics::PhysicsBody2D;
use super::scene::{
    InputState, Scene, ScenePhase, UiSignal, Viewport, ensure_valid, remap_entities,
    validated_viewport,
};
use super::sprite::Sprite;
use crate::consts::*;
use crate::error::SimError;
use crate::random::SeededRandom;
use crate::settings::Settings;
use crate::store::{SettingsStore, Subscription};

/// Startup parameters for a flock
#[derive(Debug, Clone)]
pub struct FlockConfig {
    pub boid_count: usize,
    /// Seed for reproducible placement; `None` places differently every run
    pub seed: Option<u32>,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            boid_count: 20,
            seed: None,
        }
    }
}

pub struct FlockScene {
    config: FlockConfig,
    store: SettingsStore,
    subscription: Option<Subscription>,
    /// Bumped by the store listener on every settings edit
    settings_changes: Rc<Cell<u64>>,
    seen_settings_changes: u64,
    arena: EntityArena,
    boids: Vec<Boid>,
    rng: SeededRandom,
    viewport: Viewport,
    phase: ScenePhase,
    input: InputState,
    leader_tinted: bool,
    next_spawn_index: usize,
    tick_count: u64,
}

impl FlockScene {
    pub fn new(config: FlockConfig, store: SettingsStore, viewport: Viewport) -> Self {
        let rng = SeededRandom::from_seed(config.seed);
        Self {
            config,
            store,
            subscription: None,
            settings_changes: Rc::new(Cell::new(0)),
            seen_settings_changes: 0,
            arena: EntityArena::new(),
            boids: Vec::new(),
            rng,
            viewport,
            phase: ScenePhase::Idle,
            input: InputState::default(),
            leader_tinted: false,
            next_spawn_index: 0,
            tick_count: 0,
        }
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn arena(&self) -> &EntityArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut EntityArena {
        &mut self.arena
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Settings edits this scene has been notified about
    pub fn settings_changes_seen(&self) -> u64 {
        self.settings_changes.get()
    }

    /// Pointer input goes to the simulation (rather than the page) right now
    pub fn captures_input(&self) -> bool {
        self.phase == ScenePhase::Active && !self.input.menu_open
    }

    pub fn controls_visible(&self) -> bool {
        self.input.controls_visible()
    }

    /// Pointer position in viewport coordinates; becomes the leader's target
    pub fn pointer_moved(&mut self, position: Vec2) {
        if self.captures_input() {
            self.input.pointer = Some(position);
        }
    }

    pub fn pointer_left(&mut self) {
        self.input.pointer = None;
    }

    /// Add one boid at `position` with a random heading
    pub fn add_boid(&mut self, position: Vec2) -> Result<EntityId, SimError> {
        if self.phase != ScenePhase::Active {
            return Err(SimError::SceneInactive(self.phase));
        }
        let angle = self
            .rng
            .random_float(-std::f32::consts::PI, std::f32::consts::PI);
        let speed = self.store.snapshot().speed * SPEED_SCALE;
        self.spawn_boid(position, Vec2::from_angle(angle), speed)
    }

    /// Remove a boid; other boids are unaffected
    pub fn remove_boid(&mut self, entity: EntityId) -> bool {
        if self.phase != ScenePhase::Active {
            log::warn!("remove_boid: flock scene is {:?}, ignored", self.phase);
            return false;
        }
        let Some(pos) = self.boids.iter().position(|b| b.entity == entity) else {
            return false;
        };
        self.boids.remove(pos);
        self.arena.destroy(entity)
    }

    /// Current position/velocity of every boid, in flock order
    pub fn reports(&self) -> Vec<BoidReport> {
        let leader_enabled = self.store.snapshot().leader_boid_enabled;
        self.boids
            .iter()
            .filter_map(|boid| {
                let physics = self.arena.get(boid.entity)?.physics()?;
                Some(BoidReport {
                    id: boid.entity,
                    spawn_index: boid.spawn_index,
                    leader: boid.is_leader && leader_enabled,
                    position: physics.position,
                    velocity: physics.velocity,
                })
            })
            .collect()
    }

    /// Circular variance of the flock's headings
    pub fn heading_variance(&self) -> f32 {
        heading_variance(
            self.boids
                .iter()
                .filter_map(|b| self.arena.get(b.entity)?.physics().map(|p| p.velocity)),
        )
    }

    fn spawn_boid(&mut self, position: Vec2, heading: Vec2, speed: f32) -> Result<EntityId, SimError> {
        let spawn_index = self.next_spawn_index;
        let is_leader = spawn_index == 0;
        let physics = PhysicsBody2D::new(position, heading * speed).with_cruise_speed(speed);
        let entity = self.arena.spawn(
            EntityBuilder::new(format!("boid-{}", spawn_index))
                .size(BOID_SIZE)
                .sprite(Sprite::tinted(BOID_SIZE, BOID_COLOR))
                .physics(physics),
        )?;
        self.next_spawn_index += 1;
        self.boids.push(Boid {
            entity,
            spawn_index,
            is_leader,
        });
        Ok(entity)
    }

    /// Keep the leader's tint in step with the leader setting
    fn sync_leader_tint(&mut self, leader_enabled: bool) {
        if leader_enabled == self.leader_tinted {
            return;
        }
        let color = if leader_enabled { LEADER_COLOR } else { BOID_COLOR };
        let leader = self.boids.iter().find(|b| b.is_leader).map(|b| b.entity);
        if let Some(sprite) = leader
            .and_then(|id| self.arena.get_mut(id))
            .and_then(|e| e.sprite_mut())
        {
            sprite.set_color(color);
        }
        self.leader_tinted = leader_enabled;
    }

    fn steer_all(&mut self, settings: &Settings, dt: f32) {
        // (flock index, state) for every boid that takes part this tick
        let live: Vec<(usize, BoidState)> = self
            .boids
            .iter()
            .enumerate()
            .filter_map(|(i, boid)| {
                let entity = self.arena.get(boid.entity)?;
                if entity.is_disabled() {
                    return None;
                }
                let physics = entity.physics()?;
                Some((
                    i,
                    BoidState {
                        position: physics.position,
                        velocity: physics.velocity,
                    },
                ))
            })
            .collect();
        let states: Vec<BoidState> = live.iter().map(|(_, s)| *s).collect();

        let leader_position = if settings.leader_boid_enabled {
            live.iter()
                .find(|(i, _)| self.boids[*i].is_leader)
                .map(|(_, s)| s.position)
        } else {
            None
        };
        let target_speed = settings.speed * SPEED_SCALE;

        let steering: Vec<Vec2> = live
            .iter()
            .enumerate()
            .map(|(k, (i, state))| {
                let boid = &self.boids[*i];
                match leader_position {
                    Some(_) if boid.is_leader => match self.input.pointer {
                        Some(target) => seek(state.position, target, LEADER_TRACK_GAIN),
                        None => Vec2::ZERO,
                    },
                    Some(leader)
                        if follows_leader(boid.spawn_index, settings.leader_follow_fraction) =>
                    {
                        flock_steering(k, &states, settings)
                            + seek(state.position, leader, LEADER_FOLLOW_GAIN)
                    }
                    _ => flock_steering(k, &states, settings),
                }
            })
            .collect();

        for ((i, _), accel) in live.iter().zip(steering) {
            let Some(entity) = self.arena.get_mut(self.boids[*i].entity) else {
                continue;
            };
            if let Some(physics) = entity.physics_mut() {
                physics.cruise_speed = Some(target_speed);
                physics.accelerate(accel);
            }
            entity.integrate(dt);
            if let Some(physics) = entity.physics_mut() {
                physics.position = self.viewport.wrap(physics.position);
            }
            entity.sync_sprite();
        }
    }
}

impl Scene for FlockScene {
    fn create(&mut self) -> Result<(), SimError> {
        if self.phase != ScenePhase::Idle {
            log::warn!("create: flock scene is {:?}, ignored", self.phase);
            return Ok(());
        }
        ensure_valid(&self.viewport)?;

        let counter = Rc::clone(&self.settings_changes);
        self.subscription = Some(self.store.subscribe(move || counter.set(counter.get() + 1)));

        let speed = self.store.snapshot().speed * SPEED_SCALE;
        let placements = place_flock(&mut self.rng, self.config.boid_count, &self.viewport);
        for placement in placements {
            self.spawn_boid(placement.position, placement.heading, speed)?;
        }

        self.phase = ScenePhase::Active;
        log::info!(
            "Flock created: {} boids, seed {:?}, viewport {}x{}",
            self.boids.len(),
            self.config.seed,
            self.viewport.width,
            self.viewport.height
        );
        Ok(())
    }

    fn update(&mut self, dt: f32) {
        if self.phase != ScenePhase::Active {
            return;
        }

        let settings = self.store.snapshot();
        let changes = self.settings_changes.get();
        if changes != self.seen_settings_changes {
            log::debug!("Tick {}: applying settings {:?}", self.tick_count, settings);
            self.seen_settings_changes = changes;
        }

        // Drop boids whose entity was destroyed elsewhere
        let arena = &self.arena;
        self.boids.retain(|b| arena.contains(b.entity));

        self.sync_leader_tint(settings.leader_boid_enabled);
        self.steer_all(&settings, dt);
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
        log::info!(
            "Flock resized {}x{} -> {}x{}",
            self.viewport.width,
            self.viewport.height,
            new.width,
            new.height
        );
        self.viewport = new;
    }

    fn shutdown(&mut self) {
        if self.phase == ScenePhase::ShutDown {
            return;
        }
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.arena.clear();
        self.boids.clear();
        self.input = InputState::default();
        self.phase = ScenePhase::ShutDown;
        log::info!("Flock shut down after {} ticks", self.tick_count);
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
