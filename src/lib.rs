//! Flockwork - a minimal real-time 2D entity runtime with Boids flocking
//!
//! Core modules:
//! - `sim`: Per-frame simulation (physics, collisions, entities, scenes, flocking)
//! - `random`: Seeded/unseeded scalar generator for reproducible placement
//! - `settings`: Flocking tunables and their UI ranges
//! - `store`: Observable store synchronizing tunables between UI and sim loop
//! - `error`: Library error type

pub mod error;
pub mod random;
pub mod settings;
pub mod sim;
pub mod store;

pub use error::SimError;
pub use random::SeededRandom;
pub use settings::Settings;
pub use store::{SettingsStore, Subscription, SyncedStore};

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the host driver (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// `speed` tunable to pixels/second
    pub const SPEED_SCALE: f32 = 100.0;
    /// Steering responsiveness for alignment/cohesion (1/s)
    pub const STEER_RATE: f32 = 10.0;
    /// Separation threshold as a fraction of the flock search radius
    pub const SEPARATION_RATIO: f32 = 0.3;
    /// Separation acceleration at the threshold distance (pixels/s²)
    pub const SEPARATION_GAIN: f32 = 60.0;
    /// Leader pull toward the pointer target (1/s²)
    pub const LEADER_TRACK_GAIN: f32 = 4.0;
    /// Follower pull toward the leader (1/s²)
    pub const LEADER_FOLLOW_GAIN: f32 = 1.5;

    /// Boid sprite size in pixels
    pub const BOID_SIZE: f32 = 6.0;
    /// Bounce ball size in pixels
    pub const BALL_SIZE: f32 = 16.0;
    /// Distance from the viewport border that counts as touching an edge
    pub const EDGE_MARGIN: f32 = 0.0;

    /// Sprite colors (0xRRGGBB)
    pub const BOID_COLOR: u32 = 0xDCDCDC;
    pub const LEADER_COLOR: u32 = 0xFF4040;
    pub const BALL_COLOR: u32 = 0x40A0FF;
    pub const HIT_COLOR: u32 = 0xFFD040;
}

/// Heading angle of a velocity (radians, 0 = +x)
#[inline]
pub fn heading(velocity: glam::Vec2) -> f32 {
    velocity.y.atan2(velocity.x)
}
