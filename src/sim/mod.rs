//! Per-frame simulation module
//!
//! Everything that runs inside the host's frame callback lives here:
//! - Kinematics and AABB collision notifications
//! - Entity registry with generation-checked handles
//! - Scene lifecycle (create/update/resize/shutdown)
//! - Boids flocking and the bounce sibling scene
//!
//! Nothing here renders: sprites are plain data for an external renderer.

pub mod arena;
pub mod boid;
pub mod bounce;
pub mod entity;
pub mod flock;
pub mod physics;
pub mod rigid;
pub mod scene;
pub mod sprite;

pub use arena::{EntityArena, live_serials};
pub use boid::{Boid, BoidReport, BoidState, heading_variance, place_flock};
pub use bounce::{BounceConfig, BounceScene, CollisionCounts};
pub use entity::{Entity, EntityBuilder, EntityId};
pub use flock::{FlockConfig, FlockScene};
pub use physics::PhysicsBody2D;
pub use rigid::{Aabb, CollisionEvent, Edge, RigidBody2D};
pub use scene::{Scene, ScenePhase, UiSignal, Viewport};
pub use sprite::{Paint, Sprite};
