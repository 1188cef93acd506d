//! Boid steering rules and seeded flock placement
//!
//! Each non-leader boid follows three rules over neighbors within the search radius:
//! 1. Alignment: steer toward the neighbors' average velocity
//! 2. Cohesion: steer toward the neighbors' centroid
//! 3. Separation: push away from neighbors that are too close, weighted by 1/distance
//!
//! Steering sets the heading only; the physics body's cruise speed sets the magnitude.
//! Neighbor search is a plain scan over the flock (O(n²) per tick).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use super::scene::Viewport;
use crate::consts::*;
use crate::random::SeededRandom;
use crate::settings::Settings;

/// A member of the flock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boid {
    pub entity: EntityId,
    /// Position in the flock sequence at spawn time
    pub spawn_index: usize,
    /// Boid 0 carries the flag; it only leads while the leader setting is on
    pub is_leader: bool,
}

/// Kinematic view of one boid, as captured at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoidState {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Emitted per boid for hosts and the headless driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoidReport {
    pub id: EntityId,
    pub spawn_index: usize,
    pub leader: bool,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Initial placement for one boid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec2,
    pub heading: Vec2,
}

/// Place `count` boids uniformly inside the viewport with random headings
///
/// Draw order is fixed (x, y, angle per boid) so a seeded generator reproduces
/// the same flock.
pub fn place_flock(rng: &mut SeededRandom, count: usize, viewport: &Viewport) -> Vec<Placement> {
    (0..count)
        .map(|_| {
            let x = rng.random_float(0.0, viewport.width);
            let y = rng.random_float(0.0, viewport.height);
            let angle = rng.random_float(-std::f32::consts::PI, std::f32::consts::PI);
            Placement {
                position: Vec2::new(x, y),
                heading: Vec2::from_angle(angle),
            }
        })
        .collect()
}

/// Whether boid `spawn_index` is one of the leader's followers
///
/// Spreads `fraction` of the flock evenly across spawn order.
pub fn follows_leader(spawn_index: usize, fraction: f32) -> bool {
    let f = fraction.clamp(0.0, 1.0);
    let i = spawn_index as f32;
    ((i + 1.0) * f).floor() > (i * f).floor()
}

/// Flock-rule steering for boid `index` against the tick snapshot
pub fn flock_steering(index: usize, flock: &[BoidState], settings: &Settings) -> Vec2 {
    let me = flock[index];
    let radius_sq = settings.flock_search_radius * settings.flock_search_radius;
    let separation_distance = settings.flock_search_radius * SEPARATION_RATIO;

    let mut velocity_sum = Vec2::ZERO;
    let mut position_sum = Vec2::ZERO;
    let mut repulsion = Vec2::ZERO;
    let mut count = 0usize;

    for (j, other) in flock.iter().enumerate() {
        if j == index {
            continue;
        }
        let offset = me.position - other.position;
        let dist_sq = offset.length_squared();
        if dist_sq >= radius_sq {
            continue;
        }
        velocity_sum += other.velocity;
        position_sum += other.position;
        count += 1;

        let dist = dist_sq.sqrt();
        if dist > 0.0 && dist < separation_distance {
            repulsion += offset / dist * (separation_distance / dist);
        }
    }

    if count == 0 {
        return Vec2::ZERO;
    }

    let n = count as f32;
    let alignment = (velocity_sum / n - me.velocity) * settings.alignment_factor * STEER_RATE;
    let cohesion = (position_sum / n - me.position) * settings.cohesion_factor * STEER_RATE;
    let separation = repulsion * settings.separation_factor * SEPARATION_GAIN;
    alignment + cohesion + separation
}

/// Pull toward a point (leader tracking its target, followers tracking the leader)
#[inline]
pub fn seek(from: Vec2, to: Vec2, gain: f32) -> Vec2 {
    (to - from) * gain
}

/// Circular variance of headings: 0 when all agree, near 1 when scattered
pub fn heading_variance(velocities: impl IntoIterator<Item = Vec2>) -> f32 {
    let mut sum = Vec2::ZERO;
    let mut count = 0usize;
    for v in velocities {
        sum += v.normalize_or_zero();
        count += 1;
    }
    if count == 0 {
        return 0.0;
    }
    1.0 - (sum / count as f32).length()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(x: f32, y: f32, vx: f32, vy: f32) -> BoidState {
        BoidState {
            position: Vec2::new(x, y),
            velocity: Vec2::new(vx, vy),
        }
    }

    #[test]
    fn test_normalize_zero_is_zero_not_nan() {
        assert_eq!(Vec2::ZERO.normalize_or_zero(), Vec2::ZERO);
    }

    #[test]
    fn test_lonely_boid_has_no_steering() {
        let flock = [state(0.0, 0.0, 1.0, 0.0), state(500.0, 500.0, -1.0, 0.0)];
        assert_eq!(flock_steering(0, &flock, &Settings::default()), Vec2::ZERO);
    }

    #[test]
    fn test_alignment_turns_toward_neighbor_heading() {
        let settings = Settings {
            cohesion_factor: 0.0,
            separation_factor: 0.0,
            ..Default::default()
        };
        let flock = [state(0.0, 0.0, 60.0, 0.0), state(50.0, 0.0, 0.0, 60.0)];
        let steer = flock_steering(0, &flock, &settings);
        assert!(steer.y > 0.0);
        assert!(steer.x < 0.0);
    }

    #[test]
    fn test_cohesion_pulls_toward_centroid() {
        let settings = Settings {
            alignment_factor: 0.0,
            separation_factor: 0.0,
            ..Default::default()
        };
        let flock = [
            state(0.0, 0.0, 0.0, 0.0),
            state(60.0, 10.0, 0.0, 0.0),
            state(60.0, -10.0, 0.0, 0.0),
        ];
        let steer = flock_steering(0, &flock, &settings);
        assert!(steer.x > 0.0);
        assert!(steer.y.abs() < 1e-4);
    }

    #[test]
    fn test_separation_pushes_apart_and_grows_when_closer() {
        let settings = Settings {
            alignment_factor: 0.0,
            cohesion_factor: 0.0,
            ..Default::default()
        };
        let near = [state(0.0, 0.0, 0.0, 0.0), state(5.0, 0.0, 0.0, 0.0)];
        let far = [state(0.0, 0.0, 0.0, 0.0), state(20.0, 0.0, 0.0, 0.0)];
        let near_steer = flock_steering(0, &near, &settings);
        let far_steer = flock_steering(0, &far, &settings);
        assert!(near_steer.x < 0.0 && far_steer.x < 0.0);
        assert!(near_steer.length() > far_steer.length());
    }

    #[test]
    fn test_coincident_boids_do_not_produce_nan() {
        let flock = [state(10.0, 10.0, 1.0, 0.0), state(10.0, 10.0, 0.0, 1.0)];
        let steer = flock_steering(0, &flock, &Settings::default());
        assert!(steer.is_finite());
    }

    #[test]
    fn test_follower_fraction_is_spread_evenly() {
        let followers = (0..20).filter(|&i| follows_leader(i, 0.25)).count();
        assert_eq!(followers, 5);
        assert!((0..20).all(|i| !follows_leader(i, 0.0)));
        assert!((0..20).all(|i| follows_leader(i, 1.0)));
    }

    #[test]
    fn test_heading_variance_bounds() {
        let aligned = [Vec2::X, Vec2::X * 3.0, Vec2::X * 0.5];
        assert!(heading_variance(aligned).abs() < 1e-6);
        let opposed = [Vec2::X, -Vec2::X];
        assert!((heading_variance(opposed) - 1.0).abs() < 1e-6);
        assert_eq!(heading_variance(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_seeded_placement_is_reproducible_and_inside_viewport() {
        let vp = Viewport::new(320.0, 240.0);
        let a = place_flock(&mut SeededRandom::seeded(1234), 20, &vp);
        let b = place_flock(&mut SeededRandom::seeded(1234), 20, &vp);
        assert_eq!(a, b);
        for p in &a {
            assert!(p.position.x >= 0.0 && p.position.x <= vp.width);
            assert!(p.position.y >= 0.0 && p.position.y <= vp.height);
            assert!((p.heading.length() - 1.0).abs() < 1e-4);
        }
    }
}
