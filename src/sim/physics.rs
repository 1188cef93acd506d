//! Per-entity kinematic state and Euler integration

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Kinematic state of one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsBody2D {
    /// Center of the body (pixels, screen space)
    pub position: Vec2,
    /// Pixels per second
    pub velocity: Vec2,
    /// Transient acceleration for the current tick; cleared by `integrate`
    pub acceleration: Vec2,
    pub mass: f32,
    /// Added to `acceleration.y` every tick (pixels/s², +y is down)
    pub gravity: f32,
    /// Fraction of velocity removed per tick, in [0, 1)
    pub friction: f32,
    /// Carried for hosts that resolve impacts; edge reflection ignores it
    pub restitution: f32,
    /// When set, velocity is rescaled to this magnitude after steering
    pub cruise_speed: Option<f32>,
}

impl Default for PhysicsBody2D {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            mass: 1.0,
            gravity: 0.0,
            friction: 0.0,
            restitution: 1.0,
            cruise_speed: None,
        }
    }
}

impl PhysicsBody2D {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            ..Default::default()
        }
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_cruise_speed(mut self, speed: f32) -> Self {
        self.cruise_speed = Some(speed);
        self
    }

    /// Accumulate a steering/force acceleration for this tick
    #[inline]
    pub fn accelerate(&mut self, acceleration: Vec2) {
        self.acceleration += acceleration;
    }

    /// Advance one tick: gravity, velocity (+friction, cruise speed), position.
    /// Acceleration is cleared afterwards.
    pub fn integrate(&mut self, dt: f32) {
        if self.gravity != 0.0 {
            self.acceleration.y += self.gravity;
        }

        let previous_velocity = self.velocity;
        self.velocity += self.acceleration * dt;
        if self.friction != 0.0 {
            self.velocity *= 1.0 - self.friction;
        }

        if let Some(speed) = self.cruise_speed {
            // Steering picks the heading, cruise speed the magnitude
            let heading = match self.velocity.try_normalize() {
                Some(dir) => dir,
                None => previous_velocity.normalize_or_zero(),
            };
            self.velocity = heading * speed;
        }

        self.position += self.velocity * dt;
        self.acceleration = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_gravity_accelerates_downward() {
        let mut body = PhysicsBody2D::default().with_gravity(600.0);
        body.integrate(DT);
        assert!((body.velocity.y - 10.0).abs() < 1e-4);
        assert!(body.position.y > 0.0);
        assert_eq!(body.acceleration, Vec2::ZERO);
    }

    #[test]
    fn test_acceleration_is_cleared_after_integrate() {
        let mut body = PhysicsBody2D::default();
        body.accelerate(Vec2::new(60.0, 0.0));
        body.integrate(DT);
        let v = body.velocity;
        body.integrate(DT);
        assert_eq!(body.velocity, v);
    }

    #[test]
    fn test_friction_decays_without_sign_reversal() {
        let mut body = PhysicsBody2D::new(Vec2::ZERO, Vec2::new(100.0, -50.0)).with_friction(0.1);
        let mut prev = body.velocity;
        for _ in 0..200 {
            body.integrate(DT);
            assert!((body.velocity.x - prev.x * 0.9).abs() < 1e-3);
            assert!((body.velocity.y - prev.y * 0.9).abs() < 1e-3);
            assert!(body.velocity.x >= 0.0 && body.velocity.y <= 0.0);
            assert!(body.velocity.length() < prev.length());
            prev = body.velocity;
        }
        assert!(body.velocity.length() < 1e-3);
    }

    #[test]
    fn test_cruise_speed_fixes_magnitude() {
        let mut body = PhysicsBody2D::new(Vec2::ZERO, Vec2::new(10.0, 0.0)).with_cruise_speed(60.0);
        body.accelerate(Vec2::new(0.0, 600.0));
        body.integrate(DT);
        assert!((body.velocity.length() - 60.0).abs() < 1e-3);
        assert!(body.velocity.y > 0.0);
    }

    #[test]
    fn test_cruise_speed_keeps_heading_when_steering_cancels_velocity() {
        let mut body = PhysicsBody2D::new(Vec2::ZERO, Vec2::new(1.0, 0.0)).with_cruise_speed(60.0);
        body.accelerate(Vec2::new(-2.0, 0.0));
        body.integrate(0.5);
        assert_eq!(body.velocity, Vec2::new(60.0, 0.0));
    }

    proptest! {
        #[test]
        fn prop_pure_drift(
            px in -500.0f32..500.0, py in -500.0f32..500.0,
            vx in -200.0f32..200.0, vy in -200.0f32..200.0,
            n in 1usize..240,
        ) {
            let p0 = Vec2::new(px, py);
            let v = Vec2::new(vx, vy);
            let mut body = PhysicsBody2D::new(p0, v);
            for _ in 0..n {
                body.integrate(DT);
            }
            let expected = p0 + v * (n as f32 * DT);
            prop_assert!((body.position - expected).length() < 5e-2);
            prop_assert_eq!(body.velocity, v);
        }
    }
}
