//! Axis-aligned collision geometry and collision notifications
//!
//! Bodies are centered on their physics position. Screen space: origin at the
//! top-left corner, +y pointing down, so `Edge::Top` is y = 0.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::EntityId;

/// Viewport edge touched by a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Edge::Left => "left",
            Edge::Right => "right",
            Edge::Top => "top",
            Edge::Bottom => "bottom",
        }
    }

    /// Reflect `velocity` so it points away from this edge (coefficient 1)
    pub fn reflect(&self, velocity: Vec2) -> Vec2 {
        match self {
            Edge::Left => Vec2::new(velocity.x.abs(), velocity.y),
            Edge::Right => Vec2::new(-velocity.x.abs(), velocity.y),
            Edge::Top => Vec2::new(velocity.x, velocity.y.abs()),
            Edge::Bottom => Vec2::new(velocity.x, -velocity.y.abs()),
        }
    }
}

/// Collision notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionEvent {
    /// `this` overlapped `other` (one event per check, no dedup)
    Body { this: EntityId, other: EntityId },
    /// `entity` is within the margin of `edge`
    Edge { entity: EntityId, edge: Edge },
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict overlap; boxes that only touch do not overlap
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// First viewport edge within `margin`, checked left, right, top, bottom
    pub fn touching_edge(&self, viewport: Vec2, margin: f32) -> Option<Edge> {
        if self.min.x <= margin {
            Some(Edge::Left)
        } else if self.max.x >= viewport.x - margin {
            Some(Edge::Right)
        } else if self.min.y <= margin {
            Some(Edge::Top)
        } else if self.max.y >= viewport.y - margin {
            Some(Edge::Bottom)
        } else {
            None
        }
    }
}

/// Hitbox attached to an entity with a physics body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBody2D {
    pub hitbox_size: Vec2,
}

impl RigidBody2D {
    pub fn new(hitbox_size: Vec2) -> Self {
        Self { hitbox_size }
    }

    /// Hitbox placed at `position`
    #[inline]
    pub fn aabb(&self, position: Vec2) -> Aabb {
        Aabb::from_center(position, self.hitbox_size)
    }
}
