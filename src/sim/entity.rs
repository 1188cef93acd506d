//! Simulated entities: identity, enable/disable, optional physics and hitbox
//!
//! Entities are created through [`EntityBuilder`] and live in an
//! [`EntityArena`](super::arena::EntityArena), which hands out the ids.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::PhysicsBody2D;
use super::rigid::{CollisionEvent, RigidBody2D};
use super::sprite::Sprite;
use crate::error::SimError;

/// Generation-tagged handle to an arena slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    pub index: u32,
    pub generation: u32,
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// A simulated object
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    serial: u64,
    pub name: String,
    disabled: bool,
    pub size: f32,
    sprite: Option<Sprite>,
    physics: Option<PhysicsBody2D>,
    rigid: Option<RigidBody2D>,
}

impl Entity {
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Strictly increasing creation number
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn sprite(&self) -> Option<&Sprite> {
        self.sprite.as_ref()
    }

    pub fn sprite_mut(&mut self) -> Option<&mut Sprite> {
        self.sprite.as_mut()
    }

    pub fn physics(&self) -> Option<&PhysicsBody2D> {
        self.physics.as_ref()
    }

    pub fn physics_mut(&mut self) -> Option<&mut PhysicsBody2D> {
        self.physics.as_mut()
    }

    pub fn rigid(&self) -> Option<&RigidBody2D> {
        self.rigid.as_ref()
    }

    pub fn position(&self) -> Option<Vec2> {
        self.physics.as_ref().map(|p| p.position)
    }

    /// Stop physics and collisions for this entity and hide its sprite
    pub fn disable(&mut self) {
        self.disabled = true;
        if let Some(sprite) = &mut self.sprite {
            sprite.visible = false;
        }
    }

    pub fn enable(&mut self) {
        self.disabled = false;
        if let Some(sprite) = &mut self.sprite {
            sprite.visible = true;
        }
    }

    /// Advance physics one tick; no-op when disabled or without a body
    pub fn integrate(&mut self, dt: f32) {
        if self.disabled {
            return;
        }
        if let Some(physics) = &mut self.physics {
            physics.integrate(dt);
        }
    }

    /// Copy position and heading onto the sprite, if there is one
    pub fn sync_sprite(&mut self) {
        let (Some(sprite), Some(physics)) = (&mut self.sprite, &self.physics) else {
            return;
        };
        sprite.position = physics.position;
        if physics.velocity != Vec2::ZERO {
            sprite.rotation = crate::heading(physics.velocity);
        }
    }

    /// Emit a `Body` event if this entity's hitbox overlaps `other`'s
    pub fn check_body_on_body_collision(&self, other: &Entity, events: &mut Vec<CollisionEvent>) {
        if self.disabled || other.disabled || self.id == other.id {
            return;
        }
        let (Some(a), Some(b)) = (self.hitbox(), other.hitbox()) else {
            return;
        };
        if a.overlaps(&b) {
            log::debug!("Body collision {} -> {}", self.id, other.id);
            events.push(CollisionEvent::Body {
                this: self.id,
                other: other.id,
            });
        }
    }

    /// Emit an `Edge` event for the first viewport edge within `margin`
    pub fn check_collide_screen_edge(
        &self,
        viewport_width: f32,
        viewport_height: f32,
        margin: f32,
        events: &mut Vec<CollisionEvent>,
    ) {
        if self.disabled {
            return;
        }
        let Some(aabb) = self.hitbox() else {
            return;
        };
        if let Some(edge) = aabb.touching_edge(Vec2::new(viewport_width, viewport_height), margin) {
            events.push(CollisionEvent::Edge {
                entity: self.id,
                edge,
            });
        }
    }

    fn hitbox(&self) -> Option<super::rigid::Aabb> {
        let rigid = self.rigid.as_ref()?;
        let physics = self.physics.as_ref()?;
        Some(rigid.aabb(physics.position))
    }

    /// Release the sprite and drop physics/hitbox
    pub(crate) fn release(&mut self) {
        self.sprite = None;
        self.rigid = None;
        self.physics = None;
        self.disabled = true;
    }
}

/// Description of an entity to spawn
#[derive(Debug, Clone, Default)]
pub struct EntityBuilder {
    name: String,
    size: f32,
    sprite: Option<Sprite>,
    physics: Option<PhysicsBody2D>,
    rigid: Option<RigidBody2D>,
}

impl EntityBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn sprite(mut self, sprite: Sprite) -> Self {
        self.sprite = Some(sprite);
        self
    }

    pub fn physics(mut self, physics: PhysicsBody2D) -> Self {
        self.physics = Some(physics);
        self
    }

    /// Attach a hitbox; requires `physics` as well
    pub fn rigid(mut self, hitbox_size: Vec2) -> Self {
        self.rigid = Some(RigidBody2D::new(hitbox_size));
        self
    }

    pub(crate) fn build(self, id: EntityId, serial: u64) -> Result<Entity, SimError> {
        if self.rigid.is_some() && self.physics.is_none() {
            return Err(SimError::RigidWithoutPhysics(self.name));
        }
        let mut entity = Entity {
            id,
            serial,
            name: self.name,
            disabled: false,
            size: self.size,
            sprite: self.sprite,
            physics: self.physics,
            rigid: self.rigid,
        };
        entity.sync_sprite();
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn make(index: u32, pos: Vec2, hitbox: Vec2) -> Entity {
        EntityBuilder::new(format!("e{}", index))
            .physics(PhysicsBody2D::new(pos, Vec2::new(5.0, -3.0)))
            .rigid(hitbox)
            .sprite(Sprite::filled(hitbox.x, 0xFFFFFF))
            .build(EntityId { index, generation: 0 }, index as u64)
            .unwrap()
    }

    #[test]
    fn test_rigid_without_physics_is_rejected() {
        let result = EntityBuilder::new("ghost")
            .rigid(Vec2::splat(4.0))
            .build(EntityId { index: 0, generation: 0 }, 0);
        assert!(matches!(result, Err(SimError::RigidWithoutPhysics(name)) if name == "ghost"));
    }

    #[test]
    fn test_overlap_emits_one_event_per_check() {
        let a = make(0, Vec2::new(10.0, 10.0), Vec2::splat(8.0));
        let b = make(1, Vec2::new(14.0, 12.0), Vec2::splat(8.0));
        let mut events = Vec::new();
        a.check_body_on_body_collision(&b, &mut events);
        a.check_body_on_body_collision(&b, &mut events);
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            CollisionEvent::Body {
                this: a.id(),
                other: b.id()
            }
        );
    }

    #[test]
    fn test_disabled_entity_is_inert() {
        let mut a = make(0, Vec2::new(2.0, 2.0), Vec2::splat(8.0));
        let b = make(1, Vec2::new(3.0, 3.0), Vec2::splat(8.0));
        a.disable();
        let before = a.physics().cloned();

        let mut events = Vec::new();
        a.integrate(1.0 / 60.0);
        a.check_body_on_body_collision(&b, &mut events);
        b.check_body_on_body_collision(&a, &mut events);
        a.check_collide_screen_edge(100.0, 100.0, 5.0, &mut events);

        assert!(events.is_empty());
        assert_eq!(a.physics().cloned(), before);
        assert!(!a.sprite().unwrap().visible);

        a.enable();
        assert!(a.sprite().unwrap().visible);
        a.check_collide_screen_edge(100.0, 100.0, 5.0, &mut events);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_left_wins_over_top_at_corner() {
        let a = make(0, Vec2::new(3.0, 3.0), Vec2::splat(4.0));
        let mut events = Vec::new();
        a.check_collide_screen_edge(200.0, 200.0, 2.0, &mut events);
        assert_eq!(
            events,
            vec![CollisionEvent::Edge {
                entity: a.id(),
                edge: super::super::rigid::Edge::Left
            }]
        );
    }

    #[test]
    fn test_headless_entity_tolerated() {
        let mut e = EntityBuilder::new("headless")
            .physics(PhysicsBody2D::new(Vec2::ZERO, Vec2::X))
            .build(EntityId { index: 0, generation: 0 }, 0)
            .unwrap();
        e.integrate(1.0);
        e.sync_sprite();
        e.disable();
        assert!(e.sprite().is_none());
        assert_eq!(e.position(), Some(Vec2::X));
    }

    #[test]
    fn test_sync_sprite_copies_position_and_heading() {
        let mut e = make(0, Vec2::new(1.0, 2.0), Vec2::splat(2.0));
        e.physics_mut().unwrap().velocity = Vec2::new(0.0, 1.0);
        e.sync_sprite();
        let sprite = e.sprite().unwrap();
        assert_eq!(sprite.position, Vec2::new(1.0, 2.0));
        assert!((sprite.rotation - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_aabb_collision_is_symmetric(
            ax in 0.0f32..200.0, ay in 0.0f32..200.0, aw in 1.0f32..60.0, ah in 1.0f32..60.0,
            bx in 0.0f32..200.0, by in 0.0f32..200.0, bw in 1.0f32..60.0, bh in 1.0f32..60.0,
        ) {
            let a = make(0, Vec2::new(ax, ay), Vec2::new(aw, ah));
            let b = make(1, Vec2::new(bx, by), Vec2::new(bw, bh));
            let mut ab = Vec::new();
            let mut ba = Vec::new();
            a.check_body_on_body_collision(&b, &mut ab);
            b.check_body_on_body_collision(&a, &mut ba);
            prop_assert_eq!(ab.len(), ba.len());
        }
    }
}
