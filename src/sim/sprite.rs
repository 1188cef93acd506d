//! Drawable handle written by the simulation and read by an external renderer

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// How a sprite takes its color, fixed when the sprite is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Paint {
    /// Textured sprite multiplied by a tint
    Tint(u32),
    /// Flat shape with a fill color
    Fill(u32),
}

/// Render-side state of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub position: Vec2,
    /// Radians, 0 = facing +x
    pub rotation: f32,
    pub size: f32,
    pub visible: bool,
    pub paint: Paint,
}

impl Sprite {
    pub fn tinted(size: f32, color: u32) -> Self {
        Self::new(size, Paint::Tint(color))
    }

    pub fn filled(size: f32, color: u32) -> Self {
        Self::new(size, Paint::Fill(color))
    }

    fn new(size: f32, paint: Paint) -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            size,
            visible: true,
            paint,
        }
    }

    pub fn set_color(&mut self, color: u32) {
        match &mut self.paint {
            Paint::Tint(tint) => *tint = color,
            Paint::Fill(fill) => *fill = color,
        }
    }

    pub fn color(&self) -> u32 {
        match self.paint {
            Paint::Tint(c) | Paint::Fill(c) => c,
        }
    }
}
