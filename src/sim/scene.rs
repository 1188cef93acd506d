//! Scene lifecycle contract driven by the host's frame loop

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arena::EntityArena;
use crate::error::SimError;

/// Lifecycle phase of a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenePhase {
    /// Constructed, `create` not yet called
    Idle,
    /// Ticking
    Active,
    /// Torn down; ignores further calls
    ShutDown,
}

/// UI notifications a scene listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiSignal {
    MenuOpened,
    MenuClosed,
}

/// Current drawing surface size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Map a position proportionally from this viewport into `new` (no clamping)
    pub fn remap(&self, position: Vec2, new: &Viewport) -> Vec2 {
        position * (new.size() / self.size())
    }

    /// Wrap a position back into the viewport (toroidal); unchanged if the viewport is unusable
    pub fn wrap(&self, position: Vec2) -> Vec2 {
        if !self.is_valid() {
            return position;
        }
        Vec2::new(
            position.x.rem_euclid(self.width),
            position.y.rem_euclid(self.height),
        )
    }
}

/// Lifecycle hooks invoked by the host
pub trait Scene {
    /// Spawn entities and register listeners
    fn create(&mut self) -> Result<(), SimError>;

    /// Advance one tick
    fn update(&mut self, dt: f32);

    /// Host viewport changed; either dimension may be missing
    fn resize(&mut self, width: Option<f32>, height: Option<f32>);

    /// Unsubscribe from everything and drop owned entities
    fn shutdown(&mut self);

    fn handle_signal(&mut self, signal: UiSignal);

    fn phase(&self) -> ScenePhase;

    fn viewport(&self) -> Viewport;
}

/// Validate resize input, logging and rejecting anything unusable
pub(crate) fn validated_viewport(width: Option<f32>, height: Option<f32>) -> Option<Viewport> {
    let (Some(width), Some(height)) = (width, height) else {
        log::warn!("resize: missing dimensions ({:?} x {:?}), skipped", width, height);
        return None;
    };
    let viewport = Viewport::new(width, height);
    if !viewport.is_valid() {
        log::warn!("resize: invalid dimensions {} x {}, skipped", width, height);
        return None;
    }
    Some(viewport)
}

/// Reject a construction-time viewport that would poison positions
pub(crate) fn ensure_valid(viewport: &Viewport) -> Result<(), SimError> {
    if viewport.is_valid() {
        return Ok(());
    }
    log::error!(
        "create: unusable viewport {} x {}",
        viewport.width,
        viewport.height
    );
    Err(SimError::InvalidViewport {
        width: viewport.width,
        height: viewport.height,
    })
}

/// Remap every entity with a physics body from `old` into `new`
pub(crate) fn remap_entities(arena: &mut EntityArena, old: &Viewport, new: &Viewport) {
    if !old.is_valid() {
        return;
    }
    for entity in arena.iter_mut() {
        if let Some(physics) = entity.physics_mut() {
            physics.position = old.remap(physics.position, new);
        }
        entity.sync_sprite();
    }
}

/// Pointer/menu bookkeeping shared by scenes
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub menu_open: bool,
    /// Latest pointer position, already in viewport coordinates
    pub pointer: Option<Vec2>,
}

impl InputState {
    pub fn handle_signal(&mut self, signal: UiSignal) {
        match signal {
            UiSignal::MenuOpened => {
                self.menu_open = true;
                self.pointer = None;
            }
            UiSignal::MenuClosed => self.menu_open = false,
        }
    }

    /// On-canvas controls are hidden while a menu covers them
    pub fn controls_visible(&self) -> bool {
        !self.menu_open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_validated_viewport_rejects_missing_and_degenerate() {
        assert!(validated_viewport(None, Some(10.0)).is_none());
        assert!(validated_viewport(Some(10.0), None).is_none());
        assert!(validated_viewport(Some(0.0), Some(10.0)).is_none());
        assert!(validated_viewport(Some(f32::NAN), Some(10.0)).is_none());
        assert_eq!(
            validated_viewport(Some(640.0), Some(480.0)),
            Some(Viewport::new(640.0, 480.0))
        );
    }

    #[test]
    fn test_wrap_handles_negative_positions() {
        let vp = Viewport::new(100.0, 50.0);
        assert_eq!(vp.wrap(Vec2::new(-10.0, 60.0)), Vec2::new(90.0, 10.0));
    }

    #[test]
    fn test_wrap_on_degenerate_viewport_keeps_position() {
        let p = Vec2::new(12.0, -3.0);
        assert_eq!(Viewport::new(0.0, 0.0).wrap(p), p);
        assert_eq!(Viewport::new(f32::NAN, 10.0).wrap(p), p);
    }

    #[test]
    fn test_ensure_valid_rejects_zero_size() {
        assert!(ensure_valid(&Viewport::new(640.0, 480.0)).is_ok());
        assert!(matches!(
            ensure_valid(&Viewport::new(0.0, 0.0)),
            Err(SimError::InvalidViewport { .. })
        ));
    }

    #[test]
    fn test_menu_signals_toggle_controls() {
        let mut input = InputState::default();
        input.pointer = Some(Vec2::ONE);
        input.handle_signal(UiSignal::MenuOpened);
        assert!(!input.controls_visible());
        assert!(input.pointer.is_none());
        input.handle_signal(UiSignal::MenuClosed);
        assert!(input.controls_visible());
    }

    proptest! {
        #[test]
        fn prop_doubling_viewport_doubles_positions(
            w in 10.0f32..2000.0, h in 10.0f32..2000.0,
            x in -100.0f32..3000.0, y in -100.0f32..3000.0,
        ) {
            let old = Viewport::new(w, h);
            let new = Viewport::new(2.0 * w, 2.0 * h);
            let p = old.remap(Vec2::new(x, y), &new);
            prop_assert_eq!(p, Vec2::new(2.0 * x, 2.0 * y));
        }
    }
}
