//! Library error type
//!
//! Only construction-time contract violations and settings I/O surface as errors;
//! everything inside the tick loop degrades to a safe default instead.

use thiserror::Error;

use crate::sim::ScenePhase;

#[derive(Debug, Error)]
pub enum SimError {
    /// A rigid body was requested on an entity without a physics body
    #[error("entity '{0}' requested a rigid body without a physics body")]
    RigidWithoutPhysics(String),

    /// A scene was created on a zero-sized, negative or non-finite viewport
    #[error("viewport {width} x {height} is not usable")]
    InvalidViewport { width: f32, height: f32 },

    #[error("scene is {0:?}, not active")]
    SceneInactive(ScenePhase),

    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
}
