//! Flocking tunables
//!
//! Edited from the UI side at any time, read by the simulation once per tick
//! through [`crate::store::SettingsStore`]. Persisted as JSON.

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Tunable flocking parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Weight of steering toward the neighbors' average heading
    pub alignment_factor: f32,
    /// Weight of steering toward the neighbors' centroid
    pub cohesion_factor: f32,
    /// Weight of repulsion from neighbors that are too close
    pub separation_factor: f32,
    /// Cruise speed (scaled by `consts::SPEED_SCALE` into pixels/second)
    pub speed: f32,
    /// Neighbor search radius in pixels
    pub flock_search_radius: f32,
    /// Whether boid 0 leads the flock toward the pointer
    pub leader_boid_enabled: bool,
    /// Fraction of non-leader boids that also steer toward the leader
    pub leader_follow_fraction: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            alignment_factor: 0.3,
            cohesion_factor: 0.054,
            separation_factor: 0.935,
            speed: 0.6,
            flock_search_radius: 90.0,
            leader_boid_enabled: false,
            leader_follow_fraction: 0.25,
        }
    }
}

impl Settings {
    // UI slider ranges
    pub const ALIGNMENT_RANGE: RangeInclusive<f32> = 0.0..=1.0;
    pub const COHESION_RANGE: RangeInclusive<f32> = 0.0..=0.2;
    pub const SEPARATION_RANGE: RangeInclusive<f32> = 0.0..=2.0;
    pub const SPEED_RANGE: RangeInclusive<f32> = 0.1..=3.0;
    pub const RADIUS_RANGE: RangeInclusive<f32> = 10.0..=300.0;
    pub const FOLLOW_FRACTION_RANGE: RangeInclusive<f32> = 0.0..=1.0;

    /// Copy with every numeric field clamped into its UI range
    pub fn clamped(&self) -> Self {
        Self {
            alignment_factor: clamp_to(self.alignment_factor, &Self::ALIGNMENT_RANGE),
            cohesion_factor: clamp_to(self.cohesion_factor, &Self::COHESION_RANGE),
            separation_factor: clamp_to(self.separation_factor, &Self::SEPARATION_RANGE),
            speed: clamp_to(self.speed, &Self::SPEED_RANGE),
            flock_search_radius: clamp_to(self.flock_search_radius, &Self::RADIUS_RANGE),
            leader_boid_enabled: self.leader_boid_enabled,
            leader_follow_fraction: clamp_to(
                self.leader_follow_fraction,
                &Self::FOLLOW_FRACTION_RANGE,
            ),
        }
    }

    /// Load settings from a JSON file, falling back to defaults if it doesn't exist
    pub fn load(path: &Path) -> Result<Self, SimError> {
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings.clamped())
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

/// Clamp into a range; NaN collapses to the lower bound
pub(crate) fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_within_ranges() {
        let defaults = Settings::default();
        assert_eq!(defaults.clamped(), defaults);
    }

    #[test]
    fn test_clamped_limits_out_of_range_values() {
        let wild = Settings {
            alignment_factor: 5.0,
            cohesion_factor: -1.0,
            speed: f32::NAN,
            flock_search_radius: 10_000.0,
            ..Default::default()
        };
        let c = wild.clamped();
        assert_eq!(c.alignment_factor, 1.0);
        assert_eq!(c.cohesion_factor, 0.0);
        assert_eq!(c.speed, 0.1);
        assert_eq!(c.flock_search_radius, 300.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s: Settings = serde_json::from_str(r#"{"speed": 1.2}"#).unwrap();
        assert_eq!(s.speed, 1.2);
        assert_eq!(s.flock_search_radius, 90.0);
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!(
            "flockwork_settings_{}.json",
            std::process::id()
        ));
        let settings = Settings {
            leader_boid_enabled: true,
            alignment_factor: 0.5,
            ..Default::default()
        };
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("flockwork_definitely_missing_settings.json");
        assert_eq!(Settings::load(&path).unwrap(), Settings::default());
    }
}
