//! Penguin Launch - a distance-throwing game
//!
//! Core modules:
//! - `sim`: Deterministic attempt state machine (phases, gauges, flight, scoring, scheduling)
//! - `camera`: Follow camera collaborator
//! - `ui`: HUD collaborator and transient prompt registry
//! - `config`: Data-driven game tuning
//! - `best_score`: Best total distance persistence
//! - `platform`: Input event mapping
//! - `autopilot`: Seeded bot player for demos and soak tests

pub mod autopilot;
pub mod best_score;
pub mod camera;
pub mod config;
pub mod error;
pub mod platform;
pub mod sim;
pub mod ui;

pub use best_score::{BestRecord, BestScoreStore, MemoryStore};
pub use config::GameConfig;
pub use error::{LaunchError, LaunchResult};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Attempts per game
    pub const MAX_ATTEMPTS: u32 = 3;
    /// World pixels per meter of scored distance
    pub const PIXEL_TO_METER_RATIO: f32 = 10.0;

    /// World bounds (x, y, width, height) - extends far to the left of the launch point
    pub const WORLD_BOUNDS: (f32, f32, f32, f32) = (-10000.0, 0.0, 20000.0, 600.0);
    /// Gravity, pixels/s² (screen y grows downward)
    pub const GRAVITY: (f32, f32) = (0.0, 540.0);

    /// Launch point
    pub const LAUNCH_X: f32 = 710.0;
    pub const LAUNCH_Y: f32 = 540.0;
    /// Where the penguin waits before its entrance
    pub const OFFSCREEN_X: f32 = -200.0;

    /// Penguin body
    pub const BODY_RADIUS: f32 = 20.0;
    pub const BODY_RESTITUTION: f32 = 0.35;
    /// Rolling friction deceleration on the ground, pixels/s²
    pub const BODY_GROUND_FRICTION: f32 = 180.0;

    /// Angle gauge (degrees)
    pub const MIN_ANGLE: f32 = 15.0;
    pub const MAX_ANGLE: f32 = 75.0;
    /// Angle gauge sweep speed (degrees/s)
    pub const ANGLE_SPEED: f32 = 60.0;
    /// Power gauge range
    pub const MIN_POWER: f32 = 20.0;
    pub const MAX_POWER: f32 = 100.0;
    /// Power gauge sweep speed (units/s)
    pub const POWER_SPEED: f32 = 80.0;
    /// Power → launch speed (pixels/s per power unit)
    pub const VELOCITY_SCALE: f32 = 12.0;

    /// Flight counts as stopped below these for STOP_DEBOUNCE_TICKS consecutive ticks
    pub const STOP_LINEAR_THRESHOLD: f32 = 5.0;
    pub const STOP_ANGULAR_THRESHOLD: f32 = 0.05;
    pub const STOP_DEBOUNCE_TICKS: u32 = 30;
    /// Force-stop once the body is this far behind the camera's initial scroll
    pub const DIVERGENCE_DISTANCE: f32 = 5000.0;

    /// Camera
    pub const CAMERA_INITIAL_CENTER_X: f32 = 400.0;
    pub const VIEWPORT_WIDTH: f32 = 800.0;
    pub const CAMERA_FOLLOW_LERP: f32 = 0.1;
    pub const FADE_DURATION: f32 = 0.5;
    pub const FLASH_DURATION: f32 = 0.2;
    pub const FLASH_COLOR: u32 = 0xffffff;

    /// Scheduled delays (seconds)
    pub const END_GAME_PANEL_DELAY: f32 = 0.2;
    pub const MODAL_CLOSE_DELAY: f32 = 0.1;
    pub const RESTART_DELAY: f32 = 0.1;
    pub const ENTRANCE_DURATION: f32 = 1.0;
}

/// Triangle wave over [0, 1] with period 2: rises on [0, 1], falls on [1, 2]
#[inline]
pub fn triangle_wave(t: f32) -> f32 {
    let t = t.rem_euclid(2.0);
    if t <= 1.0 { t } else { 2.0 - t }
}

/// Convert (speed, angle) to a screen-space velocity (y down, so positive angles point up)
#[inline]
pub fn screen_polar(speed: f32, angle_rad: f32) -> Vec2 {
    Vec2::new(speed * angle_rad.cos(), -speed * angle_rad.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_wave_shape() {
        assert_eq!(triangle_wave(0.0), 0.0);
        assert_eq!(triangle_wave(0.5), 0.5);
        assert_eq!(triangle_wave(1.0), 1.0);
        assert_eq!(triangle_wave(1.5), 0.5);
        assert_eq!(triangle_wave(2.0), 0.0);
        assert!((triangle_wave(-0.25) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_screen_polar_raises_with_angle() {
        let flat = screen_polar(100.0, 0.0);
        assert!((flat.x - 100.0).abs() < 1e-4);
        assert!(flat.y.abs() < 1e-4);

        let steep = screen_polar(100.0, 60f32.to_radians());
        assert!(steep.y < 0.0);
        assert!(steep.x < flat.x);
    }
}
