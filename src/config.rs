//! Game tuning
//!
//! Every field defaults to the matching constant in [`crate::consts`]. A JSON
//! file only needs the keys it wants to override.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{LaunchError, LaunchResult};
use crate::sim::physics::WorldBounds;

/// Attempts and distance scale
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub max_attempts: u32,
    pub pixel_to_meter_ratio: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            pixel_to_meter_ratio: PIXEL_TO_METER_RATIO,
        }
    }
}

/// Gauges and launch velocity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Degrees
    pub min_angle: f32,
    pub max_angle: f32,
    /// Degrees per second
    pub angle_speed: f32,
    pub min_power: f32,
    pub max_power: f32,
    /// Power units per second
    pub power_speed: f32,
    /// Pixels/s of launch speed per power unit
    pub velocity_scale: f32,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            min_angle: MIN_ANGLE,
            max_angle: MAX_ANGLE,
            angle_speed: ANGLE_SPEED,
            min_power: MIN_POWER,
            max_power: MAX_POWER,
            power_speed: POWER_SPEED,
            velocity_scale: VELOCITY_SCALE,
        }
    }
}

/// When a flight counts as over
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub stop_linear_threshold: f32,
    pub stop_angular_threshold: f32,
    pub stop_debounce_ticks: u32,
    /// How far behind the camera's initial scroll the penguin may drift
    pub divergence_distance: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            stop_linear_threshold: STOP_LINEAR_THRESHOLD,
            stop_angular_threshold: STOP_ANGULAR_THRESHOLD,
            stop_debounce_ticks: STOP_DEBOUNCE_TICKS,
            divergence_distance: DIVERGENCE_DISTANCE,
        }
    }
}

/// Physics world and penguin body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub bounds: WorldBounds,
    pub gravity: Vec2,
    pub launch_origin: Vec2,
    pub offscreen_x: f32,
    pub body_radius: f32,
    pub body_restitution: f32,
    pub body_ground_friction: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        let (x, y, width, height) = WORLD_BOUNDS;
        Self {
            bounds: WorldBounds::new(x, y, width, height),
            gravity: Vec2::new(GRAVITY.0, GRAVITY.1),
            launch_origin: Vec2::new(LAUNCH_X, LAUNCH_Y),
            offscreen_x: OFFSCREEN_X,
            body_radius: BODY_RADIUS,
            body_restitution: BODY_RESTITUTION,
            body_ground_friction: BODY_GROUND_FRICTION,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub initial_center_x: f32,
    pub viewport_width: f32,
    /// Fraction of the remaining gap closed per tick when smoothing
    pub follow_lerp: f32,
    pub fade_duration: f32,
    pub flash_duration: f32,
    pub flash_color: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial_center_x: CAMERA_INITIAL_CENTER_X,
            viewport_width: VIEWPORT_WIDTH,
            follow_lerp: CAMERA_FOLLOW_LERP,
            fade_duration: FADE_DURATION,
            flash_duration: FLASH_DURATION,
            flash_color: FLASH_COLOR,
        }
    }
}

/// Scheduled delays, seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Input lockout before the end-of-game panel appears
    pub end_game_panel_delay: f32,
    /// Gap between closing the panel and acting on the choice
    pub modal_close_delay: f32,
    /// Gap between halting a restart and rebuilding the game
    pub restart_delay: f32,
    pub entrance_duration: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            end_game_panel_delay: END_GAME_PANEL_DELAY,
            modal_close_delay: MODAL_CLOSE_DELAY,
            restart_delay: RESTART_DELAY,
            entrance_duration: ENTRANCE_DURATION,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub scoring: ScoringConfig,
    pub launch: LaunchConfig,
    pub flight: FlightConfig,
    pub world: WorldConfig,
    pub camera: CameraConfig,
    pub timing: TimingConfig,
}

impl GameConfig {
    /// Environment variable naming an optional config file
    pub const CONFIG_ENV: &'static str = "PENGUIN_LAUNCH_CONFIG";

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> LaunchResult<Self> {
        let config: GameConfig =
            serde_json::from_str(json).map_err(|e| LaunchError::ConfigLoad(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: impl AsRef<Path>) -> LaunchResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| LaunchError::ConfigLoad(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Config from `PENGUIN_LAUNCH_CONFIG` if set and valid, defaults otherwise
    pub fn load() -> Self {
        match std::env::var(Self::CONFIG_ENV) {
            Ok(path) => match Self::load_from(&path) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("{}, using default config", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default config");
                Self::default()
            }
        }
    }

    /// Camera scroll x when centred on `initial_center_x`
    pub fn initial_scroll_x(&self) -> f32 {
        self.camera.initial_center_x - self.camera.viewport_width / 2.0
    }

    pub fn validate(&self) -> LaunchResult<()> {
        if self.scoring.max_attempts == 0 {
            return Err(LaunchError::InvalidConfig {
                name: "scoring.max_attempts",
                value: 0.0,
                expected: "at least 1",
            });
        }
        positive("scoring.pixel_to_meter_ratio", self.scoring.pixel_to_meter_ratio)?;

        ordered("launch.max_angle", self.launch.min_angle, self.launch.max_angle)?;
        ordered("launch.max_power", self.launch.min_power, self.launch.max_power)?;
        positive("launch.angle_speed", self.launch.angle_speed)?;
        positive("launch.power_speed", self.launch.power_speed)?;
        positive("launch.velocity_scale", self.launch.velocity_scale)?;
        if self.launch.min_power < 0.0 {
            return Err(LaunchError::InvalidConfig {
                name: "launch.min_power",
                value: self.launch.min_power,
                expected: ">= 0",
            });
        }

        positive("flight.stop_linear_threshold", self.flight.stop_linear_threshold)?;
        positive("flight.stop_angular_threshold", self.flight.stop_angular_threshold)?;
        positive("flight.divergence_distance", self.flight.divergence_distance)?;
        if self.flight.stop_debounce_ticks == 0 {
            return Err(LaunchError::InvalidConfig {
                name: "flight.stop_debounce_ticks",
                value: 0.0,
                expected: "at least 1",
            });
        }

        positive("world.bounds.width", self.world.bounds.width)?;
        positive("world.bounds.height", self.world.bounds.height)?;
        positive("world.body_radius", self.world.body_radius)?;
        positive("camera.viewport_width", self.camera.viewport_width)?;
        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> LaunchResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(LaunchError::InvalidConfig {
            name,
            value,
            expected: "> 0",
        })
    }
}

fn ordered(name: &'static str, min: f32, max: f32) -> LaunchResult<()> {
    if max > min {
        Ok(())
    } else {
        Err(LaunchError::InvalidConfig {
            name,
            value: max,
            expected: "greater than the minimum",
        })
    }
}
