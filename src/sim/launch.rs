//! Launch pipeline: angle gauge → power gauge → flight → stop detection
//!
//! Stop detection is debounced: a single slow sample (the top of a bounce)
//! never ends a flight. Whatever ends it, the stop is reported once per launch.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::gauge::{GaugeKind, OscillatingGauge};
use super::physics::{BodyId, PhysicsWorld};
use super::state::{Phase, StateManager};
use crate::config::{FlightConfig, LaunchConfig};
use crate::error::{LaunchError, LaunchResult};
use crate::screen_polar;

/// Frozen angle (degrees) and power for one attempt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchParameters {
    pub angle: f32,
    pub power: f32,
}

impl LaunchParameters {
    /// Initial velocity in screen space (y down)
    pub fn velocity(&self, velocity_scale: f32) -> Vec2 {
        screen_polar(self.power * velocity_scale, self.angle.to_radians())
    }
}

/// Why a flight ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Speeds stayed under the thresholds long enough
    Settled,
    /// Drifted too far behind the camera's start position
    Diverged,
    /// The body disappeared from the physics world
    BodyLost,
}

/// Debounced "has the body come to rest" check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopDetector {
    pub linear_threshold: f32,
    pub angular_threshold: f32,
    /// Consecutive quiet samples needed
    pub required_samples: u32,
    quiet_samples: u32,
}

impl StopDetector {
    pub fn new(linear_threshold: f32, angular_threshold: f32, required_samples: u32) -> Self {
        Self {
            linear_threshold,
            angular_threshold,
            required_samples: required_samples.max(1),
            quiet_samples: 0,
        }
    }

    pub fn reset(&mut self) {
        self.quiet_samples = 0;
    }

    /// Feed one tick's speeds; true once the quiet run is long enough
    pub fn sample(&mut self, linear_speed: f32, angular_speed: f32) -> bool {
        if linear_speed < self.linear_threshold && angular_speed.abs() < self.angular_threshold {
            self.quiet_samples = self.quiet_samples.saturating_add(1);
        } else {
            self.quiet_samples = 0;
        }
        self.quiet_samples >= self.required_samples
    }
}

pub struct LaunchController {
    angle_gauge: OscillatingGauge,
    power_gauge: OscillatingGauge,
    angle: Option<f32>,
    power: Option<f32>,
    velocity_scale: f32,
    stop: StopDetector,
    divergence_distance: f32,
    in_flight: bool,
    stop_reported: bool,
}

impl LaunchController {
    pub fn new(launch: &LaunchConfig, flight: &FlightConfig) -> Self {
        Self {
            angle_gauge: OscillatingGauge::new(
                GaugeKind::Angle,
                launch.min_angle,
                launch.max_angle,
                launch.angle_speed,
            ),
            power_gauge: OscillatingGauge::new(
                GaugeKind::Power,
                launch.min_power,
                launch.max_power,
                launch.power_speed,
            ),
            angle: None,
            power: None,
            velocity_scale: launch.velocity_scale,
            stop: StopDetector::new(
                flight.stop_linear_threshold,
                flight.stop_angular_threshold,
                flight.stop_debounce_ticks,
            ),
            divergence_distance: flight.divergence_distance,
            in_flight: false,
            stop_reported: false,
        }
    }

    /// Frozen angle of the attempt being prepared
    pub fn angle(&self) -> Option<f32> {
        self.angle
    }

    /// Frozen power of the attempt being prepared
    pub fn power(&self) -> Option<f32> {
        self.power
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn start_angle_selection(&mut self, state: &mut StateManager) {
        self.angle = None;
        self.power = None;
        self.power_gauge.stop();
        self.angle_gauge.start();
        state.set_state(Phase::AngleSelection);
    }

    pub fn end_angle_selection(&mut self, state: &StateManager) -> LaunchResult<f32> {
        expect_phase(state, Phase::AngleSelection, "end_angle_selection")?;
        let angle = self
            .angle_gauge
            .freeze()
            .ok_or(LaunchError::MissingParameter("angle"))?;
        self.angle = Some(angle);
        log::debug!("angle frozen at {:.1}°", angle);
        Ok(angle)
    }

    pub fn start_power_selection(&mut self, state: &mut StateManager) -> LaunchResult<()> {
        if self.angle.is_none() {
            return Err(LaunchError::MissingParameter("angle"));
        }
        self.power = None;
        self.power_gauge.start();
        state.set_state(Phase::PowerSelection);
        Ok(())
    }

    pub fn end_power_selection(&mut self, state: &StateManager) -> LaunchResult<f32> {
        expect_phase(state, Phase::PowerSelection, "end_power_selection")?;
        let power = self
            .power_gauge
            .freeze()
            .ok_or(LaunchError::MissingParameter("power"))?;
        self.power = Some(power);
        log::debug!("power frozen at {:.1}", power);
        Ok(power)
    }

    /// Throw the penguin with the frozen parameters. Nothing changes on error.
    pub fn launch_penguin(
        &mut self,
        state: &mut StateManager,
        world: &mut dyn PhysicsWorld,
        body: BodyId,
    ) -> LaunchResult<LaunchParameters> {
        expect_phase(state, Phase::PowerSelection, "launch_penguin")?;
        let params = LaunchParameters {
            angle: self.angle.ok_or(LaunchError::MissingParameter("angle"))?,
            power: self.power.ok_or(LaunchError::MissingParameter("power"))?,
        };
        if world.position(body).is_none() {
            return Err(LaunchError::MissingBody(body));
        }

        let velocity = params.velocity(self.velocity_scale);
        world.set_static(body, false)?;
        world.set_velocity(body, velocity)?;

        // Parameters belong to this attempt only
        self.angle = None;
        self.power = None;
        self.stop.reset();
        self.in_flight = true;
        self.stop_reported = false;
        state.set_state(Phase::Flying);

        log::info!(
            "Launch: angle {:.1}°, power {:.1} -> velocity ({:.0}, {:.0})",
            params.angle,
            params.power,
            velocity.x,
            velocity.y
        );
        Ok(params)
    }

    /// Advance whichever gauge is sweeping; returns its value for the HUD
    pub fn tick(&mut self, dt: f32) -> Option<(GaugeKind, f32)> {
        for gauge in [&mut self.angle_gauge, &mut self.power_gauge] {
            if gauge.is_running() {
                gauge.advance(dt);
                return Some((gauge.kind, gauge.value()));
            }
        }
        None
    }

    /// Per-tick flight check. Returns the stop reason exactly once per launch.
    pub fn update_flight(
        &mut self,
        world: &dyn PhysicsWorld,
        body: BodyId,
        camera_initial_scroll_x: f32,
    ) -> Option<StopReason> {
        if !self.in_flight || self.stop_reported {
            return None;
        }

        let reason = match (
            world.position(body),
            world.velocity(body),
            world.angular_velocity(body),
        ) {
            (Some(pos), Some(vel), Some(angular_vel)) => {
                if pos.x < camera_initial_scroll_x - self.divergence_distance {
                    log::warn!("Penguin went too far (x = {:.0}), stopping flight", pos.x);
                    Some(StopReason::Diverged)
                } else if self.stop.sample(vel.length(), angular_vel) {
                    Some(StopReason::Settled)
                } else {
                    None
                }
            }
            _ => {
                log::warn!("{}", LaunchError::MissingBody(body));
                Some(StopReason::BodyLost)
            }
        };

        if reason.is_some() {
            self.stop_reported = true;
            self.in_flight = false;
        }
        reason
    }

    /// Drop any gauge sweep, frozen values and flight tracking
    pub fn cancel(&mut self) {
        self.angle_gauge.stop();
        self.power_gauge.stop();
        self.angle = None;
        self.power = None;
        self.in_flight = false;
        self.stop.reset();
    }
}

fn expect_phase(state: &StateManager, phase: Phase, operation: &'static str) -> LaunchResult<()> {
    if state.get_state() == phase {
        Ok(())
    } else {
        Err(LaunchError::InvalidPhase {
            operation,
            phase: state.get_state(),
        })
    }
}
