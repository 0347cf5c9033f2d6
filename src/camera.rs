//! World camera
//!
//! Horizontal-only: the camera tracks the penguin's x while it flies and snaps
//! back to the launch area between attempts. Fade and flash are overlay
//! effects; the session schedules whatever should happen when a fade ends.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::CameraConfig;
use crate::sim::physics::WorldBounds;

/// Camera as seen by the session
pub trait Camera {
    /// Centre on `target` (eased when `smoothed`)
    fn follow_target(&mut self, target: Vec2, smoothed: bool);
    fn reset_to_initial(&mut self);
    fn set_scroll_x(&mut self, x: f32);
    fn scroll_x(&self) -> f32;
    fn initial_scroll_x(&self) -> f32;
    /// Fade to black over `duration` seconds
    fn fade(&mut self, duration: f32);
    fn flash(&mut self, duration: f32, color: u32);
    /// Advance effects by one tick
    fn update(&mut self, dt: f32);
}

/// Active overlay effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CameraEffect {
    Fade { elapsed: f32, duration: f32 },
    Flash { elapsed: f32, duration: f32, color: u32 },
}

impl CameraEffect {
    /// Overlay opacity: fades ramp up to 1, flashes decay from 1
    pub fn intensity(&self) -> f32 {
        match *self {
            CameraEffect::Fade { elapsed, duration } => {
                (elapsed / duration.max(f32::EPSILON)).min(1.0)
            }
            CameraEffect::Flash {
                elapsed, duration, ..
            } => 1.0 - (elapsed / duration.max(f32::EPSILON)).min(1.0),
        }
    }

    fn finished(&self) -> bool {
        match *self {
            // A finished fade stays black until something resets the camera
            CameraEffect::Fade { .. } => false,
            CameraEffect::Flash {
                elapsed, duration, ..
            } => elapsed >= duration,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowCamera {
    scroll_x: f32,
    initial_scroll_x: f32,
    viewport_width: f32,
    min_scroll_x: f32,
    max_scroll_x: f32,
    follow_lerp: f32,
    effect: Option<CameraEffect>,
}

impl FollowCamera {
    pub fn new(config: &CameraConfig, bounds: &WorldBounds) -> Self {
        let initial_scroll_x = config.initial_center_x - config.viewport_width / 2.0;
        Self {
            scroll_x: initial_scroll_x,
            initial_scroll_x,
            viewport_width: config.viewport_width,
            min_scroll_x: bounds.left(),
            max_scroll_x: (bounds.right() - config.viewport_width).max(bounds.left()),
            follow_lerp: config.follow_lerp.clamp(0.0, 1.0),
            effect: None,
        }
    }

    pub fn effect(&self) -> Option<CameraEffect> {
        self.effect
    }

    fn clamp_scroll(&self, x: f32) -> f32 {
        x.clamp(self.min_scroll_x, self.max_scroll_x)
    }
}

impl Camera for FollowCamera {
    fn follow_target(&mut self, target: Vec2, smoothed: bool) {
        let goal = self.clamp_scroll(target.x - self.viewport_width / 2.0);
        self.scroll_x = if smoothed {
            self.scroll_x + (goal - self.scroll_x) * self.follow_lerp
        } else {
            goal
        };
    }

    fn reset_to_initial(&mut self) {
        self.scroll_x = self.initial_scroll_x;
        if matches!(self.effect, Some(CameraEffect::Fade { .. })) {
            self.effect = None;
        }
    }

    fn set_scroll_x(&mut self, x: f32) {
        self.scroll_x = self.clamp_scroll(x);
    }

    fn scroll_x(&self) -> f32 {
        self.scroll_x
    }

    fn initial_scroll_x(&self) -> f32 {
        self.initial_scroll_x
    }

    fn fade(&mut self, duration: f32) {
        self.effect = Some(CameraEffect::Fade {
            elapsed: 0.0,
            duration,
        });
    }

    fn flash(&mut self, duration: f32, color: u32) {
        self.effect = Some(CameraEffect::Flash {
            elapsed: 0.0,
            duration,
            color,
        });
    }

    fn update(&mut self, dt: f32) {
        let finished = match &mut self.effect {
            Some(effect) => {
                match effect {
                    CameraEffect::Fade { elapsed, .. } | CameraEffect::Flash { elapsed, .. } => {
                        *elapsed += dt;
                    }
                }
                effect.finished()
            }
            None => false,
        };
        if finished {
            self.effect = None;
        }
    }
}
