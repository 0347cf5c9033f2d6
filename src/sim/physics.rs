//! Physics world boundary
//!
//! The launch state machine only talks to physics through [`PhysicsWorld`].
//! [`SimpleWorld`] is a small reference integrator (gravity, ground bounce,
//! rolling friction, bound walls) so the game runs headless.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{LaunchError, LaunchResult};

/// Handle to a body in a physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Axis-aligned world rectangle (screen coordinates, y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Black-box 2D rigid-body simulator as seen by the game
///
/// Getters return `None` and setters return [`LaunchError::MissingBody`] when
/// the body is not (or no longer) in the world.
pub trait PhysicsWorld {
    fn set_bounds(&mut self, bounds: WorldBounds);
    fn set_gravity(&mut self, gravity: Vec2);

    /// Freeze every body. Calling it while already paused is a no-op.
    fn pause(&mut self);
    /// Unfreeze. Calling it while running is a no-op.
    fn resume(&mut self);
    fn is_paused(&self) -> bool;

    /// Advance one fixed step (no-op while paused)
    fn step(&mut self, dt: f32);

    fn position(&self, id: BodyId) -> Option<Vec2>;
    fn set_position(&mut self, id: BodyId, pos: Vec2) -> LaunchResult<()>;
    fn velocity(&self, id: BodyId) -> Option<Vec2>;
    fn set_velocity(&mut self, id: BodyId, vel: Vec2) -> LaunchResult<()>;
    fn angular_velocity(&self, id: BodyId) -> Option<f32>;
    fn set_angular_velocity(&mut self, id: BodyId, angular_vel: f32) -> LaunchResult<()>;
    fn angle(&self, id: BodyId) -> Option<f32>;
    fn set_angle(&mut self, id: BodyId, angle: f32) -> LaunchResult<()>;
    fn is_static(&self, id: BodyId) -> Option<bool>;
    fn set_static(&mut self, id: BodyId, is_static: bool) -> LaunchResult<()>;
}

/// Zero linear and angular velocity
pub fn halt_body(world: &mut dyn PhysicsWorld, id: BodyId) -> LaunchResult<()> {
    world.set_velocity(id, Vec2::ZERO)?;
    world.set_angular_velocity(id, 0.0)
}

/// Vertical speeds below this after a bounce are absorbed (pixels/s)
const REST_BOUNCE_SPEED: f32 = 30.0;
/// Angular damping while airborne (per second)
const AIR_ANGULAR_DAMPING: f32 = 0.5;

/// A circular rigid body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBody {
    pub id: BodyId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub angle: f32,
    pub angular_vel: f32,
    pub radius: f32,
    pub is_static: bool,
    pub restitution: f32,
    /// Deceleration while touching the ground (pixels/s²)
    pub ground_friction: f32,
}

impl RigidBody {
    fn integrate(&mut self, gravity: Vec2, bounds: &WorldBounds, dt: f32) {
        self.vel += gravity * dt;
        self.pos += self.vel * dt;
        self.angle += self.angular_vel * dt;

        // Side walls
        let left = bounds.left() + self.radius;
        let right = bounds.right() - self.radius;
        if self.pos.x < left {
            self.pos.x = left;
            self.vel.x = -self.vel.x * self.restitution;
        } else if self.pos.x > right {
            self.pos.x = right;
            self.vel.x = -self.vel.x * self.restitution;
        }

        // Ceiling
        let top = bounds.top() + self.radius;
        if self.pos.y < top {
            self.pos.y = top;
            if self.vel.y < 0.0 {
                self.vel.y = -self.vel.y * self.restitution;
            }
        }

        // Ground
        let floor = bounds.bottom() - self.radius;
        let grounded = self.pos.y >= floor;
        if grounded {
            self.pos.y = floor;
            if self.vel.y > 0.0 {
                self.vel.y = -self.vel.y * self.restitution;
                if self.vel.y.abs() < REST_BOUNCE_SPEED {
                    self.vel.y = 0.0;
                }
            }

            let decel = self.ground_friction * dt;
            self.vel.x = if self.vel.x.abs() <= decel {
                0.0
            } else {
                self.vel.x - decel * self.vel.x.signum()
            };
            // Rolling without slipping
            self.angular_vel = self.vel.x / self.radius;
        } else {
            self.angular_vel *= (1.0 - AIR_ANGULAR_DAMPING * dt).max(0.0);
        }
    }
}

/// Reference physics world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleWorld {
    bounds: WorldBounds,
    gravity: Vec2,
    paused: bool,
    /// Sorted by id for deterministic iteration
    bodies: Vec<RigidBody>,
    next_id: u32,
}

impl SimpleWorld {
    pub fn new(bounds: WorldBounds, gravity: Vec2) -> Self {
        Self {
            bounds,
            gravity,
            paused: false,
            bodies: Vec::new(),
            next_id: 1,
        }
    }

    /// Add a static circular body
    pub fn add_body(
        &mut self,
        pos: Vec2,
        radius: f32,
        restitution: f32,
        ground_friction: f32,
    ) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.bodies.push(RigidBody {
            id,
            pos,
            vel: Vec2::ZERO,
            angle: 0.0,
            angular_vel: 0.0,
            radius,
            is_static: true,
            restitution,
            ground_friction,
        });
        id
    }

    pub fn remove_body(&mut self, id: BodyId) -> bool {
        let before = self.bodies.len();
        self.bodies.retain(|b| b.id != id);
        self.bodies.len() != before
    }

    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.iter().find(|b| b.id == id)
    }

    fn body_mut(&mut self, id: BodyId) -> LaunchResult<&mut RigidBody> {
        self.bodies
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(LaunchError::MissingBody(id))
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }
}

impl PhysicsWorld for SimpleWorld {
    fn set_bounds(&mut self, bounds: WorldBounds) {
        self.bounds = bounds;
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn step(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        for body in self.bodies.iter_mut().filter(|b| !b.is_static) {
            body.integrate(self.gravity, &self.bounds, dt);
        }
    }

    fn position(&self, id: BodyId) -> Option<Vec2> {
        self.body(id).map(|b| b.pos)
    }

    fn set_position(&mut self, id: BodyId, pos: Vec2) -> LaunchResult<()> {
        self.body_mut(id)?.pos = pos;
        Ok(())
    }

    fn velocity(&self, id: BodyId) -> Option<Vec2> {
        self.body(id).map(|b| b.vel)
    }

    fn set_velocity(&mut self, id: BodyId, vel: Vec2) -> LaunchResult<()> {
        self.body_mut(id)?.vel = vel;
        Ok(())
    }

    fn angular_velocity(&self, id: BodyId) -> Option<f32> {
        self.body(id).map(|b| b.angular_vel)
    }

    fn set_angular_velocity(&mut self, id: BodyId, angular_vel: f32) -> LaunchResult<()> {
        self.body_mut(id)?.angular_vel = angular_vel;
        Ok(())
    }

    fn angle(&self, id: BodyId) -> Option<f32> {
        self.body(id).map(|b| b.angle)
    }

    fn set_angle(&mut self, id: BodyId, angle: f32) -> LaunchResult<()> {
        self.body_mut(id)?.angle = angle;
        Ok(())
    }

    fn is_static(&self, id: BodyId) -> Option<bool> {
        self.body(id).map(|b| b.is_static)
    }

    fn set_static(&mut self, id: BodyId, is_static: bool) -> LaunchResult<()> {
        self.body_mut(id)?.is_static = is_static;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    fn world_with_body() -> (SimpleWorld, BodyId) {
        let (x, y, w, h) = WORLD_BOUNDS;
        let mut world = SimpleWorld::new(
            WorldBounds::new(x, y, w, h),
            Vec2::new(GRAVITY.0, GRAVITY.1),
        );
        let id = world.add_body(
            Vec2::new(LAUNCH_X, LAUNCH_Y),
            BODY_RADIUS,
            BODY_RESTITUTION,
            BODY_GROUND_FRICTION,
        );
        (world, id)
    }

    #[test]
    fn test_static_body_stays_put() {
        let (mut world, id) = world_with_body();
        for _ in 0..120 {
            world.step(SIM_DT);
        }
        assert_eq!(world.position(id), Some(Vec2::new(LAUNCH_X, LAUNCH_Y)));
    }

    #[test]
    fn test_launched_body_lands_and_settles() {
        let (mut world, id) = world_with_body();
        world.set_static(id, false).unwrap();
        world.set_velocity(id, Vec2::new(400.0, -400.0)).unwrap();

        let mut left_ground = false;
        for _ in 0..(120 * 30) {
            world.step(SIM_DT);
            if world.position(id).unwrap().y < LAUNCH_Y - 50.0 {
                left_ground = true;
            }
        }
        assert!(left_ground);

        let body = world.body(id).unwrap();
        assert!(body.pos.x > LAUNCH_X);
        assert_eq!(body.pos.y, WORLD_BOUNDS.3 - BODY_RADIUS);
        assert_eq!(body.vel, Vec2::ZERO);
        assert_eq!(body.angular_vel, 0.0);
    }

    #[test]
    fn test_pause_freezes_and_is_idempotent() {
        let (mut world, id) = world_with_body();
        world.set_static(id, false).unwrap();
        world.set_velocity(id, Vec2::new(100.0, 0.0)).unwrap();

        world.pause();
        world.pause();
        let before = world.position(id);
        world.step(SIM_DT);
        assert_eq!(world.position(id), before);

        world.resume();
        world.resume();
        world.step(SIM_DT);
        assert_ne!(world.position(id), before);
    }

    #[test]
    fn test_walls_keep_body_inside() {
        let (mut world, id) = world_with_body();
        world.set_static(id, false).unwrap();
        world
            .set_position(id, Vec2::new(WORLD_BOUNDS.0 + 30.0, 300.0))
            .unwrap();
        world.set_velocity(id, Vec2::new(-5000.0, 0.0)).unwrap();
        world.step(SIM_DT);
        let body = world.body(id).unwrap();
        assert_eq!(body.pos.x, WORLD_BOUNDS.0 + BODY_RADIUS);
        assert!(body.vel.x > 0.0);
    }

    #[test]
    fn test_missing_body() {
        let (mut world, id) = world_with_body();
        assert!(world.remove_body(id));
        assert!(!world.remove_body(id));
        assert_eq!(world.position(id), None);
        assert_eq!(
            world.set_velocity(id, Vec2::ONE),
            Err(LaunchError::MissingBody(id))
        );
        assert_eq!(halt_body(&mut world, id), Err(LaunchError::MissingBody(id)));
    }
}
