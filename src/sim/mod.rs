//! Game simulation
//!
//! Everything here runs on simulation time only:
//! - Fixed timestep, advanced by the host through the session
//! - Delayed work goes through the scheduler, never wall clocks
//! - Physics, camera and HUD are reached through traits

pub mod gauge;
pub mod launch;
pub mod physics;
pub mod scheduler;
pub mod score;
pub mod session;
pub mod state;

pub use gauge::{GaugeKind, OscillatingGauge};
pub use launch::{LaunchController, LaunchParameters, StopDetector, StopReason};
pub use physics::{BodyId, PhysicsWorld, SimpleWorld, WorldBounds, halt_body};
pub use scheduler::{Scheduler, Task};
pub use score::{ScoreManager, ScoreState};
pub use session::{HeadlessSession, SessionEvent, SessionOrchestrator};
pub use state::{AttemptState, Phase, StateManager};
