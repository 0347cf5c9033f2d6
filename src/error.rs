//! Error types for the launch state machine.
//!
//! Every error here is handled locally: the orchestrator logs it and carries on,
//! so out-of-order input degrades to "nothing happens".

use std::fmt;

use crate::sim::physics::BodyId;
use crate::sim::state::Phase;

/// Top-level error enum for penguin-launch.
#[derive(Debug, Clone, PartialEq)]
pub enum LaunchError {
    /// An operation was invoked outside the phase it belongs to.
    InvalidPhase {
        /// Operation name (for logging).
        operation: &'static str,
        /// Phase the state machine was in.
        phase: Phase,
    },

    /// Launch requested before the named parameter was frozen.
    MissingParameter(&'static str),

    /// The referenced body is not in the physics world.
    MissingBody(BodyId),

    /// A configuration value is outside its valid range.
    InvalidConfig {
        name: &'static str,
        value: f32,
        expected: &'static str,
    },

    /// Config file could not be read or parsed.
    ConfigLoad(String),

    /// Best score could not be read or written.
    Persistence(String),
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchError::InvalidPhase { operation, phase } => {
                write!(f, "'{}' is not valid in phase {}", operation, phase)
            }
            LaunchError::MissingParameter(name) => {
                write!(f, "cannot launch: {} has not been selected", name)
            }
            LaunchError::MissingBody(id) => write!(f, "body {} not found in physics world", id.0),
            LaunchError::InvalidConfig {
                name,
                value,
                expected,
            } => write!(f, "config '{}' = {} is invalid (expected {})", name, value, expected),
            LaunchError::ConfigLoad(msg) => write!(f, "failed to load config: {}", msg),
            LaunchError::Persistence(msg) => write!(f, "best score persistence failed: {}", msg),
        }
    }
}

impl std::error::Error for LaunchError {}

impl From<serde_json::Error> for LaunchError {
    fn from(err: serde_json::Error) -> Self {
        LaunchError::Persistence(err.to_string())
    }
}

impl From<std::io::Error> for LaunchError {
    fn from(err: std::io::Error) -> Self {
        LaunchError::Persistence(err.to_string())
    }
}

/// Convenience alias: a `Result` using `LaunchError` as the error type.
pub type LaunchResult<T> = Result<T, LaunchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = LaunchError::InvalidPhase {
            operation: "end_power_selection",
            phase: Phase::Flying,
        };
        assert_eq!(
            err.to_string(),
            "'end_power_selection' is not valid in phase FLYING"
        );
        assert_eq!(
            LaunchError::MissingParameter("angle").to_string(),
            "cannot launch: angle has not been selected"
        );
        assert_eq!(
            LaunchError::MissingBody(BodyId(7)).to_string(),
            "body 7 not found in physics world"
        );
    }
}
