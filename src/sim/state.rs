//! Attempt phase state and its manager
//!
//! `StateManager` is a passive record: it never decides when a transition is
//! legal. The orchestrator owns that discipline through the guard flags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse phase of the attempt/session machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Phase {
    /// Waiting for the first click of a game
    #[default]
    Ready,
    /// Angle gauge oscillating
    AngleSelection,
    /// Power gauge oscillating
    PowerSelection,
    /// Penguin in the air (or sliding)
    Flying,
    /// Attempt scored, waiting for the next click (or end-of-game panel)
    Ended,
    /// Full restart in progress
    Resetting,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Ready => "READY",
            Phase::AngleSelection => "ANGLE_SELECTION",
            Phase::PowerSelection => "POWER_SELECTION",
            Phase::Flying => "FLYING",
            Phase::Ended => "ENDED",
            Phase::Resetting => "RESETTING",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "READY" => Some(Phase::Ready),
            "ANGLE_SELECTION" => Some(Phase::AngleSelection),
            "POWER_SELECTION" => Some(Phase::PowerSelection),
            "FLYING" => Some(Phase::Flying),
            "ENDED" => Some(Phase::Ended),
            "RESETTING" => Some(Phase::Resetting),
            _ => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authoritative record of the current attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptState {
    pub phase: Phase,
    pub attempts_used: u32,
    pub max_attempts: u32,
    /// An end-of-game (or other) dialog owns input focus
    pub is_modal_open: bool,
    /// A reset sequence is in flight
    pub is_resetting: bool,
}

/// Owns [`AttemptState`]; all phase and attempt mutation goes through here
#[derive(Debug, Clone)]
pub struct StateManager {
    state: AttemptState,
}

impl StateManager {
    /// `max_attempts` of zero is raised to one
    pub fn new(max_attempts: u32) -> Self {
        Self {
            state: AttemptState {
                phase: Phase::Ready,
                attempts_used: 0,
                max_attempts: max_attempts.max(1),
                is_modal_open: false,
                is_resetting: false,
            },
        }
    }

    pub fn get_state(&self) -> Phase {
        self.state.phase
    }

    pub fn set_state(&mut self, phase: Phase) {
        if self.state.phase != phase {
            log::debug!("phase {} -> {}", self.state.phase, phase);
        }
        self.state.phase = phase;
    }

    pub fn snapshot(&self) -> &AttemptState {
        &self.state
    }

    pub fn set_modal_state(&mut self, open: bool) {
        self.state.is_modal_open = open;
    }

    pub fn is_modal_open(&self) -> bool {
        self.state.is_modal_open
    }

    pub fn is_resetting(&self) -> bool {
        self.state.is_resetting
    }

    /// Raising the guard also closes any open modal
    pub fn set_resetting(&mut self, resetting: bool) {
        if resetting {
            self.state.is_modal_open = false;
        }
        self.state.is_resetting = resetting;
    }

    pub fn attempts_used(&self) -> u32 {
        self.state.attempts_used
    }

    pub fn get_max_attempts(&self) -> u32 {
        self.state.max_attempts
    }

    /// Count one completed attempt. Returns false (and changes nothing) once
    /// the game is already over.
    pub fn record_attempt(&mut self) -> bool {
        if self.is_game_over() {
            log::warn!(
                "attempt recorded after game over ({}/{})",
                self.state.attempts_used,
                self.state.max_attempts
            );
            return false;
        }
        self.state.attempts_used += 1;
        true
    }

    pub fn is_game_over(&self) -> bool {
        self.state.attempts_used >= self.state.max_attempts
    }

    /// Back to READY with no attempts used and both guards cleared
    pub fn reset(&mut self) {
        self.state.phase = Phase::Ready;
        self.state.attempts_used = 0;
        self.state.is_modal_open = false;
        self.state.is_resetting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_state_is_ready() {
        let manager = StateManager::new(3);
        assert_eq!(manager.get_state(), Phase::Ready);
        assert_eq!(manager.attempts_used(), 0);
        assert_eq!(manager.get_max_attempts(), 3);
        assert!(!manager.is_modal_open());
        assert!(!manager.is_resetting());
        assert!(!manager.is_game_over());
    }

    #[test]
    fn test_zero_attempts_clamped() {
        assert_eq!(StateManager::new(0).get_max_attempts(), 1);
    }

    #[test]
    fn test_record_attempt_saturates() {
        let mut manager = StateManager::new(2);
        assert!(manager.record_attempt());
        assert!(!manager.is_game_over());
        assert!(manager.record_attempt());
        assert!(manager.is_game_over());
        assert!(!manager.record_attempt());
        assert_eq!(manager.attempts_used(), 2);
    }

    #[test]
    fn test_resetting_closes_modal() {
        let mut manager = StateManager::new(3);
        manager.set_modal_state(true);
        manager.set_resetting(true);
        assert!(!manager.is_modal_open());
        assert!(manager.is_resetting());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut manager = StateManager::new(3);
        manager.set_state(Phase::Ended);
        manager.record_attempt();
        manager.set_modal_state(true);
        manager.reset();
        assert_eq!(manager.get_state(), Phase::Ready);
        assert_eq!(manager.attempts_used(), 0);
        assert!(!manager.is_modal_open());
        assert!(!manager.is_resetting());
    }

    #[test]
    fn test_phase_names_round_trip() {
        for phase in [
            Phase::Ready,
            Phase::AngleSelection,
            Phase::PowerSelection,
            Phase::Flying,
            Phase::Ended,
            Phase::Resetting,
        ] {
            assert_eq!(Phase::from_str(phase.as_str()), Some(phase));
        }
        assert_eq!(Phase::from_str("paused"), None);
    }

    proptest! {
        #[test]
        fn prop_attempts_never_exceed_max(max in 1u32..10, records in 0usize..30) {
            let mut manager = StateManager::new(max);
            for _ in 0..records {
                let before = manager.attempts_used();
                let counted = manager.record_attempt();
                let after = manager.attempts_used();
                prop_assert_eq!(after, if counted { before + 1 } else { before });
                prop_assert!(after <= max);
            }
            prop_assert_eq!(manager.is_game_over(), manager.attempts_used() == max);
        }
    }
}
