//! Distance accounting
//!
//! Current distance is recomputed from position every tick, committed into the
//! running total exactly once per attempt, and the best total is persisted.

use serde::{Deserialize, Serialize};

use crate::best_score::BestScoreStore;

/// Score values shown to the player
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreState {
    /// This attempt's travel from the launch origin (meters)
    pub current_distance: f32,
    /// Sum of committed attempts this game (meters)
    pub total_distance: f32,
    /// Best completed-game total across sessions (meters)
    pub best_total_distance: f32,
}

pub struct ScoreManager {
    score: ScoreState,
    pixel_to_meter_ratio: f32,
    /// Set once the current attempt has been added to the total
    committed: bool,
    store: Box<dyn BestScoreStore>,
}

impl ScoreManager {
    /// Reads the persisted best from `store`; an unreadable store counts as no record
    pub fn new(pixel_to_meter_ratio: f32, store: Box<dyn BestScoreStore>) -> Self {
        let best = match store.load() {
            Ok(best) => best.max(0.0),
            Err(e) => {
                log::warn!("{}, starting with no best distance", e);
                0.0
            }
        };
        log::info!("Best total distance: {:.1} m", best);

        Self {
            score: ScoreState {
                best_total_distance: best,
                ..Default::default()
            },
            pixel_to_meter_ratio,
            committed: false,
            store,
        }
    }

    pub fn snapshot(&self) -> ScoreState {
        self.score
    }

    pub fn current_distance(&self) -> f32 {
        self.score.current_distance
    }

    pub fn total_distance(&self) -> f32 {
        self.score.total_distance
    }

    pub fn best_total_distance(&self) -> f32 {
        self.score.best_total_distance
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Recompute the current distance from the body's x. Ignored after commit.
    pub fn update_distance(&mut self, body_x: f32, launch_origin_x: f32) {
        if self.committed {
            return;
        }
        let delta = body_x - launch_origin_x;
        self.score.current_distance = delta.abs() / self.pixel_to_meter_ratio;
    }

    /// Add the current distance to the total. Returns false if this attempt was
    /// already committed (the total is left alone).
    pub fn add_current_to_total(&mut self) -> bool {
        if self.committed {
            log::warn!("attempt already committed, ignoring duplicate commit");
            return false;
        }
        self.score.total_distance += self.score.current_distance;
        self.committed = true;
        log::info!(
            "Committed {:.1} m (total {:.1} m)",
            self.score.current_distance,
            self.score.total_distance
        );
        true
    }

    /// Start a fresh attempt
    pub fn reset_current_distance(&mut self) {
        self.score.current_distance = 0.0;
        self.committed = false;
    }

    pub fn reset_total_distance(&mut self) {
        self.score.total_distance = 0.0;
    }

    /// Promote the game total to best if it beats the record. Persists on success.
    pub fn check_and_update_best_distance(&mut self) -> bool {
        if self.score.total_distance <= self.score.best_total_distance {
            return false;
        }
        self.score.best_total_distance = self.score.total_distance;
        log::info!("New record: {:.1} m", self.score.best_total_distance);
        if let Err(e) = self.store.save(self.score.best_total_distance) {
            log::warn!("{}", e);
        }
        true
    }
}
