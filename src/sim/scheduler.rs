//! Delayed tasks on simulation time
//!
//! Each task carries the session epoch it was scheduled in. A full restart
//! bumps the epoch, and tasks from an older epoch are dropped when they come
//! due instead of acting on a game that no longer exists.

use serde::{Deserialize, Serialize};

/// Work the session defers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    /// Entrance animation finished; begin the next attempt's angle selection
    FinishAttemptReset,
    /// Input lockout over; present the end-of-game panel
    ShowEndGamePanel,
    /// Modal closed after "restart" was chosen
    RestartGame,
    /// Modal closed after "main menu" was chosen
    BackToMenu,
    /// Restart delay elapsed; rebuild the game
    CompleteRestart,
    /// Fade finished; leave for the menu
    ExitToMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub id: TaskId,
    /// Simulation time the task comes due
    pub due: f64,
    pub task: Task,
    /// Session epoch at scheduling time
    pub epoch: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    /// f64 so a 1/120 s step still advances after days of play
    now: f64,
    next_id: u64,
    pending: Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn schedule(&mut self, delay: f32, task: Task, epoch: u64) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.push(ScheduledTask {
            id,
            due: self.now + f64::from(delay.max(0.0)),
            task,
            epoch,
        });
        log::debug!("scheduled {:?} in {:.2}s (epoch {})", task, delay, epoch);
        id
    }

    pub fn is_pending(&self, task: Task) -> bool {
        self.pending.iter().any(|t| t.task == task)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Advance the clock and return every task now due, earliest first
    /// (ties in scheduling order)
    pub fn advance(&mut self, dt: f32) -> Vec<ScheduledTask> {
        self.now += f64::from(dt);
        let now = self.now;
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|t| t.due <= now);
        self.pending = pending;
        due.sort_by(|a, b| {
            a.due
                .partial_cmp(&b.due)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        due
    }
}
