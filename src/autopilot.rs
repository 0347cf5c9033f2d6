//! Demo player
//!
//! Plays the game through the same input path a human uses: it waits a random
//! beat, then clicks. Gauge values therefore come out wherever the sweep
//! happens to be, which covers the whole parameter range over many games.
//! Seeded so a run can be replayed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::camera::Camera;
use crate::platform::InputEvent;
use crate::sim::physics::PhysicsWorld;
use crate::sim::session::SessionOrchestrator;
use crate::sim::state::Phase;
use crate::ui::Hud;

/// Shortest and longest pause between clicks (seconds)
const MIN_DELAY: f32 = 0.2;
const MAX_DELAY: f32 = 1.5;

pub struct Autopilot {
    rng: Pcg32,
    cooldown: f32,
    /// Games to finish before choosing "main menu" on the end panel
    games_to_play: u32,
    games_finished: u32,
}

impl Autopilot {
    pub fn new(seed: u64, games_to_play: u32) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let cooldown = rng.random_range(MIN_DELAY..MAX_DELAY);
        Self {
            rng,
            cooldown,
            games_to_play: games_to_play.max(1),
            games_finished: 0,
        }
    }

    pub fn games_finished(&self) -> u32 {
        self.games_finished
    }

    /// Advance by `dt` and press whatever the current screen asks for
    pub fn drive<P: PhysicsWorld, C: Camera, H: Hud>(
        &mut self,
        session: &mut SessionOrchestrator<P, C, H>,
        dt: f32,
    ) {
        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return;
        }

        if let Some(token) = session.end_game_token() {
            self.games_finished += 1;
            if self.games_finished >= self.games_to_play {
                log::info!("Autopilot: {} game(s) played, leaving", self.games_finished);
                session.choose_main_menu(token);
            } else {
                session.choose_restart(token);
            }
            self.rearm();
            return;
        }

        let wants_click = matches!(
            session.phase(),
            Phase::Ready | Phase::AngleSelection | Phase::PowerSelection | Phase::Ended
        );
        if wants_click && session.handle_input(InputEvent::PrimaryAction) {
            self.rearm();
        }
    }

    fn rearm(&mut self) {
        self.cooldown = self.rng.random_range(MIN_DELAY..MAX_DELAY);
    }
}
