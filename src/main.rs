//! Penguin Launch entry point
//!
//! Native builds run a headless demo: the autopilot plays a few games against
//! the reference physics world and the best total is kept on disk.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use penguin_launch::autopilot::Autopilot;
    use penguin_launch::best_score::platform_store;
    use penguin_launch::config::GameConfig;
    use penguin_launch::sim::{HeadlessSession, SessionEvent};

    /// Host frame time (60 Hz display)
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Give up after an hour of simulated play
    const MAX_FRAMES: u32 = 60 * 60 * 60;
    const DEMO_GAMES: u32 = 3;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Penguin Launch (native) starting...");

    let config = GameConfig::load();
    let mut session = HeadlessSession::headless(config, platform_store());
    let seed: u64 = rand::random();
    log::info!("Autopilot seed: {}", seed);
    let mut pilot = Autopilot::new(seed, DEMO_GAMES);

    for _ in 0..MAX_FRAMES {
        pilot.drive(&mut session, FRAME_DT);
        session.update(FRAME_DT);

        for event in session.drain_events() {
            match event {
                SessionEvent::Launched(params) => {
                    log::info!("Launched at {:.1}° with power {:.1}", params.angle, params.power)
                }
                SessionEvent::AttemptScored {
                    attempt,
                    distance,
                    total,
                    reason,
                } => log::info!(
                    "Attempt {}: {:.1} m (total {:.1} m, {:?})",
                    attempt,
                    distance,
                    total,
                    reason
                ),
                SessionEvent::GameOver {
                    total,
                    best,
                    is_new_record,
                } => log::info!(
                    "Final {:.1} m, best {:.1} m{}",
                    total,
                    best,
                    if is_new_record { " (new record!)" } else { "" }
                ),
                SessionEvent::Restarted => log::info!("New game"),
                SessionEvent::ExitedToMenu => log::info!("Back at the menu"),
            }
        }

        if session.is_exited() {
            break;
        }
    }

    log::info!(
        "Done after {} game(s); best total {:.1} m",
        pilot.games_finished(),
        session.score().best_total_distance()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web host drives the library directly
}
