//! End-to-end session scenarios against a scripted physics world
//!
//! The scripted world never integrates: each test places the penguin where it
//! wants it to land, so distances and stop timing are exact.

use std::collections::HashMap;

use glam::Vec2;
use penguin_launch::best_score::MemoryStore;
use penguin_launch::camera::{Camera, FollowCamera};
use penguin_launch::config::GameConfig;
use penguin_launch::consts::*;
use penguin_launch::platform::InputEvent;
use penguin_launch::sim::launch::StopReason;
use penguin_launch::sim::physics::{BodyId, PhysicsWorld, WorldBounds};
use penguin_launch::sim::session::{SessionEvent, SessionOrchestrator};
use penguin_launch::sim::state::Phase;
use penguin_launch::ui::{HeadlessHud, PromptKind};
use penguin_launch::{LaunchError, LaunchResult};

#[derive(Debug, Clone, Copy, Default)]
struct ScriptedBody {
    pos: Vec2,
    vel: Vec2,
    angle: f32,
    angular_vel: f32,
    is_static: bool,
}

#[derive(Debug, Default)]
struct ScriptedWorld {
    bodies: HashMap<BodyId, ScriptedBody>,
    bounds: Option<WorldBounds>,
    gravity: Vec2,
    paused: bool,
    steps: u32,
}

impl ScriptedWorld {
    fn add_body(&mut self, pos: Vec2) -> BodyId {
        let id = BodyId(self.bodies.len() as u32 + 1);
        self.bodies.insert(
            id,
            ScriptedBody {
                pos,
                is_static: true,
                ..Default::default()
            },
        );
        id
    }

    fn body_mut(&mut self, id: BodyId) -> LaunchResult<&mut ScriptedBody> {
        self.bodies.get_mut(&id).ok_or(LaunchError::MissingBody(id))
    }
}

impl PhysicsWorld for ScriptedWorld {
    fn set_bounds(&mut self, bounds: WorldBounds) {
        self.bounds = Some(bounds);
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

    fn step(&mut self, _dt: f32) {
        if !self.paused {
            self.steps += 1;
        }
    }

    fn position(&self, id: BodyId) -> Option<Vec2> {
        self.bodies.get(&id).map(|b| b.pos)
    }

    fn set_position(&mut self, id: BodyId, pos: Vec2) -> LaunchResult<()> {
        self.body_mut(id)?.pos = pos;
        Ok(())
    }

    fn velocity(&self, id: BodyId) -> Option<Vec2> {
        self.bodies.get(&id).map(|b| b.vel)
    }

    fn set_velocity(&mut self, id: BodyId, vel: Vec2) -> LaunchResult<()> {
        self.body_mut(id)?.vel = vel;
        Ok(())
    }

    fn angular_velocity(&self, id: BodyId) -> Option<f32> {
        self.bodies.get(&id).map(|b| b.angular_vel)
    }

    fn set_angular_velocity(&mut self, id: BodyId, angular_vel: f32) -> LaunchResult<()> {
        self.body_mut(id)?.angular_vel = angular_vel;
        Ok(())
    }

    fn angle(&self, id: BodyId) -> Option<f32> {
        self.bodies.get(&id).map(|b| b.angle)
    }

    fn set_angle(&mut self, id: BodyId, angle: f32) -> LaunchResult<()> {
        self.body_mut(id)?.angle = angle;
        Ok(())
    }

    fn is_static(&self, id: BodyId) -> Option<bool> {
        self.bodies.get(&id).map(|b| b.is_static)
    }

    fn set_static(&mut self, id: BodyId, is_static: bool) -> LaunchResult<()> {
        self.body_mut(id)?.is_static = is_static;
        Ok(())
    }
}

type Session = SessionOrchestrator<ScriptedWorld, FollowCamera, HeadlessHud>;

const GROUND_Y: f32 = 560.0;

fn session_with_best(best: f32) -> (Session, MemoryStore) {
    let config = GameConfig::default();
    let store = MemoryStore::with_best(best);
    let mut world = ScriptedWorld::default();
    let body = world.add_body(Vec2::new(LAUNCH_X, LAUNCH_Y));
    let camera = FollowCamera::new(&config.camera, &config.world.bounds);
    let session = SessionOrchestrator::new(
        config,
        world,
        camera,
        HeadlessHud::new(),
        body,
        Box::new(store.clone()),
    );
    (session, store)
}

fn ticks(session: &mut Session, n: u32) {
    for _ in 0..n {
        session.tick();
    }
}

fn seconds(session: &mut Session, secs: f32) {
    // A few spare ticks absorb float drift in chained delays
    ticks(session, (secs / SIM_DT).ceil() as u32 + 4);
}

fn click(session: &mut Session) -> bool {
    session.handle_input(InputEvent::PrimaryAction)
}

/// From angle selection: confirm both gauges and launch
fn launch(session: &mut Session) {
    assert_eq!(session.phase(), Phase::AngleSelection);
    ticks(session, 10);
    assert!(click(session));
    ticks(session, 10);
    assert!(click(session));
    assert_eq!(session.phase(), Phase::Flying);
}

/// Put the penguin down at rest `meters` in front of the launch point
fn settle_at(session: &mut Session, meters: f32) {
    let body = session.body();
    let x = LAUNCH_X + meters * PIXEL_TO_METER_RATIO;
    let world = session.world_mut();
    world.set_position(body, Vec2::new(x, GROUND_Y)).unwrap();
    world.set_velocity(body, Vec2::ZERO).unwrap();
    world.set_angular_velocity(body, 0.0).unwrap();
}

fn fly_to(session: &mut Session, meters: f32) {
    launch(session);
    settle_at(session, meters);
    ticks(session, STOP_DEBOUNCE_TICKS);
    assert_eq!(session.phase(), Phase::Ended);
}

/// From ENDED (not game over): click and wait out the entrance
fn next_attempt(session: &mut Session) {
    assert!(click(session));
    seconds(session, ENTRANCE_DURATION);
    assert_eq!(session.phase(), Phase::AngleSelection);
}

/// Play a whole game landing at the given distances
fn play_game(session: &mut Session, distances: &[f32]) {
    if session.is_waiting_for_first_click() {
        assert!(click(session));
    }
    for (i, meters) in distances.iter().enumerate() {
        if i > 0 {
            next_attempt(session);
        }
        fly_to(session, *meters);
    }
}

#[test]
fn full_game_new_record_then_restart() {
    let (mut session, store) = session_with_best(30.0);
    assert_eq!(session.hud().best_distance, 30.0);
    assert_eq!(session.world().bounds, Some(session.config().world.bounds));
    assert_eq!(session.world().gravity, session.config().world.gravity);

    play_game(&mut session, &[10.0, 20.0, 5.0]);

    assert!(session.state().is_game_over());
    assert!(session.state().is_modal_open());
    assert_eq!(session.score().total_distance(), 35.0);
    assert_eq!(session.score().best_total_distance(), 35.0);
    assert_eq!(store.best(), 35.0);
    assert_eq!(store.saves(), 1);
    assert_eq!(session.hud().best_distance, 35.0);
    assert_eq!(session.hud().attempts, (3, 3));

    let events = session.drain_events();
    let scored: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::AttemptScored { distance, .. } => Some(*distance),
            _ => None,
        })
        .collect();
    assert_eq!(scored, vec![10.0, 20.0, 5.0]);
    assert!(events.contains(&SessionEvent::GameOver {
        total: 35.0,
        best: 35.0,
        is_new_record: true,
    }));

    // The panel waits out the input lockout
    assert_eq!(session.end_game_token(), None);
    seconds(&mut session, END_GAME_PANEL_DELAY);
    let panel = session.hud().end_game.expect("end-game panel");
    assert!(panel.is_new_record);
    assert_eq!(panel.total_distance, 35.0);

    assert!(session.choose_restart(panel.token));
    assert!(session.hud().end_game.is_none());
    assert!(!session.state().is_modal_open());
    assert!(session.state().is_resetting());

    seconds(&mut session, MODAL_CLOSE_DELAY + RESTART_DELAY);
    assert_eq!(session.phase(), Phase::Ready);
    assert!(session.is_waiting_for_first_click());
    assert!(!session.state().is_resetting());
    assert_eq!(session.state().attempts_used(), 0);
    assert_eq!(session.score().total_distance(), 0.0);
    assert_eq!(session.score().best_total_distance(), 35.0);
    assert_eq!(session.hud().attempts, (0, 3));
    assert!(session.hud().is_showing(PromptKind::StartPrompt));
    assert!(!session.world().is_paused());
    assert_eq!(
        session.world().position(session.body()),
        Some(Vec2::new(LAUNCH_X, LAUNCH_Y))
    );
    assert!(session.drain_events().contains(&SessionEvent::Restarted));

    // A worse game keeps the stored record
    play_game(&mut session, &[1.0, 1.0, 1.0]);
    assert_eq!(session.score().best_total_distance(), 35.0);
    assert_eq!(store.saves(), 1);
}

#[test]
fn input_during_reset_changes_nothing() {
    let (mut session, _) = session_with_best(0.0);
    play_game(&mut session, &[12.0]);

    assert!(click(&mut session));
    assert!(session.state().is_resetting());

    let state_before = session.state().snapshot().clone();
    let score_before = session.score().snapshot();
    for event in [InputEvent::PrimaryAction, InputEvent::Restart, InputEvent::Menu] {
        assert!(!session.handle_input(event));
    }
    assert_eq!(*session.state().snapshot(), state_before);
    assert_eq!(session.score().snapshot(), score_before);
    assert!(session.hud().is_showing(PromptKind::PreparingText));

    // The entrance still completes normally
    seconds(&mut session, ENTRANCE_DURATION);
    assert_eq!(session.phase(), Phase::AngleSelection);
    assert!(!session.state().is_resetting());
    assert_eq!(session.score().total_distance(), 12.0);
}

#[test]
fn clicks_during_flight_and_modal_are_ignored() {
    let (mut session, _) = session_with_best(0.0);
    assert!(click(&mut session));
    launch(&mut session);
    assert!(!click(&mut session));
    assert_eq!(session.phase(), Phase::Flying);

    settle_at(&mut session, 3.0);
    ticks(&mut session, STOP_DEBOUNCE_TICKS);
    next_attempt(&mut session);
    fly_to(&mut session, 3.0);
    next_attempt(&mut session);
    fly_to(&mut session, 3.0);

    assert!(session.state().is_modal_open());
    assert!(!click(&mut session));
    assert_eq!(session.state().attempts_used(), 3);
}

#[test]
fn brief_slowdown_does_not_end_flight() {
    let (mut session, _) = session_with_best(0.0);
    click(&mut session);
    launch(&mut session);

    let body = session.body();
    settle_at(&mut session, 8.0);
    ticks(&mut session, STOP_DEBOUNCE_TICKS - 1);
    assert_eq!(session.phase(), Phase::Flying);

    // Top of a bounce: moving again before the debounce completes
    session
        .world_mut()
        .set_velocity(body, Vec2::new(150.0, -40.0))
        .unwrap();
    ticks(&mut session, 1);
    session.world_mut().set_velocity(body, Vec2::ZERO).unwrap();
    ticks(&mut session, STOP_DEBOUNCE_TICKS - 1);
    assert_eq!(session.phase(), Phase::Flying);

    ticks(&mut session, 1);
    assert_eq!(session.phase(), Phase::Ended);
    assert_eq!(session.score().current_distance(), 8.0);
}

#[test]
fn divergence_force_stops_exactly_once() {
    let (mut session, _) = session_with_best(0.0);
    click(&mut session);
    launch(&mut session);

    let body = session.body();
    let behind = session.camera().initial_scroll_x() - DIVERGENCE_DISTANCE - 1.0;
    session
        .world_mut()
        .set_position(body, Vec2::new(behind, 300.0))
        .unwrap();
    session
        .world_mut()
        .set_velocity(body, Vec2::new(-900.0, 0.0))
        .unwrap();

    ticks(&mut session, 1);
    assert_eq!(session.phase(), Phase::Ended);
    assert_eq!(session.world().velocity(body), Some(Vec2::ZERO));
    assert_eq!(session.world().angular_velocity(body), Some(0.0));

    ticks(&mut session, 120);
    let events = session.drain_events();
    let stops: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::AttemptScored { reason, distance, .. } => Some((*reason, *distance)),
            _ => None,
        })
        .collect();
    assert_eq!(stops.len(), 1);
    assert_eq!(stops[0].0, StopReason::Diverged);
    assert!((stops[0].1 - (LAUNCH_X - behind) / PIXEL_TO_METER_RATIO).abs() < 1e-3);
    assert_eq!(session.state().attempts_used(), 1);
}

#[test]
fn restart_drops_pending_end_game_panel() {
    let (mut session, _) = session_with_best(0.0);
    play_game(&mut session, &[4.0, 4.0, 4.0]);
    assert!(session.state().is_modal_open());

    // Restart before the lockout ends; the queued panel belongs to a dead game
    assert!(session.handle_input(InputEvent::Restart));
    assert_eq!(session.phase(), Phase::Resetting);
    assert!(session.world().is_paused());
    assert_eq!(session.score().total_distance(), 0.0);
    let steps = session.world().steps;
    ticks(&mut session, 2);
    assert_eq!(session.world().steps, steps);

    seconds(&mut session, END_GAME_PANEL_DELAY.max(RESTART_DELAY));
    assert_eq!(session.hud().end_game_shown, 0);
    assert_eq!(session.end_game_token(), None);
    assert_eq!(session.phase(), Phase::Ready);
    assert!(!session.state().is_modal_open());
    assert!(!session.state().is_resetting());
}

#[test]
fn restart_key_mid_flight() {
    let (mut session, _) = session_with_best(0.0);
    play_game(&mut session, &[6.0]);
    next_attempt(&mut session);
    launch(&mut session);

    assert!(session.handle_input(InputEvent::Restart));
    seconds(&mut session, RESTART_DELAY);
    assert_eq!(session.phase(), Phase::Ready);
    assert_eq!(session.state().attempts_used(), 0);
    assert_eq!(session.score().total_distance(), 0.0);
    assert_eq!(session.world().is_static(session.body()), Some(true));

    // Flight tracking was cancelled with the restart
    ticks(&mut session, STOP_DEBOUNCE_TICKS * 2);
    assert!(
        !session
            .drain_events()
            .iter()
            .any(|e| matches!(e, SessionEvent::AttemptScored { attempt: 2, .. }))
    );
}

#[test]
fn end_game_choice_honoured_once() {
    let (mut session, _) = session_with_best(0.0);
    play_game(&mut session, &[2.0, 2.0, 2.0]);
    seconds(&mut session, END_GAME_PANEL_DELAY);

    let token = session.end_game_token().expect("panel token");
    assert!(session.choose_main_menu(token));
    assert!(!session.choose_main_menu(token));
    assert!(!session.choose_restart(token));
    assert_eq!(session.hud().end_game_shown, 1);

    seconds(&mut session, MODAL_CLOSE_DELAY + FADE_DURATION);
    assert!(session.is_exited());
    assert!(session.world().is_paused());
    let events = session.drain_events();
    assert_eq!(
        events
            .iter()
            .filter(|e| **e == SessionEvent::ExitedToMenu)
            .count(),
        1
    );
    assert!(!events.contains(&SessionEvent::Restarted));
    assert!(!click(&mut session));
}

#[test]
fn menu_key_mid_flight_abandons_the_attempt() {
    let (mut session, store) = session_with_best(0.0);
    play_game(&mut session, &[4.0, 4.0]);
    next_attempt(&mut session);
    launch(&mut session);
    session.drain_events();

    assert!(session.handle_input(InputEvent::Menu));
    assert!(session.world().is_paused());
    assert_eq!(session.world().velocity(session.body()), Some(Vec2::ZERO));

    // The penguin comes to rest during the fade; nothing may score it
    settle_at(&mut session, 50.0);
    for _ in 0..(FADE_DURATION / SIM_DT) as u32 {
        session.tick();
        let state = session.state();
        assert!(!(state.is_modal_open() && state.is_resetting()));
        assert_ne!(session.phase(), Phase::Ended);
    }
    seconds(&mut session, SIM_DT);
    assert!(session.is_exited());

    let events = session.drain_events();
    assert_eq!(events, vec![SessionEvent::ExitedToMenu]);
    assert_eq!(session.state().attempts_used(), 2);
    assert_eq!(session.score().total_distance(), 8.0);
    assert_eq!(store.saves(), 0);
    assert_eq!(session.hud().end_game_shown, 0);
    assert_eq!(session.end_game_token(), None);
}

#[test]
fn menu_key_during_end_game_lockout_skips_the_panel() {
    let (mut session, store) = session_with_best(0.0);
    play_game(&mut session, &[3.0, 3.0, 3.0]);
    assert_eq!(store.saves(), 1);

    assert!(session.handle_input(InputEvent::Menu));
    assert!(!session.state().is_modal_open());
    seconds(&mut session, FADE_DURATION.max(END_GAME_PANEL_DELAY));

    assert!(session.is_exited());
    assert_eq!(session.hud().end_game_shown, 0);
    assert_eq!(session.end_game_token(), None);
}
