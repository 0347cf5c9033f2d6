//! Session orchestration
//!
//! Turns input events, scheduled tasks and fixed physics ticks into the
//! attempt flow: angle → power → flight → score → next attempt or game over.
//!
//! Everything runs on one logical thread. Multi-step sequences (attempt reset,
//! restart, end of game) are split across scheduled tasks, so other input can
//! arrive in between; the `is_modal_open` / `is_resetting` guards checked at
//! the top of the input handler make that input a no-op.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::gauge::GaugeKind;
use super::launch::{LaunchController, LaunchParameters, StopReason};
use super::physics::{BodyId, PhysicsWorld, SimpleWorld, halt_body};
use super::scheduler::{ScheduledTask, Scheduler, Task};
use super::score::ScoreManager;
use super::state::{Phase, StateManager};
use crate::best_score::BestScoreStore;
use crate::camera::{Camera, FollowCamera};
use crate::config::GameConfig;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::error::{LaunchError, LaunchResult};
use crate::platform::InputEvent;
use crate::ui::{EndGamePanel, EndGameToken, HeadlessHud, Hud, PromptKind, TransientElements};

/// Notable things that happened, for the host to react to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    Launched(LaunchParameters),
    AttemptScored {
        attempt: u32,
        distance: f32,
        total: f32,
        reason: StopReason,
    },
    GameOver {
        total: f32,
        best: f32,
        is_new_record: bool,
    },
    Restarted,
    /// The session is finished; the host should show its menu
    ExitedToMenu,
}

/// End-of-game presentation awaiting the player's choice
#[derive(Debug, Clone, Copy)]
struct PendingEndGame {
    token: EndGameToken,
    is_new_record: bool,
    shown: bool,
}

/// Everything the session mutates, owned in one place
pub struct SessionContext {
    pub state: StateManager,
    pub score: ScoreManager,
    pub launch: LaunchController,
    pub prompts: TransientElements,
    pub scheduler: Scheduler,
    pub body: BodyId,
    /// Next primary action starts the first angle selection
    waiting_for_first_click: bool,
    /// Bumped on every full restart; tasks from older epochs are dropped
    epoch: u64,
    end_game: Option<PendingEndGame>,
    next_token: u64,
    exited: bool,
    events: Vec<SessionEvent>,
}

pub struct SessionOrchestrator<P: PhysicsWorld, C: Camera, H: Hud> {
    config: GameConfig,
    world: P,
    camera: C,
    hud: H,
    ctx: SessionContext,
    accumulator: f32,
}

/// Session wired to the built-in world, camera and HUD
pub type HeadlessSession = SessionOrchestrator<SimpleWorld, FollowCamera, HeadlessHud>;

impl HeadlessSession {
    pub fn headless(config: GameConfig, store: Box<dyn BestScoreStore>) -> Self {
        let mut world = SimpleWorld::new(config.world.bounds, config.world.gravity);
        let body = world.add_body(
            config.world.launch_origin,
            config.world.body_radius,
            config.world.body_restitution,
            config.world.body_ground_friction,
        );
        let camera = FollowCamera::new(&config.camera, &config.world.bounds);
        SessionOrchestrator::new(config, world, camera, HeadlessHud::new(), body, store)
    }
}

impl<P: PhysicsWorld, C: Camera, H: Hud> SessionOrchestrator<P, C, H> {
    /// Configure the world, load the best score and show the start prompt
    pub fn new(
        config: GameConfig,
        mut world: P,
        camera: C,
        mut hud: H,
        body: BodyId,
        store: Box<dyn BestScoreStore>,
    ) -> Self {
        world.set_bounds(config.world.bounds);
        world.set_gravity(config.world.gravity);

        let state = StateManager::new(config.scoring.max_attempts);
        let score = ScoreManager::new(config.scoring.pixel_to_meter_ratio, store);
        hud.update_best_distance(score.best_total_distance());
        hud.update_distance(0.0, 0.0);
        hud.update_attempts(0, state.get_max_attempts());

        let ctx = SessionContext {
            state,
            score,
            launch: LaunchController::new(&config.launch, &config.flight),
            prompts: TransientElements::new(),
            scheduler: Scheduler::new(),
            body,
            waiting_for_first_click: false,
            epoch: 0,
            end_game: None,
            next_token: 1,
            exited: false,
            events: Vec::new(),
        };

        let mut session = Self {
            config,
            world,
            camera,
            hud,
            ctx,
            accumulator: 0.0,
        };
        let origin_x = session.config.world.launch_origin.x;
        session.park_body(origin_x);
        session.start_game();
        session
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn phase(&self) -> Phase {
        self.ctx.state.get_state()
    }

    pub fn state(&self) -> &StateManager {
        &self.ctx.state
    }

    pub fn score(&self) -> &ScoreManager {
        &self.ctx.score
    }

    pub fn world(&self) -> &P {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut P {
        &mut self.world
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn hud(&self) -> &H {
        &self.hud
    }

    pub fn body(&self) -> BodyId {
        self.ctx.body
    }

    pub fn is_waiting_for_first_click(&self) -> bool {
        self.ctx.waiting_for_first_click
    }

    /// Token of the end-of-game panel currently on screen
    pub fn end_game_token(&self) -> Option<EndGameToken> {
        self.ctx.end_game.filter(|p| p.shown).map(|p| p.token)
    }

    pub fn is_exited(&self) -> bool {
        self.ctx.exited
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.ctx.events)
    }

    // ── Input ──────────────────────────────────────────────────────────────

    /// Single entry point for player input. Returns false when the event was
    /// ignored (guards, wrong phase, finished session).
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        if self.ctx.exited {
            return false;
        }
        match event {
            InputEvent::PrimaryAction => self.handle_primary_action(),
            InputEvent::Restart | InputEvent::Menu => {
                if self.ctx.state.is_resetting() {
                    log::debug!("{} ignored: reset in progress", event.as_str());
                    return false;
                }
                if event == InputEvent::Restart {
                    self.restart_game();
                } else {
                    self.back_to_menu();
                }
                true
            }
        }
    }

    fn handle_primary_action(&mut self) -> bool {
        if self.ctx.state.is_modal_open() {
            log::debug!("click ignored: modal open");
            return false;
        }
        if self.ctx.state.is_resetting() {
            log::debug!("click ignored: reset in progress");
            return false;
        }

        if self.ctx.waiting_for_first_click {
            self.ctx.waiting_for_first_click = false;
            self.ctx.prompts.dispose(&mut self.hud, PromptKind::StartPrompt);
            self.ctx.prompts.dispose(&mut self.hud, PromptKind::ControlsInfo);
            self.ctx.launch.start_angle_selection(&mut self.ctx.state);
            return true;
        }

        match self.ctx.state.get_state() {
            Phase::AngleSelection => self.confirm_angle().map_err(log_rejected).is_ok(),
            Phase::PowerSelection => self.confirm_power().map_err(log_rejected).is_ok(),
            Phase::Ended => {
                // Guard first: everything after this may be deferred
                self.ctx.state.set_resetting(true);
                self.ctx.prompts.dispose(&mut self.hud, PromptKind::ControlsInfo);
                self.reset_launch();
                true
            }
            _ => false,
        }
    }

    fn confirm_angle(&mut self) -> LaunchResult<()> {
        let angle = self.ctx.launch.end_angle_selection(&self.ctx.state)?;
        self.hud.update_gauge(GaugeKind::Angle, angle);
        self.ctx.launch.start_power_selection(&mut self.ctx.state)
    }

    fn confirm_power(&mut self) -> LaunchResult<()> {
        let power = self.ctx.launch.end_power_selection(&self.ctx.state)?;
        self.hud.update_gauge(GaugeKind::Power, power);
        let params = self.ctx.launch.launch_penguin(
            &mut self.ctx.state,
            &mut self.world,
            self.ctx.body,
        )?;
        self.ctx.events.push(SessionEvent::Launched(params));
        Ok(())
    }

    /// Answer the end-of-game panel's "restart" button. Each panel honours
    /// at most one choice; stale or repeated tokens return false.
    pub fn choose_restart(&mut self, token: EndGameToken) -> bool {
        if !self.resolve_end_game(token) {
            return false;
        }
        self.schedule(self.config.timing.modal_close_delay, Task::RestartGame);
        true
    }

    /// Answer the end-of-game panel's "main menu" button
    pub fn choose_main_menu(&mut self, token: EndGameToken) -> bool {
        if !self.resolve_end_game(token) {
            return false;
        }
        self.schedule(self.config.timing.modal_close_delay, Task::BackToMenu);
        true
    }

    fn resolve_end_game(&mut self, token: EndGameToken) -> bool {
        match self.ctx.end_game {
            Some(pending) if pending.token == token && pending.shown => {
                self.ctx.end_game = None;
                self.hud.hide_end_game();
                // Closes the modal and holds input off until the choice runs
                self.ctx.state.set_resetting(true);
                true
            }
            _ => {
                log::debug!("end-game choice ignored: token {} not active", token.0);
                false
            }
        }
    }

    // ── Time ───────────────────────────────────────────────────────────────

    /// Advance by a frame's worth of real time in fixed substeps
    pub fn update(&mut self, frame_dt: f32) {
        self.accumulator += frame_dt.min(0.1);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.tick();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
    }

    /// One fixed simulation step
    pub fn tick(&mut self) {
        if self.ctx.exited {
            return;
        }
        for task in self.ctx.scheduler.advance(SIM_DT) {
            self.run_task(task);
        }

        self.camera.update(SIM_DT);
        if let Some((kind, value)) = self.ctx.launch.tick(SIM_DT) {
            self.hud.update_gauge(kind, value);
        }
        self.world.step(SIM_DT);

        if self.ctx.state.get_state() != Phase::Flying {
            return;
        }
        let origin_x = self.config.world.launch_origin.x;
        if let Some(pos) = self.world.position(self.ctx.body) {
            self.ctx.score.update_distance(pos.x, origin_x);
            self.hud.update_distance(
                self.ctx.score.current_distance(),
                self.ctx.score.total_distance(),
            );
            self.camera.follow_target(pos, true);
        }
        let initial_scroll_x = self.camera.initial_scroll_x();
        if let Some(reason) =
            self.ctx
                .launch
                .update_flight(&self.world, self.ctx.body, initial_scroll_x)
        {
            self.end_launch(reason);
        }
    }

    fn schedule(&mut self, delay: f32, task: Task) {
        self.ctx.scheduler.schedule(delay, task, self.ctx.epoch);
    }

    fn run_task(&mut self, scheduled: ScheduledTask) {
        if scheduled.epoch != self.ctx.epoch {
            log::debug!(
                "dropping stale {:?} (epoch {} != {})",
                scheduled.task,
                scheduled.epoch,
                self.ctx.epoch
            );
            return;
        }
        match scheduled.task {
            Task::FinishAttemptReset => self.finish_attempt_reset(),
            Task::ShowEndGamePanel => self.show_end_game_panel(),
            Task::RestartGame => self.restart_game(),
            Task::BackToMenu => self.back_to_menu(),
            Task::CompleteRestart => self.complete_restart(),
            Task::ExitToMenu => self.exit_to_menu(),
        }
    }

    // ── Flows ──────────────────────────────────────────────────────────────

    fn start_game(&mut self) {
        self.ctx.state.set_state(Phase::Ready);
        self.ctx.prompts.show(&mut self.hud, PromptKind::StartPrompt);
        self.ctx.prompts.show(&mut self.hud, PromptKind::ControlsInfo);
        self.ctx.waiting_for_first_click = true;
    }

    /// Finalize the flying attempt. Runs at most once per launch.
    fn end_launch(&mut self, reason: StopReason) {
        if self.ctx.state.get_state() != Phase::Flying {
            log::warn!("end_launch in phase {}, ignoring", self.ctx.state.get_state());
            return;
        }

        // Freeze the body before reading the final distance
        if let Err(e) = halt_body(&mut self.world, self.ctx.body) {
            log::warn!("{}", e);
        }
        if let Some(pos) = self.world.position(self.ctx.body) {
            self.ctx
                .score
                .update_distance(pos.x, self.config.world.launch_origin.x);
        }
        self.ctx.score.add_current_to_total();
        self.ctx.state.record_attempt();

        let score = self.ctx.score.snapshot();
        self.hud
            .update_distance(score.current_distance, score.total_distance);
        self.hud.update_attempts(
            self.ctx.state.attempts_used(),
            self.ctx.state.get_max_attempts(),
        );
        self.ctx.events.push(SessionEvent::AttemptScored {
            attempt: self.ctx.state.attempts_used(),
            distance: score.current_distance,
            total: score.total_distance,
            reason,
        });

        if self.ctx.state.is_game_over() {
            self.end_game();
        } else {
            self.ctx
                .prompts
                .show(&mut self.hud, PromptKind::NextLaunchPrompt);
            self.ctx.state.set_state(Phase::Ended);
        }
    }

    fn end_game(&mut self) {
        self.ctx.state.set_state(Phase::Ended);
        self.ctx.state.set_modal_state(true);

        let is_new_record = self.ctx.score.check_and_update_best_distance();
        if is_new_record {
            self.hud
                .update_best_distance(self.ctx.score.best_total_distance());
        }

        let token = EndGameToken(self.ctx.next_token);
        self.ctx.next_token += 1;
        self.ctx.end_game = Some(PendingEndGame {
            token,
            is_new_record,
            shown: false,
        });

        let total = self.ctx.score.total_distance();
        let best = self.ctx.score.best_total_distance();
        log::info!(
            "Game over: {:.1} m (best {:.1} m{})",
            total,
            best,
            if is_new_record { ", new record" } else { "" }
        );
        self.ctx.events.push(SessionEvent::GameOver {
            total,
            best,
            is_new_record,
        });

        // The click that ended the game must not land on a panel button
        self.schedule(self.config.timing.end_game_panel_delay, Task::ShowEndGamePanel);
    }

    fn show_end_game_panel(&mut self) {
        let Some(pending) = self.ctx.end_game.as_mut() else {
            return;
        };
        if pending.shown || !self.ctx.state.is_modal_open() {
            return;
        }
        pending.shown = true;
        let panel = EndGamePanel {
            total_distance: self.ctx.score.total_distance(),
            best_distance: self.ctx.score.best_total_distance(),
            is_new_record: pending.is_new_record,
            token: pending.token,
        };
        self.hud.show_end_game(panel);
    }

    /// Between attempts: park the penguin off-stage and play its entrance.
    /// The caller has already raised `is_resetting`.
    fn reset_launch(&mut self) {
        self.camera.reset_to_initial();
        self.world.pause();

        let offscreen_x = self.config.world.offscreen_x;
        self.park_body(offscreen_x);
        self.ctx.launch.cancel();
        self.hud.clear_gauges();

        self.ctx.score.reset_current_distance();
        self.hud
            .update_distance(0.0, self.ctx.score.total_distance());

        self.ctx.prompts.dispose_all(&mut self.hud);
        self.ctx.prompts.show(&mut self.hud, PromptKind::PreparingText);

        self.schedule(self.config.timing.entrance_duration, Task::FinishAttemptReset);
    }

    fn finish_attempt_reset(&mut self) {
        if !self.ctx.state.is_resetting() {
            log::debug!("entrance finished with no reset in progress, ignoring");
            return;
        }
        self.ctx.prompts.dispose(&mut self.hud, PromptKind::PreparingText);

        let origin_x = self.config.world.launch_origin.x;
        self.park_body(origin_x);
        self.world.resume();

        self.ctx.launch.start_angle_selection(&mut self.ctx.state);
        self.ctx.state.set_resetting(false);
    }

    /// Full game restart. Halts everything now, rebuilds after a short delay.
    fn restart_game(&mut self) {
        log::info!("Restarting game");
        self.ctx.epoch += 1;

        self.world.pause();
        if let Err(e) = halt_body(&mut self.world, self.ctx.body) {
            log::warn!("{}", e);
        }

        self.ctx.end_game = None;
        self.hud.hide_end_game();
        self.ctx.launch.cancel();
        self.hud.clear_gauges();

        self.ctx.state.reset();
        self.ctx.state.set_state(Phase::Resetting);
        self.ctx.state.set_resetting(true);
        self.ctx.score.reset_current_distance();
        self.ctx.score.reset_total_distance();
        self.ctx.waiting_for_first_click = false;

        self.hud.update_distance(0.0, 0.0);
        self.hud
            .update_attempts(0, self.ctx.state.get_max_attempts());
        self.ctx.prompts.dispose_all(&mut self.hud);

        self.schedule(self.config.timing.restart_delay, Task::CompleteRestart);
    }

    fn complete_restart(&mut self) {
        let camera = &self.config.camera;
        self.camera.flash(camera.flash_duration, camera.flash_color);
        let initial_scroll_x = self.camera.initial_scroll_x();
        self.camera.set_scroll_x(initial_scroll_x);

        self.ctx.state.reset();
        let origin_x = self.config.world.launch_origin.x;
        self.park_body(origin_x);
        self.world.resume();

        self.ctx.events.push(SessionEvent::Restarted);
        self.start_game();
    }

    /// Leave the game. Whatever was in progress (a flight, an entrance, a
    /// queued end-of-game panel) is stopped here and never completes.
    fn back_to_menu(&mut self) {
        log::info!("Returning to menu");
        self.ctx.epoch += 1;

        self.world.pause();
        if let Err(e) = halt_body(&mut self.world, self.ctx.body) {
            log::warn!("{}", e);
        }
        self.ctx.launch.cancel();
        self.hud.clear_gauges();

        self.ctx.state.set_state(Phase::Resetting);
        self.ctx.state.set_resetting(true);
        self.ctx.end_game = None;
        self.hud.hide_end_game();
        self.camera.fade(self.config.camera.fade_duration);
        self.schedule(self.config.camera.fade_duration, Task::ExitToMenu);
    }

    fn exit_to_menu(&mut self) {
        self.world.pause();
        self.ctx.launch.cancel();
        self.ctx.prompts.dispose_all(&mut self.hud);
        self.ctx.exited = true;
        self.ctx.events.push(SessionEvent::ExitedToMenu);
    }

    /// Put the penguin at `x` on the launch line, motionless and static
    fn park_body(&mut self, x: f32) {
        let pos = Vec2::new(x, self.config.world.launch_origin.y);
        if let Err(e) = place_static(&mut self.world, self.ctx.body, pos) {
            log::warn!("{}", e);
        }
    }
}

fn place_static(world: &mut dyn PhysicsWorld, id: BodyId, pos: Vec2) -> LaunchResult<()> {
    halt_body(world, id)?;
    world.set_position(id, pos)?;
    world.set_angle(id, 0.0)?;
    world.set_static(id, true)
}

fn log_rejected(e: LaunchError) {
    log::warn!("{}", e);
}
