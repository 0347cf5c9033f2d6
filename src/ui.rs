//! HUD boundary and transient prompt registry
//!
//! Every transient element (start prompt, controls panel, "preparing" text...)
//! is created through [`Hud::show_prompt`] and tracked by the handle it
//! returns, one per [`PromptKind`], so disposal never has to search the scene.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::sim::gauge::GaugeKind;

/// Purpose of a transient on-screen element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PromptKind {
    /// "Click to start"
    StartPrompt,
    /// Controls help panel
    ControlsInfo,
    /// "Click for the next launch"
    NextLaunchPrompt,
    /// "Preparing the launch..." during the entrance animation
    PreparingText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PromptHandle(pub u64);

/// Single-use ticket identifying one end-of-game presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndGameToken(pub u64);

/// What the end-of-game panel shows. The two buttons answer through
/// `SessionOrchestrator::choose_restart` / `choose_main_menu` with `token`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndGamePanel {
    pub total_distance: f32,
    pub best_distance: f32,
    pub is_new_record: bool,
    pub token: EndGameToken,
}

/// Player-facing display driven by the session
pub trait Hud {
    fn update_distance(&mut self, current: f32, total: f32);
    fn update_best_distance(&mut self, best: f32);
    fn update_attempts(&mut self, used: u32, max: u32);
    /// Live gauge readout while a parameter is being selected
    fn update_gauge(&mut self, kind: GaugeKind, value: f32);
    /// Remove gauge readouts (angle indicator text, power bar fill)
    fn clear_gauges(&mut self);
    fn show_prompt(&mut self, kind: PromptKind) -> PromptHandle;
    fn dispose_prompt(&mut self, handle: PromptHandle);
    fn show_end_game(&mut self, panel: EndGamePanel);
    fn hide_end_game(&mut self);
}

/// Live handles, at most one per purpose
#[derive(Debug, Clone, Default)]
pub struct TransientElements {
    handles: HashMap<PromptKind, PromptHandle>,
}

impl TransientElements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `kind`, replacing a previous element of the same purpose
    pub fn show(&mut self, hud: &mut dyn Hud, kind: PromptKind) {
        self.dispose(hud, kind);
        let handle = hud.show_prompt(kind);
        self.handles.insert(kind, handle);
    }

    /// Dispose `kind` if present
    pub fn dispose(&mut self, hud: &mut dyn Hud, kind: PromptKind) {
        if let Some(handle) = self.handles.remove(&kind) {
            hud.dispose_prompt(handle);
        }
    }

    pub fn dispose_all(&mut self, hud: &mut dyn Hud) {
        let mut live: Vec<_> = self.handles.drain().collect();
        live.sort();
        for (_, handle) in live {
            hud.dispose_prompt(handle);
        }
    }

    pub fn is_shown(&self, kind: PromptKind) -> bool {
        self.handles.contains_key(&kind)
    }
}

/// HUD that records what it would display (tests, headless runs)
#[derive(Debug, Clone, Default)]
pub struct HeadlessHud {
    pub current_distance: f32,
    pub total_distance: f32,
    pub best_distance: f32,
    pub attempts: (u32, u32),
    pub gauges: BTreeMap<GaugeKind, f32>,
    /// Live prompts by handle
    pub prompts: BTreeMap<PromptHandle, PromptKind>,
    pub end_game: Option<EndGamePanel>,
    /// How many times an end-of-game panel was presented
    pub end_game_shown: u32,
    next_handle: u64,
}

impl HeadlessHud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_showing(&self, kind: PromptKind) -> bool {
        self.prompts.values().any(|k| *k == kind)
    }
}

impl Hud for HeadlessHud {
    fn update_distance(&mut self, current: f32, total: f32) {
        self.current_distance = current;
        self.total_distance = total;
    }

    fn update_best_distance(&mut self, best: f32) {
        self.best_distance = best;
    }

    fn update_attempts(&mut self, used: u32, max: u32) {
        self.attempts = (used, max);
    }

    fn update_gauge(&mut self, kind: GaugeKind, value: f32) {
        self.gauges.insert(kind, value);
    }

    fn clear_gauges(&mut self) {
        self.gauges.clear();
    }

    fn show_prompt(&mut self, kind: PromptKind) -> PromptHandle {
        let handle = PromptHandle(self.next_handle);
        self.next_handle += 1;
        self.prompts.insert(handle, kind);
        handle
    }

    fn dispose_prompt(&mut self, handle: PromptHandle) {
        self.prompts.remove(&handle);
    }

    fn show_end_game(&mut self, panel: EndGamePanel) {
        self.end_game = Some(panel);
        self.end_game_shown += 1;
    }

    fn hide_end_game(&mut self) {
        self.end_game = None;
    }
}
