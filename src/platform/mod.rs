//! Platform input mapping
//!
//! The game understands one primary action (click, tap, space) and two named
//! keys. Hosts translate their raw events through here.

use serde::{Deserialize, Serialize};

/// Input the session reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputEvent {
    /// Pointer down / tap / confirm
    PrimaryAction,
    /// Restart the whole game (R)
    Restart,
    /// Leave for the main menu (Escape)
    Menu,
}

impl InputEvent {
    /// Map a DOM-style key name or code (`"KeyR"`, `"r"`, `"Escape"`, `" "`)
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Escape" | "Esc" => Some(InputEvent::Menu),
            "KeyR" | "r" | "R" => Some(InputEvent::Restart),
            " " | "Space" | "Enter" => Some(InputEvent::PrimaryAction),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputEvent::PrimaryAction => "primary",
            InputEvent::Restart => "restart",
            InputEvent::Menu => "menu",
        }
    }
}
