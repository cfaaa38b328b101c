//! User interaction signal classes observed by the activity tracker.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A class of user interaction that counts as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionSignal {
    /// Pointer button pressed.
    PointerDown,
    /// Pointer moved.
    PointerMove,
    /// Key pressed.
    KeyPress,
    /// Viewport scrolled.
    Scroll,
    /// Touch started.
    TouchStart,
    /// Click completed.
    Click,
}

impl InteractionSignal {
    /// Every signal class the tracker subscribes to.
    pub const ALL: [InteractionSignal; 6] = [
        Self::PointerDown,
        Self::PointerMove,
        Self::KeyPress,
        Self::Scroll,
        Self::TouchStart,
        Self::Click,
    ];

    /// Converts to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PointerDown => "pointer_down",
            Self::PointerMove => "pointer_move",
            Self::KeyPress => "key_press",
            Self::Scroll => "scroll",
            Self::TouchStart => "touch_start",
            Self::Click => "click",
        }
    }
}

impl std::fmt::Display for InteractionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionSignal {
    type Err = AppError;

    /// Accepts the snake_case names plus the DOM event names they stand for.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pointer_down" | "mousedown" | "pointerdown" => Ok(Self::PointerDown),
            "pointer_move" | "mousemove" | "pointermove" => Ok(Self::PointerMove),
            "key_press" | "keypress" | "keydown" => Ok(Self::KeyPress),
            "scroll" => Ok(Self::Scroll),
            "touch_start" | "touchstart" => Ok(Self::TouchStart),
            "click" => Ok(Self::Click),
            other => Err(AppError::validation(format!(
                "Unknown interaction signal '{other}'"
            ))),
        }
    }
}
