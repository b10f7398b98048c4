//! Gesture presentation types
//!
//! Render parameters derived from the gesture tracker state. Hosts apply
//! them directly to the card transform and the LIKE/NOPE overlays.

use crate::Direction;
use serde::{Deserialize, Serialize};

/// Coarse gesture state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "direction")]
pub enum GesturePhase {
    /// Card at rest
    Idle,
    /// Pointer held down, card follows it
    Dragging,
    /// Released below threshold, card easing back to center
    Relaxing,
    /// Committed exit animation in progress
    Leaving(Direction),
}

/// CSS-style transition hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub duration_ms: u64,
}

/// One frame of card presentation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureFrame {
    pub phase: GesturePhase,
    pub translate_x: f64,
    pub translate_y: f64,
    pub rotation_deg: f64,
    /// Opacity of the accept overlay, 0.0-1.0
    pub like_opacity: f64,
    /// Opacity of the reject overlay, 0.0-1.0
    pub nope_opacity: f64,
    /// None while the card tracks the pointer directly
    pub transition: Option<Transition>,
}

impl GestureFrame {
    /// Card at rest in the center
    pub fn idle() -> Self {
        Self {
            phase: GesturePhase::Idle,
            translate_x: 0.0,
            translate_y: 0.0,
            rotation_deg: 0.0,
            like_opacity: 0.0,
            nope_opacity: 0.0,
            transition: None,
        }
    }
}

impl Default for GestureFrame {
    fn default() -> Self {
        Self::idle()
    }
}
