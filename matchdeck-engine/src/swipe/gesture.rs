//! Gesture tracker
//!
//! Turns pointer down/move/up sequences (or a programmatic trigger) into a
//! committed swipe direction. Presentation values are derived from the
//! tracker state by [`GestureTracker::frame`]; nothing here schedules work.
//!
//! Only the first active pointer is tracked. While a leave animation is in
//! progress every drag method is a no-op.

use crate::config::GestureConfig;
use matchdeck_common::events::{GestureFrame, GesturePhase, Transition};
use matchdeck_common::Direction;
use tokio::time::Instant;
use tracing::debug;

/// Pointer identifier as reported by the host
pub type PointerId = u64;

#[derive(Debug, Clone, Copy)]
struct ActiveDrag {
    pointer_id: PointerId,
    start_x: f64,
    start_y: f64,
    last_x: f64,
    last_at: Instant,
}

/// Pointer-to-direction state machine
#[derive(Debug)]
pub struct GestureTracker {
    config: GestureConfig,
    disabled: bool,
    drag: Option<ActiveDrag>,
    /// Released below threshold; card easing back to center
    relaxing: bool,
    leaving: Option<Direction>,
    offset_x: f64,
    offset_y: f64,
    /// Horizontal velocity in px/ms
    velocity: f64,
}

impl GestureTracker {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            disabled: false,
            drag: None,
            relaxing: false,
            leaving: None,
            offset_x: 0.0,
            offset_y: 0.0,
            velocity: 0.0,
        }
    }

    /// Record a drag origin
    ///
    /// Returns false (and changes nothing) when disabled, leaving, or a drag
    /// is already active.
    pub fn begin_drag(&mut self, pointer_id: PointerId, x: f64, y: f64, now: Instant) -> bool {
        if self.disabled || self.leaving.is_some() || self.drag.is_some() {
            return false;
        }

        self.drag = Some(ActiveDrag {
            pointer_id,
            start_x: x,
            start_y: y,
            last_x: x,
            last_at: now,
        });
        self.relaxing = false;
        self.offset_x = 0.0;
        self.offset_y = 0.0;
        self.velocity = 0.0;
        true
    }

    /// Follow the tracked pointer
    pub fn update_drag(&mut self, pointer_id: PointerId, x: f64, y: f64, now: Instant) -> bool {
        if self.disabled || self.leaving.is_some() {
            return false;
        }
        let min_dt = self.config.min_velocity_dt_ms;
        let Some(drag) = self.drag.as_mut().filter(|d| d.pointer_id == pointer_id) else {
            return false;
        };

        let elapsed_ms = now.saturating_duration_since(drag.last_at).as_secs_f64() * 1000.0;
        self.velocity = (x - drag.last_x) / elapsed_ms.max(min_dt);
        self.offset_x = x - drag.start_x;
        self.offset_y = y - drag.start_y;
        drag.last_x = x;
        drag.last_at = now;
        true
    }

    /// Release the tracked pointer
    ///
    /// Commits when horizontal travel exceeds the threshold and vertical
    /// travel stays under the tolerance. A commit returns the tracker to
    /// rest; a miss leaves it relaxing back to center.
    pub fn end_drag(&mut self, pointer_id: PointerId) -> Option<Direction> {
        if self.leaving.is_some() {
            return None;
        }
        if !self.drag.is_some_and(|d| d.pointer_id == pointer_id) {
            return None;
        }
        self.drag = None;

        let committed = !self.disabled
            && self.offset_x.abs() > self.config.swipe_threshold_px
            && self.offset_y.abs() < self.config.vertical_tolerance_px;

        let direction = committed.then(|| {
            if self.offset_x > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        });

        debug!(
            offset_x = self.offset_x,
            offset_y = self.offset_y,
            direction = ?direction,
            "Drag released"
        );

        let moved = self.offset_x != 0.0 || self.offset_y != 0.0;
        self.clear_motion();
        self.relaxing = direction.is_none() && moved;
        direction
    }

    /// Abort the active drag without committing (pointer cancel)
    pub fn cancel_drag(&mut self) -> bool {
        if self.drag.take().is_none() {
            return false;
        }
        let moved = self.offset_x != 0.0 || self.offset_y != 0.0;
        self.clear_motion();
        self.relaxing = moved;
        true
    }

    /// Start a button/keyboard swipe
    ///
    /// Cancels any active drag. The caller commits after the leave delay and
    /// then calls [`finish_leave`](Self::finish_leave).
    pub fn trigger_programmatic(&mut self, direction: Direction) -> bool {
        if self.disabled || self.leaving.is_some() {
            return false;
        }
        self.drag = None;
        self.relaxing = false;
        self.clear_motion();
        self.velocity = direction.sign() * self.config.exit_velocity_px_per_ms;
        self.leaving = Some(direction);
        true
    }

    /// End the leave animation, returning its direction
    pub fn finish_leave(&mut self) -> Option<Direction> {
        let direction = self.leaving.take()?;
        self.clear_motion();
        Some(direction)
    }

    /// Drop all transient state (candidate changed)
    pub fn reset(&mut self) {
        self.drag = None;
        self.relaxing = false;
        self.leaving = None;
        self.clear_motion();
    }

    /// Enable or disable pointer input; disabling abandons an active drag
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.cancel_drag();
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn leaving(&self) -> Option<Direction> {
        self.leaving
    }

    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn phase(&self) -> GesturePhase {
        if let Some(direction) = self.leaving {
            GesturePhase::Leaving(direction)
        } else if self.drag.is_some() {
            GesturePhase::Dragging
        } else if self.relaxing {
            GesturePhase::Relaxing
        } else {
            GesturePhase::Idle
        }
    }

    /// Render parameters for the current state
    pub fn frame(&self) -> GestureFrame {
        let c = &self.config;
        match self.phase() {
            GesturePhase::Leaving(direction) => {
                let sign = direction.sign();
                GestureFrame {
                    phase: GesturePhase::Leaving(direction),
                    translate_x: sign * c.exit_offset_px,
                    translate_y: 0.0,
                    rotation_deg: sign * c.max_rotation_deg,
                    like_opacity: if direction.is_accept() { 1.0 } else { 0.0 },
                    nope_opacity: if direction.is_accept() { 0.0 } else { 1.0 },
                    transition: Some(Transition {
                        duration_ms: c.exit_transition_ms,
                    }),
                }
            }
            GesturePhase::Dragging => {
                let tilt = (self.velocity * c.velocity_tilt_factor)
                    .clamp(-c.max_velocity_tilt_deg, c.max_velocity_tilt_deg);
                let rotation = (self.offset_x / c.rotation_divisor + tilt)
                    .clamp(-c.max_rotation_deg, c.max_rotation_deg);
                GestureFrame {
                    phase: GesturePhase::Dragging,
                    translate_x: self.offset_x,
                    translate_y: self.offset_y,
                    rotation_deg: rotation,
                    like_opacity: self.overlay_opacity(self.offset_x),
                    nope_opacity: self.overlay_opacity(-self.offset_x),
                    transition: None,
                }
            }
            GesturePhase::Relaxing => GestureFrame {
                phase: GesturePhase::Relaxing,
                transition: Some(Transition {
                    duration_ms: c.relax_transition_ms,
                }),
                ..GestureFrame::idle()
            },
            GesturePhase::Idle => GestureFrame::idle(),
        }
    }

    /// 0 inside the dead zone, rising linearly to 1 at the threshold
    fn overlay_opacity(&self, travel: f64) -> f64 {
        let span = self.config.swipe_threshold_px - self.config.overlay_dead_zone_px;
        ((travel - self.config.overlay_dead_zone_px) / span).clamp(0.0, 1.0)
    }

    fn clear_motion(&mut self) {
        self.offset_x = 0.0;
        self.offset_y = 0.0;
        self.velocity = 0.0;
    }
}
