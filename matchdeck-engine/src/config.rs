//! Configuration management for the swipe engine
//!
//! All tunables live in one TOML document. Every field has a built-in
//! default, so an absent file (or an absent section) is valid.
//!
//! # Settings Sources Priority
//!
//! 1. Command-line argument (`--config`)
//! 2. Environment variable (`MATCHDECK_CONFIG`)
//! 3. Platform config directory (`<config_dir>/matchdeck/config.toml`)
//! 4. Built-in defaults (code constants)
//!
//! # Example
//!
//! ```toml
//! event_capacity = 512
//! record_on_redo = false
//!
//! [gesture]
//! swipe_threshold_px = 120.0
//!
//! [timing]
//! undo_prompt_ms = 5000
//!
//! [provider]
//! base_url = "https://api.example.edu"
//! viewer_id = "u-1"
//!
//! [logging]
//! level = "debug"
//! ```

use crate::error::{Error, Result};
use matchdeck_common::config::{load_toml_or_default, resolve_config_path, CONFIG_ENV_VAR};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Broadcast capacity of the event bus
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Re-send replayed decisions to the decision sink on redo
    ///
    /// Off by default: undo never retracts upstream, so the original record
    /// is still in place when a decision is redone.
    #[serde(default)]
    pub record_on_redo: bool,

    /// Ask the decision sink to retract a decision when it is undone
    #[serde(default)]
    pub retract_on_undo: bool,

    #[serde(default)]
    pub gesture: GestureConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    /// Remote insight/decision service (optional)
    #[serde(default)]
    pub provider: Option<ProviderConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Drag thresholds and presentation constants
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Horizontal travel required to commit
    pub swipe_threshold_px: f64,
    /// Vertical travel at or beyond which a release never commits
    pub vertical_tolerance_px: f64,
    /// Floor on the velocity sample interval
    pub min_velocity_dt_ms: f64,
    /// Degrees of rotation per pixel of offset is `1 / rotation_divisor`
    pub rotation_divisor: f64,
    pub max_rotation_deg: f64,
    /// Extra tilt in degrees per px/ms of horizontal velocity
    pub velocity_tilt_factor: f64,
    pub max_velocity_tilt_deg: f64,
    /// Offset below which overlays stay fully transparent
    pub overlay_dead_zone_px: f64,
    /// Off-stage translation during a committed leave
    pub exit_offset_px: f64,
    /// Synthesized velocity magnitude for programmatic swipes
    pub exit_velocity_px_per_ms: f64,
    pub exit_transition_ms: u64,
    pub relax_transition_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_threshold_px: 120.0,
            vertical_tolerance_px: 140.0,
            min_velocity_dt_ms: 8.0,
            rotation_divisor: 12.0,
            max_rotation_deg: 18.0,
            velocity_tilt_factor: 2.0,
            max_velocity_tilt_deg: 6.0,
            overlay_dead_zone_px: 20.0,
            exit_offset_px: 500.0,
            exit_velocity_px_per_ms: 2.0,
            exit_transition_ms: 250,
            relax_transition_ms: 150,
        }
    }
}

/// Timer cadences, all in milliseconds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay between a programmatic trigger and its commit
    pub leave_delay_ms: u64,
    /// Lifetime of an undo prompt
    pub undo_prompt_ms: u64,
    /// Trait preview cycle period
    pub trait_cycle_ms: u64,
    /// Duration of the saved/skipped flash
    pub feedback_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            leave_delay_ms: 260,
            undo_prompt_ms: 5000,
            trait_cycle_ms: 900,
            feedback_ms: 600,
        }
    }
}

impl TimingConfig {
    pub fn leave_delay(&self) -> Duration {
        Duration::from_millis(self.leave_delay_ms)
    }

    pub fn undo_prompt(&self) -> Duration {
        Duration::from_millis(self.undo_prompt_ms)
    }

    pub fn trait_cycle(&self) -> Duration {
        Duration::from_millis(self.trait_cycle_ms)
    }

    pub fn feedback(&self) -> Duration {
        Duration::from_millis(self.feedback_ms)
    }
}

/// Remote service settings for the HTTP collaborators
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Viewer id used in the swipe-recording path
    pub viewer_id: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_event_capacity() -> usize {
    256
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_capacity: default_event_capacity(),
            record_on_redo: false,
            retract_on_undo: false,
            gesture: GestureConfig::default(),
            timing: TimingConfig::default(),
            provider: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Resolve, load and validate configuration
    ///
    /// `cli_path` takes priority over `MATCHDECK_CONFIG` and the platform
    /// config directory. Nothing found means built-in defaults.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let path = resolve_config_path(cli_path, CONFIG_ENV_VAR);
        if let Some(ref p) = path {
            info!("Loading engine config from {}", p.display());
        }
        let config: EngineConfig = load_toml_or_default(path.as_deref())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = matchdeck_common::config::parse_toml(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the engine misbehave
    pub fn validate(&self) -> Result<()> {
        let g = &self.gesture;
        let positive = [
            ("gesture.swipe_threshold_px", g.swipe_threshold_px),
            ("gesture.vertical_tolerance_px", g.vertical_tolerance_px),
            ("gesture.min_velocity_dt_ms", g.min_velocity_dt_ms),
            ("gesture.rotation_divisor", g.rotation_divisor),
            ("gesture.max_rotation_deg", g.max_rotation_deg),
            ("gesture.exit_offset_px", g.exit_offset_px),
        ];
        for (key, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Config(format!("{} must be > 0, got {}", key, value)));
            }
        }

        if !(0.0..g.swipe_threshold_px).contains(&g.overlay_dead_zone_px) {
            return Err(Error::Config(format!(
                "gesture.overlay_dead_zone_px must be in [0, swipe_threshold_px), got {}",
                g.overlay_dead_zone_px
            )));
        }

        if g.max_velocity_tilt_deg < 0.0 || g.velocity_tilt_factor < 0.0 {
            return Err(Error::Config("velocity tilt settings must be >= 0".to_string()));
        }

        let t = &self.timing;
        let durations = [
            ("timing.leave_delay_ms", t.leave_delay_ms),
            ("timing.undo_prompt_ms", t.undo_prompt_ms),
            ("timing.trait_cycle_ms", t.trait_cycle_ms),
            ("timing.feedback_ms", t.feedback_ms),
        ];
        for (key, value) in durations {
            if value == 0 {
                return Err(Error::Config(format!("{} must be > 0", key)));
            }
        }

        if self.event_capacity == 0 {
            return Err(Error::Config("event_capacity must be > 0".to_string()));
        }

        if let Some(provider) = &self.provider {
            if !provider.base_url.starts_with("http://") && !provider.base_url.starts_with("https://") {
                return Err(Error::Config(format!(
                    "provider.base_url must be an http(s) URL, got {}",
                    provider.base_url
                )));
            }
        }

        Ok(())
    }
}
