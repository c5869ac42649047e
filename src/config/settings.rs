//! Runtime settings for the scheduler and the tween stages
//!
//! # Main Types
//!
//! - [`SchedulerSettings`] - How elapsed time is turned into a tick delta
//! - [`TweenSettings`] - Smoothing time, speed cap and convergence tolerance

use crate::smoothing::SmoothParams;
use serde::{Deserialize, Serialize};

/// Default smoothing time in seconds
pub const DEFAULT_SMOOTH_TIME: f32 = 0.15;

/// Default convergence tolerance
pub const DEFAULT_TOLERANCE: f32 = 1.0e-3;

/// Default cap on a single tick's elapsed time, in seconds
pub const DEFAULT_MAX_DELTA_SECONDS: f32 = 0.25;

/// Settings for the tick scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Multiplier applied to elapsed time (0 pauses scaled tweens)
    pub time_scale: f32,

    /// Upper bound on the elapsed time of one tick, in seconds
    pub max_delta_seconds: f32,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            max_delta_seconds: DEFAULT_MAX_DELTA_SECONDS,
        }
    }
}

impl SchedulerSettings {
    /// Check the settings are usable, returning a description of the first problem.
    pub fn validate(&self) -> Result<(), String> {
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(format!("time_scale must be >= 0, got {}", self.time_scale));
        }
        if !self.max_delta_seconds.is_finite() || self.max_delta_seconds <= 0.0 {
            return Err(format!(
                "max_delta_seconds must be > 0, got {}",
                self.max_delta_seconds
            ));
        }
        Ok(())
    }
}

/// Settings for a tween stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TweenSettings {
    /// Approximate time to reach a new target, in seconds
    pub smooth_time: f32,

    /// Speed cap in units per second (None = unlimited)
    pub max_speed: Option<f32>,

    /// Distance below which the transition counts as finished
    pub tolerance: f32,

    /// Advance with unscaled time, ignoring the scheduler's time scale
    pub use_unscaled_time: bool,
}

impl Default for TweenSettings {
    fn default() -> Self {
        Self {
            smooth_time: DEFAULT_SMOOTH_TIME,
            max_speed: None,
            tolerance: DEFAULT_TOLERANCE,
            use_unscaled_time: false,
        }
    }
}

impl TweenSettings {
    pub fn with_smooth_time(mut self, smooth_time: f32) -> Self {
        self.smooth_time = smooth_time;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = Some(max_speed);
        self
    }

    pub fn unscaled(mut self) -> Self {
        self.use_unscaled_time = true;
        self
    }

    pub fn params(&self) -> SmoothParams {
        SmoothParams {
            smooth_time: self.smooth_time,
            max_speed: self.max_speed,
        }
    }

    /// Check the settings are usable, returning the offending parameter and reason.
    pub fn validate(&self) -> Result<(), (&'static str, String)> {
        if !self.smooth_time.is_finite() || self.smooth_time <= 0.0 {
            return Err(("smooth_time", format!("must be > 0, got {}", self.smooth_time)));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(("tolerance", format!("must be >= 0, got {}", self.tolerance)));
        }
        if let Some(max_speed) = self.max_speed {
            if max_speed.is_nan() || max_speed <= 0.0 {
                return Err(("max_speed", format!("must be > 0, got {}", max_speed)));
            }
        }
        Ok(())
    }
}
