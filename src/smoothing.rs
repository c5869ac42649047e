//! Critically-damped smoothing used by the tween stages.
//!
//! [`smooth_damp`] is the usual game-engine SmoothDamp: a critically damped
//! spring approximated with a rational exponential, with an optional speed
//! cap and no overshoot past the target. The [`Smoother`] implementations
//! apply it to each payload family, with one velocity term per component.

use crate::types::{Color, Payload, Vec2, Vec3};
use std::fmt;

/// Lower bound on the smoothing time, avoids dividing by zero.
pub const MIN_SMOOTH_TIME: f64 = 1.0e-4;

/// Smoothing parameters for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothParams {
    /// Approximate time to reach the target, in seconds.
    pub smooth_time: f32,
    /// Speed cap in units per second. `None` for unlimited.
    pub max_speed: Option<f32>,
}

/// Advance `current` towards `target` by `dt` seconds.
pub fn smooth_damp(
    current: f64,
    target: f64,
    velocity: &mut f64,
    smooth_time: f64,
    max_speed: Option<f64>,
    dt: f64,
) -> f64 {
    if dt <= 0.0 {
        return current;
    }

    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let original_target = target;
    let mut change = current - target;
    if let Some(max_speed) = max_speed {
        let max_change = max_speed * smooth_time;
        change = change.max(-max_change).min(max_change);
    }
    let target = current - change;

    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    // Never overshoot the original target.
    if (original_target - current > 0.0) == (output > original_target) {
        output = original_target;
        *velocity = (output - original_target) / dt;
    }

    output
}

/// Shortest signed difference between two angles in degrees, in `[-180, 180]`.
pub fn delta_angle(current: f64, target: f64) -> f64 {
    let mut delta = (target - current).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

/// SmoothDamp for angles in degrees, taking the shortest way around.
pub fn smooth_damp_angle(
    current: f64,
    target: f64,
    velocity: &mut f64,
    smooth_time: f64,
    max_speed: Option<f64>,
    dt: f64,
) -> f64 {
    let target = current + delta_angle(current, target);
    smooth_damp(current, target, velocity, smooth_time, max_speed, dt)
}

/// A smoothing algorithm for one payload type.
pub trait Smoother: 'static {
    type Value: Payload + Copy + Default;
    type Velocity: Copy + Default + fmt::Debug;

    /// Stage name used in diagnostics.
    const NAME: &'static str;

    fn step(
        current: Self::Value,
        target: Self::Value,
        velocity: &mut Self::Velocity,
        params: &SmoothParams,
        dt: f32,
    ) -> Self::Value;

    /// Distance used for the convergence tolerance.
    fn distance(a: Self::Value, b: Self::Value) -> f32;
}

fn damp_component(
    current: f32,
    target: f32,
    velocity: &mut f64,
    params: &SmoothParams,
    dt: f32,
) -> f32 {
    smooth_damp(
        current as f64,
        target as f64,
        velocity,
        params.smooth_time as f64,
        params.max_speed.map(f64::from),
        dt as f64,
    ) as f32
}

/// SmoothDamp over `f32`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatSmoothDamp;

impl Smoother for FloatSmoothDamp {
    type Value = f32;
    type Velocity = f64;
    const NAME: &'static str = "SmoothDamp (float)";

    fn step(current: f32, target: f32, velocity: &mut f64, params: &SmoothParams, dt: f32) -> f32 {
        damp_component(current, target, velocity, params, dt)
    }

    fn distance(a: f32, b: f32) -> f32 {
        (a - b).abs()
    }
}

/// SmoothDamp over `f64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleSmoothDamp;

impl Smoother for DoubleSmoothDamp {
    type Value = f64;
    type Velocity = f64;
    const NAME: &'static str = "SmoothDamp (double)";

    fn step(current: f64, target: f64, velocity: &mut f64, params: &SmoothParams, dt: f32) -> f64 {
        smooth_damp(
            current,
            target,
            velocity,
            params.smooth_time as f64,
            params.max_speed.map(f64::from),
            dt as f64,
        )
    }

    fn distance(a: f64, b: f64) -> f32 {
        (a - b).abs() as f32
    }
}

/// SmoothDamp over an angle in degrees.
#[derive(Debug, Clone, Copy, Default)]
pub struct AngleSmoothDamp;

impl Smoother for AngleSmoothDamp {
    type Value = f32;
    type Velocity = f64;
    const NAME: &'static str = "SmoothDamp (angle)";

    fn step(current: f32, target: f32, velocity: &mut f64, params: &SmoothParams, dt: f32) -> f32 {
        smooth_damp_angle(
            current as f64,
            target as f64,
            velocity,
            params.smooth_time as f64,
            params.max_speed.map(f64::from),
            dt as f64,
        ) as f32
    }

    fn distance(a: f32, b: f32) -> f32 {
        delta_angle(a as f64, b as f64).abs() as f32
    }
}

/// SmoothDamp over [`Vec2`], one velocity per axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vec2SmoothDamp;

impl Smoother for Vec2SmoothDamp {
    type Value = Vec2;
    type Velocity = [f64; 2];
    const NAME: &'static str = "SmoothDamp (vec2)";

    fn step(current: Vec2, target: Vec2, velocity: &mut [f64; 2], params: &SmoothParams, dt: f32) -> Vec2 {
        Vec2::new(
            damp_component(current.x, target.x, &mut velocity[0], params, dt),
            damp_component(current.y, target.y, &mut velocity[1], params, dt),
        )
    }

    fn distance(a: Vec2, b: Vec2) -> f32 {
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }
}

/// SmoothDamp over [`Vec3`], one velocity per axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vec3SmoothDamp;

impl Smoother for Vec3SmoothDamp {
    type Value = Vec3;
    type Velocity = [f64; 3];
    const NAME: &'static str = "SmoothDamp (vec3)";

    fn step(current: Vec3, target: Vec3, velocity: &mut [f64; 3], params: &SmoothParams, dt: f32) -> Vec3 {
        Vec3::new(
            damp_component(current.x, target.x, &mut velocity[0], params, dt),
            damp_component(current.y, target.y, &mut velocity[1], params, dt),
            damp_component(current.z, target.z, &mut velocity[2], params, dt),
        )
    }

    fn distance(a: Vec3, b: Vec3) -> f32 {
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2) + (a.z - b.z).powi(2)).sqrt()
    }
}

/// SmoothDamp over [`Color`], one velocity per channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorSmoothDamp;

impl Smoother for ColorSmoothDamp {
    type Value = Color;
    type Velocity = [f64; 4];
    const NAME: &'static str = "SmoothDamp (color)";

    fn step(current: Color, target: Color, velocity: &mut [f64; 4], params: &SmoothParams, dt: f32) -> Color {
        Color::rgba(
            damp_component(current.r, target.r, &mut velocity[0], params, dt),
            damp_component(current.g, target.g, &mut velocity[1], params, dt),
            damp_component(current.b, target.b, &mut velocity[2], params, dt),
            damp_component(current.a, target.a, &mut velocity[3], params, dt),
        )
    }

    fn distance(a: Color, b: Color) -> f32 {
        (a.r - b.r)
            .abs()
            .max((a.g - b.g).abs())
            .max((a.b - b.b).abs())
            .max((a.a - b.a).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smooth_damp_converges() {
        let mut velocity = 0.0;
        let mut value = 0.0;
        for _ in 0..600 {
            value = smooth_damp(value, 10.0, &mut velocity, 0.25, None, 1.0 / 60.0);
        }
        assert!((value - 10.0).abs() < 1e-4, "value = {}", value);
    }

    #[test]
    fn test_smooth_damp_never_overshoots() {
        let mut velocity = 0.0;
        let mut value = 0.0;
        for _ in 0..120 {
            value = smooth_damp(value, 1.0, &mut velocity, 0.1, None, 1.0 / 30.0);
            assert!(value <= 1.0);
        }
    }

    #[test]
    fn test_smooth_damp_zero_dt_is_noop() {
        let mut velocity = 2.0;
        let value = smooth_damp(3.0, 10.0, &mut velocity, 0.5, None, 0.0);
        assert_eq!(value, 3.0);
        assert_eq!(velocity, 2.0);
    }

    #[test]
    fn test_max_speed_caps_motion() {
        let mut velocity = 0.0;
        let value = smooth_damp(0.0, 1000.0, &mut velocity, 0.1, Some(1.0), 0.1);
        assert!(value < 1.0, "value = {}", value);
    }

    #[test]
    fn test_delta_angle_wraps() {
        assert_eq!(delta_angle(350.0, 10.0), 20.0);
        assert_eq!(delta_angle(10.0, 350.0), -20.0);
        assert_eq!(delta_angle(0.0, 180.0), 180.0);
    }

    #[test]
    fn test_angle_takes_short_way() {
        let mut velocity = 0.0;
        let next = smooth_damp_angle(350.0, 10.0, &mut velocity, 0.2, None, 1.0 / 60.0);
        assert!(next > 350.0, "moved the long way round: {}", next);
    }

    #[test]
    fn test_color_distance_is_max_channel() {
        let a = Color::rgba(0.0, 0.5, 0.0, 1.0);
        let b = Color::rgba(0.1, 0.0, 0.0, 1.0);
        assert!((ColorSmoothDamp::distance(a, b) - 0.5).abs() < 1e-6);
    }
}
