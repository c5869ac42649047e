//! Tween stages.
//!
//! A tween stage turns one discrete `Changed` from upstream into a run of
//! `Tweened` samples that approach the new value over several ticks.
//!
//! | upstream     | state                        | result                              |
//! |--------------|------------------------------|-------------------------------------|
//! | `Changed(v)` | first read                   | snap to `v`, `Changed(v)`           |
//! | `Changed(v)` | `v` within tolerance of current | snap to `v`, `Changed(v)`        |
//! | `Changed(v)` | `v` or current not finite    | snap to `v`, `Changed(v)`           |
//! | `Changed(v)` | otherwise                    | target `v`, `Tweened(current)`      |
//! | `NotChanged` | active, no time elapsed      | `NotChanged`                        |
//! | `NotChanged` | active, not converged        | step, `Tweened(current)`            |
//! | `NotChanged` | active, converged or stalled | snap to target, `Changed(target)`   |
//! | `NotChanged` | idle                         | `NotChanged`                        |
//! | `Tweened(v)` | any                          | snap to `v`, `Tweened(v)`           |
//!
//! Retargeting a running transition keeps the current velocity so motion
//! stays continuous. An upstream that is itself animating is passed through
//! rather than smoothed a second time: there is no sensible elapsed-time
//! baseline for a value that is already moving.
//!
//! A step that lands on the value it started from counts as settled. Far from
//! zero the spacing between adjacent floats can be wider than the tolerance,
//! and the last gap would otherwise never close.

use crate::config::TweenSettings;
use crate::pipeline::error::{PipelineError, PipelineResult, WiringError};
use crate::pipeline::node::{BindingDirection, BoxedNode, Node, TickContext};
use crate::smoothing::{
    AngleSmoothDamp, ColorSmoothDamp, DoubleSmoothDamp, FloatSmoothDamp, Smoother,
    Vec2SmoothDamp, Vec3SmoothDamp,
};
use crate::types::{Payload, Polled, Value, ValueType};

pub type FloatTween = TweenStage<FloatSmoothDamp>;
pub type DoubleTween = TweenStage<DoubleSmoothDamp>;
pub type AngleTween = TweenStage<AngleSmoothDamp>;
pub type Vec2Tween = TweenStage<Vec2SmoothDamp>;
pub type Vec3Tween = TweenStage<Vec3SmoothDamp>;
pub type ColorTween = TweenStage<ColorSmoothDamp>;

/// Smoothing stage over one payload type.
pub struct TweenStage<S: Smoother> {
    prev: BoxedNode,
    settings: TweenSettings,
    current: S::Value,
    target: S::Value,
    velocity: S::Velocity,
    initialized: bool,
    active: bool,
}

impl<S: Smoother> TweenStage<S> {
    pub fn attach(
        prev: BoxedNode,
        settings: TweenSettings,
        direction: BindingDirection,
    ) -> Result<Self, WiringError> {
        let expected = S::Value::value_type();
        let produced = prev.output_type();
        if produced != expected {
            return Err(WiringError::TypeMismatch {
                from_stage: prev.name().to_string(),
                from_type: produced,
                to_stage: S::NAME.to_string(),
                to_type: expected,
            });
        }
        settings
            .validate()
            .map_err(|(parameter, message)| WiringError::InvalidParameter {
                stage: S::NAME.to_string(),
                parameter: parameter.to_string(),
                message,
            })?;
        if direction.is_two_way() && !prev.is_two_way() {
            return Err(WiringError::NotTwoWay {
                stage: prev.name().to_string(),
            });
        }

        tracing::debug!(
            "Attached {} after '{}' (smooth_time={}s, tolerance={})",
            S::NAME,
            prev.name(),
            settings.smooth_time,
            settings.tolerance
        );

        Ok(Self {
            prev,
            settings,
            current: S::Value::default(),
            target: S::Value::default(),
            velocity: S::Velocity::default(),
            initialized: false,
            active: false,
        })
    }

    pub fn settings(&self) -> &TweenSettings {
        &self.settings
    }

    /// Whether a transition is running.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current(&self) -> S::Value {
        self.current
    }

    pub fn target(&self) -> S::Value {
        self.target
    }

    pub fn velocity(&self) -> S::Velocity {
        self.velocity
    }

    fn snap(&mut self, value: S::Value) {
        self.current = value;
        self.target = value;
        self.velocity = S::Velocity::default();
        self.initialized = true;
        self.active = false;
    }

    fn converged(&self, a: S::Value, b: S::Value) -> bool {
        S::distance(a, b) <= self.settings.tolerance
    }

    fn on_changed(&mut self, value: S::Value) -> Polled<Value> {
        let gap = S::distance(value, self.current);
        if !self.initialized || !gap.is_finite() || gap <= self.settings.tolerance {
            self.snap(value);
            return Polled::Changed(value.into_value());
        }

        let shown = self.current;
        self.target = value;
        self.active = true;
        tracing::trace!("{} retarget {:?} -> {:?}", S::NAME, shown, value);
        Polled::Tweened(shown.into_value())
    }

    fn advance(&mut self, dt: f32) -> Polled<Value> {
        if !self.active || dt <= 0.0 {
            return Polled::NotChanged;
        }

        let params = self.settings.params();
        let previous = self.current;
        self.current = S::step(previous, self.target, &mut self.velocity, &params, dt);

        let stalled = S::distance(self.current, previous) == 0.0;
        if stalled || self.converged(self.current, self.target) {
            let target = self.target;
            self.snap(target);
            tracing::trace!("{} settled at {:?}", S::NAME, target);
            return Polled::Changed(target.into_value());
        }
        Polled::Tweened(self.current.into_value())
    }
}

impl<S: Smoother> Node for TweenStage<S> {
    fn name(&self) -> &str {
        S::NAME
    }

    fn input_type(&self) -> ValueType {
        S::Value::value_type()
    }

    fn output_type(&self) -> ValueType {
        S::Value::value_type()
    }

    fn is_two_way(&self) -> bool {
        self.prev.is_two_way()
    }

    fn try_get_value(&mut self, ctx: &TickContext) -> PipelineResult<Polled<Value>> {
        let dt = ctx.delta_for(self.settings.use_unscaled_time);
        match self.prev.try_get_value(ctx)? {
            Polled::Changed(value) => Ok(self.on_changed(S::Value::from_value(value)?)),
            Polled::NotChanged => Ok(self.advance(dt)),
            Polled::Tweened(value) => {
                let typed = S::Value::from_value(value)?;
                self.snap(typed);
                Ok(Polled::Tweened(typed.into_value()))
            }
        }
    }

    /// Writes jump straight to the value; there is nothing to animate towards
    /// on the source side.
    fn set_value(&mut self, value: Value) -> PipelineResult<()> {
        if !self.prev.is_two_way() {
            return Err(PipelineError::ReadOnly {
                stage: S::NAME.to_string(),
            });
        }
        let typed = S::Value::from_value(value)?;
        self.prev.set_value(typed.into_value())?;
        self.snap(typed);
        Ok(())
    }

    fn upstream(&self) -> Option<&dyn Node> {
        Some(self.prev.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::nodes::PropertyAdapter;
    use crate::source::PropertyBag;
    use crate::types::{EResult, Vec3};

    const DT: f32 = 1.0 / 60.0;

    fn ctx() -> TickContext {
        TickContext::new(DT)
    }

    fn float_tween(bag: &PropertyBag, settings: TweenSettings) -> FloatTween {
        let adapter = PropertyAdapter::new(bag, "x", BindingDirection::TwoWay).unwrap();
        FloatTween::attach(Box::new(adapter), settings, BindingDirection::OneWay).unwrap()
    }

    #[test]
    fn test_first_read_snaps() {
        let bag = PropertyBag::new("T").define("x", 5.0f32);
        let mut tween = float_tween(&bag, TweenSettings::default());

        assert_eq!(
            tween.try_get_value(&ctx()).unwrap(),
            Polled::Changed(Value::Float(5.0))
        );
        assert!(!tween.is_active());
        assert_eq!(tween.try_get_value(&ctx()).unwrap(), Polled::NotChanged);
    }

    #[test]
    fn test_change_reports_previous_value_first() {
        let bag = PropertyBag::new("T").define("x", 0.0f32);
        let mut tween = float_tween(&bag, TweenSettings::default());
        tween.try_get_value(&ctx()).unwrap();

        bag.set("x", 10.0f32).unwrap();
        assert_eq!(
            tween.try_get_value(&ctx()).unwrap(),
            Polled::Tweened(Value::Float(0.0))
        );
        assert!(tween.is_active());

        match tween.try_get_value(&ctx()).unwrap() {
            Polled::Tweened(Value::Float(v)) => assert!(v > 0.0 && v < 10.0),
            other => panic!("expected an intermediate sample, got {:?}", other),
        }
    }

    #[test]
    fn test_converges_then_goes_quiet() {
        let bag = PropertyBag::new("T").define("x", 0.0f32);
        let settings = TweenSettings::default().with_smooth_time(0.1);
        let mut tween = float_tween(&bag, settings);
        tween.try_get_value(&ctx()).unwrap();
        bag.set("x", 1.0f32).unwrap();

        let mut settled = None;
        for tick in 0..600 {
            match tween.try_get_value(&ctx()).unwrap() {
                Polled::Tweened(_) => {}
                Polled::Changed(v) => {
                    settled = Some((tick, v));
                    break;
                }
                Polled::NotChanged => panic!("went quiet without settling"),
            }
        }
        let (_, value) = settled.expect("tween never settled");
        assert_eq!(value, Value::Float(1.0));
        for _ in 0..5 {
            assert_eq!(
                tween.try_get_value(&ctx()).unwrap().result(),
                EResult::NotChanged
            );
        }
    }

    #[test]
    fn test_small_change_does_not_animate() {
        let bag = PropertyBag::new("T").define("x", 1.0f32);
        let settings = TweenSettings::default().with_tolerance(0.01);
        let mut tween = float_tween(&bag, settings);
        tween.try_get_value(&ctx()).unwrap();

        bag.set("x", 1.005f32).unwrap();
        assert_eq!(
            tween.try_get_value(&ctx()).unwrap(),
            Polled::Changed(Value::Float(1.005))
        );
        assert!(!tween.is_active());
    }

    #[test]
    fn test_retarget_keeps_velocity() {
        let bag = PropertyBag::new("T").define("x", 0.0f32);
        let mut tween = float_tween(&bag, TweenSettings::default());
        tween.try_get_value(&ctx()).unwrap();

        bag.set("x", 10.0f32).unwrap();
        tween.try_get_value(&ctx()).unwrap();
        for _ in 0..3 {
            tween.try_get_value(&ctx()).unwrap();
        }
        let before = tween.velocity();
        assert!(before > 0.0);

        bag.set("x", 20.0f32).unwrap();
        assert_eq!(tween.try_get_value(&ctx()).unwrap().result(), EResult::Tweened);
        assert_eq!(tween.velocity(), before);
        assert_eq!(tween.target(), 20.0);
    }

    #[test]
    fn test_unscaled_time_ignores_pause() {
        let bag = PropertyBag::new("T").define("x", 0.0f32);
        let mut scaled = float_tween(&bag, TweenSettings::default());
        let mut unscaled = float_tween(&bag, TweenSettings::default().unscaled());
        let paused = TickContext {
            delta: 0.0,
            unscaled_delta: DT,
            tick: 0,
        };
        scaled.try_get_value(&paused).unwrap();
        unscaled.try_get_value(&paused).unwrap();
        bag.set("x", 1.0f32).unwrap();
        assert_eq!(
            scaled.try_get_value(&paused).unwrap(),
            Polled::Tweened(Value::Float(0.0))
        );
        unscaled.try_get_value(&paused).unwrap();

        for _ in 0..5 {
            // Frozen: nothing new to report.
            assert_eq!(scaled.try_get_value(&paused).unwrap(), Polled::NotChanged);
            unscaled.try_get_value(&paused).unwrap();
        }
        assert!(scaled.is_active());
        assert_eq!(scaled.current(), 0.0);
        assert!(unscaled.current() > 0.0);
    }

    #[test]
    fn test_upstream_tweened_passes_through() {
        struct Animated(f32);
        impl Node for Animated {
            fn name(&self) -> &str {
                "animated"
            }
            fn input_type(&self) -> ValueType {
                ValueType::Float
            }
            fn output_type(&self) -> ValueType {
                ValueType::Float
            }
            fn try_get_value(&mut self, _ctx: &TickContext) -> PipelineResult<Polled<Value>> {
                self.0 += 1.0;
                Ok(Polled::Tweened(Value::Float(self.0)))
            }
            fn upstream(&self) -> Option<&dyn Node> {
                None
            }
        }

        let mut tween = FloatTween::attach(
            Box::new(Animated(0.0)),
            TweenSettings::default(),
            BindingDirection::OneWay,
        )
        .unwrap();
        assert_eq!(
            tween.try_get_value(&ctx()).unwrap(),
            Polled::Tweened(Value::Float(1.0))
        );
        assert_eq!(
            tween.try_get_value(&ctx()).unwrap(),
            Polled::Tweened(Value::Float(2.0))
        );
        assert!(!tween.is_active());
        assert_eq!(tween.current(), 2.0);
    }

    #[test]
    fn test_write_snaps_and_forwards() {
        let bag = PropertyBag::new("T").define("x", 0.0f32);
        let adapter = PropertyAdapter::new(&bag, "x", BindingDirection::TwoWay).unwrap();
        let mut tween = FloatTween::attach(
            Box::new(adapter),
            TweenSettings::default(),
            BindingDirection::TwoWay,
        )
        .unwrap();
        tween.try_get_value(&ctx()).unwrap();

        tween.set_value(Value::Float(3.0)).unwrap();
        assert_eq!(bag.get("x"), Some(Value::Float(3.0)));
        assert_eq!(tween.current(), 3.0);
        assert_eq!(tween.try_get_value(&ctx()).unwrap(), Polled::NotChanged);
    }

    #[test]
    fn test_stalled_step_settles() {
        let bag = PropertyBag::new("T").define("x", 0.0f32);
        let mut tween = float_tween(&bag, TweenSettings::default());
        tween.try_get_value(&ctx()).unwrap();

        // Adjacent floats near 1e8 are 8 apart, far wider than the tolerance.
        bag.set("x", 1.0e8f32).unwrap();
        let mut result = tween.try_get_value(&ctx()).unwrap();
        for _ in 0..600 {
            if result != Polled::Tweened(Value::Float(tween.current())) {
                break;
            }
            result = tween.try_get_value(&ctx()).unwrap();
        }
        assert_eq!(result, Polled::Changed(Value::Float(1.0e8)));
        assert!(!tween.is_active());
    }

    #[test]
    fn test_attach_validation() {
        let bag = PropertyBag::new("T")
            .define("x", 0.0f32)
            .define("pos", Vec3::default());
        let adapter = PropertyAdapter::new(&bag, "pos", BindingDirection::OneWay).unwrap();
        assert!(matches!(
            FloatTween::attach(Box::new(adapter), TweenSettings::default(), BindingDirection::OneWay),
            Err(WiringError::TypeMismatch { .. })
        ));

        let adapter = PropertyAdapter::new(&bag, "x", BindingDirection::OneWay).unwrap();
        assert!(matches!(
            FloatTween::attach(
                Box::new(adapter),
                TweenSettings::default().with_smooth_time(-1.0),
                BindingDirection::OneWay
            ),
            Err(WiringError::InvalidParameter { .. })
        ));

        let adapter = PropertyAdapter::new(&bag, "pos", BindingDirection::OneWay).unwrap();
        assert!(Vec3Tween::attach(Box::new(adapter), TweenSettings::default(), BindingDirection::OneWay).is_ok());
    }
}
