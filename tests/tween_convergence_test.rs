//! Tween stage behaviour over many ticks

mod common;

use common::builders::{wire, HostBuilder};
use common::mock_helpers::ScriptedSource;
use common::{as_float, assert_float_eq, frame, FRAME};
use propbind_rs::config::TweenSettings;
use propbind_rs::pipeline::nodes::FloatTween;
use propbind_rs::pipeline::{
    BindingDirection, BindingSpec, LatestValue, Node, Pipeline, Scheduler, StageDescriptor,
    TweenKind,
};
use propbind_rs::source::PropertyBag;
use propbind_rs::types::{Color, EResult, Polled, Value, ValueType, Vec3};
use proptest::prelude::*;

fn float_tween(host: &PropertyBag, settings: TweenSettings) -> Pipeline {
    wire(
        host,
        BindingSpec::new("x").then(StageDescriptor::tween_with(TweenKind::Float, settings)),
        ValueType::Float,
    )
}

/// Poll until the stage reports `Changed`, collecting the tweened samples.
fn run_until_settled(pipeline: &mut Pipeline, max_frames: usize) -> (Vec<Value>, Option<Value>) {
    let mut samples = Vec::new();
    for _ in 0..max_frames {
        match pipeline.poll(&frame()).unwrap() {
            Polled::Tweened(v) => samples.push(v),
            Polled::Changed(v) => return (samples, Some(v)),
            Polled::NotChanged => panic!("tween went idle before settling"),
        }
    }
    (samples, None)
}

#[test]
fn test_converges_then_goes_idle() {
    let host = HostBuilder::new("Bar").with("x", 0.0f32).build();
    let mut pipeline = float_tween(&host, TweenSettings::default().with_smooth_time(0.1));
    assert_eq!(
        pipeline.poll(&frame()).unwrap(),
        Polled::Changed(Value::Float(0.0))
    );

    host.set("x", 10.0f32).unwrap();
    // The retarget tick still shows where the tween is.
    assert_eq!(
        pipeline.poll(&frame()).unwrap(),
        Polled::Tweened(Value::Float(0.0))
    );

    let (samples, settled) = run_until_settled(&mut pipeline, 120);
    assert_eq!(settled, Some(Value::Float(10.0)));
    assert!(!samples.is_empty());

    // Monotonic approach with no overshoot.
    let mut last = 0.0;
    for sample in &samples {
        let v = as_float(sample);
        assert!(v >= last, "{} went backwards from {}", v, last);
        assert!(v <= 10.0);
        last = v;
    }

    for _ in 0..5 {
        assert_eq!(pipeline.poll(&frame()).unwrap(), Polled::NotChanged);
    }
}

#[test]
fn test_speed_cap_slows_transition() {
    let host = HostBuilder::new("Bar").with("x", 0.0f32).build();
    let settings = TweenSettings::default().with_smooth_time(0.1);
    let mut free = float_tween(&host, settings);
    let mut capped = float_tween(&host, settings.with_max_speed(5.0));
    free.poll(&frame()).unwrap();
    capped.poll(&frame()).unwrap();

    host.set("x", 100.0f32).unwrap();
    free.poll(&frame()).unwrap();
    capped.poll(&frame()).unwrap();

    let (free_samples, _) = run_until_settled(&mut free, 600);
    let (capped_samples, _) = run_until_settled(&mut capped, 2_000);
    assert!(capped_samples.len() > free_samples.len());
}

#[test]
fn test_angle_takes_shortest_path() {
    let host = HostBuilder::new("Turret").with("x", 350.0f32).build();
    let mut pipeline = wire(
        &host,
        BindingSpec::new("x").then(StageDescriptor::tween_with(
            TweenKind::Angle,
            TweenSettings::default().with_smooth_time(0.1),
        )),
        ValueType::Float,
    );
    pipeline.poll(&frame()).unwrap();

    host.set("x", 10.0f32).unwrap();
    pipeline.poll(&frame()).unwrap();
    let (samples, settled) = run_until_settled(&mut pipeline, 120);

    assert_eq!(settled, Some(Value::Float(10.0)));
    // Going up through 360 rather than down through 180.
    assert!(samples.iter().all(|s| as_float(s) >= 350.0));
}

#[test]
fn test_vec3_converges() {
    let host = HostBuilder::new("Camera").with("x", Vec3::new(0.0, 0.0, 0.0)).build();
    let mut pipeline = wire(
        &host,
        BindingSpec::new("x").then(StageDescriptor::tween_with(
            TweenKind::Vec3,
            TweenSettings::default().with_smooth_time(0.2),
        )),
        ValueType::Vec3,
    );
    pipeline.poll(&frame()).unwrap();

    let target = Vec3::new(1.0, -2.0, 3.0);
    host.set("x", target).unwrap();
    pipeline.poll(&frame()).unwrap();
    let (samples, settled) = run_until_settled(&mut pipeline, 240);

    assert_eq!(settled, Some(Value::Vec3(target)));
    let Some(Value::Vec3(midway)) = samples.get(samples.len() / 2) else {
        panic!("expected vec3 samples");
    };
    assert!(midway.x > 0.0 && midway.y < 0.0 && midway.z > 0.0);
}

#[test]
fn test_color_converges() {
    let host = HostBuilder::new("Lamp").with("x", Color::rgba(0.0, 0.0, 0.0, 1.0)).build();
    let mut pipeline = wire(
        &host,
        BindingSpec::new("x").then(StageDescriptor::tween_with(
            TweenKind::Color,
            TweenSettings::default().with_smooth_time(0.1),
        )),
        ValueType::Color,
    );
    pipeline.poll(&frame()).unwrap();

    let target = Color::rgba(1.0, 0.5, 0.25, 1.0);
    host.set("x", target).unwrap();
    pipeline.poll(&frame()).unwrap();
    let (_, settled) = run_until_settled(&mut pipeline, 120);
    assert_eq!(settled, Some(Value::Color(target)));
}

#[test]
fn test_upstream_tweened_passes_through() {
    let source = ScriptedSource::new(
        ValueType::Float,
        [
            Polled::Changed(Value::Float(0.0)),
            Polled::Tweened(Value::Float(3.0)),
            Polled::Tweened(Value::Float(6.0)),
        ],
    );
    let mut tween = FloatTween::attach(
        Box::new(source),
        TweenSettings::default(),
        BindingDirection::OneWay,
    )
    .unwrap();

    let ctx = frame();
    assert_eq!(tween.try_get_value(&ctx).unwrap(), Polled::Changed(Value::Float(0.0)));
    assert_eq!(tween.try_get_value(&ctx).unwrap(), Polled::Tweened(Value::Float(3.0)));
    assert_eq!(tween.try_get_value(&ctx).unwrap(), Polled::Tweened(Value::Float(6.0)));

    // Snapped to the last animated value, so nothing is left to do.
    assert!(!tween.is_active());
    assert_eq!(tween.current(), 6.0);
    assert_eq!(tween.try_get_value(&ctx).unwrap(), Polled::NotChanged);
}

#[test]
fn test_unscaled_tween_runs_while_paused() {
    let host = HostBuilder::new("Menu")
        .with("x", 0.0f32)
        .with("y", 0.0f32)
        .build();
    let scaled = LatestValue::new(ValueType::Float);
    let unscaled = LatestValue::new(ValueType::Float);

    let mut scheduler = Scheduler::default();
    scheduler
        .bind(
            &host,
            BindingSpec::new("x").then(StageDescriptor::tween(TweenKind::Float)),
            scaled.clone(),
        )
        .unwrap();
    scheduler
        .bind(
            &host,
            BindingSpec::new("y").then(StageDescriptor::tween_with(
                TweenKind::Float,
                TweenSettings::default().unscaled(),
            )),
            unscaled.clone(),
        )
        .unwrap();
    scheduler.tick(FRAME);

    scheduler.set_time_scale(0.0);
    host.set("x", 1.0f32).unwrap();
    host.set("y", 1.0f32).unwrap();
    for _ in 0..20 {
        scheduler.tick(FRAME);
    }

    assert_eq!(scaled.latest(), Some(Value::Float(0.0)));
    assert_eq!(scaled.latest_result(), Some(EResult::Tweened));
    assert!(as_float(&unscaled.latest().unwrap()) > 0.5);
}

#[test]
fn test_large_targets_settle() {
    for target in [1.0e4f32, 1.0e5, 1.0e8] {
        let host = HostBuilder::new("Odometer").with("x", 0.0f32).build();
        let mut pipeline = float_tween(&host, TweenSettings::default());
        pipeline.poll(&frame()).unwrap();

        host.set("x", target).unwrap();
        assert_eq!(
            pipeline.poll(&frame()).unwrap(),
            Polled::Tweened(Value::Float(0.0))
        );
        let (_, settled) = run_until_settled(&mut pipeline, 600);
        assert_eq!(settled, Some(Value::Float(target)), "target {}", target);
        assert_eq!(pipeline.poll(&frame()).unwrap(), Polled::NotChanged);
    }
}

#[test]
fn test_non_finite_values_snap() {
    let host = HostBuilder::new("Bar").with("x", 1.0f32).build();
    let mut pipeline = float_tween(&host, TweenSettings::default());
    pipeline.poll(&frame()).unwrap();

    host.set("x", f32::INFINITY).unwrap();
    assert_eq!(
        pipeline.poll(&frame()).unwrap(),
        Polled::Changed(Value::Float(f32::INFINITY))
    );
    for _ in 0..10 {
        assert_eq!(pipeline.poll(&frame()).unwrap(), Polled::NotChanged);
    }

    // Coming back from infinity has no finite start to animate from.
    host.set("x", 5.0f32).unwrap();
    assert_eq!(
        pipeline.poll(&frame()).unwrap(),
        Polled::Changed(Value::Float(5.0))
    );
    assert_eq!(pipeline.poll(&frame()).unwrap(), Polled::NotChanged);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_tween_always_settles_on_target(
        smooth_time in 0.05f32..0.5,
        start in -100.0f32..100.0,
        target in -100.0f32..100.0,
    ) {
        let host = HostBuilder::new("Bar").with("x", start).build();
        let settings = TweenSettings::default().with_smooth_time(smooth_time);
        let mut pipeline = float_tween(&host, settings);
        pipeline.poll(&frame()).unwrap();

        host.set("x", target).unwrap();
        let first = pipeline.poll(&frame()).unwrap();
        if (target - start).abs() <= settings.tolerance {
            prop_assert_eq!(first, Polled::Changed(Value::Float(target)));
        } else {
            prop_assert_eq!(first, Polled::Tweened(Value::Float(start)));
            let max_frames = (20.0 * smooth_time / FRAME.as_secs_f32()) as usize + 60;
            let (samples, settled) = run_until_settled(&mut pipeline, max_frames);
            prop_assert_eq!(settled, Some(Value::Float(target)));
            for sample in &samples {
                let v = as_float(sample) as f64;
                let (lo, hi) = (start.min(target) as f64, start.max(target) as f64);
                assert_float_eq(v.clamp(lo, hi), v, 1.0e-4);
            }
        }
        prop_assert_eq!(pipeline.poll(&frame()).unwrap(), Polled::NotChanged);
    }
}
