//! propbind-rs demo
//!
//! Wires a handful of bindings over two hosts, simulates a few seconds of
//! ticks while the hosts change underneath, and logs what the sinks see.
//!
//! Usage: `propbind-rs [config.json|config.toml]`

use anyhow::Context;
use propbind_rs::{
    config::BindingConfig,
    enum_value::{BindableEnum, IntWidth},
    pipeline::{BindingSpec, FnSink, LatestValue, Scheduler, StageDescriptor, TweenKind},
    source::{Property, PropertyBag, PropertyHost},
    types::{Value, ValueType, Vec3},
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const FRAME: Duration = Duration::from_micros(16_667);

#[derive(Debug, Clone, Copy, PartialEq)]
enum LampMode {
    Off = 0,
    Dim = 1,
    Bright = 2,
}

impl BindableEnum for LampMode {
    const NAME: &'static str = "LampMode";
    const WIDTH: IntWidth = IntWidth::U8;

    fn to_repr(self) -> i64 {
        self as i64
    }

    fn from_repr(value: i64) -> Option<Self> {
        match value {
            0 => Some(LampMode::Off),
            1 => Some(LampMode::Dim),
            2 => Some(LampMode::Bright),
            _ => None,
        }
    }

    fn variant_name(value: i64) -> Option<&'static str> {
        match value {
            0 => Some("Off"),
            1 => Some("Dim"),
            2 => Some("Bright"),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct LampState {
    mode: LampMode,
    position: Vec3,
}

/// A host with statically known properties.
#[derive(Clone)]
struct Lamp {
    state: Rc<RefCell<LampState>>,
}

impl PropertyHost for Lamp {
    fn type_name(&self) -> &str {
        "Lamp"
    }

    fn property(&self, name: &str) -> Option<Property> {
        let get_state = self.state.clone();
        let set_state = self.state.clone();
        match name {
            "mode" => Some(Property::enumeration(
                "mode",
                move || get_state.borrow().mode,
                move |mode| set_state.borrow_mut().mode = mode,
            )),
            "position" => Some(Property::read_only("position", move || {
                get_state.borrow().position
            })),
            _ => None,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,propbind_rs=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting propbind-rs demo");

    let config = match std::env::args().nth(1) {
        Some(path) => BindingConfig::load(&path)
            .with_context(|| format!("loading configuration from {}", path))?,
        None => BindingConfig::default(),
    };

    let player = PropertyBag::new("Player")
        .define("health", 100.0f32)
        .define("level", 1i32);
    let lamp = Lamp {
        state: Rc::new(RefCell::new(LampState {
            mode: LampMode::Off,
            position: Vec3::default(),
        })),
    };

    let mut scheduler = Scheduler::from_config(&config);

    scheduler.bind(
        &player,
        BindingSpec::new("health").then(StageDescriptor::Format {
            template: "HP {}".to_string(),
            input: ValueType::Float,
        }),
        FnSink::new(ValueType::String, |result, value: &Value| {
            tracing::info!("health label [{}] {}", result, value);
        }),
    )?;

    // The health bar takes a byte; the float is bridged implicitly.
    let health_bar = LatestValue::new(ValueType::Byte);
    scheduler.bind(
        &player,
        BindingSpec::new("health").then(StageDescriptor::tween(TweenKind::Float)),
        health_bar.clone(),
    )?;

    let toggle = LatestValue::new(ValueType::Bool);
    let toggle_id = scheduler.bind(
        &player,
        BindingSpec::new("level")
            .then(StageDescriptor::IntToBool { step_value: 1 })
            .two_way(),
        toggle.clone(),
    )?;

    scheduler.bind(
        &lamp,
        BindingSpec::new("mode").then(StageDescriptor::EnumToString),
        FnSink::new(ValueType::String, |result, value: &Value| {
            tracing::info!("lamp mode [{}] {}", result, value);
        }),
    )?;

    let lamp_position = LatestValue::new(ValueType::Vec3);
    scheduler.bind(
        &lamp,
        BindingSpec::new("position").then(StageDescriptor::tween(TweenKind::Vec3)),
        lamp_position.clone(),
    )?;

    // A binding that cannot be wired is reported and skipped.
    if let Err(e) = scheduler.bind(
        &lamp,
        BindingSpec::new("brightness"),
        LatestValue::new(ValueType::Float),
    ) {
        tracing::info!("Skipped binding: {}", e);
    }

    if let Some(plan) = scheduler.plan(toggle_id) {
        tracing::debug!("Toggle binding:\n{}", plan.describe());
    }

    for frame in 0..180 {
        match frame {
            10 => player.set("health", 42.5f32)?,
            40 => {
                scheduler
                    .write(toggle_id, Value::Bool(false))
                    .context("switching the toggle off")?;
                tracing::info!("level after toggle write: {:?}", player.get("level"));
            }
            60 => {
                let mut state = lamp.state.borrow_mut();
                state.mode = LampMode::Bright;
                state.position = Vec3::new(1.0, 2.0, 0.5);
            }
            _ => {}
        }
        scheduler.tick(FRAME);
    }

    tracing::info!(
        "health bar {:?}, toggle {:?}, lamp position {:?}",
        health_bar.latest(),
        toggle.latest(),
        lamp_position.latest()
    );
    tracing::info!("Scheduler stats: {:?}", scheduler.stats());

    Ok(())
}
