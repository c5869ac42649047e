//! # propbind-rs: Typed Property Binding Pipelines
//!
//! Connects a property of an arbitrary host object to a consumer (typically a
//! UI control) through a chain of typed conversion stages. The chain is
//! polled once per tick; changes propagate downstream, idle ticks cost next
//! to nothing, and tween stages turn a single change into a smooth
//! multi-tick transition.
//!
//! ## Architecture
//!
//! - **Types**: `Value`/`ValueType` payload model and the `EResult` change signal
//! - **Source**: `PropertyHost` contract and the in-memory `PropertyBag` host
//! - **Pipeline**: property adapter, converters, implicit conversions, tweens,
//!   the wiring algorithm and the tick `Scheduler`
//! - **Smoothing**: SmoothDamp for scalars, angles, vectors and colors
//!
//! ## Configuration
//!
//! Scheduler timing and default tween settings live in a `BindingConfig`,
//! stored as JSON (or TOML for `.toml` paths).
//!
//! ## Example
//!
//! ```
//! use propbind_rs::{
//!     pipeline::{BindingSpec, LatestValue, Scheduler, StageDescriptor},
//!     source::PropertyBag,
//!     types::{Value, ValueType},
//! };
//! use std::time::Duration;
//!
//! let player = PropertyBag::new("Player").define("health", 75.0f32);
//! let label = LatestValue::new(ValueType::String);
//!
//! let mut scheduler = Scheduler::default();
//! scheduler
//!     .bind(
//!         &player,
//!         BindingSpec::new("health").then(StageDescriptor::FloatToString { decimals: None }),
//!         label.clone(),
//!     )
//!     .unwrap();
//!
//! scheduler.tick(Duration::from_millis(16));
//! assert_eq!(label.latest(), Some(Value::String("75".into())));
//! ```

pub mod config;
pub mod enum_value;
pub mod error;
pub mod pipeline;
pub mod smoothing;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use config::{BindingConfig, SchedulerSettings, TweenSettings};
pub use enum_value::{BindableEnum, EnumTag, EnumValue, IntWidth};
pub use error::{BindError, Result};
pub use pipeline::{
    BindingDirection, BindingId, BindingSpec, PipelineError, Scheduler, StageDescriptor,
    WiringError,
};
pub use source::{Property, PropertyBag, PropertyHost};
pub use types::{EResult, Polled, Value, ValueType};
